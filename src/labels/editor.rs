//! Overlap resolution for interactive label edits.
//!
//! Every function here takes the full label collection and returns corrected
//! bounds; none of them mutate. Constraint violations are resolved by
//! clamping, never by failing.
//!
//! The pass over the other labels is sequential in collection order. Each
//! label may move the candidate boundary once and the next label sees the
//! moved value.

use super::{Label, LabelId};
use crate::series::TimeScale;

/// Which edge of a label is being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Start,
    End,
}

/// Left-edge rules against one other label.
///
/// Overlap: a boundary strictly inside `other` is pushed to its end.
/// Consume: a boundary at or left of `other`'s start while `other` starts
/// before `own_start` would swallow it, so it is pushed to its end as well.
fn clamp_left(t: f64, own_start: f64, other: &Label) -> f64 {
    if other.start < t && t < other.end {
        other.end
    } else if t <= other.start && other.start < own_start {
        other.end
    } else {
        t
    }
}

/// Right-edge rules against one other label, mirror of [`clamp_left`]
fn clamp_right(t: f64, own_start: f64, other: &Label) -> f64 {
    if other.start < t && t < other.end {
        other.start
    } else if t >= other.end && own_start < other.start {
        other.start
    } else {
        t
    }
}

fn others<'a>(labels: &'a [Label], id: Option<LabelId>) -> impl Iterator<Item = &'a Label> {
    labels.iter().filter(move |l| Some(l.id) != id)
}

/// Corrected position for one edge of `edited` dragged to `t`.
///
/// The edge is first kept from crossing the opposite edge, then clamped
/// against every other label in collection order. An edge dragged across
/// several labels stops at the first one the pass meets, not the nearest:
/// with A{10,20}, B{30,40} in that order, C{0,5}'s end dragged to 35
/// lands on 10.
pub fn resize_bound(labels: &[Label], edited: &Label, side: Side, t: f64) -> f64 {
    match side {
        Side::Start => {
            let t = t.min(edited.end);
            others(labels, Some(edited.id)).fold(t, |t, other| clamp_left(t, edited.start, other))
        }
        Side::End => {
            let t = t.max(edited.start);
            others(labels, Some(edited.id)).fold(t, |t, other| clamp_right(t, edited.start, other))
        }
    }
}

/// New `(start, end)` for `label` translated by `delta` time units.
///
/// Only the leading edge of the movement is clamped; the trailing edge
/// follows at the original width.
pub fn move_bounds(labels: &[Label], label: &Label, delta: f64) -> (f64, f64) {
    let width = label.end - label.start;

    if delta > 0.0 {
        let end = others(labels, Some(label.id))
            .fold(label.end + delta, |t, other| clamp_right(t, label.start, other));
        (end - width, end)
    } else if delta < 0.0 {
        let start = others(labels, Some(label.id))
            .fold(label.start + delta, |t, other| clamp_left(t, label.start, other));
        (start, start + width)
    } else {
        (label.start, label.end)
    }
}

/// Bounds for a new label of `width` centered on `p`.
///
/// Both edges are clamped with `p` standing in for the new label's start.
/// If the clamped edges cross (`p` inside an existing label) the result
/// collapses to zero width at the clamped start.
pub fn create_bounds(labels: &[Label], p: f64, width: f64) -> (f64, f64) {
    let half = width.abs() / 2.0;

    let start = others(labels, None).fold(p - half, |t, other| clamp_left(t, p, other));
    let end = others(labels, None).fold(p + half, |t, other| clamp_right(t, p, other));

    if end < start {
        (start, start)
    } else {
        (start, end)
    }
}

/// Bounds for `label` grown to cover the sample positions `xs`.
///
/// Returns `None` when there are no samples. The end is extended first so
/// the start clamp sees the grown label.
pub fn grow_bounds(labels: &[Label], label: &Label, xs: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = xs.iter().fold(None, |acc: Option<(f64, f64)>, &x| match acc {
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        None => Some((x, x)),
    })?;

    let mut grown = label.clone();
    grown.end = resize_bound(labels, &grown, Side::End, hi);
    grown.start = resize_bound(labels, &grown, Side::Start, lo);

    Some((grown.start, grown.end))
}

/// State of one drag gesture.
///
/// Lives only between pointer-down and pointer-up. There is no rollback:
/// whatever position the last update produced is the committed one.
#[derive(Clone, Debug, PartialEq)]
pub struct DragContext {
    pub label_id: LabelId,
    /// `None` for a whole-label move
    pub side: Option<Side>,
    /// Pointer delta of the latest update, in pixels
    pub delta: f64,
    last_x: f64,
}

impl DragContext {
    pub fn moving(label_id: LabelId, pointer_x: f64) -> Self {
        Self {
            label_id,
            side: None,
            delta: 0.0,
            last_x: pointer_x,
        }
    }

    pub fn resizing(label_id: LabelId, side: Side, pointer_x: f64) -> Self {
        Self {
            label_id,
            side: Some(side),
            delta: 0.0,
            last_x: pointer_x,
        }
    }

    /// Record a new pointer position and return the pixel delta since the last one
    pub fn pointer_to(&mut self, pointer_x: f64) -> f64 {
        self.delta = pointer_x - self.last_x;
        self.last_x = pointer_x;
        self.delta
    }

    /// Time delta of the latest update under `scale`
    pub fn time_delta(&self, scale: &TimeScale) -> f64 {
        scale.delta_to_time(self.delta)
    }
}
