//! Label streams: the authoritative set of annotated intervals for one
//! (dataset, label scheme) pair.
//!
//! All mutation goes through [`LabelStream`], which owns the collection,
//! delegates bound computation to [`editor`], and notifies subscribers with
//! typed [`LabelEvent`]s after every structural change.

pub mod editor;
pub mod event_types;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::series::TimeScale;
use editor::{DragContext, Side};
use event_types::{LabelKey, SharedEventTypes, TypeKey};

/// Identifier of a label within its stream
pub type LabelId = u64;

/// Handle returned by [`LabelStream::subscribe`]
pub type SubscriptionId = usize;

/// An annotated time interval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Assigned by the stream on insertion, never reused
    pub id: LabelId,
    pub start: f64,
    pub end: f64,
    /// Key into the scheme's event-type map
    pub label: LabelKey,
    /// Type name cached at the last assignment; may go stale after renames
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// UI focus; at most one label per stream
    #[serde(default)]
    pub selected: bool,
}

impl Label {
    /// Create an unattached label; id and type name are filled in by the stream
    pub fn new(start: f64, end: f64, label: LabelKey) -> Self {
        Self {
            id: 0,
            start,
            end,
            label,
            type_name: None,
            selected: false,
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Zero-width labels are "not yet sized"
    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Minimal serialized projection
    pub fn to_export(&self) -> ExportLabel {
        ExportLabel {
            start: self.start,
            end: self.end,
            label: self.label,
        }
    }
}

/// Export shape of a label: the persisted-file and save-request payload
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportLabel {
    pub start: f64,
    pub end: f64,
    pub label: LabelKey,
}

/// Names of the notifications a stream emits.
///
/// The kebab-case strings are what external toolbars key off.
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq,
)]
#[strum(serialize_all = "kebab-case")]
pub enum LabelEventKind {
    Init,
    Add,
    Delete,
    Move,
    Resize,
    ChangeLabel,
    ChangeType,
    Select,
    Deselect,
}

/// A notification with the affected label, when there is one
#[derive(Clone, Debug, PartialEq)]
pub struct LabelEvent {
    pub kind: LabelEventKind,
    pub label: Option<Label>,
}

impl LabelEvent {
    /// Event name as used by listeners
    pub fn name(&self) -> &'static str {
        self.kind.into()
    }
}

type Observer = Box<dyn FnMut(&LabelEvent)>;

/// Mutable set of labels for one dataset under one label scheme
pub struct LabelStream {
    dataset: String,
    scheme: String,
    labels: Vec<Label>,
    next_id: LabelId,
    event_types: SharedEventTypes,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl fmt::Debug for LabelStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelStream")
            .field("dataset", &self.dataset)
            .field("scheme", &self.scheme)
            .field("labels", &self.labels)
            .field("next_id", &self.next_id)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl LabelStream {
    /// Create an empty stream
    pub fn new(
        dataset: impl Into<String>,
        scheme: impl Into<String>,
        event_types: SharedEventTypes,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            scheme: scheme.into(),
            labels: Vec::new(),
            next_id: 0,
            event_types,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a stream pre-populated with `labels` (duplicates dropped)
    pub fn with_labels(
        dataset: impl Into<String>,
        scheme: impl Into<String>,
        event_types: SharedEventTypes,
        labels: impl IntoIterator<Item = Label>,
    ) -> Self {
        let mut stream = Self::new(dataset, scheme, event_types);
        for label in labels {
            stream.add(label);
        }
        stream
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn event_types(&self) -> &SharedEventTypes {
        &self.event_types
    }

    /// Labels in insertion order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Labels ordered by start time
    pub fn sorted(&self) -> Vec<&Label> {
        let mut sorted: Vec<&Label> = self.labels.iter().collect();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
        sorted
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register a listener for every event this stream emits
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&LabelEvent) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Announce the initial label set to current subscribers
    pub fn emit_init(&mut self) {
        self.emit(LabelEventKind::Init, None);
    }

    fn emit(&mut self, kind: LabelEventKind, label: Option<Label>) {
        let event = LabelEvent { kind, label };
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn emit_for(&mut self, kind: LabelEventKind, id: LabelId) {
        let label = self.get(id).cloned();
        self.emit(kind, label);
    }

    // ========================================================================
    // Insertion / removal
    // ========================================================================

    fn type_name_for(&self, key: LabelKey) -> Option<String> {
        self.event_types.borrow().name_of(key).map(str::to_string)
    }

    /// Insert a label, assigning the next id.
    ///
    /// A label whose `(start, end)` already exists in the stream is rejected
    /// with a warning and `None` is returned.
    pub fn add(&mut self, mut label: Label) -> Option<LabelId> {
        if self
            .labels
            .iter()
            .any(|l| l.start == label.start && l.end == label.end)
        {
            tracing::warn!(
                "Label [{}, {}] already exists in {}/{}, not adding",
                label.start,
                label.end,
                self.dataset,
                self.scheme
            );
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        label.id = id;
        label.type_name = self.type_name_for(label.label);
        label.selected = false;

        self.labels.push(label);
        self.emit_for(LabelEventKind::Add, id);
        Some(id)
    }

    /// Remove a label by id. No-op if the id is unknown.
    pub fn remove(&mut self, id: LabelId) -> Option<Label> {
        let pos = self.labels.iter().position(|l| l.id == id)?;
        let removed = self.labels.remove(pos);
        self.emit(LabelEventKind::Delete, Some(removed.clone()));
        Some(removed)
    }

    // ========================================================================
    // Queries / export
    // ========================================================================

    /// All labels of the given type. Unknown type names match nothing.
    pub fn find_by_type(&self, key: impl Into<TypeKey>) -> Vec<&Label> {
        let key = key.into();
        let Some(resolved) = self.event_types.borrow().resolve(&key) else {
            return Vec::new();
        };
        self.labels.iter().filter(|l| l.label == resolved).collect()
    }

    /// Sorted minimal projection for saving
    pub fn to_export_form(&self) -> Vec<ExportLabel> {
        self.sorted().into_iter().map(Label::to_export).collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.selected)
    }

    /// Focus a label, deselecting any other one first
    pub fn select(&mut self, id: LabelId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected().is_some_and(|l| l.id == id) {
            return true;
        }

        self.deselect();
        // The previously selected label may have been zero width and removed
        // by `deselect`, but `id` itself was not selected so it survives.
        if let Some(label) = self.labels.iter_mut().find(|l| l.id == id) {
            label.selected = true;
        }
        self.emit_for(LabelEventKind::Select, id);
        true
    }

    /// Drop focus. A zero-width selected label is deleted instead of kept.
    pub fn deselect(&mut self) {
        let Some(label) = self.labels.iter_mut().find(|l| l.selected) else {
            return;
        };
        label.selected = false;
        let label = label.clone();

        if label.is_zero_width() {
            self.remove(label.id);
        }
        self.emit(LabelEventKind::Deselect, Some(label));
    }

    // ========================================================================
    // Interval edits
    // ========================================================================

    fn set_bounds(&mut self, id: LabelId, (start, end): (f64, f64)) {
        if let Some(label) = self.labels.iter_mut().find(|l| l.id == id) {
            label.start = start;
            label.end = end;
        }
    }

    /// Translate a label by a time delta, clamped against its neighbours
    pub fn move_label(&mut self, id: LabelId, delta: f64) -> Option<(f64, f64)> {
        let label = self.get(id)?;
        let bounds = editor::move_bounds(&self.labels, label, delta);
        self.set_bounds(id, bounds);
        self.emit_for(LabelEventKind::Move, id);
        Some(bounds)
    }

    /// Drag one edge of a label to `t`, clamped against its neighbours
    pub fn resize_label(&mut self, id: LabelId, side: Side, t: f64) -> Option<(f64, f64)> {
        let label = self.get(id)?;
        let bound = editor::resize_bound(&self.labels, label, side, t);
        let bounds = match side {
            Side::Start => (bound, label.end),
            Side::End => (label.start, bound),
        };
        self.set_bounds(id, bounds);
        self.emit_for(LabelEventKind::Resize, id);
        Some(bounds)
    }

    /// Create and select a label of `width` centered on `p`
    pub fn create_at(&mut self, p: f64, width: f64, key: LabelKey) -> Option<LabelId> {
        let (start, end) = editor::create_bounds(&self.labels, p, width);
        let id = self.add(Label::new(start, end, key))?;
        self.select(id);
        Some(id)
    }

    /// Extend a label in place to cover the sample positions `xs`
    pub fn grow_label(&mut self, id: LabelId, xs: &[f64]) -> Option<(f64, f64)> {
        let label = self.get(id)?;
        let bounds = editor::grow_bounds(&self.labels, label, xs)?;
        self.set_bounds(id, bounds);
        self.emit_for(LabelEventKind::Resize, id);
        Some(bounds)
    }

    /// Apply one pointer update of a drag gesture
    pub fn drag_to(
        &mut self,
        ctx: &mut DragContext,
        pointer_x: f64,
        scale: &TimeScale,
    ) -> Option<(f64, f64)> {
        ctx.pointer_to(pointer_x);
        match ctx.side {
            Some(side) => self.resize_label(ctx.label_id, side, scale.to_time(pointer_x)),
            None => self.move_label(ctx.label_id, ctx.time_delta(scale)),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Reassign a label's type. Unresolvable keys leave the label unchanged.
    pub fn change_label(&mut self, id: LabelId, key: impl Into<TypeKey>) -> bool {
        let key = key.into();
        let Some(resolved) = self.event_types.borrow().resolve(&key) else {
            tracing::warn!("Cannot resolve label type {:?}", key);
            return false;
        };
        let type_name = self.type_name_for(resolved);

        let Some(label) = self.labels.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        label.label = resolved;
        label.type_name = type_name;

        self.emit_for(LabelEventKind::ChangeLabel, id);
        true
    }

    /// Re-read every cached type name from the event-type map
    pub fn refresh_types(&mut self) {
        let types = self.event_types.borrow();
        for label in self.labels.iter_mut() {
            label.type_name = types.name_of(label.label).map(str::to_string);
        }
        drop(types);
        self.emit(LabelEventKind::ChangeType, None);
    }
}
