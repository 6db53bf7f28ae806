//! Point series and the linear time scale shared by the plotting pipeline.
//!
//! Raw channel arrays arrive from the data loader as flat numeric sequences.
//! Everything downstream (downsampling, energy overlays, nearest lookups)
//! works on ordered `(index, value)` points.

use serde::{Deserialize, Serialize};

/// A single sample of a channel, positioned on the index (time) axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Position on the shared index domain (sample number or data-clock time)
    pub index: f64,
    /// Sample value
    pub value: f64,
}

impl Point {
    #[inline]
    pub fn new(index: f64, value: f64) -> Self {
        Self { index, value }
    }
}

/// Build a point series from a flat channel, using the sample number as index
pub fn points_from_values(values: &[f64]) -> Vec<Point> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Point::new(i as f64, *v))
        .collect()
}

/// Build a point series from a channel and its timestamps.
/// Extra samples on either side are dropped.
pub fn points_from_times(times: &[f64], values: &[f64]) -> Vec<Point> {
    times
        .iter()
        .zip(values.iter())
        .map(|(t, v)| Point::new(*t, *v))
        .collect()
}

/// Linear mapping between a data-time domain and a pixel range.
///
/// The visible zoom window of a plot is a `TimeScale`; pointer deltas are
/// converted through it before they reach the interval editor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Width of the visible time window
    pub fn domain_span(&self) -> f64 {
        self.domain.1 - self.domain.0
    }

    /// Width of the plot in pixels
    pub fn range_span(&self) -> f64 {
        self.range.1 - self.range.0
    }

    /// Map a data time to a pixel position
    pub fn to_pixel(&self, time: f64) -> f64 {
        let span = self.domain_span();
        if span == 0.0 {
            return self.range.0;
        }
        self.range.0 + (time - self.domain.0) / span * self.range_span()
    }

    /// Map a pixel position back to a data time
    pub fn to_time(&self, pixel: f64) -> f64 {
        let span = self.range_span();
        if span == 0.0 {
            return self.domain.0;
        }
        self.domain.0 + (pixel - self.range.0) / span * self.domain_span()
    }

    /// Convert a pointer delta in pixels into a time delta.
    /// The sign of the pixel delta is preserved.
    pub fn delta_to_time(&self, dx: f64) -> f64 {
        self.to_time(dx) - self.to_time(0.0)
    }

    /// Return a copy zoomed to a new visible time window
    pub fn with_domain(&self, start: f64, end: f64) -> Self {
        Self {
            domain: (start, end),
            range: self.range,
        }
    }
}
