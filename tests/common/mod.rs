//! Common test utilities shared across all test modules
//!
//! Helpers for building label streams, synthetic signals and scratch
//! directories for store tests.

#![allow(dead_code)]

use std::path::PathBuf;

use sensorlabel::labels::event_types::{EventTypeMap, SharedEventTypes};
use sensorlabel::labels::{Label, LabelId, LabelStream};

/// Event types used throughout the tests: walk = 0, run = 1, sit = 2
pub fn activity_types() -> SharedEventTypes {
    EventTypeMap::from_names(["walk", "run", "sit"]).into_shared()
}

/// Stream holding the given `(start, end)` intervals, all typed "walk"
pub fn stream_with(intervals: &[(f64, f64)]) -> LabelStream {
    let mut stream = LabelStream::new("subject01", "activity", activity_types());
    for &(start, end) in intervals {
        stream.add(Label::new(start, end, 0));
    }
    stream
}

/// Id of the label with the given bounds
pub fn id_of(stream: &LabelStream, start: f64, end: f64) -> LabelId {
    stream
        .labels()
        .iter()
        .find(|l| l.start == start && l.end == end)
        .map(|l| l.id)
        .unwrap_or_else(|| panic!("no label [{}, {}] in stream", start, end))
}

/// Fresh directory under the system temp dir, removed by the caller
pub fn scratch_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)
        .unwrap_or_else(|e| panic!("Failed to create scratch dir {:?}: {}", dir, e));
    dir
}

/// Test data generators for synthetic tests
pub mod synthetic {
    /// Accelerometer-like signal: slow sine plus a faster ripple
    pub fn accelerometer(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| {
                let t = i as f64 * 0.01;
                (t * 0.7).sin() * 9.81 + (t * 13.0).sin() * 0.5
            })
            .collect()
    }

    /// Create a time array with uniform spacing
    pub fn uniform_times(count: usize, interval: f64) -> Vec<f64> {
        (0..count).map(|i| i as f64 * interval).collect()
    }
}

/// Assertion helpers for common test patterns
pub mod assertions {
    use sensorlabel::labels::LabelStream;

    /// Assert that no two labels in the stream overlap
    pub fn assert_no_overlap(stream: &LabelStream) {
        let mut sorted = stream.labels().to_vec();
        sorted.sort_by(|a, b| {
            a.start
                .total_cmp(&b.start)
                .then(a.end.total_cmp(&b.end))
        });
        for pair in sorted.windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "Labels [{}, {}] and [{}, {}] overlap",
                pair[0].start,
                pair[0].end,
                pair[1].start,
                pair[1].end
            );
        }
    }

    /// Assert that every label has start <= end
    pub fn assert_not_inverted(stream: &LabelStream) {
        for label in stream.labels() {
            assert!(
                label.start <= label.end,
                "Label {} is inverted: [{}, {}]",
                label.id,
                label.start,
                label.end
            );
        }
    }
}
