//! Tests for plot downsampling
//!
//! Tests cover:
//! - Bucket size derived from the visible window
//! - LTTB output size, endpoints and shape preservation
//! - Downsampler pass-through when zoomed in or disabled

use crate::common::synthetic::{accelerometer, uniform_times};
use sensorlabel::downsample::{bucket_size_for_view, downsample_lttb, Downsampler};
use sensorlabel::series::{points_from_times, points_from_values, TimeScale};

// ============================================
// Bucket Size Tests
// ============================================

#[test]
fn test_bucket_size_truncates() {
    assert_eq!(bucket_size_for_view(10_000.0, 100.0), 50);
    assert_eq!(bucket_size_for_view(10_099.0, 100.0), 50);
}

#[test]
fn test_zoomed_in_bucket_is_one() {
    assert_eq!(bucket_size_for_view(100.0, 1000.0), 1);
    assert_eq!(bucket_size_for_view(0.0, 1000.0), 1);
    assert_eq!(bucket_size_for_view(f64::NAN, 1000.0), 1);
}

// ============================================
// LTTB Tests
// ============================================

#[test]
fn test_ten_thousand_points_to_two_hundred() {
    let data = points_from_values(&accelerometer(10_000));
    let out = downsample_lttb(&data, 50);

    assert_eq!(out.len(), 200);
    assert_eq!(out[0], data[0]);
    assert_eq!(out[199], data[9_999]);
}

#[test]
fn test_short_series_untouched() {
    let data = points_from_values(&[1.0, 2.0]);
    assert_eq!(downsample_lttb(&data, 50), data);
    assert!(downsample_lttb(&[], 50).is_empty());
}

#[test]
fn test_output_tracks_signal_extremes() {
    let values = accelerometer(20_000);
    let data = points_from_values(&values);
    let out = downsample_lttb(&data, 40);

    let max_in = values.iter().cloned().fold(f64::MIN, f64::max);
    let max_out = out.iter().map(|p| p.value).fold(f64::MIN, f64::max);
    assert!((max_in - max_out).abs() < 1.5, "{} vs {}", max_in, max_out);
}

#[test]
fn test_timestamps_are_preserved() {
    let times = uniform_times(5_000, 20.0);
    let data = points_from_times(&times, &accelerometer(5_000));
    let out = downsample_lttb(&data, 25);

    for p in &out {
        assert_eq!(p.index % 20.0, 0.0);
    }
}

// ============================================
// Downsampler Tests
// ============================================

#[test]
fn test_downsampler_follows_zoom() {
    let data = points_from_values(&accelerometer(10_000));
    let downsampler = Downsampler::default();

    let full = TimeScale::new((0.0, 10_000.0), (0.0, 100.0));
    assert_eq!(downsampler.apply(&data, &full).len(), 200);

    let zoomed = full.with_domain(0.0, 150.0);
    assert_eq!(downsampler.apply(&data, &zoomed).len(), data.len());
}

#[test]
fn test_disabled_downsampler() {
    let data = points_from_values(&accelerometer(10_000));
    let view = TimeScale::new((0.0, 10_000.0), (0.0, 100.0));
    assert_eq!(Downsampler::new(false).apply(&data, &view), data);
}

#[test]
fn test_repeated_calls_give_identical_output() {
    let data = points_from_times(&uniform_times(8_000, 10.0), &accelerometer(8_000));
    let first = downsample_lttb(&data, 37);
    let second = downsample_lttb(&data, 37);
    assert_eq!(first, second);

    let downsampler = Downsampler::default();
    let view = TimeScale::new((0.0, 80_000.0), (0.0, 640.0));
    let first = downsampler.apply(&data, &view);
    // An unrelated call in between leaves no state behind
    let _ = downsampler.apply(&data[..1_000], &view.with_domain(0.0, 10_000.0));
    let second = downsampler.apply(&data, &view);
    assert_eq!(first, second);
    assert!(first.len() < data.len());
}
