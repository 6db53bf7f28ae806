//! Tests for video/data clock synchronization
//!
//! Tests cover:
//! - Syncability with missing and zero-valued flashes
//! - Conversions in both directions
//! - Round trips and offset linearity

use sensorlabel::sync::{SyncError, Synchronizer};

// ============================================
// Syncability Tests
// ============================================

#[test]
fn test_zero_data_flash_can_sync() {
    let sync = Synchronizer::new(&[Some(0.0)], &[Some(4.28888)]);
    assert!(sync.can_sync());
}

#[test]
fn test_misaligned_flashes_cannot_sync() {
    let sync = Synchronizer::new(&[None, Some(1000.0)], &[Some(1.0)]);
    assert!(!sync.can_sync());
    assert_eq!(sync.offset(), Err(SyncError::CannotSync));
}

#[test]
fn test_all_missing_cannot_sync() {
    let sync = Synchronizer::new(&[None, None], &[None, None]);
    assert!(!sync.can_sync());
    assert_eq!(sync.vid_to_data(0.0), Err(SyncError::CannotSync));
}

#[test]
fn test_pair_found_after_gaps() {
    let sync = Synchronizer::new(&[None, Some(3000.0)], &[Some(0.5), Some(1.0)]);
    assert!(sync.can_sync());
    assert_eq!(sync.vid_to_data(1.0), Ok(3000.0));
}

// ============================================
// Conversion Tests
// ============================================

#[test]
fn test_first_flash_maps_to_data_zero() {
    let sync = Synchronizer::new(&[Some(0.0), Some(669_470.0)], &[Some(4.288888)]);
    assert_eq!(sync.vid_to_data(4.288888), Ok(0.0));
}

#[test]
fn test_round_trip() {
    let sync = Synchronizer::from_complete(&[12_345.0], &[67.891]);
    for x in [0.0, 1.5, 67.891, 3600.25, -2.0] {
        let back = sync.data_to_vid(sync.vid_to_data(x).unwrap()).unwrap();
        assert!((back - x).abs() < 1e-9, "{} came back as {}", x, back);
    }
}

#[test]
fn test_offset_is_linear() {
    let sync = Synchronizer::from_complete(&[5000.0], &[2.0]);
    let a = sync.vid_to_data(10.0).unwrap();
    let b = sync.vid_to_data(11.0).unwrap();
    assert_eq!(b - a, 1000.0);
}
