//! Integration tests for end-to-end functionality
//!
//! Tests for:
//! - Label store round trips
//! - Video-bound schemes and flash calibration
//! - Dataset loading and plotting

pub mod dataset_tests;
