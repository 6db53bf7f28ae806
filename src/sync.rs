//! Video/data clock synchronization from matched calibration flashes.
//!
//! A flash is an event visible in both the sensor feed (data clock,
//! milliseconds) and the video feed (video clock, seconds). Flashes are
//! matched by array position; the first pair where both sides are present
//! fixes a constant offset between the two clocks.

use thiserror::Error;

/// Milliseconds per video second
const VIDEO_SCALE: f64 = 1000.0;

/// Errors that can occur during clock conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// No flash index has a value on both clocks
    #[error("Cannot synchronize: no matched flash pair between data and video")]
    CannotSync,
}

/// Fixed-offset mapping between video seconds and data milliseconds
#[derive(Clone, Debug, PartialEq)]
pub struct Synchronizer {
    /// Reference pair as (data ms, video ms)
    reference: Option<(f64, f64)>,
}

impl Synchronizer {
    /// Build from flash arrays matched by index.
    ///
    /// `None` marks a flash missing on that clock. Zero is a valid flash
    /// time. Arrays of different lengths are matched up to the shorter one.
    pub fn new(data_flashes: &[Option<f64>], video_flashes: &[Option<f64>]) -> Self {
        let reference = data_flashes
            .iter()
            .zip(video_flashes.iter())
            .find_map(|pair| match pair {
                (Some(data), Some(video)) => Some((*data, *video * VIDEO_SCALE)),
                _ => None,
            });

        if reference.is_none() {
            tracing::debug!(
                "No syncable flash pair among {} data / {} video flashes",
                data_flashes.len(),
                video_flashes.len()
            );
        }

        Self { reference }
    }

    /// Build from flash arrays where every entry is present
    pub fn from_complete(data_flashes: &[f64], video_flashes: &[f64]) -> Self {
        let data: Vec<Option<f64>> = data_flashes.iter().copied().map(Some).collect();
        let video: Vec<Option<f64>> = video_flashes.iter().copied().map(Some).collect();
        Self::new(&data, &video)
    }

    /// True iff at least one flash pair is present on both clocks
    pub fn can_sync(&self) -> bool {
        self.reference.is_some()
    }

    /// Offset in milliseconds such that `data = video_ms + offset`
    pub fn offset(&self) -> Result<f64, SyncError> {
        self.reference
            .map(|(data, video_ms)| data - video_ms)
            .ok_or(SyncError::CannotSync)
    }

    /// Convert a video time (seconds) to data time (milliseconds)
    pub fn vid_to_data(&self, video_seconds: f64) -> Result<f64, SyncError> {
        let offset = self.offset()?;
        Ok(video_seconds * VIDEO_SCALE + offset)
    }

    /// Convert a data time (milliseconds) to video time (seconds)
    pub fn data_to_vid(&self, data_ms: f64) -> Result<f64, SyncError> {
        let offset = self.offset()?;
        Ok((data_ms - offset) / VIDEO_SCALE)
    }
}
