//! Workspace state: label schemes, calibration flashes and constants.
//!
//! A workspace owns the label schemes of a project. Each scheme has one
//! event-type map shared by every stream created from it, and optionally a
//! video whose flashes align its labels with the data clock.

use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

use crate::labels::event_types::SharedEventTypes;
use crate::labels::LabelStream;
use crate::persistence::{
    labels_from_records, save_flashes_logged, save_labels_logged, LabelStore, SaveFlashesRequest,
    SaveLabelsRequest, StoreError,
};
use crate::sync::{SyncError, Synchronizer};

// ============================================================================
// Constants
// ============================================================================

/// Width of a label created by a single click, in data-time units (ms)
pub const DEFAULT_LABEL_WIDTH: f64 = 1000.0;

/// Plot width used when no view has been laid out yet, in pixels
pub const DEFAULT_PLOT_WIDTH: f64 = 1000.0;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur when working with workspace state
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Selection of a scheme name the workspace does not have
    #[error("Unknown label scheme: {0}")]
    UnknownScheme(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Core Types
// ============================================================================

/// A named set of label types, optionally bound to a video
#[derive(Clone, Debug)]
pub struct LabelScheme {
    pub name: String,
    pub event_types: SharedEventTypes,
    /// Video whose clock the persisted labels use
    pub video: Option<String>,
}

impl LabelScheme {
    pub fn new(name: impl Into<String>, event_types: SharedEventTypes) -> Self {
        Self {
            name: name.into(),
            event_types,
            video: None,
        }
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = Some(video.into());
        self
    }
}

/// Label schemes and calibration flashes of one project
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: String,
    schemes: BTreeMap<String, LabelScheme>,
    /// Flash times on the data clock (ms), by flash index
    data_flashes: Vec<Option<f64>>,
    /// Flash times on each video's clock (s), by flash index
    video_flashes: BTreeMap<String, Vec<Option<f64>>>,
}

impl Workspace {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schemes: BTreeMap::new(),
            data_flashes: Vec::new(),
            video_flashes: BTreeMap::new(),
        }
    }

    /// Create a workspace with a fresh random id
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn add_scheme(&mut self, scheme: LabelScheme) {
        self.schemes.insert(scheme.name.clone(), scheme);
    }

    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }

    /// Look up a scheme by name
    pub fn scheme(&self, name: &str) -> Result<&LabelScheme, WorkspaceError> {
        self.schemes
            .get(name)
            .ok_or_else(|| WorkspaceError::UnknownScheme(name.to_string()))
    }

    pub fn set_data_flashes(&mut self, flashes: Vec<Option<f64>>) {
        self.data_flashes = flashes;
    }

    pub fn set_video_flashes(&mut self, video: impl Into<String>, flashes: Vec<Option<f64>>) {
        self.video_flashes.insert(video.into(), flashes);
    }

    pub fn video_flashes(&self, video: &str) -> &[Option<f64>] {
        self.video_flashes
            .get(video)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Synchronizer for a video from the current flashes
    pub fn synchronizer(&self, video: &str) -> Synchronizer {
        Synchronizer::new(&self.data_flashes, self.video_flashes(video))
    }

    /// Synchronizer for a scheme, `None` when the scheme has no video
    pub fn synchronizer_for(&self, scheme: &LabelScheme) -> Option<Synchronizer> {
        scheme.video.as_deref().map(|video| self.synchronizer(video))
    }

    /// Build the label stream of `dataset` under a scheme.
    ///
    /// Persisted labels are loaded and converted to the data clock when the
    /// scheme has a video; an empty stream is returned when nothing is saved.
    pub fn attach_scheme(
        &self,
        store: &dyn LabelStore,
        dataset: &str,
        scheme_name: &str,
    ) -> Result<LabelStream, WorkspaceError> {
        let scheme = self.scheme(scheme_name)?;
        let records = store.load_labels(&self.id, scheme_name)?;
        let sync = self.synchronizer_for(scheme);

        let labels = labels_from_records(
            &records,
            &scheme.event_types.borrow(),
            sync.as_ref(),
        )?;
        tracing::info!(
            "Attached scheme '{}' to {} with {} labels",
            scheme_name,
            dataset,
            labels.len()
        );

        Ok(LabelStream::with_labels(
            dataset,
            scheme_name,
            Rc::clone(&scheme.event_types),
            labels,
        ))
    }

    /// Save a stream. Fire-and-forget: failures only reach the log.
    pub fn save_stream(&self, store: &dyn LabelStore, stream: &LabelStream) {
        let sync = self
            .scheme(stream.scheme())
            .ok()
            .and_then(|scheme| self.synchronizer_for(scheme));

        match SaveLabelsRequest::from_stream(self.id.clone(), stream, sync.as_ref()) {
            Ok(request) => save_labels_logged(store, &request),
            Err(e) => tracing::warn!("Not saving labels of {}: {}", stream.scheme(), e),
        }
    }

    /// Save the flashes of a video. Missing flashes keep their slot so
    /// indices still match the data flashes after a reload.
    pub fn save_video_flashes(&self, store: &dyn LabelStore, video: &str) {
        let request = SaveFlashesRequest {
            workspace_id: self.id.clone(),
            video_name: video.to_string(),
            flashes: self.video_flashes(video).to_vec(),
        };
        save_flashes_logged(store, &request);
    }

    /// Reload a video's flashes from the store
    pub fn load_video_flashes(
        &mut self,
        store: &dyn LabelStore,
        video: &str,
    ) -> Result<(), WorkspaceError> {
        let flashes = store.load_flashes(&self.id, video)?;
        self.set_video_flashes(video, flashes);
        Ok(())
    }
}
