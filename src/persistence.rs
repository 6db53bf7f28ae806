//! Label and calibration persistence.
//!
//! Save requests carry the export form of a stream plus its event-type map.
//! Loaded label records name their type rather than its key, so they are
//! resolved against the scheme's map before becoming [`Label`]s. Schemes
//! tied to a video store label times on the video clock; the synchronizer
//! converts them on the way in and out.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::labels::event_types::{EventTypeMap, NULL_LABEL_KEY};
use crate::labels::{ExportLabel, Label, LabelStream};
use crate::sync::{SyncError, Synchronizer};

/// Labels subdirectory of a workspace
const LABELS_DIR: &str = "labels";

/// Flashes subdirectory of a workspace
const FLASHES_DIR: &str = "flashes";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    /// Platform data/config directory could not be determined
    #[error("No data directory available")]
    NoDataDir,
}

// ============================================================================
// Request / Record Shapes
// ============================================================================

/// Payload of a label save
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLabelsRequest {
    pub workspace_id: String,
    pub scheme_name: String,
    /// Export form, sorted by start
    pub labels: Vec<ExportLabel>,
    pub event_map: EventTypeMap,
}

impl SaveLabelsRequest {
    /// Build a save request from a stream.
    ///
    /// With a synchronizer, label times are converted from the data clock to
    /// the video clock, matching how video-bound schemes are loaded.
    pub fn from_stream(
        workspace_id: impl Into<String>,
        stream: &LabelStream,
        sync: Option<&Synchronizer>,
    ) -> Result<Self, SyncError> {
        let mut labels = stream.to_export_form();
        if let Some(sync) = sync {
            for label in labels.iter_mut() {
                label.start = sync.data_to_vid(label.start)?;
                label.end = sync.data_to_vid(label.end)?;
            }
        }

        Ok(Self {
            workspace_id: workspace_id.into(),
            scheme_name: stream.scheme().to_string(),
            labels,
            event_map: stream.event_types().borrow().clone(),
        })
    }
}

/// Payload of a calibration-flash save
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFlashesRequest {
    pub workspace_id: String,
    pub video_name: String,
    /// Flash times by flash index; `null` marks a flash missing on this video
    pub flashes: Vec<Option<f64>>,
}

/// A persisted label as loaded: type given by name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLabelRecord {
    pub start: f64,
    pub end: f64,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Turn loaded records into labels for a stream.
///
/// Unknown type names fall back to the null type with a warning. With a
/// synchronizer, times are converted from video seconds to data time.
pub fn labels_from_records(
    records: &[RawLabelRecord],
    types: &EventTypeMap,
    sync: Option<&Synchronizer>,
) -> Result<Vec<Label>, SyncError> {
    records
        .iter()
        .map(|record| {
            let key = types.key_of(&record.type_name).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown label type '{}', using the null type",
                    record.type_name
                );
                NULL_LABEL_KEY
            });

            let (start, end) = match sync {
                Some(sync) => (sync.vid_to_data(record.start)?, sync.vid_to_data(record.end)?),
                None => (record.start, record.end),
            };

            Ok(Label::new(start, end, key))
        })
        .collect()
}

// ============================================================================
// Store
// ============================================================================

/// Persistence backend for labels and flashes
pub trait LabelStore {
    fn save_labels(&self, request: &SaveLabelsRequest) -> Result<(), StoreError>;

    fn save_flashes(&self, request: &SaveFlashesRequest) -> Result<(), StoreError>;

    /// Records for a scheme; empty when nothing was saved yet
    fn load_labels(
        &self,
        workspace_id: &str,
        scheme_name: &str,
    ) -> Result<Vec<RawLabelRecord>, StoreError>;

    /// Event-type map saved with a scheme's labels; `None` when nothing was saved yet
    fn load_event_map(
        &self,
        workspace_id: &str,
        scheme_name: &str,
    ) -> Result<Option<EventTypeMap>, StoreError>;

    /// Flashes for a video, index-aligned as saved; empty when nothing was saved yet
    fn load_flashes(
        &self,
        workspace_id: &str,
        video_name: &str,
    ) -> Result<Vec<Option<f64>>, StoreError>;
}

/// Event-type map to read a scheme with: `names` in key order (0, 1, ...)
/// when given, otherwise the map saved alongside the labels.
pub fn event_map_for(
    store: &dyn LabelStore,
    workspace_id: &str,
    scheme_name: &str,
    names: Vec<String>,
) -> Result<EventTypeMap, StoreError> {
    if !names.is_empty() {
        return Ok(EventTypeMap::from_names(names));
    }
    Ok(store
        .load_event_map(workspace_id, scheme_name)?
        .unwrap_or_else(|| {
            tracing::warn!(
                "No saved event types for {}/{}, labels resolve to the null type",
                workspace_id,
                scheme_name
            );
            EventTypeMap::new()
        }))
}

/// Save labels without surfacing the outcome beyond a debug log
pub fn save_labels_logged(store: &dyn LabelStore, request: &SaveLabelsRequest) {
    match store.save_labels(request) {
        Ok(()) => tracing::debug!(
            "Saved {} labels for {}/{}",
            request.labels.len(),
            request.workspace_id,
            request.scheme_name
        ),
        Err(e) => tracing::debug!(
            "Saving labels for {}/{} failed: {}",
            request.workspace_id,
            request.scheme_name,
            e
        ),
    }
}

/// Save flashes without surfacing the outcome beyond a debug log
pub fn save_flashes_logged(store: &dyn LabelStore, request: &SaveFlashesRequest) {
    match store.save_flashes(request) {
        Ok(()) => tracing::debug!(
            "Saved {} flashes for {}/{}",
            request.flashes.len(),
            request.workspace_id,
            request.video_name
        ),
        Err(e) => tracing::debug!(
            "Saving flashes for {}/{} failed: {}",
            request.workspace_id,
            request.video_name,
            e
        ),
    }
}

/// Directory-backed JSON store.
///
/// Layout: `<root>/<workspace>/labels/<scheme>.json` holds a
/// [`SaveLabelsRequest`]; `<root>/<workspace>/flashes/<video>.json` holds a
/// [`SaveFlashesRequest`].
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the platform data directory
    pub fn default_location() -> Result<Self, StoreError> {
        dirs::data_dir()
            .map(|p| Self::new(p.join("sensorlabel").join("store")))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn labels_path(&self, workspace_id: &str, scheme_name: &str) -> PathBuf {
        self.root
            .join(workspace_id)
            .join(LABELS_DIR)
            .join(format!("{}.json", scheme_name))
    }

    fn flashes_path(&self, workspace_id: &str, video_name: &str) -> PathBuf {
        self.root
            .join(workspace_id)
            .join(FLASHES_DIR)
            .join(format!("{}.json", video_name))
    }

    fn read_labels(
        &self,
        workspace_id: &str,
        scheme_name: &str,
    ) -> Result<Option<SaveLabelsRequest>, StoreError> {
        let path = self.labels_path(workspace_id, scheme_name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(&path)?)?))
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(value)?;
        fs::write(path, content)?;
        tracing::info!("Wrote {:?}", path);
        Ok(())
    }
}

impl LabelStore for JsonFileStore {
    fn save_labels(&self, request: &SaveLabelsRequest) -> Result<(), StoreError> {
        let path = self.labels_path(&request.workspace_id, &request.scheme_name);
        Self::write_json(&path, request)
    }

    fn save_flashes(&self, request: &SaveFlashesRequest) -> Result<(), StoreError> {
        let path = self.flashes_path(&request.workspace_id, &request.video_name);
        Self::write_json(&path, request)
    }

    fn load_labels(
        &self,
        workspace_id: &str,
        scheme_name: &str,
    ) -> Result<Vec<RawLabelRecord>, StoreError> {
        let Some(saved) = self.read_labels(workspace_id, scheme_name)? else {
            return Ok(Vec::new());
        };
        let records = saved
            .labels
            .iter()
            .map(|label| RawLabelRecord {
                start: label.start,
                end: label.end,
                type_name: saved
                    .event_map
                    .name_of(label.label)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
        Ok(records)
    }

    fn load_event_map(
        &self,
        workspace_id: &str,
        scheme_name: &str,
    ) -> Result<Option<EventTypeMap>, StoreError> {
        Ok(self
            .read_labels(workspace_id, scheme_name)?
            .map(|saved| saved.event_map))
    }

    fn load_flashes(
        &self,
        workspace_id: &str,
        video_name: &str,
    ) -> Result<Vec<Option<f64>>, StoreError> {
        let path = self.flashes_path(workspace_id, video_name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let saved: SaveFlashesRequest = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(saved.flashes)
    }
}
