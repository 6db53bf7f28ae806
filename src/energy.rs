//! Energy overlays derived from auxiliary per-channel arrays.
//!
//! Three views are offered for the selected energy dataset:
//! - overlayed: the raw channels, one curve each
//! - stacked: one row per index with a value per channel short-name
//! - summed: one scalar per index, the sum across channels
//!
//! Stacked and summed are computed on first access and cached until a
//! different dataset is selected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, EnumIter, EnumString};
use thiserror::Error;

use crate::series::{points_from_times, points_from_values, Point};

/// Errors that can occur when reading energy views
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyError {
    /// No energy dataset is loaded or selected
    #[error("No energy data available")]
    NoData,

    /// Selection of a name that was never loaded
    #[error("Unknown energy dataset: {0}")]
    UnknownDataset(String),
}

/// Display mode of the energy overlay
#[derive(AsRefStr, Clone, Copy, Debug, Default, EnumIter, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum EnergyMode {
    #[default]
    Overlayed,
    Stacked,
    Summed,
}

/// Raw energy channels sharing one index domain
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    /// Short name per channel, used as the stacked-row key
    pub channel_names: Vec<String>,
    pub channels: Vec<Vec<Point>>,
}

impl EnergySource {
    pub fn new(channel_names: Vec<String>, channels: Vec<Vec<Point>>) -> Self {
        Self {
            channel_names,
            channels,
        }
    }

    /// Build from flat channel arrays indexed by sample number
    pub fn from_values(channel_names: Vec<String>, channels: &[Vec<f64>]) -> Self {
        let channels = channels.iter().map(|c| points_from_values(c)).collect();
        Self::new(channel_names, channels)
    }

    /// Build from flat channel arrays sharing one timestamp array
    pub fn from_times(channel_names: Vec<String>, times: &[f64], channels: &[Vec<f64>]) -> Self {
        let channels = channels
            .iter()
            .map(|c| points_from_times(times, c))
            .collect();
        Self::new(channel_names, channels)
    }

    fn channel_name(&self, channel: usize) -> String {
        self.channel_names
            .get(channel)
            .cloned()
            .unwrap_or_else(|| format!("ch{}", channel))
    }

    /// Rows shared by every channel
    fn row_count(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }
}

/// One index of the stacked view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackedRow {
    pub index: f64,
    pub values: BTreeMap<String, f64>,
}

impl StackedRow {
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

/// A borrowed energy view in one of the display modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnergyView<'a> {
    Overlayed(&'a [Vec<Point>]),
    Stacked(&'a [StackedRow]),
    Summed(&'a [Point]),
}

/// Transpose channels into per-index rows keyed by channel short-name.
/// Channels longer than the shortest one are cut to the common length.
pub fn stack_channels(source: &EnergySource) -> Vec<StackedRow> {
    let Some(first) = source.channels.first() else {
        return Vec::new();
    };
    let names: Vec<String> = (0..source.channels.len())
        .map(|c| source.channel_name(c))
        .collect();

    (0..source.row_count())
        .map(|i| StackedRow {
            index: first[i].index,
            values: names
                .iter()
                .zip(source.channels.iter())
                .map(|(name, channel)| (name.clone(), channel[i].value))
                .collect(),
        })
        .collect()
}

/// Transpose channels and reduce each index to the sum across channels
pub fn sum_channels(source: &EnergySource) -> Vec<Point> {
    let Some(first) = source.channels.first() else {
        return Vec::new();
    };

    (0..source.row_count())
        .map(|i| {
            let total = source.channels.iter().map(|c| c[i].value).sum();
            Point::new(first[i].index, total)
        })
        .collect()
}

/// Point whose index is closest to `index`, by binary search over
/// index-ordered `data`.
///
/// An exact match is returned directly. Between two straddling points the
/// closer one wins; on an exact tie the earlier (left) point wins.
pub fn nearest(index: f64, data: &[Point]) -> Option<&Point> {
    let last = data.len().checked_sub(1)?;

    match data.binary_search_by(|p| p.index.total_cmp(&index)) {
        Ok(i) => Some(&data[i]),
        Err(0) => Some(&data[0]),
        Err(i) if i > last => Some(&data[last]),
        Err(i) => {
            let left = &data[i - 1];
            let right = &data[i];
            if index - left.index <= right.index - index {
                Some(left)
            } else {
                Some(right)
            }
        }
    }
}

#[derive(Debug, Default)]
struct CachedViews {
    stacked: Option<Vec<StackedRow>>,
    summed: Option<Vec<Point>>,
}

/// Named energy datasets with lazily derived views for the selected one
#[derive(Debug, Default)]
pub struct EnergyAggregator {
    sources: BTreeMap<String, EnergySource>,
    selected: Option<String>,
    cache: CachedViews,
}

impl EnergyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset's energy channels
    pub fn insert(&mut self, name: impl Into<String>, source: EnergySource) {
        let name = name.into();
        if self.selected.as_deref() == Some(name.as_str()) {
            self.cache = CachedViews::default();
        }
        self.sources.insert(name, source);
    }

    /// True when any energy dataset is loaded
    pub fn has_energy(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select the dataset whose views are served.
    /// Selecting a different name drops the cached views.
    pub fn select(&mut self, name: &str) -> Result<(), EnergyError> {
        if !self.sources.contains_key(name) {
            return Err(EnergyError::UnknownDataset(name.to_string()));
        }
        if self.selected.as_deref() != Some(name) {
            self.selected = Some(name.to_string());
            self.cache = CachedViews::default();
        }
        Ok(())
    }

    fn source(&self) -> Result<&EnergySource, EnergyError> {
        self.selected
            .as_ref()
            .and_then(|name| self.sources.get(name))
            .ok_or(EnergyError::NoData)
    }

    /// Raw channels, one curve per channel
    pub fn overlayed(&self) -> Result<&[Vec<Point>], EnergyError> {
        Ok(self.source()?.channels.as_slice())
    }

    /// Per-index rows for stacked-area rendering
    pub fn stacked(&mut self) -> Result<&[StackedRow], EnergyError> {
        let source = self
            .selected
            .as_ref()
            .and_then(|name| self.sources.get(name))
            .ok_or(EnergyError::NoData)?;

        let rows = self.cache.stacked.get_or_insert_with(|| {
            tracing::debug!("Computing stacked energy view");
            stack_channels(source)
        });
        Ok(rows.as_slice())
    }

    /// Per-index sums for a single aggregate line
    pub fn summed(&mut self) -> Result<&[Point], EnergyError> {
        let source = self
            .selected
            .as_ref()
            .and_then(|name| self.sources.get(name))
            .ok_or(EnergyError::NoData)?;

        let points = self.cache.summed.get_or_insert_with(|| {
            tracing::debug!("Computing summed energy view");
            sum_channels(source)
        });
        Ok(points.as_slice())
    }

    /// View for a display mode
    pub fn view(&mut self, mode: EnergyMode) -> Result<EnergyView<'_>, EnergyError> {
        match mode {
            EnergyMode::Overlayed => self.overlayed().map(EnergyView::Overlayed),
            EnergyMode::Stacked => self.stacked().map(EnergyView::Stacked),
            EnergyMode::Summed => self.summed().map(EnergyView::Summed),
        }
    }
}
