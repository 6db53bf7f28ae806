//! sensorlabel - label-timeline engine for annotating sensor recordings
//!
//! This library provides the core of an interval annotation tool for
//! multi-channel time series (accelerometer, gyroscope, light, barometer)
//! recorded alongside an optional video.
//!
//! ## Module Structure
//!
//! - [`labels`] - Label streams, overlap resolution and the event-type map
//! - [`sync`] - Video clock <-> data clock conversion from calibration flashes
//! - [`downsample`] - LTTB downsampling for interactive plotting
//! - [`energy`] - Overlayed, stacked and summed energy overlays
//! - [`series`] - Point series and the plot time scale
//! - [`formats`] - Dataset decoders and the file data source
//! - [`persistence`] - Save/load payloads and the JSON label store
//! - [`state`] - Workspaces, label schemes and constants
//! - [`settings`] - User settings persistence

pub mod downsample;
pub mod energy;
pub mod formats;
pub mod labels;
pub mod persistence;
pub mod series;
pub mod settings;
pub mod state;
pub mod sync;
