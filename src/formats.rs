//! Dataset decoding and the file-backed data source.
//!
//! A dataset declares its format by name ("csv", "tensor", "bdl"). The name
//! is parsed once into [`Format`] and each variant maps to one decoder, so
//! the set of supported formats is closed at compile time.
//!
//! All decoders produce channel-major arrays: `channels[c][i]` is sample `i`
//! of channel `c`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

/// Errors that can occur while decoding or fetching a dataset
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Format name is not one of the supported decoders
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// A CSV cell or header could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Tensor JSON was malformed
    #[error("Invalid tensor JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary payload ended early
    #[error("Truncated binary data: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// Channels of different lengths where equal lengths are required
    #[error("Channel {channel} has {got} samples, expected {expected}")]
    Ragged {
        channel: usize,
        expected: usize,
        got: usize,
    },

    /// Requested channel index does not exist
    #[error("Channel {0} not present in dataset")]
    MissingChannel(usize),

    /// No file for the dataset in any supported format
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded dataset: channel names plus channel-major samples
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedChannels {
    pub names: Vec<String>,
    pub channels: Vec<Vec<f64>>,
}

impl DecodedChannels {
    fn unnamed(channels: Vec<Vec<f64>>) -> Self {
        let names = (0..channels.len()).map(|c| format!("ch{}", c)).collect();
        Self { names, channels }
    }

    /// Number of samples per channel (0 when there are no channels)
    pub fn sample_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Keep only the channels at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Result<DecodedChannels, DecodeError> {
        let mut names = Vec::with_capacity(indices.len());
        let mut channels = Vec::with_capacity(indices.len());
        for &i in indices {
            let channel = self.channels.get(i).ok_or(DecodeError::MissingChannel(i))?;
            names.push(self.names.get(i).cloned().unwrap_or_default());
            channels.push(channel.clone());
        }
        Ok(DecodedChannels { names, channels })
    }
}

/// Supported dataset formats
#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// Header row of channel names, then one numeric row per sample
    Csv,
    /// JSON array of channel arrays
    Tensor,
    /// Little-endian u32 channel count, u32 sample count, channel-major f32 samples
    Bdl,
}

impl Format {
    /// Parse a format name as declared by a dataset
    pub fn parse_name(name: &str) -> Result<Format, DecodeError> {
        Format::from_str(&name.trim().to_ascii_lowercase())
            .map_err(|_| DecodeError::UnsupportedFormat(name.to_string()))
    }

    /// File extension used by the file data source
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Tensor => "json",
            Format::Bdl => "bdl",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Format> {
        Format::iter().find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Decode a payload in this format
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedChannels, DecodeError> {
        match self {
            Format::Csv => decode_csv(&String::from_utf8_lossy(bytes)),
            Format::Tensor => decode_tensor(bytes),
            Format::Bdl => decode_bdl(bytes),
        }
    }
}

fn decode_csv(contents: &str) -> Result<DecodedChannels, DecodeError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(DecodedChannels::default());
    };
    let names: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
    let mut channels: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() != names.len() {
            return Err(DecodeError::Parse {
                line: line_no + 1,
                message: format!("expected {} columns, found {}", names.len(), cells.len()),
            });
        }
        for (channel, cell) in channels.iter_mut().zip(cells) {
            let value = cell.trim().parse::<f64>().map_err(|e| DecodeError::Parse {
                line: line_no + 1,
                message: format!("'{}': {}", cell.trim(), e),
            })?;
            channel.push(value);
        }
    }

    Ok(DecodedChannels { names, channels })
}

fn decode_tensor(bytes: &[u8]) -> Result<DecodedChannels, DecodeError> {
    let channels: Vec<Vec<f64>> = serde_json::from_slice(bytes)?;
    if let Some(expected) = channels.first().map(Vec::len) {
        if let Some((channel, c)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != expected)
        {
            return Err(DecodeError::Ragged {
                channel,
                expected,
                got: c.len(),
            });
        }
    }
    Ok(DecodedChannels::unnamed(channels))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, DecodeError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(DecodeError::Truncated {
            expected: offset + 4,
            got: bytes.len(),
        })
}

fn decode_bdl(bytes: &[u8]) -> Result<DecodedChannels, DecodeError> {
    const HEADER: usize = 8;

    let channel_count = read_u32(bytes, 0)? as usize;
    let sample_count = read_u32(bytes, 4)? as usize;

    // Header counts are untrusted; a size that does not fit is truncated data
    let expected = channel_count
        .checked_mul(sample_count)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(HEADER))
        .unwrap_or(usize::MAX);
    if bytes.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            got: bytes.len(),
        });
    }

    let body = &bytes[HEADER..expected];
    let channels = if sample_count == 0 || channel_count == 0 {
        vec![Vec::new(); channel_count]
    } else {
        body.chunks_exact(sample_count * 4)
            .map(|channel| {
                channel
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                    .collect()
            })
            .collect()
    };

    Ok(DecodedChannels::unnamed(channels))
}

/// Source of raw channel arrays for a dataset
pub trait DataSource {
    /// Fetch the selected channels of `dataset`
    fn fetch(&self, dataset: &str, channels: &[usize]) -> Result<DecodedChannels, DecodeError>;
}

/// Data source reading `<root>/<dataset>.<ext>` in any supported format
#[derive(Clone, Debug)]
pub struct FileDataSource {
    root: PathBuf,
}

impl FileDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing file for `dataset`, with its format
    pub fn locate(&self, dataset: &str) -> Option<(PathBuf, Format)> {
        Format::iter()
            .map(|format| {
                let path = self
                    .root
                    .join(format!("{}.{}", dataset, format.extension()));
                (path, format)
            })
            .find(|(path, _)| path.exists())
    }
}

impl DataSource for FileDataSource {
    fn fetch(&self, dataset: &str, channels: &[usize]) -> Result<DecodedChannels, DecodeError> {
        let (path, format) = self
            .locate(dataset)
            .ok_or_else(|| DecodeError::NotFound(dataset.to_string()))?;

        let bytes = fs::read(&path)?;
        let decoded = format.decode(&bytes)?;
        tracing::info!(
            "Loaded {:?} ({}): {} channels, {} samples",
            path,
            format.as_ref(),
            decoded.channels.len(),
            decoded.sample_count()
        );

        if channels.is_empty() {
            Ok(decoded)
        } else {
            decoded.select(channels)
        }
    }
}
