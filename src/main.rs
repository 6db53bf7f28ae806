//! sensorlabel - command line access to the label-timeline engine
//!
//! Converts times between video and data clocks, previews downsampling of a
//! dataset channel, and exports persisted labels.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sensorlabel::formats::{DataSource, FileDataSource};
use sensorlabel::labels::LabelStream;
use sensorlabel::persistence::{event_map_for, labels_from_records, LabelStore};
use sensorlabel::series::{points_from_values, TimeScale};
use sensorlabel::settings::Settings;
use sensorlabel::state::DEFAULT_PLOT_WIDTH;
use sensorlabel::sync::Synchronizer;

#[derive(Parser)]
#[command(name = "sensorlabel")]
#[command(about = "Label-timeline tools for sensor recordings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a time between the video clock (s) and the data clock (ms)
    Sync {
        /// Data-clock flashes, comma separated; empty or "null" marks a missing flash
        #[arg(long, value_delimiter = ',')]
        data_flashes: Vec<String>,

        /// Video-clock flashes, comma separated
        #[arg(long, value_delimiter = ',')]
        video_flashes: Vec<String>,

        /// Video time to convert to data time
        #[arg(long, conflicts_with = "data_time")]
        video_time: Option<f64>,

        /// Data time to convert to video time
        #[arg(long)]
        data_time: Option<f64>,
    },
    /// Downsample one channel of a dataset for a plot of the given width
    Downsample {
        /// Directory holding <dataset>.csv / .json / .bdl
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        dataset: String,

        #[arg(long, default_value = "0")]
        channel: usize,

        /// Plot width in pixels
        #[arg(long, default_value_t = DEFAULT_PLOT_WIDTH)]
        width: f64,

        /// Print the reduced points as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the export form of persisted labels
    Export {
        #[arg(long)]
        workspace: String,

        #[arg(long)]
        scheme: String,

        /// Type names in key order (0, 1, ...); defaults to the saved event types
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Label store root; defaults to the configured store
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn parse_flashes(values: &[String]) -> Result<Vec<Option<f64>>> {
    values
        .iter()
        .map(|v| {
            let v = v.trim();
            if v.is_empty() || v.eq_ignore_ascii_case("null") {
                Ok(None)
            } else {
                v.parse::<f64>()
                    .map(Some)
                    .with_context(|| format!("invalid flash time '{}'", v))
            }
        })
        .collect()
}

fn run_sync(
    data_flashes: &[String],
    video_flashes: &[String],
    video_time: Option<f64>,
    data_time: Option<f64>,
) -> Result<()> {
    let sync = Synchronizer::new(&parse_flashes(data_flashes)?, &parse_flashes(video_flashes)?);
    println!("can_sync: {}", sync.can_sync());

    match (video_time, data_time) {
        (Some(v), _) => println!("data time: {}", sync.vid_to_data(v)?),
        (None, Some(d)) => println!("video time: {}", sync.data_to_vid(d)?),
        (None, None) => {}
    }
    Ok(())
}

fn run_downsample(
    settings: &Settings,
    data_dir: PathBuf,
    dataset: &str,
    channel: usize,
    width: f64,
    json: bool,
) -> Result<()> {
    let source = FileDataSource::new(data_dir);
    let decoded = source
        .fetch(dataset, &[channel])
        .with_context(|| format!("loading dataset '{}'", dataset))?;

    let Some(values) = decoded.channels.first() else {
        bail!("dataset '{}' has no channel {}", dataset, channel);
    };
    let points = points_from_values(values);
    let view = TimeScale::new((0.0, points.len() as f64), (0.0, width));
    let reduced = settings.downsampler().apply(&points, &view);

    if json {
        println!("{}", serde_json::to_string(&reduced)?);
    } else {
        println!("{} -> {} points", points.len(), reduced.len());
    }
    Ok(())
}

fn run_export(
    settings: &Settings,
    workspace: &str,
    scheme: &str,
    types: Vec<String>,
    store: Option<PathBuf>,
) -> Result<()> {
    let store = match store {
        Some(dir) => sensorlabel::persistence::JsonFileStore::new(dir),
        None => settings.store()?,
    };

    let records = store
        .load_labels(workspace, scheme)
        .with_context(|| format!("loading labels of {}/{}", workspace, scheme))?;
    let types = event_map_for(&store, workspace, scheme, types)?;
    let labels = labels_from_records(&records, &types, None)?;
    let stream = LabelStream::with_labels(workspace, scheme, types.into_shared(), labels);

    println!("{}", serde_json::to_string_pretty(&stream.to_export_form())?);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Sync {
            data_flashes,
            video_flashes,
            video_time,
            data_time,
        } => run_sync(&data_flashes, &video_flashes, video_time, data_time),
        Commands::Downsample {
            data_dir,
            dataset,
            channel,
            width,
            json,
        } => run_downsample(&settings, data_dir, &dataset, channel, width, json),
        Commands::Export {
            workspace,
            scheme,
            types,
            store,
        } => run_export(&settings, &workspace, &scheme, types, store),
    }
}
