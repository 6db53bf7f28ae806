//! Dataset loading tests
//!
//! Tests cover:
//! - File data source lookup across all formats
//! - Channel selection on fetch
//! - Loading, downsampling and energy views end to end

use std::fs;

use crate::common::scratch_dir;
use crate::common::synthetic::accelerometer;
use sensorlabel::downsample::Downsampler;
use sensorlabel::energy::{EnergyAggregator, EnergySource};
use sensorlabel::formats::{DataSource, DecodeError, FileDataSource};
use sensorlabel::series::{points_from_values, TimeScale};

fn bdl_bytes(channels: &[Vec<f32>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(channels.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(channels[0].len() as u32).to_le_bytes());
    for channel in channels {
        for v in channel {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    bytes
}

#[test]
fn test_fetch_each_format() {
    let dir = scratch_dir("sensorlabel-datasets");
    fs::write(dir.join("walk.csv"), "time,acc\n0,1.0\n10,2.0\n").unwrap();
    fs::write(dir.join("run.json"), "[[0, 10], [3.5, 4.5]]").unwrap();
    fs::write(dir.join("sit.bdl"), bdl_bytes(&[vec![0.0, 10.0], vec![0.5, 0.75]])).unwrap();

    let source = FileDataSource::new(dir.clone());
    let walk = source.fetch("walk", &[]).unwrap();
    let run = source.fetch("run", &[]).unwrap();
    let sit = source.fetch("sit", &[]).unwrap();

    assert_eq!(walk.names, vec!["time", "acc"]);
    assert_eq!(walk.channels[1], vec![1.0, 2.0]);
    assert_eq!(run.channels[1], vec![3.5, 4.5]);
    assert_eq!(sit.channels[1], vec![0.5, 0.75]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_fetch_selects_channels() {
    let dir = scratch_dir("sensorlabel-datasets");
    fs::write(dir.join("walk.csv"), "time,accX,accY\n0,1,2\n10,3,4\n").unwrap();

    let source = FileDataSource::new(dir.clone());
    let picked = source.fetch("walk", &[2]).unwrap();
    assert_eq!(picked.names, vec!["accY"]);
    assert_eq!(picked.channels, vec![vec![2.0, 4.0]]);

    assert!(matches!(
        source.fetch("walk", &[7]),
        Err(DecodeError::MissingChannel(7))
    ));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_dataset() {
    let dir = scratch_dir("sensorlabel-datasets");
    let source = FileDataSource::new(dir.clone());
    assert!(source.locate("nothing").is_none());
    assert!(matches!(
        source.fetch("nothing", &[]),
        Err(DecodeError::NotFound(name)) if name == "nothing"
    ));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_file_surfaces_decode_error() {
    let dir = scratch_dir("sensorlabel-datasets");
    fs::write(dir.join("broken.json"), "[[1, 2], [3").unwrap();
    let source = FileDataSource::new(dir.clone());
    assert!(matches!(
        source.fetch("broken", &[]),
        Err(DecodeError::Json(_))
    ));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_load_and_downsample_for_plot() {
    let dir = scratch_dir("sensorlabel-datasets");
    let values = accelerometer(10_000);
    let tensor = serde_json::to_string(&vec![values.clone()]).unwrap();
    fs::write(dir.join("subject01.json"), tensor).unwrap();

    let decoded = FileDataSource::new(dir.clone()).fetch("subject01", &[0]).unwrap();
    let points = points_from_values(&decoded.channels[0]);
    let view = TimeScale::new((0.0, 10_000.0), (0.0, 100.0));
    let plotted = Downsampler::default().apply(&points, &view);

    assert_eq!(plotted.len(), 200);
    assert_eq!(plotted[0].value, decoded.channels[0][0]);
    assert!((plotted[0].value - values[0]).abs() < 1e-12);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_energy_from_decoded_dataset() {
    let dir = scratch_dir("sensorlabel-datasets");
    fs::write(dir.join("energy.csv"), "x,y\n1,2\n3,4\n5,6\n").unwrap();

    let decoded = FileDataSource::new(dir.clone()).fetch("energy", &[]).unwrap();
    let mut agg = EnergyAggregator::new();
    agg.insert(
        "energy",
        EnergySource::from_values(decoded.names.clone(), &decoded.channels),
    );
    agg.select("energy").unwrap();

    let summed: Vec<f64> = agg.summed().unwrap().iter().map(|p| p.value).collect();
    assert_eq!(summed, vec![3.0, 7.0, 11.0]);
    assert_eq!(agg.stacked().unwrap()[1].values["y"], 4.0);

    let _ = fs::remove_dir_all(&dir);
}
