use super::*;
use crate::bridge::format::{RunManifest, MANIFEST_FILE_NAME};
use crate::config::{ExportConfig, InputConfig};
use crate::error::{ErrorKind, PipelineError};
use crate::kernels::split_segments;
use crate::types::{Sample, Segment};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::path::Path;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_opt(23, 58, 0)
        .unwrap()
}

/// Builds segments from `(minute offset, value, interpolated)` triples.
fn build_segments(points: &[(i64, f64, bool)]) -> Vec<Segment> {
    let series = points
        .iter()
        .map(|&(minute, value, interpolated)| {
            let ts = t0() + TimeDelta::minutes(minute);
            if interpolated {
                Sample::interpolated(ts, value)
            } else {
                Sample::original(ts, value)
            }
        })
        .collect();
    split_segments(series, TimeDelta::minutes(1), Default::default())
}

/// Reads an artifact back as `(header, rows)` with each row split into fields.
fn read_artifact(path: &Path) -> (String, Vec<Vec<String>>) {
    let text = std::fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap().to_string();
    let rows = lines
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect();
    (header, rows)
}

#[test]
fn test_reader_and_normalizer_produce_an_ordered_series() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("station.txt");
    std::fs::write(
        &input,
        "2024-02-29 23:59:00\t0.82\n2024-02-29 23:58:00\t0.80\n\n2024-03-01 00:00:00\t0.85\n",
    )
    .unwrap();

    let records = read_records(&input, &InputConfig::default()).unwrap();
    assert_eq!(records.len(), 3);

    let normalized = normalize_records(records).unwrap();
    assert!(normalized.reordered);
    assert_eq!(normalized.duplicates_dropped, 0);
    let offsets: Vec<i64> = normalized
        .series
        .iter()
        .map(|s| (s.timestamp - t0()).num_minutes())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2]);
}

#[test]
fn test_exporter_writes_header_and_rows_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = SegmentExporter::create(dir.path(), &ExportConfig::default()).unwrap();
    let segments = build_segments(&[(0, 1.0, false), (1, 1.5, true), (2, 2.0, false)]);
    assert_eq!(segments.len(), 1);

    let exported = exporter.write_segment(&segments[0]).unwrap();
    assert_eq!(exported.index, 1);
    assert_eq!(exported.rows, 3);
    assert_eq!(exported.interpolated_rows, 1);
    assert_eq!(exported.file_name(), "segment_1.csv");
    assert_eq!(exported.start, t0());
    assert_eq!(exported.end, t0() + TimeDelta::minutes(2));

    let (header, rows) = read_artifact(&exported.path);
    assert_eq!(header, "timestamp,value,status");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "2024-02-29 23:58:00");
    assert_eq!(rows[2][0], "2024-03-01 00:00:00");
    let values: Vec<f64> = rows.iter().map(|r| r[1].parse().unwrap()).collect();
    assert_eq!(values, vec![1.0, 1.5, 2.0]);
    let statuses: Vec<&str> = rows.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(statuses, vec!["OK", "Interpolated", "OK"]);
}

#[test]
fn test_exporter_names_artifacts_by_segment_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        file_prefix: "station42".to_string(),
        ..ExportConfig::default()
    };
    let exporter = SegmentExporter::create(dir.path(), &config).unwrap();
    let segments = build_segments(&[(0, 1.0, false), (10, 2.0, false), (20, 3.0, false)]);
    assert_eq!(segments.len(), 3);

    for segment in &segments {
        let exported = exporter.write_segment(segment).unwrap();
        assert_eq!(exported.file_name(), format!("station42_{}.csv", segment.index()));
        assert!(exported.path.exists());
    }
}

#[test]
fn test_exporter_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("2024");
    let exporter = SegmentExporter::create(&nested, &ExportConfig::default()).unwrap();
    assert!(nested.is_dir());
    assert_eq!(exporter.output_dir(), nested.as_path());
}

#[test]
fn test_directory_creation_failure_is_an_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "occupied").unwrap();

    let err = SegmentExporter::create(&blocker.join("segments"), &ExportConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::OutputWrite(_)));
    assert_eq!(err.kind(), ErrorKind::OutputWrite);
}

#[test]
fn test_custom_timestamp_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        timestamp_format: "%d/%m/%Y %H:%M".to_string(),
        ..ExportConfig::default()
    };
    let exporter = SegmentExporter::create(dir.path(), &config).unwrap();
    let segments = build_segments(&[(0, 0.5, false)]);
    let exported = exporter.write_segment(&segments[0]).unwrap();

    let (_, rows) = read_artifact(&exported.path);
    assert_eq!(rows[0][0], "29/02/2024 23:58");
}

#[test]
fn test_manifest_lists_every_segment() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = SegmentExporter::create(dir.path(), &ExportConfig::default()).unwrap();
    let segments = build_segments(&[(0, 1.0, false), (1, 1.1, true), (5, 2.0, false)]);
    let exported: Vec<ExportedSegment> = segments
        .iter()
        .map(|s| exporter.write_segment(s).unwrap())
        .collect();

    let path = exporter
        .write_manifest(Path::new("station.txt"), 2, 1, 60, &exported)
        .unwrap();
    assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));

    let manifest: RunManifest =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(manifest.input_rows, 2);
    assert_eq!(manifest.rows_interpolated, 1);
    assert_eq!(manifest.segments.len(), 2);
    assert_eq!(manifest.segments[0].rows, 2);
    assert_eq!(manifest.segments[0].interpolated_rows, 1);
    assert_eq!(manifest.segments[1].file_name, "segment_2.csv");
}

#[test]
fn test_invalid_export_config_is_rejected_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("never_created");
    let config = ExportConfig {
        file_prefix: String::new(),
        ..ExportConfig::default()
    };
    let err = SegmentExporter::create(&target, &config).err().unwrap();
    assert!(matches!(err, PipelineError::InvalidConfig(_)));
    assert!(!target.exists());
}
