//! Ground-truth annotation loading.
//!
//! Annotations live in a CSV with one row per video file and `hh:mm:ss`
//! start/end columns per segment kind; an empty cell means the episode has
//! no such segment. Adjacent labeled intervals less than two seconds apart
//! are merged, since a recap flowing straight into opening credits is one
//! recurring block as far as detection is concerned.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use recur_scan_detector::evaluate::merge_adjacent;
use recur_scan_detector::GroundTruthSet;
use recur_scan_types::{Interval, ScanError, ScanResult};

const FILENAME_COLUMN: &str = "filename";
const SEGMENT_COLUMNS: [(&str, &str); 4] = [
    ("recap_start", "recap_end"),
    ("openingcredits_start", "openingcredits_end"),
    ("preview_start", "preview_end"),
    ("closingcredits_start", "closingcredits_end"),
];
const MERGE_GAP_SECS: f64 = 2.0;

pub fn load_annotations(path: &Path) -> ScanResult<GroundTruthSet> {
    let contents = fs::read_to_string(path).map_err(|source| {
        ScanError::invalid_data(format!(
            "cannot read annotations {}: {source}",
            path.display()
        ))
    })?;
    parse_annotations(&contents)
}

fn parse_annotations(contents: &str) -> ScanResult<GroundTruthSet> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| ScanError::invalid_data("annotations file is empty"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let filename_idx = column_index(&columns, FILENAME_COLUMN)?;
    let mut segment_indices = Vec::with_capacity(SEGMENT_COLUMNS.len());
    for (start, end) in SEGMENT_COLUMNS {
        segment_indices.push((column_index(&columns, start)?, column_index(&columns, end)?));
    }

    let mut ground_truth: GroundTruthSet = HashMap::new();
    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let filename = fields.get(filename_idx).copied().unwrap_or_default();
        if filename.is_empty() {
            continue;
        }
        let mut intervals = Vec::new();
        for &(start_idx, end_idx) in &segment_indices {
            let start = parse_time(fields.get(start_idx).copied().unwrap_or_default());
            let end = parse_time(fields.get(end_idx).copied().unwrap_or_default());
            match (start, end) {
                (Some(start), Some(end)) => {
                    intervals.push(Interval::new(start, end).map_err(|_| {
                        ScanError::invalid_data(format!(
                            "annotations row {}: segment ends before it starts ({start}, {end})",
                            row + 2
                        ))
                    })?);
                }
                (None, None) => {}
                _ => {
                    return Err(ScanError::invalid_data(format!(
                        "annotations row {}: segment is missing one of its bounds",
                        row + 2
                    )));
                }
            }
        }
        ground_truth.insert(
            filename.to_string(),
            merge_adjacent(&intervals, MERGE_GAP_SECS),
        );
    }
    Ok(ground_truth)
}

fn column_index(columns: &[&str], name: &str) -> ScanResult<usize> {
    columns.iter().position(|&c| c == name).ok_or_else(|| {
        ScanError::invalid_data(format!("annotations file is missing the '{name}' column"))
    })
}

/// `hh:mm:ss` (seconds may carry a fraction, which is truncated) to total
/// seconds. Empty cells and the `-1` sentinel mean "no segment".
fn parse_time(value: &str) -> Option<f64> {
    if value.is_empty() || value == "-1" {
        return None;
    }
    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse::<u32>().ok()? as f64;
    let minutes: f64 = parts.next()?.parse::<u32>().ok()? as f64;
    let seconds = parts.next()?.parse::<f64>().ok()?.trunc();
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
