//! Interval-overlap scoring of detections against ground truth.

use recur_scan_types::{Interval, ScoreTotals};

/// Seconds a detected boundary may sit from a ground-truth boundary and
/// still be snapped onto it, absorbing sampling-stride rounding.
const SNAP_TOLERANCE_SECS: f64 = 2.0;

pub fn total_seconds(intervals: &[Interval]) -> f64 {
    intervals.iter().map(Interval::duration).sum()
}

/// Second-level totals for one episode.
///
/// Overlap is accumulated over *every* ground-truth x detected pair, with
/// detected boundaries snapped to ground-truth boundaries within the
/// tolerance first. Two detections overlapping the same ground-truth
/// interval both count; this mirrors the reference scorer exactly and is a
/// known-generous accounting, not a bug.
pub fn score_episode(detected: &[Interval], ground_truth: &[Interval]) -> ScoreTotals {
    let mut relevant_detected_secs = 0.0;
    for truth in ground_truth {
        for detection in detected {
            let mut start_d = detection.start();
            let mut end_d = detection.end();
            if (truth.start() - start_d).abs() < SNAP_TOLERANCE_SECS {
                start_d = truth.start();
            }
            if (truth.end() - end_d).abs() < SNAP_TOLERANCE_SECS {
                end_d = truth.end();
            }
            relevant_detected_secs +=
                (truth.end().min(end_d) - truth.start().max(start_d)).max(0.0);
        }
    }
    ScoreTotals {
        relevant_secs: total_seconds(ground_truth),
        detected_secs: total_seconds(detected),
        relevant_detected_secs,
    }
}

/// Merges neighboring intervals whose gap is below `max_gap` seconds.
/// Merging is pairwise over the (start-ordered) input: a merged pair does
/// not chain into the interval after it.
pub fn merge_adjacent(intervals: &[Interval], max_gap: f64) -> Vec<Interval> {
    let mut result = Vec::with_capacity(intervals.len());
    let mut i = 0;
    while i < intervals.len() {
        let current = intervals[i];
        if let Some(next) = intervals.get(i + 1) {
            if (current.end() - next.start()).abs() < max_gap {
                if let Ok(merged) = Interval::new(current.start(), next.end()) {
                    result.push(merged);
                    i += 2;
                    continue;
                }
            }
        }
        result.push(current);
        i += 1;
    }
    result
}
