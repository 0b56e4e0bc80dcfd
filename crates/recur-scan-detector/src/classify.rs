//! Position-aware classification and selection of candidate runs.

use recur_scan_types::{Boundary, Interval};

use crate::config::DetectorConfig;

/// Classifies, filters, and converts candidate runs (sampled-frame index
/// space, inclusive bounds) into second-space intervals.
///
/// A run must exceed the minimum detection size and sit at one of the
/// episode's boundaries to survive; runs satisfying both classifications are
/// treated as beginnings. Output lists the up-to-two longest beginning
/// candidates first, then every qualifying end candidate in encounter order.
pub(crate) fn select_intervals(
    runs: &[(usize, usize)],
    signal_len: usize,
    frame_rate: f64,
    config: &DetectorConfig,
) -> Vec<Interval> {
    let fps = config.sampled_fps(frame_rate);
    if fps <= 0.0 || signal_len == 0 {
        return Vec::new();
    }

    let min_frames = config.min_detection_size_seconds * fps;
    let start_cutoff = signal_len as f64 * (config.video_start_threshold_percentile / 100.0);
    let end_cutoff = signal_len as f64 - config.video_end_threshold_seconds * fps;

    let mut beginnings = Vec::new();
    let mut ends = Vec::new();
    for &(start, end) in runs {
        if (end - start) as f64 <= min_frames {
            continue;
        }
        let boundary = match ((end as f64) < start_cutoff, end as f64 > end_cutoff) {
            (true, _) => Boundary::Beginning,
            (false, true) => Boundary::End,
            (false, false) => continue,
        };
        let interval = match Interval::new(start as f64 / fps, end as f64 / fps) {
            Ok(interval) => interval,
            Err(_) => continue,
        };
        match boundary {
            Boundary::Beginning => beginnings.push(interval),
            Boundary::End => ends.push(interval),
        }
    }

    let mut selected = two_longest(beginnings);
    selected.extend(ends);
    selected
}

/// Keeps the two longest intervals. Three or more candidates are reordered
/// longest-first (stable, so equal durations keep encounter order); two or
/// fewer pass through untouched.
fn two_longest(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if intervals.len() <= 2 {
        return intervals;
    }
    intervals.sort_by(|a, b| b.duration().total_cmp(&a.duration()));
    intervals.truncate(2);
    intervals
}
