//! Temporal segmentation: turn a per-frame distance signal into candidate
//! runs of matched frames.

/// Linear-interpolation percentile over an unsorted slice, `p` in 0-100.
/// Returns `None` for an empty slice.
pub(crate) fn percentile_of(values: &[f32], p: f64) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = (rank - lo as f64) as f32;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Marks frames whose distance lies strictly below the episode-relative
/// percentile threshold.
pub(crate) fn threshold_signal(signal: &[f32], percentile: f64) -> Vec<bool> {
    match percentile_of(signal, percentile) {
        Some(threshold) => signal.iter().map(|&v| v < threshold).collect(),
        None => Vec::new(),
    }
}

/// Bridges short unmatched stretches between matched frames, in place.
///
/// One forward pass: a countdown resets to `lookahead` on every matched
/// frame; unmatched frame indices seen while the countdown is live are
/// buffered, committed to `true` if another matched frame arrives before the
/// countdown expires, and discarded otherwise. Gaps of `lookahead` frames or
/// more are never bridged.
pub(crate) fn fill_gaps(signal: &mut [bool], lookahead: usize) {
    let mut pending: Vec<usize> = Vec::new();
    let mut look_left = 0usize;
    for i in 0..signal.len() {
        if signal[i] {
            if look_left > 0 {
                for &k in &pending {
                    signal[k] = true;
                }
            }
            pending.clear();
            look_left = lookahead;
        } else if look_left > 0 {
            look_left -= 1;
            if look_left == 0 {
                pending.clear();
            } else {
                pending.push(i);
            }
        }
    }
}

/// Maximal runs of consecutive `true` frames as inclusive
/// `(first_index, last_index)` pairs.
pub(crate) fn extract_runs(signal: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &matched) in signal.iter().enumerate() {
        match (matched, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, signal.len() - 1));
    }
    runs
}
