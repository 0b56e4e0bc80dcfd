//! Per-episode distance signals against a cross-episode reference pool.

use recur_scan_index::FlatL2Index;
use recur_scan_types::{EpisodeVectors, ScanError, ScanResult};

/// One squared-L2 distance per sampled frame: each episode's vectors are
/// queried against every *other* episode's vectors (self-matches would make
/// the "recurs elsewhere" signal trivially zero, so an episode's own rows
/// never enter its reference set).
///
/// Fails fast on dimension mismatches: the whole corpus shares one reference
/// pool, so no partial result survives a bad episode.
pub(crate) fn build_distance_signals(
    episodes: &[(String, EpisodeVectors)],
) -> ScanResult<Vec<Vec<f32>>> {
    if episodes.len() < 2 {
        return Err(ScanError::configuration(
            "recurring-content detection needs at least two episodes",
        ));
    }

    let expected = episodes[0].1.dim();
    for (episode, vectors) in episodes {
        if vectors.dim() != expected {
            return Err(ScanError::DimensionMismatch {
                episode: episode.clone(),
                expected,
                actual: vectors.dim(),
            });
        }
        if vectors.is_empty() {
            return Err(ScanError::invalid_data(format!(
                "episode {episode} has no feature vectors"
            )));
        }
    }

    let mut signals = Vec::with_capacity(episodes.len());
    for (i, (_, query)) in episodes.iter().enumerate() {
        let mut index = FlatL2Index::new(expected);
        for (j, (_, reference)) in episodes.iter().enumerate() {
            if j != i {
                index.add_vectors(reference)?;
            }
        }
        signals.push(index.search(query)?);
    }
    Ok(signals)
}
