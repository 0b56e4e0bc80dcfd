//! Shared domain models for the recur-scan workspace.
//!
//! This crate centralizes lightweight data structures used across the index,
//! detector, and CLI crates. Keep it dependency-light so every crate can pull
//! it in without dragging along the search or serialization machinery.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ScanResult<T> = Result<T, ScanError>;

/// Feature vectors for one episode: a row-major f32 matrix where each row is
/// one sampled frame, ordered by frame index at a fixed sampling stride.
#[derive(Clone, Debug)]
pub struct EpisodeVectors {
    dim: usize,
    rows: usize,
    data: Arc<[f32]>,
}

impl EpisodeVectors {
    pub fn from_owned(dim: usize, data: Vec<f32>) -> ScanResult<Self> {
        if dim == 0 {
            return Err(ScanError::InvalidData {
                reason: "feature vector dimension must be non-zero".into(),
            });
        }
        if data.len() % dim != 0 {
            return Err(ScanError::InvalidData {
                reason: format!(
                    "vector data length {} is not a multiple of dimension {}",
                    data.len(),
                    dim
                ),
            });
        }
        let rows = data.len() / dim;
        Ok(Self {
            dim,
            rows,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of sampled frames (matrix rows).
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let offset = index * self.dim;
        &self.data[offset..offset + self.dim]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A detected or annotated stretch of an episode, in seconds, closed at both
/// ends. Detection and evaluation both use this representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    start: f64,
    end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> ScanResult<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(ScanError::InvalidData {
                reason: format!("invalid interval ({start}, {end})"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Seconds shared by two intervals; zero when they are disjoint.
    pub fn overlap(&self, other: &Interval) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

/// Position class of a detected interval within its episode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Beginning,
    End,
}

#[derive(Clone, Debug, Serialize)]
pub struct EpisodeDetection {
    pub episode: String,
    pub intervals: Vec<Interval>,
}

/// Running second-level totals accumulated across a corpus evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreTotals {
    pub relevant_secs: f64,
    pub detected_secs: f64,
    pub relevant_detected_secs: f64,
}

impl ScoreTotals {
    pub fn accumulate(&mut self, other: ScoreTotals) {
        self.relevant_secs += other.relevant_secs;
        self.detected_secs += other.detected_secs;
        self.relevant_detected_secs += other.relevant_detected_secs;
    }
}

/// Corpus-level precision/recall. `None` means the ratio is undefined
/// because its denominator is zero, never NaN and never a silent zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CorpusScores {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
}

impl CorpusScores {
    pub fn from_totals(totals: &ScoreTotals) -> Self {
        let precision = (totals.detected_secs > 0.0)
            .then(|| totals.relevant_detected_secs / totals.detected_secs);
        let recall = (totals.relevant_secs > 0.0)
            .then(|| totals.relevant_detected_secs / totals.relevant_secs);
        Self { precision, recall }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DetectionReport {
    pub detections: Vec<EpisodeDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<CorpusScores>,
}

impl DetectionReport {
    pub fn intervals_for(&self, episode: &str) -> Option<&[Interval]> {
        self.detections
            .iter()
            .find(|d| d.episode == episode)
            .map(|d| d.intervals.as_slice())
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("missing feature vectors for {episode} at {path}: {source}")]
    MissingVectors {
        episode: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("dimension mismatch for {episode}: expected {expected}, got {actual}")]
    DimensionMismatch {
        episode: String,
        expected: usize,
        actual: usize,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid data: {reason}")]
    InvalidData { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }

    pub fn missing_vectors(
        episode: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::MissingVectors {
            episode: episode.into(),
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_vectors_rejects_ragged_data() {
        assert!(EpisodeVectors::from_owned(3, vec![0.0; 7]).is_err());
        let vectors = EpisodeVectors::from_owned(3, vec![0.0; 9]).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors.dim(), 3);
        assert_eq!(vectors.row(2), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn interval_rejects_reversed_bounds() {
        assert!(Interval::new(5.0, 4.0).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
        assert!(Interval::new(4.0, 4.0).is_ok());
    }

    #[test]
    fn overlap_is_never_negative() {
        let a = Interval::new(0.0, 10.0).unwrap();
        let b = Interval::new(20.0, 30.0).unwrap();
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(b.overlap(&a), 0.0);

        let c = Interval::new(5.0, 25.0).unwrap();
        assert_eq!(a.overlap(&c), 5.0);
        assert_eq!(c.overlap(&b), 5.0);
        assert_eq!(a.overlap(&a), 10.0);
    }

    #[test]
    fn scores_are_undefined_on_zero_denominators() {
        let scores = CorpusScores::from_totals(&ScoreTotals::default());
        assert_eq!(scores.precision, None);
        assert_eq!(scores.recall, None);

        let scores = CorpusScores::from_totals(&ScoreTotals {
            relevant_secs: 10.0,
            detected_secs: 5.0,
            relevant_detected_secs: 5.0,
        });
        assert_eq!(scores.precision, Some(1.0));
        assert_eq!(scores.recall, Some(0.5));
    }
}
