//! Cross-episode recurring-content detection.
//!
//! Episodic video shares non-unique material (recaps, opening/closing
//! credits, previews). Given per-frame feature vectors for every episode of
//! a corpus, this crate flags frames that closely match frames in *other*
//! episodes, stitches them into temporally coherent intervals at the
//! episode's boundaries, and optionally scores the result against
//! human-labeled ground truth.

use std::collections::HashMap;

mod classify;
mod config;
pub mod evaluate;
mod segment;
mod signal;

pub use config::{DetectorConfig, FeatureKind};
use recur_scan_types::{
    CorpusScores, DetectionReport, EpisodeDetection, EpisodeVectors, Interval, ScanResult,
    ScoreTotals,
};


/// Labeled ground-truth intervals per episode, in seconds.
pub type GroundTruthSet = HashMap<String, Vec<Interval>>;

/// Everything the detector needs to know about one episode.
#[derive(Debug)]
pub struct EpisodeData {
    pub vectors: EpisodeVectors,
    /// Source frame rate in frames per second, before sampling.
    pub frame_rate: f64,
}

/// Seam to whatever persists the extraction collaborator's output.
pub trait EpisodeSource {
    fn load(&self, episode: &str) -> ScanResult<EpisodeData>;
}

#[derive(Debug)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs the full pipeline over `episodes`, strictly in the given order.
    /// Episodes that yield no qualifying interval simply report an empty
    /// list; loading and dimensionality failures abort the whole run.
    pub fn detect(
        &self,
        episodes: &[String],
        source: &dyn EpisodeSource,
    ) -> ScanResult<DetectionReport> {
        self.run(episodes, source, None)
    }

    /// Like [`detect`](Self::detect), additionally accumulating
    /// precision/recall totals against `ground_truth`. Episodes absent from
    /// the ground truth contribute detected seconds only.
    pub fn detect_scored(
        &self,
        episodes: &[String],
        source: &dyn EpisodeSource,
        ground_truth: &GroundTruthSet,
    ) -> ScanResult<DetectionReport> {
        self.run(episodes, source, Some(ground_truth))
    }

    fn run(
        &self,
        episodes: &[String],
        source: &dyn EpisodeSource,
        ground_truth: Option<&GroundTruthSet>,
    ) -> ScanResult<DetectionReport> {
        let mut loaded = Vec::with_capacity(episodes.len());
        let mut frame_rates = Vec::with_capacity(episodes.len());
        for episode in episodes {
            let data = source.load(episode)?;
            loaded.push((episode.clone(), data.vectors));
            frame_rates.push(data.frame_rate);
        }

        let signals = signal::build_distance_signals(&loaded)?;

        let mut totals = ScoreTotals::default();
        let mut detections = Vec::with_capacity(episodes.len());
        for ((episode, _), (signal, frame_rate)) in
            loaded.into_iter().zip(signals.into_iter().zip(frame_rates))
        {
            let intervals = self.detect_episode(&signal, frame_rate);
            if let Some(truth) = ground_truth {
                let labeled = truth.get(&episode).map(Vec::as_slice).unwrap_or(&[]);
                totals.accumulate(evaluate::score_episode(&intervals, labeled));
            }
            detections.push(EpisodeDetection { episode, intervals });
        }

        let scores = ground_truth.map(|_| CorpusScores::from_totals(&totals));
        Ok(DetectionReport { detections, scores })
    }

    /// Distance signal -> intervals for a single episode: threshold at the
    /// episode-relative percentile, bridge short gaps, extract runs, then
    /// classify and select. Never fails; degenerate inputs yield no
    /// intervals.
    fn detect_episode(&self, signal: &[f32], frame_rate: f64) -> Vec<Interval> {
        let mut matched = segment::threshold_signal(signal, self.config.percentile);
        segment::fill_gaps(&mut matched, self.config.gap_lookahead(frame_rate));
        let runs = segment::extract_runs(&matched);
        classify::select_intervals(&runs, signal.len(), frame_rate, &self.config)
    }
}
