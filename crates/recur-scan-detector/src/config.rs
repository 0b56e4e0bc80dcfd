use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use recur_scan_types::{ScanError, ScanResult};

/// Tag identifying which feature-vector method produced the persisted
/// vectors. The detector never interprets it; it only travels with the
/// configuration so reports record what they were computed from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Color histogram.
    #[default]
    #[serde(rename = "CH")]
    Ch,
    /// Color and texture moments.
    #[serde(rename = "CTM")]
    Ctm,
    /// Learned CNN embedding.
    #[serde(rename = "CNN")]
    Cnn,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Ch => "CH",
            FeatureKind::Ctm => "CTM",
            FeatureKind::Cnn => "CNN",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "CH" => Ok(FeatureKind::Ch),
            "CTM" => Ok(FeatureKind::Ctm),
            "CNN" => Ok(FeatureKind::Cnn),
            other => Err(ScanError::configuration(format!(
                "unknown feature vector kind '{other}', expected CH, CTM, or CNN"
            ))),
        }
    }
}

/// Tunables for the detection pipeline. Validated once before any
/// per-episode work starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub feature_kind: FeatureKind,
    /// Sampling stride in frames; only every `framejump`-th frame has a
    /// feature vector.
    pub framejump: u32,
    /// Percentile of an episode's distance signal used as its match
    /// threshold.
    pub percentile: f64,
    /// A candidate counts as "beginning" when it ends within this percentage
    /// of the episode's sampled frames from the start.
    pub video_start_threshold_percentile: f64,
    /// A candidate counts as "end" when it ends within this many seconds of
    /// the episode's last sampled frame.
    pub video_end_threshold_seconds: f64,
    /// Candidates shorter than this are discarded.
    pub min_detection_size_seconds: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            feature_kind: FeatureKind::Ch,
            framejump: 3,
            percentile: 10.0,
            video_start_threshold_percentile: 20.0,
            video_end_threshold_seconds: 15.0,
            min_detection_size_seconds: 15.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> ScanResult<()> {
        if self.framejump < 1 {
            return Err(ScanError::configuration("framejump must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(ScanError::configuration(format!(
                "percentile must be within 0-100, got {}",
                self.percentile
            )));
        }
        if !(0.0..=100.0).contains(&self.video_start_threshold_percentile) {
            return Err(ScanError::configuration(format!(
                "video_start_threshold_percentile must be within 0-100, got {}",
                self.video_start_threshold_percentile
            )));
        }
        if !self.video_end_threshold_seconds.is_finite() || self.video_end_threshold_seconds <= 0.0
        {
            return Err(ScanError::configuration(format!(
                "video_end_threshold_seconds must be positive, got {}",
                self.video_end_threshold_seconds
            )));
        }
        if !self.min_detection_size_seconds.is_finite() || self.min_detection_size_seconds <= 0.0 {
            return Err(ScanError::configuration(format!(
                "min_detection_size_seconds must be positive, got {}",
                self.min_detection_size_seconds
            )));
        }
        Ok(())
    }

    /// Sampled frames per second given the source frame rate: frame indices
    /// divide by this to become wall-clock seconds.
    pub fn sampled_fps(&self, frame_rate: f64) -> f64 {
        frame_rate / self.framejump as f64
    }

    /// Gap-filling lookahead window: ten seconds worth of sampled frames.
    pub fn gap_lookahead(&self, frame_rate: f64) -> usize {
        (self.sampled_fps(frame_rate) * 10.0) as usize
    }
}
