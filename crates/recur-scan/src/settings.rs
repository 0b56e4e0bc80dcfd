use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use recur_scan_detector::{DetectorConfig, FeatureKind};
use recur_scan_types::{ScanError, ScanResult};

use crate::cli::{CliArgs, CliSources};

const DEFAULT_CONFIG_FILE: &str = "recur-scan.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    feature: Option<String>,
    framejump: Option<u32>,
    percentile: Option<f64>,
    video_start_threshold_percentile: Option<f64>,
    video_end_threshold_seconds: Option<f64>,
    min_detection_size_seconds: Option<f64>,
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub detector: DetectorConfig,
    pub vectors_dir: PathBuf,
    pub annotations: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// CLI beats config file beats defaults. An explicit `--config` path must
/// exist; the implicit `./recur-scan.toml` is optional.
pub fn resolve_settings(cli: &CliArgs, sources: &CliSources) -> ScanResult<EffectiveSettings> {
    let file = load_config(cli.config.as_deref())?;
    merge(cli, sources, file)
}

fn load_config(path_override: Option<&Path>) -> ScanResult<FileConfig> {
    let (path, required) = match path_override {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !path.exists() {
        if required {
            return Err(ScanError::configuration(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(FileConfig::default());
    }
    let contents = fs::read_to_string(&path)?;
    toml::from_str(&contents).map_err(|source| {
        ScanError::configuration(format!(
            "failed to parse config file {}: {source}",
            path.display()
        ))
    })
}

fn merge(cli: &CliArgs, sources: &CliSources, file: FileConfig) -> ScanResult<EffectiveSettings> {
    let mut detector = DetectorConfig {
        feature_kind: cli.feature.into(),
        framejump: cli.framejump,
        percentile: cli.percentile,
        video_start_threshold_percentile: cli.video_start_threshold_percentile,
        video_end_threshold_seconds: cli.video_end_threshold_seconds,
        min_detection_size_seconds: cli.min_detection_size_seconds,
    };

    if !sources.feature_from_cli {
        if let Some(value) = file.feature.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            detector.feature_kind = FeatureKind::from_str(value)?;
        }
    }
    if !sources.framejump_from_cli {
        if let Some(value) = file.framejump {
            detector.framejump = value;
        }
    }
    if !sources.percentile_from_cli {
        if let Some(value) = file.percentile {
            detector.percentile = value;
        }
    }
    if !sources.start_threshold_from_cli {
        if let Some(value) = file.video_start_threshold_percentile {
            detector.video_start_threshold_percentile = value;
        }
    }
    if !sources.end_threshold_from_cli {
        if let Some(value) = file.video_end_threshold_seconds {
            detector.video_end_threshold_seconds = value;
        }
    }
    if !sources.min_detection_size_from_cli {
        if let Some(value) = file.min_detection_size_seconds {
            detector.min_detection_size_seconds = value;
        }
    }

    detector.validate()?;

    Ok(EffectiveSettings {
        detector,
        vectors_dir: cli.vectors_dir.clone(),
        annotations: cli.annotations.clone(),
        output: cli.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn default_cli(vectors_dir: PathBuf) -> CliArgs {
        CliArgs {
            config: None,
            feature: crate::cli::FeatureArg::Ch,
            framejump: 3,
            percentile: 10.0,
            video_start_threshold_percentile: 20.0,
            video_end_threshold_seconds: 15.0,
            min_detection_size_seconds: 15.0,
            annotations: None,
            output: None,
            vectors_dir,
        }
    }

    #[test]
    fn config_file_fills_in_non_cli_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "framejump = 5\npercentile = 25.0\nfeature = \"CNN\"").unwrap();

        let mut cli = default_cli(PathBuf::from("vectors"));
        cli.config = Some(file.path().to_path_buf());
        cli.percentile = 40.0;

        let sources = CliSources {
            percentile_from_cli: true,
            ..CliSources::default()
        };
        let settings = resolve_settings(&cli, &sources).unwrap();
        assert_eq!(settings.detector.framejump, 5);
        assert_eq!(settings.detector.percentile, 40.0);
        assert_eq!(settings.detector.feature_kind, FeatureKind::Cnn);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let mut cli = default_cli(PathBuf::from("vectors"));
        cli.config = Some(PathBuf::from("/nonexistent/recur-scan.toml"));
        let err = resolve_settings(&cli, &CliSources::default()).unwrap_err();
        assert!(matches!(err, ScanError::Configuration { .. }));
    }

    #[test]
    fn merged_settings_are_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "percentile = 400.0").unwrap();
        let mut cli = default_cli(PathBuf::from("vectors"));
        cli.config = Some(file.path().to_path_buf());
        assert!(resolve_settings(&cli, &CliSources::default()).is_err());
    }

    #[test]
    fn unknown_feature_in_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "feature = \"SIFT\"").unwrap();
        let mut cli = default_cli(PathBuf::from("vectors"));
        cli.config = Some(file.path().to_path_buf());
        assert!(resolve_settings(&cli, &CliSources::default()).is_err());
    }
}
