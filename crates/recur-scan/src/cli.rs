use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

use recur_scan_detector::FeatureKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FeatureArg {
    Ch,
    Ctm,
    Cnn,
}

impl From<FeatureArg> for FeatureKind {
    fn from(value: FeatureArg) -> Self {
        match value {
            FeatureArg::Ch => FeatureKind::Ch,
            FeatureArg::Ctm => FeatureKind::Ctm,
            FeatureArg::Cnn => FeatureKind::Cnn,
        }
    }
}

/// Which detection knobs were given on the command line, so the config file
/// only fills in the ones that were not.
#[derive(Debug, Default)]
pub struct CliSources {
    pub feature_from_cli: bool,
    pub framejump_from_cli: bool,
    pub percentile_from_cli: bool,
    pub start_threshold_from_cli: bool,
    pub end_threshold_from_cli: bool,
    pub min_detection_size_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            feature_from_cli: value_from_cli(matches, "feature"),
            framejump_from_cli: value_from_cli(matches, "framejump"),
            percentile_from_cli: value_from_cli(matches, "percentile"),
            start_threshold_from_cli: value_from_cli(matches, "video_start_threshold_percentile"),
            end_threshold_from_cli: value_from_cli(matches, "video_end_threshold_seconds"),
            min_detection_size_from_cli: value_from_cli(matches, "min_detection_size_seconds"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "recur-scan",
    about = "Detect recaps, credits, and previews shared across episodes",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Feature vector type the persisted vectors were extracted with
    #[arg(long = "feature", id = "feature", value_enum, default_value_t = FeatureArg::Ch)]
    pub feature: FeatureArg,

    /// Sampling stride in frames used during feature extraction
    #[arg(
        long = "framejump",
        id = "framejump",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub framejump: u32,

    /// Distance-signal percentile used as the match threshold
    #[arg(long = "percentile", id = "percentile", default_value_t = 10.0)]
    pub percentile: f64,

    /// Percentage of the episode still counting as "the beginning"
    #[arg(
        long = "video-start-threshold-percentile",
        id = "video_start_threshold_percentile",
        default_value_t = 20.0
    )]
    pub video_start_threshold_percentile: f64,

    /// Seconds from the episode's end still counting as "the end"
    #[arg(
        long = "video-end-threshold-seconds",
        id = "video_end_threshold_seconds",
        default_value_t = 15.0
    )]
    pub video_end_threshold_seconds: f64,

    /// Minimum detection length in seconds
    #[arg(
        long = "min-detection-size-seconds",
        id = "min_detection_size_seconds",
        default_value_t = 15.0
    )]
    pub min_detection_size_seconds: f64,

    /// Ground-truth annotations CSV; enables precision/recall scoring
    #[arg(long = "annotations", value_name = "FILE")]
    pub annotations: Option<PathBuf>,

    /// Write the detection report as JSON
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory of per-episode feature vector files
    pub vectors_dir: PathBuf,
}
