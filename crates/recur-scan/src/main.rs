mod annotations;
mod cli;
mod settings;
mod store;

use std::fs;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use recur_scan_detector::{Detector, EpisodeData, EpisodeSource};
use recur_scan_types::{DetectionReport, ScanError, ScanResult};
use store::DirectorySource;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ScanError> {
    let (args, sources) = cli::parse_cli();
    let settings = settings::resolve_settings(&args, &sources)?;

    let source = DirectorySource::new(settings.vectors_dir.clone());
    let episodes = source.list_episodes()?;
    if episodes.len() < 2 {
        return Err(ScanError::configuration(format!(
            "found {} episode vector file(s) in {}; cross-episode detection needs at least two",
            episodes.len(),
            settings.vectors_dir.display(),
        )));
    }

    let ground_truth = match settings.annotations.as_deref() {
        Some(path) => Some(annotations::load_annotations(path)?),
        None => None,
    };

    let detector = Detector::new(settings.detector)?;
    println!("Detection started...");
    println!("Episodes: {}", episodes.len());
    println!("Framejump: {}", detector.config().framejump);
    println!("Feature Vector Type: {}", detector.config().feature_kind);

    let bar = ProgressBar::new(episodes.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static progress template is valid"),
    );
    bar.set_message("loading vectors");

    let progress_source = ProgressSource {
        inner: source,
        bar: bar.clone(),
    };
    let episode_list = episodes.clone();
    // The search is CPU-bound; keep it off the async runtime.
    let report = tokio::task::spawn_blocking(move || match ground_truth {
        Some(truth) => detector.detect_scored(&episode_list, &progress_source, &truth),
        None => detector.detect(&episode_list, &progress_source),
    })
    .await
    .map_err(|err| ScanError::invalid_data(format!("detection task failed: {err}")))??;
    bar.finish_and_clear();

    print_report(&report);

    if let Some(path) = settings.output.as_deref() {
        write_report(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

/// Ticks the progress bar as the detector pulls each episode's vectors.
struct ProgressSource {
    inner: DirectorySource,
    bar: ProgressBar,
}

impl EpisodeSource for ProgressSource {
    fn load(&self, episode: &str) -> ScanResult<EpisodeData> {
        let data = self.inner.load(episode)?;
        self.bar.inc(1);
        self.bar.set_message(format!("loaded {episode}"));
        Ok(data)
    }
}

fn print_report(report: &DetectionReport) {
    for detection in &report.detections {
        println!("Detection for {}", detection.episode);
        if detection.intervals.is_empty() {
            println!("  (no recurring content found)");
        }
        for interval in &detection.intervals {
            println!(
                "  {} \t - \t {}",
                to_time_string(interval.start()),
                to_time_string(interval.end())
            );
        }
    }
    if let Some(scores) = &report.scores {
        println!(
            "Precision: {} ----- Recall: {}",
            format_metric(scores.precision),
            format_metric(scores.recall)
        );
    }
}

fn write_report(path: &Path, report: &DetectionReport) -> ScanResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| ScanError::invalid_data(format!("cannot serialize report: {err}")))?;
    fs::write(path, json)?;
    Ok(())
}

fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "undefined".to_string(),
    }
}

/// `h:mm:ss` with one truncated decimal when the value is fractional.
fn to_time_string(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let whole = total.trunc() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    let tenths = (total.fract() * 10.0).trunc() as u64;
    if tenths > 0 {
        format!("{hours}:{minutes:02}:{secs:02}.{tenths}")
    } else {
        format!("{hours}:{minutes:02}:{secs:02}")
    }
}
