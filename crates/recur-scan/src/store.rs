//! On-disk feature vector store.
//!
//! The extraction collaborator persists one JSON file per episode under the
//! vectors directory, carrying the probed frame rate alongside the vectors:
//!
//! ```json
//! { "frame_rate": 23.976, "dim": 144, "vectors": [[0.1, ...], ...] }
//! ```

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use recur_scan_detector::{EpisodeData, EpisodeSource};
use recur_scan_types::{EpisodeVectors, ScanError, ScanResult};

const VECTOR_FILE_EXTENSION: &str = "json";

#[derive(Debug, Deserialize)]
struct EpisodeVectorFile {
    frame_rate: f64,
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Episode identifiers (vector file stems), in natural order ignoring
    /// case, so `Episode 2` sorts before `Episode 10`.
    pub fn list_episodes(&self) -> ScanResult<Vec<String>> {
        let mut episodes = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(VECTOR_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                episodes.push(stem.to_string());
            }
        }
        episodes.sort_by(|a, b| natural_cmp(a, b));
        Ok(episodes)
    }

    fn episode_path(&self, episode: &str) -> PathBuf {
        // Not `with_extension`: episode stems may themselves contain dots.
        self.dir.join(format!("{episode}.{VECTOR_FILE_EXTENSION}"))
    }
}

impl EpisodeSource for DirectorySource {
    fn load(&self, episode: &str) -> ScanResult<EpisodeData> {
        let path = self.episode_path(episode);
        let contents = fs::read_to_string(&path)
            .map_err(|source| ScanError::missing_vectors(episode, &path, source))?;
        let file: EpisodeVectorFile = serde_json::from_str(&contents).map_err(|source| {
            ScanError::invalid_data(format!("malformed vector file {}: {source}", path.display()))
        })?;

        if !file.frame_rate.is_finite() || file.frame_rate <= 0.0 {
            return Err(ScanError::invalid_data(format!(
                "{}: frame rate must be positive, got {}",
                path.display(),
                file.frame_rate
            )));
        }
        let mut data = Vec::with_capacity(file.vectors.len() * file.dim);
        for (row, vector) in file.vectors.iter().enumerate() {
            if vector.len() != file.dim {
                return Err(ScanError::invalid_data(format!(
                    "{}: vector {row} has length {}, expected {}",
                    path.display(),
                    vector.len(),
                    file.dim
                )));
            }
            data.extend_from_slice(vector);
        }
        Ok(EpisodeData {
            vectors: EpisodeVectors::from_owned(file.dim, data)?,
            frame_rate: file.frame_rate,
        })
    }
}

/// Case-insensitive natural ordering: runs of digits compare numerically,
/// everything else byte-wise on the lowercased form.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().map(|c| c.to_ascii_lowercase()).peekable();
    let mut right = b.chars().map(|c| c.to_ascii_lowercase()).peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_number(&mut left);
                let rn = take_number(&mut right);
                match ln.cmp(&rn) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                match l.cmp(&r) {
                    Ordering::Equal => {}
                    other => return other,
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Consumes a digit run, returning (significant length, digits without
/// leading zeros) so arbitrarily long runs compare numerically.
fn take_number(chars: &mut std::iter::Peekable<impl Iterator<Item = char>>) -> (usize, String) {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    let trimmed = digits.trim_start_matches('0');
    (trimmed.len(), trimmed.to_string())
}
