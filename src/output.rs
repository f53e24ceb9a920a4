//! Where recordings are written.

use crate::profile::OutputFormat;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "Peekaboo";

/// `~/Videos/Peekaboo` (or the platform's videos folder).
pub fn default_output_dir() -> Result<PathBuf> {
    output_dir_in(dirs::video_dir(), dirs::home_dir())
}

fn output_dir_in(video_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Result<PathBuf> {
    let videos = match video_dir {
        Some(dir) => dir,
        None => home_dir
            .context("Could not determine home directory")?
            .join("Videos"),
    };
    Ok(videos.join(APP_DIR_NAME))
}

/// `recording-2024-05-01T10-20-30-123Z.mp4`
pub fn recording_file_name(format: OutputFormat, at: DateTime<Utc>) -> String {
    let timestamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("recording-{}.{}", timestamp, format.extension())
}

/// Creates `dir` if needed and returns a fresh timestamped path inside it.
pub fn default_output_path(dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    Ok(dir.join(recording_file_name(format, Utc::now())))
}

/// Path of the MP4 a GIF session records into before conversion.
pub fn intermediate_path(output: &Path) -> PathBuf {
    output.with_extension("tmp.mp4")
}
