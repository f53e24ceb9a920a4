//! Second encoder pass turning the intermediate MP4 into a palette-optimised GIF.

use crate::capture::EncoderCommand;
use crate::error::{RecorderError, Result};
use crate::process;
use std::path::Path;
use std::time::Duration;

/// Resample to 30 fps, keep the size (Lanczos), then build a palette from frame
/// differences and apply it.
pub const PALETTE_FILTER: &str =
    "fps=30,scale=-1:-1:flags=lanczos,split[s0][s1];[s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse";

pub fn conversion_command(encoder: &Path, input: &Path, output: &Path) -> EncoderCommand {
    EncoderCommand {
        program: encoder.to_path_buf(),
        args: vec![
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vf".to_string(),
            PALETTE_FILTER.to_string(),
            "-y".to_string(),
            output.to_string_lossy().into_owned(),
        ],
    }
}

/// Runs the conversion and waits for it, killing the encoder if `timeout` elapses.
pub async fn convert(
    encoder: &Path,
    input: &Path,
    output: &Path,
    timeout: Option<Duration>,
) -> Result<()> {
    log::info!("Converting {} to GIF...", input.display());

    let command = conversion_command(encoder, input, output);
    let mut child = process::spawn_encoder(&command, "gif")
        .map_err(|e| RecorderError::ConversionFailure(e.to_string()))?;

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                log::warn!("GIF conversion exceeded {:?}, killing ffmpeg", limit);
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill GIF conversion: {}", e);
                }
                return Err(RecorderError::ConversionFailure(format!(
                    "timed out after {:?}",
                    limit
                )));
            }
        },
        None => child.wait().await,
    }
    .map_err(|e| RecorderError::ConversionFailure(format!("failed to wait for ffmpeg: {}", e)))?;

    log::info!("GIF conversion exited with {}", status);
    if status.success() {
        Ok(())
    } else {
        Err(RecorderError::ConversionFailure(format!(
            "ffmpeg exited with code {}",
            status.code().unwrap_or(-1)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_command() {
        let cmd = conversion_command(
            Path::new("/usr/bin/ffmpeg"),
            Path::new("/tmp/a.tmp.mp4"),
            Path::new("/tmp/a.gif"),
        );
        assert_eq!(
            cmd.args,
            vec!["-i", "/tmp/a.tmp.mp4", "-vf", PALETTE_FILTER, "-y", "/tmp/a.gif"]
        );
    }

    #[test]
    fn test_palette_filter_shape() {
        assert!(PALETTE_FILTER.starts_with("fps=30,"));
        assert!(PALETTE_FILTER.contains("flags=lanczos"));
        assert!(PALETTE_FILTER.contains("palettegen=stats_mode=diff"));
        assert!(PALETTE_FILTER.ends_with("paletteuse"));
    }

    #[tokio::test]
    async fn test_missing_encoder_is_conversion_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let err = convert(
            Path::new("/nonexistent/ffmpeg"),
            &tmp.path().join("in.mp4"),
            &tmp.path().join("out.gif"),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecorderError::ConversionFailure(_)));
    }
}
