//! Recording session controller: owns at most one encoder process.

use crate::capture::CaptureBackend;
use crate::error::{RecorderError, Result};
use crate::gif;
use crate::output;
use crate::process;
use crate::profile::{OutputFormat, RecordingOptions};
use crate::region::CaptureRegion;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Child;

/// How long stop waits for ffmpeg to finalize before killing it.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Upper bound for the GIF conversion pass.
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

struct Session {
    child: Child,
    format: OutputFormat,
    output_path: PathBuf,
    /// Only set for GIF sessions.
    intermediate_path: Option<PathBuf>,
}

pub struct SessionController {
    backend: CaptureBackend,
    stop_timeout: Duration,
    conversion_timeout: Option<Duration>,
    session: Option<Session>,
}

impl SessionController {
    pub fn new(backend: CaptureBackend) -> Self {
        Self {
            backend,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            conversion_timeout: Some(DEFAULT_CONVERSION_TIMEOUT),
            session: None,
        }
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// `None` lets the conversion run for as long as it needs.
    pub fn with_conversion_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    /// Starts recording `region` into `output_path`.
    ///
    /// Returns as soon as the encoder has been spawned; the first frames may still be
    /// lost to ffmpeg's own startup. Must be called from within a Tokio runtime.
    pub async fn start(
        &mut self,
        region: CaptureRegion,
        options: &RecordingOptions,
        output_path: &Path,
    ) -> Result<()> {
        if self.is_active() {
            return Err(RecorderError::AlreadyRecording);
        }

        let intermediate_path = match options.format {
            OutputFormat::Gif => Some(output::intermediate_path(output_path)),
            _ => None,
        };
        let capture_path = intermediate_path.as_deref().unwrap_or(output_path);

        log::info!(
            "Starting {} recording of {}x{} at ({}, {}) @ {}fps -> {}",
            options.format,
            region.width(),
            region.height(),
            region.x(),
            region.y(),
            options.frames_per_second,
            capture_path.display()
        );

        let command = self.backend.build_command(&region, capture_path, options).await;
        let child = process::spawn_encoder(&command, "capture")?;

        self.session = Some(Session {
            child,
            format: options.format,
            output_path: output_path.to_path_buf(),
            intermediate_path,
        });
        Ok(())
    }

    /// Stops the active session and returns the final output path.
    ///
    /// Never fails: a forced kill, a failed GIF conversion or a leftover intermediate
    /// file are logged, and the controller is idle afterwards in every case.
    pub async fn stop(&mut self) -> Option<PathBuf> {
        let mut session = self.session.take()?;

        match session.child.try_wait() {
            Ok(Some(status)) => {
                log::warn!("ffmpeg had already exited with {}", status);
            }
            _ => self.finish_encoder(&mut session.child).await,
        }
        log::info!("Recording stopped.");

        if let Some(intermediate) = session.intermediate_path.take() {
            if let Err(e) = gif::convert(
                self.backend.encoder(),
                &intermediate,
                &session.output_path,
                self.conversion_timeout,
            )
            .await
            {
                log::error!("{}", e);
            } else {
                log::info!("GIF conversion complete.");
            }
            remove_intermediate(&intermediate);
        }

        log::debug!("{} session finished", session.format);
        Some(session.output_path)
    }

    /// Whether an encoder is running.
    ///
    /// An encoder that exited on its own is reaped here: its exit is logged, any GIF
    /// intermediate is removed and the controller returns to idle.
    pub fn is_active(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match session.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                log::error!("ffmpeg exited unexpectedly with {}", status);
                if let Some(intermediate) = &session.intermediate_path {
                    remove_intermediate(intermediate);
                }
                self.session = None;
                false
            }
            Err(e) => {
                log::warn!("Failed to poll ffmpeg: {}", e);
                true
            }
        }
    }

    async fn finish_encoder(&self, child: &mut Child) {
        if let Err(e) = process::interrupt(child) {
            log::warn!("Failed to interrupt ffmpeg: {}", e);
        }

        match tokio::time::timeout(self.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => log::info!("ffmpeg process exited with {}", status),
            Ok(Err(e)) => log::warn!("Failed to wait for ffmpeg: {}", e),
            Err(_) => {
                log::warn!("Force killing ffmpeg (timeout after {:?})...", self.stop_timeout);
                if let Err(e) = child.kill().await {
                    log::error!("Failed to kill ffmpeg: {}", e);
                }
            }
        }
    }
}

fn remove_intermediate(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => log::info!("Deleted temp MP4 file: {}", path.display()),
        Err(e) => log::error!("Failed to delete temp MP4 {}: {}", path.display(), e),
    }
}
