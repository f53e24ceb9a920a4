//! X11 screen-grab command line construction.

use crate::audio;
use crate::error::Result;
use crate::ffmpeg_utils;
use crate::profile::{AudioOptions, RecordingOptions};
use crate::region::CaptureRegion;
use std::path::{Path, PathBuf};

const DEFAULT_DISPLAY: &str = ":0.0";

/// A fully resolved encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Builds ffmpeg command lines that grab a region of an X11 display.
#[derive(Debug, Clone)]
pub struct CaptureBackend {
    encoder: PathBuf,
    display: String,
}

impl CaptureBackend {
    pub fn new(encoder: impl Into<PathBuf>, display: impl Into<String>) -> Self {
        Self {
            encoder: encoder.into(),
            display: display.into(),
        }
    }

    /// Uses `$DISPLAY` and the first encoder found by [`ffmpeg_utils::resolve_ffmpeg_binary`].
    pub fn from_env(encoder_override: Option<&Path>) -> Self {
        let display = std::env::var("DISPLAY")
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY.to_string());
        Self::new(ffmpeg_utils::resolve_ffmpeg_binary(encoder_override), display)
    }

    pub fn encoder(&self) -> &Path {
        &self.encoder
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Resolves the requested audio sources and assembles the full command line.
    ///
    /// Never fails: if the audio server cannot be queried the session records video only.
    pub async fn build_command(
        &self,
        region: &CaptureRegion,
        output: &Path,
        options: &RecordingOptions,
    ) -> EncoderCommand {
        let system_monitor = if options.audio.capture_system_audio && options.format.supports_audio()
        {
            audio::default_sink_monitor().await.map(Some)
        } else {
            Ok(None)
        };
        self.build_command_with_monitor(region, output, options, system_monitor)
    }

    /// Assembles the command line given the outcome of the system audio lookup.
    pub fn build_command_with_monitor(
        &self,
        region: &CaptureRegion,
        output: &Path,
        options: &RecordingOptions,
        system_monitor: Result<Option<String>>,
    ) -> EncoderCommand {
        let mut args = self.video_input_args(region, options);

        let audio = if options.audio.any() && options.format.supports_audio() {
            match system_monitor {
                Ok(monitor) => {
                    args.extend(audio_input_args(options.audio, monitor.as_deref()));
                    AudioOptions {
                        capture_system_audio: options.audio.capture_system_audio
                            && monitor.is_some(),
                        capture_microphone: options.audio.capture_microphone,
                    }
                }
                Err(e) => {
                    log::warn!("Failed to set up audio, recording video only: {}", e);
                    AudioOptions::NONE
                }
            }
        } else {
            AudioOptions::NONE
        };

        args.extend(options.format.encoder_args(audio));
        args.push("-y".to_string());
        args.push(output.to_string_lossy().into_owned());

        EncoderCommand {
            program: self.encoder.clone(),
            args,
        }
    }

    fn video_input_args(&self, region: &CaptureRegion, options: &RecordingOptions) -> Vec<String> {
        vec![
            "-thread_queue_size".to_string(),
            "1024".to_string(),
            "-probesize".to_string(),
            "10M".to_string(),
            "-f".to_string(),
            "x11grab".to_string(),
            "-video_size".to_string(),
            region.size_arg(),
            "-framerate".to_string(),
            options.frames_per_second.to_string(),
            "-draw_mouse".to_string(),
            if options.show_cursor { "1" } else { "0" }.to_string(),
            "-i".to_string(),
            format!("{}+{},{}", self.display, region.x(), region.y()),
            "-vsync".to_string(),
            "cfr".to_string(),
        ]
    }
}

/// Audio inputs and stream mapping for the requested sources.
///
/// Input 0 is always the screen grab; audio inputs follow in order (system, then
/// microphone). Two inputs are merged into one stereo stream. System audio is only
/// added when `system_monitor` names its source.
pub fn audio_input_args(audio: AudioOptions, system_monitor: Option<&str>) -> Vec<String> {
    let mut sources = Vec::new();
    if audio.capture_system_audio {
        if let Some(monitor) = system_monitor {
            sources.push(monitor.to_string());
        }
    }
    if audio.capture_microphone {
        sources.push(audio::DEFAULT_MICROPHONE.to_string());
    }

    let mut args = Vec::new();
    for source in &sources {
        args.extend(["-f".to_string(), "pulse".to_string(), "-i".to_string(), source.clone()]);
    }

    match sources.len() {
        0 => {}
        1 => args.extend(["-map", "0:v", "-map", "1:a"].map(String::from)),
        _ => args.extend(
            [
                "-filter_complex",
                "[1:a][2:a]amerge=inputs=2[a]",
                "-map",
                "0:v",
                "-map",
                "[a]",
            ]
            .map(String::from),
        ),
    }

    args
}
