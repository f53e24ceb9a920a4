//! Per-format encoder arguments.

use crate::error::RecorderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp4,
    Webm,
    /// Recorded as an H.264 intermediate, converted to GIF on stop.
    Gif,
}

/// Which audio sources to mix into the recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOptions {
    pub capture_system_audio: bool,
    pub capture_microphone: bool,
}

impl AudioOptions {
    pub const NONE: AudioOptions = AudioOptions {
        capture_system_audio: false,
        capture_microphone: false,
    };

    pub fn any(&self) -> bool {
        self.capture_system_audio || self.capture_microphone
    }
}

/// Options fixed for the lifetime of one recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingOptions {
    pub format: OutputFormat,
    pub frames_per_second: u32,
    pub show_cursor: bool,
    pub audio: AudioOptions,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Gif => "gif",
        }
    }

    /// GIF output is silent, so its capture pass opens no audio inputs.
    pub fn supports_audio(&self) -> bool {
        !matches!(self, OutputFormat::Gif)
    }

    /// Codec arguments for this format.
    ///
    /// Frame rate and cursor drawing are part of the capture input, so only the
    /// audio selection changes what is returned here.
    pub fn encoder_args(&self, audio: AudioOptions) -> Vec<String> {
        let mut args: Vec<&str> = match self {
            OutputFormat::Mp4 | OutputFormat::Gif => h264_args().to_vec(),
            OutputFormat::Webm => vec![
                "-c:v",
                "libvpx-vp9",
                "-crf",
                "30",
                "-b:v",
                "0",
                "-deadline",
                "realtime",
                "-cpu-used",
                "8",
                "-row-mt",
                "1",
                "-tile-columns",
                "2",
                "-frame-parallel",
                "1",
                "-threads",
                "0",
                "-pix_fmt",
                "yuv420p",
            ],
        };

        if audio.any() {
            match self {
                OutputFormat::Mp4 => {
                    args.extend_from_slice(&["-c:a", "aac", "-b:a", "128k", "-ac", "2"])
                }
                OutputFormat::Webm => {
                    args.extend_from_slice(&["-c:a", "libopus", "-b:a", "96k", "-ac", "2"])
                }
                // The intermediate never carries audio.
                OutputFormat::Gif => {}
            }
        }

        args.into_iter().map(String::from).collect()
    }
}

fn h264_args() -> [&'static str; 8] {
    [
        "-c:v",
        "libx264",
        "-preset",
        "ultrafast",
        "-pix_fmt",
        "yuv420p",
        "-crf",
        "23",
    ]
}

impl FromStr for OutputFormat {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(OutputFormat::Mp4),
            "webm" => Ok(OutputFormat::Webm),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(RecorderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}
