use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "peekaboo", version, about = "Record a region of the screen with ffmpeg")]
pub struct Cli {
    /// Enable debug logging (includes ffmpeg output)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a screen region until Ctrl+C (or --duration)
    Record(RecordArgs),

    /// Configure defaults (saved to a config file)
    Config(ConfigArgs),

    /// Locate ffmpeg and print its version
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Region to record as WIDTHxHEIGHT+X+Y
    #[arg(short, long)]
    pub geometry: String,

    /// Treat the geometry as recorder window bounds and strip the window chrome
    #[arg(long)]
    pub window: bool,

    /// Output format: mp4, webm or gif (overrides config)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Target frames per second (overrides config)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Do not draw the mouse cursor
    #[arg(long)]
    pub no_cursor: bool,

    /// Record what the speakers play
    #[arg(long)]
    pub system_audio: bool,

    /// Record the default microphone
    #[arg(long)]
    pub mic: bool,

    /// Output file. Defaults to a timestamped file in ~/Videos/Peekaboo
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop automatically after this many seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Path to the ffmpeg binary (defaults to the one on PATH)
    #[arg(long)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Print a JSON summary instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Default format (mp4, webm or gif)
    #[arg(long)]
    pub format: Option<String>,

    /// Default FPS
    #[arg(long)]
    pub fps: Option<u32>,

    /// Draw the cursor by default
    #[arg(long)]
    pub show_cursor: Option<bool>,

    /// Record system audio by default
    #[arg(long)]
    pub system_audio: Option<bool>,

    /// Record the microphone by default
    #[arg(long)]
    pub mic: Option<bool>,

    /// Default output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait for ffmpeg to finish before killing it
    #[arg(long)]
    pub stop_timeout: Option<u64>,

    /// Seconds allowed for GIF conversion (0 = unlimited)
    #[arg(long)]
    pub gif_timeout: Option<u64>,

    /// Clear/reset all saved configuration
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the ffmpeg binary (defaults to the one on PATH)
    #[arg(long)]
    pub ffmpeg_path: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn is_empty(&self) -> bool {
        self.format.is_none()
            && self.fps.is_none()
            && self.show_cursor.is_none()
            && self.system_audio.is_none()
            && self.mic.is_none()
            && self.output_dir.is_none()
            && self.stop_timeout.is_none()
            && self.gif_timeout.is_none()
    }
}
