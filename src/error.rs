use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("Format {0} not supported (expected mp4, webm or gif)")]
    UnsupportedFormat(String),

    #[error("Failed to spawn encoder '{0}': {1}")]
    SpawnFailure(String, #[source] std::io::Error),

    #[error("GIF conversion failed: {0}")]
    ConversionFailure(String),

    #[error("Audio setup error: {0}")]
    AudioSetup(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encoder failure during recording: {0}")]
    EncoderRuntimeFailure(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<anyhow::Error> for RecorderError {
    fn from(err: anyhow::Error) -> Self {
        RecorderError::ConfigError(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
