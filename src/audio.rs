//! PulseAudio server queries used to pick audio inputs for the encoder.

use crate::error::{RecorderError, Result};
use std::time::Duration;
use tokio::process::Command;

/// Source name of the microphone input.
pub const DEFAULT_MICROPHONE: &str = "default";

/// How long the audio server may take to answer `pactl info`.
pub const PACTL_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the monitor source of the default sink, i.e. "what the speakers play".
pub async fn default_sink_monitor() -> Result<String> {
    query_sink_monitor("pactl", &["info"], PACTL_TIMEOUT).await
}

async fn query_sink_monitor(program: &str, args: &[&str], limit: Duration) -> Result<String> {
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    let output = tokio::time::timeout(limit, command.output())
        .await
        .map_err(|_| RecorderError::AudioSetup(format!("{} timed out after {:?}", program, limit)))?
        .map_err(|e| RecorderError::AudioSetup(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(RecorderError::AudioSetup(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let info = String::from_utf8_lossy(&output.stdout);
    let sink = parse_default_sink(&info).ok_or_else(|| {
        RecorderError::AudioSetup(format!("{} reported no default sink", program))
    })?;

    log::debug!("Default sink: {}", sink);
    Ok(monitor_of(sink))
}

/// Extracts the `Default Sink:` value from `pactl info` output.
pub fn parse_default_sink(info: &str) -> Option<&str> {
    info.lines()
        .find_map(|line| line.trim().strip_prefix("Default Sink:"))
        .map(str::trim)
        .filter(|sink| !sink.is_empty())
}

pub fn monitor_of(sink: &str) -> String {
    format!("{}.monitor", sink)
}
