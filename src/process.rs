//! Spawning and signalling encoder child processes.

use crate::capture::EncoderCommand;
use crate::error::{RecorderError, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

/// Log target for everything the encoder prints.
pub const FFMPEG_LOG_TARGET: &str = "ffmpeg";

/// Spawns the encoder with stdin closed and its output forwarded to the log.
///
/// The child gets its own process group on Unix, so a Ctrl+C in the terminal reaches
/// the host only and the host decides when the encoder finalizes.
pub fn spawn_encoder(command: &EncoderCommand, label: &'static str) -> Result<Child> {
    log::info!(
        "Spawning ffmpeg: {} {}",
        command.program.display(),
        command.args.join(" ")
    );

    let mut std_cmd = std::process::Command::new(&command.program);
    std_cmd
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_cmd.process_group(0);
    }

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        RecorderError::SpawnFailure(command.program.display().to_string(), e)
    })?;

    if let Some(stdout) = child.stdout.take() {
        forward_output(stdout, label, "stdout");
    }
    if let Some(stderr) = child.stderr.take() {
        forward_output(stderr, label, "stderr");
    }

    Ok(child)
}

fn forward_output<R>(stream: R, label: &'static str, stream_name: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    log::debug!(target: FFMPEG_LOG_TARGET, "{} {}: {}", label, stream_name, line)
                }
                Ok(None) => break,
                Err(e) => {
                    log::debug!(target: FFMPEG_LOG_TARGET, "{} {} closed: {}", label, stream_name, e);
                    break;
                }
            }
        }
    });
}

/// Asks the encoder to finish writing its output.
///
/// SIGINT lets ffmpeg write the container trailer; a hard kill would leave most
/// formats truncated. Targets without signals fall back to a kill.
pub fn interrupt(child: &mut Child) -> std::io::Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            use rustix::process::{kill_process, Pid, Signal};

            let pid = child
                .id()
                .and_then(|id| Pid::from_raw(id as i32))
                .ok_or_else(|| std::io::Error::other("encoder has no process id"))?;
            kill_process(pid, Signal::Int)?;
            Ok(())
        } else {
            child.start_kill()
        }
    }
}
