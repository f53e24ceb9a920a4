use crate::error::{RecorderError, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

cfg_if::cfg_if! {
    if #[cfg(target_os = "windows")] {
        const FFMPEG_EXECUTABLE: &str = "ffmpeg.exe";
        const WHICH_COMMAND: &str = "where";
    } else {
        const FFMPEG_EXECUTABLE: &str = "ffmpeg";
        const WHICH_COMMAND: &str = "which";
    }
}

/// Archive suffix used by packagers that need executables extracted next to the archive.
const PACKED_SUFFIX: &str = ".asar";
const UNPACKED_SUFFIX: &str = ".asar.unpacked";

/// Resolves the encoder executable.
///
/// Order: explicit path, `ffmpeg` on the system PATH, a binary bundled next to the
/// running executable, and finally the bare name so that a missing encoder surfaces
/// as a spawn failure rather than here.
pub fn resolve_ffmpeg_binary(provided_path: Option<&Path>) -> PathBuf {
    if let Some(path) = provided_path {
        if !path.exists() {
            log::warn!("Provided FFmpeg path does not exist: {}", path.display());
        }
        log::info!("Using provided FFmpeg binary: {}", path.display());
        return path.to_path_buf();
    }

    if let Some(path) = which_command("ffmpeg") {
        log::debug!("Found FFmpeg in system: {}", path);
        return PathBuf::from(path);
    }

    if let Some(path) = bundled_ffmpeg() {
        log::info!("Using bundled FFmpeg: {}", path.display());
        return path;
    }

    log::warn!("Could not find ffmpeg, using '{}' and hoping it's in PATH", FFMPEG_EXECUTABLE);
    PathBuf::from(FFMPEG_EXECUTABLE)
}

/// Looks for an encoder shipped alongside the running executable.
fn bundled_ffmpeg() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;

    [dir.join(FFMPEG_EXECUTABLE), dir.join("bin").join(FFMPEG_EXECUTABLE)]
        .into_iter()
        .map(|candidate| unpacked_path(&candidate))
        .find(|candidate| candidate.is_file())
}

/// Rewrites any `*.asar` path component to its `*.asar.unpacked` twin.
///
/// Executables cannot be run from inside the archive, so packagers extract them to
/// the unpacked directory instead.
pub fn unpacked_path(path: &Path) -> PathBuf {
    path.components()
        .map(|component| match component {
            Component::Normal(name) => {
                match name.to_str().and_then(|n| n.strip_suffix(PACKED_SUFFIX)) {
                    Some(stem) => OsString::from(format!("{}{}", stem, UNPACKED_SUFFIX)),
                    None => name.to_os_string(),
                }
            }
            other => other.as_os_str().to_os_string(),
        })
        .collect()
}

/// Generic function to find a command in system PATH
fn which_command(command: &str) -> Option<String> {
    Command::new(WHICH_COMMAND)
        .arg(command)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().lines().next().unwrap_or("").to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
}

/// Validates that FFmpeg is working by running -version
pub fn validate_ffmpeg(ffmpeg_path: &Path) -> Result<String> {
    log::info!("Validating FFmpeg installation...");

    match Command::new(ffmpeg_path).arg("-version").output() {
        Ok(output) => {
            if output.status.success() {
                let version_info = String::from_utf8_lossy(&output.stdout);
                let first_line = version_info
                    .lines()
                    .next()
                    .unwrap_or("Unknown version")
                    .to_string();

                log::info!("FFmpeg validation successful: {}", first_line);
                Ok(first_line)
            } else {
                Err(RecorderError::ConfigError(format!(
                    "FFmpeg validation failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                )))
            }
        }
        Err(e) => Err(RecorderError::SpawnFailure(
            ffmpeg_path.display().to_string(),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_which_command() {
        let result = which_command("sh");
        assert!(result.is_some());
    }

    #[test]
    fn test_which_command_missing() {
        assert!(which_command("definitely-not-a-real-binary-4821").is_none());
    }

    #[test]
    fn test_unpacked_path_rewrites_archive_segment() {
        let packed = Path::new("/opt/Peekaboo/resources/app.asar/bin/ffmpeg");
        assert_eq!(
            unpacked_path(packed),
            PathBuf::from("/opt/Peekaboo/resources/app.asar.unpacked/bin/ffmpeg")
        );
    }

    #[test]
    fn test_unpacked_path_leaves_plain_paths() {
        let plain = Path::new("/usr/local/lib/peekaboo/ffmpeg");
        assert_eq!(unpacked_path(plain), plain.to_path_buf());
    }

    #[test]
    fn test_provided_path_wins() {
        let provided = Path::new("/custom/ffmpeg");
        assert_eq!(resolve_ffmpeg_binary(Some(provided)), provided.to_path_buf());
    }

    #[test]
    fn test_validate_missing_binary() {
        let err = validate_ffmpeg(Path::new("/nonexistent/ffmpeg")).unwrap_err();
        assert!(matches!(err, RecorderError::SpawnFailure(..)));
    }
}
