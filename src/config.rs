use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FORMAT: &str = "MP4";
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_GIF_CONVERSION_TIMEOUT_SECS: u64 = 600;

/// Saved recording defaults. Every field is optional; command-line flags win.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    pub format: Option<String>,
    pub fps: Option<u32>,
    pub show_cursor: Option<bool>,
    pub system_audio: Option<bool>,
    pub microphone: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub stop_timeout_secs: Option<u64>,
    /// 0 disables the limit.
    pub gif_conversion_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    pub fn fps(&self) -> u32 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }

    pub fn show_cursor(&self) -> bool {
        self.show_cursor.unwrap_or(true)
    }

    pub fn stop_timeout_secs(&self) -> u64 {
        self.stop_timeout_secs.unwrap_or(DEFAULT_STOP_TIMEOUT_SECS)
    }

    pub fn gif_conversion_timeout_secs(&self) -> u64 {
        self.gif_conversion_timeout_secs
            .unwrap_or(DEFAULT_GIF_CONVERSION_TIMEOUT_SECS)
    }

    /// Overlays every value set in `other`.
    pub fn merge(&mut self, other: AppConfig) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            format,
            fps,
            show_cursor,
            system_audio,
            microphone,
            output_dir,
            stop_timeout_secs,
            gif_conversion_timeout_secs
        );
    }
}

pub fn config_file_path() -> Result<PathBuf> {
    let base = config_dir().context("Could not determine user config directory")?;
    Ok(base.join("peekaboo").join("config.toml"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Create config dir: {}", parent.display()))?;
    }
    Ok(())
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_file_path()?)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&content)
        .with_context(|| {
            format!(
                "Failed to parse config file: {}\n\
                The file may be corrupted. You can delete it with 'peekaboo config --clear'.",
                path.display()
            )
        })?;
    Ok(cfg)
}

pub fn save_config(cfg: &AppConfig) -> Result<()> {
    save_config_to(cfg, &config_file_path()?)
}

pub fn save_config_to(cfg: &AppConfig, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let content = toml::to_string_pretty(cfg)
        .context("Failed to serialize configuration to TOML format")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Deletes the config file. Returns whether there was one.
pub fn clear_config() -> Result<bool> {
    let path = config_file_path()?;
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete config file: {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}
