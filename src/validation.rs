use crate::error::RecorderError;
use crate::region::{CaptureRegion, WindowBounds};
use anyhow::{Context, Result};

const MAX_WIDTH: u32 = 7680;
const MAX_HEIGHT: u32 = 4320;

/// Parses X11-style geometry: `WIDTHxHEIGHT+X+Y` (offsets may be `+-20`).
pub fn parse_geometry(geometry: &str) -> Result<WindowBounds, RecorderError> {
    let invalid = || {
        RecorderError::InvalidParameter(format!(
            "Invalid geometry '{}' (expected WIDTHxHEIGHT+X+Y, e.g. 800x600+100+100)",
            geometry
        ))
    };

    let mut parts = geometry.split('+');
    let size = parts.next().ok_or_else(invalid)?;
    let x = parts.next().ok_or_else(invalid)?;
    let y = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (width, height) = size.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.parse().map_err(|_| invalid())?;
    let height: u32 = height.parse().map_err(|_| invalid())?;
    let x: i32 = x.parse().map_err(|_| invalid())?;
    let y: i32 = y.parse().map_err(|_| invalid())?;

    if width == 0 || height == 0 || width > MAX_WIDTH || height > MAX_HEIGHT {
        return Err(RecorderError::InvalidParameter(format!(
            "Invalid geometry '{}' (dimensions must be between 1x1 and {}x{})",
            geometry, MAX_WIDTH, MAX_HEIGHT
        )));
    }

    Ok(WindowBounds {
        x,
        y,
        width,
        height,
    })
}

pub fn validate_region(region: &CaptureRegion) -> Result<(), RecorderError> {
    if region.width() < 2 || region.height() < 2 {
        return Err(RecorderError::InvalidParameter(format!(
            "Capture region {} is too small (minimum 2x2)",
            region.size_arg()
        )));
    }
    Ok(())
}

pub fn validate_fps(fps: u32) -> Result<(), RecorderError> {
    if fps == 0 || fps > 120 {
        return Err(RecorderError::InvalidParameter(format!(
            "FPS must be between 1 and 120, got {}",
            fps
        )));
    }
    Ok(())
}

pub fn validate_output_path(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(anyhow::anyhow!(
                "Output directory does not exist: {}",
                parent.display()
            ));
        }
        if !parent.is_dir() {
            return Err(anyhow::anyhow!(
                "Output path parent is not a directory: {}",
                parent.display()
            ));
        }
    }

    // If file exists, check if it's writable
    if path.exists() && path.is_file() {
        use std::fs::OpenOptions;
        OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("Output file exists but is not writable: {}", path.display()))?;
    }

    Ok(())
}
