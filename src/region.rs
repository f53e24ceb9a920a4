//! Capture rectangle handed to the encoder.

/// Height of the recording frame's top bar.
pub const TOP_BAR_HEIGHT: u32 = 40;
/// Width of the coloured border drawn around the recording frame.
pub const BORDER_INSET: u32 = 2;
/// Extra space below the top bar so its border never shows up in the capture.
pub const EXTRA_TOP_INSET: u32 = 4;

/// Bounds of the host window in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Screen rectangle to capture. Width and height are always even.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl CaptureRegion {
    /// Builds a region, rounding odd dimensions down (H.264 and yuv420p need even sizes).
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        let even_width = width - width % 2;
        let even_height = height - height % 2;
        if even_width != width || even_height != height {
            log::debug!(
                "Adjusted capture size {}x{} to even {}x{}",
                width,
                height,
                even_width,
                even_height
            );
        }

        Self {
            x,
            y,
            width: even_width,
            height: even_height,
        }
    }

    /// Derives the capture area from the host window, excluding its top bar and border.
    pub fn from_window_bounds(bounds: WindowBounds) -> Self {
        let top = TOP_BAR_HEIGHT + BORDER_INSET + EXTRA_TOP_INSET;
        Self::new(
            bounds.x.saturating_add(BORDER_INSET as i32),
            bounds.y.saturating_add(top as i32),
            bounds.width.saturating_sub(BORDER_INSET * 2),
            bounds
                .height
                .saturating_sub(TOP_BAR_HEIGHT + BORDER_INSET * 2 + EXTRA_TOP_INSET),
        )
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `WIDTHxHEIGHT`, as ffmpeg's `-video_size` expects it.
    pub fn size_arg(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl From<WindowBounds> for CaptureRegion {
    fn from(bounds: WindowBounds) -> Self {
        CaptureRegion::new(bounds.x, bounds.y, bounds.width, bounds.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_dimensions_are_rounded_down() {
        let region = CaptureRegion::new(10, 20, 801, 601);
        assert_eq!(region.width(), 800);
        assert_eq!(region.height(), 600);
        assert_eq!(region.x(), 10);
        assert_eq!(region.y(), 20);
        assert_eq!(region.size_arg(), "800x600");
    }

    #[test]
    fn test_even_dimensions_are_kept() {
        let region = CaptureRegion::new(0, 0, 1920, 1080);
        assert_eq!((region.width(), region.height()), (1920, 1080));
    }

    #[test]
    fn test_window_bounds_strip_chrome() {
        let region = CaptureRegion::from_window_bounds(WindowBounds {
            x: 100,
            y: 50,
            width: 800,
            height: 600,
        });
        assert_eq!(region.x(), 102);
        assert_eq!(region.y(), 96);
        assert_eq!(region.width(), 796);
        assert_eq!(region.height(), 552);
    }

    #[test]
    fn test_tiny_window_saturates() {
        let region = CaptureRegion::from_window_bounds(WindowBounds {
            x: 0,
            y: 0,
            width: 3,
            height: 10,
        });
        assert_eq!(region.width(), 0);
        assert_eq!(region.height(), 0);
    }

    #[test]
    fn test_window_offset_near_i32_max_saturates() {
        let region = CaptureRegion::from_window_bounds(WindowBounds {
            x: i32::MAX,
            y: i32::MAX - 10,
            width: 800,
            height: 600,
        });
        assert_eq!(region.x(), i32::MAX);
        assert_eq!(region.y(), i32::MAX);
        assert_eq!(region.width(), 796);
    }
}
