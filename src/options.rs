//! [super::Display] configuration options

use crate::ili9341;

/// Default settle delay after delay-flagged init table entries, in ms.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 150;

/// Default hold time for each level of the hardware reset sequence, in ms.
pub const DEFAULT_RESET_HOLD_MS: u32 = 150;

/// [`Display`](crate::Display) options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayOptions {
    /// Display orientation.
    pub orientation: Orientation,
    /// Colour filter order of the panel.
    pub color_order: ColorOrder,
    /// Colour inversion.
    pub invert_colors: ColorInversion,
    /// Window used by [`Display::write_pixel`](crate::Display::write_pixel).
    pub pixel_window: PixelWindow,
    /// Wait after init table entries flagged for delay, in ms.
    pub settle_delay_ms: u32,
    /// Hold time of each reset pin level, in ms.
    pub reset_hold_ms: u32,
}

impl DisplayOptions {
    /// Returns the visible size in pixels for the current orientation.
    pub fn display_size(&self) -> (u16, u16) {
        if self.orientation.is_landscape() {
            (ili9341::HEIGHT, ili9341::WIDTH)
        } else {
            (ili9341::WIDTH, ili9341::HEIGHT)
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            color_order: ColorOrder::default(),
            invert_colors: ColorInversion::default(),
            pixel_window: PixelWindow::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            reset_hold_ms: DEFAULT_RESET_HOLD_MS,
        }
    }
}

/// Display orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Portrait, connector at the bottom.
    #[default]
    Portrait,
    /// Landscape, rotated 90 degrees.
    Landscape,
    /// Portrait, rotated 180 degrees.
    PortraitFlipped,
    /// Landscape, rotated 270 degrees.
    LandscapeFlipped,
}

impl Orientation {
    /// Returns `true` if rows and columns are exchanged.
    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape | Self::LandscapeFlipped)
    }
}

/// Subpixel order of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// RGB subpixel order.
    Rgb,
    /// BGR subpixel order, used by most ILI9341 modules.
    #[default]
    Bgr,
}

/// Colour inversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorInversion {
    /// Normal colours.
    #[default]
    Normal,
    /// Inverted colours.
    Inverted,
}

/// Address window set up for a single pixel write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelWindow {
    /// The window covers exactly the written pixel.
    #[default]
    Single,
    /// The window spans `width` columns and `height` rows past the pixel.
    ///
    /// Only the first pixel of the window is written; the rest of the
    /// window keeps whatever the controller RAM held.
    Span {
        /// Extra columns.
        width: u16,
        /// Extra rows.
        height: u16,
    },
}

impl PixelWindow {
    /// Returns the inclusive window `(x0, y0, x1, y1)` for a pixel at `(x, y)`.
    pub const fn window(self, x: u16, y: u16) -> (u16, u16, u16, u16) {
        match self {
            Self::Single => (x, y, x, y),
            Self::Span { width, height } => {
                (x, y, x.saturating_add(width), y.saturating_add(height))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DisplayOptions::default();
        assert_eq!(options.settle_delay_ms, 150);
        assert_eq!(options.reset_hold_ms, 150);
        assert_eq!(options.pixel_window, PixelWindow::Single);
        assert_eq!(options.display_size(), (240, 320));
    }

    #[test]
    fn landscape_swaps_size() {
        let options = DisplayOptions {
            orientation: Orientation::LandscapeFlipped,
            ..DisplayOptions::default()
        };
        assert_eq!(options.display_size(), (320, 240));
    }

    #[test]
    fn pixel_windows() {
        assert_eq!(PixelWindow::Single.window(50, 50), (50, 50, 50, 50));
        assert_eq!(
            PixelWindow::Span {
                width: 50,
                height: 50
            }
            .window(50, 50),
            (50, 50, 100, 100)
        );
        assert_eq!(
            PixelWindow::Span {
                width: 10,
                height: 0
            }
            .window(u16::MAX - 2, 7),
            (u16::MAX - 2, 7, u16::MAX, 7)
        );
    }
}
