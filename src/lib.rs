#![no_std]
#![allow(async_fn_in_trait)]

//! This crate provides an asynchronous driver for ILI9341 TFT controllers
//! wired to an 8080 style parallel bus that the host drives from GPIO.
//!
//! Every display operation is encoded as command frames: chip-select is
//! asserted, the command byte goes out with register-select low, the argument
//! bytes follow with register-select high, and each byte is latched by one
//! write strobe pulse. The power-up sequence is a compact byte table
//! (see [`init_table`]) replayed as such frames.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics_core::pixelcolor::{raw::RawU16, Rgb565};
//! use ili9341_parallel::{
//!     interface::{BusLines, Generic8BitBus, ParallelInterface},
//!     Builder,
//!     _mock::{MockDelay, MockOutputPin},
//! };
//!
//! # embassy_futures::block_on(async {
//! let bus = Generic8BitBus::new((
//!     MockOutputPin, MockOutputPin, MockOutputPin, MockOutputPin,
//!     MockOutputPin, MockOutputPin, MockOutputPin, MockOutputPin,
//! ));
//! let lines = BusLines::new(bus, MockOutputPin, MockOutputPin).chip_select(MockOutputPin);
//! let di = ParallelInterface::new(lines, MockDelay).with_strobe_hold_ns(100);
//!
//! let mut display = Builder::new(di)
//!     .reset_pin(MockOutputPin)
//!     .init(&mut MockDelay)
//!     .await
//!     .unwrap();
//!
//! display.write_pixel(50, 50, Rgb565::from(RawU16::new(0xF777))).await.unwrap();
//! # });
//! ```

#[cfg(test)]
extern crate alloc;

use embedded_graphics_core::pixelcolor::{
    raw::{RawData, RawU16},
    Rgb565,
};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

pub mod interface;

pub mod options;

mod builder;
pub use builder::*;

pub mod dcs;
use dcs::{
    EnterSleepMode, ExitSleepMode, InterfaceExt, SetAddressMode, SetColumnAddress,
    SetDisplayOff, SetDisplayOn, SetInvertMode, SetPageAddress, SetScrollStart,
    WriteMemoryStart,
};

pub mod ili9341;
pub mod init_table;
use init_table::{InitTable, ReplayError};

#[doc(hidden)]
pub mod _mock;

/// Display driver structure.
pub struct Display<DI, RST>
where
    DI: interface::Interface,
    RST: OutputPin,
{
    /// The display interface.
    di: DI,
    /// The reset pin.
    rst: Option<RST>,
    /// Display options.
    options: options::DisplayOptions,
    /// Current MADCTL value.
    madctl: SetAddressMode,
    /// Sleep state.
    sleeping: bool,
}

impl<DI, RST> Display<DI, RST>
where
    DI: interface::Interface,
    RST: OutputPin,
{
    /// Returns the current display orientation.
    pub fn orientation(&self) -> options::Orientation {
        self.options.orientation
    }

    /// Returns the options the display was configured with.
    pub fn options(&self) -> &options::DisplayOptions {
        &self.options
    }

    /// Returns the visible size in pixels for the current orientation.
    pub fn size(&self) -> (u16, u16) {
        self.options.display_size()
    }

    /// Returns the last MADCTL value written to the controller.
    pub fn madctl(&self) -> u8 {
        self.madctl.bits()
    }

    /// Sets the display orientation.
    pub async fn set_orientation(
        &mut self,
        orientation: options::Orientation,
    ) -> Result<(), DI::Error> {
        self.options.orientation = orientation;
        let madctl = SetAddressMode::from(&self.options);
        log::debug!("orientation {:?}, MADCTL {:#04x}", orientation, madctl.bits());
        self.di.write_command(madctl).await?;
        self.madctl = madctl;
        Ok(())
    }

    /// Enables or disables colour inversion.
    pub async fn set_invert_colors(
        &mut self,
        color_inversion: options::ColorInversion,
    ) -> Result<(), DI::Error> {
        self.options.invert_colors = color_inversion;
        self.di.write_command(SetInvertMode::new(color_inversion)).await
    }

    /// Sets the address window for display RAM access.
    ///
    /// Coordinates are inclusive; `x0 <= x1` and `y0 <= y1` are not checked.
    pub async fn set_address_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), DI::Error> {
        self.di.write_command(SetColumnAddress::new(x0, x1)).await?;
        self.di.write_command(SetPageAddress::new(y0, y1)).await
    }

    /// Writes a single pixel.
    ///
    /// The window is chosen by [`options::PixelWindow`]; the memory write
    /// frame carries the colour big-endian.
    pub async fn write_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DI::Error> {
        let (x0, y0, x1, y1) = self.options.pixel_window.window(x, y);
        self.set_address_window(x0, y0, x1, y1).await?;
        self.di
            .write_raw(ili9341::RAMWR, &color_bytes(color))
            .await
    }

    /// Fills the inclusive window with one colour.
    ///
    /// ```
    /// use embedded_graphics_core::{pixelcolor::Rgb565, prelude::RgbColor};
    /// use ili9341_parallel::_mock::new_mock_display;
    ///
    /// # embassy_futures::block_on(async {
    /// let mut display = new_mock_display().await;
    /// display.fill_window(0, 0, 239, 319, Rgb565::BLUE).await.unwrap();
    /// # });
    /// ```
    pub async fn fill_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        let width = u64::from(x1.saturating_sub(x0)) + 1;
        let height = u64::from(y1.saturating_sub(y0)) + 1;
        let mut remaining = width * height;

        let mut chunk = [0u8; FILL_CHUNK_PIXELS * 2];
        let bytes = color_bytes(color);
        for pixel in chunk.chunks_exact_mut(2) {
            pixel.copy_from_slice(&bytes);
        }

        self.set_address_window(x0, y0, x1, y1).await?;
        let first = fill_chunk_len(remaining);
        self.di.write_raw(ili9341::RAMWR, &chunk[..first * 2]).await?;
        remaining -= first as u64;
        while remaining > 0 {
            let n = fill_chunk_len(remaining);
            self.di.send_data(&chunk[..n * 2]).await?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Sends a raw pixel data slice to the specified rectangular region of the display.
    pub async fn show_raw_data<DW>(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        pixel_data: &[DW],
    ) -> Result<(), DI::Error>
    where
        DI: interface::Interface<Word = DW>,
        DW: Copy,
    {
        self.set_address_window(x0, y0, x1, y1).await?;
        self.di.write_command(WriteMemoryStart).await?;
        self.di.send_data_slice(pixel_data).await
    }

    /// Sets the vertical scroll offset.
    pub async fn set_vertical_scroll_offset(&mut self, offset: u16) -> Result<(), DI::Error> {
        self.di.write_command(SetScrollStart::new(offset)).await
    }

    /// Turns the panel output on or off. RAM contents are kept.
    pub async fn set_display_on(&mut self, on: bool) -> Result<(), DI::Error> {
        if on {
            self.di.write_command(SetDisplayOn).await
        } else {
            self.di.write_command(SetDisplayOff).await
        }
    }

    /// Replays another init table, using the configured settle delay.
    pub async fn run_init_table<DLY: DelayNs>(
        &mut self,
        table: InitTable<'_>,
        delay: &mut DLY,
    ) -> Result<usize, ReplayError<DI::Error>> {
        init_table::replay(table, &mut self.di, delay, self.options.settle_delay_ms).await
    }

    /// Returns `true` if the display is currently in sleep mode.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Puts the display into sleep mode.
    ///
    /// Need to call [Self::wake] before issuing other commands.
    pub async fn sleep<DLY: DelayNs>(&mut self, delay: &mut DLY) -> Result<(), DI::Error> {
        self.di.write_command(EnterSleepMode).await?;
        delay.delay_ms(ili9341::SLEEP_SETTLE_MS).await;
        self.sleeping = true;
        log::debug!("display asleep");
        Ok(())
    }

    /// Wakes the display from sleep mode.
    pub async fn wake<DLY: DelayNs>(&mut self, delay: &mut DLY) -> Result<(), DI::Error> {
        self.di.write_command(ExitSleepMode).await?;
        delay.delay_ms(ili9341::SLEEP_SETTLE_MS).await;
        self.sleeping = false;
        log::debug!("display awake");
        Ok(())
    }

    /// Releases the display interface and reset pin.
    pub fn release(self) -> (DI, Option<RST>) {
        (self.di, self.rst)
    }

    /// Returns the display interface for sending raw commands.
    ///
    /// # Safety
    ///
    /// Commands sent through the interface bypass the driver's cached state
    /// (orientation, sleep). The caller must not leave the controller in a
    /// state that contradicts it.
    pub unsafe fn dcs(&mut self) -> &mut DI {
        &mut self.di
    }
}

/// Pixels sent per data call by [`Display::fill_window`].
const FILL_CHUNK_PIXELS: usize = 256;

fn fill_chunk_len(remaining: u64) -> usize {
    if remaining < FILL_CHUNK_PIXELS as u64 {
        remaining as usize
    } else {
        FILL_CHUNK_PIXELS
    }
}

fn color_bytes(color: Rgb565) -> [u8; 2] {
    RawU16::from(color).into_inner().to_be_bytes()
}
