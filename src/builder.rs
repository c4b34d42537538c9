//! [super::Display] builder module

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::{
    dcs::{InterfaceExt, SetAddressMode, SetInvertMode, SoftReset},
    ili9341,
    init_table::{self, InitTable, InitTableError, ReplayError},
    interface::{Interface, NoPin},
    options::{ColorInversion, ColorOrder, DisplayOptions, Orientation, PixelWindow},
    Display,
};

/// Builder for [Display] instances.
///
/// # Examples
///
/// ```
/// use ili9341_parallel::{Builder, options::Orientation, _mock::*};
///
/// # embassy_futures::block_on(async {
/// let display = Builder::new(MockDisplayInterface)
///     .reset_pin(MockOutputPin)
///     .orientation(Orientation::Landscape)
///     .init(&mut MockDelay)
///     .await
///     .unwrap();
/// assert_eq!(display.size(), (320, 240));
/// # });
/// ```
pub struct Builder<DI, RST>
where
    DI: Interface,
{
    di: DI,
    rst: Option<RST>,
    options: DisplayOptions,
    init_table: InitTable<'static>,
}

impl<DI> Builder<DI, NoPin>
where
    DI: Interface,
{
    /// Constructs a new builder for the given interface with the ILI9341
    /// power-up table and default options.
    #[must_use]
    pub fn new(di: DI) -> Self {
        Self {
            di,
            rst: None,
            options: DisplayOptions::default(),
            init_table: ili9341::POWER_UP_TABLE,
        }
    }
}

impl<DI, RST> Builder<DI, RST>
where
    DI: Interface,
    RST: OutputPin,
{
    /// Sets the init table replayed after reset.
    #[must_use]
    pub fn init_table(mut self, init_table: InitTable<'static>) -> Self {
        self.init_table = init_table;
        self
    }

    /// Sets the wait after delay-flagged init table entries.
    #[must_use]
    pub fn settle_delay_ms(mut self, settle_delay_ms: u32) -> Self {
        self.options.settle_delay_ms = settle_delay_ms;
        self
    }

    /// Sets the hold time of each level in the hardware reset sequence.
    #[must_use]
    pub fn reset_hold_ms(mut self, reset_hold_ms: u32) -> Self {
        self.options.reset_hold_ms = reset_hold_ms;
        self
    }

    #[must_use]
    pub fn invert_colors(mut self, color_inversion: ColorInversion) -> Self {
        self.options.invert_colors = color_inversion;
        self
    }

    #[must_use]
    pub fn color_order(mut self, color_order: ColorOrder) -> Self {
        self.options.color_order = color_order;
        self
    }

    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = orientation;
        self
    }

    #[must_use]
    pub fn pixel_window(mut self, pixel_window: PixelWindow) -> Self {
        self.options.pixel_window = pixel_window;
        self
    }

    /// Sets the reset pin. Without one the controller is reset with the
    /// software reset command.
    #[must_use]
    pub fn reset_pin<RST2: OutputPin>(self, rst: RST2) -> Builder<DI, RST2> {
        Builder {
            di: self.di,
            rst: Some(rst),
            options: self.options,
            init_table: self.init_table,
        }
    }

    /// Resets and initializes the controller.
    ///
    /// The init table is checked before anything is sent, so a malformed
    /// table leaves the bus untouched.
    pub async fn init(
        mut self,
        delay_source: &mut impl DelayNs,
    ) -> Result<Display<DI, RST>, InitError<DI::Error, RST::Error>> {
        let entries = self.init_table.validate().map_err(|e| {
            log::warn!("init table rejected: {}", e);
            InitError::InvalidConfiguration(ConfigurationError::InvalidInitTable(e))
        })?;

        self.di.prepare().await.map_err(InitError::Interface)?;

        if let Some(ref mut rst_pin) = self.rst {
            let hold_ms = self.options.reset_hold_ms;
            log::debug!("hardware reset, {} ms per level", hold_ms);
            rst_pin.set_high().map_err(InitError::ResetPin)?;
            delay_source.delay_ms(hold_ms).await;
            rst_pin.set_low().map_err(InitError::ResetPin)?;
            delay_source.delay_ms(hold_ms).await;
            rst_pin.set_high().map_err(InitError::ResetPin)?;
            delay_source.delay_ms(hold_ms).await;
        } else {
            log::debug!("software reset");
            self.di
                .write_command(SoftReset)
                .await
                .map_err(InitError::Interface)?;
            delay_source.delay_ms(ili9341::SOFT_RESET_SETTLE_MS).await;
        }

        log::debug!("replaying init table, {} entries", entries);
        init_table::replay(
            self.init_table,
            &mut self.di,
            delay_source,
            self.options.settle_delay_ms,
        )
        .await?;

        let madctl = SetAddressMode::from(&self.options);
        self.di
            .write_command(madctl)
            .await
            .map_err(InitError::Interface)?;
        self.di
            .write_command(SetInvertMode::new(self.options.invert_colors))
            .await
            .map_err(InitError::Interface)?;

        Ok(Display {
            di: self.di,
            rst: self.rst,
            options: self.options,
            madctl,
            sleeping: false,
        })
    }
}

/// Error returned by [`Builder::init`].
#[derive(Debug)]
pub enum InitError<DIError, PinError> {
    /// Error caused by the display interface.
    Interface(DIError),

    /// Error caused by the reset pin's [`OutputPin`] implementation.
    ResetPin(PinError),

    /// Invalid configuration error.
    InvalidConfiguration(ConfigurationError),
}

/// Specifics of [InitError::InvalidConfiguration] if configuration was found invalid
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// The init table is malformed.
    InvalidInitTable(InitTableError),
}

impl<DIError, PinError> From<ReplayError<DIError>> for InitError<DIError, PinError> {
    fn from(value: ReplayError<DIError>) -> Self {
        match value {
            ReplayError::Interface(e) => InitError::Interface(e),
            ReplayError::Table(e) => {
                InitError::InvalidConfiguration(ConfigurationError::InvalidInitTable(e))
            }
        }
    }
}
