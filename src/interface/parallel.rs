use core::convert::Infallible;

use embedded_hal::digital::{self, OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use super::{Interface, InterfaceKind};

/// Default time the write strobe is held at each level, in nanoseconds.
pub const DEFAULT_STROBE_HOLD_NS: u32 = 1_000_000;

/// The data lines of a parallel bus.
///
/// `set_value` must drive every data line at once, before the write strobe
/// falls.
pub trait OutputBus {
    /// Bus word, `u8` or `u16`.
    type Word: Copy + From<u8> + Eq;

    /// Width of the bus.
    const KIND: InterfaceKind;

    /// Error type
    type Error: core::fmt::Debug;

    /// Puts `value` on the data lines.
    fn set_value(&mut self, value: Self::Word) -> Result<(), Self::Error>;
}

macro_rules! generic_bus {
    (
        $(#[$meta:meta])*
        $GenericxBitBus:ident {
            type Word = $Word:ident;
            const KIND: InterfaceKind = $InterfaceKind:expr;
            Pins {$(
                $PX:ident => $x:tt,
            )*}
        }
    ) => {
        $(#[$meta])*
        pub struct $GenericxBitBus<$($PX, )*> {
            pins: ($($PX, )*),
            last: Option<$Word>,
        }

        impl<$($PX, )*> $GenericxBitBus<$($PX, )*>
        where
            $($PX: OutputPin, )*
        {
            /// Creates a bus from the data pins, least significant bit first.
            pub fn new(pins: ($($PX, )*)) -> Self {
                Self { pins, last: None }
            }

            /// Releases the data pins.
            pub fn release(self) -> ($($PX, )*) {
                self.pins
            }
        }

        impl<$($PX, )* E> OutputBus for $GenericxBitBus<$($PX, )*>
        where
            $($PX: OutputPin<Error = E>, )*
            E: core::fmt::Debug,
        {
            type Word = $Word;
            type Error = E;

            const KIND: InterfaceKind = $InterfaceKind;

            fn set_value(&mut self, value: Self::Word) -> Result<(), Self::Error> {
                if self.last == Some(value) {
                    // the lines already hold this value
                    return Ok(());
                }

                // a partially written value must not be skipped on retry
                self.last = None;
                $(
                    let bit = value & (1 << $x) != 0;
                    self.pins.$x.set_state(PinState::from(bit))?;
                )*
                self.last = Some(value);

                Ok(())
            }
        }

        impl<$($PX, )*> From<($($PX, )*)> for $GenericxBitBus<$($PX, )*>
        where
            $($PX: OutputPin, )*
        {
            fn from(pins: ($($PX, )*)) -> Self {
                Self::new(pins)
            }
        }
    };
}

generic_bus! {
    /// Eight GPIO pins used as an 8 bit data bus.
    Generic8BitBus {
        type Word = u8;
        const KIND: InterfaceKind = InterfaceKind::Parallel8Bit;
        Pins {
            P0 => 0,
            P1 => 1,
            P2 => 2,
            P3 => 3,
            P4 => 4,
            P5 => 5,
            P6 => 6,
            P7 => 7,
        }
    }
}

generic_bus! {
    /// Sixteen GPIO pins used as a 16 bit data bus.
    Generic16BitBus {
        type Word = u16;
        const KIND: InterfaceKind = InterfaceKind::Parallel16Bit;
        Pins {
            P0 => 0,
            P1 => 1,
            P2 => 2,
            P3 => 3,
            P4 => 4,
            P5 => 5,
            P6 => 6,
            P7 => 7,
            P8 => 8,
            P9 => 9,
            P10 => 10,
            P11 => 11,
            P12 => 12,
            P13 => 13,
            P14 => 14,
            P15 => 15,
        }
    }
}

/// Placeholder for a signal line that isn't wired to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPin;

impl digital::ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Assignment of the bus signals to host pins.
///
/// Chip-select and read-strobe are optional; boards that tie them to a fixed
/// level leave them as [`NoPin`].
#[derive(Debug)]
pub struct BusLines<BUS, DC, WR, CS = NoPin, RD = NoPin> {
    /// Data lines.
    pub data: BUS,
    /// Register-select (D/CX): low for command bytes, high for data bytes.
    pub dc: DC,
    /// Write strobe (WRX), latched by the controller on the rising edge.
    pub wr: WR,
    /// Chip select (CSX), active low.
    pub cs: CS,
    /// Read strobe (RDX). [`Interface::prepare`] drives it high and it stays
    /// there since the bus is only written. Boards that need RDX at another
    /// level should tie it in hardware and leave this as [`NoPin`].
    pub rd: RD,
}

impl<BUS, DC, WR> BusLines<BUS, DC, WR> {
    /// Creates a line assignment without chip-select and read-strobe pins.
    pub fn new(data: BUS, dc: DC, wr: WR) -> Self {
        Self {
            data,
            dc,
            wr,
            cs: NoPin,
            rd: NoPin,
        }
    }
}

impl<BUS, DC, WR, CS, RD> BusLines<BUS, DC, WR, CS, RD> {
    /// Adds a chip-select pin.
    #[must_use]
    pub fn chip_select<CS2: OutputPin>(self, cs: CS2) -> BusLines<BUS, DC, WR, CS2, RD> {
        BusLines {
            data: self.data,
            dc: self.dc,
            wr: self.wr,
            cs,
            rd: self.rd,
        }
    }

    /// Adds a read-strobe pin.
    #[must_use]
    pub fn read_strobe<RD2: OutputPin>(self, rd: RD2) -> BusLines<BUS, DC, WR, CS, RD2> {
        BusLines {
            data: self.data,
            dc: self.dc,
            wr: self.wr,
            cs: self.cs,
            rd,
        }
    }
}

/// Parallel interface error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParallelError<BUS, DC, WR, CS = Infallible, RD = Infallible> {
    /// Data lines error
    Bus(BUS),
    /// Register-select pin error
    Dc(DC),
    /// Write strobe pin error
    Wr(WR),
    /// Chip-select pin error
    Cs(CS),
    /// Read strobe pin error
    Rd(RD),
}

/// 8080 style write-only parallel interface driven from GPIO.
pub struct ParallelInterface<BUS, DC, WR, DELAY, CS = NoPin, RD = NoPin> {
    lines: BusLines<BUS, DC, WR, CS, RD>,
    delay: DELAY,
    strobe_hold_ns: u32,
}

impl<BUS, DC, WR, DELAY, CS, RD> ParallelInterface<BUS, DC, WR, DELAY, CS, RD>
where
    BUS: OutputBus,
    DC: OutputPin,
    WR: OutputPin,
    DELAY: DelayNs,
    CS: OutputPin,
    RD: OutputPin,
{
    /// Create new interface
    pub fn new(lines: BusLines<BUS, DC, WR, CS, RD>, delay: DELAY) -> Self {
        Self {
            lines,
            delay,
            strobe_hold_ns: DEFAULT_STROBE_HOLD_NS,
        }
    }

    /// Sets how long the write strobe is held low and then high for every
    /// transferred word. Zero skips the delay calls.
    #[must_use]
    pub fn with_strobe_hold_ns(mut self, hold_ns: u32) -> Self {
        self.strobe_hold_ns = hold_ns;
        self
    }

    /// Returns the strobe hold time in nanoseconds.
    pub fn strobe_hold_ns(&self) -> u32 {
        self.strobe_hold_ns
    }

    /// Release the bus lines and the delay source
    pub fn release(self) -> (BusLines<BUS, DC, WR, CS, RD>, DELAY) {
        (self.lines, self.delay)
    }

    async fn hold(&mut self) {
        if self.strobe_hold_ns > 0 {
            self.delay.delay_ns(self.strobe_hold_ns).await;
        }
    }

    fn select(
        &mut self,
    ) -> Result<(), ParallelError<BUS::Error, DC::Error, WR::Error, CS::Error, RD::Error>> {
        self.lines.cs.set_low().map_err(ParallelError::Cs)
    }

    fn set_register_select(
        &mut self,
        data: bool,
    ) -> Result<(), ParallelError<BUS::Error, DC::Error, WR::Error, CS::Error, RD::Error>> {
        self.lines
            .dc
            .set_state(PinState::from(data))
            .map_err(ParallelError::Dc)
    }

    /// One bus cycle: value on the data lines, then a full write strobe pulse.
    async fn send_word(
        &mut self,
        word: BUS::Word,
    ) -> Result<(), ParallelError<BUS::Error, DC::Error, WR::Error, CS::Error, RD::Error>> {
        self.lines.data.set_value(word).map_err(ParallelError::Bus)?;
        self.lines.wr.set_low().map_err(ParallelError::Wr)?;
        self.hold().await;
        self.lines.wr.set_high().map_err(ParallelError::Wr)?;
        self.hold().await;
        Ok(())
    }
}

impl<BUS, DC, WR, DELAY, CS, RD> Interface for ParallelInterface<BUS, DC, WR, DELAY, CS, RD>
where
    BUS: OutputBus,
    DC: OutputPin,
    WR: OutputPin,
    DELAY: DelayNs,
    CS: OutputPin,
    RD: OutputPin,
{
    type Word = BUS::Word;
    type Error = ParallelError<BUS::Error, DC::Error, WR::Error, CS::Error, RD::Error>;

    const KIND: InterfaceKind = BUS::KIND;

    async fn prepare(&mut self) -> Result<(), Self::Error> {
        self.lines.rd.set_high().map_err(ParallelError::Rd)?;
        self.lines.wr.set_high().map_err(ParallelError::Wr)?;
        self.lines.cs.set_high().map_err(ParallelError::Cs)
    }

    async fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error> {
        self.select()?;
        self.set_register_select(false)?;
        self.send_word(BUS::Word::from(command)).await?;
        self.set_register_select(true)?;
        for &arg in args {
            self.send_word(BUS::Word::from(arg)).await?;
        }
        Ok(())
    }

    async fn send_command_only(&mut self, command: u8) -> Result<(), Self::Error> {
        self.select()?;
        self.set_register_select(false)?;
        self.send_word(BUS::Word::from(command)).await
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.select()?;
        self.set_register_select(true)?;
        for &byte in data {
            self.send_word(BUS::Word::from(byte)).await?;
        }
        Ok(())
    }

    async fn send_data_slice(&mut self, data: &[Self::Word]) -> Result<(), Self::Error> {
        self.select()?;
        self.set_register_select(true)?;
        for &word in data {
            self.send_word(word).await?;
        }
        Ok(())
    }
}
