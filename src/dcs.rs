//! Typed controller commands.

use crate::{
    ili9341,
    interface::Interface,
    options::{ColorInversion, ColorOrder, DisplayOptions, Orientation},
};

/// Common trait for commands.
pub trait DcsCommand {
    /// Returns the instruction code.
    fn instruction(&self) -> u8;

    /// Fills the given buffer with the command parameters and returns how
    /// many bytes were written.
    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize;
}

/// Helpers to send commands over an [`Interface`].
pub trait InterfaceExt: Interface {
    /// Sends a typed command.
    ///
    /// Commands without parameters go out as command-only frames.
    async fn write_command(&mut self, command: impl DcsCommand) -> Result<(), Self::Error> {
        let mut param_bytes = [0u8; 16];
        let n = command.fill_params_buf(&mut param_bytes);
        if n == 0 {
            self.send_command_only(command.instruction()).await
        } else {
            self.write_raw(command.instruction(), &param_bytes[..n]).await
        }
    }

    /// Sends a raw register write as a full frame.
    async fn write_raw(&mut self, instruction: u8, param_bytes: &[u8]) -> Result<(), Self::Error> {
        self.send_command(instruction, param_bytes).await
    }
}

impl<T: Interface + ?Sized> InterfaceExt for T {}

macro_rules! dcs_basic_command {
    (
        #[doc = $tt:tt]
        $instr_name:ident = $instr:expr
    ) => {
        #[doc = $tt]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $instr_name;

        impl DcsCommand for $instr_name {
            fn instruction(&self) -> u8 {
                $instr
            }

            fn fill_params_buf(&self, _buffer: &mut [u8]) -> usize {
                0
            }
        }
    };
}

dcs_basic_command!(
    /// Software Reset
    SoftReset = ili9341::SWRESET
);
dcs_basic_command!(
    /// Enter Sleep Mode
    EnterSleepMode = ili9341::SLPIN
);
dcs_basic_command!(
    /// Exit Sleep Mode
    ExitSleepMode = ili9341::SLPOUT
);
dcs_basic_command!(
    /// Turn Display Off
    SetDisplayOff = ili9341::DISPOFF
);
dcs_basic_command!(
    /// Turn Display On
    SetDisplayOn = ili9341::DISPON
);
dcs_basic_command!(
    /// Initiate Framebuffer Memory Write
    WriteMemoryStart = ili9341::RAMWR
);

/// Set Column Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetColumnAddress {
    start_column: u16,
    end_column: u16,
}

impl SetColumnAddress {
    /// Creates a new Set Column Address command.
    pub const fn new(start_column: u16, end_column: u16) -> Self {
        Self {
            start_column,
            end_column,
        }
    }
}

impl DcsCommand for SetColumnAddress {
    fn instruction(&self) -> u8 {
        ili9341::CASET
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0..2].copy_from_slice(&self.start_column.to_be_bytes());
        buffer[2..4].copy_from_slice(&self.end_column.to_be_bytes());
        4
    }
}

/// Set Page Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPageAddress {
    start_row: u16,
    end_row: u16,
}

impl SetPageAddress {
    /// Creates a new Set Page Address command.
    pub const fn new(start_row: u16, end_row: u16) -> Self {
        Self { start_row, end_row }
    }
}

impl DcsCommand for SetPageAddress {
    fn instruction(&self) -> u8 {
        ili9341::PASET
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0..2].copy_from_slice(&self.start_row.to_be_bytes());
        buffer[2..4].copy_from_slice(&self.end_row.to_be_bytes());
        4
    }
}

/// Set Address Mode (MADCTL)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetAddressMode(u8);

impl SetAddressMode {
    /// Row address order, bottom to top.
    pub const MY: u8 = 0x80;
    /// Column address order, right to left.
    pub const MX: u8 = 0x40;
    /// Row/column exchange.
    pub const MV: u8 = 0x20;
    /// Vertical refresh order.
    pub const ML: u8 = 0x10;
    /// BGR colour filter panel.
    pub const BGR: u8 = 0x08;
    /// Horizontal refresh order.
    pub const MH: u8 = 0x04;

    /// Creates a new Set Address Mode command.
    pub const fn new(orientation: Orientation, color_order: ColorOrder) -> Self {
        let rotation = match orientation {
            Orientation::Portrait => Self::MX,
            Orientation::Landscape => Self::MV,
            Orientation::PortraitFlipped => Self::MY,
            Orientation::LandscapeFlipped => Self::MX | Self::MY | Self::MV,
        };
        let order = match color_order {
            ColorOrder::Rgb => 0,
            ColorOrder::Bgr => Self::BGR,
        };
        Self(rotation | order)
    }

    /// Returns the raw register value.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl From<&DisplayOptions> for SetAddressMode {
    fn from(options: &DisplayOptions) -> Self {
        Self::new(options.orientation, options.color_order)
    }
}

impl DcsCommand for SetAddressMode {
    fn instruction(&self) -> u8 {
        ili9341::MADCTL
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0] = self.0;
        1
    }
}

/// Enter or exit display inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetInvertMode(ColorInversion);

impl SetInvertMode {
    /// Creates a new Set Invert Mode command.
    pub const fn new(color_inversion: ColorInversion) -> Self {
        Self(color_inversion)
    }
}

impl DcsCommand for SetInvertMode {
    fn instruction(&self) -> u8 {
        match self.0 {
            ColorInversion::Normal => ili9341::INVOFF,
            ColorInversion::Inverted => ili9341::INVON,
        }
    }

    fn fill_params_buf(&self, _buffer: &mut [u8]) -> usize {
        0
    }
}

/// Set Scroll Start (VSCRSADD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScrollStart(u16);

impl SetScrollStart {
    /// Creates a new Set Scroll Start command.
    pub const fn new(offset: u16) -> Self {
        Self(offset)
    }
}

impl DcsCommand for SetScrollStart {
    fn instruction(&self) -> u8 {
        ili9341::VSCRSADD
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0..2].copy_from_slice(&self.0.to_be_bytes());
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(command: impl DcsCommand) -> (u8, [u8; 16], usize) {
        let mut buffer = [0u8; 16];
        let n = command.fill_params_buf(&mut buffer);
        (command.instruction(), buffer, n)
    }

    #[test]
    fn column_address_is_big_endian() {
        let (instruction, buffer, n) = params(SetColumnAddress::new(0x0123, 0x00EF));
        assert_eq!(instruction, 0x2A);
        assert_eq!(&buffer[..n], &[0x01, 0x23, 0x00, 0xEF]);
    }

    #[test]
    fn page_address_is_big_endian() {
        let (instruction, buffer, n) = params(SetPageAddress::new(0x0032, 0x013F));
        assert_eq!(instruction, 0x2B);
        assert_eq!(&buffer[..n], &[0x00, 0x32, 0x01, 0x3F]);
    }

    #[test]
    fn address_mode_bits() {
        let portrait = SetAddressMode::new(Orientation::Portrait, ColorOrder::Bgr);
        assert_eq!(portrait.bits(), 0x48);

        let landscape = SetAddressMode::new(Orientation::Landscape, ColorOrder::Rgb);
        assert_eq!(landscape.bits(), 0x20);

        let flipped = SetAddressMode::new(Orientation::LandscapeFlipped, ColorOrder::Bgr);
        assert_eq!(flipped.bits(), 0xE8);
    }

    #[test]
    fn invert_mode_selects_instruction() {
        assert_eq!(SetInvertMode::new(ColorInversion::Normal).instruction(), 0x20);
        assert_eq!(SetInvertMode::new(ColorInversion::Inverted).instruction(), 0x21);
        assert_eq!(params(SetInvertMode::new(ColorInversion::Inverted)).2, 0);
    }

    #[test]
    fn scroll_start_is_big_endian() {
        let (instruction, buffer, n) = params(SetScrollStart::new(0x0140));
        assert_eq!(instruction, 0x37);
        assert_eq!(&buffer[..n], &[0x01, 0x40]);
    }
}
