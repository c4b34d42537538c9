//! Interface traits and implementations

mod parallel;
pub use parallel::*;

/// Command and pixel interface
///
/// A frame always starts by selecting the controller. Frames never deselect it
/// again, so after any call the controller stays selected and the
/// register-select line keeps its last level.
pub trait Interface {
    /// The native width of the interface (u8 or u16 for parallel buses).
    type Word: Copy;

    /// Error type
    type Error: core::fmt::Debug;

    /// Kind of interface
    const KIND: InterfaceKind;

    /// Drives the idle levels of the bus before the first frame is sent.
    async fn prepare(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Send a full frame: the command byte, then each argument as data.
    ///
    /// Register-select switches from command to data exactly once, right after
    /// the command byte, even when `args` is empty.
    async fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error>;

    /// Send a command byte with no data phase.
    ///
    /// Register-select is left at the command level.
    async fn send_command_only(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Continue the data phase of the current frame with more bytes, one
    /// transfer per byte.
    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Send a raw slice of data, typically pre-formatted pixel data.
    /// `WriteMemoryStart` (or equivalent) must be sent before calling this function.
    /// If Self::Word is u8, data is &[u8]. If Self::Word is u16, data is &[u16].
    async fn send_data_slice(&mut self, data: &[Self::Word]) -> Result<(), Self::Error>;
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Word = T::Word;
    type Error = T::Error;
    const KIND: InterfaceKind = T::KIND;

    async fn prepare(&mut self) -> Result<(), Self::Error> {
        T::prepare(self).await
    }

    async fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error> {
        T::send_command(self, command, args).await
    }

    async fn send_command_only(&mut self, command: u8) -> Result<(), Self::Error> {
        T::send_command_only(self, command).await
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::send_data(self, data).await
    }

    async fn send_data_slice(&mut self, data: &[Self::Word]) -> Result<(), Self::Error> {
        T::send_data_slice(self, data).await
    }
}

/// Interface kind.
///
/// Width of the data bus the controller is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum InterfaceKind {
    /// 8080 style parallel interface with 8 data lines.
    Parallel8Bit,

    /// 8080 style parallel interface with 16 data lines.
    Parallel16Bit,
}
