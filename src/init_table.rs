//! Table driven initialization sequences.
//!
//! A table is a flat byte slice of entries terminated by a zero opcode:
//!
//! ```text
//! [opcode, length, arg0 .. argN]* 0x00
//! ```
//!
//! The low seven bits of `length` are the number of argument bytes that
//! follow. The high bit asks for a settle delay after the command has been
//! sent. Opcode `0x00` can't be expressed as an entry because it ends the
//! table.
//!
//! ```
//! use ili9341_parallel::init_table::{CommandFrame, InitTable};
//!
//! let table = InitTable::new(&[0xF7, 1, 0x20, 0x11, 0x80, 0x00]);
//! let mut frames = table.frames();
//!
//! assert_eq!(frames.next(), Some(Ok(CommandFrame::new(0xF7, &[0x20]))));
//! assert_eq!(frames.next(), Some(Ok(CommandFrame::new(0x11, &[]).with_delay())));
//! assert_eq!(frames.next(), None);
//! ```

use embedded_hal_async::delay::DelayNs;

use crate::interface::Interface;

/// Opcode value that ends a table.
pub const SENTINEL: u8 = 0x00;
/// Length byte flag requesting the settle delay.
pub const DELAY_FLAG: u8 = 0x80;
/// Length byte bits holding the argument count.
pub const ARG_COUNT_MASK: u8 = 0x7F;

/// One controller register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame<'a> {
    /// Command byte, sent with register-select low.
    pub opcode: u8,
    /// Argument bytes, sent with register-select high.
    pub args: &'a [u8],
    /// Whether the controller needs the settle delay after this command.
    pub requires_delay: bool,
}

impl<'a> CommandFrame<'a> {
    /// Creates a frame without settle delay.
    pub const fn new(opcode: u8, args: &'a [u8]) -> Self {
        Self {
            opcode,
            args,
            requires_delay: false,
        }
    }

    /// Marks the frame as requiring the settle delay.
    #[must_use]
    pub const fn with_delay(mut self) -> Self {
        self.requires_delay = true;
        self
    }

    /// Sends the frame as a full command frame.
    pub async fn send<DI>(&self, di: &mut DI) -> Result<(), DI::Error>
    where
        DI: Interface + ?Sized,
    {
        di.send_command(self.opcode, self.args).await
    }
}

/// Framing error in an init table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitTableError {
    /// The table ended where an opcode or the terminator was expected.
    MissingTerminator {
        /// Offset where the opcode should have been.
        offset: usize,
    },
    /// The table ended before the length byte of an entry.
    MissingLength {
        /// Opcode of the entry.
        opcode: u8,
        /// Offset of the entry.
        offset: usize,
    },
    /// An entry declares more arguments than the table holds.
    Truncated {
        /// Opcode of the entry.
        opcode: u8,
        /// Offset of the entry.
        offset: usize,
        /// Declared argument count.
        declared: u8,
        /// Bytes left after the length byte.
        available: usize,
    },
}

impl core::fmt::Display for InitTableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingTerminator { offset } => {
                write!(f, "init table ends at byte {offset} without terminator")
            }
            Self::MissingLength { opcode, offset } => {
                write!(f, "entry {opcode:#04x} at byte {offset} has no length byte")
            }
            Self::Truncated {
                opcode,
                offset,
                declared,
                available,
            } => write!(
                f,
                "entry {opcode:#04x} at byte {offset} declares {declared} arguments, {available} available"
            ),
        }
    }
}

/// A borrowed init table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitTable<'a> {
    bytes: &'a [u8],
}

impl<'a> InitTable<'a> {
    /// Wraps raw table bytes. Nothing is checked until the table is walked.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the raw table bytes.
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns an iterator over the table's frames.
    pub fn frames(&self) -> Frames<'a> {
        Frames {
            bytes: self.bytes,
            cursor: 0,
            state: State::ReadOpcode,
        }
    }

    /// Walks the whole table without sending anything and returns the number
    /// of entries.
    pub fn validate(&self) -> Result<usize, InitTableError> {
        let mut entries = 0;
        for frame in self.frames() {
            frame?;
            entries += 1;
        }
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadOpcode,
    ReadLength { opcode: u8, offset: usize },
    ReadArguments { opcode: u8, offset: usize, length: u8 },
    Halted,
}

/// Iterator over the frames of an [`InitTable`].
///
/// Stops at the terminator and after the first error. Bytes after the
/// terminator are never read.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    bytes: &'a [u8],
    cursor: usize,
    state: State,
}

impl<'a> Frames<'a> {
    /// Number of table bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Returns `true` once the terminator or an error has been reached.
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.cursor)?;
        self.cursor += 1;
        Some(byte)
    }

    fn fail(&mut self, error: InitTableError) -> Option<Result<CommandFrame<'a>, InitTableError>> {
        self.state = State::Halted;
        Some(Err(error))
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<CommandFrame<'a>, InitTableError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Halted => return None,
                State::ReadOpcode => {
                    let offset = self.cursor;
                    match self.next_byte() {
                        Some(SENTINEL) => {
                            self.state = State::Halted;
                            return None;
                        }
                        Some(opcode) => self.state = State::ReadLength { opcode, offset },
                        None => return self.fail(InitTableError::MissingTerminator { offset }),
                    }
                }
                State::ReadLength { opcode, offset } => match self.next_byte() {
                    Some(length) => {
                        self.state = State::ReadArguments {
                            opcode,
                            offset,
                            length,
                        }
                    }
                    None => return self.fail(InitTableError::MissingLength { opcode, offset }),
                },
                State::ReadArguments {
                    opcode,
                    offset,
                    length,
                } => {
                    let count = length & ARG_COUNT_MASK;
                    let start = self.cursor;
                    let end = start + usize::from(count);
                    let Some(args) = self.bytes.get(start..end) else {
                        return self.fail(InitTableError::Truncated {
                            opcode,
                            offset,
                            declared: count,
                            available: self.bytes.len() - start,
                        });
                    };
                    self.cursor = end;
                    self.state = State::ReadOpcode;

                    let frame = CommandFrame::new(opcode, args);
                    return Some(Ok(if length & DELAY_FLAG != 0 {
                        frame.with_delay()
                    } else {
                        frame
                    }));
                }
            }
        }
    }
}

impl core::iter::FusedIterator for Frames<'_> {}

/// Error returned by [`replay`].
#[derive(Debug)]
pub enum ReplayError<DiError> {
    /// Error caused by the display interface.
    Interface(DiError),
    /// The table is malformed. Entries before the bad one have been sent.
    Table(InitTableError),
}

/// Sends every entry of `table` as a full frame, waiting `settle_delay_ms`
/// after each entry flagged for delay. Returns the number of frames sent.
pub async fn replay<DI, DELAY>(
    table: InitTable<'_>,
    di: &mut DI,
    delay: &mut DELAY,
    settle_delay_ms: u32,
) -> Result<usize, ReplayError<DI::Error>>
where
    DI: Interface + ?Sized,
    DELAY: DelayNs,
{
    let mut sent = 0;
    for frame in table.frames() {
        let frame = frame.map_err(|e| {
            log::warn!("init table rejected: {}", e);
            ReplayError::Table(e)
        })?;
        log::trace!(
            "init {:#04x}, {} args{}",
            frame.opcode,
            frame.args.len(),
            if frame.requires_delay { ", settle" } else { "" }
        );

        frame.send(di).await.map_err(ReplayError::Interface)?;
        if frame.requires_delay {
            delay.delay_ms(settle_delay_ms).await;
        }
        sent += 1;
    }
    log::debug!("init table replayed, {} frames", sent);
    Ok(sent)
}
