//! Mock implementations of embedded-hal and interface traits.
//!
//! Do not use types in this module outside of tests and doc tests.

use core::convert::Infallible;

use embedded_hal::digital;
use embedded_hal_async::delay::DelayNs;

use crate::{
    interface::{Interface, InterfaceKind, NoPin},
    Builder, Display,
};

#[cfg(test)]
pub use recording::*;

pub async fn new_mock_display() -> Display<MockDisplayInterface, NoPin> {
    Builder::new(MockDisplayInterface)
        .init(&mut MockDelay)
        .await
        .unwrap()
}

pub struct MockOutputPin;

impl digital::OutputPin for MockOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl digital::ErrorType for MockOutputPin {
    type Error = Infallible;
}

pub struct MockDelay;

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

pub struct MockDisplayInterface;

impl Interface for MockDisplayInterface {
    type Word = u8;
    type Error = Infallible;

    const KIND: InterfaceKind = InterfaceKind::Parallel8Bit;

    async fn send_command(&mut self, _command: u8, _args: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn send_command_only(&mut self, _command: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn send_data_slice(&mut self, _data: &[Self::Word]) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod recording {
    use alloc::{rc::Rc, vec::Vec};
    use core::{cell::RefCell, convert::Infallible, marker::PhantomData};

    use embedded_hal::digital::{self, ErrorKind};
    use embedded_hal_async::delay::DelayNs;

    use crate::interface::{BusLines, Interface, InterfaceKind, OutputBus, ParallelInterface};

    /// Signal lines seen by the recorder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Line {
        Dc,
        Wr,
        Cs,
        Rd,
        Rst,
        D(u8),
    }

    /// Everything a recorded bus or interface did, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum BusEvent {
        Pin(Line, bool),
        Word(u16),
        Delay(u32),
        Prepare,
        Command(u8, Vec<u8>),
        CommandOnly(u8),
        Data(Vec<u8>),
        Words(Vec<u16>),
    }

    type Log = Rc<RefCell<Vec<BusEvent>>>;

    /// Shared event log handing out recording pins, buses, delays and
    /// interfaces.
    #[derive(Default)]
    pub struct Recorder {
        log: Log,
    }

    pub type RecordingParallel<W> = ParallelInterface<
        RecordingBus<W>,
        RecordingPin,
        RecordingPin,
        RecordingDelay,
        RecordingPin,
        RecordingPin,
    >;

    impl Recorder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pin(&self, line: Line) -> RecordingPin {
            RecordingPin {
                line,
                log: self.log.clone(),
            }
        }

        pub fn delay(&self) -> RecordingDelay {
            RecordingDelay {
                log: self.log.clone(),
            }
        }

        pub fn interface(&self) -> RecordingInterface {
            RecordingInterface {
                log: self.log.clone(),
            }
        }

        fn lines<W>(
            &self,
        ) -> BusLines<RecordingBus<W>, RecordingPin, RecordingPin, RecordingPin, RecordingPin> {
            BusLines::new(
                RecordingBus {
                    log: self.log.clone(),
                    _word: PhantomData,
                },
                self.pin(Line::Dc),
                self.pin(Line::Wr),
            )
            .chip_select(self.pin(Line::Cs))
            .read_strobe(self.pin(Line::Rd))
        }

        pub fn interface8(&self) -> RecordingParallel<u8> {
            ParallelInterface::new(self.lines(), self.delay())
        }

        pub fn interface16(&self) -> RecordingParallel<u16> {
            ParallelInterface::new(self.lines(), self.delay())
        }

        pub fn events(&self) -> Vec<BusEvent> {
            self.log.borrow().clone()
        }

        pub fn clear(&self) {
            self.log.borrow_mut().clear();
        }

        /// Words latched by the controller, paired with the register-select
        /// level at the rising strobe edge.
        pub fn strobes(&self) -> Vec<(bool, u16)> {
            let mut strobes = Vec::new();
            let mut dc = false;
            let mut word = 0;
            let mut strobe_low = false;
            for event in self.log.borrow().iter() {
                match *event {
                    BusEvent::Pin(Line::Dc, level) => dc = level,
                    BusEvent::Word(value) => word = value,
                    BusEvent::Pin(Line::Wr, false) => strobe_low = true,
                    BusEvent::Pin(Line::Wr, true) if strobe_low => {
                        strobe_low = false;
                        strobes.push((dc, word));
                    }
                    _ => {}
                }
            }
            strobes
        }

        /// Event indices where register-select went from command to data.
        pub fn dc_rises(&self) -> Vec<usize> {
            let mut rises = Vec::new();
            let mut level = None;
            for (index, event) in self.log.borrow().iter().enumerate() {
                if let BusEvent::Pin(Line::Dc, high) = *event {
                    if high && level == Some(false) {
                        rises.push(index);
                    }
                    level = Some(high);
                }
            }
            rises
        }

        pub fn last_level(&self, line: Line) -> Option<bool> {
            self.log.borrow().iter().rev().find_map(|event| match *event {
                BusEvent::Pin(l, level) if l == line => Some(level),
                _ => None,
            })
        }
    }

    pub struct RecordingPin {
        line: Line,
        log: Log,
    }

    impl digital::ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl digital::OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Pin(self.line, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Pin(self.line, true));
            Ok(())
        }
    }

    pub struct RecordingBus<W> {
        log: Log,
        _word: PhantomData<W>,
    }

    impl OutputBus for RecordingBus<u8> {
        type Word = u8;
        type Error = Infallible;

        const KIND: InterfaceKind = InterfaceKind::Parallel8Bit;

        fn set_value(&mut self, value: Self::Word) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Word(u16::from(value)));
            Ok(())
        }
    }

    impl OutputBus for RecordingBus<u16> {
        type Word = u16;
        type Error = Infallible;

        const KIND: InterfaceKind = InterfaceKind::Parallel16Bit;

        fn set_value(&mut self, value: Self::Word) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Word(value));
            Ok(())
        }
    }

    /// Records every delay in nanoseconds.
    pub struct RecordingDelay {
        log: Log,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(BusEvent::Delay(ns));
        }

        async fn delay_us(&mut self, us: u32) {
            self.delay_ns(us * 1_000).await;
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.delay_ns(ms * 1_000_000).await;
        }
    }

    /// Interface that records frames instead of bus cycles.
    pub struct RecordingInterface {
        log: Log,
    }

    impl Interface for RecordingInterface {
        type Word = u8;
        type Error = Infallible;

        const KIND: InterfaceKind = InterfaceKind::Parallel8Bit;

        async fn prepare(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Prepare);
            Ok(())
        }

        async fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error> {
            self.log
                .borrow_mut()
                .push(BusEvent::Command(command, args.to_vec()));
            Ok(())
        }

        async fn send_command_only(&mut self, command: u8) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::CommandOnly(command));
            Ok(())
        }

        async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Data(data.to_vec()));
            Ok(())
        }

        async fn send_data_slice(&mut self, data: &[Self::Word]) -> Result<(), Self::Error> {
            let words = data.iter().copied().map(u16::from).collect();
            self.log.borrow_mut().push(BusEvent::Words(words));
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PinFault;

    impl digital::Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Output pin whose every write fails.
    pub struct FaultyPin;

    impl digital::ErrorType for FaultyPin {
        type Error = PinFault;
    }

    impl digital::OutputPin for FaultyPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }
    }
}
