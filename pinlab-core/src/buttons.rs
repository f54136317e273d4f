//! Button watcher and the UART echo exercise
//!
//! The UART training program samples a group of buttons, spins until any of them
//! changes, and prints one ASCII character derived from the new pattern:
//! `'0'` plus the group's bits shifted down to bit 0. With four buttons that
//! gives `'0'..='?'`.

use core::fmt;

use pinlab_hal::{InputPort, UartTx};

use crate::delay::{Cancelled, Shutdown};
use crate::fault::Fault;

/// Largest group one echo character can describe
pub const MAX_GROUP_PINS: u8 = 4;

/// Rejected button group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonGroupError {
    /// Zero pins, or more than [`MAX_GROUP_PINS`]
    InvalidCount(u8),
    /// Group runs past pin 31
    OutOfRange,
}

/// Consecutive input pins read as one small integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonGroup {
    first_pin: u8,
    count: u8,
}

impl ButtonGroup {
    /// Group of `count` pins starting at `first_pin`
    pub const fn new(first_pin: u8, count: u8) -> Result<Self, ButtonGroupError> {
        if count == 0 || count > MAX_GROUP_PINS {
            return Err(ButtonGroupError::InvalidCount(count));
        }
        if first_pin as u16 + count as u16 > 32 {
            return Err(ButtonGroupError::OutOfRange);
        }
        Ok(Self { first_pin, count })
    }

    pub fn first_pin(&self) -> u8 {
        self.first_pin
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Port pin of button `index` within the group
    pub const fn pin(&self, index: u8) -> Option<u8> {
        if index < self.count {
            Some(self.first_pin + index)
        } else {
            None
        }
    }

    /// Port bitmask covering the group
    pub fn mask(&self) -> u32 {
        ((1u32 << self.count) - 1) << self.first_pin
    }

    /// Group bits of a raw port value, shifted down to bit 0
    pub fn extract(&self, raw: u32) -> u8 {
        ((raw & self.mask()) >> self.first_pin) as u8
    }
}

/// Character printed for a group value
pub fn echo_char(bits: u8) -> u8 {
    b'0' + (bits & 0x0F)
}

/// Why a wait ended without a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError<E> {
    /// The port refused the read
    Port(E),
    /// Shutdown requested
    Cancelled,
}

/// Tracks the last seen state of a button group
#[derive(Debug, Clone)]
pub struct ButtonWatcher {
    group: ButtonGroup,
    baseline: u32,
}

impl ButtonWatcher {
    /// Capture the current state as the baseline
    ///
    /// This is one read of the port.
    pub fn new<P: InputPort>(port: &mut P, group: ButtonGroup) -> Result<Self, P::Error> {
        let baseline = port.read_inputs(group.mask())?;
        Ok(Self { group, baseline })
    }

    pub fn group(&self) -> ButtonGroup {
        self.group
    }

    /// Group value the next change is measured against
    pub fn baseline(&self) -> u8 {
        self.group.extract(self.baseline)
    }

    /// Spin until the group differs from the baseline
    ///
    /// Returns the new group value and makes it the baseline. The value is
    /// the one from the read that saw the change; the port is not sampled a
    /// second time. `shutdown` is checked before every read.
    pub fn wait_for_change<P, S>(&mut self, port: &mut P, shutdown: &S) -> Result<u8, WaitError<P::Error>>
    where
        P: InputPort,
        S: Shutdown + ?Sized,
    {
        let mask = self.group.mask();
        loop {
            if shutdown.requested() {
                return Err(WaitError::Cancelled);
            }
            let sample = port.read_inputs(mask).map_err(WaitError::Port)?;
            if sample != self.baseline {
                self.baseline = sample;
                return Ok(self.group.extract(sample));
            }
        }
    }
}

/// Why an echo step produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoError {
    /// Shutdown requested while waiting
    Cancelled,
    /// Port or UART failure
    Fault(Fault),
}

impl fmt::Display for EchoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => fmt::Display::fmt(&Cancelled, f),
            Self::Fault(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

impl From<Cancelled> for EchoError {
    fn from(_: Cancelled) -> Self {
        EchoError::Cancelled
    }
}

/// Button-to-UART echo loop
pub struct ButtonEcho {
    watcher: ButtonWatcher,
}

impl ButtonEcho {
    pub fn new(watcher: ButtonWatcher) -> Self {
        Self { watcher }
    }

    pub fn watcher(&self) -> &ButtonWatcher {
        &self.watcher
    }

    /// Wait for a button change and send its character
    ///
    /// Returns the character sent.
    pub fn step<P, U, S>(&mut self, port: &mut P, uart: &mut U, shutdown: &S) -> Result<u8, EchoError>
    where
        P: InputPort,
        P::Error: Into<Fault>,
        U: UartTx,
        U::Error: Into<Fault>,
        S: Shutdown + ?Sized,
    {
        let bits = match self.watcher.wait_for_change(port, shutdown) {
            Ok(bits) => bits,
            Err(WaitError::Cancelled) => return Err(EchoError::Cancelled),
            Err(WaitError::Port(e)) => return Err(EchoError::Fault(e.into())),
        };
        let ch = echo_char(bits);
        uart.write_byte(ch)
            .map_err(|e| EchoError::Fault(e.into()))?;
        Ok(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::{Never, ShutdownSignal};
    use crate::fault::{ConfigFault, IoFault};
    use crate::testing::{MockInputPort, MockUart};
    use proptest::prelude::*;

    const DK_BUTTONS: ButtonGroup = match ButtonGroup::new(13, 4) {
        Ok(group) => group,
        Err(_) => panic!("bad group"),
    };

    /// All four DK buttons released (pulled up)
    const RELEASED: u32 = 0xF << 13;

    #[test]
    fn test_group_mask_and_extract() {
        assert_eq!(DK_BUTTONS.mask(), 0x0001_E000);
        assert_eq!(DK_BUTTONS.extract(RELEASED), 0xF);
        assert_eq!(DK_BUTTONS.extract(0b1010 << 13 | 1 << 12 | 1 << 17), 0b1010);
    }

    #[test]
    fn test_group_validation() {
        assert_eq!(ButtonGroup::new(0, 0), Err(ButtonGroupError::InvalidCount(0)));
        assert_eq!(ButtonGroup::new(0, 5), Err(ButtonGroupError::InvalidCount(5)));
        assert_eq!(ButtonGroup::new(30, 3), Err(ButtonGroupError::OutOfRange));
        assert!(ButtonGroup::new(28, 4).is_ok());
    }

    #[test]
    fn test_group_pin_lookup_stops_at_count() {
        assert_eq!(DK_BUTTONS.pin(0), Some(13));
        assert_eq!(DK_BUTTONS.pin(3), Some(16));
        assert_eq!(DK_BUTTONS.pin(4), None);
        assert_eq!(DK_BUTTONS.pin(u8::MAX), None);
    }

    #[test]
    fn test_echo_char_range() {
        assert_eq!(echo_char(0), b'0');
        assert_eq!(echo_char(9), b'9');
        assert_eq!(echo_char(0xF), b'?');
    }

    #[test]
    fn test_returns_on_read_after_change() {
        for n in 1..20 {
            // Reads 1..=n see the released state, read n+1 sees button 1 pressed
            let mut port = MockInputPort::new(RELEASED).change_on_read(n + 1, RELEASED & !(1 << 13));
            let mut watcher = ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap();
            let bits = watcher.wait_for_change(&mut port, &Never).unwrap();

            assert_eq!(bits, 0b1110);
            assert_eq!(port.reads.get(), n + 1);
            assert_eq!(watcher.baseline(), 0b1110);
        }
    }

    #[test]
    fn test_ignores_changes_outside_group() {
        let mut port = MockInputPort::new(RELEASED);
        let mut watcher = ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap();

        // LED pin 17 and pin 12 change right away; button 4 only on read 6
        port.value = RELEASED | 1 << 17 | 1 << 12;
        port.change = Some((6, (RELEASED & !(1 << 16)) | 1 << 17));

        let bits = watcher.wait_for_change(&mut port, &Never).unwrap();
        assert_eq!(bits, 0b0111);
        assert_eq!(port.reads.get(), 6);
    }

    #[test]
    fn test_wait_cancelled() {
        let mut port = MockInputPort::new(RELEASED);
        let mut watcher = ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap();

        let signal = ShutdownSignal::new();
        signal.raise();
        assert_eq!(
            watcher.wait_for_change(&mut port, &signal),
            Err(WaitError::Cancelled)
        );
        assert_eq!(port.reads.get(), 1);
    }

    #[test]
    fn test_port_error_propagates() {
        let mut port = MockInputPort::new(RELEASED);
        port.forbidden = 1 << 15;
        assert_eq!(ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap_err(), 15);
    }

    impl From<u8> for Fault {
        fn from(pin: u8) -> Self {
            Fault::Config(ConfigFault::UnconfiguredPin(pin))
        }
    }

    #[test]
    fn test_echo_step_sends_character() {
        let mut port = MockInputPort::new(RELEASED).change_on_read(4, RELEASED & !(0b0011 << 13));
        let watcher = ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap();
        let mut echo = ButtonEcho::new(watcher);
        let mut uart = MockUart::new();

        assert_eq!(echo.step(&mut port, &mut uart, &Never), Ok(b'<'));
        assert_eq!(uart.sent.as_slice(), b"<");
    }

    #[test]
    fn test_echo_step_reports_uart_fault() {
        let mut port = MockInputPort::new(RELEASED).change_on_read(2, 0);
        let watcher = ButtonWatcher::new(&mut port, DK_BUTTONS).unwrap();
        let mut echo = ButtonEcho::new(watcher);
        let mut uart = MockUart::new();
        uart.fail_write = Some(IoFault::Overrun);

        assert_eq!(
            echo.step(&mut port, &mut uart, &Never),
            Err(EchoError::Fault(Fault::Io(IoFault::Overrun)))
        );
    }

    proptest! {
        #[test]
        fn prop_char_matches_group_bits(raw in any::<u32>()) {
            let bits = DK_BUTTONS.extract(raw);
            prop_assert!(bits <= 0xF);
            prop_assert_eq!(echo_char(bits), b'0' + ((raw >> 13) & 0xF) as u8);
        }
    }
}
