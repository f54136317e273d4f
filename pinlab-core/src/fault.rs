//! Fault classification
//!
//! Every failure the firmware can hit falls into one of three buckets:
//!
//! - configuration faults (bad pin, pin used before it was configured,
//!   invalid board file), reported before any register is written;
//! - transient I/O faults (UART overrun, parity, framing, break, full FIFO);
//! - self-test failures (UART loopback mismatch).
//!
//! What happens next is decided by a [`FaultPolicy`]. The training
//! binaries run [`FaultPolicy::Strict`]: everything halts. A
//! [`FaultPolicy::Resilient`] caller logs transient I/O faults and
//! resynchronizes the receiver instead.

use core::fmt;

use crate::config::ConfigError;
use crate::loopback::LoopbackError;

/// Configuration faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFault {
    /// Pin index outside the port
    InvalidPin(u8),
    /// Pin not configured for the requested use
    UnconfiguredPin(u8),
    /// Button index past the end of the board's button group
    MissingButton(u8),
    /// Board description rejected
    Board(ConfigError),
}

impl fmt::Display for ConfigFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "invalid pin {}", pin),
            Self::UnconfiguredPin(pin) => write!(f, "pin {} not configured for this use", pin),
            Self::MissingButton(index) => write!(f, "board has no button {}", index),
            Self::Board(e) => write!(f, "board config: {}", e),
        }
    }
}

/// Transient serial I/O faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoFault {
    /// A byte arrived before the previous one was read
    Overrun,
    /// Parity bit mismatch
    Parity,
    /// Missing stop bit
    Framing,
    /// Line held low longer than a frame
    Break,
    /// Transmit FIFO or DMA buffer full, retry later
    FifoFull,
    /// Nothing received within the allowed time
    Timeout,
    /// Driver-specific failure
    Other,
}

impl fmt::Display for IoFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overrun => write!(f, "overrun"),
            Self::Parity => write!(f, "parity error"),
            Self::Framing => write!(f, "framing error"),
            Self::Break => write!(f, "break condition"),
            Self::FifoFull => write!(f, "fifo full"),
            Self::Timeout => write!(f, "receive timeout"),
            Self::Other => write!(f, "uart error"),
        }
    }
}

/// Any fault the firmware can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    Config(ConfigFault),
    Io(IoFault),
    SelfTest(LoopbackError),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration fault: {}", e),
            Self::Io(e) => write!(f, "i/o fault: {}", e),
            Self::SelfTest(e) => write!(f, "self-test failed: {}", e),
        }
    }
}

impl From<ConfigFault> for Fault {
    fn from(e: ConfigFault) -> Self {
        Fault::Config(e)
    }
}

impl From<ConfigError> for Fault {
    fn from(e: ConfigError) -> Self {
        Fault::Config(ConfigFault::Board(e))
    }
}

impl From<IoFault> for Fault {
    fn from(e: IoFault) -> Self {
        Fault::Io(e)
    }
}

impl From<LoopbackError> for Fault {
    fn from(e: LoopbackError) -> Self {
        Fault::SelfTest(e)
    }
}

/// How faults are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultPolicy {
    /// Every fault halts
    #[default]
    Strict,
    /// Transient I/O faults are logged and the link resynchronized
    Resilient,
}

/// What to do about a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Stop the program (error LEDs, park the core)
    Halt,
    /// Drop the current exchange and carry on
    Resync,
}

impl Fault {
    /// Whether retrying could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Fault::Io(_))
    }

    /// Decide what to do under `policy`
    pub fn disposition(&self, policy: FaultPolicy) -> Disposition {
        match policy {
            FaultPolicy::Resilient if self.is_transient() => Disposition::Resync,
            _ => Disposition::Halt,
        }
    }
}
