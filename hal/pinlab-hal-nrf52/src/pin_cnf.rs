//! `PIN_CNF` field packing
//!
//! Layout of the per-pin configuration word:
//!
//! | Bits  | Field | Values |
//! |-------|-------|--------|
//! | 0     | DIR   | 0 input, 1 output |
//! | 1     | INPUT | 0 connect buffer, 1 disconnect |
//! | 2-3   | PULL  | 0 none, 1 down, 3 up |
//! | 8-10  | DRIVE | S0S1 .. H0D1 |
//! | 16-17 | SENSE | 0 disabled, 2 high, 3 low |

use core::fmt;

const DIR_SHIFT: u32 = 0;
const INPUT_SHIFT: u32 = 1;
const PULL_SHIFT: u32 = 2;
const DRIVE_SHIFT: u32 = 8;
const SENSE_SHIFT: u32 = 16;

/// Every bit a valid configuration may set
const DEFINED_BITS: u32 = 0x0003_070F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input = 0,
    Output = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputBuffer {
    Connect = 0,
    Disconnect = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    Disabled = 0,
    PullDown = 1,
    PullUp = 3,
}

/// Drive strength for '0' and '1'
///
/// S = standard, H = high drive, D = disconnected (open drain/source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    S0S1 = 0,
    H0S1 = 1,
    S0H1 = 2,
    H0H1 = 3,
    D0S1 = 4,
    D0H1 = 5,
    S0D1 = 6,
    H0D1 = 7,
}

/// Level that raises the DETECT signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sense {
    Disabled = 0,
    High = 2,
    Low = 3,
}

/// Raw word that is not a valid configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinConfigError {
    /// PULL field value 2
    InvalidPull(u8),
    /// SENSE field value 1
    InvalidSense(u8),
    /// Bits outside the defined fields are set
    ReservedBits(u32),
}

impl fmt::Display for PinConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPull(v) => write!(f, "invalid PULL value {}", v),
            Self::InvalidSense(v) => write!(f, "invalid SENSE value {}", v),
            Self::ReservedBits(bits) => write!(f, "reserved bits set: 0x{:08x}", bits),
        }
    }
}

/// Decoded `PIN_CNF` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub dir: Direction,
    pub input: InputBuffer,
    pub pull: Pull,
    pub drive: Drive,
    pub sense: Sense,
}

impl PinConfig {
    /// Value after reset: input with the buffer disconnected
    pub const RESET: Self = Self {
        dir: Direction::Input,
        input: InputBuffer::Disconnect,
        pull: Pull::Disabled,
        drive: Drive::S0S1,
        sense: Sense::Disabled,
    };

    /// LED pin on the DK (`0x0000_0103`)
    pub const LED: Self = Self::output(Drive::H0S1);

    /// Button pin on the DK (`0x0000_010C`)
    pub const BUTTON: Self = Self::input(Pull::PullUp, Drive::H0S1);

    /// Output with the input buffer disconnected and no pull
    pub const fn output(drive: Drive) -> Self {
        Self {
            dir: Direction::Output,
            input: InputBuffer::Disconnect,
            pull: Pull::Disabled,
            drive,
            sense: Sense::Disabled,
        }
    }

    /// Input with the buffer connected
    pub const fn input(pull: Pull, drive: Drive) -> Self {
        Self {
            dir: Direction::Input,
            input: InputBuffer::Connect,
            pull,
            drive,
            sense: Sense::Disabled,
        }
    }

    pub const fn with_sense(mut self, sense: Sense) -> Self {
        self.sense = sense;
        self
    }

    pub const fn bits(&self) -> u32 {
        (self.dir as u32) << DIR_SHIFT
            | (self.input as u32) << INPUT_SHIFT
            | (self.pull as u32) << PULL_SHIFT
            | (self.drive as u32) << DRIVE_SHIFT
            | (self.sense as u32) << SENSE_SHIFT
    }

    pub fn from_bits(bits: u32) -> Result<Self, PinConfigError> {
        let reserved = bits & !DEFINED_BITS;
        if reserved != 0 {
            return Err(PinConfigError::ReservedBits(reserved));
        }

        let dir = if bits >> DIR_SHIFT & 1 == 0 {
            Direction::Input
        } else {
            Direction::Output
        };
        let input = if bits >> INPUT_SHIFT & 1 == 0 {
            InputBuffer::Connect
        } else {
            InputBuffer::Disconnect
        };
        let pull = match (bits >> PULL_SHIFT & 0b11) as u8 {
            0 => Pull::Disabled,
            1 => Pull::PullDown,
            3 => Pull::PullUp,
            v => return Err(PinConfigError::InvalidPull(v)),
        };
        let drive = match bits >> DRIVE_SHIFT & 0b111 {
            0 => Drive::S0S1,
            1 => Drive::H0S1,
            2 => Drive::S0H1,
            3 => Drive::H0H1,
            4 => Drive::D0S1,
            5 => Drive::D0H1,
            6 => Drive::S0D1,
            _ => Drive::H0D1,
        };
        let sense = match (bits >> SENSE_SHIFT & 0b11) as u8 {
            0 => Sense::Disabled,
            2 => Sense::High,
            3 => Sense::Low,
            v => return Err(PinConfigError::InvalidSense(v)),
        };

        Ok(Self {
            dir,
            input,
            pull,
            drive,
            sense,
        })
    }

    pub fn is_output(&self) -> bool {
        self.dir == Direction::Output
    }

    /// Whether `IN` reflects the pin
    pub fn input_connected(&self) -> bool {
        self.input == InputBuffer::Connect
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self::RESET
    }
}
