//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins, plus a port-wide
//! input read used by the button polling loops.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip. Pins handed out through this trait have already
/// been validated and configured, so the operations cannot fail.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// A port whose input register can be sampled as one word
///
/// Bit `n` of the result is the level of pin `n`. Only bits selected by
/// `mask` are returned; everything else reads as zero.
pub trait InputPort {
    /// Error type for rejected masks (e.g. unconfigured pins)
    type Error;

    /// Sample the input register, keeping only the bits in `mask`
    fn read_inputs(&mut self, mask: u32) -> Result<u32, Self::Error>;
}
