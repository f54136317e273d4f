//! GPIO LED
//!
//! An LED wired to an output pin, directly or through a transistor.

use pinlab_core::traits::Indicator;
use pinlab_hal::OutputPin;

/// GPIO LED
///
/// The DK's LEDs sit between VDD and the pin, so they light when the pin
/// is driven low; construct those with [`GpioLed::new_active_low`].
pub struct GpioLed<P> {
    pin: P,
    /// If true, LED lit = pin LOW
    active_low: bool,
}

impl<P: OutputPin> GpioLed<P> {
    /// Create a new LED and switch it off
    ///
    /// # Arguments
    /// - `pin`: The configured output pin
    /// - `active_low`: If true, the LED lights when the pin is LOW
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self { pin, active_low };
        led.set_lit(false);
        led
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Indicator for GpioLed<P> {
    fn set_lit(&mut self, lit: bool) {
        // Lit and active-high, or dark and active-low, both mean pin high
        self.pin.set_state(lit != self.active_low);
    }

    fn is_lit(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }

    fn invert(&mut self) {
        self.pin.toggle();
    }
}
