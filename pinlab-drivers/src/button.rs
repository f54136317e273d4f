//! GPIO push button

use pinlab_hal::InputPin;

/// Push button on an input pin
///
/// DK buttons short the pin to ground against the internal pull-up, so a
/// press reads low.
pub struct GpioButton<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn is_pressed(&self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
