//! Board constants and pin setup
//!
//! The constants come from `board.toml`, validated by the build script.

use heapless::Vec;
use pinlab_core::buttons::ButtonGroup;
use pinlab_core::fault::ConfigFault;
use pinlab_drivers::{GpioButton, GpioLed};
use pinlab_hal_nrf52::{InputHandle, OutputHandle, PinConfig, Port, PortError, PortRegisters};

include!(concat!(env!("OUT_DIR"), "/board.rs"));

/// The buttons as one group, lowest pin first
pub const BUTTON_GROUP: ButtonGroup = match ButtonGroup::new(BUTTON_PINS[0], BUTTON_PINS.len() as u8) {
    Ok(group) => group,
    Err(_) => panic!("buttons in board.toml do not form a group"),
};

pub type Led<'a, R> = GpioLed<OutputHandle<'a, R>>;
pub type Button<'a, R> = GpioButton<InputHandle<'a, R>>;

/// Configure every LED and button pin
///
/// LEDs are switched off first so they do not flash while the rest of the
/// board comes up.
pub fn configure<R: PortRegisters>(port: &mut Port<R>) -> Result<(), PortError> {
    port.configure_pins(&LED_PINS, PinConfig::LED)?;
    leds_off(port)?;
    port.configure_pins(&BUTTON_PINS, PinConfig::BUTTON)?;
    Ok(())
}

/// Switch every LED off with one register write
pub fn leds_off<R: PortRegisters>(port: &Port<R>) -> Result<(), PortError> {
    if LEDS_ACTIVE_LOW {
        port.set_outputs(LED_MASK)
    } else {
        port.clear_outputs(LED_MASK)
    }
}

/// Switch every LED on with one register write
pub fn leds_on<R: PortRegisters>(port: &Port<R>) -> Result<(), PortError> {
    if LEDS_ACTIVE_LOW {
        port.clear_outputs(LED_MASK)
    } else {
        port.set_outputs(LED_MASK)
    }
}

/// LED drivers in chase order
pub fn leds<R: PortRegisters>(port: &Port<R>) -> Result<Vec<Led<'_, R>, LED_COUNT>, PortError> {
    LED_PINS
        .iter()
        .map(|&pin| port.output(pin).map(|handle| GpioLed::new(handle, LEDS_ACTIVE_LOW)))
        .collect()
}

/// Button `index` (0 = BUTTON1)
pub fn button<R: PortRegisters>(port: &Port<R>, index: u8) -> Result<Button<'_, R>, ConfigFault> {
    let pin = BUTTON_GROUP.pin(index).ok_or(ConfigFault::MissingButton(index))?;
    Ok(GpioButton::new(port.input(pin)?, BUTTONS_ACTIVE_LOW))
}
