//! Board pin assignments
//!
//! Defaults describe the nRF52 DK (PCA10040): four active-low LEDs on
//! P0.17-P0.20, four active-low buttons on P0.13-P0.16 and the
//! interface-MCU UART on P0.05-P0.08.

use core::fmt;

use heapless::Vec;
use pinlab_hal::UartConfig;

use crate::buttons::{ButtonGroup, MAX_GROUP_PINS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of pins on one GPIO port
pub const PORT_PIN_COUNT: u8 = 32;

/// Maximum LEDs per board
pub const MAX_LEDS: usize = 8;

/// Maximum buttons per board (one echo character covers at most four)
pub const MAX_BUTTONS: usize = MAX_GROUP_PINS as usize;

/// Baud rates the nRF52 UARTE can generate
pub const SUPPORTED_BAUDRATES: [u32; 18] = [
    1200, 2400, 4800, 9600, 14400, 19200, 28800, 31250, 38400, 56000, 57600, 76800, 115200,
    230400, 250000, 460800, 921600, 1_000_000,
];

/// Board configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin number is not on the port (0-31 valid)
    PinOutOfRange(u8),
    /// Pin assigned to more than one function
    PinConflict(u8),
    /// At least one LED is required
    NoLeds,
    /// Buttons must occupy consecutive, ascending pins
    ButtonsNotContiguous,
    /// Baud rate not generated by the UARTE
    UnsupportedBaudrate(u32),
    /// Data bits, parity or stop bits the UARTE cannot produce
    UnsupportedFraming,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinOutOfRange(pin) => write!(f, "pin {} out of range (0-31)", pin),
            Self::PinConflict(pin) => write!(f, "pin {} assigned more than once", pin),
            Self::NoLeds => write!(f, "at least one LED is required"),
            Self::ButtonsNotContiguous => write!(f, "buttons must be on consecutive pins"),
            Self::UnsupportedBaudrate(baud) => write!(f, "unsupported baud rate {}", baud),
            Self::UnsupportedFraming => write!(f, "unsupported UART framing"),
        }
    }
}

/// UART pin assignment and line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartPins {
    /// Receive data pin
    pub rx: u8,
    /// Transmit data pin
    pub tx: u8,
    /// Request-to-send pin (used with flow control)
    pub rts: u8,
    /// Clear-to-send pin (used with flow control)
    pub cts: u8,
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Enable RTS/CTS hardware flow control
    pub flow_control: bool,
}

impl Default for UartPins {
    fn default() -> Self {
        Self {
            rx: 8,
            tx: 6,
            rts: 5,
            cts: 7,
            baudrate: 115200,
            flow_control: false,
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// LED pins, in chase order
    pub leds: Vec<u8, MAX_LEDS>,
    /// LEDs light when the pin is driven low
    pub leds_active_low: bool,
    /// Button pins, lowest first
    pub buttons: Vec<u8, MAX_BUTTONS>,
    /// Buttons pull the pin low when pressed
    pub buttons_active_low: bool,
    /// UART settings
    pub uart: UartPins,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::nrf52_dk()
    }
}

impl BoardConfig {
    /// nRF52 DK (PCA10040) pin map
    pub fn nrf52_dk() -> Self {
        let mut leds = Vec::new();
        let mut buttons = Vec::new();
        for pin in 17..=20 {
            let _ = leds.push(pin);
        }
        for pin in 13..=16 {
            let _ = buttons.push(pin);
        }
        Self {
            leds,
            leds_active_low: true,
            buttons,
            buttons_active_low: true,
            uart: UartPins::default(),
        }
    }

    /// Check the configuration before any pin is touched
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leds.is_empty() {
            return Err(ConfigError::NoLeds);
        }

        let uart = &self.uart;
        let mut uart_pins: Vec<u8, 4> = Vec::new();
        let _ = uart_pins.extend_from_slice(&[uart.rx, uart.tx]);
        if uart.flow_control {
            let _ = uart_pins.extend_from_slice(&[uart.rts, uart.cts]);
        }

        let mut used: u32 = 0;
        for &pin in self.leds.iter().chain(self.buttons.iter()).chain(uart_pins.iter()) {
            if pin >= PORT_PIN_COUNT {
                return Err(ConfigError::PinOutOfRange(pin));
            }
            let bit = 1u32 << pin;
            if used & bit != 0 {
                return Err(ConfigError::PinConflict(pin));
            }
            used |= bit;
        }

        if !self.buttons.is_empty() && self.button_group().is_none() {
            return Err(ConfigError::ButtonsNotContiguous);
        }

        if !SUPPORTED_BAUDRATES.contains(&uart.baudrate) {
            return Err(ConfigError::UnsupportedBaudrate(uart.baudrate));
        }

        Ok(())
    }

    /// Port bitmask covering every LED pin
    pub fn led_mask(&self) -> u32 {
        self.leds
            .iter()
            .filter(|&&pin| pin < PORT_PIN_COUNT)
            .fold(0, |mask, &pin| mask | (1 << pin))
    }

    /// Buttons as one contiguous bit group, if they form one
    pub fn button_group(&self) -> Option<ButtonGroup> {
        let first = *self.buttons.first()?;
        let contiguous = self
            .buttons
            .iter()
            .enumerate()
            .all(|(i, &pin)| pin as usize == first as usize + i);
        if !contiguous {
            return None;
        }
        ButtonGroup::new(first, self.buttons.len() as u8).ok()
    }

    /// UART line settings for the HAL
    pub fn uart_config(&self) -> UartConfig {
        UartConfig::with_baudrate(self.uart.baudrate).flow_control(self.uart.flow_control)
    }
}
