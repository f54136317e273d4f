//! Board-level drivers
//!
//! This crate provides concrete implementations of the traits defined
//! in pinlab-core on top of `pinlab-hal` pins:
//!
//! - LEDs with either polarity (`GpioLed`)
//! - Push buttons with either polarity (`GpioButton`)

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod led;

pub use button::GpioButton;
pub use led::GpioLed;
