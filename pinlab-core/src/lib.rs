//! Board-agnostic logic for the Pinlab nRF52 firmware
//!
//! Everything in here runs against the `pinlab-hal` traits (or the
//! `embedded-hal` delay trait), so it can be exercised on the host with
//! mocks and on the nRF52 with the real register view:
//!
//! - Board configuration types and validation
//! - Fault classification (halt vs. resynchronize)
//! - Cancellable millisecond delays
//! - Button watcher and the UART echo exercise
//! - UART loopback self-test
//! - LED chase sequencing
//! - BLE custom service descriptor

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ble;
pub mod blink;
pub mod buttons;
pub mod config;
pub mod delay;
pub mod fault;
pub mod loopback;
pub mod traits;

#[cfg(test)]
mod testing;
