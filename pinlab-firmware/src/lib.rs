//! Pinlab firmware support
//!
//! Shared by the three binaries in `src/bin`:
//!
//! - `blinky`: LED chase on the embassy timer, stopped by button 1
//! - `busy-blink`: all LEDs blinking on a busy-wait delay, stopped by button 2
//! - `uart-training`: button state echoed over the UART (or the loopback
//!   self-test with the `loopback` feature)

#![no_std]

pub mod board;
pub mod fault;
pub mod serial;
