//! nRF52-specific HAL for the Pinlab nRF52 firmware
//!
//! This crate implements the `pinlab-hal` traits on top of the nRF52 GPIO
//! port registers:
//!
//! - Register overlay for P0 (`regs`), the only place that touches memory
//!   directly
//! - `PIN_CNF` packing and decoding
//! - Bounds-checked `Port` with a take-once singleton
//! - Simulated register block for host tests
//! - Cycle-counting busy-wait delay

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod delay;
pub mod pin_cnf;
pub mod port;
pub mod regs;
pub mod sim;

pub use delay::CycleDelay;
pub use pin_cnf::{Direction, Drive, InputBuffer, PinConfig, PinConfigError, Pull, Sense};
pub use port::{InputHandle, OutputHandle, PinId, Port, PortError, PORT_PINS};
pub use regs::{Mmio, PortRegisters, P0_BASE};
pub use sim::SimPort;
