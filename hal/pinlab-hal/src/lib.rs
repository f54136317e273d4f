//! Pinlab Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the board-agnostic logic is
//! written against. Chip HALs (currently only `pinlab-hal-nrf52`) implement
//! them over real registers, and the unit tests implement them over mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinlab-firmware binaries               │
//! └─────────────────────────────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │  pinlab-core    │   │ pinlab-drivers  │
//! └─────────────────┘   └─────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinlab-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          ┌─────────────────────┐
//!          │ pinlab-hal-nrf52    │
//!          └─────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Single digital pins
//! - [`gpio::InputPort`] - Masked reads of a whole port
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, InputPort, OutputPin};
pub use uart::{UartConfig, UartRx, UartTx};
