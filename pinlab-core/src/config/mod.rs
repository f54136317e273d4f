//! Configuration types
//!
//! Board descriptions shared by the firmware and its build script. The
//! build script deserializes `board.toml` into these types (with the
//! `serde` feature) and refuses to build an invalid board.

pub mod board;

pub use board::*;
