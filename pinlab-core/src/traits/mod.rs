//! Hardware abstraction traits
//!
//! These traits define the interface between the board-agnostic logic and the
//! driver implementations in `pinlab-drivers`.

pub mod indicator;

pub use indicator::Indicator;
