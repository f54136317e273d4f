//! Halt handler

use defmt::error;
use pinlab_core::fault::Fault;
use pinlab_hal_nrf52::{Port, PortRegisters};

use crate::board;

/// Log `fault`, light every LED and park the core
///
/// Lighting the LEDs is best effort: if the fault came from pin setup they
/// may not be configured yet.
pub fn halt<R: PortRegisters>(fault: Fault, port: &Port<R>) -> ! {
    error!("halting: {}", fault);
    if board::leds_on(port).is_err() {
        error!("LEDs not configured, halting dark");
    }
    loop {
        cortex_m::asm::wfe();
    }
}
