//! Busy-wait delay
//!
//! Counts CPU cycles instead of reading a timer, so it works before any
//! clock or time driver is set up. The wait is never shorter than asked
//! for at the configured core clock; loop overhead and interrupts can make
//! it longer.

use embedded_hal::delay::DelayNs;

/// nRF52832 core clock
pub const DEFAULT_CORE_CLOCK_HZ: u32 = 64_000_000;

/// Cycle-counting delay
#[derive(Debug, Clone, Copy)]
pub struct CycleDelay {
    core_clock_hz: u32,
}

impl Default for CycleDelay {
    fn default() -> Self {
        Self::new(DEFAULT_CORE_CLOCK_HZ)
    }
}

impl CycleDelay {
    pub const fn new(core_clock_hz: u32) -> Self {
        Self { core_clock_hz }
    }

    pub fn core_clock_hz(&self) -> u32 {
        self.core_clock_hz
    }

    /// Cycles covering `ns`, rounded up
    pub fn cycles_for_ns(&self, ns: u32) -> u32 {
        let cycles = (ns as u64 * self.core_clock_hz as u64).div_ceil(1_000_000_000);
        cycles.min(u32::MAX as u64) as u32
    }
}

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        spin(self.cycles_for_ns(ns));
    }

    fn delay_us(&mut self, us: u32) {
        for _ in 0..us / 1000 {
            spin(self.cycles_for_ns(1_000_000));
        }
        spin(self.cycles_for_ns(us % 1000 * 1000));
    }
}

#[cfg(target_arch = "arm")]
fn spin(cycles: u32) {
    cortex_m::asm::delay(cycles);
}

#[cfg(not(target_arch = "arm"))]
fn spin(cycles: u32) {
    for _ in 0..cycles {
        core::hint::spin_loop();
    }
}
