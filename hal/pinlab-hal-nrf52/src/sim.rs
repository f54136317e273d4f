//! Simulated GPIO register block
//!
//! Behaves like P0 for the registers `Port` uses: `OUTSET`/`OUTCLR` only
//! touch the bits written, `PIN_CNF` resets to `0x0000_0002`, and the value
//! seen on `IN` can be scripted to change after a number of reads.

use core::cell::Cell;

use crate::pin_cnf::PinConfig;
use crate::port::PinId;
use crate::regs::PortRegisters;

pub struct SimPort {
    out: Cell<u32>,
    input: Cell<u32>,
    pin_cnf: [Cell<u32>; 32],
    input_reads: Cell<usize>,
    /// (reads, value): once `reads` reads have happened, `IN` becomes `value`
    pending: Cell<Option<(usize, u32)>>,
    writes: Cell<usize>,
}

impl Default for SimPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPort {
    /// Register block in its reset state
    pub fn new() -> Self {
        Self {
            out: Cell::new(0),
            input: Cell::new(0),
            pin_cnf: core::array::from_fn(|_| Cell::new(PinConfig::RESET.bits())),
            input_reads: Cell::new(0),
            pending: Cell::new(None),
            writes: Cell::new(0),
        }
    }

    /// Drive the input pins
    pub fn set_input(&self, value: u32) {
        self.input.set(value);
    }

    /// Switch `IN` to `value` for every read after the next `reads` reads
    pub fn change_input_after(&self, reads: usize, value: u32) {
        self.pending.set(Some((self.input_reads.get() + reads, value)));
    }

    /// Preload the output latch without counting a write
    pub fn set_out(&self, value: u32) {
        self.out.set(value);
    }

    pub fn out_value(&self) -> u32 {
        self.out.get()
    }

    /// Panics when `pin` is past the end of the port
    pub fn pin_cnf_value(&self, pin: u8) -> u32 {
        self.pin_cnf[pin as usize].get()
    }

    /// `DIR` as the hardware mirrors it from the `PIN_CNF` DIR bits
    pub fn dir(&self) -> u32 {
        self.pin_cnf
            .iter()
            .enumerate()
            .fold(0, |dir, (pin, cnf)| dir | (cnf.get() & 1) << pin)
    }

    /// How many times `IN` was sampled
    pub fn input_reads(&self) -> usize {
        self.input_reads.get()
    }

    /// Register writes of any kind so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn count_write(&self) {
        self.writes.set(self.writes.get() + 1);
    }
}

impl PortRegisters for SimPort {
    fn out(&self) -> u32 {
        self.out.get()
    }

    fn set_out_bits(&self, mask: u32) {
        self.count_write();
        self.out.set(self.out.get() | mask);
    }

    fn clear_out_bits(&self, mask: u32) {
        self.count_write();
        self.out.set(self.out.get() & !mask);
    }

    fn input(&self) -> u32 {
        let reads = self.input_reads.get();
        if let Some((after, value)) = self.pending.get() {
            if reads >= after {
                self.input.set(value);
                self.pending.set(None);
            }
        }
        self.input_reads.set(reads + 1);
        self.input.get()
    }

    fn pin_cnf(&self, pin: PinId) -> u32 {
        self.pin_cnf[pin.index() as usize].get()
    }

    fn write_pin_cnf(&self, pin: PinId, value: u32) {
        self.count_write();
        self.pin_cnf[pin.index() as usize].set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let sim = SimPort::new();
        assert!((0..32).all(|pin| sim.pin_cnf_value(pin) == 0x2));
        assert_eq!(sim.dir(), 0);
        assert_eq!(sim.out_value(), 0);
    }

    #[test]
    #[should_panic]
    fn test_pin_cnf_past_port_end_panics() {
        let sim = SimPort::new();
        sim.pin_cnf_value(40);
    }

    #[test]
    fn test_scripted_input_change() {
        let sim = SimPort::new();
        sim.set_input(0xF);
        sim.change_input_after(2, 0x7);

        assert_eq!(sim.input(), 0xF);
        assert_eq!(sim.input(), 0xF);
        assert_eq!(sim.input(), 0x7);
        assert_eq!(sim.input(), 0x7);
        assert_eq!(sim.input_reads(), 4);
    }

    #[test]
    fn test_set_and_clear_registers_are_write_one() {
        let sim = SimPort::new();
        sim.set_out(0b1000);
        sim.set_out_bits(0b0011);
        sim.clear_out_bits(0b1001);
        assert_eq!(sim.out_value(), 0b0010);
        assert_eq!(sim.writes(), 2);
    }
}
