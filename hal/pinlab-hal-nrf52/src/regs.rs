//! GPIO port register overlay
//!
//! `RegisterBlock` mirrors the P0 register map byte for byte. All volatile
//! access in the crate goes through [`Reg`] in this module.

#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::mem::{offset_of, size_of};
use core::ptr::NonNull;

use crate::port::PinId;

/// Base address of GPIO port P0
pub const P0_BASE: usize = 0x5000_0000;

/// One memory-mapped register
#[repr(transparent)]
pub struct Reg<T: Copy> {
    value: UnsafeCell<T>,
}

impl<T: Copy> Reg<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    #[inline(always)]
    pub fn read(&self) -> T {
        // SAFETY: the cell is either a live hardware register or memory
        // owned by the enclosing block; volatile keeps every access
        unsafe { self.value.get().read_volatile() }
    }

    #[inline(always)]
    pub fn write(&self, value: T) {
        // SAFETY: as for `read`
        unsafe { self.value.get().write_volatile(value) }
    }
}

/// GPIO port register map
#[repr(C)]
pub struct RegisterBlock {
    _reserved0: [u32; 321],
    pub out: Reg<u32>,
    pub outset: Reg<u32>,
    pub outclr: Reg<u32>,
    pub in_: Reg<u32>,
    pub dir: Reg<u32>,
    pub dirset: Reg<u32>,
    pub dirclr: Reg<u32>,
    pub latch: Reg<u32>,
    pub detectmode: Reg<u32>,
    _reserved1: [u32; 118],
    pub pin_cnf: [Reg<u32>; 32],
}

const _: () = {
    assert!(offset_of!(RegisterBlock, out) == 0x504);
    assert!(offset_of!(RegisterBlock, outset) == 0x508);
    assert!(offset_of!(RegisterBlock, outclr) == 0x50C);
    assert!(offset_of!(RegisterBlock, in_) == 0x510);
    assert!(offset_of!(RegisterBlock, dir) == 0x514);
    assert!(offset_of!(RegisterBlock, dirset) == 0x518);
    assert!(offset_of!(RegisterBlock, dirclr) == 0x51C);
    assert!(offset_of!(RegisterBlock, latch) == 0x520);
    assert!(offset_of!(RegisterBlock, detectmode) == 0x524);
    assert!(offset_of!(RegisterBlock, pin_cnf) == 0x700);
    assert!(size_of::<RegisterBlock>() == 0x780);
};

impl RegisterBlock {
    /// Block with every register zeroed, for tests that need real memory
    pub fn zeroed() -> Self {
        Self {
            _reserved0: [0; 321],
            out: Reg::new(0),
            outset: Reg::new(0),
            outclr: Reg::new(0),
            in_: Reg::new(0),
            dir: Reg::new(0),
            dirset: Reg::new(0),
            dirclr: Reg::new(0),
            latch: Reg::new(0),
            detectmode: Reg::new(0),
            _reserved1: [0; 118],
            pin_cnf: core::array::from_fn(|_| Reg::new(0)),
        }
    }
}

/// The register operations `Port` needs
///
/// Implemented by [`Mmio`] for the real chip and by
/// [`SimPort`](crate::sim::SimPort) on the host.
pub trait PortRegisters {
    /// Current output latch (`OUT`)
    fn out(&self) -> u32;

    /// Write `OUTSET`: bits set in `mask` go high, others are untouched
    fn set_out_bits(&self, mask: u32);

    /// Write `OUTCLR`: bits set in `mask` go low, others are untouched
    fn clear_out_bits(&self, mask: u32);

    /// Sample `IN`
    fn input(&self) -> u32;

    /// Read `PIN_CNF[pin]`
    fn pin_cnf(&self, pin: PinId) -> u32;

    /// Write `PIN_CNF[pin]`
    fn write_pin_cnf(&self, pin: PinId, value: u32);
}

/// Register block at a fixed address
pub struct Mmio {
    block: NonNull<RegisterBlock>,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the address of a GPIO register block (or memory laid
    /// out like one) that stays valid for the life of the handle, and no
    /// other `Mmio` may be used for the same block concurrently.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            block: NonNull::new_unchecked(base as *mut RegisterBlock),
        }
    }

    /// # Safety
    ///
    /// As for [`Mmio::new`].
    pub unsafe fn from_block(block: &RegisterBlock) -> Self {
        Self {
            block: NonNull::from(block),
        }
    }

    pub fn base(&self) -> usize {
        self.block.as_ptr() as usize
    }

    fn block(&self) -> &RegisterBlock {
        // SAFETY: guaranteed by the constructor contract
        unsafe { self.block.as_ref() }
    }
}

// SAFETY: the block is device memory, not tied to a thread
unsafe impl Send for Mmio {}

impl PortRegisters for Mmio {
    fn out(&self) -> u32 {
        self.block().out.read()
    }

    fn set_out_bits(&self, mask: u32) {
        self.block().outset.write(mask);
    }

    fn clear_out_bits(&self, mask: u32) {
        self.block().outclr.write(mask);
    }

    fn input(&self) -> u32 {
        self.block().in_.read()
    }

    fn pin_cnf(&self, pin: PinId) -> u32 {
        self.block().pin_cnf[pin.index() as usize].read()
    }

    fn write_pin_cnf(&self, pin: PinId, value: u32) {
        self.block().pin_cnf[pin.index() as usize].write(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::boxed::Box;

    #[test]
    fn test_writes_land_at_register_offsets() {
        let block = Box::new(RegisterBlock::zeroed());
        let mmio = unsafe { Mmio::from_block(&block) };

        mmio.set_out_bits(1 << 17);
        mmio.clear_out_bits(1 << 18);
        mmio.write_pin_cnf(PinId::new(20).unwrap(), 0x103);

        let words = &*block as *const RegisterBlock as *const u32;
        let word = |offset: usize| unsafe { words.add(offset / 4).read_volatile() };
        assert_eq!(word(0x508), 1 << 17);
        assert_eq!(word(0x50C), 1 << 18);
        assert_eq!(word(0x700 + 20 * 4), 0x103);
        assert_eq!(word(0x504), 0);
    }

    #[test]
    fn test_reads_come_from_register_offsets() {
        let block = Box::new(RegisterBlock::zeroed());
        block.in_.write(0xF << 13);
        block.out.write(1 << 19);
        let mmio = unsafe { Mmio::from_block(&block) };

        assert_eq!(mmio.input(), 0xF << 13);
        assert_eq!(mmio.out(), 1 << 19);
        assert_eq!(mmio.base(), &*block as *const RegisterBlock as usize);
    }

    #[test]
    fn test_p0_handle_points_at_p0() {
        let mmio = unsafe { Mmio::new(P0_BASE) };
        assert_eq!(mmio.base(), 0x5000_0000);
    }
}
