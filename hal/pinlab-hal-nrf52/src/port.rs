//! Bounds-checked GPIO port
//!
//! `Port` owns a register block and remembers how each pin was configured.
//! Every operation validates the pin (or mask) before touching a register,
//! so a rejected call writes nothing.

use core::fmt;

use pinlab_core::fault::{ConfigFault, Fault};
use pinlab_hal::{InputPin, InputPort, OutputPin};
use portable_atomic::{AtomicBool, Ordering};

use crate::pin_cnf::PinConfig;
use crate::regs::{Mmio, PortRegisters, P0_BASE};

/// Pins on one port
pub const PORT_PINS: u8 = 32;

/// A pin index known to be below [`PORT_PINS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(u8);

impl PinId {
    pub const fn new(pin: u8) -> Result<Self, PortError> {
        if pin < PORT_PINS {
            Ok(Self(pin))
        } else {
            Err(PortError::InvalidPin { pin })
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

/// Port operation rejected before any register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError {
    /// Index 32 or above
    InvalidPin { pin: u8 },
    /// The pin is not configured for this use
    UnconfiguredPin { pin: u8 },
}

impl PortError {
    /// Lowest pin in `mask` missing from `allowed`
    fn unconfigured(mask: u32, allowed: u32) -> Result<(), Self> {
        let missing = mask & !allowed;
        if missing == 0 {
            Ok(())
        } else {
            Err(Self::UnconfiguredPin {
                pin: missing.trailing_zeros() as u8,
            })
        }
    }
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin { pin } => write!(f, "pin {} does not exist", pin),
            Self::UnconfiguredPin { pin } => write!(f, "pin {} not configured for this use", pin),
        }
    }
}

impl From<PortError> for ConfigFault {
    fn from(e: PortError) -> Self {
        match e {
            PortError::InvalidPin { pin } => ConfigFault::InvalidPin(pin),
            PortError::UnconfiguredPin { pin } => ConfigFault::UnconfiguredPin(pin),
        }
    }
}

impl From<PortError> for Fault {
    fn from(e: PortError) -> Self {
        Fault::Config(e.into())
    }
}

static TAKEN: AtomicBool = AtomicBool::new(false);

/// A GPIO port and the configuration state of its pins
pub struct Port<R: PortRegisters> {
    regs: R,
    /// Pins configured as outputs
    outputs: u32,
    /// Pins whose input buffer is connected
    inputs: u32,
}

impl Port<Mmio> {
    /// Take the P0 handle
    ///
    /// Returns `None` after the first call.
    #[allow(unsafe_code)]
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            // SAFETY: first and only take
            Some(unsafe { Self::steal() })
        }
    }

    /// Create a P0 handle without checking whether one exists
    ///
    /// # Safety
    ///
    /// Two live handles to P0 can undo each other's configuration and race
    /// on `toggle`. The caller must make sure that cannot happen.
    #[allow(unsafe_code)]
    pub unsafe fn steal() -> Self {
        Self::new(Mmio::new(P0_BASE))
    }
}

impl<R: PortRegisters> Port<R> {
    /// Wrap a register block; every pin starts out unconfigured
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            outputs: 0,
            inputs: 0,
        }
    }

    /// Write `config` to the pin's `PIN_CNF` slot
    pub fn configure_pin(&mut self, pin: u8, config: PinConfig) -> Result<PinId, PortError> {
        let id = PinId::new(pin)?;
        self.regs.write_pin_cnf(id, config.bits());
        self.record(id, config);
        Ok(id)
    }

    /// Apply one configuration to several pins
    ///
    /// All indices are checked first; on error no pin is written.
    pub fn configure_pins(&mut self, pins: &[u8], config: PinConfig) -> Result<(), PortError> {
        for &pin in pins {
            PinId::new(pin)?;
        }
        for &pin in pins {
            self.configure_pin(pin, config)?;
        }
        Ok(())
    }

    fn record(&mut self, id: PinId, config: PinConfig) {
        let mask = id.mask();
        if config.is_output() {
            self.outputs |= mask;
        } else {
            self.outputs &= !mask;
        }
        if config.input_connected() {
            self.inputs |= mask;
        } else {
            self.inputs &= !mask;
        }
    }

    /// Decoded configuration of a pin as the register reports it
    pub fn pin_config(&self, pin: u8) -> Result<PinConfig, PortError> {
        let id = PinId::new(pin)?;
        PinConfig::from_bits(self.regs.pin_cnf(id)).map_err(|_| PortError::UnconfiguredPin { pin })
    }

    fn output_pin(&self, pin: u8) -> Result<PinId, PortError> {
        let id = PinId::new(pin)?;
        PortError::unconfigured(id.mask(), self.outputs)?;
        Ok(id)
    }

    pub fn set_high(&self, pin: u8) -> Result<(), PortError> {
        let id = self.output_pin(pin)?;
        self.regs.set_out_bits(id.mask());
        Ok(())
    }

    pub fn set_low(&self, pin: u8) -> Result<(), PortError> {
        let id = self.output_pin(pin)?;
        self.regs.clear_out_bits(id.mask());
        Ok(())
    }

    /// Drive every pin in `mask` high with one `OUTSET` write
    pub fn set_outputs(&self, mask: u32) -> Result<(), PortError> {
        PortError::unconfigured(mask, self.outputs)?;
        self.regs.set_out_bits(mask);
        Ok(())
    }

    /// Drive every pin in `mask` low with one `OUTCLR` write
    pub fn clear_outputs(&self, mask: u32) -> Result<(), PortError> {
        PortError::unconfigured(mask, self.outputs)?;
        self.regs.clear_out_bits(mask);
        Ok(())
    }

    /// Invert an output
    ///
    /// P0 has no toggle register, so this reads `OUT` and writes the
    /// opposite through `OUTSET`/`OUTCLR` inside a critical section.
    pub fn toggle(&self, pin: u8) -> Result<(), PortError> {
        let id = self.output_pin(pin)?;
        self.toggle_mask(id.mask());
        Ok(())
    }

    fn toggle_mask(&self, mask: u32) {
        critical_section::with(|_| {
            if self.regs.out() & mask != 0 {
                self.regs.clear_out_bits(mask);
            } else {
                self.regs.set_out_bits(mask);
            }
        });
    }

    /// Output latch state of a pin
    pub fn is_set_high(&self, pin: u8) -> Result<bool, PortError> {
        let id = self.output_pin(pin)?;
        Ok(self.regs.out() & id.mask() != 0)
    }

    /// `IN & mask`; every pin in `mask` must have its input buffer connected
    pub fn read_inputs(&self, mask: u32) -> Result<u32, PortError> {
        PortError::unconfigured(mask, self.inputs)?;
        Ok(self.regs.input() & mask)
    }

    /// Borrow an output pin
    pub fn output(&self, pin: u8) -> Result<OutputHandle<'_, R>, PortError> {
        let id = self.output_pin(pin)?;
        Ok(OutputHandle { port: self, id })
    }

    /// Borrow an input pin
    pub fn input(&self, pin: u8) -> Result<InputHandle<'_, R>, PortError> {
        let id = PinId::new(pin)?;
        PortError::unconfigured(id.mask(), self.inputs)?;
        Ok(InputHandle { port: self, id })
    }

    pub fn output_mask(&self) -> u32 {
        self.outputs
    }

    pub fn input_mask(&self) -> u32 {
        self.inputs
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give back the register block
    pub fn release(self) -> R {
        self.regs
    }
}

impl<R: PortRegisters> InputPort for Port<R> {
    type Error = PortError;

    fn read_inputs(&mut self, mask: u32) -> Result<u32, PortError> {
        Port::read_inputs(self, mask)
    }
}

impl<R: PortRegisters> InputPort for &Port<R> {
    type Error = PortError;

    fn read_inputs(&mut self, mask: u32) -> Result<u32, PortError> {
        Port::read_inputs(*self, mask)
    }
}

/// A configured output pin borrowed from a [`Port`]
pub struct OutputHandle<'a, R: PortRegisters> {
    port: &'a Port<R>,
    id: PinId,
}

impl<R: PortRegisters> OutputHandle<'_, R> {
    pub fn pin(&self) -> PinId {
        self.id
    }
}

impl<R: PortRegisters> OutputPin for OutputHandle<'_, R> {
    fn set_high(&mut self) {
        self.port.regs.set_out_bits(self.id.mask());
    }

    fn set_low(&mut self) {
        self.port.regs.clear_out_bits(self.id.mask());
    }

    fn toggle(&mut self) {
        self.port.toggle_mask(self.id.mask());
    }

    fn is_set_high(&self) -> bool {
        self.port.regs.out() & self.id.mask() != 0
    }
}

/// A connected input pin borrowed from a [`Port`]
pub struct InputHandle<'a, R: PortRegisters> {
    port: &'a Port<R>,
    id: PinId,
}

impl<R: PortRegisters> InputHandle<'_, R> {
    pub fn pin(&self) -> PinId {
        self.id
    }
}

impl<R: PortRegisters> InputPin for InputHandle<'_, R> {
    fn is_high(&self) -> bool {
        self.port.regs.input() & self.id.mask() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimPort;
    use pinlab_core::buttons::{ButtonGroup, ButtonWatcher};
    use pinlab_core::delay::Never;
    use proptest::prelude::*;

    const LEDS: [u8; 4] = [17, 18, 19, 20];
    const BUTTONS: [u8; 4] = [13, 14, 15, 16];

    fn dk_port() -> Port<SimPort> {
        let mut port = Port::new(SimPort::new());
        port.configure_pins(&LEDS, PinConfig::LED).unwrap();
        port.configure_pins(&BUTTONS, PinConfig::BUTTON).unwrap();
        port
    }

    #[test]
    fn test_configure_writes_pin_cnf() {
        let port = dk_port();
        assert_eq!(port.registers().pin_cnf_value(17), 0x103);
        assert_eq!(port.registers().pin_cnf_value(13), 0x10C);
        assert_eq!(port.registers().pin_cnf_value(0), 0x2);
        assert_eq!(port.registers().dir(), 0xF << 17);
        assert_eq!(port.pin_config(20), Ok(PinConfig::LED));
    }

    #[test]
    fn test_out_of_range_pin_writes_nothing() {
        let mut port = Port::new(SimPort::new());
        assert_eq!(
            port.configure_pin(32, PinConfig::LED),
            Err(PortError::InvalidPin { pin: 32 })
        );
        assert_eq!(
            port.configure_pins(&[17, 18, 40], PinConfig::LED),
            Err(PortError::InvalidPin { pin: 40 })
        );
        assert_eq!(port.set_high(255), Err(PortError::InvalidPin { pin: 255 }));
        assert_eq!(port.registers().writes(), 0);
    }

    #[test]
    fn test_unconfigured_pin_rejected() {
        let port = dk_port();
        assert_eq!(port.set_high(5), Err(PortError::UnconfiguredPin { pin: 5 }));
        assert_eq!(port.toggle(13), Err(PortError::UnconfiguredPin { pin: 13 }));
        assert_eq!(
            port.read_inputs(1 << 17 | 1 << 13),
            Err(PortError::UnconfiguredPin { pin: 17 })
        );
        assert_eq!(
            port.set_outputs(0xF << 16),
            Err(PortError::UnconfiguredPin { pin: 16 })
        );
        assert!(port.input(18).is_err());
        assert!(port.output(14).is_err());
    }

    #[test]
    fn test_reconfiguring_moves_pin_between_roles() {
        let mut port = dk_port();
        port.configure_pin(17, PinConfig::BUTTON).unwrap();
        assert!(port.set_high(17).is_err());
        assert!(port.read_inputs(1 << 17).is_ok());
        assert_eq!(port.output_mask(), 0x7 << 18);
    }

    #[test]
    fn test_led_mask_in_one_write() {
        let port = dk_port();
        let writes = port.registers().writes();
        port.set_outputs(0xF << 17).unwrap();
        assert_eq!(port.registers().out_value(), 0xF << 17);
        port.clear_outputs(0x3 << 17).unwrap();
        assert_eq!(port.registers().out_value(), 0xC << 17);
        assert_eq!(port.registers().writes(), writes + 2);
    }

    #[test]
    fn test_handles() {
        let port = dk_port();
        port.registers().set_input(1 << 14);

        let mut led = port.output(19).unwrap();
        led.set_high();
        assert!(led.is_set_high());
        led.toggle();
        assert!(led.is_set_low());

        let button = port.input(14).unwrap();
        assert!(button.is_high());
        assert!(port.input(15).unwrap().is_low());
    }

    #[test]
    fn test_watcher_over_port() {
        let mut port = dk_port();
        port.registers().set_input(0xF << 13);
        port.registers().change_input_after(3, 0xE << 13);

        let group = ButtonGroup::new(13, 4).unwrap();
        let mut watcher = ButtonWatcher::new(&mut port, group).unwrap();
        assert_eq!(watcher.wait_for_change(&mut port, &Never), Ok(0b1110));
        assert_eq!(port.registers().input_reads(), 4);
    }

    #[test]
    fn test_take_once() {
        let first = Port::<Mmio>::take();
        assert!(first.is_some());
        assert!(Port::<Mmio>::take().is_none());
        assert_eq!(first.map(|p| p.release().base()), Some(P0_BASE));
    }

    #[test]
    fn test_port_error_into_fault() {
        let fault: Fault = PortError::InvalidPin { pin: 40 }.into();
        assert_eq!(fault, Fault::Config(ConfigFault::InvalidPin(40)));
    }

    proptest! {
        #[test]
        fn prop_set_and_clear_touch_one_bit(initial in any::<u32>(), pin in 0u8..32) {
            let mut port = Port::new(SimPort::new());
            port.configure_pin(pin, PinConfig::LED).unwrap();
            port.registers().set_out(initial);

            port.set_high(pin).unwrap();
            prop_assert_eq!(port.registers().out_value(), initial | 1 << pin);

            port.set_low(pin).unwrap();
            prop_assert_eq!(port.registers().out_value(), initial & !(1 << pin));
        }

        #[test]
        fn prop_toggle_twice_restores(initial in any::<u32>(), pin in 0u8..32) {
            let mut port = Port::new(SimPort::new());
            port.configure_pin(pin, PinConfig::LED).unwrap();
            port.registers().set_out(initial);

            port.toggle(pin).unwrap();
            prop_assert_eq!(port.registers().out_value(), initial ^ 1 << pin);
            port.toggle(pin).unwrap();
            prop_assert_eq!(port.registers().out_value(), initial);
        }

        #[test]
        fn prop_read_inputs_is_masked(level in any::<u32>(), mask in any::<u32>()) {
            let mut port = Port::new(SimPort::new());
            for pin in 0..PORT_PINS {
                port.configure_pin(pin, PinConfig::BUTTON).unwrap();
            }
            port.registers().set_input(level);
            prop_assert_eq!(port.read_inputs(mask), Ok(level & mask));
        }
    }
}
