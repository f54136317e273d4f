//! Blocking serial port over the buffered UARTE
//!
//! Adapts embassy-nrf's `BufferedUarte` to the `pinlab-hal` UART traits.
//! The buffered driver keeps the receiver running into a ring buffer, so
//! bytes that arrive while the program is transmitting or sleeping are
//! kept, and RTS stays asserted while there is room. Byte framing and DMA
//! are the driver's business; this only maps errors and settings.

use embassy_futures::block_on;
use embassy_nrf::buffered_uarte::{self, BufferedUarte};
use embassy_nrf::uarte::{self, Baudrate};
use embedded_io_async::{Read, ReadReady, Write};
use pinlab_core::config::ConfigError;
use pinlab_core::fault::IoFault;
use pinlab_hal::uart::{DataBits, Parity, StopBits};
use pinlab_hal::{UartConfig, UartRx, UartTx};

/// UARTE baud rate setting for a rate in bits per second
///
/// Returns `None` for rates the peripheral cannot generate.
pub fn baudrate(bps: u32) -> Option<Baudrate> {
    let baud = match bps {
        1200 => Baudrate::BAUD1200,
        2400 => Baudrate::BAUD2400,
        4800 => Baudrate::BAUD4800,
        9600 => Baudrate::BAUD9600,
        14400 => Baudrate::BAUD14400,
        19200 => Baudrate::BAUD19200,
        28800 => Baudrate::BAUD28800,
        31250 => Baudrate::BAUD31250,
        38400 => Baudrate::BAUD38400,
        56000 => Baudrate::BAUD56000,
        57600 => Baudrate::BAUD57600,
        76800 => Baudrate::BAUD76800,
        115200 => Baudrate::BAUD115200,
        230400 => Baudrate::BAUD230400,
        250000 => Baudrate::BAUD250000,
        460800 => Baudrate::BAUD460800,
        921600 => Baudrate::BAUD921600,
        1_000_000 => Baudrate::BAUD1M,
        _ => return None,
    };
    Some(baud)
}

/// UARTE configuration for `uart`
///
/// The nRF52832 UARTE only frames 8 data bits with one stop bit, and its
/// parity bit is always even. Flow control is chosen by the constructor,
/// not here.
pub fn config(uart: &UartConfig) -> Result<uarte::Config, ConfigError> {
    let mut config = uarte::Config::default();
    config.baudrate = baudrate(uart.baudrate).ok_or(ConfigError::UnsupportedBaudrate(uart.baudrate))?;
    config.parity = match uart.parity {
        Parity::None => uarte::Parity::EXCLUDED,
        Parity::Even => uarte::Parity::INCLUDED,
        Parity::Odd => return Err(ConfigError::UnsupportedFraming),
    };
    if uart.data_bits != DataBits::Eight || uart.stop_bits != StopBits::One {
        return Err(ConfigError::UnsupportedFraming);
    }
    Ok(config)
}

/// Line errors (overrun, framing) are handled inside the buffered driver;
/// what reaches here is a driver failure
fn io_fault(_: buffered_uarte::Error) -> IoFault {
    IoFault::Other
}

/// Blocking serial port
///
/// Each call drives the driver's future to completion on the spot. The
/// driver is interrupt-driven, so this needs no executor.
pub struct Serial<'d> {
    uarte: BufferedUarte<'d>,
}

impl<'d> Serial<'d> {
    pub fn new(uarte: BufferedUarte<'d>) -> Self {
        Self { uarte }
    }

    /// Write a string, for banner and prompt text
    pub fn write_str(&mut self, s: &str) -> Result<(), IoFault> {
        self.write_blocking(s.as_bytes())
    }
}

impl UartTx for Serial<'_> {
    type Error = IoFault;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), IoFault> {
        block_on(Write::write_all(&mut self.uarte, data)).map_err(io_fault)
    }

    fn flush(&mut self) -> Result<(), IoFault> {
        block_on(Write::flush(&mut self.uarte)).map_err(io_fault)
    }
}

impl UartRx for Serial<'_> {
    type Error = IoFault;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, IoFault> {
        let mut filled = 0;
        while filled < buf.len() {
            filled += block_on(Read::read(&mut self.uarte, &mut buf[filled..])).map_err(io_fault)?;
        }
        Ok(filled)
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, IoFault> {
        if !ReadReady::read_ready(&mut self.uarte).map_err(io_fault)? {
            return Ok(None);
        }
        // Data is buffered, so this read completes on its first poll
        let mut byte = [0u8; 1];
        block_on(Read::read(&mut self.uarte, &mut byte)).map_err(io_fault)?;
        Ok(Some(byte[0]))
    }
}
