//! UART loopback self-test
//!
//! With TX jumpered to RX (and RTS to CTS when flow control is on), every
//! byte sent must come straight back. The test walks the first
//! [`MAX_TEST_DATA_BYTES`] bytes of [`LOOPBACK_PATTERN`] one at a time.
//!
//! The UART has to receive into a buffer while it transmits. A byte that
//! has not arrived [`ECHO_WAIT_MS`] after it was sent fails the test with
//! [`IoFault::Timeout`]; the test never blocks waiting for it.

use core::fmt;

use embedded_hal::delay::DelayNs;
use pinlab_hal::{UartRx, UartTx};

use crate::fault::IoFault;

/// Bytes sent during the test
pub const LOOPBACK_PATTERN: &[u8] = b"\r\nLOOPBACK_TEST\r\n";

/// How many bytes of the pattern are checked
pub const MAX_TEST_DATA_BYTES: usize = 15;

/// Time given to each byte to come back
pub const ECHO_WAIT_MS: u32 = 10;

/// Attempts at queuing one byte while the transmitter reports a full FIFO
pub const MAX_PUT_ATTEMPTS: u32 = 1000;

/// Loopback failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopbackError {
    /// The byte that came back differs
    Mismatch {
        index: usize,
        expected: u8,
        received: u8,
    },
    /// Sending or receiving byte `index` failed
    Io { index: usize, fault: IoFault },
}

impl fmt::Display for LoopbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch {
                index,
                expected,
                received,
            } => write!(
                f,
                "byte {}: sent 0x{:02x}, got 0x{:02x}",
                index, expected, received
            ),
            Self::Io { index, fault } => write!(f, "byte {}: {}", index, fault),
        }
    }
}

/// Run one pass of the loopback test
pub fn run_loopback<U, D>(uart: &mut U, delay: &mut D) -> Result<(), LoopbackError>
where
    U: UartTx + UartRx,
    <U as UartTx>::Error: Into<IoFault>,
    <U as UartRx>::Error: Into<IoFault>,
    D: DelayNs,
{
    for (index, &expected) in LOOPBACK_PATTERN
        .iter()
        .take(MAX_TEST_DATA_BYTES)
        .enumerate()
    {
        put(uart, expected).map_err(|fault| LoopbackError::Io { index, fault })?;

        delay.delay_ms(ECHO_WAIT_MS);

        // The receiver runs in the background; after the wait the byte is
        // either buffered or lost
        let received = match uart.try_read_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => {
                return Err(LoopbackError::Io {
                    index,
                    fault: IoFault::Timeout,
                })
            }
            Err(e) => {
                return Err(LoopbackError::Io {
                    index,
                    fault: e.into(),
                })
            }
        };

        if received != expected {
            return Err(LoopbackError::Mismatch {
                index,
                expected,
                received,
            });
        }
    }
    Ok(())
}

/// Queue one byte, retrying while the FIFO is full
fn put<U>(uart: &mut U, byte: u8) -> Result<(), IoFault>
where
    U: UartTx,
    U::Error: Into<IoFault>,
{
    let mut attempts = 0;
    loop {
        match uart.write_byte(byte).map_err(Into::<IoFault>::into) {
            Ok(()) => return Ok(()),
            Err(IoFault::FifoFull) if attempts + 1 < MAX_PUT_ATTEMPTS => attempts += 1,
            Err(fault) => return Err(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDelay, MockUart};

    #[test]
    fn test_jumpered_uart_passes() {
        let mut uart = MockUart::loopback();
        let mut delay = MockDelay::new();

        assert_eq!(run_loopback(&mut uart, &mut delay), Ok(()));
        assert_eq!(uart.sent.as_slice(), b"\r\nLOOPBACK_TEST");
        assert_eq!(delay.total_ms(), 15 * ECHO_WAIT_MS as u64);
    }

    #[test]
    fn test_mismatch_reports_index() {
        let mut uart = MockUart::new();
        uart.rx.push_back(Ok(b'\r')).unwrap();
        uart.rx.push_back(Ok(b'\n')).unwrap();
        uart.rx.push_back(Ok(b'X')).unwrap();

        let result = run_loopback(&mut uart, &mut MockDelay::new());
        assert_eq!(
            result,
            Err(LoopbackError::Mismatch {
                index: 2,
                expected: b'L',
                received: b'X',
            })
        );
    }

    #[test]
    fn test_receive_error_reports_index() {
        let mut uart = MockUart::new();
        uart.rx.push_back(Ok(b'\r')).unwrap();
        uart.rx.push_back(Err(IoFault::Framing)).unwrap();

        let result = run_loopback(&mut uart, &mut MockDelay::new());
        assert_eq!(
            result,
            Err(LoopbackError::Io {
                index: 1,
                fault: IoFault::Framing,
            })
        );
    }

    #[test]
    fn test_full_fifo_is_retried() {
        let mut uart = MockUart::loopback();
        uart.busy_writes = 5;

        assert_eq!(run_loopback(&mut uart, &mut MockDelay::new()), Ok(()));
    }

    #[test]
    fn test_fifo_that_never_drains_fails() {
        let mut uart = MockUart::loopback();
        uart.busy_writes = MAX_PUT_ATTEMPTS;

        assert_eq!(
            run_loopback(&mut uart, &mut MockDelay::new()),
            Err(LoopbackError::Io {
                index: 0,
                fault: IoFault::FifoFull,
            })
        );
    }

    #[test]
    fn test_byte_lost_while_receiver_idle_fails_first_index() {
        let mut uart = MockUart::receiver_off();
        let mut delay = MockDelay::new();

        assert_eq!(
            run_loopback(&mut uart, &mut delay),
            Err(LoopbackError::Io {
                index: 0,
                fault: IoFault::Timeout,
            })
        );
        assert_eq!(uart.sent.as_slice(), b"\r");
        assert_eq!(delay.total_ms(), ECHO_WAIT_MS as u64);
    }

    #[test]
    fn test_missing_jumper_reports_timeout() {
        // Nothing wired: the first byte goes out and nothing comes back
        let mut uart = MockUart::new();

        assert_eq!(
            run_loopback(&mut uart, &mut MockDelay::new()),
            Err(LoopbackError::Io {
                index: 0,
                fault: IoFault::Timeout,
            })
        );
    }

    #[test]
    fn test_echo_stopping_midway_names_the_byte() {
        let mut uart = MockUart::new();
        for &byte in b"\r\nLOOP" {
            uart.rx.push_back(Ok(byte)).unwrap();
        }

        assert_eq!(
            run_loopback(&mut uart, &mut MockDelay::new()),
            Err(LoopbackError::Io {
                index: 6,
                fault: IoFault::Timeout,
            })
        );
    }

    #[test]
    fn test_transmit_error_is_not_retried() {
        let mut uart = MockUart::loopback();
        uart.fail_write = Some(IoFault::Break);

        assert_eq!(
            run_loopback(&mut uart, &mut MockDelay::new()),
            Err(LoopbackError::Io {
                index: 0,
                fault: IoFault::Break,
            })
        );
    }
}
