//! Mocks shared by the unit tests

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};
use pinlab_hal::{InputPort, UartRx, UartTx};

use crate::fault::IoFault;

/// Mock delay that records how long it was asked to wait
pub struct MockDelay {
    pub total_ns: u64,
    pub calls: u32,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            total_ns: 0,
            calls: 0,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}

/// Input port whose value changes after a given number of reads
pub struct MockInputPort {
    pub value: u32,
    pub reads: Cell<usize>,
    /// (read number, value): from that read on, `value` is returned
    pub change: Option<(usize, u32)>,
    /// Mask the port refuses to read
    pub forbidden: u32,
}

impl MockInputPort {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            reads: Cell::new(0),
            change: None,
            forbidden: 0,
        }
    }

    /// Make read number `at` (1-based) and every read after it see `value`
    pub fn change_on_read(mut self, at: usize, value: u32) -> Self {
        self.change = Some((at, value));
        self
    }
}

impl InputPort for MockInputPort {
    type Error = u8;

    fn read_inputs(&mut self, mask: u32) -> Result<u32, u8> {
        if mask & self.forbidden != 0 {
            return Err((mask & self.forbidden).trailing_zeros() as u8);
        }
        let n = self.reads.get() + 1;
        self.reads.set(n);
        if let Some((at, value)) = self.change {
            if n >= at {
                self.value = value;
            }
        }
        Ok(self.value & mask)
    }
}

/// UART mock with a scripted receive queue
///
/// In `echo` mode every transmitted byte is queued for reception, like a
/// TX-RX jumper. With `rx_running` off the jumpered byte is dropped, as on
/// a UART whose receiver only runs while a read is pending.
pub struct MockUart {
    pub sent: Vec<u8, 64>,
    pub rx: Deque<Result<u8, IoFault>, 64>,
    pub echo: bool,
    pub rx_running: bool,
    /// Number of writes that fail with `FifoFull` before succeeding
    pub busy_writes: u32,
    pub fail_write: Option<IoFault>,
}

impl MockUart {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            rx: Deque::new(),
            echo: false,
            rx_running: true,
            busy_writes: 0,
            fail_write: None,
        }
    }

    pub fn loopback() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }

    /// Jumpered, but nothing is received while no read is pending
    pub fn receiver_off() -> Self {
        Self {
            rx_running: false,
            ..Self::loopback()
        }
    }
}

impl UartTx for MockUart {
    type Error = IoFault;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), IoFault> {
        if let Some(fault) = self.fail_write {
            return Err(fault);
        }
        if self.busy_writes > 0 {
            self.busy_writes -= 1;
            return Err(IoFault::FifoFull);
        }
        for &byte in data {
            self.sent.push(byte).map_err(|_| IoFault::Other)?;
            if self.echo && self.rx_running {
                self.rx.push_back(Ok(byte)).map_err(|_| IoFault::Other)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IoFault> {
        Ok(())
    }
}

impl UartRx for MockUart {
    type Error = IoFault;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, IoFault> {
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().ok_or(IoFault::Other)??;
        }
        Ok(buf.len())
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, IoFault> {
        self.rx.pop_front().transpose()
    }
}
