//! Cancellable delays
//!
//! The firmware blocks by spinning, which is fine at boot but leaves no way
//! to stop a long wait. These helpers slice a delay into 1 ms steps over
//! any [`DelayNs`] and check a [`Shutdown`] request between steps.

use core::fmt;

use embedded_hal::delay::DelayNs;
use portable_atomic::{AtomicBool, Ordering};

/// Granularity of a cancellable delay
pub const SLICE_MS: u32 = 1;

/// Returned when a shutdown request interrupts a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cancelled by shutdown request")
    }
}

/// Something that can ask a wait loop to stop
pub trait Shutdown {
    /// True once the caller should give up waiting
    fn requested(&self) -> bool;
}

/// Any `Fn() -> bool` works as a shutdown source (e.g. "button pressed")
impl<F: Fn() -> bool> Shutdown for F {
    fn requested(&self) -> bool {
        self()
    }
}

/// Process-wide shutdown flag
///
/// Suitable for a `static`; raising it from an interrupt handler stops
/// every wait that checks it.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    raised: AtomicBool,
}

impl ShutdownSignal {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Request shutdown
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Clear a previous request
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Shutdown for ShutdownSignal {
    fn requested(&self) -> bool {
        self.is_raised()
    }
}

/// Never requests shutdown
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Shutdown for Never {
    fn requested(&self) -> bool {
        false
    }
}

/// Block for `ms` milliseconds unless `shutdown` is requested
///
/// Resolution is [`SLICE_MS`] plus whatever the underlying delay adds per
/// call. Returns `Err(Cancelled)` if the request was seen before or during
/// the wait.
pub fn delay_ms<D, S>(delay: &mut D, ms: u32, shutdown: &S) -> Result<(), Cancelled>
where
    D: DelayNs + ?Sized,
    S: Shutdown + ?Sized,
{
    for _ in 0..ms / SLICE_MS {
        if shutdown.requested() {
            return Err(Cancelled);
        }
        delay.delay_ms(SLICE_MS);
    }
    if shutdown.requested() {
        return Err(Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDelay;
    use core::cell::Cell;

    #[test]
    fn test_full_delay_without_shutdown() {
        let mut delay = MockDelay::new();
        assert_eq!(delay_ms(&mut delay, 500, &Never), Ok(()));
        assert_eq!(delay.total_ms(), 500);
        assert_eq!(delay.calls, 500);
    }

    #[test]
    fn test_zero_delay() {
        let mut delay = MockDelay::new();
        assert_eq!(delay_ms(&mut delay, 0, &Never), Ok(()));
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn test_raised_signal_cancels_immediately() {
        let signal = ShutdownSignal::new();
        signal.raise();

        let mut delay = MockDelay::new();
        assert_eq!(delay_ms(&mut delay, 500, &signal), Err(Cancelled));
        assert_eq!(delay.calls, 0);
        assert_eq!(delay_ms(&mut delay, 0, &signal), Err(Cancelled));
    }

    #[test]
    fn test_cancels_midway() {
        // Request shutdown after 10 checks
        let checks = Cell::new(0u32);
        let stop = || {
            checks.set(checks.get() + 1);
            checks.get() > 10
        };

        let mut delay = MockDelay::new();
        assert_eq!(delay_ms(&mut delay, 500, &stop), Err(Cancelled));
        assert_eq!(delay.total_ms(), 10);
    }

    #[test]
    fn test_signal_reset() {
        let signal = ShutdownSignal::new();
        signal.raise();
        assert!(signal.is_raised());
        signal.reset();
        assert!(!signal.requested());
    }
}
