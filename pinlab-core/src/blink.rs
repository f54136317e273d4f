//! LED chase
//!
//! Inverts each LED in turn with a fixed pause after every step, the way
//! the board-support blinky walks LED1..LED4.

use embedded_hal::delay::DelayNs;

use crate::delay::{delay_ms, Cancelled, Shutdown};
use crate::traits::Indicator;

/// Pause after each LED step
pub const CHASE_PERIOD_MS: u32 = 500;

/// Run `rounds` passes over `leds`
///
/// One pass inverts every LED once, in slice order, waiting `period_ms`
/// after each. Stops early with `Err(Cancelled)` if `shutdown` fires; the
/// LEDs are left as they were at that moment.
pub fn chase_rounds<L, D, S>(
    leds: &mut [L],
    delay: &mut D,
    period_ms: u32,
    rounds: u32,
    shutdown: &S,
) -> Result<(), Cancelled>
where
    L: Indicator,
    D: DelayNs,
    S: Shutdown + ?Sized,
{
    for _ in 0..rounds {
        for led in leds.iter_mut() {
            led.invert();
            delay_ms(delay, period_ms, shutdown)?;
        }
    }
    Ok(())
}

/// Chase until `shutdown` fires
pub fn chase_forever<L, D, S>(leds: &mut [L], delay: &mut D, period_ms: u32, shutdown: &S) -> Cancelled
where
    L: Indicator,
    D: DelayNs,
    S: Shutdown + ?Sized,
{
    loop {
        if let Err(cancelled) = chase_rounds(leds, delay, period_ms, 1, shutdown) {
            return cancelled;
        }
        if leds.is_empty() && shutdown.requested() {
            return Cancelled;
        }
    }
}

/// Set every LED to the same state
pub fn set_all<L: Indicator>(leds: &mut [L], lit: bool) {
    for led in leds.iter_mut() {
        led.set_lit(lit);
    }
}
