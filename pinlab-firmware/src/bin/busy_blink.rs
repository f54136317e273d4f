//! Blink on a busy-wait delay
//!
//! No timer, no executor: every LED is inverted together every 500 ms by
//! counting CPU cycles, until BUTTON2 is pressed.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{info, unwrap};
use {defmt_rtt as _, panic_probe as _};

use pinlab_core::blink::CHASE_PERIOD_MS;
use pinlab_core::delay::delay_ms;
use pinlab_firmware::board;
use pinlab_firmware::fault::halt;
use pinlab_hal_nrf52::{CycleDelay, Mmio, Port, PortError};

fn invert_all(port: &Port<Mmio>) -> Result<(), PortError> {
    for &pin in board::LED_PINS.iter() {
        port.toggle(pin)?;
    }
    Ok(())
}

#[entry]
fn main() -> ! {
    info!("busy-blink starting");

    let mut port = unwrap!(Port::<Mmio>::take());
    if let Err(e) = board::configure(&mut port) {
        halt(e.into(), &port);
    }

    // BUTTON2 stops the blinking; fall back to BUTTON1 on one-button boards
    let index = if board::BUTTON_GROUP.count() > 1 { 1 } else { 0 };
    let button = match board::button(&port, index) {
        Ok(button) => button,
        Err(e) => halt(e.into(), &port),
    };
    let stop = || button.is_pressed();

    let mut delay = CycleDelay::default();
    let mut blinks: u32 = 0;
    loop {
        if let Err(e) = invert_all(&port) {
            halt(e.into(), &port);
        }
        blinks += 1;
        if delay_ms(&mut delay, CHASE_PERIOD_MS, &stop).is_err() {
            break;
        }
    }

    info!("stopped after {} blinks", blinks);
    if let Err(e) = board::leds_off(&port) {
        halt(e.into(), &port);
    }
    loop {
        cortex_m::asm::wfe();
    }
}
