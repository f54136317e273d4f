//! LED chase on the embassy timer
//!
//! Switches LED1 and LED2 off (LED3 and LED4 stay lit, as after reset with
//! the latch at zero), then walks the LEDs every 500 ms until BUTTON1 is
//! pressed.

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use pinlab_core::blink::{chase_forever, set_all, CHASE_PERIOD_MS};
use pinlab_core::traits::Indicator;
use pinlab_firmware::board;
use pinlab_firmware::fault::halt;
use pinlab_hal_nrf52::{Mmio, Port};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Starts the RTC1 time driver behind `Delay`
    let _p = embassy_nrf::init(Default::default());
    info!("blinky starting");

    let mut port = unwrap!(Port::<Mmio>::take());
    if let Err(e) = board::configure(&mut port) {
        halt(e.into(), &port);
    }

    let mut leds = match board::leds(&port) {
        Ok(leds) => leds,
        Err(e) => halt(e.into(), &port),
    };
    for led in leds.iter_mut().skip(2) {
        led.set_lit(true);
    }

    let stop = match board::button(&port, 0) {
        Ok(button) => button,
        Err(e) => halt(e.into(), &port),
    };

    info!("chasing {} LEDs every {} ms, BUTTON1 stops", leds.len(), CHASE_PERIOD_MS);
    let _ = chase_forever(&mut leds, &mut Delay, CHASE_PERIOD_MS, &|| stop.is_pressed());

    set_all(&mut leds, false);
    info!("stopped");
    loop {
        cortex_m::asm::wfe();
    }
}
