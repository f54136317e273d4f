//! UART training exercise
//!
//! Prints a banner, then waits for any of the buttons to change and sends
//! one character per change: `'0'` plus the button bits. With the
//! `loopback` feature the port instead runs the TX->RX self-test forever;
//! jumper TX to RX and RTS to CTS first.

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::buffered_uarte::{self, BufferedUarte};
use embassy_nrf::{bind_interrupts, peripherals};
use {defmt_rtt as _, panic_probe as _};

use pinlab_core::fault::ConfigFault;
use pinlab_hal::uart::FlowControl;
use pinlab_hal::UartConfig;
use pinlab_firmware::fault::halt;
use pinlab_firmware::serial::{self, Serial};
use pinlab_firmware::{board, uart_pins};
use pinlab_hal_nrf52::{Mmio, Port};

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => buffered_uarte::InterruptHandler<peripherals::UARTE0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("uart-training starting");

    let mut port = unwrap!(Port::<Mmio>::take());
    if let Err(e) = board::configure(&mut port) {
        halt(e.into(), &port);
    }

    // Host communication runs without flow control, the loopback test with it
    let flow_control = board::UART_FLOW_CONTROL || cfg!(feature = "loopback");
    let uart = UartConfig::with_baudrate(board::UART_BAUDRATE).flow_control(flow_control);
    let config = match serial::config(&uart) {
        Ok(config) => config,
        Err(e) => halt(ConfigFault::Board(e).into(), &port),
    };

    // The receiver runs into `rx_buf` from here on, whether or not
    // anything is reading
    let mut rx_buf = [0u8; 64];
    let mut tx_buf = [0u8; 64];
    let (rx, tx, cts, rts) = uart_pins!(p);
    let uarte = match uart.flow_control {
        FlowControl::Enabled => BufferedUarte::new_with_rtscts(
            p.UARTE0,
            p.TIMER0,
            p.PPI_CH0,
            p.PPI_CH1,
            p.PPI_GROUP0,
            rx,
            tx,
            cts,
            rts,
            Irqs,
            config,
            &mut rx_buf,
            &mut tx_buf,
        ),
        FlowControl::Disabled => BufferedUarte::new(
            p.UARTE0,
            p.TIMER0,
            p.PPI_CH0,
            p.PPI_CH1,
            p.PPI_GROUP0,
            rx,
            tx,
            Irqs,
            config,
            &mut rx_buf,
            &mut tx_buf,
        ),
    };
    let mut serial = Serial::new(uarte);
    info!("UART up: {}", uart);

    #[cfg(feature = "loopback")]
    loopback(&mut serial, &port);

    #[cfg(not(feature = "loopback"))]
    echo(&mut serial, &mut port);
}

#[cfg(feature = "loopback")]
fn loopback(serial: &mut Serial<'_>, port: &Port<Mmio>) -> ! {
    use pinlab_core::loopback::run_loopback;

    let mut delay = embassy_time::Delay;
    let mut passes: u32 = 0;
    loop {
        if let Err(e) = run_loopback(serial, &mut delay) {
            defmt::error!("loopback failed after {} passes: {}", passes, e);
            halt(e.into(), port);
        }
        passes = passes.wrapping_add(1);
        if passes % 100 == 0 {
            info!("loopback: {} passes", passes);
        }
    }
}

#[cfg(not(feature = "loopback"))]
fn echo(serial: &mut Serial<'_>, port: &mut Port<Mmio>) -> ! {
    use pinlab_core::buttons::{ButtonEcho, ButtonWatcher, EchoError};
    use pinlab_core::delay::Never;
    use pinlab_core::fault::{Disposition, Fault, FaultPolicy};

    // The training binaries stop at the first fault
    const POLICY: FaultPolicy = FaultPolicy::Strict;

    if let Err(fault) = serial.write_str("\r\nUART example started.\r\n") {
        halt(fault.into(), port);
    }

    let mut echo = match ButtonWatcher::new(port, board::BUTTON_GROUP) {
        Ok(watcher) => ButtonEcho::new(watcher),
        Err(e) => halt(e.into(), port),
    };
    info!("buttons at {:b}", echo.watcher().baseline());

    loop {
        let fault: Fault = match echo.step(port, serial, &Never) {
            Ok(ch) => {
                info!("sent '{}'", ch as char);
                continue;
            }
            Err(EchoError::Fault(fault)) => fault,
            // `Never` does not cancel
            Err(EchoError::Cancelled) => continue,
        };

        match fault.disposition(POLICY) {
            Disposition::Halt => halt(fault, port),
            Disposition::Resync => {
                defmt::warn!("{}, resynchronizing", fault);
                echo = match ButtonWatcher::new(port, board::BUTTON_GROUP) {
                    Ok(watcher) => ButtonEcho::new(watcher),
                    Err(e) => halt(e.into(), port),
                };
            }
        }
    }
}
