//! Build script for pinlab-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates the board constants and the `uart_pins!` macro

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pinlab_core::config::BoardConfig;

fn main() {
    setup_linker();
    let board = load_board();
    generate_board(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate board.toml
fn load_board() -> BoardConfig {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml pin assignment file.         ║\n\
            ║  Please create one in the pinlab-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let board: BoardConfig = match toml::from_str(&content) {
        Ok(board) => board,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid board.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    if let Err(e) = board.validate() {
        errors.push(e.to_string());
    }
    // Every binary reads at least one button
    if board.buttons.is_empty() {
        errors.push("at least one button is required".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pin_list(pins: &[u8]) -> String {
    pins.iter()
        .map(|pin| pin.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write `$OUT_DIR/board.rs`
fn generate_board(board: &BoardConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let uart = &board.uart;
    let mut code = String::new();

    writeln!(code, "// Generated from board.toml by build.rs").unwrap();
    writeln!(code).unwrap();
    writeln!(
        code,
        "pub const LED_PINS: [u8; {}] = [{}];",
        board.leds.len(),
        pin_list(&board.leds)
    )
    .unwrap();
    writeln!(code, "pub const LED_COUNT: usize = {};", board.leds.len()).unwrap();
    writeln!(code, "pub const LEDS_ACTIVE_LOW: bool = {};", board.leds_active_low).unwrap();
    writeln!(
        code,
        "pub const BUTTON_PINS: [u8; {}] = [{}];",
        board.buttons.len(),
        pin_list(&board.buttons)
    )
    .unwrap();
    writeln!(code, "pub const BUTTONS_ACTIVE_LOW: bool = {};", board.buttons_active_low).unwrap();
    writeln!(code, "pub const LED_MASK: u32 = 0x{:08x};", board.led_mask()).unwrap();
    writeln!(code, "pub const UART_BAUDRATE: u32 = {};", uart.baudrate).unwrap();
    writeln!(code, "pub const UART_FLOW_CONTROL: bool = {};", uart.flow_control).unwrap();
    writeln!(code).unwrap();

    // Peripheral singletons are struct fields, so pin numbers have to be
    // spliced in as identifiers
    writeln!(code, "/// `(rx, tx, cts, rts)` pins taken from embassy-nrf peripherals").unwrap();
    writeln!(code, "#[macro_export]").unwrap();
    writeln!(code, "macro_rules! uart_pins {{").unwrap();
    writeln!(
        code,
        "    ($p:expr) => {{ ($p.P0_{:02}, $p.P0_{:02}, $p.P0_{:02}, $p.P0_{:02}) }};",
        uart.rx, uart.tx, uart.cts, uart.rts
    )
    .unwrap();
    writeln!(code, "}}").unwrap();

    fs::write(out_dir.join("board.rs"), code).unwrap();
}
