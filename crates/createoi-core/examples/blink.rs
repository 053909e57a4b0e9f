//! Create LED Blink Demo
//!
//! Puts a connected Create into Full mode and steps the Advance/Play LEDs
//! and the power LED through a few colours and intensities.
//!
//! Usage:
//!   cargo run --example blink -- [OPTIONS] [PORT]
//!
//! Options:
//!   --baud RATE       Baud rate the Create is using (default: 57600)
//!   --delay MS        Pause between LED steps in ms (default: 2000)
//!
//! Set RUST_LOG=debug to see every command as it is written.

use anyhow::{bail, Context, Result};
use createoi_core::protocol::{Command, Connection, DEFAULT_BAUD_RATE};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut port_name = "/dev/ttyUSB0".to_string();
    let mut baud_rate = DEFAULT_BAUD_RATE;
    let mut delay_ms = 2000u64;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baud" | "-b" => {
                i += 1;
                let value = args.get(i).context("--baud needs a value")?;
                baud_rate = value.parse().with_context(|| format!("bad baud rate {value}"))?;
            }
            "--delay" | "-d" => {
                i += 1;
                let value = args.get(i).context("--delay needs a value")?;
                delay_ms = value.parse().with_context(|| format!("bad delay {value}"))?;
            }
            "--help" | "-h" => {
                println!("Usage: blink [--baud RATE] [--delay MS] [PORT]");
                return Ok(());
            }
            other if other.starts_with('-') => bail!("unknown option {other}"),
            other => port_name = other.to_string(),
        }
        i += 1;
    }

    let conn = Connection::open(&port_name, baud_rate)
        .with_context(|| format!("opening {port_name} at {baud_rate}"))?;
    info!("connected to {} at {} baud", conn.port(), conn.initial_baud());

    conn.send_many([
        Command::start(),
        Command::full(),
        Command::leds(true, true, 255, 255),
    ])?;

    // (advance, play, colour, intensity)
    let steps = [
        (false, true, 255, 255),
        (false, false, 255, 255),
        (false, false, 128, 255),
        (false, false, 0, 255),
        (false, false, 0, 170),
        (false, false, 0, 85),
        (false, false, 0, 0),
        (false, false, 255, 255),
    ];
    for (advance, play, colour, intensity) in steps {
        std::thread::sleep(Duration::from_millis(delay_ms));
        info!(advance, play, colour, intensity, "setting LEDs");
        conn.send(Command::leds(advance, play, colour, intensity))?;
    }

    conn.join()?;
    Ok(())
}
