mod halfkay;
mod image;
mod layout;
mod sim;
mod tones;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use halfkay::HalfKay;
use image::FirmwareImage;
use sim::Simulator;

#[derive(Parser)]
#[command(name = "keytone-cli")]
#[command(about = "Flash, simulate and inspect the keypad buzzer firmware")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flash a .hex firmware file to Teensy via HalfKay bootloader
    Flash {
        /// Path to the Intel HEX firmware file
        firmware: PathBuf,
        /// Seconds to wait for the bootloader to appear
        #[arg(long, default_value_t = 0)]
        wait: u64,
    },
    /// Detect if a Teensy is connected in bootloader mode
    Detect,
    /// Run the firmware main loop against a simulated board
    Simulate {
        /// Keys to press, one scan each ('.' = no key). Reads stdin lines if omitted
        #[arg(long)]
        keys: Option<String>,
        /// Actually sleep for every delay instead of using virtual time
        #[arg(long)]
        realtime: bool,
    },
    /// Print the PWM settings used for each note of the melody
    Tones {
        /// Timer input clock in Hz
        #[arg(long, default_value_t = sim::CLOCK_HZ)]
        clock_hz: u32,
    },
    /// Render the keypad layout as HTML
    Layout {
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Flash { firmware, wait } => {
            let contents = fs::read_to_string(&firmware)
                .with_context(|| format!("reading {}", firmware.display()))?;
            let image = FirmwareImage::from_hex(&contents).context("parsing Intel HEX file")?;

            info!(
                "Firmware: {} bytes at base address 0x{:04X}",
                image.data.len(),
                image.base_address
            );

            let bootloader = if wait > 0 {
                HalfKay::wait(Duration::from_secs(wait))?
            } else {
                HalfKay::open()?
            };
            bootloader.program(&image)?;
            bootloader.reboot();
            info!("Teensy rebooted. Firmware should be running.");
        }
        Command::Detect => {
            if halfkay::detect()? {
                println!("Teensy bootloader detected (HalfKay mode).");
            } else {
                println!("Teensy bootloader not detected.");
                println!("Press the reset button on the Teensy to enter bootloader mode.");
            }
        }
        Command::Simulate { keys, realtime } => {
            let mut sim = Simulator::new(realtime);
            match keys {
                Some(keys) => keys
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .for_each(|c| {
                        sim.feed(c);
                    }),
                None => {
                    for line in io::stdin().lock().lines() {
                        let line = line.context("reading stdin")?;
                        for c in line.chars().filter(|c| !c.is_whitespace()) {
                            sim.feed(c);
                        }
                    }
                }
            }
            let leds = sim.leds();
            println!(
                "{} ms simulated; LEDs red={} blue={} green={}; buzzer {}",
                sim.elapsed_ms(),
                leds.red,
                leds.blue,
                leds.green,
                if sim.buzzer_enabled() { "on" } else { "off" }
            );
        }
        Command::Tones { clock_hz } => {
            let rows = tones::table(clock_hz, &keytone_core::IMPERIAL_MARCH);
            print!("{}", tones::render(clock_hz, &rows));
        }
        Command::Layout { output } => {
            let html = layout::generate_html();
            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{}", html),
            }
        }
    }

    Ok(())
}
