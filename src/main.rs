//! serled - Serial LED command console
//!
//! Single keystrokes received over a serial line toggle LEDs: `'1'`
//! toggles the first LED, `'2'` the second, and so on. The console keeps
//! its bounded receive window continuously armed, so commands keep working
//! for as long as the process runs.
//!
//! # Architecture
//!
//! The core (`serled-core`) is backend-agnostic: the serial line and the
//! LED outputs are both traits, selected here via spec strings such as
//! `serial:dev=/dev/ttyACM0` or `linux-gpio:dev=/dev/gpiochip0,lines=17+27+22`.
//! The `dummy` backends run the same console without any hardware.

mod backends;
mod cli;

use clap::Parser;

use cli::{Cli, Commands};
use serled_core::actuator::{ActuatorBank, Polarity};
use serled_core::console::Console;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Run {
            line,
            leds,
            active_low,
        } => run_console(&line, &leds, active_low),
        Commands::Probe { line, leds } => probe(&line, &leds),
        Commands::ListBackends => {
            backends::list_backends();
            Ok(())
        }
    }
}

/// Bring the console up and hand it the process
///
/// Any startup fault propagates out of here before the event loop starts;
/// once `run` is entered, only a dead transport ends the process.
fn run_console(
    line_spec: &str,
    leds_spec: &str,
    active_low: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let polarity = if active_low {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    };

    backends::with_line(line_spec, |line| {
        backends::with_led_drive(leds_spec, |drive| {
            let bank = ActuatorBank::new(drive, polarity)?;
            let banner = format!(
                "serled serial console\r\n\
                 Press 1-{} on your keyboard to toggle the LEDs\r\n",
                bank.count()
            );

            let mut console = Console::new(line, bank);
            console.start(banner.as_bytes())?;
            log::info!("Console started with {} LEDs", console.bank().count());

            console.run()?;
            Ok(())
        })
    })
}

/// Open both backends and report readiness without touching LED state
fn probe(line_spec: &str, leds_spec: &str) -> Result<(), Box<dyn std::error::Error>> {
    backends::with_line(line_spec, |_line| {
        println!("Serial line:  OK ({})", line_spec);
        Ok(())
    })?;

    backends::with_led_drive(leds_spec, |drive| {
        println!("LED outputs:  {}", drive.count());
        for index in 0..drive.count() {
            println!(
                "  LED {}: {}",
                index + 1,
                if drive.is_ready(index) {
                    "ready"
                } else {
                    "not ready"
                }
            );
        }
        Ok(())
    })
}
