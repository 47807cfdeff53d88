//! CLI argument parsing

use clap::{Parser, Subcommand};

use crate::backends;

/// Generate dynamic help text for the line backend argument
fn line_help() -> String {
    backends::line_help()
}

/// Generate dynamic help text for the LED backend argument
fn led_help() -> String {
    backends::led_help()
}

#[derive(Parser)]
#[command(name = "serled")]
#[command(author, version, about = "Serial LED command console", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the console: received digits 1-9 toggle the matching LED
    Run {
        /// Serial line backend to use
        #[arg(short, long, help = line_help())]
        line: String,

        /// LED backend to use
        #[arg(short = 'L', long, help = led_help())]
        leds: String,

        /// Treat LED outputs as active-low
        #[arg(long)]
        active_low: bool,
    },

    /// Open both backends, check readiness, and report
    Probe {
        /// Serial line backend to use
        #[arg(short, long, help = line_help())]
        line: String,

        /// LED backend to use
        #[arg(short = 'L', long, help = led_help())]
        leds: String,
    },

    /// List compiled-in backends
    ListBackends,
}
