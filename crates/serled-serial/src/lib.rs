//! serled-serial - Serial port line backend
//!
//! This crate connects the console core to a real serial port using the
//! `serialport` crate. The port is opened with 8N1 framing and no flow
//! control; received bytes are delivered to the console in idle-gap
//! delimited windows, matching the event contract of
//! [`serled_core::line::SerialLine`].
//!
//! # Example
//!
//! ```no_run
//! use serled_serial::{SerialLineConfig, SerialPortLine};
//!
//! let config = SerialLineConfig::new("/dev/ttyACM0").with_baud(115200);
//! let line = SerialPortLine::open(&config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the serled CLI
//!
//! ```bash
//! serled run --line serial:dev=/dev/ttyACM0,baud=115200 --leds dummy:count=4
//! ```

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, SerialLineConfig, SerialPortLine};
pub use error::{Result, SerialError};
