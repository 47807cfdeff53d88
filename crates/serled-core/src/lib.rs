//! serled-core - Core library for the serled serial LED console
//!
//! This crate provides the heart of the console: a serial line abstraction
//! that delivers received bytes in event-driven windows, a console context
//! that keeps the bounded receive window continuously armed, and a
//! single-byte dispatcher that maps ASCII digits to LED toggles. It is
//! designed to be `no_std` compatible so the same core runs against a real
//! serial port, a GPIO LED board, or the scripted fakes used in tests.
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error` impls)
//!
//! # Example
//!
//! ```ignore
//! use serled_core::actuator::{ActuatorBank, Polarity};
//! use serled_core::console::Console;
//!
//! let bank = ActuatorBank::new(drive, Polarity::ActiveHigh)?;
//! let mut console = Console::new(line, bank);
//! console.start(b"Press 1-4 to toggle LEDs\r\n")?;
//! console.run()?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod actuator;
pub mod console;
pub mod error;
pub mod line;

pub use error::{ActuatorFault, Error, Result, TransportFault};
