//! Error types for the serial line backend

use thiserror::Error;

/// Serial backend specific errors
#[derive(Debug, Error)]
pub enum SerialError {
    /// No device path was given
    #[error("No serial device specified. Use dev=/dev/ttyACM0")]
    NoDevice,

    /// Invalid parameter in an option string
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the serial port layer
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// I/O error during communication
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for serial backend operations
pub type Result<T> = std::result::Result<T, SerialError>;
