//! Error types for Linux GPIO LED operations

use thiserror::Error;

/// Linux GPIO backend specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines
    #[error("Failed to request GPIO lines: {0}")]
    LineRequestFailed(#[source] gpiocdev::Error),

    /// Failed to reconfigure a GPIO line as output
    #[error("Failed to reconfigure GPIO line: {0}")]
    ReconfigureFailed(#[source] gpiocdev::Error),

    /// Failed to set a GPIO line value
    #[error("Failed to set GPIO line value: {0}")]
    SetValueFailed(#[source] gpiocdev::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// No LED lines specified
    #[error("No LED lines specified. Use lines=<offset>+<offset>+...")]
    NoLines,
}

/// Result type for Linux GPIO LED operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
