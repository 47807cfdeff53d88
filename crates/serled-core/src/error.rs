//! Error types for serled-core
//!
//! This module provides no_std compatible fault types shared between the
//! console core and the backend crates. Backends log their own detailed
//! errors and map them into these taxonomies at the trait boundary.

use core::fmt;

/// Actuator/board fault - Copy for efficiency
///
/// Fatal during startup configuration; reported and tolerated when raised
/// by a toggle after the console has entered its event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorFault {
    /// Index is beyond the configured actuator count
    OutOfRange {
        /// The requested index
        index: usize,
        /// Number of actuators in the bank
        count: usize,
    },
    /// Actuator hardware reported not-ready during the startup check
    NotReady {
        /// The failing index
        index: usize,
    },
    /// Hardware rejected the configuration step
    ConfigRejected {
        /// The failing index
        index: usize,
    },
    /// Hardware rejected a state change
    ApplyFailed {
        /// The failing index
        index: usize,
    },
    /// Toggle requested before the bank was configured
    NotConfigured,
    /// More actuators than the single-digit command space can address
    TooManyActuators {
        /// The requested count
        count: usize,
    },
}

/// Transport fault - Copy for efficiency
///
/// Fatal during startup; a failed re-arm after a disable event is the most
/// serious runtime fault since it silently stops all command processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// Transport device is not ready or was lost
    NotReady,
    /// Arming the receive path failed
    ArmFailed,
    /// Queueing a transmission failed
    SendFailed,
    /// I/O failure on the underlying device
    Io,
}

/// Combined error type for operations that touch both collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator/board fault
    Actuator(ActuatorFault),
    /// A transport fault
    Transport(TransportFault),
}

impl fmt::Display for ActuatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, count } => {
                write!(f, "actuator index {} out of range (bank has {})", index, count)
            }
            Self::NotReady { index } => write!(f, "actuator {} is not ready", index),
            Self::ConfigRejected { index } => {
                write!(f, "actuator {} rejected configuration", index)
            }
            Self::ApplyFailed { index } => write!(f, "actuator {} rejected state change", index),
            Self::NotConfigured => write!(f, "actuator bank is not configured"),
            Self::TooManyActuators { count } => {
                write!(f, "{} actuators exceed the single-digit command space", count)
            }
        }
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "transport not ready"),
            Self::ArmFailed => write!(f, "failed to arm receive"),
            Self::SendFailed => write!(f, "failed to queue transmission"),
            Self::Io => write!(f, "transport I/O error"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(fault) => write!(f, "{}", fault),
            Self::Transport(fault) => write!(f, "{}", fault),
        }
    }
}

impl From<ActuatorFault> for Error {
    fn from(fault: ActuatorFault) -> Self {
        Error::Actuator(fault)
    }
}

impl From<TransportFault> for Error {
    fn from(fault: TransportFault) -> Self {
        Error::Transport(fault)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ActuatorFault {}

#[cfg(feature = "std")]
impl std::error::Error for TransportFault {}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the combined error type
pub type Result<T> = core::result::Result<T, Error>;
