//! Single-byte command dispatch
//!
//! A received window is a command only when its reported length is exactly
//! one byte: the ASCII digits `'1'..='9'` select an actuator by position.
//! Everything else is diagnostic-only - an unrecognized single byte is
//! simply not a command, and a longer (or empty) window is reported with a
//! bounded copy of its bytes and dropped. Dispatch never blocks and never
//! raises an error to its caller.

use heapless::Vec;

use super::rx::RX_CAPACITY;
use crate::actuator::{ActuatorBank, ActuatorDrive};

/// What one received window amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Recognized digit; the actuator at this index was toggled
    Toggled(usize),
    /// Single byte outside the command set; dropped without comment
    Ignored,
    /// Recognized digit, but the toggle was rejected by the hardware
    Faulted(usize),
    /// Reported length was not 1; carries the bounded diagnostic copy
    Oversized(Vec<u8, RX_CAPACITY>),
}

/// Map a received byte to an actuator index
fn command_index(byte: u8) -> Option<usize> {
    match byte {
        b'1'..=b'9' => Some((byte - b'1') as usize),
        _ => None,
    }
}

/// Interpret one received window against the bank
///
/// `window` is the capacity-clamped view of the reported bytes and
/// `reported_len` the length the transport reported for the event; the
/// diagnostic copy reads at most `reported_len` bytes and never past the
/// end of `window`.
pub fn dispatch<D: ActuatorDrive>(
    bank: &mut ActuatorBank<D>,
    window: &[u8],
    reported_len: usize,
) -> Dispatch {
    if reported_len != 1 {
        let mut copy: Vec<u8, RX_CAPACITY> = Vec::new();
        let take = reported_len.min(window.len()).min(copy.capacity());
        let _ = copy.extend_from_slice(&window[..take]);

        log::error!("Received data is too long, len = {}", reported_len);
        log::info!("Received \"{}\"", copy.escape_ascii());
        log::warn!("Send single-digit commands without CR or LF");
        return Dispatch::Oversized(copy);
    }

    let Some(&byte) = window.first() else {
        log::error!("Empty window reported with length 1");
        return Dispatch::Ignored;
    };

    log::debug!("Received {:?}", byte as char);

    match command_index(byte) {
        Some(index) if index < bank.count() => match bank.toggle(index) {
            Ok(state) => {
                log::info!(
                    "Toggled LED {} {}",
                    index + 1,
                    if state.is_on() { "on" } else { "off" }
                );
                Dispatch::Toggled(index)
            }
            Err(fault) => {
                // a single failed toggle must not take the pipeline down
                log::error!("LED {} toggle failed: {}", index + 1, fault);
                Dispatch::Faulted(index)
            }
        },
        // any other single character is simply not a command
        _ => Dispatch::Ignored,
    }
}
