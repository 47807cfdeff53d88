//! Serial port line implementation
//!
//! Implements the console's `SerialLine` contract over a host serial port.
//! Received bytes accumulate into the armed window; an idle gap of the
//! arming timeout flushes the pending bytes as one data window, a full
//! window yields its final data window followed by a disable, and an idle
//! gap on a partially consumed window also disables it so the console can
//! re-arm at full capacity.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use serled_core::error::TransportFault;
use serled_core::line::{LineEvent, SerialLine};

use crate::error::{Result, SerialError};

/// Configuration for opening a serial line
#[derive(Debug, Clone)]
pub struct SerialLineConfig {
    /// Device path (e.g., "/dev/ttyACM0")
    pub device: String,
    /// Baud rate
    pub baud: u32,
}

impl Default for SerialLineConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            baud: 115200,
        }
    }
}

impl SerialLineConfig {
    /// Create a configuration for the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }
}

/// Receive-side state while armed
#[derive(Debug, Clone, Copy)]
struct RxState {
    capacity: usize,
    idle_timeout: Duration,
    /// Bytes stored in the window so far
    fill: usize,
    /// Bytes already reported in earlier data windows
    flush: usize,
}

/// Serial port transport for the console
pub struct SerialPortLine {
    port: Box<dyn SerialPort>,
    rx: Option<RxState>,
    send_complete_pending: bool,
    disable_pending: bool,
}

impl SerialPortLine {
    /// Open a serial port with 8N1 framing and no flow control
    pub fn open(config: &SerialLineConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(SerialError::NoDevice);
        }

        let port = serialport::new(config.device.as_str(), config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()?;

        log::info!(
            "Opened serial port {} at {} baud",
            config.device,
            config.baud
        );

        Ok(Self {
            port,
            rx: None,
            send_complete_pending: false,
            disable_pending: false,
        })
    }

    /// Discard whatever arrives while the receive path is unarmed
    fn idle_unarmed(&mut self, wait: Duration) -> Option<LineEvent> {
        let mut scratch = [0u8; 64];
        if self.port.set_timeout(wait).is_ok() {
            if let Ok(n) = self.port.read(&mut scratch) {
                if n > 0 {
                    log::warn!("serial: discarded {} bytes while receive is unarmed", n);
                }
            }
        }
        None
    }
}

impl SerialLine for SerialPortLine {
    fn send(&mut self, data: &[u8]) -> std::result::Result<(), TransportFault> {
        if let Err(e) = self.port.write_all(data) {
            log::error!("serial: write failed: {}", e);
            return Err(TransportFault::SendFailed);
        }
        if let Err(e) = self.port.flush() {
            log::error!("serial: flush failed: {}", e);
            return Err(TransportFault::SendFailed);
        }
        self.send_complete_pending = true;
        Ok(())
    }

    fn arm_receive(
        &mut self,
        capacity: usize,
        idle_timeout: Duration,
    ) -> std::result::Result<(), TransportFault> {
        if capacity == 0 {
            log::error!("serial: cannot arm a zero-capacity window");
            return Err(TransportFault::ArmFailed);
        }

        self.rx = Some(RxState {
            capacity,
            idle_timeout,
            fill: 0,
            flush: 0,
        });
        self.disable_pending = false;
        log::debug!(
            "serial: receive armed ({} bytes, idle timeout {:?})",
            capacity,
            idle_timeout
        );
        Ok(())
    }

    fn poll_event(
        &mut self,
        window: &mut [u8],
        wait: Duration,
    ) -> std::result::Result<Option<LineEvent>, TransportFault> {
        if self.send_complete_pending {
            self.send_complete_pending = false;
            return Ok(Some(LineEvent::SendComplete));
        }
        if self.disable_pending {
            self.disable_pending = false;
            self.rx = None;
            return Ok(Some(LineEvent::Disabled));
        }

        let Some(mut rx) = self.rx else {
            return Ok(self.idle_unarmed(wait));
        };

        let cap = rx.capacity.min(window.len());
        let deadline = Instant::now() + wait;

        loop {
            if rx.fill >= cap {
                // window exhausted and already fully reported
                self.rx = None;
                return Ok(Some(LineEvent::Disabled));
            }

            if let Err(e) = self.port.set_timeout(rx.idle_timeout) {
                self.rx = Some(rx);
                log::error!("serial: failed to set timeout: {}", e);
                return Err(TransportFault::Io);
            }

            let gap = match self.port.read(&mut window[rx.fill..cap]) {
                Ok(0) => true,
                Ok(n) => {
                    rx.fill += n;
                    false
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => true,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.rx = Some(rx);
                    log::error!("serial: read failed: {}", e);
                    return Err(TransportFault::Io);
                }
            };

            if gap {
                if rx.fill > rx.flush {
                    // inactivity flushes the pending burst as one window
                    let offset = rx.flush;
                    let len = rx.fill - rx.flush;
                    rx.flush = rx.fill;
                    self.rx = Some(rx);
                    return Ok(Some(LineEvent::DataReady { offset, len }));
                }
                if rx.fill > 0 {
                    // partially consumed window went idle; recycle it
                    self.rx = None;
                    return Ok(Some(LineEvent::Disabled));
                }
                if Instant::now() >= deadline {
                    self.rx = Some(rx);
                    return Ok(None);
                }
            } else if rx.fill >= cap {
                // the window just filled up: report the final burst now,
                // the disable on the next poll
                let offset = rx.flush;
                let len = rx.fill - rx.flush;
                rx.flush = rx.fill;
                if len > 0 {
                    self.rx = Some(rx);
                    self.disable_pending = true;
                    return Ok(Some(LineEvent::DataReady { offset, len }));
                }
                self.rx = None;
                return Ok(Some(LineEvent::Disabled));
            }
        }
    }
}

/// Parse line options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/ttyACM0` - serial device path (required)
/// - `baud=115200` - baud rate (optional, default 115200)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<SerialLineConfig, String> {
    let mut config = SerialLineConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "baud" => {
                config.baud = value
                    .parse()
                    .map_err(|_| format!("Invalid baud value: {}", value))?;
            }
            _ => {
                log::warn!("serial: unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("Missing required parameter: dev\n\
             e.g. serial:dev=/dev/ttyACM0,baud=115200"
            .to_string());
    }

    Ok(config)
}
