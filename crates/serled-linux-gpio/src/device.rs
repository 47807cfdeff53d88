//! Linux GPIO LED bank implementation
//!
//! This module provides the `LinuxGpioBank` struct that implements the
//! `ActuatorDrive` trait using Linux's GPIO character device interface
//! (gpiocdev). One line request covers all LED lines; each line starts as
//! an input and is reconfigured as an output when the console configures
//! its bank, which is also where active-low polarity is resolved into line
//! flags.

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use serled_core::actuator::{ActuatorDrive, ActuatorState, Polarity};
use serled_core::error::ActuatorFault;

use crate::error::{LinuxGpioError, Result};

/// Configuration for opening a Linux GPIO LED bank
#[derive(Debug, Clone, Default)]
pub struct LinuxGpioBankConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// GPIO line offsets, one per LED, in command order
    pub lines: Vec<Offset>,
}

impl LinuxGpioBankConfig {
    /// Create a new configuration with the given device path and lines
    pub fn new(device: impl Into<String>, lines: impl Into<Vec<Offset>>) -> Self {
        Self {
            device: device.into(),
            lines: lines.into(),
        }
    }
}

/// Linux GPIO LED bank
///
/// Each LED maps to one GPIO line offset; the line index within the config
/// is the actuator index the console dispatches on.
pub struct LinuxGpioBank {
    request: Request,
    offsets: Vec<Offset>,
}

impl LinuxGpioBank {
    /// Open a Linux GPIO LED bank with the given configuration
    pub fn open(config: &LinuxGpioBankConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }
        if config.lines.is_empty() {
            return Err(LinuxGpioError::NoLines);
        }

        log::debug!("linux_gpio: Opening device {}", config.device);

        // Request every line as an input first; configure() flips them to
        // outputs one at a time with the polarity the console resolved.
        let mut req_config = Config::default();
        for &offset in &config.lines {
            req_config.with_line(offset).as_input();
        }

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer("serled")
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)?;

        log::info!(
            "linux_gpio: Opened {} ({} LED lines: {:?})",
            config.device,
            config.lines.len(),
            config.lines
        );

        Ok(Self {
            request,
            offsets: config.lines.clone(),
        })
    }

    fn offset(&self, index: usize) -> std::result::Result<Offset, ActuatorFault> {
        self.offsets
            .get(index)
            .copied()
            .ok_or(ActuatorFault::OutOfRange {
                index,
                count: self.offsets.len(),
            })
    }
}

impl ActuatorDrive for LinuxGpioBank {
    fn count(&self) -> usize {
        self.offsets.len()
    }

    fn is_ready(&self, index: usize) -> bool {
        // holding the line request means the chip is there; readiness is
        // per-line membership in the request
        index < self.offsets.len()
    }

    fn configure(
        &mut self,
        index: usize,
        polarity: Polarity,
        initial: ActuatorState,
    ) -> std::result::Result<(), ActuatorFault> {
        let offset = self.offset(index)?;
        let value = if initial.is_on() {
            Value::Active
        } else {
            Value::Inactive
        };

        let mut cfg = Config::default();
        cfg.with_line(offset);
        if matches!(polarity, Polarity::ActiveLow) {
            cfg.as_active_low();
        }
        cfg.as_output(value);

        self.request.reconfigure(&cfg).map_err(|e| {
            log::error!("linux_gpio: failed to configure line {}: {}", offset, e);
            ActuatorFault::ConfigRejected { index }
        })?;

        log::debug!(
            "linux_gpio: line {} configured as output ({:?}, initially {:?})",
            offset,
            polarity,
            initial
        );
        Ok(())
    }

    fn apply(
        &mut self,
        index: usize,
        state: ActuatorState,
    ) -> std::result::Result<(), ActuatorFault> {
        let offset = self.offset(index)?;
        let value = if state.is_on() {
            Value::Active
        } else {
            Value::Inactive
        };

        self.request.set_value(offset, value).map_err(|e| {
            log::error!("linux_gpio: failed to set line {}: {}", offset, e);
            ActuatorFault::ApplyFailed { index }
        })
    }
}

/// Parse LED bank options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `lines=17+27+22` - LED line offsets in command order (required)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioBankConfig, String> {
    let mut config = LinuxGpioBankConfig::default();
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            "lines" => {
                for part in value.split('+') {
                    let offset = part
                        .parse()
                        .map_err(|_| format!("Invalid line offset: {}", part))?;
                    config.lines.push(offset);
                }
            }
            _ => {
                log::warn!("linux_gpio: unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        if let Some(n) = gpiochip {
            if n > 9 {
                return Err("Maximum gpiochip number supported is 9".to_string());
            }
            config.device = format!("/dev/gpiochip{}", n);
        } else {
            return Err("Either 'dev' or 'gpiochip' must be specified.\n\
                 e.g. linux-gpio:dev=/dev/gpiochip0,lines=17+27+22"
                .to_string());
        }
    } else if gpiochip.is_some() {
        return Err("Only one of 'dev' or 'gpiochip' can be specified".to_string());
    }

    if config.lines.is_empty() {
        return Err("Missing required parameter: lines".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_reads_device_and_lines() {
        let config =
            parse_options(&[("dev", "/dev/gpiochip0"), ("lines", "17+27+22")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.lines, vec![17, 27, 22]);
    }

    #[test]
    fn parse_options_accepts_gpiochip_number() {
        let config = parse_options(&[("gpiochip", "0"), ("lines", "5")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.lines, vec![5]);
    }

    #[test]
    fn parse_options_rejects_conflicting_device() {
        assert!(parse_options(&[
            ("dev", "/dev/gpiochip0"),
            ("gpiochip", "1"),
            ("lines", "5"),
        ])
        .is_err());
    }

    #[test]
    fn parse_options_requires_lines() {
        assert!(parse_options(&[("dev", "/dev/gpiochip0")]).is_err());
        assert!(parse_options(&[("lines", "1+2")]).is_err());
    }

    #[test]
    fn parse_options_rejects_bad_offsets() {
        assert!(parse_options(&[("dev", "/dev/gpiochip0"), ("lines", "17+x")]).is_err());
    }
}
