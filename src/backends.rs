//! Backend registration and dispatch
//!
//! This module provides a centralized registry for the line and LED
//! backends, with support for feature-gated inclusion and dynamic help
//! text generation. Backends are selected with spec strings of the form
//! `name` or `name:key=value,key=value`.

use serled_core::actuator::ActuatorDrive;
use serled_core::line::SerialLine;

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all line backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_line_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "Scripted line for testing (script=<bytes>)",
    });

    #[cfg(feature = "serial")]
    backends.push(BackendInfo {
        name: "serial",
        aliases: &["serialport"],
        description: "Host serial port (dev=/dev/ttyACM0,baud=115200)",
    });

    backends
}

/// Get information about all LED backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_led_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory LED bank (count=<n>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux-gpio",
        aliases: &["linux_gpio"],
        description: "GPIO character device LEDs (dev=/dev/gpiochip0,lines=17+27+22)",
    });

    backends
}

fn names_short(backends: &[BackendInfo]) -> String {
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Help text for the line backend argument
pub fn line_help() -> String {
    format!(
        "Serial line backend to use [available: {}]",
        names_short(&available_line_backends())
    )
}

/// Help text for the LED backend argument
pub fn led_help() -> String {
    format!(
        "LED backend to use [available: {}]",
        names_short(&available_led_backends())
    )
}

/// Print all compiled-in backends
pub fn list_backends() {
    println!("Line backends:");
    for backend in available_line_backends() {
        print_backend(&backend);
    }
    println!();
    println!("LED backends:");
    for backend in available_led_backends() {
        print_backend(&backend);
    }
}

fn print_backend(backend: &BackendInfo) {
    if backend.aliases.is_empty() {
        println!("  {:12} - {}", backend.name, backend.description);
    } else {
        println!(
            "  {:12} - {} (aliases: {})",
            backend.name,
            backend.description,
            backend.aliases.join(", ")
        );
    }
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Execute a function with the specified line backend
#[allow(unused_variables)]
pub fn with_line<F>(spec: &str, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn SerialLine) -> Result<(), Box<dyn std::error::Error>>,
{
    let (name, options) = parse_backend_string(spec);

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let mut line = serled_dummy::line_from_options(&options)
                .map_err(|e| format!("Invalid dummy line parameters: {}", e))?;
            f(&mut line)
        }

        #[cfg(feature = "serial")]
        "serial" | "serialport" => {
            let config = serled_serial::parse_options(&options)
                .map_err(|e| format!("Invalid serial parameters: {}", e))?;
            let mut line = serled_serial::SerialPortLine::open(&config).map_err(|e| {
                format!(
                    "Failed to open serial port: {}\n\
                     Make sure the device is connected and you have permissions.\n\
                     You may need to: sudo usermod -aG dialout $USER",
                    e
                )
            })?;
            f(&mut line)
        }

        _ => Err(unknown_backend_error("line", name)),
    }
}

/// Execute a function with the specified LED backend
#[allow(unused_variables)]
pub fn with_led_drive<F>(spec: &str, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn ActuatorDrive) -> Result<(), Box<dyn std::error::Error>>,
{
    let (name, options) = parse_backend_string(spec);

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let mut bank = serled_dummy::bank_from_options(&options)
                .map_err(|e| format!("Invalid dummy LED parameters: {}", e))?;
            f(&mut bank)
        }

        #[cfg(feature = "linux-gpio")]
        "linux-gpio" | "linux_gpio" => {
            let config = serled_linux_gpio::parse_options(&options)
                .map_err(|e| format!("Invalid linux-gpio parameters: {}", e))?;
            let mut bank = serled_linux_gpio::LinuxGpioBank::open(&config).map_err(|e| {
                format!(
                    "Failed to open GPIO LED bank: {}\n\
                     Make sure the device exists and you have read/write permissions.",
                    e
                )
            })?;
            f(&mut bank)
        }

        _ => Err(unknown_backend_error("LED", name)),
    }
}

fn unknown_backend_error(kind: &str, name: &str) -> Box<dyn std::error::Error> {
    format!(
        "Unknown {} backend: {}\n\nUse 'serled list-backends' for details",
        kind, name
    )
    .into()
}
