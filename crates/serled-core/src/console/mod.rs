//! The console context and its event loop
//!
//! [`Console`] owns the receive window, the actuator bank, and the serial
//! line, and is the single handler for line events. All state transitions
//! happen inside [`Console::handle_event`]; the perpetual [`Console::run`]
//! loop only keeps the process alive between events and logs a liveness
//! heartbeat on idle ticks.
//!
//! The receive state machine: unarmed at creation, armed by
//! [`Console::start`], and re-armed immediately and unconditionally after
//! every [`LineEvent::Disabled`]. A data window delivered while unarmed is
//! lost data and is reported, never silently swallowed.

pub mod dispatch;
pub mod rx;

use core::time::Duration;

use crate::actuator::{ActuatorBank, ActuatorDrive};
use crate::error::{Error, TransportFault};
use crate::line::{LineEvent, SerialLine};

use self::rx::RxBuffer;

/// Longest in-stream pause still treated as "no activity yet"
///
/// Guarantees a data window fires even for a single keystroke instead of
/// waiting for the window to fill. Fixed by design; not runtime
/// configurable.
pub const RECEIVE_IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Wake period of the idle loop, used only for the liveness heartbeat
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

/// The serial LED console
///
/// One explicit context value instead of module-level globals: construct it
/// with a fake line and a fake drive and the whole core is unit-testable.
pub struct Console<L, D> {
    line: L,
    bank: ActuatorBank<D>,
    rx: RxBuffer,
}

impl<L: SerialLine, D: ActuatorDrive> Console<L, D> {
    /// Create a console over a line and a configured-at-startup bank
    pub fn new(line: L, bank: ActuatorBank<D>) -> Self {
        Self {
            line,
            bank,
            rx: RxBuffer::new(),
        }
    }

    /// The actuator bank
    pub fn bank(&self) -> &ActuatorBank<D> {
        &self.bank
    }

    /// Whether the receive window is currently armed
    pub fn is_armed(&self) -> bool {
        self.rx.armed()
    }

    /// Bring the console up: configure outputs, send the banner, arm
    ///
    /// Any fault here is fatal; the caller must not enter the event loop.
    pub fn start(&mut self, banner: &[u8]) -> Result<(), Error> {
        self.bank.configure_all()?;
        log::debug!("Configured {} LEDs on", self.bank.count());

        self.line.send(banner)?;
        self.arm()?;
        Ok(())
    }

    /// Arm the receive path with the console's own window and fixed timeout
    fn arm(&mut self) -> Result<(), TransportFault> {
        self.line
            .arm_receive(self.rx.capacity(), RECEIVE_IDLE_TIMEOUT)?;
        self.rx.set_armed(true);
        Ok(())
    }

    /// Process one line event
    ///
    /// Runtime faults are reported here and the handler returns normally,
    /// so the line stays usable after a failed toggle or a lost window.
    pub fn handle_event(&mut self, event: LineEvent) {
        match event {
            LineEvent::DataReady { offset, len } => {
                if !self.rx.armed() {
                    log::error!(
                        "Lost {} received bytes: window delivered while receive is unarmed",
                        len
                    );
                    return;
                }
                let window = self.rx.window(offset, len);
                dispatch::dispatch(&mut self.bank, window, len);
            }
            LineEvent::Disabled => {
                self.rx.set_armed(false);
                log::debug!("Receive disabled, re-arming");
                if let Err(fault) = self.arm() {
                    // no retry beyond this attempt; without a working
                    // receive path every future command is lost
                    log::error!(
                        "Failed to re-arm receive ({}); command processing has stopped",
                        fault
                    );
                }
            }
            LineEvent::SendComplete => log::debug!("Transmission complete"),
            LineEvent::Other => log::trace!("Ignoring unhandled line event"),
        }
    }

    /// Wait up to `wait` for one event and process it
    ///
    /// Returns whether an event was processed; `false` is an idle tick.
    pub fn poll_once(&mut self, wait: Duration) -> Result<bool, TransportFault> {
        match self.line.poll_event(self.rx.as_mut_slice(), wait)? {
            Some(event) => {
                self.handle_event(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The perpetual idle loop
    ///
    /// Pure liveness glue: everything interesting happens in
    /// [`Console::handle_event`]. Only a transport-level poll failure ends
    /// the loop; there is no other shutdown path.
    pub fn run(&mut self) -> Result<(), TransportFault> {
        loop {
            if !self.poll_once(HEARTBEAT_PERIOD)? {
                log::info!("Console running, {} LEDs", self.bank.count());
            }
        }
    }
}
