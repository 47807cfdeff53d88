//! Actuator bank and output drive abstraction
//!
//! The bank owns the logical on/off state of a fixed set of LEDs and talks
//! to the hardware through the [`ActuatorDrive`] trait. Polarity is
//! resolved when an output is configured; the dispatcher only ever sees
//! logical states.

use heapless::Vec;

use crate::error::ActuatorFault;

/// Maximum actuators addressable by the single ASCII digit command space
/// (`'1'..='9'`)
pub const MAX_ACTUATORS: usize = 9;

/// Logical on/off state of one actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorState {
    /// Output logically on
    On,
    /// Output logically off
    Off,
}

impl ActuatorState {
    /// The opposite state
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    /// True for [`ActuatorState::On`]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Electrical polarity of an output
///
/// Resolved once at configuration time; invisible above the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Logical on drives the line high
    #[default]
    ActiveHigh,
    /// Logical on drives the line low
    ActiveLow,
}

/// Board/output driver for a fixed set of binary outputs
///
/// All operations are synchronous and complete without suspending; they
/// are expected to run inside the console's event handler.
pub trait ActuatorDrive {
    /// Number of outputs this drive controls
    fn count(&self) -> usize;

    /// Check whether the output hardware is ready to be configured
    fn is_ready(&self, index: usize) -> bool;

    /// Configure one output, resolving its polarity and driving it to
    /// `initial`
    fn configure(
        &mut self,
        index: usize,
        polarity: Polarity,
        initial: ActuatorState,
    ) -> Result<(), ActuatorFault>;

    /// Drive one configured output to `state`
    fn apply(&mut self, index: usize, state: ActuatorState) -> Result<(), ActuatorFault>;
}

// Blanket impl so banks can be built over `&mut dyn ActuatorDrive` from the
// CLI backend registry.
impl<T: ActuatorDrive + ?Sized> ActuatorDrive for &mut T {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn is_ready(&self, index: usize) -> bool {
        (**self).is_ready(index)
    }

    fn configure(
        &mut self,
        index: usize,
        polarity: Polarity,
        initial: ActuatorState,
    ) -> Result<(), ActuatorFault> {
        (**self).configure(index, polarity, initial)
    }

    fn apply(&mut self, index: usize, state: ActuatorState) -> Result<(), ActuatorFault> {
        (**self).apply(index, state)
    }
}

#[derive(Debug, Clone, Copy)]
struct Actuator {
    state: ActuatorState,
    polarity: Polarity,
}

/// Fixed bank of LEDs addressed by index
///
/// Created once at startup; actuator state is mutated only by toggles and
/// never destroyed for the lifetime of the process.
pub struct ActuatorBank<D> {
    drive: D,
    actuators: Vec<Actuator, MAX_ACTUATORS>,
    configured: bool,
}

impl<D: ActuatorDrive> ActuatorBank<D> {
    /// Create a bank over `drive`, one actuator per drive output
    ///
    /// Fails if the drive exposes more outputs than the single-digit
    /// command space can address.
    pub fn new(drive: D, polarity: Polarity) -> Result<Self, ActuatorFault> {
        let count = drive.count();
        if count > MAX_ACTUATORS {
            return Err(ActuatorFault::TooManyActuators { count });
        }

        let mut actuators = Vec::new();
        for _ in 0..count {
            let _ = actuators.push(Actuator {
                state: ActuatorState::Off,
                polarity,
            });
        }

        Ok(Self {
            drive,
            actuators,
            configured: false,
        })
    }

    /// Number of actuators in the bank
    pub fn count(&self) -> usize {
        self.actuators.len()
    }

    /// Logical state of actuator `index`, if it exists
    pub fn state(&self, index: usize) -> Option<ActuatorState> {
        self.actuators.get(index).map(|a| a.state)
    }

    /// Configure every output to a defined initial state (on)
    ///
    /// Runs once at startup. Any rejection is fatal: the console must not
    /// enter its event loop with half-configured hardware, and the step is
    /// not retried.
    pub fn configure_all(&mut self) -> Result<(), ActuatorFault> {
        for (index, actuator) in self.actuators.iter_mut().enumerate() {
            if !self.drive.is_ready(index) {
                return Err(ActuatorFault::NotReady { index });
            }
            self.drive
                .configure(index, actuator.polarity, ActuatorState::On)?;
            actuator.state = ActuatorState::On;
        }
        self.configured = true;
        Ok(())
    }

    /// Flip the logical state of actuator `index` and apply it
    ///
    /// On a failed apply the logical state is rolled back so it keeps
    /// mirroring the physical output.
    pub fn toggle(&mut self, index: usize) -> Result<ActuatorState, ActuatorFault> {
        if !self.configured {
            return Err(ActuatorFault::NotConfigured);
        }

        let count = self.actuators.len();
        let actuator = self
            .actuators
            .get_mut(index)
            .ok_or(ActuatorFault::OutOfRange { index, count })?;

        let next = actuator.state.toggled();
        self.drive.apply(index, next)?;
        actuator.state = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeDrive {
        count: usize,
        unready: Option<usize>,
        fail_configure: Option<usize>,
        fail_apply: Option<usize>,
        configured: [Option<(Polarity, ActuatorState)>; MAX_ACTUATORS],
        applied: [Option<ActuatorState>; MAX_ACTUATORS],
    }

    impl FakeDrive {
        fn new(count: usize) -> Self {
            Self {
                count,
                unready: None,
                fail_configure: None,
                fail_apply: None,
                configured: [None; MAX_ACTUATORS],
                applied: [None; MAX_ACTUATORS],
            }
        }
    }

    impl ActuatorDrive for FakeDrive {
        fn count(&self) -> usize {
            self.count
        }

        fn is_ready(&self, index: usize) -> bool {
            self.unready != Some(index)
        }

        fn configure(
            &mut self,
            index: usize,
            polarity: Polarity,
            initial: ActuatorState,
        ) -> Result<(), ActuatorFault> {
            if self.fail_configure == Some(index) {
                return Err(ActuatorFault::ConfigRejected { index });
            }
            self.configured[index] = Some((polarity, initial));
            Ok(())
        }

        fn apply(&mut self, index: usize, state: ActuatorState) -> Result<(), ActuatorFault> {
            if self.fail_apply == Some(index) {
                return Err(ActuatorFault::ApplyFailed { index });
            }
            self.applied[index] = Some(state);
            Ok(())
        }
    }

    #[test]
    fn configure_all_drives_everything_on() {
        let mut bank = ActuatorBank::new(FakeDrive::new(3), Polarity::ActiveLow).unwrap();
        bank.configure_all().unwrap();

        for index in 0..3 {
            assert_eq!(bank.state(index), Some(ActuatorState::On));
            assert_eq!(
                bank.drive.configured[index],
                Some((Polarity::ActiveLow, ActuatorState::On))
            );
        }
    }

    #[test]
    fn configure_all_fails_on_unready_output() {
        let mut drive = FakeDrive::new(3);
        drive.unready = Some(1);
        let mut bank = ActuatorBank::new(drive, Polarity::ActiveHigh).unwrap();

        assert_eq!(
            bank.configure_all(),
            Err(ActuatorFault::NotReady { index: 1 })
        );
    }

    #[test]
    fn configure_all_fails_on_rejected_configuration() {
        let mut drive = FakeDrive::new(4);
        drive.fail_configure = Some(2);
        let mut bank = ActuatorBank::new(drive, Polarity::ActiveHigh).unwrap();

        assert_eq!(
            bank.configure_all(),
            Err(ActuatorFault::ConfigRejected { index: 2 })
        );
        // later outputs were never touched
        assert_eq!(bank.drive.configured[3], None);
    }

    #[test]
    fn toggle_flips_and_applies() {
        let mut bank = ActuatorBank::new(FakeDrive::new(2), Polarity::ActiveHigh).unwrap();
        bank.configure_all().unwrap();

        assert_eq!(bank.toggle(0), Ok(ActuatorState::Off));
        assert_eq!(bank.state(0), Some(ActuatorState::Off));
        assert_eq!(bank.drive.applied[0], Some(ActuatorState::Off));
        // the other actuator is untouched
        assert_eq!(bank.state(1), Some(ActuatorState::On));
        assert_eq!(bank.drive.applied[1], None);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut bank = ActuatorBank::new(FakeDrive::new(2), Polarity::ActiveHigh).unwrap();
        bank.configure_all().unwrap();

        bank.toggle(1).unwrap();
        bank.toggle(1).unwrap();
        assert_eq!(bank.state(1), Some(ActuatorState::On));
    }

    #[test]
    fn toggle_out_of_range() {
        let mut bank = ActuatorBank::new(FakeDrive::new(2), Polarity::ActiveHigh).unwrap();
        bank.configure_all().unwrap();

        assert_eq!(
            bank.toggle(2),
            Err(ActuatorFault::OutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn toggle_before_configuration_is_rejected() {
        let mut bank = ActuatorBank::new(FakeDrive::new(2), Polarity::ActiveHigh).unwrap();
        assert_eq!(bank.toggle(0), Err(ActuatorFault::NotConfigured));
    }

    #[test]
    fn failed_apply_rolls_back_logical_state() {
        let mut drive = FakeDrive::new(2);
        drive.fail_apply = Some(0);
        let mut bank = ActuatorBank::new(drive, Polarity::ActiveHigh).unwrap();
        bank.configure_all().unwrap();

        assert_eq!(bank.toggle(0), Err(ActuatorFault::ApplyFailed { index: 0 }));
        assert_eq!(bank.state(0), Some(ActuatorState::On));
    }

    #[test]
    fn bank_rejects_more_outputs_than_digits() {
        let drive = FakeDrive::new(MAX_ACTUATORS + 1);
        assert!(matches!(
            ActuatorBank::new(drive, Polarity::ActiveHigh),
            Err(ActuatorFault::TooManyActuators { count: 10 })
        ));
    }
}
