//! serled-dummy - Scripted line and in-memory LED bank
//!
//! This crate provides a scripted serial line and an in-memory LED drive.
//! They are useful both as test doubles for the console core and as a real
//! backend for trying serled without any hardware:
//!
//! ```bash
//! serled run --line dummy:script=1231 --leds dummy:count=4
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use serled_core::actuator::{ActuatorDrive, ActuatorState, Polarity};
use serled_core::error::{ActuatorFault, TransportFault};
use serled_core::line::{LineEvent, SerialLine};

/// One scripted step of a [`ScriptedLine`]
#[derive(Debug, Clone)]
pub enum Step {
    /// Write `bytes` into the armed window at `offset` and report a data
    /// window (the reported length is `bytes.len()` even when the window
    /// cannot hold it all)
    Data {
        /// Start offset within the window
        offset: usize,
        /// The burst to deliver
        bytes: Vec<u8>,
    },
    /// Report the receive path disabled
    Disabled,
    /// Report completion of an earlier send
    SendComplete,
    /// Report an event the console ignores
    Other,
    /// Report nothing for one poll
    Idle,
}

/// Serial line that replays a fixed event script
///
/// Records every `arm_receive` call and every sent payload so tests can
/// assert on the re-arm discipline. Fault injection knobs cover the arm and
/// send paths; `deliver_while_unarmed` lets a script model a misbehaving
/// driver that hands over a window the console never armed for.
pub struct ScriptedLine {
    script: VecDeque<Step>,
    armed: bool,
    arm_calls: Vec<(usize, Duration)>,
    sent: Vec<Vec<u8>>,
    fail_arm_after: Option<usize>,
    fail_send: bool,
    deliver_while_unarmed: bool,
}

impl ScriptedLine {
    /// Create a line that will replay `script` in order
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            armed: false,
            arm_calls: Vec::new(),
            sent: Vec::new(),
            fail_arm_after: None,
            fail_send: false,
            deliver_while_unarmed: false,
        }
    }

    /// Append a step to the script
    pub fn push(&mut self, step: Step) {
        self.script.push_back(step);
    }

    /// Every `arm_receive` call seen so far, as `(capacity, idle_timeout)`
    pub fn arm_calls(&self) -> &[(usize, Duration)] {
        &self.arm_calls
    }

    /// Every payload passed to `send`
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Whether the line currently considers itself armed
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Make every `arm_receive` call after the first `ok_calls` fail
    pub fn set_fail_arm_after(&mut self, ok_calls: usize) {
        self.fail_arm_after = Some(ok_calls);
    }

    /// Make `send` fail
    pub fn set_fail_send(&mut self, fail: bool) {
        self.fail_send = fail;
    }

    /// Deliver `Step::Data` windows even while unarmed
    pub fn set_deliver_while_unarmed(&mut self, deliver: bool) {
        self.deliver_while_unarmed = deliver;
    }
}

impl SerialLine for ScriptedLine {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportFault> {
        if self.fail_send {
            return Err(TransportFault::SendFailed);
        }
        self.sent.push(data.to_vec());
        // completion surfaces as a later event, like a real driver
        self.script.push_back(Step::SendComplete);
        Ok(())
    }

    fn arm_receive(
        &mut self,
        capacity: usize,
        idle_timeout: Duration,
    ) -> Result<(), TransportFault> {
        self.arm_calls.push((capacity, idle_timeout));
        if let Some(ok_calls) = self.fail_arm_after {
            if self.arm_calls.len() > ok_calls {
                return Err(TransportFault::ArmFailed);
            }
        }
        self.armed = true;
        Ok(())
    }

    fn poll_event(
        &mut self,
        window: &mut [u8],
        wait: Duration,
    ) -> Result<Option<LineEvent>, TransportFault> {
        match self.script.pop_front() {
            None => {
                // script exhausted: behave like a silent wire
                std::thread::sleep(wait);
                Ok(None)
            }
            Some(Step::Idle) => Ok(None),
            Some(Step::Data { offset, bytes }) => {
                if !self.armed && !self.deliver_while_unarmed {
                    log::debug!("dummy: dropped {} bytes while unarmed", bytes.len());
                    return Ok(None);
                }
                for (i, byte) in bytes.iter().enumerate() {
                    if let Some(slot) = window.get_mut(offset + i) {
                        *slot = *byte;
                    }
                }
                Ok(Some(LineEvent::DataReady {
                    offset,
                    len: bytes.len(),
                }))
            }
            Some(Step::Disabled) => {
                self.armed = false;
                Ok(Some(LineEvent::Disabled))
            }
            Some(Step::SendComplete) => Ok(Some(LineEvent::SendComplete)),
            Some(Step::Other) => Ok(Some(LineEvent::Other)),
        }
    }
}

/// Build a [`ScriptedLine`] from a `script=` option string
///
/// Each character becomes one single-byte data window followed by a
/// disable, which is how a human typing into a real console looks to the
/// core.
pub fn line_from_options(options: &[(&str, &str)]) -> Result<ScriptedLine, String> {
    let mut line = ScriptedLine::new([]);
    for (key, value) in options {
        match *key {
            "script" => {
                for byte in value.bytes() {
                    line.push(Step::Data {
                        offset: 0,
                        bytes: vec![byte],
                    });
                    line.push(Step::Disabled);
                }
            }
            _ => {
                log::warn!("dummy line: unknown option: {}={}", key, value);
            }
        }
    }
    Ok(line)
}

/// State of one emulated LED
#[derive(Debug, Clone, Copy)]
pub struct DummyLed {
    /// Whether the output reports ready
    pub ready: bool,
    /// Whether `configure` has run for this output
    pub configured: bool,
    /// Polarity resolved at configure time
    pub polarity: Polarity,
    /// Physical line level currently driven
    pub level_high: bool,
    /// Number of `apply` calls seen
    pub applies: usize,
}

impl Default for DummyLed {
    fn default() -> Self {
        Self {
            ready: true,
            configured: false,
            polarity: Polarity::ActiveHigh,
            level_high: false,
            applies: 0,
        }
    }
}

/// In-memory LED drive
///
/// Tracks the physical line level per output so tests can observe polarity
/// resolution, and offers fault injection for the configure and apply
/// paths.
#[derive(Debug, Default)]
pub struct DummyBank {
    leds: Vec<DummyLed>,
    fail_configure: Option<usize>,
    fail_apply: Option<usize>,
}

impl DummyBank {
    /// Create a bank of `count` ready, unconfigured LEDs
    pub fn new(count: usize) -> Self {
        Self {
            leds: vec![DummyLed::default(); count],
            fail_configure: None,
            fail_apply: None,
        }
    }

    /// One LED's bookkeeping
    pub fn led(&self, index: usize) -> Option<&DummyLed> {
        self.leds.get(index)
    }

    /// Logical on/off derived from the physical level and polarity
    pub fn is_on(&self, index: usize) -> bool {
        self.leds.get(index).is_some_and(|led| match led.polarity {
            Polarity::ActiveHigh => led.level_high,
            Polarity::ActiveLow => !led.level_high,
        })
    }

    /// Total `apply` calls across all LEDs
    pub fn applies(&self) -> usize {
        self.leds.iter().map(|led| led.applies).sum()
    }

    /// Mark one output not-ready
    pub fn set_ready(&mut self, index: usize, ready: bool) {
        if let Some(led) = self.leds.get_mut(index) {
            led.ready = ready;
        }
    }

    /// Make `configure` fail for one output
    pub fn set_fail_configure(&mut self, index: Option<usize>) {
        self.fail_configure = index;
    }

    /// Make `apply` fail for one output
    pub fn set_fail_apply(&mut self, index: Option<usize>) {
        self.fail_apply = index;
    }

    fn level_for(polarity: Polarity, state: ActuatorState) -> bool {
        match polarity {
            Polarity::ActiveHigh => state.is_on(),
            Polarity::ActiveLow => !state.is_on(),
        }
    }
}

impl ActuatorDrive for DummyBank {
    fn count(&self) -> usize {
        self.leds.len()
    }

    fn is_ready(&self, index: usize) -> bool {
        self.leds.get(index).is_some_and(|led| led.ready)
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
        let count = self.leds.len();
        let led = self
            .leds
            .get_mut(index)
            .ok_or(ActuatorFault::OutOfRange { index, count })?;
        led.configured = true;
        led.polarity = polarity;
        led.level_high = Self::level_for(polarity, initial);
        Ok(())
    }

    fn apply(&mut self, index: usize, state: ActuatorState) -> Result<(), ActuatorFault> {
        if self.fail_apply == Some(index) {
            return Err(ActuatorFault::ApplyFailed { index });
        }
        let count = self.leds.len();
        let led = self
            .leds
            .get_mut(index)
            .ok_or(ActuatorFault::OutOfRange { index, count })?;
        if !led.configured {
            return Err(ActuatorFault::ApplyFailed { index });
        }
        led.level_high = Self::level_for(led.polarity, state);
        led.applies += 1;
        Ok(())
    }
}

/// Build a [`DummyBank`] from a `count=` option string
pub fn bank_from_options(options: &[(&str, &str)]) -> Result<DummyBank, String> {
    let mut count = 4;
    for (key, value) in options {
        match *key {
            "count" => {
                count = value
                    .parse()
                    .map_err(|_| format!("Invalid count value: {}", value))?;
            }
            _ => {
                log::warn!("dummy leds: unknown option: {}={}", key, value);
            }
        }
    }
    Ok(DummyBank::new(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serled_core::actuator::ActuatorBank;
    use serled_core::console::dispatch::{dispatch, Dispatch};
    use serled_core::console::rx::RX_CAPACITY;
    use serled_core::console::{Console, RECEIVE_IDLE_TIMEOUT};

    const TICK: Duration = Duration::from_millis(1);

    fn configured_bank(drive: &mut DummyBank) -> ActuatorBank<&mut DummyBank> {
        let mut bank = ActuatorBank::new(drive, Polarity::ActiveHigh).unwrap();
        bank.configure_all().unwrap();
        bank
    }

    #[test]
    fn each_digit_toggles_its_own_led() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        for (i, byte) in (b'1'..=b'4').enumerate() {
            assert_eq!(dispatch(&mut bank, &[byte], 1), Dispatch::Toggled(i));
            assert_eq!(bank.state(i), Some(ActuatorState::Off));
            // nothing else moved
            for other in 0..4 {
                if other > i {
                    assert_eq!(bank.state(other), Some(ActuatorState::On));
                }
            }
        }
    }

    #[test]
    fn unrecognized_single_bytes_toggle_nothing() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        for byte in [b'0', b'5', b'9', b'a', b'\r', b'\n', 0x00, 0xFF] {
            assert_eq!(dispatch(&mut bank, &[byte], 1), Dispatch::Ignored);
        }
        drop(bank);
        // only the initial configuration drove the outputs
        assert_eq!(drive.applies(), 0);
        for i in 0..4 {
            assert!(drive.is_on(i));
        }
    }

    #[test]
    fn oversized_window_reports_exact_bytes_and_toggles_nothing() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        let outcome = dispatch(&mut bank, b"12", 2);
        match outcome {
            Dispatch::Oversized(copy) => assert_eq!(copy.as_slice(), b"12"),
            other => panic!("expected oversized outcome, got {:?}", other),
        }
        drop(bank);
        assert_eq!(drive.applies(), 0);
    }

    #[test]
    fn empty_window_toggles_nothing() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        match dispatch(&mut bank, &[], 0) {
            Dispatch::Oversized(copy) => assert!(copy.is_empty()),
            other => panic!("expected oversized outcome, got {:?}", other),
        }
    }

    #[test]
    fn oversized_beyond_capacity_is_bounded() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        let window = [b'x'; RX_CAPACITY];
        match dispatch(&mut bank, &window, RX_CAPACITY + 5) {
            Dispatch::Oversized(copy) => assert_eq!(copy.as_slice(), &window),
            other => panic!("expected oversized outcome, got {:?}", other),
        }
    }

    #[test]
    fn diagnostic_copy_respects_reported_length() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        // stale bytes beyond the reported length must never be exposed
        match dispatch(&mut bank, b"12XYZ", 2) {
            Dispatch::Oversized(copy) => assert_eq!(copy.as_slice(), b"12"),
            other => panic!("expected oversized outcome, got {:?}", other),
        }
    }

    #[test]
    fn repeated_command_restores_state() {
        let mut drive = DummyBank::new(4);
        let mut bank = configured_bank(&mut drive);

        assert_eq!(dispatch(&mut bank, b"3", 1), Dispatch::Toggled(2));
        assert_eq!(dispatch(&mut bank, b"3", 1), Dispatch::Toggled(2));
        assert_eq!(bank.state(2), Some(ActuatorState::On));
        drop(bank);
        assert_eq!(drive.led(2).unwrap().applies, 2);
    }

    #[test]
    fn toggle_fault_is_reported_and_survivable() {
        let mut drive = DummyBank::new(4);
        drive.set_fail_apply(Some(1));
        let mut bank = configured_bank(&mut drive);

        assert_eq!(dispatch(&mut bank, b"2", 1), Dispatch::Faulted(1));
        assert_eq!(bank.state(1), Some(ActuatorState::On));
        // the pipeline keeps working
        assert_eq!(dispatch(&mut bank, b"1", 1), Dispatch::Toggled(0));
    }

    #[test]
    fn console_toggles_led_on_data_window() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([Step::Data {
            offset: 0,
            bytes: b"2".to_vec(),
        }]);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            console.start(b"hello").unwrap();

            assert!(console.poll_once(TICK).unwrap());
            assert_eq!(console.bank().state(1), Some(ActuatorState::Off));
            assert_eq!(console.bank().state(0), Some(ActuatorState::On));
        }
        assert!(!drive.is_on(1));
        assert!(drive.is_on(0));
    }

    #[test]
    fn console_rearms_after_disable_and_keeps_dispatching() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([
            Step::Disabled,
            Step::Data {
                offset: 0,
                bytes: b"3".to_vec(),
            },
        ]);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            console.start(b"hello").unwrap();

            assert!(console.poll_once(TICK).unwrap()); // Disabled
            assert!(console.is_armed());
            assert!(console.poll_once(TICK).unwrap()); // DataReady '3'
            assert_eq!(console.bank().state(2), Some(ActuatorState::Off));
        }
        // armed once at startup, exactly once more after the disable,
        // always with the same window size and timeout
        assert_eq!(
            line.arm_calls(),
            &[(RX_CAPACITY, RECEIVE_IDLE_TIMEOUT); 2]
        );
    }

    #[test]
    fn startup_aborts_when_configuration_fails() {
        let mut drive = DummyBank::new(4);
        drive.set_fail_configure(Some(2));
        let mut line = ScriptedLine::new([]);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            assert!(console.start(b"hello").is_err());
        }
        // never armed, never sent, never toggled
        assert!(line.arm_calls().is_empty());
        assert!(line.sent().is_empty());
        assert_eq!(drive.applies(), 0);
    }

    #[test]
    fn startup_aborts_when_arming_fails() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([]);
        line.set_fail_arm_after(0);

        let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
        let mut console = Console::new(&mut line, bank);
        assert!(console.start(b"hello").is_err());
        assert!(!console.is_armed());
    }

    #[test]
    fn startup_aborts_when_banner_send_fails() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([]);
        line.set_fail_send(true);

        let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
        let mut console = Console::new(&mut line, bank);
        assert!(console.start(b"hello").is_err());
    }

    #[test]
    fn window_after_failed_rearm_is_lost_not_dispatched() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([
            Step::Disabled,
            Step::Data {
                offset: 0,
                bytes: b"1".to_vec(),
            },
        ]);
        line.set_fail_arm_after(1);
        line.set_deliver_while_unarmed(true);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            console.start(b"hello").unwrap();

            assert!(console.poll_once(TICK).unwrap()); // Disabled; re-arm fails
            assert!(!console.is_armed());
            assert!(console.poll_once(TICK).unwrap()); // window arrives anyway
            assert_eq!(console.bank().state(0), Some(ActuatorState::On));
        }
        assert_eq!(line.arm_calls().len(), 2);
        assert_eq!(drive.applies(), 0);
    }

    #[test]
    fn banner_is_sent_and_completion_is_consumed() {
        let mut drive = DummyBank::new(2);
        let mut line = ScriptedLine::new([]);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            console.start(b"Press 1-2\r\n").unwrap();

            // the queued completion event surfaces and is absorbed
            assert!(console.poll_once(TICK).unwrap());
            assert_eq!(console.bank().state(0), Some(ActuatorState::On));
        }
        assert_eq!(line.sent(), &[b"Press 1-2\r\n".to_vec()]);
    }

    #[test]
    fn polarity_is_resolved_at_configuration() {
        let mut drive = DummyBank::new(2);
        {
            let mut bank = ActuatorBank::new(&mut drive, Polarity::ActiveLow).unwrap();
            bank.configure_all().unwrap();
            assert_eq!(dispatch(&mut bank, b"1", 1), Dispatch::Toggled(0));
        }
        // LED 0 is logically off after the toggle: active-low drives high
        assert!(drive.led(0).unwrap().level_high);
        assert!(!drive.is_on(0));
        // LED 1 is still on from configuration: active-low drives low
        assert!(!drive.led(1).unwrap().level_high);
        assert!(drive.is_on(1));
    }

    #[test]
    fn burst_at_nonzero_offset_dispatches_from_offset() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([
            Step::Data {
                offset: 0,
                bytes: b"4".to_vec(),
            },
            Step::Data {
                offset: 1,
                bytes: b"1".to_vec(),
            },
        ]);
        {
            let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
            let mut console = Console::new(&mut line, bank);
            console.start(b"hello").unwrap();

            assert!(console.poll_once(TICK).unwrap());
            assert!(console.poll_once(TICK).unwrap());
            assert_eq!(console.bank().state(3), Some(ActuatorState::Off));
            assert_eq!(console.bank().state(0), Some(ActuatorState::Off));
        }
    }

    #[test]
    fn scripted_line_drops_data_while_unarmed() {
        let mut drive = DummyBank::new(4);
        let mut line = ScriptedLine::new([Step::Data {
            offset: 0,
            bytes: b"1".to_vec(),
        }]);
        let bank = ActuatorBank::new(&mut drive, Polarity::ActiveHigh).unwrap();
        let mut console = Console::new(&mut line, bank);
        // never started, so never armed: the step is consumed silently
        assert!(!console.poll_once(TICK).unwrap());
    }

    #[test]
    fn options_build_script_and_bank() {
        let line = line_from_options(&[("script", "12")]).unwrap();
        assert_eq!(line.script.len(), 4); // data + disable per character

        let bank = bank_from_options(&[("count", "3")]).unwrap();
        assert_eq!(bank.count(), 3);

        assert!(bank_from_options(&[("count", "many")]).is_err());
    }
}
