//! Serial line abstraction
//!
//! The console talks to its serial transport through the [`SerialLine`]
//! trait. The transport delivers received bytes in event-driven windows:
//! the console lends it the armed receive window for the duration of one
//! [`SerialLine::poll_event`] call, and gets back at most one [`LineEvent`].
//! Events for one line are delivered one at a time, in wire order; a
//! [`LineEvent::Disabled`] is never delivered ahead of the data windows
//! that preceded it.

use core::time::Duration;

use crate::error::TransportFault;

/// One asynchronous occurrence on the serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// A window of received bytes is ready in the armed buffer
    ///
    /// Bytes at `offset..offset + len` are valid only for the duration of
    /// this event; `len` may exceed the buffer capacity, in which case only
    /// the capacity-bounded prefix was actually stored.
    DataReady {
        /// Start of the window within the armed buffer
        offset: usize,
        /// Reported length of the window
        len: usize,
    },
    /// The receive path shut down (idle timeout or window exhausted)
    ///
    /// The console must immediately re-arm; until it does, incoming data is
    /// lost.
    Disabled,
    /// A previously queued transmission finished
    SendComplete,
    /// Any other line event; ignored by the console
    Other,
}

/// Serial line transport
///
/// Implementations deliver events strictly one at a time per line. None of
/// these operations may suspend: `send` queues and returns, `arm_receive`
/// only flips receive state, and `poll_event` returns as soon as one event
/// is available (or `wait` has elapsed idle).
pub trait SerialLine {
    /// Queue `data` for transmission
    ///
    /// Completion is signaled by a later [`LineEvent::SendComplete`] event,
    /// not by this call's return value.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportFault>;

    /// Arm the receive path
    ///
    /// Must be called once at startup and once after every
    /// [`LineEvent::Disabled`]. `idle_timeout` is the longest in-stream
    /// pause still treated as "no activity yet" before the transport
    /// flushes pending bytes as a data window.
    fn arm_receive(&mut self, capacity: usize, idle_timeout: Duration)
        -> Result<(), TransportFault>;

    /// Wait up to `wait` for the next event
    ///
    /// `window` is the receive buffer the transport may fill while armed;
    /// the borrow lasts only for this call, which is what keeps the
    /// transport and the dispatcher exclusive-by-phase. Returns `Ok(None)`
    /// when `wait` elapses without an event (a liveness tick).
    fn poll_event(
        &mut self,
        window: &mut [u8],
        wait: Duration,
    ) -> Result<Option<LineEvent>, TransportFault>;
}

// Blanket impl so the console can run over `&mut dyn SerialLine` from the
// CLI backend registry as well as over a concrete transport.
impl<T: SerialLine + ?Sized> SerialLine for &mut T {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportFault> {
        (**self).send(data)
    }

    fn arm_receive(
        &mut self,
        capacity: usize,
        idle_timeout: Duration,
    ) -> Result<(), TransportFault> {
        (**self).arm_receive(capacity, idle_timeout)
    }

    fn poll_event(
        &mut self,
        window: &mut [u8],
        wait: Duration,
    ) -> Result<Option<LineEvent>, TransportFault> {
        (**self).poll_event(window, wait)
    }
}
