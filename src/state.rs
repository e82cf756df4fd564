// src/state.rs

//! Explicit lifecycle state for a serial port.
//!
//! The initialization sequence is a straight line of register writes, but
//! the lifecycle it implies is made explicit here so transitions can be
//! checked in isolation from any hardware.

/// Lifecycle state of a [`SerialPort`](crate::SerialPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    /// No register has been touched yet.
    Uninitialized,
    /// Registers are programmed and the loopback self-test is in flight.
    SelfTesting,
    /// The self-test passed; the port is in normal operation.
    Ready,
    /// The self-test failed; the port is untrusted and left in loopback.
    Faulted,
}

/// Events produced by the initialization sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitEvent {
    /// Register programming started.
    Started,
    /// Loopback readback matched the sentinel.
    SelfTestPassed,
    /// Loopback readback did not match the sentinel.
    SelfTestFailed,
}

impl PortState {
    /// Pure transition function for the init lifecycle.
    ///
    /// Events that do not apply to the current state leave it unchanged;
    /// the sequencer only ever emits them in order.
    #[must_use]
    pub const fn step(self, event: InitEvent) -> PortState {
        match (self, event) {
            (PortState::Uninitialized, InitEvent::Started) => PortState::SelfTesting,
            (PortState::SelfTesting, InitEvent::SelfTestPassed) => PortState::Ready,
            (PortState::SelfTesting, InitEvent::SelfTestFailed) => PortState::Faulted,
            (state, _) => state,
        }
    }

    /// Whether the port has passed its self-test.
    #[inline]
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, PortState::Ready)
    }
}
