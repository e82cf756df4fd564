// src/error.rs

//! Error types for serial port operations

/// Serial port initialization result
///
/// The loopback self-test is the only failure the driver can detect:
/// register I/O itself has no error channel, and every operation other
/// than [`init`](crate::SerialPort::init) is infallible at the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The loopback readback did not match the test sentinel; the UART is
    /// absent or not responding.
    SelfTestFailed,
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::SelfTestFailed => {
                write!(f, "Serial port loopback self-test failed")
            }
        }
    }
}
