// src/lib.rs

//! Polled 16550 UART driver for early boot and kernel debugging output.
//!
//! Provides UART communication on a 16550-compatible serial port with:
//! - 38400 baud rate (divisor 3 from the 115200 reference clock)
//! - 8 data bits, no parity, 1 stop bit (8N1)
//! - FIFO buffers enabled with maximum trigger level
//! - Loopback self-test during initialization
//! - Blocking transmit and non-blocking receive, both purely by polling
//!
//! The driver is fully synchronous: no interrupts, no timeouts, no
//! cancellation. `send_byte` busy-waits on the hardware status flag and a
//! non-responsive transmitter hangs the caller permanently. A port is an
//! exclusively-owned resource; on x86_64 this crate wraps COM1 in a
//! [`spin::Mutex`] behind `SERIAL1` and the [`serial_print!`] /
//! [`serial_println!`] macros, which stay silent until `init` succeeds.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod backend;
mod error;
mod port;
pub mod registers;
mod state;

pub use backend::{Register, SerialHardware};
pub use error::InitError;
pub use port::SerialPort;
pub use state::{InitEvent, PortState};

#[cfg(target_arch = "x86_64")]
pub use backend::PortIoBackend;

#[cfg(target_arch = "x86_64")]
mod com1 {
    use core::sync::atomic::{AtomicBool, Ordering};

    use lazy_static::lazy_static;
    use spin::Mutex;

    use crate::backend::PortIoBackend;
    use crate::error::InitError;
    use crate::port::SerialPort;

    /// Set once the COM1 self-test has passed; gates the print macros.
    static SERIAL_PORT_AVAILABLE: AtomicBool = AtomicBool::new(false);

    lazy_static! {
        /// Global COM1 port protected by a spin mutex.
        ///
        /// The driver itself does no locking; this mutex is the one
        /// sanctioned way to share the port between execution contexts.
        pub static ref SERIAL1: Mutex<SerialPort<PortIoBackend>> =
            Mutex::new(SerialPort::new(PortIoBackend::new()));
    }

    /// Initialize the global COM1 port.
    ///
    /// Safe to call more than once: after a successful run subsequent
    /// calls return `Ok(())` without touching hardware, and after a failed
    /// self-test they return the failure again without retrying (the
    /// hardware sequence is one-shot by design).
    ///
    /// # Errors
    ///
    /// [`InitError::SelfTestFailed`] when COM1 is absent or dead.
    pub fn init() -> Result<(), InitError> {
        SERIAL1.lock().init()?;
        SERIAL_PORT_AVAILABLE.store(true, Ordering::Release);
        Ok(())
    }

    /// Check if the COM1 hardware passed its self-test.
    ///
    /// Use this before attempting serial writes to avoid hangs on
    /// systems without COM1 hardware.
    #[inline]
    #[must_use = "serial availability should be checked to avoid I/O hangs"]
    pub fn is_available() -> bool {
        SERIAL_PORT_AVAILABLE.load(Ordering::Acquire)
    }

    #[doc(hidden)]
    pub fn print_impl(args: core::fmt::Arguments) {
        use core::fmt::Write;
        // Writing to an uninitialized or absent UART would busy-hang, so
        // the macros are no-ops until init() has succeeded.
        if !is_available() {
            return;
        }
        let _ = SERIAL1.lock().write_fmt(args);
    }
}

#[cfg(target_arch = "x86_64")]
pub use com1::{SERIAL1, init, is_available, print_impl};

/// Prints to the host through the serial interface.
#[cfg(target_arch = "x86_64")]
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::print_impl(format_args!($($arg)*));
    };
}

/// Prints to the host through the serial interface, appending a newline.
#[cfg(target_arch = "x86_64")]
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(concat!($fmt, "\n"), $($arg)*));
}
