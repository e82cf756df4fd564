// src/registers.rs

//! Register-level constants for the 16550 UART programming model.
//!
//! The bit patterns in this module are the compatibility surface of the
//! driver: they must match the 16550 specification bit-for-bit, so every
//! value the initialization sequence writes is named here rather than
//! spelled inline at the call site.

use bitflags::bitflags;

/// Register offsets from base port
///
/// Offsets 0 and 1 are dual-purpose: with DLAB (LCR bit 7) set they are the
/// divisor latch low/high bytes, otherwise the data and interrupt-enable
/// registers. DLAB must only ever be set for the divisor-programming step.
pub mod register_offset {
    #![allow(missing_docs)]

    pub const DATA: u16 = 0;
    pub const INTERRUPT_ENABLE: u16 = 1;
    pub const FIFO_CONTROL: u16 = 2;
    pub const LINE_CONTROL: u16 = 3;
    pub const MODEM_CONTROL: u16 = 4;
    pub const LINE_STATUS: u16 = 5;
    pub const MODEM_STATUS: u16 = 6;
    pub const SCRATCH: u16 = 7;
}

/// Standard COM1 base I/O port address.
pub const COM1: u16 = 0x3F8;

/// Divisor programmed into the divisor latch: 115200 / 3 = 38400 baud.
///
/// Only the low byte is written during initialization; the high byte is
/// left implicitly zero.
pub const BAUD_RATE_DIVISOR: u8 = 3;

/// Byte written to the data register during the loopback self-test.
pub const SELF_TEST_SENTINEL: u8 = 0xAE;

bitflags! {
    /// Line Control Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineControl: u8 {
        /// Word length bit 0.
        const WORD_LEN_0 = 1 << 0;
        /// Word length bit 1.
        const WORD_LEN_1 = 1 << 1;
        /// Extra stop bit.
        const EXTRA_STOP_BIT = 1 << 2;
        /// Parity enable.
        const PARITY_ENABLE = 1 << 3;
        /// Break control.
        const BREAK = 1 << 6;
        /// Divisor Latch Access Bit.
        const DLAB = 1 << 7;

        /// 8 data bits, 1 stop bit, no parity, no break.
        const EIGHT_N_ONE = Self::WORD_LEN_0.bits() | Self::WORD_LEN_1.bits();
    }
}

bitflags! {
    /// FIFO Control Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FifoControl: u8 {
        /// Enable FIFO buffers.
        const ENABLE = 1 << 0;
        /// Clear the receive FIFO.
        const CLEAR_RX = 1 << 1;
        /// Clear the transmit FIFO.
        const CLEAR_TX = 1 << 2;
        /// Buffer size select: clear = 16-byte buffer, set = 64-byte.
        const LARGE_BUFFER = 1 << 5;
        /// Maximum (14-byte) receive trigger level.
        const TRIGGER_MAX = 0b11 << 6;

        /// Initialization value: FIFO on, both FIFOs cleared, 16-byte
        /// buffer, maximum trigger level.
        const INIT_CONFIG =
            Self::ENABLE.bits() | Self::CLEAR_RX.bits() | Self::CLEAR_TX.bits() | Self::TRIGGER_MAX.bits();
    }
}

bitflags! {
    /// Modem Control Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModemControl: u8 {
        /// Data Terminal Ready.
        const DTR = 1 << 0;
        /// Request To Send.
        const RTS = 1 << 1;
        /// Auxiliary output 1.
        const OUT1 = 1 << 2;
        /// Auxiliary output 2 (routes UART interrupts on PC hardware).
        const OUT2 = 1 << 3;
        /// Loopback mode, transmitter wired to receiver for self-test.
        const LOOPBACK = 1 << 4;
        /// Autoflow control.
        const AUTOFLOW = 1 << 5;

        /// Pre-self-test value (0x0B): DTR, RTS, OUT2.
        const INIT_CONFIG = Self::DTR.bits() | Self::RTS.bits() | Self::OUT2.bits();
        /// Self-test value (0x1E): RTS, OUT1, OUT2, loopback.
        const LOOPBACK_TEST =
            Self::RTS.bits() | Self::OUT1.bits() | Self::OUT2.bits() | Self::LOOPBACK.bits();
        /// Normal operating value (0x0F): DTR, RTS, OUT1, OUT2.
        const OPERATIONAL =
            Self::DTR.bits() | Self::RTS.bits() | Self::OUT1.bits() | Self::OUT2.bits();
    }
}

bitflags! {
    /// Line Status Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// Received data is waiting in the data register.
        const DATA_READY = 1 << 0;
        /// Overrun error.
        const OVERRUN_ERROR = 1 << 1;
        /// Parity error.
        const PARITY_ERROR = 1 << 2;
        /// Framing error.
        const FRAMING_ERROR = 1 << 3;
        /// Transmit holding register is empty.
        const TRANSMIT_EMPTY = 1 << 5;
    }
}
