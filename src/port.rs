// src/port.rs

//! Serial port hardware access and operations
//!
//! [`SerialPort`] drives a 16550-compatible UART purely by polling: the
//! initialization sequence programs the baud divisor, line format, FIFO
//! and modem control registers, then verifies the chip with a loopback
//! self-test before trusting it for real traffic. Transmit blocks on the
//! line status register; receive is a non-blocking poll.

use crate::backend::{Register, SerialHardware};
use crate::error::InitError;
use crate::registers::{
    BAUD_RATE_DIVISOR, FifoControl, LineControl, LineStatus, ModemControl, SELF_TEST_SENTINEL,
};
use crate::state::{InitEvent, PortState};

/// A polled 16550 UART driven through a [`SerialHardware`] backend.
///
/// The driver caches no register values; the only software state is the
/// lifecycle [`PortState`]. The port is an exclusively-owned hardware
/// resource; the driver does no locking, so concurrent callers must be
/// serialized externally (one owner, or a mutex around the port).
pub struct SerialPort<H: SerialHardware> {
    hw: H,
    state: PortState,
}

impl<H: SerialHardware> SerialPort<H> {
    /// Create a driver over the given backend. Does not touch hardware.
    pub const fn new(hw: H) -> Self {
        Self {
            hw,
            state: PortState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub const fn state(&self) -> PortState {
        self.state
    }

    /// Program the UART and run the loopback self-test.
    ///
    /// One-shot, no retry: the register sequence is executed exactly once
    /// and the self-test decides between [`PortState::Ready`] and
    /// [`PortState::Faulted`]. On failure the port is left in loopback
    /// mode and no further register is touched. Once the port has reached
    /// a terminal state, later calls report the recorded outcome without
    /// touching hardware, so the state always reflects the chip.
    ///
    /// # Errors
    ///
    /// [`InitError::SelfTestFailed`] when the loopback readback does not
    /// match the sentinel byte, meaning the chip is absent or dead.
    pub fn init(&mut self) -> Result<(), InitError> {
        if self.state.is_ready() {
            return Ok(());
        }
        if self.state == PortState::Faulted {
            return Err(InitError::SelfTestFailed);
        }

        self.state = self.state.step(InitEvent::Started);

        // Disable interrupts; this driver only ever polls.
        self.hw.write(Register::InterruptEnable, 0x00);

        // Divisor latch: DLAB on, low byte = 3 (115200 / 3 = 38400 baud).
        // The high byte stays implicitly zero and is not written.
        self.hw
            .write(Register::LineControl, LineControl::DLAB.bits());
        self.hw.write(Register::Data, BAUD_RATE_DIVISOR);

        // Interrupts off again, kept for compatibility with the
        // conventional 16550 bring-up sequence.
        self.hw.write(Register::InterruptEnable, 0x00);

        // 8N1, which also clears DLAB.
        self.hw
            .write(Register::LineControl, LineControl::EIGHT_N_ONE.bits());

        // FIFO on, both FIFOs cleared, 16-byte buffer, max trigger level.
        self.hw
            .write(Register::FifoControl, FifoControl::INIT_CONFIG.bits());

        // DTR + RTS + OUT2, then switch to loopback for the self-test.
        self.hw
            .write(Register::ModemControl, ModemControl::INIT_CONFIG.bits());
        self.hw
            .write(Register::ModemControl, ModemControl::LOOPBACK_TEST.bits());

        // In loopback mode the transmitter is wired to the receiver, so a
        // working chip must hand the sentinel straight back.
        self.hw.write(Register::Data, SELF_TEST_SENTINEL);
        if self.hw.read(Register::Data) != SELF_TEST_SENTINEL {
            self.state = self.state.step(InitEvent::SelfTestFailed);
            return Err(InitError::SelfTestFailed);
        }

        // Chip verified; leave loopback and enter normal operation.
        self.hw
            .write(Register::ModemControl, ModemControl::OPERATIONAL.bits());
        self.state = self.state.step(InitEvent::SelfTestPassed);
        Ok(())
    }

    /// Whether the transmit holding register is empty (LSR bit 5).
    #[inline]
    pub fn transmit_ready(&mut self) -> bool {
        LineStatus::from_bits_truncate(self.hw.read(Register::LineStatus))
            .contains(LineStatus::TRANSMIT_EMPTY)
    }

    /// Whether a received byte is waiting in the data register (LSR bit 0).
    #[inline]
    pub fn data_available(&mut self) -> bool {
        LineStatus::from_bits_truncate(self.hw.read(Register::LineStatus))
            .contains(LineStatus::DATA_READY)
    }

    /// Send a single byte, busy-waiting until the transmitter is ready.
    ///
    /// The wait is an unbounded tight poll with no yield and no timeout:
    /// a transmitter that never reports ready hangs the caller
    /// permanently. Must not be called before a successful [`init`].
    ///
    /// [`init`]: Self::init
    pub fn send_byte(&mut self, byte: u8) {
        while !self.transmit_ready() {
            core::hint::spin_loop();
        }
        self.hw.write(Register::Data, byte);
    }

    /// Send a single byte without any readiness check.
    ///
    /// Precondition: [`transmit_ready`](Self::transmit_ready) must already
    /// hold. This method never polls and never validates; calling it while
    /// the transmit holding register is full loses data.
    #[inline]
    pub fn send_byte_unchecked(&mut self, byte: u8) {
        self.hw.write(Register::Data, byte);
    }

    /// Send bytes in order until the first `0`.
    ///
    /// The `0` terminator is not transmitted, and neither is anything
    /// after it; a slice containing no `0` is sent in full. No framing is
    /// added beyond the raw byte stream.
    pub fn send_sequence(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == 0 {
                break;
            }
            self.send_byte(byte);
        }
    }

    /// Read a received byte, or `0` when none is available.
    ///
    /// When [`data_available`](Self::data_available) is false the data
    /// register is not touched and `0` is returned. Because `0` is also a
    /// legitimate received byte, the return value alone cannot distinguish
    /// "no data" from a genuine zero, so callers must check
    /// `data_available` first. This ambiguity is part of the interface
    /// contract.
    pub fn receive_byte(&mut self) -> u8 {
        if !self.data_available() {
            return 0;
        }
        self.hw.read(Register::Data)
    }
}

impl<H: SerialHardware> core::fmt::Write for SerialPort<H> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            self.send_byte(byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockChip;

    const LSR_TX_EMPTY: u8 = 0x20;
    const LSR_DATA_READY: u8 = 0x01;

    fn ready_port(chip: MockChip) -> SerialPort<MockChip> {
        let mut chip = chip;
        chip.set_register(Register::LineStatus, LSR_TX_EMPTY);
        SerialPort::new(chip)
    }

    #[test]
    fn test_init_success_on_echoing_chip() {
        let mut port = SerialPort::new(MockChip::with_loopback_echo());

        assert_eq!(port.init(), Ok(()));
        assert_eq!(port.state(), PortState::Ready);
        // Loopback must be off and DTR/RTS/OUT1/OUT2 on after init.
        assert_eq!(port.hw.register(Register::ModemControl), 0x0F);
    }

    #[test]
    fn test_init_failure_on_dead_chip() {
        // Data register reads back 0x00 no matter what was written.
        let mut port = SerialPort::new(MockChip::new());

        assert_eq!(port.init(), Err(InitError::SelfTestFailed));
        assert_eq!(port.state(), PortState::Faulted);
        // Failure leaves the chip exactly as the self-test configured it.
        assert_eq!(port.hw.register(Register::ModemControl), 0x1E);
        assert_eq!(
            port.hw.writes.last(),
            Some(&(Register::Data, SELF_TEST_SENTINEL))
        );
    }

    #[test]
    fn test_init_failure_on_wrong_echo() {
        let mut chip = MockChip::new();
        chip.set_register(Register::Data, 0xEA);
        let mut port = SerialPort::new(chip);

        assert_eq!(port.init(), Err(InitError::SelfTestFailed));
        assert_eq!(port.state(), PortState::Faulted);
    }

    #[test]
    fn test_init_register_write_sequence() {
        let mut port = SerialPort::new(MockChip::with_loopback_echo());
        port.init().unwrap();

        // The exact bring-up order is the hardware compatibility surface.
        assert_eq!(
            port.hw.writes,
            vec![
                (Register::InterruptEnable, 0x00),
                (Register::LineControl, 0x80),
                (Register::Data, 0x03),
                (Register::InterruptEnable, 0x00),
                (Register::LineControl, 0b0000_0011),
                (Register::FifoControl, 0b1100_0111),
                (Register::ModemControl, 0x0B),
                (Register::ModemControl, 0x1E),
                (Register::Data, 0xAE),
                (Register::ModemControl, 0x0F),
            ]
        );
    }

    #[test]
    fn test_reinit_of_ready_port_is_a_no_op() {
        let mut port = SerialPort::new(MockChip::with_loopback_echo());
        port.init().unwrap();
        let writes_after_first = port.hw.writes.len();

        // The chip dies after bring-up; a second init must not re-run the
        // register sequence, so the recorded state keeps matching the
        // hardware (operational, loopback off) instead of diverging.
        port.hw.set_loopback_echo(false);
        assert_eq!(port.init(), Ok(()));
        assert_eq!(port.state(), PortState::Ready);
        assert_eq!(port.hw.writes.len(), writes_after_first);
        assert_eq!(port.hw.register(Register::ModemControl), 0x0F);
    }

    #[test]
    fn test_reinit_of_faulted_port_does_not_retry() {
        let mut port = SerialPort::new(MockChip::new());
        assert_eq!(port.init(), Err(InitError::SelfTestFailed));
        let writes_after_first = port.hw.writes.len();

        assert_eq!(port.init(), Err(InitError::SelfTestFailed));
        assert_eq!(port.state(), PortState::Faulted);
        assert_eq!(port.hw.writes.len(), writes_after_first);
    }

    #[test]
    fn test_send_byte_waits_for_transmitter() {
        let mut chip = MockChip::new();
        // Transmitter busy for the first three status polls.
        chip.set_lsr_after_reads(3, LSR_TX_EMPTY);
        let mut port = SerialPort::new(chip);

        port.send_byte(0x42);

        assert!(port.hw.lsr_reads >= 4);
        assert_eq!(port.hw.data_writes(), vec![0x42]);
    }

    #[test]
    fn test_send_byte_writes_once_when_ready() {
        let mut port = ready_port(MockChip::new());
        port.send_byte(b'X');
        assert_eq!(port.hw.data_writes(), vec![b'X']);
    }

    #[test]
    fn test_send_byte_unchecked_never_polls() {
        // Transmitter reported busy; the unchecked send must not care.
        let mut port = SerialPort::new(MockChip::new());
        port.send_byte_unchecked(0x7F);

        assert_eq!(port.hw.lsr_reads, 0);
        assert_eq!(port.hw.data_writes(), vec![0x7F]);
    }

    #[test]
    fn test_send_sequence_stops_at_terminator() {
        let mut port = ready_port(MockChip::new());
        port.send_sequence(&[b'o', b'k', 0, b'x', b'y']);
        assert_eq!(port.hw.data_writes(), vec![b'o', b'k']);
    }

    #[test]
    fn test_send_sequence_without_terminator_sends_all() {
        let mut port = ready_port(MockChip::new());
        port.send_sequence(b"abc");
        assert_eq!(port.hw.data_writes(), vec![b'a', b'b', b'c']);
    }

    #[test]
    fn test_data_available_tracks_lsr_bit0() {
        let mut port = SerialPort::new(MockChip::new());
        assert!(!port.data_available());

        port.hw.set_register(Register::LineStatus, LSR_DATA_READY);
        assert!(port.data_available());

        // Other status bits must not register as data.
        port.hw.set_register(Register::LineStatus, LSR_TX_EMPTY);
        assert!(!port.data_available());
    }

    #[test]
    fn test_receive_byte_returns_zero_without_data() {
        let mut chip = MockChip::new();
        // Stale byte in the data register must not leak out.
        chip.set_register(Register::Data, 0x5A);
        let mut port = SerialPort::new(chip);

        assert_eq!(port.receive_byte(), 0);
        // The data register was never read, only the status register.
        assert_eq!(port.hw.lsr_reads, 1);
    }

    #[test]
    fn test_receive_byte_reads_data_register() {
        let mut chip = MockChip::new();
        chip.set_register(Register::LineStatus, LSR_DATA_READY);
        chip.set_register(Register::Data, 0x5A);
        let mut port = SerialPort::new(chip);

        assert_eq!(port.receive_byte(), 0x5A);
        // Reads have no register side effects.
        assert!(port.hw.writes.is_empty());
        assert_eq!(port.hw.register(Register::Data), 0x5A);
    }

    #[test]
    fn test_receive_byte_zero_ambiguity_is_preserved() {
        let mut chip = MockChip::new();
        chip.set_register(Register::LineStatus, LSR_DATA_READY);
        chip.set_register(Register::Data, 0x00);
        let mut port = SerialPort::new(chip);

        // A genuine zero byte is indistinguishable from "no data" by the
        // return value alone; data_available is the disambiguator.
        assert!(port.data_available());
        assert_eq!(port.receive_byte(), 0);
    }

    #[test]
    fn test_fmt_write_sends_raw_bytes() {
        use core::fmt::Write;

        let mut port = ready_port(MockChip::with_loopback_echo());
        port.init().unwrap();
        port.hw.writes.clear();
        port.hw.set_register(Register::LineStatus, LSR_TX_EMPTY);

        write!(port, "ok\n").unwrap();
        // No CR injection, no framing: the bytes go out verbatim.
        assert_eq!(port.hw.data_writes(), vec![b'o', b'k', b'\n']);
    }

    #[test]
    fn test_end_to_end_init_then_transmit() {
        let mut port = SerialPort::new(MockChip::with_loopback_echo());
        port.init().unwrap();
        port.hw.writes.clear();
        port.hw.set_register(Register::LineStatus, LSR_TX_EMPTY);

        port.send_sequence(b"boot\0");

        assert_eq!(port.state(), PortState::Ready);
        assert_eq!(port.hw.data_writes(), b"boot".to_vec());
    }
}
