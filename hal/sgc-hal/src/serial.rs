//! Duplex byte transport
//!
//! The display protocol is strictly call-and-response over a byte stream, so
//! the transport only needs single-byte writes and a non-blocking
//! "is anything there" poll. Waiting and timeouts live in the driver.

/// Byte-oriented serial port
///
/// Implementations must not block in [`available`](SerialPort::available)
/// or [`read`](SerialPort::read); the caller polls with its own retry budget.
pub trait SerialPort {
    /// Error type for port operations
    type Error: core::fmt::Debug;

    /// Open (or reopen) the port at the given baud rate
    ///
    /// Reopening an already open port reconfigures its speed.
    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error>;

    /// Close the port
    fn close(&mut self);

    /// Write one byte
    fn write(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Check whether at least one received byte is waiting
    fn available(&mut self) -> bool;

    /// Take the next received byte, if any
    fn read(&mut self) -> Option<u8>;

    /// Wait until all written bytes have left the port
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Report (and clear) a receive buffer overflow
    ///
    /// Ports without a software receive buffer never overflow.
    fn overflow(&mut self) -> bool {
        false
    }

    /// Current baud rate, or `None` while closed
    fn baud_rate(&self) -> Option<u32>;
}

impl<T: SerialPort + ?Sized> SerialPort for &mut T {
    type Error = T::Error;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        (**self).open(baud_rate)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write(byte)
    }

    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }

    fn overflow(&mut self) -> bool {
        (**self).overflow()
    }

    fn baud_rate(&self) -> Option<u32> {
        (**self).baud_rate()
    }
}

/// Errors shared by the bundled port implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError<E> {
    /// Port used before `open()`
    NotOpen,
    /// Requested baud rate cannot be produced
    InvalidBaudRate,
    /// Receive or transmit buffer full
    BufferFull,
    /// Underlying peripheral or pin error
    Io(E),
}

/// Nominal duration of one bit in nanoseconds at the given baud rate
pub fn bit_time_ns(baud_rate: u32) -> Option<u32> {
    if baud_rate == 0 {
        return None;
    }
    Some(1_000_000_000 / baud_rate)
}
