//! In-memory loopback port
//!
//! Every written byte becomes readable, as if TX were jumpered to RX.
//! Useful for exercising encoders and readers on the host.

use heapless::Deque;

use crate::serial::{SerialError, SerialPort};

/// Loopback port with an `N`-byte echo buffer
#[derive(Debug, Default)]
pub struct Loopback<const N: usize> {
    buffer: Deque<u8, N>,
    baud_rate: Option<u32>,
    overflowed: bool,
}

impl<const N: usize> Loopback<N> {
    /// Create a closed loopback port
    pub const fn new() -> Self {
        Self {
            buffer: Deque::new(),
            baud_rate: None,
            overflowed: false,
        }
    }

    /// Number of bytes waiting to be read
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl<const N: usize> SerialPort for Loopback<N> {
    type Error = SerialError<()>;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        if baud_rate == 0 {
            return Err(SerialError::InvalidBaudRate);
        }
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn close(&mut self) {
        self.baud_rate = None;
        self.buffer.clear();
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.baud_rate.is_none() {
            return Err(SerialError::NotOpen);
        }
        self.buffer.push_back(byte).map_err(|_| {
            self.overflowed = true;
            SerialError::BufferFull
        })
    }

    fn available(&mut self) -> bool {
        !self.buffer.is_empty()
    }

    fn read(&mut self) -> Option<u8> {
        self.buffer.pop_front()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn overflow(&mut self) -> bool {
        let overflowed = self.overflowed;
        self.overflowed = false;
        overflowed
    }

    fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }
}
