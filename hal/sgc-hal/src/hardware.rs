//! Hardware UART port
//!
//! Wraps any peripheral implementing the `embedded-io` blocking traits.
//! `embedded-io` has no notion of line speed, so the caller supplies a
//! callback that reprograms the peripheral's baud rate; the display
//! handshake may change speed after the first contact.
//!
//! ```ignore
//! let port = HardwareSerial::new(uart, |uart: &mut Uart, baud| uart.set_baudrate(baud));
//! ```

use embedded_io::{Read, ReadReady, Write};

use crate::serial::{SerialError, SerialPort};

/// Serial port backed by a hardware UART
pub struct HardwareSerial<U, F> {
    uart: U,
    configure: F,
    baud_rate: Option<u32>,
}

impl<U, F> HardwareSerial<U, F>
where
    U: Read + ReadReady + Write,
    F: FnMut(&mut U, u32) -> Result<(), U::Error>,
{
    /// Create a closed port around a UART peripheral
    pub fn new(uart: U, configure: F) -> Self {
        Self {
            uart,
            configure,
            baud_rate: None,
        }
    }

    /// Release the wrapped peripheral
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U, F> SerialPort for HardwareSerial<U, F>
where
    U: Read + ReadReady + Write,
    F: FnMut(&mut U, u32) -> Result<(), U::Error>,
{
    type Error = SerialError<U::Error>;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        if baud_rate == 0 {
            return Err(SerialError::InvalidBaudRate);
        }
        (self.configure)(&mut self.uart, baud_rate).map_err(SerialError::Io)?;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn close(&mut self) {
        self.baud_rate = None;
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.baud_rate.is_none() {
            return Err(SerialError::NotOpen);
        }
        self.uart.write_all(&[byte]).map_err(SerialError::Io)
    }

    fn available(&mut self) -> bool {
        // A peripheral error reads as "nothing yet"; the caller's retry
        // budget turns a persistent fault into a timeout.
        self.baud_rate.is_some() && self.uart.read_ready().unwrap_or(false)
    }

    fn read(&mut self) -> Option<u8> {
        if !self.available() {
            return None;
        }
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.baud_rate.is_none() {
            return Err(SerialError::NotOpen);
        }
        self.uart.flush().map_err(SerialError::Io)
    }

    fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }
}
