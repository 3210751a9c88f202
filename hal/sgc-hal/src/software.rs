//! Software-emulated UART
//!
//! Bit-banged 8N1 serial over two GPIOs for boards that have run out of
//! hardware UARTs. Transmission is fully blocking. Reception is polled:
//! every call to [`SerialPort::available`] samples the RX line, and a low
//! level (start bit) triggers a blocking receive of one frame into a small
//! ring buffer.
//!
//! Because nothing samples the line between polls, bytes that arrive while
//! the host is busy elsewhere are lost. The display protocol is
//! call-and-response, so the driver is always polling when a reply is due;
//! keep the baud rate modest (9600-38400) for reliable sampling.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, InputPin, OutputPin};
use heapless::Deque;

use crate::serial::{bit_time_ns, SerialError, SerialPort};

/// Receive buffer size in bytes
pub const RX_BUFFER_SIZE: usize = 64;

/// Serial port emulated on GPIO pins
pub struct SoftwareSerial<TX, RX, D> {
    tx: TX,
    rx: RX,
    delay: D,
    baud_rate: Option<u32>,
    bit_ns: u32,
    rx_buffer: Deque<u8, RX_BUFFER_SIZE>,
    overflowed: bool,
}

impl<TX, RX, D> SoftwareSerial<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: DelayNs,
{
    /// Create a closed port on the given pins
    pub fn new(tx: TX, rx: RX, delay: D) -> Self {
        Self {
            tx,
            rx,
            delay,
            baud_rate: None,
            bit_ns: 0,
            rx_buffer: Deque::new(),
            overflowed: false,
        }
    }

    /// Release the pins and delay provider
    pub fn release(self) -> (TX, RX, D) {
        (self.tx, self.rx, self.delay)
    }

    fn set_tx(&mut self, high: bool) -> Result<(), SerialError<ErrorKind>> {
        let result = if high {
            self.tx.set_high()
        } else {
            self.tx.set_low()
        };
        result.map_err(|e| SerialError::Io(e.kind()))
    }

    fn rx_is_low(&mut self) -> bool {
        self.rx.is_low().unwrap_or(false)
    }

    /// Receive one frame if a start bit is on the line
    fn poll_rx(&mut self) {
        if self.baud_rate.is_none() || !self.rx_is_low() {
            return;
        }

        // Move to the middle of the start bit, then sample each data bit
        // one bit time apart, LSB first.
        self.delay.delay_ns(self.bit_ns / 2);
        let mut byte = 0u8;
        for bit in 0..8 {
            self.delay.delay_ns(self.bit_ns);
            if !self.rx_is_low() {
                byte |= 1 << bit;
            }
        }
        // Stop bit
        self.delay.delay_ns(self.bit_ns);

        if self.rx_buffer.push_back(byte).is_err() {
            self.overflowed = true;
        }
    }
}

impl<TX, RX, D> SerialPort for SoftwareSerial<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: DelayNs,
{
    type Error = SerialError<ErrorKind>;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        let bit_ns = bit_time_ns(baud_rate).ok_or(SerialError::InvalidBaudRate)?;
        self.bit_ns = bit_ns;
        // Idle line is high
        self.set_tx(true)?;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn close(&mut self) {
        self.baud_rate = None;
        self.rx_buffer.clear();
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.baud_rate.is_none() {
            return Err(SerialError::NotOpen);
        }

        // Start bit
        self.set_tx(false)?;
        self.delay.delay_ns(self.bit_ns);

        for bit in 0..8 {
            self.set_tx(byte & (1 << bit) != 0)?;
            self.delay.delay_ns(self.bit_ns);
        }

        // Stop bit
        self.set_tx(true)?;
        self.delay.delay_ns(self.bit_ns);
        Ok(())
    }

    fn available(&mut self) -> bool {
        if self.rx_buffer.is_empty() {
            self.poll_rx();
        }
        !self.rx_buffer.is_empty()
    }

    fn read(&mut self) -> Option<u8> {
        if self.rx_buffer.is_empty() {
            self.poll_rx();
        }
        self.rx_buffer.pop_front()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Writes complete synchronously
        if self.baud_rate.is_none() {
            return Err(SerialError::NotOpen);
        }
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
