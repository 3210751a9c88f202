//! Response reader
//!
//! Every reply from the module is collected by busy-polling the port with
//! a fixed budget of polls and a short delay between them. There is no
//! blocking read anywhere in the driver; a silent module always surfaces as
//! [`Error::Timeout`] after `response_retries` polls.

use embedded_hal::delay::DelayNs;
use sgc_hal::SerialPort;
use sgc_protocol::{ACK, NAK};

use crate::config::Timing;
use crate::error::{Error, Result};

/// Borrowed view of the port and delay used to collect one reply
pub struct Reader<'a, S, D> {
    port: &'a mut S,
    delay: &'a mut D,
    retries: u32,
    retry_delay_us: u32,
}

impl<'a, S, D> Reader<'a, S, D>
where
    S: SerialPort,
    D: DelayNs,
{
    pub fn new(port: &'a mut S, delay: &'a mut D, timing: &Timing) -> Self {
        Self {
            port,
            delay,
            retries: timing.response_retries,
            retry_delay_us: timing.response_retry_delay_us,
        }
    }

    /// Stretch the poll budget to cover `wait_ms` of module-side waiting
    ///
    /// For commands where the module itself holds the reply back, such as
    /// a timed joystick wait.
    pub fn with_extra_wait(mut self, wait_ms: u32) -> Self {
        let extra = wait_ms.saturating_mul(1000) / self.retry_delay_us.max(1);
        self.retries = self.retries.saturating_add(extra);
        self
    }

    /// Wait for one byte
    ///
    /// Polls `available()` at most `response_retries` times, sleeping
    /// `response_retry_delay_us` after each empty poll.
    pub fn read_byte(&mut self) -> Result<u8> {
        for _ in 0..self.retries {
            if self.port.available() {
                if let Some(byte) = self.port.read() {
                    return Ok(byte);
                }
            }
            self.delay.delay_us(self.retry_delay_us);
        }

        if self.port.overflow() {
            warn!("receive buffer overflowed while waiting for a reply");
        }
        Err(Error::Timeout)
    }

    /// Read a big-endian 16-bit value
    pub fn read_short(&mut self) -> Result<u16> {
        let high = self.read_byte()?;
        let low = self.read_byte()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    /// Read the single-byte acknowledgement of a command
    pub fn read_ack(&mut self) -> Result<()> {
        match self.read_byte()? {
            ACK => Ok(()),
            NAK => Err(Error::Nak),
            other => Err(Error::UnexpectedResponse(other)),
        }
    }

    /// Fill `buf` completely or fail on the first missing byte
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        for (received, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte().inspect_err(|_| {
                debug!("block read stopped after {} bytes", received);
            })?;
        }
        Ok(())
    }

    /// Read a NUL-terminated string into `buf`, returning its length
    pub fn read_bounded_string(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_terminated(buf, || self.read_byte())
    }
}

/// Collect bytes from `next` until NUL
///
/// At most `buf.len()` bytes are consumed. Filling the buffer without seeing
/// a terminator is [`Error::Incomplete`]; the partial contents are not
/// reported as a string.
pub(crate) fn read_terminated<F>(buf: &mut [u8], mut next: F) -> Result<usize>
where
    F: FnMut() -> Result<u8>,
{
    for index in 0..buf.len() {
        match next()? {
            0 => return Ok(index),
            byte => buf[index] = byte,
        }
    }
    Err(Error::Incomplete)
}
