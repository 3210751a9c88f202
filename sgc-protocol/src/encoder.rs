//! Command frame encoding
//!
//! A frame is an opcode followed by its parameters, multi-byte values
//! big-endian. There is no start byte, length or checksum: the module knows
//! each command's layout from its opcode.
//!
//! Coordinates are the one parameter whose width is not fixed by the
//! command. Goldelox-class controllers take one byte per coordinate,
//! Picaso-class controllers take two. The [`Encoder`] is built with the
//! session's negotiated [`CoordWidth`] and every x/y/width/height/radius goes
//! through [`Encoder::spatial`].
//!
//! The encoder streams into a [`ByteSink`]. On the host that can be a
//! `heapless::Vec`; the driver plugs in its serial port.

use heapless::Vec;

use crate::color::Rgb565;

/// Destination for encoded bytes
pub trait ByteSink {
    /// Error type for write operations
    type Error;

    /// Append one byte
    fn put(&mut self, byte: u8) -> Result<(), Self::Error>;
}

/// Fixed-capacity sink is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError;

impl<const N: usize> ByteSink for Vec<u8, N> {
    type Error = CapacityError;

    fn put(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte).map_err(|_| CapacityError)
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    fn put(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).put(byte)
    }
}

/// Encoded width of spatial parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordWidth {
    /// One byte per coordinate (0-255)
    #[default]
    Byte,
    /// Two bytes per coordinate, big-endian
    Word,
}

impl CoordWidth {
    /// Bytes emitted per coordinate
    pub fn size(self) -> usize {
        match self {
            CoordWidth::Byte => 1,
            CoordWidth::Word => 2,
        }
    }

    /// Largest coordinate that survives encoding unchanged
    pub fn max_value(self) -> u16 {
        match self {
            CoordWidth::Byte => u8::MAX as u16,
            CoordWidth::Word => u16::MAX,
        }
    }
}

/// Frame encoder
///
/// Methods return `&mut Self` so a frame reads as one chain:
///
/// ```
/// use heapless::Vec;
/// use sgc_protocol::{CoordWidth, Encoder, Rgb565};
///
/// let mut frame: Vec<u8, 8> = Vec::new();
/// Encoder::new(&mut frame, CoordWidth::Byte)
///     .byte(0x50).unwrap()
///     .spatial(5).unwrap()
///     .spatial(10).unwrap()
///     .color(Rgb565(0xF800)).unwrap();
/// assert_eq!(frame.as_slice(), &[0x50, 5, 10, 0xF8, 0x00]);
/// ```
pub struct Encoder<'a, W: ?Sized> {
    sink: &'a mut W,
    width: CoordWidth,
}

impl<'a, W: ByteSink + ?Sized> Encoder<'a, W> {
    /// Create an encoder writing coordinates at the given width
    pub fn new(sink: &'a mut W, width: CoordWidth) -> Self {
        Self { sink, width }
    }

    /// One byte
    pub fn byte(&mut self, value: u8) -> Result<&mut Self, W::Error> {
        self.sink.put(value)?;
        Ok(self)
    }

    /// Several bytes in order
    pub fn bytes(&mut self, values: &[u8]) -> Result<&mut Self, W::Error> {
        for &value in values {
            self.sink.put(value)?;
        }
        Ok(self)
    }

    /// 16-bit value, high byte first
    pub fn short(&mut self, value: u16) -> Result<&mut Self, W::Error> {
        self.bytes(&value.to_be_bytes())
    }

    /// 32-bit value, most significant byte first
    pub fn long(&mut self, value: u32) -> Result<&mut Self, W::Error> {
        self.bytes(&value.to_be_bytes())
    }

    /// Coordinate or dimension
    ///
    /// Truncated to the low byte for one-byte controllers.
    pub fn spatial(&mut self, value: u16) -> Result<&mut Self, W::Error> {
        match self.width {
            CoordWidth::Byte => self.byte(value as u8),
            CoordWidth::Word => self.short(value),
        }
    }

    /// Packed color
    pub fn color(&mut self, color: Rgb565) -> Result<&mut Self, W::Error> {
        self.short(color.0)
    }

    /// Text bytes, without terminator
    ///
    /// Stops silently at an embedded NUL; the module would read it as the
    /// end of the string anyway.
    pub fn text(&mut self, text: &str) -> Result<&mut Self, W::Error> {
        for &byte in text.as_bytes() {
            if byte == 0x00 {
                break;
            }
            self.sink.put(byte)?;
        }
        Ok(self)
    }

    /// 24-bit SD sector address
    pub fn sector_address(&mut self, sector: u32) -> Result<&mut Self, W::Error> {
        let [_, high, mid, low] = sector.to_be_bytes();
        self.bytes(&[high, mid, low])
    }
}
