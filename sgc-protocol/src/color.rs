//! Color value type
//!
//! The module takes colors as 16-bit RGB565 on the wire:
//!
//! ```text
//! msb : R4 R3 R2 R1 R0 G5 G4 G3
//! lsb : G2 G1 G0 B4 B3 B2 B1 B0
//! ```
//!
//! [`Color`] keeps 8 bits per channel on the host; conversion to RGB565
//! drops the low bits of each channel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packed RGB565 color as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// High byte, sent first
    pub fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte, sent second
    pub fn low(self) -> u8 {
        self.0 as u8
    }
}

impl From<u16> for Rgb565 {
    fn from(value: u16) -> Self {
        Rgb565(value)
    }
}

impl From<Rgb565> for u16 {
    fn from(value: Rgb565) -> Self {
        value.0
    }
}

impl From<Color> for Rgb565 {
    fn from(color: Color) -> Self {
        color.to_rgb565()
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const SILVER: Color = Color::new(0xC0, 0xC0, 0xC0);
    pub const SLATE_GRAY: Color = Color::new(0x70, 0x80, 0x90);
    pub const DARK_SLATE_GRAY: Color = Color::new(0x2F, 0x4F, 0x4F);

    /// Create a color from its channels
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a color from a packed `0xRRGGBB` value
    pub const fn from_rgb888(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Pack into `0xRRGGBB`
    pub const fn to_rgb888(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    /// Expand an RGB565 value, leaving the dropped low bits at zero
    pub const fn from_rgb565(value: Rgb565) -> Self {
        let raw = value.0;
        let red = (raw >> 11) as u8;
        let green = ((raw >> 5) & 0x3F) as u8;
        let blue = (raw & 0x1F) as u8;
        Self::new(red << 3, green << 2, blue << 3)
    }

    /// Truncate to RGB565
    pub const fn to_rgb565(self) -> Rgb565 {
        let r = (self.red >> 3) as u16;
        let g = (self.green >> 2) as u16;
        let b = (self.blue >> 3) as u16;
        Rgb565((r << 11) | (g << 5) | b)
    }

    /// Mix two colors
    ///
    /// `weight` is the share of `self` out of 256; the remainder goes to
    /// `other`. A weight of 0 yields `other`.
    pub fn blend(self, other: Color, weight: u8) -> Color {
        Color::from_rgb888(blend_rgb888(self.to_rgb888(), other.to_rgb888(), weight))
    }
}

/// Blend two packed `0xRRGGBB` values
///
/// Red and blue are scaled together in one multiply, with green done
/// separately, so that each channel's product lands in its own byte.
pub fn blend_rgb888(first: u32, second: u32, weight: u8) -> u32 {
    const RB_MASK: u32 = 0x00FF_00FF;
    const G_MASK: u32 = 0x0000_FF00;

    let first_amount = weight as u32;
    let second_amount = 256 - first_amount;

    let rb = ((first & RB_MASK) * first_amount + (second & RB_MASK) * second_amount) & 0xFF00_FF00;
    let g = ((first & G_MASK) * first_amount + (second & G_MASK) * second_amount) & 0x00FF_0000;

    (rb | g) >> 8
}
