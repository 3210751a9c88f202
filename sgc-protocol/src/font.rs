//! Font, opacity and fill parameters
//!
//! These are the small enumerated parameters of the text and shape
//! commands. They only travel host to module, so each has a `to_byte` and
//! nothing decodes them back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte value is not a defined parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue(pub u8);

/// Flag OR'd into the font byte for proportional spacing
pub const PROPORTIONAL_FLAG: u8 = 0x10;

/// Built-in font sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FontSize {
    /// 5x7
    #[default]
    Small,
    /// 8x8
    Medium,
    /// 8x12
    Large,
}

impl FontSize {
    /// Wire value
    pub fn to_byte(self) -> u8 {
        match self {
            FontSize::Small => 0x00,
            FontSize::Medium => 0x01,
            FontSize::Large => 0x02,
        }
    }

    /// Font byte of the string commands: size plus proportional flag
    pub fn with_spacing(self, proportional: bool) -> u8 {
        if proportional {
            self.to_byte() | PROPORTIONAL_FLAG
        } else {
            self.to_byte()
        }
    }
}

/// Whether text draws its background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Opacity {
    #[default]
    Transparent,
    Opaque,
}

impl Opacity {
    pub fn to_byte(self) -> u8 {
        match self {
            Opacity::Transparent => 0x00,
            Opacity::Opaque => 0x01,
        }
    }
}

impl From<bool> for Opacity {
    fn from(opaque: bool) -> Self {
        if opaque {
            Opacity::Opaque
        } else {
            Opacity::Transparent
        }
    }
}

/// Shape drawing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeFill {
    #[default]
    Solid,
    /// Outline only
    Empty,
}

impl ShapeFill {
    pub fn to_byte(self) -> u8 {
        match self {
            ShapeFill::Solid => 0x00,
            ShapeFill::Empty => 0x01,
        }
    }
}

/// Drawn state of a text button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Pressed,
    #[default]
    Released,
}

impl ButtonState {
    pub fn to_byte(self) -> u8 {
        match self {
            ButtonState::Pressed => crate::opcodes::text::BUTTON_DOWN,
            ButtonState::Released => crate::opcodes::text::BUTTON_UP,
        }
    }
}
