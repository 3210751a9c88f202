//! Device identification
//!
//! The INFO command answers with a fixed five-byte block:
//!
//! ```text
//! ┌──────┬──────────┬──────────┬────────────┬─────────────┐
//! │ TYPE │ HARDWARE │ FIRMWARE │ HORIZONTAL │ VERTICAL    │
//! │ 1B   │ 1B (BCD) │ 1B (BCD) │ 1B (code)  │ 1B (code)   │
//! └──────┴──────────┴──────────┴────────────┴─────────────┘
//! ```
//!
//! Revisions are two decimal digits packed in nibbles (`0x10` is revision
//! 10). Resolutions are lookup codes, not pixel counts. Which codes exist,
//! and what happens to an unknown one, depends on the [`ProtocolVariant`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::encoder::CoordWidth;

/// Length of the INFO response block
pub const INFO_RESPONSE_LEN: usize = 5;

/// Errors decoding an INFO response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InfoError {
    /// Revision byte has a nibble above 9
    InvalidRevision(u8),
}

/// Protocol generation spoken by the module
///
/// The two generations differ in the init handshake and in how screen
/// geometry is detected; they are never mixed within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtocolVariant {
    /// Auto-baud at the operating speed, one-byte coordinates only,
    /// geometry beyond 255 pixels unsupported
    #[default]
    Legacy,
    /// Auto-baud at 9600 then switch speed, resolution fallback query,
    /// two-byte coordinates on large screens
    Extended,
}

/// Display technology reported by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceType {
    #[default]
    Unknown,
    Oled,
    Lcd,
    Vga,
}

impl DeviceType {
    /// Decode the type byte of the INFO response
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => DeviceType::Oled,
            0x01 => DeviceType::Lcd,
            0x02 => DeviceType::Vga,
            _ => DeviceType::Unknown,
        }
    }

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Unknown => "unknown",
            DeviceType::Oled => "OLED",
            DeviceType::Lcd => "LCD",
            DeviceType::Vga => "VGA",
        }
    }
}

/// Controller class, which fixes the coordinate width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControllerFamily {
    /// Not negotiated yet
    #[default]
    Unknown,
    /// One-byte coordinates
    Goldelox,
    /// Two-byte coordinates
    Picaso,
}

impl ControllerFamily {
    /// Infer the family from the screen geometry
    ///
    /// Anything wider or taller than one byte can address needs two-byte
    /// coordinates.
    pub fn from_geometry(width: u16, height: u16) -> Self {
        if width > u8::MAX as u16 || height > u8::MAX as u16 {
            ControllerFamily::Picaso
        } else {
            ControllerFamily::Goldelox
        }
    }

    /// Coordinate encoding for this family
    pub fn coord_width(self) -> CoordWidth {
        match self {
            ControllerFamily::Picaso => CoordWidth::Word,
            ControllerFamily::Goldelox | ControllerFamily::Unknown => CoordWidth::Byte,
        }
    }
}

/// Read a byte as two packed decimal digits
///
/// `0x10` is 10, not 16. Returns `None` for nibbles above 9.
pub fn decode_bcd(value: u8) -> Option<u8> {
    let tens = value >> 4;
    let ones = value & 0x0F;
    if tens > 9 || ones > 9 {
        return None;
    }
    Some(tens * 10 + ones)
}

/// Map a resolution code to pixels
///
/// `None` means the code is unknown to this protocol variant.
pub fn decode_resolution(code: u8, variant: ProtocolVariant) -> Option<u16> {
    let pixels = match code {
        0x64 => 64,
        0x96 => 96,
        0x28 => 128,
        0x60 => 160,
        0x76 => 176,
        0x22 => 220,
        0x32 => 320,
        0x24 if variant == ProtocolVariant::Extended => 240,
        0x48 if variant == ProtocolVariant::Extended => 480,
        _ => return None,
    };
    Some(pixels)
}

/// Decoded INFO response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub hardware_revision: u8,
    pub firmware_revision: u8,
    /// Horizontal resolution, `None` for an unknown code
    pub width: Option<u16>,
    /// Vertical resolution, `None` for an unknown code
    pub height: Option<u16>,
    /// Raw horizontal code as received
    pub width_code: u8,
    /// Raw vertical code as received
    pub height_code: u8,
}

impl DeviceInfo {
    /// Decode the five-byte INFO block
    ///
    /// The whole block is rejected if either revision is not valid BCD.
    pub fn parse(
        response: &[u8; INFO_RESPONSE_LEN],
        variant: ProtocolVariant,
    ) -> Result<Self, InfoError> {
        let hardware_revision =
            decode_bcd(response[1]).ok_or(InfoError::InvalidRevision(response[1]))?;
        let firmware_revision =
            decode_bcd(response[2]).ok_or(InfoError::InvalidRevision(response[2]))?;

        Ok(Self {
            device_type: DeviceType::from_byte(response[0]),
            hardware_revision,
            firmware_revision,
            width: decode_resolution(response[3], variant),
            height: decode_resolution(response[4], variant),
            width_code: response[3],
            height_code: response[4],
        })
    }

    /// Check if both resolution codes were recognised
    pub fn has_geometry(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_reads_hex_digits_as_decimal() {
        assert_eq!(decode_bcd(0x10), Some(10));
        assert_eq!(decode_bcd(0x02), Some(2));
        assert_eq!(decode_bcd(0x99), Some(99));
        assert_eq!(decode_bcd(0x1C), None);
        assert_eq!(decode_bcd(0xA0), None);
    }

    #[test]
    fn test_parse_oled_128() {
        let info =
            DeviceInfo::parse(&[0x00, 0x10, 0x02, 0x28, 0x28], ProtocolVariant::Legacy).unwrap();
        assert_eq!(info.device_type, DeviceType::Oled);
        assert_eq!(info.hardware_revision, 10);
        assert_eq!(info.firmware_revision, 2);
        assert_eq!(info.width, Some(128));
        assert_eq!(info.height, Some(128));
        assert!(info.has_geometry());
    }

    #[test]
    fn test_parse_rejects_bad_revision() {
        let result = DeviceInfo::parse(&[0x00, 0x1C, 0x02, 0x28, 0x28], ProtocolVariant::Legacy);
        assert_eq!(result, Err(InfoError::InvalidRevision(0x1C)));

        let result = DeviceInfo::parse(&[0x00, 0x10, 0xF0, 0x28, 0x28], ProtocolVariant::Legacy);
        assert_eq!(result, Err(InfoError::InvalidRevision(0xF0)));
    }

    #[test]
    fn test_extended_codes_only_in_extended_variant() {
        assert_eq!(decode_resolution(0x24, ProtocolVariant::Legacy), None);
        assert_eq!(decode_resolution(0x24, ProtocolVariant::Extended), Some(240));
        assert_eq!(decode_resolution(0x32, ProtocolVariant::Legacy), Some(320));
        assert_eq!(decode_resolution(0xEE, ProtocolVariant::Extended), None);
    }

    #[test]
    fn test_family_from_geometry() {
        assert_eq!(
            ControllerFamily::from_geometry(128, 128),
            ControllerFamily::Goldelox
        );
        assert_eq!(
            ControllerFamily::from_geometry(255, 255),
            ControllerFamily::Goldelox
        );
        assert_eq!(
            ControllerFamily::from_geometry(320, 240),
            ControllerFamily::Picaso
        );
        assert_eq!(ControllerFamily::Picaso.coord_width(), CoordWidth::Word);
    }

    #[test]
    fn test_unknown_device_type() {
        assert_eq!(DeviceType::from_byte(0x07), DeviceType::Unknown);
        assert_eq!(DeviceType::from_byte(0x01).as_str(), "LCD");
    }
}
