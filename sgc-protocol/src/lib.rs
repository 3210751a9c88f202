//! SGC Serial Display Protocol
//!
//! This crate defines the byte protocol spoken by 4D-style "serial graphics
//! controller" display modules: OLED, LCD and VGA modules that take drawing
//! commands over a UART and answer each one.
//!
//! # Protocol Overview
//!
//! A command is an opcode byte followed by fixed parameters, multi-byte
//! values big-endian:
//!
//! ```text
//! ┌────────┬──────────────────────────────┐
//! │ OPCODE │ PARAMETERS                   │
//! │ 1B     │ command-specific, big-endian │
//! └────────┴──────────────────────────────┘
//! ```
//!
//! The module answers with one of:
//! - ACK (`0x06`) or NAK (`0x15`)
//! - a 2-byte value (pixel color)
//! - a fixed block (5-byte device info)
//! - single data bytes (SD reads)
//!
//! Coordinates are one byte on small-screen controllers and two bytes on
//! large-screen ones; see [`encoder::CoordWidth`].
//!
//! Nothing here performs I/O. The driver crate owns the serial port, the
//! retry loops and the session state.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod baud;
pub mod color;
pub mod encoder;
pub mod font;
pub mod info;
pub mod joystick;
pub mod opcodes;

pub use baud::{baud_index, baud_rate, BOOTSTRAP_BAUD};
pub use color::{Color, Rgb565};
pub use encoder::{ByteSink, CapacityError, CoordWidth, Encoder};
pub use font::{ButtonState, FontSize, InvalidValue, Opacity, ShapeFill};
pub use info::{
    decode_bcd, decode_resolution, ControllerFamily, DeviceInfo, DeviceType, InfoError,
    ProtocolVariant, INFO_RESPONSE_LEN,
};
pub use joystick::{is_valid_note, JoystickOption, JoystickState};
pub use opcodes::{ACK, NAK};
