//! Host-side driver for SGC serial graphics display modules
//!
//! This crate owns the conversation with a display module:
//!
//! - Response reading with bounded busy-polling
//! - The reset / auto-baud / info handshake and the negotiated session
//! - The command catalog (system, graphics, text, user bitmaps, SD card)
//! - A progress bar widget and an SD wipe with on-screen progress
//!
//! # Usage
//!
//! ```ignore
//! use sgc_driver::{Display, SessionConfig};
//! use sgc_protocol::Color;
//!
//! let mut display = Display::new(port, reset_pin, delay, SessionConfig::default());
//! display.initialize()?;
//! display.clear()?;
//! display.draw_circle(64, 64, 20, Color::WHITE)?;
//! display.draw_text_default(0, 0, "hello")?;
//! ```
//!
//! # Features
//!
//! - `defmt` / `log`: route the driver's log output (mutually exclusive)
//! - `serde`: (de)serialize [`SessionConfig`]
//! - `std`: host builds

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod commands;
pub mod config;
pub mod error;
pub mod reader;
pub mod session;
pub mod widgets;

#[cfg(test)]
mod mock;

pub use commands::{TextStyle, VideoClip, WipeError};
pub use config::{SessionConfig, TextDefaults, Timing};
pub use error::{Error, Result};
pub use session::{Display, SessionState};
