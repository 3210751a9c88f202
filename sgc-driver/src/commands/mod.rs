//! Command catalog
//!
//! Every command follows the same shape: check parameters locally, encode
//! one frame, then read an ACK or a structured reply. A rejected parameter
//! never puts bytes on the wire.

mod graphics;
mod sd;
mod system;
mod text;

pub use sd::{VideoClip, WipeError};
pub use text::TextStyle;
