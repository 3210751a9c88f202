//! SGC Serial Transport Abstraction
//!
//! This crate defines the byte transport that the SGC display driver talks
//! through. A display module is wired to a UART, either a hardware
//! peripheral or a pair of GPIOs driven in software, and the driver never
//! needs to know which.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sgc-driver (Display session, commands) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sgc-hal (this crate - SerialPort)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────────┐
//!         ▼           ▼               ▼
//! ┌──────────────┐ ┌──────────────┐ ┌──────────┐
//! │HardwareSerial│ │SoftwareSerial│ │ Loopback │
//! │ (embedded-io)│ │(embedded-hal)│ │ (memory) │
//! └──────────────┘ └──────────────┘ └──────────┘
//! ```
//!
//! # Implementations
//!
//! - [`hardware::HardwareSerial`] - wraps any `embedded-io` UART plus a
//!   baud-rate reconfiguration callback
//! - [`software::SoftwareSerial`] - bit-banged 8N1 over `embedded-hal` pins
//! - [`loopback::Loopback`] - in-memory echo port for host testing

#![no_std]
#![deny(unsafe_code)]

pub mod hardware;
pub mod loopback;
pub mod serial;
pub mod software;

// Re-export key types at crate root for convenience
pub use hardware::HardwareSerial;
pub use loopback::Loopback;
pub use serial::{SerialError, SerialPort};
pub use software::SoftwareSerial;
