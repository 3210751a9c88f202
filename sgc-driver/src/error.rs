//! Driver error type

use sgc_protocol::InfoError;

/// Why a command did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No reply within the response retry budget
    Timeout,
    /// Module answered NAK
    Nak,
    /// Module answered something other than ACK/NAK where an ACK was due
    UnexpectedResponse(u8),
    /// Parameter rejected before anything was sent
    InvalidParameter,
    /// Session has not completed `initialize()`
    NotInitialized,
    /// Bounded read filled its buffer without a terminator
    Incomplete,
    /// Reply was received but could not be decoded
    InvalidResponse,
    /// Baud rate not in the module's rate table
    UnsupportedBaudRate,
    /// Reported screen size cannot be addressed by this protocol variant
    UnsupportedGeometry,
    /// Serial port failed to open or write
    Transport,
    /// Reset line could not be driven
    ResetPin,
}

impl From<InfoError> for Error {
    fn from(_: InfoError) -> Self {
        Error::InvalidResponse
    }
}

/// Result alias used throughout the driver
pub type Result<T> = core::result::Result<T, Error>;
