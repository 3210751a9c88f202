//! Command opcodes and fixed parameter values
//!
//! Every command starts with one opcode byte. SD-card commands are nested
//! behind the [`sd::EXTENDED`] prefix, so their frames begin with two bytes.

/// Positive acknowledgement
pub const ACK: u8 = 0x06;
/// Negative acknowledgement
pub const NAK: u8 = 0x15;

/// Boolean parameter values
pub const PRM_FALSE: u8 = 0x00;
pub const PRM_TRUE: u8 = 0x01;
/// Placeholder for unused parameter bytes
pub const PRM_NA: u8 = 0x00;

/// Base system commands
pub mod system {
    /// Auto-baud: the module measures the host's bit timing from this byte
    pub const AUTO_BAUD: u8 = 0x55;
    /// Version / device info query
    pub const INFO: u8 = 0x56;
    /// Clear screen
    pub const CLEAR: u8 = 0x45;
    /// Display control functions (power, contrast, low-power)
    pub const CTLFUNC: u8 = 0x59;
    /// Sleep / SD power control
    pub const SLEEP: u8 = 0x5A;
    /// Joystick status
    pub const JOYSTICK: u8 = 0x4A;
    /// Joystick status with wait time
    pub const JOYSTICK_WAIT: u8 = 0x6A;
    /// Single note or frequency
    pub const SOUND: u8 = 0x4E;
    /// Note sequence
    pub const TUNE: u8 = 0x6E;
    /// Change baud rate (Picaso-class controllers)
    pub const SET_BAUD: u8 = 0x51;
    /// Raw resolution query (Picaso-class controllers)
    pub const QUERY_RESOLUTION: u8 = 0x7A;

    pub const CTL_POWER: u8 = 0x01;
    pub const CTL_CONTRAST: u8 = 0x02;
    pub const CTL_LOWPOWER: u8 = 0x03;
    pub const CTL_POWER_OFF: u8 = 0x00;
    pub const CTL_POWER_ON: u8 = 0x01;
    pub const CTL_LOWPOWER_SHUTDOWN: u8 = 0x00;
    pub const CTL_LOWPOWER_POWERUP: u8 = 0x01;

    pub const SLEEP_SD_OFF: u8 = 0x80;
    pub const SLEEP_WAKE_JOYSTICK: u8 = 0x02;
    pub const SLEEP_WAKE_SERIAL: u8 = 0x01;

    /// Highest contrast level
    pub const CONTRAST_MAX: u8 = 15;
    /// Maximum note/duration pairs in one tune
    pub const MAX_TUNE_LENGTH: usize = 64;
}

/// Graphics commands
pub mod graphics {
    pub const READ_PIXEL: u8 = 0x52;
    pub const PIXEL: u8 = 0x50;
    pub const LINE: u8 = 0x4C;
    pub const RECTANGLE: u8 = 0x72;
    pub const TRIANGLE: u8 = 0x47;
    pub const POLYGON: u8 = 0x67;
    pub const CIRCLE: u8 = 0x43;
    pub const ADD_USER_BITMAP: u8 = 0x41;
    pub const DRAW_USER_BITMAP: u8 = 0x44;
    pub const SET_BACKGROUND: u8 = 0x4B;
    pub const REPLACE_BACKGROUND: u8 = 0x42;
    pub const REPLACE_COLOR: u8 = 0x6B;
    pub const SET_FILL: u8 = 0x70;
    pub const COPY_PASTE: u8 = 0x63;

    /// Pixel format marker for 16-bit (RGB565) image data
    pub const IMAGE_16BIT: u8 = 0x10;
    /// Pixel format marker for 8-bit (RGB332) image data
    pub const IMAGE_8BIT: u8 = 0x08;

    /// Number of user bitmap slots on the module
    pub const MAX_USER_BITMAPS: usize = 32;
    /// Bytes per user bitmap (8x8 monochrome)
    pub const USER_BITMAP_SIZE: usize = 8;
    /// Vertex limit of the polygon command
    pub const MAX_POLYGON_VERTICES: usize = 7;
}

/// Text commands
pub mod text {
    pub const SET_FONT: u8 = 0x46;
    pub const SET_OPACITY: u8 = 0x4F;
    pub const STRING_TEXT: u8 = 0x73;
    pub const STRING_GRAPHIC: u8 = 0x53;
    pub const BUTTON: u8 = 0x62;

    pub const BUTTON_DOWN: u8 = 0x00;
    pub const BUTTON_UP: u8 = 0x01;
}

/// SD card commands, each sent after [`EXTENDED`]
pub mod sd {
    /// Extended command prefix
    pub const EXTENDED: u8 = 0x40;

    pub const INITIALIZE: u8 = 0x69;
    pub const SET_ADDRESS: u8 = 0x41;
    pub const READ_BYTE: u8 = 0x72;
    pub const WRITE_BYTE: u8 = 0x77;
    pub const READ_SECTOR: u8 = 0x52;
    pub const WRITE_SECTOR: u8 = 0x57;
    pub const SCREENSHOT: u8 = 0x43;
    pub const DISPLAY_IMAGE: u8 = 0x49;
    pub const DISPLAY_OBJECT: u8 = 0x4F;
    pub const DISPLAY_VIDEO: u8 = 0x56;
    pub const RUN_SCRIPT: u8 = 0x50;

    /// Sector payload size in bytes
    pub const SECTOR_SIZE: usize = 512;
    /// Sector addresses are sent as three bytes
    pub const MAX_SECTOR_ADDRESS: u32 = 0x00FF_FFFF;
}
