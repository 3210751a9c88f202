//! Session configuration
//!
//! Everything the host decides before talking to the module: link speed,
//! protocol generation, retry budgets, and the text/shape defaults applied
//! once the handshake completes.

use sgc_protocol::{Color, FontSize, Opacity, ProtocolVariant, ShapeFill};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default operating baud rate
///
/// Faster rates work with hardware UARTs, but software serial tends to drop
/// bytes during sector reads above 38400.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// How long the module needs after reset before it listens (ms)
pub const DEFAULT_INIT_DELAY_MS: u32 = 1000;

/// Reset/auto-baud attempts before giving up
pub const DEFAULT_INIT_RETRIES: u8 = 10;

/// Response polls before a read times out
///
/// With the default poll delay this is roughly half a second.
pub const DEFAULT_RESPONSE_RETRIES: u32 = 30_000;

/// Delay between response polls (us), about one bit time at 57600 baud
pub const DEFAULT_RESPONSE_RETRY_DELAY_US: u32 = 17;

/// Reset pulse hold time (ms)
pub const DEFAULT_RESET_HOLD_MS: u32 = 20;

/// Response polling and reset timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Number of "byte available" polls per response byte
    pub response_retries: u32,
    /// Delay between polls in microseconds
    pub response_retry_delay_us: u32,
    /// Reset line low and high hold time in milliseconds
    pub reset_hold_ms: u32,
    /// Extra wait before reading a sector, for slow cards (ms)
    pub sector_read_delay_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            response_retries: DEFAULT_RESPONSE_RETRIES,
            response_retry_delay_us: DEFAULT_RESPONSE_RETRY_DELAY_US,
            reset_hold_ms: DEFAULT_RESET_HOLD_MS,
            sector_read_delay_ms: 0,
        }
    }
}

/// Text and button defaults applied after the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextDefaults {
    pub font_size: FontSize,
    pub font_opacity: Opacity,
    pub proportional: bool,
    pub button_opacity: Opacity,
    pub font_color: Color,
    pub button_color: Color,
    pub button_font_color: Color,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_size: FontSize::Small,
            font_opacity: Opacity::Transparent,
            proportional: false,
            button_opacity: Opacity::Transparent,
            font_color: Color::WHITE,
            button_color: Color::SLATE_GRAY,
            button_font_color: Color::SILVER,
        }
    }
}

/// Display session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    /// Operating baud rate
    pub baud_rate: u32,
    /// Power-up wait after each reset (ms)
    pub init_delay_ms: u32,
    /// Reset/auto-baud attempts
    pub init_retries: u8,
    /// Protocol generation of the module
    pub variant: ProtocolVariant,
    pub timing: Timing,
    pub text: TextDefaults,
    /// Shape fill mode applied at startup
    pub fill: ShapeFill,
    /// Progress bar foreground
    pub progress_fore: Color,
    /// Progress bar background
    pub progress_back: Color,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            init_delay_ms: DEFAULT_INIT_DELAY_MS,
            init_retries: DEFAULT_INIT_RETRIES,
            variant: ProtocolVariant::Legacy,
            timing: Timing::default(),
            text: TextDefaults::default(),
            fill: ShapeFill::Solid,
            progress_fore: Color::DARK_SLATE_GRAY,
            progress_back: Color::from_rgb888(0x182828),
        }
    }
}

impl SessionConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_variant(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_init_delay_ms(mut self, init_delay_ms: u32) -> Self {
        self.init_delay_ms = init_delay_ms;
        self
    }

    pub fn with_init_retries(mut self, init_retries: u8) -> Self {
        self.init_retries = init_retries;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_text(mut self, text: TextDefaults) -> Self {
        self.text = text;
        self
    }

    pub fn with_fill(mut self, fill: ShapeFill) -> Self {
        self.fill = fill;
        self
    }
}
