//! Joystick and sound parameters
//!
//! Modules with the five-way joystick header report switch state through
//! the JOYSTICK commands. Notes for SOUND/TUNE are either a piano key
//! number or a frequency in Hz.

use crate::font::InvalidValue;

/// Highest piano key number accepted as a note
pub const MAX_PIANO_NOTE: u16 = 84;

/// Frequency range accepted as a note (Hz)
pub const FREQUENCY_RANGE: core::ops::RangeInclusive<u16> = 100..=20_000;

/// Check a SOUND/TUNE note value: silence, a piano key, or a frequency
pub fn is_valid_note(note: u16) -> bool {
    note <= MAX_PIANO_NOTE || FREQUENCY_RANGE.contains(&note)
}

/// What a JOYSTICK query waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoystickOption {
    /// Report the current switch state immediately
    Status,
    /// Block until a switch is pressed and released
    WaitPressRelease,
    /// Block until any switch is pressed
    WaitAnyPress,
    /// Block until the given switch is released
    WaitRelease(JoystickState),
}

impl JoystickOption {
    pub fn to_byte(self) -> u8 {
        match self {
            JoystickOption::Status => 0x08,
            JoystickOption::WaitPressRelease => 0x0F,
            JoystickOption::WaitAnyPress => 0x00,
            JoystickOption::WaitRelease(switch) => switch.to_byte(),
        }
    }

    /// Whether the option has a wire encoding of its own
    ///
    /// Releasing `Idle` would encode as 0x00, the any-press wait.
    pub fn is_valid(self) -> bool {
        self != JoystickOption::WaitRelease(JoystickState::Idle)
    }

    /// Whether the timed JOYSTICK_WAIT command accepts this option
    pub fn allows_timeout(self) -> bool {
        match self {
            JoystickOption::WaitAnyPress => true,
            JoystickOption::WaitRelease(_) => self.is_valid(),
            _ => false,
        }
    }
}

/// Switch reported by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoystickState {
    /// Nothing pressed, a release, or a wait that timed out
    #[default]
    Idle,
    Up,
    Left,
    Down,
    Right,
    Fire,
}

impl JoystickState {
    pub fn to_byte(self) -> u8 {
        match self {
            JoystickState::Idle => 0x00,
            JoystickState::Up => 0x01,
            JoystickState::Left => 0x02,
            JoystickState::Down => 0x03,
            JoystickState::Right => 0x04,
            JoystickState::Fire => 0x05,
        }
    }
}

impl TryFrom<u8> for JoystickState {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(JoystickState::Idle),
            0x01 => Ok(JoystickState::Up),
            0x02 => Ok(JoystickState::Left),
            0x03 => Ok(JoystickState::Down),
            0x04 => Ok(JoystickState::Right),
            0x05 => Ok(JoystickState::Fire),
            _ => Err(InvalidValue(value)),
        }
    }
}
