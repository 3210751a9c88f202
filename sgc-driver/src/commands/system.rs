//! Display control, power, sound and joystick commands

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use sgc_hal::SerialPort;
use sgc_protocol::opcodes::{system, PRM_NA};
use sgc_protocol::{is_valid_note, JoystickOption, JoystickState};

use crate::error::{Error, Result};
use crate::session::Display;

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    /// Clear the screen to the background color
    pub fn clear(&mut self) -> Result<()> {
        self.command(|e| {
            e.byte(system::CLEAR)?;
            Ok(())
        })
    }

    /// Switch the panel on or off; display memory is kept
    pub fn set_power(&mut self, on: bool) -> Result<()> {
        let state = if on {
            system::CTL_POWER_ON
        } else {
            system::CTL_POWER_OFF
        };
        self.control(system::CTL_POWER, state)
    }

    pub fn power_on(&mut self) -> Result<()> {
        self.set_power(true)
    }

    pub fn power_off(&mut self) -> Result<()> {
        self.set_power(false)
    }

    /// Set panel contrast, 0 (off) to 15
    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        if contrast > system::CONTRAST_MAX {
            return Err(Error::InvalidParameter);
        }
        self.control(system::CTL_CONTRAST, contrast)
    }

    /// Set contrast from an analog reading
    ///
    /// `reading` in `0..full_scale` maps linearly onto
    /// `minimum..=CONTRAST_MAX`, so a pot at zero still leaves the screen
    /// readable.
    pub fn set_contrast_scaled(&mut self, reading: u16, full_scale: u16, minimum: u8) -> Result<()> {
        if full_scale == 0 || reading >= full_scale || minimum > system::CONTRAST_MAX {
            return Err(Error::InvalidParameter);
        }
        let span = u32::from(system::CONTRAST_MAX - minimum);
        let scaled = u32::from(reading) * span / u32::from(full_scale);
        self.set_contrast(minimum + scaled as u8)
    }

    /// Put the panel into its low-power state before removing power
    pub fn low_power_shutdown(&mut self) -> Result<()> {
        self.control(system::CTL_LOWPOWER, system::CTL_LOWPOWER_SHUTDOWN)
    }

    /// Bring the panel back from low-power shutdown
    pub fn low_power_power_up(&mut self) -> Result<()> {
        self.control(system::CTL_LOWPOWER, system::CTL_LOWPOWER_POWERUP)
    }

    /// Power down the SD card interface
    pub fn turn_off_sd(&mut self) -> Result<()> {
        self.sleep(system::SLEEP_SD_OFF)
    }

    /// Sleep until the joystick is moved
    pub fn wake_on_joystick(&mut self) -> Result<()> {
        self.sleep(system::SLEEP_WAKE_JOYSTICK)
    }

    /// Sleep until a serial byte arrives
    pub fn wake_on_serial(&mut self) -> Result<()> {
        self.sleep(system::SLEEP_WAKE_SERIAL)
    }

    /// Play one note (0 silence, 1-84 piano key, 100-20000 Hz)
    pub fn sound(&mut self, note: u16, duration_ms: u16) -> Result<()> {
        if !is_valid_note(note) {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.byte(system::SOUND)?.short(note)?.short(duration_ms)?;
            Ok(())
        })
    }

    /// Play up to 64 `(note, duration_ms)` pairs
    pub fn tune(&mut self, notes: &[(u16, u16)]) -> Result<()> {
        if notes.is_empty()
            || notes.len() > system::MAX_TUNE_LENGTH
            || !notes.iter().all(|&(note, _)| is_valid_note(note))
        {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.bytes(&[system::TUNE, notes.len() as u8])?;
            for &(note, duration_ms) in notes {
                e.short(note)?.short(duration_ms)?;
            }
            Ok(())
        })
    }

    /// Read or wait for the joystick
    ///
    /// The waiting options block on the module side, so the reply may take
    /// longer than the response budget allows; size `response_retries`
    /// accordingly.
    pub fn joystick(&mut self, option: JoystickOption) -> Result<JoystickState> {
        if !option.is_valid() {
            return Err(Error::InvalidParameter);
        }
        self.request(|e| {
            e.bytes(&[system::JOYSTICK, option.to_byte()])?;
            Ok(())
        })?;
        self.read_joystick_state(0)
    }

    /// Wait up to `wait_ms` for a press or release
    ///
    /// A timeout on the module side reads back as [`JoystickState::Idle`].
    /// The reply budget is extended by `wait_ms` so the host does not give
    /// up while the module is still waiting.
    pub fn joystick_wait(&mut self, option: JoystickOption, wait_ms: u16) -> Result<JoystickState> {
        if !option.allows_timeout() {
            return Err(Error::InvalidParameter);
        }
        self.request(|e| {
            e.bytes(&[system::JOYSTICK_WAIT, option.to_byte()])?
                .short(wait_ms)?;
            Ok(())
        })?;
        self.read_joystick_state(u32::from(wait_ms))
    }

    fn read_joystick_state(&mut self, wait_ms: u32) -> Result<JoystickState> {
        let byte = self.reader().with_extra_wait(wait_ms).read_byte()?;
        JoystickState::try_from(byte).map_err(|_| Error::UnexpectedResponse(byte))
    }

    fn control(&mut self, mode: u8, value: u8) -> Result<()> {
        self.command(|e| {
            e.bytes(&[system::CTLFUNC, mode, value])?;
            Ok(())
        })
    }

    fn sleep(&mut self, mode: u8) -> Result<()> {
        self.command(|e| {
            e.bytes(&[system::SLEEP, mode, PRM_NA])?;
            Ok(())
        })
    }
}
