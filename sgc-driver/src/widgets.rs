//! Composite drawing built from the primitive commands

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use sgc_hal::SerialPort;
use sgc_protocol::Rgb565;

use crate::error::{Error, Result};
use crate::session::Display;

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    /// Horizontal progress bar, filled from the left
    ///
    /// `percent` above 100 draws a full bar. The filled and empty parts are
    /// separate rectangles; a part with no width is not sent.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_progress_bar(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        percent: u8,
        fore: impl Into<Rgb565>,
        back: impl Into<Rgb565>,
    ) -> Result<()> {
        self.ensure_ready()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }

        let percent = percent.min(100);
        let filled = (u32::from(width) * u32::from(percent) / 100) as u16;

        if filled > 0 {
            self.draw_rectangle_wh(x, y, filled, height, fore)?;
        }
        if filled < width {
            self.draw_rectangle_wh(x.saturating_add(filled), y, width - filled, height, back)?;
        }
        Ok(())
    }

    /// Progress bar in the configured colors
    pub fn draw_progress_bar_default(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        percent: u8,
    ) -> Result<()> {
        let (fore, back) = (self.config().progress_fore, self.config().progress_back);
        self.draw_progress_bar(x, y, width, height, percent, fore, back)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::mock::ready_display;
    use sgc_protocol::Rgb565;

    const FORE: Rgb565 = Rgb565(0x1111);
    const BACK: Rgb565 = Rgb565(0x2222);

    #[test]
    fn test_split_bar() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(7);
        port.expect_ack(7);

        display.draw_progress_bar(10, 20, 50, 8, 40, FORE, BACK).unwrap();
        assert_eq!(
            port.written(),
            [
                0x72, 10, 20, 29, 27, 0x11, 0x11, //
                0x72, 30, 20, 59, 27, 0x22, 0x22,
            ]
        );
    }

    #[test]
    fn test_empty_and_full_skip_zero_width_parts() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(7);
        port.expect_ack(7);

        display.draw_progress_bar(0, 0, 50, 8, 0, FORE, BACK).unwrap();
        assert_eq!(port.take_written()[5..], [0x22, 0x22]);

        display.draw_progress_bar(0, 0, 50, 8, 250, FORE, BACK).unwrap();
        assert_eq!(port.take_written()[5..], [0x11, 0x11]);
    }

    #[test]
    fn test_degenerate_bar_rejected() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(
            display.draw_progress_bar(0, 0, 0, 8, 50, FORE, BACK),
            Err(Error::InvalidParameter)
        );
        assert!(port.written().is_empty());
    }
}
