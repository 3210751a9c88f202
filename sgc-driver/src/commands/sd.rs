//! SD card commands
//!
//! All SD commands are two-byte opcodes behind the extended prefix. Raw
//! byte access goes through the module's address pointer; sector access
//! uses 24-bit sector numbers.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::String;
use sgc_hal::SerialPort;
use sgc_protocol::opcodes::graphics::IMAGE_16BIT;
use sgc_protocol::opcodes::sd::{self, EXTENDED, MAX_SECTOR_ADDRESS, SECTOR_SIZE};
use sgc_protocol::{Color, FontSize, Opacity, NAK};

use super::TextStyle;
use crate::error::{Error, Result};
use crate::reader::read_terminated;
use crate::session::Display;

/// A multi-sector wipe stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WipeError {
    pub error: Error,
    /// Sectors written before the failure
    pub sectors_wiped: u32,
}

/// Video stored as consecutive raw frames on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoClip {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Pause between frames (ms)
    pub frame_delay_ms: u8,
    pub frame_count: u16,
    /// First sector of the clip
    pub sector: u32,
}

/// Height of the wipe progress strip at the bottom of the screen
const PROGRESS_STRIP_HEIGHT: u16 = 9;

fn check_sector(sector: u32) -> Result<()> {
    if sector > MAX_SECTOR_ADDRESS {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    /// Initialize the memory card
    pub fn sd_initialize(&mut self) -> Result<()> {
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::INITIALIZE])?;
            Ok(())
        })
    }

    /// Move the byte read/write pointer
    pub fn sd_set_address_pointer(&mut self, address: u32) -> Result<()> {
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::SET_ADDRESS])?.long(address)?;
            Ok(())
        })
    }

    /// Read the byte at the address pointer and advance it
    pub fn sd_read_byte(&mut self) -> Result<u8> {
        self.request(|e| {
            e.bytes(&[EXTENDED, sd::READ_BYTE])?;
            Ok(())
        })?;
        self.reader().read_byte()
    }

    pub fn sd_read_short(&mut self) -> Result<u16> {
        let high = self.sd_read_byte()?;
        let low = self.sd_read_byte()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn sd_read_long(&mut self) -> Result<u32> {
        let high = self.sd_read_short()?;
        let low = self.sd_read_short()?;
        Ok((u32::from(high) << 16) | u32::from(low))
    }

    /// Read a NUL-terminated string stored at the address pointer
    ///
    /// One read command per byte. Fails with [`Error::Incomplete`] if `buf`
    /// fills before the terminator.
    pub fn sd_read_string(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_terminated(buf, || self.sd_read_byte())
    }

    /// Write one byte at the address pointer and advance it
    pub fn sd_write_byte(&mut self, value: u8) -> Result<()> {
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::WRITE_BYTE, value])?;
            Ok(())
        })
    }

    /// Write bytes one command at a time, stopping at the first failure
    pub fn sd_write_bytes(&mut self, values: &[u8]) -> Result<()> {
        values.iter().try_for_each(|&value| self.sd_write_byte(value))
    }

    pub fn sd_write_short(&mut self, value: u16) -> Result<()> {
        self.sd_write_bytes(&value.to_be_bytes())
    }

    pub fn sd_write_shorts(&mut self, values: &[u16]) -> Result<()> {
        values.iter().try_for_each(|&value| self.sd_write_short(value))
    }

    pub fn sd_write_long(&mut self, value: u32) -> Result<()> {
        self.sd_write_bytes(&value.to_be_bytes())
    }

    pub fn sd_write_longs(&mut self, values: &[u32]) -> Result<()> {
        values.iter().try_for_each(|&value| self.sd_write_long(value))
    }

    /// Write a string and its terminator
    pub fn sd_write_str(&mut self, string: &str) -> Result<()> {
        let bytes = string.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.sd_write_bytes(&bytes[..end])?;
        self.sd_write_byte(0)
    }

    pub fn sd_read_sector(&mut self, sector: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        check_sector(sector)?;
        self.request(|e| {
            e.bytes(&[EXTENDED, sd::READ_SECTOR])?.sector_address(sector)?;
            Ok(())
        })?;
        self.delay_ms(self.config().timing.sector_read_delay_ms);
        self.reader()
            .read_exact(buf)
            .inspect_err(|e| warn!("sector {} read failed: {:?}", sector, e))
    }

    pub fn sd_write_sector(&mut self, sector: u32, data: &[u8; SECTOR_SIZE]) -> Result<()> {
        check_sector(sector)?;
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::WRITE_SECTOR])?
                .sector_address(sector)?
                .bytes(data)?;
            Ok(())
        })
    }

    /// Fill one sector with `fill`
    pub fn sd_wipe_sector(&mut self, sector: u32, fill: u8) -> Result<()> {
        self.sd_write_sector(sector, &[fill; SECTOR_SIZE])
    }

    /// Fill `count` sectors starting at `start`, returning how many were written
    ///
    /// With `show_progress`, a progress strip and the current sector are
    /// drawn along the bottom of the screen, ending with the number of
    /// sectors wiped. Drawing failures do not stop the wipe.
    pub fn sd_wipe_sectors(
        &mut self,
        start: u32,
        count: u32,
        fill: u8,
        show_progress: bool,
    ) -> core::result::Result<u32, WipeError> {
        let fail = |error| WipeError {
            error,
            sectors_wiped: 0,
        };
        self.ensure_ready().map_err(fail)?;
        if count == 0 {
            return Ok(0);
        }
        if start > MAX_SECTOR_ADDRESS || count - 1 > MAX_SECTOR_ADDRESS - start {
            return Err(fail(Error::InvalidParameter));
        }

        let block = [fill; SECTOR_SIZE];
        let mut wiped = 0;
        for sector in start..start + count {
            if show_progress {
                self.show_wipe_progress(sector, (wiped * 100 / count) as u8);
            }
            self.sd_write_sector(sector, &block).map_err(|error| {
                warn!("wipe stopped at sector {}: {:?}", sector, error);
                WipeError {
                    error,
                    sectors_wiped: wiped,
                }
            })?;
            wiped += 1;
        }

        if show_progress {
            self.show_wipe_progress(wiped, 100);
        }
        info!("wiped {} sectors from {}", wiped, start);
        Ok(wiped)
    }

    fn show_wipe_progress(&mut self, value: u32, percent: u8) {
        let (width, height) = (self.width(), self.height());
        if height < PROGRESS_STRIP_HEIGHT {
            return;
        }
        let top = height - PROGRESS_STRIP_HEIGHT;
        let (fore, back) = (self.config().progress_fore, self.config().progress_back);

        if let Err(e) =
            self.draw_progress_bar(0, top, width, PROGRESS_STRIP_HEIGHT, percent, fore, back)
        {
            debug!("progress bar not drawn: {:?}", e);
        }

        let mut label: String<24> = String::new();
        if write!(label, "s:{} ({}%)", value, percent).is_err() {
            return;
        }
        let style = TextStyle::new()
            .size(FontSize::Small)
            .opacity(Opacity::Transparent)
            .proportional(true);
        if let Err(e) = self.draw_text_graphic(1, top + 1, &label, 1, 1, Color::WHITE, style) {
            debug!("progress label not drawn: {:?}", e);
        }
    }

    /// Save the whole screen starting at `sector`
    pub fn sd_write_screen(&mut self, sector: u32) -> Result<()> {
        self.ensure_ready()?;
        let (width, height) = (self.width(), self.height());
        self.sd_write_screen_region(sector, 0, 0, width, height)
    }

    /// Save a screen region as raw 16-bit pixels starting at `sector`
    pub fn sd_write_screen_region(
        &mut self,
        sector: u32,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        check_sector(sector)?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::SCREENSHOT])?
                .spatial(x)?
                .spatial(y)?
                .spatial(width)?
                .spatial(height)?
                .sector_address(sector)?;
            Ok(())
        })
    }

    /// Show a full-screen image saved by [`sd_write_screen`](Self::sd_write_screen)
    pub fn sd_draw_screen(&mut self, sector: u32) -> Result<()> {
        self.ensure_ready()?;
        let (width, height) = (self.width(), self.height());
        self.sd_draw_image(sector, 0, 0, width, height)
    }

    /// Show a 16-bit image stored at `sector`
    pub fn sd_draw_image(
        &mut self,
        sector: u32,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        check_sector(sector)?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::DISPLAY_IMAGE])?
                .spatial(x)?
                .spatial(y)?
                .spatial(width)?
                .spatial(height)?
                .byte(IMAGE_16BIT)?
                .sector_address(sector)?;
            Ok(())
        })
    }

    /// Display an object (image or video with its own header) at a byte address
    pub fn sd_run_object(&mut self, address: u32) -> Result<()> {
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::DISPLAY_OBJECT])?.long(address)?;
            Ok(())
        })
    }

    /// Play raw 16-bit video frames
    pub fn sd_play_video(&mut self, clip: VideoClip) -> Result<()> {
        check_sector(clip.sector)?;
        if clip.width == 0 || clip.height == 0 || clip.frame_count == 0 {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.bytes(&[EXTENDED, sd::DISPLAY_VIDEO])?
                .spatial(clip.x)?
                .spatial(clip.y)?
                .spatial(clip.width)?
                .spatial(clip.height)?
                .bytes(&[IMAGE_16BIT, clip.frame_delay_ms])?
                .short(clip.frame_count)?
                .sector_address(clip.sector)?;
            Ok(())
        })
    }

    /// Run a command script stored at a byte address
    ///
    /// Scripts may run for a long time and may not answer at all, so
    /// silence counts as success; only an explicit NAK is an error.
    pub fn sd_run_script(&mut self, address: u32) -> Result<()> {
        self.request(|e| {
            e.bytes(&[EXTENDED, sd::RUN_SCRIPT])?.long(address)?;
            Ok(())
        })?;
        match self.reader().read_byte() {
            Ok(NAK) => Err(Error::Nak),
            Ok(_) | Err(Error::Timeout) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{new_display, ready_display, ready_picaso_display, test_config};
    use sgc_protocol::ACK;

    /// Prefix, opcode, 3 address bytes and the sector payload
    const SECTOR_WRITE_LEN: usize = 5 + SECTOR_SIZE;

    #[test]
    fn test_address_pointer_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(6);

        display.sd_set_address_pointer(0x0102_0304).unwrap();
        assert_eq!(port.written(), [0x40, 0x41, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_read_long_uses_four_byte_reads() {
        let (mut display, port, _pin) = ready_display();
        for byte in [0xDE, 0xAD, 0xBE, 0xEF] {
            port.expect(2, &[byte]);
        }

        assert_eq!(display.sd_read_long(), Ok(0xDEAD_BEEF));
        assert_eq!(port.written(), [0x40u8, 0x72].repeat(4));
    }

    #[test]
    fn test_read_string() {
        let (mut display, port, _pin) = ready_display();
        for byte in *b"ok\0" {
            port.expect(2, &[byte]);
        }

        let mut buf = [0u8; 8];
        assert_eq!(display.sd_read_string(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ok");
    }

    #[test]
    fn test_write_str_appends_terminator() {
        let (mut display, port, _pin) = ready_display();
        for _ in 0..3 {
            port.expect_ack(3);
        }

        display.sd_write_str("hi").unwrap();
        assert_eq!(
            port.written(),
            [0x40, 0x77, b'h', 0x40, 0x77, b'i', 0x40, 0x77, 0x00]
        );
    }

    #[test]
    fn test_write_bytes_stops_on_failure() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(3);
        port.expect(3, &[NAK]);

        assert_eq!(display.sd_write_bytes(&[1, 2, 3]), Err(Error::Nak));
        assert_eq!(port.written().len(), 6);
    }

    #[test]
    fn test_read_sector() {
        let (mut display, port, _pin) = ready_display();
        let payload: std::vec::Vec<u8> = (0..SECTOR_SIZE).map(|i| i as u8).collect();
        port.expect(5, &payload);

        let mut buf = [0u8; SECTOR_SIZE];
        display.sd_read_sector(0x01_0203, &mut buf).unwrap();
        assert_eq!(port.written(), [0x40, 0x52, 0x01, 0x02, 0x03]);
        assert_eq!(buf[..], payload[..]);
    }

    #[test]
    fn test_sector_address_limit() {
        let (mut display, port, _pin) = ready_display();
        let mut buf = [0u8; SECTOR_SIZE];

        assert_eq!(
            display.sd_read_sector(0x0100_0000, &mut buf),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            display.sd_wipe_sectors(0xFF_FFFF, 2, 0, false),
            Err(WipeError {
                error: Error::InvalidParameter,
                sectors_wiped: 0
            })
        );
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_wipe_sectors_walks_the_range() {
        let (mut display, port, _pin) = ready_display();
        for _ in 0..3 {
            port.expect_ack(SECTOR_WRITE_LEN);
        }

        assert_eq!(display.sd_wipe_sectors(10, 3, 0xFF, false), Ok(3));
        let written = port.written();
        let addresses: std::vec::Vec<u8> = written
            .chunks(SECTOR_WRITE_LEN)
            .map(|frame| frame[4])
            .collect();
        assert_eq!(addresses, [10, 11, 12]);
        assert!(written.chunks(SECTOR_WRITE_LEN).all(|frame| frame[5..].iter().all(|&b| b == 0xFF)));
    }

    #[test]
    fn test_wipe_reports_progress_on_failure() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(SECTOR_WRITE_LEN);
        port.expect(SECTOR_WRITE_LEN, &[NAK]);

        assert_eq!(
            display.sd_wipe_sectors(0, 4, 0x00, false),
            Err(WipeError {
                error: Error::Nak,
                sectors_wiped: 1
            })
        );
    }

    #[test]
    fn test_wipe_with_progress_display() {
        let (mut display, port, _pin) = ready_display();
        // Empty bar, "s:5 (0%)", the sector, full bar, "s:5 (100%)"
        port.expect_ack(7);
        port.expect_ack(17);
        port.expect_ack(SECTOR_WRITE_LEN);
        port.expect_ack(7);
        port.expect_ack(19);

        assert_eq!(display.sd_wipe_sectors(5, 1, 0x00, true), Ok(1));
        assert_eq!(port.pending_exchanges(), 0);

        let written = port.written();
        // Background strip spans the whole width at the bottom
        assert_eq!(written[..5], [0x72, 0, 119, 127, 127]);
        assert_eq!(&written[7 + 8..7 + 13], b"s:5 (");
        // The closing label counts sectors instead of naming one
        let end = written.len();
        assert_eq!(&written[end - 11..end - 1], b"s:1 (100%)");
    }

    #[test]
    fn test_write_sector_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(SECTOR_WRITE_LEN);

        let mut data = [0u8; SECTOR_SIZE];
        data[0] = 0xAA;
        data[SECTOR_SIZE - 1] = 0x55;
        display.sd_write_sector(0x0A_0B0C, &data).unwrap();

        let written = port.written();
        assert_eq!(written[..6], [0x40, 0x57, 0x0A, 0x0B, 0x0C, 0xAA]);
        assert_eq!(written[SECTOR_WRITE_LEN - 1], 0x55);
    }

    #[test]
    fn test_screen_region_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(9);

        display.sd_write_screen_region(0x30, 1, 2, 30, 40).unwrap();
        assert_eq!(port.written(), [0x40, 0x43, 1, 2, 30, 40, 0x00, 0x00, 0x30]);
    }

    #[test]
    fn test_picaso_screen_region_frame() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(13);

        display.sd_write_screen_region(0x30, 1, 2, 300, 200).unwrap();
        assert_eq!(
            port.written(),
            [0x40, 0x43, 0x00, 0x01, 0x00, 0x02, 0x01, 0x2C, 0x00, 0xC8, 0x00, 0x00, 0x30]
        );
    }

    #[test]
    fn test_picaso_write_screen_covers_display() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(13);

        display.sd_write_screen(0x01_0000).unwrap();
        assert_eq!(
            port.written(),
            [0x40, 0x43, 0x00, 0x00, 0x00, 0x00, 0x01, 0x40, 0x00, 0xF0, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_run_object_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(6);

        display.sd_run_object(0x0001_2345).unwrap();
        assert_eq!(port.written(), [0x40, 0x4F, 0x00, 0x01, 0x23, 0x45]);
    }

    #[test]
    fn test_picaso_run_object_frame() {
        // Byte addresses are always four bytes, whatever the coordinate width
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(6);

        display.sd_run_object(0x0001_2345).unwrap();
        assert_eq!(port.written(), [0x40, 0x4F, 0x00, 0x01, 0x23, 0x45]);
    }

    #[test]
    fn test_screen_commands_need_initialize() {
        let (mut display, port, _pin) = new_display(test_config());

        assert_eq!(display.sd_write_screen(0), Err(Error::NotInitialized));
        assert_eq!(display.sd_draw_screen(0), Err(Error::NotInitialized));
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_draw_image_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(10);

        display.sd_draw_screen(0x20).unwrap();
        assert_eq!(
            port.written(),
            [0x40, 0x49, 0, 0, 128, 128, 0x10, 0x00, 0x00, 0x20]
        );
    }

    #[test]
    fn test_play_video_frame() {
        let clip = VideoClip {
            x: 0,
            y: 0,
            width: 64,
            height: 32,
            frame_delay_ms: 40,
            frame_count: 300,
            sector: 0x100,
        };
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(13);

        display.sd_play_video(clip).unwrap();
        assert_eq!(
            port.written(),
            [0x40, 0x56, 0, 0, 64, 32, 0x10, 40, 0x01, 0x2C, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_run_script_replies() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(display.sd_run_script(0x200), Ok(()));

        port.expect(6, &[ACK]);
        assert_eq!(display.sd_run_script(0x200), Ok(()));

        port.expect(6, &[NAK]);
        assert_eq!(display.sd_run_script(0x200), Err(Error::Nak));
    }
}
