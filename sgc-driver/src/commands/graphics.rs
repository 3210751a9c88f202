//! Drawing primitives and user bitmaps

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use sgc_hal::SerialPort;
use sgc_protocol::opcodes::graphics;
use sgc_protocol::{Color, Rgb565, ShapeFill};

use crate::error::{Error, Result};
use crate::session::Display;

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    /// Read back one pixel
    pub fn read_pixel(&mut self, x: u16, y: u16) -> Result<Rgb565> {
        self.ensure_ready()?;
        if x >= self.width() || y >= self.height() {
            return Err(Error::InvalidParameter);
        }
        self.request(|e| {
            e.byte(graphics::READ_PIXEL)?.spatial(x)?.spatial(y)?;
            Ok(())
        })?;
        self.reader().read_short().map(Rgb565)
    }

    pub fn read_pixel_color(&mut self, x: u16, y: u16) -> Result<Color> {
        self.read_pixel(x, y).map(Color::from_rgb565)
    }

    pub fn draw_pixel(&mut self, x: u16, y: u16, color: impl Into<Rgb565>) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::PIXEL)?.spatial(x)?.spatial(y)?.color(color)?;
            Ok(())
        })
    }

    pub fn draw_line(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: impl Into<Rgb565>,
    ) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::LINE)?
                .spatial(x1)?
                .spatial(y1)?
                .spatial(x2)?
                .spatial(y2)?
                .color(color)?;
            Ok(())
        })
    }

    /// Rectangle between two corners, filled or outlined per [`set_fill`](Self::set_fill)
    pub fn draw_rectangle(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: impl Into<Rgb565>,
    ) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::RECTANGLE)?
                .spatial(x1)?
                .spatial(y1)?
                .spatial(x2)?
                .spatial(y2)?
                .color(color)?;
            Ok(())
        })
    }

    /// Rectangle from its top-left corner and size; both sides must be non-zero
    pub fn draw_rectangle_wh(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: impl Into<Rgb565>,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }
        self.draw_rectangle(
            x,
            y,
            x.saturating_add(width - 1),
            y.saturating_add(height - 1),
            color,
        )
    }

    /// Triangle through three vertices given counter-clockwise
    pub fn draw_triangle(
        &mut self,
        a: (u16, u16),
        b: (u16, u16),
        c: (u16, u16),
        color: impl Into<Rgb565>,
    ) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::TRIANGLE)?;
            for (x, y) in [a, b, c] {
                e.spatial(x)?.spatial(y)?;
            }
            e.color(color)?;
            Ok(())
        })
    }

    /// Outline through up to seven vertices
    ///
    /// One vertex draws a pixel and two draw a line, with exactly the bytes
    /// those commands would send.
    pub fn draw_polygon(&mut self, vertices: &[(u16, u16)], color: impl Into<Rgb565>) -> Result<()> {
        let color = color.into();
        match *vertices {
            [] => Err(Error::InvalidParameter),
            [(x, y)] => self.draw_pixel(x, y, color),
            [(x1, y1), (x2, y2)] => self.draw_line(x1, y1, x2, y2, color),
            _ if vertices.len() > graphics::MAX_POLYGON_VERTICES => Err(Error::InvalidParameter),
            _ => self.command(|e| {
                e.bytes(&[graphics::POLYGON, vertices.len() as u8])?;
                for &(x, y) in vertices {
                    e.spatial(x)?.spatial(y)?;
                }
                e.color(color)?;
                Ok(())
            }),
        }
    }

    pub fn draw_circle(&mut self, x: u16, y: u16, radius: u16, color: impl Into<Rgb565>) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::CIRCLE)?
                .spatial(x)?
                .spatial(y)?
                .spatial(radius)?
                .color(color)?;
            Ok(())
        })
    }

    /// Choose solid or outline drawing for rectangles, triangles and circles
    pub fn set_fill(&mut self, fill: ShapeFill) -> Result<()> {
        self.command(|e| {
            e.bytes(&[graphics::SET_FILL, fill.to_byte()])?;
            Ok(())
        })
    }

    /// Copy a screen region to another position
    pub fn screen_copy_paste(
        &mut self,
        source: (u16, u16),
        dest: (u16, u16),
        width: u16,
        height: u16,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.byte(graphics::COPY_PASTE)?
                .spatial(source.0)?
                .spatial(source.1)?
                .spatial(dest.0)?
                .spatial(dest.1)?
                .spatial(width)?
                .spatial(height)?;
            Ok(())
        })
    }

    /// Set the color used by `clear()` without repainting
    pub fn set_background(&mut self, color: impl Into<Rgb565>) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::SET_BACKGROUND)?.color(color)?;
            Ok(())
        })
    }

    /// Set the background color and repaint the screen with it
    pub fn replace_background(&mut self, color: impl Into<Rgb565>) -> Result<()> {
        let color = color.into();
        self.command(|e| {
            e.byte(graphics::REPLACE_BACKGROUND)?.color(color)?;
            Ok(())
        })
    }

    /// Swap one color for another inside a region
    pub fn replace_color(
        &mut self,
        top_left: (u16, u16),
        bottom_right: (u16, u16),
        old: impl Into<Rgb565>,
        new: impl Into<Rgb565>,
    ) -> Result<()> {
        let (old, new) = (old.into(), new.into());
        self.command(|e| {
            e.byte(graphics::REPLACE_COLOR)?
                .spatial(top_left.0)?
                .spatial(top_left.1)?
                .spatial(bottom_right.0)?
                .spatial(bottom_right.1)?
                .color(old)?
                .color(new)?;
            Ok(())
        })
    }

    /// Store an 8x8 monochrome glyph in one of the 32 slots
    pub fn add_user_bitmap(
        &mut self,
        index: u8,
        data: &[u8; graphics::USER_BITMAP_SIZE],
    ) -> Result<()> {
        if usize::from(index) >= graphics::MAX_USER_BITMAPS {
            return Err(Error::InvalidParameter);
        }
        self.command(|e| {
            e.bytes(&[graphics::ADD_USER_BITMAP, index])?.bytes(data)?;
            Ok(())
        })?;
        self.user_bitmaps |= 1 << index;
        Ok(())
    }

    /// Draw a previously stored glyph
    pub fn draw_user_bitmap(
        &mut self,
        index: u8,
        x: u16,
        y: u16,
        color: impl Into<Rgb565>,
    ) -> Result<()> {
        if !self.is_user_bitmap_loaded(index) {
            return Err(Error::InvalidParameter);
        }
        let color = color.into();
        self.command(|e| {
            e.bytes(&[graphics::DRAW_USER_BITMAP, index])?
                .spatial(x)?
                .spatial(y)?
                .color(color)?;
            Ok(())
        })
    }

    pub fn is_user_bitmap_loaded(&self, index: u8) -> bool {
        usize::from(index) < graphics::MAX_USER_BITMAPS && self.user_bitmaps & (1 << index) != 0
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::mock::{ready_display, ready_picaso_display};
    use sgc_protocol::{Color, Rgb565, NAK};

    const RED: Rgb565 = Rgb565(0xF800);

    #[test]
    fn test_draw_pixel_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(5);

        assert_eq!(display.draw_pixel(5, 10, RED), Ok(()));
        assert_eq!(port.written(), [0x50, 5, 10, 0xF8, 0x00]);
        assert_eq!(port.unread(), 0);
    }

    #[test]
    fn test_picaso_uses_two_byte_coordinates() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(7);

        display.draw_pixel(300, 10, RED).unwrap();
        assert_eq!(port.written(), [0x50, 0x01, 0x2C, 0x00, 0x0A, 0xF8, 0x00]);
    }

    #[test]
    fn test_polygon_degenerate_cases() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(5);
        port.expect_ack(5);

        display.draw_polygon(&[(3, 4)], RED).unwrap();
        display.draw_pixel(3, 4, RED).unwrap();
        let written = port.take_written();
        assert_eq!(written[..5], written[5..]);

        port.expect_ack(7);
        port.expect_ack(7);
        display.draw_polygon(&[(1, 2), (30, 40)], RED).unwrap();
        display.draw_line(1, 2, 30, 40, RED).unwrap();
        let written = port.take_written();
        assert_eq!(written[..7], written[7..]);
    }

    #[test]
    fn test_polygon_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(10);

        display.draw_polygon(&[(0, 0), (10, 0), (5, 8)], RED).unwrap();
        assert_eq!(port.written(), [0x67, 3, 0, 0, 10, 0, 5, 8, 0xF8, 0x00]);
    }

    #[test]
    fn test_polygon_vertex_limits() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(display.draw_polygon(&[], RED), Err(Error::InvalidParameter));
        assert_eq!(
            display.draw_polygon(&[(0, 0); 8], RED),
            Err(Error::InvalidParameter)
        );
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_rectangle_wh_rejects_empty() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(display.draw_rectangle_wh(0, 0, 0, 5, RED), Err(Error::InvalidParameter));
        assert_eq!(display.draw_rectangle_wh(0, 0, 5, 0, RED), Err(Error::InvalidParameter));
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_rectangle_wh_corners() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(7);

        display.draw_rectangle_wh(10, 20, 5, 1, RED).unwrap();
        assert_eq!(port.written(), [0x72, 10, 20, 14, 20, 0xF8, 0x00]);
    }

    #[test]
    fn test_read_pixel() {
        let (mut display, port, _pin) = ready_display();
        port.expect(3, &[0x07, 0xE0]);

        assert_eq!(display.read_pixel_color(1, 2), Ok(Color::from_rgb565(Rgb565(0x07E0))));
        assert_eq!(port.written(), [0x52, 1, 2]);
    }

    #[test]
    fn test_read_pixel_outside_screen() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(display.read_pixel(128, 0), Err(Error::InvalidParameter));
        assert_eq!(display.read_pixel(0, 128), Err(Error::InvalidParameter));
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_user_bitmap_slots() {
        let (mut display, port, _pin) = ready_display();
        let glyph = [0x18, 0x24, 0x42, 0x81, 0x81, 0x42, 0x24, 0x18];

        assert_eq!(display.draw_user_bitmap(3, 0, 0, RED), Err(Error::InvalidParameter));
        assert_eq!(display.add_user_bitmap(32, &glyph), Err(Error::InvalidParameter));

        port.expect(10, &[NAK]);
        assert_eq!(display.add_user_bitmap(3, &glyph), Err(Error::Nak));
        assert!(!display.is_user_bitmap_loaded(3));

        port.expect_ack(10);
        display.add_user_bitmap(3, &glyph).unwrap();
        assert!(display.is_user_bitmap_loaded(3));

        port.take_written();
        port.expect_ack(6);
        display.draw_user_bitmap(3, 8, 16, RED).unwrap();
        assert_eq!(port.written(), [0x44, 3, 8, 16, 0xF8, 0x00]);
    }

    #[test]
    fn test_replace_color_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(9);

        display
            .replace_color((0, 0), (127, 127), Rgb565(0xFFFF), Rgb565(0x0000))
            .unwrap();
        assert_eq!(port.written(), [0x6B, 0, 0, 127, 127, 0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_circle_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(6);

        display.draw_circle(64, 32, 20, RED).unwrap();
        assert_eq!(port.written(), [0x43, 64, 32, 20, 0xF8, 0x00]);
    }

    #[test]
    fn test_picaso_circle_frame() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(9);

        display.draw_circle(160, 120, 300, RED).unwrap();
        assert_eq!(
            port.written(),
            [0x43, 0x00, 0xA0, 0x00, 0x78, 0x01, 0x2C, 0xF8, 0x00]
        );
    }

    #[test]
    fn test_triangle_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(9);

        display.draw_triangle((10, 1), (2, 20), (30, 25), RED).unwrap();
        assert_eq!(port.written(), [0x47, 10, 1, 2, 20, 30, 25, 0xF8, 0x00]);
    }

    #[test]
    fn test_picaso_triangle_frame() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(15);

        display.draw_triangle((300, 1), (2, 200), (256, 25), RED).unwrap();
        assert_eq!(
            port.written(),
            [
                0x47, 0x01, 0x2C, 0x00, 0x01, //
                0x00, 0x02, 0x00, 0xC8, //
                0x01, 0x00, 0x00, 0x19, //
                0xF8, 0x00,
            ]
        );
    }

    #[test]
    fn test_copy_paste_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(7);

        display.screen_copy_paste((1, 2), (50, 60), 8, 9).unwrap();
        assert_eq!(port.written(), [0x63, 1, 2, 50, 60, 8, 9]);
    }

    #[test]
    fn test_picaso_copy_paste_frame() {
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(13);

        display.screen_copy_paste((1, 2), (260, 3), 40, 300).unwrap();
        assert_eq!(
            port.written(),
            [0x63, 0x00, 0x01, 0x00, 0x02, 0x01, 0x04, 0x00, 0x03, 0x00, 0x28, 0x01, 0x2C]
        );
    }

    #[test]
    fn test_copy_paste_rejects_empty_region() {
        let (mut display, port, _pin) = ready_display();

        assert_eq!(
            display.screen_copy_paste((0, 0), (10, 10), 0, 5),
            Err(Error::InvalidParameter)
        );
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_set_background_frame() {
        let (mut display, port, _pin) = ready_display();
        port.expect_ack(3);

        display.set_background(Rgb565(0x001F)).unwrap();
        assert_eq!(port.written(), [0x4B, 0x00, 0x1F]);
    }

    #[test]
    fn test_picaso_set_background_frame() {
        // Colors stay two bytes regardless of coordinate width
        let (mut display, port, _pin) = ready_picaso_display();
        port.expect_ack(3);

        display.set_background(Color::WHITE).unwrap();
        assert_eq!(port.written(), [0x4B, 0xFF, 0xFF]);
    }
}
