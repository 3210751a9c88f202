//! Font state and string drawing
//!
//! Font size and opacity live on the module and are cached here once
//! acknowledged. Proportional spacing, button opacity and the default
//! colors are host-side only; they are folded into each string command.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use sgc_hal::SerialPort;
use sgc_protocol::opcodes::text;
use sgc_protocol::{ButtonState, FontSize, Opacity, Rgb565};

use crate::error::{Error, Result};
use crate::session::Display;

/// Per-call overrides for string commands
///
/// `None` fields fall back to the session's current font settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    pub size: Option<FontSize>,
    pub opacity: Option<Opacity>,
    pub proportional: Option<bool>,
}

impl TextStyle {
    pub const fn new() -> Self {
        Self {
            size: None,
            opacity: None,
            proportional: None,
        }
    }

    pub const fn size(mut self, size: FontSize) -> Self {
        self.size = Some(size);
        self
    }

    pub const fn opacity(mut self, opacity: Opacity) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub const fn proportional(mut self, proportional: bool) -> Self {
        self.proportional = Some(proportional);
        self
    }
}

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    pub fn set_font(&mut self, size: FontSize) -> Result<()> {
        self.command(|e| {
            e.bytes(&[text::SET_FONT, size.to_byte()])?;
            Ok(())
        })?;
        self.font_size = size;
        Ok(())
    }

    pub fn set_font_opacity(&mut self, opacity: Opacity) -> Result<()> {
        self.command(|e| {
            e.bytes(&[text::SET_OPACITY, opacity.to_byte()])?;
            Ok(())
        })?;
        self.font_opacity = opacity;
        Ok(())
    }

    pub fn set_font_proportional(&mut self, proportional: bool) {
        self.font_proportional = proportional;
    }

    pub fn set_button_opacity(&mut self, opacity: Opacity) {
        self.button_opacity = opacity;
    }

    pub fn set_font_color(&mut self, color: impl Into<Rgb565>) {
        self.font_color = color.into();
    }

    pub fn set_button_color(&mut self, color: impl Into<Rgb565>) {
        self.button_color = color.into();
    }

    pub fn set_button_font_color(&mut self, color: impl Into<Rgb565>) {
        self.button_font_color = color.into();
    }

    /// Text at a character cell
    pub fn draw_text(
        &mut self,
        column: u8,
        row: u8,
        string: &str,
        color: impl Into<Rgb565>,
        style: TextStyle,
    ) -> Result<()> {
        let color = color.into();
        let font = self.font_byte(&style);
        self.with_opacity(style.opacity, |display| {
            display.command(|e| {
                e.bytes(&[text::STRING_TEXT, column, row, font])?
                    .color(color)?
                    .text(string)?
                    .byte(0)?;
                Ok(())
            })
        })
    }

    pub fn draw_text_default(&mut self, column: u8, row: u8, string: &str) -> Result<()> {
        self.draw_text(column, row, string, self.font_color, TextStyle::new())
    }

    /// Text at a pixel position, scaled by whole multiples
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_graphic(
        &mut self,
        x: u16,
        y: u16,
        string: &str,
        width_mult: u8,
        height_mult: u8,
        color: impl Into<Rgb565>,
        style: TextStyle,
    ) -> Result<()> {
        if width_mult == 0 || height_mult == 0 {
            return Err(Error::InvalidParameter);
        }
        let color = color.into();
        let font = self.font_byte(&style);
        self.with_opacity(style.opacity, |display| {
            display.command(|e| {
                e.byte(text::STRING_GRAPHIC)?
                    .spatial(x)?
                    .spatial(y)?
                    .byte(font)?
                    .color(color)?
                    .bytes(&[width_mult, height_mult])?
                    .text(string)?
                    .byte(0)?;
                Ok(())
            })
        })
    }

    pub fn draw_text_graphic_default(&mut self, x: u16, y: u16, string: &str) -> Result<()> {
        self.draw_text_graphic(x, y, string, 1, 1, self.font_color, TextStyle::new())
    }

    /// Text inside a raised or pressed button
    ///
    /// Buttons use the button opacity rather than the font opacity; the
    /// module only has one, so it is switched for the draw and restored.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_button(
        &mut self,
        x: u16,
        y: u16,
        string: &str,
        width_mult: u8,
        height_mult: u8,
        state: ButtonState,
        font_color: impl Into<Rgb565>,
        button_color: impl Into<Rgb565>,
        style: TextStyle,
    ) -> Result<()> {
        if width_mult == 0 || height_mult == 0 {
            return Err(Error::InvalidParameter);
        }
        let (font_color, button_color) = (font_color.into(), button_color.into());
        let font = self.font_byte(&style);
        let opacity = style.opacity.unwrap_or(self.button_opacity);

        self.with_opacity(Some(opacity), |display| {
            display.command(|e| {
                e.bytes(&[text::BUTTON, state.to_byte()])?
                    .spatial(x)?
                    .spatial(y)?
                    .color(button_color)?
                    .byte(font)?
                    .color(font_color)?
                    .bytes(&[width_mult, height_mult])?
                    .text(string)?
                    .byte(0)?;
                Ok(())
            })
        })
    }

    pub fn draw_text_button_default(
        &mut self,
        x: u16,
        y: u16,
        string: &str,
        state: ButtonState,
    ) -> Result<()> {
        self.draw_text_button(
            x,
            y,
            string,
            1,
            1,
            state,
            self.button_font_color,
            self.button_color,
            TextStyle::new(),
        )
    }

    fn font_byte(&self, style: &TextStyle) -> u8 {
        let size = style.size.unwrap_or(self.font_size);
        size.with_spacing(style.proportional.unwrap_or(self.font_proportional))
    }

    /// Run `draw` with the module's font opacity temporarily switched
    ///
    /// A refused switch is logged and the text is drawn with whatever
    /// opacity the module already has.
    fn with_opacity<F>(&mut self, opacity: Option<Opacity>, draw: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let previous = self.font_opacity;
        match opacity {
            Some(opacity) if opacity != previous => {
                if let Err(e) = self.set_font_opacity(opacity) {
                    warn!("font opacity override not applied: {:?}", e);
                    return draw(self);
                }
                let result = draw(self);
                if let Err(e) = self.set_font_opacity(previous) {
                    warn!("font opacity not restored: {:?}", e);
                }
                result
            }
            _ => draw(self),
        }
    }
}
