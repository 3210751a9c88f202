//! Device session and startup handshake
//!
//! A [`Display`] owns the serial port, the reset line and a delay source.
//! [`Display::initialize`] walks the module from power-up to a usable
//! session:
//!
//! ```text
//! Unopened ─► Resetting ─► BaudProbing ─┬─► BaudSwitching ─┬─► QueryingInfo ─► Ready
//!                 ▲             │       └──────────────────┘        │
//!                 └── retry ────┘                                   │
//!        any step ───────────────────────────────────────────► Failed
//! ```
//!
//! The negotiated controller family fixes the coordinate width for every
//! later command, so it is only decided once the geometry is known.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use sgc_hal::SerialPort;
use sgc_protocol::opcodes::system;
use sgc_protocol::{
    baud_index, baud_rate, ByteSink, ControllerFamily, CoordWidth, DeviceInfo, DeviceType,
    Encoder, FontSize, Opacity, ProtocolVariant, Rgb565, BOOTSTRAP_BAUD, INFO_RESPONSE_LEN,
};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// Handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Not started, or reset since the last handshake
    #[default]
    Unopened,
    /// Pulsing the reset line and waiting for power-up
    Resetting,
    /// Sending auto-baud and waiting for its ACK
    BaudProbing,
    /// Moving the link to the configured rate
    BaudSwitching,
    /// Reading identity and geometry
    QueryingInfo,
    /// Commands may be sent
    Ready,
    /// Handshake gave up; see the returned error
    Failed,
}

/// Adapts the session's port to the frame encoder
pub(crate) struct PortSink<'a, S> {
    port: &'a mut S,
}

impl<S: SerialPort> ByteSink for PortSink<'_, S> {
    type Error = Error;

    fn put(&mut self, byte: u8) -> Result<()> {
        self.port.write(byte).map_err(|_| {
            debug!("serial write failed");
            Error::Transport
        })
    }
}

/// Encoder handed to command builders
pub(crate) type FrameEncoder<'a, 'p, S> = Encoder<'a, PortSink<'p, S>>;

/// Session with one display module
///
/// All commands take `&mut self`; the session is the only user of its port,
/// reset line and delay until [`release`](Self::release) hands them back.
pub struct Display<S, P, D> {
    port: S,
    reset_pin: P,
    delay: D,
    config: SessionConfig,
    state: SessionState,

    // Negotiated during the handshake
    family: ControllerFamily,
    device_type: DeviceType,
    hardware_revision: u8,
    firmware_revision: u8,
    width: u16,
    height: u16,

    // Host-side text state
    pub(crate) font_size: FontSize,
    pub(crate) font_opacity: Opacity,
    pub(crate) font_proportional: bool,
    pub(crate) button_opacity: Opacity,
    pub(crate) font_color: Rgb565,
    pub(crate) button_color: Rgb565,
    pub(crate) button_font_color: Rgb565,

    /// Bit per user bitmap slot loaded since the handshake
    pub(crate) user_bitmaps: u32,
}

impl<S, P, D> Display<S, P, D>
where
    S: SerialPort,
    P: OutputPin,
    D: DelayNs,
{
    /// Create an unopened session; nothing touches the hardware yet
    pub fn new(port: S, reset_pin: P, delay: D, config: SessionConfig) -> Self {
        let text = config.text;
        Self {
            port,
            reset_pin,
            delay,
            config,
            state: SessionState::Unopened,
            family: ControllerFamily::Unknown,
            device_type: DeviceType::Unknown,
            hardware_revision: 0,
            firmware_revision: 0,
            width: 0,
            height: 0,
            font_size: text.font_size,
            font_opacity: text.font_opacity,
            font_proportional: text.proportional,
            button_opacity: text.button_opacity,
            font_color: text.font_color.into(),
            button_color: text.button_color.into(),
            button_font_color: text.button_font_color.into(),
            user_bitmaps: 0,
        }
    }

    /// Reset the module and run the startup handshake
    ///
    /// On success the session is [`SessionState::Ready`]. On failure it is
    /// [`SessionState::Failed`] and whatever was learned before the failing
    /// step stays readable through the accessors.
    pub fn initialize(&mut self) -> Result<()> {
        self.forget_device();

        match self.handshake() {
            Ok(()) => {
                info!(
                    "display ready: {:?} {}x{}, hw {} fw {}",
                    self.device_type,
                    self.width,
                    self.height,
                    self.hardware_revision,
                    self.firmware_revision
                );
                Ok(())
            }
            Err(e) => {
                error!("display handshake failed in {:?}: {:?}", self.state, e);
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn handshake(&mut self) -> Result<()> {
        let (probe_baud, switch_index) = match self.config.variant {
            ProtocolVariant::Legacy => (self.config.baud_rate, None),
            ProtocolVariant::Extended if self.config.baud_rate == BOOTSTRAP_BAUD => {
                (BOOTSTRAP_BAUD, None)
            }
            ProtocolVariant::Extended => {
                let index = baud_index(self.config.baud_rate).ok_or_else(|| {
                    warn!("baud rate {} not in the module rate table", self.config.baud_rate);
                    Error::UnsupportedBaudRate
                })?;
                (BOOTSTRAP_BAUD, Some(index))
            }
        };

        self.probe(probe_baud)?;
        if let Some(index) = switch_index {
            self.switch_baud(index)?;
        }

        self.state = SessionState::QueryingInfo;
        let info = self.query_info(false)?;
        self.resolve_geometry(&info)?;

        self.state = SessionState::Ready;
        self.apply_defaults();
        Ok(())
    }

    /// Reset and auto-baud until the module answers
    fn probe(&mut self, baud_rate: u32) -> Result<()> {
        let attempts = self.config.init_retries;
        let mut last_error = Error::Timeout;

        for attempt in 1..=attempts {
            self.state = SessionState::Resetting;
            self.pulse_reset()?;
            self.delay.delay_ms(self.config.init_delay_ms);

            self.state = SessionState::BaudProbing;
            self.port.open(baud_rate).map_err(|_| Error::Transport)?;
            self.write_frame(|e| {
                e.byte(system::AUTO_BAUD)?;
                Ok(())
            })?;

            match self.reader().read_ack() {
                Ok(()) => {
                    debug!("auto-baud acknowledged at {} on attempt {}", baud_rate, attempt);
                    return Ok(());
                }
                Err(e) => {
                    warn!("auto-baud attempt {}/{} failed: {:?}", attempt, attempts, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Move the link from the bootstrap rate to the configured one
    ///
    /// The module acknowledges at the new rate, so the port is reopened
    /// before the ACK is read.
    fn switch_baud(&mut self, index: u8) -> Result<()> {
        let rate = baud_rate(index).ok_or(Error::UnsupportedBaudRate)?;
        self.state = SessionState::BaudSwitching;
        self.write_frame(|e| {
            e.bytes(&[system::SET_BAUD, index])?;
            Ok(())
        })?;
        self.port.flush().map_err(|_| Error::Transport)?;
        self.port.open(rate).map_err(|_| Error::Transport)?;
        self.reader()
            .read_ack()
            .inspect_err(|e| warn!("no acknowledgement at {} baud: {:?}", rate, e))?;
        debug!("link switched to {} baud (index {})", rate, index);
        Ok(())
    }

    fn query_info(&mut self, show_on_screen: bool) -> Result<DeviceInfo> {
        self.write_frame(|e| {
            e.bytes(&[system::INFO, u8::from(show_on_screen)])?;
            Ok(())
        })?;

        let mut response = [0u8; INFO_RESPONSE_LEN];
        self.reader().read_exact(&mut response)?;
        let info = DeviceInfo::parse(&response, self.config.variant)
            .inspect_err(|e| warn!("device info rejected: {:?}", e))?;

        self.device_type = info.device_type;
        self.hardware_revision = info.hardware_revision;
        self.firmware_revision = info.firmware_revision;
        Ok(info)
    }

    /// Read raw width and height when the INFO codes were not recognised
    fn query_resolution(&mut self) -> Result<(u16, u16)> {
        self.write_frame(|e| {
            e.byte(system::QUERY_RESOLUTION)?;
            Ok(())
        })?;
        let mut reader = self.reader();
        let width = reader.read_short()?;
        let height = reader.read_short()?;
        Ok((width, height))
    }

    fn resolve_geometry(&mut self, info: &DeviceInfo) -> Result<()> {
        let variant = self.config.variant;
        let (width, height) = match (info.width, info.height) {
            (Some(width), Some(height)) => (width, height),
            _ if variant == ProtocolVariant::Extended => {
                debug!(
                    "unknown resolution codes {}/{}, asking the module",
                    info.width_code,
                    info.height_code
                );
                self.query_resolution()?
            }
            (width, height) => (width.unwrap_or(0), height.unwrap_or(0)),
        };
        self.width = width;
        self.height = height;

        let family = match variant {
            ProtocolVariant::Legacy => ControllerFamily::Goldelox,
            ProtocolVariant::Extended => ControllerFamily::from_geometry(width, height),
        };
        let limit = family.coord_width().max_value();

        if width == 0 || height == 0 || width > limit || height > limit {
            error!("unsupported geometry {}x{}", width, height);
            // Hold the module in a fresh reset so nothing else reaches it
            if self.pulse_reset().is_err() {
                warn!("reset after geometry rejection failed");
            }
            return Err(Error::UnsupportedGeometry);
        }

        self.family = family;
        Ok(())
    }

    /// Push the configured text and fill defaults, logging failures
    fn apply_defaults(&mut self) {
        let text = self.config.text;

        if let Err(e) = self.set_fill(self.config.fill) {
            warn!("default fill not applied: {:?}", e);
        }
        if let Err(e) = self.set_font(text.font_size) {
            warn!("default font not applied: {:?}", e);
        }
        if let Err(e) = self.set_font_opacity(text.font_opacity) {
            warn!("default font opacity not applied: {:?}", e);
        }

        self.font_proportional = text.proportional;
        self.button_opacity = text.button_opacity;
        self.font_color = text.font_color.into();
        self.button_color = text.button_color.into();
        self.button_font_color = text.button_font_color.into();
    }

    /// Clear everything learned from the module
    fn forget_device(&mut self) {
        self.state = SessionState::Unopened;
        self.family = ControllerFamily::Unknown;
        self.device_type = DeviceType::Unknown;
        self.hardware_revision = 0;
        self.firmware_revision = 0;
        self.width = 0;
        self.height = 0;
        self.user_bitmaps = 0;

        let text = self.config.text;
        self.font_size = text.font_size;
        self.font_opacity = text.font_opacity;
    }

    fn pulse_reset(&mut self) -> Result<()> {
        let hold = self.config.timing.reset_hold_ms;
        self.reset_pin.set_low().map_err(|_| Error::ResetPin)?;
        self.delay.delay_ms(hold);
        self.reset_pin.set_high().map_err(|_| Error::ResetPin)?;
        self.delay.delay_ms(hold);
        Ok(())
    }

    /// Pulse the reset line
    ///
    /// The module forgets the negotiated link, so the session returns to
    /// [`SessionState::Unopened`] and needs another `initialize()`.
    pub fn reset(&mut self) -> Result<()> {
        self.pulse_reset()?;
        self.forget_device();
        Ok(())
    }

    /// Re-read the module identity, optionally showing it on screen
    ///
    /// Device type and revisions are refreshed; the negotiated geometry is
    /// kept for the rest of the session.
    pub fn device_info(&mut self, show_on_screen: bool) -> Result<DeviceInfo> {
        self.ensure_ready()?;
        self.query_info(show_on_screen)
    }

    /// Close the port and hand back the owned parts
    pub fn release(mut self) -> (S, P, D) {
        self.port.close();
        (self.port, self.reset_pin, self.delay)
    }

    // ---- frame plumbing used by the command modules ----

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.state == SessionState::Ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    pub(crate) fn reader(&mut self) -> Reader<'_, S, D> {
        Reader::new(&mut self.port, &mut self.delay, &self.config.timing)
    }

    /// Encode one frame straight onto the port
    pub(crate) fn write_frame<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut FrameEncoder<'_, '_, S>) -> Result<()>,
    {
        let width = self.family.coord_width();
        let mut sink = PortSink {
            port: &mut self.port,
        };
        let mut encoder = Encoder::new(&mut sink, width);
        build(&mut encoder)
    }

    /// Send a frame whose reply the caller reads itself
    pub(crate) fn request<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut FrameEncoder<'_, '_, S>) -> Result<()>,
    {
        self.ensure_ready()?;
        self.write_frame(build)
    }

    /// Send a frame and require an ACK
    pub(crate) fn command<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut FrameEncoder<'_, '_, S>) -> Result<()>,
    {
        self.request(build)?;
        self.reader()
            .read_ack()
            .inspect_err(|e| debug!("command not acknowledged: {:?}", e))
    }

    pub(crate) fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }

    // ---- accessors ----

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn family(&self) -> ControllerFamily {
        self.family
    }

    /// Coordinate encoding used for every spatial parameter
    pub fn coord_width(&self) -> CoordWidth {
        self.family.coord_width()
    }

    pub fn hardware_revision(&self) -> u8 {
        self.hardware_revision
    }

    pub fn firmware_revision(&self) -> u8 {
        self.firmware_revision
    }

    /// Screen width in pixels, 0 until the geometry is known
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Screen height in pixels, 0 until the geometry is known
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn font_opacity(&self) -> Opacity {
        self.font_opacity
    }

    pub fn font_proportional(&self) -> bool {
        self.font_proportional
    }

    pub fn button_opacity(&self) -> Opacity {
        self.button_opacity
    }

    pub fn font_color(&self) -> Rgb565 {
        self.font_color
    }

    pub fn button_color(&self) -> Rgb565 {
        self.button_color
    }

    pub fn button_font_color(&self) -> Rgb565 {
        self.button_font_color
    }
}
