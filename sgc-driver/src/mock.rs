//! Test doubles for the session and command tests
//!
//! `ScriptedPort` plays the module side of a conversation: each scripted
//! exchange releases its reply into the receive queue once the host has
//! written the expected number of bytes. Handles share state with the
//! owned parts so tests can inspect traffic while a `Display` holds them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use sgc_hal::SerialPort;
use sgc_protocol::{ProtocolVariant, ACK};

use crate::config::{SessionConfig, Timing};
use crate::session::Display;

/// Five-byte INFO reply of a 128x128 OLED, hardware 1.0, firmware 0.2
pub const OLED_128_INFO: [u8; 5] = [0x00, 0x10, 0x02, 0x28, 0x28];

#[derive(Debug)]
struct Exchange {
    expect: usize,
    reply: Vec<u8>,
}

#[derive(Debug, Default)]
struct PortState {
    written: Vec<u8>,
    rx: VecDeque<u8>,
    script: VecDeque<Exchange>,
    pending: usize,
    delayed: Vec<(usize, u8)>,
    opened: Vec<u32>,
    polls: usize,
    open: bool,
    fail_writes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    NotOpen,
    WriteFailed,
}

/// Port that answers from a script
#[derive(Debug)]
pub struct ScriptedPort {
    state: Rc<RefCell<PortState>>,
}

impl ScriptedPort {
    pub fn new() -> (Self, PortHandle) {
        let state = Rc::new(RefCell::new(PortState::default()));
        (
            Self {
                state: state.clone(),
            },
            PortHandle { state },
        )
    }
}

impl SerialPort for ScriptedPort {
    type Error = MockError;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.opened.push(baud_rate);
        state.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().open = false;
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if !state.open {
            return Err(MockError::NotOpen);
        }
        if state.fail_writes {
            return Err(MockError::WriteFailed);
        }
        state.written.push(byte);

        if let Some(expect) = state.script.front().map(|exchange| exchange.expect) {
            state.pending += 1;
            if state.pending == expect {
                state.pending = 0;
                if let Some(exchange) = state.script.pop_front() {
                    state.rx.extend(exchange.reply);
                }
            }
        }
        Ok(())
    }

    fn available(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.polls += 1;
        let polls = state.polls;
        let (due, later): (Vec<_>, Vec<_>) =
            state.delayed.drain(..).partition(|&(after, _)| polls > after);
        state.delayed = later;
        state.rx.extend(due.into_iter().map(|(_, byte)| byte));
        !state.rx.is_empty()
    }

    fn read(&mut self) -> Option<u8> {
        self.state.borrow_mut().rx.pop_front()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn baud_rate(&self) -> Option<u32> {
        let state = self.state.borrow();
        if state.open {
            state.opened.last().copied()
        } else {
            None
        }
    }
}

/// Test-side view of a [`ScriptedPort`]
#[derive(Debug, Clone)]
pub struct PortHandle {
    state: Rc<RefCell<PortState>>,
}

impl PortHandle {
    /// Reply with `reply` once the host has written `count` more bytes
    pub fn expect(&self, count: usize, reply: &[u8]) {
        self.state.borrow_mut().script.push_back(Exchange {
            expect: count,
            reply: reply.to_vec(),
        });
    }

    /// Expect a command of `count` bytes answered with ACK
    pub fn expect_ack(&self, count: usize) {
        self.expect(count, &[ACK]);
    }

    /// Make bytes readable right away
    pub fn feed(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Make `byte` readable once more than `polls` polls have happened
    pub fn deliver_after_polls(&self, polls: usize, byte: u8) {
        self.state.borrow_mut().delayed.push((polls, byte));
    }

    pub fn fail_writes(&self) {
        self.state.borrow_mut().fail_writes = true;
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    /// Drain the write log
    pub fn take_written(&self) -> Vec<u8> {
        core::mem::take(&mut self.state.borrow_mut().written)
    }

    /// Total `available()` calls so far
    pub fn polls(&self) -> usize {
        self.state.borrow().polls
    }

    /// Baud rates passed to `open()`, in order
    pub fn opened(&self) -> Vec<u32> {
        self.state.borrow().opened.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    /// Scripted exchanges not yet triggered
    pub fn pending_exchanges(&self) -> usize {
        self.state.borrow().script.len()
    }

    /// Bytes waiting in the receive queue
    pub fn unread(&self) -> usize {
        self.state.borrow().rx.len()
    }
}

/// Reset pin that records every level it is driven to
#[derive(Debug)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl MockPin {
    pub fn new() -> (Self, PinHandle) {
        let levels = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                levels: levels.clone(),
            },
            PinHandle { levels },
        )
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PinHandle {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl PinHandle {
    /// Completed low-then-high pulses
    pub fn pulses(&self) -> usize {
        self.levels
            .borrow()
            .windows(2)
            .filter(|pair| !pair[0] && pair[1])
            .count()
    }

    pub fn clear(&self) {
        self.levels.borrow_mut().clear();
    }
}

/// Delay that returns immediately and tallies requested time
#[derive(Debug, Default)]
pub struct NoopDelay {
    pub ns_total: u64,
    pub us_total: u64,
    pub ms_total: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns_total += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.us_total += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_total += u64::from(ms);
    }
}

pub type MockDisplay = Display<ScriptedPort, MockPin, NoopDelay>;

/// Small retry budgets so timeouts resolve quickly
pub fn test_config() -> SessionConfig {
    SessionConfig::default()
        .with_init_retries(3)
        .with_timing(Timing {
            response_retries: 8,
            ..Timing::default()
        })
}

/// Script the three ACKed startup defaults (fill, font, opacity)
pub fn expect_defaults(port: &PortHandle) {
    port.expect_ack(2);
    port.expect_ack(2);
    port.expect_ack(2);
}

/// Script a first-try legacy handshake answering `info`
pub fn expect_legacy_handshake(port: &PortHandle, info: &[u8; 5]) {
    port.expect_ack(1);
    port.expect(2, info);
    expect_defaults(port);
}

pub fn new_display(config: SessionConfig) -> (MockDisplay, PortHandle, PinHandle) {
    let (port, port_handle) = ScriptedPort::new();
    let (pin, pin_handle) = MockPin::new();
    let display = Display::new(port, pin, NoopDelay::default(), config);
    (display, port_handle, pin_handle)
}

/// Initialized 128x128 OLED session with a clean write log
pub fn ready_display() -> (MockDisplay, PortHandle, PinHandle) {
    let (mut display, port, pin) = new_display(test_config());
    expect_legacy_handshake(&port, &OLED_128_INFO);
    display.initialize().unwrap();
    port.take_written();
    pin.clear();
    (display, port, pin)
}

/// Initialized 320x240 LCD session speaking two-byte coordinates
pub fn ready_picaso_display() -> (MockDisplay, PortHandle, PinHandle) {
    let config = test_config().with_variant(ProtocolVariant::Extended);
    let (mut display, port, pin) = new_display(config);
    port.expect_ack(1);
    port.expect(2, &[0x01, 0x10, 0x10, 0x32, 0x24]);
    expect_defaults(&port);
    display.initialize().unwrap();
    port.take_written();
    pin.clear();
    (display, port, pin)
}
