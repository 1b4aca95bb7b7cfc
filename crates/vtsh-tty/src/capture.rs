#![forbid(unsafe_code)]

//! Input-capture thread.
//!
//! Reads key presses from crossterm, classifies each as a
//! `(platform_code, KeyClass)` pair, looks the pair up in a [`KeyMap`], and
//! writes the resulting bytes into the byte queue. The processing thread only
//! ever sees those bytes.
//!
//! Platform codes follow the PC convention: printable and control keys use
//! their ASCII value, extended keys use keyboard scan codes (see
//! [`vtsh_core::keymap::scan`]).

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use vtsh_core::keymap::scan;
use vtsh_core::{KeyClass, KeyMap, QueueProducer};

use crate::session::TerminalMode;

const EVENT_POLL: Duration = Duration::from_millis(50);
const FULL_QUEUE_BACKOFF: Duration = Duration::from_millis(1);

/// Scan codes of F1..F10, F11 and F12.
const FUNCTION_SCAN_BASE: u32 = 0x3A;
const F11_SCAN: u32 = 0x57;
const F12_SCAN: u32 = 0x58;

/// Shared flags between the capture thread and its owner.
#[derive(Debug, Clone, Default)]
pub struct CaptureControl {
    shutdown: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl CaptureControl {
    /// Fresh control, running and not paused.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the capture thread to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Stop reading the terminal, e.g. while a command owns stdin.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resume reading the terminal.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Whether capture is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// Classify a crossterm key event as `(platform_code, class)`.
///
/// Returns `None` for releases, non-ASCII characters, and keys with no PC
/// equivalent.
#[must_use]
pub fn classify(key: &KeyEvent) -> Option<(u32, KeyClass)> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let c = c.to_ascii_uppercase();
            match c {
                'A'..='Z' | '\\' | ']' | '^' | '_' => {
                    Some((u32::from(c) - 0x40, KeyClass::Control))
                }
                '[' => Some((0x1B, KeyClass::Control)),
                _ => None,
            }
        }
        KeyCode::Char(c) if (' '..='~').contains(&c) => Some((u32::from(c), KeyClass::Normal)),
        KeyCode::Char(_) => None,
        KeyCode::Enter => Some((0x0D, KeyClass::Control)),
        KeyCode::Tab => Some((0x09, KeyClass::Control)),
        KeyCode::Backspace => Some((0x7F, KeyClass::Control)),
        KeyCode::Esc => Some((0x1B, KeyClass::Control)),
        KeyCode::Up => Some((scan::UP, KeyClass::Extended)),
        KeyCode::Down => Some((scan::DOWN, KeyClass::Extended)),
        KeyCode::Left => Some((scan::LEFT, KeyClass::Extended)),
        KeyCode::Right => Some((scan::RIGHT, KeyClass::Extended)),
        KeyCode::Delete => Some((scan::DELETE, KeyClass::Extended)),
        KeyCode::F(n @ 1..=10) => Some((FUNCTION_SCAN_BASE + u32::from(n), KeyClass::Function)),
        KeyCode::F(11) => Some((F11_SCAN, KeyClass::Function)),
        KeyCode::F(12) => Some((F12_SCAN, KeyClass::Function)),
        _ => None,
    }
}

/// Translates key events and feeds the byte queue.
#[derive(Debug)]
pub struct KeyCapture {
    keymap: KeyMap,
    producer: QueueProducer,
    control: CaptureControl,
}

impl KeyCapture {
    /// Capture into `producer` using `keymap`.
    #[must_use]
    pub fn new(keymap: KeyMap, producer: QueueProducer, control: CaptureControl) -> Self {
        Self {
            keymap,
            producer,
            control,
        }
    }

    /// Bytes for a key event, if the key is mapped.
    #[must_use]
    pub fn translate(&self, key: &KeyEvent) -> Option<&[u8]> {
        let (code, class) = classify(key)?;
        let bytes = self.keymap.sequence(code, class);
        if bytes.is_none() {
            tracing::trace!(code, %class, "unmapped key");
        }
        bytes
    }

    /// Handle one terminal event. Returns whether anything was enqueued.
    pub fn handle_event(&self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        match self.translate(key) {
            Some(bytes) if !bytes.is_empty() => self.deliver(bytes),
            _ => false,
        }
    }

    /// Write all of `bytes`, retrying short writes until the queue accepts
    /// them. Gives up only on shutdown; returns whether everything was
    /// written.
    pub fn deliver(&self, bytes: &[u8]) -> bool {
        let mut rest = bytes;
        while !rest.is_empty() {
            let written = self.producer.write(rest);
            rest = &rest[written..];
            if rest.is_empty() {
                break;
            }
            if self.control.is_shutdown() {
                tracing::debug!(dropped = rest.len(), "shutdown with queue full");
                return false;
            }
            thread::sleep(FULL_QUEUE_BACKOFF);
        }
        true
    }

    /// Capture loop. Returns on shutdown or terminal read error.
    pub fn run(self) -> io::Result<()> {
        tracing::debug!(keys = self.keymap.len(), "key capture started");
        while !self.control.is_shutdown() {
            if self.control.is_paused() {
                thread::sleep(EVENT_POLL);
                continue;
            }
            if !event::poll(EVENT_POLL)? {
                continue;
            }
            let event = event::read()?;
            self.handle_event(&event);
        }
        tracing::debug!("key capture stopped");
        Ok(())
    }

    /// Run the capture loop on a named thread.
    pub fn spawn(self) -> io::Result<JoinHandle<io::Result<()>>> {
        thread::Builder::new()
            .name("vtsh-capture".into())
            .spawn(move || self.run())
    }
}

/// Terminal mode switch that also pauses key capture while cooked, so a
/// running command gets the terminal's input to itself.
#[derive(Debug)]
pub struct PausingCapture<M> {
    inner: M,
    control: CaptureControl,
}

impl<M: TerminalMode> PausingCapture<M> {
    /// Wrap `inner`, pausing the capture thread behind `control`.
    pub fn new(inner: M, control: CaptureControl) -> Self {
        Self { inner, control }
    }

    /// The wrapped mode switch.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: TerminalMode> TerminalMode for PausingCapture<M> {
    fn enter_cooked(&mut self) -> io::Result<()> {
        self.control.pause();
        // Let an in-flight poll finish before the command starts reading.
        thread::sleep(EVENT_POLL);
        self.inner.enter_cooked()
    }

    fn enter_raw(&mut self) -> io::Result<()> {
        self.inner.enter_raw()?;
        self.control.resume();
        Ok(())
    }
}
