#![forbid(unsafe_code)]

//! Escape-sequence decoder.
//!
//! Turns the byte stream coming out of the [`ByteQueue`](crate::ByteQueue)
//! into [`EditEvent`]s, one byte at a time.
//!
//! # State machine
//!
//! | State     | Byte                  | Action                                   | Next      |
//! |-----------|-----------------------|------------------------------------------|-----------|
//! | Normal    | `ESC`                 | start scratch with `ESC`                 | EscSeen   |
//! | Normal    | CR / LF               | `Submit`                                 | Normal    |
//! | Normal    | BS / DEL              | `Backspace`                              | Normal    |
//! | Normal    | `>= 0x20`             | `InsertChar`                             | Normal    |
//! | EscSeen   | `[`                   | append                                   | CsiSeen   |
//! | EscSeen   | other                 | scratch as literal chars, reprocess byte | Normal    |
//! | Csi*      | digit or `;`          | append                                   | CsiParam  |
//! | Csi*      | `A` `B` `C` `D`       | history / cursor event with count        | Normal    |
//! | Csi*      | `~` with parameter 3  | `DeleteChar`                             | Normal    |
//! | Csi*      | other                 | discard silently                         | Normal    |
//!
//! # Timeout
//!
//! A lone `ESC` key and the first byte of an arrow-key sequence look the
//! same. Terminals send whole sequences in one burst, so before each byte is
//! consumed the decoder checks how long the pending sequence has been idle.
//! Past [`DecoderConfig::escape_timeout`] the scratch bytes are emitted as
//! literal `InsertChar`s and the new byte starts fresh from Normal.
//!
//! Time is always passed in by the caller; the decoder never reads a clock
//! and never sleeps.
//!
//! # Failure modes
//!
//! - Unsupported CSI finals are dropped without an event.
//! - A parameter run longer than [`DecoderConfig::max_sequence_len`] is
//!   dropped the same way.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::event::{CursorDirection, EditEvent, HistoryDirection};

/// Escape byte.
pub const ESC: u8 = 0x1B;

/// Default idle time after which a pending sequence is taken literally.
pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

/// Default bound on buffered sequence bytes.
pub const MAX_SEQUENCE_LEN: usize = 32;

type Scratch = SmallVec<[u8; MAX_SEQUENCE_LEN]>;

/// Decoder tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Idle time after which a pending sequence is flushed as literal input
    /// (default: 50ms).
    pub escape_timeout: Duration,
    /// Maximum buffered bytes of an unterminated sequence (default: 32).
    pub max_sequence_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            max_sequence_len: MAX_SEQUENCE_LEN,
        }
    }
}

impl DecoderConfig {
    /// Default config with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            escape_timeout: timeout,
            ..Default::default()
        }
    }
}

/// Observable decoder mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderMode {
    /// No sequence pending.
    Normal,
    /// Saw `ESC`.
    EscSeen,
    /// Saw `ESC [`.
    CsiSeen,
    /// Collecting CSI parameter bytes.
    CsiParam,
}

/// Stage of a pending sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Escape,
    Csi,
    CsiParam,
}

/// Internal state. The scratch buffer and the time of the last consumed byte
/// only exist while a sequence is pending, so `Normal` can never carry
/// leftover bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DecoderState {
    #[default]
    Normal,
    Pending {
        stage: Stage,
        scratch: Scratch,
        last_byte_at: Instant,
    },
}

/// Byte-at-a-time escape-sequence decoder.
///
/// ```
/// use std::time::{Duration, Instant};
/// use vtsh_core::decoder::EscapeDecoder;
/// use vtsh_core::event::{CursorDirection, EditEvent};
///
/// let mut decoder = EscapeDecoder::with_defaults();
/// let t = Instant::now();
///
/// assert_eq!(
///     decoder.feed(b"\x1b[D", t),
///     vec![EditEvent::MoveCursor(CursorDirection::Left, 1)]
/// );
///
/// // A lone ESC followed by a key well after the timeout is literal text.
/// assert!(decoder.feed(b"\x1b", t).is_empty());
/// assert_eq!(
///     decoder.feed(b"x", t + Duration::from_millis(80)),
///     vec![EditEvent::InsertChar(0x1b), EditEvent::InsertChar(b'x')]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EscapeDecoder {
    config: DecoderConfig,
    state: DecoderState,
}

impl Default for EscapeDecoder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EscapeDecoder {
    /// Create a decoder with the given configuration.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::Normal,
        }
    }

    /// Create a decoder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DecoderConfig::default())
    }

    /// Decode a batch of bytes that all arrived at `now`.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> Vec<EditEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.step(byte, now, &mut events);
        }
        events
    }

    /// Consume one byte, appending any resulting events to `out`.
    ///
    /// The timeout rule is applied first, so a stale pending sequence is
    /// flushed as literal input before `byte` is looked at.
    pub fn step(&mut self, byte: u8, now: Instant, out: &mut Vec<EditEvent>) {
        self.expire(now, out);

        match std::mem::take(&mut self.state) {
            DecoderState::Normal => self.process_normal(byte, now, out),
            DecoderState::Pending {
                stage: Stage::Escape,
                scratch,
                ..
            } => self.process_escape(byte, scratch, now, out),
            DecoderState::Pending {
                stage: Stage::Csi | Stage::CsiParam,
                scratch,
                ..
            } => self.process_csi(byte, scratch, now, out),
        }
    }

    /// Flush a pending sequence whose timeout has elapsed.
    ///
    /// Call this while idle so a lone `ESC` is delivered without waiting for
    /// the next key. Returns `None` when nothing was pending or the timeout
    /// has not elapsed yet.
    pub fn check_timeout(&mut self, now: Instant) -> Option<Vec<EditEvent>> {
        let mut events = Vec::new();
        self.expire(now, &mut events);
        if events.is_empty() {
            None
        } else {
            Some(events)
        }
    }

    /// Whether a sequence is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        matches!(self.state, DecoderState::Pending { .. })
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> DecoderMode {
        match &self.state {
            DecoderState::Normal => DecoderMode::Normal,
            DecoderState::Pending { stage, .. } => match stage {
                Stage::Escape => DecoderMode::EscSeen,
                Stage::Csi => DecoderMode::CsiSeen,
                Stage::CsiParam => DecoderMode::CsiParam,
            },
        }
    }

    /// Bytes buffered for the pending sequence (empty in Normal mode).
    #[must_use]
    pub fn pending_bytes(&self) -> &[u8] {
        match &self.state {
            DecoderState::Normal => &[],
            DecoderState::Pending { scratch, .. } => scratch,
        }
    }

    /// Time left before the pending sequence would be taken literally.
    ///
    /// Returns `None` when nothing is pending.
    #[must_use]
    pub fn time_until_timeout(&self, now: Instant) -> Option<Duration> {
        match &self.state {
            DecoderState::Normal => None,
            DecoderState::Pending { last_byte_at, .. } => Some(
                self.config
                    .escape_timeout
                    .saturating_sub(now.saturating_duration_since(*last_byte_at)),
            ),
        }
    }

    /// Emit any pending bytes as literal input immediately.
    pub fn flush(&mut self) -> Vec<EditEvent> {
        let mut events = Vec::new();
        if let DecoderState::Pending { scratch, .. } = std::mem::take(&mut self.state) {
            emit_literal(&scratch, &mut events);
        }
        events
    }

    /// Drop any pending bytes.
    pub fn reset(&mut self) {
        self.state = DecoderState::Normal;
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Replace the configuration. A pending sequence is kept.
    pub fn set_config(&mut self, config: DecoderConfig) {
        self.config = config;
    }

    fn expire(&mut self, now: Instant, out: &mut Vec<EditEvent>) {
        let DecoderState::Pending { last_byte_at, .. } = &self.state else {
            return;
        };
        if now.saturating_duration_since(*last_byte_at) <= self.config.escape_timeout {
            return;
        }
        if let DecoderState::Pending { scratch, .. } = std::mem::take(&mut self.state) {
            crate::debug!(bytes = scratch.len(), "escape timeout, flushing literally");
            emit_literal(&scratch, out);
        }
    }

    fn process_normal(&mut self, byte: u8, now: Instant, out: &mut Vec<EditEvent>) {
        match byte {
            ESC => {
                let mut scratch = Scratch::new();
                scratch.push(ESC);
                self.state = DecoderState::Pending {
                    stage: Stage::Escape,
                    scratch,
                    last_byte_at: now,
                };
            }
            b'\r' | b'\n' => out.push(EditEvent::Submit),
            0x08 | 0x7F => out.push(EditEvent::Backspace),
            0x20..=0xFF => out.push(EditEvent::InsertChar(byte)),
            _ => crate::trace!(byte, "ignoring control byte"),
        }
    }

    fn process_escape(
        &mut self,
        byte: u8,
        mut scratch: Scratch,
        now: Instant,
        out: &mut Vec<EditEvent>,
    ) {
        if byte == b'[' {
            scratch.push(byte);
            self.state = DecoderState::Pending {
                stage: Stage::Csi,
                scratch,
                last_byte_at: now,
            };
            return;
        }
        emit_literal(&scratch, out);
        self.process_normal(byte, now, out);
    }

    fn process_csi(
        &mut self,
        byte: u8,
        mut scratch: Scratch,
        now: Instant,
        out: &mut Vec<EditEvent>,
    ) {
        match byte {
            b'0'..=b'9' | b';' => {
                if scratch.len() >= self.config.max_sequence_len {
                    crate::debug!(bytes = scratch.len(), "escape sequence overflow, discarding");
                    return;
                }
                scratch.push(byte);
                self.state = DecoderState::Pending {
                    stage: Stage::CsiParam,
                    scratch,
                    last_byte_at: now,
                };
            }
            b'A'..=b'D' => {
                let count = count_param(first_param(&scratch[2..]));
                out.push(match byte {
                    b'A' => EditEvent::HistoryNav(HistoryDirection::Older),
                    b'B' => EditEvent::HistoryNav(HistoryDirection::Newer),
                    b'C' => EditEvent::MoveCursor(CursorDirection::Right, count),
                    _ => EditEvent::MoveCursor(CursorDirection::Left, count),
                });
            }
            b'~' if first_param(&scratch[2..]) == Some(3) => out.push(EditEvent::DeleteChar),
            _ => {
                crate::debug!(
                    sequence = ?scratch.as_slice(),
                    final_byte = byte,
                    "discarding unsupported sequence"
                );
            }
        }
    }
}

/// Repeat count: missing or zero means 1.
fn count_param(param: Option<u32>) -> u32 {
    match param {
        None | Some(0) => 1,
        Some(n) => n,
    }
}

fn emit_literal(bytes: &[u8], out: &mut Vec<EditEvent>) {
    out.extend(bytes.iter().map(|&b| EditEvent::InsertChar(b)));
}

/// Leading numeric parameter of a CSI parameter run (`"3;5"` → 3).
///
/// Returns `None` when the first parameter is empty. Values saturate at
/// `u32::MAX`.
fn first_param(params: &[u8]) -> Option<u32> {
    let digits = params.split(|&b| b == b';').next()?;
    if digits.is_empty() {
        return None;
    }
    Some(digits.iter().fold(0u32, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
    }))
}
