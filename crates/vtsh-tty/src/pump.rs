#![forbid(unsafe_code)]

//! Moves bytes from the queue through the decoder.
//!
//! Each batch peeks a chunk, decodes it byte by byte, and commits exactly the
//! bytes that were decoded. Decoding stops right after a byte that produced
//! `Submit`: whatever follows stays queued until the submitted line has been
//! dispatched, so type-ahead is decoded against the next prompt.

use std::time::Instant;

use vtsh_core::{DecoderConfig, EditEvent, EscapeDecoder, QueueConsumer};

/// Bytes looked at per batch.
pub const DEFAULT_CHUNK: usize = 64;

/// Queue-to-decoder driver.
#[derive(Debug)]
pub struct Pump {
    decoder: EscapeDecoder,
    buf: Vec<u8>,
}

impl Pump {
    /// Pump with the given decoder settings.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_chunk(config, DEFAULT_CHUNK)
    }

    /// Pump looking at `chunk` bytes per batch (at least one).
    #[must_use]
    pub fn with_chunk(config: DecoderConfig, chunk: usize) -> Self {
        Self {
            decoder: EscapeDecoder::new(config),
            buf: vec![0; chunk.max(1)],
        }
    }

    /// Decode one batch of queued bytes received at `now`.
    ///
    /// Returns the events produced and the number of bytes consumed. Zero
    /// bytes consumed means the queue was empty.
    pub fn pump(&mut self, consumer: &QueueConsumer, now: Instant) -> (Vec<EditEvent>, usize) {
        let available = consumer.peek(&mut self.buf);
        let mut events = Vec::new();
        let mut consumed = 0;
        for &byte in &self.buf[..available] {
            self.decoder.step(byte, now, &mut events);
            consumed += 1;
            if events.last() == Some(&EditEvent::Submit) {
                break;
            }
        }
        let committed = consumer.commit_read(consumed);
        debug_assert_eq!(committed, consumed);
        if consumed > 0 {
            tracing::trace!(consumed, events = events.len(), "decoded batch");
        }
        (events, consumed)
    }

    /// Flush a pending escape whose timeout elapsed while the queue was
    /// empty.
    pub fn idle(&mut self, now: Instant) -> Option<Vec<EditEvent>> {
        self.decoder.check_timeout(now)
    }

    /// The decoder.
    #[must_use]
    pub fn decoder(&self) -> &EscapeDecoder {
        &self.decoder
    }
}
