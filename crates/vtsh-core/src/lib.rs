#![forbid(unsafe_code)]

//! Core: inter-thread byte queue, escape-sequence decoding, and line editing.
//!
//! Data flows one way through this crate:
//!
//! ```text
//! key source ──write──▶ ByteQueue ──peek/commit──▶ EscapeDecoder ──EditEvent──▶ LineEditor
//! ```
//!
//! Everything except [`byte_queue`] runs on a single processing thread and
//! needs no locking.

pub mod byte_queue;
pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod keymap;
pub mod line_editor;
pub mod logging;

pub use byte_queue::{ByteQueue, QueueConsumer, QueueProducer};
pub use config::ShellConfig;
pub use decoder::{DecoderConfig, EscapeDecoder};
pub use error::{ConfigError, QueueError};
pub use event::{CursorDirection, EditEvent, HistoryDirection};
pub use keymap::{KeyClass, KeyDef, KeyMap};
pub use line_editor::{EditOutcome, LineEditor, LineState, RenderIntent};

#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
