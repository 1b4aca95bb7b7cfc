#![forbid(unsafe_code)]

//! Terminal plumbing for vtsh: raw-mode session, key capture thread, the
//! processing loop, and command execution.
//!
//! Two threads share one byte queue:
//!
//! ```text
//! capture thread:    crossterm key ─▶ KeyMap ─▶ QueueProducer
//! processing thread: QueueConsumer ─▶ Pump/EscapeDecoder ─▶ LineEditor ─▶ LinePresenter
//!                                                               └─ Submit ─▶ Dispatcher ─▶ Executor
//! ```

pub mod capture;
pub mod executor;
pub mod logging;
pub mod pump;
pub mod session;
pub mod shell;

pub use capture::{CaptureControl, KeyCapture, PausingCapture};
pub use executor::{Executor, RecordingExecutor, ShellExecutor};
pub use pump::Pump;
pub use session::{TerminalMode, TerminalSession};
pub use shell::{Dispatch, Dispatcher, Shell, Tick};
