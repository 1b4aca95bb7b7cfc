#![forbid(unsafe_code)]

//! Diagnostics for the queue, decoder and editor.
//!
//! The core only emits `trace!` and `debug!` events: a full queue, a
//! discarded escape sequence, an escape timeout, a recalled line being
//! detached from history. With the `tracing` feature these are the
//! `tracing` crate's macros and reach whatever subscriber the binary
//! installs. Without it they expand to `()`, so a call is valid anywhere an
//! expression is, including a bare match arm.
//!
//! Call sites use the crate-root path (`crate::debug!`), which resolves in
//! both configurations.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards its arguments; `tracing` is off.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// Discards its arguments; `tracing` is off.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {
            ()
        };
    }
}
