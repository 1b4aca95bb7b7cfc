#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] puts the terminal in raw mode for line editing and
//! restores it on drop, on panic, and on SIGINT/SIGTERM. While a command
//! runs, the session can be switched back to cooked mode so the command sees
//! a normal terminal.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores the terminal** - cursor shown, raw mode off, stdout
//!    flushed.
//! 2. **Panic safety** - a process-wide panic hook performs the same cleanup
//!    before the previous hook runs.
//! 3. **Signals** - on Unix, SIGINT/SIGTERM received while editing restore
//!    the terminal and exit with `128 + signal`. While a command runs in
//!    cooked mode the signal belongs to the command and the shell ignores it.
//!
//! # Usage
//!
//! ```no_run
//! use vtsh_tty::session::{TerminalMode, TerminalSession};
//!
//! let mut session = TerminalSession::new()?;
//! session.enter_cooked()?;
//! // ... run a command ...
//! session.enter_raw()?;
//! // terminal restored when `session` is dropped
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Switching between raw (editing) and cooked (command) terminal modes.
pub trait TerminalMode {
    /// Leave raw mode so a child process gets a normal terminal.
    fn enter_cooked(&mut self) -> io::Result<()>;
    /// Return to raw mode for editing.
    fn enter_raw(&mut self) -> io::Result<()>;
}

/// A terminal session that manages raw mode and cleanup.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    raw_enabled: bool,
    /// Set while a command owns the terminal.
    cooked: Arc<AtomicBool>,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the signal handler
    /// cannot be registered.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        let cooked = Arc::new(AtomicBool::new(false));
        #[cfg(unix)]
        let signal_guard = Some(SignalGuard::new(Arc::clone(&cooked))?);

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        Ok(Self {
            raw_enabled: true,
            cooked,
            #[cfg(unix)]
            signal_guard,
        })
    }

    /// Whether raw mode is currently on.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.raw_enabled
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.raw_enabled {
            let _ = crossterm::terminal::disable_raw_mode();
            self.raw_enabled = false;
            tracing::info!("terminal raw mode disabled");
        }

        let _ = stdout.flush();
    }
}

impl TerminalMode for TerminalSession {
    fn enter_cooked(&mut self) -> io::Result<()> {
        if !self.raw_enabled {
            return Ok(());
        }
        io::stdout().flush()?;
        crossterm::terminal::disable_raw_mode()?;
        self.raw_enabled = false;
        self.cooked.store(true, Ordering::SeqCst);
        tracing::debug!("terminal switched to cooked mode");
        Ok(())
    }

    fn enter_raw(&mut self) -> io::Result<()> {
        if self.raw_enabled {
            return Ok(());
        }
        crossterm::terminal::enable_raw_mode()?;
        self.raw_enabled = true;
        self.cooked.store(false, Ordering::SeqCst);
        tracing::debug!("terminal switched to raw mode");
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            tracing::error!(%info, "panic");
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new(cooked: Arc<AtomicBool>) -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("vtsh-signals".into())
            .spawn(move || {
                for signal in signals.forever() {
                    if signal == SIGINT && cooked.load(Ordering::SeqCst) {
                        tracing::debug!("SIGINT while a command runs, left to the command");
                        continue;
                    }
                    tracing::warn!(signal, "termination signal received, cleaning up");
                    best_effort_cleanup();
                    std::process::exit(128 + signal);
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// Entering raw mode needs a real TTY, so the session itself is exercised by
// running the binary. The mode trait is covered through the shell tests.
