#![forbid(unsafe_code)]

//! Interactive line-editing shell.
//!
//! Environment: see `vtsh_core::config` for shell settings and
//! `vtsh_tty::logging` for log output.

use std::io;

use vtsh_core::{ByteQueue, KeyMap, ShellConfig};
use vtsh_tty::{
    logging, CaptureControl, KeyCapture, PausingCapture, Shell, ShellExecutor, TerminalSession,
};

fn main() -> io::Result<()> {
    let config = ShellConfig::from_env()?;
    if let Err(err) = logging::init_from_env() {
        eprintln!("vtsh: logging disabled: {err}");
    }
    tracing::info!(?config, "starting");

    let (producer, consumer) = ByteQueue::split(config.queue_capacity)?;
    let control = CaptureControl::new();

    let session = TerminalSession::new()?;
    let capture = KeyCapture::new(KeyMap::with_defaults(), producer, control.clone())
        .spawn()?;

    let mut mode = PausingCapture::new(session, control.clone());
    let executor = ShellExecutor::new(config.shell_program.clone());
    let mut shell = Shell::new(&config, executor, io::stdout());

    let capture_done = || capture.is_finished();
    let result = shell.run(&consumer, &mut mode, capture_done);

    control.shutdown();
    match capture.join() {
        Ok(Err(err)) => tracing::error!(error = %err, "key capture failed"),
        Err(_) => tracing::error!("key capture thread panicked"),
        Ok(Ok(())) => {}
    }
    drop(mode);
    tracing::info!("exiting");
    result
}
