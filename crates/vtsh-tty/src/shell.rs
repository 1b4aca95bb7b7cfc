#![forbid(unsafe_code)]

//! Processing thread: queue → decoder → editor → presenter, and dispatch of
//! submitted lines.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use vtsh_core::{EditEvent, EditOutcome, LineEditor, QueueConsumer, ShellConfig};
use vtsh_render::LinePresenter;

use crate::executor::Executor;
use crate::pump::Pump;
use crate::session::TerminalMode;

/// What the loop should do after a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep reading lines.
    Continue,
    /// The user asked to leave.
    Exit,
}

/// Hands submitted lines to the executor.
///
/// `exit` is handled here. Everything else goes to the executor byte for
/// byte, with the terminal in cooked mode for the duration.
#[derive(Debug)]
pub struct Dispatcher<E> {
    executor: E,
}

impl<E: Executor> Dispatcher<E> {
    /// Dispatcher over `executor`.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// The executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Dispatch one submitted line. Executor failures are reported on `out`
    /// and logged; only a failure to switch terminal modes or to write to
    /// `out` is returned as an error.
    pub fn dispatch<M, W>(
        &mut self,
        line: &[u8],
        mode: &mut M,
        out: &mut W,
    ) -> io::Result<Dispatch>
    where
        M: TerminalMode,
        W: Write,
    {
        if line.trim_ascii() == b"exit" {
            tracing::info!("exit requested");
            return Ok(Dispatch::Exit);
        }

        let shown = String::from_utf8_lossy(line);
        tracing::info!(line = %shown, "executing");
        mode.enter_cooked()?;
        let result = self.executor.execute(line);
        mode.enter_raw()?;

        if let Err(err) = result {
            tracing::warn!(line = %shown, error = %err, "command could not be run");
            write!(out, "vtsh: {err}\r\n")?;
            out.flush()?;
        }
        Ok(Dispatch::Continue)
    }
}

/// Result of one [`Shell::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was queued.
    Idle,
    /// Input was processed.
    Busy,
    /// The shell should stop.
    Exit,
}

/// The processing-thread state: editor, decoder pump, presenter, dispatcher.
#[derive(Debug)]
pub struct Shell<E, W> {
    editor: LineEditor,
    pump: Pump,
    presenter: LinePresenter,
    dispatcher: Dispatcher<E>,
    out: W,
    poll_interval: Duration,
}

impl<E: Executor, W: Write> Shell<E, W> {
    /// Build a shell from configuration, writing to `out`.
    pub fn new(config: &ShellConfig, executor: E, out: W) -> Self {
        Self {
            editor: LineEditor::new(),
            pump: Pump::new(config.decoder_config()),
            presenter: LinePresenter::new(config.prompt.clone()),
            dispatcher: Dispatcher::new(executor),
            out,
            poll_interval: config.poll_interval,
        }
    }

    /// The line editor.
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<E> {
        &self.dispatcher
    }

    /// The output sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Print the first prompt.
    pub fn start(&mut self) -> io::Result<()> {
        self.presenter.present_prompt(&mut self.out)
    }

    /// Process one batch of queued input received at `now`.
    pub fn tick<M: TerminalMode>(
        &mut self,
        consumer: &QueueConsumer,
        now: Instant,
        mode: &mut M,
    ) -> io::Result<Tick> {
        let (events, consumed) = self.pump.pump(consumer, now);
        let events = if consumed == 0 {
            match self.pump.idle(now) {
                Some(flushed) => flushed,
                None => return Ok(Tick::Idle),
            }
        } else {
            events
        };
        for event in events {
            if self.apply(event, mode)? == Dispatch::Exit {
                return Ok(Tick::Exit);
            }
        }
        Ok(Tick::Busy)
    }

    /// Run until `exit` or until `should_stop` returns true.
    pub fn run<M, F>(
        &mut self,
        consumer: &QueueConsumer,
        mode: &mut M,
        should_stop: F,
    ) -> io::Result<()>
    where
        M: TerminalMode,
        F: Fn() -> bool,
    {
        let span = tracing::info_span!("shell");
        let _guard = span.enter();
        self.start()?;
        while !should_stop() {
            match self.tick(consumer, Instant::now(), mode)? {
                Tick::Exit => break,
                Tick::Idle => thread::sleep(self.poll_interval),
                Tick::Busy => {}
            }
        }
        self.presenter.present_submit(&mut self.out)
    }

    fn apply<M: TerminalMode>(&mut self, event: EditEvent, mode: &mut M) -> io::Result<Dispatch> {
        match self.editor.apply(event) {
            EditOutcome::Unchanged => Ok(Dispatch::Continue),
            EditOutcome::Render(intent) => {
                self.presenter
                    .present(&intent, self.editor.state(), &mut self.out)?;
                Ok(Dispatch::Continue)
            }
            EditOutcome::Submit { line } => {
                self.presenter.present_submit(&mut self.out)?;
                let dispatch = match line {
                    Some(line) => self.dispatcher.dispatch(&line, mode, &mut self.out)?,
                    None => Dispatch::Continue,
                };
                if dispatch == Dispatch::Continue {
                    self.presenter.present_prompt(&mut self.out)?;
                }
                Ok(dispatch)
            }
        }
    }
}
