#![forbid(unsafe_code)]

//! Running submitted lines.

use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};

/// Runs one submitted command line to completion.
pub trait Executor {
    /// Execute `line` exactly as typed. A command that runs and exits with a
    /// failure status is not an error; errors mean the command could not be
    /// run at all.
    fn execute(&mut self, line: &[u8]) -> io::Result<()>;
}

/// Runs lines through the system shell with inherited stdio.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    program: String,
}

impl ShellExecutor {
    /// Executor using `program` (e.g. `sh`, or `cmd` on Windows).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The shell program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, line: &[u8]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(command_flag(&self.program)).arg(line_arg(line));
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Executor for ShellExecutor {
    fn execute(&mut self, line: &[u8]) -> io::Result<()> {
        let status = self.command(line).status()?;
        let line = String::from_utf8_lossy(line);
        if status.success() {
            tracing::debug!(line = %line, "command finished");
        } else {
            tracing::info!(line = %line, %status, "command failed");
        }
        Ok(())
    }
}

/// The line as a process argument. Unix arguments are arbitrary bytes.
#[cfg(unix)]
fn line_arg(line: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(line).to_os_string()
}

/// The line as a process argument. Windows arguments must be Unicode.
#[cfg(not(unix))]
fn line_arg(line: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(line).into_owned())
}

/// `/C` for `cmd`, `-c` for everything else.
fn command_flag(program: &str) -> &'static str {
    let name = program
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(program)
        .to_ascii_lowercase();
    if name == "cmd" || name == "cmd.exe" {
        "/C"
    } else {
        "-c"
    }
}

/// Executor that records lines instead of running them.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    lines: Vec<Vec<u8>>,
    fail_with: Option<io::ErrorKind>,
}

impl RecordingExecutor {
    /// Recorder that accepts every line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that records and then fails every line with `kind`.
    #[must_use]
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            lines: Vec::new(),
            fail_with: Some(kind),
        }
    }

    /// Lines received so far.
    #[must_use]
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, line: &[u8]) -> io::Result<()> {
        self.lines.push(line.to_vec());
        match self.fail_with {
            Some(kind) => Err(io::Error::new(kind, "recording executor failure")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_flag_by_program() {
        assert_eq!(command_flag("sh"), "-c");
        assert_eq!(command_flag("/bin/bash"), "-c");
        assert_eq!(command_flag("cmd"), "/C");
        assert_eq!(command_flag(r"C:\Windows\System32\CMD.EXE"), "/C");
    }

    #[test]
    fn command_passes_line_verbatim() {
        let exec = ShellExecutor::new("sh");
        let cmd = exec.command(b"echo 'a  b' | wc -c");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(cmd.get_program(), "sh");
        assert_eq!(args, ["-c", "echo 'a  b' | wc -c"]);
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut exec = ShellExecutor::new("vtsh-definitely-not-a-program");
        assert!(exec.execute(b"true").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_not_an_error() {
        let mut exec = ShellExecutor::new("sh");
        assert!(exec.execute(b"exit 3").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_bytes_reach_the_shell_unchanged() {
        use std::os::unix::ffi::OsStrExt;
        let exec = ShellExecutor::new("sh");
        let cmd = exec.command(b"printf '\xe9\xff'");
        let args: Vec<_> = cmd.get_args().map(|a| a.as_bytes().to_vec()).collect();
        assert_eq!(args, [b"-c".to_vec(), b"printf '\xe9\xff'".to_vec()]);
    }

    #[test]
    fn recording_executor() {
        let mut exec = RecordingExecutor::new();
        exec.execute(b"ls").unwrap();
        assert_eq!(exec.lines(), [b"ls".to_vec()]);

        let mut failing = RecordingExecutor::failing(io::ErrorKind::NotFound);
        let err = failing.execute(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(failing.lines(), [b"x".to_vec()]);
    }
}
