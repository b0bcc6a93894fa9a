//! Leveled, optionally colored user-facing messages.
//!
//! INFO, SUCCESS and WARNING lines go to stdout; ERROR lines go to stderr.
//! Diagnostics for developers go through `tracing` instead.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use ::console::{Color, style};
use indicatif::ProgressDrawTarget;

use crate::download::TransferProgress;

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress of the run.
    Info,
    /// The file was saved.
    Success,
    /// Recoverable or partial failure.
    Warning,
    /// The run failed.
    Error,
}

impl Level {
    /// Label printed before the message.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Info | Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }

    fn is_informational(self) -> bool {
        matches!(self, Self::Info | Self::Success)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output switches, usually derived from CLI flags and the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Color each line by level.
    pub color: bool,
    /// Suppress INFO/SUCCESS lines and the progress line.
    pub quiet: bool,
    /// Draw the transfer progress line.
    pub progress: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            color: true,
            quiet: false,
            progress: true,
        }
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// Destination for user-facing messages.
pub struct Console {
    stdout: Sink,
    stderr: Sink,
    options: ConsoleOptions,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Console writing to the process stdout/stderr.
    #[must_use]
    pub fn stdio(options: ConsoleOptions) -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()), options)
    }

    /// Console writing to arbitrary sinks.
    ///
    /// The progress line still goes to the terminal; set
    /// [`ConsoleOptions::progress`] to `false` to hide it.
    #[must_use]
    pub fn with_writers(
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
        options: ConsoleOptions,
    ) -> Self {
        Self {
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
            options,
        }
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> ConsoleOptions {
        self.options
    }

    /// Prints `INFO: <message>`.
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, format_args!("{}: {message}", Level::Info));
    }

    /// Prints `SUCCESS: <message>`.
    pub fn success(&self, message: impl fmt::Display) {
        self.emit(Level::Success, format_args!("{}: {message}", Level::Success));
    }

    /// Prints `WARNING: <message>`.
    pub fn warning(&self, message: impl fmt::Display) {
        self.emit(Level::Warning, format_args!("{}: {message}", Level::Warning));
    }

    /// Prints `ERROR: <message>`.
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, format_args!("{}: {message}", Level::Error));
    }

    /// Prints a line at `level` without the label prefix.
    pub fn detail(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, format_args!("{message}"));
    }

    /// Creates the progress line for a transfer of `total` bytes.
    #[must_use]
    pub fn transfer_progress(&self, total: Option<u64>) -> TransferProgress {
        let target = if self.options.progress && !self.options.quiet {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        TransferProgress::new(total, target)
    }

    fn emit(&self, level: Level, line: fmt::Arguments<'_>) {
        if self.options.quiet && level.is_informational() {
            return;
        }

        let sink = if level == Level::Error {
            &self.stderr
        } else {
            &self.stdout
        };
        let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);

        // A closed stdout/stderr must not abort the run.
        let _ = if self.options.color {
            let styled = style(line).fg(level.color()).bright().force_styling(true);
            writeln!(writer, "{styled}")
        } else {
            writeln!(writer, "{line}")
        };
        let _ = writer.flush();
    }
}
