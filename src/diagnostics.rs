//! Leveled diagnostics with optional source locations.
//!
//! A [`Diagnostics`] sink records everything the engine reports during a run and
//! forwards it to the `log` facade. It can be configured to raise on errors
//! instead of recording them, and to drop messages below a threshold.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Severity of a diagnostic. `None` disables logging when used as a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Verbose,
    Info,
    Warning,
    Error,
    None,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Verbose => "Verbose",
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::None => "None",
        };
        f.write_str(s)
    }
}

/// 1-based line and column inside some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Maps a 0-based position found inside a fragment that starts at `self`.
    pub fn offset(&self, line: usize, column: usize) -> Position {
        if line == 0 {
            Position::new(self.line, self.column + column)
        } else {
            Position::new(self.line + line, column + 1)
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

/// A position inside a named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub position: Position,
}

impl Location {
    pub fn new<P: AsRef<Path>>(file: P, position: Position) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            position,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({},{})",
            self.file.display(),
            self.position.line,
            self.position.column
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Recording diagnostic sink.
#[derive(Debug)]
pub struct Diagnostics {
    threshold: Level,
    raise_errors: bool,
    errors: usize,
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(threshold: Level, raise_errors: bool) -> Self {
        Self {
            threshold,
            raise_errors,
            errors: 0,
            records: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.log_level, settings.raise_errors)
    }

    pub fn log(&mut self, level: Level, message: impl Into<String>) -> Result<()> {
        self.emit(Diagnostic {
            level,
            message: message.into(),
            location: None,
        })
    }

    pub fn log_at(&mut self, level: Level, location: Location, message: impl Into<String>) -> Result<()> {
        self.emit(Diagnostic {
            level,
            message: message.into(),
            location: Some(location),
        })
    }

    /// Records an error that ends the run and returns it as [`Error::Fatal`].
    /// Never raises, the caller is already aborting.
    pub fn fatal(&mut self, location: Option<Location>, message: impl Into<String>) -> Error {
        let diagnostic = Diagnostic {
            level: Level::Error,
            message: message.into(),
            location,
        };
        forward(&diagnostic);
        self.errors += 1;
        self.records.push(diagnostic.clone());
        Error::Fatal(diagnostic)
    }

    /// Reports an entry-level error and returns it as [`Error::Reported`], or
    /// [`Error::Raised`] when the sink is configured to raise.
    pub fn reported(&mut self, location: Option<Location>, message: impl Into<String>) -> Error {
        let diagnostic = Diagnostic {
            level: Level::Error,
            message: message.into(),
            location,
        };
        match self.emit(diagnostic.clone()) {
            Ok(()) => Error::Reported(diagnostic),
            Err(e) => e,
        }
    }

    fn emit(&mut self, diagnostic: Diagnostic) -> Result<()> {
        if diagnostic.level == Level::None {
            return Ok(());
        }
        if diagnostic.level >= Level::Error {
            self.errors += 1;
            if self.raise_errors {
                self.records.push(diagnostic.clone());
                return Err(Error::Raised(diagnostic));
            }
        }
        if diagnostic.level < self.threshold {
            return Ok(());
        }
        forward(&diagnostic);
        self.records.push(diagnostic);
        Ok(())
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Counts errors even when the threshold suppressed their records.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn count(&self, level: Level) -> usize {
        self.records.iter().filter(|d| d.level == level).count()
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Level::Info, false)
    }
}

fn forward(diagnostic: &Diagnostic) {
    match diagnostic.level {
        Level::Verbose => log::debug!("{}", diagnostic),
        Level::Info => log::info!("{}", diagnostic),
        Level::Warning => log::warn!("{}", diagnostic),
        Level::Error => log::error!("{}", diagnostic),
        Level::None => {}
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Completed, but at least one entry failed and was skipped.
    Partial,
    Fatal,
}

/// A written (source, destination) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWritten {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of a generation or export run.
#[derive(Debug)]
pub struct Report {
    pub outcome: Outcome,
    pub diagnostics: Vec<Diagnostic>,
    pub written: Vec<FileWritten>,
    pub projects: Vec<PathBuf>,
}

impl Report {
    /// Builds the report from the run's result and everything the sink recorded.
    pub fn finish(
        result: Result<()>,
        mut sink: Diagnostics,
        written: Vec<FileWritten>,
        projects: Vec<PathBuf>,
    ) -> Self {
        let outcome = match result {
            Ok(()) if sink.has_errors() => Outcome::Partial,
            Ok(()) => Outcome::Success,
            Err(e) => {
                if !matches!(e, Error::Fatal(_) | Error::Raised(_) | Error::Reported(_)) {
                    sink.fatal(None, e.to_string());
                }
                Outcome::Fatal
            }
        };
        Self {
            outcome,
            diagnostics: sink.take(),
            written,
            projects,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level >= Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning)
    }
}
