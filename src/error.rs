//! Error handling for projgen.
//! Defines the crate-wide error type and result alias used by every module.

use std::io;
use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Custom error types for projgen operations.
///
/// The three diagnostic-carrying variants separate the ways a failure can end:
/// `Fatal` aborts the whole run, `Raised` is produced by a sink configured to
/// raise on errors, and `Reported` marks a single entry that was already
/// reported and should be skipped.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors raised while reading or writing markup
    #[error("XML error: {0}.")]
    XmlError(#[from] quick_xml::Error),

    /// Represents a malformed template description
    #[error("Template error: {0}.")]
    TemplateError(String),

    #[error("The destination directory '{output_dir}' already exists and is not empty. Use --force to write anyway.")]
    OutputDirectoryExistsError { output_dir: String },

    /// Represents errors while reading or writing a solution file
    #[error("Solution error: {0}.")]
    SolutionError(String),

    /// Represents errors in settings or variable override sources
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents validation failures in user input or data
    #[error("Validation error: {0}.")]
    ValidationError(String),

    #[error("{0}")]
    Fatal(Diagnostic),

    #[error("{0}")]
    Raised(Diagnostic),

    #[error("{0}")]
    Reported(Diagnostic),
}

impl Error {
    /// Whether this error ends the whole run rather than a single entry.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            Error::Fatal(_) | Error::Raised(_) | Error::OutputDirectoryExistsError { .. }
        )
    }
}

/// Convenience type alias for Results with projgen's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
