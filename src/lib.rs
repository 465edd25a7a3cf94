//! projgen is a template-driven project generator.
//! It reads a markup template description, substitutes `{{ }}` tokens in
//! file names and contents, writes the resulting project tree, and can export
//! the same template as a Visual Studio project template package.

/// Command-line interface module for the projgen application
pub mod cli;

/// Run settings and variable override sources (JSON, YAML, `key:value`)
pub mod config;

pub mod constants;

/// Leveled diagnostics sink and run reports
pub mod diagnostics;

/// Error types and handling for the projgen application
pub mod error;

/// IDE-native template export
pub mod ide;

pub mod language;

/// Logger initialization for the binary
pub mod logger;

/// Core generation orchestration
/// Resolves entries, renders or copies files and assembles solutions
pub mod processor;

/// Token substitution engine
pub mod render;

pub mod scanner;

/// Solution file reading and writing
pub mod solution;

/// Template description model and parser
pub mod template;

pub mod variables;

pub mod xml;
