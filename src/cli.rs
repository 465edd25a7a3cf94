//! Command-line interface implementation for projgen.
//! Provides argument parsing, trailing argument classification and the
//! variable listing printed when no destination is given.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::{parse_override, Overrides, Settings, UnresolvedPolicy};
use crate::diagnostics::Level;
use crate::error::{Error, Result};
use crate::language::SourceLanguage;
use crate::template::Template;

/// Command-line arguments structure for projgen.
#[derive(Parser, Debug)]
#[command(author, version, about = "projgen: template-driven project generator", long_about = None)]
pub struct Args {
    /// Path to the template description file
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the project will be generated. Lists the template's
    /// variables when omitted
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Variable overrides as <key>:<value>, and optionally one solution
    /// file (*.sln) to add the generated projects to
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Export a Visual Studio project template instead of generating
    #[arg(long)]
    pub vs: bool,

    /// Write into an existing, non-empty destination directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Stop at the first error instead of skipping the failing file
    #[arg(long)]
    pub strict: bool,

    /// Skip files that reference undeclared variables instead of rendering
    /// the reference as empty text
    #[arg(long)]
    pub skip_unresolved: bool,

    /// Source language of the generated projects
    #[arg(short, long, value_enum, default_value_t = SourceLanguage::CSharp)]
    pub lang: SourceLanguage,

    /// JSON or YAML file with variable overrides
    #[arg(long, value_name = "FILE")]
    pub vars_file: Option<PathBuf>,

    /// Read JSON variable overrides from stdin
    #[arg(long)]
    pub stdin: bool,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::Verbose
        } else if self.quiet {
            Level::Warning
        } else {
            Level::Info
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            overwrite: self.force,
            raise_errors: self.strict,
            log_level: self.log_level(),
            unresolved: if self.skip_unresolved {
                UnresolvedPolicy::SkipFile
            } else {
                UnresolvedPolicy::Continue
            },
        }
    }
}

/// Trailing arguments sorted into their roles.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Trailing {
    pub solution: Option<PathBuf>,
    pub overrides: Overrides,
}

fn is_solution_path(arg: &str) -> bool {
    std::path::Path::new(arg)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("sln"))
}

/// Splits trailing arguments into one optional solution path and
/// `key:value` overrides. Later pairs win over earlier ones.
///
/// # Errors
/// * `Error::ConfigError` for a second solution path or a malformed pair
pub fn classify_args(args: &[String]) -> Result<Trailing> {
    let mut trailing = Trailing::default();
    for arg in args {
        if is_solution_path(arg) {
            if trailing.solution.is_some() {
                return Err(Error::ConfigError(format!(
                    "Only one solution file may be given, found '{}'",
                    arg
                )));
            }
            trailing.solution = Some(PathBuf::from(arg));
        } else {
            let (key, value) = parse_override(arg)?;
            trailing.overrides.insert(key, value);
        }
    }
    Ok(trailing)
}

/// Formats the template's visible variables as a table.
pub fn format_variables(template: &Template) -> String {
    let rows: Vec<[String; 4]> = template
        .variables
        .iter()
        .filter(|v| !v.hidden)
        .map(|v| {
            [
                v.name.clone(),
                v.value_type.to_string(),
                v.value.clone(),
                v.semantic.clone().unwrap_or_default(),
            ]
        })
        .collect();
    let header = [
        "Name".to_string(),
        "Type".to_string(),
        "Default".to_string(),
        "Semantic".to_string(),
    ];

    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if let Some(name) = &template.name {
        out.push_str(name);
        out.push('\n');
    }
    if let Some(description) = &template.description {
        out.push_str(description);
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("This template declares no variables.\n");
        return out;
    }
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Parses command line arguments and returns the Args structure.
///
/// # Returns
/// * `Args` - Parsed command line arguments
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_verify() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_classify_args() {
        let args = vec![
            "name:Demo".to_string(),
            "App.SLN".to_string(),
            "url:http://x".to_string(),
        ];
        let trailing = classify_args(&args).unwrap();
        assert_eq!(trailing.solution, Some(PathBuf::from("App.SLN")));
        assert_eq!(trailing.overrides["name"], "Demo");
        assert_eq!(trailing.overrides["url"], "http://x");
    }

    #[test]
    fn test_classify_rejects_second_solution() {
        let args = vec!["a.sln".to_string(), "b.sln".to_string()];
        assert!(matches!(classify_args(&args), Err(Error::ConfigError(_))));
    }
}
