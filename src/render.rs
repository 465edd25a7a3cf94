//! Token substitution engine.
//!
//! Text is scanned for `{{ ... }}` tokens. A token starting with `#` calls a
//! built-in function (`#newGuid`, `#year`); anything else is a variable
//! reference. How built-ins and variables expand is delegated to an
//! [`Expander`], so direct scaffolding and IDE export share one scanner.

use std::path::Path;

use chrono::Datelike;

use crate::config::UnresolvedPolicy;
use crate::constants::{TOKEN_CLOSE, TOKEN_OPEN};
use crate::diagnostics::{Diagnostics, Level, Location, Position};
use crate::error::Result;
use crate::scanner::Scanner;
use crate::variables::{Variable, VariableStore};

/// Decides what built-in functions and variables expand to.
pub trait Expander {
    /// Expansion of `{{#newGuid}}`.
    fn new_guid(&mut self) -> String;

    /// Expansion of `{{#year}}`.
    fn year(&mut self) -> String;

    /// Expansion of a declared variable. `None` means "use its value".
    fn variable(
        &mut self,
        variable: &Variable,
        location: &Location,
        sink: &mut Diagnostics,
    ) -> Result<Option<String>>;
}

/// Expands tokens to concrete values for direct scaffolding.
#[derive(Debug, Default)]
pub struct ScaffoldExpander;

impl Expander for ScaffoldExpander {
    fn new_guid(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn year(&mut self) -> String {
        chrono::Local::now().year().to_string()
    }

    fn variable(&mut self, _: &Variable, _: &Location, _: &mut Diagnostics) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Expands tokens to Visual Studio template parameters.
///
/// Every `#newGuid` gets the next numbered placeholder, so the counter must
/// live as long as the whole exported template.
#[derive(Debug)]
pub struct IdeExpander {
    next_guid: u32,
}

impl IdeExpander {
    pub fn new() -> Self {
        Self { next_guid: 1 }
    }

    /// Number the next `#newGuid` placeholder will carry.
    pub fn next_guid(&self) -> u32 {
        self.next_guid
    }
}

impl Default for IdeExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Reserved parameter name for a variable semantic.
pub fn reserved_parameter(semantic: &str) -> Option<&'static str> {
    match semantic {
        "projectName" => Some("safeprojectname"),
        "organization" => Some("registeredorganization"),
        _ => None,
    }
}

impl Expander for IdeExpander {
    fn new_guid(&mut self) -> String {
        let placeholder = format!("$guid{}$", self.next_guid);
        self.next_guid += 1;
        placeholder
    }

    fn year(&mut self) -> String {
        "$year$".to_string()
    }

    fn variable(
        &mut self,
        variable: &Variable,
        location: &Location,
        sink: &mut Diagnostics,
    ) -> Result<Option<String>> {
        let semantic = match variable.semantic.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };
        match reserved_parameter(semantic) {
            Some(name) => Ok(Some(format!("${}$", name))),
            None => {
                sink.log_at(
                    Level::Error,
                    location.clone(),
                    format!(
                        "Unknown semantic '{}' on variable '{}'.",
                        semantic, variable.name
                    ),
                )?;
                Ok(Some(String::new()))
            }
        }
    }
}

/// Renders text against a variable store.
pub struct Renderer<'v, E: Expander> {
    variables: &'v VariableStore,
    expander: E,
    unresolved: UnresolvedPolicy,
}

impl<'v, E: Expander> Renderer<'v, E> {
    pub fn new(variables: &'v VariableStore, expander: E) -> Self {
        Self {
            variables,
            expander,
            unresolved: UnresolvedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, unresolved: UnresolvedPolicy) -> Self {
        self.unresolved = unresolved;
        self
    }

    pub fn expander(&self) -> &E {
        &self.expander
    }

    pub fn variables(&self) -> &VariableStore {
        self.variables
    }

    /// Renders the whole contents of `file`.
    pub fn render(&mut self, file: &Path, source: &str, sink: &mut Diagnostics) -> Result<String> {
        self.render_at(file, source, Position::START, sink)
    }

    /// Renders a fragment that starts at `offset` inside `file`. Token
    /// positions are reported relative to the file, not the fragment.
    ///
    /// # Errors
    /// * `Error::Reported` for an unterminated token, or for an undeclared
    ///   variable under `UnresolvedPolicy::SkipFile`
    /// * `Error::Raised` when the sink raises on errors
    pub fn render_at(
        &mut self,
        file: &Path,
        source: &str,
        offset: Position,
        sink: &mut Diagnostics,
    ) -> Result<String> {
        let variables = self.variables;
        let mut out = String::with_capacity(source.len());
        let mut scanner = Scanner::new(source);

        while scanner.read_to(TOKEN_OPEN, &mut out) {
            let (line, column) = scanner.mark();
            let location = Location::new(file, offset.offset(line, column));

            let mut token = String::new();
            if !scanner.read_to(TOKEN_CLOSE, &mut token) {
                return Err(sink.reported(Some(location), "No matching block end."));
            }
            let token = token.trim();

            if token.is_empty() {
                sink.log_at(Level::Warning, location, "Empty token.")?;
                continue;
            }

            if let Some(function) = token.strip_prefix('#') {
                match function {
                    "newGuid" => {
                        let guid = self.expander.new_guid();
                        sink.log_at(Level::Verbose, location, format!("Generated Guid '{}'.", guid))?;
                        out.push_str(&guid);
                    }
                    "year" => out.push_str(&self.expander.year()),
                    _ => sink.log_at(
                        Level::Warning,
                        location,
                        format!("Unknown function '{}'.", token),
                    )?,
                }
                continue;
            }

            let variable = match variables.get(token) {
                Some(variable) => variable,
                None => {
                    let message = format!("Variable '{}' does not exist.", token);
                    match self.unresolved {
                        UnresolvedPolicy::Continue => {
                            sink.log_at(Level::Error, location, message)?
                        }
                        UnresolvedPolicy::SkipFile => {
                            return Err(sink.reported(Some(location), message))
                        }
                    }
                    continue;
                }
            };

            match self.expander.variable(variable, &location, sink)? {
                Some(text) => out.push_str(&text),
                None if variable.value.is_empty() => sink.log_at(
                    Level::Warning,
                    location,
                    format!("Variable '{}' not set.", token),
                )?,
                None => {
                    sink.log_at(
                        Level::Verbose,
                        location,
                        format!("Replaced variable '{}' with '{}'.", token, variable.value),
                    )?;
                    out.push_str(&variable.value);
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::VariableType;

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.declare("name", None, "Demo", None, VariableType::String, false);
        store
    }

    #[test]
    fn test_whitespace_inside_token_is_trimmed() {
        let vars = store();
        let mut sink = Diagnostics::default();
        let mut renderer = Renderer::new(&vars, ScaffoldExpander);
        let out = renderer
            .render(Path::new("f"), "[{{   name\t}}]", &mut sink)
            .unwrap();
        assert_eq!(out, "[Demo]");
    }

    #[test]
    fn test_offset_applies_to_first_line_only() {
        let vars = store();
        let mut sink = Diagnostics::default();
        let mut renderer = Renderer::new(&vars, ScaffoldExpander);
        renderer
            .render_at(Path::new("t.xml"), "ab{{missing}}", Position::new(4, 10), &mut sink)
            .unwrap();
        let location = sink.records()[0].location.clone().unwrap();
        assert_eq!(location.position, Position::new(4, 12));
    }
}
