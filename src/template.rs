//! Template description model and parser.
//!
//! A template description is a markup document:
//!
//! ```xml
//! <Template>
//!   <Name>Console App</Name>
//!   <SrcFolder>shared</SrcFolder>
//!   <Var name="ProjectName" semantic="projectName">App</Var>
//!   <Project src="App.csproj" dst="{{ProjectName}}/{{ProjectName}}.csproj">
//!     <File src="Program.{{_sourceExt}}" dst="{{ProjectName}}/Program.{{_sourceExt}}" />
//!     <File src="icon.png" dst="{{ProjectName}}/icon.png" raw="true" />
//!   </Project>
//! </Template>
//! ```

use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::{attribute, element, SOURCE_EXTENSION_VARIABLE};
use crate::diagnostics::{Diagnostics, Level, Location, Position};
use crate::error::Result;
use crate::language::SourceLanguage;
use crate::variables::{is_true, VariableStore, VariableType};
use crate::xml::{parse_document, Element};

/// One source to destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Source path relative to the source folders, may contain tokens.
    pub raw_source: String,
    /// One candidate per source folder, in declared order. May contain tokens.
    pub candidates: Vec<String>,
    /// Destination relative to the output root, may contain tokens.
    pub raw_destination: String,
    /// Copy byte for byte instead of rendering.
    pub raw: bool,
    pub position: Position,
}

/// A project file together with the files that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub entry: FileEntry,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub preview_image: Option<String>,
    pub source_dirs: Vec<PathBuf>,
    pub variables: VariableStore,
    pub projects: Vec<ProjectEntry>,
}

/// Directory of `path`, `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub(crate) fn is_rooted(path: &str) -> bool {
    let path = Path::new(path);
    path.has_root() || path.is_absolute()
}

impl Template {
    /// Loads the template description at `path`.
    ///
    /// # Errors
    /// * `Error::Fatal` if the file is missing, malformed, has no `Template`
    ///   root, or names a source folder that does not exist
    /// * `Error::Raised` if an element-level error is raised by the sink
    pub fn load<P: AsRef<Path>>(path: P, sink: &mut Diagnostics) -> Result<Template> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(sink.fatal(
                None,
                format!("Template file not found at '{}'.", path.display()),
            ));
        }
        let path = std::path::absolute(path)?;
        let source = std::fs::read_to_string(&path)?;
        Self::parse(&path, &source, sink)
    }

    /// Parses a description whose file lives at `path`. Relative source
    /// folders resolve against the directory of `path`.
    pub fn parse(path: &Path, source: &str, sink: &mut Diagnostics) -> Result<Template> {
        let root = match parse_document(source) {
            Ok(root) => root,
            Err(e) => {
                return Err(sink.fatal(
                    None,
                    format!("Failed to parse template '{}': {}", path.display(), e),
                ))
            }
        };
        if root.name != element::TEMPLATE {
            return Err(sink.fatal(
                Some(Location::new(path, root.position)),
                format!(
                    "Template file does not have a '{}' element.",
                    element::TEMPLATE
                ),
            ));
        }

        let directory = parent_dir(path).to_path_buf();

        let mut source_dirs = Vec::new();
        for folder in root.children_named(element::SOURCE_FOLDER) {
            source_dirs.push((directory.join(folder.text.trim()), folder.position));
        }
        if source_dirs.is_empty() {
            source_dirs.push((directory.clone(), root.position));
        }

        let listed: Vec<String> = source_dirs
            .iter()
            .map(|(d, _)| d.display().to_string())
            .collect();
        sink.log(
            Level::Info,
            format!("Using source folders '{}'", listed.join(", ")),
        )?;

        for (dir, position) in &source_dirs {
            if !dir.is_dir() {
                return Err(sink.fatal(
                    Some(Location::new(path, *position)),
                    format!("Source folder not found at '{}'.", dir.display()),
                ));
            }
        }
        let source_dirs: Vec<PathBuf> = source_dirs.into_iter().map(|(d, _)| d).collect();

        let mut variables = VariableStore::new();
        variables.declare(
            SOURCE_EXTENSION_VARIABLE,
            Some("Extension of source files.".to_string()),
            SourceLanguage::default().file_extension(),
            None,
            VariableType::String,
            true,
        );
        for var in root.children_named(element::VARIABLE) {
            parse_variable(path, var, &mut variables, sink)?;
        }

        let mut projects = Vec::new();
        for project in root.children_named(element::PROJECT) {
            let entry = match parse_file_entry(path, project, &source_dirs, sink)? {
                Some(entry) => entry,
                None => continue,
            };
            let mut files = Vec::new();
            for file in project.children_named(element::FILE) {
                if let Some(entry) = parse_file_entry(path, file, &source_dirs, sink)? {
                    files.push(entry);
                }
            }
            debug!(
                "Parsed project '{}' with {} file(s)",
                entry.raw_source,
                files.len()
            );
            projects.push(ProjectEntry { entry, files });
        }

        Ok(Template {
            path: path.to_path_buf(),
            name: root.child_text(element::NAME),
            description: root.child_text(element::DESCRIPTION),
            icon: root.child_text(element::ICON).filter(|s| !s.is_empty()),
            preview_image: root
                .child_text(element::PREVIEW_IMAGE)
                .filter(|s| !s.is_empty()),
            source_dirs,
            variables,
            projects,
        })
    }

    /// Directory containing the description file.
    pub fn directory(&self) -> &Path {
        parent_dir(&self.path)
    }

    /// Number of file entries including project files.
    pub fn entry_count(&self) -> usize {
        self.projects.iter().map(|p| 1 + p.files.len()).sum()
    }
}

fn parse_variable(
    path: &Path,
    var: &Element,
    variables: &mut VariableStore,
    sink: &mut Diagnostics,
) -> Result<()> {
    let location = Location::new(path, var.position);
    let name = match var.attribute(attribute::VAR_NAME) {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => {
            return sink.log_at(
                Level::Warning,
                location,
                format!("Variable is missing '{}' attribute.", attribute::VAR_NAME),
            )
        }
    };

    let value_type = match var.attribute(attribute::VAR_TYPE) {
        None => VariableType::String,
        Some(t) => match t.parse() {
            Ok(value_type) => value_type,
            Err(()) => {
                sink.log_at(
                    Level::Error,
                    location,
                    format!("Invalid variable type '{}'.", t),
                )?;
                VariableType::String
            }
        },
    };

    variables.declare(
        name,
        var.attribute(attribute::VAR_DESCRIPTION).map(str::to_string),
        var.text.as_str(),
        var.attribute(attribute::VAR_SEMANTIC)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        value_type,
        is_true(var.attribute(attribute::VAR_HIDDEN)),
    );
    Ok(())
}

/// Parses a `Project` or `File` element. Invalid elements are reported and
/// dropped by returning `None`.
fn parse_file_entry(
    path: &Path,
    element: &Element,
    source_dirs: &[PathBuf],
    sink: &mut Diagnostics,
) -> Result<Option<FileEntry>> {
    let location = Location::new(path, element.position);
    let raw_source = match element.attribute(attribute::SOURCE) {
        Some(src) if !src.is_empty() && !is_rooted(src) => src.to_string(),
        _ => {
            sink.log_at(
                Level::Error,
                location,
                format!(
                    "{} elements must have a '{}' attribute which may not be a rooted path.",
                    element.name,
                    attribute::SOURCE
                ),
            )?;
            return Ok(None);
        }
    };

    let raw_destination = element
        .attribute(attribute::DESTINATION)
        .map(str::to_string)
        .unwrap_or_else(|| raw_source.clone());
    if raw_destination.is_empty() || is_rooted(&raw_destination) {
        sink.log_at(
            Level::Error,
            location,
            format!(
                "The '{}' attribute may not be empty or a rooted path.",
                attribute::DESTINATION
            ),
        )?;
        return Ok(None);
    }

    let candidates = source_dirs
        .iter()
        .map(|dir| dir.join(&raw_source).to_string_lossy().into_owned())
        .collect();

    Ok(Some(FileEntry {
        raw_source,
        candidates,
        raw_destination,
        raw: is_true(element.attribute(attribute::RAW)),
        position: element.position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_paths() {
        assert!(is_rooted("/etc/passwd"));
        assert!(!is_rooted("src/main.cs"));
        assert!(!is_rooted("{{name}}/a.txt"));
    }
}
