//! Direct scaffolding of a template into a destination directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{Overrides, Settings};
use crate::constants::{PROJECT_EXTENSION_SUFFIX, SOURCE_EXTENSION_VARIABLE};
use crate::diagnostics::{Diagnostics, FileWritten, Level, Location, Report};
use crate::error::{Error, Result};
use crate::language::SourceLanguage;
use crate::render::{Expander, Renderer, ScaffoldExpander};
use crate::solution::{SlnFile, Solution};
use crate::template::{is_rooted, FileEntry, Template};
use crate::variables::VariableStore;

/// What to generate and where.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub destination: PathBuf,
    /// Solution to add generated projects to, created if missing.
    pub solution: Option<PathBuf>,
    pub variables: Overrides,
    pub language: SourceLanguage,
}

impl GenerateRequest {
    pub fn new<P: AsRef<Path>>(destination: P) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_solution<P: AsRef<Path>>(mut self, solution: P) -> Self {
        self.solution = Some(solution.as_ref().to_path_buf());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_language(mut self, language: SourceLanguage) -> Self {
        self.language = language;
        self
    }
}

/// Ensures the output directory is safe to write to.
///
/// # Arguments
/// * `output_dir` - Target directory path for generated output
/// * `overwrite` - Whether to write into an existing, non-empty directory
///
/// # Returns
/// * `Result<PathBuf>` - Validated output directory path
///
/// # Errors
/// * `Error::ValidationError` if the path is an existing file
/// * `Error::OutputDirectoryExistsError` if the directory is not empty and
///   `overwrite` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, overwrite: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.is_file() {
        return Err(Error::ValidationError(format!(
            "The destination '{}' is an existing file",
            output_dir.display()
        )));
    }
    if output_dir.is_dir() && !overwrite && fs::read_dir(output_dir)?.next().is_some() {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Template variables with the requested language and the caller's overrides
/// applied. The language only sets the source extension when the caller does
/// not override it.
pub fn merge_variables(
    template: &Template,
    overrides: &Overrides,
    language: SourceLanguage,
) -> VariableStore {
    let mut variables = template.variables.clone();
    variables.set(SOURCE_EXTENSION_VARIABLE, language.file_extension());
    variables.with(overrides)
}

/// Whether a generated path follows the solution's project file convention.
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.to_ascii_lowercase().ends_with(PROJECT_EXTENSION_SUFFIX))
}

/// Resolves an entry's source: the first candidate that exists after rendering.
pub(crate) fn resolve_source<E: Expander>(
    template: &Template,
    entry: &FileEntry,
    renderer: &mut Renderer<'_, E>,
    sink: &mut Diagnostics,
) -> Result<PathBuf> {
    sink.log(
        Level::Verbose,
        format!(
            "Looking for {} at {}",
            entry.raw_source,
            entry.candidates.join(", ")
        ),
    )?;
    for candidate in &entry.candidates {
        let rendered = renderer.render_at(&template.path, candidate, entry.position, sink)?;
        let path = PathBuf::from(rendered);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(sink.reported(
        Some(Location::new(&template.path, entry.position)),
        format!("Source file '{}' not found.", entry.raw_source),
    ))
}

/// Renders an entry's destination relative to the output root.
pub(crate) fn resolve_destination<E: Expander>(
    template: &Template,
    entry: &FileEntry,
    renderer: &mut Renderer<'_, E>,
    sink: &mut Diagnostics,
) -> Result<String> {
    let relative =
        renderer.render_at(&template.path, &entry.raw_destination, entry.position, sink)?;
    if relative.trim().is_empty() || is_rooted(&relative) {
        return Err(sink.reported(
            Some(Location::new(&template.path, entry.position)),
            format!(
                "Destination '{}' rendered to an empty or rooted path '{}'.",
                entry.raw_destination, relative
            ),
        ));
    }
    Ok(relative)
}

type Observer<'t> = Box<dyn FnMut(&FileWritten) + 't>;

/// Generates a project tree from a parsed template.
pub struct Generator<'t> {
    template: &'t Template,
    settings: Settings,
    observers: Vec<Observer<'t>>,
}

impl<'t> Generator<'t> {
    pub fn new(template: &'t Template, settings: Settings) -> Self {
        Self {
            template,
            settings,
            observers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registers a callback invoked after each file is written.
    pub fn on_file_written<F>(&mut self, observer: F)
    where
        F: FnMut(&FileWritten) + 't,
    {
        self.observers.push(Box::new(observer));
    }

    /// Runs the generation. Per-file failures are reported and skipped; only
    /// the destination guard and raised errors end the run early.
    pub fn generate(&mut self, request: &GenerateRequest) -> Report {
        let mut sink = Diagnostics::from_settings(&self.settings);
        let mut written = Vec::new();
        let mut projects = Vec::new();
        let result = self.run(request, &mut sink, &mut written, &mut projects);
        Report::finish(result, sink, written, projects)
    }

    fn run(
        &mut self,
        request: &GenerateRequest,
        sink: &mut Diagnostics,
        written: &mut Vec<FileWritten>,
        projects: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let destination = ensure_output_dir(&request.destination, self.settings.overwrite)?;
        let destination = std::path::absolute(destination)?;

        let template = self.template;
        let variables = merge_variables(template, &request.variables, request.language);
        let mut renderer =
            Renderer::new(&variables, ScaffoldExpander).with_policy(self.settings.unresolved);

        fs::create_dir_all(&destination)?;

        for project in &template.projects {
            let entries = std::iter::once(&project.entry).chain(&project.files);
            for (index, entry) in entries.enumerate() {
                let Some(target) =
                    self.materialize(entry, &destination, &mut renderer, sink, written)?
                else {
                    continue;
                };
                let kind = if index == 0 { "project" } else { "file" };
                sink.log(
                    Level::Info,
                    format!("Rendered {} '{}' to '{}'.", kind, entry.raw_source, target.display()),
                )?;
                if is_project_file(&target) {
                    projects.push(target);
                }
            }
        }

        if let Some(solution) = &request.solution {
            if let Err(e) = self.assemble_solution(solution, projects, sink) {
                if e.is_abort() {
                    return Err(e);
                }
                sink.log(
                    Level::Error,
                    format!("Failed to update solution '{}': {}", solution.display(), e),
                )?;
            }
        }
        Ok(())
    }

    /// Writes one entry, turning recoverable failures into reported skips.
    fn materialize(
        &mut self,
        entry: &FileEntry,
        destination: &Path,
        renderer: &mut Renderer<'_, ScaffoldExpander>,
        sink: &mut Diagnostics,
        written: &mut Vec<FileWritten>,
    ) -> Result<Option<PathBuf>> {
        match self.render_entry(entry, destination, renderer, sink, written) {
            Ok(target) => Ok(target),
            Err(e) if e.is_abort() => Err(e),
            Err(Error::Reported(_)) => Ok(None),
            Err(e) => {
                sink.log_at(
                    Level::Error,
                    Location::new(&self.template.path, entry.position),
                    format!("Error rendering '{}': {}", entry.raw_source, e),
                )?;
                Ok(None)
            }
        }
    }

    fn render_entry(
        &mut self,
        entry: &FileEntry,
        destination: &Path,
        renderer: &mut Renderer<'_, ScaffoldExpander>,
        sink: &mut Diagnostics,
        written: &mut Vec<FileWritten>,
    ) -> Result<Option<PathBuf>> {
        let template = self.template;
        let source = resolve_source(template, entry, renderer, sink)?;
        let relative = resolve_destination(template, entry, renderer, sink)?;
        let target = destination.join(&relative);

        if target.exists() {
            sink.log_at(
                Level::Warning,
                Location::new(&template.path, entry.position),
                format!(
                    "Tried to render file to '{}', but file exists. Check the template file for duplicate dst attributes.",
                    target.display()
                ),
            )?;
            return Ok(None);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        if entry.raw {
            sink.log(
                Level::Info,
                format!("Copying file '{}' to '{}'.", source.display(), target.display()),
            )?;
            fs::copy(&source, &target)?;
        } else {
            sink.log(Level::Info, format!("Rendering file '{}'.", source.display()))?;
            let text = fs::read_to_string(&source)?;
            let rendered = renderer.render(&source, &text, sink)?;
            debug!("Writing file '{}' to '{}'", source.display(), target.display());
            fs::write(&target, rendered)?;
        }

        let event = FileWritten {
            source,
            destination: target.clone(),
        };
        for observer in &mut self.observers {
            observer(&event);
        }
        written.push(event);
        Ok(Some(target))
    }

    fn assemble_solution(
        &self,
        path: &Path,
        projects: &[PathBuf],
        sink: &mut Diagnostics,
    ) -> Result<()> {
        let (mut sln, created) = SlnFile::load_or_create(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if created {
            sink.log(Level::Info, format!("Created solution '{}'.", name))?;
        }
        for project in projects {
            let project_name = project
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match sln.add_project(project) {
                Ok(true) => sink.log(
                    Level::Info,
                    format!("Added project '{}' to solution '{}'.", project_name, name),
                )?,
                Ok(false) => sink.log(
                    Level::Warning,
                    format!("Project '{}' is already part of solution '{}'.", project_name, name),
                )?,
                Err(e) => sink.log(
                    Level::Error,
                    format!(
                        "Could not add project '{}' to solution '{}': {}",
                        project_name, name, e
                    ),
                )?,
            }
        }
        sln.save()
    }
}
