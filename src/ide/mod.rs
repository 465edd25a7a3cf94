//! Export of a template as an IDE-native project template package.
//!
//! Export consumes the same [`Template`] as direct scaffolding but renders
//! through an [`IdeExpander`](crate::render::IdeExpander): built-ins and
//! variables with a semantic become IDE parameters instead of concrete values.

use std::path::{Path, PathBuf};

use crate::config::{Overrides, Settings};
use crate::diagnostics::{Diagnostics, FileWritten, Report};
use crate::error::Result;
use crate::language::SourceLanguage;
use crate::processor::{ensure_output_dir, merge_variables};
use crate::template::Template;
use crate::variables::VariableStore;

pub mod vfs;
pub mod vstemplate;

pub use vstemplate::VsTemplateWriter;

/// Where and how to export.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub output: PathBuf,
    pub variables: Overrides,
    pub language: SourceLanguage,
}

impl ExportRequest {
    pub fn new<P: AsRef<Path>>(output: P) -> Self {
        Self {
            output: output.as_ref().to_path_buf(),
            ..Default::default()
        }
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

/// Everything a writer needs for one export run.
pub struct ExportContext<'a> {
    pub template: &'a Template,
    pub output: &'a Path,
    pub variables: &'a VariableStore,
    pub language: SourceLanguage,
    pub settings: &'a Settings,
}

/// Writes a template package for one IDE.
pub trait IdeTemplateWriter {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Writes the package into `ctx.output`, which already passed the
    /// destination guard. Per-file failures should be reported to `sink`
    /// and skipped; returning an error aborts the export.
    fn write_ide_template(
        &self,
        ctx: &ExportContext<'_>,
        sink: &mut Diagnostics,
        written: &mut Vec<FileWritten>,
    ) -> Result<()>;
}

/// Exports `template` with `writer`.
pub fn export(
    writer: &dyn IdeTemplateWriter,
    template: &Template,
    request: &ExportRequest,
    settings: &Settings,
) -> Report {
    let mut sink = Diagnostics::from_settings(settings);
    let mut written = Vec::new();
    let result = run_export(writer, template, request, settings, &mut sink, &mut written);
    Report::finish(result, sink, written, Vec::new())
}

fn run_export(
    writer: &dyn IdeTemplateWriter,
    template: &Template,
    request: &ExportRequest,
    settings: &Settings,
    sink: &mut Diagnostics,
    written: &mut Vec<FileWritten>,
) -> Result<()> {
    let output = ensure_output_dir(&request.output, settings.overwrite)?;
    let output = std::path::absolute(output)?;
    let variables = merge_variables(template, &request.variables, request.language);
    log::debug!("Exporting {} template to {}", writer.name(), output.display());

    let ctx = ExportContext {
        template,
        output: &output,
        variables: &variables,
        language: request.language,
        settings,
    };
    writer.write_ide_template(&ctx, sink, written)
}
