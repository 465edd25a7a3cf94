//! Visual Studio project template writer.
//!
//! Produces the package folder plus a `template.vstemplate` descriptor.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::vfs::{InsertError, VfsDirectory, VfsFile, VfsNode};
use super::{ExportContext, IdeTemplateWriter};
use crate::constants::{VSTEMPLATE_FILE, VSTEMPLATE_NAMESPACE};
use crate::diagnostics::{Diagnostics, FileWritten, Level, Location};
use crate::error::{Error, Result};
use crate::processor::{resolve_destination, resolve_source};
use crate::render::{IdeExpander, Renderer};
use crate::template::{FileEntry, Template};

#[derive(Debug, Default)]
pub struct VsTemplateWriter;

impl VsTemplateWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Resolves an entry and adds it to the tree. Returns the tree path, or
/// `None` when the entry was reported and skipped.
fn add_entry<'t>(
    template: &'t Template,
    entry: &'t FileEntry,
    root: &mut VfsDirectory<'t>,
    renderer: &mut Renderer<'_, IdeExpander>,
    sink: &mut Diagnostics,
) -> Result<Option<PathBuf>> {
    let location = Location::new(&template.path, entry.position);
    let resolved = resolve_source(template, entry, renderer, sink)
        .and_then(|source| Ok((source, resolve_destination(template, entry, renderer, sink)?)));
    let (source, relative) = match resolved {
        Ok(resolved) => resolved,
        Err(Error::Reported(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    match root.insert(&relative, source, entry) {
        Ok(path) => Ok(Some(path)),
        Err(e @ InsertError::Duplicate(_)) => {
            sink.log_at(Level::Warning, location, format!("Skipping entry: {}.", e))?;
            Ok(None)
        }
        Err(e) => {
            sink.log_at(Level::Error, location, format!("Skipping entry: {}.", e))?;
            Ok(None)
        }
    }
}

fn write_file(
    path: &Path,
    file: &VfsFile<'_>,
    renderer: &mut Renderer<'_, IdeExpander>,
    sink: &mut Diagnostics,
) -> Result<()> {
    if file.entry.raw {
        fs::copy(&file.source, path)?;
    } else {
        let text = fs::read_to_string(&file.source)?;
        let rendered = renderer.render(&file.source, &text, sink)?;
        fs::write(path, rendered)?;
    }
    Ok(())
}

/// Copies the icon or preview image next to the descriptor.
fn copy_asset(
    template: &Template,
    output: &Path,
    asset: Option<&str>,
    sink: &mut Diagnostics,
) -> Result<()> {
    let Some(asset) = asset else {
        return Ok(());
    };
    let source = template.directory().join(asset);
    let Some(file_name) = source.file_name() else {
        return sink.log(Level::Error, format!("Invalid asset path '{}'.", asset));
    };
    if !source.is_file() {
        return sink.log(
            Level::Error,
            format!("Asset not found at '{}'.", source.display()),
        );
    }
    if let Err(e) = fs::copy(&source, output.join(file_name)) {
        sink.log(
            Level::Error,
            format!("Failed to copy '{}': {}", source.display(), e),
        )?;
    }
    Ok(())
}

fn asset_name(asset: Option<&str>) -> Option<String> {
    asset
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Template name reduced to characters usable as a project name.
fn default_name(template: &Template) -> String {
    let name: String = template
        .name
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        "Project".to_string()
    } else {
        name
    }
}

fn slash_path(path: &Path) -> String {
    path.iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &VfsNode<'_>, project: &Path) -> Result<()> {
    match node {
        VfsNode::Directory(dir) => {
            let mut folder = BytesStart::new("Folder");
            folder.push_attribute(("Name", dir.name.as_str()));
            folder.push_attribute(("TargetFolderName", dir.name.as_str()));
            writer.write_event(Event::Start(folder))?;
            for entry in &dir.entries {
                write_node(writer, entry, project)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Folder")))?;
        }
        VfsNode::File(file) if file.path == project => {}
        VfsNode::File(file) => {
            let mut item = BytesStart::new("ProjectItem");
            item.push_attribute(("ReplaceParameters", bool_str(!file.entry.raw)));
            item.push_attribute(("TargetFileName", file.name.as_str()));
            writer.write_event(Event::Start(item))?;
            writer.write_event(Event::Text(BytesText::new(&file.name)))?;
            writer.write_event(Event::End(BytesEnd::new("ProjectItem")))?;
        }
    }
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Serializes the descriptor. `project` is the tree path of the project file;
/// only the subtree of its directory is listed.
pub fn descriptor(ctx: &ExportContext<'_>, root: &VfsDirectory<'_>, project: &VfsFile<'_>) -> Result<String> {
    let template = ctx.template;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut vs_template = BytesStart::new("VSTemplate");
    vs_template.push_attribute(("Version", "3.0.0"));
    vs_template.push_attribute(("Type", "Project"));
    vs_template.push_attribute(("xmlns", VSTEMPLATE_NAMESPACE));
    writer.write_event(Event::Start(vs_template))?;

    writer.write_event(Event::Start(BytesStart::new("TemplateData")))?;
    write_text_element(&mut writer, "Name", template.name.as_deref().unwrap_or_default())?;
    write_text_element(
        &mut writer,
        "Description",
        template.description.as_deref().unwrap_or_default(),
    )?;
    write_text_element(&mut writer, "ProjectType", &ctx.language.to_string())?;
    write_text_element(&mut writer, "NumberOfParentCategoriesToRollUp", "1")?;
    write_text_element(&mut writer, "DefaultName", &default_name(template))?;
    if let Some(icon) = asset_name(template.icon.as_deref()) {
        write_text_element(&mut writer, "Icon", &icon)?;
    }
    if let Some(preview) = asset_name(template.preview_image.as_deref()) {
        write_text_element(&mut writer, "PreviewImage", &preview)?;
    }
    writer.write_event(Event::End(BytesEnd::new("TemplateData")))?;

    writer.write_event(Event::Start(BytesStart::new("TemplateContent")))?;
    let file_attr = slash_path(&project.path);
    let mut project_element = BytesStart::new("Project");
    project_element.push_attribute(("File", file_attr.as_str()));
    project_element.push_attribute(("TargetFileName", project.name.as_str()));
    project_element.push_attribute(("ReplaceParameters", bool_str(!project.entry.raw)));
    writer.write_event(Event::Start(project_element))?;

    let project_dir = project.path.parent().unwrap_or_else(|| Path::new(""));
    if let Some(dir) = root.find_dir(project_dir) {
        for entry in &dir.entries {
            write_node(&mut writer, entry, &project.path)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Project")))?;
    writer.write_event(Event::End(BytesEnd::new("TemplateContent")))?;
    writer.write_event(Event::End(BytesEnd::new("VSTemplate")))?;

    let bytes = writer.into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl IdeTemplateWriter for VsTemplateWriter {
    fn name(&self) -> &'static str {
        "Visual Studio"
    }

    fn write_ide_template(
        &self,
        ctx: &ExportContext<'_>,
        sink: &mut Diagnostics,
        written: &mut Vec<FileWritten>,
    ) -> Result<()> {
        let template = ctx.template;
        let project = match template.projects.as_slice() {
            [project] => project,
            [] => return Err(sink.fatal(None, "Template does not contain a project to export.")),
            projects => {
                return Err(sink.fatal(
                    None,
                    format!(
                        "VS templates with more than 1 project are not supported, found {}.",
                        projects.len()
                    ),
                ))
            }
        };

        let mut renderer =
            Renderer::new(ctx.variables, IdeExpander::new()).with_policy(ctx.settings.unresolved);
        let mut root = VfsDirectory::root();

        let Some(project_path) = add_entry(template, &project.entry, &mut root, &mut renderer, sink)?
        else {
            return Err(sink.fatal(
                Some(Location::new(&template.path, project.entry.position)),
                format!("Project file '{}' could not be resolved.", project.entry.raw_source),
            ));
        };
        for file in &project.files {
            add_entry(template, file, &mut root, &mut renderer, sink)?;
        }

        root.write(ctx.output, &mut |path: &Path, file: &VfsFile<'_>| {
            match write_file(path, file, &mut renderer, sink) {
                Ok(()) => {
                    written.push(FileWritten {
                        source: file.source.clone(),
                        destination: path.to_path_buf(),
                    });
                    Ok(())
                }
                Err(e) if e.is_abort() => Err(e),
                Err(Error::Reported(_)) => Ok(()),
                Err(e) => sink.log(
                    Level::Error,
                    format!("Error writing '{}': {}", path.display(), e),
                ),
            }
        })?;

        copy_asset(template, ctx.output, template.icon.as_deref(), sink)?;
        copy_asset(template, ctx.output, template.preview_image.as_deref(), sink)?;

        let project_dir = project_path.parent().unwrap_or_else(|| Path::new(""));
        for file in root.files() {
            if !file.path.starts_with(project_dir) {
                sink.log(
                    Level::Warning,
                    format!(
                        "'{}' is outside the project directory and is not listed in the descriptor.",
                        slash_path(&file.path)
                    ),
                )?;
            }
        }

        let project_file = root
            .files()
            .into_iter()
            .find(|f| f.path == project_path)
            .ok_or_else(|| Error::TemplateError("project file missing from tree".to_string()))?;
        let xml = descriptor(ctx, &root, project_file)?;
        fs::write(ctx.output.join(VSTEMPLATE_FILE), xml)?;
        sink.log(
            Level::Info,
            format!("Wrote {} template to '{}'.", self.name(), ctx.output.display()),
        )?;
        Ok(())
    }
}
