use std::fs;
use std::path::Path;

use projgen::config::Settings;
use projgen::diagnostics::{Diagnostics, Outcome};
use projgen::ide::{export, ExportRequest, VsTemplateWriter};
use projgen::language::SourceLanguage;
use projgen::template::Template;
use projgen::xml::parse_document;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn load(dir: &Path, body: &str) -> Template {
    let path = dir.join("template.xml");
    write(&path, body);
    let mut sink = Diagnostics::default();
    Template::load(&path, &mut sink).unwrap()
}

fn library_template(dir: &Path) -> Template {
    write(
        &dir.join("Lib.csproj"),
        "<ProjectGuid>{{#newGuid}}</ProjectGuid><Name>{{ProjectName}}</Name>",
    );
    write(
        &dir.join("Class1.cs"),
        "// (c) {{#year}} {{Company}}\n[assembly: Guid(\"{{#newGuid}}\")]\nnamespace {{ProjectName}};",
    );
    write(&dir.join("icon.png"), "PNG");
    write(&dir.join("data.bin"), "{{raw}}");
    load(
        dir,
        r#"<Template>
  <Name>Class Library</Name>
  <Description>A class library.</Description>
  <Icon>icon.png</Icon>
  <Var name="ProjectName" semantic="projectName">Lib</Var>
  <Var name="Company" semantic="organization">Acme</Var>
  <Project src="Lib.csproj" dst="{{ProjectName}}/{{ProjectName}}.csproj">
    <File src="Class1.cs" dst="{{ProjectName}}/Code/Class1.cs" />
    <File src="data.bin" dst="{{ProjectName}}/data.bin" raw="true" />
  </Project>
</Template>"#,
    )
}

#[test]
fn test_export_renders_placeholders() {
    let template_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let template = library_template(template_dir.path());

    let request = ExportRequest::new(output_dir.path());
    let report = export(&VsTemplateWriter::new(), &template, &request, &Settings::default());
    assert_eq!(report.outcome, Outcome::Success);

    let out = output_dir.path();
    assert_eq!(
        fs::read_to_string(out.join("$safeprojectname$/$safeprojectname$.csproj")).unwrap(),
        "<ProjectGuid>$guid1$</ProjectGuid><Name>$safeprojectname$</Name>"
    );
    assert_eq!(
        fs::read_to_string(out.join("$safeprojectname$/Code/Class1.cs")).unwrap(),
        "// (c) $year$ $registeredorganization$\n[assembly: Guid(\"$guid2$\")]\nnamespace $safeprojectname$;"
    );
    assert_eq!(
        fs::read_to_string(out.join("$safeprojectname$/data.bin")).unwrap(),
        "{{raw}}"
    );
    assert!(out.join("icon.png").is_file());
    assert_eq!(report.written.len(), 3);
}

#[test]
fn test_descriptor_layout() {
    let template_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let template = library_template(template_dir.path());

    let request = ExportRequest::new(output_dir.path()).with_language(SourceLanguage::CSharp);
    let report = export(&VsTemplateWriter::new(), &template, &request, &Settings::default());
    assert_eq!(report.outcome, Outcome::Success);

    let text = fs::read_to_string(output_dir.path().join("template.vstemplate")).unwrap();
    let root = parse_document(&text).unwrap();
    assert_eq!(root.name, "VSTemplate");
    assert_eq!(root.attribute("Type"), Some("Project"));

    let data = root.child("TemplateData").unwrap();
    assert_eq!(data.child_text("Name").as_deref(), Some("Class Library"));
    assert_eq!(data.child_text("ProjectType").as_deref(), Some("CSharp"));
    assert_eq!(data.child_text("DefaultName").as_deref(), Some("ClassLibrary"));
    assert_eq!(data.child_text("Icon").as_deref(), Some("icon.png"));

    let project = root
        .child("TemplateContent")
        .and_then(|c| c.child("Project"))
        .unwrap();
    assert_eq!(
        project.attribute("File"),
        Some("$safeprojectname$/$safeprojectname$.csproj")
    );
    assert_eq!(project.attribute("ReplaceParameters"), Some("true"));

    let folder = project.child("Folder").unwrap();
    assert_eq!(folder.attribute("Name"), Some("Code"));
    let item = folder.child("ProjectItem").unwrap();
    assert_eq!(item.attribute("ReplaceParameters"), Some("true"));
    assert_eq!(item.text, "Class1.cs");

    let raw_item = project
        .children_named("ProjectItem")
        .find(|i| i.text == "data.bin")
        .unwrap();
    assert_eq!(raw_item.attribute("ReplaceParameters"), Some("false"));
    assert!(project
        .children_named("ProjectItem")
        .all(|i| !i.text.ends_with(".csproj")));
}

#[test]
fn test_more_than_one_project_is_fatal() {
    let template_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let dir = template_dir.path();
    write(&dir.join("A.csproj"), "a");
    write(&dir.join("B.csproj"), "b");
    let template = load(
        dir,
        r#"<Template><Project src="A.csproj" /><Project src="B.csproj" /></Template>"#,
    );

    let request = ExportRequest::new(output_dir.path());
    let report = export(&VsTemplateWriter::new(), &template, &request, &Settings::default());
    assert_eq!(report.outcome, Outcome::Fatal);
    assert_eq!(report.errors().count(), 1);
    assert!(report.written.is_empty());
    assert!(!output_dir.path().join("template.vstemplate").exists());
}

#[test]
fn test_no_project_is_fatal() {
    let template_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let template = load(template_dir.path(), "<Template><Name>Empty</Name></Template>");

    let request = ExportRequest::new(output_dir.path());
    let report = export(&VsTemplateWriter::new(), &template, &request, &Settings::default());
    assert_eq!(report.outcome, Outcome::Fatal);
}

#[test]
fn test_files_outside_project_directory_warn() {
    let template_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let dir = template_dir.path();
    write(&dir.join("App.csproj"), "app");
    write(&dir.join("readme.txt"), "readme");
    let template = load(
        dir,
        r#"<Template>
  <Project src="App.csproj" dst="App/App.csproj">
    <File src="readme.txt" dst="readme.txt" />
  </Project>
</Template>"#,
    );

    let request = ExportRequest::new(output_dir.path());
    let report = export(&VsTemplateWriter::new(), &template, &request, &Settings::default());
    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.warnings().count(), 1);
    assert!(output_dir.path().join("readme.txt").is_file());

    let text = fs::read_to_string(output_dir.path().join("template.vstemplate")).unwrap();
    assert!(!text.contains("readme.txt"));
}
