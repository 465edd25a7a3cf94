use std::fs;

use projgen::error::Error;
use projgen::solution::{SlnFile, Solution};
use tempfile::TempDir;

const EXISTING: &str = "\u{feff}\r
Microsoft Visual Studio Solution File, Format Version 12.00\r
# Visual Studio Version 17\r
VisualStudioVersion = 17.0.31903.59\r
MinimumVisualStudioVersion = 10.0.40219.1\r
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Core\", \"Core\\Core.csproj\", \"{11111111-2222-3333-4444-555555555555}\"\r
EndProject\r
Global\r
\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\r
\t\tDebug|Any CPU = Debug|Any CPU\r
\tEndGlobalSection\r
EndGlobal\r
";

#[test]
fn test_parse_existing_solution() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Game.sln");
    fs::write(&path, EXISTING).unwrap();

    let sln = SlnFile::load(&path).unwrap();
    assert_eq!(sln.format_version, "12.00");
    assert_eq!(sln.minimum_vs_version.as_deref(), Some("10.0.40219.1"));
    assert_eq!(sln.projects().len(), 1);
    assert_eq!(sln.projects()[0].name, "Core");
    assert_eq!(sln.projects()[0].path, "Core\\Core.csproj");
}

#[test]
fn test_add_project_keeps_existing_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Game.sln");
    fs::write(&path, EXISTING).unwrap();

    let mut sln = SlnFile::load(&path).unwrap();
    let project = temp_dir.path().join("Tools/Tools.fsproj");
    assert!(sln.add_project(&project).unwrap());
    assert!(!sln.add_project(&project).unwrap());
    assert!(!sln.add_project(&temp_dir.path().join("core/core.csproj")).unwrap());
    sln.save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("VisualStudioVersion = 17.0.31903.59"));
    assert!(text.contains("Debug|Any CPU = Debug|Any CPU"));
    assert!(text.contains(
        "Project(\"{F2A71F9B-5D33-465A-A702-920D77279786}\") = \"Tools\", \"Tools\\Tools.fsproj\""
    ));

    let reloaded = SlnFile::load(&path).unwrap();
    assert_eq!(reloaded.projects().len(), 2);
    let guid = &reloaded.projects()[1].guid;
    assert_eq!(guid, &guid.to_uppercase());
}

#[test]
fn test_create_missing_solution() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/New.sln");

    let (mut sln, created) = SlnFile::load_or_create(&path).unwrap();
    assert!(created);
    assert!(sln.add_project(&temp_dir.path().join("App/App.vbproj")).unwrap());
    sln.save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Format Version 12.00"));
    assert!(text.contains("\"..\\App\\App.vbproj\""));
    assert!(text.contains("\r\n"));
}

#[test]
fn test_unsupported_project_type() {
    let temp_dir = TempDir::new().unwrap();
    let mut sln = SlnFile::create(temp_dir.path().join("a.sln"));
    assert!(matches!(
        sln.add_project(&temp_dir.path().join("x.vcxproj")),
        Err(Error::SolutionError(_))
    ));
}

#[test]
fn test_invalid_solution_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.sln");
    fs::write(&path, "not a solution").unwrap();
    assert!(matches!(
        SlnFile::load(&path),
        Err(Error::SolutionError(_))
    ));
}
