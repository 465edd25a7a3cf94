use clap::error::ErrorKind;
use clap::Parser;
use projgen::cli::{classify_args, format_variables, Args};
use projgen::config::UnresolvedPolicy;
use projgen::diagnostics::{Diagnostics, Level};
use projgen::language::SourceLanguage;
use projgen::template::Template;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("projgen")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./template.xml", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.template, PathBuf::from("./template.xml"));
    assert_eq!(parsed.destination, Some(PathBuf::from("./output")));
    assert!(parsed.args.is_empty());
    assert!(!parsed.force);
    assert!(!parsed.verbose);
    assert!(!parsed.vs);
    assert_eq!(parsed.lang, SourceLanguage::CSharp);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--force",
        "--verbose",
        "--strict",
        "--skip-unresolved",
        "--vs",
        "--lang",
        "vb",
        "./template.xml",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert!(parsed.vs);
    assert_eq!(parsed.lang, SourceLanguage::VisualBasic);

    let settings = parsed.settings();
    assert!(settings.overwrite);
    assert!(settings.raise_errors);
    assert_eq!(settings.log_level, Level::Verbose);
    assert_eq!(settings.unresolved, UnresolvedPolicy::SkipFile);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-q", "-l", "fs", "./template.xml", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.quiet);
    assert_eq!(parsed.log_level(), Level::Warning);
    assert_eq!(parsed.lang, SourceLanguage::FSharp);
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    let args = make_args(&["-v", "-q", "./template.xml", "./output"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_trailing_args() {
    let args = make_args(&[
        "./template.xml",
        "./output",
        "ProjectName:Demo",
        "../Game.sln",
        "Company:Acme:Inc",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();
    let trailing = classify_args(&parsed.args).unwrap();

    assert_eq!(trailing.solution, Some(PathBuf::from("../Game.sln")));
    assert_eq!(trailing.overrides.len(), 2);
    assert_eq!(trailing.overrides["ProjectName"], "Demo");
    assert_eq!(trailing.overrides["Company"], "Acme:Inc");
}

#[test]
fn test_malformed_pair() {
    assert!(classify_args(&["novalue".to_string()]).is_err());
}

#[test]
fn test_missing_args() {
    let args = make_args(&[]);
    let err = Args::try_parse_from(args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_template_only_lists_variables() {
    let parsed = Args::try_parse_from(make_args(&["./template.xml"])).unwrap();
    assert!(parsed.destination.is_none());

    let source = r#"<Template>
  <Name>Console</Name>
  <Var name="ProjectName" semantic="projectName">App</Var>
  <Var name="UseTests" type="Boolean">true</Var>
  <Var name="Secret" hidden="true">x</Var>
</Template>"#;
    let mut sink = Diagnostics::default();
    let template = Template::parse(Path::new("template.xml"), source, &mut sink).unwrap();
    let table = format_variables(&template);

    assert!(table.starts_with("Console\n"));
    assert!(table.contains("ProjectName"));
    assert!(table.contains("projectName"));
    assert!(table.contains("Boolean"));
    assert!(!table.contains("Secret"));
    assert!(!table.contains("_sourceExt"));
}
