use std::path::Path;

use chrono::Datelike;
use projgen::config::UnresolvedPolicy;
use projgen::diagnostics::{Diagnostics, Level, Position};
use projgen::error::Error;
use projgen::render::{IdeExpander, Renderer, ScaffoldExpander};
use projgen::variables::{VariableStore, VariableType};

fn store() -> VariableStore {
    let mut store = VariableStore::new();
    store.declare("x", None, "V", None, VariableType::String, false);
    store.declare("empty", None, "", None, VariableType::String, false);
    store.declare(
        "ProjectName",
        None,
        "App",
        Some("projectName".to_string()),
        VariableType::String,
        false,
    );
    store.declare(
        "Weird",
        None,
        "w",
        Some("colour".to_string()),
        VariableType::String,
        false,
    );
    store
}

fn render(text: &str) -> (String, Diagnostics) {
    let vars = store();
    let mut sink = Diagnostics::new(Level::Verbose, false);
    let out = Renderer::new(&vars, ScaffoldExpander)
        .render(Path::new("file.txt"), text, &mut sink)
        .unwrap();
    (out, sink)
}

#[test]
fn test_text_without_tokens_is_unchanged() {
    let text = "plain { text } with } braces\r\nand lines";
    let (out, sink) = render(text);
    assert_eq!(out, text);
    assert!(sink.records().is_empty());
}

#[test]
fn test_variable_substitution() {
    let (out, _) = render("a{{x}}b{{ x }}c");
    assert_eq!(out, "aVbVc");
}

#[test]
fn test_year_function() {
    let (out, _) = render("(c) {{#year}}");
    assert_eq!(out, format!("(c) {}", chrono::Local::now().year()));
}

#[test]
fn test_new_guid_is_fresh_per_token() {
    let (out, _) = render("{{#newGuid}}|{{#newGuid}}");
    let (a, b) = out.split_once('|').unwrap();
    assert!(uuid::Uuid::parse_str(a).is_ok());
    assert_ne!(a, b);
}

#[test]
fn test_unterminated_token() {
    let vars = store();
    let mut sink = Diagnostics::default();
    let result = Renderer::new(&vars, ScaffoldExpander).render(Path::new("f.txt"), "abc {{x", &mut sink);
    match result {
        Err(Error::Reported(d)) => {
            assert_eq!(d.message, "No matching block end.");
            assert_eq!(d.location.unwrap().position, Position::new(1, 5));
        }
        other => panic!("Expected reported error, got {:?}", other),
    }
}

#[test]
fn test_undeclared_variable_continues() {
    let (out, sink) = render("a{{missing}}b");
    assert_eq!(out, "ab");
    assert_eq!(sink.count(Level::Error), 1);
    assert!(sink.has_errors());
}

#[test]
fn test_undeclared_variable_skips_file() {
    let vars = store();
    let mut sink = Diagnostics::default();
    let result = Renderer::new(&vars, ScaffoldExpander)
        .with_policy(UnresolvedPolicy::SkipFile)
        .render(Path::new("f.txt"), "line\n  {{missing}}", &mut sink);
    match result {
        Err(Error::Reported(d)) => {
            assert_eq!(d.location.unwrap().position, Position::new(2, 3))
        }
        other => panic!("Expected reported error, got {:?}", other),
    }
}

#[test]
fn test_empty_token_and_unset_value_warn() {
    let (out, sink) = render("[{{ }}][{{empty}}][{{#nope}}]");
    assert_eq!(out, "[][][]");
    assert_eq!(sink.count(Level::Warning), 3);
    assert!(!sink.has_errors());
}

#[test]
fn test_ide_expander_placeholders() {
    let vars = store();
    let mut sink = Diagnostics::default();
    let mut renderer = Renderer::new(&vars, IdeExpander::new());
    let out = renderer
        .render(
            Path::new("a.cs"),
            "{{#newGuid}} {{#newGuid}} {{#year}} {{ProjectName}} {{x}}",
            &mut sink,
        )
        .unwrap();
    assert_eq!(out, "$guid1$ $guid2$ $year$ $safeprojectname$ V");

    let out = renderer
        .render(Path::new("b.cs"), "{{#newGuid}}", &mut sink)
        .unwrap();
    assert_eq!(out, "$guid3$");
    assert_eq!(renderer.expander().next_guid(), 4);
}

#[test]
fn test_unknown_semantic_is_an_error() {
    let vars = store();
    let mut sink = Diagnostics::default();
    let out = Renderer::new(&vars, IdeExpander::new())
        .render(Path::new("a.cs"), "<{{Weird}}>", &mut sink)
        .unwrap();
    assert_eq!(out, "<>");
    assert_eq!(sink.count(Level::Error), 1);
}
