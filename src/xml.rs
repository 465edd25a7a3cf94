//! Minimal element tree with source positions, built on `quick-xml`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::diagnostics::Position;
use crate::error::{Error, Result};

/// An element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text and CDATA content directly inside this element.
    pub text: String,
    pub children: Vec<Element>,
    /// Position of the element's opening `<`.
    pub position: Position,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first child with this name.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.trim().to_string())
    }
}

/// 1-based position of the byte offset `offset` in `source`.
fn position_of(source: &str, offset: usize) -> Position {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    Position::new(line, column)
}

fn element_from(start: &BytesStart, position: Position) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
        position,
    })
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::TemplateError(format!(
            "document has more than one root element ('{}' at line {})",
            element.name, element.position.line
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Parses a whole document into its single root element.
///
/// # Errors
/// * `Error::XmlError` if the markup is not well formed
/// * `Error::TemplateError` if there is no root element or more than one
pub fn parse_document(source: &str) -> Result<Element> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => {
                let start = source[..end].rfind('<').unwrap_or(0);
                stack.push(element_from(&e, position_of(source, start))?);
            }
            Event::Empty(e) => {
                let start = source[..end].rfind('<').unwrap_or(0);
                let element = element_from(&e, position_of(source, start))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    Error::TemplateError("unexpected closing tag".to_string())
                })?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::TemplateError(format!(
            "element '{}' is never closed",
            open.name
        )));
    }
    root.ok_or_else(|| Error::TemplateError("document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_and_nesting() {
        let doc = "<?xml version=\"1.0\"?>\n<Template>\n  <Project src=\"a\">\n    <File src=\"b\" />\n  </Project>\n</Template>";
        let root = parse_document(doc).unwrap();
        assert_eq!(root.name, "Template");
        assert_eq!(root.position, Position::new(2, 1));

        let project = root.child("Project").unwrap();
        assert_eq!(project.position, Position::new(3, 3));
        assert_eq!(project.attribute("src"), Some("a"));

        let file = &project.children[0];
        assert_eq!(file.position, Position::new(4, 5));
        assert_eq!(file.attribute("src"), Some("b"));
    }

    #[test]
    fn test_text_is_unescaped() {
        let root = parse_document("<T><Name>A &amp; B</Name></T>").unwrap();
        assert_eq!(root.child_text("Name").as_deref(), Some("A & B"));
    }

    #[test]
    fn test_missing_root() {
        assert!(parse_document("<?xml version=\"1.0\"?>").is_err());
    }
}
