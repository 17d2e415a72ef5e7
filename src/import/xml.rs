//! Minimal element tree over quick-xml events
//!
//! Both XML importers walk small documents with deep but regular nesting;
//! building a light tree first keeps their logic declarative. Namespace
//! prefixes are dropped from element and attribute names.

use super::ImportError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First element with the given name in document order, including self
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }
}

fn local_name(bytes: &[u8]) -> String {
    let name = String::from_utf8_lossy(bytes);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.into_owned(),
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, ImportError> {
    let mut element = XmlElement {
        name: local_name(start.name().as_ref()),
        ..XmlElement::default()
    };
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ImportError::ParseError(format!("Invalid attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| ImportError::ParseError(format!("Invalid attribute value: {}", e)))?;
        element.attributes.push((local_name(key.as_bytes()), value.into_owned()));
    }
    Ok(element)
}

/// Parse a document and return its root element. Text is kept verbatim;
/// [`XmlElement::text`] trims it for callers that want that.
pub(crate) fn parse_document(content: &str) -> Result<XmlElement, ImportError> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(open_element(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = open_element(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ImportError::ParseError("Unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(current) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ImportError::ParseError(format!("Invalid text: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.clone().into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ImportError::ParseError(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ImportError::ParseError(format!(
            "Unexpected end of document inside <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| ImportError::ParseError("Document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_prefixes() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <dm:document xmlns:dm="urn:x" spec="s">
              <model name="Device:2.11"><object name="Device."/></model>
              <description>a &amp; b</description>
            </dm:document>"#,
        )
        .unwrap();
        assert_eq!(root.name, "document");
        assert_eq!(root.attr("spec"), Some("s"));
        assert!(root.attr("dm").is_none());
        assert_eq!(root.child("description").unwrap().text(), "a & b");
        assert_eq!(root.find("object").unwrap().attr("name"), Some("Device."));
    }

    #[test]
    fn test_text_kept_verbatim() {
        let root = parse_document("<Value xsi:type=\"xsd:string\">  padded\n  text </Value>").unwrap();
        assert_eq!(root.text, "  padded\n  text ");
        assert_eq!(root.text(), "padded\n  text");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_document("").is_err());
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a>").is_err());
    }
}
