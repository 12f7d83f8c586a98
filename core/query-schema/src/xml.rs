//! FILENAME: core/query-schema/src/xml.rs
//! PURPOSE: Builds a small owned element tree from a quick-xml event stream.
//! CONTEXT: Query schemas are tiny (a few dozen elements), so an owned tree
//! is simpler to query than driving the descriptor straight off the reader.
//! Text content is ignored; every value we need lives in attributes.

use crate::error::DecodeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Maximum nesting depth accepted for a schema document.
const MAX_DEPTH: usize = 64;

/// An XML element with its attributes and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| DecodeError::MalformedXml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| DecodeError::MalformedXml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Returns the value of an attribute, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child with the given element name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns all children with the given element name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Parses an XML document and returns its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, DecodeError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(DecodeError::MalformedXml(format!(
                        "nesting depth exceeded (max: {})",
                        MAX_DEPTH
                    )));
                }
                stack.push(XmlElement::from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::MalformedXml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DecodeError::MalformedXml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::MalformedXml(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| DecodeError::MalformedXml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DecodeError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(DecodeError::MalformedXml(
            "multiple root elements".to_string(),
        ));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_elements_and_attributes() {
        let doc = parse_document(
            r#"<?xml version="1.0"?><Query><Measures><Measure dataField="a" position="0"/></Measures><Rows/></Query>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "Query");
        let measures = doc.child("Measures").unwrap();
        assert_eq!(measures.children.len(), 1);
        assert_eq!(measures.children[0].attr("dataField"), Some("a"));
        assert!(doc.child("Rows").is_some());
        assert!(doc.child("Columns").is_none());
    }

    #[test]
    fn test_unescapes_attribute_values() {
        let doc = parse_document(r#"<Query name="Tickets &amp; Calls"/>"#).unwrap();
        assert_eq!(doc.attr("name"), Some("Tickets & Calls"));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        let result = parse_document("<Query><Measures></Query>");
        assert!(matches!(result, Err(DecodeError::MalformedXml(_))));
    }

    #[test]
    fn test_rejects_unclosed_root() {
        let result = parse_document("<Query><Measures/>");
        assert!(matches!(result, Err(DecodeError::MalformedXml(_))));
    }

    #[test]
    fn test_rejects_empty_document() {
        assert!(parse_document("").is_err());
    }
}
