//! A small owned element tree built from quick-xml events.
//!
//! Slide shape trees are nested deeply enough (groups in groups, text bodies
//! inside shapes) that answering "what is this shape's fill" with a flat
//! event loop gets unwieldy. Parts that need structural queries load an
//! [`Element`] once and navigate it by local name.

use super::{general_ref_content, text_content, unescape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// An XML element with its attributes, direct text and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with a qualified name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse the root element of an XML document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(Self::from_start(e)?);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text_content(t);
                        // Indentation between elements is not content, a:t runs keep spaces
                        if current.local_name() == "t" || !text.trim().is_empty() {
                            current.text.push_str(&text);
                        }
                    }
                },
                Ok(Event::CData(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                    }
                },
                Ok(Event::GeneralRef(ref r)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&general_ref_content(r));
                    }
                },
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(element),
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Err(OoxmlError::Xml("No root element found".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = std::str::from_utf8(&attr.value)?;
            attributes.push((key.to_string(), unescape_xml(value)));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// Qualified tag name, e.g. `p:sp`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Text directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Attribute value by local name, ignoring any prefix.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_part(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value by exact qualified name (`r:embed`).
    pub fn qualified_attr(&self, qname: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == qname)
            .map(|(_, value)| value.as_str())
    }

    pub fn attr_i64(&self, local: &str) -> Option<i64> {
        self.attr(local).and_then(|v| v.trim().parse().ok())
    }

    pub fn attr_f64(&self, local: &str) -> Option<f64> {
        self.attr(local).and_then(|v| v.trim().parse().ok())
    }

    /// Boolean attribute in the `xsd:boolean` lexical space.
    pub fn attr_bool(&self, local: &str) -> Option<bool> {
        match self.attr(local)? {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    /// First direct child with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// All direct children with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Follow a chain of local names through first-match children.
    pub fn path(&self, locals: &[&str]) -> Option<&Element> {
        locals.iter().try_fold(self, |current, local| current.child(local))
    }

    /// First descendant (depth-first, document order) with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        for child in &self.children {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find(local) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_recursive(&self) -> String {
        let mut text = self.text.clone();
        for child in &self.children {
            text.push_str(&child.text_recursive());
        }
        text
    }
}

fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
