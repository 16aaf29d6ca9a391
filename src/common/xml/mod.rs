//! XML helpers shared by the OPC and PresentationML layers.
//!
//! quick-xml hands out raw (still escaped) bytes for text and attributes and,
//! since 0.38, reports entity references such as `&amp;` as separate
//! [`Event::GeneralRef`](quick_xml::events::Event::GeneralRef) events. The
//! helpers below turn both into plain strings so callers never deal with
//! escaping themselves.

mod element;
mod escape;

pub use element::Element;
pub use escape::{escape_xml, unescape_xml};

use quick_xml::events::{BytesRef, BytesStart, BytesText};

/// Get the unescaped value of an attribute by its qualified name.
///
/// Returns `None` if the attribute is absent or not valid UTF-8.
pub fn attr_value(e: &BytesStart<'_>, qname: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == qname)
        .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(unescape_xml))
}

/// Get the unescaped value of an attribute by its local name, ignoring any prefix.
pub fn attr_value_local(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(unescape_xml))
}

/// Decode a text event into an unescaped string.
pub fn text_content(e: &BytesText<'_>) -> String {
    match std::str::from_utf8(e.as_ref()) {
        Ok(raw) => unescape_xml(raw),
        Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
    }
}

/// Resolve an entity reference event (`amp`, `#233`, `#x41`, ...) to its text.
pub fn general_ref_content(e: &BytesRef<'_>) -> String {
    let name = String::from_utf8_lossy(e.as_ref());
    let resolved = match name.as_ref() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        other => other.strip_prefix('#').and_then(escape::decode_char_ref),
    };
    match resolved {
        Some(c) => c.to_string(),
        None => format!("&{};", name),
    }
}

/// Find the namespace prefix bound to `namespace` on an element, if any.
///
/// Used to write new elements with the same prefixes the document already uses.
pub fn prefix_for_namespace(e: &BytesStart<'_>, namespace: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let key = std::str::from_utf8(attr.key.as_ref()).ok()?;
        let prefix = key.strip_prefix("xmlns:")?;
        (attr.value.as_ref() == namespace.as_bytes()).then(|| prefix.to_string())
    })
}

/// Prefix part of a qualified element name (`p` for `p:sldId`), empty when unprefixed.
pub fn qname_prefix(e: &BytesStart<'_>) -> String {
    let name = e.name();
    let raw = name.as_ref();
    match memchr::memchr(b':', raw) {
        Some(pos) => String::from_utf8_lossy(&raw[..pos]).into_owned(),
        None => String::new(),
    }
}

/// Join a prefix and a local name into a qualified name.
pub fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    #[test]
    fn test_attr_helpers() {
        let xml = br#"<p:sldId xmlns:r="urn:r" id="256" r:id="rId&amp;2"/>"#;
        let mut reader = Reader::from_reader(&xml[..]);
        match reader.read_event() {
            Ok(Event::Empty(e)) => {
                assert_eq!(attr_value(&e, b"id").as_deref(), Some("256"));
                assert_eq!(attr_value(&e, b"r:id").as_deref(), Some("rId&2"));
                assert_eq!(prefix_for_namespace(&e, "urn:r").as_deref(), Some("r"));
                assert_eq!(qname_prefix(&e), "p");
            },
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_text_with_references() {
        let xml = b"<a:t>Fish &amp; Chips &#233;</a:t>";
        let mut reader = Reader::from_reader(&xml[..]);
        let mut text = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Text(e)) => text.push_str(&text_content(&e)),
                Ok(Event::GeneralRef(e)) => text.push_str(&general_ref_content(&e)),
                Ok(Event::Eof) => break,
                Err(e) => panic!("{}", e),
                _ => {},
            }
        }
        assert_eq!(text, "Fish & Chips é");
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("p", "sldId"), "p:sldId");
        assert_eq!(qualify("", "sldId"), "sldId");
    }
}
