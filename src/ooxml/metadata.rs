/// OOXML document properties.
///
/// Core properties live in `docProps/core.xml` (Dublin Core plus OPC
/// extensions: title, creator, timestamps, ...). Extended properties live in
/// `docProps/app.xml` (application name, company, statistics such as slide
/// and word counts). Both parts are optional; a package without them yields
/// empty property sets.
use crate::common::xml::{escape_xml, general_ref_content, text_content};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::relationship_type as rt;
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::BufRead;

/// Core document properties (`docProps/core.xml`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    pub category: Option<String>,
    pub content_status: Option<String>,
    pub content_type: Option<String>,
    pub identifier: Option<String>,
    pub language: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub last_printed: Option<DateTime<Utc>>,
}

impl CoreProperties {
    /// Read the core properties of a package; empty when the part is absent.
    pub fn from_package(package: &OpcPackage) -> Result<Self> {
        match package.part_by_reltype(rt::CORE_PROPERTIES) {
            Ok(part) => Self::parse(part.blob()),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse core properties XML.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut props = Self::default();
        let mut buf = Vec::new();
        let mut depth = 0usize;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    if depth != 2 {
                        continue;
                    }
                    let local = e.local_name().as_ref().to_vec();
                    let text = read_text_element(&mut reader, &mut buf)?;
                    depth -= 1;
                    match local.as_slice() {
                        b"title" => props.title = text,
                        b"subject" => props.subject = text,
                        b"creator" => props.creator = text,
                        b"keywords" => props.keywords = text,
                        b"description" => props.description = text,
                        b"lastModifiedBy" => props.last_modified_by = text,
                        b"revision" => props.revision = text,
                        b"category" => props.category = text,
                        b"contentStatus" => props.content_status = text,
                        b"contentType" => props.content_type = text,
                        b"identifier" => props.identifier = text,
                        b"language" => props.language = text,
                        b"created" => props.created = text.and_then(|t| parse_datetime(&t).ok()),
                        b"modified" => props.modified = text.and_then(|t| parse_datetime(&t).ok()),
                        b"lastPrinted" => {
                            props.last_printed = text.and_then(|t| parse_datetime(&t).ok())
                        },
                        _ => {},
                    }
                },
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(format!("Core properties: {}", e))),
                _ => {},
            }
        }

        Ok(props)
    }

    /// Generate core.xml content for this properties set.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);

        let text_fields = [
            ("dc:title", &self.title),
            ("dc:subject", &self.subject),
            ("dc:creator", &self.creator),
            ("cp:keywords", &self.keywords),
            ("dc:description", &self.description),
            ("cp:lastModifiedBy", &self.last_modified_by),
            ("cp:revision", &self.revision),
            ("cp:category", &self.category),
            ("cp:contentStatus", &self.content_status),
            ("cp:contentType", &self.content_type),
            ("dc:identifier", &self.identifier),
            ("dc:language", &self.language),
        ];
        for (tag, value) in text_fields {
            if let Some(value) = value {
                xml.push_str(&format!("<{tag}>{}</{tag}>", escape_xml(value)));
            }
        }

        if let Some(printed) = &self.last_printed {
            xml.push_str(&format!("<cp:lastPrinted>{}</cp:lastPrinted>", w3cdtf(printed)));
        }
        for (tag, value) in [("dcterms:created", &self.created), ("dcterms:modified", &self.modified)] {
            if let Some(value) = value {
                xml.push_str(&format!(
                    r#"<{tag} xsi:type="dcterms:W3CDTF">{}</{tag}>"#,
                    w3cdtf(value)
                ));
            }
        }

        xml.push_str("</cp:coreProperties>");
        xml
    }
}

/// Extended (application) properties (`docProps/app.xml`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedProperties {
    pub application: Option<String>,
    pub app_version: Option<String>,
    pub company: Option<String>,
    pub hyperlink_base: Option<String>,
    pub manager: Option<String>,
    pub presentation_format: Option<String>,
    pub template: Option<String>,
    pub total_time: Option<i64>,
    pub words: Option<i64>,
    pub paragraphs: Option<i64>,
    pub characters: Option<i64>,
    pub lines: Option<i64>,
    pub pages: Option<i64>,
    pub slides: Option<i64>,
    pub notes: Option<i64>,
    pub hidden_slides: Option<i64>,
    pub mm_clips: Option<i64>,
}

impl ExtendedProperties {
    /// Read the extended properties of a package; empty when the part is absent.
    pub fn from_package(package: &OpcPackage) -> Result<Self> {
        match package.part_by_reltype(rt::EXTENDED_PROPERTIES) {
            Ok(part) => Self::parse(part.blob()),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse extended properties XML.
    ///
    /// Only direct children of `Properties` are read; the vector payloads of
    /// `HeadingPairs` and `TitlesOfParts` are skipped.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut props = Self::default();
        let mut buf = Vec::new();
        let mut depth = 0usize;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    if depth != 2 {
                        continue;
                    }
                    let local = e.local_name().as_ref().to_vec();
                    if matches!(local.as_slice(), b"HeadingPairs" | b"TitlesOfParts") {
                        continue;
                    }
                    let text = read_text_element(&mut reader, &mut buf)?;
                    depth -= 1;
                    let number = || text.as_deref().and_then(|t| t.trim().parse::<i64>().ok());
                    match local.as_slice() {
                        b"Application" => props.application = text.clone(),
                        b"AppVersion" => props.app_version = text.clone(),
                        b"Company" => props.company = text.clone(),
                        b"HyperlinkBase" => props.hyperlink_base = text.clone(),
                        b"Manager" => props.manager = text.clone(),
                        b"PresentationFormat" => props.presentation_format = text.clone(),
                        b"Template" => props.template = text.clone(),
                        b"TotalTime" => props.total_time = number(),
                        b"Words" => props.words = number(),
                        b"Paragraphs" => props.paragraphs = number(),
                        b"Characters" => props.characters = number(),
                        b"Lines" => props.lines = number(),
                        b"Pages" => props.pages = number(),
                        b"Slides" => props.slides = number(),
                        b"Notes" => props.notes = number(),
                        b"HiddenSlides" => props.hidden_slides = number(),
                        b"MMClips" => props.mm_clips = number(),
                        _ => {},
                    }
                },
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(format!("Extended properties: {}", e))),
                _ => {},
            }
        }

        Ok(props)
    }

    /// Generate app.xml content for this properties set.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);

        let fields: [(&str, Option<String>); 17] = [
            ("Template", self.template.clone()),
            ("TotalTime", self.total_time.map(|n| n.to_string())),
            ("Words", self.words.map(|n| n.to_string())),
            ("Application", self.application.clone()),
            ("PresentationFormat", self.presentation_format.clone()),
            ("Paragraphs", self.paragraphs.map(|n| n.to_string())),
            ("Slides", self.slides.map(|n| n.to_string())),
            ("Notes", self.notes.map(|n| n.to_string())),
            ("HiddenSlides", self.hidden_slides.map(|n| n.to_string())),
            ("MMClips", self.mm_clips.map(|n| n.to_string())),
            ("Manager", self.manager.clone()),
            ("Company", self.company.clone()),
            ("HyperlinkBase", self.hyperlink_base.clone()),
            ("Characters", self.characters.map(|n| n.to_string())),
            ("Lines", self.lines.map(|n| n.to_string())),
            ("Pages", self.pages.map(|n| n.to_string())),
            ("AppVersion", self.app_version.clone()),
        ];
        for (tag, value) in fields {
            if let Some(value) = value {
                xml.push_str(&format!("<{tag}>{}</{tag}>", escape_xml(&value)));
            }
        }

        xml.push_str("</Properties>");
        xml
    }
}

/// Read the text content of an XML element up to its end tag.
///
/// Entity references are resolved. Whitespace-only content is `None`.
fn read_text_element<B: BufRead>(
    reader: &mut Reader<B>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        buf.clear();
        match reader.read_event_into(buf) {
            Ok(Event::Text(e)) => text.push_str(&text_content(&e)),
            Ok(Event::GeneralRef(e)) => text.push_str(&general_ref_content(&e)),
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// W3CDTF rendition of a timestamp, as Office writes it.
fn w3cdtf(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 datetime string into a DateTime<Utc>.
///
/// Supports formats like:
/// - 2023-10-10T14:30:00Z
/// - 2023-10-10T14:30:00.1234567Z
/// - 2023-10-10T14:30:00
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Ok(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(OoxmlError::InvalidFormat(format!(
        "Invalid datetime format: {}",
        s
    )))
}
