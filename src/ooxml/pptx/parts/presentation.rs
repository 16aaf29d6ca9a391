/// Presentation part - the main part in a .pptx package.
///
/// Corresponds to `/ppt/presentation.xml` in the package. Reads go through
/// [`PresentationPart`]; edits to the id lists are streaming rewrites over the
/// raw XML so everything the deck carries that is not touched (sections,
/// extension lists, default text styles) survives byte for byte.
use crate::common::xml::{attr_value, prefix_for_namespace, qname_prefix, qualify};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::Part;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// An entry of one of the presentation's id lists (`p:sldId`, `p:sldMasterId`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEntry {
    /// Numeric id, absent on `p:notesMasterId`
    pub id: Option<u32>,
    /// Relationship id of the referenced part
    pub r_id: String,
}

/// The id lists of `p:presentation` that reference parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdList {
    SlideMasters,
    NotesMasters,
    Slides,
}

impl IdList {
    fn list_name(self) -> &'static str {
        match self {
            IdList::SlideMasters => "sldMasterIdLst",
            IdList::NotesMasters => "notesMasterIdLst",
            IdList::Slides => "sldIdLst",
        }
    }

    fn entry_name(self) -> &'static str {
        match self {
            IdList::SlideMasters => "sldMasterId",
            IdList::NotesMasters => "notesMasterId",
            IdList::Slides => "sldId",
        }
    }

    /// Children of `p:presentation` that must come after this list.
    fn successors(self) -> &'static [&'static str] {
        const AFTER_SLIDES: &[&str] = &[
            "sldSz",
            "notesSz",
            "smartTags",
            "embeddedFontLst",
            "custShowLst",
            "photoAlbum",
            "custDataLst",
            "kinsoku",
            "defaultTextStyle",
            "modifyVerifier",
            "extLst",
        ];
        const AFTER_NOTES: &[&str] = &[
            "handoutMasterIdLst",
            "sldIdLst",
            "sldSz",
            "notesSz",
            "smartTags",
            "embeddedFontLst",
            "custShowLst",
            "photoAlbum",
            "custDataLst",
            "kinsoku",
            "defaultTextStyle",
            "modifyVerifier",
            "extLst",
        ];
        const AFTER_MASTERS: &[&str] = &[
            "notesMasterIdLst",
            "handoutMasterIdLst",
            "sldIdLst",
            "sldSz",
            "notesSz",
            "smartTags",
            "embeddedFontLst",
            "custShowLst",
            "photoAlbum",
            "custDataLst",
            "kinsoku",
            "defaultTextStyle",
            "modifyVerifier",
            "extLst",
        ];
        match self {
            IdList::SlideMasters => AFTER_MASTERS,
            IdList::NotesMasters => AFTER_NOTES,
            IdList::Slides => AFTER_SLIDES,
        }
    }
}

/// The main presentation part.
///
/// # Example
///
/// ```rust,ignore
/// let pres_part = PresentationPart::from_part(opc_part)?;
/// let slide_count = pres_part.slide_ids()?.len();
/// ```
pub struct PresentationPart<'a> {
    /// The underlying OPC part
    part: &'a dyn Part,
}

impl<'a> PresentationPart<'a> {
    /// Create a PresentationPart from an OPC Part.
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        Ok(Self { part })
    }

    #[inline]
    fn xml_bytes(&self) -> &[u8] {
        self.part.blob()
    }

    /// Entries of `p:sldIdLst`, in presentation order.
    pub fn slide_ids(&self) -> Result<Vec<IdEntry>> {
        read_id_list(self.xml_bytes(), IdList::Slides)
    }

    /// Entries of `p:sldMasterIdLst`, in presentation order.
    pub fn master_ids(&self) -> Result<Vec<IdEntry>> {
        read_id_list(self.xml_bytes(), IdList::SlideMasters)
    }

    /// Entries of `p:notesMasterIdLst`.
    pub fn notes_master_ids(&self) -> Result<Vec<IdEntry>> {
        read_id_list(self.xml_bytes(), IdList::NotesMasters)
    }

    /// Slide size `(cx, cy)` in EMUs, if declared.
    pub fn slide_size(&self) -> Result<Option<(i64, i64)>> {
        read_extent(self.xml_bytes(), b"sldSz")
    }

    /// Notes page size `(cx, cy)` in EMUs, if declared.
    pub fn notes_size(&self) -> Result<Option<(i64, i64)>> {
        read_extent(self.xml_bytes(), b"notesSz")
    }

    /// Typefaces listed in `p:embeddedFontLst`, in document order.
    pub fn embedded_fonts(&self) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(self.xml_bytes());
        reader.config_mut().trim_text(true);

        let mut fonts = Vec::new();
        let mut in_embedded_font = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"embeddedFont" => {
                    in_embedded_font = true;
                },
                Event::End(e) if e.local_name().as_ref() == b"embeddedFont" => {
                    in_embedded_font = false;
                },
                Event::Start(e) | Event::Empty(e)
                    if in_embedded_font && e.local_name().as_ref() == b"font" =>
                {
                    if let Some(typeface) = attr_value(&e, b"typeface") {
                        fonts.push(typeface);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(fonts)
    }

    /// `p:presentation/@autoCompressPictures`, true unless set to false.
    pub fn auto_compress_pictures(&self) -> Result<bool> {
        Ok(read_root_flag(self.xml_bytes(), b"autoCompressPictures")?.unwrap_or(true))
    }

    /// `p:presentation/@compatMode`, false unless set.
    pub fn compat_mode(&self) -> Result<bool> {
        Ok(read_root_flag(self.xml_bytes(), b"compatMode")?.unwrap_or(false))
    }

    /// Get the underlying OPC part.
    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }
}

/// Relationship id attribute of an element (`r:id`), told apart from a plain `id`.
fn rel_id_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let key = attr.key.as_ref();
        let prefixed = memchr::memchr(b':', key).is_some();
        (prefixed && attr.key.local_name().as_ref() == b"id")
            .then(|| String::from_utf8_lossy(&attr.value).into_owned())
    })
}

/// Read one id list. Only entries directly under the list element that is a
/// child of the root count; `p14:sldIdLst` inside sections is not a slide list.
pub fn read_id_list(xml: &[u8], list: IdList) -> Result<Vec<IdEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let list_name = list.list_name().as_bytes();
    let entry_name = list.entry_name().as_bytes();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut in_list = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 && e.local_name().as_ref() == list_name {
                    in_list = true;
                } else if in_list && depth == 3 && e.local_name().as_ref() == entry_name {
                    entries.extend(id_entry(&e));
                }
            },
            Event::Empty(e) => {
                if in_list && depth == 2 && e.local_name().as_ref() == entry_name {
                    entries.extend(id_entry(&e));
                }
            },
            Event::End(_) => {
                if depth == 2 {
                    in_list = false;
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(entries)
}

fn id_entry(e: &BytesStart<'_>) -> Option<IdEntry> {
    let r_id = rel_id_attr(e)?;
    let id = e
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"id")
        .and_then(|attr| atoi_simd::parse::<u32>(attr.value.as_ref()).ok());
    Some(IdEntry { id, r_id })
}

fn read_extent(xml: &[u8], local: &[u8]) -> Result<Option<(i64, i64)>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == local => {
                let cx = attr_value(&e, b"cx").and_then(|v| v.parse::<i64>().ok());
                let cy = attr_value(&e, b"cy").and_then(|v| v.parse::<i64>().ok());
                return Ok(cx.zip(cy));
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(None)
}

fn read_root_flag(xml: &[u8], attr: &[u8]) -> Result<Option<bool>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(attr_value(&e, attr).map(|v| v == "1" || v == "true"));
            },
            Event::Eof => return Ok(None),
            _ => {},
        }
        buf.clear();
    }
}

/// Drop every reference to a slide from `presentation.xml`.
///
/// Removes the `p:sldId` entry with relationship id `r_id`, the matching
/// `p14:sldId` entries of the section list and the `p:sld` entries of
/// custom shows. The relationship itself is left to the caller.
pub fn remove_slide_references(xml: &[u8], r_id: &str) -> Result<Vec<u8>> {
    let slide_id = read_id_list(xml, IdList::Slides)?
        .into_iter()
        .find(|entry| entry.r_id == r_id)
        .and_then(|entry| entry.id);

    let is_reference = |e: &BytesStart<'_>| -> bool {
        match e.local_name().as_ref() {
            b"sldId" => match rel_id_attr(e) {
                Some(rel) => rel == r_id,
                None => {
                    let id = attr_value(e, b"id").and_then(|v| v.parse::<u32>().ok());
                    slide_id.is_some() && id == slide_id
                },
            },
            b"sld" => rel_id_attr(e).as_deref() == Some(r_id),
            _ => false,
        }
    };

    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if is_reference(&e) => {},
            Event::Start(e) if is_reference(&e) => {
                let name = e.name().as_ref().to_vec();
                reader.read_to_end_into(QName(&name), &mut skip_buf)?;
                skip_buf.clear();
            },
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// Append an entry to one of the id lists, creating the list in schema
/// position when the document has none.
pub fn append_id_entry(xml: &[u8], list: IdList, id: Option<u32>, r_id: &str) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len() + 128)));
    let mut buf = Vec::new();

    let list_name = list.list_name();
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut r_prefix: Option<String> = None;
    let mut in_list = false;
    let mut done = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) => {
                if depth == 0 {
                    prefix = qname_prefix(e);
                    r_prefix = prefix_for_namespace(e, namespace::OFC_RELATIONSHIPS);
                } else if depth == 1 && !done {
                    let local = e.local_name();
                    if local.as_ref() == list_name.as_bytes() {
                        in_list = true;
                    } else if is_successor(list, local.as_ref()) {
                        write_list(&mut writer, list, &prefix, r_prefix.as_deref(), id, r_id)?;
                        done = true;
                    }
                }
                depth += 1;
                writer.write_event(event)?;
            },
            Event::Empty(ref e) if depth == 1 && !done => {
                let local = e.local_name();
                if local.as_ref() == list_name.as_bytes() {
                    write_list(&mut writer, list, &prefix, r_prefix.as_deref(), id, r_id)?;
                    done = true;
                } else {
                    if is_successor(list, local.as_ref()) {
                        write_list(&mut writer, list, &prefix, r_prefix.as_deref(), id, r_id)?;
                        done = true;
                    }
                    writer.write_event(event)?;
                }
            },
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if in_list && depth == 1 {
                    write_entry(&mut writer, list, &prefix, r_prefix.as_deref(), id, r_id)?;
                    in_list = false;
                    done = true;
                } else if depth == 0 && !done {
                    write_list(&mut writer, list, &prefix, r_prefix.as_deref(), id, r_id)?;
                    done = true;
                }
                writer.write_event(event)?;
            },
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

fn is_successor(list: IdList, local: &[u8]) -> bool {
    list.successors().iter().any(|s| s.as_bytes() == local)
}

fn write_list(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    list: IdList,
    prefix: &str,
    r_prefix: Option<&str>,
    id: Option<u32>,
    r_id: &str,
) -> Result<()> {
    let name = qualify(prefix, list.list_name());
    writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
    write_entry(writer, list, prefix, r_prefix, id, r_id)?;
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn write_entry(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    list: IdList,
    prefix: &str,
    r_prefix: Option<&str>,
    id: Option<u32>,
    r_id: &str,
) -> Result<()> {
    let name = qualify(prefix, list.entry_name());
    let mut entry = BytesStart::new(name.as_str());
    if let Some(id) = id {
        entry.push_attribute(("id", id.to_string().as_str()));
    }
    match r_prefix {
        Some(r) => entry.push_attribute((qualify(r, "id").as_str(), r_id)),
        None => {
            entry.push_attribute(("xmlns:r", namespace::OFC_RELATIONSHIPS));
            entry.push_attribute(("r:id", r_id));
        },
    }
    writer.write_event(Event::Empty(entry))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::XmlPart;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" autoCompressPictures="0">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>
<p:embeddedFontLst><p:embeddedFont><p:font typeface="Lato"/><p:regular r:id="rId9"/></p:embeddedFont></p:embeddedFontLst>
<p:custShowLst><p:custShow name="Short" id="0"><p:sldLst><p:sld r:id="rId3"/><p:sld r:id="rId2"/></p:sldLst></p:custShow></p:custShowLst>
<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Default" id="{1}"><p14:sldIdLst><p14:sldId id="256"/><p14:sldId id="257"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>
</p:presentation>"#;

    fn part(xml: &str) -> XmlPart {
        XmlPart::new(
            PackURI::new("/ppt/presentation.xml").unwrap(),
            ct::PML_PRESENTATION_MAIN.to_string(),
            xml.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_reads() {
        let xml_part = part(PRESENTATION);
        let pres = PresentationPart::from_part(&xml_part).unwrap();

        let slides = pres.slide_ids().unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0], IdEntry { id: Some(256), r_id: "rId2".to_string() });
        assert_eq!(pres.master_ids().unwrap()[0].id, Some(2147483648));
        assert!(pres.notes_master_ids().unwrap().is_empty());
        assert_eq!(pres.slide_size().unwrap(), Some((12192000, 6858000)));
        assert_eq!(pres.notes_size().unwrap(), Some((6858000, 9144000)));
        assert_eq!(pres.embedded_fonts().unwrap(), vec!["Lato".to_string()]);
        assert!(!pres.auto_compress_pictures().unwrap());
        assert!(!pres.compat_mode().unwrap());
    }

    #[test]
    fn test_remove_slide_references() {
        let edited = remove_slide_references(PRESENTATION.as_bytes(), "rId3").unwrap();
        let text = String::from_utf8(edited.clone()).unwrap();

        let slides = read_id_list(&edited, IdList::Slides).unwrap();
        assert_eq!(slides, vec![IdEntry { id: Some(256), r_id: "rId2".to_string() }]);
        assert!(!text.contains(r#"<p14:sldId id="257"/>"#));
        assert!(text.contains(r#"<p14:sldId id="256"/>"#));
        assert!(!text.contains(r#"<p:sld r:id="rId3"/>"#));
        assert!(text.contains(r#"<p:sld r:id="rId2"/>"#));
        assert!(text.contains("embeddedFontLst"));
    }

    #[test]
    fn test_append_to_existing_list() {
        let edited =
            append_id_entry(PRESENTATION.as_bytes(), IdList::Slides, Some(258), "rId10").unwrap();
        let slides = read_id_list(&edited, IdList::Slides).unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[2], IdEntry { id: Some(258), r_id: "rId10".to_string() });
    }

    #[test]
    fn test_append_creates_missing_list_in_order() {
        let edited =
            append_id_entry(PRESENTATION.as_bytes(), IdList::NotesMasters, None, "rId11").unwrap();
        let text = String::from_utf8(edited.clone()).unwrap();
        let notes = text.find("<p:notesMasterIdLst>").unwrap();
        assert!(text.find("</p:sldMasterIdLst>").unwrap() < notes);
        assert!(notes < text.find("<p:sldIdLst>").unwrap());
        assert_eq!(
            read_id_list(&edited, IdList::NotesMasters).unwrap(),
            vec![IdEntry { id: None, r_id: "rId11".to_string() }]
        );
    }

    #[test]
    fn test_append_expands_empty_list() {
        let xml = r#"<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst/><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        let edited = append_id_entry(xml.as_bytes(), IdList::Slides, Some(256), "rId2").unwrap();
        assert_eq!(read_id_list(&edited, IdList::Slides).unwrap().len(), 1);
        let edited = append_id_entry(&edited, IdList::SlideMasters, Some(2147483648), "rId1").unwrap();
        let text = String::from_utf8(edited).unwrap();
        assert!(text.find("sldMasterIdLst").unwrap() < text.find("sldIdLst").unwrap());
    }
}
