/// Slide parts and related types.
///
/// Slides, slide layouts and slide masters share the `p:cSld` common slide
/// data, so one part wrapper answers for all three; the master-only queries
/// return empty results on the others.
use crate::common::xml::{Element, attr_value, attr_value_local};
use crate::ooxml::error::Result;
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::parts::presentation::IdEntry;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

/// A slide, slide layout or slide master part.
///
/// Corresponds to `/ppt/slides/slideN.xml`, `/ppt/slideLayouts/slideLayoutN.xml`
/// or `/ppt/slideMasters/slideMasterN.xml` in the package.
pub struct SlidePart<'a> {
    /// The underlying OPC part
    part: &'a dyn Part,
}

impl<'a> SlidePart<'a> {
    /// Create a SlidePart from an OPC Part.
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        Ok(Self { part })
    }

    #[inline]
    fn xml_bytes(&self) -> &[u8] {
        self.part.blob()
    }

    /// Get the name attribute of the `<p:cSld>` element, empty when absent.
    pub fn name(&self) -> Result<String> {
        let mut reader = Reader::from_reader(self.xml_bytes());
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cSld" => {
                    return Ok(attr_value(&e, b"name").unwrap_or_default());
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(String::new())
    }

    /// Whether the slide is hidden from the slide show (`show="0"`).
    pub fn is_hidden(&self) -> Result<bool> {
        Ok(self.root_attr(b"show")?.is_some_and(|v| v == "0" || v == "false"))
    }

    /// Whether master shapes are drawn beneath this sheet's own shapes.
    pub fn shows_master_shapes(&self) -> Result<bool> {
        Ok(!self
            .root_attr(b"showMasterSp")?
            .is_some_and(|v| v == "0" || v == "false"))
    }

    fn root_attr(&self, name: &[u8]) -> Result<Option<String>> {
        let mut reader = Reader::from_reader(self.xml_bytes());
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => return Ok(attr_value(&e, name)),
                Event::Eof => return Ok(None),
                _ => {},
            }
            buf.clear();
        }
    }

    /// Entries of `p:sldLayoutIdLst`; empty unless this is a slide master.
    pub fn layout_ids(&self) -> Result<Vec<IdEntry>> {
        read_layout_ids(self.xml_bytes())
    }

    /// Colour map of this sheet.
    ///
    /// For a master this is `p:clrMap`; for slides and layouts it is the
    /// `a:overrideClrMapping` of `p:clrMapOvr`, empty when the sheet follows
    /// its master.
    pub fn color_map(&self) -> Result<HashMap<String, String>> {
        let mut reader = Reader::from_reader(self.xml_bytes());
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e)
                    if matches!(e.local_name().as_ref(), b"clrMap" | b"overrideClrMapping") =>
                {
                    let mut map = HashMap::new();
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        map.insert(key, value);
                    }
                    return Ok(map);
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(HashMap::new())
    }

    /// Parse the whole part into an element tree.
    pub fn element(&self) -> Result<Element> {
        Element::from_bytes(self.xml_bytes())
    }

    /// Get the underlying OPC part.
    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }
}

fn read_layout_ids(xml: &[u8]) -> Result<Vec<IdEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldLayoutId" => {
                let id = attr_value(&e, b"id").and_then(|v| v.parse::<u32>().ok());
                let r_id = e.attributes().flatten().find_map(|attr| {
                    let prefixed = memchr::memchr(b':', attr.key.as_ref()).is_some();
                    (prefixed && attr.key.local_name().as_ref() == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).into_owned())
                });
                if let Some(r_id) = r_id {
                    entries.push(IdEntry { id, r_id });
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(entries)
}

/// Give every `p:sldLayoutId` of a master a fresh id, counting up from `next_id`.
///
/// `next_id` is left at the first unused value.
pub fn renumber_layout_ids(xml: &[u8], next_id: &mut u32) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if e.local_name().as_ref() == b"sldLayoutId" => {
                let updated = with_id(&e, *next_id)?;
                *next_id = next_id.saturating_add(1);
                writer.write_event(Event::Empty(updated))?;
            },
            Event::Start(e) if e.local_name().as_ref() == b"sldLayoutId" => {
                let updated = with_id(&e, *next_id)?;
                *next_id = next_id.saturating_add(1);
                writer.write_event(Event::Start(updated))?;
            },
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// Remove the hyperlinks (`a:hlinkClick`, `a:hlinkHover`) whose `r:id` is
/// one of `r_ids`.
///
/// Used when the relationships behind them are dropped, typically jumps to
/// slides that are no longer in the deck. The text or shape carrying the
/// link stays.
pub fn remove_link_references(xml: &[u8], r_ids: &HashSet<String>) -> Result<Vec<u8>> {
    let is_dropped_link = |e: &BytesStart<'_>| -> bool {
        matches!(e.local_name().as_ref(), b"hlinkClick" | b"hlinkHover")
            && attr_value_local(e, b"id").is_some_and(|r_id| r_ids.contains(&r_id))
    };

    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if is_dropped_link(&e) => {},
            Event::Start(e) if is_dropped_link(&e) => {
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

fn with_id(e: &BytesStart<'_>, id: u32) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut updated = BytesStart::new(name);
    let id = id.to_string();
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"id" {
            updated.push_attribute(("id", id.as_str()));
        } else {
            updated.push_attribute(attr);
        }
    }
    Ok(updated)
}
