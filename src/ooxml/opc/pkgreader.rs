//! Decoding of a ZIP member map into serialized parts.
//!
//! Parts are discovered by walking relationships from the package root. ZIP
//! members that nothing points at never become parts, so a deck saved after
//! reading carries no orphans.

use crate::common::xml::attr_value;
use crate::ooxml::opc::constants::{content_type as ct, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Relationships of one source, usually a handful.
pub type SerializedRels = SmallVec<[SerializedRelationship; 8]>;

/// A part's bytes with its content type and outgoing relationships.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Vec<u8>,
    pub srels: SerializedRels,
}

/// One `<Relationship>` of a `.rels` member, still unresolved.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Directory the target is relative to
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub external: bool,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Absolute part name of an internal target.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} points outside the package",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// `[Content_Types].xml`: overrides by part name, defaults by extension.
/// Both keys compare case-insensitively.
#[derive(Debug, Default)]
struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        for_each_empty(xml, "content types", |e| {
            let Some(content_type) = attr_value(e, b"ContentType") else {
                return;
            };
            match e.local_name().as_ref() {
                b"Default" => {
                    if let Some(ext) = attr_value(e, b"Extension") {
                        map.defaults.insert(ext.to_lowercase(), content_type);
                    }
                },
                b"Override" => {
                    if let Some(name) = attr_value(e, b"PartName") {
                        map.overrides.insert(name.to_lowercase(), content_type);
                    }
                },
                _ => {},
            }
        })?;
        Ok(map)
    }

    fn get(&self, partname: &PackURI) -> Option<&str> {
        self.overrides
            .get(&partname.as_str().to_lowercase())
            .or_else(|| self.defaults.get(&partname.ext().to_lowercase()))
            .map(String::as_str)
    }
}

/// Call `visit` for every element of `xml` that is a start or empty tag.
fn for_each_empty(xml: &[u8], what: &str, mut visit: impl FnMut(&BytesStart<'_>)) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => visit(e),
            Ok(Event::Eof) => return Ok(()),
            Err(e) => return Err(OpcError::XmlError(format!("{}: {}", what, e))),
            _ => {},
        }
        buf.clear();
    }
}

fn parse_rels(xml: &[u8], base_uri: &str) -> Result<SerializedRels> {
    let mut srels = SerializedRels::new();
    for_each_empty(xml, "relationships", |e| {
        if e.local_name().as_ref() != b"Relationship" {
            return;
        }
        let (Some(r_id), Some(reltype), Some(target_ref)) = (
            attr_value(e, b"Id"),
            attr_value(e, b"Type"),
            attr_value(e, b"Target"),
        ) else {
            return;
        };
        let external = attr_value(e, b"TargetMode").as_deref() == Some(target_mode::EXTERNAL);
        srels.push(SerializedRelationship {
            base_uri: base_uri.to_string(),
            r_id,
            reltype,
            target_ref,
            external,
        });
    })?;
    Ok(srels)
}

/// A package decoded into package relationships and reachable parts.
pub struct PackageReader {
    pkg_srels: SerializedRels,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    pub fn from_phys_reader(phys_reader: PhysPkgReader) -> Result<Self> {
        let mut members = phys_reader.into_members();

        let types_xml = members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;
        let content_types = ContentTypeMap::from_xml(types_xml)?;

        let root = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = rels_of(&members, &root)?;
        let sparts = walk(&mut members, &pkg_srels, &content_types)?;
        log::debug!("Read {} parts", sparts.len());

        Ok(Self { pkg_srels, sparts })
    }

    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    pub fn sparts(&self) -> &[SerializedPart] {
        &self.sparts
    }

    pub fn into_parts(self) -> (SerializedRels, Vec<SerializedPart>) {
        (self.pkg_srels, self.sparts)
    }
}

fn rels_of(members: &HashMap<String, Vec<u8>>, source: &PackURI) -> Result<SerializedRels> {
    let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
    match members.get(rels_uri.membername()) {
        Some(xml) => parse_rels(xml, source.base_uri()),
        None => Ok(SerializedRels::new()),
    }
}

/// Take the bytes of every part reachable from `roots` out of `members`.
///
/// A relationship to a missing member is skipped; it is dropped when the
/// package is written back.
fn walk(
    members: &mut HashMap<String, Vec<u8>>,
    roots: &[SerializedRelationship],
    content_types: &ContentTypeMap,
) -> Result<Vec<SerializedPart>> {
    let mut seen = HashSet::new();
    let mut queue: Vec<PackURI> = Vec::new();
    let mut enqueue = |srels: &[SerializedRelationship], queue: &mut Vec<PackURI>| {
        for srel in srels.iter().filter(|srel| !srel.external) {
            if let Ok(target) = srel.target_partname()
                && seen.insert(target.as_str().to_string())
            {
                queue.push(target);
            }
        }
    };
    enqueue(roots, &mut queue);

    let mut sparts = Vec::with_capacity(32);
    while let Some(partname) = queue.pop() {
        let srels = rels_of(members, &partname)?;
        enqueue(&srels, &mut queue);

        let Some(blob) = members.remove(partname.membername()) else {
            log::warn!("Relationship target {} is missing from the package", partname);
            continue;
        };
        let content_type = match content_types.get(&partname) {
            Some(content_type) => content_type.to_string(),
            None => {
                log::warn!("No content type for {}, storing as binary", partname);
                ct::OCTET_STREAM.to_string()
            },
        };
        sparts.push(SerializedPart {
            partname,
            content_type,
            blob,
            srels,
        });
    }
    Ok(sparts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::phys_pkg::PhysPkgWriter;

    #[test]
    fn test_content_type_lookup() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="PNG" ContentType="image/png"/>
                <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
            </Types>"#;
        let map = ContentTypeMap::from_xml(xml).unwrap();

        let get = |name: &str| map.get(&PackURI::new(name).unwrap()).map(str::to_string);
        assert_eq!(get("/docProps/app.xml").as_deref(), Some("application/xml"));
        assert_eq!(get("/ppt/media/image1.png").as_deref(), Some("image/png"));
        assert!(get("/PPT/Presentation.xml").unwrap().ends_with("presentation.main+xml"));
        assert_eq!(get("/ppt/fonts/font1.fntdata"), None);
    }

    #[test]
    fn test_external_target_has_no_partname() {
        let srels = parse_rels(
            br#"<Relationships><Relationship Id="rId4" Type="t/hyperlink" Target="https://nuxeo.com" TargetMode="External"/></Relationships>"#,
            "/ppt/slides",
        )
        .unwrap();
        assert_eq!(srels.len(), 1);
        assert!(srels[0].is_external());
        assert!(matches!(srels[0].target_partname(), Err(OpcError::InvalidRelationship(_))));
    }

    #[test]
    fn test_walk_skips_unreachable_members() {
        let mut writer = PhysPkgWriter::new();
        let put = |w: &mut PhysPkgWriter, name: &str, body: &str| {
            w.write(&PackURI::new(name).unwrap(), body.as_bytes()).unwrap();
        };
        put(
            &mut writer,
            "/[Content_Types].xml",
            r#"<Types><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#,
        );
        put(
            &mut writer,
            "/_rels/.rels",
            r#"<Relationships><Relationship Id="rId1" Type="t/doc" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="t/gone" Target="ppt/missing.xml"/></Relationships>"#,
        );
        put(&mut writer, "/ppt/presentation.xml", "<p:presentation/>");
        put(&mut writer, "/ppt/orphan.xml", "<orphan/>");
        let bytes = writer.finish().unwrap();

        let phys = PhysPkgReader::from_bytes(&bytes).unwrap();
        let reader = PackageReader::from_phys_reader(phys).unwrap();
        let names: Vec<&str> = reader.sparts().iter().map(|p| p.partname.as_str()).collect();
        assert_eq!(names, vec!["/ppt/presentation.xml"]);
        assert_eq!(reader.pkg_srels().len(), 2);
    }
}
