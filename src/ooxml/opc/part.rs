//! Parts: the named, typed byte streams a package is made of.
//!
//! XML parts and binary parts (pictures, fonts, media) differ only in how
//! they are loaded. Both keep their bytes behind an `Arc`, so copying a part
//! into another deck does not copy its content.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use quick_xml::Reader;
use std::sync::Arc;

/// A part with its relationships.
pub trait Part: Send + Sync {
    fn partname(&self) -> &PackURI;

    fn content_type(&self) -> &str;

    fn blob(&self) -> &[u8];

    /// Shared handle to the content, for copying a part without copying its bytes.
    fn shared_blob(&self) -> Arc<Vec<u8>>;

    /// Replace the content of this part.
    fn set_blob(&mut self, blob: Vec<u8>);

    fn rels(&self) -> &Relationships;

    fn rels_mut(&mut self) -> &mut Relationships;

    /// rId of the relationship of `reltype` to `target_ref`, added if missing.
    fn relate_to(&mut self, target_ref: &str, reltype: &str) -> String {
        let rel = self.rels_mut().get_or_add(reltype, target_ref);
        rel.r_id().to_string()
    }

    /// Target reference written for `r_id`.
    fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))
    }

    /// Reader over the content that skips whitespace-only text.
    fn xml_reader(&self) -> Reader<&[u8]> {
        let mut reader = Reader::from_reader(self.blob());
        reader.config_mut().trim_text(true);
        reader
    }
}

/// Non-XML content: pictures, fonts, embedded media.
#[derive(Debug, Clone)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Arc<Vec<u8>>,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        Self::shared(partname, content_type, Arc::new(blob))
    }

    /// Create a BlobPart over bytes already owned elsewhere.
    pub fn shared(partname: PackURI, content_type: String, blob: Arc<Vec<u8>>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn shared_blob(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.blob)
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// An XML part.
///
/// Stores the raw XML as UTF-8 bytes; parsing happens on demand with
/// quick-xml through [`Part::xml_reader`].
#[derive(Debug, Clone)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Arc<Vec<u8>>,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Self {
        Self::shared(partname, content_type, Arc::new(xml_bytes))
    }

    /// Create an XmlPart over bytes already owned elsewhere.
    pub fn shared(partname: PackURI, content_type: String, xml_bytes: Arc<Vec<u8>>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes,
            rels,
        }
    }

    /// Load an XML part from raw data, checking that it is UTF-8.
    pub fn load(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes)
            .map_err(|e| OpcError::XmlError(format!("Invalid UTF-8 in {}: {}", partname, e)))?;

        Ok(Self::new(partname, content_type, xml_bytes))
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.xml_bytes
    }

    fn shared_blob(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.xml_bytes)
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.xml_bytes = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// Chooses [`XmlPart`] or [`BlobPart`] from the content type.
pub struct PartFactory;

impl PartFactory {
    /// Load a part from raw data, selecting the Part type from the content type.
    pub fn load(partname: PackURI, content_type: String, blob: Vec<u8>) -> Result<Box<dyn Part>> {
        if Self::is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }

    /// Build a part over shared bytes without validating them again.
    ///
    /// Used when copying a part that was already loaded into another package.
    pub fn copy_of(source: &dyn Part, partname: PackURI) -> Box<dyn Part> {
        let content_type = source.content_type().to_string();
        if Self::is_xml_content_type(&content_type) {
            Box::new(XmlPart::shared(partname, content_type, source.shared_blob()))
        } else {
            Box::new(BlobPart::shared(partname, content_type, source.shared_blob()))
        }
    }

    #[inline]
    fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    #[test]
    fn test_blob_part() {
        let partname = PackURI::new("/ppt/media/image1.png").unwrap();
        let content = vec![0x89, 0x50, 0x4E, 0x47];
        let part = BlobPart::new(partname, "image/png".to_string(), content.clone());

        assert_eq!(part.content_type(), "image/png");
        assert_eq!(part.blob(), content.as_slice());
        assert_eq!(part.rels().base_uri(), "/ppt/media");
    }

    #[test]
    fn test_xml_part_reader() {
        let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let xml = b"<p:sld>\n  <p:cSld/>\n</p:sld>".to_vec();
        let part = XmlPart::new(partname, "application/xml".to_string(), xml);

        let mut reader = part.xml_reader();
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).into_owned())
                },
                Event::Eof => break,
                _ => {},
            }
        }
        assert_eq!(names, vec!["p:sld", "p:cSld"]);
    }

    #[test]
    fn test_copy_of_shares_bytes() {
        let part = XmlPart::new(
            PackURI::new("/ppt/theme/theme1.xml").unwrap(),
            "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
            b"<a:theme/>".to_vec(),
        );
        let copy = PartFactory::copy_of(&part, PackURI::new("/ppt/theme/theme4.xml").unwrap());
        assert_eq!(copy.partname().as_str(), "/ppt/theme/theme4.xml");
        assert!(Arc::ptr_eq(&copy.shared_blob(), &part.shared_blob()));
        assert!(copy.rels().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert!(XmlPart::load(partname, "application/xml".into(), vec![0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_is_xml_content_type() {
        assert!(PartFactory::is_xml_content_type("application/xml"));
        assert!(PartFactory::is_xml_content_type(
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml"
        ));
        assert!(!PartFactory::is_xml_content_type("image/png"));
    }
}
