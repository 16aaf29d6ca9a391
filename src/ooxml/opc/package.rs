/// Objects that implement reading and writing OPC packages.
///
/// This module provides the main OpcPackage type, which represents an Open Packaging
/// Convention package in memory. It manages parts and relationships, and provides
/// the mutations needed to add, drop and garbage-collect parts.
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;

/// Upper bound on the number tried by [`OpcPackage::next_partname`].
const PARTNAME_LIMIT: u32 = 10_000;

/// Main API class for working with OPC packages.
///
/// OpcPackage represents an Open Packaging Convention package in memory,
/// providing access to parts, relationships, and package-level operations.
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts in the package, indexed by partname
    parts: HashMap<String, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use deckcraft::ooxml::opc::package::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("deck.pptx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let phys_reader = PhysPkgReader::open(path)?;
        Self::from_phys_reader(phys_reader)
    }

    /// Load an OPC package from bytes held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_bytes(data)?;
        Self::from_phys_reader(phys_reader)
    }

    /// Load an OPC package from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_reader(reader)?;
        Self::from_phys_reader(phys_reader)
    }

    fn from_phys_reader(phys_reader: PhysPkgReader) -> Result<Self> {
        let pkg_reader = PackageReader::from_phys_reader(phys_reader)?;
        Self::unmarshal(pkg_reader)
    }

    /// Convert serialized parts and relationships into the in-memory object graph.
    fn unmarshal(pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();
        let (pkg_srels, sparts) = pkg_reader.into_parts();

        for srel in pkg_srels {
            let is_external = srel.is_external();
            package
                .rels
                .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
        }

        for spart in sparts {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut()
                    .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
            }
            package.add_part(part);
        }

        Ok(package)
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Serialize the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }

    /// Partname of the main document part (presentation.xml for a deck).
    pub fn main_partname(&self) -> Result<PackURI> {
        let rel = self.rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        rel.target_partname()
    }

    /// Get a reference to the main document part.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let partname = self.main_partname()?;
        self.get_part(&partname)
    }

    /// Get a part by its partname.
    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname.as_str())
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get a mutable reference to a part by its partname.
    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname.as_str())
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get a part by relationship type from the package level.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&dyn Part> {
        let rel = self.rels.part_with_reltype(reltype)?;
        let partname = rel.target_partname()?;
        self.get_part(&partname)
    }

    /// Resolve a relationship of `source` to the partname it targets.
    pub fn related_partname(&self, source: &PackURI, r_id: &str) -> Result<PackURI> {
        let part = self.get_part(source)?;
        let rel = part.rels().get(r_id).ok_or_else(|| {
            OpcError::RelationshipNotFound(format!("{} in {}", r_id, source))
        })?;
        rel.target_partname()
    }

    /// Partnames of the parts `source` relates to with `reltype`, in rId order.
    ///
    /// Targets missing from the package are skipped.
    pub fn related_of_type(&self, source: &PackURI, reltype: &str) -> Vec<PackURI> {
        let Ok(part) = self.get_part(source) else {
            return Vec::new();
        };
        part.rels()
            .of_type(reltype)
            .into_iter()
            .filter_map(|rel| rel.target_partname().ok())
            .filter(|target| self.contains_part(target))
            .collect()
    }

    /// Add a new part to the package, replacing any part with the same name.
    pub fn add_part(&mut self, part: Box<dyn Part>) {
        let partname = part.partname().to_string();
        self.parts.insert(partname, part);
    }

    /// Get an iterator over all parts in the package.
    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    /// Sorted partnames of all parts whose content type is `content_type`.
    pub fn partnames_of_type(&self, content_type: &str) -> Vec<PackURI> {
        let mut names: Vec<PackURI> = self
            .iter_parts()
            .filter(|part| part.content_type() == content_type)
            .map(|part| part.partname().clone())
            .collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    /// Get the number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Get a reference to the package-level relationships.
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Get a mutable reference to the package-level relationships.
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Relate the package to a part, returning the rId.
    pub fn relate_to(&mut self, target_ref: &str, reltype: &str) -> String {
        let rel = self.rels.get_or_add(reltype, target_ref);
        rel.r_id().to_string()
    }

    /// Find the next available partname for a part template.
    ///
    /// Useful for creating new parts with sequential numbering (e.g., slide1.xml, slide2.xml).
    ///
    /// # Example
    /// ```no_run
    /// # use deckcraft::ooxml::opc::package::OpcPackage;
    /// # let pkg = OpcPackage::new();
    /// let next_slide = pkg.next_partname("/ppt/slides/slide%d.xml");
    /// ```
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        for n in 1..=PARTNAME_LIMIT {
            let candidate = template.replace("%d", &n.to_string());
            if !self.parts.contains_key(&candidate) {
                return PackURI::new(candidate).map_err(OpcError::InvalidPackUri);
            }
        }
        Err(OpcError::PartnameExhausted(template.to_string()))
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname.as_str())
    }

    /// Remove every part that cannot be reached from the package relationships.
    ///
    /// Returns the number of parts removed.
    pub fn prune_unreachable(&mut self) -> usize {
        let mut reachable: HashSet<String> = HashSet::with_capacity(self.parts.len());
        let mut queue: Vec<PackURI> = self
            .rels
            .iter()
            .filter(|rel| !rel.is_external())
            .filter_map(|rel| rel.target_partname().ok())
            .collect();

        while let Some(partname) = queue.pop() {
            if !reachable.insert(partname.as_str().to_string()) {
                continue;
            }
            let Some(part) = self.parts.get(partname.as_str()) else {
                continue;
            };
            queue.extend(
                part.rels()
                    .iter()
                    .filter(|rel| !rel.is_external())
                    .filter_map(|rel| rel.target_partname().ok())
                    .filter(|target| !reachable.contains(target.as_str())),
            );
        }

        let before = self.parts.len();
        self.parts.retain(|name, _| reachable.contains(name));
        let removed = before - self.parts.len();
        if removed > 0 {
            log::debug!("Pruned {} unreachable parts", removed);
        }
        removed
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::part::XmlPart;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_minimal_pptx() -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(br#"<p:presentation/>"#).unwrap();

            writer.start_file("ppt/slides/slide1.xml", options).unwrap();
            writer.write_all(br#"<p:sld/>"#).unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_open_package() {
        let pkg = OpcPackage::from_reader(Cursor::new(create_minimal_pptx())).unwrap();
        assert_eq!(pkg.part_count(), 2);
    }

    #[test]
    fn test_main_document_part() {
        let pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let main_part = pkg.main_document_part().unwrap();
        assert_eq!(main_part.content_type(), ct::PML_PRESENTATION_MAIN);

        let main = pkg.main_partname().unwrap();
        let slides = pkg.related_of_type(&main, relationship_type::SLIDE);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(
            pkg.related_partname(&main, "rId2").unwrap().as_str(),
            "/ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn test_next_partname() {
        let pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let next = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
        assert_eq!(next.as_str(), "/ppt/slides/slide2.xml");
    }

    #[test]
    fn test_prune_unreachable() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        pkg.add_part(Box::new(XmlPart::new(
            PackURI::new("/ppt/slides/slide7.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            b"<p:sld/>".to_vec(),
        )));
        assert_eq!(pkg.part_count(), 3);
        assert_eq!(pkg.prune_unreachable(), 1);
        assert!(!pkg.contains_part(&PackURI::new("/ppt/slides/slide7.xml").unwrap()));

        let main = pkg.main_partname().unwrap();
        pkg.get_part_mut(&main).unwrap().rels_mut().remove("rId2");
        assert_eq!(pkg.prune_unreachable(), 1);
        assert_eq!(pkg.part_count(), 1);
    }

    #[test]
    fn test_save_and_reopen() {
        let pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.pptx");
        pkg.save(&path).unwrap();

        let reopened = OpcPackage::open(&path).unwrap();
        assert_eq!(reopened.part_count(), 2);
        assert_eq!(reopened.partnames_of_type(ct::PML_SLIDE).len(), 1);
    }
}
