/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::parts::PresentationPart;
use crate::ooxml::pptx::parts::presentation::remove_slide_references;
use crate::ooxml::pptx::parts::slide::remove_link_references;
use crate::ooxml::pptx::presentation::Presentation;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// This is the deck handle every operation works on. It wraps an OPC
/// package, checks that the main part is a presentation, and offers the
/// few mutations the engine needs: slide removal and, through
/// [`crate::ooxml::pptx::importer`], slide import.
///
/// # Examples
///
/// ```rust,no_run
/// use deckcraft::ooxml::pptx::Package;
///
/// let mut pkg = Package::open("presentation.pptx")?;
/// println!("{} slides", pkg.presentation()?.slide_count()?);
///
/// pkg.remove_slide(0)?;
/// let bytes = pkg.to_bytes()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Open a .pptx package held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Create a .pptx package from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Wrap an OPC package, verifying that its main part is a presentation.
    pub fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        // Regular and macro-enabled decks, templates and shows share one schema
        let content_type = main_part.content_type();
        if !matches!(
            content_type,
            ct::PML_PRESENTATION_MAIN | ct::PML_PRES_MACRO_MAIN | ct::PML_TEMPLATE_MAIN | ct::PML_SLIDESHOW_MAIN
        ) {
            return Err(OoxmlError::InvalidContentType {
                expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN),
                got: content_type.to_string(),
            });
        }

        log::debug!("Opened presentation with {} parts", opc.part_count());
        Ok(Self { opc })
    }

    /// Get the main presentation.
    pub fn presentation(&self) -> Result<Presentation<'_>> {
        let partname = self.presentation_partname()?;
        let part = PresentationPart::from_part(self.opc.get_part(&partname)?)?;
        Ok(Presentation::new(part, partname, &self.opc))
    }

    /// Partname of `presentation.xml`.
    pub fn presentation_partname(&self) -> Result<PackURI> {
        Ok(self.opc.main_partname()?)
    }

    /// Number of entries in the slide list.
    pub fn slide_count(&self) -> Result<usize> {
        self.presentation()?.slide_count()
    }

    /// Remove the slide at `index` from the slide list.
    ///
    /// Parts only the slide used (notes, comments, media) are pruned with it.
    /// Slide-jump hyperlinks to it from the remaining parts are dropped along
    /// with their relationships.
    pub fn remove_slide(&mut self, index: usize) -> Result<()> {
        let pres_name = self.presentation_partname()?;
        let slide_ids = PresentationPart::from_part(self.opc.get_part(&pres_name)?)?.slide_ids()?;
        let Some(entry) = slide_ids.get(index) else {
            return Err(OoxmlError::SlideOutOfRange {
                index,
                count: slide_ids.len(),
            });
        };

        let removed = self.opc.related_partname(&pres_name, &entry.r_id).ok();
        let part = self.opc.get_part_mut(&pres_name)?;
        let xml = remove_slide_references(part.blob(), &entry.r_id)?;
        part.set_blob(xml);
        part.rels_mut().remove(&entry.r_id);

        if let Some(removed) = removed {
            self.unlink_slide(&removed)?;
        }
        let pruned = self.opc.prune_unreachable();
        log::debug!("Removed slide {}, {} parts pruned", index + 1, pruned);
        Ok(())
    }

    /// Keep only the slide at `index`.
    ///
    /// Slides before it are removed from position 0, then the ones after it
    /// from position 1, so every removal addresses the live slide list.
    pub fn keep_only(&mut self, index: usize) -> Result<()> {
        let count = self.slide_count()?;
        if index >= count {
            return Err(OoxmlError::SlideOutOfRange { index, count });
        }
        for _ in 0..index {
            self.remove_slide(0)?;
        }
        for _ in index + 1..count {
            self.remove_slide(1)?;
        }
        Ok(())
    }

    /// Drop the slide relationships other parts hold on `slide`, and the
    /// hyperlinks using them.
    fn unlink_slide(&mut self, slide: &PackURI) -> Result<()> {
        let sources: Vec<PackURI> = self
            .opc
            .iter_parts()
            .filter(|p| p.partname() != slide)
            .map(|p| p.partname().clone())
            .collect();
        for source in sources {
            let part = self.opc.get_part_mut(&source)?;
            let mut dropped: HashSet<String> = HashSet::new();
            part.rels_mut().retain(|rel| {
                let links_here = !rel.is_external()
                    && rel.reltype() == rt::SLIDE
                    && rel.target_partname().is_ok_and(|target| &target == slide);
                if links_here {
                    dropped.insert(rel.r_id().to_string());
                }
                !links_here
            });
            if !dropped.is_empty() {
                let xml = remove_link_references(part.blob(), &dropped)?;
                part.set_blob(xml);
            }
        }
        Ok(())
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    /// Mutable access to the underlying OPC package.
    #[inline]
    pub fn opc_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    /// Serialize the deck.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Serialize the deck to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.opc.save(path)?)
    }
}
