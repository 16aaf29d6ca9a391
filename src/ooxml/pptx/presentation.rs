/// Main presentation object - the high-level read API over a deck.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::metadata::{CoreProperties, ExtendedProperties};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::parts::{IdEntry, PresentationPart};
use crate::ooxml::pptx::slide::{Slide, SlideMaster};

/// EMUs per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// A PowerPoint presentation.
///
/// Not intended to be constructed directly. Use `Package::presentation()` to
/// access a presentation.
///
/// # Examples
///
/// ```rust,no_run
/// use deckcraft::ooxml::pptx::Package;
///
/// let pkg = Package::open("presentation.pptx")?;
/// let pres = pkg.presentation()?;
///
/// if let Some((width, height)) = pres.slide_size_points()? {
///     println!("Slide size: {}x{} pt", width, height);
/// }
///
/// for slide in pres.slides()? {
///     println!("Slide {}: {:?}", slide.number(), slide.title()?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Presentation<'a> {
    /// The underlying presentation part
    part: PresentationPart<'a>,
    partname: PackURI,
    /// Reference to the OPC package for accessing related parts
    package: &'a OpcPackage,
}

impl<'a> Presentation<'a> {
    #[inline]
    pub(crate) fn new(part: PresentationPart<'a>, partname: PackURI, package: &'a OpcPackage) -> Self {
        Self {
            part,
            partname,
            package,
        }
    }

    /// Get the number of slides in the presentation.
    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.part.slide_ids()?.len())
    }

    /// Slide size `(cx, cy)` in EMUs.
    pub fn slide_size(&self) -> Result<Option<(i64, i64)>> {
        self.part.slide_size()
    }

    /// Slide size in whole points (one pixel per point at scale 1).
    pub fn slide_size_points(&self) -> Result<Option<(i64, i64)>> {
        Ok(self
            .slide_size()?
            .map(|(cx, cy)| (cx / EMU_PER_POINT, cy / EMU_PER_POINT)))
    }

    /// Notes page size `(cx, cy)` in EMUs.
    pub fn notes_size(&self) -> Result<Option<(i64, i64)>> {
        self.part.notes_size()
    }

    /// All slides in presentation order.
    ///
    /// A slide list entry whose relationship does not resolve to a part is
    /// an error; the list is the only structure a deck is checked for.
    pub fn slides(&self) -> Result<Vec<Slide<'a>>> {
        self.part
            .slide_ids()?
            .iter()
            .enumerate()
            .map(|(index, entry)| self.slide_from_entry(index, entry))
            .collect()
    }

    /// The slide at 0-based position `index`.
    pub fn slide(&self, index: usize) -> Result<Slide<'a>> {
        let ids = self.part.slide_ids()?;
        let entry = ids.get(index).ok_or(OoxmlError::SlideOutOfRange {
            index,
            count: ids.len(),
        })?;
        self.slide_from_entry(index, entry)
    }

    fn slide_from_entry(&self, index: usize, entry: &IdEntry) -> Result<Slide<'a>> {
        let partname = self.resolve(&entry.r_id)?;
        Slide::new(self.package, partname, index)
    }

    /// Slide masters in `p:sldMasterIdLst` order.
    pub fn masters(&self) -> Result<Vec<SlideMaster<'a>>> {
        self.part
            .master_ids()?
            .iter()
            .map(|entry| SlideMaster::new(self.package, self.resolve(&entry.r_id)?))
            .collect()
    }

    fn resolve(&self, r_id: &str) -> Result<PackURI> {
        let partname = self.package.related_partname(&self.partname, r_id)?;
        if !self.package.contains_part(&partname) {
            return Err(OoxmlError::PartNotFound(format!("{} ({})", partname, r_id)));
        }
        Ok(partname)
    }

    /// Typefaces of `p:embeddedFontLst`.
    pub fn embedded_fonts(&self) -> Result<Vec<String>> {
        self.part.embedded_fonts()
    }

    pub fn auto_compress_pictures(&self) -> Result<bool> {
        self.part.auto_compress_pictures()
    }

    pub fn compat_mode(&self) -> Result<bool> {
        self.part.compat_mode()
    }

    /// Core document properties (`docProps/core.xml`).
    pub fn core_properties(&self) -> Result<CoreProperties> {
        CoreProperties::from_package(self.package)
    }

    /// Extended document properties (`docProps/app.xml`).
    pub fn extended_properties(&self) -> Result<ExtendedProperties> {
        ExtendedProperties::from_package(self.package)
    }

    /// Get access to the underlying presentation part.
    #[inline]
    pub fn part(&self) -> &PresentationPart<'a> {
        &self.part
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Get access to the underlying OPC package.
    #[inline]
    pub fn package(&self) -> &'a OpcPackage {
        self.package
    }
}
