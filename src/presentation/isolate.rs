//! Single-slide decks cut out of a larger deck.
//!
//! Two strategies produce the same result:
//!
//! - **Subtractive**: reopen the source bytes and delete every other slide.
//!   Parts that only the deleted slides used are pruned when the package is
//!   cleaned up, so nothing the kept slide needs can go missing.
//! - **Cloning**: start from an empty skeleton with the source's page size and
//!   properties and import the slide with everything it depends on. The source
//!   is only read.

use crate::common::Result;
use crate::ooxml::pptx::skeleton::{DEFAULT_NOTES_SIZE, DEFAULT_SLIDE_SIZE};
use crate::ooxml::pptx::{DeckSkeleton, Package, SlideImporter};
use crate::presentation::deck::open_deck;

/// Keep only slide `index` of a deck given as bytes.
pub fn isolate_subtractive(deck: &[u8], index: usize) -> Result<Package> {
    let mut package = open_deck(deck)?;
    package.keep_only(index)?;
    Ok(package)
}

/// Empty deck with the page sizes and document properties of `source`.
pub fn skeleton_like(source: &Package) -> Result<Package> {
    let pres = source.presentation()?;
    let slide_size = pres.slide_size()?.unwrap_or(DEFAULT_SLIDE_SIZE);
    let notes_size = pres.notes_size()?.unwrap_or(DEFAULT_NOTES_SIZE);
    Ok(DeckSkeleton::new(slide_size)
        .with_notes_size(notes_size)
        .with_properties_of(source.opc())
        .build()?)
}

/// Copy slide `index` of `source` into a fresh deck.
pub fn isolate_cloning(source: &Package, index: usize) -> Result<Package> {
    let slide = source.presentation()?.slide(index)?;
    let mut dest = skeleton_like(source)?;
    SlideImporter::new(source.opc()).import_slide(&mut dest, slide.partname())?;
    Ok(dest)
}
