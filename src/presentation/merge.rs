//! Concatenation of several decks into one.

use crate::common::Result;
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::skeleton::DEFAULT_SLIDE_SIZE;
use crate::ooxml::pptx::{DeckSkeleton, Package, SlideImporter};
use crate::presentation::artifact::Artifact;
use crate::presentation::deck::open_deck;

/// A layout of `dest` named `layout_name` under a master named `master_name`.
///
/// Masters are searched in slide master list order and the first match wins.
fn find_layout(dest: &Package, master_name: &str, layout_name: &str) -> Result<Option<PackURI>> {
    for master in dest.presentation()?.masters()? {
        if master.name()? != master_name {
            continue;
        }
        if let Some(layout) = master.layout_by_name(layout_name)? {
            return Ok(Some(layout.partname().clone()));
        }
    }
    Ok(None)
}

/// Open a source deck and resolve the layout and master of every slide, so a
/// broken source is rejected before any of its slides reach the result.
fn open_source(data: &[u8]) -> Result<Package> {
    let source = open_deck(data)?;
    for slide in source.presentation()?.slides()? {
        let layout = slide.layout()?;
        layout.name()?;
        let master = layout.master()?;
        master.name()?;
        master.layouts()?;
    }
    Ok(source)
}

/// Merge the slides of `decks` in order.
///
/// Decks that fail to open or have no slides are skipped. With
/// `reuse_masters`, a slide whose master and layout names already exist in
/// the result is attached to that layout instead of bringing its own copy.
///
/// Returns `None` when there is nothing to merge.
pub fn merge_decks(decks: &[Artifact], reuse_masters: bool) -> Result<Option<Package>> {
    let mut dest: Option<Package> = None;
    let mut merged = 0usize;

    for (position, deck) in decks.iter().enumerate() {
        let label = deck.file_name().unwrap_or("<unnamed>");
        let source = match open_source(&deck.data) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Skipping deck {} ({}): {}", position, label, e);
                continue;
            },
        };
        let pres = source.presentation()?;

        if dest.is_none() {
            let size = pres.slide_size()?.unwrap_or(DEFAULT_SLIDE_SIZE);
            dest = Some(DeckSkeleton::new(size).build()?);
        }
        let Some(dest) = dest.as_mut() else {
            continue;
        };

        let slides = pres.slides()?;
        if slides.is_empty() {
            log::warn!("Skipping deck {} ({}): no slides", position, label);
            continue;
        }

        let mut importer = SlideImporter::new(source.opc());
        for slide in &slides {
            let target = if reuse_masters {
                let layout = slide.layout()?;
                find_layout(dest, &layout.master()?.name()?, &layout.name()?)?
            } else {
                None
            };
            match target {
                Some(layout) => importer.import_slide_onto_layout(dest, slide.partname(), &layout)?,
                None => importer.import_slide(dest, slide.partname())?,
            };
            merged += 1;
        }
        log::debug!("Merged {} slides from deck {} ({})", slides.len(), position, label);
    }

    if merged == 0 {
        if !decks.is_empty() {
            log::warn!("No slide could be merged from {} decks", decks.len());
        }
        return Ok(None);
    }
    Ok(dest)
}
