//! Deep import of slides between decks.
//!
//! A slide is copied together with everything it reaches through
//! relationships: its layout, the layout's master (and with it every layout
//! of that master), the theme, media, notes and comments. Copied parts keep
//! the relationship ids of their originals and only the targets change, so
//! no `r:id` inside the copied XML has to be rewritten.
//!
//! Imported masters are registered in `p:sldMasterIdLst` with fresh ids in
//! the id space masters and layouts share, and imported slides are appended
//! to `p:sldIdLst`. Notes slides are mapped onto the destination's single
//! notes master.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcPackage, PackURI, PartFactory};
use crate::ooxml::pptx::Package;
use crate::ooxml::pptx::parts::presentation::{IdList, append_id_entry, read_id_list};
use crate::ooxml::pptx::parts::slide::{remove_link_references, renumber_layout_ids};
use crate::ooxml::pptx::parts::SlidePart;
use std::collections::{HashMap, HashSet};

/// Smallest slide id PowerPoint accepts.
pub const MIN_SLIDE_ID: u32 = 256;
/// Smallest id of the master/layout id space.
pub const MIN_MASTER_ID: u32 = 2_147_483_648;

/// A relationship to recreate on a copied part.
struct PendingRel {
    r_id: String,
    reltype: String,
    target_ref: String,
    is_external: bool,
}

/// Imports slides from one source deck.
///
/// The importer remembers which source parts it already copied, so slides
/// sharing a master share one copy of it. Use one importer per source deck
/// and destination pair.
pub struct SlideImporter<'s> {
    source: &'s OpcPackage,
    /// Source partname -> destination partname
    copied: HashMap<String, PackURI>,
    layout_override: Option<PackURI>,
}

impl<'s> SlideImporter<'s> {
    pub fn new(source: &'s OpcPackage) -> Self {
        Self {
            source,
            copied: HashMap::new(),
            layout_override: None,
        }
    }

    /// Copy a slide with its layout, master and theme, appending it to the
    /// slide list of `dest`. Returns the partname of the new slide.
    pub fn import_slide(&mut self, dest: &mut Package, slide: &PackURI) -> Result<PackURI> {
        self.import(dest, slide, None)
    }

    /// Copy a slide but point it at `layout`, a layout already in `dest`.
    ///
    /// Nothing of the source layout, master or theme is copied.
    pub fn import_slide_onto_layout(
        &mut self,
        dest: &mut Package,
        slide: &PackURI,
        layout: &PackURI,
    ) -> Result<PackURI> {
        if !dest.opc().contains_part(layout) {
            return Err(OoxmlError::PartNotFound(layout.to_string()));
        }
        self.import(dest, slide, Some(layout))
    }

    /// Number of distinct source parts copied so far.
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }

    fn import(&mut self, dest: &mut Package, slide: &PackURI, layout: Option<&PackURI>) -> Result<PackURI> {
        let source = self.source;
        let content_type = source.get_part(slide)?.content_type();
        if content_type != ct::PML_SLIDE {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_SLIDE.to_string(),
                got: content_type.to_string(),
            });
        }

        self.layout_override = layout.cloned();
        let copied = self.copy_slide(dest.opc_mut(), slide);
        self.layout_override = None;
        let new_slide = copied?;

        if !source.related_of_type(slide, rt::COMMENTS).is_empty() {
            self.ensure_comment_authors(dest.opc_mut())?;
        }
        register_slide(dest.opc_mut(), &new_slide)?;
        log::debug!("Imported slide {} as {}", slide, new_slide);
        Ok(new_slide)
    }

    fn copy_slide(&mut self, dest: &mut OpcPackage, slide: &PackURI) -> Result<PackURI> {
        // Importing the same source slide twice yields two slides
        self.copied.remove(slide.as_str());
        self.copy_generic(dest, slide)
    }

    /// Destination partname for a relationship target, copying it if needed.
    ///
    /// `None` means the relationship is dropped: links to other slides of
    /// the source deck that were not imported.
    fn copy_part(&mut self, dest: &mut OpcPackage, src_name: &PackURI) -> Result<Option<PackURI>> {
        if let Some(done) = self.copied.get(src_name.as_str()) {
            return Ok(Some(done.clone()));
        }

        let source = self.source;
        let content_type = source.get_part(src_name)?.content_type();
        match content_type {
            ct::PML_SLIDE => Ok(None),
            ct::PML_PRESENTATION_MAIN | ct::PML_PRES_MACRO_MAIN | ct::PML_TEMPLATE_MAIN | ct::PML_SLIDESHOW_MAIN => {
                Ok(Some(dest.main_partname()?))
            },
            ct::PML_NOTES_MASTER => {
                let pres_name = dest.main_partname()?;
                if let Some(existing) = dest.related_of_type(&pres_name, rt::NOTES_MASTER).into_iter().next() {
                    self.copied.insert(src_name.as_str().to_string(), existing.clone());
                    return Ok(Some(existing));
                }
                let copy = self.copy_generic(dest, src_name)?;
                register_notes_master(dest, &copy)?;
                Ok(Some(copy))
            },
            ct::PML_SLIDE_MASTER => {
                let copy = self.copy_generic(dest, src_name)?;
                register_master(dest, &copy)?;
                Ok(Some(copy))
            },
            _ => self.copy_generic(dest, src_name).map(Some),
        }
    }

    /// Copy one part under a fresh name and recurse into its relationships.
    fn copy_generic(&mut self, dest: &mut OpcPackage, src_name: &PackURI) -> Result<PackURI> {
        let source = self.source;
        let src = source.get_part(src_name)?;

        let new_name = dest.next_partname(&src_name.numbered_template())?;
        dest.add_part(PartFactory::copy_of(src, new_name.clone()));
        self.copied.insert(src_name.as_str().to_string(), new_name.clone());
        log::debug!("Copied part {} to {}", src_name, new_name);

        let is_slide = src.content_type() == ct::PML_SLIDE;
        let base_uri = new_name.base_uri().to_string();
        let mut pending = Vec::with_capacity(src.rels().len());
        let mut dropped: HashSet<String> = HashSet::new();

        for rel in src.rels().sorted() {
            if rel.is_external() {
                pending.push(PendingRel {
                    r_id: rel.r_id().to_string(),
                    reltype: rel.reltype().to_string(),
                    target_ref: rel.target_ref().to_string(),
                    is_external: true,
                });
                continue;
            }

            let retarget = if is_slide && rel.reltype() == rt::SLIDE_LAYOUT {
                self.layout_override.clone()
            } else {
                None
            };
            let target = match retarget {
                Some(layout) => Some(layout),
                None => match rel.target_partname() {
                    Ok(target) if source.contains_part(&target) => self.copy_part(dest, &target)?,
                    _ => None,
                },
            };

            match target {
                Some(target) => pending.push(PendingRel {
                    r_id: rel.r_id().to_string(),
                    reltype: rel.reltype().to_string(),
                    target_ref: target.relative_ref(&base_uri),
                    is_external: false,
                }),
                None => {
                    log::debug!("Dropped relationship {} of {}", rel.r_id(), src_name);
                    dropped.insert(rel.r_id().to_string());
                },
            }
        }

        let part = dest.get_part_mut(&new_name)?;
        for rel in pending {
            part.rels_mut()
                .add_relationship(rel.reltype, rel.target_ref, rel.r_id, rel.is_external);
        }
        // Hyperlinks through a dropped relationship would dangle
        if !dropped.is_empty() {
            let xml = remove_link_references(part.blob(), &dropped)?;
            part.set_blob(xml);
        }
        Ok(new_name)
    }

    /// Comments refer to authors by index into `commentAuthors.xml`, which
    /// hangs off the presentation rather than the slide.
    fn ensure_comment_authors(&mut self, dest: &mut OpcPackage) -> Result<()> {
        let dest_pres = dest.main_partname()?;
        if !dest.related_of_type(&dest_pres, rt::COMMENT_AUTHORS).is_empty() {
            return Ok(());
        }
        let source = self.source;
        let src_pres = source.main_partname()?;
        let Some(authors) = source.related_of_type(&src_pres, rt::COMMENT_AUTHORS).into_iter().next() else {
            return Ok(());
        };
        let Some(copy) = self.copy_part(dest, &authors)? else {
            return Ok(());
        };
        let target_ref = copy.relative_ref(dest_pres.base_uri());
        dest.get_part_mut(&dest_pres)?
            .relate_to(&target_ref, rt::COMMENT_AUTHORS);
        Ok(())
    }
}

/// Append a copied slide to the slide list with the next free id.
fn register_slide(dest: &mut OpcPackage, slide: &PackURI) -> Result<()> {
    let pres_name = dest.main_partname()?;
    let pres = dest.get_part_mut(&pres_name)?;

    let max_id = read_id_list(pres.blob(), IdList::Slides)?
        .iter()
        .filter_map(|entry| entry.id)
        .max();
    let id = match max_id {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| OoxmlError::InvalidFormat("slide ids exhausted".to_string()))?
            .max(MIN_SLIDE_ID),
        None => MIN_SLIDE_ID,
    };

    let r_id = pres.relate_to(&slide.relative_ref(pres_name.base_uri()), rt::SLIDE);
    let xml = append_id_entry(pres.blob(), IdList::Slides, Some(id), &r_id)?;
    pres.set_blob(xml);
    Ok(())
}

/// Register a copied master with a fresh id and renumber its layouts after it.
fn register_master(dest: &mut OpcPackage, master: &PackURI) -> Result<()> {
    let pres_name = dest.main_partname()?;
    let master_id = next_master_id(dest, &pres_name)?;

    let part = dest.get_part_mut(master)?;
    let mut layout_id = master_id
        .checked_add(1)
        .ok_or_else(|| OoxmlError::InvalidFormat("master ids exhausted".to_string()))?;
    let xml = renumber_layout_ids(part.blob(), &mut layout_id)?;
    part.set_blob(xml);

    let pres = dest.get_part_mut(&pres_name)?;
    let r_id = pres.relate_to(&master.relative_ref(pres_name.base_uri()), rt::SLIDE_MASTER);
    let xml = append_id_entry(pres.blob(), IdList::SlideMasters, Some(master_id), &r_id)?;
    pres.set_blob(xml);

    // A deck needs a presentation-level theme; the first master provides it
    if dest.related_of_type(&pres_name, rt::THEME).is_empty()
        && let Some(theme) = dest.related_of_type(master, rt::THEME).into_iter().next()
    {
        let target_ref = theme.relative_ref(pres_name.base_uri());
        dest.get_part_mut(&pres_name)?.relate_to(&target_ref, rt::THEME);
    }

    log::debug!("Registered master {} with id {}", master, master_id);
    Ok(())
}

fn register_notes_master(dest: &mut OpcPackage, notes_master: &PackURI) -> Result<()> {
    let pres_name = dest.main_partname()?;
    let pres = dest.get_part_mut(&pres_name)?;
    let r_id = pres.relate_to(&notes_master.relative_ref(pres_name.base_uri()), rt::NOTES_MASTER);
    let xml = append_id_entry(pres.blob(), IdList::NotesMasters, None, &r_id)?;
    pres.set_blob(xml);
    Ok(())
}

/// One past the largest id used by registered masters and their layouts.
fn next_master_id(dest: &OpcPackage, pres_name: &PackURI) -> Result<u32> {
    let pres = dest.get_part(pres_name)?;
    let mut max_id: Option<u32> = None;

    for entry in read_id_list(pres.blob(), IdList::SlideMasters)? {
        max_id = max_id.max(entry.id);
        let Ok(master) = dest.related_partname(pres_name, &entry.r_id) else {
            continue;
        };
        let Ok(part) = dest.get_part(&master) else {
            continue;
        };
        for layout in SlidePart::from_part(part)?.layout_ids()? {
            max_id = max_id.max(layout.id);
        }
    }

    match max_id {
        Some(max) => Ok(max
            .checked_add(1)
            .ok_or_else(|| OoxmlError::InvalidFormat("master ids exhausted".to_string()))?
            .max(MIN_MASTER_ID)),
        None => Ok(MIN_MASTER_ID),
    }
}
