/// Slide, layout and master views.
///
/// Each view pairs a part with the package it lives in, so the
/// slide -> layout -> master -> theme chain can be walked through
/// relationships without copying any XML.
use crate::common::xml::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::parts::{CommentsPart, SlidePart, Theme, ThemePart};
use crate::ooxml::pptx::shapes::textframe::ListStyle;
use crate::ooxml::pptx::shapes::{Background, Shape, shape_tree};
use std::collections::HashMap;

/// First part `source` relates to with `reltype`, or an error naming the gap.
fn required_target(package: &OpcPackage, source: &PackURI, reltype: &str) -> Result<PackURI> {
    package
        .related_of_type(source, reltype)
        .into_iter()
        .next()
        .ok_or_else(|| {
            OoxmlError::InvalidRelationship(format!(
                "{} has no {} relationship",
                source,
                reltype.rsplit('/').next().unwrap_or(reltype)
            ))
        })
}

/// Comparable summary of a slide, used to check that a copied slide
/// still matches its original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSignature {
    pub title: Option<String>,
    pub comment_count: usize,
    pub layout_name: String,
    pub background: Option<String>,
    pub relation_count: usize,
}

/// A single slide in a presentation.
pub struct Slide<'a> {
    package: &'a OpcPackage,
    partname: PackURI,
    part: SlidePart<'a>,
    /// 0-based position in the slide list
    index: usize,
}

impl<'a> Slide<'a> {
    pub(crate) fn new(package: &'a OpcPackage, partname: PackURI, index: usize) -> Result<Self> {
        let part = SlidePart::from_part(package.get_part(&partname)?)?;
        Ok(Self {
            package,
            partname,
            part,
            index,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based slide number.
    #[inline]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Text of the first top-level `title` or `ctrTitle` placeholder.
    pub fn title(&self) -> Result<Option<String>> {
        Ok(self
            .shapes()?
            .iter()
            .find(|shape| shape.is_title())
            .map(Shape::text))
    }

    pub fn is_hidden(&self) -> Result<bool> {
        self.part.is_hidden()
    }

    /// Top-level shapes in document order.
    pub fn shapes(&self) -> Result<Vec<Shape>> {
        Ok(shape_tree(&self.element()?))
    }

    pub fn element(&self) -> Result<Element> {
        self.part.element()
    }

    /// The slide's own background, if it declares one.
    pub fn background(&self) -> Result<Option<Background>> {
        Ok(Background::from_sheet(&self.element()?))
    }

    /// The layout this slide is based on.
    pub fn layout(&self) -> Result<SlideLayout<'a>> {
        let partname = required_target(self.package, &self.partname, rt::SLIDE_LAYOUT)?;
        SlideLayout::new(self.package, partname)
    }

    /// Theme of the slide's master.
    pub fn theme(&self) -> Result<Theme> {
        self.layout()?.master()?.theme()
    }

    /// Colour mapping override (`p:clrMapOvr`), empty when the master's applies.
    pub fn color_map(&self) -> Result<HashMap<String, String>> {
        self.part.color_map()
    }

    /// Number of comments across the slide's comments parts.
    pub fn comment_count(&self) -> Result<usize> {
        let mut count = 0;
        for partname in self.package.related_of_type(&self.partname, rt::COMMENTS) {
            count += CommentsPart::from_part(self.package.get_part(&partname)?)?.comment_count()?;
        }
        Ok(count)
    }

    /// Number of relationships the slide part holds.
    pub fn relation_count(&self) -> usize {
        self.part.part().rels().len()
    }

    pub fn signature(&self) -> Result<SlideSignature> {
        Ok(SlideSignature {
            title: self.title()?,
            comment_count: self.comment_count()?,
            layout_name: self.layout()?.name()?,
            background: self.background()?.map(|bg| bg.signature()),
            relation_count: self.relation_count(),
        })
    }

    #[inline]
    pub fn part(&self) -> &SlidePart<'a> {
        &self.part
    }
}

/// A slide layout.
pub struct SlideLayout<'a> {
    package: &'a OpcPackage,
    partname: PackURI,
    part: SlidePart<'a>,
}

impl<'a> SlideLayout<'a> {
    pub(crate) fn new(package: &'a OpcPackage, partname: PackURI) -> Result<Self> {
        let part = SlidePart::from_part(package.get_part(&partname)?)?;
        Ok(Self {
            package,
            partname,
            part,
        })
    }

    /// Layout name (`p:cSld/@name`).
    pub fn name(&self) -> Result<String> {
        self.part.name()
    }

    /// The master this layout belongs to.
    pub fn master(&self) -> Result<SlideMaster<'a>> {
        let partname = required_target(self.package, &self.partname, rt::SLIDE_MASTER)?;
        SlideMaster::new(self.package, partname)
    }

    pub fn shapes(&self) -> Result<Vec<Shape>> {
        Ok(shape_tree(&self.element()?))
    }

    pub fn element(&self) -> Result<Element> {
        self.part.element()
    }

    pub fn background(&self) -> Result<Option<Background>> {
        Ok(Background::from_sheet(&self.element()?))
    }

    pub fn shows_master_shapes(&self) -> Result<bool> {
        self.part.shows_master_shapes()
    }

    pub fn color_map(&self) -> Result<HashMap<String, String>> {
        self.part.color_map()
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn part(&self) -> &SlidePart<'a> {
        &self.part
    }
}

/// Default text styles of a master (`p:txStyles`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterTextStyles {
    pub title: ListStyle,
    pub body: ListStyle,
    pub other: ListStyle,
}

/// A slide master.
pub struct SlideMaster<'a> {
    package: &'a OpcPackage,
    partname: PackURI,
    part: SlidePart<'a>,
}

impl<'a> SlideMaster<'a> {
    pub(crate) fn new(package: &'a OpcPackage, partname: PackURI) -> Result<Self> {
        let part = SlidePart::from_part(package.get_part(&partname)?)?;
        Ok(Self {
            package,
            partname,
            part,
        })
    }

    /// The name a master is known by: its theme's name, or `p:cSld/@name`
    /// when the theme is unnamed.
    pub fn name(&self) -> Result<String> {
        let theme = self.theme()?;
        if !theme.name.is_empty() {
            return Ok(theme.name);
        }
        self.part.name()
    }

    /// The master's theme; an empty theme when the relationship is missing.
    pub fn theme(&self) -> Result<Theme> {
        match self.package.related_of_type(&self.partname, rt::THEME).first() {
            Some(partname) => ThemePart::from_part(self.package.get_part(partname)?)?.theme(),
            None => Ok(Theme::default()),
        }
    }

    /// Layouts in `p:sldLayoutIdLst` order.
    ///
    /// Entries whose relationship does not resolve to a part are skipped.
    pub fn layouts(&self) -> Result<Vec<SlideLayout<'a>>> {
        let mut layouts = Vec::new();
        for entry in self.part.layout_ids()? {
            let Ok(partname) = self.package.related_partname(&self.partname, &entry.r_id) else {
                continue;
            };
            if self.package.contains_part(&partname) {
                layouts.push(SlideLayout::new(self.package, partname)?);
            }
        }
        Ok(layouts)
    }

    pub fn layout_names(&self) -> Result<Vec<String>> {
        self.layouts()?.iter().map(SlideLayout::name).collect()
    }

    /// First layout with exactly this name.
    pub fn layout_by_name(&self, name: &str) -> Result<Option<SlideLayout<'a>>> {
        for layout in self.layouts()? {
            if layout.name()? == name {
                return Ok(Some(layout));
            }
        }
        Ok(None)
    }

    /// Colour map (`p:clrMap`).
    pub fn color_map(&self) -> Result<HashMap<String, String>> {
        self.part.color_map()
    }

    pub fn text_styles(&self) -> Result<MasterTextStyles> {
        let root = self.element()?;
        let style = |name: &str| {
            root.path(&["txStyles", name])
                .map(ListStyle::from_element)
                .unwrap_or_default()
        };
        Ok(MasterTextStyles {
            title: style("titleStyle"),
            body: style("bodyStyle"),
            other: style("otherStyle"),
        })
    }

    pub fn shapes(&self) -> Result<Vec<Shape>> {
        Ok(shape_tree(&self.element()?))
    }

    pub fn element(&self) -> Result<Element> {
        self.part.element()
    }

    pub fn background(&self) -> Result<Option<Background>> {
        Ok(Background::from_sheet(&self.element()?))
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn part(&self) -> &SlidePart<'a> {
        &self.part
    }
}
