//! Deck metadata as a flat JSON-friendly record.

use crate::common::Result;
use crate::ooxml::pptx::skeleton::DEFAULT_SLIDE_SIZE;
use crate::ooxml::pptx::presentation::EMU_PER_POINT;
use crate::ooxml::pptx::Presentation;
use crate::presentation::deck::open_deck;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One entry of `Slidesinfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlideInfo {
    pub slide_number: usize,
    /// Empty when the slide has no title
    pub title: String,
    pub theme: String,
    /// Name of the slide's layout
    pub master: String,
}

/// One entry of `MasterSlides`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MasterInfo {
    pub name: String,
    pub layouts: Vec<String>,
    /// Major (heading) font of the master's theme
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub master_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub minor_font: Option<String>,
}

/// Metadata of a deck. Absent values are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PropertiesRecord {
    /// Page width in points
    pub width: i64,
    /// Page height in points
    pub height: i64,
    pub auto_compress_pictures: bool,
    pub compat_mode: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_printed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub count_characters: i64,
    pub count_hidden_slides: i64,
    pub count_lines: i64,
    #[serde(rename = "CountMMClips")]
    pub count_mm_clips: i64,
    pub count_notes: i64,
    pub count_pages: i64,
    pub count_paragraphs: i64,
    pub count_slides: i64,
    pub count_total_time: i64,
    pub count_words: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(rename = "Slidesinfo")]
    pub slides_info: Vec<SlideInfo>,
    pub master_slides: Vec<MasterInfo>,
    pub embedded_fonts: Vec<String>,
    /// Theme fonts; only filled by backends able to enumerate fonts
    pub fonts: Vec<String>,
}

impl PropertiesRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Read the metadata record of a deck.
///
/// `Fonts` is left empty; see [`theme_fonts`].
pub fn extract_properties(deck: &[u8]) -> Result<PropertiesRecord> {
    let package = open_deck(deck)?;
    properties_of(&package.presentation()?)
}

/// Read the metadata record of an open presentation.
pub fn properties_of(pres: &Presentation<'_>) -> Result<PropertiesRecord> {
    let (cx, cy) = pres.slide_size()?.unwrap_or(DEFAULT_SLIDE_SIZE);
    let core = pres.core_properties()?;
    let app = pres.extended_properties()?;

    let slides = pres.slides()?;
    let mut slides_info = Vec::with_capacity(slides.len());
    let mut hidden = 0;
    for slide in &slides {
        if slide.is_hidden()? {
            hidden += 1;
        }
        let layout = slide.layout()?;
        slides_info.push(SlideInfo {
            slide_number: slide.number(),
            title: slide.title()?.unwrap_or_default(),
            theme: layout.master()?.theme()?.name,
            master: layout.name()?,
        });
    }

    let master_slides = pres
        .masters()?
        .iter()
        .map(|master| {
            let theme = master.theme()?;
            Ok(MasterInfo {
                name: master.name()?,
                layouts: master.layout_names()?,
                master_font: theme.major_font,
                minor_font: theme.minor_font,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let count = |value: Option<i64>| value.unwrap_or(0);

    Ok(PropertiesRecord {
        width: cx / EMU_PER_POINT,
        height: cy / EMU_PER_POINT,
        auto_compress_pictures: pres.auto_compress_pictures()?,
        compat_mode: pres.compat_mode()?,

        category: core.category,
        content_status: core.content_status,
        content_type: core.content_type,
        created: timestamp(core.created),
        creator: core.creator,
        description: core.description,
        identifier: core.identifier,
        keywords: core.keywords,
        last_modified_by_user: core.last_modified_by,
        last_printed: timestamp(core.last_printed),
        modified: timestamp(core.modified),
        revision: core.revision,
        subject: core.subject,
        title: core.title,

        count_characters: count(app.characters),
        count_hidden_slides: hidden,
        count_lines: count(app.lines),
        count_mm_clips: count(app.mm_clips),
        count_notes: count(app.notes),
        count_pages: count(app.pages),
        count_paragraphs: count(app.paragraphs),
        count_slides: slides.len() as i64,
        count_total_time: count(app.total_time),
        count_words: count(app.words),

        application: app.application,
        app_version: app.app_version,
        company: app.company,
        hyperlink_base: app.hyperlink_base,
        manager: app.manager,
        presentation_format: app.presentation_format,
        template: app.template,

        slides_info,
        master_slides,
        embedded_fonts: pres.embedded_fonts()?,
        fonts: Vec::new(),
    })
}

/// Theme fonts of all masters: major then minor, masters in order, without duplicates.
pub fn theme_fonts(pres: &Presentation<'_>) -> Result<Vec<String>> {
    let mut fonts: Vec<String> = Vec::new();
    for master in pres.masters()? {
        let theme = master.theme()?;
        for font in [theme.major_font, theme.minor_font].into_iter().flatten() {
            if !fonts.contains(&font) {
                fonts.push(font);
            }
        }
    }
    Ok(fonts)
}
