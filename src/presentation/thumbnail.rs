//! Slide thumbnails.
//!
//! A thumbnail is the slide painted at one pixel per point, scaled down
//! proportionally when a maximum width smaller than the page is requested.

use rayon::prelude::*;

use crate::common::unit::emu_to_pt_trunc;
use crate::common::{Error, Result};
use crate::ooxml::pptx::skeleton::DEFAULT_SLIDE_SIZE;
use crate::ooxml::pptx::{Package, Slide};
use crate::presentation::artifact::{Artifact, JPEG_MIME, PNG_MIME};
use crate::presentation::config::EngineConfig;
use crate::presentation::deck::open_deck;
use crate::presentation::render::{FontBook, SlideRenderer, encode_jpeg, encode_png};

/// Image format of a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailFormat {
    #[default]
    Png,
    Jpeg,
}

impl ThumbnailFormat {
    /// Parse a requested format: `png`, `jpg` or `jpeg` in any case.
    ///
    /// A missing or blank value means PNG.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() || value.eq_ignore_ascii_case("png") {
            Ok(ThumbnailFormat::Png)
        } else if value.eq_ignore_ascii_case("jpg") || value.eq_ignore_ascii_case("jpeg") {
            Ok(ThumbnailFormat::Jpeg)
        } else {
            Err(Error::UnsupportedFormat(value.to_string()))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "png",
            ThumbnailFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ThumbnailFormat::Png => PNG_MIME,
            ThumbnailFormat::Jpeg => JPEG_MIME,
        }
    }
}

/// Pixel size of a thumbnail for a page of `native` points.
///
/// The page is scaled down to `max_width` only when `0 < max_width < width`;
/// the height is truncated.
pub fn thumbnail_size(native: (i64, i64), max_width: u32) -> (u32, u32) {
    let (width, height) = (native.0.max(1), native.1.max(1));
    if max_width > 0 && i64::from(max_width) < width {
        let scale = f64::from(max_width) / width as f64;
        (max_width, ((height as f64 * scale) as u32).max(1))
    } else {
        (width as u32, height as u32)
    }
}

/// `Slide {n}.{ext}` for the slide at 0-based `index`.
pub fn thumbnail_file_name(index: usize, format: ThumbnailFormat) -> String {
    format!("Slide {}.{}", index + 1, format.extension())
}

/// Thumbnail of slide `index`.
pub fn render_thumbnail(
    deck: &[u8],
    index: usize,
    max_width: u32,
    format: ThumbnailFormat,
    config: &EngineConfig,
) -> Result<Artifact> {
    let package = open_deck(deck)?;
    let slide = package.presentation()?.slide(index)?;
    render_slide(&package, &slide, max_width, format, config)
}

/// Thumbnails of every slide, in deck order.
///
/// With `only_visible`, hidden slides are left out; the remaining images keep
/// their slide numbers in their names.
pub fn render_all_thumbnails(
    deck: &[u8],
    max_width: u32,
    format: ThumbnailFormat,
    only_visible: bool,
    config: &EngineConfig,
) -> Result<Vec<Artifact>> {
    let package = open_deck(deck)?;
    let slides = package.presentation()?.slides()?;

    let mut wanted = Vec::with_capacity(slides.len());
    for slide in &slides {
        if only_visible && slide.is_hidden()? {
            log::info!("Skipping hidden slide {}", slide.number());
            continue;
        }
        wanted.push(slide.index());
    }

    if config.parallel {
        return wanted
            .par_iter()
            .map(|&index| render_thumbnail(deck, index, max_width, format, config))
            .collect();
    }

    slides
        .iter()
        .filter(|slide| wanted.contains(&slide.index()))
        .map(|slide| render_slide(&package, slide, max_width, format, config))
        .collect()
}

fn render_slide(
    package: &Package,
    slide: &Slide<'_>,
    max_width: u32,
    format: ThumbnailFormat,
    config: &EngineConfig,
) -> Result<Artifact> {
    let (cx, cy) = package.presentation()?.slide_size()?.unwrap_or(DEFAULT_SLIDE_SIZE);
    let native = (emu_to_pt_trunc(cx), emu_to_pt_trunc(cy));
    let size = thumbnail_size(native, max_width);

    let renderer = SlideRenderer::new(FontBook::for_config(config), config.background_color());
    let pixmap = renderer.render(package.opc(), slide, (native.0 as f32, native.1 as f32), size)?;
    let data = match format {
        ThumbnailFormat::Png => encode_png(&pixmap)?,
        ThumbnailFormat::Jpeg => encode_jpeg(&pixmap, config.jpeg_quality)?,
    };
    Ok(Artifact::new(
        data,
        Some(thumbnail_file_name(slide.index(), format)),
        format.mime_type(),
    ))
}
