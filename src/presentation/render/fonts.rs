//! Glyph measurement and outlines for thumbnail text.
//!
//! With the `fonts` feature, typefaces are looked up in the system font
//! database and glyphs are drawn from their TrueType/OpenType outlines.
//! When no face can be found (or the feature is off) every character is
//! drawn as a box sized like the glyph it stands for, so text still
//! occupies roughly the right area of the slide.

use once_cell::sync::OnceCell;
use tiny_skia::{PathBuilder, Rect};

use crate::presentation::config::EngineConfig;

static SYSTEM: OnceCell<FontBook> = OnceCell::new();
static EMPTY: OnceCell<FontBook> = OnceCell::new();

/// Font lookup shared by all renders in the process.
pub struct FontBook {
    #[cfg(feature = "fonts")]
    db: fontdb::Database,
}

impl FontBook {
    /// A book with no faces; all text falls back to glyph boxes.
    pub fn empty() -> Self {
        Self {
            #[cfg(feature = "fonts")]
            db: fontdb::Database::new(),
        }
    }

    /// A book over the installed system fonts.
    #[cfg(feature = "fonts")]
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system font faces", db.len());
        Self { db }
    }

    #[cfg(not(feature = "fonts"))]
    pub fn system() -> Self {
        log::debug!("Built without the fonts feature; text is drawn as glyph boxes");
        Self::empty()
    }

    /// The process-wide book for `config`: system fonts when it asks for
    /// them (loaded once, on first use), else an empty book.
    pub fn for_config(config: &EngineConfig) -> &'static FontBook {
        if config.load_system_fonts {
            SYSTEM.get_or_init(FontBook::system)
        } else {
            EMPTY.get_or_init(FontBook::empty)
        }
    }

    /// Advance width of `text` in points.
    pub fn advance(&self, family: &str, bold: bool, text: &str, size: f32) -> f32 {
        #[cfg(feature = "fonts")]
        {
            if let Some(width) = self.with_face(family, bold, |face| face_advance(face, text, size)) {
                return width;
            }
        }
        #[cfg(not(feature = "fonts"))]
        let _ = (family, bold);
        text.chars().map(|c| box_advance(c, size)).sum()
    }

    /// Append the outlines of `text` with its baseline origin at `(x, y)`.
    ///
    /// Returns the advance width in points.
    pub fn append_outline(
        &self,
        family: &str,
        bold: bool,
        text: &str,
        size: f32,
        (x, y): (f32, f32),
        path: &mut PathBuilder,
    ) -> f32 {
        #[cfg(feature = "fonts")]
        {
            if let Some(width) =
                self.with_face(family, bold, |face| face_outline(face, text, size, (x, y), path))
            {
                return width;
            }
        }
        #[cfg(not(feature = "fonts"))]
        let _ = (family, bold);
        box_outline(text, size, (x, y), path)
    }

    #[cfg(feature = "fonts")]
    fn with_face<T>(
        &self,
        family: &str,
        bold: bool,
        f: impl FnOnce(&ttf_parser::Face<'_>) -> T,
    ) -> Option<T> {
        use fontdb::{Family, Query, Stretch, Style, Weight};

        let families = [Family::Name(family), Family::SansSerif];
        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().into_iter().next().map(|face| face.id));
        let Some(id) = id else {
            log::debug!("No font face for '{}', drawing glyph boxes", family);
            return None;
        };
        self.db
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                Some(f(&face))
            })
            .flatten()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "fonts")]
fn face_advance(face: &ttf_parser::Face<'_>, text: &str, size: f32) -> f32 {
    let scale = size / f32::from(face.units_per_em().max(1));
    text.chars()
        .map(|c| {
            face.glyph_index(c)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map_or_else(|| box_advance(c, size), |adv| f32::from(adv) * scale)
        })
        .sum()
}

#[cfg(feature = "fonts")]
fn face_outline(
    face: &ttf_parser::Face<'_>,
    text: &str,
    size: f32,
    (x, y): (f32, f32),
    path: &mut PathBuilder,
) -> f32 {
    let scale = size / f32::from(face.units_per_em().max(1));
    let mut pen = x;
    for c in text.chars() {
        let Some(gid) = face.glyph_index(c) else {
            pen += box_glyph(c, size, (pen, y), path);
            continue;
        };
        let mut outline = GlyphOutline {
            path: &mut *path,
            scale,
            origin: (pen, y),
        };
        face.outline_glyph(gid, &mut outline);
        pen += face
            .glyph_hor_advance(gid)
            .map_or_else(|| box_advance(c, size), |adv| f32::from(adv) * scale);
    }
    pen - x
}

/// Feeds font units into a path in points, flipping the y axis.
#[cfg(feature = "fonts")]
struct GlyphOutline<'p> {
    path: &'p mut PathBuilder,
    scale: f32,
    origin: (f32, f32),
}

#[cfg(feature = "fonts")]
impl GlyphOutline<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin.0 + x * self.scale, self.origin.1 - y * self.scale)
    }
}

#[cfg(feature = "fonts")]
impl ttf_parser::OutlineBuilder for GlyphOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

/// Proportional advance of a boxed glyph.
fn box_advance(c: char, size: f32) -> f32 {
    if c.is_whitespace() {
        size * 0.28
    } else if c.is_uppercase() || c.is_ascii_digit() {
        size * 0.62
    } else if c.is_lowercase() {
        size * 0.5
    } else {
        size * 0.4
    }
}

fn box_glyph(c: char, size: f32, (x, y): (f32, f32), path: &mut PathBuilder) -> f32 {
    let advance = box_advance(c, size);
    if c.is_whitespace() || c.is_control() {
        return advance;
    }
    let height = if c.is_uppercase() || c.is_ascii_digit() {
        size * 0.7
    } else if c.is_lowercase() {
        size * 0.5
    } else {
        size * 0.6
    };
    if let Some(rect) = Rect::from_xywh(x + advance * 0.1, y - height, advance * 0.8, height) {
        path.push_rect(rect);
    }
    advance
}

fn box_outline(text: &str, size: f32, (x, y): (f32, f32), path: &mut PathBuilder) -> f32 {
    let mut pen = x;
    for c in text.chars() {
        pen += box_glyph(c, size, (pen, y), path);
    }
    pen - x
}
