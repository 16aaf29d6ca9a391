//! Text frames: style inheritance, word wrap and glyph drawing.
//!
//! A run's properties are looked up in this order: the run itself, the
//! paragraph's `a:defRPr`, then each list style in the chain (the shape's
//! own `a:lstStyle`, its layout and master placeholders, the master's
//! title/body/other text style). Whatever is still unset falls back to
//! 18pt, regular weight, `tx1` and the theme's minor font.

use crate::common::RGBColor;
use crate::common::unit::emu_to_pt_f32;
use crate::ooxml::pptx::shapes::{Alignment, Anchor, ColorSpec, ListStyle, RunProperties, TextBody};
use crate::presentation::render::fonts::FontBook;
use crate::presentation::render::paint::{Palette, solid_paint};
use tiny_skia::{FillRule, PathBuilder, Pixmap, Transform};

pub(crate) const DEFAULT_FONT_SIZE: f32 = 18.0;
const LINE_SPACING: f32 = 1.2;
/// Baseline position within a line, as a fraction of the font size.
const BASELINE: f32 = 0.95;
const DEFAULT_TYPEFACE: &str = "+mn-lt";

/// Inherited text formatting of one shape.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextStyles<'s> {
    /// List styles, nearest first
    pub lists: Vec<&'s ListStyle>,
    pub anchor: Option<Anchor>,
    /// Colour of the shape's `p:style/a:fontRef`
    pub font_color: Option<&'s ColorSpec>,
}

impl TextStyles<'_> {
    fn level(&self, level: u32) -> (RunProperties, Option<Alignment>) {
        let mut run = RunProperties::default();
        let mut alignment = None;
        for list in &self.lists {
            if let Some(style) = list.level(level) {
                run = run.or(&style.run);
                alignment = alignment.or(style.alignment);
            }
        }
        (run, alignment)
    }
}

/// Fully resolved character formatting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunStyle {
    pub size: f32,
    pub bold: bool,
    pub color: (RGBColor, f32),
    pub family: String,
}

impl RunStyle {
    fn resolve(props: &RunProperties, font_color: Option<&ColorSpec>, palette: &Palette) -> Self {
        let color = props
            .color
            .as_ref()
            .or(font_color)
            .and_then(|spec| palette.resolve(spec))
            .or_else(|| palette.slot("tx1").map(|c| (c, 1.0)))
            .unwrap_or((RGBColor::BLACK, 1.0));
        let typeface = props.typeface.as_deref().unwrap_or(DEFAULT_TYPEFACE);
        let family = palette
            .theme()
            .resolve_typeface(typeface)
            .unwrap_or("sans-serif")
            .to_string();
        Self {
            size: props.size.filter(|s| *s > 0.0).unwrap_or(DEFAULT_FONT_SIZE),
            bold: props.bold.unwrap_or(false),
            color,
            family,
        }
    }
}

/// A word or a whitespace stretch placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub text: String,
    /// Index into [`TextLayout::styles`]
    pub style: usize,
    /// Offset from the line start, in points
    pub x: f32,
    pub width: f32,
    pub space: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    pub pieces: Vec<Piece>,
    /// Width without trailing whitespace
    pub width: f32,
    pub height: f32,
    pub max_size: f32,
    pub alignment: Alignment,
}

/// A text body broken into lines for a given frame width.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextLayout {
    pub styles: Vec<RunStyle>,
    pub lines: Vec<Line>,
}

impl TextLayout {
    pub fn height(&self) -> f32 {
        self.lines.iter().map(|line| line.height).sum()
    }
}

struct Token {
    text: String,
    style: usize,
    space: bool,
    newline: bool,
}

fn tokens(text: &str, style: usize) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for c in text.chars() {
        if c == '\n' || c == '\u{b}' {
            out.push(Token {
                text: String::new(),
                style,
                space: false,
                newline: true,
            });
            continue;
        }
        let space = c.is_whitespace();
        match out.last_mut() {
            Some(last) if !last.newline && last.space == space => last.text.push(c),
            _ => out.push(Token {
                text: c.to_string(),
                style,
                space,
                newline: false,
            }),
        }
    }
    out
}

struct LineBuilder {
    pieces: Vec<Piece>,
    cursor: f32,
    max_size: f32,
    alignment: Alignment,
}

impl LineBuilder {
    fn new(alignment: Alignment) -> Self {
        Self {
            pieces: Vec::new(),
            cursor: 0.0,
            max_size: 0.0,
            alignment,
        }
    }

    fn finish(self, empty_size: f32) -> Line {
        let width = self
            .pieces
            .iter()
            .rev()
            .find(|p| !p.space)
            .map_or(0.0, |p| p.x + p.width);
        let max_size = if self.max_size > 0.0 { self.max_size } else { empty_size };
        Line {
            pieces: self.pieces,
            width,
            height: max_size * LINE_SPACING,
            max_size,
            alignment: self.alignment,
        }
    }
}

/// Break `body` into lines no wider than `width` points (when it wraps).
pub(crate) fn layout(
    body: &TextBody,
    styles: &TextStyles<'_>,
    palette: &Palette,
    fonts: &FontBook,
    width: f32,
) -> TextLayout {
    let mut out = TextLayout::default();

    for paragraph in &body.paragraphs {
        let (level_run, level_alignment) = styles.level(paragraph.level);
        let paragraph_run = paragraph.default_run.or(&level_run);
        let alignment = paragraph
            .alignment
            .or(level_alignment)
            .unwrap_or(Alignment::Left);
        let empty_size = RunStyle::resolve(&paragraph.end_run.or(&paragraph_run), styles.font_color, palette).size;

        let mut line = LineBuilder::new(alignment);
        let mut wrapped = false;
        for run in &paragraph.runs {
            let style = RunStyle::resolve(&run.properties.or(&paragraph_run), styles.font_color, palette);
            let index = out.styles.len();
            for token in tokens(&run.text, index) {
                if token.newline {
                    let done = std::mem::replace(&mut line, LineBuilder::new(alignment));
                    out.lines.push(done.finish(style.size));
                    wrapped = false;
                    continue;
                }
                if token.space && wrapped && line.pieces.is_empty() {
                    continue;
                }
                let advance = fonts.advance(&style.family, style.bold, &token.text, style.size);
                if !token.space
                    && body.wrap
                    && width > 0.0
                    && !line.pieces.is_empty()
                    && line.cursor + advance > width
                {
                    let done = std::mem::replace(&mut line, LineBuilder::new(alignment));
                    out.lines.push(done.finish(style.size));
                    wrapped = true;
                }
                line.pieces.push(Piece {
                    text: token.text,
                    style: token.style,
                    x: line.cursor,
                    width: advance,
                    space: token.space,
                });
                line.cursor += advance;
                line.max_size = line.max_size.max(style.size);
            }
            out.styles.push(style);
        }
        out.lines.push(line.finish(empty_size));
    }

    out
}

/// Draw `body` inside a `w` x `h` frame placed by `transform`.
pub(crate) fn draw(
    pixmap: &mut Pixmap,
    transform: Transform,
    (w, h): (f32, f32),
    body: &TextBody,
    styles: &TextStyles<'_>,
    palette: &Palette,
    fonts: &FontBook,
) {
    let [left, top, right, bottom] = body.insets.map(emu_to_pt_f32);
    let inner_w = w - left - right;
    let inner_h = h - top - bottom;
    let laid = layout(body, styles, palette, fonts, inner_w);
    if laid.lines.iter().all(|line| line.pieces.is_empty()) {
        return;
    }

    let mut y = top
        + match styles.anchor.or(body.anchor).unwrap_or(Anchor::Top) {
            Anchor::Top => 0.0,
            Anchor::Middle => (inner_h - laid.height()) / 2.0,
            Anchor::Bottom => inner_h - laid.height(),
        };

    for line in &laid.lines {
        let start = left
            + match line.alignment {
                Alignment::Left | Alignment::Justify => 0.0,
                Alignment::Center => (inner_w - line.width) / 2.0,
                Alignment::Right => inner_w - line.width,
            };
        let baseline = y + line.max_size * BASELINE;
        for piece in line.pieces.iter().filter(|p| !p.space) {
            let style = &laid.styles[piece.style];
            let mut pb = PathBuilder::new();
            fonts.append_outline(
                &style.family,
                style.bold,
                &piece.text,
                style.size,
                (start + piece.x, baseline),
                &mut pb,
            );
            if let Some(path) = pb.finish() {
                let paint = solid_paint(style.color.0, style.color.1);
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        y += line.height;
    }
}
