//! Slide rasterization.
//!
//! A slide is painted in three layers, each over the previous one:
//!
//! 1. the background of the slide, else its layout, else its master, else
//!    the configured page colour;
//! 2. the non-placeholder shapes of the master and the layout (unless a
//!    sheet sets `showMasterSp="0"`);
//! 3. the slide's own shapes in document order.
//!
//! Placeholders on the slide take their frame and text formatting from the
//! matching layout placeholder, then the master placeholder.
//!
//! Everything is drawn with `tiny_skia` at one pixel per point times the
//! thumbnail scale, with anti-aliasing on.

pub mod fonts;
mod geometry;
mod paint;
mod picture;
mod text;

pub use fonts::FontBook;

use crate::common::unit::emu_to_pt_f32;
use crate::common::{Error, RGBColor, Result};
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::shapes::{Background, Fill, Placeholder, Shape, ShapeType};
use crate::ooxml::pptx::{MasterTextStyles, Slide};
use geometry::{Frame, child_space, is_line, preset_path};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};
use log::{debug, warn};
use paint::{Palette, effective_color_map, skia_color, solid_paint};
use text::TextStyles;
use tiny_skia::{FillRule, Pixmap, Rect, Stroke, Transform};

/// Outline width when `a:ln` gives none: 0.75pt.
const DEFAULT_LINE_WIDTH_EMU: i64 = 9_525;

/// Paints slides onto pixmaps.
pub struct SlideRenderer<'f> {
    fonts: &'f FontBook,
    page_color: RGBColor,
}

impl<'f> SlideRenderer<'f> {
    /// `page_color` shows where no sheet declares a background.
    pub fn new(fonts: &'f FontBook, page_color: RGBColor) -> Self {
        Self { fonts, page_color }
    }

    /// Render `slide` of `opc` into a `width` x `height` pixmap.
    ///
    /// `page` is the slide size in points; it is stretched over the pixmap.
    pub fn render(
        &self,
        opc: &OpcPackage,
        slide: &Slide<'_>,
        page: (f32, f32),
        (width, height): (u32, u32),
    ) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Render(format!("cannot allocate a {}x{} image", width, height)))?;
        if page.0 <= 0.0 || page.1 <= 0.0 {
            return Err(Error::Render(format!("invalid page size {:?}", page)));
        }

        let layout = slide.layout()?;
        let master = layout.master()?;
        let palette = Palette::new(
            master.theme()?,
            effective_color_map([slide.color_map()?, layout.color_map()?], master.color_map()?),
        );
        let scene = Scene {
            master: master.shapes()?,
            layout: layout.shapes()?,
            text_styles: master.text_styles()?,
        };

        let mut canvas = Canvas {
            pixmap: &mut pixmap,
            opc,
            palette: &palette,
            fonts: self.fonts,
            page: Transform::from_scale(width as f32 / page.0, height as f32 / page.1),
            page_size: page,
        };
        debug!("Rendering slide {} at {}x{}", slide.number(), width, height);

        canvas.background(
            [
                (slide.background()?, slide.partname()),
                (layout.background()?, layout.partname()),
                (master.background()?, master.partname()),
            ],
            self.page_color,
        );

        if slide.part().shows_master_shapes()? {
            if layout.shows_master_shapes()? {
                canvas.decorations(&scene.master, master.partname(), &scene.text_styles);
            }
            canvas.decorations(&scene.layout, layout.partname(), &scene.text_styles);
        }

        for shape in &slide.shapes()? {
            let resolved = scene.resolve(shape);
            canvas.shape(shape, &resolved, canvas.page, slide.partname());
        }

        Ok(pixmap)
    }
}

/// PNG bytes of a pixmap.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    pixmap.encode_png().map_err(|e| Error::Render(e.to_string()))
}

/// JPEG bytes of a pixmap; alpha is dropped.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>> {
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(pixmap.width(), pixmap.height(), rgb)
        .ok_or_else(|| Error::Render("failed to create image buffer".to_string()))?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(&img)?;
    Ok(out)
}

/// Shapes a slide inherits from.
struct Scene {
    master: Vec<Shape>,
    layout: Vec<Shape>,
    text_styles: MasterTextStyles,
}

/// Formatting of a shape after placeholder inheritance.
struct Resolved<'s> {
    frame: Option<Frame>,
    fill: &'s Fill,
    text: TextStyles<'s>,
}

impl Scene {
    fn resolve<'s>(&'s self, shape: &'s Shape) -> Resolved<'s> {
        let Some(ph) = &shape.placeholder else {
            return own_formatting(shape, &self.text_styles);
        };
        let from_layout = find_placeholder(&self.layout, ph);
        let master_key = from_layout.and_then(|s| s.placeholder.as_ref()).unwrap_or(ph);
        let from_master = find_placeholder(&self.master, master_key)
            .or_else(|| find_placeholder(&self.master, ph));
        let chain: Vec<&Shape> = [Some(shape), from_layout, from_master]
            .into_iter()
            .flatten()
            .collect();

        let frame = chain.iter().find_map(|s| s.transform.as_ref()).map(Frame::from_xfrm);
        let fill = chain
            .iter()
            .map(|s| &s.fill)
            .find(|fill| !fill.is_inherit())
            .unwrap_or(&shape.fill);
        let mut lists: Vec<_> = chain
            .iter()
            .filter_map(|s| s.text.as_ref())
            .map(|body| &body.list_style)
            .collect();
        lists.push(match ph.normalized_kind() {
            "title" => &self.text_styles.title,
            "body" => &self.text_styles.body,
            _ => &self.text_styles.other,
        });
        Resolved {
            frame,
            fill,
            text: TextStyles {
                lists,
                anchor: chain.iter().filter_map(|s| s.text.as_ref()).find_map(|body| body.anchor),
                font_color: chain.iter().find_map(|s| s.style.font.as_ref()),
            },
        }
    }
}

fn own_formatting<'s>(shape: &'s Shape, text_styles: &'s MasterTextStyles) -> Resolved<'s> {
    let mut lists = Vec::with_capacity(2);
    if let Some(body) = &shape.text {
        lists.push(&body.list_style);
    }
    lists.push(&text_styles.other);
    Resolved {
        frame: shape.transform.as_ref().map(Frame::from_xfrm),
        fill: &shape.fill,
        text: TextStyles {
            lists,
            anchor: shape.text.as_ref().and_then(|body| body.anchor),
            font_color: shape.style.font.as_ref(),
        },
    }
}

/// Placeholder on a layout or master that `ph` inherits from: by index,
/// then by type.
fn find_placeholder<'s>(shapes: &'s [Shape], ph: &Placeholder) -> Option<&'s Shape> {
    let placeholders = || shapes.iter().filter_map(|s| Some((s, s.placeholder.as_ref()?)));
    placeholders()
        .find(|(_, other)| ph.matches_idx(other))
        .or_else(|| placeholders().find(|(_, other)| ph.matches_kind(other)))
        .map(|(shape, _)| shape)
}

struct Canvas<'c> {
    pixmap: &'c mut Pixmap,
    opc: &'c OpcPackage,
    palette: &'c Palette,
    fonts: &'c FontBook,
    /// Points to pixels
    page: Transform,
    page_size: (f32, f32),
}

impl Canvas<'_> {
    fn background(&mut self, layers: [(Option<Background>, &PackURI); 3], fallback: RGBColor) {
        self.pixmap.fill(skia_color(fallback, 1.0));
        let Some(page) = Rect::from_xywh(0.0, 0.0, self.page_size.0, self.page_size.1) else {
            return;
        };

        for (background, sheet) in layers {
            let color = match &background {
                None | Some(Background::Properties(Fill::Inherit)) => continue,
                Some(Background::Properties(Fill::NoFill)) => return,
                Some(Background::Properties(Fill::Picture(r_id))) => {
                    match picture::load(self.opc, sheet, r_id) {
                        Ok(image) => {
                            let paint = picture::stretched_paint(&image, page.width(), page.height());
                            self.pixmap.fill_rect(page, &paint, self.page, None);
                            return;
                        },
                        Err(e) => {
                            warn!("Skipping background picture of {}: {}", sheet, e);
                            continue;
                        },
                    }
                },
                Some(Background::Properties(fill)) => self.palette.fill_color(fill, None),
                Some(Background::Reference { color, .. }) => {
                    color.as_ref().and_then(|spec| self.palette.resolve(spec))
                },
            };
            if let Some((color, alpha)) = color {
                self.pixmap.fill_rect(page, &solid_paint(color, alpha), self.page, None);
                return;
            }
        }
    }

    /// Non-placeholder shapes of a master or layout.
    fn decorations(&mut self, shapes: &[Shape], sheet: &PackURI, text_styles: &MasterTextStyles) {
        for shape in shapes.iter().filter(|s| s.placeholder.is_none()) {
            let resolved = own_formatting(shape, text_styles);
            self.shape(shape, &resolved, self.page, sheet);
        }
    }

    fn shape(&mut self, shape: &Shape, resolved: &Resolved<'_>, parent: Transform, sheet: &PackURI) {
        let Some(frame) = resolved.frame else {
            debug!("Shape '{}' has no frame; not drawn", shape.name);
            return;
        };
        let placed = parent.pre_concat(frame.placement());

        match shape.shape_type {
            ShapeType::GroupShape => {
                let inner = placed.pre_concat(child_space(&frame, shape.child_space.as_ref()));
                for child in &shape.children {
                    let child_resolved = Resolved {
                        frame: child.transform.as_ref().map(Frame::from_xfrm),
                        fill: &child.fill,
                        text: TextStyles {
                            lists: child
                                .text
                                .as_ref()
                                .map(|body| &body.list_style)
                                .into_iter()
                                .chain(resolved.text.lists.last().copied())
                                .collect(),
                            anchor: child.text.as_ref().and_then(|body| body.anchor),
                            font_color: child.style.font.as_ref(),
                        },
                    };
                    self.shape(child, &child_resolved, inner, sheet);
                }
            },
            ShapeType::Picture => {
                if let Some(r_id) = &shape.image {
                    self.picture(shape, r_id, &frame, placed, sheet);
                }
                self.outline(shape, &frame, placed);
            },
            ShapeType::Shape | ShapeType::Connector => {
                let geometry = shape.geometry.as_deref();
                if !is_line(geometry) {
                    self.area(shape, resolved.fill, &frame, placed, sheet);
                }
                self.outline(shape, &frame, placed);
                if let Some(body) = &shape.text {
                    text::draw(
                        self.pixmap,
                        parent.pre_concat(frame.text_placement()),
                        (frame.w, frame.h),
                        body,
                        &resolved.text,
                        self.palette,
                        self.fonts,
                    );
                }
            },
            ShapeType::GraphicFrame => {
                debug!("Graphic frame '{}' is not rendered", shape.name);
            },
        }
    }

    fn area(&mut self, shape: &Shape, fill: &Fill, frame: &Frame, ts: Transform, sheet: &PackURI) {
        let Some(path) = preset_path(shape.geometry.as_deref(), frame.w, frame.h) else {
            return;
        };
        if let Fill::Picture(r_id) = fill {
            match picture::load(self.opc, sheet, r_id) {
                Ok(image) => {
                    let paint = picture::stretched_paint(&image, frame.w, frame.h);
                    self.pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
                },
                Err(e) => warn!("Skipping picture fill of '{}': {}", shape.name, e),
            }
            return;
        }
        if let Some((color, alpha)) = self.palette.fill_color(fill, shape.style.fill.as_ref()) {
            self.pixmap
                .fill_path(&path, &solid_paint(color, alpha), FillRule::Winding, ts, None);
        }
    }

    fn picture(&mut self, shape: &Shape, r_id: &str, frame: &Frame, ts: Transform, sheet: &PackURI) {
        let Some(path) = preset_path(shape.geometry.as_deref(), frame.w, frame.h) else {
            return;
        };
        match picture::load(self.opc, sheet, r_id) {
            Ok(image) => {
                let paint = picture::stretched_paint(&image, frame.w, frame.h);
                self.pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
            },
            Err(e) => warn!("Skipping picture '{}': {}", shape.name, e),
        }
    }

    fn outline(&mut self, shape: &Shape, frame: &Frame, ts: Transform) {
        let color = match &shape.line {
            Some(line) if !line.fill.is_inherit() => self.palette.fill_color(&line.fill, None),
            _ => shape.style.line.as_ref().and_then(|spec| self.palette.resolve(spec)),
        };
        let Some((color, alpha)) = color else {
            return;
        };
        let Some(path) = preset_path(shape.geometry.as_deref(), frame.w, frame.h) else {
            return;
        };
        let width = shape
            .line
            .as_ref()
            .and_then(|line| line.width)
            .unwrap_or(DEFAULT_LINE_WIDTH_EMU);
        let stroke = Stroke {
            width: emu_to_pt_f32(width).max(0.1),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid_paint(color, alpha), &stroke, ts, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::Package;
    use crate::testing::standard_deck;

    fn render(index: usize, size: (u32, u32)) -> Pixmap {
        let pkg = Package::from_bytes(&standard_deck()).unwrap();
        let pres = pkg.presentation().unwrap();
        let slide = pres.slide(index).unwrap();
        let fonts = FontBook::empty();
        SlideRenderer::new(&fonts, RGBColor::WHITE)
            .render(pkg.opc(), &slide, (960.0, 540.0), size)
            .unwrap()
    }

    fn rgb(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        (c.red(), c.green(), c.blue())
    }

    #[test]
    fn test_master_background_and_footer_band() {
        let pixmap = render(0, (960, 540));
        assert_eq!(rgb(&pixmap, 5, 5), (255, 255, 255));
        assert_eq!(rgb(&pixmap, 480, 530), (0x44, 0x72, 0xC4));
    }

    #[test]
    fn test_second_master_uses_its_theme() {
        let pixmap = render(9, (960, 540));
        assert_eq!(rgb(&pixmap, 480, 530), (0x00, 0x66, 0xFF));
    }

    #[test]
    fn test_slide_background_wins() {
        let pixmap = render(5, (960, 540));
        assert_eq!(rgb(&pixmap, 5, 5), (0xFF, 0xCC, 0x00));
        // master shapes are still drawn over it
        assert_eq!(rgb(&pixmap, 480, 530), (0x44, 0x72, 0xC4));
    }

    #[test]
    fn test_picture_is_drawn_in_its_frame() {
        let pixmap = render(3, (960, 540));
        // frame spans (66, 143.75)..(266, 343.75) points
        assert_eq!(rgb(&pixmap, 166, 243), (220, 20, 20));
        assert_eq!(rgb(&pixmap, 300, 243), (255, 255, 255));
    }

    #[test]
    fn test_scaled_render() {
        let pixmap = render(3, (480, 270));
        assert_eq!((pixmap.width(), pixmap.height()), (480, 270));
        assert_eq!(rgb(&pixmap, 83, 121), (220, 20, 20));
        assert_eq!(rgb(&pixmap, 240, 265), (0x44, 0x72, 0xC4));
    }

    #[test]
    fn test_title_text_is_inked() {
        let pixmap = render(0, (960, 540));
        // title frame: (66, 28.75) 828 x 104.4 points
        let inked = (66..894)
            .flat_map(|x| (29..133).map(move |y| (x, y)))
            .filter(|&(x, y)| rgb(&pixmap, x, y) != (255, 255, 255))
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_encoders() {
        let pixmap = render(0, (96, 54));
        let png = encode_png(&pixmap).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let jpeg = encode_jpeg(&pixmap, 85).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (96, 54));
    }

    #[test]
    fn test_zero_sized_image_is_render_error() {
        let pkg = Package::from_bytes(&standard_deck()).unwrap();
        let pres = pkg.presentation().unwrap();
        let slide = pres.slide(0).unwrap();
        let fonts = FontBook::empty();
        let result = SlideRenderer::new(&fonts, RGBColor::WHITE).render(pkg.opc(), &slide, (960.0, 540.0), (0, 10));
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn test_find_placeholder_prefers_idx() {
        let by_kind = |kind: &str, idx: Option<u32>| Shape {
            shape_type: ShapeType::Shape,
            id: 0,
            name: String::new(),
            transform: None,
            child_space: None,
            geometry: None,
            fill: Fill::Inherit,
            line: None,
            style: Default::default(),
            placeholder: Some(Placeholder {
                kind: Some(kind.to_string()),
                idx,
            }),
            text: None,
            image: None,
            children: Vec::new(),
        };
        let shapes = vec![by_kind("title", None), by_kind("body", Some(1)), by_kind("body", Some(2))];
        let wanted = Placeholder { kind: None, idx: Some(2) };
        assert_eq!(find_placeholder(&shapes, &wanted).unwrap().placeholder.as_ref().unwrap().idx, Some(2));
        let title = Placeholder {
            kind: Some("ctrTitle".to_string()),
            idx: None,
        };
        assert_eq!(
            find_placeholder(&shapes, &title).unwrap().placeholder.as_ref().unwrap().kind.as_deref(),
            Some("title")
        );
    }
}
