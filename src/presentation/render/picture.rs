//! Embedded pictures.

use crate::common::{Error, Result};
use crate::ooxml::opc::{OpcPackage, PackURI};
use tiny_skia::{FilterQuality, IntSize, Paint, Pattern, Pixmap, SpreadMode, Transform};

/// Decode the image a sheet relates to through `r_id`.
pub(crate) fn load(opc: &OpcPackage, sheet: &PackURI, r_id: &str) -> Result<Pixmap> {
    let partname = opc.related_partname(sheet, r_id)?;
    decode(opc.get_part(&partname)?.blob())
}

/// Decode image bytes into a premultiplied pixmap.
pub(crate) fn decode(data: &[u8]) -> Result<Pixmap> {
    let rgba = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for channel in &mut px[..3] {
            *channel = ((u16::from(*channel) * a + 127) / 255) as u8;
        }
    }
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| Error::Render(format!("empty picture {}x{}", width, height)))?;
    Pixmap::from_vec(pixels, size).ok_or_else(|| Error::Render("picture buffer size mismatch".into()))
}

/// Paint stretching `image` over a `w` x `h` local box, sampled bicubically.
pub(crate) fn stretched_paint(image: &Pixmap, w: f32, h: f32) -> Paint<'_> {
    let sx = w / image.width() as f32;
    let sy = h / image.height() as f32;
    Paint {
        shader: Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bicubic,
            1.0,
            Transform::from_scale(sx, sy),
        ),
        anti_alias: true,
        ..Paint::default()
    }
}
