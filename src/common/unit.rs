//! Unit conversion utilities.
//!
//! DrawingML measures geometry in English Metric Units (EMU). Slide sizes are
//! reported in points and thumbnails are rasterized at one pixel per point.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

/// Angles in DrawingML are in 1/60000 of a degree.
pub const ANGLE_UNITS_PER_DEGREE: f32 = 60_000.0;

#[inline]
pub fn pt_to_emu_f64(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn emu_to_pt_f64(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn emu_to_pt_f32(emu: i64) -> f32 {
    (emu as f64 / EMUS_PER_PT as f64) as f32
}

/// Whole points, truncated, as reported in the `Width`/`Height` properties.
#[inline]
pub fn emu_to_pt_trunc(emu: i64) -> i64 {
    emu / EMUS_PER_PT
}
