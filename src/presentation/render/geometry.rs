//! Shape frames and preset geometries.
//!
//! Frames are converted from EMUs to points; the page transform then scales
//! points to pixels. Every shape is drawn in a local box `(0, 0, w, h)`.

use crate::common::unit::{ANGLE_UNITS_PER_DEGREE, emu_to_pt_f32};
use crate::ooxml::pptx::shapes::{ChildSpace, Transform as Xfrm};
use tiny_skia::{Path, PathBuilder, Rect, Transform};

/// Default `adj` of `roundRect`, in 1/100000 of the shorter side.
const ROUND_RECT_ADJ: f32 = 0.166_67;
/// Cubic approximation constant for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// A shape frame in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Clockwise degrees
    pub rotation: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Frame {
    pub fn from_xfrm(xfrm: &Xfrm) -> Self {
        Self {
            x: emu_to_pt_f32(xfrm.x),
            y: emu_to_pt_f32(xfrm.y),
            w: emu_to_pt_f32(xfrm.cx),
            h: emu_to_pt_f32(xfrm.cy),
            rotation: xfrm.rot as f32 / ANGLE_UNITS_PER_DEGREE,
            flip_h: xfrm.flip_h,
            flip_v: xfrm.flip_v,
        }
    }

    /// Map the local box into the parent space, rotating about the centre.
    pub fn placement(&self) -> Transform {
        self.transform(self.flip_h, self.flip_v)
    }

    /// Like [`Frame::placement`] but never mirrored; text stays readable.
    pub fn text_placement(&self) -> Transform {
        self.transform(false, false)
    }

    fn transform(&self, flip_h: bool, flip_v: bool) -> Transform {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let fx = if flip_h { -1.0 } else { 1.0 };
        let fy = if flip_v { -1.0 } else { 1.0 };
        let (cx, cy) = (self.x + self.w / 2.0, self.y + self.h / 2.0);
        let (hw, hh) = (self.w / 2.0, self.h / 2.0);
        Transform::from_row(
            cos * fx,
            sin * fx,
            -sin * fy,
            cos * fy,
            cx - cos * fx * hw + sin * fy * hh,
            cy - sin * fx * hw - cos * fy * hh,
        )
    }
}

/// Map a group's child coordinates (in points) onto its local box.
pub(crate) fn child_space(frame: &Frame, space: Option<&ChildSpace>) -> Transform {
    let Some(space) = space else {
        return Transform::identity();
    };
    let (ch_x, ch_y) = (emu_to_pt_f32(space.x), emu_to_pt_f32(space.y));
    let (ch_w, ch_h) = (emu_to_pt_f32(space.cx), emu_to_pt_f32(space.cy));
    let sx = if ch_w > 0.0 { frame.w / ch_w } else { 1.0 };
    let sy = if ch_h > 0.0 { frame.h / ch_h } else { 1.0 };
    Transform::from_scale(sx, sy).pre_concat(Transform::from_translate(-ch_x, -ch_y))
}

/// Whether the preset is an open stroke rather than a closed area.
pub(crate) fn is_line(preset: Option<&str>) -> bool {
    matches!(
        preset,
        Some("line") | Some("straightConnector1") | Some("lineInv")
    )
}

/// Outline of a preset geometry in a `w` x `h` box.
///
/// Unknown presets draw as rectangles.
pub(crate) fn preset_path(preset: Option<&str>, w: f32, h: f32) -> Option<Path> {
    if is_line(preset) {
        let mut pb = PathBuilder::new();
        if preset == Some("lineInv") {
            pb.move_to(0.0, h);
            pb.line_to(w, 0.0);
        } else {
            pb.move_to(0.0, 0.0);
            pb.line_to(w, h);
        }
        return pb.finish();
    }

    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let rect = Rect::from_xywh(0.0, 0.0, w, h)?;
    match preset {
        Some("ellipse") => PathBuilder::from_oval(rect),
        Some("roundRect") => round_rect(w, h, w.min(h) * ROUND_RECT_ADJ),
        Some("triangle") => {
            let mut pb = PathBuilder::new();
            pb.move_to(w / 2.0, 0.0);
            pb.line_to(w, h);
            pb.line_to(0.0, h);
            pb.close();
            pb.finish()
        },
        Some("rtTriangle") => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, 0.0);
            pb.line_to(w, h);
            pb.line_to(0.0, h);
            pb.close();
            pb.finish()
        },
        _ => Some(PathBuilder::from_rect(rect)),
    }
}

fn round_rect(w: f32, h: f32, r: f32) -> Option<Path> {
    let k = r * KAPPA;
    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.cubic_to(w - r + k, 0.0, w, r - k, w, r);
    pb.line_to(w, h - r);
    pb.cubic_to(w, h - r + k, w - r + k, h, w - r, h);
    pb.line_to(r, h);
    pb.cubic_to(r - k, h, 0.0, h - r + k, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Point;

    fn apply(ts: Transform, x: f32, y: f32) -> (f32, f32) {
        let mut p = [Point::from_xy(x, y)];
        ts.map_points(&mut p);
        (p[0].x, p[0].y)
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn test_unrotated_frame_translates() {
        let frame = Frame {
            x: 10.0,
            y: 20.0,
            w: 100.0,
            h: 50.0,
            ..Default::default()
        };
        assert!(close(apply(frame.placement(), 0.0, 0.0), (10.0, 20.0)));
        assert!(close(apply(frame.placement(), 100.0, 50.0), (110.0, 70.0)));
    }

    #[test]
    fn test_rotation_keeps_centre() {
        let frame = Frame {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 50.0,
            rotation: 90.0,
            ..Default::default()
        };
        assert!(close(apply(frame.placement(), 50.0, 25.0), (50.0, 25.0)));
        // top-left corner swings to the top-right of the rotated box
        assert!(close(apply(frame.placement(), 0.0, 0.0), (75.0, -25.0)));
    }

    #[test]
    fn test_flip_mirrors_but_text_does_not() {
        let frame = Frame {
            w: 100.0,
            h: 50.0,
            flip_h: true,
            ..Default::default()
        };
        assert!(close(apply(frame.placement(), 0.0, 0.0), (100.0, 0.0)));
        assert!(close(apply(frame.text_placement(), 0.0, 0.0), (0.0, 0.0)));
    }

    #[test]
    fn test_child_space_scales_into_group() {
        let frame = Frame {
            w: 200.0,
            h: 100.0,
            ..Default::default()
        };
        let space = ChildSpace {
            x: 12_700 * 10,
            y: 0,
            cx: 12_700 * 100,
            cy: 12_700 * 50,
        };
        let ts = child_space(&frame, Some(&space));
        assert!(close(apply(ts, 10.0, 0.0), (0.0, 0.0)));
        assert!(close(apply(ts, 110.0, 50.0), (200.0, 100.0)));
    }

    #[test]
    fn test_presets() {
        for preset in [None, Some("rect"), Some("ellipse"), Some("roundRect"), Some("triangle"), Some("star5")] {
            let path = preset_path(preset, 40.0, 20.0).unwrap();
            let bounds = path.bounds();
            assert!(bounds.width() <= 40.0 + 1e-3 && bounds.height() <= 20.0 + 1e-3);
        }
        assert!(is_line(Some("line")));
        assert!(preset_path(Some("line"), 40.0, 0.0).is_some());
        assert!(preset_path(Some("rect"), 0.0, 20.0).is_none());
    }
}
