//! Colour resolution and paints.
//!
//! Scheme colours go through the effective colour map (slide override,
//! then layout override, then the master's `p:clrMap`) into the master's
//! theme colour scheme.

use std::collections::HashMap;

use crate::common::RGBColor;
use crate::ooxml::pptx::parts::Theme;
use crate::ooxml::pptx::shapes::{ColorSpec, Fill};
use tiny_skia::{Color, Paint};

/// Theme colours seen through a colour map.
#[derive(Debug, Clone, Default)]
pub(crate) struct Palette {
    theme: Theme,
    color_map: HashMap<String, String>,
}

impl Palette {
    pub fn new(theme: Theme, color_map: HashMap<String, String>) -> Self {
        Self { theme, color_map }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Value of a scheme slot as a shape names it (`bg1`, `tx1`, `accent2`).
    pub fn slot(&self, name: &str) -> Option<RGBColor> {
        let mapped = self.color_map.get(name).map_or(name, String::as_str);
        self.theme.color(mapped).or_else(|| self.theme.color(name))
    }

    pub fn resolve(&self, spec: &ColorSpec) -> Option<(RGBColor, f32)> {
        spec.resolve(|slot| self.slot(slot))
    }

    /// Colour a fill paints with; `style` is the shape's theme style reference.
    ///
    /// Gradients are painted with their first stop. Picture fills have no
    /// colour and are handled by the caller.
    pub fn fill_color(&self, fill: &Fill, style: Option<&ColorSpec>) -> Option<(RGBColor, f32)> {
        match fill {
            Fill::Solid(spec) | Fill::Gradient(spec) => self.resolve(spec),
            Fill::Inherit => style.and_then(|spec| self.resolve(spec)),
            Fill::NoFill | Fill::Picture(_) => None,
        }
    }
}

/// Pick the colour map in effect: the first non-empty override, else the master's.
pub(crate) fn effective_color_map(
    overrides: [HashMap<String, String>; 2],
    master: HashMap<String, String>,
) -> HashMap<String, String> {
    overrides
        .into_iter()
        .find(|map| !map.is_empty())
        .unwrap_or(master)
}

pub(crate) fn skia_color(color: RGBColor, alpha: f32) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Anti-aliased solid paint.
pub(crate) fn solid_paint(color: RGBColor, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color, alpha));
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::ColorKind;

    fn palette() -> Palette {
        let mut theme = Theme::default();
        theme.colors.insert("lt1".to_string(), RGBColor::WHITE);
        theme.colors.insert("dk1".to_string(), RGBColor::BLACK);
        theme.colors.insert("accent1".to_string(), RGBColor::new(0x44, 0x72, 0xC4));
        let map = [("bg1", "lt1"), ("tx1", "dk1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Palette::new(theme, map)
    }

    #[test]
    fn test_mapped_and_direct_slots() {
        let palette = palette();
        assert_eq!(palette.slot("bg1"), Some(RGBColor::WHITE));
        assert_eq!(palette.slot("tx1"), Some(RGBColor::BLACK));
        assert_eq!(palette.slot("accent1"), Some(RGBColor::new(0x44, 0x72, 0xC4)));
        assert_eq!(palette.slot("accent6"), None);
    }

    #[test]
    fn test_fill_colors() {
        let palette = palette();
        let accent = ColorSpec::new(ColorKind::Scheme("accent1".to_string()));
        assert_eq!(
            palette.fill_color(&Fill::Solid(accent.clone()), None),
            Some((RGBColor::new(0x44, 0x72, 0xC4), 1.0))
        );
        assert_eq!(palette.fill_color(&Fill::NoFill, Some(&accent)), None);
        assert!(palette.fill_color(&Fill::Inherit, Some(&accent)).is_some());
        assert_eq!(palette.fill_color(&Fill::Inherit, None), None);
    }

    #[test]
    fn test_override_wins_over_master_map() {
        let over: HashMap<String, String> = [("bg1".to_string(), "dk1".to_string())].into();
        let master: HashMap<String, String> = [("bg1".to_string(), "lt1".to_string())].into();
        let map = effective_color_map([HashMap::new(), over], master.clone());
        assert_eq!(map["bg1"], "dk1");
        let map = effective_color_map([HashMap::new(), HashMap::new()], master);
        assert_eq!(map["bg1"], "lt1");
    }
}
