/// DrawingML colours, fills and outlines as they appear in shape properties
/// (`p:spPr`) and slide backgrounds (`p:bg`).
use crate::common::RGBColor;
use crate::common::xml::Element;

/// Where a colour's base value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorKind {
    /// `a:srgbClr`
    Rgb(RGBColor),
    /// `a:schemeClr`, resolved through the colour map and theme
    Scheme(String),
    /// `a:sysClr`, carried as its last rendered value
    System(RGBColor),
    /// `a:prstClr`
    Preset(String),
}

/// A colour with its DrawingML transforms, all in 1/100000 units.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpec {
    pub kind: ColorKind,
    pub lum_mod: i32,
    pub lum_off: i32,
    pub tint: Option<i32>,
    pub shade: Option<i32>,
    pub alpha: i32,
}

impl ColorSpec {
    pub fn new(kind: ColorKind) -> Self {
        Self {
            kind,
            lum_mod: 100_000,
            lum_off: 0,
            tint: None,
            shade: None,
            alpha: 100_000,
        }
    }

    /// Read the first colour element among the children of `parent`.
    pub fn from_parent(parent: &Element) -> Option<Self> {
        parent.children().iter().find_map(Self::from_color_element)
    }

    /// Read a colour element (`a:srgbClr`, `a:schemeClr`, ...).
    pub fn from_color_element(e: &Element) -> Option<Self> {
        let kind = match e.local_name() {
            "srgbClr" => ColorKind::Rgb(RGBColor::from_hex(e.attr("val")?)?),
            "schemeClr" => ColorKind::Scheme(e.attr("val")?.to_string()),
            "sysClr" => {
                let last = e.attr("lastClr").and_then(RGBColor::from_hex);
                let fallback = match e.attr("val") {
                    Some("window") => RGBColor::WHITE,
                    _ => RGBColor::BLACK,
                };
                ColorKind::System(last.unwrap_or(fallback))
            },
            "prstClr" => ColorKind::Preset(e.attr("val")?.to_string()),
            "scrgbClr" => {
                let channel = |name: &str| {
                    let pct = e.attr_i64(name).unwrap_or(0) as f64 / 100_000.0;
                    (pct.clamp(0.0, 1.0) * 255.0).round() as u8
                };
                ColorKind::Rgb(RGBColor::new(channel("r"), channel("g"), channel("b")))
            },
            _ => return None,
        };

        let mut spec = Self::new(kind);
        for modifier in e.children() {
            let val = modifier.attr_i64("val").unwrap_or(0) as i32;
            match modifier.local_name() {
                "lumMod" => spec.lum_mod = val,
                "lumOff" => spec.lum_off = val,
                "tint" => spec.tint = Some(val),
                "shade" => spec.shade = Some(val),
                "alpha" => spec.alpha = val,
                _ => {},
            }
        }
        Some(spec)
    }

    /// Resolve to an RGB value and an opacity in `0.0..=1.0`.
    ///
    /// `scheme` maps a scheme slot name (after colour mapping) to its value.
    pub fn resolve<F>(&self, scheme: F) -> Option<(RGBColor, f32)>
    where
        F: Fn(&str) -> Option<RGBColor>,
    {
        let base = match &self.kind {
            ColorKind::Rgb(c) | ColorKind::System(c) => *c,
            ColorKind::Scheme(name) => scheme(name)?,
            ColorKind::Preset(name) => preset_color(name)?,
        };
        let mut color = base;
        if let Some(tint) = self.tint {
            color = color.tinted(tint);
        }
        if let Some(shade) = self.shade {
            color = color.shaded(shade);
        }
        color = color.with_luminance(self.lum_mod, self.lum_off);
        let alpha = (self.alpha as f32 / 100_000.0).clamp(0.0, 1.0);
        Some((color, alpha))
    }
}

fn preset_color(name: &str) -> Option<RGBColor> {
    let hex = match name {
        "black" => "000000",
        "white" => "FFFFFF",
        "red" => "FF0000",
        "green" => "008000",
        "lime" => "00FF00",
        "blue" => "0000FF",
        "yellow" => "FFFF00",
        "cyan" | "aqua" => "00FFFF",
        "magenta" | "fuchsia" => "FF00FF",
        "gray" | "grey" => "808080",
        "silver" => "C0C0C0",
        "navy" => "000080",
        "orange" => "FFA500",
        "purple" => "800080",
        "maroon" => "800000",
        "teal" => "008080",
        "olive" => "808000",
        "darkGray" | "dkGray" => "A9A9A9",
        "lightGray" | "ltGray" => "D3D3D3",
        _ => return None,
    };
    RGBColor::from_hex(hex)
}

/// A fill as declared on a shape or background.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fill {
    /// No fill element; the style or an inherited value applies
    #[default]
    Inherit,
    /// `a:noFill`
    NoFill,
    /// `a:solidFill`
    Solid(ColorSpec),
    /// `a:gradFill`, painted with its first stop
    Gradient(ColorSpec),
    /// `a:blipFill` with the relationship id of the image
    Picture(String),
}

impl Fill {
    /// Read the fill among the children of a properties element.
    pub fn from_properties(props: &Element) -> Fill {
        for child in props.children() {
            match child.local_name() {
                "noFill" => return Fill::NoFill,
                "solidFill" => {
                    return ColorSpec::from_parent(child).map_or(Fill::Inherit, Fill::Solid);
                },
                "gradFill" => {
                    let first_stop = child
                        .child("gsLst")
                        .and_then(|list| list.child("gs"))
                        .and_then(ColorSpec::from_parent);
                    return first_stop.map_or(Fill::Inherit, Fill::Gradient);
                },
                "blipFill" => {
                    return child
                        .child("blip")
                        .and_then(blip_embed)
                        .map_or(Fill::Inherit, Fill::Picture);
                },
                _ => {},
            }
        }
        Fill::Inherit
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Fill::Inherit)
    }
}

/// Relationship id of a blip's embedded image.
pub fn blip_embed(blip: &Element) -> Option<String> {
    blip.qualified_attr("r:embed")
        .or_else(|| blip.attr("embed"))
        .map(str::to_string)
}

/// An outline (`a:ln`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    /// Width in EMUs
    pub width: Option<i64>,
    pub fill: Fill,
}

impl Line {
    pub fn from_element(ln: &Element) -> Self {
        Self {
            width: ln.attr_i64("w"),
            fill: Fill::from_properties(ln),
        }
    }
}

/// Slide background (`p:bg`).
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// `p:bgPr` with an explicit fill
    Properties(Fill),
    /// `p:bgRef` into the theme's background fill styles, with its colour
    Reference { idx: u32, color: Option<ColorSpec> },
}

impl Background {
    /// Read `p:cSld/p:bg` from the root element of a slide, layout or master.
    pub fn from_sheet(root: &Element) -> Option<Self> {
        let bg = root.path(&["cSld", "bg"])?;
        if let Some(props) = bg.child("bgPr") {
            return Some(Background::Properties(Fill::from_properties(props)));
        }
        let bg_ref = bg.child("bgRef")?;
        Some(Background::Reference {
            idx: bg_ref.attr_i64("idx").unwrap_or(0).max(0) as u32,
            color: ColorSpec::from_parent(bg_ref),
        })
    }

    /// Short textual description used to compare backgrounds across decks.
    pub fn signature(&self) -> String {
        match self {
            Background::Properties(Fill::Solid(c)) => format!("solid:{}", color_signature(c)),
            Background::Properties(Fill::Gradient(c)) => format!("gradient:{}", color_signature(c)),
            Background::Properties(Fill::Picture(_)) => "picture".to_string(),
            Background::Properties(Fill::NoFill) => "none".to_string(),
            Background::Properties(Fill::Inherit) => "inherit".to_string(),
            Background::Reference { idx, color } => match color {
                Some(c) => format!("ref{}:{}", idx, color_signature(c)),
                None => format!("ref{}", idx),
            },
        }
    }
}

fn color_signature(color: &ColorSpec) -> String {
    match &color.kind {
        ColorKind::Rgb(c) | ColorKind::System(c) => c.to_hex(),
        ColorKind::Scheme(name) | ColorKind::Preset(name) => name.clone(),
    }
}
