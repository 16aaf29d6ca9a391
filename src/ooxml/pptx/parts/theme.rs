/// Theme parts for PowerPoint presentations.
///
/// A theme carries the name a slide master is known by, the major/minor
/// font pair and the colour scheme that `a:schemeClr` references resolve
/// against.
use crate::common::RGBColor;
use crate::common::xml::attr_value;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::part::Part;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// Names of the twelve colour scheme slots, in schema order.
pub const SCHEME_SLOTS: [&str; 12] = [
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

/// Theme information extracted from a theme part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    /// Theme name (`a:theme/@name`), empty when unnamed
    pub name: String,
    /// Major (heading) Latin typeface
    pub major_font: Option<String>,
    /// Minor (body) Latin typeface
    pub minor_font: Option<String>,
    /// Colour scheme slots resolved to RGB
    pub colors: HashMap<String, RGBColor>,
}

impl Theme {
    /// Colour of a scheme slot (`accent1`, `dk2`, ...).
    pub fn color(&self, slot: &str) -> Option<RGBColor> {
        self.colors.get(slot).copied()
    }

    /// Resolve a theme font reference such as `+mj-lt` to a typeface.
    ///
    /// Plain typefaces are returned unchanged.
    pub fn resolve_typeface<'t>(&'t self, typeface: &'t str) -> Option<&'t str> {
        match typeface {
            "+mj-lt" | "+mj-ea" | "+mj-cs" => self.major_font.as_deref(),
            "+mn-lt" | "+mn-ea" | "+mn-cs" => self.minor_font.as_deref(),
            "" => None,
            other => Some(other),
        }
    }
}

/// Theme part - defines the visual styling of a presentation.
///
/// Corresponds to `/ppt/theme/themeN.xml` in the package.
pub struct ThemePart<'a> {
    /// The underlying OPC part
    part: &'a dyn Part,
}

impl<'a> ThemePart<'a> {
    /// Create a ThemePart from an OPC Part.
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        Ok(Self { part })
    }

    /// Parse and return the theme information.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let theme_part = ThemePart::from_part(part)?;
    /// let theme = theme_part.theme()?;
    /// println!("Theme name: {}", theme.name);
    /// ```
    pub fn theme(&self) -> Result<Theme> {
        parse_theme(self.part.blob())
    }

    /// Get the underlying OPC part.
    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }
}

/// Parse theme XML.
pub fn parse_theme(xml: &[u8]) -> Result<Theme> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut theme = Theme::default();
    let mut in_major_font = false;
    let mut in_minor_font = false;
    let mut in_color_scheme = false;
    let mut current_slot: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag_name = e.local_name();
                match tag_name.as_ref() {
                    b"theme" => {
                        theme.name = attr_value(e, b"name").unwrap_or_default();
                    },
                    b"clrScheme" => in_color_scheme = true,
                    b"majorFont" => in_major_font = true,
                    b"minorFont" => in_minor_font = true,
                    b"latin" if in_major_font || in_minor_font => {
                        let typeface = attr_value(e, b"typeface").filter(|t| !t.is_empty());
                        if in_major_font {
                            theme.major_font = typeface;
                        } else {
                            theme.minor_font = typeface;
                        }
                    },
                    slot if in_color_scheme
                        && SCHEME_SLOTS.iter().any(|s| s.as_bytes() == slot) =>
                    {
                        current_slot = Some(String::from_utf8_lossy(slot).into_owned());
                    },
                    b"srgbClr" if in_color_scheme => {
                        if let (Some(slot), Some(color)) = (
                            current_slot.take(),
                            attr_value(e, b"val").and_then(|v| RGBColor::from_hex(&v)),
                        ) {
                            theme.colors.insert(slot, color);
                        }
                    },
                    b"sysClr" if in_color_scheme => {
                        // lastClr is what the system colour rendered as when saved
                        let color = attr_value(e, b"lastClr")
                            .and_then(|v| RGBColor::from_hex(&v))
                            .or_else(|| system_color(attr_value(e, b"val").as_deref()));
                        if let (Some(slot), Some(color)) = (current_slot.take(), color) {
                            theme.colors.insert(slot, color);
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"clrScheme" => in_color_scheme = false,
                b"majorFont" => in_major_font = false,
                b"minorFont" => in_minor_font = false,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(theme)
}

fn system_color(name: Option<&str>) -> Option<RGBColor> {
    match name? {
        "windowText" | "menuText" | "captionText" | "btnText" => Some(RGBColor::BLACK),
        "window" | "menu" | "btnHighlight" | "highlightText" => Some(RGBColor::WHITE),
        _ => None,
    }
}
