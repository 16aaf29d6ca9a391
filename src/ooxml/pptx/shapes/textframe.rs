/// Text frame types for PowerPoint shapes.
///
/// A read-only model of `p:txBody` used for titles and thumbnail text. Run
/// properties are kept as declared; inheritance from list styles and
/// master text styles is resolved by the caller through [`ListStyle`].
use crate::common::xml::Element;
use crate::ooxml::pptx::shapes::fill::ColorSpec;

/// Default body insets in EMUs: 0.1" left/right, 0.05" top/bottom.
pub const DEFAULT_INSETS: [i64; 4] = [91_440, 45_720, 91_440, 45_720];

/// Vertical anchoring of text in its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Middle,
    Bottom,
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Alignment::Left),
            "ctr" => Some(Alignment::Center),
            "r" => Some(Alignment::Right),
            "just" | "dist" | "justLow" | "thaiDist" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Character properties shared by runs and list-style levels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunProperties {
    /// Size in points
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub color: Option<ColorSpec>,
    /// `a:latin/@typeface`, possibly a theme reference like `+mn-lt`
    pub typeface: Option<String>,
}

impl RunProperties {
    /// Read `a:rPr`, `a:defRPr` or `a:endParaRPr`.
    pub fn from_element(r_pr: &Element) -> Self {
        let color = match r_pr.child("solidFill") {
            Some(fill) => ColorSpec::from_parent(fill),
            None => None,
        };
        Self {
            size: r_pr.attr_f64("sz").map(|sz| (sz / 100.0) as f32),
            bold: r_pr.attr_bool("b"),
            color,
            typeface: r_pr
                .child("latin")
                .and_then(|latin| latin.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    /// Fill unset values from `fallback`.
    pub fn or(&self, fallback: &RunProperties) -> RunProperties {
        RunProperties {
            size: self.size.or(fallback.size),
            bold: self.bold.or(fallback.bold),
            color: self.color.clone().or_else(|| fallback.color.clone()),
            typeface: self.typeface.clone().or_else(|| fallback.typeface.clone()),
        }
    }
}

/// One level of a list style (`a:lvl1pPr` ... `a:lvl9pPr`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelStyle {
    pub alignment: Option<Alignment>,
    pub run: RunProperties,
}

/// Paragraph defaults by outline level, from `a:lstStyle` or a master's `p:txStyles`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListStyle {
    levels: [Option<LevelStyle>; 9],
}

impl ListStyle {
    pub fn from_element(list: &Element) -> Self {
        let mut style = ListStyle::default();
        for child in list.children() {
            let Some(level) = child
                .local_name()
                .strip_prefix("lvl")
                .and_then(|rest| rest.strip_suffix("pPr"))
                .and_then(|n| n.parse::<usize>().ok())
            else {
                continue;
            };
            if (1..=9).contains(&level) {
                style.levels[level - 1] = Some(LevelStyle {
                    alignment: child.attr("algn").and_then(Alignment::parse),
                    run: child
                        .child("defRPr")
                        .map(RunProperties::from_element)
                        .unwrap_or_default(),
                });
            }
        }
        style
    }

    /// Style of a 0-based outline level.
    pub fn level(&self, level: u32) -> Option<&LevelStyle> {
        self.levels.get(level as usize).and_then(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Option::is_none)
    }
}

/// A run of text with its declared properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub text: String,
    pub properties: RunProperties,
}

/// A paragraph (`a:p`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub alignment: Option<Alignment>,
    /// 0-based outline level
    pub level: u32,
    pub runs: Vec<TextRun>,
    /// Paragraph-level run defaults (`a:pPr/a:defRPr`)
    pub default_run: RunProperties,
    /// Properties of the paragraph mark, used to size empty paragraphs
    pub end_run: RunProperties,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A text body (`p:txBody`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    /// Left, top, right, bottom insets in EMUs
    pub insets: [i64; 4],
    pub anchor: Option<Anchor>,
    pub wrap: bool,
    pub list_style: ListStyle,
    pub paragraphs: Vec<Paragraph>,
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            insets: DEFAULT_INSETS,
            anchor: None,
            wrap: true,
            list_style: ListStyle::default(),
            paragraphs: Vec::new(),
        }
    }
}

impl TextBody {
    pub fn from_element(tx_body: &Element) -> Self {
        let mut body = TextBody::default();

        if let Some(body_pr) = tx_body.child("bodyPr") {
            let inset = |name: &str, default: i64| body_pr.attr_i64(name).unwrap_or(default);
            body.insets = [
                inset("lIns", DEFAULT_INSETS[0]),
                inset("tIns", DEFAULT_INSETS[1]),
                inset("rIns", DEFAULT_INSETS[2]),
                inset("bIns", DEFAULT_INSETS[3]),
            ];
            body.anchor = match body_pr.attr("anchor") {
                Some("t") => Some(Anchor::Top),
                Some("ctr") => Some(Anchor::Middle),
                Some("b") => Some(Anchor::Bottom),
                _ => None,
            };
            body.wrap = body_pr.attr("wrap") != Some("none");
        }

        if let Some(list) = tx_body.child("lstStyle") {
            body.list_style = ListStyle::from_element(list);
        }

        body.paragraphs = tx_body.children_named("p").map(parse_paragraph).collect();
        body
    }

    /// Plain text with paragraphs separated by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_paragraph(p: &Element) -> Paragraph {
    let mut paragraph = Paragraph::default();

    if let Some(p_pr) = p.child("pPr") {
        paragraph.alignment = p_pr.attr("algn").and_then(Alignment::parse);
        paragraph.level = p_pr.attr_i64("lvl").unwrap_or(0).clamp(0, 8) as u32;
        if let Some(def) = p_pr.child("defRPr") {
            paragraph.default_run = RunProperties::from_element(def);
        }
    }

    for child in p.children() {
        match child.local_name() {
            "r" | "fld" => {
                let text = child.child("t").map(|t| t.text().to_string()).unwrap_or_default();
                let properties = child
                    .child("rPr")
                    .map(RunProperties::from_element)
                    .unwrap_or_default();
                paragraph.runs.push(TextRun { text, properties });
            },
            "br" => {
                let properties = child
                    .child("rPr")
                    .map(RunProperties::from_element)
                    .unwrap_or_default();
                paragraph.runs.push(TextRun {
                    text: "\n".to_string(),
                    properties,
                });
            },
            "endParaRPr" => paragraph.end_run = RunProperties::from_element(child),
            _ => {},
        }
    }

    paragraph
}
