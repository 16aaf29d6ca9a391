/// Base shape types for PowerPoint presentations.
///
/// Shapes are read from a sheet's `p:cSld/p:spTree` into an owned tree.
/// Geometry stays in EMUs; nothing here knows about pixels.
use crate::common::xml::Element;
use crate::ooxml::pptx::shapes::fill::{ColorSpec, Fill, Line, blip_embed};
use crate::ooxml::pptx::shapes::textframe::TextBody;

/// Shape type enumeration.
///
/// Indicates what kind of shape this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// An autoshape or text box (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
}

impl ShapeType {
    fn from_local_name(local: &str) -> Option<Self> {
        match local {
            "sp" => Some(ShapeType::Shape),
            "pic" => Some(ShapeType::Picture),
            "graphicFrame" => Some(ShapeType::GraphicFrame),
            "grpSp" => Some(ShapeType::GroupShape),
            "cxnSp" => Some(ShapeType::Connector),
            _ => None,
        }
    }
}

/// Position, size and orientation of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    /// Clockwise rotation in 60000ths of a degree
    pub rot: i64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Transform {
    /// Read `a:xfrm` or `p:xfrm`.
    pub fn from_element(xfrm: &Element) -> Option<Self> {
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        Some(Self {
            x: off.attr_i64("x").unwrap_or(0),
            y: off.attr_i64("y").unwrap_or(0),
            cx: ext.attr_i64("cx").unwrap_or(0),
            cy: ext.attr_i64("cy").unwrap_or(0),
            rot: xfrm.attr_i64("rot").unwrap_or(0),
            flip_h: xfrm.attr_bool("flipH").unwrap_or(false),
            flip_v: xfrm.attr_bool("flipV").unwrap_or(false),
        })
    }
}

/// Child coordinate space of a group (`a:chOff`/`a:chExt`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChildSpace {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Placeholder reference (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placeholder {
    /// `@type`; absent means an object placeholder
    pub kind: Option<String>,
    pub idx: Option<u32>,
}

impl Placeholder {
    /// Placeholder type with equivalent kinds folded together.
    pub fn normalized_kind(&self) -> &str {
        match self.kind.as_deref() {
            None | Some("obj") | Some("body") | Some("subTitle") => "body",
            Some("ctrTitle") | Some("title") => "title",
            Some(other) => other,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_deref(), Some("title") | Some("ctrTitle"))
    }

    /// Whether `other` (on a layout or master) is the placeholder this one inherits from.
    pub fn matches_idx(&self, other: &Placeholder) -> bool {
        self.idx.is_some() && self.idx == other.idx
    }

    pub fn matches_kind(&self, other: &Placeholder) -> bool {
        self.normalized_kind() == other.normalized_kind()
    }
}

/// Theme style references of a shape (`p:style`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Option<ColorSpec>,
    pub line: Option<ColorSpec>,
    pub font: Option<ColorSpec>,
}

/// A shape read from a shape tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub shape_type: ShapeType,
    pub id: u32,
    pub name: String,
    /// Own frame; placeholders without one inherit it from their layout
    pub transform: Option<Transform>,
    /// Group child coordinate space
    pub child_space: Option<ChildSpace>,
    /// Preset geometry name (`rect`, `ellipse`, ...)
    pub geometry: Option<String>,
    pub fill: Fill,
    pub line: Option<Line>,
    pub style: ShapeStyle,
    pub placeholder: Option<Placeholder>,
    pub text: Option<TextBody>,
    /// Relationship id of the picture's image
    pub image: Option<String>,
    pub children: Vec<Shape>,
}

impl Shape {
    /// Read a shape element; returns `None` for elements that are not shapes.
    pub fn from_element(e: &Element) -> Option<Self> {
        let shape_type = ShapeType::from_local_name(e.local_name())?;

        // Non-visual properties live under p:nvSpPr, p:nvPicPr, p:nvGrpSpPr, ...
        let nv = e
            .children()
            .iter()
            .find(|c| c.local_name().starts_with("nv") && c.local_name().ends_with("Pr"));
        let c_nv_pr = nv.and_then(|nv| nv.child("cNvPr"));
        let placeholder = nv
            .and_then(|nv| nv.path(&["nvPr", "ph"]))
            .map(|ph| Placeholder {
                kind: ph.attr("type").map(str::to_string),
                idx: ph.attr_i64("idx").and_then(|v| u32::try_from(v).ok()),
            });

        let props = e
            .children()
            .iter()
            .find(|c| matches!(c.local_name(), "spPr" | "grpSpPr"));

        let (transform, child_space) = match shape_type {
            ShapeType::GraphicFrame => (e.child("xfrm").and_then(Transform::from_element), None),
            _ => {
                let xfrm = props.and_then(|p| p.child("xfrm"));
                let child_space = xfrm.and_then(|x| {
                    let off = x.child("chOff")?;
                    let ext = x.child("chExt")?;
                    Some(ChildSpace {
                        x: off.attr_i64("x").unwrap_or(0),
                        y: off.attr_i64("y").unwrap_or(0),
                        cx: ext.attr_i64("cx").unwrap_or(0),
                        cy: ext.attr_i64("cy").unwrap_or(0),
                    })
                });
                (xfrm.and_then(Transform::from_element), child_space)
            },
        };

        let style = e
            .child("style")
            .map(|style| ShapeStyle {
                fill: style.child("fillRef").and_then(ColorSpec::from_parent),
                line: style.child("lnRef").and_then(ColorSpec::from_parent),
                font: style.child("fontRef").and_then(ColorSpec::from_parent),
            })
            .unwrap_or_default();

        let children = if shape_type == ShapeType::GroupShape {
            parse_shapes(e)
        } else {
            Vec::new()
        };

        Some(Self {
            shape_type,
            id: c_nv_pr
                .and_then(|c| c.attr_i64("id"))
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            name: c_nv_pr
                .and_then(|c| c.attr("name"))
                .unwrap_or_default()
                .to_string(),
            transform,
            child_space,
            geometry: props
                .and_then(|p| p.child("prstGeom"))
                .and_then(|g| g.attr("prst"))
                .map(str::to_string),
            fill: props.map(Fill::from_properties).unwrap_or_default(),
            line: props.and_then(|p| p.child("ln")).map(Line::from_element),
            style,
            placeholder,
            text: e.child("txBody").map(TextBody::from_element),
            image: e
                .child("blipFill")
                .and_then(|b| b.child("blip"))
                .and_then(blip_embed),
            children,
        })
    }

    /// Whether this is a title or centered-title placeholder.
    pub fn is_title(&self) -> bool {
        self.placeholder.as_ref().is_some_and(Placeholder::is_title)
    }

    /// Plain text of the shape, paragraphs separated by newlines.
    pub fn text(&self) -> String {
        self.text.as_ref().map(TextBody::text).unwrap_or_default()
    }
}

/// Read the shapes directly under a container (`p:spTree` or `p:grpSp`).
///
/// `mc:AlternateContent` wrappers contribute their fallback content.
pub fn parse_shapes(container: &Element) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for child in container.children() {
        if child.local_name() == "AlternateContent" {
            if let Some(fallback) = child.child("Fallback") {
                shapes.extend(parse_shapes(fallback));
            }
            continue;
        }
        if let Some(shape) = Shape::from_element(child) {
            shapes.push(shape);
        }
    }
    shapes
}

/// Read the shape tree of a slide, layout or master from its root element.
pub fn shape_tree(root: &Element) -> Vec<Shape> {
    root.path(&["cSld", "spTree"])
        .map(parse_shapes)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &[u8] = br#"<p:sld xmlns:a="urn:a" xmlns:r="urn:r" xmlns:p="urn:p"><p:cSld><p:spTree>
        <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>
        <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:spPr/>
            <p:txBody><a:bodyPr/><a:p><a:r><a:t>Quarterly</a:t></a:r></a:p><a:p><a:r><a:t>Review</a:t></a:r></a:p></p:txBody></p:sp>
        <p:sp><p:nvSpPr><p:cNvPr id="3" name="Box"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
            <p:spPr><a:xfrm rot="5400000" flipH="1"><a:off x="100" y="200"/><a:ext cx="300" cy="400"/></a:xfrm><a:prstGeom prst="ellipse"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill><a:ln w="9525"/></p:spPr>
            <p:style><a:lnRef idx="2"><a:schemeClr val="accent1"/></a:lnRef><a:fillRef idx="1"><a:schemeClr val="accent1"/></a:fillRef><a:effectRef idx="0"><a:schemeClr val="accent1"/></a:effectRef><a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef></p:style></p:sp>
        <p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
            <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/><a:chOff x="0" y="0"/><a:chExt cx="20" cy="20"/></a:xfrm></p:grpSpPr>
            <p:pic><p:nvPicPr><p:cNvPr id="5" name="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch/></p:blipFill><p:spPr/></p:pic>
        </p:grpSp>
        <mc:AlternateContent xmlns:mc="urn:mc"><mc:Choice Requires="p14"><p:sp/></mc:Choice><mc:Fallback>
            <p:cxnSp><p:nvCxnSpPr><p:cNvPr id="6" name="Connector"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr/></p:cxnSp>
        </mc:Fallback></mc:AlternateContent>
    </p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_shape_tree() {
        let root = Element::from_bytes(SLIDE).unwrap();
        let shapes = shape_tree(&root);
        assert_eq!(shapes.len(), 4);

        let title = &shapes[0];
        assert!(title.is_title());
        assert_eq!(title.text(), "Quarterly\nReview");
        assert!(title.transform.is_none());

        let boxed = &shapes[1];
        assert_eq!(boxed.name, "Box");
        assert_eq!(boxed.geometry.as_deref(), Some("ellipse"));
        let xfrm = boxed.transform.unwrap();
        assert_eq!((xfrm.x, xfrm.y, xfrm.cx, xfrm.cy), (100, 200, 300, 400));
        assert_eq!(xfrm.rot, 5_400_000);
        assert!(xfrm.flip_h);
        assert!(matches!(boxed.fill, Fill::Solid(_)));
        assert_eq!(boxed.line.as_ref().and_then(|l| l.width), Some(9525));
        assert!(boxed.style.fill.is_some());

        let group = &shapes[2];
        assert_eq!(group.shape_type, ShapeType::GroupShape);
        assert_eq!(group.child_space.map(|c| c.cx), Some(20));
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].image.as_deref(), Some("rId2"));

        assert_eq!(shapes[3].shape_type, ShapeType::Connector);
        assert_eq!(shapes[3].id, 6);
    }

    #[test]
    fn test_placeholder_matching() {
        let slide_body = Placeholder {
            kind: None,
            idx: Some(1),
        };
        let layout_body = Placeholder {
            kind: Some("body".to_string()),
            idx: Some(1),
        };
        let ctr_title = Placeholder {
            kind: Some("ctrTitle".to_string()),
            idx: None,
        };
        let title = Placeholder {
            kind: Some("title".to_string()),
            idx: None,
        };
        assert!(slide_body.matches_idx(&layout_body));
        assert!(slide_body.matches_kind(&layout_body));
        assert!(!ctr_title.matches_idx(&title));
        assert!(ctr_title.matches_kind(&title));
    }
}
