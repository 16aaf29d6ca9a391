/// Shapes module for PowerPoint presentations.
///
/// This module provides a read-only model of slide content:
/// - Shapes, pictures, groups and connectors with their frames
/// - Fills, outlines and backgrounds
/// - Text bodies, paragraphs and runs
pub mod base;
pub mod fill;
pub mod textframe;

pub use base::{ChildSpace, Placeholder, Shape, ShapeStyle, ShapeType, Transform, parse_shapes, shape_tree};
pub use fill::{Background, ColorKind, ColorSpec, Fill, Line};
pub use textframe::{Alignment, Anchor, ListStyle, Paragraph, RunProperties, TextBody, TextRun};
