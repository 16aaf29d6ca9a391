/// Parts for PowerPoint presentation documents.
///
/// This module contains wrapper types for the XML parts of a .pptx package
/// that the deck operations read or rewrite.
pub mod comment;
pub mod presentation;
pub mod slide;
pub mod theme;

pub use comment::CommentsPart;
pub use presentation::{IdEntry, IdList, PresentationPart};
pub use slide::SlidePart;
pub use theme::{Theme, ThemePart};
