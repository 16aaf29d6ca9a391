//! Errors of the PresentationML layer.
//!
//! Package failures arrive wrapped as [`OoxmlError::Opc`]; everything else
//! concerns a part whose content is not what a deck requires.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OoxmlError>;

#[derive(Error, Debug)]
pub enum OoxmlError {
    #[error("Package error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// Malformed part XML
    #[error("XML error: {0}")]
    Xml(String),

    /// A part the deck structure requires is absent
    #[error("Missing part: {0}")]
    PartNotFound(String),

    /// A part reached through a typed relationship has the wrong content type
    #[error("Part has content type {got}, expected {expected}")]
    InvalidContentType { expected: String, got: String },

    #[error("Broken relationship: {0}")]
    InvalidRelationship(String),

    /// The package is not a presentation
    #[error("Not a presentation: {0}")]
    InvalidFormat(String),

    #[error("Slide index {index} out of range for {count} slides")]
    SlideOutOfRange { index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OoxmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        OoxmlError::Xml(format!("Invalid UTF-8: {}", err))
    }
}
