//! Errors of the package layer: the ZIP container, part names, content types
//! and relationships.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// No file at the given path
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Invalid part name: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A relationship id or type with no match on its source
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("No content type for part {0}")]
    ContentTypeNotFound(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// Every candidate name for a new part is taken
    #[error("No free part name for {0}")]
    PartnameExhausted(String),

    #[error("Malformed package XML: {0}")]
    XmlError(String),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Part is not UTF-8: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::XmlError(format!("bad attribute: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
