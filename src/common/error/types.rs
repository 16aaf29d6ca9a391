//! Unified error types for deckcraft.
//!
//! Every engine operation returns [`Result`]. The variants mirror what a caller
//! can act on: a blob that is not a deck, a bad slide index or image format,
//! an operation the selected backend cannot perform, and wrapped failures that
//! keep their cause.
use crate::ooxml::error::OoxmlError;
use thiserror::Error;

/// Main error type for deckcraft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The bytes could not be opened as a presentation
    #[error("Cannot open deck: {0}")]
    DeckOpen(String),

    /// Slide position outside `[0, count)`
    #[error("Invalid slide index {index}: deck has {count} slides")]
    InvalidSlideIndex { index: usize, count: usize },

    /// Thumbnail format other than png, jpg or jpeg
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Operation unavailable on the selected backend
    #[error("Not supported by this backend: {0}")]
    NotSupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while reading or editing an open deck
    #[error("Deck error: {0}")]
    Deck(#[source] OoxmlError),

    /// Rasterization or image encoding failure
    #[error("Render error: {0}")]
    Render(String),

    /// The template expression renderer failed
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid or already installed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for deckcraft operations.
pub type Result<T> = std::result::Result<T, Error>;
