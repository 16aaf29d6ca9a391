//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Io(e) => Error::Io(e),
            OoxmlError::Opc(OpcError::IoError(e)) => Error::Io(e),
            OoxmlError::SlideOutOfRange { index, count } => {
                Error::InvalidSlideIndex { index, count }
            },
            other => Error::Deck(other),
        }
    }
}

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        Error::from(OoxmlError::from(err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Deck(OoxmlError::from(err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Render(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Map a failure raised while opening bytes to [`Error::DeckOpen`].
    ///
    /// Once a deck is open the same underlying errors surface as
    /// [`Error::Deck`] through the `From` conversions instead.
    pub(crate) fn open_failure(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Io(e) => Error::Io(e),
            other => Error::DeckOpen(other.to_string()),
        }
    }
}
