//! Deckcraft - slide-deck manipulation for OOXML presentations
//!
//! This library reads, cuts, combines and rasterizes PowerPoint (.pptx) decks
//! held in memory.
//!
//! # Features
//!
//! - **Properties**: page size, document metadata, per-slide and per-master
//!   information as a flat record with a JSON rendition
//! - **Split**: one self-contained deck per slide, or a single slide on demand
//! - **Thumbnails**: PNG or JPEG images of slides, proportionally scaled
//! - **Merge**: several decks concatenated, optionally sharing identical masters
//! - **Templates**: `${...}` expressions in slide text rendered against bindings
//!
//! # Example - Splitting a deck
//!
//! ```no_run
//! use deckcraft::presentation::{Artifact, BackendKind, EngineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let deck = Artifact::from_path("deck.pptx")?;
//! let backend = BackendKind::Cloning.backend(EngineConfig::default());
//!
//! for slide in backend.split(Some(&deck))? {
//!     println!("{:?}: {} bytes", slide.file_name(), slide.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level package access
//!
//! ```no_run
//! use deckcraft::ooxml::pptx::Package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = Package::open("deck.pptx")?;
//! let pres = pkg.presentation()?;
//! for master in pres.masters()? {
//!     println!("Master: {}", master.name()?);
//! }
//! # Ok(())
//! # }
//! ```

/// Error type, colors, units and XML helpers shared by all layers
pub mod common;

/// OOXML package layer
///
/// OPC containers, document properties and PresentationML parts.
pub mod ooxml;

/// The presentation engine: backends, rendering and naming rules
pub mod presentation;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use presentation::{
    Artifact, BackendKind, CloningBackend, DeckBackend, EngineConfig, PropertiesRecord,
    SubtractiveBackend, ThumbnailFormat,
};
