//! Presentation engine.
//!
//! Operations on decks held as in-memory blobs ([`Artifact`]):
//!
//! - properties: a flat metadata record of a deck ([`PropertiesRecord`])
//! - split and get-slide: single-slide decks cut out of a deck
//! - thumbnails: slide images in PNG or JPEG
//! - merge: several decks concatenated into one
//! - templates: `${...}` expressions in slide text rendered against bindings
//!
//! All of them are reached through a [`DeckBackend`]. The backend decides how
//! slides are isolated and whether merging is available.
//!
//! # Architecture
//!
//! - `artifact`: blobs and the file naming rules of outputs
//! - `backend`: the [`DeckBackend`] trait and its two implementations
//! - `config`: [`EngineConfig`] and the process-wide installed copy
//! - `deck`: opening input bytes
//! - `isolate`, `merge`, `template`: deck edits on top of `ooxml::pptx`
//! - `render`, `thumbnail`: slide rasterization
//! - `source`: resolution of input blobs from a repository document
//!
//! # Example
//!
//! ```rust,no_run
//! use deckcraft::presentation::{Artifact, BackendKind, EngineConfig};
//!
//! let deck = Artifact::from_path("deck.pptx")?;
//! let backend = BackendKind::Cloning.backend(EngineConfig::default());
//!
//! if let Some(record) = backend.properties(Some(&deck))? {
//!     println!("{}", record.to_json_pretty()?);
//! }
//! for image in backend.thumbnails(Some(&deck), 320, Some("png"), true)? {
//!     image.save(image.file_name().unwrap_or("slide.png"))?;
//! }
//! # Ok::<(), deckcraft::common::Error>(())
//! ```

// Submodule declarations
pub mod artifact;
pub mod backend;
pub mod config;
pub mod deck;
pub mod isolate;
pub mod merge;
pub mod properties;
pub mod render;
pub mod source;
pub mod template;
pub mod thumbnail;

// Re-exports
pub use artifact::{Artifact, JPEG_MIME, PNG_MIME, PRESENTATION_MIME};
pub use backend::{BackendKind, CloningBackend, DeckBackend, SubtractiveBackend};
pub use config::EngineConfig;
pub use properties::{MasterInfo, PropertiesRecord, SlideInfo};
pub use source::{BlobSource, DEFAULT_XPATH};
pub use template::{ExpressionRenderer, MapRenderer};
pub use thumbnail::ThumbnailFormat;
