//! Office Open XML presentation packages.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): ZIP container, parts and relationships
//! 2. **Metadata** (`metadata`): core and extended document properties
//! 3. **PresentationML** (`pptx`): slides, layouts, masters, themes and the
//!    edits the engine performs on them
//!
//! ```rust,no_run
//! use deckcraft::ooxml::pptx::Package;
//!
//! let pkg = Package::open("deck.pptx")?;
//! println!("{} slides", pkg.slide_count()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod metadata;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

pub use metadata::{CoreProperties, ExtendedProperties};

// Re-export error types
pub use error::{OoxmlError, Result};
