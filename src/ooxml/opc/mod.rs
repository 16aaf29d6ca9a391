//! The package layer every deck sits on.
//!
//! A package is a ZIP of parts linked by relationships. [`OpcPackage`] holds
//! the parts in memory and offers the edits deck operations need: adding and
//! dropping parts, fresh part names, and pruning parts no relationship reaches
//! any more.
//!
//! - `phys_pkg`: ZIP members in and out
//! - `pkgreader` / `pkgwriter`: members to parts and back, with `[Content_Types].xml`
//! - `rel`, `packuri`, `part`: the in-memory model
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, PartFactory, XmlPart};
pub use rel::{Relationship, Relationships};
