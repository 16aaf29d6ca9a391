//! PowerPoint (.pptx) decks.
//!
//! - [`Package`]: an open deck, with slide removal and serialization
//! - [`Presentation`]: read access to sizes, slides, masters and properties
//! - [`Slide`], [`SlideLayout`], [`SlideMaster`]: the slide → layout → master → theme chain
//! - [`DeckSkeleton`]: empty decks to import slides into
//! - [`SlideImporter`]: deep copy of slides between decks
//! - [`text`]: `${...}` expressions in slide text
//!
//! ```rust,no_run
//! use deckcraft::ooxml::pptx::Package;
//!
//! let pkg = Package::open("presentation.pptx")?;
//! let pres = pkg.presentation()?;
//!
//! for slide in pres.slides()? {
//!     println!("Slide {}: {:?}", slide.number(), slide.title()?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod importer;
pub mod package;
pub mod parts;
pub mod presentation;
pub mod shapes;
pub mod skeleton;
pub mod slide;
pub mod text;

pub use importer::SlideImporter;
pub use package::Package;
pub use presentation::Presentation;
pub use skeleton::DeckSkeleton;
pub use slide::{MasterTextStyles, Slide, SlideLayout, SlideMaster, SlideSignature};
