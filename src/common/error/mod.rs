//! Unified error types for deckcraft.
//!
//! This module provides the public error taxonomy of the presentation engine.
//! Package and format errors from the `ooxml` layer convert into it.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
