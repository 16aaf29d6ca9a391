//! Deck backends.
//!
//! Every operation is available through [`DeckBackend`]. Two implementations
//! exist:
//!
//! - [`SubtractiveBackend`] isolates slides by deleting the others from a copy
//!   of the source. It cannot merge decks or enumerate fonts.
//! - [`CloningBackend`] isolates slides by importing them into an empty deck
//!   and supports every operation.
//!
//! Absent input means absent output: list operations return an empty `Vec`
//! and single-artifact operations return `None`.
//!
//! # Example
//!
//! ```rust,no_run
//! use deckcraft::presentation::{Artifact, BackendKind, EngineConfig};
//!
//! let deck = Artifact::from_path("quarterly.pptx")?;
//! let backend = BackendKind::Cloning.backend(EngineConfig::default());
//!
//! for slide in backend.split(Some(&deck))? {
//!     slide.save(slide.file_name().unwrap_or("slide.pptx"))?;
//! }
//! # Ok::<(), deckcraft::common::Error>(())
//! ```

use rayon::prelude::*;

use crate::common::{Error, Result};
use crate::ooxml::pptx::Package;
use crate::presentation::artifact::{Artifact, deck_file_name, slide_base_name, slide_file_name};
use crate::presentation::config::{EngineConfig, current};
use crate::presentation::deck::open_deck;
use crate::presentation::isolate::{isolate_cloning, isolate_subtractive};
use crate::presentation::merge::merge_decks;
use crate::presentation::properties::{PropertiesRecord, extract_properties, theme_fonts};
use crate::presentation::source::{BlobSource, resolve};
use crate::presentation::template::{ExpressionRenderer, render_template, template_file_name};
use crate::presentation::thumbnail::{ThumbnailFormat, render_all_thumbnails, render_thumbnail};

/// The operations of the engine.
///
/// Implementors provide slide isolation, merging and font enumeration; the
/// remaining operations are shared.
pub trait DeckBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn config(&self) -> &EngineConfig;

    /// A deck holding only slide `index` of `deck`.
    fn isolate(&self, deck: &[u8], index: usize) -> Result<Package>;

    /// Concatenate `decks` into one deck named `file_name` (else the
    /// configured merge name).
    fn merge(
        &self,
        decks: Option<&[Artifact]>,
        reuse_masters: bool,
        file_name: Option<&str>,
    ) -> Result<Option<Artifact>>;

    /// Fonts used by the deck's themes.
    fn fonts(&self, deck: &[u8]) -> Result<Vec<String>>;

    /// Metadata record of a deck.
    fn properties(&self, deck: Option<&Artifact>) -> Result<Option<PropertiesRecord>> {
        let Some(deck) = deck else {
            return Ok(None);
        };
        let mut record = extract_properties(&deck.data)?;
        if record.fonts.is_empty() {
            match self.fonts(&deck.data) {
                Ok(fonts) => record.fonts = fonts,
                Err(Error::NotSupported(what)) => {
                    log::debug!("{} backend leaves Fonts empty: {}", self.name(), what)
                },
                Err(e) => return Err(e),
            }
        }
        Ok(Some(record))
    }

    /// One deck per slide, named `{base}-{n}.pptx`.
    fn split(&self, deck: Option<&Artifact>) -> Result<Vec<Artifact>> {
        let Some(deck) = deck else {
            return Ok(Vec::new());
        };
        let count = open_deck(&deck.data)?.slide_count()?;
        let base = slide_base_name(deck.file_name(), &self.config().slide_file_base);
        log::debug!("Splitting {} into {} decks with the {} backend", base, count, self.name());

        let one = |index: usize| -> Result<Artifact> {
            let package = self.isolate(&deck.data, index)?;
            Ok(Artifact::presentation(package.to_bytes()?, slide_file_name(&base, index)))
        };
        if self.config().parallel {
            (0..count).into_par_iter().map(one).collect()
        } else {
            (0..count).map(one).collect()
        }
    }

    /// Slide `index` as a deck of its own.
    fn get_slide(&self, deck: Option<&Artifact>, index: usize) -> Result<Option<Artifact>> {
        let Some(deck) = deck else {
            return Ok(None);
        };
        let package = self.isolate(&deck.data, index)?;
        let base = slide_base_name(deck.file_name(), &self.config().slide_file_base);
        Ok(Some(Artifact::presentation(
            package.to_bytes()?,
            slide_file_name(&base, index),
        )))
    }

    /// Image of slide `index`. The format is checked before the deck is read.
    fn thumbnail(
        &self,
        deck: Option<&Artifact>,
        index: usize,
        max_width: u32,
        format: Option<&str>,
    ) -> Result<Option<Artifact>> {
        let format = ThumbnailFormat::parse(format)?;
        let Some(deck) = deck else {
            return Ok(None);
        };
        render_thumbnail(&deck.data, index, max_width, format, self.config()).map(Some)
    }

    /// Images of all slides, or of the visible ones only.
    fn thumbnails(
        &self,
        deck: Option<&Artifact>,
        max_width: u32,
        format: Option<&str>,
        only_visible: bool,
    ) -> Result<Vec<Artifact>> {
        let format = ThumbnailFormat::parse(format)?;
        let Some(deck) = deck else {
            return Ok(Vec::new());
        };
        render_all_thumbnails(&deck.data, max_width, format, only_visible, self.config())
    }

    /// Substitute the expressions of a template deck.
    fn render_template(
        &self,
        template: Option<&Artifact>,
        bindings: &dyn ExpressionRenderer,
        file_name: Option<&str>,
    ) -> Result<Option<Artifact>> {
        let Some(template) = template else {
            return Ok(None);
        };
        let package = render_template(&template.data, bindings)?;
        let name = template_file_name(
            file_name,
            template.file_name(),
            &self.config().template_fallback_name,
        );
        Ok(Some(Artifact::presentation(package.to_bytes()?, name)))
    }

    fn properties_from_source(
        &self,
        source: &dyn BlobSource,
        xpath: Option<&str>,
    ) -> Result<Option<PropertiesRecord>> {
        self.properties(resolve(source, xpath).as_ref())
    }

    fn split_from_source(&self, source: &dyn BlobSource, xpath: Option<&str>) -> Result<Vec<Artifact>> {
        self.split(resolve(source, xpath).as_ref())
    }

    fn get_slide_from_source(
        &self,
        source: &dyn BlobSource,
        xpath: Option<&str>,
        index: usize,
    ) -> Result<Option<Artifact>> {
        self.get_slide(resolve(source, xpath).as_ref(), index)
    }

    fn thumbnail_from_source(
        &self,
        source: &dyn BlobSource,
        xpath: Option<&str>,
        index: usize,
        max_width: u32,
        format: Option<&str>,
    ) -> Result<Option<Artifact>> {
        self.thumbnail(resolve(source, xpath).as_ref(), index, max_width, format)
    }

    fn thumbnails_from_source(
        &self,
        source: &dyn BlobSource,
        xpath: Option<&str>,
        max_width: u32,
        format: Option<&str>,
        only_visible: bool,
    ) -> Result<Vec<Artifact>> {
        self.thumbnails(resolve(source, xpath).as_ref(), max_width, format, only_visible)
    }

    /// Merge the blobs of several sources, each read at `xpath`; sources
    /// without a blob are left out.
    fn merge_from_sources(
        &self,
        sources: &[&dyn BlobSource],
        xpath: Option<&str>,
        reuse_masters: bool,
        file_name: Option<&str>,
    ) -> Result<Option<Artifact>> {
        let decks: Vec<Artifact> = sources
            .iter()
            .filter_map(|source| resolve(*source, xpath))
            .collect();
        self.merge(Some(&decks), reuse_masters, file_name)
    }

    fn render_template_from_source(
        &self,
        source: &dyn BlobSource,
        xpath: Option<&str>,
        bindings: &dyn ExpressionRenderer,
        file_name: Option<&str>,
    ) -> Result<Option<Artifact>> {
        self.render_template(resolve(source, xpath).as_ref(), bindings, file_name)
    }
}

/// Isolates slides by deleting every other slide from a copy of the deck.
#[derive(Debug, Clone, Default)]
pub struct SubtractiveBackend {
    config: EngineConfig,
}

impl SubtractiveBackend {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl DeckBackend for SubtractiveBackend {
    fn name(&self) -> &'static str {
        "subtractive"
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn isolate(&self, deck: &[u8], index: usize) -> Result<Package> {
        isolate_subtractive(deck, index)
    }

    fn merge(&self, _decks: Option<&[Artifact]>, _reuse_masters: bool, _file_name: Option<&str>) -> Result<Option<Artifact>> {
        Err(Error::NotSupported("merge".to_string()))
    }

    fn fonts(&self, _deck: &[u8]) -> Result<Vec<String>> {
        Err(Error::NotSupported("font enumeration".to_string()))
    }
}

/// Isolates slides by importing them into an empty deck; supports merge.
#[derive(Debug, Clone, Default)]
pub struct CloningBackend {
    config: EngineConfig,
}

impl CloningBackend {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl DeckBackend for CloningBackend {
    fn name(&self) -> &'static str {
        "cloning"
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn isolate(&self, deck: &[u8], index: usize) -> Result<Package> {
        isolate_cloning(&open_deck(deck)?, index)
    }

    fn merge(
        &self,
        decks: Option<&[Artifact]>,
        reuse_masters: bool,
        file_name: Option<&str>,
    ) -> Result<Option<Artifact>> {
        let Some(decks) = decks.filter(|decks| !decks.is_empty()) else {
            return Ok(None);
        };
        let Some(package) = merge_decks(decks, reuse_masters)? else {
            return Ok(None);
        };
        let name = deck_file_name(file_name, &self.config.merged_file_name);
        Ok(Some(Artifact::presentation(package.to_bytes()?, name)))
    }

    fn fonts(&self, deck: &[u8]) -> Result<Vec<String>> {
        theme_fonts(&open_deck(deck)?.presentation()?)
    }
}

/// Which backend an operation runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    Subtractive,
    #[default]
    Cloning,
}

impl BackendKind {
    pub fn backend(self, config: EngineConfig) -> Box<dyn DeckBackend> {
        match self {
            BackendKind::Subtractive => Box::new(SubtractiveBackend::new(config)),
            BackendKind::Cloning => Box::new(CloningBackend::new(config)),
        }
    }

    /// Backend on the process-wide configuration, see [`config::install`].
    ///
    /// [`config::install`]: crate::presentation::config::install
    pub fn installed(self) -> Box<dyn DeckBackend> {
        self.backend(current())
    }

    /// Whether the backend can merge decks.
    pub fn supports_merge(self) -> bool {
        matches!(self, BackendKind::Cloning)
    }
}
