//! Boundary to the document repository that holds input decks.

use crate::presentation::artifact::Artifact;

/// Field path of a document's main file.
pub const DEFAULT_XPATH: &str = "file:content";

/// Something that stores blobs under field paths, such as a repository document.
pub trait BlobSource {
    /// The blob stored at `xpath`, if any.
    fn blob(&self, xpath: &str) -> Option<Artifact>;
}

impl<F> BlobSource for F
where
    F: Fn(&str) -> Option<Artifact>,
{
    fn blob(&self, xpath: &str) -> Option<Artifact> {
        self(xpath)
    }
}

/// `xpath`, or [`DEFAULT_XPATH`] when absent or blank.
pub fn effective_xpath(xpath: Option<&str>) -> &str {
    match xpath.map(str::trim) {
        Some(path) if !path.is_empty() => path,
        _ => DEFAULT_XPATH,
    }
}

/// Resolve a blob, defaulting the field path.
pub fn resolve<S: BlobSource + ?Sized>(source: &S, xpath: Option<&str>) -> Option<Artifact> {
    let xpath = effective_xpath(xpath);
    let blob = source.blob(xpath);
    if blob.is_none() {
        log::debug!("No blob at {}", xpath);
    }
    blob
}
