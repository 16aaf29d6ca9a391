//! Opening deck bytes.

use crate::common::{Error, Result};
use crate::ooxml::pptx::Package;

/// Open a deck and check that its slide list resolves.
///
/// Any failure up to that point is an [`Error::DeckOpen`]: bytes that are not
/// a ZIP archive, a package without a presentation part, a `presentation.xml`
/// that does not parse, or a slide list entry without a slide part.
pub fn open_deck(bytes: &[u8]) -> Result<Package> {
    let package = Package::from_bytes(bytes).map_err(Error::open_failure)?;
    package
        .presentation()
        .and_then(|pres| pres.slides())
        .map_err(Error::open_failure)?;
    Ok(package)
}
