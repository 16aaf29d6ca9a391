//! Blobs going in and out of the engine, and the file-name rules for them.

use crate::common::Result;
use std::path::Path;

/// MIME type of a `.pptx` deck.
pub const PRESENTATION_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Other PresentationML package types the engine opens as decks.
const PRESENTATION_FAMILY_MIMES: [&str; 4] = [
    PRESENTATION_MIME,
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
    "application/vnd.openxmlformats-officedocument.presentationml.template",
    "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
];

const PPTX_EXTENSION: &str = ".pptx";

/// Whether `mime` names an OOXML presentation package.
pub fn is_presentation_mime(mime: &str) -> bool {
    let mime = mime.trim();
    PRESENTATION_FAMILY_MIMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(mime))
}

/// A named blob: an input deck or a produced deck or image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(data: Vec<u8>, file_name: Option<String>, mime_type: impl Into<String>) -> Self {
        Self {
            file_name,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// A `.pptx` deck.
    pub fn presentation(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self::new(data, Some(file_name.into()), PRESENTATION_MIME)
    }

    /// Read a file, taking the name from the path and the MIME type from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let mime = file_name
            .as_deref()
            .map(mime_for_file_name)
            .unwrap_or(OCTET_STREAM_MIME);
        Ok(Self::new(data, file_name, mime))
    }

    /// Write the data to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn mime_for_file_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    match lower.rsplit_once('.').map(|(_, ext)| ext) {
        Some("pptx") => PRESENTATION_MIME,
        Some("ppsx") => PRESENTATION_FAMILY_MIMES[1],
        Some("potx") => PRESENTATION_FAMILY_MIMES[2],
        Some("pptm") => PRESENTATION_FAMILY_MIMES[3],
        Some("png") => PNG_MIME,
        Some("jpg") | Some("jpeg") => JPEG_MIME,
        _ => OCTET_STREAM_MIME,
    }
}

/// File name without directories and without its last extension.
fn stem(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Prefix of per-slide file names: the stem of `file_name` (or `fallback`)
/// ending in `-`.
pub fn slide_base_name(file_name: Option<&str>, fallback: &str) -> String {
    let base = match file_name.map(stem).filter(|s| !s.trim().is_empty()) {
        Some(stem) => stem,
        None => fallback,
    };
    if base.ends_with('-') {
        base.to_string()
    } else {
        format!("{}-", base)
    }
}

/// `{base}{index + 1}.pptx`.
pub fn slide_file_name(base: &str, index: usize) -> String {
    format!("{}{}{}", base, index + 1, PPTX_EXTENSION)
}

/// Append `.pptx` unless the name already ends with it in any case.
pub fn with_pptx_extension(name: &str) -> String {
    if name.to_ascii_lowercase().ends_with(PPTX_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, PPTX_EXTENSION)
    }
}

/// `name` when it is not blank, else `fallback`, with the `.pptx` rule applied.
pub fn deck_file_name(name: Option<&str>, fallback: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => with_pptx_extension(name),
        None => with_pptx_extension(fallback),
    }
}
