//! Part names.

use std::fmt;

/// The package pseudo-partname, source of the package relationships
pub const PACKAGE_URI: &str = "/";

pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// Absolute name of a part inside a package, such as `/ppt/slides/slide3.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("part name must begin with '/', got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target written relative to `base_uri`.
    ///
    /// Package-absolute targets are accepted as written; `.` and `..`
    /// segments are folded, and `..` never climbs above the root.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = match relative_ref.strip_prefix('/') {
            Some(_) => relative_ref.to_string(),
            None => format!("{}/{}", base_uri.trim_end_matches('/'), relative_ref),
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                other => segments.push(other),
            }
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// Directory of the part: `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    pub fn filename(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or_default()
    }

    /// Extension without the dot.
    pub fn ext(&self) -> &str {
        self.filename().rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default()
    }

    /// Name pattern for copies of this part: trailing digits of the stem
    /// become `%d`, so `/ppt/media/logo.png` gives `/ppt/media/logo%d.png`.
    pub fn numbered_template(&self) -> String {
        let filename = self.filename();
        let (stem, ext) = match filename.rfind('.') {
            Some(pos) => filename.split_at(pos),
            None => (filename, ""),
        };
        let stem = stem.trim_end_matches(|c: char| c.is_ascii_digit());
        format!("{}/{}%d{}", self.base_uri().trim_end_matches('/'), stem, ext)
    }

    /// ZIP member name: the part name without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Target reference of this part as written in a `.rels` under `base_uri`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

        let mut segments = vec![".."; from.len() - common];
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }

    /// The `.rels` member holding this part's relationships.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        Self::new(format!(
            "{}/_rels/{}.rels",
            self.base_uri().trim_end_matches('/'),
            self.filename()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for PackURI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}
