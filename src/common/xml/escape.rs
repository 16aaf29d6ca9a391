use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use deckcraft::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<t>\"x\"</t>"), "&lt;t&gt;&quot;x&quot;&lt;/t&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape XML text, including numeric character references.
///
/// The five predefined entities are replaced in one pass; `&#NN;` and
/// `&#xHH;` are then decoded. Unknown or malformed references are left
/// unchanged.
///
/// # Examples
///
/// ```
/// use deckcraft::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("caf&#233; &#x41;"), "café A");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// ```
pub fn unescape_xml(s: &str) -> String {
    let named = if memchr::memchr(b'&', s.as_bytes()).is_some() {
        XML_UNESCAPER.replace_all(s, &["\u{0}amp;", "<", ">", "\"", "'"])
    } else {
        return s.to_string();
    };

    if !named.contains("&#") {
        return named.replace("\u{0}amp;", "&");
    }

    let mut out = String::with_capacity(named.len());
    let mut rest = named.as_str();
    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tail.find(';').and_then(|end| decode_char_ref(&tail[2..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            },
            None => {
                out.push_str("&#");
                rest = &tail[2..];
            },
        }
    }
    out.push_str(rest);
    // `&amp;` was parked on a NUL marker so that "&amp;#65;" stays literal
    out.replace("\u{0}amp;", "&")
}

/// Decode the body of a numeric character reference (`65` or `x41`).
pub(crate) fn decode_char_ref(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
