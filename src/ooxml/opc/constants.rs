//! Content types, namespaces and relationship types found in decks.

macro_rules! pml {
    ($name:literal) => {
        concat!("application/vnd.openxmlformats-officedocument.presentationml.", $name, "+xml")
    };
}

macro_rules! office_rel {
    ($name:literal) => {
        concat!("http://schemas.openxmlformats.org/officeDocument/2006/relationships/", $name)
    };
}

pub mod content_type {
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const JPEG: &str = "image/jpeg";
    pub const PNG: &str = "image/png";
    pub const TIFF: &str = "image/tiff";
    pub const X_EMF: &str = "image/x-emf";
    pub const X_WMF: &str = "image/x-wmf";
    pub const SVG: &str = "image/svg+xml";

    pub const OFC_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const OFC_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const OFC_OBFUSCATED_FONT: &str = "application/vnd.openxmlformats-officedocument.obfuscatedFont";

    pub const OPC_CORE_PROPERTIES: &str =
        "application/vnd.openxmlformats-package.core-properties+xml";
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    /// Main part of a .pptx; the three below are the other accepted main parts
    pub const PML_PRESENTATION_MAIN: &str = pml!("presentation.main");
    pub const PML_PRES_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const PML_TEMPLATE_MAIN: &str = pml!("template.main");
    pub const PML_SLIDESHOW_MAIN: &str = pml!("slideshow.main");

    pub const PML_SLIDE: &str = pml!("slide");
    pub const PML_SLIDE_MASTER: &str = pml!("slideMaster");
    pub const PML_NOTES_SLIDE: &str = pml!("notesSlide");
    pub const PML_NOTES_MASTER: &str = pml!("notesMaster");
    pub const PML_COMMENTS: &str = pml!("comments");
    pub const PML_COMMENT_AUTHORS: &str = pml!("commentAuthors");
    pub const PML_PRES_PROPS: &str = pml!("presProps");

    pub const XML: &str = "application/xml";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    /// `<Default>` content type of an extension, or `None` when parts with
    /// that extension get an `<Override>`.
    pub fn for_extension(ext: &str) -> Option<&'static str> {
        let ct = match ext.to_ascii_lowercase().as_str() {
            "png" => PNG,
            "jpg" | "jpeg" | "jpe" => JPEG,
            "gif" => GIF,
            "bmp" => BMP,
            "tif" | "tiff" => TIFF,
            "emf" => X_EMF,
            "wmf" => X_WMF,
            "svg" => SVG,
            "fntdata" => OFC_OBFUSCATED_FONT,
            "rels" => OPC_RELATIONSHIPS,
            "xml" => XML,
            _ => return None,
        };
        Some(ct)
    }
}

pub mod namespace {
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const OPC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
}

pub mod target_mode {
    pub const EXTERNAL: &str = "External";
}

pub mod relationship_type {
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str = office_rel!("extended-properties");
    pub const OFFICE_DOCUMENT: &str = office_rel!("officeDocument");

    pub const SLIDE: &str = office_rel!("slide");
    pub const SLIDE_LAYOUT: &str = office_rel!("slideLayout");
    pub const SLIDE_MASTER: &str = office_rel!("slideMaster");
    pub const NOTES_MASTER: &str = office_rel!("notesMaster");
    pub const COMMENTS: &str = office_rel!("comments");
    pub const COMMENT_AUTHORS: &str = office_rel!("commentAuthors");
    pub const PRES_PROPS: &str = office_rel!("presProps");
    pub const THEME: &str = office_rel!("theme");
    pub const IMAGE: &str = office_rel!("image");
    pub const HYPERLINK: &str = office_rel!("hyperlink");
}
