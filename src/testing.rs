//! Synthetic decks for unit tests.
//!
//! [`DeckFixture::standard`] describes an 11-slide widescreen deck with one
//! hidden slide and two slide masters. [`DeckFixture::build`] writes any
//! fixture out as .pptx bytes with `zip::ZipWriter`, so tests never depend
//! on files on disk.

use crate::common::xml::escape_xml;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_DECL: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const CT_PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";

pub(crate) const WIDESCREEN: (i64, i64) = (12_192_000, 6_858_000);
pub(crate) const STANDARD_4_3: (i64, i64) = (9_144_000, 6_858_000);

#[derive(Debug, Clone)]
pub(crate) struct FixtureMaster {
    pub theme_name: String,
    pub name: String,
    pub layouts: Vec<String>,
    pub major_font: String,
    pub minor_font: String,
    pub accent1: String,
}

impl FixtureMaster {
    pub fn new(theme_name: &str, layouts: &[&str]) -> Self {
        Self {
            theme_name: theme_name.to_string(),
            name: String::new(),
            layouts: layouts.iter().map(|l| l.to_string()).collect(),
            major_font: "Calibri Light".to_string(),
            minor_font: "Calibri".to_string(),
            accent1: "4472C4".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FixtureSlide {
    pub title: Option<String>,
    pub master: usize,
    pub layout: usize,
    pub hidden: bool,
    /// Paragraphs of the body placeholder, each a list of run texts
    pub body: Vec<Vec<String>>,
    pub comments: usize,
    pub notes: Option<String>,
    pub image: bool,
    pub background: Option<String>,
    /// Position of a slide this one jumps to on click
    pub link_to: Option<usize>,
}

impl FixtureSlide {
    pub fn titled(title: &str, master: usize, layout: usize) -> Self {
        Self {
            title: Some(title.to_string()),
            master,
            layout,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, paragraphs: &[&[&str]]) -> Self {
        self.body = paragraphs
            .iter()
            .map(|runs| runs.iter().map(|r| r.to_string()).collect())
            .collect();
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DeckFixture {
    pub size: (i64, i64),
    pub masters: Vec<FixtureMaster>,
    pub slides: Vec<FixtureSlide>,
    pub embedded_fonts: Vec<String>,
    pub creator: String,
    pub company: String,
    pub presentation_format: String,
}

impl DeckFixture {
    /// The 11-slide reference deck.
    pub fn standard() -> Self {
        let masters = vec![
            FixtureMaster::new("Office Theme", &["Title Slide", "Title and Content", "Blank"]),
            FixtureMaster {
                name: "Nuxeo Master".to_string(),
                major_font: "Georgia".to_string(),
                minor_font: "Verdana".to_string(),
                accent1: "0066FF".to_string(),
                ..FixtureMaster::new("Nuxeo", &["Title Slide", "Two Content"])
            },
        ];

        let slides = vec![
            FixtureSlide::titled("Welcome", 0, 0).with_body(&[&["Nuxeo Unit Testing"]]),
            FixtureSlide {
                comments: 2,
                ..FixtureSlide::titled("Agenda", 0, 1).with_body(&[&["One"], &["Two"], &["Three"]])
            },
            FixtureSlide {
                notes: Some("Speaker notes".to_string()),
                ..FixtureSlide::titled("Overview", 0, 1)
            },
            FixtureSlide {
                image: true,
                ..FixtureSlide::titled("Picture", 0, 1)
            },
            FixtureSlide::titled("Template", 0, 1)
                .with_body(&[&["Hello ${doc", ".title}", " !"], &["No expression here"]]),
            FixtureSlide {
                background: Some("FFCC00".to_string()),
                ..FixtureSlide::titled("Details", 0, 1)
            },
            FixtureSlide {
                hidden: true,
                ..FixtureSlide::titled("Hidden", 0, 1)
            },
            FixtureSlide {
                master: 0,
                layout: 2,
                ..Default::default()
            },
            FixtureSlide::titled("Numbers", 0, 1).with_body(&[&["1"], &["2"]]),
            FixtureSlide::titled("Second Master", 1, 0),
            FixtureSlide {
                image: true,
                ..FixtureSlide::titled("Closing", 1, 1)
            },
        ];

        Self {
            size: WIDESCREEN,
            masters,
            slides,
            embedded_fonts: vec!["Lato".to_string()],
            creator: "Nuxeo Unit Testing".to_string(),
            company: "Nuxeo".to_string(),
            presentation_format: "Widescreen".to_string(),
        }
    }

    /// A small deck on a single master.
    pub fn simple(slides: Vec<FixtureSlide>) -> Self {
        Self {
            size: STANDARD_4_3,
            masters: vec![FixtureMaster::new(
                "Office Theme",
                &["Title Slide", "Title and Content", "Blank"],
            )],
            slides,
            embedded_fonts: Vec::new(),
            creator: "Fixture".to_string(),
            company: "Nuxeo".to_string(),
            presentation_format: "On-screen Show (4:3)".to_string(),
        }
    }

    /// Serialize the fixture as .pptx bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut overrides: Vec<(String, String)> = Vec::new();
        let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        // Layout numbering is global across masters
        let mut layout_numbers: Vec<Vec<usize>> = Vec::new();
        let mut next_layout = 1;
        for master in &self.masters {
            layout_numbers.push((0..master.layouts.len()).map(|i| next_layout + i).collect());
            next_layout += master.layouts.len();
        }
        let notes_theme = self.masters.len() + 1;

        // Package relationships and document properties
        put(
            &mut zip,
            "_rels/.rels",
            rels(&[
                ("rId1", "officeDocument", "ppt/presentation.xml"),
                ("rId2", CORE_PROPERTIES, "docProps/core.xml"),
                ("rId3", "extended-properties", "docProps/app.xml"),
            ])
            .as_bytes(),
        );
        put(&mut zip, "docProps/core.xml", self.core_xml().as_bytes());
        put(&mut zip, "docProps/app.xml", self.app_xml().as_bytes());
        overrides.push((
            "/docProps/core.xml".into(),
            "application/vnd.openxmlformats-package.core-properties+xml".into(),
        ));
        overrides.push((
            "/docProps/app.xml".into(),
            "application/vnd.openxmlformats-officedocument.extended-properties+xml".into(),
        ));

        // presentation.xml and its relationships
        let mut pres_rels: Vec<(String, String, String)> = Vec::new();
        let mut master_entries = String::new();
        let mut next_master_space_id: u64 = 2_147_483_648;
        let mut master_ids = Vec::new();
        for (i, master) in self.masters.iter().enumerate() {
            let r_id = format!("rId{}", pres_rels.len() + 1);
            pres_rels.push((r_id.clone(), "slideMaster".into(), format!("slideMasters/slideMaster{}.xml", i + 1)));
            master_entries.push_str(&format!(
                r#"<p:sldMasterId id="{}" r:id="{}"/>"#,
                next_master_space_id, r_id
            ));
            master_ids.push(next_master_space_id);
            next_master_space_id += 1 + master.layouts.len() as u64;
        }
        let notes_master_rid = format!("rId{}", pres_rels.len() + 1);
        pres_rels.push((notes_master_rid.clone(), "notesMaster".into(), "notesMasters/notesMaster1.xml".into()));
        let mut slide_entries = String::new();
        for i in 0..self.slides.len() {
            let r_id = format!("rId{}", pres_rels.len() + 1);
            pres_rels.push((r_id.clone(), "slide".into(), format!("slides/slide{}.xml", i + 1)));
            slide_entries.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, r_id));
        }
        let theme_rid = format!("rId{}", pres_rels.len() + 1);
        pres_rels.push((theme_rid, "theme".into(), "theme/theme1.xml".into()));
        let authors_rid = format!("rId{}", pres_rels.len() + 1);
        pres_rels.push((authors_rid, "commentAuthors".into(), "commentAuthors.xml".into()));
        let mut font_entries = String::new();
        for (i, font) in self.embedded_fonts.iter().enumerate() {
            let r_id = format!("rId{}", pres_rels.len() + 1);
            pres_rels.push((r_id.clone(), "font".into(), format!("fonts/font{}.fntdata", i + 1)));
            font_entries.push_str(&format!(
                r#"<p:embeddedFont><p:font typeface="{}" pitchFamily="34" charset="0"/><p:regular r:id="{}"/></p:embeddedFont>"#,
                escape_xml(font),
                r_id
            ));
            put(&mut zip, &format!("ppt/fonts/font{}.fntdata", i + 1), &[0u8; 32]);
        }
        let font_list = if font_entries.is_empty() {
            String::new()
        } else {
            format!("<p:embeddedFontLst>{}</p:embeddedFontLst>", font_entries)
        };
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {ns} saveSubsetFonts="1"><p:sldMasterIdLst>{masters}</p:sldMasterIdLst><p:notesMasterIdLst><p:notesMasterId r:id="{notes}"/></p:notesMasterIdLst><p:sldIdLst>{slides}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/>{fonts}<p:defaultTextStyle><a:lvl1pPr marL="0" algn="l"><a:defRPr sz="1800"/></a:lvl1pPr></p:defaultTextStyle></p:presentation>"#,
            ns = NS_DECL,
            masters = master_entries,
            notes = notes_master_rid,
            slides = slide_entries,
            cx = self.size.0,
            cy = self.size.1,
            fonts = font_list,
        );
        put(&mut zip, "ppt/presentation.xml", presentation.as_bytes());
        overrides.push(("/ppt/presentation.xml".into(), format!("{}.presentation.main+xml", CT_PML)));
        let pres_rel_refs: Vec<(&str, &str, &str)> = pres_rels
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        put(&mut zip, "ppt/_rels/presentation.xml.rels", rels(&pres_rel_refs).as_bytes());

        put(
            &mut zip,
            "ppt/commentAuthors.xml",
            format!(
                r#"<p:cmAuthorLst {}><p:cmAuthor id="0" name="Reviewer" initials="R" lastIdx="2" clrIdx="0"/></p:cmAuthorLst>"#,
                NS_DECL
            )
            .as_bytes(),
        );
        overrides.push(("/ppt/commentAuthors.xml".into(), format!("{}.commentAuthors+xml", CT_PML)));

        // Masters, layouts and themes
        for (m, master) in self.masters.iter().enumerate() {
            let mut master_rels = Vec::new();
            let mut layout_list = String::new();
            for (l, number) in layout_numbers[m].iter().enumerate() {
                let r_id = format!("rId{}", l + 1);
                master_rels.push((r_id.clone(), "slideLayout".to_string(), format!("../slideLayouts/slideLayout{}.xml", number)));
                layout_list.push_str(&format!(
                    r#"<p:sldLayoutId id="{}" r:id="{}"/>"#,
                    master_ids[m] + 1 + l as u64,
                    r_id
                ));

                let layout_name = &master.layouts[l];
                put(
                    &mut zip,
                    &format!("ppt/slideLayouts/slideLayout{}.xml", number),
                    layout_xml(layout_name).as_bytes(),
                );
                put(
                    &mut zip,
                    &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", number),
                    rels(&[("rId1", "slideMaster", &format!("../slideMasters/slideMaster{}.xml", m + 1))]).as_bytes(),
                );
                overrides.push((format!("/ppt/slideLayouts/slideLayout{}.xml", number), format!("{}.slideLayout+xml", CT_PML)));
            }
            master_rels.push((format!("rId{}", master_rels.len() + 1), "theme".to_string(), format!("../theme/theme{}.xml", m + 1)));

            put(
                &mut zip,
                &format!("ppt/slideMasters/slideMaster{}.xml", m + 1),
                master_xml(master, &layout_list).as_bytes(),
            );
            let refs: Vec<(&str, &str, &str)> = master_rels
                .iter()
                .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
                .collect();
            put(
                &mut zip,
                &format!("ppt/slideMasters/_rels/slideMaster{}.xml.rels", m + 1),
                rels(&refs).as_bytes(),
            );
            overrides.push((format!("/ppt/slideMasters/slideMaster{}.xml", m + 1), format!("{}.slideMaster+xml", CT_PML)));

            put(&mut zip, &format!("ppt/theme/theme{}.xml", m + 1), theme_xml(master).as_bytes());
            overrides.push((
                format!("/ppt/theme/theme{}.xml", m + 1),
                "application/vnd.openxmlformats-officedocument.theme+xml".into(),
            ));
        }

        // Notes master with its own theme
        put(
            &mut zip,
            "ppt/notesMasters/notesMaster1.xml",
            format!(
                r#"<p:notesMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#,
                NS_DECL,
                GROUP_PROPS
            )
            .as_bytes(),
        );
        put(
            &mut zip,
            "ppt/notesMasters/_rels/notesMaster1.xml.rels",
            rels(&[("rId1", "theme", &format!("../theme/theme{}.xml", notes_theme))]).as_bytes(),
        );
        overrides.push(("/ppt/notesMasters/notesMaster1.xml".into(), format!("{}.notesMaster+xml", CT_PML)));
        put(
            &mut zip,
            &format!("ppt/theme/theme{}.xml", notes_theme),
            theme_xml(&FixtureMaster::new("Notes Theme", &[])).as_bytes(),
        );
        overrides.push((
            format!("/ppt/theme/theme{}.xml", notes_theme),
            "application/vnd.openxmlformats-officedocument.theme+xml".into(),
        ));

        // Slides
        let mut comment_number = 0;
        let mut notes_number = 0;
        let mut image_written = false;
        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            let layout_number = layout_numbers[slide.master][slide.layout];
            let mut slide_rels = vec![(
                "rId1".to_string(),
                "slideLayout".to_string(),
                format!("../slideLayouts/slideLayout{}.xml", layout_number),
            )];

            if let Some(notes) = &slide.notes {
                notes_number += 1;
                slide_rels.push((
                    format!("rId{}", slide_rels.len() + 1),
                    "notesSlide".into(),
                    format!("../notesSlides/notesSlide{}.xml", notes_number),
                ));
                put(
                    &mut zip,
                    &format!("ppt/notesSlides/notesSlide{}.xml", notes_number),
                    format!(
                        r#"<p:notes {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:notes>"#,
                        NS_DECL,
                        GROUP_PROPS,
                        text_shape(2, "Notes Placeholder 2", Some(r#"<p:ph type="body" idx="1"/>"#), None, &[vec![notes.clone()]])
                    )
                    .as_bytes(),
                );
                put(
                    &mut zip,
                    &format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", notes_number),
                    rels(&[
                        ("rId1", "notesMaster", "../notesMasters/notesMaster1.xml"),
                        ("rId2", "slide", &format!("../slides/slide{}.xml", number)),
                    ])
                    .as_bytes(),
                );
                overrides.push((format!("/ppt/notesSlides/notesSlide{}.xml", notes_number), format!("{}.notesSlide+xml", CT_PML)));
            }

            if slide.comments > 0 {
                comment_number += 1;
                slide_rels.push((
                    format!("rId{}", slide_rels.len() + 1),
                    "comments".into(),
                    format!("../comments/comment{}.xml", comment_number),
                ));
                let comments: String = (0..slide.comments)
                    .map(|c| {
                        format!(
                            r#"<p:cm authorId="0" dt="2019-06-12T14:21:08.000" idx="{}"><p:pos x="10" y="10"/><p:text>Comment {}</p:text></p:cm>"#,
                            c + 1,
                            c + 1
                        )
                    })
                    .collect();
                put(
                    &mut zip,
                    &format!("ppt/comments/comment{}.xml", comment_number),
                    format!(r#"<p:cmLst {}>{}</p:cmLst>"#, NS_DECL, comments).as_bytes(),
                );
                overrides.push((format!("/ppt/comments/comment{}.xml", comment_number), format!("{}.comments+xml", CT_PML)));
            }

            let mut picture = String::new();
            if slide.image {
                let r_id = format!("rId{}", slide_rels.len() + 1);
                slide_rels.push((r_id.clone(), "image".into(), "../media/image1.png".into()));
                picture = format!(
                    r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="2540000" cy="2540000"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
                    r_id
                );
                if !image_written {
                    put(&mut zip, "ppt/media/image1.png", &sample_png());
                    image_written = true;
                }
            }

            if let Some(target) = slide.link_to {
                let r_id = format!("rId{}", slide_rels.len() + 1);
                slide_rels.push((r_id.clone(), "slide".into(), format!("slide{}.xml", target + 1)));
                picture.push_str(&format!(
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Jump"><a:hlinkClick r:id="{}" action="ppaction://hlinksldjump"/></p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
                    r_id
                ));
            }

            put(&mut zip, &format!("ppt/slides/slide{}.xml", number), slide_xml(slide, &picture).as_bytes());
            let refs: Vec<(&str, &str, &str)> = slide_rels
                .iter()
                .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
                .collect();
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                rels(&refs).as_bytes(),
            );
            overrides.push((format!("/ppt/slides/slide{}.xml", number), format!("{}.slide+xml", CT_PML)));
        }

        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="fntdata" ContentType="application/x-fontdata"/>"#,
        );
        for (partname, content_type) in &overrides {
            content_types.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                partname, content_type
            ));
        }
        content_types.push_str("</Types>");
        put(&mut zip, "[Content_Types].xml", content_types.as_bytes());

        zip.finish().unwrap().into_inner()
    }

    fn core_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Unit Test Deck</dc:title><dc:subject>Testing</dc:subject><dc:creator>{creator}</dc:creator><cp:keywords>nuxeo, pptx</cp:keywords><cp:lastModifiedBy>{creator}</cp:lastModifiedBy><cp:revision>7</cp:revision><dcterms:created xsi:type="dcterms:W3CDTF">2019-06-12T14:21:08Z</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">2019-06-14T09:03:51Z</dcterms:modified></cp:coreProperties>"#,
            creator = escape_xml(&self.creator)
        )
    }

    fn app_xml(&self) -> String {
        let hidden = self.slides.iter().filter(|s| s.hidden).count();
        let notes = self.slides.iter().filter(|s| s.notes.is_some()).count();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><TotalTime>42</TotalTime><Words>57</Words><Application>Microsoft Macintosh PowerPoint</Application><PresentationFormat>{format}</PresentationFormat><Paragraphs>23</Paragraphs><Slides>{slides}</Slides><Notes>{notes}</Notes><HiddenSlides>{hidden}</HiddenSlides><MMClips>0</MMClips><HeadingPairs><vt:vector size="2" baseType="variant"><vt:variant><vt:lpstr>Theme</vt:lpstr></vt:variant><vt:variant><vt:i4>2</vt:i4></vt:variant></vt:vector></HeadingPairs><Company>{company}</Company><AppVersion>16.0000</AppVersion></Properties>"#,
            format = escape_xml(&self.presentation_format),
            slides = self.slides.len(),
            notes = notes,
            hidden = hidden,
            company = escape_xml(&self.company),
        )
    }
}

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        REL_NS
    );
    for (r_id, kind, target) in entries {
        let reltype = if kind.starts_with("http") {
            kind.to_string()
        } else {
            format!("{}/{}", RT, kind)
        };
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            r_id, reltype, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn text_shape(
    id: usize,
    name: &str,
    placeholder: Option<&str>,
    xfrm: Option<&str>,
    paragraphs: &[Vec<String>],
) -> String {
    let body: String = if paragraphs.is_empty() {
        r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string()
    } else {
        paragraphs
            .iter()
            .map(|runs| {
                let runs: String = runs
                    .iter()
                    .map(|t| format!(r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#, escape_xml(t)))
                    .collect();
                format!(r#"<a:p>{}<a:endParaRPr lang="en-US" dirty="0"/></a:p>"#, runs)
            })
            .collect()
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr>{xfrm}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        id = id,
        name = escape_xml(name),
        ph = placeholder.unwrap_or(""),
        xfrm = xfrm.unwrap_or(""),
        body = body,
    )
}

fn master_xml(master: &FixtureMaster, layout_list: &str) -> String {
    let title = text_shape(
        2,
        "Title Placeholder 1",
        Some(r#"<p:ph type="title"/>"#),
        Some(r#"<a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#),
        &[],
    );
    let body = text_shape(
        3,
        "Text Placeholder 2",
        Some(r#"<p:ph type="body" idx="1"/>"#),
        Some(r#"<a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="10515600" cy="4351338"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#),
        &[],
    );
    let band = r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Footer Band"/><p:cNvSpPr/><p:nvPr userDrawn="1"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="6400800"/><a:ext cx="12192000" cy="457200"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:schemeClr val="accent1"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {ns}><p:cSld name="{name}"><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{group}{title}{body}{band}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{layouts}</p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="228600"><a:defRPr sz="2800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr><a:lvl2pPr marL="685800"><a:defRPr sz="2400"/></a:lvl2pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#,
        ns = NS_DECL,
        name = escape_xml(&master.name),
        group = GROUP_PROPS,
        title = title,
        body = body,
        band = band,
        layouts = layout_list,
    )
}

fn layout_xml(name: &str) -> String {
    let title = text_shape(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, &[]);
    let body = text_shape(3, "Content Placeholder 2", Some(r#"<p:ph idx="1"/>"#), None, &[]);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {ns} preserve="1"><p:cSld name="{name}"><p:spTree>{group}{title}{body}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        ns = NS_DECL,
        name = escape_xml(name),
        group = GROUP_PROPS,
        title = title,
        body = body,
    )
}

fn theme_xml(master: &FixtureMaster) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="{name}"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="{accent1}"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="{major}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{minor}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"/></a:themeElements></a:theme>"#,
        name = escape_xml(&master.theme_name),
        accent1 = master.accent1,
        major = escape_xml(&master.major_font),
        minor = escape_xml(&master.minor_font),
    )
}

fn slide_xml(slide: &FixtureSlide, picture: &str) -> String {
    let mut shapes = String::new();
    if let Some(title) = &slide.title {
        shapes.push_str(&text_shape(2, "Title 1", Some(r#"<p:ph type="title"/>"#), None, &[vec![title.clone()]]));
    }
    if !slide.body.is_empty() {
        shapes.push_str(&text_shape(3, "Content Placeholder 2", Some(r#"<p:ph idx="1"/>"#), None, &slide.body));
    }
    shapes.push_str(picture);
    let background = slide
        .background
        .as_ref()
        .map(|hex| {
            format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                hex
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {ns}{show}><p:cSld>{bg}<p:spTree>{group}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        ns = NS_DECL,
        show = if slide.hidden { r#" show="0""# } else { "" },
        bg = background,
        group = GROUP_PROPS,
        shapes = shapes,
    )
}

/// A 4x4 opaque red PNG.
pub(crate) fn sample_png() -> Vec<u8> {
    let mut pixmap = tiny_skia::Pixmap::new(4, 4).unwrap();
    pixmap.fill(tiny_skia::Color::from_rgba8(220, 20, 20, 255));
    pixmap.encode_png().unwrap()
}

/// A one-member stored zip whose member is empty but whose central directory
/// declares `declared` uncompressed bytes through a zip64 extra field.
pub(crate) fn zip_declaring_size(name: &str, declared: u64) -> Vec<u8> {
    let name = name.as_bytes();
    let mut zip = Vec::new();

    // Local file header, sizes 0
    zip.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    zip.extend_from_slice(&45u16.to_le_bytes());
    zip.extend_from_slice(&[0; 4]); // flags, stored
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip.extend_from_slice(&0x21u16.to_le_bytes()); // 1980-01-01
    zip.extend_from_slice(&[0; 12]); // crc, compressed, uncompressed
    zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip.extend_from_slice(name);

    let directory_start = zip.len() as u32;
    zip.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    zip.extend_from_slice(&45u16.to_le_bytes());
    zip.extend_from_slice(&45u16.to_le_bytes());
    zip.extend_from_slice(&[0; 4]);
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip.extend_from_slice(&0x21u16.to_le_bytes());
    zip.extend_from_slice(&[0; 8]); // crc, compressed
    zip.extend_from_slice(&u32::MAX.to_le_bytes()); // uncompressed size is in zip64
    zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
    zip.extend_from_slice(&12u16.to_le_bytes());
    zip.extend_from_slice(&[0; 10]); // comment, disk, attributes
    zip.extend_from_slice(&0u32.to_le_bytes()); // local header offset
    zip.extend_from_slice(name);
    zip.extend_from_slice(&1u16.to_le_bytes());
    zip.extend_from_slice(&8u16.to_le_bytes());
    zip.extend_from_slice(&declared.to_le_bytes());
    let directory_len = zip.len() as u32 - directory_start;

    zip.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    zip.extend_from_slice(&[0; 4]);
    zip.extend_from_slice(&1u16.to_le_bytes());
    zip.extend_from_slice(&1u16.to_le_bytes());
    zip.extend_from_slice(&directory_len.to_le_bytes());
    zip.extend_from_slice(&directory_start.to_le_bytes());
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip
}

/// `deck` with member `name` replaced by `data`.
pub(crate) fn with_member(deck: &[u8], name: &str, data: &[u8]) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(deck)).unwrap();
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let member = file.name().to_string();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut content).unwrap();
        out.start_file(member.as_str(), options).unwrap();
        out.write_all(if member == name { data } else { &content }).unwrap();
    }
    out.finish().unwrap().into_inner()
}

/// A deck that unzips but whose `presentation.xml` stops inside the slide list.
pub(crate) fn truncated_deck() -> Vec<u8> {
    let deck = standard_deck();
    let mut archive = zip::ZipArchive::new(Cursor::new(deck.as_slice())).unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("ppt/presentation.xml").unwrap(), &mut xml).unwrap();
    let cut = xml.find("<p:sldIdLst").unwrap() + "<p:sldIdLst".len();
    with_member(&deck, "ppt/presentation.xml", xml[..cut].as_bytes())
}

/// Bytes of the standard fixture deck.
pub(crate) fn standard_deck() -> Vec<u8> {
    DeckFixture::standard().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_is_a_zip() {
        let bytes = standard_deck();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"ppt/slides/slide11.xml"));
        assert!(names.contains(&"ppt/slideLayouts/slideLayout5.xml"));
        assert!(names.contains(&"ppt/media/image1.png"));
    }
}
