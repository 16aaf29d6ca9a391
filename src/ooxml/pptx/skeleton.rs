//! Empty presentation skeletons.
//!
//! A skeleton is a deck with no slides and no masters: `presentation.xml`
//! carrying the page and notes sizes, presentation properties, and document
//! properties. Slides arrive later through the importer, which registers
//! masters and slides in the id lists it creates on demand.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::metadata::{CoreProperties, ExtendedProperties};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcPackage, PackURI, Part, PartFactory, XmlPart};
use crate::ooxml::pptx::Package;

/// Default page: 10" x 7.5" (4:3).
pub const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);
/// Default notes page: 7.5" x 10".
pub const DEFAULT_NOTES_SIZE: (i64, i64) = (6_858_000, 9_144_000);

const PRESENTATION_PARTNAME: &str = "/ppt/presentation.xml";
const PRES_PROPS_PARTNAME: &str = "/ppt/presProps.xml";
const CORE_PARTNAME: &str = "/docProps/core.xml";
const APP_PARTNAME: &str = "/docProps/app.xml";

/// Builder for an empty deck.
#[derive(Debug, Clone)]
pub struct DeckSkeleton {
    slide_size: (i64, i64),
    notes_size: (i64, i64),
    core: Option<Vec<u8>>,
    extended: Option<Vec<u8>>,
}

impl Default for DeckSkeleton {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDE_SIZE)
    }
}

impl DeckSkeleton {
    pub fn new(slide_size: (i64, i64)) -> Self {
        Self {
            slide_size,
            notes_size: DEFAULT_NOTES_SIZE,
            core: None,
            extended: None,
        }
    }

    pub fn with_notes_size(mut self, notes_size: (i64, i64)) -> Self {
        self.notes_size = notes_size;
        self
    }

    /// Carry over the document properties parts of `source` verbatim.
    pub fn with_properties_of(mut self, source: &OpcPackage) -> Self {
        self.core = source
            .part_by_reltype(rt::CORE_PROPERTIES)
            .ok()
            .map(|part| part.blob().to_vec());
        self.extended = source
            .part_by_reltype(rt::EXTENDED_PROPERTIES)
            .ok()
            .map(|part| part.blob().to_vec());
        self
    }

    pub fn build(&self) -> Result<Package> {
        let mut opc = OpcPackage::new();

        let pres_name = partname(PRESENTATION_PARTNAME)?;
        let mut presentation = XmlPart::new(
            pres_name.clone(),
            ct::PML_PRESENTATION_MAIN.to_string(),
            self.presentation_xml().into_bytes(),
        );
        let props_name = partname(PRES_PROPS_PARTNAME)?;
        presentation.relate_to(&props_name.relative_ref(pres_name.base_uri()), rt::PRES_PROPS);
        opc.add_part(Box::new(presentation));
        opc.add_part(Box::new(XmlPart::new(
            props_name,
            ct::PML_PRES_PROPS.to_string(),
            PRES_PROPS_XML.as_bytes().to_vec(),
        )));
        opc.relate_to(pres_name.membername(), rt::OFFICE_DOCUMENT);

        let core = match &self.core {
            Some(blob) => blob.clone(),
            None => CoreProperties::default().to_xml().into_bytes(),
        };
        add_properties_part(&mut opc, CORE_PARTNAME, ct::OPC_CORE_PROPERTIES, core, rt::CORE_PROPERTIES)?;
        let extended = match &self.extended {
            Some(blob) => blob.clone(),
            None => ExtendedProperties::default().to_xml().into_bytes(),
        };
        add_properties_part(
            &mut opc,
            APP_PARTNAME,
            ct::OFC_EXTENDED_PROPERTIES,
            extended,
            rt::EXTENDED_PROPERTIES,
        )?;

        Package::from_opc(opc)
    }

    fn presentation_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1"><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/><p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr><a:lvl1pPr marL="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:defaultTextStyle></p:presentation>"#,
            self.slide_size.0, self.slide_size.1, self.notes_size.0, self.notes_size.1
        )
    }
}

const PRES_PROPS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;

fn partname(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(OoxmlError::InvalidFormat)
}

fn add_properties_part(
    opc: &mut OpcPackage,
    uri: &str,
    content_type: &str,
    blob: Vec<u8>,
    reltype: &str,
) -> Result<()> {
    let name = partname(uri)?;
    opc.relate_to(name.membername(), reltype);
    opc.add_part(PartFactory::load(name, content_type.to_string(), blob)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::standard_deck;

    #[test]
    fn test_empty_skeleton() {
        let pkg = DeckSkeleton::new((12_192_000, 6_858_000)).build().unwrap();
        let pres = pkg.presentation().unwrap();
        assert_eq!(pres.slide_count().unwrap(), 0);
        assert!(pres.masters().unwrap().is_empty());
        assert_eq!(pres.slide_size_points().unwrap(), Some((960, 540)));
        assert_eq!(pres.notes_size().unwrap(), Some(DEFAULT_NOTES_SIZE));
    }

    #[test]
    fn test_skeleton_round_trips_through_zip() {
        let pkg = DeckSkeleton::default().build().unwrap();
        let reopened = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.slide_count().unwrap(), 0);
    }

    #[test]
    fn test_properties_carried_over() {
        let source = Package::from_bytes(&standard_deck()).unwrap();
        let pkg = DeckSkeleton::new((12_192_000, 6_858_000))
            .with_properties_of(source.opc())
            .build()
            .unwrap();
        let pres = pkg.presentation().unwrap();
        assert_eq!(
            pres.core_properties().unwrap().creator.as_deref(),
            Some("Nuxeo Unit Testing")
        );
        assert_eq!(pres.extended_properties().unwrap().company.as_deref(), Some("Nuxeo"));
    }
}
