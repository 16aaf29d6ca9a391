//! Relationships of a part (or of the package) to other parts and to URLs.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One `<Relationship>`: an rId naming a target of some type.
#[derive(Debug, Clone)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    /// Relative part reference, or a URL when external
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute name of the target part. Fails for external targets.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} points outside the package",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// `N` of `rIdN`.
#[inline]
fn r_id_number(r_id: &str) -> Option<u32> {
    r_id.strip_prefix("rId")
        .and_then(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
}

/// `rId2` sorts before `rId10`; ids of other shapes sort as text after them.
fn by_r_id(a: &Relationship, b: &Relationship) -> Ordering {
    match (r_id_number(&a.r_id), r_id_number(&b.r_id)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.r_id.cmp(&b.r_id),
    }
}

/// The relationships of one source, keyed by rId.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Directory relative targets resolve against
    base_uri: String,
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Insert a relationship, replacing any with the same rId.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.insert(r_id.clone(), rel);
        &self.rels[&r_id]
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// The internal relationship of `reltype` to `target_ref`, added under
    /// the lowest free rId when there is none yet.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        let existing = self
            .rels
            .values()
            .find(|rel| !rel.is_external && rel.reltype == reltype && rel.target_ref == target_ref)
            .map(|rel| rel.r_id.clone());
        let r_id = match existing {
            Some(r_id) => r_id,
            None => {
                let r_id = self.next_r_id();
                self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), false);
                r_id
            },
        };
        &self.rels[&r_id]
    }

    /// Lowest `rIdN` not in use, so gaps left by removals are refilled.
    pub fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self.rels.keys().filter_map(|r_id| r_id_number(r_id)).collect();
        used.sort_unstable();
        let mut next = 1u32;
        for n in used {
            if n == next {
                next += 1;
            } else if n > next {
                break;
            }
        }
        format!("rId{}", next)
    }

    /// The only relationship of `reltype`.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        match self.of_type(reltype).as_slice() {
            [] => Err(OpcError::RelationshipNotFound(format!("no relationship of type '{}'", reltype))),
            [rel] => Ok(rel),
            _ => Err(OpcError::InvalidRelationship(format!(
                "more than one relationship of type '{}'",
                reltype
            ))),
        }
    }

    /// Relationships of `reltype` in rId order.
    pub fn of_type(&self, reltype: &str) -> Vec<&Relationship> {
        let mut matching: Vec<&Relationship> =
            self.rels.values().filter(|rel| rel.reltype == reltype).collect();
        matching.sort_by(|a, b| by_r_id(a, b));
        matching
    }

    /// Unordered.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    pub fn sorted(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| by_r_id(a, b));
        rels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }

    pub fn retain<F: FnMut(&Relationship) -> bool>(&mut self, mut keep: F) {
        self.rels.retain(|_, rel| keep(rel));
    }

    /// The `.rels` member, relationships in rId order.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for rel in self.sorted() {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
                if rel.is_external { r#" TargetMode="External""# } else { "" },
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}
