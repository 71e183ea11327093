//! Part and relationship graph operations on a [`PptxPackage`].

use crate::content_types::{self, CONTENT_TYPES_PART};
use crate::path::{rels_for_part, relative_target, resolve_target};
use crate::relationships::{Relationship, Relationships};
use crate::{PptxError, PptxPackage};

/// Placeholder replaced by the part number in [`PptxPackage::next_part_name`] templates.
pub const PART_NUMBER_PLACEHOLDER: &str = "{N}";

impl PptxPackage {
    /// The relationships owned by `part`; empty when it has no `.rels` part.
    pub fn relationships(&self, part: &str) -> Result<Relationships, PptxError> {
        match self.part(&rels_for_part(part)) {
            Some(bytes) => Relationships::from_xml(bytes),
            None => Ok(Relationships::default()),
        }
    }

    pub fn relationships_of_type(
        &self,
        part: &str,
        type_uri: &str,
    ) -> Result<Vec<Relationship>, PptxError> {
        Ok(self
            .relationships(part)?
            .of_type(type_uri)
            .cloned()
            .collect())
    }

    pub fn set_relationships(
        &mut self,
        part: &str,
        relationships: &Relationships,
    ) -> Result<(), PptxError> {
        let xml = relationships.to_xml()?;
        self.set_part(rels_for_part(part), xml);
        Ok(())
    }

    /// Resolve `rel_id` of `source_part` to a part name.
    ///
    /// External relationships and unknown ids resolve to `None`.
    pub fn resolve_relationship(
        &self,
        source_part: &str,
        rel_id: &str,
    ) -> Result<Option<String>, PptxError> {
        let relationships = self.relationships(source_part)?;
        let Some(rel) = relationships.get(rel_id) else {
            return Ok(None);
        };
        if rel.is_external() {
            return Ok(None);
        }
        let target = resolve_target(source_part, &rel.target);
        if target.is_empty() {
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// First free part name produced by substituting `N = 1, 2, ...` into `template`
    /// (e.g. `ppt/charts/chart{N}.xml`).
    pub fn next_part_name(&self, template: &str) -> Result<String, PptxError> {
        first_free_part_name(template, |name| self.has_part_ignore_case(name))
    }

    pub(crate) fn has_part_ignore_case(&self, name: &str) -> bool {
        self.part_names()
            .any(|existing| existing.eq_ignore_ascii_case(name))
    }

    /// Store `payload` under the next free name for `template` and register its content type.
    pub fn create_part(
        &mut self,
        template: &str,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<String, PptxError> {
        let name = self.next_part_name(template)?;
        let content_types =
            content_types::with_override(self.part(CONTENT_TYPES_PART), &name, content_type)?;
        self.set_part(CONTENT_TYPES_PART, content_types);
        self.set_part(name.clone(), payload);
        log::debug!("created part {name} ({content_type})");
        Ok(name)
    }

    /// Add an internal relationship from `source_part` to `target_part` and return its id.
    pub fn add_relationship(
        &mut self,
        source_part: &str,
        target_part: &str,
        type_uri: &str,
    ) -> Result<String, PptxError> {
        let mut relationships = self.relationships(source_part)?;
        let id = relationships.add(type_uri, &relative_target(source_part, target_part));
        self.set_relationships(source_part, &relationships)?;
        Ok(id)
    }
}

pub(crate) fn first_free_part_name(
    template: &str,
    taken: impl Fn(&str) -> bool,
) -> Result<String, PptxError> {
    if !template.contains(PART_NUMBER_PLACEHOLDER) {
        return Err(PptxError::Invalid(format!(
            "part name template {template:?} has no {PART_NUMBER_PLACEHOLDER} placeholder"
        )));
    }
    (1u32..)
        .map(|n| template.replace(PART_NUMBER_PLACEHOLDER, &n.to_string()))
        .find(|name| !taken(name))
        .ok_or_else(|| PptxError::Invalid(format!("no free part name for {template}")))
}
