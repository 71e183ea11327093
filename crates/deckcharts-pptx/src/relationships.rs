use std::collections::HashSet;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::xml::local_name;
use crate::PptxError;

pub const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn is_external(&self) -> bool {
        self.target_mode
            .as_deref()
            .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External"))
    }
}

/// The contents of one `_rels/*.rels` part, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn from_xml(xml: &[u8]) -> Result<Self, PptxError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut items = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) | Event::Empty(start)
                    if local_name(start.name().as_ref()).eq_ignore_ascii_case(b"Relationship") =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut type_uri = None;
                    let mut target_mode = None;
                    for attr in start.attributes() {
                        let attr = attr?;
                        let key = local_name(attr.key.as_ref());
                        let value = attr.unescape_value()?.into_owned();
                        if key.eq_ignore_ascii_case(b"Id") {
                            id = Some(value);
                        } else if key.eq_ignore_ascii_case(b"Target") {
                            target = Some(value);
                        } else if key.eq_ignore_ascii_case(b"Type") {
                            type_uri = Some(value);
                        } else if key.eq_ignore_ascii_case(b"TargetMode") {
                            target_mode = Some(value);
                        }
                    }
                    if let (Some(id), Some(target), Some(type_uri)) = (id, target, type_uri) {
                        items.push(Relationship {
                            id,
                            type_uri,
                            target,
                            target_mode,
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { items })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|rel| rel.id == id)
    }

    pub fn of_type<'a>(&'a self, type_uri: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.items.iter().filter(move |rel| rel.type_uri == type_uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The next unused `rIdN`, one past the highest numeric id present.
    pub fn next_r_id(&self) -> String {
        let taken: HashSet<&str> = self.items.iter().map(|rel| rel.id.as_str()).collect();
        let mut next = self
            .items
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        loop {
            let candidate = format!("rId{next}");
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            next = next.saturating_add(1);
        }
    }

    /// Append a relationship; fails if `id` is already taken.
    pub fn push(&mut self, rel: Relationship) -> Result<(), PptxError> {
        if self.get(&rel.id).is_some() {
            return Err(PptxError::Invalid(format!(
                "duplicate relationship id {}",
                rel.id
            )));
        }
        self.items.push(rel);
        Ok(())
    }

    /// Append an internal relationship under a freshly allocated id and return the id.
    pub fn add(&mut self, type_uri: &str, target: &str) -> String {
        let id = self.next_r_id();
        self.items.push(Relationship {
            id: id.clone(),
            type_uri: type_uri.to_string(),
            target: target.to_string(),
            target_mode: None,
        });
        id
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, PptxError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut root = BytesStart::new("Relationships");
        root.push_attribute(("xmlns", PACKAGE_RELS_NS));
        writer.write_event(Event::Start(root))?;
        for rel in &self.items {
            let mut el = BytesStart::new("Relationship");
            el.push_attribute(("Id", rel.id.as_str()));
            el.push_attribute(("Type", rel.type_uri.as_str()));
            el.push_attribute(("Target", rel.target.as_str()));
            if let Some(mode) = &rel.target_mode {
                el.push_attribute(("TargetMode", mode.as_str()));
            }
            writer.write_event(Event::Empty(el))?;
        }
        writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(writer.into_inner())
    }
}

impl<'a> IntoIterator for &'a Relationships {
    type Item = &'a Relationship;
    type IntoIter = std::slice::Iter<'a, Relationship>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SLIDE_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a&amp;b" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn parses_ids_targets_and_modes() {
        let rels = Relationships::from_xml(SLIDE_RELS).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels.get("rId3").unwrap().target, "../charts/chart1.xml");
        let link = rels.get("rId4").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target, "https://example.com/a&b");
        assert_eq!(
            rels.of_type("http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart")
                .count(),
            1
        );
    }

    #[test]
    fn next_r_id_is_one_past_the_max() {
        let rels = Relationships::from_xml(SLIDE_RELS).unwrap();
        assert_eq!(rels.next_r_id(), "rId5");
        assert_eq!(Relationships::default().next_r_id(), "rId1");
    }

    #[test]
    fn next_r_id_ignores_non_numeric_ids() {
        let mut rels = Relationships::default();
        rels.push(Relationship {
            id: "rIdImg".to_string(),
            type_uri: "t".to_string(),
            target: "a.png".to_string(),
            target_mode: None,
        })
        .unwrap();
        assert_eq!(rels.next_r_id(), "rId1");
        assert_eq!(rels.add("t", "b.png"), "rId1");
        assert_eq!(rels.add("t", "c.png"), "rId2");
    }

    #[test]
    fn push_rejects_duplicates() {
        let mut rels = Relationships::from_xml(SLIDE_RELS).unwrap();
        let dup = rels.get("rId1").unwrap().clone();
        assert!(rels.push(dup).is_err());
    }

    #[test]
    fn serializes_and_reparses() {
        let rels = Relationships::from_xml(SLIDE_RELS).unwrap();
        let xml = rels.to_xml().unwrap();
        let text = std::str::from_utf8(&xml).unwrap();
        assert!(text.contains("a&amp;b"));
        assert_eq!(Relationships::from_xml(&xml).unwrap(), rels);
    }
}
