//! `[Content_Types].xml` edits.
//!
//! Edits stream the existing document through quick-xml so unrelated entries (and their
//! formatting) are preserved byte-for-byte.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::xml::local_name;
use crate::PptxError;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const MINIMAL_CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    "</Types>"
);

enum Entry<'a> {
    Override { part_name: String, content_type: &'a str },
    Default { extension: String, content_type: &'a str },
}

impl Entry<'_> {
    fn tag(&self) -> &'static str {
        match self {
            Entry::Override { .. } => "Override",
            Entry::Default { .. } => "Default",
        }
    }

    fn key_attr(&self) -> &'static [u8] {
        match self {
            Entry::Override { .. } => b"PartName",
            Entry::Default { .. } => b"Extension",
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Entry::Override { part_name, .. } => value.trim().eq_ignore_ascii_case(part_name),
            Entry::Default { extension, .. } => value.trim().eq_ignore_ascii_case(extension),
        }
    }

    fn content_type(&self) -> &str {
        match self {
            Entry::Override { content_type, .. } | Entry::Default { content_type, .. } => {
                content_type
            }
        }
    }

    fn element(&self, tag_name: &str) -> BytesStart<'static> {
        let mut el = BytesStart::new(tag_name.to_string());
        match self {
            Entry::Override { part_name, .. } => el.push_attribute(("PartName", part_name.as_str())),
            Entry::Default { extension, .. } => el.push_attribute(("Extension", extension.as_str())),
        }
        el.push_attribute(("ContentType", self.content_type()));
        el
    }
}

/// Add (or retarget) an `<Override>` for `part` and return the updated document.
///
/// A missing document is replaced by a minimal one.
pub fn with_override(
    existing: Option<&[u8]>,
    part: &str,
    content_type: &str,
) -> Result<Vec<u8>, PptxError> {
    let part_name = format!("/{}", part.trim_start_matches('/'));
    upsert(
        existing,
        Entry::Override {
            part_name,
            content_type,
        },
    )
}

/// Ensure a `<Default>` exists for `extension`. Existing defaults are left alone.
pub fn with_default(
    existing: Option<&[u8]>,
    extension: &str,
    content_type: &str,
) -> Result<Vec<u8>, PptxError> {
    let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    upsert(
        existing,
        Entry::Default {
            extension,
            content_type,
        },
    )
}

/// The `<Override>` content type declared for `part`, if any.
pub fn override_for(xml: &[u8], part: &str) -> Result<Option<String>, PptxError> {
    let part_name = format!("/{}", part.trim_start_matches('/'));
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Override") =>
            {
                let mut matched = false;
                let mut content_type = None;
                for attr in e.attributes().with_checks(false) {
                    let attr = attr?;
                    let key = local_name(attr.key.as_ref());
                    if key.eq_ignore_ascii_case(b"PartName") {
                        matched = attr.unescape_value()?.trim().eq_ignore_ascii_case(&part_name);
                    } else if key.eq_ignore_ascii_case(b"ContentType") {
                        content_type = Some(attr.unescape_value()?.into_owned());
                    }
                }
                if matched {
                    return Ok(content_type);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn upsert(existing: Option<&[u8]>, entry: Entry<'_>) -> Result<Vec<u8>, PptxError> {
    let existing = existing.unwrap_or(MINIMAL_CONTENT_TYPES.as_bytes());

    let mut reader = Reader::from_reader(existing);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(existing.len() + 160));
    let mut buf = Vec::new();
    let mut found = false;
    let mut types_prefix: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(e) if is_entry(&e, &entry) => {
                let el = rewrite_entry(e, &entry, &mut found)?;
                writer.write_event(Event::Start(el))?;
            }
            Event::Empty(e) if is_entry(&e, &entry) => {
                let el = rewrite_entry(e, &entry, &mut found)?;
                writer.write_event(Event::Empty(el))?;
            }
            Event::Start(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Types") => {
                types_prefix = Some(prefix_string(e.name().as_ref()));
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Types") => {
                if !found {
                    found = true;
                    let prefix = types_prefix.clone().unwrap_or_default();
                    let el = entry.element(&crate::xml::prefixed(&prefix, entry.tag()));
                    writer.write_event(Event::Empty(el))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Types") => {
                // `<Types/>`: expand so the entry has somewhere to live.
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let prefix = prefix_string(e.name().as_ref());
                writer.write_event(Event::Start(e))?;
                if !found {
                    found = true;
                    let el = entry.element(&crate::xml::prefixed(&prefix, entry.tag()));
                    writer.write_event(Event::Empty(el))?;
                }
                writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    if !found {
        return Err(PptxError::Invalid(format!(
            "{CONTENT_TYPES_PART} has no <Types> root"
        )));
    }
    Ok(writer.into_inner())
}

fn is_entry(e: &BytesStart<'_>, entry: &Entry<'_>) -> bool {
    local_name(e.name().as_ref()).eq_ignore_ascii_case(entry.tag().as_bytes())
}

/// Pass an existing `<Default>`/`<Override>` through, swapping in the new entry when it is an
/// override for the same part.
fn rewrite_entry<'e>(
    e: BytesStart<'e>,
    entry: &Entry<'_>,
    found: &mut bool,
) -> Result<BytesStart<'e>, PptxError> {
    let mut key_matches = false;
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if local_name(attr.key.as_ref()).eq_ignore_ascii_case(entry.key_attr())
            && entry.matches(&attr.unescape_value()?)
        {
            key_matches = true;
        }
    }
    if !key_matches || *found {
        return Ok(e);
    }
    *found = true;
    match entry {
        Entry::Override { .. } => {
            let tag_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
            Ok(entry.element(&tag_name))
        }
        Entry::Default { .. } => Ok(e),
    }
}

fn prefix_string(name: &[u8]) -> String {
    crate::xml::prefix_of(name)
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_default()
}
