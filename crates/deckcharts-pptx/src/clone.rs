//! Duplicating a chart onto another slide.
//!
//! The copy is first created from the source's data with [`PptxPackage::add_chart`], which gives
//! it a private embedded workbook. The source XML and its theme parts are then relinked against
//! the new part in a staging area and committed in one go. Only the `add_chart` step can fail the
//! clone; anything that goes wrong afterwards leaves the freshly written chart in place and is
//! reported as a [`CloneWarning`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use roxmltree::Document;
use serde::Serialize;

use crate::chart::{
    extract_chart_data, ChartData, ChartObject, PlotKind, CONTENT_TYPE_CHART_COLORS,
    CONTENT_TYPE_CHART_STYLE, CHART_COLORS_PART_TEMPLATE, CHART_STYLE_PART_TEMPLATE,
    REL_TYPE_CHART_COLORS, REL_TYPE_CHART_STYLE, REL_TYPE_PACKAGE,
};
use crate::content_types::{self, CONTENT_TYPES_PART};
use crate::opc::first_free_part_name;
use crate::path::{rels_for_part, relative_target, resolve_target};
use crate::relationships::Relationship;
use crate::xml::{local_name, prefix_for, prefix_of, prefixed, CHART_NS, REL_NS};
use crate::{PptxError, PptxPackage};

/// The clone stage a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CloneStep {
    ExtractData,
    DetectKind,
    RelinkXml,
    CopyThemeParts,
}

impl fmt::Display for CloneStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CloneStep::ExtractData => "extract data",
            CloneStep::DetectKind => "detect kind",
            CloneStep::RelinkXml => "relink xml",
            CloneStep::CopyThemeParts => "copy theme parts",
        })
    }
}

/// A recoverable problem met while cloning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneWarning {
    pub step: CloneStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    pub message: String,
}

impl CloneWarning {
    fn new(step: CloneStep, part: Option<&str>, message: impl Into<String>) -> Self {
        let warning = Self {
            step,
            part: part.map(str::to_string),
            message: message.into(),
        };
        log::warn!("{warning}");
        warning
    }
}

impl fmt::Display for CloneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.part {
            Some(part) => write!(f, "clone ({}) {part}: {}", self.step, self.message),
            None => write!(f, "clone ({}): {}", self.step, self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneOutcome {
    pub chart: ChartObject,
    pub warnings: Vec<CloneWarning>,
}

impl PptxPackage {
    /// Duplicate `source` onto `destination_slide` at the same position and size.
    ///
    /// The copy never shares parts with the source: its `c:externalData` points at its own
    /// embedded workbook and chart style/colors parts are duplicated. The source chart and its
    /// relationships are left untouched.
    pub fn clone_chart(
        &mut self,
        source: &ChartObject,
        destination_slide: &str,
    ) -> Result<CloneOutcome, PptxError> {
        let mut warnings = Vec::new();
        let source_part = source.chart_part.as_str();
        let source_xml = match self.part_str(source_part) {
            Ok(xml) => Some(xml.to_string()),
            Err(err) => {
                warnings.push(CloneWarning::new(
                    CloneStep::ExtractData,
                    Some(source_part),
                    format!("source chart is unreadable: {err}"),
                ));
                None
            }
        };

        let data = match source_xml.as_deref().map(extract_chart_data) {
            Some(Ok(data)) => data,
            Some(Err(err)) => {
                warnings.push(CloneWarning::new(
                    CloneStep::ExtractData,
                    Some(source_part),
                    format!("using placeholder data: {err}"),
                ));
                ChartData::placeholder()
            }
            None => ChartData::placeholder(),
        };

        let detected = source_xml
            .as_deref()
            .and_then(|xml| Document::parse(xml).ok())
            .and_then(|doc| crate::chart::detect_plot_kind(&doc));
        let kind = match source.kind.or(detected) {
            Some(kind) => kind,
            None => {
                warnings.push(CloneWarning::new(
                    CloneStep::DetectKind,
                    Some(source_part),
                    "unrecognized plot type, seeding a clustered column chart",
                ));
                PlotKind::ColumnClustered
            }
        };

        let chart = self.add_chart(destination_slide, kind, source.frame, &data)?;

        let Some(source_xml) = source_xml else {
            return Ok(CloneOutcome { chart, warnings });
        };
        match stage_clone(self, source_part, &chart.chart_part, &source_xml, &mut warnings) {
            Ok(staged) => {
                for (name, bytes) in staged {
                    self.set_part(name, bytes);
                }
            }
            Err(err) => warnings.push(CloneWarning::new(
                CloneStep::RelinkXml,
                Some(chart.chart_part.as_str()),
                format!("kept default styling: {err}"),
            )),
        }

        log::debug!(
            "cloned {source_part} to {} on {destination_slide} ({} warnings)",
            chart.chart_part,
            warnings.len()
        );
        Ok(CloneOutcome { chart, warnings })
    }
}

/// Parts written on top of the package once every clone step has succeeded.
struct Stage<'p> {
    package: &'p PptxPackage,
    parts: BTreeMap<String, Vec<u8>>,
}

impl<'p> Stage<'p> {
    fn new(package: &'p PptxPackage) -> Self {
        Self {
            package,
            parts: BTreeMap::new(),
        }
    }

    fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .get(name)
            .map(Vec::as_slice)
            .or_else(|| self.package.part(name))
    }

    fn create_part(
        &mut self,
        template: &str,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<String, PptxError> {
        let name = first_free_part_name(template, |name| {
            self.package.has_part_ignore_case(name)
                || self.parts.keys().any(|staged| staged.eq_ignore_ascii_case(name))
        })?;
        let content_types =
            content_types::with_override(self.part(CONTENT_TYPES_PART), &name, content_type)?;
        self.parts.insert(CONTENT_TYPES_PART.to_string(), content_types);
        self.parts.insert(name.clone(), payload);
        Ok(name)
    }
}

fn stage_clone(
    package: &PptxPackage,
    source_part: &str,
    new_part: &str,
    source_xml: &str,
    warnings: &mut Vec<CloneWarning>,
) -> Result<BTreeMap<String, Vec<u8>>, PptxError> {
    let source_rels = package.relationships(source_part)?;
    let mut new_rels = package.relationships(new_part)?;
    let package_rel_id = new_rels
        .of_type(REL_TYPE_PACKAGE)
        .next()
        .map(|rel| rel.id.clone())
        .ok_or_else(|| PptxError::Invalid(format!("{new_part} has no embedded workbook")))?;

    let analysis = ChartXmlAnalysis::of(source_xml)?;

    let mut remapped = HashMap::new();
    for old_id in &analysis.referenced_ids {
        let Some(rel) = source_rels.get(old_id) else {
            warnings.push(CloneWarning::new(
                CloneStep::RelinkXml,
                Some(source_part),
                format!("relationship {old_id} is referenced but not defined"),
            ));
            continue;
        };
        let target = if rel.is_external() {
            rel.target.clone()
        } else {
            relative_target(new_part, &resolve_target(source_part, &rel.target))
        };
        let id = new_rels.next_r_id();
        new_rels.push(Relationship {
            id: id.clone(),
            type_uri: rel.type_uri.clone(),
            target,
            target_mode: rel.target_mode.clone(),
        })?;
        remapped.insert(old_id.clone(), id);
    }

    let relinked = relink_chart_xml(source_xml, &analysis, &package_rel_id, &remapped)?;

    let mut stage = Stage::new(package);
    for rel in source_rels.iter() {
        let (template, content_type) = match rel.type_uri.as_str() {
            REL_TYPE_CHART_STYLE => (CHART_STYLE_PART_TEMPLATE, CONTENT_TYPE_CHART_STYLE),
            REL_TYPE_CHART_COLORS => (CHART_COLORS_PART_TEMPLATE, CONTENT_TYPE_CHART_COLORS),
            _ => continue,
        };
        if rel.is_external() {
            continue;
        }
        let target = resolve_target(source_part, &rel.target);
        let Some(payload) = package.part(&target) else {
            warnings.push(CloneWarning::new(
                CloneStep::CopyThemeParts,
                Some(target.as_str()),
                format!("{} target is missing, not copied", rel.id),
            ));
            continue;
        };
        let copy = stage.create_part(template, content_type, payload.to_vec())?;
        new_rels.add(&rel.type_uri, &relative_target(new_part, &copy));
    }

    stage.parts.insert(new_part.to_string(), relinked.into_bytes());
    stage
        .parts
        .insert(rels_for_part(new_part), new_rels.to_xml()?);
    Ok(stage.parts)
}

/// What the relinking pass needs to know about a chart document up front.
struct ChartXmlAnalysis {
    chart_prefixes: BTreeSet<String>,
    rel_prefixes: BTreeSet<String>,
    /// Prefix for `r:id` on an inserted `c:externalData`; `None` when none is bound at the root.
    root_rel_prefix: Option<String>,
    root_chart_prefix: String,
    /// Relationship ids referenced outside `c:externalData`, in document order.
    referenced_ids: Vec<String>,
    has_external_data: bool,
    has_auto_update: bool,
}

impl ChartXmlAnalysis {
    fn of(xml: &str) -> Result<Self, PptxError> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        if !root.has_tag_name((CHART_NS, "chartSpace")) {
            return Err(PptxError::Invalid("root element is not c:chartSpace".to_string()));
        }

        let mut chart_prefixes = BTreeSet::new();
        let mut rel_prefixes = BTreeSet::new();
        let mut referenced_ids = Vec::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            for ns in node.namespaces() {
                let prefix = ns.name().unwrap_or_default().to_string();
                if ns.uri() == CHART_NS {
                    chart_prefixes.insert(prefix);
                } else if ns.uri() == REL_NS {
                    rel_prefixes.insert(prefix);
                }
            }
            if node.has_tag_name((CHART_NS, "externalData")) {
                continue;
            }
            for attr in node.attributes().filter(|a| a.namespace() == Some(REL_NS)) {
                if !referenced_ids.iter().any(|id| id == attr.value()) {
                    referenced_ids.push(attr.value().to_string());
                }
            }
        }

        Ok(Self {
            chart_prefixes,
            rel_prefixes,
            root_rel_prefix: prefix_for(root, REL_NS)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            root_chart_prefix: prefix_for(root, CHART_NS).unwrap_or("c").to_string(),
            referenced_ids,
            has_external_data: doc
                .descendants()
                .any(|n| n.has_tag_name((CHART_NS, "externalData"))),
            has_auto_update: doc
                .descendants()
                .any(|n| n.has_tag_name((CHART_NS, "autoUpdate"))),
        })
    }

    fn in_chart_ns(&self, name: &[u8]) -> bool {
        let prefix = prefix_of(name).unwrap_or_default();
        std::str::from_utf8(prefix).is_ok_and(|p| self.chart_prefixes.contains(p))
    }

    fn in_rel_ns(&self, attr_key: &[u8]) -> bool {
        // Unprefixed attributes are never namespaced.
        prefix_of(attr_key)
            .and_then(|p| std::str::from_utf8(p).ok())
            .is_some_and(|p| self.rel_prefixes.contains(p))
    }

    fn auto_update_xml(&self) -> String {
        format!(r#"<{} val="1"/>"#, prefixed(&self.root_chart_prefix, "autoUpdate"))
    }

    fn external_data_xml(&self, rel_id: &str) -> String {
        let c = |local: &str| prefixed(&self.root_chart_prefix, local);
        let (r, decl) = match &self.root_rel_prefix {
            Some(prefix) => (prefix.as_str(), String::new()),
            None => ("r", format!(r#" xmlns:r="{REL_NS}""#)),
        };
        format!(
            r#"<{ext}{decl} {r}:id="{rel_id}">{auto}</{ext}>"#,
            ext = c("externalData"),
            auto = self.auto_update_xml(),
        )
    }
}

/// Elements of `c:chartSpace` that follow `c:externalData`.
const AFTER_EXTERNAL_DATA: [&[u8]; 3] = [b"printSettings", b"userShapes", b"extLst"];

/// Rewrite relationship references of a copied chart for its new part.
///
/// `c:externalData` is pointed at `package_rel_id`; every other relationship attribute found in
/// `remapped` takes its new id. `c:autoUpdate` is forced on, and `c:externalData` is added when
/// the source had none.
fn relink_chart_xml(
    xml: &str,
    analysis: &ChartXmlAnalysis,
    package_rel_id: &str,
    remapped: &HashMap<String, String>,
) -> Result<String, PptxError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 256));
    let mut depth = 0usize;
    let mut external_data_written = analysis.has_external_data;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                let is_chart = analysis.in_chart_ns(name.as_ref());

                if is_chart
                    && local == b"plotArea"
                    && analysis.has_external_data
                    && !analysis.has_auto_update
                {
                    writer
                        .get_mut()
                        .extend_from_slice(analysis.auto_update_xml().as_bytes());
                }
                if depth == 1
                    && is_chart
                    && !external_data_written
                    && AFTER_EXTERNAL_DATA.contains(&local)
                {
                    writer
                        .get_mut()
                        .extend_from_slice(analysis.external_data_xml(package_rel_id).as_bytes());
                    external_data_written = true;
                }

                let rewritten = rewrite_element(e, is_chart, analysis, package_rel_id, remapped)?;
                let is_start = matches!(event, Event::Start(_));
                match (rewritten, is_start) {
                    (Some(elem), true) => writer.write_event(Event::Start(elem))?,
                    (Some(elem), false) => writer.write_event(Event::Empty(elem))?,
                    (None, _) => writer.write_event(event.borrow())?,
                }
                if is_start {
                    depth += 1;
                }
            }
            Event::End(_) => {
                if depth == 1 && !external_data_written {
                    writer
                        .get_mut()
                        .extend_from_slice(analysis.external_data_xml(package_rel_id).as_bytes());
                    external_data_written = true;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(event)?;
            }
            other => writer.write_event(other)?,
        }
    }

    let out = String::from_utf8(writer.into_inner())
        .map_err(|err| PptxError::Invalid(format!("relinked chart is not UTF-8: {err}")))?;
    Document::parse(&out)?;
    Ok(out)
}

/// The element with its relationship attributes (and `c:autoUpdate/@val`) rewritten, or `None`
/// when nothing changes.
fn rewrite_element(
    e: &BytesStart<'_>,
    is_chart: bool,
    analysis: &ChartXmlAnalysis,
    package_rel_id: &str,
    remapped: &HashMap<String, String>,
) -> Result<Option<BytesStart<'static>>, PptxError> {
    let qname = e.name();
    let local = local_name(qname.as_ref());
    let is_external_data = is_chart && local == b"externalData";
    let is_auto_update = is_chart && local == b"autoUpdate";

    let touches_rel = e
        .attributes()
        .with_checks(false)
        .flatten()
        .any(|attr| analysis.in_rel_ns(attr.key.as_ref()));
    if !touches_rel && !is_auto_update {
        return Ok(None);
    }

    let mut elem = BytesStart::new(std::str::from_utf8(qname.as_ref())?.to_string());
    let mut saw_val = false;
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if is_auto_update && attr.key.as_ref() == b"val" {
            elem.push_attribute(("val", "1"));
            saw_val = true;
        } else if analysis.in_rel_ns(attr.key.as_ref()) {
            let old = attr.unescape_value()?;
            let new = if is_external_data {
                Some(package_rel_id)
            } else {
                remapped.get(old.as_ref()).map(String::as_str)
            };
            elem.push_attribute((key, new.unwrap_or(old.as_ref())));
        } else {
            elem.push_attribute(attr);
        }
    }
    if is_auto_update && !saw_val {
        elem.push_attribute(("val", "1"));
    }
    Ok(Some(elem))
}
