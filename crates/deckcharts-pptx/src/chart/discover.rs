use roxmltree::{Document, Node};

use super::extract::detect_plot_kind;
use super::{ChartFrame, ChartObject, CHART_URI};
use crate::xml::{child, DRAWINGML_NS, PRESENTATIONML_NS, REL_NS};
use crate::{PptxError, PptxPackage};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

impl PptxPackage {
    /// Slide part names in presentation order.
    ///
    /// Order comes from `p:sldIdLst`; packages without a presentation part fall back to the
    /// numeric order of `ppt/slides/slideN.xml`.
    pub fn slide_parts(&self) -> Result<Vec<String>, PptxError> {
        let Some(bytes) = self.part(PRESENTATION_PART) else {
            let mut slides: Vec<(u32, String)> = self
                .part_names()
                .filter_map(|name| {
                    let n = name
                        .strip_prefix("ppt/slides/slide")?
                        .strip_suffix(".xml")?
                        .parse::<u32>()
                        .ok()?;
                    Some((n, name.to_string()))
                })
                .collect();
            slides.sort();
            return Ok(slides.into_iter().map(|(_, name)| name).collect());
        };

        let xml = std::str::from_utf8(bytes)?;
        let doc = Document::parse(xml)?;
        let mut out = Vec::new();
        for sld_id in doc
            .descendants()
            .filter(|n| n.has_tag_name((PRESENTATIONML_NS, "sldId")))
        {
            let Some(rel_id) = sld_id.attribute((REL_NS, "id")) else {
                continue;
            };
            if let Some(part) = self.resolve_relationship(PRESENTATION_PART, rel_id)? {
                out.push(part);
            }
        }
        Ok(out)
    }

    /// Charts placed on `slide_part`, in shape-tree order.
    ///
    /// Frames whose chart relationship does not resolve to an existing part are skipped.
    pub fn chart_objects(&self, slide_part: &str) -> Result<Vec<ChartObject>, PptxError> {
        let xml = self.part_str(slide_part)?;
        let doc = Document::parse(xml)?;

        let mut out = Vec::new();
        for frame in doc
            .descendants()
            .filter(|n| n.has_tag_name((PRESENTATIONML_NS, "graphicFrame")))
        {
            let Some(chart) = frame.descendants().find(|n| {
                n.has_tag_name((CHART_URI, "chart"))
                    && n.parent_element()
                        .and_then(|p| p.attribute("uri"))
                        .is_some_and(|uri| uri == CHART_URI)
            }) else {
                continue;
            };
            let Some(rel_id) = chart.attribute((REL_NS, "id")) else {
                continue;
            };
            let Some(chart_part) = self.resolve_relationship(slide_part, rel_id)? else {
                log::debug!("{slide_part}: chart relationship {rel_id} does not resolve");
                continue;
            };
            let Some(chart_xml) = self.part(&chart_part) else {
                log::debug!("{slide_part}: chart part {chart_part} is missing");
                continue;
            };

            let kind = std::str::from_utf8(chart_xml)
                .ok()
                .and_then(|xml| Document::parse(xml).ok())
                .and_then(|doc| detect_plot_kind(&doc));
            let c_nv_pr = frame
                .descendants()
                .find(|n| n.has_tag_name((PRESENTATIONML_NS, "cNvPr")));

            out.push(ChartObject {
                slide_part: slide_part.to_string(),
                frame_id: c_nv_pr
                    .and_then(|n| n.attribute("id"))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_default(),
                frame_name: c_nv_pr
                    .and_then(|n| n.attribute("name"))
                    .unwrap_or_default()
                    .to_string(),
                rel_id: rel_id.to_string(),
                chart_part,
                kind,
                frame: frame_geometry(frame),
            });
        }
        Ok(out)
    }
}

fn frame_geometry(frame: Node<'_, '_>) -> ChartFrame {
    let Some(xfrm) = child(frame, PRESENTATIONML_NS, "xfrm") else {
        return ChartFrame::default();
    };
    let attr = |local: &str, name: &str| {
        child(xfrm, DRAWINGML_NS, local)
            .and_then(|n| n.attribute(name))
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or_default()
    };
    ChartFrame {
        x: attr("off", "x"),
        y: attr("off", "y"),
        cx: attr("ext", "cx"),
        cy: attr("ext", "cy"),
    }
}
