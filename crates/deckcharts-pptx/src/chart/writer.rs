use std::fmt::Write as _;

use roxmltree::Document;

use super::workbook::{sheet_range, write_chart_workbook};
use super::{
    ChartData, ChartFrame, ChartObject, PlotKind, SeriesValues, CHART_PART_TEMPLATE, CHART_URI,
    CONTENT_TYPE_CHART, CONTENT_TYPE_XLSX, EMBEDDED_WORKBOOK_TEMPLATE, REL_TYPE_CHART,
    REL_TYPE_PACKAGE,
};
use crate::content_types::{self, CONTENT_TYPES_PART};
use crate::path::rels_for_part;
use crate::xml::{escape_attr, insert_before_end, prefix_for, prefixed, DRAWINGML_NS, PRESENTATIONML_NS};
use crate::{PptxError, PptxPackage};

const CAT_AX_ID: u32 = 500_000_001;
const VAL_AX_ID: u32 = 500_000_002;

impl PptxPackage {
    /// Create a chart on `slide_part` seeded with `data`.
    ///
    /// Adds the chart part, its embedded workbook, both relationships and a graphic frame at the
    /// end of the slide's shape tree. The slide is validated before anything is written, and a
    /// failure part-way through rolls back every part already written, so an error leaves the
    /// package unchanged.
    pub fn add_chart(
        &mut self,
        slide_part: &str,
        kind: PlotKind,
        frame: ChartFrame,
        data: &ChartData,
    ) -> Result<ChartObject, PptxError> {
        let slide_xml = self.part_str(slide_part)?.to_string();
        let slide = SlideShapeTree::locate(&slide_xml)?;
        // Fail on malformed slide rels before creating anything.
        self.relationships(slide_part)?;
        let workbook = write_chart_workbook(data)?;

        // Prior contents of every part touched, restored in reverse on failure.
        let mut touched = Vec::new();
        for name in [CONTENT_TYPES_PART.to_string(), rels_for_part(slide_part)] {
            self.remember(&mut touched, name);
        }
        let result = self.write_chart(slide_part, &slide_xml, &slide, kind, frame, data, workbook, &mut touched);
        if result.is_err() {
            for (name, bytes) in touched.into_iter().rev() {
                match bytes {
                    Some(bytes) => self.set_part(name, bytes),
                    None => {
                        self.remove_part(&name);
                    }
                }
            }
        }
        result
    }

    fn remember(&self, touched: &mut Vec<(String, Option<Vec<u8>>)>, name: String) {
        let bytes = self.part(&name).map(<[u8]>::to_vec);
        touched.push((name, bytes));
    }

    #[allow(clippy::too_many_arguments)]
    fn write_chart(
        &mut self,
        slide_part: &str,
        slide_xml: &str,
        slide: &SlideShapeTree,
        kind: PlotKind,
        frame: ChartFrame,
        data: &ChartData,
        workbook: Vec<u8>,
        touched: &mut Vec<(String, Option<Vec<u8>>)>,
    ) -> Result<ChartObject, PptxError> {
        let chart_part = self.create_part(CHART_PART_TEMPLATE, CONTENT_TYPE_CHART, Vec::new())?;
        touched.push((chart_part.clone(), None));
        let workbook_part = self.create_part(EMBEDDED_WORKBOOK_TEMPLATE, CONTENT_TYPE_XLSX, workbook)?;
        touched.push((workbook_part.clone(), None));
        let content_types =
            content_types::with_default(self.part(CONTENT_TYPES_PART), "xlsx", CONTENT_TYPE_XLSX)?;
        self.set_part(CONTENT_TYPES_PART, content_types);

        self.remember(touched, rels_for_part(&chart_part));
        let package_rel_id = self.add_relationship(&chart_part, &workbook_part, REL_TYPE_PACKAGE)?;
        self.set_part(
            chart_part.clone(),
            chart_space_xml(kind, data, &package_rel_id).into_bytes(),
        );

        let rel_id = self.add_relationship(slide_part, &chart_part, REL_TYPE_CHART)?;
        let frame_id = slide.next_shape_id;
        let frame_name = format!("Chart {frame_id}");
        let frame_xml = slide.graphic_frame_xml(frame_id, &frame_name, &rel_id, frame);
        let doc = Document::parse(slide_xml)?;
        let sp_tree = doc
            .descendants()
            .find(|n| n.has_tag_name((PRESENTATIONML_NS, "spTree")))
            .ok_or_else(|| PptxError::Invalid(format!("{slide_part} has no p:spTree")))?;
        let updated = insert_before_end(slide_xml, sp_tree, &frame_xml);
        self.set_part(slide_part, updated.into_bytes());

        log::debug!("added {kind:?} chart {chart_part} to {slide_part} as {rel_id}");
        Ok(ChartObject {
            slide_part: slide_part.to_string(),
            frame_id,
            frame_name,
            rel_id,
            chart_part,
            kind: Some(kind),
            frame,
        })
    }
}

/// What `add_chart` needs to know about a slide's `p:spTree` before editing it.
struct SlideShapeTree {
    p_prefix: String,
    /// `None` when no DrawingML prefix is in scope and the frame must declare one.
    a_prefix: Option<String>,
    next_shape_id: u32,
}

impl SlideShapeTree {
    fn locate(slide_xml: &str) -> Result<Self, PptxError> {
        let doc = Document::parse(slide_xml)?;
        let sp_tree = doc
            .descendants()
            .find(|n| n.has_tag_name((PRESENTATIONML_NS, "spTree")))
            .ok_or_else(|| PptxError::Invalid("slide has no p:spTree".to_string()))?;

        let max_id = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "cNvPr")
            .filter_map(|n| n.attribute("id")?.parse::<u32>().ok())
            .max()
            .unwrap_or(1);

        Ok(Self {
            p_prefix: prefix_for(sp_tree, PRESENTATIONML_NS)
                .unwrap_or_default()
                .to_string(),
            a_prefix: prefix_for(sp_tree, DRAWINGML_NS).map(str::to_string),
            next_shape_id: max_id.saturating_add(1),
        })
    }

    fn graphic_frame_xml(&self, id: u32, name: &str, rel_id: &str, frame: ChartFrame) -> String {
        let p = |local: &str| prefixed(&self.p_prefix, local);
        let (a_prefix, a_decl) = match &self.a_prefix {
            Some(prefix) => (prefix.as_str(), String::new()),
            None => ("a", format!(r#" xmlns:a="{DRAWINGML_NS}""#)),
        };
        let a = |local: &str| prefixed(a_prefix, local);
        let ChartFrame { x, y, cx, cy } = frame;
        let name = escape_attr(name);

        format!(
            concat!(
                r#"<{frame}{a_decl}><{nv}><{c_nv_pr} id="{id}" name="{name}"/>"#,
                r#"<{c_nv_frame}><{locks} noGrp="1"/></{c_nv_frame}><{nv_pr}/></{nv}>"#,
                r#"<{xfrm}><{off} x="{x}" y="{y}"/><{ext} cx="{cx}" cy="{cy}"/></{xfrm}>"#,
                r#"<{graphic}><{graphic_data} uri="{uri}">"#,
                r#"<c:chart xmlns:c="{uri}" xmlns:r="{rel_ns}" r:id="{rel_id}"/>"#,
                r#"</{graphic_data}></{graphic}></{frame}>"#,
            ),
            frame = p("graphicFrame"),
            a_decl = a_decl,
            nv = p("nvGraphicFramePr"),
            c_nv_pr = p("cNvPr"),
            id = id,
            name = name,
            c_nv_frame = p("cNvGraphicFramePr"),
            locks = a("graphicFrameLocks"),
            nv_pr = p("nvPr"),
            xfrm = p("xfrm"),
            off = a("off"),
            ext = a("ext"),
            x = x,
            y = y,
            cx = cx,
            cy = cy,
            graphic = a("graphic"),
            graphic_data = a("graphicData"),
            uri = CHART_URI,
            rel_ns = crate::xml::REL_NS,
            rel_id = rel_id,
        )
    }
}

/// A complete `c:chartSpace` document for `kind` over `data`, whose cell references point into
/// the embedded workbook reached through `package_rel_id`.
pub fn chart_space_xml(kind: PlotKind, data: &ChartData, package_rel_id: &str) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(concat!(
        r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart""#,
        r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
        r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    ));
    out.push_str(r#"<c:date1904 val="0"/><c:roundedCorners val="0"/>"#);
    out.push_str(r#"<c:chart><c:autoTitleDeleted val="1"/><c:plotArea><c:layout/>"#);

    let _ = write!(out, "<c:{}>", kind.plot_element());
    if let Some(bar_dir) = kind.bar_dir() {
        let _ = write!(out, r#"<c:barDir val="{bar_dir}"/>"#);
    }
    let _ = write!(out, r#"<c:grouping val="{}"/><c:varyColors val="0"/>"#, kind.grouping());
    for (idx, series) in data.series().iter().enumerate() {
        push_series(&mut out, kind, data, idx, series);
    }
    match kind.plot_element() {
        "barChart" => {
            out.push_str(r#"<c:gapWidth val="150"/>"#);
            if kind.is_stacked() {
                out.push_str(r#"<c:overlap val="100"/>"#);
            }
        }
        "lineChart" => out.push_str(r#"<c:marker val="1"/>"#),
        _ => {}
    }
    let _ = write!(
        out,
        r#"<c:axId val="{CAT_AX_ID}"/><c:axId val="{VAL_AX_ID}"/></c:{}>"#,
        kind.plot_element()
    );

    let (cat_pos, val_pos) = match kind.bar_dir() {
        Some("bar") => ("l", "b"),
        _ => ("b", "l"),
    };
    let cross_between = if kind.plot_element() == "areaChart" {
        "midCat"
    } else {
        "between"
    };
    let _ = write!(
        out,
        concat!(
            r#"<c:catAx><c:axId val="{cat}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{cat_pos}"/><c:majorTickMark val="out"/>"#,
            r#"<c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{val}"/>"#,
            r#"<c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/>"#,
            r#"<c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#,
            r#"<c:valAx><c:axId val="{val}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{val_pos}"/><c:majorGridlines/>"#,
            r#"<c:numFmt formatCode="General" sourceLinked="1"/><c:majorTickMark val="out"/>"#,
            r#"<c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{cat}"/>"#,
            r#"<c:crosses val="autoZero"/><c:crossBetween val="{cross_between}"/></c:valAx>"#,
        ),
        cat = CAT_AX_ID,
        val = VAL_AX_ID,
        cat_pos = cat_pos,
        val_pos = val_pos,
        cross_between = cross_between,
    );

    out.push_str("</c:plotArea>");
    out.push_str(r#"<c:legend><c:legendPos val="b"/><c:overlay val="0"/></c:legend>"#);
    out.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart>"#);
    let _ = write!(
        out,
        r#"<c:externalData r:id="{}"><c:autoUpdate val="0"/></c:externalData>"#,
        escape_attr(package_rel_id)
    );
    out.push_str("</c:chartSpace>");
    out
}

fn push_series(out: &mut String, kind: PlotKind, data: &ChartData, idx: usize, series: &SeriesValues) {
    let col = idx + 1;
    let rows = data.categories().len().max(1);
    let _ = write!(out, r#"<c:ser><c:idx val="{idx}"/><c:order val="{idx}"/>"#);

    let _ = write!(
        out,
        r#"<c:tx><c:strRef><c:f>{}</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{}</c:v></c:pt></c:strCache></c:strRef></c:tx>"#,
        sheet_range(col, 1, col, 1),
        escape_attr(&series.name)
    );
    match kind.plot_element() {
        "barChart" => out.push_str(r#"<c:invertIfNegative val="0"/>"#),
        "lineChart" => {
            out.push_str(r#"<c:marker><c:symbol val="circle"/><c:size val="5"/></c:marker>"#)
        }
        _ => {}
    }

    let _ = write!(
        out,
        r#"<c:cat><c:strRef><c:f>{}</c:f><c:strCache><c:ptCount val="{}"/>"#,
        sheet_range(0, 2, 0, rows + 1),
        data.categories().len()
    );
    for (pt, category) in data.categories().iter().enumerate() {
        let _ = write!(out, r#"<c:pt idx="{pt}"><c:v>{}</c:v></c:pt>"#, escape_attr(category));
    }
    out.push_str("</c:strCache></c:strRef></c:cat>");

    let _ = write!(
        out,
        r#"<c:val><c:numRef><c:f>{}</c:f><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
        sheet_range(col, 2, col, rows + 1),
        series.values.len()
    );
    for (pt, value) in series.values.iter().enumerate() {
        if let Some(value) = value {
            let _ = write!(out, r#"<c:pt idx="{pt}"><c:v>{value}</c:v></c:pt>"#);
        }
    }
    out.push_str("</c:numCache></c:numRef></c:val>");

    if kind.plot_element() == "lineChart" {
        out.push_str(r#"<c:smooth val="0"/>"#);
    }
    out.push_str("</c:ser>");
}
