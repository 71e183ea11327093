//! Writing planned series styles back into chart XML.
//!
//! Each `c:ser` is re-emitted with a rebuilt `c:spPr` (and `c:marker` for line-like plots). Every
//! other child, and every unrelated `c:spPr` child such as geometry or effects, is copied through
//! as raw text.

use deckcharts_model::{
    ChartRole, Facet, FacetUnavailable, FillStyle, LineStyle, MarkerStyle, PlanReport,
    SeriesRenderable, SeriesStylePlanner,
};
use roxmltree::{Document, Node};

use super::extract::{plot_area, series_in, series_name};
use crate::xml::{escape_attr, prefix_for, prefixed, CHART_NS, DRAWINGML_NS};
use crate::{PptxError, PptxPackage};

/// One `c:ser` of a chart, seen through the facets its plot type supports.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesHandle {
    name: String,
    plot: String,
    fill: Option<FillStyle>,
    line: Option<LineStyle>,
    marker: Option<MarkerStyle>,
}

impl ChartSeriesHandle {
    pub fn new(name: impl Into<String>, plot: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plot: plot.into(),
            fill: None,
            line: None,
            marker: None,
        }
    }

    /// Local name of the plot element holding the series, e.g. `barChart`.
    pub fn plot(&self) -> &str {
        &self.plot
    }

    pub fn supports(&self, facet: Facet) -> bool {
        let filled = matches!(
            self.plot.as_str(),
            "barChart"
                | "bar3DChart"
                | "areaChart"
                | "area3DChart"
                | "pieChart"
                | "pie3DChart"
                | "doughnutChart"
                | "ofPieChart"
                | "bubbleChart"
                | "surfaceChart"
                | "surface3DChart"
        );
        let marked = matches!(
            self.plot.as_str(),
            "lineChart" | "line3DChart" | "scatterChart" | "radarChart" | "stockChart"
        );
        match facet {
            Facet::Fill => filled,
            Facet::Line => true,
            Facet::Marker => marked,
        }
    }

    pub fn fill(&self) -> Option<&FillStyle> {
        self.fill.as_ref()
    }

    pub fn line(&self) -> Option<&LineStyle> {
        self.line.as_ref()
    }

    pub fn marker(&self) -> Option<&MarkerStyle> {
        self.marker.as_ref()
    }

    fn check(&self, facet: Facet) -> Result<(), FacetUnavailable> {
        if self.supports(facet) {
            Ok(())
        } else {
            Err(FacetUnavailable::new(facet))
        }
    }
}

impl SeriesRenderable for ChartSeriesHandle {
    fn series_name(&self) -> &str {
        &self.name
    }

    fn set_fill(&mut self, fill: &FillStyle) -> Result<(), FacetUnavailable> {
        self.check(Facet::Fill)?;
        self.fill = Some(*fill);
        Ok(())
    }

    fn set_line(&mut self, line: &LineStyle) -> Result<(), FacetUnavailable> {
        self.check(Facet::Line)?;
        self.line = Some(*line);
        Ok(())
    }

    fn set_marker(&mut self, marker: &MarkerStyle) -> Result<(), FacetUnavailable> {
        self.check(Facet::Marker)?;
        self.marker = Some(*marker);
        Ok(())
    }
}

/// Restyle every series of `chart_part` for `role`.
pub fn restyle_chart(
    package: &mut PptxPackage,
    chart_part: &str,
    role: ChartRole,
    planner: &SeriesStylePlanner,
) -> Result<PlanReport, PptxError> {
    let xml = package.part_str(chart_part)?.to_string();
    let (updated, report) = restyle_chart_xml(&xml, role, planner)?;
    package.set_part(chart_part, updated.into_bytes());
    log::debug!(
        "restyled {} series of {chart_part} as {role} ({} facets skipped)",
        report.styles.len(),
        report.skipped.len()
    );
    Ok(report)
}

pub(crate) fn restyle_chart_xml(
    xml: &str,
    role: ChartRole,
    planner: &SeriesStylePlanner,
) -> Result<(String, PlanReport), PptxError> {
    let doc = Document::parse(xml)?;
    let plot_area = plot_area(&doc)
        .ok_or_else(|| PptxError::Invalid("chart has no c:plotArea".to_string()))?;
    let series: Vec<Node<'_, '_>> = series_in(plot_area).collect();

    let mut handles: Vec<ChartSeriesHandle> = series
        .iter()
        .enumerate()
        .map(|(idx, ser)| {
            let name = series_name(*ser).unwrap_or_else(|| format!("Series {}", idx + 1));
            let plot = ser
                .parent_element()
                .map(|p| p.tag_name().name())
                .unwrap_or_default();
            ChartSeriesHandle::new(name, plot)
        })
        .collect();
    let report = planner.plan(role, &mut handles);

    let mut edits: Vec<(std::ops::Range<usize>, String)> = series
        .iter()
        .zip(&handles)
        .filter_map(|(ser, handle)| Some((ser.range(), rewrite_series(xml, *ser, handle)?)))
        .collect();
    edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));

    let mut out = xml.to_string();
    for (range, replacement) in edits {
        out.replace_range(range, &replacement);
    }
    // The splice must leave a well-formed part behind.
    Document::parse(&out)?;
    Ok((out, report))
}

/// Prefixes for the new elements of one series.
struct Prefixes<'a> {
    c: &'a str,
    /// `None` when DrawingML is not bound in scope; new elements then declare `a` themselves.
    a: Option<&'a str>,
}

impl Prefixes<'_> {
    fn a(&self) -> &str {
        self.a.unwrap_or("a")
    }

    fn a_decl(&self) -> String {
        match self.a {
            Some(_) => String::new(),
            None => format!(r#" xmlns:a="{DRAWINGML_NS}""#),
        }
    }
}

fn rewrite_series(xml: &str, ser: Node<'_, '_>, handle: &ChartSeriesHandle) -> Option<String> {
    let need_sp_pr = handle.fill.is_some() || handle.line.is_some();
    let marker = handle.marker.as_ref();
    if !need_sp_pr && marker.is_none() {
        return None;
    }
    let (open, close) = element_shell(xml, ser);

    let prefixes = Prefixes {
        c: prefix_for(ser, CHART_NS).unwrap_or("c"),
        a: prefix_for(ser, DRAWINGML_NS),
    };

    let elements = || ser.children().filter(|n| n.is_element());
    let is = |n: &Node<'_, '_>, local: &str| n.tag_name().namespace() == Some(CHART_NS) && n.tag_name().name() == local;
    let old_sp_pr = elements().find(|n| is(n, "spPr"));
    let old_marker = elements().find(|n| is(n, "marker"));
    let anchor = elements()
        .filter(|n| is(n, "idx") || is(n, "order") || is(n, "tx"))
        .last();

    let new_sp_pr = |old| sp_pr_xml(xml, old, &prefixes, handle);
    let new_marker = |style: &MarkerStyle| marker_xml(&prefixes, style);

    let mut out = String::with_capacity(ser.range().len() + 512);
    out.push_str(&open);
    out.push('>');

    if anchor.is_none() {
        if old_sp_pr.is_none() && need_sp_pr {
            out.push_str(&new_sp_pr(None));
        }
        if old_marker.is_none() && old_sp_pr.is_none() {
            if let Some(style) = marker {
                out.push_str(&new_marker(style));
            }
        }
    }

    for child in ser.children() {
        let is_old_sp_pr = Some(child) == old_sp_pr;
        let is_old_marker = Some(child) == old_marker;

        match (is_old_sp_pr, is_old_marker, marker) {
            (true, _, _) if need_sp_pr => out.push_str(&new_sp_pr(Some(child))),
            (_, true, Some(style)) => out.push_str(&new_marker(style)),
            _ => out.push_str(&xml[child.range()]),
        }

        if is_old_sp_pr && old_marker.is_none() {
            if let Some(style) = marker {
                out.push_str(&new_marker(style));
            }
        }
        if Some(child) == anchor && old_sp_pr.is_none() {
            if need_sp_pr {
                out.push_str(&new_sp_pr(None));
            }
            if old_marker.is_none() {
                if let Some(style) = marker {
                    out.push_str(&new_marker(style));
                }
            }
        }
    }

    out.push_str(&close);
    Some(out)
}

fn sp_pr_xml(
    xml: &str,
    old: Option<Node<'_, '_>>,
    prefixes: &Prefixes<'_>,
    handle: &ChartSeriesHandle,
) -> String {
    let a_in_scope = old.and_then(|n| prefix_for(n, DRAWINGML_NS)).or(prefixes.a);
    let prefixes = Prefixes {
        c: prefixes.c,
        a: a_in_scope,
    };

    let (open, close) = match old {
        Some(node) => element_shell(xml, node),
        None => {
            let qname = prefixed(prefixes.c, "spPr");
            (format!("<{qname}"), format!("</{qname}>"))
        }
    };

    let mut geometry = String::new();
    let mut fill = String::new();
    let mut ln = String::new();
    let mut rest = String::new();
    for child in old.into_iter().flat_map(|n| n.children()).filter(|n| n.is_element()) {
        let raw = &xml[child.range()];
        match child.tag_name().name() {
            "xfrm" | "custGeom" | "prstGeom" => geometry.push_str(raw),
            "noFill" | "solidFill" | "gradFill" | "blipFill" | "pattFill" | "grpFill" => {
                fill.push_str(raw)
            }
            "ln" => ln.push_str(raw),
            _ => rest.push_str(raw),
        }
    }
    if let Some(style) = &handle.fill {
        fill = fill_xml(prefixes.a(), style);
    }
    if let Some(style) = &handle.line {
        ln = line_xml(prefixes.a(), style);
    }

    format!(
        "{open}{decl}>{geometry}{fill}{ln}{rest}{close}",
        decl = prefixes.a_decl()
    )
}

fn fill_xml(a: &str, fill: &FillStyle) -> String {
    match fill {
        FillStyle::Solid { color } => {
            let solid = prefixed(a, "solidFill");
            format!(
                r#"<{solid}><{clr} val="{color}"/></{solid}>"#,
                clr = prefixed(a, "srgbClr")
            )
        }
        FillStyle::None => format!("<{}/>", prefixed(a, "noFill")),
    }
}

fn line_xml(a: &str, line: &LineStyle) -> String {
    let ln = prefixed(a, "ln");
    let mut out = format!("<{ln}");
    if let Some(w) = line.width_emu() {
        out.push_str(&format!(r#" w="{w}""#));
    }
    out.push('>');
    out.push_str(&fill_xml(a, &line.fill));
    if let Some(dash) = line.dash {
        out.push_str(&format!(
            r#"<{} val="{}"/>"#,
            prefixed(a, "prstDash"),
            escape_attr(dash.preset())
        ));
    }
    out.push_str(&format!("</{ln}>"));
    out
}

fn marker_xml(prefixes: &Prefixes<'_>, marker: &MarkerStyle) -> String {
    let c = |local: &str| prefixed(prefixes.c, local);
    let mut out = format!(
        r#"<{}><{} val="{}"/>"#,
        c("marker"),
        c("symbol"),
        marker.shape.symbol()
    );
    if let Some(size) = marker.size {
        out.push_str(&format!(r#"<{} val="{size}"/>"#, c("size")));
    }
    if let Some(color) = marker.fill {
        let a = prefixes.a();
        let fill = fill_xml(a, &FillStyle::solid(color));
        let ln = prefixed(a, "ln");
        out.push_str(&format!(
            r#"<{sp_pr}{decl}>{fill}<{ln} w="9525">{fill}</{ln}></{sp_pr}>"#,
            sp_pr = c("spPr"),
            decl = prefixes.a_decl(),
        ));
    }
    out.push_str(&format!("</{}>", c("marker")));
    out
}

/// An element's start tag without its closing `>` (or `/>`) and its end tag.
fn element_shell(xml: &str, node: Node<'_, '_>) -> (String, String) {
    let text = &xml[node.range()];
    let open_len = start_tag_len(text);
    let start_tag = &text[..open_len];
    if let Some(open) = start_tag.strip_suffix("/>") {
        let qname_end = open[1..]
            .find(|c: char| c.is_whitespace())
            .map_or(open.len(), |i| i + 1);
        let qname = &open[1..qname_end];
        return (open.trim_end().to_string(), format!("</{qname}>"));
    }
    let open = start_tag.strip_suffix('>').unwrap_or(start_tag);
    let close = text.rfind("</").map_or("", |i| &text[i..]);
    (open.to_string(), close.to_string())
}

/// Byte length of the start tag at the head of `text`, including its `>`.
fn start_tag_len(text: &str) -> usize {
    let mut quote: Option<u8> = None;
    for (i, b) in text.bytes().enumerate() {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return i + 1,
            (None, _) => {}
        }
    }
    text.len()
}
