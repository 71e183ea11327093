mod support;

use deckcharts_model::{
    ChartRole, Facet, FillStyle, PlanReport, SeriesStylePlanner, StyleConfig, TARGET_NAV_LINE,
};
use deckcharts_pptx::xml::{CHART_NS, DRAWINGML_NS};
use deckcharts_pptx::{extract_chart_data, restyle_chart, PlotKind, PptxPackage};
use pretty_assertions::assert_eq;
use roxmltree::{Document, Node};
use support::{deck, forecast_data, frame, part_string, SLIDE_1, SLIDE_2};

#[derive(Debug, Default, PartialEq)]
struct RenderedSeries {
    fill: Option<String>,
    no_fill: bool,
    line: Option<String>,
    dash: Option<String>,
    marker_symbol: Option<String>,
}

fn srgb(node: Node<'_, '_>) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name((DRAWINGML_NS, "srgbClr")))
        .and_then(|n| n.attribute("val"))
        .map(str::to_string)
}

fn child<'a, 'input>(parent: Node<'a, 'input>, ns: &str, local: &str) -> Option<Node<'a, 'input>> {
    parent.children().find(|n| n.has_tag_name((ns, local)))
}

fn rendered(xml: &str) -> Vec<RenderedSeries> {
    let doc = Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((CHART_NS, "ser")))
        .map(|ser| {
            let mut out = RenderedSeries::default();
            if let Some(sp_pr) = child(ser, CHART_NS, "spPr") {
                out.fill = child(sp_pr, DRAWINGML_NS, "solidFill").and_then(srgb);
                out.no_fill = child(sp_pr, DRAWINGML_NS, "noFill").is_some();
                if let Some(ln) = child(sp_pr, DRAWINGML_NS, "ln") {
                    out.line = child(ln, DRAWINGML_NS, "solidFill").and_then(srgb);
                    out.dash = child(ln, DRAWINGML_NS, "prstDash")
                        .and_then(|n| n.attribute("val"))
                        .map(str::to_string);
                }
            }
            out.marker_symbol = child(ser, CHART_NS, "marker")
                .and_then(|m| child(m, CHART_NS, "symbol"))
                .and_then(|s| s.attribute("val"))
                .map(str::to_string);
            out
        })
        .collect()
}

fn restyled(kind: PlotKind, role: ChartRole, planner: &SeriesStylePlanner) -> (PptxPackage, String, PlanReport) {
    let mut package = deck();
    let chart = package
        .add_chart(SLIDE_1, kind, frame(), &forecast_data())
        .unwrap();
    let report = restyle_chart(&mut package, &chart.chart_part, role, planner).unwrap();
    let xml = part_string(&package, &chart.chart_part);
    (package, xml, report)
}

#[test]
fn forecast_area_chart_gets_vintage_shades_and_a_target_line() {
    let planner = SeriesStylePlanner::default();
    let (_, xml, report) = restyled(
        PlotKind::AreaStacked,
        ChartRole::StackedForecastWithTargetLine,
        &planner,
    );

    let planned = planner.plan_styles(
        ChartRole::StackedForecastWithTargetLine,
        &["A_-1", "A_0", TARGET_NAV_LINE],
    );
    assert_eq!(report.styles, planned);

    let series = rendered(&xml);
    assert_eq!(series.len(), 3);
    for (rendered, style) in series.iter().zip(&planned).take(2) {
        let expected = style.fill.and_then(|f| f.color()).map(|c| c.to_hex());
        assert!(expected.is_some());
        assert_eq!(rendered.fill, expected);
    }
    assert_ne!(series[0].fill, series[1].fill);

    assert_eq!(
        series[2],
        RenderedSeries {
            fill: None,
            no_fill: true,
            line: Some("404040".to_string()),
            dash: Some("dash".to_string()),
            marker_symbol: None,
        }
    );
    // Area series have no markers.
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].series_index, 2);
    assert_eq!(report.skipped[0].facet, Facet::Marker);
}

#[test]
fn line_chart_takes_lines_and_markers_but_no_fill() {
    let planner = SeriesStylePlanner::default();
    let (_, xml, report) = restyled(PlotKind::Line, ChartRole::AggregateLine, &planner);

    let series = rendered(&xml);
    assert_eq!(series[2].marker_symbol.as_deref(), Some("circle"));
    assert_eq!(series[2].line.as_deref(), Some("404040"));
    assert_eq!(series[0].marker_symbol.as_deref(), Some("none"));
    assert!(series.iter().all(|s| s.fill.is_none()));

    let skipped: Vec<_> = report.skipped.iter().map(|s| (s.series_index, s.facet)).collect();
    assert_eq!(skipped, vec![(2, Facet::Fill)]);
}

#[test]
fn restyling_keeps_the_chart_data() {
    let planner = SeriesStylePlanner::default();
    let (package, xml, _) = restyled(PlotKind::ColumnStacked, ChartRole::CashflowPlot, &planner);
    assert_eq!(extract_chart_data(&xml).unwrap(), forecast_data());

    let reread = PptxPackage::from_bytes(&package.write_to_bytes().unwrap()).unwrap();
    assert_eq!(reread, package);
}

#[test]
fn restyling_twice_is_stable() {
    let planner = SeriesStylePlanner::default();
    let mut package = deck();
    let chart = package
        .add_chart(SLIDE_2, PlotKind::BarClustered, frame(), &forecast_data())
        .unwrap();
    restyle_chart(&mut package, &chart.chart_part, ChartRole::BarAllocation, &planner).unwrap();
    let once = part_string(&package, &chart.chart_part);
    restyle_chart(&mut package, &chart.chart_part, ChartRole::BarAllocation, &planner).unwrap();
    assert_eq!(part_string(&package, &chart.chart_part), once);
}

#[test]
fn configured_palette_reaches_the_chart() {
    let config = StyleConfig::from_json_str(r#"{ "palette": ["112233", "445566"] }"#).unwrap();
    let planner = SeriesStylePlanner::new(config);
    let (_, xml, report) = restyled(PlotKind::ColumnClustered, ChartRole::BarAllocation, &planner);

    let series = rendered(&xml);
    assert_eq!(series[0].fill.as_deref(), Some("112233"));
    assert_eq!(series[1].fill.as_deref(), Some("445566"));
    assert_eq!(report.styles[2].fill, Some(FillStyle::None));
    assert!(series[2].no_fill);
}

#[test]
fn restyling_a_missing_chart_fails() {
    let mut package = deck();
    let planner = SeriesStylePlanner::default();
    assert!(restyle_chart(&mut package, "ppt/charts/chart9.xml", ChartRole::Default, &planner).is_err());
}
