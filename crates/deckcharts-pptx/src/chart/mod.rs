//! Charts embedded in slides: discovery, cached-data extraction, creation and restyling.

mod discover;
mod extract;
mod restyle;
mod workbook;
mod writer;

pub use extract::extract_chart_data;
pub(crate) use extract::detect_plot_kind;
pub use restyle::{restyle_chart, ChartSeriesHandle};
pub use writer::chart_space_xml;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

pub const REL_TYPE_CHART: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
pub const REL_TYPE_PACKAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package";
pub const REL_TYPE_CHART_STYLE: &str = "http://schemas.microsoft.com/office/2011/relationships/chartStyle";
pub const REL_TYPE_CHART_COLORS: &str =
    "http://schemas.microsoft.com/office/2011/relationships/chartColorStyle";

pub const CONTENT_TYPE_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
pub const CONTENT_TYPE_CHART_STYLE: &str = "application/vnd.ms-office.chartstyle+xml";
pub const CONTENT_TYPE_CHART_COLORS: &str = "application/vnd.ms-office.chartcolorstyle+xml";
pub const CONTENT_TYPE_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const CHART_PART_TEMPLATE: &str = "ppt/charts/chart{N}.xml";
pub const CHART_STYLE_PART_TEMPLATE: &str = "ppt/charts/style{N}.xml";
pub const CHART_COLORS_PART_TEMPLATE: &str = "ppt/charts/colors{N}.xml";
pub const EMBEDDED_WORKBOOK_TEMPLATE: &str = "ppt/embeddings/Microsoft_Excel_Worksheet{N}.xlsx";

/// The plot shapes this crate can create and restyle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    ColumnClustered,
    ColumnStacked,
    BarClustered,
    BarStacked,
    Line,
    Area,
    AreaStacked,
}

impl PlotKind {
    /// `c:barChart`, `c:lineChart` or `c:areaChart`.
    pub fn plot_element(self) -> &'static str {
        match self {
            PlotKind::ColumnClustered
            | PlotKind::ColumnStacked
            | PlotKind::BarClustered
            | PlotKind::BarStacked => "barChart",
            PlotKind::Line => "lineChart",
            PlotKind::Area | PlotKind::AreaStacked => "areaChart",
        }
    }

    pub fn grouping(self) -> &'static str {
        match self {
            PlotKind::ColumnClustered | PlotKind::BarClustered => "clustered",
            PlotKind::ColumnStacked | PlotKind::BarStacked | PlotKind::AreaStacked => "stacked",
            PlotKind::Line | PlotKind::Area => "standard",
        }
    }

    /// `c:barDir/@val` for bar plots.
    pub fn bar_dir(self) -> Option<&'static str> {
        match self {
            PlotKind::ColumnClustered | PlotKind::ColumnStacked => Some("col"),
            PlotKind::BarClustered | PlotKind::BarStacked => Some("bar"),
            PlotKind::Line | PlotKind::Area | PlotKind::AreaStacked => None,
        }
    }

    pub fn is_stacked(self) -> bool {
        self.grouping() == "stacked"
    }

    /// Classify a plot element from its local name, `c:barDir` and `c:grouping` values.
    ///
    /// `percentStacked` groupings are treated as stacked.
    pub fn detect(plot_element: &str, bar_dir: Option<&str>, grouping: Option<&str>) -> Option<Self> {
        let stacked = matches!(grouping, Some("stacked" | "percentStacked"));
        match plot_element {
            "barChart" => Some(match (bar_dir.unwrap_or("col"), stacked) {
                ("bar", true) => PlotKind::BarStacked,
                ("bar", false) => PlotKind::BarClustered,
                (_, true) => PlotKind::ColumnStacked,
                (_, false) => PlotKind::ColumnClustered,
            }),
            "lineChart" => Some(PlotKind::Line),
            "areaChart" if stacked => Some(PlotKind::AreaStacked),
            "areaChart" => Some(PlotKind::Area),
            _ => None,
        }
    }
}

/// Position and size of a graphic frame, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartFrame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// A chart placed on a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartObject {
    pub slide_part: String,
    /// `p:cNvPr/@id` of the graphic frame.
    pub frame_id: u32,
    pub frame_name: String,
    /// Slide relationship id pointing at [`ChartObject::chart_part`].
    pub rel_id: String,
    pub chart_part: String,
    /// Kind of the first plot in the plot area, when it is one this crate models.
    pub kind: Option<PlotKind>,
    pub frame: ChartFrame,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartDataError {
    #[error("chart data has no series")]
    NoSeries,
    #[error("series {series:?} has {actual} values but there are {expected} categories")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },
    #[error("chart xml is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesValues {
    pub name: String,
    /// One value per category; `None` is an absent point.
    pub values: Vec<Option<f64>>,
}

/// The tabular data behind a chart: categories down, one column per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    categories: Vec<String>,
    series: Vec<SeriesValues>,
}

impl ChartData {
    pub fn new(categories: Vec<String>, series: Vec<SeriesValues>) -> Result<Self, ChartDataError> {
        if series.is_empty() {
            return Err(ChartDataError::NoSeries);
        }
        for s in &series {
            if s.values.len() != categories.len() {
                return Err(ChartDataError::LengthMismatch {
                    series: s.name.clone(),
                    expected: categories.len(),
                    actual: s.values.len(),
                });
            }
        }
        Ok(Self { categories, series })
    }

    /// One category, one series, a single zero: what a chart falls back to when its real data
    /// cannot be read.
    pub fn placeholder() -> Self {
        Self {
            categories: vec!["Category 1".to_string()],
            series: vec![SeriesValues {
                name: "Series 1".to_string(),
                values: vec![Some(0.0)],
            }],
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn series(&self) -> &[SeriesValues] {
        &self.series
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_plot_kinds() {
        assert_eq!(PlotKind::detect("barChart", Some("col"), Some("clustered")), Some(PlotKind::ColumnClustered));
        assert_eq!(PlotKind::detect("barChart", Some("bar"), Some("percentStacked")), Some(PlotKind::BarStacked));
        assert_eq!(PlotKind::detect("barChart", None, None), Some(PlotKind::ColumnClustered));
        assert_eq!(PlotKind::detect("areaChart", None, Some("stacked")), Some(PlotKind::AreaStacked));
        assert_eq!(PlotKind::detect("lineChart", None, Some("standard")), Some(PlotKind::Line));
        assert_eq!(PlotKind::detect("pieChart", None, None), None);
    }

    #[test]
    fn detect_recovers_every_kind_from_its_own_markup() {
        for kind in [
            PlotKind::ColumnClustered,
            PlotKind::ColumnStacked,
            PlotKind::BarClustered,
            PlotKind::BarStacked,
            PlotKind::Line,
            PlotKind::Area,
            PlotKind::AreaStacked,
        ] {
            assert_eq!(
                PlotKind::detect(kind.plot_element(), kind.bar_dir(), Some(kind.grouping())),
                Some(kind)
            );
        }
    }

    #[test]
    fn chart_data_rejects_ragged_series() {
        let err = ChartData::new(
            vec!["2021".into(), "2022".into()],
            vec![SeriesValues {
                name: "A_0".into(),
                values: vec![Some(1.0)],
            }],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ChartDataError::LengthMismatch {
                series: "A_0".into(),
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(ChartData::new(vec![], vec![]).unwrap_err(), ChartDataError::NoSeries);
    }

    #[test]
    fn placeholder_is_one_by_one() {
        let data = ChartData::placeholder();
        assert_eq!(data.categories().len(), 1);
        assert_eq!(data.series().len(), 1);
        assert_eq!(data.series()[0].values, vec![Some(0.0)]);
    }
}
