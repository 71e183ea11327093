//! Chart series styling model.
//!
//! This crate is format-agnostic: it decides *what* each series of a chart should look like
//! (fill, line and marker) from the chart's [`ChartRole`] and the series names, and pushes the
//! result through the [`SeriesRenderable`] trait. `deckcharts-pptx` implements that trait over
//! DrawingML chart parts.

pub mod color;
pub mod config;
pub mod palette;
pub mod planner;
pub mod role;
pub mod series_name;
pub mod shade;
pub mod style;

pub use color::{ColorParseError, Rgb};
pub use config::{ConfigError, StyleConfig};
pub use palette::{Palette, DEFAULT_PALETTE};
pub use planner::{
    ColorAssignment, Facet, FacetUnavailable, PlanReport, SeriesRenderable, SeriesRule,
    SeriesStylePlanner, SkippedFacet, WellKnownSeries,
};
pub use role::ChartRole;
pub use series_name::{SeriesIdentity, TARGET_NAV_LINE};
pub use shade::{shade, ShadeConfig};
pub use style::{FillStyle, LineDash, LineStyle, MarkerShape, MarkerStyle, SeriesStyle};
