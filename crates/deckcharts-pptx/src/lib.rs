//! PPTX chart handling for deckcharts.
//!
//! The crate works on a fully inflated [`PptxPackage`] (part name -> bytes) and exposes:
//!
//! - OPC primitives: relationship resolution, part creation under a numbering template and
//!   relationship allocation ([`opc`], [`relationships`], [`content_types`]).
//! - Chart discovery and cached-data extraction ([`PptxPackage::chart_objects`],
//!   [`chart::extract_chart_data`]).
//! - Chart creation with an embedded workbook ([`PptxPackage::add_chart`]).
//! - Restyling of chart series through the [`deckcharts_model::SeriesStylePlanner`]
//!   ([`chart::restyle_chart`]).
//! - Cross-slide chart cloning with relationship relinking ([`PptxPackage::clone_chart`]).
//!
//! Parts the crate does not understand are carried through byte-for-byte.

pub mod chart;
pub mod clone;
pub mod content_types;
pub mod opc;
mod package;
pub mod path;
pub mod relationships;
pub mod xml;
mod zip_util;

pub use chart::{
    chart_space_xml, extract_chart_data, restyle_chart, ChartData, ChartDataError, ChartFrame,
    ChartObject, ChartSeriesHandle, PlotKind, SeriesValues,
};
pub use clone::{CloneOutcome, CloneStep, CloneWarning};
pub use package::{PptxError, PptxPackage, PptxPackageLimits};
pub use relationships::{Relationship, Relationships};
