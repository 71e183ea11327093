//! Per-series style planning.
//!
//! A styling pass runs in two steps over the series of one chart, in container order:
//!
//! 1. [`ColorAssignment::build`] gives every category a base color in first-seen order.
//! 2. Each series is matched to a [`SeriesRule`] (role × well-known name) and the rule produces
//!    its [`SeriesStyle`], which is then pushed onto the series' [`SeriesRenderable`] handle one
//!    facet at a time.
//!
//! The assignment is rebuilt for every pass; nothing is shared between charts.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::config::StyleConfig;
use crate::series_name::{self, SeriesIdentity, TARGET_NAV_LINE};
use crate::style::{FillStyle, LineDash, LineStyle, MarkerShape, MarkerStyle, SeriesStyle};
use crate::{ChartRole, Palette, Rgb, ShadeConfig};

const CONTRIBUTIONS_COLOR: Rgb = Rgb::from_u32(0xC00000);
const DISTRIBUTIONS_COLOR: Rgb = Rgb::from_u32(0x00B050);
const NET_CASHFLOW_COLOR: Rgb = Rgb::from_u32(0x000000);
const LIQUIDITY_LIMIT_COLOR: Rgb = Rgb::from_u32(0xFF0000);
const TARGET_NAV_COLOR: Rgb = Rgb::from_u32(0x404040);

const AGGREGATE_LINE_WIDTH: u32 = 225;
const SEPARATOR_LINE_WIDTH: u32 = 50;
const DEFAULT_LINE_WIDTH: u32 = 100;

/// Category → base color for one styling pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorAssignment {
    entries: Vec<(String, Rgb)>,
    slots: HashMap<String, usize>,
}

impl ColorAssignment {
    /// Scan series names left to right; each new category (other than the reserved target line)
    /// takes the next palette slot.
    pub fn build<I, S>(names: I, palette: &Palette) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut assignment = Self::default();
        for name in names {
            let name = name.as_ref();
            if series_name::is_reserved(name) {
                continue;
            }
            let category = series_name::decode(name).category;
            if assignment.slots.contains_key(&category) {
                continue;
            }
            let slot = assignment.entries.len();
            let color = palette.color_at(slot as i64);
            assignment.slots.insert(category.clone(), slot);
            assignment.entries.push((category, color));
        }
        assignment
    }

    pub fn color_for(&self, category: &str) -> Option<Rgb> {
        self.slots.get(category).map(|&slot| self.entries[slot].1)
    }

    pub fn slot_of(&self, category: &str) -> Option<usize> {
        self.slots.get(category).copied()
    }

    /// Categories and their colors in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.entries.iter().map(|(category, color)| (category.as_str(), *color))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Series names whose styles are fixed regardless of palette state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSeries {
    Contributions,
    Distributions,
    CumulativeNetCashflow,
    LiquidityLimit,
    TargetNavLine,
}

impl WellKnownSeries {
    pub const ALL: [WellKnownSeries; 5] = [
        WellKnownSeries::Contributions,
        WellKnownSeries::Distributions,
        WellKnownSeries::CumulativeNetCashflow,
        WellKnownSeries::LiquidityLimit,
        WellKnownSeries::TargetNavLine,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            WellKnownSeries::Contributions => "Contributions",
            WellKnownSeries::Distributions => "Distributions",
            WellKnownSeries::CumulativeNetCashflow => "Cumulative Net Cashflow",
            WellKnownSeries::LiquidityLimit => "Liquidity limit",
            WellKnownSeries::TargetNavLine => TARGET_NAV_LINE,
        }
    }

    pub fn style(self) -> SeriesStyle {
        match self {
            WellKnownSeries::Contributions => SeriesStyle {
                fill: Some(FillStyle::solid(CONTRIBUTIONS_COLOR)),
                line: Some(LineStyle::none()),
                marker: None,
            },
            WellKnownSeries::Distributions => SeriesStyle {
                fill: Some(FillStyle::solid(DISTRIBUTIONS_COLOR)),
                line: Some(LineStyle::none()),
                marker: None,
            },
            WellKnownSeries::CumulativeNetCashflow => SeriesStyle {
                fill: Some(FillStyle::None),
                line: Some(LineStyle::solid(NET_CASHFLOW_COLOR, AGGREGATE_LINE_WIDTH)),
                marker: Some(MarkerStyle::filled(MarkerShape::Circle, 5, NET_CASHFLOW_COLOR)),
            },
            WellKnownSeries::LiquidityLimit => SeriesStyle {
                fill: Some(FillStyle::None),
                line: Some(
                    LineStyle::solid(LIQUIDITY_LIMIT_COLOR, 150).with_dash(LineDash::SysDash),
                ),
                marker: Some(MarkerStyle::none()),
            },
            WellKnownSeries::TargetNavLine => SeriesStyle {
                fill: Some(FillStyle::None),
                line: Some(LineStyle::solid(TARGET_NAV_COLOR, 200).with_dash(LineDash::Dash)),
                marker: Some(MarkerStyle::filled(MarkerShape::Circle, 6, TARGET_NAV_COLOR)),
            },
        }
    }
}

/// How one series gets its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRule {
    /// Fixed style for a well-known series name.
    WellKnown(WellKnownSeries),
    /// Category base color shaded by the ordinal.
    Shaded,
    /// Raw palette color at the series' position.
    ByPosition,
}

impl SeriesRule {
    pub fn select(role: ChartRole, name: &str, identity: &SeriesIdentity) -> Self {
        if let Some(known) = WellKnownSeries::from_name(name) {
            return SeriesRule::WellKnown(known);
        }
        match role {
            ChartRole::AggregateLine | ChartRole::BarAllocation => SeriesRule::ByPosition,
            ChartRole::StackedForecastWithTargetLine
            | ChartRole::StackedSubAllocation
            | ChartRole::CashflowPlot => SeriesRule::Shaded,
            ChartRole::Default if identity.has_ordinal() => SeriesRule::Shaded,
            ChartRole::Default => SeriesRule::ByPosition,
        }
    }
}

/// The look a role gives to a series whose color was derived (not fixed).
fn derived_style(role: ChartRole, color: Rgb) -> SeriesStyle {
    match role {
        ChartRole::AggregateLine => SeriesStyle {
            fill: None,
            line: Some(LineStyle::solid(color, AGGREGATE_LINE_WIDTH)),
            marker: Some(MarkerStyle::none()),
        },
        ChartRole::BarAllocation
        | ChartRole::StackedForecastWithTargetLine
        | ChartRole::CashflowPlot => SeriesStyle {
            fill: Some(FillStyle::solid(color)),
            line: Some(LineStyle::none()),
            marker: None,
        },
        ChartRole::StackedSubAllocation => SeriesStyle {
            fill: Some(FillStyle::solid(color)),
            line: Some(LineStyle::solid(Rgb::WHITE, SEPARATOR_LINE_WIDTH)),
            marker: None,
        },
        ChartRole::Default => SeriesStyle {
            fill: Some(FillStyle::solid(color)),
            line: Some(LineStyle::solid(color, DEFAULT_LINE_WIDTH)),
            marker: Some(MarkerStyle::filled(MarkerShape::Circle, 5, color)),
        },
    }
}

/// A visual aspect of a rendered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Fill,
    Line,
    Marker,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Facet::Fill => "fill",
            Facet::Line => "line",
            Facet::Marker => "marker",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("series has no {facet} facet")]
pub struct FacetUnavailable {
    pub facet: Facet,
}

impl FacetUnavailable {
    pub fn new(facet: Facet) -> Self {
        Self { facet }
    }
}

/// A series whose visual facets can be restyled in place.
///
/// Implementations return [`FacetUnavailable`] for facets the underlying series type does not
/// have (e.g. markers on an area series).
pub trait SeriesRenderable {
    fn series_name(&self) -> &str;
    fn set_fill(&mut self, fill: &FillStyle) -> Result<(), FacetUnavailable>;
    fn set_line(&mut self, line: &LineStyle) -> Result<(), FacetUnavailable>;
    fn set_marker(&mut self, marker: &MarkerStyle) -> Result<(), FacetUnavailable>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFacet {
    pub series_index: usize,
    pub series_name: String,
    pub facet: Facet,
}

/// Outcome of [`SeriesStylePlanner::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanReport {
    pub styles: Vec<SeriesStyle>,
    pub skipped: Vec<SkippedFacet>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesStylePlanner {
    palette: Palette,
    shade: ShadeConfig,
}

impl SeriesStylePlanner {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            palette: config.palette,
            shade: config.shade,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn assign_colors<I, S>(&self, names: I) -> ColorAssignment
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ColorAssignment::build(names, &self.palette)
    }

    /// Compute the style of every series without touching any handle.
    pub fn plan_styles<S: AsRef<str>>(&self, role: ChartRole, names: &[S]) -> Vec<SeriesStyle> {
        let assignment = self.assign_colors(names);
        names
            .iter()
            .enumerate()
            .map(|(position, name)| self.style_for(role, &assignment, position, name.as_ref()))
            .collect()
    }

    /// Style every series handle for `role`.
    ///
    /// Facets a handle does not support are skipped and reported; the pass itself never fails.
    pub fn plan<R: SeriesRenderable>(&self, role: ChartRole, series: &mut [R]) -> PlanReport {
        let names: Vec<String> = series.iter().map(|s| s.series_name().to_string()).collect();
        let styles = self.plan_styles(role, names.as_slice());

        let mut skipped = Vec::new();
        for (index, (handle, style)) in series.iter_mut().zip(&styles).enumerate() {
            let results = [
                style.fill.map(|fill| handle.set_fill(&fill)),
                style.line.map(|line| handle.set_line(&line)),
                style.marker.map(|marker| handle.set_marker(&marker)),
            ];
            for err in results.into_iter().flatten().filter_map(Result::err) {
                log::debug!(
                    "skipping {} for series {index} ({:?}): not supported",
                    err.facet,
                    names[index]
                );
                skipped.push(SkippedFacet {
                    series_index: index,
                    series_name: names[index].clone(),
                    facet: err.facet,
                });
            }
        }

        PlanReport { styles, skipped }
    }

    fn style_for(
        &self,
        role: ChartRole,
        assignment: &ColorAssignment,
        position: usize,
        name: &str,
    ) -> SeriesStyle {
        let identity = series_name::decode(name);
        match SeriesRule::select(role, name, &identity) {
            SeriesRule::WellKnown(known) => known.style(),
            SeriesRule::Shaded => {
                let base = assignment
                    .color_for(&identity.category)
                    .unwrap_or_else(|| self.palette.color_at(position as i64));
                derived_style(role, self.shade.shade(base, identity.ordinal))
            }
            SeriesRule::ByPosition => {
                derived_style(role, self.palette.color_at(position as i64))
            }
        }
    }
}
