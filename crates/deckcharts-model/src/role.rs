use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a chart shows, which selects the styling rule set for its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRole {
    /// Lines of aggregated totals; series colored by position.
    AggregateLine,
    /// Allocation bars; series colored by position.
    BarAllocation,
    /// Stacked forecast areas with a target NAV line on top.
    StackedForecastWithTargetLine,
    /// Stacked areas split per sub-allocation, separated by thin white lines.
    StackedSubAllocation,
    /// Contribution/distribution bars with a cumulative net cashflow line.
    CashflowPlot,
    #[default]
    Default,
}

impl ChartRole {
    pub const ALL: [ChartRole; 6] = [
        ChartRole::AggregateLine,
        ChartRole::BarAllocation,
        ChartRole::StackedForecastWithTargetLine,
        ChartRole::StackedSubAllocation,
        ChartRole::CashflowPlot,
        ChartRole::Default,
    ];

    /// Map a role tag to a role. Case, surrounding whitespace and `-`/` `/`_` separators are
    /// ignored; anything unrecognized is [`ChartRole::Default`].
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        Self::ALL
            .into_iter()
            .find(|role| role.tag() == normalized)
            .unwrap_or_else(|| {
                log::debug!("unrecognized chart role {tag:?}; using default rules");
                ChartRole::Default
            })
    }

    pub fn tag(self) -> &'static str {
        match self {
            ChartRole::AggregateLine => "aggregate_line",
            ChartRole::BarAllocation => "bar_allocation",
            ChartRole::StackedForecastWithTargetLine => "stacked_forecast_with_target_line",
            ChartRole::StackedSubAllocation => "stacked_sub_allocation",
            ChartRole::CashflowPlot => "cashflow_plot",
            ChartRole::Default => "default",
        }
    }
}

impl fmt::Display for ChartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ChartRole {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}
