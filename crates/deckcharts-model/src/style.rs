use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Series area fill (`c:spPr/a:solidFill` or `c:spPr/a:noFill`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FillStyle {
    Solid { color: Rgb },
    None,
}

impl FillStyle {
    pub fn solid(color: Rgb) -> Self {
        FillStyle::Solid { color }
    }

    pub fn color(&self) -> Option<Rgb> {
        match self {
            FillStyle::Solid { color } => Some(*color),
            FillStyle::None => None,
        }
    }
}

/// Line dash style (`a:prstDash`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    Solid,
    Dash,
    Dot,
    DashDot,
    LongDash,
    LongDashDot,
    LongDashDotDot,
    SysDash,
    SysDot,
    SysDashDot,
    SysDashDotDot,
}

impl LineDash {
    /// The `a:prstDash/@val` token.
    pub fn preset(self) -> &'static str {
        match self {
            LineDash::Solid => "solid",
            LineDash::Dash => "dash",
            LineDash::Dot => "dot",
            LineDash::DashDot => "dashDot",
            LineDash::LongDash => "lgDash",
            LineDash::LongDashDot => "lgDashDot",
            LineDash::LongDashDotDot => "lgDashDotDot",
            LineDash::SysDash => "sysDash",
            LineDash::SysDot => "sysDot",
            LineDash::SysDashDot => "sysDashDot",
            LineDash::SysDashDotDot => "sysDashDotDot",
        }
    }

    pub fn from_preset(val: &str) -> Option<Self> {
        Some(match val {
            "solid" => LineDash::Solid,
            "dash" => LineDash::Dash,
            "dot" => LineDash::Dot,
            "dashDot" => LineDash::DashDot,
            "lgDash" => LineDash::LongDash,
            "lgDashDot" => LineDash::LongDashDot,
            "lgDashDotDot" => LineDash::LongDashDotDot,
            "sysDash" => LineDash::SysDash,
            "sysDot" => LineDash::SysDot,
            "sysDashDot" => LineDash::SysDashDot,
            "sysDashDotDot" => LineDash::SysDashDotDot,
            _ => return None,
        })
    }
}

/// Line formatting (`a:ln`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub fill: FillStyle,
    /// Width in 1/100 points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_100pt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<LineDash>,
}

impl LineStyle {
    pub fn solid(color: Rgb, width_100pt: u32) -> Self {
        Self {
            fill: FillStyle::solid(color),
            width_100pt: Some(width_100pt),
            dash: Some(LineDash::Solid),
        }
    }

    /// No visible line (`a:ln/a:noFill`).
    pub fn none() -> Self {
        Self {
            fill: FillStyle::None,
            width_100pt: None,
            dash: None,
        }
    }

    pub fn with_dash(mut self, dash: LineDash) -> Self {
        self.dash = Some(dash);
        self
    }

    /// Width in EMU (`a:ln/@w`); 1pt = 12700 EMU.
    pub fn width_emu(&self) -> Option<u64> {
        self.width_100pt.map(|w| u64::from(w) * 127)
    }
}

/// Marker symbol (`c:marker/c:symbol`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Auto,
    Circle,
    Dash,
    Diamond,
    Dot,
    None,
    Plus,
    Square,
    Star,
    Triangle,
    X,
}

impl MarkerShape {
    pub fn symbol(self) -> &'static str {
        match self {
            MarkerShape::Auto => "auto",
            MarkerShape::Circle => "circle",
            MarkerShape::Dash => "dash",
            MarkerShape::Diamond => "diamond",
            MarkerShape::Dot => "dot",
            MarkerShape::None => "none",
            MarkerShape::Plus => "plus",
            MarkerShape::Square => "square",
            MarkerShape::Star => "star",
            MarkerShape::Triangle => "triangle",
            MarkerShape::X => "x",
        }
    }

    pub fn from_symbol(val: &str) -> Option<Self> {
        Some(match val {
            "auto" => MarkerShape::Auto,
            "circle" => MarkerShape::Circle,
            "dash" => MarkerShape::Dash,
            "diamond" => MarkerShape::Diamond,
            "dot" => MarkerShape::Dot,
            "none" => MarkerShape::None,
            "plus" => MarkerShape::Plus,
            "square" => MarkerShape::Square,
            "star" => MarkerShape::Star,
            "triangle" => MarkerShape::Triangle,
            "x" => MarkerShape::X,
            _ => return None,
        })
    }
}

/// Marker formatting (`c:marker`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    /// Marker size; DrawingML accepts 2..=72.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u8>,
    /// Marker fill; the marker outline uses the same color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
}

impl MarkerStyle {
    pub fn none() -> Self {
        Self {
            shape: MarkerShape::None,
            size: None,
            fill: None,
        }
    }

    pub fn filled(shape: MarkerShape, size: u8, color: Rgb) -> Self {
        Self {
            shape,
            size: Some(size.clamp(2, 72)),
            fill: Some(color),
        }
    }
}

/// The full visual style planned for one series. `None` facets are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
}

impl SeriesStyle {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.line.is_none() && self.marker.is_none()
    }
}
