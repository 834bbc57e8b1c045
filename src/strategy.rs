//! Task-offload strategies and the visual style each one is drawn with.

use plotters::style::RGBColor;
use serde::Serialize;
use std::fmt;

/// A task-offload policy compared across the charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Strategy {
    RoundRobin,
    Random,
    #[serde(rename = "ECP")]
    Ecp,
    EnergyAware,
    Cobra,
}

/// Marker glyph drawn on top of a line series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Triangle,
    Diamond,
    Square,
    Cross,
    Circle,
}

/// Fill pattern drawn inside a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchPattern {
    /// Both diagonals (`xx`)
    DiagonalCross,
    /// Vertical lines (`||`)
    Vertical,
    /// Horizontal lines (`--`)
    Horizontal,
    /// Forward diagonals (`//`)
    Diagonal,
    /// Vertical and horizontal lines (`++`)
    Grid,
    None,
}

/// Color, marker and hatch used for one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    pub marker: MarkerShape,
    pub hatch: HatchPattern,
}

pub const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const DARK_VIOLET: RGBColor = RGBColor(148, 0, 211);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const BLACK: RGBColor = RGBColor(0, 0, 0);

/// Style for labels that don't name a known strategy
pub const FALLBACK_STYLE: SeriesStyle = SeriesStyle {
    color: BLACK,
    marker: MarkerShape::Circle,
    hatch: HatchPattern::None,
};

impl Strategy {
    /// Column order of the offload-time table, and bar order inside a cluster
    pub const ALL: [Strategy; 5] = [
        Strategy::RoundRobin,
        Strategy::Random,
        Strategy::Ecp,
        Strategy::EnergyAware,
        Strategy::Cobra,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::RoundRobin => "RoundRobin",
            Strategy::Random => "Random",
            Strategy::Ecp => "ECP",
            Strategy::EnergyAware => "EnergyAware",
            Strategy::Cobra => "Cobra",
        }
    }

    /// Exact, case-sensitive match on the display name
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == label)
    }

    pub fn style(self) -> SeriesStyle {
        let (color, marker, hatch) = match self {
            Strategy::Cobra => (ROYAL_BLUE, MarkerShape::Triangle, HatchPattern::DiagonalCross),
            Strategy::Ecp => (GREEN, MarkerShape::Diamond, HatchPattern::Vertical),
            Strategy::EnergyAware => (RED, MarkerShape::Square, HatchPattern::Horizontal),
            Strategy::Random => (ORANGE, MarkerShape::Cross, HatchPattern::Diagonal),
            Strategy::RoundRobin => (DARK_VIOLET, MarkerShape::Circle, HatchPattern::Grid),
        };
        SeriesStyle { color, marker, hatch }
    }

    /// Confidence percentage used to size the offload-time error bars
    pub fn confidence_percent(self) -> f64 {
        match self {
            Strategy::Random => 96.0,
            Strategy::RoundRobin => 96.1,
            Strategy::Ecp => 95.8,
            Strategy::EnergyAware => 95.0,
            Strategy::Cobra => 95.6,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Style for an arbitrary series label, falling back to black circles
pub fn style_for_label(label: &str) -> SeriesStyle {
    Strategy::from_label(label)
        .map(Strategy::style)
        .unwrap_or(FALLBACK_STYLE)
}
