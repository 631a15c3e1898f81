//! Chart toggles and the resolved chart specification.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::columns;

/// Most overlays a chart can carry.
pub const MAX_OVERLAYS: usize = 2;
/// Most marks (and thus entries) a chart can carry.
pub const MAX_MARKS: usize = 3;
/// Legend label of the place series in slot 0.
pub const PLACE_LABEL: &str = "Ubicación referida";
/// Default per-slot colors.
pub const DEFAULT_COLORS: [&str; 3] = ["#2f4f4f", "#FF796C", "#6cb6ef"];
/// Default bar width.
pub const DEFAULT_BAR_WIDTH: f64 = 10.5;
/// Default line width.
pub const DEFAULT_LINE_WIDTH: f64 = 4.0;

/// A reference series that can be drawn next to the place rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverlaySeries {
    /// National rate.
    National,
    /// State rate.
    State,
    /// Linear trend of the place rate.
    Trend,
}

impl OverlaySeries {
    /// Returns the table column drawn for this overlay.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::National => columns::NATIONAL_RATE,
            Self::State => columns::STATE_RATE,
            Self::Trend => columns::TREND,
        }
    }

    /// Returns the legend label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::National => "Nacional",
            Self::State => "Entidad",
            Self::Trend => "Tendencia",
        }
    }
}

/// How a chart entry is drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkStyle {
    /// Vertical bars.
    Bar,
    /// Connected line.
    Line,
}

/// Dash pattern of line marks, using matplotlib's notation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum LineStyle {
    /// `-`
    #[default]
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Solid,
    /// `--`
    #[serde(rename = "--")]
    #[strum(serialize = "--")]
    Dashed,
    /// `-.`
    #[serde(rename = "-.")]
    #[strum(serialize = "-.")]
    DashDot,
    /// `:`
    #[serde(rename = ":")]
    #[strum(serialize = ":")]
    Dotted,
    /// No line.
    #[serde(rename = "None")]
    #[strum(serialize = "None")]
    Hidden,
}

/// What the user picked in the chart controls.
///
/// Only the first [`MAX_OVERLAYS`] overlays and [`MAX_MARKS`] marks are
/// honored. Marks apply per slot: slot 0 (the place) uses the first mark,
/// slot 1 the second, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartToggles {
    /// Reference series, in the order picked.
    pub overlays: Vec<OverlaySeries>,
    /// Mark per slot.
    pub marks: Vec<MarkStyle>,
    /// Color per slot.
    pub colors: [String; 3],
    /// Width of bar marks.
    pub bar_width: f64,
    /// Width of line marks.
    pub line_width: f64,
    /// Dash pattern of line marks.
    pub line_style: LineStyle,
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self {
            overlays: Vec::new(),
            marks: vec![MarkStyle::Bar],
            colors: DEFAULT_COLORS.map(str::to_string),
            bar_width: DEFAULT_BAR_WIDTH,
            line_width: DEFAULT_LINE_WIDTH,
            line_style: LineStyle::Solid,
        }
    }
}

/// One drawn series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Series table column.
    pub column: String,
    /// Mark.
    pub mark: MarkStyle,
    /// Color.
    pub color: String,
    /// Legend label.
    pub label: String,
}

/// A bounded, ordered chart description. Entry 0 is always the place rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Chart title.
    pub title: String,
    /// At most [`MAX_MARKS`] entries.
    pub entries: Vec<ChartEntry>,
    /// Width of bar marks.
    pub bar_width: f64,
    /// Width of line marks.
    pub line_width: f64,
    /// Dash pattern of line marks.
    pub line_style: LineStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_map_to_columns_and_labels() {
        assert_eq!(OverlaySeries::National.column(), "tasa_nal");
        assert_eq!(OverlaySeries::State.column(), "tasa_est");
        assert_eq!(OverlaySeries::Trend.column(), "rate_regression");
        assert_eq!(OverlaySeries::Trend.label(), "Tendencia");
        assert_eq!("state".parse::<OverlaySeries>().unwrap(), OverlaySeries::State);
    }

    #[test]
    fn line_styles_use_matplotlib_notation() {
        assert_eq!("-.".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!(LineStyle::Hidden.to_string(), "None");
        assert_eq!(serde_json::to_string(&LineStyle::Dotted).unwrap(), "\":\"");
    }

    #[test]
    fn default_toggles_match_dashboard_defaults() {
        let toggles = ChartToggles::default();
        assert!(toggles.overlays.is_empty());
        assert_eq!(toggles.marks, vec![MarkStyle::Bar]);
        assert_eq!(toggles.colors[1], "#FF796C");
        assert!((toggles.bar_width - 10.5).abs() < f64::EPSILON);
        assert_eq!(toggles.line_style, LineStyle::Solid);
    }
}
