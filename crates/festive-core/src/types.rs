use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Either the `all` sentinel or a concrete identifier.
///
/// Used for both the festival selection and the platform filter. On the wire
/// and in request keys it is a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub const ALL: &'static str = "all";

    pub fn only(id: impl Into<String>) -> Self {
        Selection::from(id.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => Self::ALL,
            Selection::Only(id) => id,
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        if s == Self::ALL {
            Selection::All
        } else {
            Selection::Only(s)
        }
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        Selection::from(s.to_string())
    }
}

impl From<Selection> for String {
    fn from(s: Selection) -> Self {
        match s {
            Selection::All => Selection::ALL.to_string(),
            Selection::Only(id) => id,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DateWindow
// ---------------------------------------------------------------------------

/// An inclusive `[start, end]` calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &DateWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Festival
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Festival {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Festival {
    pub fn window(&self) -> Result<DateWindow> {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// The backend keys festivals by integer; everything downstream compares ids
/// as strings.
fn id_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Window-scoped aggregate KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_revenue: f64,
    pub total_orders: f64,
    pub avg_uplift_pct: f64,
    pub total_engagement: f64,
    pub new_vs_repeat_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub sales: f64,
    pub social_buzz: f64,
    pub uplift: f64,
}

impl TimelinePoint {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sales => self.sales,
            Metric::SocialBuzz => self.social_buzz,
            Metric::Uplift => self.uplift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub likes: f64,
    pub impressions: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagPoint {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub shifted_buzz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualSummary {
    pub net_impact_value: f64,
    pub net_impact_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_baseline: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualPoint {
    pub date: NaiveDate,
    pub actual_sales: f64,
    pub baseline_sales: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterfactual {
    pub summary: CounterfactualSummary,
    pub chart_data: Vec<CounterfactualPoint>,
}

/// Acknowledgement of the destructive reseed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedAck {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A field of the timeline series selectable in the comparison panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sales,
    SocialBuzz,
    Uplift,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[Metric::Sales, Metric::SocialBuzz, Metric::Uplift]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Sales => "sales",
            Metric::SocialBuzz => "social_buzz",
            Metric::Uplift => "uplift",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Sales => "Daily Revenue",
            Metric::SocialBuzz => "Social Buzz Index",
            Metric::Uplift => "Sales Uplift %",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Metric::Sales),
            "social_buzz" => Ok(Metric::SocialBuzz),
            "uplift" => Ok(Metric::Uplift),
            _ => Err(format!(
                "unknown metric '{s}' (expected sales, social_buzz or uplift)"
            )),
        }
    }
}
