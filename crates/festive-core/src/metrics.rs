//! Presentation-ready numbers derived from panel payloads.
//!
//! Everything here is a pure function of an already-fetched payload. Nothing
//! is cached: callers recompute on every read so the result can never drift
//! from the dataset that produced it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::registry::FestivalRegistry;
use crate::types::{
    Counterfactual, DateWindow, Festival, Metric, PlatformBreakdown, Summary, TimelinePoint,
};

/// Revenue per unit of social engagement. The denominator is floored at 1
/// so a window without recorded social activity still yields a ratio.
pub fn roi_efficiency(summary: &Summary) -> f64 {
    summary.total_revenue / summary.total_engagement.max(1.0)
}

/// Share of revenue from new customers, as a percentage.
pub fn new_customer_share_pct(summary: &Summary) -> f64 {
    summary.new_vs_repeat_ratio * 100.0
}

/// The executive summary card set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total_revenue: f64,
    pub total_orders: f64,
    pub avg_uplift_pct: f64,
    pub total_engagement: f64,
    pub new_customer_share_pct: f64,
    pub roi_efficiency: f64,
}

pub fn summary_cards(summary: &Summary) -> SummaryCards {
    SummaryCards {
        total_revenue: summary.total_revenue,
        total_orders: summary.total_orders,
        avg_uplift_pct: summary.avg_uplift_pct,
        total_engagement: summary.total_engagement,
        new_customer_share_pct: new_customer_share_pct(summary),
        roi_efficiency: roi_efficiency(summary),
    }
}

// ---------------------------------------------------------------------------
// Counterfactual
// ---------------------------------------------------------------------------

/// Social amplification as reported by the backend. Passed through
/// unchanged; the baseline is never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetSocialImpact {
    pub net_impact_value: f64,
    pub net_impact_pct: f64,
}

pub fn net_social_impact(counterfactual: &Counterfactual) -> NetSocialImpact {
    NetSocialImpact {
        net_impact_value: counterfactual.summary.net_impact_value,
        net_impact_pct: counterfactual.summary.net_impact_pct,
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub a: f64,
    pub b: f64,
}

/// Re-project the timeline through the two selected metrics. Lazy; each
/// row reads one field per selector.
pub fn comparison_rows(
    points: &[TimelinePoint],
    factor_a: Metric,
    factor_b: Metric,
) -> impl Iterator<Item = ComparisonRow> + '_ {
    points.iter().map(move |p| ComparisonRow {
        date: p.date,
        a: p.value(factor_a),
        b: p.value(factor_b),
    })
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: String,
    pub likes_pct: f64,
    pub impressions_pct: f64,
}

/// Each platform's share of the window's likes and impressions. A zero
/// total yields zero shares rather than NaN.
pub fn platform_shares(rows: &[PlatformBreakdown]) -> Vec<PlatformShare> {
    let total_likes: f64 = rows.iter().map(|r| r.likes).sum();
    let total_impressions: f64 = rows.iter().map(|r| r.impressions).sum();
    let pct = |part: f64, total: f64| if total > 0.0 { part / total * 100.0 } else { 0.0 };
    rows.iter()
        .map(|r| PlatformShare {
            platform: r.platform.clone(),
            likes_pct: pct(r.likes, total_likes),
            impressions_pct: pct(r.impressions, total_impressions),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Timeline overlays
// ---------------------------------------------------------------------------

/// Festivals to shade on the timeline for `window`.
pub fn festival_bands<'a>(registry: &'a FestivalRegistry, window: &'a DateWindow) -> Vec<&'a Festival> {
    registry.overlapping(window).collect()
}

/// Days in the series with positive uplift over baseline.
pub fn uplift_days(points: &[TimelinePoint]) -> usize {
    points.iter().filter(|p| p.uplift > 0.0).count()
}
