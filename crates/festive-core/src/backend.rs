//! The seam between the engine and the analytics service.

use chrono::NaiveDate;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashboardError, Result};
use crate::types::{
    Counterfactual, DateWindow, Festival, LagPoint, PlatformBreakdown, SeedAck, Summary,
    TimelinePoint,
};

/// Smallest and largest lag, in days, the lag panel may request.
pub const LAG_RANGE: std::ops::RangeInclusive<i64> = 1..=7;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters for every window-scoped endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<DateWindow> for WindowQuery {
    fn from(w: DateWindow) -> Self {
        Self {
            start_date: w.start,
            end_date: w.end,
        }
    }
}

/// Query parameters for the lag-shifted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LagQuery {
    pub lag: u8,
}

impl LagQuery {
    /// Validate `lag` against [`LAG_RANGE`] before anything is requested.
    pub fn new(lag: i64) -> Result<Self> {
        if !LAG_RANGE.contains(&lag) {
            return Err(DashboardError::InvalidLag(lag));
        }
        Ok(Self { lag: lag as u8 })
    }
}

// ---------------------------------------------------------------------------
// RequestKey
// ---------------------------------------------------------------------------

/// Deterministic serialization of exactly the inputs a panel's request
/// depends on. Two requests with equal keys are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn of<Q: Serialize>(query: &Q) -> Result<Self> {
        Ok(Self(serde_json::to_string(query)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// AnalyticsBackend
// ---------------------------------------------------------------------------

/// Read endpoints plus the destructive reseed of the analytics service.
///
/// Futures are `'static` so orchestrators can spawn them and keep serving
/// the caller while requests are in flight. Implementations classify
/// failures as [`DashboardError::NetworkFailure`] or
/// [`DashboardError::BadResponse`]; no partial results.
pub trait AnalyticsBackend: Send + Sync + 'static {
    fn reseed(&self) -> BoxFuture<'static, Result<SeedAck>>;

    fn festivals(&self) -> BoxFuture<'static, Result<Vec<Festival>>>;

    fn summary(&self, query: WindowQuery) -> BoxFuture<'static, Result<Summary>>;

    fn timeline(&self, query: WindowQuery) -> BoxFuture<'static, Result<Vec<TimelinePoint>>>;

    fn social_breakdown(
        &self,
        query: WindowQuery,
    ) -> BoxFuture<'static, Result<Vec<PlatformBreakdown>>>;

    fn lag_analysis(&self, query: LagQuery) -> BoxFuture<'static, Result<Vec<LagPoint>>>;

    fn counterfactual(&self, query: WindowQuery) -> BoxFuture<'static, Result<Counterfactual>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lag_outside_one_to_seven_is_rejected() {
        assert!(matches!(LagQuery::new(9), Err(DashboardError::InvalidLag(9))));
        assert!(matches!(LagQuery::new(0), Err(DashboardError::InvalidLag(0))));
        assert_eq!(LagQuery::new(7).unwrap().lag, 7);
        assert_eq!(LagQuery::new(1).unwrap().lag, 1);
    }

    #[test]
    fn window_key_is_stable_and_field_ordered() {
        let q = WindowQuery {
            start_date: "2023-10-20".parse().unwrap(),
            end_date: "2023-11-05".parse().unwrap(),
        };
        let key = RequestKey::of(&q).unwrap();
        assert_eq!(
            key.as_str(),
            r#"{"start_date":"2023-10-20","end_date":"2023-11-05"}"#
        );
        assert_eq!(key, RequestKey::of(&q).unwrap());
    }
}
