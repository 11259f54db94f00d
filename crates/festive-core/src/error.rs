use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("reseed failed: {0}")]
    SeedFailure(String),

    #[error("festival not found: {0}")]
    FestivalNotFound(String),

    #[error("invalid lag {0}: must be between 1 and 7 days")]
    InvalidLag(i64),

    #[error("dataset is being regenerated; try again once seeding completes")]
    Seeding,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Classification recorded on a panel when a fetch fails.
    pub fn kind(&self) -> FailureKind {
        match self {
            DashboardError::NetworkFailure(_) | DashboardError::Io(_) => {
                FailureKind::NetworkFailure
            }
            DashboardError::BadResponse(_)
            | DashboardError::Json(_)
            | DashboardError::Yaml(_) => FailureKind::BadResponse,
            DashboardError::InvalidRange { .. } | DashboardError::InvalidLag(_) => {
                FailureKind::InvalidRange
            }
            DashboardError::SeedFailure(_) | DashboardError::Seeding => FailureKind::SeedFailure,
            DashboardError::FestivalNotFound(_) => FailureKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

// ---------------------------------------------------------------------------
// FailureKind / ErrorInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NetworkFailure,
    BadResponse,
    InvalidRange,
    SeedFailure,
    NotFound,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NetworkFailure => "network_failure",
            FailureKind::BadResponse => "bad_response",
            FailureKind::InvalidRange => "invalid_range",
            FailureKind::SeedFailure => "seed_failure",
            FailureKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure as stored on a panel dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&DashboardError> for ErrorInfo {
    fn from(err: &DashboardError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
