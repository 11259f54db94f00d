use festive_core::DashboardError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Longest body excerpt carried in a `BadResponse` message.
const BODY_EXCERPT: usize = 200;

/// The backend reports failures as `{"error": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Transport-level failures: the request never produced a usable response.
pub(crate) fn transport(route: &str, err: reqwest::Error) -> DashboardError {
    let what = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    DashboardError::NetworkFailure(format!("{route}: {what}: {err}"))
}

pub(crate) fn status(route: &str, status: StatusCode, body: &str) -> DashboardError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => excerpt(body),
    };
    DashboardError::BadResponse(format!("{route}: HTTP {status}: {detail}"))
}

pub(crate) fn decode(route: &str, err: serde_json::Error) -> DashboardError {
    DashboardError::BadResponse(format!("{route}: unexpected payload: {err}"))
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
