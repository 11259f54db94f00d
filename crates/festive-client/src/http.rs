use std::time::Duration;

use festive_core::backend::{AnalyticsBackend, LagQuery, WindowQuery};
use festive_core::types::{
    Counterfactual, Festival, LagPoint, PlatformBreakdown, SeedAck, Summary, TimelinePoint,
};
use festive_core::{DashboardConfig, DashboardError, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use crate::error;

pub const SEED: &str = "/seed";
pub const FESTIVALS: &str = "/festivals";
pub const SUMMARY: &str = "/summary";
pub const TIMELINE: &str = "/timeline";
pub const SOCIAL_BREAKDOWN: &str = "/social-breakdown";
pub const LAG_ANALYSIS: &str = "/lag-analysis";
pub const COUNTERFACTUAL: &str = "/counterfactual";

/// [`AnalyticsBackend`] over the analytics service's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::NetworkFailure(format!("building http client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    fn send<T>(
        &self,
        route: &'static str,
        request: reqwest::RequestBuilder,
    ) -> BoxFuture<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        async move {
            tracing::debug!(route, "backend request");
            let response = request.send().await.map_err(|e| error::transport(route, e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| error::transport(route, e))?;
            if !status.is_success() {
                return Err(error::status(route, status, &body));
            }
            serde_json::from_str(&body).map_err(|e| error::decode(route, e))
        }
        .boxed()
    }

    fn get_window<T>(&self, route: &'static str, query: WindowQuery) -> BoxFuture<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self.client.get(self.url(route)).query(&query);
        self.send(route, request)
    }
}

impl AnalyticsBackend for HttpBackend {
    fn reseed(&self) -> BoxFuture<'static, Result<SeedAck>> {
        let request = self.client.post(self.url(SEED));
        self.send(SEED, request)
    }

    fn festivals(&self) -> BoxFuture<'static, Result<Vec<Festival>>> {
        let request = self.client.get(self.url(FESTIVALS));
        self.send(FESTIVALS, request)
    }

    fn summary(&self, query: WindowQuery) -> BoxFuture<'static, Result<Summary>> {
        self.get_window(SUMMARY, query)
    }

    fn timeline(&self, query: WindowQuery) -> BoxFuture<'static, Result<Vec<TimelinePoint>>> {
        self.get_window(TIMELINE, query)
    }

    fn social_breakdown(
        &self,
        query: WindowQuery,
    ) -> BoxFuture<'static, Result<Vec<PlatformBreakdown>>> {
        self.get_window(SOCIAL_BREAKDOWN, query)
    }

    fn lag_analysis(&self, query: LagQuery) -> BoxFuture<'static, Result<Vec<LagPoint>>> {
        let request = self.client.get(self.url(LAG_ANALYSIS)).query(&query);
        self.send(LAG_ANALYSIS, request)
    }

    fn counterfactual(&self, query: WindowQuery) -> BoxFuture<'static, Result<Counterfactual>> {
        self.get_window(COUNTERFACTUAL, query)
    }
}
