//! The six dashboard panels and the request bindings of the fetching ones.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::{AnalyticsBackend, LagQuery, RequestKey, WindowQuery};
use crate::error::Result;
use crate::filter::FilterState;
use crate::orchestrator::{Orchestrator, Ticket};
use crate::types::{LagPoint, Metric, TimelinePoint};

// ---------------------------------------------------------------------------
// PanelId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    GlobalControls,
    ExecutiveSummary,
    TimelineAnalysis,
    SocialInfluence,
    ComparisonZone,
    LagAnalysis,
    Counterfactual,
}

impl PanelId {
    pub fn all() -> &'static [PanelId] {
        &[
            PanelId::GlobalControls,
            PanelId::ExecutiveSummary,
            PanelId::TimelineAnalysis,
            PanelId::SocialInfluence,
            PanelId::ComparisonZone,
            PanelId::LagAnalysis,
            PanelId::Counterfactual,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PanelId::GlobalControls => "global_controls",
            PanelId::ExecutiveSummary => "executive_summary",
            PanelId::TimelineAnalysis => "timeline_analysis",
            PanelId::SocialInfluence => "social_influence",
            PanelId::ComparisonZone => "comparison_zone",
            PanelId::LagAnalysis => "lag_analysis",
            PanelId::Counterfactual => "counterfactual",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelId::GlobalControls => "Global Controls",
            PanelId::ExecutiveSummary => "Executive Summary",
            PanelId::TimelineAnalysis => "Festive Timeline Analysis",
            PanelId::SocialInfluence => "Social Media Influence",
            PanelId::ComparisonZone => "Interactive Comparison Zone",
            PanelId::LagAnalysis => "Lag & Lead Analysis",
            PanelId::Counterfactual => "Counterfactual Analysis",
        }
    }

    /// Whether the panel issues requests of its own.
    pub fn fetches(self) -> bool {
        !matches!(self, PanelId::GlobalControls)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WindowPanel
// ---------------------------------------------------------------------------

pub(crate) type WindowFetch<T> =
    fn(&dyn AnalyticsBackend, WindowQuery) -> BoxFuture<'static, Result<T>>;

/// A panel keyed on the filter window (`start_date`, `end_date`).
pub struct WindowPanel<T> {
    pub(crate) orchestrator: Orchestrator<T>,
    filter: watch::Receiver<FilterState>,
    fetch: WindowFetch<T>,
}

impl<T> WindowPanel<T> {
    pub(crate) fn new(
        panel: PanelId,
        filter: watch::Receiver<FilterState>,
        fetch: WindowFetch<T>,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(panel),
            filter,
            fetch,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<T> {
        &self.orchestrator
    }

    /// Derive the key from the latest filter snapshot and, if it changed,
    /// return the ticket and the request to run.
    pub(crate) fn prepare(
        &mut self,
        backend: &Arc<dyn AnalyticsBackend>,
    ) -> Result<Option<(Ticket, BoxFuture<'static, Result<T>>)>> {
        let query = WindowQuery::from(self.filter.borrow_and_update().window());
        let key = RequestKey::of(&query)?;
        Ok(self
            .orchestrator
            .begin(key)
            .map(|ticket| (ticket, (self.fetch)(backend.as_ref(), query))))
    }
}

// ---------------------------------------------------------------------------
// LagPanel
// ---------------------------------------------------------------------------

/// The lag panel depends only on its own `lag` parameter.
pub struct LagPanel {
    pub(crate) orchestrator: Orchestrator<Vec<LagPoint>>,
    lag: LagQuery,
}

impl LagPanel {
    pub(crate) fn new(lag: LagQuery) -> Self {
        Self {
            orchestrator: Orchestrator::new(PanelId::LagAnalysis),
            lag,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<Vec<LagPoint>> {
        &self.orchestrator
    }

    pub fn lag(&self) -> u8 {
        self.lag.lag
    }

    /// Validates before touching anything; an out-of-range lag never
    /// reaches the backend and leaves the current lag in place.
    pub(crate) fn set_lag(&mut self, lag: i64) -> Result<()> {
        self.lag = LagQuery::new(lag)?;
        Ok(())
    }

    pub(crate) fn prepare(
        &mut self,
        backend: &Arc<dyn AnalyticsBackend>,
    ) -> Result<Option<(Ticket, BoxFuture<'static, Result<Vec<LagPoint>>>)>> {
        let key = RequestKey::of(&self.lag)?;
        Ok(self
            .orchestrator
            .begin(key)
            .map(|ticket| (ticket, backend.lag_analysis(self.lag))))
    }
}

// ---------------------------------------------------------------------------
// ComparisonPanel
// ---------------------------------------------------------------------------

/// Which of the two comparison selectors to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    A,
    B,
}

/// Timeline data re-projected through two metric selectors. Changing a
/// selector never issues a request.
pub struct ComparisonPanel {
    pub(crate) window: WindowPanel<Vec<TimelinePoint>>,
    factor_a: Metric,
    factor_b: Metric,
}

impl ComparisonPanel {
    pub(crate) fn new(window: WindowPanel<Vec<TimelinePoint>>) -> Self {
        Self {
            window,
            factor_a: Metric::Sales,
            factor_b: Metric::SocialBuzz,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<Vec<TimelinePoint>> {
        self.window.orchestrator()
    }

    pub fn factors(&self) -> (Metric, Metric) {
        (self.factor_a, self.factor_b)
    }

    pub(crate) fn set_factor(&mut self, factor: Factor, metric: Metric) {
        match factor {
            Factor::A => self.factor_a = metric,
            Factor::B => self.factor_b = metric,
        }
    }
}
