//! The engine: one filter store, one festival registry, one orchestrator per
//! fetching panel, and the completion channel that ties them together.
//!
//! `Dashboard` is the single writer of everything it owns. Requests run on
//! spawned tasks; their results come back over an mpsc channel and are
//! applied on the caller's task by [`Dashboard::next_completion`] or
//! [`Dashboard::settle`]. Nothing blocks the caller while requests are in
//! flight.

use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::backend::{AnalyticsBackend, LagQuery, RequestKey};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::{FilterChange, FilterPatch, FilterState, FilterStore};
use crate::metrics::{self, ComparisonRow};
use crate::orchestrator::{Orchestrator, PanelDataset, PanelStatus, Resolution, Ticket};
use crate::panel::{ComparisonPanel, Factor, LagPanel, PanelId, WindowPanel};
use crate::registry::FestivalRegistry;
use crate::types::{
    Counterfactual, Festival, LagPoint, Metric, PlatformBreakdown, Summary, TimelinePoint,
};

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

pub(crate) struct Panels {
    pub(crate) summary: WindowPanel<Summary>,
    pub(crate) timeline: WindowPanel<Vec<TimelinePoint>>,
    pub(crate) social: WindowPanel<Vec<PlatformBreakdown>>,
    pub(crate) comparison: ComparisonPanel,
    pub(crate) lag: LagPanel,
    pub(crate) counterfactual: WindowPanel<Counterfactual>,
}

impl Panels {
    fn new(filter: &FilterStore, lag: LagQuery) -> Self {
        Self {
            summary: WindowPanel::new(PanelId::ExecutiveSummary, filter.subscribe(), |b, q| {
                b.summary(q)
            }),
            timeline: WindowPanel::new(PanelId::TimelineAnalysis, filter.subscribe(), |b, q| {
                b.timeline(q)
            }),
            social: WindowPanel::new(PanelId::SocialInfluence, filter.subscribe(), |b, q| {
                b.social_breakdown(q)
            }),
            comparison: ComparisonPanel::new(WindowPanel::new(
                PanelId::ComparisonZone,
                filter.subscribe(),
                |b, q| b.timeline(q),
            )),
            lag: LagPanel::new(lag),
            counterfactual: WindowPanel::new(PanelId::Counterfactual, filter.subscribe(), |b, q| {
                b.counterfactual(q)
            }),
        }
    }

    pub(crate) fn invalidate(&mut self, generation: u64) {
        self.summary.orchestrator.invalidate(generation);
        self.timeline.orchestrator.invalidate(generation);
        self.social.orchestrator.invalidate(generation);
        self.comparison.window.orchestrator.invalidate(generation);
        self.lag.orchestrator.invalidate(generation);
        self.counterfactual.orchestrator.invalidate(generation);
    }

    fn status(&self, panel: PanelId) -> Option<PanelStatus> {
        Some(match panel {
            PanelId::GlobalControls => return None,
            PanelId::ExecutiveSummary => self.summary.orchestrator.dataset().status,
            PanelId::TimelineAnalysis => self.timeline.orchestrator.dataset().status,
            PanelId::SocialInfluence => self.social.orchestrator.dataset().status,
            PanelId::ComparisonZone => self.comparison.window.orchestrator.dataset().status,
            PanelId::LagAnalysis => self.lag.orchestrator.dataset().status,
            PanelId::Counterfactual => self.counterfactual.orchestrator.dataset().status,
        })
    }
}

fn summary_slot(p: &mut Panels) -> &mut Orchestrator<Summary> {
    &mut p.summary.orchestrator
}

fn timeline_slot(p: &mut Panels) -> &mut Orchestrator<Vec<TimelinePoint>> {
    &mut p.timeline.orchestrator
}

fn social_slot(p: &mut Panels) -> &mut Orchestrator<Vec<PlatformBreakdown>> {
    &mut p.social.orchestrator
}

fn comparison_slot(p: &mut Panels) -> &mut Orchestrator<Vec<TimelinePoint>> {
    &mut p.comparison.window.orchestrator
}

fn lag_slot(p: &mut Panels) -> &mut Orchestrator<Vec<LagPoint>> {
    &mut p.lag.orchestrator
}

fn counterfactual_slot(p: &mut Panels) -> &mut Orchestrator<Counterfactual> {
    &mut p.counterfactual.orchestrator
}

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

type ApplyFn = Box<dyn FnOnce(&mut Panels) -> Resolution + Send>;

struct Completion {
    ticket: Ticket,
    apply: ApplyFn,
}

/// What [`Dashboard::next_completion`] did with one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub panel: PanelId,
    pub key: RequestKey,
    pub generation: u64,
    pub resolution: Resolution,
}

/// Everything the global controls render. Reads the registry only.
#[derive(Debug, Clone, Serialize)]
pub struct ControlsView<'a> {
    pub festivals: &'a [Festival],
    pub filter: FilterState,
    pub seeding: bool,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    pub(crate) backend: Arc<dyn AnalyticsBackend>,
    pub(crate) filter: FilterStore,
    pub(crate) registry: FestivalRegistry,
    pub(crate) panels: Panels,
    pub(crate) generation: u64,
    pub(crate) seeding: watch::Sender<bool>,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl Dashboard {
    /// Build an engine in its initial state: default window, every panel
    /// idle, empty registry. Nothing is requested until
    /// [`load_festivals`](Self::load_festivals) / [`refresh`](Self::refresh).
    pub fn new(backend: Arc<dyn AnalyticsBackend>, config: &DashboardConfig) -> Result<Self> {
        let filter = FilterStore::new(config.checked_default_window()?);
        let panels = Panels::new(&filter, LagQuery::new(config.default_lag)?);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (seeding, _) = watch::channel(false);
        Ok(Self {
            backend,
            filter,
            registry: FestivalRegistry::default(),
            panels,
            generation: 0,
            seeding,
            in_flight: 0,
            completions_tx,
            completions_rx,
        })
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Fetch the festival listing and replace the registry. On failure the
    /// previous registry is kept.
    pub async fn load_festivals(&mut self) -> Result<usize> {
        self.ensure_not_seeding()?;
        let festivals = self.backend.festivals().await?;
        self.registry = FestivalRegistry::from_festivals(festivals)?;
        self.filter.realign(&self.registry);
        tracing::info!(count = self.registry.len(), "festival registry loaded");
        Ok(self.registry.len())
    }

    pub fn registry(&self) -> &FestivalRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    pub fn filter(&self) -> FilterState {
        self.filter.snapshot()
    }

    /// The single mutation entry point for the filter. Panels whose request
    /// key changed re-fetch; the rest are left alone.
    pub fn apply_filter_change(&mut self, patch: FilterPatch) -> Result<FilterChange> {
        self.ensure_not_seeding()?;
        let change = self.filter.apply(patch, &self.registry)?;
        if change.changed() {
            self.refresh()?;
        }
        Ok(change)
    }

    pub fn reset_filters(&mut self) -> Result<FilterChange> {
        self.ensure_not_seeding()?;
        let change = self.filter.reset();
        if change.changed() {
            self.refresh()?;
        }
        Ok(change)
    }

    // -----------------------------------------------------------------------
    // Panel-local parameters
    // -----------------------------------------------------------------------

    /// Change the lag panel's lag. Out-of-range values are rejected before
    /// any request is issued. Only the lag panel re-fetches.
    pub fn set_lag(&mut self, lag: i64) -> Result<()> {
        self.ensure_not_seeding()?;
        self.panels.lag.set_lag(lag)?;
        if let Some((ticket, request)) = self.panels.lag.prepare(&self.backend)? {
            self.dispatch(ticket, request, lag_slot);
        }
        Ok(())
    }

    pub fn lag(&self) -> u8 {
        self.panels.lag.lag()
    }

    /// Switch a comparison selector. Re-projects the data already held; never
    /// issues a request.
    pub fn set_comparison_factor(&mut self, factor: Factor, metric: Metric) {
        self.panels.comparison.set_factor(factor, metric);
    }

    pub fn comparison_factors(&self) -> (Metric, Metric) {
        self.panels.comparison.factors()
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Issue a request for every panel whose key changed (or which is idle).
    /// Returns the number of requests issued. Must run inside a Tokio runtime.
    pub fn refresh(&mut self) -> Result<usize> {
        self.ensure_not_seeding()?;
        let mut issued = 0;

        if let Some((ticket, request)) = self.panels.summary.prepare(&self.backend)? {
            self.dispatch(ticket, request, summary_slot);
            issued += 1;
        }
        if let Some((ticket, request)) = self.panels.timeline.prepare(&self.backend)? {
            self.dispatch(ticket, request, timeline_slot);
            issued += 1;
        }
        if let Some((ticket, request)) = self.panels.social.prepare(&self.backend)? {
            self.dispatch(ticket, request, social_slot);
            issued += 1;
        }
        if let Some((ticket, request)) = self.panels.comparison.window.prepare(&self.backend)? {
            self.dispatch(ticket, request, comparison_slot);
            issued += 1;
        }
        if let Some((ticket, request)) = self.panels.lag.prepare(&self.backend)? {
            self.dispatch(ticket, request, lag_slot);
            issued += 1;
        }
        if let Some((ticket, request)) = self.panels.counterfactual.prepare(&self.backend)? {
            self.dispatch(ticket, request, counterfactual_slot);
            issued += 1;
        }

        Ok(issued)
    }

    fn dispatch<T: Send + 'static>(
        &mut self,
        ticket: Ticket,
        request: BoxFuture<'static, Result<T>>,
        slot: fn(&mut Panels) -> &mut Orchestrator<T>,
    ) {
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = request.await;
            let apply_ticket = ticket.clone();
            let apply: ApplyFn = Box::new(move |panels| slot(panels).resolve(&apply_ticket, outcome));
            // The receiver lives as long as the dashboard; a send error only
            // means the dashboard was dropped.
            let _ = tx.send(Completion { ticket, apply });
        });
    }

    /// Requests issued but not yet applied, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next response and reconcile it. `None` when nothing is
    /// in flight.
    pub async fn next_completion(&mut self) -> Option<CompletionReport> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        let resolution = (completion.apply)(&mut self.panels);
        Some(CompletionReport {
            panel: completion.ticket.panel,
            key: completion.ticket.key,
            generation: completion.ticket.generation,
            resolution,
        })
    }

    /// Apply responses until no panel is loading. Stale responses that are
    /// still outstanding afterwards stay queued.
    pub async fn settle(&mut self) -> Vec<CompletionReport> {
        let mut reports = Vec::new();
        while self.any_loading() {
            match self.next_completion().await {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    pub fn any_loading(&self) -> bool {
        PanelId::all()
            .iter()
            .any(|p| self.panels.status(*p) == Some(PanelStatus::Loading))
    }

    pub fn panel_status(&self, panel: PanelId) -> Option<PanelStatus> {
        self.panels.status(panel)
    }

    // -----------------------------------------------------------------------
    // Panel views
    // -----------------------------------------------------------------------

    pub fn controls(&self) -> ControlsView<'_> {
        ControlsView {
            festivals: self.registry.as_slice(),
            filter: self.filter.snapshot(),
            seeding: self.is_seeding(),
        }
    }

    pub fn summary(&self) -> &PanelDataset<Summary> {
        self.panels.summary.orchestrator.dataset()
    }

    pub fn timeline(&self) -> &PanelDataset<Vec<TimelinePoint>> {
        self.panels.timeline.orchestrator.dataset()
    }

    pub fn social(&self) -> &PanelDataset<Vec<PlatformBreakdown>> {
        self.panels.social.orchestrator.dataset()
    }

    pub fn comparison(&self) -> &PanelDataset<Vec<TimelinePoint>> {
        self.panels.comparison.orchestrator().dataset()
    }

    pub fn lag_series(&self) -> &PanelDataset<Vec<LagPoint>> {
        self.panels.lag.orchestrator().dataset()
    }

    pub fn counterfactual(&self) -> &PanelDataset<Counterfactual> {
        self.panels.counterfactual.orchestrator.dataset()
    }

    /// The comparison timeline projected through the current selectors.
    pub fn comparison_rows(&self) -> Vec<ComparisonRow> {
        let (a, b) = self.comparison_factors();
        self.comparison()
            .payload()
            .map(|points| metrics::comparison_rows(points, a, b).collect())
            .unwrap_or_default()
    }

    /// Festivals intersecting the active window, for the timeline overlay.
    pub fn festival_bands(&self) -> Vec<Festival> {
        let window = self.filter.snapshot().window();
        metrics::festival_bands(&self.registry, &window)
            .into_iter()
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Seeding barrier
    // -----------------------------------------------------------------------

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_seeding(&self) -> bool {
        *self.seeding.borrow()
    }

    /// Observe the process-wide `seeding` flag.
    pub fn subscribe_seeding(&self) -> watch::Receiver<bool> {
        self.seeding.subscribe()
    }

    fn ensure_not_seeding(&self) -> Result<()> {
        if self.is_seeding() {
            return Err(DashboardError::Seeding);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{window_key, Endpoint, FakeBackend};
    use crate::types::Selection;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn ready_dashboard(fake: &FakeBackend) -> Dashboard {
        let mut dash = Dashboard::new(Arc::new(fake.clone()), &DashboardConfig::default()).unwrap();
        dash.load_festivals().await.unwrap();
        assert_eq!(dash.refresh().unwrap(), 6);
        dash.settle().await;
        dash
    }

    #[tokio::test]
    async fn new_dashboard_is_idle_until_refresh() {
        let fake = FakeBackend::new();
        let dash = Dashboard::new(Arc::new(fake.clone()), &DashboardConfig::default()).unwrap();
        for panel in PanelId::all().iter().filter(|p| p.fetches()) {
            assert_eq!(dash.panel_status(*panel), Some(PanelStatus::Idle));
        }
        assert_eq!(dash.panel_status(PanelId::GlobalControls), None);
        assert_eq!(fake.total_data_calls(), 0);
    }

    #[tokio::test]
    async fn refresh_loads_every_panel_once() {
        let fake = FakeBackend::new();
        let dash = ready_dashboard(&fake).await;
        assert_eq!(dash.summary().status, PanelStatus::Ready);
        assert_eq!(dash.lag_series().status, PanelStatus::Ready);
        assert_eq!(dash.counterfactual().status, PanelStatus::Ready);
        assert_eq!(fake.calls(Endpoint::Timeline), 2);
        assert_eq!(fake.calls(Endpoint::Summary), 1);
        assert_eq!(dash.in_flight(), 0);
        // 365-day default window
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 365_000.0);
    }

    #[tokio::test]
    async fn festival_selection_refetches_window_panels_only() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let change = dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        assert_eq!(change.current.start_date, d("2023-10-20"));
        dash.settle().await;

        assert_eq!(fake.calls(Endpoint::Summary), 2);
        assert_eq!(fake.calls(Endpoint::Lag), 1);
        assert_eq!(
            dash.summary().key.as_ref().unwrap(),
            &window_key("2023-10-20", "2023-11-05")
        );
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 17_000.0);
    }

    #[tokio::test]
    async fn platform_change_issues_no_requests() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let before = fake.total_data_calls();
        let change = dash
            .apply_filter_change(FilterPatch::default().with_platform("Instagram"))
            .unwrap();
        assert!(change.changed());
        assert_eq!(dash.in_flight(), 0);
        assert_eq!(fake.total_data_calls(), before);
    }

    #[tokio::test]
    async fn late_response_for_old_key_is_discarded() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;

        let k1 = window_key("2023-10-20", "2023-11-05");
        let gate = fake.hold(k1.as_str());
        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        dash.apply_filter_change(FilterPatch::dates(d("2023-03-01"), d("2023-03-31")))
            .unwrap();

        // K2 resolves while K1 is still held.
        dash.settle().await;
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 31_000.0);

        gate.add_permits(1);
        let mut stale = 0;
        while let Some(report) = dash.next_completion().await {
            assert_eq!(report.key, k1);
            assert_eq!(report.resolution, Resolution::Stale);
            stale += 1;
        }
        assert_eq!(stale, 5);

        let k2 = window_key("2023-03-01", "2023-03-31");
        assert_eq!(dash.summary().key.as_ref(), Some(&k2));
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 31_000.0);
        assert_eq!(dash.timeline().payload().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn late_failure_for_reselected_festival_is_discarded() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let diwali = window_key("2023-10-20", "2023-11-05");

        let first = fake.hold(diwali.as_str());
        fake.fail_next(Endpoint::Summary, crate::error::FailureKind::NetworkFailure);
        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        dash.apply_filter_change(FilterPatch::dates(d("2023-03-01"), d("2023-03-31")))
            .unwrap();
        dash.settle().await;

        // Back to Diwali: same key as the request still held above.
        let second = fake.hold(diwali.as_str());
        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        second.add_permits(1);
        dash.settle().await;
        assert_eq!(dash.summary().status, PanelStatus::Ready);
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 17_000.0);

        first.add_permits(1);
        let mut stale = 0;
        while let Some(report) = dash.next_completion().await {
            assert_eq!(report.key, diwali);
            assert_eq!(report.resolution, Resolution::Stale);
            stale += 1;
        }
        assert_eq!(stale, 5);
        assert_eq!(dash.summary().status, PanelStatus::Ready);
        assert!(dash.summary().error.is_none());
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 17_000.0);
    }

    #[tokio::test]
    async fn failing_panel_keeps_data_and_spares_siblings() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        fake.fail_next(Endpoint::Summary, crate::error::FailureKind::NetworkFailure);

        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        dash.settle().await;

        let summary = dash.summary();
        assert_eq!(summary.status, PanelStatus::Error);
        assert_eq!(
            summary.error.as_ref().unwrap().kind,
            crate::error::FailureKind::NetworkFailure
        );
        // last-known-good from the full-year window
        assert_eq!(summary.payload().unwrap().total_revenue, 365_000.0);
        assert_eq!(dash.timeline().status, PanelStatus::Ready);
        assert_eq!(dash.timeline().payload().unwrap().len(), 17);
    }

    #[tokio::test]
    async fn invalid_range_never_reaches_panels() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let before = fake.total_data_calls();
        let err = dash
            .apply_filter_change(FilterPatch::default().with_start(d("2024-06-01")))
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));
        assert_eq!(fake.total_data_calls(), before);
        assert_eq!(dash.summary().status, PanelStatus::Ready);
    }

    #[tokio::test]
    async fn out_of_range_lag_is_rejected_before_request() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let err = dash.set_lag(9).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidLag(9)));
        assert_eq!(dash.lag(), 3);
        assert_eq!(fake.calls(Endpoint::Lag), 1);
        assert_eq!(dash.in_flight(), 0);
    }

    #[tokio::test]
    async fn lag_change_refetches_lag_panel_only() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let before = fake.total_data_calls();
        dash.set_lag(5).unwrap();
        assert_eq!(dash.in_flight(), 1);
        dash.settle().await;
        assert_eq!(fake.calls(Endpoint::Lag), 2);
        assert_eq!(fake.total_data_calls(), before + 1);
        assert_eq!(fake.last_lag(), Some(5));
    }

    #[tokio::test]
    async fn lag_change_after_reseed_leaves_window_panels_idle() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        dash.reseed().await.unwrap();
        let before = fake.total_data_calls();

        dash.set_lag(2).unwrap();
        assert_eq!(dash.in_flight(), 1);
        dash.settle().await;

        assert_eq!(fake.total_data_calls(), before + 1);
        assert_eq!(dash.lag_series().status, PanelStatus::Ready);
        assert_eq!(dash.summary().status, PanelStatus::Idle);
        assert_eq!(dash.timeline().status, PanelStatus::Idle);
    }

    #[tokio::test]
    async fn switching_comparison_factor_never_refetches() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        let before = fake.total_data_calls();

        let rows = dash.comparison_rows();
        let first_sales = rows[0].a;
        dash.set_comparison_factor(Factor::A, Metric::Uplift);
        dash.set_comparison_factor(Factor::B, Metric::Sales);

        assert_eq!(dash.comparison_factors(), (Metric::Uplift, Metric::Sales));
        assert_eq!(dash.in_flight(), 0);
        assert_eq!(fake.total_data_calls(), before);
        let rows = dash.comparison_rows();
        assert_eq!(rows[0].b, first_sales);
    }

    #[tokio::test]
    async fn festival_bands_follow_window() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        assert_eq!(dash.festival_bands().len(), 2);
        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        let bands = dash.festival_bands();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].name, "Diwali");
    }

    #[tokio::test]
    async fn controls_view_reads_registry() {
        let fake = FakeBackend::new();
        let dash = ready_dashboard(&fake).await;
        let view = dash.controls();
        assert_eq!(view.festivals.len(), 2);
        assert_eq!(view.filter.selected_festival_id, Selection::All);
        assert!(!view.seeding);
    }

    #[tokio::test]
    async fn reset_returns_to_default_and_refetches() {
        let fake = FakeBackend::new();
        let mut dash = ready_dashboard(&fake).await;
        dash.apply_filter_change(FilterPatch::festival("7")).unwrap();
        dash.settle().await;
        let change = dash.reset_filters().unwrap();
        assert!(change.changed());
        dash.settle().await;
        assert_eq!(dash.summary().payload().unwrap().total_revenue, 365_000.0);
        assert_eq!(fake.calls(Endpoint::Summary), 3);
    }
}
