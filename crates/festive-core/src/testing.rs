//! In-memory backend for engine tests. Payloads are derived from the query
//! so assertions can tell which window produced them.

use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::backend::{AnalyticsBackend, LagQuery, RequestKey, WindowQuery};
use crate::error::{DashboardError, FailureKind, Result};
use crate::types::{
    Counterfactual, CounterfactualPoint, CounterfactualSummary, DateWindow, Festival, LagPoint,
    PlatformBreakdown, SeedAck, Summary, TimelinePoint,
};

/// Gate name that holds `reseed` calls.
pub const RESEED_GATE: &str = "reseed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Reseed,
    Festivals,
    Summary,
    Timeline,
    Social,
    Lag,
    Counterfactual,
}

impl Endpoint {
    fn is_data(self) -> bool {
        !matches!(self, Endpoint::Reseed | Endpoint::Festivals)
    }
}

pub fn window_key(start: &str, end: &str) -> RequestKey {
    RequestKey::of(&WindowQuery {
        start_date: start.parse().unwrap(),
        end_date: end.parse().unwrap(),
    })
    .unwrap()
}

pub fn festival(id: &str, name: &str, start: &str, end: &str) -> Festival {
    Festival {
        id: id.to_string(),
        name: name.to_string(),
        start_date: start.parse().unwrap(),
        end_date: end.parse().unwrap(),
    }
}

#[derive(Default)]
struct FakeState {
    festivals: Mutex<Vec<Festival>>,
    festivals_after_reseed: Mutex<Option<Vec<Festival>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    failures: Mutex<HashMap<Endpoint, VecDeque<FailureKind>>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    last_lag: Mutex<Option<u8>>,
    reseeds: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<FakeState>,
}

impl FakeBackend {
    /// Holi and Diwali 2023.
    pub fn new() -> Self {
        Self::with_festivals(vec![
            festival("3", "Holi", "2023-03-07", "2023-03-09"),
            festival("7", "Diwali", "2023-10-20", "2023-11-05"),
        ])
    }

    pub fn with_festivals(festivals: Vec<Festival>) -> Self {
        let state = FakeState::default();
        *state.festivals.lock().unwrap() = festivals;
        Self {
            state: Arc::new(state),
        }
    }

    /// Replace the festival listing once the next reseed succeeds.
    pub fn after_reseed(&self, festivals: Vec<Festival>) {
        *self.state.festivals_after_reseed.lock().unwrap() = Some(festivals);
    }

    /// Hold every call keyed `key` (a request key, or [`RESEED_GATE`]) until
    /// the returned semaphore gets a permit.
    pub fn hold(&self, key: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.state
            .gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    pub fn fail_next(&self, endpoint: Endpoint, kind: FailureKind) {
        self.state
            .failures
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(kind);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state
            .calls
            .lock()
            .unwrap()
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_data_calls(&self) -> usize {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e.is_data())
            .map(|(_, n)| n)
            .sum()
    }

    pub fn last_lag(&self) -> Option<u8> {
        *self.state.last_lag.lock().unwrap()
    }

    pub fn reseeds(&self) -> usize {
        self.state.reseeds.load(Ordering::SeqCst)
    }

    /// Record the call and capture everything the response needs up front,
    /// so a later `hold` cannot affect a request already issued.
    fn call<T, F>(&self, endpoint: Endpoint, gate_key: &str, make: F) -> BoxFuture<'static, Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&FakeState) -> T + Send + 'static,
    {
        *self.state.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
        let gate = self.state.gates.lock().unwrap().get(gate_key).cloned();
        let failure = self
            .state
            .failures
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(|q| q.pop_front());
        let state = self.state.clone();
        async move {
            if let Some(gate) = gate {
                let _permit = gate.acquire().await.unwrap();
            }
            match failure {
                Some(kind) => Err(error_of(kind, endpoint)),
                None => Ok(make(&state)),
            }
        }
        .boxed()
    }
}

fn error_of(kind: FailureKind, endpoint: Endpoint) -> DashboardError {
    let msg = format!("{endpoint:?} scripted failure");
    match kind {
        FailureKind::NetworkFailure => DashboardError::NetworkFailure(msg),
        FailureKind::BadResponse => DashboardError::BadResponse(msg),
        FailureKind::SeedFailure => DashboardError::SeedFailure(msg),
        FailureKind::InvalidRange | FailureKind::NotFound => DashboardError::BadResponse(msg),
    }
}

fn window_of(q: WindowQuery) -> DateWindow {
    DateWindow {
        start: q.start_date,
        end: q.end_date,
    }
}

fn days_of(q: WindowQuery) -> impl Iterator<Item = chrono::NaiveDate> {
    q.start_date.iter_days().take_while(move |d| *d <= q.end_date)
}

fn key_str(q: WindowQuery) -> String {
    RequestKey::of(&q).unwrap().as_str().to_string()
}

impl AnalyticsBackend for FakeBackend {
    fn reseed(&self) -> BoxFuture<'static, Result<SeedAck>> {
        let fut = self.call(Endpoint::Reseed, RESEED_GATE, |_| ());
        let state = self.state.clone();
        async move {
            fut.await?;
            state.reseeds.fetch_add(1, Ordering::SeqCst);
            let next = state.festivals_after_reseed.lock().unwrap().take();
            if let Some(next) = next {
                *state.festivals.lock().unwrap() = next;
            }
            Ok(SeedAck {
                message: Some("Data regenerated".into()),
            })
        }
        .boxed()
    }

    fn festivals(&self) -> BoxFuture<'static, Result<Vec<Festival>>> {
        self.call(Endpoint::Festivals, "festivals", |s| {
            s.festivals.lock().unwrap().clone()
        })
    }

    fn summary(&self, query: WindowQuery) -> BoxFuture<'static, Result<Summary>> {
        self.call(Endpoint::Summary, &key_str(query), move |_| {
            let days = window_of(query).days() as f64;
            Summary {
                total_revenue: days * 1000.0,
                total_orders: days * 10.0,
                avg_uplift_pct: 5.0,
                total_engagement: days * 100.0,
                new_vs_repeat_ratio: 0.4,
            }
        })
    }

    fn timeline(&self, query: WindowQuery) -> BoxFuture<'static, Result<Vec<TimelinePoint>>> {
        self.call(Endpoint::Timeline, &key_str(query), move |_| {
            days_of(query)
                .enumerate()
                .map(|(i, date)| TimelinePoint {
                    date,
                    sales: 1000.0 + i as f64,
                    social_buzz: 50.0,
                    uplift: 2.0,
                })
                .collect()
        })
    }

    fn social_breakdown(
        &self,
        query: WindowQuery,
    ) -> BoxFuture<'static, Result<Vec<PlatformBreakdown>>> {
        self.call(Endpoint::Social, &key_str(query), move |_| {
            let days = window_of(query).days() as f64;
            ["Instagram", "YouTube"]
                .iter()
                .map(|p| PlatformBreakdown {
                    platform: p.to_string(),
                    likes: days * 10.0,
                    impressions: days * 100.0,
                    clicks: None,
                    sentiment_score: None,
                })
                .collect()
        })
    }

    fn lag_analysis(&self, query: LagQuery) -> BoxFuture<'static, Result<Vec<LagPoint>>> {
        *self.state.last_lag.lock().unwrap() = Some(query.lag);
        let key = RequestKey::of(&query).unwrap().as_str().to_string();
        self.call(Endpoint::Lag, &key, move |_| {
            vec![LagPoint {
                date: "2023-01-01".parse().unwrap(),
                total_revenue: 1000.0,
                shifted_buzz: f64::from(query.lag),
            }]
        })
    }

    fn counterfactual(&self, query: WindowQuery) -> BoxFuture<'static, Result<Counterfactual>> {
        self.call(Endpoint::Counterfactual, &key_str(query), move |_| Counterfactual {
            summary: CounterfactualSummary {
                net_impact_value: 1200.0,
                net_impact_pct: 12.5,
                total_actual: None,
                total_baseline: None,
            },
            chart_data: days_of(query)
                .map(|date| CounterfactualPoint {
                    date,
                    actual_sales: 110.0,
                    baseline_sales: 100.0,
                    difference: None,
                })
                .collect(),
        })
    }
}
