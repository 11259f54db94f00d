//! Per-panel fetch state machine.
//!
//! Every panel runs the same protocol: `Idle → Loading → Ready | Error`,
//! re-entering `Loading` whenever its request key changes. A response is
//! written only if it answers the panel's most recent request in the
//! *current* generation; anything else is stale and dropped, even when an
//! older request happened to carry the same key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::RequestKey;
use crate::error::{DashboardError, ErrorInfo, FailureKind};
use crate::panel::PanelId;

// ---------------------------------------------------------------------------
// PanelStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl PanelStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelStatus::Idle => "idle",
            PanelStatus::Loading => "loading",
            PanelStatus::Ready => "ready",
            PanelStatus::Error => "error",
        }
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PanelDataset
// ---------------------------------------------------------------------------

/// What a panel currently shows. Owned by exactly one orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDataset<T> {
    pub status: PanelStatus,
    pub key: Option<RequestKey>,
    pub payload: Option<T>,
    pub error: Option<ErrorInfo>,
}

impl<T> PanelDataset<T> {
    pub fn idle() -> Self {
        Self {
            status: PanelStatus::Idle,
            key: None,
            payload: None,
            error: None,
        }
    }

    /// The payload, if the panel has ever reached `Ready` for its key (or
    /// kept one across a later failure).
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == PanelStatus::Loading
    }
}

impl<T> Default for PanelDataset<T> {
    fn default() -> Self {
        Self::idle()
    }
}

// ---------------------------------------------------------------------------
// Ticket / Resolution
// ---------------------------------------------------------------------------

/// Tags an in-flight request with what it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub panel: PanelId,
    pub key: RequestKey,
    pub generation: u64,
    /// Position of this request in the orchestrator's issue order.
    pub seq: u64,
}

/// What happened when a response came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Payload written, panel is `Ready`.
    Applied,
    /// Panel is `Error`; any previous payload is kept.
    Failed(FailureKind),
    /// Issued for a key or generation the panel has since moved past.
    Stale,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Orchestrator<T> {
    panel: PanelId,
    dataset: PanelDataset<T>,
    generation: u64,
    issued: u64,
}

impl<T> Orchestrator<T> {
    pub fn new(panel: PanelId) -> Self {
        Self {
            panel,
            dataset: PanelDataset::idle(),
            generation: 0,
            issued: 0,
        }
    }

    pub fn panel(&self) -> PanelId {
        self.panel
    }

    pub fn dataset(&self) -> &PanelDataset<T> {
        &self.dataset
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of requests this orchestrator has issued over its lifetime.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Record `key` as current. Returns a ticket when a request must go out:
    /// the key differs from the recorded one, or the panel is idle.
    pub fn begin(&mut self, key: RequestKey) -> Option<Ticket> {
        if self.dataset.status != PanelStatus::Idle && self.dataset.key.as_ref() == Some(&key) {
            return None;
        }
        tracing::debug!(panel = %self.panel, key = %key, generation = self.generation, "issuing request");
        self.dataset.key = Some(key.clone());
        self.dataset.status = PanelStatus::Loading;
        self.dataset.error = None;
        self.issued += 1;
        Some(Ticket {
            panel: self.panel,
            key,
            generation: self.generation,
            seq: self.issued,
        })
    }

    /// Reconcile a response against the latest request in the current
    /// generation.
    pub fn resolve(
        &mut self,
        ticket: &Ticket,
        outcome: std::result::Result<T, DashboardError>,
    ) -> Resolution {
        if ticket.generation != self.generation
            || ticket.seq != self.issued
            || self.dataset.key.as_ref() != Some(&ticket.key)
        {
            tracing::warn!(
                panel = %self.panel,
                key = %ticket.key,
                generation = ticket.generation,
                current_generation = self.generation,
                seq = ticket.seq,
                latest_seq = self.issued,
                "discarding stale response"
            );
            return Resolution::Stale;
        }
        match outcome {
            Ok(payload) => {
                self.dataset.status = PanelStatus::Ready;
                self.dataset.payload = Some(payload);
                self.dataset.error = None;
                Resolution::Applied
            }
            Err(err) => {
                tracing::warn!(panel = %self.panel, key = %ticket.key, error = %err, "panel fetch failed");
                let info = ErrorInfo::from(&err);
                let kind = info.kind;
                self.dataset.status = PanelStatus::Error;
                self.dataset.error = Some(info);
                Resolution::Failed(kind)
            }
        }
    }

    /// Drop everything and move to `generation`. Responses tagged with an
    /// older generation will resolve as stale.
    pub fn invalidate(&mut self, generation: u64) {
        self.dataset = PanelDataset::idle();
        self.generation = generation;
    }
}
