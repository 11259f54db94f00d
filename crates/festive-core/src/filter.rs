//! The canonical filter state and its single mutation entry point.
//!
//! `FilterStore` is the only writer of [`FilterState`]. Every accepted change
//! is published through a `tokio::sync::watch` channel so orchestrators can
//! derive their request keys from the latest snapshot without holding a
//! reference to the store itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{DashboardError, Result};
use crate::registry::FestivalRegistry;
use crate::types::{DateWindow, Selection};

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

/// The active analysis window and selection.
///
/// Invariants: `start_date <= end_date`; when `selected_festival_id` names a
/// festival, the dates equal that festival's range as of the last transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub selected_festival_id: Selection,
    pub platform: Selection,
}

impl FilterState {
    pub fn initial(default_window: DateWindow) -> Self {
        Self {
            start_date: default_window.start,
            end_date: default_window.end,
            selected_festival_id: Selection::All,
            platform: Selection::All,
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterPatch
// ---------------------------------------------------------------------------

/// A partial update to [`FilterState`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_festival_id: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Selection>,
}

impl FilterPatch {
    pub fn festival(id: impl Into<Selection>) -> Self {
        Self {
            selected_festival_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<Selection>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn sets_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

// ---------------------------------------------------------------------------
// FilterChange
// ---------------------------------------------------------------------------

/// Outcome of an accepted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    pub previous: FilterState,
    pub current: FilterState,
    /// A festival id from the patch that the registry did not know. The
    /// field was ignored; the rest of the patch still applied.
    pub unmatched_festival: Option<String>,
}

impl FilterChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

// ---------------------------------------------------------------------------
// FilterStore
// ---------------------------------------------------------------------------

pub struct FilterStore {
    default_window: DateWindow,
    tx: watch::Sender<FilterState>,
}

impl FilterStore {
    pub fn new(default_window: DateWindow) -> Self {
        let (tx, _) = watch::channel(FilterState::initial(default_window));
        Self { default_window, tx }
    }

    pub fn default_window(&self) -> DateWindow {
        self.default_window
    }

    pub fn snapshot(&self) -> FilterState {
        self.tx.borrow().clone()
    }

    /// A read-only view that observes every committed transition.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.tx.subscribe()
    }

    /// Apply `patch` according to the transition rules.
    ///
    /// Rules, in order: a known festival id sets the window to that
    /// festival's range; `all` restores the default window; direct date
    /// edits keep the new dates and force the selection back to `all`;
    /// `platform` is copied verbatim. An unknown festival id is ignored.
    ///
    /// Fails with [`DashboardError::InvalidRange`] when the resulting window
    /// would be inverted; the stored state is then untouched.
    pub fn apply(&mut self, patch: FilterPatch, registry: &FestivalRegistry) -> Result<FilterChange> {
        let previous = self.snapshot();
        let mut next = previous.clone();
        let mut unmatched_festival = None;

        let festival_applied = match &patch.selected_festival_id {
            Some(Selection::Only(id)) => match registry.require(id) {
                Ok(festival) => {
                    next.start_date = festival.start_date;
                    next.end_date = festival.end_date;
                    next.selected_festival_id = Selection::Only(festival.id.clone());
                    true
                }
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring festival selection in filter patch");
                    unmatched_festival = Some(id.clone());
                    false
                }
            },
            Some(Selection::All) => {
                next.start_date = self.default_window.start;
                next.end_date = self.default_window.end;
                next.selected_festival_id = Selection::All;
                false
            }
            None => false,
        };

        // Festival ranges win over dates supplied in the same patch.
        if !festival_applied && patch.sets_dates() {
            if let Some(start) = patch.start_date {
                next.start_date = start;
            }
            if let Some(end) = patch.end_date {
                next.end_date = end;
            }
            next.selected_festival_id = Selection::All;
        }

        if let Some(platform) = patch.platform {
            next.platform = platform;
        }

        if next.start_date > next.end_date {
            return Err(DashboardError::InvalidRange {
                start: next.start_date,
                end: next.end_date,
            });
        }

        Ok(self.commit(previous, next, unmatched_festival))
    }

    /// Restore the initial state: default window, `all`, `all`.
    pub fn reset(&mut self) -> FilterChange {
        let previous = self.snapshot();
        let next = FilterState::initial(self.default_window);
        self.commit(previous, next, None)
    }

    /// Re-resolve the selected festival against a freshly loaded registry.
    ///
    /// A festival that still exists pulls the window onto its (possibly new)
    /// range; one that vanished leaves the dates as they are and falls back
    /// to `all`.
    pub fn realign(&mut self, registry: &FestivalRegistry) -> FilterChange {
        let previous = self.snapshot();
        let mut next = previous.clone();
        if let Selection::Only(id) = &previous.selected_festival_id {
            match registry.find(id) {
                Some(festival) => {
                    next.start_date = festival.start_date;
                    next.end_date = festival.end_date;
                }
                None => {
                    tracing::warn!(festival = %id, "selected festival no longer exists; selecting all");
                    next.selected_festival_id = Selection::All;
                }
            }
        }
        self.commit(previous, next, None)
    }

    fn commit(
        &mut self,
        previous: FilterState,
        next: FilterState,
        unmatched_festival: Option<String>,
    ) -> FilterChange {
        if next != previous {
            tracing::debug!(
                start = %next.start_date,
                end = %next.end_date,
                festival = %next.selected_festival_id,
                platform = %next.platform,
                "filter state changed"
            );
            self.tx.send_replace(next.clone());
        }
        FilterChange {
            previous,
            current: next,
            unmatched_festival,
        }
    }
}
