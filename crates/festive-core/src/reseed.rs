//! Dataset regeneration.
//!
//! A reseed replaces the backend's data wholesale. While it runs the
//! `seeding` flag is raised and every mutation entry point refuses work;
//! once the new registry is in, the generation counter moves forward so any
//! response issued against the old dataset resolves as stale.

use serde::Serialize;
use tokio::sync::watch;

use crate::dashboard::Dashboard;
use crate::error::{DashboardError, Result};
use crate::registry::FestivalRegistry;

/// Raises `seeding` for its lifetime. Dropping it (success, failure, or a
/// cancelled future) always lowers the flag.
struct SeedingGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> SeedingGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self { flag }
    }
}

impl Drop for SeedingGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReseedReport {
    pub generation: u64,
    pub festivals: usize,
    /// The backend's acknowledgement text, if any.
    pub message: Option<String>,
    /// Whether realigning the filter against the new registry moved it.
    pub filter_changed: bool,
}

impl Dashboard {
    /// Regenerate the backend dataset and reload the festival registry.
    ///
    /// On success every panel is back to idle with no payload and the
    /// filter is realigned; call [`refresh`](Dashboard::refresh) to repopulate.
    /// On failure nothing local changes and the error is a
    /// [`DashboardError::SeedFailure`].
    pub async fn reseed(&mut self) -> Result<ReseedReport> {
        if self.is_seeding() {
            return Err(DashboardError::Seeding);
        }
        let _guard = SeedingGuard::raise(&self.seeding);
        tracing::info!(generation = self.generation, "regenerating dataset");

        let ack = self.backend.reseed().await.map_err(seed_failure)?;
        let festivals = self.backend.festivals().await.map_err(seed_failure)?;
        let registry = FestivalRegistry::from_festivals(festivals).map_err(seed_failure)?;

        self.generation += 1;
        self.registry = registry;
        self.panels.invalidate(self.generation);
        let change = self.filter.realign(&self.registry);

        tracing::info!(
            generation = self.generation,
            festivals = self.registry.len(),
            "dataset regenerated"
        );
        Ok(ReseedReport {
            generation: self.generation,
            festivals: self.registry.len(),
            message: ack.message,
            filter_changed: change.changed(),
        })
    }
}

fn seed_failure(err: DashboardError) -> DashboardError {
    tracing::warn!(error = %err, "reseed failed; keeping current dataset");
    match err {
        DashboardError::SeedFailure(_) => err,
        other => DashboardError::SeedFailure(other.to_string()),
    }
}
