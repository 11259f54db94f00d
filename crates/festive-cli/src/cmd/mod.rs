pub mod config;
pub mod festivals;
pub mod seed;
pub mod snapshot;

use anyhow::Context;
use festive_client::HttpBackend;
use festive_core::{Dashboard, DashboardConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Global flags every command sees.
pub struct Globals {
    pub config_path: PathBuf,
    pub api_url: Option<String>,
    pub json: bool,
}

impl Globals {
    /// The effective configuration. Resolved per command so `config init`
    /// can replace a file that no longer parses.
    pub fn config(&self) -> anyhow::Result<DashboardConfig> {
        festive_cli::settings::resolve(&self.config_path, self.api_url.as_deref())
    }
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

/// A dashboard wired to the HTTP backend, with the festival registry loaded.
pub(crate) async fn connect(config: &DashboardConfig) -> anyhow::Result<Dashboard> {
    let backend = HttpBackend::from_config(config).context("failed to build backend client")?;
    let mut dashboard =
        Dashboard::new(Arc::new(backend), config).context("invalid dashboard configuration")?;
    dashboard
        .load_festivals()
        .await
        .with_context(|| format!("failed to load festivals from {}", config.api_url))?;
    Ok(dashboard)
}
