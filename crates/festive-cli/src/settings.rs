use anyhow::Context;
use festive_core::DashboardConfig;
use std::path::Path;

/// Resolve the effective configuration: the `--api-url` override, then the
/// config file, then built-in defaults.
pub fn resolve(config_path: &Path, api_url: Option<&str>) -> anyhow::Result<DashboardConfig> {
    let mut config = DashboardConfig::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }
    Ok(config)
}
