use super::Globals;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use festive_core::{DashboardConfig, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Globals, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(&ctx.config()?, ctx.json),
        ConfigSubcommand::Init { force } => init(&ctx.config_path, force, ctx.json),
        ConfigSubcommand::Validate => validate(&ctx.config()?, ctx.json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &DashboardConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(path: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    DashboardConfig::default()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "path": path.display().to_string() }))?;
    } else {
        println!("Wrote default config to {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &DashboardConfig, json: bool) -> anyhow::Result<()> {
    let mut warnings = config.validate();
    // Errors first; within a level, keep the order the checks ran in.
    warnings.sort_by_key(|w| w.level != WarnLevel::Error);
    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();

    if json {
        print_json(&serde_json::json!({
            "valid": errors == 0,
            "errors": errors,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Config is valid: {}", config.api_url);
    } else {
        for w in &warnings {
            println!("[{}] {}", w.level, w.message);
        }
        println!(
            "{errors} error(s), {} warning(s)",
            warnings.len() - errors
        );
    }

    if config.has_errors() {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
