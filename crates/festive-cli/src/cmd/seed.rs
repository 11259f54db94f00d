use crate::output::print_json;
use anyhow::Context;
use super::Globals;

/// Regenerate the backend dataset. Destructive.
pub fn run(ctx: &Globals) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let rt = super::runtime()?;
    let report = rt.block_on(async {
        let mut dashboard = super::connect(&config).await?;
        dashboard.reseed().await.context("reseed failed")
    })?;

    if ctx.json {
        return print_json(&report);
    }

    if let Some(message) = &report.message {
        println!("{message}");
    }
    println!(
        "Dataset regenerated (generation {}), {} festivals registered.",
        report.generation, report.festivals
    );
    Ok(())
}
