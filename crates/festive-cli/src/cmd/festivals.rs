use crate::output::{print_json, print_table};
use festive_cli::format::short_date;
use super::Globals;

pub fn run(ctx: &Globals) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let rt = super::runtime()?;
    let dashboard = rt.block_on(super::connect(&config))?;
    let registry = dashboard.registry();

    if ctx.json {
        return print_json(&registry.as_slice());
    }

    if registry.is_empty() {
        println!("No festivals registered.");
        return Ok(());
    }

    let rows = registry
        .iter()
        .map(|f| {
            let days = f.window().map(|w| w.days().to_string()).unwrap_or_default();
            vec![
                f.id.clone(),
                f.name.clone(),
                f.start_date.to_string(),
                f.end_date.to_string(),
                format!("{} – {}", short_date(f.start_date), short_date(f.end_date)),
                days,
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "START", "END", "RANGE", "DAYS"], rows);
    Ok(())
}
