use super::Globals;
use crate::output::{print_json, print_panel_header, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use festive_cli::format::{compact, inr, number, percent, short_date};
use festive_core::metrics::{
    self, ComparisonRow, NetSocialImpact, PlatformShare, SummaryCards,
};
use festive_core::types::{Counterfactual, LagPoint, PlatformBreakdown, Summary, TimelinePoint};
use festive_core::{
    ControlsView, Dashboard, DashboardConfig, Factor, Festival, FilterPatch, Metric, PanelDataset,
    PanelId, PanelStatus, Selection,
};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Focus on one festival (its id), or `all` for the full default window
    #[arg(long)]
    pub festival: Option<String>,

    /// Window start; selects `all` festivals
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Window end; selects `all` festivals
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Platform to highlight in the social panel, or `all`
    #[arg(long)]
    pub platform: Option<String>,

    /// Lag in days for the lag panel (1-7)
    #[arg(long, allow_negative_numbers = true)]
    pub lag: Option<i64>,

    /// First comparison metric: sales, social_buzz or uplift
    #[arg(long, default_value = "sales")]
    pub factor_a: Metric,

    /// Second comparison metric: sales, social_buzz or uplift
    #[arg(long, default_value = "social_buzz")]
    pub factor_b: Metric,
}

impl SnapshotArgs {
    fn patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::default();
        if let Some(festival) = &self.festival {
            patch.selected_festival_id = Some(Selection::from(festival.as_str()));
        }
        if let Some(start) = self.start {
            patch = patch.with_start(start);
        }
        if let Some(end) = self.end {
            patch = patch.with_end(end);
        }
        if let Some(platform) = &self.platform {
            patch = patch.with_platform(platform.as_str());
        }
        patch
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Globals, args: SnapshotArgs) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let rt = super::runtime()?;
    let dashboard = rt.block_on(load(&config, &args))?;

    if ctx.json {
        print_json(&SnapshotView::of(&dashboard))?;
    } else {
        render(&dashboard);
    }

    let failed = PanelId::all()
        .iter()
        .filter(|p| p.fetches())
        .all(|p| dashboard.panel_status(*p) == Some(PanelStatus::Error));
    if failed {
        anyhow::bail!("every panel failed to load");
    }
    Ok(())
}

async fn load(config: &DashboardConfig, args: &SnapshotArgs) -> anyhow::Result<Dashboard> {
    let mut dashboard = super::connect(config).await?;

    let patch = args.patch();
    if !patch.is_empty() {
        let change = dashboard
            .apply_filter_change(patch)
            .context("failed to apply filter")?;
        if let Some(id) = change.unmatched_festival {
            eprintln!("warning: unknown festival '{id}'; window left unchanged");
        }
    }
    if let Some(lag) = args.lag {
        dashboard.set_lag(lag).context("invalid --lag")?;
    }
    dashboard.set_comparison_factor(Factor::A, args.factor_a);
    dashboard.set_comparison_factor(Factor::B, args.factor_b);

    dashboard.refresh()?;
    dashboard.settle().await;
    Ok(dashboard)
}

// ---------------------------------------------------------------------------
// JSON view
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SnapshotView<'a> {
    controls: ControlsView<'a>,
    generation: u64,
    summary: &'a PanelDataset<Summary>,
    summary_cards: Option<SummaryCards>,
    timeline: &'a PanelDataset<Vec<TimelinePoint>>,
    festival_bands: Vec<Festival>,
    social: &'a PanelDataset<Vec<PlatformBreakdown>>,
    platform_shares: Option<Vec<PlatformShare>>,
    comparison: ComparisonView,
    lag: LagView<'a>,
    counterfactual: &'a PanelDataset<Counterfactual>,
    net_social_impact: Option<NetSocialImpact>,
}

#[derive(Serialize)]
struct ComparisonView {
    status: PanelStatus,
    factor_a: Metric,
    factor_b: Metric,
    rows: Vec<ComparisonRow>,
}

#[derive(Serialize)]
struct LagView<'a> {
    lag: u8,
    #[serde(flatten)]
    dataset: &'a PanelDataset<Vec<LagPoint>>,
}

impl<'a> SnapshotView<'a> {
    fn of(dashboard: &'a Dashboard) -> Self {
        let (factor_a, factor_b) = dashboard.comparison_factors();
        Self {
            controls: dashboard.controls(),
            generation: dashboard.generation(),
            summary: dashboard.summary(),
            summary_cards: dashboard.summary().payload().map(metrics::summary_cards),
            timeline: dashboard.timeline(),
            festival_bands: dashboard.festival_bands(),
            social: dashboard.social(),
            platform_shares: dashboard
                .social()
                .payload()
                .map(|rows| metrics::platform_shares(rows)),
            comparison: ComparisonView {
                status: dashboard.comparison().status,
                factor_a,
                factor_b,
                rows: dashboard.comparison_rows(),
            },
            lag: LagView {
                lag: dashboard.lag(),
                dataset: dashboard.lag_series(),
            },
            counterfactual: dashboard.counterfactual(),
            net_social_impact: dashboard
                .counterfactual()
                .payload()
                .map(metrics::net_social_impact),
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn render(dashboard: &Dashboard) {
    render_controls(dashboard);
    render_summary(dashboard.summary());
    render_timeline(dashboard);
    render_social(dashboard);
    render_comparison(dashboard);
    render_lag(dashboard);
    render_counterfactual(dashboard.counterfactual());
}

fn render_controls(dashboard: &Dashboard) {
    let view = dashboard.controls();
    let filter = &view.filter;
    println!("== {} ==", PanelId::GlobalControls.title());
    let festival = match &filter.selected_festival_id {
        Selection::All => "all".to_string(),
        Selection::Only(id) => match dashboard.registry().find(id) {
            Some(f) => format!("{} ({id})", f.name),
            None => id.clone(),
        },
    };
    println!(
        "Window: {} .. {}   Festival: {festival}   Platform: {}",
        filter.start_date,
        filter.end_date,
        filter.platform.as_str()
    );
}

fn render_summary(dataset: &PanelDataset<Summary>) {
    print_panel_header(PanelId::ExecutiveSummary, dataset);
    let Some(summary) = dataset.payload() else {
        return;
    };
    let cards = metrics::summary_cards(summary);
    print_table(
        &["METRIC", "VALUE"],
        vec![
            vec!["Total Revenue".into(), inr(cards.total_revenue)],
            vec!["Total Orders".into(), number(cards.total_orders)],
            vec!["Avg Uplift".into(), percent(cards.avg_uplift_pct)],
            vec!["Social Engagement".into(), compact(cards.total_engagement)],
            vec!["New Customers".into(), percent(cards.new_customer_share_pct)],
            vec!["ROI Efficiency".into(), format!("{:.2}", cards.roi_efficiency)],
        ],
    );
}

fn render_timeline(dashboard: &Dashboard) {
    let dataset = dashboard.timeline();
    print_panel_header(PanelId::TimelineAnalysis, dataset);
    let Some(points) = dataset.payload() else {
        return;
    };
    let total: f64 = points.iter().map(|p| p.sales).sum();
    let peak = points
        .iter()
        .max_by(|a, b| a.sales.total_cmp(&b.sales));
    println!(
        "{} days, revenue {}, {} days above baseline",
        points.len(),
        inr(total),
        metrics::uplift_days(points)
    );
    if let Some(peak) = peak {
        println!("Peak: {} at {}", short_date(peak.date), inr(peak.sales));
    }
    for festival in dashboard.festival_bands() {
        println!(
            "Festival: {} ({} – {})",
            festival.name,
            short_date(festival.start_date),
            short_date(festival.end_date)
        );
    }
}

fn render_social(dashboard: &Dashboard) {
    let dataset = dashboard.social();
    print_panel_header(PanelId::SocialInfluence, dataset);
    let Some(breakdown) = dataset.payload() else {
        return;
    };
    let platform = dashboard.filter().platform;
    let rows = metrics::platform_shares(breakdown)
        .into_iter()
        .zip(breakdown)
        .map(|(share, row)| {
            let marker = match &platform {
                Selection::Only(p) if p.eq_ignore_ascii_case(&row.platform) => "*",
                _ => "",
            };
            vec![
                format!("{}{marker}", row.platform),
                compact(row.likes),
                percent(share.likes_pct),
                compact(row.impressions),
                percent(share.impressions_pct),
            ]
        })
        .collect();
    print_table(&["PLATFORM", "LIKES", "SHARE", "IMPRESSIONS", "SHARE"], rows);
}

fn render_comparison(dashboard: &Dashboard) {
    let dataset = dashboard.comparison();
    print_panel_header(PanelId::ComparisonZone, dataset);
    if dataset.payload().is_none() {
        return;
    }
    let (a, b) = dashboard.comparison_factors();
    let rows = dashboard
        .comparison_rows()
        .into_iter()
        .map(|r| vec![short_date(r.date), metric_value(a, r.a), metric_value(b, r.b)])
        .collect();
    print_table(&["DATE", a.label(), b.label()], rows);
}

fn metric_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Sales => inr(value),
        Metric::SocialBuzz => compact(value),
        Metric::Uplift => percent(value),
    }
}

fn render_lag(dashboard: &Dashboard) {
    let dataset = dashboard.lag_series();
    print_panel_header(PanelId::LagAnalysis, dataset);
    let Some(points) = dataset.payload() else {
        return;
    };
    println!("Social buzz shifted by {} days", dashboard.lag());
    let rows = points
        .iter()
        .map(|p| vec![short_date(p.date), inr(p.total_revenue), compact(p.shifted_buzz)])
        .collect();
    print_table(&["DATE", "REVENUE", "SHIFTED BUZZ"], rows);
}

fn render_counterfactual(dataset: &PanelDataset<Counterfactual>) {
    print_panel_header(PanelId::Counterfactual, dataset);
    let Some(cf) = dataset.payload() else {
        return;
    };
    let impact = metrics::net_social_impact(cf);
    println!(
        "Net social impact: {} ({})",
        inr(impact.net_impact_value),
        percent(impact.net_impact_pct)
    );
    let rows = cf
        .chart_data
        .iter()
        .map(|p| {
            vec![
                short_date(p.date),
                inr(p.actual_sales),
                inr(p.baseline_sales),
                inr(p.actual_sales - p.baseline_sales),
            ]
        })
        .collect();
    print_table(&["DATE", "ACTUAL", "BASELINE", "DIFFERENCE"], rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SnapshotArgs {
        SnapshotArgs {
            festival: None,
            start: None,
            end: None,
            platform: None,
            lag: None,
            factor_a: Metric::Sales,
            factor_b: Metric::SocialBuzz,
        }
    }

    #[test]
    fn no_flags_means_empty_patch() {
        assert!(args().patch().is_empty());
    }

    #[test]
    fn flags_map_onto_patch_fields() {
        let a = SnapshotArgs {
            festival: Some("all".into()),
            start: Some("2023-03-01".parse().unwrap()),
            platform: Some("Instagram".into()),
            ..args()
        };
        let patch = a.patch();
        assert_eq!(patch.selected_festival_id, Some(Selection::All));
        assert_eq!(patch.start_date, Some("2023-03-01".parse().unwrap()));
        assert_eq!(patch.end_date, None);
        assert_eq!(patch.platform, Some(Selection::only("Instagram")));
    }
}
