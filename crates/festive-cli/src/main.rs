mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, snapshot::SnapshotArgs};
use festive_core::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "festive",
    about = "Festive sales and social impact dashboard",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file
    #[arg(long, global = true, env = "FESTIVE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Analytics API base URL (overrides the config file)
    #[arg(long, global = true, env = "FESTIVE_API_URL")]
    api_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a filter, load every panel and print the result
    Snapshot(SnapshotArgs),

    /// List the registered festivals
    Festivals,

    /// Regenerate the backend dataset (destructive)
    Seed,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Seed => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = cmd::Globals {
        config_path: cli.config,
        api_url: cli.api_url,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Snapshot(args) => cmd::snapshot::run(&ctx, args),
        Commands::Festivals => cmd::festivals::run(&ctx),
        Commands::Seed => cmd::seed::run(&ctx),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
