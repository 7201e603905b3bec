use anyhow::Result;
use clap::{Parser, Subcommand};
use ratehub::config::AppConfig;
use ratehub::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server with the periodic rates refresh (default)
    Serve,
    /// Bulk-load roughly ten years of historical rates, then exit
    Backfill,
    /// Seed the currency list from a JSON file of { name, sign } entries
    SeedList { file: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine; real deployments set process env directly
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::from_env()?;

    let result = match cli.command {
        Some(Commands::Backfill) => ratehub::backfill(config).await,
        Some(Commands::SeedList { file }) => ratehub::seed_list(config, &file).await,
        Some(Commands::Serve) | None => ratehub::serve(config).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
