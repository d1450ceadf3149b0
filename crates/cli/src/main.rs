use clap::{Parser, Subcommand};
use std::sync::Arc;

use pricepilot_core::{CancelToken, ConfigLoader};
use pricepilot_orchestrator::{seed_demo_data, Pipeline};
use pricepilot_web_api::ApiServer;

#[derive(Parser)]
#[command(name = "pricepilot")]
#[command(about = "Demand forecasting and dynamic pricing pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline once and print a summary
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Skip loading the demo catalog and fixtures
        #[arg(long)]
        no_seed: bool,
    },
    /// Start the web API server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Server address; overrides the configured host and port
        #[arg(short, long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run { config, no_seed } => {
            let config = ConfigLoader::load_from(&config)?;
            let pipeline = Pipeline::from_config(&config)?;

            if !no_seed {
                seed_demo_data(&pipeline.store()).await?;
            }

            let cancel = CancelToken::new();
            let report = pipeline.run_once(&cancel).await?;

            println!("Forecasts: {} ({} failed)", report.forecast.forecasted(), report.forecast.failed());
            println!(
                "Recommendations: {} ({} unchanged, {} failed)",
                report.recommendation.recommended(),
                report.recommendation.no_change(),
                report.recommendation.failed()
            );
            println!("Promotions: {}", report.recommendation.promos_created());
            println!("Synced: {}", report.sync.len());
        }
        Commands::Serve { config, addr } => {
            let config = ConfigLoader::load_from(&config)?;
            let addr = addr.unwrap_or_else(|| {
                format!("{}:{}", config.server.host, config.server.port)
            });

            let pipeline = Pipeline::from_config(&config)?;
            seed_demo_data(&pipeline.store()).await?;

            let server = ApiServer::new(Arc::new(pipeline));
            server.serve(&addr).await?;
        }
    }

    Ok(())
}
