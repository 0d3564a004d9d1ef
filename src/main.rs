mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod server;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::PricePipeline;
use crate::scraper::HeadlessFetcher;
use crate::server::routes::PriceResponse;
use crate::server::AppState;

#[derive(Parser)]
#[command(name = "skin-price-api", about = "CS2 item price lookup API", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,

    /// One-shot lookup for a single item, printed as JSON
    Lookup {
        /// Item page slug, e.g. glove/sport-gloves-arctic/factory-new
        slug: String,

        /// Start from the tight mid-range profile ([190, 350], cap 12)
        /// instead of the configured defaults
        #[arg(long)]
        narrow: bool,

        /// Lower plausibility bound in USD
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Upper plausibility bound in USD
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Maximum number of quotes to keep (cheapest first)
        #[arg(long)]
        max_results: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "skin_price_api=info,warn",
        1 => "skin_price_api=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    let fetcher = Arc::new(HeadlessFetcher::new(&config.scraper));
    let pipeline = Arc::new(PricePipeline::new(fetcher, &config)?);

    match cli.command {
        Command::Serve => {
            server::serve(&config.server, AppState { pipeline }).await?;
        }

        Command::Lookup {
            slug,
            narrow,
            min_price,
            max_price,
            max_results,
        } => {
            let stopwatch = utils::Stopwatch::start(format!("lookup {}", slug));
            let profile = if narrow {
                models::FilterConfig::narrow()
            } else {
                pipeline.default_filter().clone()
            };
            let filter = profile.merged(min_price, max_price, max_results);

            let report = pipeline.run(&slug, &filter).await?;
            let response = PriceResponse {
                success: true,
                data: report.quotes,
                summary: report.summary,
                execution_time: stopwatch.elapsed_secs(),
                timestamp: Utc::now(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
