//! Crawl a CometBFT network from its seed nodes and write every discovered peer to CSV.

mod output;

use clap::Parser;
use cometbft_peers_crawler::{CrawlerBuilder, Endpoint};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma separated RPC endpoints of the seed nodes, e.g. http://203.0.113.5:26657.
    #[arg(short, long, required = true, value_delimiter = ',')]
    seeds: Vec<String>,

    /// Timeout for each RPC request in seconds.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Path of the CSV file to write.
    #[arg(short, long)]
    output: PathBuf,

    /// Passes over the seed nodes while determining the network ID.
    #[arg(long, default_value = "3")]
    max_attempts: usize,

    /// Seconds to wait before retrying the seed nodes.
    #[arg(long, default_value = "10")]
    retry_delay: u64,

    /// Log level.
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Seed endpoints with surrounding whitespace and empty entries dropped.
    fn seed_endpoints(&self) -> Vec<Endpoint> {
        self.seeds
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Endpoint::from)
            .collect()
    }
}

fn log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {} - {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log_level(&args.log_level))
        .chain(std::io::stderr())
        .apply()?;

    let seeds = args.seed_endpoints();
    if seeds.is_empty() {
        return Err("At least one seed node is required".into());
    }

    let crawler = CrawlerBuilder::new()
        .with_request_timeout(Duration::from_secs(args.timeout))?
        .with_max_attempts(args.max_attempts)?
        .with_retry_delay(Duration::from_secs(args.retry_delay))
        .build()?;

    log::info!("CRAWLING FROM {} SEED NODES", seeds.len());
    let network = crawler
        .resolve_network(&seeds)
        .await
        .map_err(|e| format!("Failed to determine network ID: {e}"))?;
    log::info!("Using network ID: {network}");

    let peers = crawler.crawl_seeds(&network, &seeds).await.into_discovered();

    output::write_peers_to_path(&args.output, &peers)
        .map_err(|e| format!("Unable to write {}: {e}", args.output.display()))?;
    log::info!(
        "{} peers successfully written to {}",
        peers.len(),
        args.output.display()
    );

    Ok(())
}
