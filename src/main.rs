//! Tomato-Harvest main entry point
//!
//! This is the command-line interface for the Tomato-Harvest record crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use tomato_harvest::config::{load_config_with_hash, validate, Config, OutputFormat, ProxyConfig};
use tomato_harvest::crawler::crawl;
use tomato_harvest::output::{load_statistics, print_run_summary, print_statistics};
use tomato_harvest::storage::SqliteStorage;
use tomato_harvest::UrlClassifier;
use tracing_subscriber::EnvFilter;

/// Tomato-Harvest: movie and TV show records from a review site
///
/// Tomato-Harvest starts from the configured seed URLs, paginates browse
/// listings, follows links to movie and TV show pages and writes one record
/// per page until the result limit is reached.
#[derive(Parser, Debug)]
#[command(name = "tomato-harvest")]
#[command(version)]
#[command(about = "Movie and TV show record crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override `crawler.max-results`
    #[arg(long, value_name = "N")]
    max_results: Option<u64>,

    /// Route every request through this proxy, overriding `[proxy]`
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// Validate config and show how the start URLs classify without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the SQLite dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli).context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tomato_harvest=info,warn"),
            1 => EnvFilter::new("tomato_harvest=debug,info"),
            2 => EnvFilter::new("tomato_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies `--max-results` and `--proxy` on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(max_results) = cli.max_results {
        tracing::info!("Overriding max-results: {}", max_results);
        config.crawler.max_results = max_results;
    }

    if let Some(proxy) = &cli.proxy {
        tracing::info!("Routing requests through proxy from the command line");
        config.proxy = Some(ProxyConfig {
            url: proxy.clone(),
            username: None,
            password: None,
        });
    }

    validate(config)?;
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows how seeds classify
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Tomato-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing API prefix: /{}", config.site.api_prefix);

    println!("\nCrawler Configuration:");
    println!("  Max results: {}", config.crawler.max_results);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());
    if let Some(proxy) = &config.proxy {
        println!("Proxy: {}", proxy.url);
    }

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Path: {}", config.output.path);

    let classifier = UrlClassifier::new(&config.site)?;
    let mut accepted = 0;

    println!("\nStart URLs ({}):", config.start_urls.len());
    for entry in &config.start_urls {
        let Some(raw) = entry.url() else {
            println!("  - (entry without url, skipped)");
            continue;
        };

        match classifier.classify(raw) {
            Ok(item) => {
                accepted += 1;
                println!("  - {}", item);
            }
            Err(e) => println!("  - {} rejected: {}", raw, e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} start URLs", accepted);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the SQLite dataset
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    if config.output.format != OutputFormat::Sqlite {
        bail!("--stats needs `output.format = \"sqlite\"`");
    }

    println!("Dataset: {}\n", config.output.path);

    let storage = SqliteStorage::new(Path::new(&config.output.path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Start URLs: {}, max results: {}",
        config.start_urls.len(),
        config.crawler.max_results
    );

    match crawl(config, config_hash).await {
        Ok(summary) => {
            tracing::info!("Crawl finished");
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
