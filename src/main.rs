use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use gridfp::prices::{attach_prices, PriceBook};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_DATA: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score all configured events (default if no subcommand)
    Score,
    /// Per-event prediction summaries: podium, pole, fastest lap, safety cars
    Predict,
    /// Write a starter config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Remove all cached provider responses
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "gridfp")]
#[command(about = "Fantasy motorsport scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gridfp/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the on-disk provider cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Tab-separated output for scripting
    #[arg(long, global = true)]
    tsv: bool,

    /// Limit to a single season
    #[arg(short, long, global = true)]
    season: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Score);
    let start_time = Instant::now();

    // Init writes a config; it must not require one
    if let Commands::Init { force } = &command {
        let path = cli.config.clone().map(PathBuf::from);
        if let Err(e) = gridfp::config::write_starter_config(path, *force) {
            eprintln!("Init error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Clearing the cache needs no config either
    if let Commands::ClearCache = &command {
        let cache = gridfp::provider::DiskCache::open_default();
        if let Err(e) = cache.clear() {
            eprintln!("Cache error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Provider cache cleared.");
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match gridfp::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup, reporting all errors at once
    if let Err(errors) = gridfp::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if let Some(year) = cli.season {
        if !config.seasons.iter().any(|s| s.year == year) {
            eprintln!("Season {} is not in the config.", year);
            std::process::exit(EXIT_CONFIG);
        }
    }

    if cli.verbose {
        let events = gridfp::pipeline::configured_events(&config, cli.season);
        eprintln!(
            "{} events configured across {} season(s)",
            events.len(),
            config.seasons.len()
        );
    }

    // Provider client and response cache
    let client = match gridfp::provider::create_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create provider client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };
    let cache = gridfp::provider::DiskCache::open_default();
    let cache_config = gridfp::provider::CacheConfig {
        enabled: !cli.no_cache,
    };

    if cli.verbose {
        let cache_status = if cache_config.enabled {
            "enabled"
        } else {
            "disabled (--no-cache)"
        };
        eprintln!("Cache: {}", cache_status);
    }

    let use_colors = gridfp::output::should_use_colors();

    match command {
        Commands::Score => {
            let scored = match gridfp::pipeline::fetch_and_score(
                &client,
                &config,
                &cache,
                &cache_config,
                cli.season,
                cli.verbose,
            )
            .await
            {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{:#}", e);
                    // Bad upstream data is not a network failure
                    let code = if e
                        .downcast_ref::<gridfp::scoring::ContractViolation>()
                        .is_some()
                    {
                        EXIT_DATA
                    } else {
                        EXIT_NETWORK
                    };
                    std::process::exit(code);
                }
            };

            // Prices are optional; without them the join leaves every cost
            // missing but keeps every row
            let book = match &config.prices {
                Some(prices) => match PriceBook::load(&prices.drivers, &prices.constructors) {
                    Ok(b) => b,
                    Err(e) => {
                        eprintln!("Price table error: {}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
                None => PriceBook::default(),
            };
            let priced = attach_prices(scored, &book);

            if cli.tsv {
                println!("{}", gridfp::output::format_scored_tsv(&priced));
            } else {
                println!(
                    "{}",
                    gridfp::output::format_scored_table(&priced, use_colors)
                );
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} scored rows in {:?}",
                    priced.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Predict => {
            let summaries = match gridfp::pipeline::fetch_summaries(
                &client,
                &config,
                &cache,
                &cache_config,
                cli.season,
                cli.verbose,
            )
            .await
            {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            if cli.tsv {
                println!("{}", gridfp::output::format_summary_tsv(&summaries));
            } else {
                println!(
                    "{}",
                    gridfp::output::format_summary_table(&summaries, use_colors)
                );
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} event summaries in {:?}",
                    summaries.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Init { .. } | Commands::ClearCache => {} // handled above
    }

    std::process::exit(EXIT_SUCCESS);
}
