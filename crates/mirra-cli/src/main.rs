use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mirra_client::ReqwestFetcher;
use mirra_core::{Endpoint, LookupReport, ProfileService, ScrapeConfig};

#[derive(Parser)]
#[command(name = "mirra", version, about = "Profile lookups across public mirror instances")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true, env = "MIRRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a profile and print the outcome as JSON
    Lookup {
        /// Username, with or without a leading '@'
        username: String,

        #[command(flatten)]
        overrides: Overrides,

        /// Print every fetch attempt to stderr
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Print the effective endpoint pool in trial order
    Endpoints {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line overrides, applied after the config file and `MIRRA_*` env vars.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Mirror base URL; repeat to build the pool in order
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// Attempts per endpoint
    #[arg(long)]
    max_retries: Option<u32>,

    /// First backoff delay in milliseconds; doubles per retry
    #[arg(long)]
    base_delay_ms: Option<u64>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Bound on the whole lookup in seconds (0 disables it)
    #[arg(long)]
    deadline_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mirra=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            username,
            overrides,
            verbose,
        } => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            cmd_lookup(&username, config, verbose).await?;
        }
        Commands::Endpoints { overrides } => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            for (i, endpoint) in config.endpoints.iter().enumerate() {
                println!("{:>2}. {endpoint}", i + 1);
            }
        }
        Commands::Config { overrides } => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Defaults, then the config file, then the environment, then flags.
fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ScrapeConfig> {
    let base = match path {
        Some(path) => ScrapeConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => ScrapeConfig::default(),
    };
    let config = base
        .apply_env()
        .context("Invalid MIRRA_* environment variable")?;
    apply_overrides(config, overrides)
}

fn apply_overrides(mut config: ScrapeConfig, overrides: &Overrides) -> Result<ScrapeConfig> {
    if !overrides.endpoints.is_empty() {
        config.endpoints = overrides
            .endpoints
            .iter()
            .map(|raw| {
                Endpoint::parse(raw).with_context(|| format!("Invalid --endpoint '{raw}'"))
            })
            .collect::<Result<_>>()?;
    }
    if let Some(max_retries) = overrides.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(base_delay_ms) = overrides.base_delay_ms {
        config.retry.base_delay_ms = base_delay_ms;
    }
    if let Some(secs) = overrides.timeout_secs {
        config.retry.attempt_timeout_ms = secs.saturating_mul(1_000);
    }
    if let Some(secs) = overrides.deadline_secs {
        config.overall_timeout_ms = (secs > 0).then(|| secs.saturating_mul(1_000));
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn cmd_lookup(username: &str, config: ScrapeConfig, verbose: bool) -> Result<()> {
    let fetcher = ReqwestFetcher::with_timeout(config.retry.attempt_timeout())
        .context("Failed to create HTTP client")?;
    let service = ProfileService::new(fetcher, config).context("Invalid configuration")?;

    let report = service.lookup_with_report(username).await;
    if verbose {
        print_attempts(&report);
    }

    println!("{}", serde_json::to_string_pretty(&report.outcome)?);

    if !report.outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_attempts(report: &LookupReport) {
    eprintln!("Attempts ({}):", report.attempts.len());
    for attempt in &report.attempts {
        let status = match &attempt.error {
            None => "ok".to_string(),
            Some(err) => err.clone(),
        };
        eprintln!(
            "  {} #{} after {}ms backoff: {}",
            attempt.endpoint,
            attempt.attempt + 1,
            attempt.backoff.as_millis(),
            status
        );
    }
    match &report.endpoint {
        Some(endpoint) => eprintln!("Served by {endpoint}"),
        None => eprintln!("No endpoint served a usable page"),
    }
}
