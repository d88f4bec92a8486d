//! Outage Watch main entry point
//!
//! This is the command-line interface for the carrier status aggregator.

use anyhow::Context;
use clap::Parser;
use outage_watch::aggregator::{plan_run, Engine};
use outage_watch::config::{load_config_with_hash, validate_region, Config};
use outage_watch::output::{
    compute_statistics, print_statistics, write_all, HtmlReportSink, JsonReportSink, ReportSink,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Outage Watch: carrier status aggregator
///
/// Polls every configured carrier's status sources in priority order and
/// writes one uniform report, even when sources are down or have changed
/// shape.
#[derive(Parser, Debug)]
#[command(name = "outage-watch")]
#[command(version)]
#[command(about = "Aggregates telecom carrier status into one report", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Region (e.g. ZIP code) to query regional carriers for; repeatable
    #[arg(short, long = "region", value_name = "REGION")]
    regions: Vec<String>,

    /// Override the JSON report path from the config
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Override the HTML report path from the config
    #[arg(long, value_name = "PATH", conflicts_with = "no_html")]
    html: Option<PathBuf>,

    /// Skip the HTML report
    #[arg(long)]
    no_html: bool,

    /// Validate config and show what would be queried without querying
    #[arg(long)]
    dry_run: bool,

    /// Print outcome statistics after the run
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    for region in &cli.regions {
        validate_region(region)?;
    }

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.regions);
        return Ok(());
    }

    handle_run(&cli, config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("outage_watch=info,warn"),
            1 => EnvFilter::new("outage_watch=debug,info"),
            2 => EnvFilter::new("outage_watch=trace,debug"),
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

/// Handles the --dry-run mode: shows the carrier table and planned queries
fn handle_dry_run(config: &Config, regions: &[String]) {
    println!("=== Outage Watch Dry Run ===\n");

    println!("Engine:");
    println!("  Concurrency: {}", config.engine.concurrency);
    println!("  Default timeout: {}s", config.engine.timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    println!("  HTML: {}", config.output.html_path);

    println!("\nCarriers ({}):", config.carriers.len());
    for carrier in &config.carriers {
        let regional = if carrier.regional { " [regional]" } else { "" };
        println!("  - {}{}", carrier.name, regional);
        for (priority, source) in carrier.sources.iter().enumerate() {
            println!(
                "    {}. {} via {}: {}",
                priority + 1,
                source.kind,
                source.adapter_id(),
                source.url
            );
        }
    }

    let plan = plan_run(&config.carriers, regions);
    println!("\nPlanned resolutions ({}):", plan.len());
    for planned in &plan {
        println!(
            "  - {} / {}",
            planned.carrier,
            planned.region.as_deref().unwrap_or("none")
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main aggregation run and writes the reports
async fn handle_run(cli: &Cli, config: Config, config_hash: String) -> anyhow::Result<()> {
    let engine = Engine::from_config(&config)?;

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // Without a signal handler the run can only complete normally
            std::future::pending::<()>().await;
        }
    };

    let report = match engine
        .run_until(&config.carriers, &cli.regions, shutdown)
        .await
    {
        Ok(report) => report.with_config_hash(config_hash),
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    let json_path = cli
        .json
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.json_path));
    let html_path = cli
        .html
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.html_path));

    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(JsonReportSink::new(json_path.clone()))];
    if !cli.no_html {
        sinks.push(Box::new(HtmlReportSink::new(html_path.clone())));
    }
    write_all(&sinks, &report)?;

    if cli.stats {
        print_statistics(&compute_statistics(&report));
        println!();
    }

    if cli.no_html {
        println!(
            "Saved {} outage summaries to {}",
            report.len(),
            json_path.display()
        );
    } else {
        println!(
            "Saved {} outage summaries to {} and {}",
            report.len(),
            json_path.display(),
            html_path.display()
        );
    }

    Ok(())
}
