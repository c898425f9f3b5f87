mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::process;

use commands::expiry::DaysArgs;
use commands::payoff::PayoffArgs;
use commands::pricing::PriceArgs;
use commands::seller::YieldArgs;
use config::Settings;

/// Option pricing, Greeks and seller-yield analytics
#[derive(Parser)]
#[command(
    name = "oyield",
    version,
    about = "Option pricing, Greeks and seller-yield analytics",
    long_about = "A CLI for Black-Scholes-Merton option valuation with decimal precision. \
                  Prices European calls and puts with all first-order Greeks, analyses \
                  covered-call and cash-secured-put yields, and builds payoff profiles."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to the settings file, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// YAML settings file with default rate, dividend yield and curve resolution
    #[arg(long, global = true, env = "OYIELD_CONFIG")]
    config: Option<String>,

    /// Log level for stderr diagnostics (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European option with all Greeks
    Price(PriceArgs),
    /// Analyse covered-call / cash-secured-put yield
    Yield(YieldArgs),
    /// Build a long/short payoff profile
    Payoff(PayoffArgs),
    /// Count calendar days to an expiry date
    Days(DaysArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| settings.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level);
    tracing::debug!(config = ?cli.config, "settings loaded");

    let format = cli.output.or(settings.output).unwrap_or(OutputFormat::Json);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args, &settings),
        Commands::Yield(args) => commands::seller::run_yield(args, &settings),
        Commands::Payoff(args) => commands::payoff::run_payoff(args, &settings),
        Commands::Days(args) => commands::expiry::run_days(args),
        Commands::Version => {
            println!("oyield {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!("command failed: {e}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
