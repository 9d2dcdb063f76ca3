mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::var::{BatchArgs, VarArgs};

/// Portfolio Value-at-Risk calculator
#[derive(Parser)]
#[command(
    name = "pvar",
    version,
    about = "Portfolio Value-at-Risk calculator",
    long_about = "Estimates Value-at-Risk for an equally-weighted (or explicitly weighted) \
                  basket of equities from adjusted-close prices, using historical \
                  simulation and the parametric variance-covariance method."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute historical and parametric VaR for one request
    Var(VarArgs),
    /// Run several requests and print the history of results
    Batch(BatchArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portfolio_var_core=warn,pvar=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Var(args) => commands::var::run_var(args),
        Commands::Batch(args) => commands::var::run_batch(args),
        Commands::Version => {
            println!("pvar {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "rendering output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
