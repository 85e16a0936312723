mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::chart::ChartArgs;
use commands::export::ExportArgs;
use commands::plan::ParsePlanArgs;
use commands::simulate::SimulateArgs;

/// Ticket-sale receivable flow simulation
#[derive(Parser)]
#[command(
    name = "tix",
    version,
    about = "Ticket-sale receivable flow simulation",
    long_about = "Simulates when ticket-sale installments are received and what they are \
                  worth: installments due before the event arrive on schedule (flow), \
                  later ones are advanced at a discount and reinvested until the event. \
                  Rates are monthly percentages over 30-day months."
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
    /// Simulate flow vs. advance receipt for every installment
    Simulate(SimulateArgs),
    /// Chart net value by receipt day
    Chart(ChartArgs),
    /// Write the simulation as workbook CSVs and/or a paginated text report
    Export(ExportArgs),
    /// Check a freeform "installments;percentage" plan
    ParsePlan(ParsePlanArgs),
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Chart(args) => commands::chart::run_chart(args),
        Commands::Export(args) => commands::export::run_export(args),
        Commands::ParsePlan(args) => commands::plan::run_parse_plan(args),
        Commands::Version => {
            println!("tix {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap_or_else(|e| panic!("{args:?}: {e}"))
    }

    #[test]
    fn test_buckets_followed_by_global_flag() {
        let cli = parse(&["tix", "simulate", "--buckets", "20,20,20,20,20", "--output", "minimal"]);
        assert!(matches!(cli.output, OutputFormat::Minimal));
        match cli.command {
            Commands::Simulate(args) => assert_eq!(args.scenario.buckets.len(), 5),
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_buckets_followed_by_scenario_flag() {
        let cli = parse(&["tix", "simulate", "--buckets", "50,0,0,25,25", "--event-days", "60"]);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.scenario.buckets.len(), 5);
                assert_eq!(args.scenario.event_days, Some(60));
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_negative_event_days_accepted() {
        let cli = parse(&["tix", "simulate", "--event-days", "-30", "--output", "minimal"]);
        match cli.command {
            Commands::Simulate(args) => assert_eq!(args.scenario.event_days, Some(-30)),
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_conflicting_event_inputs_rejected() {
        assert!(Cli::try_parse_from([
            "tix",
            "simulate",
            "--event-days",
            "30",
            "--event-date",
            "2027-01-01"
        ])
        .is_err());
    }
}
