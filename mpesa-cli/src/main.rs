use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mpesa_finance::{convert, summarize};
use mpesa_ingest::{parse_statement, read_statement};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mpesa", version, about = "M-Pesa statement text to CSV extractor")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from a statement text dump and write them as CSV
    Convert {
        /// Raw statement text (UTF-8)
        #[arg(long, default_value = "raw_subset.txt")]
        input: PathBuf,

        /// Destination CSV
        #[arg(long, default_value = "sample_data.csv")]
        output: PathBuf,
    },

    /// Print totals, closing balance and fee consolidation for a statement dump
    Summary {
        /// Raw statement text (UTF-8)
        #[arg(long, default_value = "raw_subset.txt")]
        input: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "mpesa_cli=info,mpesa_finance=info,mpesa_ingest=warn",
        1 => "mpesa_cli=debug,mpesa_finance=debug,mpesa_ingest=debug",
        _ => "mpesa_cli=trace,mpesa_finance=trace,mpesa_ingest=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert { input, output } => {
            let report = convert(&input, &output).with_context(|| {
                format!("converting {} -> {}", input.display(), output.display())
            })?;
            println!("Successfully processed {} records.", report.records);
        }

        Command::Summary { input, json } => {
            debug!(input = %input.display(), json, "summarizing statement");
            let text = read_statement(&input)?;
            let records = parse_statement(&text)
                .with_context(|| format!("parsing {}", input.display()))?;
            let summary = summarize(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Parsed {} transactions from {}", summary.records, input.display());
            println!(
                "Completed: {} | Unknown: {}",
                summary.completed, summary.unknown
            );
            println!("Paid in:   {:.2}", summary.total_paid_in);
            println!("Withdrawn: {:.2}", summary.total_withdrawn);
            println!("Net flow:  {:.2}", summary.net_flow);
            println!("Fees:      {:.2}", summary.total_fees);
            println!(
                "Transactions after fee consolidation: {}",
                summary.consolidated_transactions
            );
            match summary.closing_balance {
                Some(b) => println!("Closing balance: {:.2}", b),
                None => println!("Closing balance: n/a"),
            }
            if let (Some(first), Some(last)) = (summary.first_completed, summary.last_completed) {
                println!("Period: {} .. {}", first, last);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::try_parse_from(["mpesa", "convert"]).unwrap();
        match cli.command {
            Command::Convert { input, output } => {
                assert_eq!(input, PathBuf::from("raw_subset.txt"));
                assert_eq!(output, PathBuf::from("sample_data.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global_and_counted() {
        let cli = Cli::try_parse_from(["mpesa", "summary", "--input", "a.txt", "-vv", "--json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Summary { json: true, .. }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
