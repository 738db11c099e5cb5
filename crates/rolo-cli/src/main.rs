// Rolo CLI — generate contact reports from the terminal.
// Thin shell over the engine: parse arguments, load the snapshot, print
// the rollup. Exit code 0 on success; 1 on an invalid count or empty store.

use clap::{Parser, Subcommand};
use rolo::engine::metrics;
use rolo::{ContactStore, OutreachLedger, RoloConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolo", version, about = "Rolo — personal contact intelligence")]
struct Cli {
    /// Path to a rolo.toml config file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the top-N contacts ranked by importance score.
    Report {
        /// How many contacts to include (positive integer).
        count: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Report { count } => run_report(cli.config.as_deref(), &count),
    };
    std::process::exit(code);
}

fn run_report(config_path: Option<&std::path::Path>, raw_count: &str) -> i32 {
    let count = match raw_count.parse::<i64>() {
        Ok(n) if n > 0 => n as usize,
        Ok(n) => {
            eprintln!("rolo: report count must be positive, got {n}");
            return 1;
        }
        Err(_) => {
            eprintln!("rolo: report count must be a positive integer, got '{raw_count}'");
            return 1;
        }
    };

    match generate_report(config_path, count) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rolo: {e}");
            1
        }
    }
}

fn generate_report(
    config_path: Option<&std::path::Path>,
    count: usize,
) -> rolo::EngineResult<i32> {
    let config = RoloConfig::load(config_path)?;
    let storage = config.storage()?;
    let store = ContactStore::load(&storage)?;
    if store.is_empty() {
        eprintln!("rolo: contact store is empty — nothing to report");
        return Ok(1);
    }
    let ledger = OutreachLedger::load(&storage, config.signature_chunks.clone())?;

    let rows = metrics::top_contacts(&store, &ledger, count);
    println!("Top {} contacts", rows.len());
    println!("{:>3}  {:>5}  {:<24} {:<28} {:>4}  {}", "#", "SCORE", "NAME", "EMAIL", "SENT", "REPLIED");
    for row in &rows {
        println!(
            "{:>3}  {:>5}  {:<24} {:<28} {:>4}  {}",
            row.rank,
            row.score,
            row.name,
            row.email.as_deref().unwrap_or("-"),
            row.outreach_count,
            if row.responded { "yes" } else { "no" },
        );
    }

    let categories = metrics::category_summary(&ledger);
    if !categories.is_empty() {
        println!();
        println!("By category");
        for (name, bucket) in &categories {
            println!(
                "  {:<16} sent {:>4}  responses {:>4}  rate {:.0}%",
                name,
                bucket.sent,
                bucket.responses,
                bucket.response_rate * 100.0
            );
        }
    }

    let weekly = metrics::weekly_summary(&ledger);
    if !weekly.is_empty() {
        println!();
        println!("By ISO week");
        for week in weekly {
            println!(
                "  {}-W{:02}  sent {:>4}  responses {:>4}  rate {:.0}%",
                week.iso_year,
                week.iso_week,
                week.sent,
                week.responses,
                week.response_rate * 100.0
            );
        }
    }

    Ok(0)
}
