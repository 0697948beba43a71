use std::{path::PathBuf, time::Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use dupcount::{gen::write_test_file, util::log_duration, *};

/// Count integers in a file that already appeared earlier in the same file.
#[derive(clap::Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a file of n integers -2^63 < a_i < 2^63 and report the number of duplicates.
    Count {
        path: PathBuf,
        /// Number of integers in the file, 1 <= n < 2^32.
        n: usize,
        /// Hash table slots per integer.
        #[arg(long, default_value_t = 2)]
        factor: usize,
        /// Integers per pipelined batch.
        #[arg(long, default_value_t = 100_000)]
        batch: usize,
        /// Print table geometry and timings.
        #[arg(long)]
        stats: bool,
    },
    /// Write a test file of n random integers of up to 10 digits.
    Gen {
        path: PathBuf,
        n: usize,
        #[arg(long, default_value_t = 31415)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let Args { command } = Args::parse();

    match command {
        Command::Count {
            path,
            n,
            factor,
            batch,
            stats,
        } => {
            let start = Instant::now();
            let params = DedupParams {
                factor,
                batch_size: batch,
                print_stats: stats,
                ..Default::default()
            };
            let summary = run_deduplication_with_params(&path, n, params)?;
            if summary.total < n as u64 {
                eprintln!(
                    "Only {} of {n} integers found in {}.",
                    summary.total,
                    path.display()
                );
            }
            if summary.reserved > 0 {
                eprintln!("Skipped {} reserved values.", summary.reserved);
            }
            if summary.full > 0 {
                eprintln!("Table full: dropped {} integers.", summary.full);
            }
            println!("{summary}");
            if stats {
                log_duration("total", start);
            }
        }
        Command::Gen { path, n, seed } => {
            write_test_file(&path, n, seed)?;
        }
    }
    Ok(())
}
