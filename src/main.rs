use std::path::PathBuf;
use std::process::exit;

use chrono::Local;
use clap::Parser;
use color_eyre::{Help, Result};

mod analyze;
mod parse;
mod power;
mod report;

use analyze::{analyze, AnalysisError};

/// Report how long the laptop ran on battery since it was last unplugged,
/// split into active usage (display on) and sleep, based on `pmset -g log`.
#[derive(Parser)]
#[command(name = "screen-on-time")]
#[command(bin_name = "screen-on-time")]
struct Cli {
    /// Pre-captured `pmset -g log` output; queries pmset directly when omitted
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let log = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_note(|| format!("Failed to read log file: {}", path.display()))?,
        None => power::pmset_log()?,
    };
    let lines: Vec<&str> = log.lines().collect();

    match analyze(&lines, Local::now().naive_local(), power::current_charge) {
        Ok(report) => {
            print!("{report}");
            Ok(())
        }
        Err(AnalysisError::Other(report)) => Err(report),
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    }
}
