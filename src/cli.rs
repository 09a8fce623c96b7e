//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Partnership Dashboard - explore school partnership contracts
#[derive(Parser, Debug)]
#[command(name = "partner-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Data file to open on startup (CSV, JSON, or Parquet)
    pub path: Option<PathBuf>,

    /// JSON config file overriding column names, colours and histogram bins
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the chart summaries as JSON and exit instead of opening a window
    #[arg(long, requires = "path")]
    pub summary: bool,
}
