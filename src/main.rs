mod app;
mod charts;
mod cli;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

use app::DashboardApp;
use charts::DashboardSummary;
use cli::Cli;
use color::Theme;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    let theme = Theme::from_colors(&config.colors).context("reading theme colours")?;

    if cli.summary {
        let path = cli
            .path
            .as_deref()
            .context("--summary needs a data file path")?;
        return print_summary(path, &config);
    }

    let mut state = AppState::new(config, theme);
    if let Some(path) = &cli.path {
        ui::panels::load_into_state(&mut state, path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Partnership Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

/// Print the five chart summaries of the unfiltered dataset as JSON.
fn print_summary(path: &std::path::Path, config: &DashboardConfig) -> Result<()> {
    let dataset = data::loader::load_file(path, &config.columns)?;
    log::info!("Loaded {} records from {}", dataset.len(), path.display());
    let records: Vec<_> = dataset.records.iter().collect();
    let summary = DashboardSummary::build(&records, config.histogram_bins);
    let json = serde_json::to_string_pretty(&summary).context("serialising summary")?;
    println!("{json}");
    Ok(())
}
