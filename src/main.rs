//! Wheel Map Maker - hierarchical sunburst charts from CSV/Excel data
//!
//! Starts the desktop UI, or exports a single chart when `--input` is given.

mod charts;
mod cli;
mod config;
mod data;
mod export;
mod gui;
mod hierarchy;
mod pdf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, ExportArgs};
use config::AppConfig;
use eframe::egui;
use gui::WheelMapApp;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wheel_map={}", level).into()),
        )
        .init();

    if let Some(input) = cli.export.input.clone() {
        return run_export(&cli.export, &input, &config).map(|_| ());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Wheel Map Maker"),
        ..Default::default()
    };

    eframe::run_native(
        "Wheel Map Maker",
        options,
        Box::new(move |cc| Ok(Box::new(WheelMapApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the UI: {}", e))
}

/// Build one chart from `input` and write it to disk. Returns the written path.
fn run_export(args: &ExportArgs, input: &Path, config: &AppConfig) -> Result<PathBuf> {
    let mut loader = data::DataLoader::new();
    let df = loader
        .load_file(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let settings = args.settings(config);
    let chart = charts::WheelChart::build(df, &settings, &config.chart.style())
        .context("Failed to build the wheel map")?;

    let format = args.format(config);
    let bytes = export::export_chart(&chart, format).context("Failed to export the wheel map")?;

    let output = args.output_path(config);
    std::fs::write(&output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(path = %output.display(), format = %format, "wheel map written");
    Ok(output)
}
