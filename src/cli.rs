//! Command-line interface.
//!
//! Without `--input` the desktop UI starts. With `--input` the chart is
//! built and exported once, without opening a window.

use crate::charts::{WheelSettings, MAX_SIZE, MIN_SIZE};
use crate::config::AppConfig;
use crate::export::{download_file_name, DownloadFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "wheel-map", version, about = "Hierarchical wheel maps from CSV/Excel data")]
pub struct Cli {
    /// Path to a TOML config file (default: ./wheel_map.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level or filter, overrides the config (e.g. "debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// Options for headless export.
#[derive(Debug, Clone, clap::Args)]
pub struct ExportArgs {
    /// Dataset to chart (.csv, .xlsx, .xls); enables headless export
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file or directory (default: the current directory); in a directory
    /// the file is named after the title
    #[arg(short, long, value_name = "FILE", requires = "input")]
    pub output: Option<PathBuf>,

    /// Hierarchy columns from the center outwards
    #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
    pub hierarchy: Vec<String>,

    /// Wheel map title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Label of the wheel center
    #[arg(long, default_value = "")]
    pub center_label: String,

    /// Rings to draw, counting the center (default: all)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// Plot width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_SIZE as i64..=MAX_SIZE as i64))]
    pub width: Option<u32>,

    /// Plot height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_SIZE as i64..=MAX_SIZE as i64))]
    pub height: Option<u32>,

    /// png, jpeg, webp, svg, pdf, html-full or html-div
    #[arg(short, long)]
    pub format: Option<DownloadFormat>,
}

impl ExportArgs {
    /// Chart settings from flags, falling back to the config defaults.
    pub fn settings(&self, config: &AppConfig) -> WheelSettings {
        let mut settings = WheelSettings {
            title: self.title.clone(),
            center_label: self.center_label.clone(),
            width: self.width.unwrap_or(config.chart.width),
            height: self.height.unwrap_or(config.chart.height),
            ..Default::default()
        };
        settings.set_hierarchy(self.hierarchy.clone());
        if let Some(depth) = self.max_depth {
            settings.max_depth = depth as usize;
        }
        settings.clamped()
    }

    pub fn format(&self, config: &AppConfig) -> DownloadFormat {
        self.format.unwrap_or(config.chart.download_format)
    }

    /// Output path. Directories get the download name derived from the title.
    pub fn output_path(&self, config: &AppConfig) -> PathBuf {
        let name = download_file_name(&self.title, self.format(config));
        match &self.output {
            Some(dir) if dir.is_dir() => dir.join(name),
            Some(file) => file.clone(),
            None => PathBuf::from(name),
        }
    }
}
