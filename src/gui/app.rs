//! Wheel Map Maker Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{WheelChart, WheelSettings};
use crate::config::AppConfig;
use crate::data::{DataLoader, SUPPORTED_EXTENSIONS};
use crate::export::{download_file_name, export_chart};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { df: DataFrame, path: PathBuf },
    Error(String),
}

/// Last built chart and the inputs it was built from.
struct ChartCache {
    generation: u64,
    settings: WheelSettings,
    chart: Result<WheelChart, String>,
}

/// Main application window.
pub struct WheelMapApp {
    config: AppConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    /// Bumped on every successful load
    data_generation: u64,
    cache: Option<ChartCache>,
}

impl WheelMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            control_panel: ControlPanel::new(&config),
            config,
            loader: DataLoader::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            data_generation: 0,
            cache: None,
        }
    }

    /// Pick a dataset and read it on a background thread
    fn handle_browse_file(&mut self) {
        if self.is_loading {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Datasets", &SUPPORTED_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        self.control_panel.set_status("Loading dataset...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!(
                "Reading {}...",
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            )));

            match DataLoader::read_file(&path) {
                Ok(df) => {
                    let _ = tx.send(LoadResult::Complete { df, path });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        let mut should_keep_receiver = true;

        while let Ok(result) = rx.try_recv() {
            match result {
                LoadResult::Progress(status) => {
                    self.control_panel.set_status(&status);
                }
                LoadResult::Complete { df, path } => {
                    self.loader.set_dataframe(df, path);
                    let columns = self.loader.get_columns();
                    self.control_panel.set_status(&format!(
                        "Loaded {} rows, {} columns",
                        self.loader.get_row_count(),
                        columns.len()
                    ));
                    if let Some(path) = self.loader.get_file_path() {
                        self.control_panel.update_columns(columns, path.clone());
                    }
                    self.data_generation += 1;
                    self.is_loading = false;
                    should_keep_receiver = false;
                }
                LoadResult::Error(e) => {
                    error!(error = %e, "dataset load failed");
                    self.control_panel.set_status(&format!("Error: {}", e));
                    self.is_loading = false;
                    should_keep_receiver = false;
                }
            }
        }

        if should_keep_receiver {
            self.load_rx = Some(rx);
        }
    }

    /// Rebuild the chart when the dataset or the settings changed
    fn refresh_chart(&mut self) {
        let Some(df) = self.loader.get_dataframe() else {
            self.cache = None;
            return;
        };
        let settings = self.control_panel.settings.clamped();

        if let Some(cache) = &self.cache {
            if cache.generation == self.data_generation && cache.settings == settings {
                return;
            }
        }

        let same_tree = self.cache.as_ref().is_some_and(|cache| {
            cache.generation == self.data_generation
                && cache.settings.hierarchy == settings.hierarchy
                && cache.settings.center_label == settings.center_label
        });
        if !same_tree {
            self.chart_viewer.reset();
        }

        let chart = WheelChart::build(df, &settings, &self.config.chart.style()).map_err(|e| {
            warn!(error = %e, "wheel map build failed");
            e.to_string()
        });
        self.cache = Some(ChartCache {
            generation: self.data_generation,
            settings,
            chart,
        });
    }

    /// Export the current chart through a save dialog
    fn handle_download(&mut self) {
        let Some(ChartCache { chart: Ok(chart), .. }) = &self.cache else {
            self.control_panel.set_status("Error: no wheel map to download");
            return;
        };

        let format = self.control_panel.format;
        let file_name = download_file_name(&chart.settings.title, format);
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(&file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        let result = export_chart(chart, format)
            .map_err(|e| e.to_string())
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                info!(path = %path.display(), format = %format, "wheel map saved");
                self.control_panel
                    .set_status(&format!("Saved {}", path.display()));
                self.control_panel.last_export = Some(path);
            }
            Err(e) => {
                error!(error = %e, "download failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn handle_open_last_export(&mut self) {
        let Some(path) = self.control_panel.last_export.clone() else {
            return;
        };
        if let Err(e) = open::that(&path) {
            warn!(path = %path.display(), error = %e, "could not open export");
            self.control_panel.set_status(&format!("Error: {}", e));
        }
    }
}

impl eframe::App for WheelMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::Download => {
                            self.refresh_chart();
                            self.handle_download();
                        }
                        ControlPanelAction::OpenLastExport => self.handle_open_last_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        self.refresh_chart();

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let chart = self.cache.as_ref().map(|cache| &cache.chart);
            self.chart_viewer.show(ui, chart);
        });
    }
}
