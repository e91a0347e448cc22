//! Control Panel Widget
//! Left side panel with the dataset picker, chart options and download controls.

use crate::charts::{WheelSettings, MAX_SIZE, MIN_SIZE};
use crate::config::AppConfig;
use crate::export::DownloadFormat;
use egui::{Color32, ComboBox, DragValue, RichText};
use std::path::PathBuf;

/// Left side control panel.
pub struct ControlPanel {
    pub settings: WheelSettings,
    pub format: DownloadFormat,
    pub file_path: Option<PathBuf>,
    pub columns: Vec<String>,
    pub last_export: Option<PathBuf>,
    pub status: String,
    sample_data_url: String,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            settings: WheelSettings {
                width: config.chart.width,
                height: config.chart.height,
                ..Default::default()
            },
            format: config.chart.download_format,
            file_path: None,
            columns: Vec::new(),
            last_export: None,
            status: "Ready".to_string(),
            sample_data_url: config.app.sample_data_url.clone(),
        }
    }

    /// New dataset: keep the chart options but drop the column selection.
    pub fn update_columns(&mut self, columns: Vec<String>, file_path: PathBuf) {
        self.columns = columns;
        self.file_path = Some(file_path);
        self.settings.set_hierarchy(Vec::new());
    }

    pub fn has_dataset(&self) -> bool {
        self.file_path.is_some()
    }

    /// Columns that can still be added to the hierarchy.
    pub fn available_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !self.settings.hierarchy.contains(c))
            .cloned()
            .collect()
    }

    pub fn add_hierarchy_column(&mut self, column: &str) {
        if self.settings.hierarchy.iter().any(|c| c == column) {
            return;
        }
        let mut hierarchy = self.settings.hierarchy.clone();
        hierarchy.push(column.to_string());
        self.settings.set_hierarchy(hierarchy);
    }

    pub fn remove_hierarchy_column(&mut self, idx: usize) {
        if idx >= self.settings.hierarchy.len() {
            return;
        }
        let mut hierarchy = self.settings.hierarchy.clone();
        hierarchy.remove(idx);
        self.settings.set_hierarchy(hierarchy);
    }

    /// Swap column `idx` with its neighbor towards the center (`up`) or the rim.
    pub fn move_hierarchy_column(&mut self, idx: usize, up: bool) {
        let len = self.settings.hierarchy.len();
        let target = if up { idx.checked_sub(1) } else { Some(idx + 1) };
        let Some(target) = target.filter(|&t| t < len && idx < len) else {
            return;
        };
        let mut hierarchy = self.settings.hierarchy.clone();
        hierarchy.swap(idx, target);
        self.settings.set_hierarchy(hierarchy);
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🎡 Wheel Map Maker")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Dataset =====
        ui.label(RichText::new("📁 Dataset").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .file_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    let path_color = if self.file_path.is_some() {
                        ui.visuals().strong_text_color()
                    } else {
                        Color32::GRAY
                    };
                    ui.label(RichText::new(&path_text).size(12.0).color(path_color));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                    });
                });
            });

        if !self.has_dataset() {
            ui.add_space(8.0);
            ui.label("Upload a .csv or .xlsx file to get started");
            ui.hyperlink_to("Sample data", &self.sample_data_url);
            ui.add_space(15.0);
            ui.separator();
            self.show_status(ui);
            return action;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Text =====
        ui.label(RichText::new("✏ Labels").size(14.0).strong());
        ui.add_space(5.0);

        let label_width = 110.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Map Title:"));
            ui.text_edit_singleline(&mut self.settings.title);
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Center Label:"));
            ui.text_edit_singleline(&mut self.settings.center_label);
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Hierarchy =====
        ui.label(RichText::new("🔧 Hierarchy").size(14.0).strong());
        ui.add_space(5.0);

        let mut remove = None;
        let mut shift = None;
        let count = self.settings.hierarchy.len();
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                if count == 0 {
                    ui.label(RichText::new("No columns selected").color(Color32::GRAY));
                }
                for (i, column) in self.settings.hierarchy.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!("{}. {}", i + 1, column));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✖").clicked() {
                                remove = Some(i);
                            }
                            if ui
                                .add_enabled(i + 1 < count, egui::Button::new("⬇").small())
                                .clicked()
                            {
                                shift = Some((i, false));
                            }
                            if ui.add_enabled(i > 0, egui::Button::new("⬆").small()).clicked() {
                                shift = Some((i, true));
                            }
                        });
                    });
                }
            });

        if let Some(idx) = remove {
            self.remove_hierarchy_column(idx);
        } else if let Some((idx, up)) = shift {
            self.move_hierarchy_column(idx, up);
        }

        ui.add_space(5.0);
        let mut added = None;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Add Column:"));
            ComboBox::from_id_salt("hierarchy_add")
                .width(combo_width)
                .selected_text("Choose...")
                .show_ui(ui, |ui| {
                    for column in self.available_columns() {
                        if ui.selectable_label(false, &column).clicked() {
                            added = Some(column);
                        }
                    }
                });
        });
        if let Some(column) = added {
            self.add_hierarchy_column(&column);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Size =====
        ui.label(RichText::new("📐 Layout").size(14.0).strong());
        ui.add_space(5.0);

        let depth_limit = self.settings.max_depth_limit();
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Maximum Depth:"));
            ui.add(DragValue::new(&mut self.settings.max_depth).range(1..=depth_limit));
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Height:"));
            ui.add(
                DragValue::new(&mut self.settings.height)
                    .range(MIN_SIZE..=MAX_SIZE)
                    .suffix(" px"),
            );
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Width:"));
            ui.add(
                DragValue::new(&mut self.settings.width)
                    .range(MIN_SIZE..=MAX_SIZE)
                    .suffix(" px"),
            );
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Download =====
        ui.label(RichText::new("💾 Download").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Format:"));
            ComboBox::from_id_salt("download_format")
                .width(combo_width)
                .selected_text(self.format.label())
                .show_ui(ui, |ui| {
                    for format in DownloadFormat::ALL {
                        ui.selectable_value(&mut self.format, format, format.label());
                    }
                });
        });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("⬇ Download Map").size(16.0))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Download;
            }

            ui.add_space(8.0);
            ui.add_enabled_ui(self.last_export.is_some(), |ui| {
                let open_button = egui::Button::new(RichText::new("📄 Open last export").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(open_button).clicked() {
                    action = ControlPanelAction::OpenLastExport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        self.show_status(ui);

        action
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.add_space(5.0);
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Saved") || self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    Download,
    OpenLastExport,
}
