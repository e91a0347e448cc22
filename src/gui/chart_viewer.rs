//! Chart Viewer Widget
//! Central panel showing the interactive wheel map.

use crate::charts::{WheelChart, WheelPlotter};
use crate::hierarchy::WheelTree;
use egui::{Color32, RichText, ScrollArea};

const NO_DATASET: &str =
    "No dataset has been uploaded! Please, upload a dataset to start the process.";

/// Scrollable wheel display with click-to-zoom state.
pub struct ChartViewer {
    /// Node drawn at the center
    pub focus: usize,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            focus: WheelTree::ROOT,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zoom back out to the root
    pub fn reset(&mut self) {
        self.focus = WheelTree::ROOT;
    }

    /// Draw the viewer. `chart` is `None` before any dataset is loaded.
    pub fn show(&mut self, ui: &mut egui::Ui, chart: Option<&Result<WheelChart, String>>) {
        let Some(chart) = chart else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(format!("⚠ {}", NO_DATASET))
                        .size(16.0)
                        .color(Color32::from_rgb(255, 193, 7)),
                );
            });
            return;
        };

        let chart = match chart {
            Ok(chart) => chart,
            Err(error) => {
                ui.label(
                    RichText::new(format!("Error: {}", error))
                        .size(14.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                return;
            }
        };

        if chart.tree.node(self.focus).is_none() {
            self.reset();
        }

        let size = chart.settings.width.min(chart.settings.height) as f32;

        ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.set_width(size.max(ui.available_width()));
                if !chart.settings.title.trim().is_empty() {
                    ui.label(RichText::new(&chart.settings.title).size(20.0).strong());
                }

                if self.focus != WheelTree::ROOT && ui.button("↺ Reset view").clicked() {
                    self.reset();
                }

                let layout = chart.layout(self.focus);
                if let Some(focus) = WheelPlotter::show(ui, chart, &layout, size) {
                    self.focus = focus;
                }
            });
        });
    }
}
