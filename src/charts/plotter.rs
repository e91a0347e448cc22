//! Chart Plotter Module
//! Interactive wheel map using egui_plot: hover shows node details,
//! clicking a sector zooms into it, clicking the center zooms out.

use crate::charts::wheel::{fit_label, label_anchor, text_color_for, WheelChart};
use crate::hierarchy::{Rgb, WheelLayout};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Line, Plot, PlotBounds, PlotPoint, PlotPoints, Polygon, Text};

/// Extra room around the unit disk.
const VIEW_EXTENT: f64 = 1.1;

/// Draws wheel layouts into an egui plot.
pub struct WheelPlotter;

impl WheelPlotter {
    pub fn to_color32(color: Rgb) -> Color32 {
        Color32::from_rgb(color.r, color.g, color.b)
    }

    /// Draw `layout` into a `size` x `size` plot.
    /// Returns the node that should become the new focus after a click.
    pub fn show(
        ui: &mut egui::Ui,
        chart: &WheelChart,
        layout: &WheelLayout,
        size: f32,
    ) -> Option<usize> {
        let radius_px = size as f64 / (2.0 * VIEW_EXTENT);

        let response = Plot::new("wheel_map")
            .width(size)
            .height(size)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .show_background(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [-VIEW_EXTENT, -VIEW_EXTENT],
                    [VIEW_EXTENT, VIEW_EXTENT],
                ));

                for sector in &layout.sectors {
                    let fill = Self::to_color32(chart.node_color(sector.node));

                    // egui fills convex shapes only, so each sector is drawn in slices.
                    for piece in sector.convex_pieces() {
                        let points: Vec<[f64; 2]> = piece.iter().map(|&(x, y)| [x, y]).collect();
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(points))
                                .fill_color(fill)
                                .stroke(Stroke::NONE),
                        );
                    }

                    let mut outline: Vec<[f64; 2]> =
                        sector.outline().into_iter().map(|(x, y)| [x, y]).collect();
                    if let Some(&first) = outline.first() {
                        outline.push(first);
                    }
                    plot_ui.line(
                        Line::new(PlotPoints::new(outline))
                            .color(Color32::WHITE)
                            .width(1.0),
                    );
                }

                for sector in &layout.sectors {
                    let Some(node) = chart.tree.node(sector.node) else {
                        continue;
                    };
                    let Some(font_size) =
                        fit_label(&node.label, sector, radius_px, chart.style.font_size)
                    else {
                        continue;
                    };
                    let (x, y) = label_anchor(sector);
                    let color = text_color_for(chart.node_color(sector.node));
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(node.label.trim())
                            .size(font_size as f32)
                            .color(Self::to_color32(color)),
                    ));
                }

                plot_ui.pointer_coordinate()
            });

        let hovered = response
            .inner
            .and_then(|p| layout.hit_test(p.x, p.y))
            .copied();
        let clicked = response.response.clicked();

        let sector = hovered?;
        response
            .response
            .on_hover_text_at_pointer(chart.hover_text(sector.node));

        if !clicked {
            return None;
        }
        Self::next_focus(chart, layout, sector.node)
    }

    /// Focus after clicking `node`: the center zooms out, anything else zooms in.
    pub fn next_focus(chart: &WheelChart, layout: &WheelLayout, node: usize) -> Option<usize> {
        if node == layout.focus {
            chart.tree.node(node).and_then(|n| n.parent)
        } else {
            Some(node)
        }
    }
}
