//! Wheel Chart Module
//! Builds the chart model from a DataFrame and holds the geometry shared by
//! the interactive plotter and the static renderer.

use crate::data::{DataProcessor, ProcessorError};
use crate::hierarchy::{ColorScale, Rgb, Sector, WheelLayout, WheelTree};
use polars::prelude::DataFrame;
use std::f64::consts::TAU;
use tracing::debug;

/// Plot size limits in pixels.
pub const MIN_SIZE: u32 = 500;
pub const MAX_SIZE: u32 = 2500;
pub const DEFAULT_SIZE: u32 = 750;

/// Labels smaller than this are hidden.
pub const MIN_LABEL_SIZE: f64 = 7.0;

// Plot margins (left, right, top, bottom)
const MARGIN_L: f64 = 80.0;
const MARGIN_R: f64 = 80.0;
const MARGIN_T: f64 = 100.0;
const MARGIN_B: f64 = 80.0;

/// User-facing chart options.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSettings {
    pub title: String,
    pub center_label: String,
    /// Hierarchy columns from the center outwards.
    pub hierarchy: Vec<String>,
    /// Rings drawn, counting the center disk.
    pub max_depth: usize,
    pub width: u32,
    pub height: u32,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            center_label: String::new(),
            hierarchy: Vec::new(),
            max_depth: 1,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
        }
    }
}

impl WheelSettings {
    /// Largest meaningful depth: the center plus one ring per column.
    pub fn max_depth_limit(&self) -> usize {
        1 + self.hierarchy.len()
    }

    /// Replace the hierarchy and show every level of it.
    pub fn set_hierarchy(&mut self, hierarchy: Vec<String>) {
        self.hierarchy = hierarchy;
        self.max_depth = self.max_depth_limit();
    }

    /// Copy with depth and size forced into their allowed ranges.
    pub fn clamped(&self) -> Self {
        let mut settings = self.clone();
        settings.max_depth = settings.max_depth.clamp(1, settings.max_depth_limit());
        settings.width = settings.width.clamp(MIN_SIZE, MAX_SIZE);
        settings.height = settings.height.clamp(MIN_SIZE, MAX_SIZE);
        settings
    }
}

/// Fonts used for the title and sector labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub font_family: String,
    pub font_size: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 18.0,
        }
    }
}

impl ChartStyle {
    /// Font families in preference order, always ending with a generic sans-serif.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .font_family
            .split(',')
            .map(|f| f.trim().trim_matches('"').to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !families.iter().any(|f| f == "sans-serif") {
            families.push("sans-serif".to_string());
        }
        families
    }
}

/// A wheel map ready to draw.
#[derive(Debug, Clone)]
pub struct WheelChart {
    pub settings: WheelSettings,
    pub style: ChartStyle,
    pub tree: WheelTree,
    pub colors: ColorScale,
    pub color_column: String,
}

impl WheelChart {
    /// Aggregate `df` along the chosen hierarchy, colored by its first column.
    pub fn build(
        df: &DataFrame,
        settings: &WheelSettings,
        style: &ChartStyle,
    ) -> Result<Self, ProcessorError> {
        let settings = settings.clamped();
        let color_column = DataProcessor::default_color_column(df, &settings.hierarchy)?;
        let prepared = DataProcessor::prepare_rows(
            df,
            &settings.center_label,
            &settings.hierarchy,
            &color_column,
        )?;

        let tree = WheelTree::from_rows(&prepared.rows);
        let colors = ColorScale::from_rows(&prepared);
        debug!(
            nodes = tree.len(),
            levels = tree.height(),
            depth = settings.max_depth,
            continuous = colors.is_continuous(),
            "wheel chart built"
        );

        Ok(Self {
            settings,
            style: style.clone(),
            tree,
            colors,
            color_column: prepared.color_column,
        })
    }

    /// Layout with `focus` at the center.
    pub fn layout(&self, focus: usize) -> WheelLayout {
        WheelLayout::compute(&self.tree, focus, Some(self.settings.max_depth))
    }

    pub fn node_color(&self, idx: usize) -> Rgb {
        self.tree
            .node(idx)
            .map(|node| self.colors.color_of(&node.color))
            .unwrap_or(Rgb::WHITE)
    }

    /// Hover text for a node, one `key=value` pair per line.
    pub fn hover_text(&self, idx: usize) -> String {
        let Some(node) = self.tree.node(idx) else {
            return String::new();
        };
        format!(
            "labels={}\ncount={}\nparent={}\nid={}\n{}={}",
            node.label,
            node.count,
            self.tree.parent_label(idx),
            node.id,
            self.color_column,
            self.colors.legend_label(&node.color),
        )
    }
}

/// Pixel geometry of a rendered chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub center: (f64, f64),
    pub radius: f64,
    pub title_pos: (f64, f64),
}

impl ChartFrame {
    pub fn for_chart(chart: &WheelChart) -> Self {
        Self::new(chart.settings.width, chart.settings.height)
    }

    pub fn new(width: u32, height: u32) -> Self {
        let width = width as f64;
        let height = height as f64;
        let plot_w = (width - MARGIN_L - MARGIN_R).max(1.0);
        let plot_h = (height - MARGIN_T - MARGIN_B).max(1.0);

        Self {
            width,
            height,
            center: (MARGIN_L + plot_w / 2.0, MARGIN_T + plot_h / 2.0),
            radius: plot_w.min(plot_h) / 2.0,
            title_pos: (width / 2.0, MARGIN_T / 2.0),
        }
    }

    /// Unit coordinates (y up) to pixels (y down).
    pub fn to_pixels(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.center.0 + x * self.radius,
            self.center.1 - y * self.radius,
        )
    }

    /// Color bar rectangle `(x, y, w, h)` in the right margin.
    pub fn colorbar_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.width - MARGIN_R + 10.0,
            MARGIN_T,
            15.0,
            (self.height - MARGIN_T - MARGIN_B).max(1.0),
        )
    }
}

/// Font size that fits `label` inside `sector`, or `None` when it does not fit.
pub fn fit_label(label: &str, sector: &Sector, radius_px: f64, max_size: f64) -> Option<f64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let chars = label.chars().count() as f64;

    let (avail_w, avail_h) = if sector.inner == 0.0 {
        let diameter = 2.0 * sector.outer * radius_px;
        (diameter * 0.8, diameter * 0.8)
    } else {
        let thickness = (sector.outer - sector.inner) * radius_px;
        let arc = sector.span() * TAU * sector.mid_radius() * radius_px;
        (arc.max(thickness) * 0.85, arc.min(thickness) * 0.85)
    };

    let size = max_size.min(avail_w / (chars * 0.6)).min(avail_h);
    (size >= MIN_LABEL_SIZE).then_some(size)
}

/// Label position of a sector in unit coordinates.
pub fn label_anchor(sector: &Sector) -> (f64, f64) {
    Sector::point(sector.mid_angle(), sector.mid_radius())
}

/// Readable text color on top of `fill`.
pub fn text_color_for(fill: Rgb) -> Rgb {
    if fill.luminance() < 0.5 {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_df() -> DataFrame {
        df!(
            "continent" => ["Europe", "Europe", "Asia", "Europe"],
            "country" => ["France", "Spain", "Japan", "France"],
            "pop" => [67.0, 47.0, 125.0, 67.0]
        )
        .unwrap()
    }

    fn settings(hierarchy: &[&str]) -> WheelSettings {
        let mut settings = WheelSettings {
            title: "Population".to_string(),
            center_label: "World".to_string(),
            ..Default::default()
        };
        settings.set_hierarchy(hierarchy.iter().map(|s| s.to_string()).collect());
        settings
    }

    #[test]
    fn test_settings_clamp() {
        let mut s = settings(&["continent"]);
        assert_eq!(s.max_depth, 2);
        s.max_depth = 9;
        s.width = 100;
        s.height = 9000;
        let clamped = s.clamped();
        assert_eq!(clamped.max_depth, 2);
        assert_eq!(clamped.width, MIN_SIZE);
        assert_eq!(clamped.height, MAX_SIZE);
    }

    #[test]
    fn test_build_colors_by_first_hierarchy_column() {
        let chart =
            WheelChart::build(&sample_df(), &settings(&["continent", "country"]), &ChartStyle::default())
                .unwrap();
        assert_eq!(chart.color_column, "continent");
        assert_eq!(chart.tree.root().label, "World");
        assert_eq!(chart.tree.root().count, 4);
        assert!(!chart.colors.is_continuous());

        let layout = chart.layout(WheelTree::ROOT);
        assert_eq!(layout.rings, 3);
        assert_eq!(layout.sectors.len(), chart.tree.len());
    }

    #[test]
    fn test_build_without_hierarchy_uses_first_column() {
        let df = sample_df().select(["pop", "country"]).unwrap();
        let chart = WheelChart::build(&df, &settings(&[]), &ChartStyle::default()).unwrap();
        assert_eq!(chart.color_column, "pop");
        assert!(chart.colors.is_continuous());
        assert_eq!(chart.tree.len(), 1);
    }

    #[test]
    fn test_hover_text() {
        let chart =
            WheelChart::build(&sample_df(), &settings(&["continent", "country"]), &ChartStyle::default())
                .unwrap();
        let france = chart
            .tree
            .nodes()
            .iter()
            .position(|n| n.label == "France")
            .unwrap();
        assert_eq!(
            chart.hover_text(france),
            "labels=France\ncount=2\nparent=Europe\nid=World/Europe/France\ncontinent=Europe"
        );
        assert!(chart.hover_text(WheelTree::ROOT).ends_with("continent=(?)"));
    }

    #[test]
    fn test_frame_geometry() {
        let frame = ChartFrame::new(750, 750);
        assert_eq!(frame.center, (375.0, 385.0));
        assert_eq!(frame.radius, 285.0);
        assert_eq!(frame.title_pos, (375.0, 50.0));
        assert_eq!(frame.to_pixels((0.0, 1.0)), (375.0, 100.0));
    }

    #[test]
    fn test_fit_label() {
        let center = Sector {
            node: 0,
            ring: 0,
            start: 0.0,
            end: 1.0,
            inner: 0.0,
            outer: 0.5,
        };
        assert_eq!(fit_label("World", &center, 300.0, 18.0), Some(18.0));
        assert_eq!(fit_label(" ", &center, 300.0, 18.0), None);

        let sliver = Sector {
            node: 1,
            ring: 1,
            start: 0.0,
            end: 0.001,
            inner: 0.5,
            outer: 1.0,
        };
        assert_eq!(fit_label("Tiny", &sliver, 300.0, 18.0), None);
    }

    #[test]
    fn test_text_color_and_families() {
        assert_eq!(text_color_for(Rgb::new(13, 8, 135)), Rgb::WHITE);
        assert_eq!(text_color_for(Rgb::new(254, 203, 82)), Rgb::BLACK);
        assert_eq!(ChartStyle::default().families(), vec!["Arial", "sans-serif"]);
    }
}
