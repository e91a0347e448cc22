//! Static Chart Renderer
//! Draws the full wheel map (title, sectors, labels, color bar) for export.
//!
//! Two outputs share one geometry:
//! - SVG document text, written by hand
//! - RGB raster, drawn with plotters' bitmap backend

use crate::charts::wheel::{fit_label, label_anchor, text_color_for, ChartFrame, WheelChart};
use crate::hierarchy::{format_number, plasma, ColorScale, Rgb, Sector, WheelTree, PLASMA};
use image::RgbImage;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::warn;

const COLORBAR_ID: &str = "wheel-colorbar";
const COLORBAR_FONT_SIZE: f64 = 12.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Raster buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

/// A sector label that fits, in pixels.
struct PlacedLabel {
    text: String,
    x: f64,
    y: f64,
    size: f64,
    color: Rgb,
}

pub struct StaticWheelRenderer;

impl StaticWheelRenderer {
    /// Standalone SVG document of the whole wheel.
    pub fn render_svg(chart: &WheelChart) -> String {
        let frame = ChartFrame::for_chart(chart);
        let layout = chart.layout(WheelTree::ROOT);
        let font_family = escape_xml(&chart.style.font_family);

        let mut svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">
<rect width="100%" height="100%" fill="#ffffff"/>
"##,
            w = frame.width,
            h = frame.height,
            font = font_family,
        );

        if !chart.settings.title.trim().is_empty() {
            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" font-size="{}" fill="#000000" text-anchor="middle" dominant-baseline="middle">{}</text>
"##,
                frame.title_pos.0,
                frame.title_pos.1,
                chart.style.font_size,
                escape_xml(&chart.settings.title),
            ));
        }

        svg.push_str("<g class=\"sectors\">\n");
        for sector in &layout.sectors {
            let fill = chart.node_color(sector.node);
            let fill_rule = if sector.is_full_turn() && sector.inner > 0.0 {
                r#" fill-rule="evenodd""#
            } else {
                ""
            };
            svg.push_str(&format!(
                r##"<path d="{}" fill="{}"{} stroke="#ffffff" stroke-width="1"><title>{}</title></path>
"##,
                svg_path(sector, &frame),
                fill.to_hex(),
                fill_rule,
                escape_xml(&chart.hover_text(sector.node)),
            ));
        }
        svg.push_str("</g>\n");

        svg.push_str("<g class=\"labels\">\n");
        for label in placed_labels(chart, &layout.sectors, &frame) {
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" fill="{}" text-anchor="middle" dominant-baseline="middle" pointer-events="none">{}</text>
"#,
                label.x,
                label.y,
                label.size,
                label.color.to_hex(),
                escape_xml(&label.text),
            ));
        }
        svg.push_str("</g>\n");

        if let ColorScale::Continuous { min, max } = chart.colors {
            svg.push_str(&svg_colorbar(&frame, &chart.color_column, min, max));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Rasterize the wheel at the chart's pixel size.
    pub fn render_rgb(chart: &WheelChart) -> Result<RgbImage, RenderError> {
        let width = chart.settings.width;
        let height = chart.settings.height;
        let frame = ChartFrame::for_chart(chart);
        let layout = chart.layout(WheelTree::ROOT);
        let families = chart.style.families();

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            for sector in &layout.sectors {
                let fill = to_plotters(chart.node_color(sector.node));
                let outline: Vec<(i32, i32)> = sector
                    .outline()
                    .into_iter()
                    .map(|p| pixel(&frame, p))
                    .collect();

                if sector.is_full_turn() && sector.inner > 0.0 {
                    // A ring outline would overlap itself at the seam, so fill piecewise.
                    for piece in sector.convex_pieces() {
                        let corners: Vec<(i32, i32)> =
                            piece.iter().map(|&p| pixel(&frame, p)).collect();
                        root.draw(&Polygon::new(corners, fill.filled()))
                            .map_err(draw_error)?;
                    }
                } else {
                    root.draw(&Polygon::new(outline.clone(), fill.filled()))
                        .map_err(draw_error)?;
                }

                let mut border = outline;
                if let Some(&first) = border.first() {
                    border.push(first);
                }
                root.draw(&PathElement::new(border, WHITE.stroke_width(1)))
                    .map_err(draw_error)?;
            }

            if !chart.settings.title.trim().is_empty() {
                draw_text(
                    &root,
                    &families,
                    &chart.settings.title,
                    frame.title_pos,
                    chart.style.font_size,
                    Rgb::BLACK,
                );
            }

            for label in placed_labels(chart, &layout.sectors, &frame) {
                draw_text(
                    &root,
                    &families,
                    &label.text,
                    (label.x, label.y),
                    label.size,
                    label.color,
                );
            }

            if let ColorScale::Continuous { min, max } = chart.colors {
                let (x, y, w, h) = frame.colorbar_rect();
                let rows = h.round().max(1.0) as i32;
                for i in 0..rows {
                    let t = 1.0 - i as f64 / rows as f64;
                    let color = to_plotters(plasma(t));
                    let top = y as i32 + i;
                    root.draw(&Rectangle::new(
                        [(x as i32, top), ((x + w) as i32, top + 1)],
                        color.filled(),
                    ))
                    .map_err(draw_error)?;
                }
                let label_x = x + w + 4.0 + 20.0;
                draw_text(&root, &families, &format_number(max), (label_x, y), COLORBAR_FONT_SIZE, Rgb::BLACK);
                draw_text(&root, &families, &format_number(min), (label_x, y + h), COLORBAR_FONT_SIZE, Rgb::BLACK);
            }

            root.present().map_err(draw_error)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))
    }
}

fn draw_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

fn pixel(frame: &ChartFrame, p: (f64, f64)) -> (i32, i32) {
    let (x, y) = frame.to_pixels(p);
    (x.round() as i32, y.round() as i32)
}

fn to_plotters(color: Rgb) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// Draw centered text, trying each font family in turn. Text is optional
/// decoration on a raster, so failures are logged and skipped.
fn draw_text(
    root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    families: &[String],
    text: &str,
    (x, y): (f64, f64),
    size: f64,
    color: Rgb,
) {
    let color = to_plotters(color);
    let mut last_error = None;
    for family in families {
        let style = TextStyle::from((family.as_str(), size).into_font())
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        match root.draw(&Text::new(text, (x.round() as i32, y.round() as i32), style)) {
            Ok(()) => return,
            Err(e) => last_error = Some(e.to_string()),
        }
    }
    if let Some(err) = last_error {
        warn!(text, error = %err, "label skipped");
    }
}

/// Labels that fit inside their sectors, in pixel coordinates.
fn placed_labels(chart: &WheelChart, sectors: &[Sector], frame: &ChartFrame) -> Vec<PlacedLabel> {
    sectors
        .iter()
        .filter_map(|sector| {
            let node = chart.tree.node(sector.node)?;
            let size = fit_label(&node.label, sector, frame.radius, chart.style.font_size)?;
            let (x, y) = frame.to_pixels(label_anchor(sector));
            Some(PlacedLabel {
                text: node.label.trim().to_string(),
                x,
                y,
                size,
                color: text_color_for(chart.node_color(sector.node)),
            })
        })
        .collect()
}

/// SVG path data for a sector.
fn svg_path(sector: &Sector, frame: &ChartFrame) -> String {
    let (cx, cy) = frame.center;
    let outer = sector.outer * frame.radius;
    let inner = sector.inner * frame.radius;

    if sector.is_full_turn() {
        let mut d = circle_path(cx, cy, outer);
        if inner > 0.0 {
            d.push(' ');
            d.push_str(&circle_path(cx, cy, inner));
        }
        return d;
    }

    let large = if sector.span() > 0.5 { 1 } else { 0 };
    let (ox0, oy0) = frame.to_pixels(Sector::point(sector.start, sector.outer));
    let (ox1, oy1) = frame.to_pixels(Sector::point(sector.end, sector.outer));

    if inner > 0.0 {
        let (ix1, iy1) = frame.to_pixels(Sector::point(sector.end, sector.inner));
        let (ix0, iy0) = frame.to_pixels(Sector::point(sector.start, sector.inner));
        format!(
            "M {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 0 {:.2} {:.2} Z",
            ox0, oy0, outer, outer, large, ox1, oy1, ix1, iy1, inner, inner, large, ix0, iy0
        )
    } else {
        format!(
            "M {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} L {:.2} {:.2} Z",
            ox0, oy0, outer, outer, large, ox1, oy1, cx, cy
        )
    }
}

/// Closed circle as two half arcs.
fn circle_path(cx: f64, cy: f64, r: f64) -> String {
    format!(
        "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
        cx - r,
        cy,
        cx + r,
        cy,
        cx - r,
        cy,
        r = r
    )
}

fn svg_colorbar(frame: &ChartFrame, column: &str, min: f64, max: f64) -> String {
    let (x, y, w, h) = frame.colorbar_rect();
    let stops: String = PLASMA
        .iter()
        .enumerate()
        .map(|(i, color)| {
            format!(
                r#"<stop offset="{:.3}" stop-color="{}"/>"#,
                i as f64 / (PLASMA.len() - 1) as f64,
                color.to_hex()
            )
        })
        .collect();

    format!(
        r##"<defs><linearGradient id="{id}" x1="0" y1="1" x2="0" y2="0">{stops}</linearGradient></defs>
<g class="colorbar">
<text x="{x:.2}" y="{ty:.2}" font-size="{fs}" fill="#000000">{column}</text>
<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="url(#{id})"/>
<text x="{lx:.2}" y="{y:.2}" font-size="{fs}" fill="#000000" dominant-baseline="middle">{max}</text>
<text x="{lx:.2}" y="{by:.2}" font-size="{fs}" fill="#000000" dominant-baseline="middle">{min}</text>
</g>
"##,
        id = COLORBAR_ID,
        stops = stops,
        x = x,
        y = y,
        w = w,
        h = h,
        ty = y - 10.0,
        lx = x + w + 4.0,
        by = y + h,
        fs = COLORBAR_FONT_SIZE,
        column = escape_xml(column),
        max = format_number(max),
        min = format_number(min),
    )
}

/// Escape text for XML/HTML content and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
