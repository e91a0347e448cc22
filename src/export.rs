//! Chart Export Module
//! Converts a wheel chart into downloadable bytes in the selected format.

use crate::charts::{escape_xml, RenderError, StaticWheelRenderer, WheelChart};
use crate::pdf::PdfWriter;
use image::{ImageFormat, RgbImage};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
#[error("Unknown download format: {0}")]
pub struct ParseFormatError(String);

/// Formats offered by the download selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Svg,
    Pdf,
    HtmlFull,
    HtmlDiv,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 7] = [
        DownloadFormat::Png,
        DownloadFormat::Jpeg,
        DownloadFormat::Webp,
        DownloadFormat::Svg,
        DownloadFormat::Pdf,
        DownloadFormat::HtmlFull,
        DownloadFormat::HtmlDiv,
    ];

    /// Text shown in the format selector.
    pub fn label(self) -> &'static str {
        match self {
            DownloadFormat::Png => "png",
            DownloadFormat::Jpeg => "jpeg",
            DownloadFormat::Webp => "webp",
            DownloadFormat::Svg => "svg",
            DownloadFormat::Pdf => "pdf",
            DownloadFormat::HtmlFull => "html (full)",
            DownloadFormat::HtmlDiv => "html (div only)",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DownloadFormat::HtmlFull | DownloadFormat::HtmlDiv => "html",
            other => other.label(),
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DownloadFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "png" => Ok(DownloadFormat::Png),
            "jpeg" | "jpg" => Ok(DownloadFormat::Jpeg),
            "webp" => Ok(DownloadFormat::Webp),
            "svg" => Ok(DownloadFormat::Svg),
            "pdf" => Ok(DownloadFormat::Pdf),
            "html (full)" | "html-full" | "html" => Ok(DownloadFormat::HtmlFull),
            "html (div only)" | "html-div" => Ok(DownloadFormat::HtmlDiv),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Render `chart` into the bytes of a `format` file.
pub fn export_chart(chart: &WheelChart, format: DownloadFormat) -> Result<Vec<u8>, ExportError> {
    let bytes = match format {
        DownloadFormat::Png => encode_raster(&StaticWheelRenderer::render_rgb(chart)?, ImageFormat::Png)?,
        DownloadFormat::Jpeg => encode_raster(&StaticWheelRenderer::render_rgb(chart)?, ImageFormat::Jpeg)?,
        DownloadFormat::Webp => encode_raster(&StaticWheelRenderer::render_rgb(chart)?, ImageFormat::WebP)?,
        DownloadFormat::Svg => StaticWheelRenderer::render_svg(chart).into_bytes(),
        DownloadFormat::Pdf => {
            let image = StaticWheelRenderer::render_rgb(chart)?;
            let jpeg = encode_raster(&image, ImageFormat::Jpeg)?;
            PdfWriter::single_image_page(&jpeg, image.width(), image.height())
        }
        DownloadFormat::HtmlFull => to_html(chart, true).into_bytes(),
        DownloadFormat::HtmlDiv => to_html(chart, false).into_bytes(),
    };

    info!(format = %format, bytes = bytes.len(), "chart exported");
    Ok(bytes)
}

fn encode_raster(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format)?;
    Ok(cursor.into_inner())
}

/// HTML rendition: the full document, or only the chart `<div>`.
pub fn to_html(chart: &WheelChart, full_html: bool) -> String {
    let div = format!(
        "<div class=\"wheel-map\" style=\"width:{}px;height:{}px;\">\n{}</div>\n",
        chart.settings.width,
        chart.settings.height,
        StaticWheelRenderer::render_svg(chart)
    );
    if !full_html {
        return div;
    }

    let title = if chart.settings.title.trim().is_empty() {
        "Wheel Map".to_string()
    } else {
        escape_xml(&chart.settings.title)
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        title, div
    )
}

/// Download name: lowercased title words joined by `_`, plus the format's extension.
pub fn download_file_name(title: &str, format: DownloadFormat) -> String {
    let stem = title
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() {
        "wheel_map".to_string()
    } else {
        stem
    };
    format!("{}.{}", stem, format.extension())
}
