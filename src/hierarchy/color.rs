//! Color encoding for wheel sectors.

use crate::data::{ColorMode, ColorValue, PreparedRows};
use crate::hierarchy::ColorAggregate;
use std::collections::HashMap;

/// Plain 8-bit RGB color, converted to egui/plotters colors at the drawing sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in `[0, 1]`.
    pub fn luminance(self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Default qualitative sequence for categorical colors.
pub const QUALITATIVE_PALETTE: [Rgb; 10] = [
    Rgb::new(0x63, 0x6e, 0xfa), // Blue
    Rgb::new(0xef, 0x55, 0x3b), // Red
    Rgb::new(0x00, 0xcc, 0x96), // Green
    Rgb::new(0xab, 0x63, 0xfa), // Purple
    Rgb::new(0xff, 0xa1, 0x5a), // Orange
    Rgb::new(0x19, 0xd3, 0xf3), // Cyan
    Rgb::new(0xff, 0x66, 0x92), // Pink
    Rgb::new(0xb6, 0xe8, 0x80), // Light Green
    Rgb::new(0xff, 0x97, 0xff), // Light Pink
    Rgb::new(0xfe, 0xcb, 0x52), // Yellow
];

/// Plasma sequential scale used for numeric colors.
pub const PLASMA: [Rgb; 10] = [
    Rgb::new(0x0d, 0x08, 0x87),
    Rgb::new(0x46, 0x03, 0x9f),
    Rgb::new(0x72, 0x01, 0xa8),
    Rgb::new(0x9c, 0x17, 0x9e),
    Rgb::new(0xbd, 0x37, 0x86),
    Rgb::new(0xd8, 0x57, 0x6b),
    Rgb::new(0xed, 0x79, 0x53),
    Rgb::new(0xfb, 0x9f, 0x3a),
    Rgb::new(0xfd, 0xca, 0x26),
    Rgb::new(0xf0, 0xf9, 0x21),
];

/// Label shown for nodes whose rows disagree on the color category.
pub const MIXED_LABEL: &str = "(?)";

/// Maps aggregated node colors to RGB.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    Discrete {
        /// Category colors in first-appearance order.
        assignments: Vec<(String, Rgb)>,
        /// Category to position in `assignments`.
        index: HashMap<String, usize>,
        mixed: Rgb,
    },
    Continuous {
        min: f64,
        max: f64,
    },
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::Discrete {
            assignments: Vec::new(),
            index: HashMap::new(),
            mixed: QUALITATIVE_PALETTE[0],
        }
    }
}

impl ColorScale {
    pub fn from_rows(prepared: &PreparedRows) -> Self {
        match prepared.color_mode {
            ColorMode::Discrete => {
                let mut assignments: Vec<(String, Rgb)> = Vec::new();
                let mut index: HashMap<String, usize> = HashMap::new();
                for row in &prepared.rows {
                    if let ColorValue::Category(category) = &row.color {
                        if !index.contains_key(category) {
                            index.insert(category.clone(), assignments.len());
                            assignments.push((category.clone(), palette_color(assignments.len())));
                        }
                    }
                }
                let mixed = palette_color(assignments.len());
                ColorScale::Discrete {
                    assignments,
                    index,
                    mixed,
                }
            }
            ColorMode::Continuous => {
                let (min, max) = prepared
                    .rows
                    .iter()
                    .filter_map(|row| match row.color {
                        ColorValue::Number(v) if v.is_finite() => Some(v),
                        _ => None,
                    })
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                if min.is_finite() {
                    ColorScale::Continuous { min, max }
                } else {
                    ColorScale::Continuous { min: 0.0, max: 0.0 }
                }
            }
        }
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, ColorScale::Continuous { .. })
    }

    pub fn color_of(&self, aggregate: &ColorAggregate) -> Rgb {
        match self {
            ColorScale::Discrete {
                assignments,
                index,
                mixed,
            } => match aggregate {
                ColorAggregate::Category(category) => index
                    .get(category)
                    .and_then(|&i| assignments.get(i))
                    .map(|(_, color)| *color)
                    .unwrap_or(*mixed),
                _ => *mixed,
            },
            ColorScale::Continuous { .. } => match aggregate.mean() {
                Some(mean) => plasma(self.normalize(mean)),
                None => plasma(0.5),
            },
        }
    }

    /// Color column value shown in hover text.
    pub fn legend_label(&self, aggregate: &ColorAggregate) -> String {
        match aggregate {
            ColorAggregate::Category(category) => category.clone(),
            ColorAggregate::Mixed => MIXED_LABEL.to_string(),
            ColorAggregate::Numeric { .. } => aggregate
                .mean()
                .map(format_number)
                .unwrap_or_default(),
            ColorAggregate::Empty => String::new(),
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        match self {
            ColorScale::Continuous { min, max } if max > min => {
                ((value - min) / (max - min)).clamp(0.0, 1.0)
            }
            _ => 0.5,
        }
    }
}

fn palette_color(idx: usize) -> Rgb {
    QUALITATIVE_PALETTE[idx % QUALITATIVE_PALETTE.len()]
}

/// Interpolate the Plasma scale at `t` in `[0, 1]`.
pub fn plasma(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let segments = (PLASMA.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(PLASMA.len() - 2);
    PLASMA[idx].lerp(PLASMA[idx + 1], pos - idx as f64)
}

/// Compact number formatting for labels and color bars.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PathRow;

    fn prepared(colors: Vec<ColorValue>, mode: ColorMode) -> PreparedRows {
        PreparedRows {
            rows: colors
                .into_iter()
                .map(|color| PathRow {
                    path: vec!["c".to_string()],
                    color,
                })
                .collect(),
            color_column: "col".to_string(),
            color_mode: mode,
        }
    }

    fn category(c: &str) -> ColorValue {
        ColorValue::Category(c.to_string())
    }

    #[test]
    fn test_discrete_first_appearance_order() {
        let scale = ColorScale::from_rows(&prepared(
            vec![category("b"), category("a"), category("b"), category("c")],
            ColorMode::Discrete,
        ));
        let ColorScale::Discrete {
            assignments, mixed, ..
        } = &scale
        else {
            panic!("expected discrete scale");
        };
        let order: Vec<&str> = assignments.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(assignments[0].1, QUALITATIVE_PALETTE[0]);
        assert_eq!(*mixed, QUALITATIVE_PALETTE[3]);

        assert_eq!(
            scale.color_of(&ColorAggregate::Category("a".into())),
            QUALITATIVE_PALETTE[1]
        );
        assert_eq!(scale.color_of(&ColorAggregate::Mixed), QUALITATIVE_PALETTE[3]);
        assert_eq!(scale.legend_label(&ColorAggregate::Mixed), "(?)");
    }

    #[test]
    fn test_palette_cycles() {
        let colors = (0..12).map(|i| category(&i.to_string())).collect();
        let scale = ColorScale::from_rows(&prepared(colors, ColorMode::Discrete));
        assert_eq!(
            scale.color_of(&ColorAggregate::Category("10".into())),
            QUALITATIVE_PALETTE[0]
        );
    }

    #[test]
    fn test_many_unique_categories() {
        let n = 50_000;
        let colors = (0..n).map(|i| category(&format!("id-{}", i))).collect();
        let scale = ColorScale::from_rows(&prepared(colors, ColorMode::Discrete));
        let ColorScale::Discrete {
            assignments,
            index,
            mixed,
        } = &scale
        else {
            panic!("expected discrete scale");
        };
        assert_eq!(assignments.len(), n);
        assert_eq!(index.len(), n);
        assert_eq!(*mixed, palette_color(n));

        for i in [0, 9, 10, 12_345, n - 1] {
            assert_eq!(
                scale.color_of(&ColorAggregate::Category(format!("id-{}", i))),
                palette_color(i)
            );
        }
        assert_eq!(
            scale.color_of(&ColorAggregate::Category("missing".into())),
            *mixed
        );
    }

    #[test]
    fn test_continuous_scale() {
        let scale = ColorScale::from_rows(&prepared(
            vec![ColorValue::Number(2.0), ColorValue::Number(6.0)],
            ColorMode::Continuous,
        ));
        assert_eq!(scale, ColorScale::Continuous { min: 2.0, max: 6.0 });
        assert!(scale.is_continuous());

        let low = ColorAggregate::Numeric { sum: 2.0, n: 1 };
        let high = ColorAggregate::Numeric { sum: 12.0, n: 2 };
        assert_eq!(scale.color_of(&low), PLASMA[0]);
        assert_eq!(scale.color_of(&high), PLASMA[9]);
        assert_eq!(scale.legend_label(&ColorAggregate::Numeric { sum: 7.0, n: 2 }), "3.5");
    }

    #[test]
    fn test_flat_continuous_uses_midpoint() {
        let scale = ColorScale::Continuous { min: 5.0, max: 5.0 };
        assert_eq!(
            scale.color_of(&ColorAggregate::Numeric { sum: 5.0, n: 1 }),
            plasma(0.5)
        );
    }

    #[test]
    fn test_rgb_helpers() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
        assert!(Rgb::WHITE.luminance() > 0.99);
        assert!(Rgb::BLACK.luminance() < 0.01);
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.125), "2.125");
        assert_eq!(format_number(0.1), "0.1");
    }
}
