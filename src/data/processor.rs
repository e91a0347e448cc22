//! Data Processor Module
//! Turns a loaded DataFrame into hierarchy paths for the wheel map.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Placeholder written into empty hierarchy cells.
pub const FILL_VALUE: &str = " ";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Dataset has no columns")]
    NoColumns,
}

/// Value used to color a row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Category(String),
    Number(f64),
}

/// One dataset row expressed as a path from the center outwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRow {
    /// `path[0]` is the center label, followed by one value per hierarchy column.
    pub path: Vec<String>,
    pub color: ColorValue,
}

/// How the color column is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Discrete,
    Continuous,
}

/// Rows ready for aggregation, plus how they are colored.
#[derive(Debug, Clone, Default)]
pub struct PreparedRows {
    pub rows: Vec<PathRow>,
    pub color_column: String,
    pub color_mode: ColorMode,
}

/// Handles data cleaning and the rows-to-paths transformation.
pub struct DataProcessor;

impl DataProcessor {
    /// Color column used when none is chosen: first hierarchy column, else first dataset column.
    pub fn default_color_column(
        df: &DataFrame,
        hierarchy: &[String],
    ) -> Result<String, ProcessorError> {
        if let Some(first) = hierarchy.first() {
            return Ok(first.clone());
        }
        df.get_column_names()
            .first()
            .map(|name| name.to_string())
            .ok_or(ProcessorError::NoColumns)
    }

    /// Build one path per row: center label followed by the hierarchy values.
    /// Null hierarchy cells become `FILL_VALUE`.
    pub fn prepare_rows(
        df: &DataFrame,
        center_label: &str,
        hierarchy: &[String],
        color_column: &str,
    ) -> Result<PreparedRows, ProcessorError> {
        let mut levels: Vec<Vec<String>> = Vec::with_capacity(hierarchy.len());
        for name in hierarchy {
            levels.push(Self::column_as_labels(df, name)?);
        }

        let color_col = Self::column(df, color_column)?;
        let color_mode = Self::color_mode(color_col);

        let colors: Vec<ColorValue> = match color_mode {
            ColorMode::Continuous => {
                let values = color_col.cast(&DataType::Float64)?;
                values
                    .f64()?
                    .into_iter()
                    .map(|v| ColorValue::Number(v.unwrap_or(f64::NAN)))
                    .collect()
            }
            ColorMode::Discrete => Self::column_as_labels(df, color_column)?
                .into_iter()
                .map(ColorValue::Category)
                .collect(),
        };

        let rows = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                let mut path = Vec::with_capacity(levels.len() + 1);
                path.push(center_label.to_string());
                path.extend(levels.iter().map(|level| level[i].clone()));
                PathRow { path, color }
            })
            .collect::<Vec<_>>();

        debug!(
            rows = rows.len(),
            levels = hierarchy.len(),
            color_column,
            ?color_mode,
            "prepared hierarchy rows"
        );

        Ok(PreparedRows {
            rows,
            color_column: color_column.to_string(),
            color_mode,
        })
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ProcessorError> {
        df.column(name)
            .map_err(|_| ProcessorError::ColumnNotFound(name.to_string()))
    }

    /// Column values as display strings, nulls filled.
    fn column_as_labels(df: &DataFrame, name: &str) -> Result<Vec<String>, ProcessorError> {
        let column = Self::column(df, name)?;
        let as_text = column.cast(&DataType::String)?;
        let labels = as_text
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or(FILL_VALUE).to_string())
            .collect();
        Ok(labels)
    }

    /// Numeric columns without gaps color continuously. Filling gaps with text
    /// turns a column categorical, so any null forces discrete colors.
    fn color_mode(column: &Column) -> ColorMode {
        let numeric = matches!(
            column.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        );
        if numeric && column.null_count() == 0 {
            ColorMode::Continuous
        } else {
            ColorMode::Discrete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "region" => [Some("EU"), Some("EU"), None, Some("AS")],
            "country" => [Some("FR"), Some("DE"), Some("US"), None],
            "sales" => [10.0, 4.0, 7.5, 3.0],
            "score" => [Some(1i64), None, Some(3), Some(4)]
        )
        .unwrap()
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_paths_start_with_center_label() {
        let df = sample();
        let prepared =
            DataProcessor::prepare_rows(&df, "World", &names(&["region", "country"]), "region")
                .unwrap();

        assert_eq!(prepared.rows.len(), 4);
        assert_eq!(prepared.rows[0].path, vec!["World", "EU", "FR"]);
        assert_eq!(prepared.rows[2].path, vec!["World", " ", "US"]);
        assert_eq!(prepared.rows[3].path, vec!["World", "AS", " "]);
        assert_eq!(prepared.color_mode, ColorMode::Discrete);
        assert_eq!(
            prepared.rows[2].color,
            ColorValue::Category(FILL_VALUE.to_string())
        );
    }

    #[test]
    fn test_numeric_color_column_is_continuous() {
        let df = sample();
        let prepared =
            DataProcessor::prepare_rows(&df, "", &names(&["region"]), "sales").unwrap();

        assert_eq!(prepared.color_mode, ColorMode::Continuous);
        assert_eq!(prepared.rows[1].color, ColorValue::Number(4.0));
    }

    #[test]
    fn test_numeric_column_with_nulls_is_discrete() {
        let df = sample();
        let prepared =
            DataProcessor::prepare_rows(&df, "", &names(&["region"]), "score").unwrap();

        assert_eq!(prepared.color_mode, ColorMode::Discrete);
        assert_eq!(prepared.rows[0].color, ColorValue::Category("1".to_string()));
        assert_eq!(prepared.rows[1].color, ColorValue::Category(" ".to_string()));
    }

    #[test]
    fn test_integer_labels_with_nulls_stay_integral() {
        let df = sample();
        let prepared =
            DataProcessor::prepare_rows(&df, "", &names(&["score"]), "region").unwrap();

        let labels: Vec<&str> = prepared.rows.iter().map(|row| row.path[1].as_str()).collect();
        assert_eq!(labels, vec!["1", " ", "3", "4"]);
    }

    #[test]
    fn test_empty_hierarchy_yields_center_only_paths() {
        let df = sample();
        let prepared = DataProcessor::prepare_rows(&df, "All", &[], "region").unwrap();
        assert!(prepared.rows.iter().all(|row| row.path == vec!["All"]));
    }

    #[test]
    fn test_missing_column() {
        let df = sample();
        let err = DataProcessor::prepare_rows(&df, "", &names(&["nope"]), "region").unwrap_err();
        assert!(matches!(err, ProcessorError::ColumnNotFound(name) if name == "nope"));

        let err = DataProcessor::prepare_rows(&df, "", &[], "missing").unwrap_err();
        assert!(matches!(err, ProcessorError::ColumnNotFound(_)));
    }

    #[test]
    fn test_default_color_column() {
        let df = sample();
        assert_eq!(
            DataProcessor::default_color_column(&df, &names(&["country"])).unwrap(),
            "country"
        );
        assert_eq!(DataProcessor::default_color_column(&df, &[]).unwrap(), "region");
        assert!(matches!(
            DataProcessor::default_color_column(&DataFrame::empty(), &[]),
            Err(ProcessorError::NoColumns)
        ));
    }
}
