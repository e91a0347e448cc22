//! Dataset Loader Module
//! Handles CSV and Excel file loading and column extraction using Polars.

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File extensions accepted by the file picker.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse dataset: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to read workbook: {0}")]
    ExcelError(#[from] calamine::Error),
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("No data loaded")]
    NoData,
}

/// Kind of tabular file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" => Ok(FileKind::Excel),
            _ => Err(LoaderError::UnsupportedFormat(extension)),
        }
    }
}

/// Handles dataset loading with Polars (CSV) and calamine (Excel).
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a dataset into this loader.
    pub fn load_file(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let df = Self::read_file(file_path)?;
        self.set_dataframe(df, file_path.to_path_buf());
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read a dataset without touching loader state (used for async loading).
    pub fn read_file(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let df = match FileKind::from_path(file_path)? {
            FileKind::Csv => Self::read_csv(file_path)?,
            FileKind::Excel => Self::read_excel(file_path)?,
        };
        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "dataset loaded"
        );
        Ok(df)
    }

    /// Read a CSV file using lazy evaluation, then collect.
    pub fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Read the first worksheet of an xlsx/xls workbook.
    pub fn read_excel(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(file_path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoaderError::EmptyWorkbook)??;
        debug!(
            path = %file_path.display(),
            sheets = workbook.sheet_names().len(),
            "reading first worksheet"
        );

        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
        Ok(frame_from_rows(&rows)?)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set DataFrame directly (used for async loading)
    pub fn set_dataframe(&mut self, df: DataFrame, file_path: PathBuf) {
        self.df = Some(df);
        self.file_path = Some(file_path);
    }
}

/// Inferred type of a worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Text,
}

/// Build a DataFrame from worksheet rows. The first row is the header.
fn frame_from_rows(rows: &[Vec<Data>]) -> PolarsResult<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let names = header_names(header);
    let mut columns = Vec::with_capacity(names.len());

    for (idx, name) in names.into_iter().enumerate() {
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(idx)).collect();

        let column = match column_kind(&cells) {
            CellKind::Int => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| match cell {
                        Some(Data::Int(i)) => Some(*i),
                        Some(Data::Float(f)) => Some(*f as i64),
                        _ => None,
                    })
                    .collect::<Vec<Option<i64>>>(),
            ),
            CellKind::Float => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| match cell {
                        Some(Data::Int(i)) => Some(*i as f64),
                        Some(Data::Float(f)) => Some(*f),
                        _ => None,
                    })
                    .collect::<Vec<Option<f64>>>(),
            ),
            CellKind::Text => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| cell.and_then(cell_text))
                    .collect::<Vec<Option<String>>>(),
            ),
        };
        columns.push(column);
    }

    DataFrame::new(columns)
}

/// Header names with pandas-style placeholders and de-duplication.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = cell_text(cell)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| format!("Unnamed: {}", idx));
            let name = if used.contains(&base) {
                // A suffixed name may itself be a real header, so skip taken ones.
                let n = next_suffix.entry(base.clone()).or_insert(1);
                loop {
                    let candidate = format!("{}.{}", base, n);
                    *n += 1;
                    if !used.contains(&candidate) {
                        break candidate;
                    }
                }
            } else {
                base
            };
            used.insert(name.clone());
            name
        })
        .collect()
}

fn column_kind(cells: &[Option<&Data>]) -> CellKind {
    let mut kind = None;
    for cell in cells.iter().flatten() {
        match cell {
            Data::Empty | Data::Error(_) => {}
            Data::Int(_) => {
                kind.get_or_insert(CellKind::Int);
            }
            Data::Float(f) => {
                if f.fract() == 0.0 && kind != Some(CellKind::Float) {
                    kind.get_or_insert(CellKind::Int);
                } else {
                    kind = Some(CellKind::Float);
                }
            }
            _ => return CellKind::Text,
        }
    }
    kind.unwrap_or(CellKind::Text)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_file_kind_is_case_insensitive() {
        assert_eq!(FileKind::from_path(Path::new("a.CSV")).unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_path(Path::new("a.xlsx")).unwrap(), FileKind::Excel);
        assert_eq!(FileKind::from_path(Path::new("a.XLS")).unwrap(), FileKind::Excel);
    }

    #[test]
    fn test_file_kind_rejects_unknown_extension() {
        let err = FileKind::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(ext) if ext == "txt"));
        assert!(FileKind::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_load_csv() {
        let file = write_csv("region,country,sales\nEU,FR,10\nEU,DE,\nAS,JP,7\n");
        let mut loader = DataLoader::new();
        let df = loader.load_file(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(loader.get_columns(), vec!["region", "country", "sales"]);
        assert_eq!(loader.get_row_count(), 3);
        assert_eq!(loader.get_file_path().unwrap(), &file.path().to_path_buf());

        let sales = loader.get_dataframe().unwrap().column("sales").unwrap();
        assert_eq!(sales.null_count(), 1);
    }

    #[test]
    fn test_load_xlsx_reads_first_sheet() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["region", "country", "sales"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let rows = [("EU", "FR", Some(10.0)), ("EU", "DE", None), ("AS", "JP", Some(7.5))];
        for (idx, (region, country, sales)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, *region).unwrap();
            sheet.write_string(row, 1, *country).unwrap();
            if let Some(sales) = sales {
                sheet.write_number(row, 2, *sales).unwrap();
            }
        }
        workbook
            .add_worksheet()
            .write_string(0, 0, "ignored")
            .unwrap();
        workbook.save(file.path()).unwrap();

        let mut loader = DataLoader::new();
        let df = loader.load_file(file.path()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(loader.get_columns(), vec!["region", "country", "sales"]);

        let df = loader.get_dataframe().unwrap();
        let sales = df.column("sales").unwrap();
        assert_eq!(sales.dtype(), &DataType::Float64);
        assert_eq!(sales.null_count(), 1);
        let regions: Vec<Option<&str>> = df
            .column("region")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(regions, vec![Some("EU"), Some("EU"), Some("AS")]);
    }

    #[test]
    fn test_load_file_rejects_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let mut loader = DataLoader::new();
        let err = loader.load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(ext) if ext == "json"));
        assert!(loader.get_dataframe().is_none());
    }

    #[test]
    fn test_empty_loader() {
        let loader = DataLoader::default();
        assert!(loader.get_columns().is_empty());
        assert_eq!(loader.get_row_count(), 0);
        assert!(loader.get_dataframe().is_none());
    }

    #[test]
    fn test_frame_from_rows_infers_column_types() {
        let rows = vec![
            vec![
                Data::String("name".into()),
                Data::String("qty".into()),
                Data::String("price".into()),
            ],
            vec![Data::String("apple".into()), Data::Int(3), Data::Float(1.5)],
            vec![Data::String("pear".into()), Data::Float(4.0), Data::Int(2)],
            vec![Data::Empty, Data::Empty, Data::Empty],
        ];
        let df = frame_from_rows(&rows).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("qty").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_header_placeholders_and_duplicates() {
        let header = vec![
            Data::String("a".into()),
            Data::Empty,
            Data::String("a".into()),
            Data::String("a".into()),
        ];
        assert_eq!(header_names(&header), vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn test_suffix_skips_existing_header() {
        let rows = vec![
            vec![
                Data::String("a".into()),
                Data::String("a.1".into()),
                Data::String("a".into()),
            ],
            vec![Data::Int(1), Data::Int(2), Data::Int(3)],
        ];
        assert_eq!(header_names(&rows[0]), vec!["a", "a.1", "a.2"]);

        let df = frame_from_rows(&rows).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["a", "a.1", "a.2"]);
        assert_eq!(df.column("a.2").unwrap().i64().unwrap().get(0), Some(3));
    }

    #[test]
    fn test_mixed_column_is_text() {
        let rows = vec![
            vec![Data::String("code".into())],
            vec![Data::Int(7)],
            vec![Data::String("X1".into())],
            vec![Data::Bool(true)],
        ];
        let df = frame_from_rows(&rows).unwrap();
        let code = df.column("code").unwrap();
        assert_eq!(code.dtype(), &DataType::String);
        let values: Vec<Option<&str>> = code.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("7"), Some("X1"), Some("True")]);
    }

    #[test]
    fn test_empty_sheet_gives_empty_frame() {
        let df = frame_from_rows(&[]).unwrap();
        assert_eq!(df.width(), 0);
    }
}
