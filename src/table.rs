// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tabular output in CSV, JSON or an Excel workbook.

use anyhow::{bail, Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Output format for result tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Json,
    Xlsx,
}

impl TableFormat {
    /// Infer the format from a file extension (`.csv`, `.json`, `.xlsx`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("csv") => Some(Self::Csv),
            Some("xlsx") => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Sheet name used for workbook output.
pub const SHEET_NAME: &str = "similarity";

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Float(f64),
    Int(u64),
}

impl Cell {
    fn to_csv_field(&self) -> String {
        match self {
            Self::Text(text) => escape_csv(text),
            Self::Float(value) => format!("{:.6}", value),
            Self::Int(value) => value.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Float(value) => Number::from_f64(round6(*value))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Int(value) => Value::Number((*value).into()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f32> for Cell {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Self::Int(value as u64)
    }
}

/// Rows of cells under a fixed header.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with empty text, long rows
    /// truncated to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Text(String::new()));
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as RFC 4180 CSV with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| escape_csv(h)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(Cell::to_csv_field).collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    /// Render as a JSON array of objects keyed by header.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let object: Map<String, Value> = self
                        .headers
                        .iter()
                        .cloned()
                        .zip(row.iter().map(Cell::to_json))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        )
    }

    /// Encode the table in `format`.
    pub fn render(&self, format: TableFormat) -> Result<Vec<u8>> {
        match format {
            TableFormat::Csv => Ok(self.to_csv().into_bytes()),
            TableFormat::Json => {
                let mut text = serde_json::to_string_pretty(&self.to_json())?;
                text.push('\n');
                Ok(text.into_bytes())
            }
            TableFormat::Xlsx => self.to_xlsx(),
        }
    }

    /// Encode as a single-sheet workbook with a bold header row.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, header) in self.headers.iter().enumerate() {
            sheet.write_string_with_format(0, column(col)?, header, &header_format)?;
        }
        for (idx, row) in self.rows.iter().enumerate() {
            let row_num = u32::try_from(idx + 1).context("too many rows for a worksheet")?;
            for (col, cell) in row.iter().enumerate() {
                let col = column(col)?;
                match cell {
                    Cell::Text(text) => sheet.write_string(row_num, col, text)?,
                    Cell::Float(value) => sheet.write_number(row_num, col, round6(*value))?,
                    Cell::Int(value) => sheet.write_number(row_num, col, *value as f64)?,
                };
            }
        }

        workbook
            .save_to_buffer()
            .context("Failed to encode workbook")
    }

    /// Write the table to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path, format: TableFormat) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.render(format)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn column(idx: usize) -> Result<u16> {
    match u16::try_from(idx) {
        Ok(col) => Ok(col),
        Err(_) => bail!("too many columns for a worksheet: {}", idx + 1),
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(["document", "total", "chunk_info"]);
        table.push_row(vec!["北京市".into(), 0.8123456f64.into(), "total=3".into()]);
        table.push_row(vec!["a, \"quoted\" name".into(), 0.5f64.into()]);
        table
    }

    #[test]
    fn csv_escapes_and_pads() {
        let csv = sample().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "document,total,chunk_info");
        assert_eq!(lines[1], "北京市,0.812346,total=3");
        assert_eq!(lines[2], "\"a, \"\"quoted\"\" name\",0.500000,");
    }

    #[test]
    fn json_rows_are_keyed_by_header() {
        let json = sample().to_json();
        assert_eq!(json[0]["document"], "北京市");
        assert_eq!(json[0]["total"].as_f64().unwrap(), 0.812346);
        assert_eq!(json[1]["chunk_info"], "");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("out.JSON")), Some(TableFormat::Json));
        assert_eq!(TableFormat::from_path(Path::new("out.csv")), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path(Path::new("out.xlsx")), Some(TableFormat::Xlsx));
        assert_eq!(TableFormat::from_path(Path::new("out.txt")), None);
        assert_eq!(TableFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results").join("scores.csv");
        sample().write(&path, TableFormat::Csv).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("document,"));
    }

    #[test]
    fn xlsx_output_is_a_zip_workbook() {
        let bytes = sample().render(TableFormat::Xlsx).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("similarity_result.xlsx");
        sample().write(&path, TableFormat::Xlsx).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn xlsx_format_parses_from_config() {
        #[derive(Deserialize)]
        struct Holder {
            format: TableFormat,
        }
        let holder: Holder = toml::from_str("format = \"xlsx\"").unwrap();
        assert_eq!(holder.format, TableFormat::Xlsx);
    }
}
