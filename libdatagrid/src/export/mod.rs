mod csv;
mod pdf;
mod xlsx;

pub use csv::to_csv;
pub use pdf::{PageGeometry, PdfPlan, plan_pdf, to_pdf};
pub use xlsx::to_xlsx;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use derive_more::Display;
use directories::UserDirs;
use enum_iterator::Sequence;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::grid::{ColumnDef, GridRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Sequence, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[display("CSV")]
    Csv,
    #[display("Excel")]
    Xlsx,
    #[display("PDF")]
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("spreadsheet writer failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("PDF writer failed: {0}")]
    Pdf(String),
    #[error("{rows} rows by {columns} columns does not fit in a {format} file")]
    TooLarge {
        format: ExportFormat,
        rows: usize,
        columns: usize,
    },
}

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportSettings {
    /// Target directory; the user's download directory when unset.
    #[serde(default)]
    pub directory: Option<Utf8PathBuf>,
    pub pdf_font_size: f32,
    #[serde(default)]
    pub pdf_landscape: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: None,
            pdf_font_size: 9.0,
            pdf_landscape: false,
        }
    }
}

impl ExportSettings {
    #[must_use]
    pub fn resolve_directory(&self) -> Utf8PathBuf {
        if let Some(directory) = &self.directory {
            return directory.clone();
        }
        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(std::path::Path::to_path_buf))
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }
}

/// Headers and stringified cells shared by every export format.
///
/// Rows are the filtered and sorted set without pagination, columns are the
/// visible ones in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn build<T: GridRow>(rows: &[T], order: &[usize], columns: &[&ColumnDef<T>]) -> Self {
        Self {
            headers: columns.iter().map(|column| column.header.clone()).collect(),
            rows: order
                .iter()
                .filter_map(|&index| rows.get(index))
                .map(|row| columns.iter().map(|column| column.cell_text(row)).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Export produced by the grid, waiting for the host to write it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub table: ExportTable,
}

/// `export_YYYYMMDDTHHMMSS.<ext>`, the ISO timestamp without punctuation.
#[must_use]
pub fn export_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("export_{}.{}", now.format("%Y%m%dT%H%M%S"), format.extension())
}

/// Serializes `table` in `format`.
pub fn render(
    table: &ExportTable,
    format: ExportFormat,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(table).into_bytes()),
        ExportFormat::Xlsx => to_xlsx(table),
        ExportFormat::Pdf => to_pdf(table, settings),
    }
}

/// Renders and writes `request` into `directory`, returning the written path.
pub fn write_export(
    request: &ExportRequest,
    settings: &ExportSettings,
    directory: &Utf8Path,
    now: DateTime<Utc>,
) -> Result<Utf8PathBuf, ExportError> {
    let bytes = render(&request.table, request.format, settings)?;
    std::fs::create_dir_all(directory)?;
    let path = directory.join(export_file_name(request.format, now));
    std::fs::write(&path, bytes)?;
    info!(
        "Exported {} rows as {} to {path}",
        request.table.row_count(),
        request.format
    );
    Ok(path)
}

#[cfg(test)]
mod tests;
