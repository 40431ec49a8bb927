use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors of one export operation.
pub enum ExportError {
    /// An I/O error occurred while writing the file.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// The data could not be serialized.
    #[error("serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The user profile required for the report is missing or incomplete.
    #[error("user profile is missing or incomplete")]
    MissingProfile,
}

/// Writes `data` to `path` as pretty-printed UTF-8 JSON.
pub fn export_json<T: Serialize>(data: &T, path: &Path) -> Result<(), ExportError> {
    let rendered = serde_json::to_string_pretty(data)?;
    fs::write(path, rendered)?;
    Ok(())
}

/// Writes `rows` to `path` as CSV.
///
/// The caller supplies the column order explicitly; the header row comes
/// first and every row is written verbatim in that order. Cells missing
/// from a row are left empty.
pub fn export_csv(
    rows: &[Map<String, Value>],
    path: &Path,
    columns: &[&str],
) -> Result<(), ExportError> {
    let mut out = String::new();

    let header: Vec<String> = columns.iter().map(|c| csv_cell(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let line: Vec<String> = columns
            .iter()
            .map(|column| csv_cell(&cell_text(row.get(*column))))
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

/// Renders one JSON value as CSV cell text. Strings are written bare,
/// everything else in its JSON form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Quotes a cell when it contains a separator, quote or newline.
fn csv_cell(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
