use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use super::model::Record;
use super::source::SourceId;

// ---------------------------------------------------------------------------
// MissingSource – the only load failure callers see
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// No file at the expected path.
    NotFound,
    /// The file exists but could not be read or does not match the schema.
    Invalid(String),
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::NotFound => write!(f, "file not found"),
            MissingReason::Invalid(detail) => write!(f, "invalid file: {detail}"),
        }
    }
}

/// A table that could not be produced. Views treat it as "data not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{id}: {reason}")]
pub struct MissingSource {
    pub id: SourceId,
    pub reason: MissingReason,
}

impl MissingSource {
    pub fn not_found(id: SourceId) -> Self {
        MissingSource {
            id,
            reason: MissingReason::NotFound,
        }
    }

    pub fn invalid(id: SourceId, detail: impl Into<String>) -> Self {
        MissingSource {
            id,
            reason: MissingReason::Invalid(detail.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.reason == MissingReason::NotFound
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the table identified by `source` from `dir`.
///
/// Never fails loudly: an absent file and a file that fails validation both
/// come back as [`MissingSource`], with the difference kept in the reason and
/// in the log.
pub fn load_table<T: Record>(dir: &Path, source: &SourceId) -> Result<Vec<T>, MissingSource> {
    let path = dir.join(source.file_name());
    if !path.is_file() {
        log::warn!("{source}: not found at {}", path.display());
        return Err(MissingSource::not_found(source.clone()));
    }

    match read_records::<T>(&path) {
        Ok(rows) => {
            log::info!("Loaded {} rows from {}", rows.len(), path.display());
            Ok(rows)
        }
        Err(e) => {
            log::warn!("{source}: present but unusable: {e:#}");
            Err(MissingSource::invalid(source.clone(), format!("{e:#}")))
        }
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Header row required. Columns are matched by name, so their order and any
/// extra columns do not matter.
pub fn read_records<T: Record>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context("opening CSV")?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    check_columns(&headers, T::REQUIRED_COLUMNS)?;
    reader.set_headers(csv::StringRecord::from(headers));

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<T>().enumerate() {
        let row = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

fn check_columns(headers: &[String], required: &[&[&str]]) -> Result<()> {
    for names in required {
        if !names.iter().any(|name| headers.iter().any(|h| h == name)) {
            bail!("CSV missing '{}' column", names.join("' or '"));
        }
    }
    Ok(())
}
