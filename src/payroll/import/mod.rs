mod parser;

pub use parser::parse_timestamp;

use super::domain::AppointmentRecord;
use super::window::reference_offset;
use chrono::FixedOffset;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum LeadImportError {
    #[error("failed to read lead export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lead CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid lead JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lead JSON must be an array of objects or carry a `leads` array")]
    UnexpectedShape,
    #[error("cannot infer record format for '{0}'; pass --format csv|json")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        extension.parse().ok()
    }
}

impl FromStr for RecordFormat {
    type Err = LeadImportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(LeadImportError::UnknownFormat(value.to_string())),
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFormat::Csv => f.write_str("csv"),
            RecordFormat::Json => f.write_str("json"),
        }
    }
}

/// Converts record-store exports into appointment records.
#[derive(Debug, Clone, Copy)]
pub struct LeadRecordImporter {
    assume_offset: FixedOffset,
}

impl LeadRecordImporter {
    /// `assume_offset` applies to timestamps exported without an offset.
    pub fn new(assume_offset: FixedOffset) -> Self {
        Self { assume_offset }
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
        format: Option<RecordFormat>,
    ) -> Result<Vec<AppointmentRecord>, LeadImportError> {
        let path = path.as_ref();
        let format = match format.or_else(|| RecordFormat::from_path(path)) {
            Some(format) => format,
            None => return Err(LeadImportError::UnknownFormat(path.display().to_string())),
        };
        let file = std::fs::File::open(path)?;
        let records = self.import_reader(file, format)?;
        info!(path = %path.display(), %format, records = records.len(), "imported lead records");
        Ok(records)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
        format: RecordFormat,
    ) -> Result<Vec<AppointmentRecord>, LeadImportError> {
        match format {
            RecordFormat::Csv => Ok(parser::parse_csv(reader, self.assume_offset)?),
            RecordFormat::Json => parser::parse_json(reader, self.assume_offset),
        }
    }
}

impl Default for LeadRecordImporter {
    fn default() -> Self {
        Self::new(reference_offset())
    }
}

/// Remote or local store that hands back one employee's lead records.
pub trait RecordSource {
    fn fetch_records(&self) -> Result<Vec<AppointmentRecord>, LeadImportError>;
}

/// Record source backed by an exported CSV or JSON file.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
    format: Option<RecordFormat>,
    importer: LeadRecordImporter,
}

impl FileRecordSource {
    pub fn new(
        path: impl Into<PathBuf>,
        format: Option<RecordFormat>,
        importer: LeadRecordImporter,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            importer,
        }
    }
}

impl RecordSource for FileRecordSource {
    fn fetch_records(&self) -> Result<Vec<AppointmentRecord>, LeadImportError> {
        self.importer.import_path(&self.path, self.format)
    }
}
