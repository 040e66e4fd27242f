use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::io::Read;
use tracing::debug;

use crate::application::AppError;
use crate::domain::normalize::normalize_entry_counted;
use crate::domain::{Ledger, normalize_counted};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportFormat::Json => "json",
            ImportFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ImportFormat::Json),
            "csv" => Some(ImportFormat::Csv),
            _ => None,
        }
    }
}

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub ledger: Ledger,
    pub imported: usize,
    /// Entry fields that were missing or malformed and replaced by defaults
    pub defaulted_fields: usize,
}

/// Parses external files into a normalized ledger. Nothing is persisted here.
pub struct Importer {
    today: NaiveDate,
}

impl Importer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn import<R: Read>(&self, reader: R, format: ImportFormat) -> Result<ImportResult, AppError> {
        match format {
            ImportFormat::Json => self.import_json(reader),
            ImportFormat::Csv => self.import_csv(reader),
        }
    }

    /// Import any accepted JSON shape: a full ledger, a bare entry list,
    /// or an object with an `entries`/`data` list.
    pub fn import_json<R: Read>(&self, mut reader: R) -> Result<ImportResult, AppError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let raw: Value = serde_json::from_str(&text)
            .map_err(|e| AppError::InvalidImport(format!("Invalid JSON file: {}", e)))?;
        let (ledger, defaulted_fields) = normalize_counted(&raw, self.today);

        debug!(entries = ledger.len(), defaulted_fields, "parsed JSON import");
        Ok(ImportResult {
            imported: ledger.len(),
            ledger,
            defaulted_fields,
        })
    }

    /// Import entries from CSV with a `date,type,category,amount` header.
    /// Header names are case-insensitive, unknown columns are ignored and
    /// the imported ledger starts with no funds.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportResult, AppError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| AppError::InvalidImport(format!("Invalid CSV header: {}", e)))?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        let mut entries = Vec::new();
        let mut defaulted_fields = 0;

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing
            let record = result
                .map_err(|e| AppError::InvalidImport(format!("CSV parse error on line {}: {}", line, e)))?;

            let candidate: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, field)| !field.is_empty())
                .map(|(header, field)| (header.clone(), Value::String(field.to_string())))
                .collect();

            let (entry, fallbacks) = normalize_entry_counted(&Value::Object(candidate), self.today);
            entries.push(entry);
            defaulted_fields += fallbacks;
        }

        debug!(entries = entries.len(), defaulted_fields, "parsed CSV import");
        Ok(ImportResult {
            imported: entries.len(),
            ledger: Ledger::new(0.0, entries),
            defaulted_fields,
        })
    }
}
