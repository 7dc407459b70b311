//! CSV Import
//!
//! Reads injection and symptom history exported from other trackers.
//! Every row is turned into a validated record; rows that fail are counted
//! and reported instead of aborting the import.
//!
//! Expected headers:
//! - injections: `id,timestamp,medication,dose,site`
//! - symptoms: `id,timestamp,symptom,severity,meal_related,notes`
//!
//! `id` may be blank (a UUID is generated). `meal_related` and `notes` are optional.

use super::error::{StoreError, StoreResult};
use super::types::{InjectionEvent, SymptomLog};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// CSV importer with configurable timestamp parsing
pub struct CsvImporter {
    /// Format string tried before the built-in fallbacks
    timestamp_format: String,
}

/// Result of a CSV import operation
#[derive(Debug)]
pub struct CsvImportResult<T> {
    pub records: Vec<T>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct InjectionRow {
    #[serde(default)]
    id: String,
    timestamp: String,
    medication: String,
    dose: String,
    site: String,
}

#[derive(Debug, Deserialize)]
struct SymptomRow {
    #[serde(default)]
    id: String,
    timestamp: String,
    symptom: String,
    severity: String,
    #[serde(default)]
    meal_related: String,
    #[serde(default)]
    notes: String,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        Self {
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }

    /// Set the preferred timestamp format string
    pub fn with_timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = format.to_string();
        self
    }

    /// Import injections from a CSV file, newest first
    pub fn import_injections(&self, path: &Path) -> StoreResult<CsvImportResult<InjectionEvent>> {
        let file = std::fs::File::open(path)?;
        self.import_injections_from(file)
    }

    /// Import injections from a CSV string
    pub fn import_injections_str(&self, csv_data: &str) -> StoreResult<CsvImportResult<InjectionEvent>> {
        self.import_injections_from(csv_data.as_bytes())
    }

    /// Import symptom logs from a CSV file, newest first
    pub fn import_symptoms(&self, path: &Path) -> StoreResult<CsvImportResult<SymptomLog>> {
        let file = std::fs::File::open(path)?;
        self.import_symptoms_from(file)
    }

    /// Import symptom logs from a CSV string
    pub fn import_symptoms_str(&self, csv_data: &str) -> StoreResult<CsvImportResult<SymptomLog>> {
        self.import_symptoms_from(csv_data.as_bytes())
    }

    fn import_injections_from<R: Read>(&self, reader: R) -> StoreResult<CsvImportResult<InjectionEvent>> {
        let mut result = self.import_rows(reader, |row: InjectionRow| {
            let dose = row
                .dose
                .trim()
                .parse::<f64>()
                .map_err(|_| StoreError::Validation(format!("invalid dose: {}", row.dose)))?;
            InjectionEvent::new(
                record_id(&row.id),
                self.parse_timestamp(&row.timestamp)?,
                row.medication.parse()?,
                dose,
                row.site.parse()?,
            )
        })?;
        result.records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(result)
    }

    fn import_symptoms_from<R: Read>(&self, reader: R) -> StoreResult<CsvImportResult<SymptomLog>> {
        let mut result = self.import_rows(reader, |row: SymptomRow| {
            let severity = row
                .severity
                .trim()
                .parse::<u8>()
                .map_err(|_| StoreError::Validation(format!("invalid severity: {}", row.severity)))?;
            let mut log = SymptomLog::new(
                record_id(&row.id),
                &row.symptom,
                severity,
                self.parse_timestamp(&row.timestamp)?,
            )?
            .notes(row.notes.trim());
            if let Some(related) = parse_flag(&row.meal_related)? {
                log = log.meal_related(related);
            }
            Ok(log)
        })?;
        result.records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(result)
    }

    fn import_rows<R, Row, T, F>(&self, reader: R, parse: F) -> StoreResult<CsvImportResult<T>>
    where
        R: Read,
        Row: serde::de::DeserializeOwned,
        F: Fn(Row) -> StoreResult<T>,
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut rows_processed = 0;
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, row) in reader.deserialize::<Row>().enumerate() {
            // Header occupies line 1
            let actual_line = line_num + 2;

            match row.map_err(StoreError::from).and_then(&parse) {
                Ok(record) => {
                    records.push(record);
                    rows_processed += 1;
                }
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        // Truncate errors if too many
        if errors.len() > 100 {
            let total = errors.len();
            errors.truncate(100);
            errors.push(format!("... and {} more errors", total - 100));
        }

        Ok(CsvImportResult {
            records,
            rows_processed,
            rows_failed,
            errors,
        })
    }

    /// Parse a timestamp string using the configured format, then common fallbacks
    fn parse_timestamp(&self, raw: &str) -> StoreResult<DateTime<Utc>> {
        let ts_str = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
            return Ok(dt.with_timezone(&Utc));
        }

        let formats = [
            self.timestamp_format.as_str(),
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%d",
        ];

        for fmt in formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, fmt) {
                return Ok(dt.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(ts_str, fmt) {
                if let Some(noon) = date.and_hms_opt(12, 0, 0) {
                    return Ok(noon.and_utc());
                }
            }
        }

        Err(StoreError::Validation(format!(
            "could not parse timestamp: {}",
            ts_str
        )))
    }
}

fn record_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_flag(raw: &str) -> StoreResult<Option<bool>> {
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "y" | "1" => Ok(Some(true)),
        "false" | "no" | "n" | "0" => Ok(Some(false)),
        other => Err(StoreError::Validation(format!(
            "invalid meal_related flag: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{InjectionSite, Medication};
    use std::io::Write;

    #[test]
    fn test_injection_csv_import() {
        let csv_data = "id,timestamp,medication,dose,site
i1,2024-01-01 08:00,semaglutide,0.25,abdomen-left
i2,2024-01-08 08:00,semaglutide,0.5,thigh-right
,2024-01-15T08:00:00Z,Semaglutide,0.5,arm_left";

        let result = CsvImporter::new().import_injections_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_failed, 0);
        // Newest first
        assert_eq!(result.records[0].site, InjectionSite::ArmLeft);
        assert_eq!(result.records[2].id, "i1");
        assert_eq!(result.records[1].medication, Medication::Semaglutide);
        assert!(!result.records[0].id.is_empty());
    }

    #[test]
    fn test_injection_csv_collects_row_errors() {
        let csv_data = "id,timestamp,medication,dose,site
i1,2024-01-01 08:00,semaglutide,0.25,abdomen-left
i2,not a date,semaglutide,0.5,thigh-right
i3,2024-01-15 08:00,insulin,0.5,arm-left
i4,2024-01-22 08:00,semaglutide,-1,arm-left";

        let result = CsvImporter::new().import_injections_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 1);
        assert_eq!(result.rows_failed, 3);
        assert!(result.errors[0].starts_with("Line 3:"));
        assert!(result.errors[1].contains("unknown medication"));
    }

    #[test]
    fn test_symptom_csv_import() {
        let csv_data = "id,timestamp,symptom,severity,meal_related,notes
s1,2024-01-02,Nausea,6,yes,after lunch
s2,2024-01-03,heartburn,4,,
s3,2024-01-04,nausea,12,no,";

        let result = CsvImporter::new().import_symptoms_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.rows_failed, 1);
        let nausea = result.records.iter().find(|s| s.id == "s1").unwrap();
        assert_eq!(nausea.symptom, "nausea");
        assert_eq!(nausea.meal_related, Some(true));
        assert_eq!(nausea.notes, "after lunch");
    }

    #[test]
    fn test_symptom_csv_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,symptom,severity").unwrap();
        writeln!(file, "2024-02-01 09:30,fatigue,3").unwrap();
        file.flush().unwrap();

        let result = CsvImporter::new().import_symptoms(file.path()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].symptom, "fatigue");
        assert_eq!(result.records[0].meal_related, None);
    }
}
