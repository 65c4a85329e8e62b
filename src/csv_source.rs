//! CSV snapshots, one file per record type.
//!
//! Entries: `id,timestamp,text,sentiment,confidence` (RFC 3339 timestamps).
//! Results: `id,test_type,score,severity_level,completed_at` where `test_type`
//! is an instrument label or a legacy numeric test id.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{ClinicalTestResult, Instrument, JournalEntry};
use crate::source::SnapshotSource;

#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    pub entries_path: Option<PathBuf>,
    pub results_path: Option<PathBuf>,
}

impl CsvSource {
    pub fn new(entries_path: Option<PathBuf>, results_path: Option<PathBuf>) -> Self {
        Self {
            entries_path,
            results_path,
        }
    }
}

impl SnapshotSource for CsvSource {
    async fn journal_entries(&self) -> Result<Vec<JournalEntry>> {
        match &self.entries_path {
            Some(path) => read_entries(path),
            None => Ok(Vec::new()),
        }
    }

    async fn test_results(&self) -> Result<Vec<ClinicalTestResult>> {
        match &self.results_path {
            Some(path) => read_results(path),
            None => Ok(Vec::new()),
        }
    }
}

pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();

    for row in reader.deserialize::<JournalEntry>() {
        entries.push(row?);
    }

    tracing::debug!(path = %path.display(), count = entries.len(), "Read journal entries");
    Ok(entries)
}

#[derive(Deserialize)]
struct ResultRow {
    #[serde(default)]
    id: Option<String>,
    test_type: String,
    score: u32,
    #[serde(default)]
    severity_level: String,
    completed_at: DateTime<Utc>,
}

/// Rows with an unrecognized `test_type` are skipped with a warning since no
/// maximum score is known for them.
pub fn read_results(path: &Path) -> Result<Vec<ClinicalTestResult>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut results = Vec::new();

    for (index, row) in reader.deserialize::<ResultRow>().enumerate() {
        let row = row?;
        let Some(instrument) = Instrument::resolve(&row.test_type) else {
            tracing::warn!(
                path = %path.display(),
                row = index + 1,
                test_type = %row.test_type,
                "Skipping result for unknown instrument"
            );
            continue;
        };

        results.push(ClinicalTestResult {
            id: row
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("row-{}", index + 1)),
            instrument,
            score: row.score,
            completed_at: row.completed_at,
            severity_level: row.severity_level,
        });
    }

    tracing::debug!(path = %path.display(), count = results.len(), "Read test results");
    Ok(results)
}
