//! Where snapshots come from. The analytics never call these directly; the
//! caller loads a [`Snapshot`] first and hands its slices to the engine.

use crate::error::Result;
use crate::models::{ClinicalTestResult, JournalEntry};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub entries: Vec<JournalEntry>,
    pub results: Vec<ClinicalTestResult>,
}

#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn journal_entries(&self) -> Result<Vec<JournalEntry>>;

    async fn test_results(&self) -> Result<Vec<ClinicalTestResult>>;

    async fn snapshot(&self) -> Result<Snapshot> {
        let entries = self.journal_entries().await?;
        let results = self.test_results().await?;
        tracing::info!(
            entries = entries.len(),
            results = results.len(),
            "Loaded snapshot"
        );
        Ok(Snapshot { entries, results })
    }
}
