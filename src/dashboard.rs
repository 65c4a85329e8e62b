use chrono::NaiveDate;

use crate::clinical::summarize_clinical;
use crate::config::EngineConfig;
use crate::models::{ClinicalTestResult, DashboardSummary, JournalEntry};
use crate::wellbeing::summarize_journal;

/// Runs both pipelines over one snapshot. Neither reads the other's output.
pub fn summarize(
    entries: &[JournalEntry],
    results: &[ClinicalTestResult],
    today: NaiveDate,
    config: &EngineConfig,
) -> DashboardSummary {
    DashboardSummary {
        generated_for: today,
        journal: summarize_journal(entries, today, config),
        clinical: summarize_clinical(results, config),
    }
}
