//! # wellbeing-analytics
//!
//! Turns a snapshot of journal entries and screening results into the
//! numbers a wellness dashboard shows:
//! - journaling streak, 7-day mood series, sentiment distribution and trend
//! - a composite 0..=100 journal wellbeing score with a per-factor breakdown
//! - a clinical wellbeing score from the latest PHQ-9 / GAD-7 / PSS-10 results
//!
//! The analytics are pure functions over borrowed slices. Loading the slices
//! is the job of a [`SnapshotSource`] (CSV files or Postgres).
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use wellbeing_analytics::{summarize, EngineConfig};
//!
//! let summary = summarize(&[], &[], Utc::now().date_naive(), &EngineConfig::default());
//! assert_eq!(summary.clinical.wellbeing.percentage, None);
//! ```

pub use config::{AppConfig, EngineConfig};
pub use dashboard::summarize;
pub use error::{Error, Result};
pub use models::*;
pub use source::{Snapshot, SnapshotSource};

pub mod clinical;
pub mod config;
pub mod csv_source;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod journal;
pub mod logging;
pub mod models;
pub mod report;
pub mod source;
pub mod wellbeing;
