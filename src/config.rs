//! Tuning constants and shell settings.
//!
//! Every field has a default matching the dashboard's historical behaviour,
//! so an empty TOML file (or no file at all) yields `AppConfig::default()`.
//!
//! ```toml
//! [engine]
//! streak_lookback_days = 30
//!
//! [engine.trend]
//! window = 3
//! margin = 0.2
//!
//! [engine.scoring.weights]
//! consistency = 0.25
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::Trend;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads the TOML file at `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&contents)?;
                tracing::debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Safety bound on how far back the streak walk looks
    #[serde(default = "default_streak_lookback_days")]
    pub streak_lookback_days: u32,

    /// Length of the per-day mood series, today included
    #[serde(default = "default_mood_series_days")]
    pub mood_series_days: u32,

    /// Points kept in each instrument's score history
    #[serde(default = "default_history_points")]
    pub history_points: usize,

    #[serde(default)]
    pub trend: TrendConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            streak_lookback_days: default_streak_lookback_days(),
            mood_series_days: default_mood_series_days(),
            history_points: default_history_points(),
            trend: TrendConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn default_streak_lookback_days() -> u32 {
    30
}

fn default_mood_series_days() -> u32 {
    7
}

fn default_history_points() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Entries in each of the recent and older windows
    pub window: usize,
    /// Dead-zone between window averages before a direction is reported
    pub margin: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: 3,
            margin: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Streak length that counts as perfect consistency
    pub consistency_target_days: u32,
    /// Most recent entries averaged for the mood factor
    pub recent_mood_window: usize,
    /// Average entry length that counts as full quality
    pub quality_target_chars: u32,
    pub weights: WellbeingWeights,
    pub trend_factors: TrendFactors,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            consistency_target_days: 14,
            recent_mood_window: 7,
            quality_target_chars: 200,
            weights: WellbeingWeights::default(),
            trend_factors: TrendFactors::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WellbeingWeights {
    pub consistency: f64,
    pub recent_mood: f64,
    pub positive_ratio: f64,
    pub trend: f64,
    pub quality: f64,
}

impl Default for WellbeingWeights {
    fn default() -> Self {
        Self {
            consistency: 0.25,
            recent_mood: 0.30,
            positive_ratio: 0.20,
            trend: 0.15,
            quality: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrendFactors {
    pub improving: f64,
    pub stable: f64,
    pub declining: f64,
}

impl TrendFactors {
    pub fn factor(&self, trend: Trend) -> f64 {
        match trend {
            Trend::Improving => self.improving,
            Trend::Stable => self.stable,
            Trend::Declining => self.declining,
        }
    }
}

impl Default for TrendFactors {
    fn default() -> Self {
        Self {
            improving: 1.0,
            stable: 0.6,
            declining: 0.2,
        }
    }
}
