use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sentiment label attached to a journal entry by the classification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Exact-match lookup. Anything outside the known labels is `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Positive" => Sentiment::Positive,
            "Negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    /// Numeric mood value used by every average: 3, 2 or 1.
    pub fn mood_score(self) -> u8 {
        match self {
            Sentiment::Positive => 3,
            Sentiment::Neutral => 2,
            Sentiment::Negative => 1,
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(Sentiment::from_label)
            .unwrap_or_default())
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub confidence: f64,
}

impl JournalEntry {
    /// Calendar day the entry was written on (UTC).
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Screening instruments known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Instrument {
    #[serde(rename = "PHQ9")]
    Phq9,
    #[serde(rename = "GAD7")]
    Gad7,
    #[serde(rename = "PSS10")]
    Pss10,
    #[serde(rename = "BIGFIVE")]
    BigFive,
}

impl Instrument {
    /// Resolves a test type label ("PHQ9", "phq-9", "GAD 7", ...) or a legacy
    /// numeric test id.
    pub fn resolve(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(test_id) = trimmed.parse::<i64>() {
            return Self::from_test_id(test_id);
        }
        Self::from_label(trimmed)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "PHQ9" => Some(Instrument::Phq9),
            "GAD7" => Some(Instrument::Gad7),
            "PSS" | "PSS10" => Some(Instrument::Pss10),
            "BIGFIVE" | "BFI" => Some(Instrument::BigFive),
            _ => None,
        }
    }

    pub fn from_test_id(test_id: i64) -> Option<Self> {
        match test_id {
            1 => Some(Instrument::Phq9),
            2 => Some(Instrument::Gad7),
            3 => Some(Instrument::BigFive),
            4 => Some(Instrument::Pss10),
            _ => None,
        }
    }

    pub fn max_score(self) -> u32 {
        match self {
            Instrument::Phq9 => 27,
            Instrument::Gad7 => 21,
            Instrument::Pss10 => 40,
            Instrument::BigFive => 250,
        }
    }

    /// Symptom scales are lower-is-better and feed the clinical wellbeing
    /// average. The Big Five inventory is a trait profile and does not.
    pub fn is_symptom_scale(self) -> bool {
        !matches!(self, Instrument::BigFive)
    }

    pub fn code(self) -> &'static str {
        match self {
            Instrument::Phq9 => "PHQ9",
            Instrument::Gad7 => "GAD7",
            Instrument::Pss10 => "PSS10",
            Instrument::BigFive => "BIGFIVE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Instrument::Phq9 => "PHQ-9",
            Instrument::Gad7 => "GAD-7",
            Instrument::Pss10 => "PSS-10",
            Instrument::BigFive => "Big Five",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicalTestResult {
    pub id: String,
    pub instrument: Instrument,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
    /// Severity label assigned by the scoring service, passed through as-is.
    pub severity_level: String,
}

/// Coarse display urgency derived from a severity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTone {
    Success,
    Info,
    Warning,
    Error,
    Default,
}

impl SeverityTone {
    pub fn from_severity(severity: &str) -> Self {
        match severity.trim().to_ascii_lowercase().as_str() {
            "minimal" | "low" => SeverityTone::Success,
            "mild" | "moderate_low" => SeverityTone::Info,
            "moderate" | "moderate_high" => SeverityTone::Warning,
            "moderately_severe" | "severe" | "high" => SeverityTone::Error,
            _ => SeverityTone::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodDay {
    pub date: NaiveDate,
    pub label: String,
    /// Mean mood score for the day, or 0.0 when nothing was written.
    pub average_mood: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MoodDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub sentiment: Sentiment,
    pub count: usize,
    pub percentage: f64,
}

impl MoodDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(sentiment) as f64 / total as f64 * 100.0
    }

    pub fn shares(&self) -> Vec<SentimentShare> {
        Sentiment::ALL
            .iter()
            .map(|&sentiment| SentimentShare {
                sentiment,
                count: self.count(sentiment),
                percentage: self.percentage(sentiment),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WellbeingLevel {
    NotStarted,
    Excellent,
    Good,
    Fair,
    Concerning,
    NeedsAttention,
}

impl WellbeingLevel {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80..=u8::MAX => WellbeingLevel::Excellent,
            65..=79 => WellbeingLevel::Good,
            50..=64 => WellbeingLevel::Fair,
            35..=49 => WellbeingLevel::Concerning,
            _ => WellbeingLevel::NeedsAttention,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WellbeingLevel::NotStarted => "Start Tracking",
            WellbeingLevel::Excellent => "Excellent",
            WellbeingLevel::Good => "Good",
            WellbeingLevel::Fair => "Fair",
            WellbeingLevel::Concerning => "Concerning",
            WellbeingLevel::NeedsAttention => "Needs Attention",
        }
    }
}

/// One weighted input of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FactorContribution {
    /// Raw factor value in `[0, 1]`.
    pub factor: f64,
    pub weight: f64,
    /// Points added to the final percentage (`weight * factor * 100`).
    pub points: f64,
    /// Factor rescaled to 0..=100 for tooltips.
    pub display: u8,
}

impl FactorContribution {
    pub fn new(factor: f64, weight: f64) -> Self {
        Self {
            factor,
            weight,
            points: weight * factor * 100.0,
            display: (factor * 100.0).round().clamp(0.0, 100.0) as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WellbeingBreakdown {
    pub consistency: FactorContribution,
    pub recent_mood: FactorContribution,
    pub positive_ratio: FactorContribution,
    pub trend: FactorContribution,
    pub quality: FactorContribution,
}

impl WellbeingBreakdown {
    pub fn total_points(&self) -> f64 {
        self.consistency.points
            + self.recent_mood.points
            + self.positive_ratio.points
            + self.trend.points
            + self.quality.points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellbeingScore {
    pub percentage: u8,
    pub level: WellbeingLevel,
    pub breakdown: WellbeingBreakdown,
}

impl WellbeingScore {
    pub fn not_started() -> Self {
        Self {
            percentage: 0,
            level: WellbeingLevel::NotStarted,
            breakdown: WellbeingBreakdown::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClinicalLevel {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl ClinicalLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            ClinicalLevel::Excellent
        } else if percentage >= 60.0 {
            ClinicalLevel::Good
        } else if percentage >= 40.0 {
            ClinicalLevel::Fair
        } else {
            ClinicalLevel::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClinicalLevel::Excellent => "Excellent",
            ClinicalLevel::Good => "Good",
            ClinicalLevel::Fair => "Fair",
            ClinicalLevel::NeedsAttention => "Needs Attention",
        }
    }
}

/// Test-derived wellbeing. `None` means no symptom scale has been taken yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClinicalWellbeing {
    pub percentage: Option<f64>,
    pub level: Option<ClinicalLevel>,
}

/// Direction across the two most recent results of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetakeTrend {
    Improving,
    Increasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestStats {
    pub average_score: u32,
    pub min_score: u32,
    pub max_score: u32,
    pub total_tests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScorePoint {
    pub completed_at: DateTime<Utc>,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub instrument: Instrument,
    pub latest_score: u32,
    pub max_score: u32,
    pub severity_level: String,
    pub severity_label: String,
    pub tone: SeverityTone,
    pub last_taken: DateTime<Utc>,
    pub history_count: usize,
    pub trend: Option<RetakeTrend>,
    pub stats: TestStats,
    /// Most recent results, oldest first.
    pub history: Vec<ScorePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalSummary {
    pub total_entries: usize,
    pub last_entry_at: Option<DateTime<Utc>>,
    pub streak: u32,
    pub trend: Trend,
    pub mood_series: Vec<MoodDay>,
    pub distribution: MoodDistribution,
    pub sentiment_shares: Vec<SentimentShare>,
    pub wellbeing: WellbeingScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalSummary {
    pub total_tests_completed: usize,
    pub wellbeing: ClinicalWellbeing,
    pub instruments: Vec<InstrumentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub generated_for: NaiveDate,
    pub journal: JournalSummary,
    pub clinical: ClinicalSummary,
}
