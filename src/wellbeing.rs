//! Composite journal wellbeing score and the journal summary pipeline.
//!
//! The score blends five factors, each in `[0, 1]` before weighting:
//! consistency (streak against a target), recent mood, share of positive
//! entries, trend direction and average entry length.

use chrono::NaiveDate;

use crate::config::{EngineConfig, ScoringConfig, TrendConfig};
use crate::journal::{self, NEUTRAL_SCORE};
use crate::models::{
    FactorContribution, JournalEntry, JournalSummary, Sentiment, WellbeingBreakdown,
    WellbeingLevel, WellbeingScore,
};

pub fn compute_wellbeing_score(
    entries: &[JournalEntry],
    streak: u32,
    scoring: &ScoringConfig,
    trend_config: &TrendConfig,
) -> WellbeingScore {
    if entries.is_empty() {
        return WellbeingScore::not_started();
    }

    let total = entries.len() as f64;
    let weights = &scoring.weights;

    let consistency =
        (f64::from(streak) / f64::from(scoring.consistency_target_days.max(1))).min(1.0);

    let ordered = journal::newest_first(entries);
    let recent_window = scoring.recent_mood_window.clamp(1, entries.len());
    let recent_avg = journal::mean_score(ordered.iter().take(recent_window).copied())
        .unwrap_or(NEUTRAL_SCORE);
    let recent_mood = ((recent_avg - 1.0) / 2.0).clamp(0.0, 1.0);

    let positive = entries
        .iter()
        .filter(|entry| entry.sentiment == Sentiment::Positive)
        .count();
    let positive_ratio = positive as f64 / total;

    let trend = journal::classify_trend(entries, trend_config);
    let trend_factor = scoring.trend_factors.factor(trend);

    let total_chars: usize = entries.iter().map(|entry| entry.text.chars().count()).sum();
    let average_length = total_chars as f64 / total;
    let quality = (average_length / f64::from(scoring.quality_target_chars.max(1))).min(1.0);

    let breakdown = WellbeingBreakdown {
        consistency: FactorContribution::new(consistency, weights.consistency),
        recent_mood: FactorContribution::new(recent_mood, weights.recent_mood),
        positive_ratio: FactorContribution::new(positive_ratio, weights.positive_ratio),
        trend: FactorContribution::new(trend_factor, weights.trend),
        quality: FactorContribution::new(quality, weights.quality),
    };

    let percentage = breakdown.total_points().round().clamp(0.0, 100.0) as u8;

    WellbeingScore {
        percentage,
        level: WellbeingLevel::from_percentage(percentage),
        breakdown,
    }
}

/// Every journal-derived aggregate for one snapshot of entries.
pub fn summarize_journal(
    entries: &[JournalEntry],
    today: NaiveDate,
    config: &EngineConfig,
) -> JournalSummary {
    let streak = journal::compute_streak(entries, today, config.streak_lookback_days);
    let trend = journal::classify_trend(entries, &config.trend);
    let distribution = journal::mood_distribution(entries);
    let wellbeing = compute_wellbeing_score(entries, streak, &config.scoring, &config.trend);

    tracing::debug!(
        entries = entries.len(),
        streak,
        trend = trend.as_str(),
        percentage = wellbeing.percentage,
        "Summarized journal"
    );

    JournalSummary {
        total_entries: entries.len(),
        last_entry_at: entries.iter().map(|entry| entry.timestamp).max(),
        streak,
        trend,
        mood_series: journal::build_mood_series(entries, config.mood_series_days, today),
        distribution,
        sentiment_shares: distribution.shares(),
        wellbeing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::tests::{entry, entry_at, today};
    use crate::models::Trend;

    fn score(entries: &[JournalEntry], streak: u32) -> WellbeingScore {
        let config = EngineConfig::default();
        compute_wellbeing_score(entries, streak, &config.scoring, &config.trend)
    }

    #[test]
    fn empty_journal_is_not_started() {
        let result = score(&[], 5);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.level, WellbeingLevel::NotStarted);
        assert_eq!(result.breakdown, WellbeingBreakdown::default());
    }

    #[test]
    fn factors_follow_weighted_formula() {
        let entries = vec![
            entry(5, Sentiment::Negative),
            entry(4, Sentiment::Negative),
            entry(3, Sentiment::Negative),
            entry(2, Sentiment::Positive),
            entry(1, Sentiment::Positive),
            entry(0, Sentiment::Positive),
        ];

        let result = score(&entries, 6);
        let breakdown = result.breakdown;

        assert!((breakdown.consistency.factor - 6.0 / 14.0).abs() < 1e-9);
        assert!((breakdown.recent_mood.factor - 0.5).abs() < 1e-9);
        assert!((breakdown.positive_ratio.factor - 0.5).abs() < 1e-9);
        assert_eq!(breakdown.trend.factor, 1.0);
        // "wrote a little today" is 20 characters
        assert!((breakdown.quality.factor - 0.1).abs() < 1e-9);

        assert_eq!(result.percentage, 52);
        assert_eq!(result.level, WellbeingLevel::Fair);
        assert!((breakdown.total_points() - 51.714_285).abs() < 1e-3);
    }

    #[test]
    fn consistent_positive_journal_is_excellent() {
        let long_text = "x".repeat(240);
        let entries: Vec<JournalEntry> = (0..14)
            .map(|d| entry_at(d, 9, Sentiment::Positive, &long_text))
            .collect();

        let result = score(&entries, 14);
        assert_eq!(result.breakdown.trend.factor, 0.6);
        assert_eq!(result.breakdown.quality.factor, 1.0);
        assert_eq!(result.percentage, 94);
        assert_eq!(result.level, WellbeingLevel::Excellent);
    }

    #[test]
    fn single_short_negative_entry_needs_attention() {
        let entries = vec![entry_at(0, 9, Sentiment::Negative, "bad")];
        let result = score(&entries, 1);
        assert_eq!(result.breakdown.recent_mood.factor, 0.0);
        assert_eq!(result.breakdown.positive_ratio.factor, 0.0);
        assert_eq!(result.breakdown.trend.factor, 0.6);
        assert_eq!(result.percentage, 11);
        assert_eq!(result.level, WellbeingLevel::NeedsAttention);
    }

    #[test]
    fn recent_mood_only_uses_latest_seven_entries() {
        let mut entries: Vec<JournalEntry> =
            (0..7).map(|d| entry(d, Sentiment::Positive)).collect();
        entries.extend((7..20).map(|d| entry(d, Sentiment::Negative)));

        let result = score(&entries, 7);
        assert_eq!(result.breakdown.recent_mood.factor, 1.0);
        assert!((result.breakdown.positive_ratio.factor - 7.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_stays_in_range_for_long_streaks() {
        let entries: Vec<JournalEntry> = (0..40)
            .map(|d| entry_at(d, 9, Sentiment::Positive, &"y".repeat(500)))
            .collect();
        let result = score(&entries, 40);
        assert!(result.percentage <= 100);
        assert_eq!(result.breakdown.consistency.factor, 1.0);
        assert_eq!(result.breakdown.consistency.display, 100);
    }

    #[test]
    fn journal_summary_composes_aggregates() {
        let entries = vec![
            entry(0, Sentiment::Positive),
            entry(1, Sentiment::Positive),
            entry(2, Sentiment::Neutral),
        ];

        let summary = summarize_journal(&entries, today(), &EngineConfig::default());
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.streak, 3);
        assert_eq!(summary.trend, Trend::Improving);
        assert_eq!(summary.mood_series.len(), 7);
        assert_eq!(summary.distribution.positive, 2);
        assert_eq!(summary.sentiment_shares.len(), 3);
        assert_eq!(summary.last_entry_at, Some(entries[0].timestamp));
        assert_eq!(summary, summarize_journal(&entries, today(), &EngineConfig::default()));
    }
}
