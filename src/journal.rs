//! Journal-derived aggregates: streak, per-day mood series, sentiment
//! distribution and the recent-versus-older trend.
//!
//! Entries may arrive in any order; functions that care about recency sort
//! their own view with [`newest_first`].

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::config::TrendConfig;
use crate::models::{JournalEntry, MoodDay, MoodDistribution, Sentiment, Trend};

/// Mood score assumed for an empty window.
pub const NEUTRAL_SCORE: f64 = 2.0;

/// Maps a raw, possibly missing label to 1, 2 or 3.
pub fn map_sentiment_to_score(label: Option<&str>) -> u8 {
    label
        .map(Sentiment::from_label)
        .unwrap_or_default()
        .mood_score()
}

/// Entries ordered most recent first. Ties on timestamp fall back to id so the
/// order is deterministic.
pub fn newest_first<'a, I>(entries: I) -> Vec<&'a JournalEntry>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let mut ordered: Vec<&JournalEntry> = entries.into_iter().collect();
    ordered.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

pub fn mean_score<'a, I>(entries: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let (sum, count) = entries
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), entry| {
            (sum + u32::from(entry.sentiment.mood_score()), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(f64::from(sum) / f64::from(count))
    }
}

/// Consecutive days with at least one entry, walking back from `today`.
///
/// An empty `today` does not end the walk; the first empty day before it does.
pub fn compute_streak(entries: &[JournalEntry], today: NaiveDate, lookback_days: u32) -> u32 {
    let active_days: HashSet<NaiveDate> = entries.iter().map(JournalEntry::day).collect();
    let mut streak = 0;

    for offset in 0..lookback_days {
        let day = today - Duration::days(i64::from(offset));
        if active_days.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }

    streak
}

/// One point per day for the `window_days` days ending at `today`, oldest first.
pub fn build_mood_series(
    entries: &[JournalEntry],
    window_days: u32,
    today: NaiveDate,
) -> Vec<MoodDay> {
    (0..window_days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            let day_entries: Vec<&JournalEntry> =
                entries.iter().filter(|entry| entry.day() == date).collect();

            MoodDay {
                date,
                label: date.format("%a").to_string(),
                average_mood: mean_score(day_entries.iter().copied()).unwrap_or(0.0),
                entry_count: day_entries.len(),
            }
        })
        .collect()
}

pub fn mood_distribution(entries: &[JournalEntry]) -> MoodDistribution {
    entries
        .iter()
        .fold(MoodDistribution::default(), |mut distribution, entry| {
            match entry.sentiment {
                Sentiment::Positive => distribution.positive += 1,
                Sentiment::Neutral => distribution.neutral += 1,
                Sentiment::Negative => distribution.negative += 1,
            }
            distribution
        })
}

/// Compares the newest `window` entries against the `window` before them.
///
/// Fewer than two entries always reads as `Stable`.
pub fn classify_trend(entries: &[JournalEntry], config: &TrendConfig) -> Trend {
    if entries.len() < 2 {
        return Trend::Stable;
    }

    let window = config.window.max(1);
    let ordered = newest_first(entries);
    let recent_avg = mean_score(ordered.iter().take(window).copied()).unwrap_or(NEUTRAL_SCORE);
    let older_avg = mean_score(ordered.iter().skip(window).take(window).copied())
        .unwrap_or(NEUTRAL_SCORE);

    classify_window_averages(recent_avg, older_avg, config.margin)
}

/// Applies the dead-zone: a difference of exactly `margin` is still `Stable`.
pub fn classify_window_averages(recent_avg: f64, older_avg: f64, margin: f64) -> Trend {
    if recent_avg > older_avg + margin {
        Trend::Improving
    } else if recent_avg < older_avg - margin {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Entries matching an optional sentiment and a case-insensitive text query.
/// A blank query matches everything.
pub fn filter_entries<'a>(
    entries: &'a [JournalEntry],
    sentiment: Option<Sentiment>,
    query: Option<&str>,
) -> Vec<&'a JournalEntry> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    entries
        .iter()
        .filter(|entry| sentiment.map_or(true, |wanted| entry.sentiment == wanted))
        .filter(|entry| {
            needle
                .as_deref()
                .map_or(true, |needle| entry.text.to_lowercase().contains(needle))
        })
        .collect()
}
