//! Screening-test aggregates.
//!
//! All symptom scales used here are lower-is-better, so each latest score is
//! flipped onto a 0..=100 higher-is-better scale before averaging.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::models::{
    ClinicalLevel, ClinicalSummary, ClinicalTestResult, ClinicalWellbeing, Instrument,
    InstrumentSummary, RetakeTrend, ScorePoint, SeverityTone, TestStats,
};

/// `(max - score) / max * 100`, or `None` for instruments that are not symptom
/// scales.
pub fn normalized_contribution(instrument: Instrument, score: u32) -> Option<f64> {
    if !instrument.is_symptom_scale() {
        return None;
    }
    let max = f64::from(instrument.max_score());
    Some((max - f64::from(score)) / max * 100.0)
}

fn chronological<'a, I>(results: I) -> Vec<&'a ClinicalTestResult>
where
    I: IntoIterator<Item = &'a ClinicalTestResult>,
{
    let mut ordered: Vec<&ClinicalTestResult> = results.into_iter().collect();
    ordered.sort_by(|a, b| {
        a.completed_at
            .cmp(&b.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

fn group_by_instrument(
    results: &[ClinicalTestResult],
) -> BTreeMap<Instrument, Vec<&ClinicalTestResult>> {
    let mut groups: BTreeMap<Instrument, Vec<&ClinicalTestResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.instrument).or_default().push(result);
    }
    groups
        .into_iter()
        .map(|(instrument, history)| (instrument, chronological(history)))
        .collect()
}

pub fn latest_per_instrument(
    results: &[ClinicalTestResult],
) -> BTreeMap<Instrument, &ClinicalTestResult> {
    group_by_instrument(results)
        .into_iter()
        .filter_map(|(instrument, history)| history.last().map(|latest| (instrument, *latest)))
        .collect()
}

/// Averages the normalized latest scores. Instruments never taken are simply
/// absent; with nothing to average the result carries no percentage at all.
pub fn compute_clinical_wellbeing<'a, I>(latest: I) -> ClinicalWellbeing
where
    I: IntoIterator<Item = &'a ClinicalTestResult>,
{
    let contributions: Vec<f64> = latest
        .into_iter()
        .filter_map(|result| normalized_contribution(result.instrument, result.score))
        .collect();

    if contributions.is_empty() {
        return ClinicalWellbeing::default();
    }

    let percentage = contributions.iter().sum::<f64>() / contributions.len() as f64;
    ClinicalWellbeing {
        percentage: Some(percentage),
        level: Some(ClinicalLevel::from_percentage(percentage)),
    }
}

/// Compares the two most recent results of a single instrument.
pub fn retake_trend(history: &[&ClinicalTestResult]) -> Option<RetakeTrend> {
    let ordered = chronological(history.iter().copied());
    let [.., previous, latest] = ordered.as_slice() else {
        return None;
    };

    Some(match latest.score.cmp(&previous.score) {
        std::cmp::Ordering::Less => RetakeTrend::Improving,
        std::cmp::Ordering::Greater => RetakeTrend::Increasing,
        std::cmp::Ordering::Equal => RetakeTrend::Stable,
    })
}

pub fn test_stats(history: &[&ClinicalTestResult]) -> Option<TestStats> {
    let min_score = history.iter().map(|result| result.score).min()?;
    let max_score = history.iter().map(|result| result.score).max()?;
    let total: u64 = history.iter().map(|result| u64::from(result.score)).sum();
    let average = total as f64 / history.len() as f64;

    Some(TestStats {
        average_score: average.round() as u32,
        min_score,
        max_score,
        total_tests: history.len(),
    })
}

/// The last `points` results, oldest first, for charting.
pub fn score_history(history: &[&ClinicalTestResult], points: usize) -> Vec<ScorePoint> {
    let ordered = chronological(history.iter().copied());
    let skip = ordered.len().saturating_sub(points);
    ordered
        .into_iter()
        .skip(skip)
        .map(|result| ScorePoint {
            completed_at: result.completed_at,
            score: result.score,
        })
        .collect()
}

/// "moderately_severe" -> "Moderately Severe"
pub fn severity_label(severity: &str) -> String {
    severity
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn summarize_clinical(results: &[ClinicalTestResult], config: &EngineConfig) -> ClinicalSummary {
    let groups = group_by_instrument(results);
    let mut instruments = Vec::with_capacity(groups.len());

    for (instrument, history) in &groups {
        let (Some(latest), Some(stats)) = (history.last(), test_stats(history)) else {
            continue;
        };

        instruments.push(InstrumentSummary {
            instrument: *instrument,
            latest_score: latest.score,
            max_score: instrument.max_score(),
            severity_level: latest.severity_level.clone(),
            severity_label: severity_label(&latest.severity_level),
            tone: SeverityTone::from_severity(&latest.severity_level),
            last_taken: latest.completed_at,
            history_count: history.len(),
            trend: retake_trend(history),
            stats,
            history: score_history(history, config.history_points),
        });
    }

    let wellbeing = compute_clinical_wellbeing(latest_per_instrument(results).into_values());

    tracing::debug!(
        results = results.len(),
        instruments = instruments.len(),
        percentage = ?wellbeing.percentage,
        "Summarized screening results"
    );

    ClinicalSummary {
        total_tests_completed: results.len(),
        wellbeing,
        instruments,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn result(
        instrument: Instrument,
        score: u32,
        days_ago: i64,
        severity: &str,
    ) -> ClinicalTestResult {
        let completed_at =
            Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap() - Duration::days(days_ago);
        ClinicalTestResult {
            id: format!("{}-{days_ago}", instrument.code()),
            instrument,
            score,
            completed_at,
            severity_level: severity.to_string(),
        }
    }

    #[test]
    fn single_phq9_result_scores_two_thirds() {
        let results = vec![result(Instrument::Phq9, 9, 0, "mild")];
        let wellbeing = compute_clinical_wellbeing(&results);

        let percentage = wellbeing.percentage.unwrap();
        assert!((percentage - 66.666_666).abs() < 1e-3);
        assert_eq!(wellbeing.level, Some(ClinicalLevel::Good));
    }

    #[test]
    fn no_results_means_no_percentage() {
        let wellbeing = compute_clinical_wellbeing(&Vec::<ClinicalTestResult>::new());
        assert_eq!(wellbeing.percentage, None);
        assert_eq!(wellbeing.level, None);

        let summary = summarize_clinical(&[], &EngineConfig::default());
        assert_eq!(summary.total_tests_completed, 0);
        assert!(summary.instruments.is_empty());
        assert_eq!(summary.wellbeing.percentage, None);
    }

    #[test]
    fn averages_across_taken_instruments_only() {
        let results = vec![
            result(Instrument::Phq9, 9, 3, "mild"),
            result(Instrument::Pss10, 10, 1, "low"),
        ];
        let wellbeing = compute_clinical_wellbeing(&results);
        // (66.67 + 75.0) / 2
        assert!((wellbeing.percentage.unwrap() - 70.833_333).abs() < 1e-3);
        assert_eq!(wellbeing.level, Some(ClinicalLevel::Good));
    }

    #[test]
    fn level_uses_unrounded_average_near_boundary() {
        let results = vec![
            result(Instrument::Phq9, 11, 0, "moderate"),
            result(Instrument::Pss10, 16, 0, "moderate"),
        ];
        let wellbeing = compute_clinical_wellbeing(&results);
        // (59.26 + 60.0) / 2 displays as 60 but stays below the Good cutoff.
        let percentage = wellbeing.percentage.unwrap();
        assert!(percentage > 59.5 && percentage < 60.0);
        assert_eq!(wellbeing.level, Some(ClinicalLevel::Fair));
    }

    #[test]
    fn trait_inventory_is_excluded_from_average() {
        assert_eq!(normalized_contribution(Instrument::BigFive, 120), None);
        let results = vec![result(Instrument::BigFive, 120, 0, "")];
        assert_eq!(compute_clinical_wellbeing(&results).percentage, None);
    }

    #[test]
    fn latest_result_wins_per_instrument() {
        let results = vec![
            result(Instrument::Gad7, 3, 0, "minimal"),
            result(Instrument::Gad7, 18, 10, "severe"),
            result(Instrument::Phq9, 20, 2, "severe"),
        ];
        let latest = latest_per_instrument(&results);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&Instrument::Gad7].score, 3);
        assert_eq!(latest[&Instrument::Phq9].score, 20);
    }

    #[test]
    fn summary_scores_only_latest_result_per_instrument() {
        let results = vec![
            result(Instrument::Phq9, 27, 30, "severe"),
            result(Instrument::Phq9, 9, 0, "mild"),
            result(Instrument::Gad7, 21, 5, "severe"),
            result(Instrument::Gad7, 7, 1, "mild"),
        ];
        let summary = summarize_clinical(&results, &EngineConfig::default());
        assert_eq!(summary.total_tests_completed, 4);

        let expected = compute_clinical_wellbeing(latest_per_instrument(&results).into_values());
        assert_eq!(summary.wellbeing, expected);
        // Both latest scores are a third of their maximum.
        assert!((summary.wellbeing.percentage.unwrap() - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn retake_trend_compares_two_most_recent() {
        let older = result(Instrument::Phq9, 14, 20, "moderate");
        let previous = result(Instrument::Phq9, 12, 10, "moderate");
        let latest = result(Instrument::Phq9, 8, 0, "mild");

        assert_eq!(retake_trend(&[&latest]), None);
        assert_eq!(retake_trend(&[&latest, &older, &previous]), Some(RetakeTrend::Improving));
        assert_eq!(retake_trend(&[&previous, &older]), Some(RetakeTrend::Improving));

        let worse = result(Instrument::Phq9, 16, 0, "moderately_severe");
        assert_eq!(retake_trend(&[&previous, &worse]), Some(RetakeTrend::Increasing));

        let same = result(Instrument::Phq9, 12, 0, "moderate");
        assert_eq!(retake_trend(&[&same, &previous]), Some(RetakeTrend::Stable));
    }

    #[test]
    fn stats_and_history_are_chronological() {
        let owned: Vec<ClinicalTestResult> = (0..12)
            .map(|i| result(Instrument::Gad7, i as u32, 12 - i, "mild"))
            .collect();
        let history: Vec<&ClinicalTestResult> = owned.iter().rev().collect();

        let stats = test_stats(&history).unwrap();
        assert_eq!(stats.min_score, 0);
        assert_eq!(stats.max_score, 11);
        // 66 / 12 = 5.5 rounds away from zero
        assert_eq!(stats.average_score, 6);
        assert_eq!(stats.total_tests, 12);

        let points = score_history(&history, 10);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0].score, 2);
        assert_eq!(points[9].score, 11);
        assert!(points.windows(2).all(|w| w[0].completed_at <= w[1].completed_at));
        assert!(test_stats(&[]).is_none());
    }

    #[test]
    fn severity_labels_are_title_cased() {
        assert_eq!(severity_label("moderately_severe"), "Moderately Severe");
        assert_eq!(severity_label("minimal"), "Minimal");
        assert_eq!(severity_label("moderate_high"), "Moderate High");
        assert_eq!(severity_label(""), "");
    }

    #[test]
    fn summary_lists_each_instrument_once() {
        let results = vec![
            result(Instrument::Phq9, 15, 30, "moderately_severe"),
            result(Instrument::Phq9, 9, 1, "mild"),
            result(Instrument::Gad7, 12, 2, "moderate"),
            result(Instrument::BigFive, 140, 5, ""),
        ];
        let summary = summarize_clinical(&results, &EngineConfig::default());

        assert_eq!(summary.total_tests_completed, 4);
        assert_eq!(summary.instruments.len(), 3);

        let phq9 = &summary.instruments[0];
        assert_eq!(phq9.instrument, Instrument::Phq9);
        assert_eq!(phq9.latest_score, 9);
        assert_eq!(phq9.max_score, 27);
        assert_eq!(phq9.history_count, 2);
        assert_eq!(phq9.trend, Some(RetakeTrend::Improving));
        assert_eq!(phq9.tone, SeverityTone::Info);
        assert_eq!(phq9.severity_label, "Mild");

        let gad7 = &summary.instruments[1];
        assert_eq!(gad7.trend, None);
        assert_eq!(gad7.tone, SeverityTone::Warning);

        // (66.67 + 42.86) / 2, Big Five ignored
        let percentage = summary.wellbeing.percentage.unwrap();
        assert!((percentage - 54.761_904).abs() < 1e-3);
        assert_eq!(summary.wellbeing.level, Some(ClinicalLevel::Fair));
    }
}
