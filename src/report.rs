use std::fmt::Write;

use crate::journal;
use crate::models::{
    DashboardSummary, InstrumentSummary, JournalEntry, RetakeTrend, Sentiment, WellbeingBreakdown,
};

const EXCERPT_CHARS: usize = 80;

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

fn retake_label(trend: Option<RetakeTrend>) -> &'static str {
    match trend {
        Some(RetakeTrend::Improving) => "scores are improving",
        Some(RetakeTrend::Increasing) => "scores are increasing",
        Some(RetakeTrend::Stable) => "scores are unchanged",
        None => "take it again to see a trend",
    }
}

fn write_breakdown(output: &mut String, breakdown: &WellbeingBreakdown) {
    let factors = [
        ("Consistency", breakdown.consistency),
        ("Recent mood", breakdown.recent_mood),
        ("Positive ratio", breakdown.positive_ratio),
        ("Trend", breakdown.trend),
        ("Entry quality", breakdown.quality),
    ];
    for (name, factor) in factors {
        let _ = writeln!(
            output,
            "- {}: {}% (adds {:.1} points)",
            name, factor.display, factor.points
        );
    }
}

fn write_instrument(output: &mut String, summary: &InstrumentSummary) {
    let _ = writeln!(
        output,
        "- {}: {} / {} ({}), taken {} time(s), last on {}; {}",
        summary.instrument,
        summary.latest_score,
        summary.max_score,
        if summary.severity_label.is_empty() {
            "no severity"
        } else {
            summary.severity_label.as_str()
        },
        summary.history_count,
        summary.last_taken.date_naive(),
        retake_label(summary.trend)
    );
}

/// Short plain-text summary for the terminal.
pub fn build_overview(summary: &DashboardSummary) -> String {
    let mut output = String::new();
    let journal = &summary.journal;
    let clinical = &summary.clinical;

    let _ = writeln!(output, "Wellbeing as of {}", summary.generated_for);
    let _ = writeln!(
        output,
        "- Journal: {} entries, {} day streak, trend {}",
        journal.total_entries,
        journal.streak,
        journal.trend.as_str()
    );
    let _ = writeln!(
        output,
        "- Journal wellbeing: {}% ({})",
        journal.wellbeing.percentage,
        journal.wellbeing.level.label()
    );
    match (clinical.wellbeing.percentage, clinical.wellbeing.level) {
        (Some(percentage), Some(level)) => {
            let _ = writeln!(
                output,
                "- Clinical wellbeing: {:.0}% ({}) from {} assessments",
                percentage,
                level.label(),
                clinical.total_tests_completed
            );
        }
        _ => {
            let _ = writeln!(output, "- Clinical wellbeing: not enough data");
        }
    }

    output
}

/// Which entries the "Recent Entries" section lists. Scores always cover
/// every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter<'a> {
    pub sentiment: Option<Sentiment>,
    pub search: Option<&'a str>,
}

impl EntryFilter<'_> {
    fn is_active(&self) -> bool {
        self.sentiment.is_some() || self.search.is_some_and(|q| !q.trim().is_empty())
    }
}

pub fn build_report(
    label: Option<&str>,
    summary: &DashboardSummary,
    entries: &[JournalEntry],
    filter: EntryFilter<'_>,
) -> String {
    let journal = &summary.journal;
    let clinical = &summary.clinical;

    let mut output = String::new();
    let subject = label.unwrap_or("this journal");

    let _ = writeln!(output, "# Wellbeing Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        subject, summary.generated_for
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Journal Wellbeing");

    if journal.total_entries == 0 {
        let _ = writeln!(output, "No journal entries yet. Start writing to see your score.");
    } else {
        let _ = writeln!(
            output,
            "Score {}% ({}) across {} entries; {} day streak, trend {}.",
            journal.wellbeing.percentage,
            journal.wellbeing.level.label(),
            journal.total_entries,
            journal.streak,
            journal.trend.as_str()
        );
        let _ = writeln!(output);
        write_breakdown(&mut output, &journal.wellbeing.breakdown);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Mood, Last {} Days", journal.mood_series.len());
    let _ = writeln!(output, "| Day | Date | Entries | Average mood |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for day in &journal.mood_series {
        let mood = if day.entry_count == 0 {
            "-".to_string()
        } else {
            format!("{:.2}", day.average_mood)
        };
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            day.label, day.date, day.entry_count, mood
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Mood Mix");
    if journal.distribution.total() == 0 {
        let _ = writeln!(output, "No entries recorded.");
    } else {
        for share in &journal.sentiment_shares {
            let _ = writeln!(
                output,
                "- {}: {} entries ({:.0}%)",
                share.sentiment, share.count, share.percentage
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Clinical Wellbeing");
    match (clinical.wellbeing.percentage, clinical.wellbeing.level) {
        (Some(percentage), Some(level)) => {
            let _ = writeln!(
                output,
                "Score {:.1}% ({}) from {} completed assessments.",
                percentage,
                level.label(),
                clinical.total_tests_completed
            );
        }
        _ => {
            let _ = writeln!(output, "Not enough data. Take a screening test to see a score.");
        }
    }
    if !clinical.instruments.is_empty() {
        let _ = writeln!(output);
        for instrument in &clinical.instruments {
            write_instrument(&mut output, instrument);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Entries");
    let recent = journal::newest_first(journal::filter_entries(
        entries,
        filter.sentiment,
        filter.search,
    ));
    if recent.is_empty() && filter.is_active() {
        let _ = writeln!(output, "No entries match the filter.");
    } else if recent.is_empty() {
        let _ = writeln!(output, "No entries recorded.");
    } else {
        for entry in recent.iter().take(5) {
            let marker = match entry.sentiment {
                Sentiment::Positive => "+",
                Sentiment::Neutral => "~",
                Sentiment::Negative => "-",
            };
            let _ = writeln!(
                output,
                "- [{}] {} ({}): {}",
                marker,
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.sentiment,
                excerpt(&entry.text)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::tests::result;
    use crate::config::EngineConfig;
    use crate::dashboard::summarize;
    use crate::journal::tests::{entry, entry_at, today};
    use crate::models::Instrument;

    #[test]
    fn empty_report_explains_missing_data() {
        let summary = summarize(&[], &[], today(), &EngineConfig::default());
        let report = build_report(None, &summary, &[], EntryFilter::default());

        assert!(report.starts_with("# Wellbeing Report"));
        assert!(report.contains("No journal entries yet"));
        assert!(report.contains("Not enough data"));
        assert!(report.contains("## Mood, Last 7 Days"));
    }

    #[test]
    fn report_lists_scores_and_recent_entries() {
        let entries = vec![
            entry(1, Sentiment::Negative),
            entry_at(0, 9, Sentiment::Positive, &"sunny ".repeat(30)),
        ];
        let results = vec![
            result(Instrument::Phq9, 14, 20, "moderate"),
            result(Instrument::Phq9, 9, 0, "mild"),
        ];
        let summary = summarize(&entries, &results, today(), &EngineConfig::default());
        let report = build_report(
            Some("demo@example.com"),
            &summary,
            &entries,
            EntryFilter::default(),
        );

        assert!(report.contains("Generated for demo@example.com on 2026-03-15"));
        assert!(report.contains("2 day streak"));
        assert!(report.contains("PHQ-9: 9 / 27 (Mild)"));
        assert!(report.contains("scores are improving"));
        assert!(report.contains("Score 66.7% (Good)"));

        let recent = report.split("## Recent Entries").nth(1).unwrap();
        let first = recent.lines().find(|line| line.starts_with("- ")).unwrap();
        assert!(first.starts_with("- [+] 2026-03-15 09:00"));
        assert!(first.ends_with("..."));
    }

    #[test]
    fn recent_entries_follow_the_filter() {
        let entries = vec![
            entry_at(2, 8, Sentiment::Positive, "Long walk after work"),
            entry_at(1, 21, Sentiment::Negative, "Work ran late again"),
            entry_at(0, 9, Sentiment::Positive, "Coffee with an old friend"),
        ];
        let summary = summarize(&entries, &[], today(), &EngineConfig::default());

        let filter = EntryFilter {
            sentiment: Some(Sentiment::Positive),
            search: Some("WORK"),
        };
        let report = build_report(None, &summary, &entries, filter);
        assert!(report.contains("across 3 entries"));

        let recent = report.split("## Recent Entries").nth(1).unwrap();
        let listed: Vec<&str> = recent.lines().filter(|line| line.starts_with("- ")).collect();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].ends_with("Long walk after work"));

        let filter = EntryFilter {
            sentiment: Some(Sentiment::Neutral),
            search: None,
        };
        let report = build_report(None, &summary, &entries, filter);
        assert!(report.contains("No entries match the filter."));
    }

    #[test]
    fn overview_mentions_both_scores() {
        let entries = vec![entry(0, Sentiment::Positive)];
        let results = vec![result(Instrument::Gad7, 7, 0, "mild")];
        let summary = summarize(&entries, &results, today(), &EngineConfig::default());

        let overview = build_overview(&summary);
        assert!(overview.contains("1 entries, 1 day streak"));
        assert!(overview.contains("Clinical wellbeing: 67% (Good)"));
    }

    #[test]
    fn excerpts_keep_short_text_intact() {
        assert_eq!(excerpt("short"), "short");
        assert_eq!(excerpt(&"a".repeat(81)), format!("{}...", "a".repeat(80)));
    }
}
