use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{ClinicalTestResult, Instrument, JournalEntry, Sentiment};
use crate::source::SnapshotSource;

pub fn database_url() -> Result<String> {
    std::env::var("DATABASE_URL").map_err(|_| Error::MissingDatabaseUrl)
}

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn init_db(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const UPSERT_USER_SQL: &str = r#"
    INSERT INTO wellbeing.users (id, email, display_name)
    VALUES ($1, $2, $3)
    ON CONFLICT (email) DO UPDATE
    SET display_name = EXCLUDED.display_name
    RETURNING id
"#;

// The no-op update makes RETURNING yield the existing id without touching
// the display name.
const ENSURE_USER_SQL: &str = r#"
    INSERT INTO wellbeing.users (id, email, display_name)
    VALUES ($1, $2, $2)
    ON CONFLICT (email) DO UPDATE
    SET email = EXCLUDED.email
    RETURNING id
"#;

const INSERT_ENTRY_SQL: &str = r#"
    INSERT INTO wellbeing.journal_entries
    (id, user_id, written_at, body, sentiment, confidence, source_key)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (user_id, source_key) DO NOTHING
"#;

const INSERT_RESULT_SQL: &str = r#"
    INSERT INTO wellbeing.test_results
    (id, user_id, test_type, score, severity_level, completed_at, source_key)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (user_id, source_key) DO NOTHING
"#;

/// Creates the user or renames an existing one.
pub async fn upsert_user(pool: &PgPool, email: &str, display_name: &str) -> Result<Uuid> {
    let row = sqlx::query(UPSERT_USER_SQL)
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .fetch_one(pool)
        .await?;

    Ok(row.try_get("id")?)
}

/// Returns the user's id, creating the user if needed. An existing display
/// name is left alone.
pub async fn ensure_user(pool: &PgPool, email: &str) -> Result<Uuid> {
    let row = sqlx::query(ENSURE_USER_SQL)
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(row.try_get("id")?)
}

async fn user_id(pool: &PgPool, email: &str) -> Result<Option<Uuid>> {
    let row = sqlx::query("SELECT id FROM wellbeing.users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(|row| row.try_get("id")).transpose().map_err(Error::from)
}

fn at_hour(day: NaiveDate, hour: i64) -> DateTime<Utc> {
    (day.and_time(NaiveTime::MIN) + Duration::hours(hour)).and_utc()
}

/// Inserts a week of demo entries and a few screening results for `email`.
pub async fn seed(pool: &PgPool, email: &str, today: NaiveDate) -> Result<()> {
    upsert_user(pool, email, "Demo User").await?;

    let entries = [
        (6, 21, "Negative", "Couldn't focus at work and skipped dinner. Everything felt heavy."),
        (5, 20, "Negative", "Argued with my sister. Slept badly again."),
        (4, 22, "Neutral", "Ordinary day. Went for a short walk after lunch."),
        (2, 8, "Neutral", "Woke up early, made coffee, read a few pages before work."),
        (1, 19, "Positive", "Finished the project milestone and celebrated with friends."),
        (0, 9, "Positive", "Morning run by the river. Feeling rested and hopeful about the week."),
    ];

    let entries: Vec<JournalEntry> = entries
        .iter()
        .enumerate()
        .map(|(index, (days_ago, hour, sentiment, text))| JournalEntry {
            id: format!("seed-entry-{:03}", index + 1),
            timestamp: at_hour(today - Duration::days(*days_ago), *hour),
            text: (*text).to_string(),
            sentiment: Sentiment::from_label(sentiment),
            confidence: 0.85,
        })
        .collect();

    let results = [
        (Instrument::Phq9, 14, 28, "moderate"),
        (Instrument::Phq9, 9, 2, "mild"),
        (Instrument::Gad7, 6, 2, "mild"),
        (Instrument::Pss10, 18, 10, "moderate"),
    ];

    let results: Vec<ClinicalTestResult> = results
        .iter()
        .enumerate()
        .map(|(index, (instrument, score, days_ago, severity))| ClinicalTestResult {
            id: format!("seed-result-{:03}", index + 1),
            instrument: *instrument,
            score: *score,
            completed_at: at_hour(today - Duration::days(*days_ago), 12),
            severity_level: (*severity).to_string(),
        })
        .collect();

    let inserted_entries = import_entries(pool, email, &entries).await?;
    let inserted_results = import_results(pool, email, &results).await?;
    tracing::info!(
        email,
        entries = inserted_entries,
        results = inserted_results,
        "Seeded demo data"
    );

    Ok(())
}

fn source_key(id: &str) -> String {
    if id.trim().is_empty() {
        format!("import-{}", Uuid::new_v4())
    } else {
        id.to_string()
    }
}

/// Inserts entries for `email`, skipping ids this user already has. Returns
/// the number of new rows.
pub async fn import_entries(pool: &PgPool, email: &str, entries: &[JournalEntry]) -> Result<usize> {
    let user_id = ensure_user(pool, email).await?;
    let mut inserted = 0usize;

    for entry in entries {
        let key = source_key(&entry.id);
        let result = sqlx::query(INSERT_ENTRY_SQL)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(entry.timestamp)
            .bind(&entry.text)
            .bind(entry.sentiment.as_str())
            .bind(entry.confidence)
            .bind(&key)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            tracing::warn!(email, %key, "Skipping entry already stored for this user");
        }
    }

    Ok(inserted)
}

pub async fn import_results(
    pool: &PgPool,
    email: &str,
    results: &[ClinicalTestResult],
) -> Result<usize> {
    let user_id = ensure_user(pool, email).await?;
    let mut inserted = 0usize;

    for test_result in results {
        let score = i32::try_from(test_result.score).map_err(|_| Error::InvalidRecord {
            key: test_result.id.clone(),
            message: format!("score {} does not fit the score column", test_result.score),
        })?;

        let key = source_key(&test_result.id);
        let result = sqlx::query(INSERT_RESULT_SQL)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(test_result.instrument.code())
            .bind(score)
            .bind(&test_result.severity_level)
            .bind(test_result.completed_at)
            .bind(&key)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            tracing::warn!(email, %key, "Skipping result already stored for this user");
        }
    }

    Ok(inserted)
}

fn entry_from_row(row: &PgRow) -> Result<JournalEntry> {
    let sentiment: Option<String> = row.try_get("sentiment")?;
    Ok(JournalEntry {
        id: row.try_get("source_key")?,
        timestamp: row.try_get("written_at")?,
        text: row.try_get("body")?,
        sentiment: sentiment
            .as_deref()
            .map(Sentiment::from_label)
            .unwrap_or_default(),
        confidence: row.try_get("confidence")?,
    })
}

pub async fn fetch_entries(pool: &PgPool, email: &str) -> Result<Vec<JournalEntry>> {
    let Some(user_id) = user_id(pool, email).await? else {
        tracing::warn!(email, "No user with this email");
        return Ok(Vec::new());
    };

    let rows = sqlx::query(
        r#"
        SELECT source_key, written_at, body, sentiment, confidence
        FROM wellbeing.journal_entries
        WHERE user_id = $1
        ORDER BY written_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

pub async fn fetch_results(pool: &PgPool, email: &str) -> Result<Vec<ClinicalTestResult>> {
    let Some(user_id) = user_id(pool, email).await? else {
        return Ok(Vec::new());
    };

    let rows = sqlx::query(
        r#"
        SELECT source_key, test_type, score, severity_level, completed_at
        FROM wellbeing.test_results
        WHERE user_id = $1
        ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let key: String = row.try_get("source_key")?;
        let test_type: String = row.try_get("test_type")?;
        let Some(instrument) = Instrument::resolve(&test_type) else {
            tracing::warn!(%key, %test_type, "Skipping result for unknown instrument");
            continue;
        };
        let score: i32 = row.try_get("score")?;
        let score = u32::try_from(score).map_err(|_| Error::InvalidRecord {
            key: key.clone(),
            message: format!("negative score {score}"),
        })?;

        results.push(ClinicalTestResult {
            id: key,
            instrument,
            score,
            completed_at: row.try_get("completed_at")?,
            severity_level: row.try_get("severity_level")?,
        });
    }

    Ok(results)
}

/// Reads one user's snapshot from Postgres.
pub struct PgSource {
    pool: PgPool,
    email: String,
}

impl PgSource {
    pub fn new(pool: PgPool, email: impl Into<String>) -> Self {
        Self {
            pool,
            email: email.into(),
        }
    }
}

impl SnapshotSource for PgSource {
    async fn journal_entries(&self) -> Result<Vec<JournalEntry>> {
        fetch_entries(&self.pool, &self.email).await
    }

    async fn test_results(&self) -> Result<Vec<ClinicalTestResult>> {
        fetch_results(&self.pool, &self.email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_get_generated_source_keys() {
        assert_eq!(source_key("seed-entry-001"), "seed-entry-001");
        assert!(source_key("").starts_with("import-"));
        assert!(source_key("   ").starts_with("import-"));
        assert_ne!(source_key(""), source_key(""));
    }

    #[test]
    fn seed_timestamps_land_on_requested_hour() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let stamp = at_hour(day, 21);
        assert_eq!(stamp.date_naive(), day);
        assert_eq!(stamp.to_rfc3339(), "2026-03-15T21:00:00+00:00");
    }

    #[test]
    fn record_keys_are_unique_per_user_only() {
        let migration = include_str!("../migrations/20260301000000_init.sql");
        assert_eq!(migration.matches("UNIQUE (user_id, source_key)").count(), 2);
        assert!(!migration.contains("source_key TEXT NOT NULL UNIQUE"));

        for sql in [INSERT_ENTRY_SQL, INSERT_RESULT_SQL] {
            assert!(sql.contains("ON CONFLICT (user_id, source_key) DO NOTHING"));
        }
    }

    #[test]
    fn imports_keep_existing_display_name() {
        assert!(!ENSURE_USER_SQL.contains("display_name ="));
        assert!(ENSURE_USER_SQL.contains("RETURNING id"));
        assert!(UPSERT_USER_SQL.contains("SET display_name = EXCLUDED.display_name"));
    }

    #[test]
    fn missing_database_url_is_reported() {
        if std::env::var("DATABASE_URL").is_err() {
            assert!(matches!(database_url(), Err(Error::MissingDatabaseUrl)));
        }
    }
}
