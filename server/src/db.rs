use chrono::{DateTime, Utc};
use shared::protocol::{ResultPayload, ResultRecord, ResultSubmission};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Connect to Postgres using the provided DATABASE_URL.
pub async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    // Ensure table exists
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            usn TEXT NOT NULL,
            wpm DOUBLE PRECISION NOT NULL,
            cpm DOUBLE PRECISION NOT NULL,
            accuracy DOUBLE PRECISION NOT NULL,
            error DOUBLE PRECISION NOT NULL,
            total_time BIGINT NOT NULL,
            total_characters BIGINT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&pool)
    .await?;
    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: Uuid,
    name: String,
    usn: String,
    wpm: f64,
    cpm: f64,
    accuracy: f64,
    error: f64,
    total_time: i64,
    total_characters: i64,
    created_at: DateTime<Utc>,
}

impl From<ResultRow> for ResultRecord {
    fn from(row: ResultRow) -> Self {
        ResultRecord {
            id: row.id,
            name: row.name,
            usn: row.usn,
            results: ResultPayload {
                wpm: row.wpm,
                cpm: row.cpm,
                accuracy: row.accuracy,
                error: row.error,
                total_time: row.total_time.max(0) as u64,
                total_characters: row.total_characters.max(0) as u64,
            },
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, usn, wpm, cpm, accuracy, error, total_time, total_characters, created_at FROM results";

pub async fn insert_result(pool: &PgPool, submission: &ResultSubmission) -> sqlx::Result<ResultRecord> {
    let r = &submission.results;
    let row = sqlx::query_as::<_, ResultRow>(
        r#"
        INSERT INTO results (id, name, usn, wpm, cpm, accuracy, error, total_time, total_characters)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, name, usn, wpm, cpm, accuracy, error, total_time, total_characters, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&submission.name)
    .bind(&submission.usn)
    .bind(r.wpm)
    .bind(r.cpm)
    .bind(r.accuracy)
    .bind(r.error)
    .bind(i64::try_from(r.total_time).unwrap_or(i64::MAX))
    .bind(i64::try_from(r.total_characters).unwrap_or(i64::MAX))
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// All results, newest first.
pub async fn recent_results(pool: &PgPool) -> sqlx::Result<Vec<ResultRecord>> {
    let rows = sqlx::query_as::<_, ResultRow>(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn top_results(pool: &PgPool, limit: usize) -> sqlx::Result<Vec<ResultRecord>> {
    let rows = sqlx::query_as::<_, ResultRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY wpm DESC, accuracy DESC, created_at DESC LIMIT $1"
    ))
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
