use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::models::{LogType, OfflineLog, ReportProblemType};

#[derive(Debug, sqlx::FromRow)]
struct OfflineLogRow {
    geocode: String,
    log_type: i32,
    date: NaiveDateTime,
    log: String,
    report_problem: String,
    favorite: bool,
    rating: f64,
}

pub async fn save(pool: &SqlitePool, draft: &OfflineLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO offline_logs (geocode, log_type, date, log, report_problem, favorite, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (geocode) DO UPDATE SET
             log_type = excluded.log_type,
             date = excluded.date,
             log = excluded.log,
             report_problem = excluded.report_problem,
             favorite = excluded.favorite,
             rating = excluded.rating",
    )
    .bind(&draft.geocode)
    .bind(draft.log_type.id())
    .bind(draft.date)
    .bind(&draft.log)
    .bind(draft.report_problem.code())
    .bind(draft.favorite)
    .bind(f64::from(draft.rating))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn load(pool: &SqlitePool, geocode: &str) -> Result<Option<OfflineLog>, sqlx::Error> {
    let row = sqlx::query_as::<_, OfflineLogRow>(
        "SELECT geocode, log_type, date, log, report_problem, favorite, rating
         FROM offline_logs WHERE geocode = ?1",
    )
    .bind(geocode)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| OfflineLog {
        geocode: row.geocode,
        log_type: LogType::from_id(row.log_type),
        date: row.date,
        log: row.log,
        report_problem: row.report_problem.parse().unwrap_or(ReportProblemType::NoProblem),
        favorite: row.favorite,
        rating: row.rating as f32,
    }))
}

/// Returns whether a draft existed.
pub async fn clear(pool: &SqlitePool, geocode: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM offline_logs WHERE geocode = ?1")
        .bind(geocode)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
