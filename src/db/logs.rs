use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::models::{Image, LogEntry, LogType, ReportProblemType};

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    service_log_id: Option<String>,
    log_type: i32,
    author: Option<String>,
    log: String,
    date: NaiveDateTime,
    friend: bool,
    report_problem: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    log_id: i64,
    uri: String,
    title: Option<String>,
    description: Option<String>,
    service_image_id: Option<String>,
}

/// Store logs of a cache in the given order, newest first.
///
/// With `remove_old` the cache's previously stored logs are replaced,
/// otherwise the logs are appended after them.
pub async fn save_logs(
    pool: &SqlitePool,
    geocode: &str,
    logs: &[LogEntry],
    remove_old: bool,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    if remove_old {
        sqlx::query(
            "DELETE FROM log_images WHERE log_id IN (SELECT id FROM logs WHERE geocode = ?1)",
        )
        .bind(geocode)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM logs WHERE geocode = ?1")
            .bind(geocode)
            .execute(&mut *tx)
            .await?;
    }

    let (offset,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(position) + 1, 0) FROM logs WHERE geocode = ?1")
            .bind(geocode)
            .fetch_one(&mut *tx)
            .await?;

    for (index, entry) in logs.iter().enumerate() {
        let log_id = sqlx::query(
            "INSERT INTO logs (geocode, position, service_log_id, log_type, author, log, date,
                               friend, report_problem)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(geocode)
        .bind(offset + index as i64)
        .bind(&entry.service_log_id)
        .bind(entry.log_type.id())
        .bind(&entry.author)
        .bind(&entry.log)
        .bind(entry.date)
        .bind(entry.friend)
        .bind(entry.report_problem.code())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (position, image) in entry.log_images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO log_images (log_id, position, uri, title, description, service_image_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(log_id)
            .bind(position as i64)
            .bind(&image.uri)
            .bind(&image.title)
            .bind(&image.description)
            .bind(&image.service_image_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::debug!(geocode, count = logs.len(), "Logs stored");
    Ok(())
}

pub async fn load_logs(pool: &SqlitePool, geocode: &str) -> Result<Vec<LogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LogRow>(
        "SELECT id, service_log_id, log_type, author, log, date, friend, report_problem
         FROM logs WHERE geocode = ?1 ORDER BY position ASC",
    )
    .bind(geocode)
    .fetch_all(pool)
    .await?;

    let image_rows = sqlx::query_as::<_, ImageRow>(
        "SELECT li.log_id, li.uri, li.title, li.description, li.service_image_id
         FROM log_images li JOIN logs l ON li.log_id = l.id
         WHERE l.geocode = ?1 ORDER BY li.log_id, li.position",
    )
    .bind(geocode)
    .fetch_all(pool)
    .await?;

    let mut images: HashMap<i64, Vec<Image>> = HashMap::new();
    for row in image_rows {
        images.entry(row.log_id).or_default().push(Image {
            uri: row.uri,
            title: row.title,
            description: row.description,
            service_image_id: row.service_image_id,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| LogEntry {
            log_images: images.remove(&row.id).unwrap_or_default(),
            service_log_id: row.service_log_id,
            log_type: LogType::from_id(row.log_type),
            date: row.date,
            log: row.log,
            author: row.author,
            friend: row.friend,
            report_problem: row.report_problem.parse().unwrap_or(ReportProblemType::NoProblem),
        })
        .collect())
}
