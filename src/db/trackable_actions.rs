use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{LogTypeTrackable, TrackableLog};

/// Remember the action last used for a trackable, to preselect it next time.
pub async fn set_action(pool: &SqlitePool, trackable_log: &TrackableLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO trackable_actions (trackable_code, action, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (trackable_code) DO UPDATE SET
             action = excluded.action,
             updated_at = excluded.updated_at",
    )
    .bind(&trackable_log.geocode)
    .bind(trackable_log.action.id())
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_action(
    pool: &SqlitePool,
    trackable_code: &str,
) -> Result<Option<LogTypeTrackable>, sqlx::Error> {
    let action: Option<i32> =
        sqlx::query_scalar("SELECT action FROM trackable_actions WHERE trackable_code = ?1")
            .bind(trackable_code)
            .fetch_optional(pool)
            .await?;
    Ok(action.map(LogTypeTrackable::from_id))
}
