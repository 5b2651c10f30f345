use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{CacheType, Geocache};

#[derive(Debug, sqlx::FromRow)]
struct CacheRow {
    geocode: String,
    name: String,
    cache_type: String,
    guid: Option<String>,
    owned: bool,
    found: bool,
    dnf: bool,
    disabled: bool,
    favorite: bool,
    favorite_points: i32,
    visited_date: Option<NaiveDateTime>,
    my_vote: f64,
}

impl From<CacheRow> for Geocache {
    fn from(row: CacheRow) -> Self {
        Geocache {
            geocode: row.geocode,
            name: row.name,
            cache_type: CacheType::parse(&row.cache_type),
            guid: row.guid,
            owned: row.owned,
            found: row.found,
            dnf: row.dnf,
            disabled: row.disabled,
            favorite: row.favorite,
            favorite_points: row.favorite_points,
            visited_date: row.visited_date,
            my_vote: row.my_vote as f32,
        }
    }
}

/// Insert or update the stored copy of a cache.
pub async fn save_changed_cache(pool: &SqlitePool, cache: &Geocache) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO caches (geocode, name, cache_type, guid, owned, found, dnf, disabled,
                             favorite, favorite_points, visited_date, my_vote, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT (geocode) DO UPDATE SET
             name = excluded.name,
             cache_type = excluded.cache_type,
             guid = excluded.guid,
             owned = excluded.owned,
             found = excluded.found,
             dnf = excluded.dnf,
             disabled = excluded.disabled,
             favorite = excluded.favorite,
             favorite_points = excluded.favorite_points,
             visited_date = excluded.visited_date,
             my_vote = excluded.my_vote,
             updated_at = excluded.updated_at",
    )
    .bind(&cache.geocode)
    .bind(&cache.name)
    .bind(cache.cache_type.as_str())
    .bind(&cache.guid)
    .bind(cache.owned)
    .bind(cache.found)
    .bind(cache.dnf)
    .bind(cache.disabled)
    .bind(cache.favorite)
    .bind(cache.favorite_points)
    .bind(cache.visited_date)
    .bind(f64::from(cache.my_vote))
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn load(pool: &SqlitePool, geocode: &str) -> Result<Option<Geocache>, sqlx::Error> {
    let row = sqlx::query_as::<_, CacheRow>(
        "SELECT geocode, name, cache_type, guid, owned, found, dnf, disabled, favorite,
                favorite_points, visited_date, my_vote
         FROM caches WHERE geocode = ?1",
    )
    .bind(geocode)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Geocache::from))
}

/// Stored cache, or a fresh record for a cache never seen before.
pub async fn load_or_new(pool: &SqlitePool, geocode: &str) -> Result<Geocache, sqlx::Error> {
    Ok(load(pool, geocode)
        .await?
        .unwrap_or_else(|| Geocache::new(geocode)))
}
