//! Review queries
//!
//! Reviews are read either alone or joined with their critic. The joined form
//! renames the critic's timestamps so they do not shadow the review's own.

use cinedb_common::db::{row_to_record, rows_to_records};
use cinedb_common::time::sql_now;
use cinedb_common::{FlatRecord, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

/// Review columns followed by critic columns, one row per review
const WITH_CRITIC: &str = r#"
    SELECT r.review_id, r.content, r.score, r.movie_id, r.critic_id,
           r.created_at, r.updated_at,
           c.preferred_name, c.surname, c.organization_name,
           c.created_at AS critic_created_at, c.updated_at AS critic_updated_at
    FROM reviews r
    LEFT JOIN critics c ON r.critic_id = c.critic_id
"#;

/// Fields a client may change on a review; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewChanges {
    pub content: Option<String>,
    pub score: Option<i64>,
    pub critic_id: Option<i64>,
    pub movie_id: Option<i64>,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query("SELECT * FROM reviews ORDER BY review_id")
        .fetch_all(pool)
        .await?;

    Ok(rows_to_records(&rows))
}

pub async fn read(pool: &SqlitePool, review_id: i64) -> Result<Option<FlatRecord>> {
    let row = sqlx::query("SELECT * FROM reviews WHERE review_id = ?")
        .bind(review_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(row_to_record))
}

/// Join rows for one review and its critic
pub async fn read_with_critic(pool: &SqlitePool, review_id: i64) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query(&format!("{} WHERE r.review_id = ?", WITH_CRITIC))
        .bind(review_id)
        .fetch_all(pool)
        .await?;

    Ok(rows_to_records(&rows))
}

/// Join rows for every review of a movie and its critic
pub async fn list_for_movie(pool: &SqlitePool, movie_id: i64) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query(&format!(
        "{} WHERE r.movie_id = ? ORDER BY r.review_id",
        WITH_CRITIC
    ))
    .bind(movie_id)
    .fetch_all(pool)
    .await?;

    debug!("Found {} reviews for movie {}", rows.len(), movie_id);
    Ok(rows_to_records(&rows))
}

/// Apply changes and bump `updated_at`
///
/// Returns false when no review has `review_id`.
pub async fn update(pool: &SqlitePool, review_id: i64, changes: &ReviewChanges) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET content = COALESCE(?, content),
            score = COALESCE(?, score),
            critic_id = COALESCE(?, critic_id),
            movie_id = COALESCE(?, movie_id),
            updated_at = ?
        WHERE review_id = ?
        "#,
    )
    .bind(changes.content.as_deref())
    .bind(changes.score)
    .bind(changes.critic_id)
    .bind(changes.movie_id)
    .bind(sql_now())
    .bind(review_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a review, returning the number of rows removed
pub async fn remove(pool: &SqlitePool, review_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE review_id = ?")
        .bind(review_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
