//! Movie queries

use cinedb_common::db::{row_to_record, rows_to_records};
use cinedb_common::{FlatRecord, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// All movies, or only those showing in at least one theater
pub async fn list(pool: &SqlitePool, is_showing: bool) -> Result<Vec<FlatRecord>> {
    let rows = if is_showing {
        sqlx::query(
            r#"
            SELECT m.*
            FROM movies m
            JOIN movies_theaters mt ON m.movie_id = mt.movie_id
            WHERE mt.is_showing = 1
            GROUP BY m.movie_id
            ORDER BY m.movie_id
            "#,
        )
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query("SELECT * FROM movies ORDER BY movie_id")
            .fetch_all(pool)
            .await?
    };

    debug!("Listed {} movies (is_showing={})", rows.len(), is_showing);
    Ok(rows_to_records(&rows))
}

pub async fn read(pool: &SqlitePool, movie_id: i64) -> Result<Option<FlatRecord>> {
    let row = sqlx::query("SELECT * FROM movies WHERE movie_id = ?")
        .bind(movie_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(row_to_record))
}

/// Theaters that carry a movie, with the showing flag for that movie
pub async fn list_theaters(pool: &SqlitePool, movie_id: i64) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT t.*, mt.is_showing, mt.movie_id
        FROM theaters t
        JOIN movies_theaters mt ON t.theater_id = mt.theater_id
        WHERE mt.movie_id = ?
        ORDER BY t.theater_id
        "#,
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await?;

    Ok(rows_to_records(&rows))
}
