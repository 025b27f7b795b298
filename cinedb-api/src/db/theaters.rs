//! Theater queries
//!
//! The theaters listing fetches each theater's movies separately and
//! reassembles the results into left-join rows: one row per (theater, movie),
//! or one row with null movie columns for a theater showing nothing.

use cinedb_common::db::rows_to_records;
use cinedb_common::{Error, FlatRecord, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

/// Movie columns contributed to each theater row
pub const MOVIE_COLUMNS: [&str; 7] = [
    "movie_id",
    "title",
    "runtime_in_minutes",
    "rating",
    "description",
    "image_url",
    "is_showing",
];

/// Per-theater movie queries kept in flight at once
const FETCH_CONCURRENCY: usize = 8;

pub async fn list(pool: &SqlitePool) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query("SELECT * FROM theaters ORDER BY theater_id")
        .fetch_all(pool)
        .await?;

    Ok(rows_to_records(&rows))
}

/// Movies carried by one theater, with the showing flag
pub async fn list_movies(pool: &SqlitePool, theater_id: i64) -> Result<Vec<FlatRecord>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM movies m
        JOIN movies_theaters mt ON m.movie_id = mt.movie_id
        WHERE mt.theater_id = ?
        ORDER BY m.movie_id
        "#,
        movie_select_list()
    ))
    .bind(theater_id)
    .fetch_all(pool)
    .await?;

    Ok(rows_to_records(&rows))
}

/// Every theater joined with its movies, in theater order
///
/// Movie lists are fetched concurrently; `buffered` yields them in the order
/// the theaters were listed regardless of which query finishes first.
pub async fn list_with_movies(pool: &SqlitePool) -> Result<Vec<FlatRecord>> {
    let theaters = list(pool).await?;

    let theater_ids = theaters
        .iter()
        .map(theater_id)
        .collect::<Result<Vec<i64>>>()?;

    let movie_lists: Vec<Vec<FlatRecord>> = stream::iter(theater_ids)
        .map(|id| list_movies(pool, id))
        .buffered(FETCH_CONCURRENCY)
        .try_collect()
        .await?;

    let rows: Vec<FlatRecord> = theaters
        .iter()
        .zip(movie_lists)
        .flat_map(|(theater, movies)| join_rows(theater, movies))
        .collect();

    debug!("Assembled {} rows for {} theaters", rows.len(), theaters.len());
    Ok(rows)
}

fn theater_id(theater: &FlatRecord) -> Result<i64> {
    theater
        .get("theater_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Internal("Theater row has no numeric theater_id".to_string()))
}

/// Merge one theater with its movies into left-join rows
pub fn join_rows(theater: &FlatRecord, movies: Vec<FlatRecord>) -> Vec<FlatRecord> {
    if movies.is_empty() {
        let mut row = theater.clone();
        for column in MOVIE_COLUMNS {
            row.insert(column.to_string(), Value::Null);
        }
        return vec![row];
    }

    movies
        .into_iter()
        .map(|movie| {
            let mut row = theater.clone();
            row.extend(movie);
            row
        })
        .collect()
}

fn movie_select_list() -> String {
    MOVIE_COLUMNS
        .iter()
        .map(|column| match *column {
            "is_showing" => "mt.is_showing".to_string(),
            other => format!("m.{}", other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
