//! Movie endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use cinedb_common::{FlatRecord, NestedRecord};
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, ApiResult, DataResponse};
use crate::db::{self, parse_id};
use crate::AppState;

/// Query parameters for GET /movies
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Only `true` filters; any other value lists everything
    pub is_showing: Option<String>,
}

/// GET /movies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DataResponse<Vec<FlatRecord>>>> {
    let is_showing = params.is_showing.as_deref() == Some("true");
    let movies = db::movies::list(&state.db, is_showing).await?;

    Ok(Json(DataResponse::new(movies)))
}

/// GET /movies/:movieId
pub async fn read(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<DataResponse<FlatRecord>>> {
    let (_, movie) = ensure_movie(&state, &movie_id).await?;
    Ok(Json(DataResponse::new(movie)))
}

/// GET /movies/:movieId/theaters
pub async fn theaters(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<FlatRecord>>>> {
    let (id, _) = ensure_movie(&state, &movie_id).await?;
    let theaters = db::movies::list_theaters(&state.db, id).await?;

    Ok(Json(DataResponse::new(theaters)))
}

/// GET /movies/:movieId/reviews
///
/// Each review carries its critic as a nested `critic` object.
pub async fn reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<NestedRecord>>>> {
    let (id, _) = ensure_movie(&state, &movie_id).await?;
    let rows = db::reviews::list_for_movie(&state.db, id).await?;
    let reviews = state.shapes.review_critic.reduce(&rows)?;

    debug!("Movie {} has {} reviews", id, reviews.len());
    Ok(Json(DataResponse::new(reviews)))
}

/// Look up the movie named by a path segment
async fn ensure_movie(state: &AppState, raw_id: &str) -> ApiResult<(i64, FlatRecord)> {
    let missing = || ApiError::NotFound(format!("movieId {} does not exist in the database", raw_id));

    let id = parse_id(raw_id).ok_or_else(missing)?;
    let movie = db::movies::read(&state.db, id).await?.ok_or_else(missing)?;

    Ok((id, movie))
}
