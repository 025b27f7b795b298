//! Theater endpoints

use axum::{extract::State, Json};
use cinedb_common::NestedRecord;

use super::{ApiResult, DataResponse};
use crate::db;
use crate::AppState;

/// GET /theaters
///
/// Every theater with the movies it carries embedded as `movies`. A theater
/// with no movies has an empty array.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<DataResponse<Vec<NestedRecord>>>> {
    let rows = db::theaters::list_with_movies(&state.db).await?;
    let theaters = state.shapes.theater_movies.reduce(&rows)?;

    Ok(Json(DataResponse::new(theaters)))
}
