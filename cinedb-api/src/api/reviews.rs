//! Review endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cinedb_common::{FlatRecord, NestedRecord};
use serde_json::Value;
use tracing::{debug, info};

use super::{ApiError, ApiResult, DataResponse};
use crate::db::{self, parse_id, reviews::ReviewChanges};
use crate::AppState;

fn review_not_found() -> ApiError {
    ApiError::NotFound("Review cannot be found.".to_string())
}

/// GET /reviews
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<DataResponse<Vec<FlatRecord>>>> {
    let reviews = db::reviews::list(&state.db).await?;
    Ok(Json(DataResponse::new(reviews)))
}

/// GET /reviews/:reviewId
pub async fn read(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<Json<DataResponse<FlatRecord>>> {
    let id = parse_id(&review_id).ok_or_else(review_not_found)?;
    let review = db::reviews::read(&state.db, id)
        .await?
        .ok_or_else(review_not_found)?;

    Ok(Json(DataResponse::new(review)))
}

/// PUT /reviews/:reviewId
///
/// Accepts `{ "data": { ... } }` or the bare object. Responds with the updated
/// review and its critic.
pub async fn update(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<DataResponse<NestedRecord>>> {
    let id = parse_id(&review_id).ok_or_else(review_not_found)?;
    let changes = parse_changes(&body)?;

    if !db::reviews::update(&state.db, id, &changes).await? {
        return Err(review_not_found());
    }
    info!("Updated review {}", id);

    let rows = db::reviews::read_with_critic(&state.db, id).await?;
    let review = state
        .shapes
        .review_critic
        .reduce(&rows)?
        .into_iter()
        .next()
        .ok_or_else(review_not_found)?;

    Ok(Json(DataResponse::new(review)))
}

/// DELETE /reviews/:reviewId
pub async fn delete(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&review_id).ok_or_else(review_not_found)?;

    if db::reviews::remove(&state.db, id).await? == 0 {
        return Err(review_not_found());
    }
    info!("Deleted review {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Decode a review update body
///
/// An empty body changes nothing.
fn parse_changes(body: &[u8]) -> ApiResult<ReviewChanges> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReviewChanges::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Request body is not valid JSON: {}", e)))?;

    let fields = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                map.insert("data".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        _ => {
            return Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ))
        }
    };

    debug!("Review changes: {}", fields);
    serde_json::from_value(fields)
        .map_err(|e| ApiError::BadRequest(format!("Invalid review fields: {}", e)))
}
