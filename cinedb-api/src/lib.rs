//! cinedb-api library
//!
//! REST service over the movies, theaters, critics and reviews database.
//! Join results are shaped into nested JSON by the normalizers in [`shapes`].

use std::sync::Arc;

use axum::Router;
use cinedb_common::normalize::ShapeError;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod shapes;

use shapes::Shapes;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Response shapes, built once
    pub shapes: Arc<Shapes>,
}

impl AppState {
    /// Create application state, building every response shape
    pub fn new(db: SqlitePool) -> Result<Self, ShapeError> {
        Ok(Self {
            db,
            shapes: Arc::new(Shapes::build()?),
        })
    }
}

/// Build application router
///
/// Known paths answer unsupported methods with 405; unknown paths get 404.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let movies = Router::new()
        .route(
            "/movies",
            get(api::movies::list).fallback(api::method_not_allowed),
        )
        .route(
            "/movies/:movieId",
            get(api::movies::read).fallback(api::method_not_allowed),
        )
        .route(
            "/movies/:movieId/theaters",
            get(api::movies::theaters).fallback(api::method_not_allowed),
        )
        .route(
            "/movies/:movieId/reviews",
            get(api::movies::reviews).fallback(api::method_not_allowed),
        );

    let theaters = Router::new().route(
        "/theaters",
        get(api::theaters::list).fallback(api::method_not_allowed),
    );

    let reviews = Router::new()
        .route(
            "/reviews",
            get(api::reviews::list).fallback(api::method_not_allowed),
        )
        .route(
            "/reviews/:reviewId",
            get(api::reviews::read)
                .put(api::reviews::update)
                .delete(api::reviews::delete)
                .fallback(api::method_not_allowed),
        );

    Router::new()
        .merge(movies)
        .merge(theaters)
        .merge(reviews)
        .merge(api::health_routes())
        .route(
            "/api/buildinfo",
            get(api::get_build_info).fallback(api::method_not_allowed),
        )
        .fallback(api::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
