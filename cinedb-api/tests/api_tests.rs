//! Integration tests for cinedb-api endpoints
//!
//! Each test runs the router against a freshly migrated database in a temp
//! directory, seeded with the fixture below.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cinedb_api::{build_router, AppState};
use cinedb_common::db::init_database;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Three theaters (the third carries nothing), three movies (the third is
/// carried but not showing), two critics and three reviews.
const FIXTURE: &[&str] = &[
    "INSERT INTO movies (movie_id, title, runtime_in_minutes, rating, description, image_url)
     VALUES (1, 'Spirited Away', 125, 'PG', 'A girl in a spirit world', 'https://img/1.jpg'),
            (2, 'Heat', 170, 'R', 'Cops and robbers', 'https://img/2.jpg'),
            (3, 'Alien', 117, 'R', 'In space', 'https://img/3.jpg')",
    "INSERT INTO theaters (theater_id, name, address_line_1, address_line_2, city, state, zip)
     VALUES (1, 'Regal City Center', '801 C St.', '', 'Vancouver', 'WA', '98660'),
            (2, 'Hollywood Theatre', '4122 NE Sandy Blvd.', '', 'Portland', 'OR', '97212'),
            (3, 'Empty House', '1 Main St.', '', 'Salem', 'OR', '97301')",
    "INSERT INTO movies_theaters (movie_id, theater_id, is_showing)
     VALUES (1, 1, 1), (2, 1, 1), (1, 2, 1), (3, 2, 0)",
    "INSERT INTO critics (critic_id, preferred_name, surname, organization_name)
     VALUES (1, 'Chana', 'Gazsi', 'Film Weekly'),
            (2, 'Roger', 'Ebert', 'Chicago Sun-Times')",
    "INSERT INTO reviews (review_id, content, score, critic_id, movie_id)
     VALUES (1, 'Enchanting', 5, 1, 1),
            (2, 'A classic', 4, 2, 1),
            (3, 'Tense', 4, 2, 2)",
];

/// Test helper: Migrated and seeded database plus router
///
/// The TempDir must outlive the pool, so it is returned alongside.
async fn setup_app() -> (TempDir, SqlitePool, axum::Router) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("cinedb.db"))
        .await
        .expect("Should initialize test database");

    for statement in FIXTURE {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Fixture should load");
    }

    let state = AppState::new(pool.clone()).expect("Shapes should build");
    (temp_dir, pool, build_router(state))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn ids(items: &Value, field: &str) -> Vec<i64> {
    items
        .as_array()
        .expect("Should be an array")
        .iter()
        .map(|item| item[field].as_i64().expect("Id should be a number"))
        .collect()
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cinedb-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/api/buildinfo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Movies
// =============================================================================

#[tokio::test]
async fn test_list_movies() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/movies")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(ids(&body["data"], "movie_id"), vec![1, 2, 3]);
    assert_eq!(body["data"][0]["title"], "Spirited Away");
    assert_eq!(body["data"][0]["runtime_in_minutes"], 125);
}

#[tokio::test]
async fn test_list_movies_showing_is_distinct() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies?is_showing=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Movie 1 shows in two theaters but is listed once; movie 3 is not showing
    let body = extract_json(response.into_body()).await;
    assert_eq!(ids(&body["data"], "movie_id"), vec![1, 2]);
}

#[tokio::test]
async fn test_list_movies_other_filter_values_list_all() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies?is_showing=false"))
        .await
        .unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(ids(&body["data"], "movie_id"), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_read_movie() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/movies/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["movie_id"], 2);
    assert_eq!(body["data"]["title"], "Heat");
    assert!(body["data"]["created_at"].is_string());
}

#[tokio::test]
async fn test_read_missing_movie() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/movies/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "movieId 99 does not exist in the database");
}

#[tokio::test]
async fn test_non_numeric_movie_id_is_not_found() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies/heat"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "movieId heat does not exist in the database");
}

#[tokio::test]
async fn test_movie_theaters() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies/1/theaters"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let theaters = &body["data"];
    assert_eq!(ids(theaters, "theater_id"), vec![1, 2]);
    assert_eq!(theaters[0]["name"], "Regal City Center");
    assert_eq!(theaters[0]["is_showing"], true);
    assert_eq!(theaters[0]["movie_id"], 1);
}

#[tokio::test]
async fn test_movie_theaters_for_missing_movie() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies/42/theaters"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_reviews_embed_critic() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies/1/reviews"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let reviews = &body["data"];
    assert_eq!(ids(reviews, "review_id"), vec![1, 2]);

    let first = &reviews[0];
    assert_eq!(first["content"], "Enchanting");
    assert_eq!(first["critic"]["critic_id"], 1);
    assert_eq!(first["critic"]["preferred_name"], "Chana");
    assert_eq!(first["critic"]["organization_name"], "Film Weekly");
    assert!(first["critic"]["created_at"].is_string());
    assert!(first.get("preferred_name").is_none());
    assert!(first.get("critic_created_at").is_none());

    assert_eq!(reviews[1]["critic"]["surname"], "Ebert");
}

#[tokio::test]
async fn test_movie_without_reviews_has_empty_list() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/movies/3/reviews"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Theaters
// =============================================================================

#[tokio::test]
async fn test_theaters_embed_movies_in_order() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/theaters")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let theaters = &body["data"];
    assert_eq!(ids(theaters, "theater_id"), vec![1, 2, 3]);

    let regal = &theaters[0];
    assert_eq!(regal["name"], "Regal City Center");
    assert_eq!(regal["city"], "Vancouver");
    assert_eq!(ids(&regal["movies"], "movie_id"), vec![1, 2]);
    assert_eq!(regal["movies"][1]["title"], "Heat");
    assert_eq!(regal["movies"][1]["is_showing"], true);
    // Theater columns stay at the top level only
    assert!(regal.get("title").is_none());

    let hollywood = &theaters[1];
    assert_eq!(ids(&hollywood["movies"], "movie_id"), vec![1, 3]);
    assert_eq!(hollywood["movies"][1]["is_showing"], false);
}

#[tokio::test]
async fn test_theater_without_movies_has_empty_array() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/theaters")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    let empty = &body["data"][2];
    assert_eq!(empty["name"], "Empty House");
    assert_eq!(empty["movies"], json!([]));
}

#[tokio::test]
async fn test_theaters_with_no_rows() {
    let (_dir, pool, app) = setup_app().await;
    sqlx::query("DELETE FROM theaters").execute(&pool).await.unwrap();

    let response = app.oneshot(test_request("GET", "/theaters")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_list_reviews() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/reviews")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(ids(&body["data"], "review_id"), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_read_review() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/reviews/3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["content"], "Tense");
    assert_eq!(body["data"]["critic_id"], 2);
}

#[tokio::test]
async fn test_read_missing_review() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/reviews/9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Review cannot be found.");
}

#[tokio::test]
async fn test_update_review_with_envelope() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/reviews/1",
            r#"{"data": {"content": "Still enchanting", "score": 4}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let review = &body["data"];
    assert_eq!(review["review_id"], 1);
    assert_eq!(review["content"], "Still enchanting");
    assert_eq!(review["score"], 4);
    assert_eq!(review["critic"]["critic_id"], 1);
    assert_eq!(review["critic"]["surname"], "Gazsi");
}

#[tokio::test]
async fn test_update_review_with_bare_object_keeps_other_fields() {
    let (_dir, pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/reviews/3", r#"{"score": 1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (content, score): (String, i64) =
        sqlx::query_as("SELECT content, score FROM reviews WHERE review_id = 3")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(content, "Tense");
    assert_eq!(score, 1);
}

#[tokio::test]
async fn test_update_review_can_change_critic() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/reviews/1", r#"{"data": {"critic_id": 2}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["critic_id"], 2);
    assert_eq!(body["data"]["critic"]["preferred_name"], "Roger");
}

#[tokio::test]
async fn test_update_review_bumps_updated_at() {
    let (_dir, pool, app) = setup_app().await;
    sqlx::query("UPDATE reviews SET updated_at = '2000-01-01 00:00:00' WHERE review_id = 2")
        .execute(&pool)
        .await
        .unwrap();

    let response = app
        .oneshot(json_request("PUT", "/reviews/2", r#"{"content": "Revised"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_ne!(body["data"]["updated_at"], "2000-01-01 00:00:00");
}

#[tokio::test]
async fn test_update_missing_review() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/reviews/77", r#"{"score": 3}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Review cannot be found.");
}

#[tokio::test]
async fn test_update_review_malformed_body() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/reviews/1", "{\"score\": "))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_review_unknown_critic_is_bad_request() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/reviews/1", r#"{"critic_id": 500}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_review() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/reviews/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/reviews/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(test_request("DELETE", "/reviews/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Routing errors
// =============================================================================

#[tokio::test]
async fn test_unknown_path() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/critics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Path not found: /critics");
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("POST", "/movies"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "POST not allowed for /movies");

    let response = app
        .oneshot(test_request("DELETE", "/theaters"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "DELETE not allowed for /theaters");
}

#[tokio::test]
async fn test_method_not_allowed_on_service_endpoints() {
    let (_dir, _pool, app) = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("POST", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "POST not allowed for /health");

    let response = app
        .oneshot(test_request("PUT", "/api/buildinfo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "PUT not allowed for /api/buildinfo");
}
