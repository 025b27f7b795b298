//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field already ran them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Keep them idempotent** - `IF NOT EXISTS` / column checks, safe to rerun
//!
//! # Schema
//!
//! - v1: `movies`, `theaters`, `critics`
//! - v2: `movies_theaters` (which theater shows which movie)
//! - v3: `reviews` (critic reviews of movies)

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Get current schema version from database
///
/// Returns 0 for a database that has never been migrated
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: movies, theaters and critics
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Create movies, theaters, critics");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            movie_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            runtime_in_minutes INTEGER,
            rating TEXT,
            description TEXT,
            image_url TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS theaters (
            theater_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            address_line_1 TEXT,
            address_line_2 TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS critics (
            critic_id INTEGER PRIMARY KEY AUTOINCREMENT,
            preferred_name TEXT,
            surname TEXT,
            organization_name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: movies_theaters join table
///
/// One row per (movie, theater) pair; deleting either side removes the pairing.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Create movies_theaters");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies_theaters (
            movie_id INTEGER NOT NULL
                REFERENCES movies(movie_id) ON DELETE CASCADE ON UPDATE CASCADE,
            theater_id INTEGER NOT NULL
                REFERENCES theaters(theater_id) ON DELETE CASCADE ON UPDATE CASCADE,
            is_showing BOOLEAN NOT NULL DEFAULT 0,
            PRIMARY KEY (movie_id, theater_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_movies_theaters_theater ON movies_theaters(theater_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v3: reviews
///
/// Deleting a critic or a movie deletes its reviews.
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Create reviews");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            review_id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT,
            score INTEGER,
            critic_id INTEGER
                REFERENCES critics(critic_id) ON DELETE CASCADE ON UPDATE CASCADE,
            movie_id INTEGER
                REFERENCES movies(movie_id) ON DELETE CASCADE ON UPDATE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_movie ON reviews(movie_id)")
        .execute(pool)
        .await?;

    Ok(())
}
