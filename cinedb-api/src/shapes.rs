//! Response shapes built from join rows
//!
//! Built once at startup; a malformed shape stops the service before it binds.

use cinedb_common::normalize::{Normalizer, ShapeError, ShapeSpec};

/// Normalizers shared by every request
#[derive(Debug, Clone)]
pub struct Shapes {
    /// Theater with embedded `movies` array
    pub theater_movies: Normalizer,
    /// Review with embedded `critic` object
    pub review_critic: Normalizer,
}

impl Shapes {
    pub fn build() -> Result<Self, ShapeError> {
        Ok(Self {
            theater_movies: theater_movies()?,
            review_critic: review_critic()?,
        })
    }
}

fn theater_movies() -> Result<Normalizer, ShapeError> {
    ShapeSpec::new("theater_id")
        .scalar("theater_id")
        .scalar("name")
        .scalar("address_line_1")
        .scalar("address_line_2")
        .scalar("city")
        .scalar("state")
        .scalar("zip")
        .scalar("created_at")
        .scalar("updated_at")
        .nested("movie_id", "movies", "movie_id")
        .nested("title", "movies", "title")
        .nested("runtime_in_minutes", "movies", "runtime_in_minutes")
        .nested("rating", "movies", "rating")
        .nested("description", "movies", "description")
        .nested("image_url", "movies", "image_url")
        .nested("is_showing", "movies", "is_showing")
        .identity("movies", ["movie_id"])
        .build()
}

fn review_critic() -> Result<Normalizer, ShapeError> {
    ShapeSpec::new("review_id")
        .scalar("review_id")
        .scalar("content")
        .scalar("score")
        .scalar("movie_id")
        .scalar("critic_id")
        .scalar("created_at")
        .scalar("updated_at")
        .object("critic_id", "critic", "critic_id")
        .object("preferred_name", "critic", "preferred_name")
        .object("surname", "critic", "surname")
        .object("organization_name", "critic", "organization_name")
        .object("critic_created_at", "critic", "created_at")
        .object("critic_updated_at", "critic", "updated_at")
        .identity("critic", ["critic_id"])
        .build()
}
