//! Movie metadata provider abstraction
//!
//! The daily selection logic never talks to TMDB directly; it takes a provider
//! as an explicitly constructed collaborator. Tests swap in a mock, and a
//! different catalog source can be slotted in without touching the selector.

use crate::{
    error::AppResult,
    models::tmdb::{TmdbMovie, TmdbVideo},
};

pub mod tmdb;

/// Trait for movie metadata providers
///
/// Covers the two catalog operations the game needs: a paged popular-movies
/// listing and the video list for a single movie.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch one page of the popular-movies listing
    async fn popular_movies(&self, page: u32) -> AppResult<Vec<TmdbMovie>>;

    /// Fetch the video entries (trailers, clips, teasers) for a movie
    async fn movie_videos(&self, movie_id: i64) -> AppResult<Vec<TmdbVideo>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
