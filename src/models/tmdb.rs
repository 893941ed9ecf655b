//! Raw TMDB API response types.
//!
//! These mirror the wire format of the two endpoints this service consumes:
//! `/movie/popular` (paged catalog listing) and `/movie/{id}/videos`.

use serde::Deserialize;

/// One movie entry from the popular-movies listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    /// Source rating on TMDB's 0-10 float scale
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbMovie {
    /// Converts the source 0-10 float rating to the game's 0-100 integer scale.
    ///
    /// Clamped only against malformed upstream data; well-formed vote averages
    /// never leave [0, 100].
    pub fn rating_percent(&self) -> i32 {
        ((self.vote_average * 10.0).round() as i32).clamp(0, 100)
    }
}

/// A page of the popular-movies listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    pub page: u32,
    pub results: Vec<TmdbMovie>,
}

/// One entry from a movie's video list
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// Response wrapper for `/movie/{id}/videos`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideoList {
    pub results: Vec<TmdbVideo>,
}
