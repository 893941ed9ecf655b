/// TMDB API provider
///
/// Thin client over the two TMDB endpoints the game consumes. Authenticates
/// with a bearer token supplied via configuration. Non-success responses are
/// surfaced as `ExternalApi` errors with the upstream status and body; nothing
/// is retried.
use crate::{
    error::{AppError, AppResult},
    models::tmdb::{TmdbMovie, TmdbPage, TmdbVideo, TmdbVideoList},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;

const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_url: String, api_token: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            api_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> AppResult<T> {
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("language", DEFAULT_LANGUAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn popular_movies(&self, page: u32) -> AppResult<Vec<TmdbMovie>> {
        let url = format!("{}/movie/popular?page={}", self.api_url, page);
        let listing: TmdbPage = self.get_json(url).await?;

        tracing::debug!(
            page = page,
            results = listing.results.len(),
            provider = "tmdb",
            "Popular movies fetched"
        );

        Ok(listing.results)
    }

    async fn movie_videos(&self, movie_id: i64) -> AppResult<Vec<TmdbVideo>> {
        let url = format!("{}/movie/{}/videos", self.api_url, movie_id);
        let videos: TmdbVideoList = self.get_json(url).await?;

        tracing::debug!(
            movie_id = movie_id,
            results = videos.results.len(),
            provider = "tmdb",
            "Movie videos fetched"
        );

        Ok(videos.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
