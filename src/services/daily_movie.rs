//! Daily movie selection
//!
//! Picks one movie per calendar date from the popular-movies catalog,
//! deterministically derived from the date itself, and persists it so every
//! caller on the same day sees the identical challenge.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    db::DailyMovieStore,
    error::{AppError, AppResult},
    models::{tmdb::TmdbVideo, DailyMovie},
    services::providers::MetadataProvider,
};

/// Popular-catalog pages eligible for selection (1 through this value)
const POPULAR_PAGE_SPAN: u32 = 50;
/// How many recent picks to exclude before falling back to the full page
const ANTI_REPEAT_WINDOW: i64 = 100;
const TRAILER_SITE: &str = "YouTube";
const TRAILER_TYPE: &str = "Trailer";

/// Deterministic hash of a date's `YYYY-MM-DD` string form.
///
/// A wrapping 31-multiplier polynomial over the bytes. The exact arithmetic is
/// not load-bearing; repeated calls for the same date must agree, nothing more.
fn date_hash(date_string: &str) -> u32 {
    let mut acc: i32 = 0;
    for byte in date_string.bytes() {
        acc = (byte as i32).wrapping_add(acc.wrapping_shl(5).wrapping_sub(acc));
    }
    acc.unsigned_abs()
}

/// Service that selects and persists the movie for a calendar date
pub struct DailySelector {
    store: Arc<dyn DailyMovieStore>,
    provider: Arc<dyn MetadataProvider>,
}

impl DailySelector {
    pub fn new(store: Arc<dyn DailyMovieStore>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { store, provider }
    }

    /// Returns the movie for `target_date`, computing and persisting one on
    /// first request. Idempotent per date.
    ///
    /// Two concurrent first-requests may both compute a candidate; the
    /// conditional insert lets exactly one win, and the loser discards its
    /// value and re-reads the persisted winner.
    pub async fn get_daily_movie(&self, target_date: NaiveDate) -> AppResult<DailyMovie> {
        if let Some(existing) = self.store.find_by_date(target_date).await? {
            return Ok(existing);
        }

        let candidate = self.select_for_date(target_date).await?;

        if self.store.insert_if_absent(&candidate).await? {
            tracing::info!(
                date = %target_date,
                movie_id = candidate.movie_id,
                title = %candidate.title,
                "Daily movie selected"
            );
            return Ok(candidate);
        }

        // Lost the first-write race; the winner's row is authoritative.
        self.store.find_by_date(target_date).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "daily movie for {} vanished after conflicting insert",
                target_date
            ))
        })
    }

    async fn select_for_date(&self, target_date: NaiveDate) -> AppResult<DailyMovie> {
        let hash = date_hash(&target_date.to_string());

        let page = hash % POPULAR_PAGE_SPAN + 1;
        let movies = self.provider.popular_movies(page).await?;
        if movies.is_empty() {
            return Err(AppError::ExternalApi(format!(
                "popular movies page {} came back empty",
                page
            )));
        }

        let recent: HashSet<i64> = self
            .store
            .recent_movie_ids(ANTI_REPEAT_WINDOW)
            .await?
            .into_iter()
            .collect();

        // Prefer movies not shown recently, but never fail solely because
        // every candidate was: availability over strict novelty.
        let eligible: Vec<_> = movies
            .iter()
            .filter(|m| !recent.contains(&m.id))
            .collect();
        let pool = if eligible.is_empty() {
            movies.iter().collect()
        } else {
            eligible
        };

        let selected = pool[hash as usize % pool.len()];

        let videos = self.provider.movie_videos(selected.id).await?;
        let trailer = pick_trailer(&videos).ok_or(AppError::NoTrailer(selected.id))?;

        Ok(DailyMovie {
            shown_date: target_date,
            movie_id: selected.id,
            title: selected.title.clone(),
            trailer_key: trailer.key.clone(),
            rating: selected.rating_percent(),
            release_date: selected.release_date.clone(),
            poster_path: selected.poster_path.clone(),
        })
    }
}

/// Picks the first YouTube trailer, falling back to the first video of any
/// kind. None only when the list is empty.
fn pick_trailer(videos: &[TmdbVideo]) -> Option<&TmdbVideo> {
    videos
        .iter()
        .find(|v| v.video_type == TRAILER_TYPE && v.site == TRAILER_SITE)
        .or_else(|| videos.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDailyMovieStore;
    use crate::models::tmdb::TmdbMovie;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn movie(id: i64, vote_average: f64) -> TmdbMovie {
        TmdbMovie {
            id,
            title: format!("Movie {}", id),
            vote_average,
            release_date: "2020-01-01".to_string(),
            poster_path: Some(format!("/poster-{}.jpg", id)),
        }
    }

    fn video(key: &str, site: &str, video_type: &str) -> TmdbVideo {
        TmdbVideo {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
        }
    }

    fn persisted(date: NaiveDate) -> DailyMovie {
        DailyMovie {
            shown_date: date,
            movie_id: 42,
            title: "Persisted".to_string(),
            trailer_key: "abc".to_string(),
            rating: 73,
            release_date: "2019-06-01".to_string(),
            poster_path: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_date_hash_is_deterministic() {
        assert_eq!(date_hash("2025-03-14"), date_hash("2025-03-14"));
        assert_ne!(date_hash("2025-03-14"), date_hash("2025-03-15"));
    }

    #[test]
    fn test_page_derived_from_hash_is_in_range() {
        let mut d = date("2025-01-01");
        for _ in 0..365 {
            let page = date_hash(&d.to_string()) % POPULAR_PAGE_SPAN + 1;
            assert!((1..=POPULAR_PAGE_SPAN).contains(&page));
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_pick_trailer_prefers_youtube_trailer() {
        let videos = vec![
            video("clip1", "YouTube", "Clip"),
            video("vimeo1", "Vimeo", "Trailer"),
            video("trailer1", "YouTube", "Trailer"),
        ];
        assert_eq!(pick_trailer(&videos).unwrap().key, "trailer1");
    }

    #[test]
    fn test_pick_trailer_falls_back_to_first_video() {
        let videos = vec![
            video("clip1", "YouTube", "Clip"),
            video("clip2", "YouTube", "Featurette"),
        ];
        assert_eq!(pick_trailer(&videos).unwrap().key, "clip1");
        assert!(pick_trailer(&[]).is_none());
    }

    #[tokio::test]
    async fn test_existing_pick_is_returned_without_touching_catalog() {
        let d = date("2025-03-14");
        let mut store = MockDailyMovieStore::new();
        store
            .expect_find_by_date()
            .with(eq(d))
            .times(1)
            .returning(move |_| Ok(Some(persisted(d))));
        // No provider expectations: any catalog call fails the test.
        let provider = MockMetadataProvider::new();

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let result = selector.get_daily_movie(d).await.unwrap();
        assert_eq!(result, persisted(d));
    }

    #[tokio::test]
    async fn test_repeated_calls_return_identical_movie() {
        let d = date("2025-03-14");

        let mut store = MockDailyMovieStore::new();
        let mut seq = Sequence::new();
        store
            .expect_find_by_date()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        store
            .expect_recent_movie_ids()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));
        // The insert captures what the first call persisted so the second
        // lookup can serve it back verbatim.
        let written: Arc<std::sync::Mutex<Option<DailyMovie>>> =
            Arc::new(std::sync::Mutex::new(None));
        let written_on_insert = written.clone();
        store
            .expect_insert_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |m| {
                *written_on_insert.lock().unwrap() = Some(m.clone());
                Ok(true)
            });
        let written_on_read = written.clone();
        store
            .expect_find_by_date()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(written_on_read.lock().unwrap().clone()));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .times(1)
            .returning(|_| Ok(vec![movie(42, 7.3)]));
        provider
            .expect_movie_videos()
            .with(eq(42))
            .times(1)
            .returning(|_| Ok(vec![video("abc", "YouTube", "Trailer")]));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let first = selector.get_daily_movie(d).await.unwrap();
        let second = selector.get_daily_movie(d).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_recently_shown_movies_are_excluded() {
        let d = date("2025-03-14");
        let listing = vec![movie(1, 6.0), movie(2, 7.0), movie(3, 8.0)];

        let mut store = MockDailyMovieStore::new();
        store.expect_find_by_date().returning(|_| Ok(None));
        store
            .expect_recent_movie_ids()
            .with(eq(ANTI_REPEAT_WINDOW))
            .returning(|_| Ok(vec![1, 3]));
        store
            .expect_insert_if_absent()
            .withf(|m: &DailyMovie| m.movie_id == 2)
            .times(1)
            .returning(|_| Ok(true));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .returning(move |_| Ok(listing.clone()));
        provider
            .expect_movie_videos()
            .with(eq(2))
            .returning(|_| Ok(vec![video("t2", "YouTube", "Trailer")]));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let result = selector.get_daily_movie(d).await.unwrap();
        assert_eq!(result.movie_id, 2);
        assert_eq!(result.trailer_key, "t2");
        assert_eq!(result.rating, 70);
    }

    #[tokio::test]
    async fn test_falls_back_to_full_page_when_all_candidates_are_recent() {
        let d = date("2025-03-14");
        let listing = vec![movie(1, 6.0), movie(2, 7.0)];

        let mut store = MockDailyMovieStore::new();
        store.expect_find_by_date().returning(|_| Ok(None));
        store
            .expect_recent_movie_ids()
            .returning(|_| Ok(vec![1, 2]));
        store
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(true));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .returning(move |_| Ok(listing.clone()));
        provider
            .expect_movie_videos()
            .returning(|_| Ok(vec![video("t", "YouTube", "Trailer")]));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let result = selector.get_daily_movie(d).await.unwrap();
        assert!([1, 2].contains(&result.movie_id));
    }

    #[tokio::test]
    async fn test_insert_race_loser_returns_persisted_winner() {
        let d = date("2025-03-14");
        let winner = DailyMovie {
            movie_id: 99,
            title: "Winner".to_string(),
            ..persisted(d)
        };

        let mut store = MockDailyMovieStore::new();
        let mut seq = Sequence::new();
        store
            .expect_find_by_date()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        store
            .expect_recent_movie_ids()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));
        // Another request persisted first; our insert is a no-op.
        store
            .expect_insert_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        let winner_clone = winner.clone();
        store
            .expect_find_by_date()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(winner_clone.clone())));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .returning(|_| Ok(vec![movie(42, 7.3)]));
        provider
            .expect_movie_videos()
            .returning(|_| Ok(vec![video("abc", "YouTube", "Trailer")]));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let result = selector.get_daily_movie(d).await.unwrap();
        assert_eq!(result, winner);
    }

    #[tokio::test]
    async fn test_empty_video_list_is_no_trailer_and_nothing_is_persisted() {
        let d = date("2025-03-14");

        let mut store = MockDailyMovieStore::new();
        store.expect_find_by_date().returning(|_| Ok(None));
        store.expect_recent_movie_ids().returning(|_| Ok(vec![]));
        // No insert expectation: persisting a trailerless pick fails the test.

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .returning(|_| Ok(vec![movie(42, 7.3)]));
        provider.expect_movie_videos().returning(|_| Ok(vec![]));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let err = selector.get_daily_movie(d).await.unwrap_err();
        assert!(matches!(err, AppError::NoTrailer(42)));
    }

    #[tokio::test]
    async fn test_catalog_fetch_failure_propagates() {
        let d = date("2025-03-14");

        let mut store = MockDailyMovieStore::new();
        store.expect_find_by_date().returning(|_| Ok(None));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_popular_movies()
            .returning(|_| Err(AppError::ExternalApi("TMDB API returned status 503".into())));

        let selector = DailySelector::new(Arc::new(store), Arc::new(provider));
        let err = selector.get_daily_movie(d).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
