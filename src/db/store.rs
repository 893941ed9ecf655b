//! Persistence seams for the game
//!
//! Both stores are traits so the selection and scoring logic can be exercised
//! against fakes. The Postgres implementations enforce the two uniqueness
//! invariants (one DailyMovie per date, one Guess per user+movie) with
//! `ON CONFLICT DO NOTHING` conditional inserts rather than in-process
//! locking: concurrent writers race at the database and exactly one wins.

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{DailyMovie, Guess, GuessOutcome, LeaderboardEntry},
};

/// Store for the per-date daily movie history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DailyMovieStore: Send + Sync {
    /// Point lookup by calendar date
    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<DailyMovie>>;

    /// Movie IDs of the most recently shown entries, newest first
    async fn recent_movie_ids(&self, limit: i64) -> AppResult<Vec<i64>>;

    /// Insert-if-absent keyed by date. Returns true when this call created
    /// the row, false when another writer already had.
    async fn insert_if_absent(&self, movie: &DailyMovie) -> AppResult<bool>;
}

/// Store for guesses and per-user streaks
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    /// Point lookup of a user's guess for one movie
    async fn find_guess(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<Guess>>;

    /// Insert-if-absent keyed by (user_id, movie_id). Returns true when this
    /// call created the row.
    async fn insert_guess_if_absent(&self, guess: &Guess) -> AppResult<bool>;

    /// Current streak from the user's profile, None when no profile exists
    async fn current_streak(&self, user_id: Uuid) -> AppResult<Option<i32>>;

    /// Persist a new streak value on the user's profile
    async fn set_streak(&self, user_id: Uuid, streak: i32) -> AppResult<()>;

    /// Top streaks across all profiles, descending
    async fn top_streaks(&self, limit: i64) -> AppResult<Vec<LeaderboardEntry>>;
}

#[derive(Clone)]
pub struct PgDailyMovieStore {
    pool: PgPool,
}

impl PgDailyMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DailyMovieStore for PgDailyMovieStore {
    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<DailyMovie>> {
        let movie = sqlx::query_as::<_, DailyMovie>(
            r#"
            SELECT shown_date, movie_id, movie_title AS title, trailer_key,
                   rating, release_date, poster_path
            FROM daily_movie_history
            WHERE shown_date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn recent_movie_ids(&self, limit: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT movie_id FROM daily_movie_history
            ORDER BY shown_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn insert_if_absent(&self, movie: &DailyMovie) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_movie_history
                (shown_date, movie_id, movie_title, trailer_key, rating, release_date, poster_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (shown_date) DO NOTHING
            "#,
        )
        .bind(movie.shown_date)
        .bind(movie.movie_id)
        .bind(&movie.title)
        .bind(&movie.trailer_key)
        .bind(movie.rating)
        .bind(&movie.release_date)
        .bind(&movie.poster_path)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Raw guess row; the outcome is stored as text
#[derive(sqlx::FromRow)]
struct GuessRow {
    user_id: Uuid,
    movie_id: i64,
    guess: i32,
    actual_rating: i32,
    difference: i32,
    result: String,
}

impl TryFrom<GuessRow> for Guess {
    type Error = AppError;

    fn try_from(row: GuessRow) -> Result<Self, Self::Error> {
        let outcome = GuessOutcome::from_str(&row.result).map_err(AppError::Internal)?;
        Ok(Guess {
            user_id: row.user_id,
            movie_id: row.movie_id,
            guess: row.guess,
            actual_rating: row.actual_rating,
            difference: row.difference,
            outcome,
        })
    }
}

#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GameStore for PgGameStore {
    async fn find_guess(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<Guess>> {
        let row = sqlx::query_as::<_, GuessRow>(
            r#"
            SELECT user_id, movie_id, guess, actual_rating, difference, result
            FROM daily_game_guesses
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Guess::try_from).transpose()
    }

    async fn insert_guess_if_absent(&self, guess: &Guess) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_game_guesses
                (user_id, movie_id, guess, actual_rating, difference, result)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(guess.user_id)
        .bind(guess.movie_id)
        .bind(guess.guess)
        .bind(guess.actual_rating)
        .bind(guess.difference)
        .bind(guess.outcome.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn current_streak(&self, user_id: Uuid) -> AppResult<Option<i32>> {
        let streak = sqlx::query_scalar::<_, i32>(
            "SELECT current_streak FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(streak)
    }

    async fn set_streak(&self, user_id: Uuid, streak: i32) -> AppResult<()> {
        sqlx::query("UPDATE profiles SET current_streak = $2 WHERE id = $1")
            .bind(user_id)
            .bind(streak)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn top_streaks(&self, limit: i64) -> AppResult<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT username, current_streak FROM profiles
            ORDER BY current_streak DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
