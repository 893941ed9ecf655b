//! Guess scoring and streak bookkeeping
//!
//! Classification is pure; the only failure modes are precondition violations
//! (out-of-range guess, already played) and backing-store errors, which
//! propagate unchanged.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    db::{DailyMovieStore, GameStore},
    error::{AppError, AppResult},
    models::{GameState, Guess, GuessOutcome, GuessScore, LeaderboardEntry},
};

pub const GUESS_MIN: i32 = 0;
pub const GUESS_MAX: i32 = 100;
const LEADERBOARD_SIZE: i64 = 10;

/// Pure scoring: classify the guess and compute the resulting streak.
///
/// Incorrect resets the streak to exactly zero; the floor guarantees the
/// result is never negative regardless of delta magnitude.
pub fn score_guess(guess_value: i32, actual_rating: i32, current_streak: i32) -> GuessScore {
    let difference = (guess_value - actual_rating).abs();
    let outcome = GuessOutcome::classify(difference);
    let new_streak = (current_streak + outcome.streak_delta(current_streak)).max(0);

    GuessScore {
        outcome,
        new_streak,
        actual_rating,
        difference,
    }
}

/// Service that scores guesses against the day's movie
pub struct GuessScorer {
    games: Arc<dyn GameStore>,
    daily: Arc<dyn DailyMovieStore>,
}

impl GuessScorer {
    pub fn new(games: Arc<dyn GameStore>, daily: Arc<dyn DailyMovieStore>) -> Self {
        Self { games, daily }
    }

    /// Scores one guess for the movie shown on `target_date`.
    ///
    /// The guess row is written before the streak update: the row is the
    /// source of truth for "already played", so a crash between the two
    /// writes can lose a streak update but can never allow a double score.
    /// A concurrent duplicate submission loses the conditional insert and is
    /// rejected the same way a sequential one is.
    pub async fn submit_guess(
        &self,
        user_id: Uuid,
        movie_id: i64,
        guess_value: i32,
        target_date: NaiveDate,
    ) -> AppResult<GuessScore> {
        if !(GUESS_MIN..=GUESS_MAX).contains(&guess_value) {
            return Err(AppError::InvalidGuess(format!(
                "guess must be between {} and {}, got {}",
                GUESS_MIN, GUESS_MAX, guess_value
            )));
        }

        let daily_movie = self
            .daily
            .find_by_date(target_date)
            .await?
            .filter(|m| m.movie_id == movie_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "movie {} is not the daily movie for {}",
                    movie_id, target_date
                ))
            })?;

        if self.games.find_guess(user_id, movie_id).await?.is_some() {
            return Err(AppError::AlreadyPlayed);
        }

        let current_streak = self
            .games
            .current_streak(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no profile for user {}", user_id)))?;

        let score = score_guess(guess_value, daily_movie.rating, current_streak);

        let guess = Guess {
            user_id,
            movie_id,
            guess: guess_value,
            actual_rating: daily_movie.rating,
            difference: score.difference,
            outcome: score.outcome,
        };

        if !self.games.insert_guess_if_absent(&guess).await? {
            return Err(AppError::AlreadyPlayed);
        }
        self.games.set_streak(user_id, score.new_streak).await?;

        tracing::info!(
            user_id = %user_id,
            movie_id = movie_id,
            outcome = %score.outcome,
            new_streak = score.new_streak,
            "Guess scored"
        );

        Ok(score)
    }

    /// The user's standing for one movie: their guess, if any, and streak.
    /// Users without a profile read as streak 0.
    pub async fn game_state(&self, user_id: Uuid, movie_id: i64) -> AppResult<GameState> {
        let guess = self.games.find_guess(user_id, movie_id).await?;
        let streak = self.games.current_streak(user_id).await?.unwrap_or(0);

        Ok(GameState { guess, streak })
    }

    /// Top players by current streak, descending
    pub async fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        self.games.top_streaks(LEADERBOARD_SIZE).await
    }
}
