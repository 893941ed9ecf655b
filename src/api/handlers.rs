use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{DailyMovie, Guess, GuessOutcome, GuessScore, LeaderboardEntry},
};

use super::extract::AuthUser;
use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct DailyMovieQuery {
    /// Client's local calendar date; defaults to the server's UTC date
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMovieResponse {
    pub id: i64,
    pub title: String,
    pub trailer_key: String,
    pub rating: i32,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub date_for: NaiveDate,
}

impl From<DailyMovie> for DailyMovieResponse {
    fn from(movie: DailyMovie) -> Self {
        Self {
            id: movie.movie_id,
            title: movie.title,
            trailer_key: movie.trailer_key,
            rating: movie.rating,
            release_date: movie.release_date,
            poster_path: movie.poster_path,
            date_for: movie.shown_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitGuessRequest {
    pub movie_id: i64,
    pub guess: i32,
    /// Client's local calendar date; defaults to the server's UTC date
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub outcome: GuessOutcome,
    pub new_streak: i32,
    pub actual_rating: i32,
    pub difference: i32,
}

impl From<GuessScore> for GuessResponse {
    fn from(score: GuessScore) -> Self {
        Self {
            outcome: score.outcome,
            new_streak: score.new_streak,
            actual_rating: score.actual_rating,
            difference: score.difference,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GameStateQuery {
    pub movie_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub has_guessed: bool,
    pub guess: Option<i32>,
    pub outcome: Option<GuessOutcome>,
    pub actual_rating: Option<i32>,
    pub streak: i32,
}

impl GameStateResponse {
    fn new(guess: Option<Guess>, streak: i32) -> Self {
        Self {
            has_guessed: guess.is_some(),
            outcome: guess.as_ref().map(|g| g.outcome),
            actual_rating: guess.as_ref().map(|g| g.actual_rating),
            guess: guess.map(|g| g.guess),
            streak,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
    pub username: String,
    pub current_streak: i32,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            username: entry.username,
            current_streak: entry.current_streak,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Returns the daily movie for the requested (or current) date, selecting and
/// persisting one on first request
pub async fn get_daily_movie(
    State(state): State<AppState>,
    Query(query): Query<DailyMovieQuery>,
) -> AppResult<Json<DailyMovieResponse>> {
    let target_date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let movie = state.selector.get_daily_movie(target_date).await?;
    Ok(Json(movie.into()))
}

/// Scores the caller's guess for the day's movie
pub async fn submit_guess(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<SubmitGuessRequest>,
) -> AppResult<(StatusCode, Json<GuessResponse>)> {
    let target_date = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let score = state
        .scorer
        .submit_guess(user_id, request.movie_id, request.guess, target_date)
        .await?;

    Ok((StatusCode::CREATED, Json(score.into())))
}

/// Returns the caller's existing guess (if any) and current streak for a movie
pub async fn get_game_state(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<GameStateQuery>,
) -> AppResult<Json<GameStateResponse>> {
    let game_state = state.scorer.game_state(user_id, query.movie_id).await?;
    Ok(Json(GameStateResponse::new(
        game_state.guess,
        game_state.streak,
    )))
}

/// Top players by current streak
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LeaderboardEntryResponse>>> {
    let entries = state.scorer.leaderboard().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
