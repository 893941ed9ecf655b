use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod tmdb;

/// The single movie selected for one calendar date.
///
/// Immutable once persisted: every lookup for the same date returns the same
/// record, which doubles as the anti-repeat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyMovie {
    pub shown_date: NaiveDate,
    pub movie_id: i64,
    pub title: String,
    pub trailer_key: String,
    /// 0-100 integer scale, derived from the source's 0-10 float
    pub rating: i32,
    pub release_date: String,
    pub poster_path: Option<String>,
}

/// Classification of a guess against the movie's true rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessOutcome {
    Correct,
    Close,
    Incorrect,
}

impl GuessOutcome {
    /// Classifies an absolute guess/rating difference.
    ///
    /// Within 5 points is correct, within 15 close, anything further incorrect.
    /// Both boundaries are inclusive.
    pub fn classify(difference: i32) -> Self {
        match difference {
            0..=5 => GuessOutcome::Correct,
            6..=15 => GuessOutcome::Close,
            _ => GuessOutcome::Incorrect,
        }
    }

    /// Streak change for this outcome given the player's current streak.
    ///
    /// Incorrect resets to exactly zero rather than decrementing.
    pub fn streak_delta(&self, current_streak: i32) -> i32 {
        match self {
            GuessOutcome::Correct => 1,
            GuessOutcome::Close => 0,
            GuessOutcome::Incorrect => -current_streak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GuessOutcome::Correct => "correct",
            GuessOutcome::Close => "close",
            GuessOutcome::Incorrect => "incorrect",
        }
    }
}

impl Display for GuessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GuessOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(GuessOutcome::Correct),
            "close" => Ok(GuessOutcome::Close),
            "incorrect" => Ok(GuessOutcome::Incorrect),
            other => Err(format!("unknown guess outcome: {}", other)),
        }
    }
}

/// One user's submission for one DailyMovie, scored exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub user_id: Uuid,
    pub movie_id: i64,
    pub guess: i32,
    /// Rating copied from the DailyMovie at submission time
    pub actual_rating: i32,
    pub difference: i32,
    pub outcome: GuessOutcome,
}

/// Result of scoring a submitted guess
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessScore {
    pub outcome: GuessOutcome,
    pub new_streak: i32,
    pub actual_rating: i32,
    pub difference: i32,
}

/// A user's standing state for one daily movie
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub guess: Option<Guess>,
    pub streak: i32,
}

/// One row of the streak leaderboard
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub current_streak: i32,
}
