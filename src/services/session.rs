//! Client-side game session as a pure state machine
//!
//! The game UI shows a result the moment the player submits, before the
//! server confirms. Instead of mutating view state in place, the session is a
//! value: `apply` folds events into a new session, and `reconcile` replaces
//! the optimistic result with the server-confirmed score or rolls the session
//! back when the submission failed. Framework-free, so any frontend (or a
//! test) can drive it.

use crate::models::GuessScore;
use crate::services::game::score_guess;

/// Where the session is in the submit flow
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Player is still moving the slider
    Choosing,
    /// Submitted; showing a locally computed score while the server confirms.
    /// Carries the pre-submit streak so a failed submission rolls back cleanly.
    Submitting {
        optimistic: GuessScore,
        prior_streak: i32,
    },
    /// Server-confirmed result
    Played { score: GuessScore },
}

/// One player's session for one daily movie
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub guess: i32,
    pub streak: i32,
    pub phase: Phase,
}

/// Events the session folds over
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    GuessChanged(i32),
    /// Player submitted; the movie's rating is known client-side
    Submitted { actual_rating: i32 },
}

impl GameSession {
    pub fn new(streak: i32) -> Self {
        Self {
            guess: 50,
            streak,
            phase: Phase::Choosing,
        }
    }

    /// Folds one event into a new session. Events that make no sense in the
    /// current phase (moving the slider after submitting, double submits)
    /// leave the session unchanged.
    pub fn apply(self, event: SessionEvent) -> Self {
        match (self.phase.clone(), event) {
            (Phase::Choosing, SessionEvent::GuessChanged(value)) => Self {
                guess: value,
                ..self
            },
            (Phase::Choosing, SessionEvent::Submitted { actual_rating }) => {
                let optimistic = score_guess(self.guess, actual_rating, self.streak);
                Self {
                    streak: optimistic.new_streak,
                    phase: Phase::Submitting {
                        optimistic,
                        prior_streak: self.streak,
                    },
                    ..self
                }
            }
            _ => self,
        }
    }

    /// Resolves an in-flight submission: the server score replaces the
    /// optimistic one, and an error rolls back to the pre-submit state.
    pub fn reconcile(self, server_score: Option<GuessScore>) -> Self {
        let prior_streak = match &self.phase {
            Phase::Submitting { prior_streak, .. } => *prior_streak,
            _ => return self,
        };

        match server_score {
            Some(score) => Self {
                streak: score.new_streak,
                phase: Phase::Played { score },
                ..self
            },
            None => Self {
                streak: prior_streak,
                phase: Phase::Choosing,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuessOutcome;

    #[test]
    fn test_slider_moves_only_while_choosing() {
        let session = GameSession::new(2).apply(SessionEvent::GuessChanged(80));
        assert_eq!(session.guess, 80);
        assert_eq!(session.phase, Phase::Choosing);

        let submitted = session.apply(SessionEvent::Submitted { actual_rating: 77 });
        let frozen = submitted.clone().apply(SessionEvent::GuessChanged(10));
        assert_eq!(frozen, submitted);
    }

    #[test]
    fn test_submit_shows_optimistic_score() {
        let session = GameSession::new(2)
            .apply(SessionEvent::GuessChanged(75))
            .apply(SessionEvent::Submitted { actual_rating: 70 });

        let Phase::Submitting {
            ref optimistic, ..
        } = session.phase
        else {
            panic!("expected submitting phase");
        };
        assert_eq!(optimistic.outcome, GuessOutcome::Correct);
        assert_eq!(session.streak, 3);
    }

    #[test]
    fn test_double_submit_is_ignored() {
        let session = GameSession::new(0)
            .apply(SessionEvent::Submitted { actual_rating: 60 })
            .apply(SessionEvent::Submitted { actual_rating: 60 });

        assert!(matches!(session.phase, Phase::Submitting { .. }));
    }

    #[test]
    fn test_reconcile_accepts_server_truth() {
        let session = GameSession::new(2)
            .apply(SessionEvent::GuessChanged(75))
            .apply(SessionEvent::Submitted { actual_rating: 70 });

        // Server disagrees on the streak (e.g. another device played earlier).
        let server = GuessScore {
            outcome: GuessOutcome::Correct,
            new_streak: 7,
            actual_rating: 70,
            difference: 5,
        };
        let settled = session.reconcile(Some(server.clone()));

        assert_eq!(settled.streak, 7);
        assert_eq!(settled.phase, Phase::Played { score: server });
    }

    #[test]
    fn test_reconcile_error_rolls_back_to_choosing() {
        let before = GameSession::new(2).apply(SessionEvent::GuessChanged(75));
        let rolled_back = before
            .clone()
            .apply(SessionEvent::Submitted { actual_rating: 70 })
            .reconcile(None);

        assert_eq!(rolled_back, before);
    }

    #[test]
    fn test_reconcile_error_restores_streak_after_optimistic_reset() {
        // An incorrect optimistic result zeroed the streak locally; rollback
        // must bring the old value back.
        let before = GameSession::new(5).apply(SessionEvent::GuessChanged(10));
        let rolled_back = before
            .clone()
            .apply(SessionEvent::Submitted { actual_rating: 90 })
            .reconcile(None);

        assert_eq!(rolled_back, before);
    }

    #[test]
    fn test_reconcile_outside_submitting_is_a_no_op() {
        let session = GameSession::new(1);
        assert_eq!(session.clone().reconcile(None), session);
    }
}
