//! crates/guessing_game_core/src/engine.rs
//!
//! The game rules. Every function here is pure: session state comes in as a
//! parameter and the updated state goes out in the result. Loading and saving
//! sessions is the caller's job.

use serde::de::IgnoredAny;
use serde::Deserialize;
use std::fmt;

use crate::domain::{Difficulty, GameSession, NewScore, SECRET_RANGE};
use crate::ports::SecretSource;

//=========================================================================================
// Errors
//=========================================================================================

/// Rejections produced by the engine. The first three are ordinary player
/// mistakes and their `Display` text is what the player sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid difficulty")]
    InvalidDifficulty(String),
    #[error("Start game first!")]
    NoActiveGame,
    #[error("Guess must be a whole number between 1 and 100")]
    InvalidGuess(String),
    #[error("Secret number {0} is outside 1..=100")]
    SecretOutOfRange(u32),
}

//=========================================================================================
// Guess Input
//=========================================================================================

/// A guess exactly as it arrived on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GuessInput {
    Whole(i64),
    Fractional(f64),
    Text(String),
    Other(IgnoredAny),
}

impl GuessInput {
    /// Converts the raw value into a guess within the secret range.
    pub fn parse(&self) -> Result<u32, GameError> {
        let value = match self {
            GuessInput::Whole(n) => Some(*n),
            GuessInput::Fractional(f) if f.fract() == 0.0 && f.is_finite() => {
                // Saturating cast; anything huge is rejected by the range check.
                Some(*f as i64)
            }
            GuessInput::Fractional(_) => None,
            GuessInput::Text(s) => s.trim().parse::<i64>().ok(),
            GuessInput::Other(_) => None,
        };

        value
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| SECRET_RANGE.contains(n))
            .ok_or_else(|| GameError::InvalidGuess(self.to_string()))
    }
}

impl fmt::Display for GuessInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessInput::Whole(n) => write!(f, "{n}"),
            GuessInput::Fractional(x) => write!(f, "{x}"),
            GuessInput::Text(s) => write!(f, "{s:?}"),
            GuessInput::Other(_) => f.write_str("<non-numeric value>"),
        }
    }
}

//=========================================================================================
// Outcomes
//=========================================================================================

/// Which way the player should move their next guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    TooHigh,
    TooLow,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::TooHigh => f.write_str("Too High"),
            Hint::TooLow => f.write_str("Too Low"),
        }
    }
}

/// The result of a guess against an active game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess hit. The session must be destroyed and `score` persisted;
    /// `score.game_id` lets the store ignore a repeated insert for the same game.
    Win { total_attempts: u32, score: NewScore },
    /// The budget ran out. The session must be destroyed.
    Loss { secret_number: u32 },
    /// The game goes on with `session` as the new state.
    Continue {
        hint: Hint,
        attempts_left: u32,
        session: GameSession,
    },
}

impl fmt::Display for GuessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessOutcome::Win { total_attempts, .. } => {
                write!(f, "You Win in {total_attempts} attempts!")
            }
            GuessOutcome::Loss { secret_number } => {
                write!(f, "Game Over! Number was {secret_number}")
            }
            GuessOutcome::Continue { hint, .. } => write!(f, "{hint}"),
        }
    }
}

//=========================================================================================
// Operations
//=========================================================================================

/// Starts a new game at `difficulty`, drawing the secret from `secrets`.
///
/// The returned session replaces whatever the player had before.
pub fn start_game(difficulty: &str, secrets: &dyn SecretSource) -> Result<GameSession, GameError> {
    let difficulty: Difficulty = difficulty.parse()?;
    GameSession::new(difficulty, secrets.draw())
}

/// Applies one guess to the player's session.
///
/// A missing session is reported before the guess is looked at, so the
/// player is told to start a game no matter what they sent. Invalid guesses
/// leave the session untouched.
pub fn submit_guess(
    session: Option<GameSession>,
    guess: Option<&GuessInput>,
) -> Result<GuessOutcome, GameError> {
    let mut session = session.ok_or(GameError::NoActiveGame)?;
    let guess = guess
        .ok_or_else(|| GameError::InvalidGuess("<missing>".to_string()))?
        .parse()?;

    session.attempts_left = session.attempts_left.saturating_sub(1);
    session.total_attempts += 1;

    if guess == session.secret_number {
        return Ok(GuessOutcome::Win {
            total_attempts: session.total_attempts,
            score: NewScore {
                game_id: session.game_id,
                difficulty: session.difficulty,
                attempts: session.total_attempts,
            },
        });
    }

    if session.attempts_left == 0 {
        return Ok(GuessOutcome::Loss {
            secret_number: session.secret_number,
        });
    }

    let hint = if guess > session.secret_number {
        Hint::TooHigh
    } else {
        Hint::TooLow
    };
    Ok(GuessOutcome::Continue {
        hint,
        attempts_left: session.attempts_left,
        session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedSecret, RandomSecret};

    fn guess(n: i64) -> GuessInput {
        GuessInput::Whole(n)
    }

    fn from_json(raw: &str) -> GuessInput {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn start_sets_budget_per_difficulty() {
        for (name, budget) in [("easy", 10), ("medium", 5), ("hard", 3)] {
            let session = start_game(name, &FixedSecret(1)).unwrap();
            assert_eq!(session.attempts_left, budget);
            assert_eq!(session.total_attempts, 0);
            assert_eq!(session.difficulty.as_str(), name);
        }
    }

    #[test]
    fn start_rejects_unknown_difficulty() {
        let err = start_game("impossible", &FixedSecret(1)).unwrap_err();
        assert_eq!(err, GameError::InvalidDifficulty("impossible".to_string()));
        assert_eq!(err.to_string(), "Invalid difficulty");
    }

    #[test]
    fn random_secrets_stay_in_range() {
        for _ in 0..500 {
            let session = start_game("easy", &RandomSecret).unwrap();
            assert!(SECRET_RANGE.contains(&session.secret_number));
        }
    }

    #[test]
    fn guess_without_game_is_rejected_every_time() {
        for _ in 0..3 {
            let err = submit_guess(None, Some(&guess(5))).unwrap_err();
            assert_eq!(err, GameError::NoActiveGame);
            assert_eq!(err.to_string(), "Start game first!");
        }
        // The missing game wins over a broken guess.
        assert_eq!(submit_guess(None, None).unwrap_err(), GameError::NoActiveGame);
    }

    #[test]
    fn first_guess_win_records_one_attempt() {
        let session = start_game("easy", &FixedSecret(42)).unwrap();
        let game_id = session.game_id;
        let outcome = submit_guess(Some(session), Some(&guess(42))).unwrap();
        assert_eq!(
            outcome,
            GuessOutcome::Win {
                total_attempts: 1,
                score: NewScore {
                    game_id,
                    difficulty: Difficulty::Easy,
                    attempts: 1,
                },
            }
        );
        assert_eq!(outcome.to_string(), "You Win in 1 attempts!");
    }

    #[test]
    fn hard_game_is_lost_after_three_misses() {
        let mut session = Some(start_game("hard", &FixedSecret(7)).unwrap());
        let mut last = None;
        for n in [1, 2, 3] {
            let outcome = submit_guess(session.take(), Some(&guess(n))).unwrap();
            if let GuessOutcome::Continue { session: next, .. } = &outcome {
                session = Some(next.clone());
            }
            last = Some(outcome);
        }
        let last = last.unwrap();
        assert_eq!(last, GuessOutcome::Loss { secret_number: 7 });
        assert_eq!(last.to_string(), "Game Over! Number was 7");
        assert!(session.is_none());
    }

    #[test]
    fn win_on_last_attempt_beats_loss() {
        let mut session = GameSession::new(Difficulty::Hard, 9).unwrap();
        session.attempts_left = 1;
        session.total_attempts = 2;
        let outcome = submit_guess(Some(session), Some(&guess(9))).unwrap();
        assert!(matches!(outcome, GuessOutcome::Win { total_attempts: 3, .. }));
    }

    #[test]
    fn hints_point_toward_the_secret() {
        let session = GameSession::new(Difficulty::Easy, 50).unwrap();

        let high = submit_guess(Some(session.clone()), Some(&guess(80))).unwrap();
        assert_eq!(high.to_string(), "Too High");
        match high {
            GuessOutcome::Continue {
                hint,
                attempts_left,
                session,
            } => {
                assert_eq!(hint, Hint::TooHigh);
                assert_eq!(attempts_left, 9);
                assert_eq!(session.total_attempts, 1);
                assert_eq!(session.secret_number, 50);
            }
            other => panic!("expected a hint, got {other:?}"),
        }

        let low = submit_guess(Some(session), Some(&guess(20))).unwrap();
        assert_eq!(low.to_string(), "Too Low");
    }

    #[test]
    fn numeric_strings_and_integral_floats_are_accepted() {
        assert_eq!(from_json("\"42\"").parse(), Ok(42));
        assert_eq!(from_json("\" 7 \"").parse(), Ok(7));
        assert_eq!(from_json("42.0").parse(), Ok(42));
        assert_eq!(from_json("100").parse(), Ok(100));
    }

    #[test]
    fn malformed_guesses_are_rejected() {
        for raw in ["\"abc\"", "\"\"", "4.5", "0", "101", "-3", "true", "[1]", "{}"] {
            let input = from_json(raw);
            assert!(
                matches!(input.parse(), Err(GameError::InvalidGuess(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_guess_does_not_consume_an_attempt() {
        let session = GameSession::new(Difficulty::Medium, 10).unwrap();
        let err = submit_guess(Some(session.clone()), Some(&from_json("\"ten\""))).unwrap_err();
        assert!(matches!(err, GameError::InvalidGuess(_)));
        assert!(matches!(
            submit_guess(Some(session), None),
            Err(GameError::InvalidGuess(_))
        ));
    }
}
