pub mod domain;
pub mod engine;
pub mod ports;

pub use domain::{Difficulty, GameSession, NewScore, ScoreRecord, SessionId, SECRET_RANGE};
pub use engine::{start_game, submit_guess, GameError, GuessInput, GuessOutcome, Hint};
pub use ports::{
    FixedSecret, PortError, PortResult, RandomSecret, ScoreStore, SecretSource, SessionStore,
};
