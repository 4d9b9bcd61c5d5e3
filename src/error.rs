//! # Rules Errors
//!
//! Errors raised by the rules engines when asked to apply or parse a move
//! that is not legal on the given board. The engines reject such input
//! instead of producing a corrupted board.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("illegal move `{0}`")]
    IllegalMove(String),
    #[error("cell {0} is already occupied")]
    OccupiedCell(usize),
    #[error("position {0} is off the board")]
    OutOfBounds(usize),
    #[error("it is not {0}'s turn")]
    WrongSide(&'static str),
    #[error("the game is already decided")]
    GameOver,
    #[error("cannot parse move `{input}`: {reason}")]
    Parse { input: String, reason: String },
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

impl RulesError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        RulesError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
