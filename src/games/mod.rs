//! # Game Implementations Module
//!
//! This module contains the rules engines of all supported games. Each game
//! implements the [`GameRules`](crate::GameRules) trait, so the search, the
//! AI policies and the controller work with any of them unchanged.
//!
//! ## Supported Games
//! - **Tic-Tac-Toe**: 3x3 board, three in a row wins; the hard AI is unbeatable
//! - **Checkers**: 8x8 draughts with forced captures, multi-jumps and kings
//! - **Chess**: standard chess through the `cozy-chess` move generator
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. A board type (an immutable value) and a move type
//! 2. A side type implementing [`Player`](crate::Player)
//! 3. [`GameRules`](crate::GameRules) with its evaluation and difficulty policies
//! 4. A [`GameKind`] variant and an arm in [`with_game_rules!`](crate::with_game_rules)

use std::fmt;

pub mod checkers;
pub mod chess;
pub mod tictactoe;

/// Identifies one of the supported games on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum GameKind {
    #[value(name = "tictactoe", alias = "ttt")]
    TicTacToe,
    Checkers,
    Chess,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::TicTacToe, GameKind::Checkers, GameKind::Chess];

    /// Display name of the game.
    pub fn name(self) -> &'static str {
        use crate::GameRules;
        match self {
            GameKind::TicTacToe => tictactoe::TicTacToe::NAME,
            GameKind::Checkers => checkers::Checkers::NAME,
            GameKind::Chess => chess::Chess::NAME,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs `$body` with `$rules` bound to the rules engine of `$kind`.
///
/// Every arm is monomorphised separately, so `$body` can call generic code
/// such as `GameController::new($rules)`; it must evaluate to the same type
/// for all games.
///
/// # Examples
/// ```
/// use minimax::games::GameKind;
/// use minimax::{with_game_rules, GameRules};
///
/// fn count_opening_moves(kind: GameKind) -> usize {
///     with_game_rules!(kind, |rules| {
///         let board = rules.initial_board();
///         rules.legal_moves(&board, rules.initial_side()).len()
///     })
/// }
///
/// assert_eq!(count_opening_moves(GameKind::TicTacToe), 9);
/// assert_eq!(count_opening_moves(GameKind::Chess), 20);
/// ```
#[macro_export]
macro_rules! with_game_rules {
    ($kind:expr, |$rules:ident| $body:expr) => {
        match $kind {
            $crate::games::GameKind::TicTacToe => {
                let $rules = $crate::games::tictactoe::TicTacToe;
                $body
            }
            $crate::games::GameKind::Checkers => {
                let $rules = $crate::games::checkers::Checkers;
                $body
            }
            $crate::games::GameKind::Chess => {
                let $rules = $crate::games::chess::Chess;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameRules;

    fn rules_name<G: GameRules>(_rules: &G) -> &'static str {
        G::NAME
    }

    #[test]
    fn test_dispatch_reaches_every_game() {
        for kind in GameKind::ALL {
            let name = with_game_rules!(kind, |rules| rules_name(&rules));
            assert_eq!(name, kind.name());
        }
        assert_eq!(GameKind::TicTacToe.to_string(), "Tic-Tac-Toe");
    }

    #[test]
    fn test_opening_move_counts() {
        let counts: Vec<usize> = GameKind::ALL
            .iter()
            .map(|&kind| {
                with_game_rules!(kind, |rules| {
                    let board = rules.initial_board();
                    rules.legal_moves(&board, rules.initial_side()).len()
                })
            })
            .collect();
        assert_eq!(counts, vec![9, 7, 20]);
    }
}
