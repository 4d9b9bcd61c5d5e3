//! # Difficulty Policy
//!
//! Maps a named [`Difficulty`](crate::Difficulty) onto concrete AI behaviour
//! and picks the AI's move.
//!
//! A policy mixes two things:
//! - a ratio of turns on which a uniformly random legal move is played
//! - the strategy used otherwise: random, one-ply greedy, or alpha-beta search
//!
//! Each game decides its own mapping in [`GameRules::policy`].

use log::debug;
use rand::Rng;

use crate::search::{greedy_move, Searcher};
use crate::GameRules;

/// How a non-random AI turn is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Uniformly random legal move
    Random,
    /// Best immediate evaluation after one ply
    Greedy,
    /// Alpha-beta search to the given number of plies
    Search { depth: u32 },
}

/// Concrete AI behaviour for one difficulty of one game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiPolicy {
    /// Probability in `[0, 1]` of ignoring the strategy and moving at random
    pub random_ratio: f64,
    pub strategy: Strategy,
}

impl AiPolicy {
    pub const fn random() -> Self {
        Self {
            random_ratio: 1.0,
            strategy: Strategy::Random,
        }
    }

    pub const fn greedy() -> Self {
        Self {
            random_ratio: 0.0,
            strategy: Strategy::Greedy,
        }
    }

    pub const fn search(depth: u32) -> Self {
        Self {
            random_ratio: 0.0,
            strategy: Strategy::Search { depth },
        }
    }

    /// Same policy, moving at random on `ratio` of its turns.
    pub fn with_random_ratio(self, ratio: f64) -> Self {
        Self {
            random_ratio: ratio.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Replaces the search depth of a searching policy.
    ///
    /// Negative depths are clamped to zero; other strategies are unchanged.
    pub fn with_depth_override(self, depth: Option<i32>) -> Self {
        match (self.strategy, depth) {
            (Strategy::Search { .. }, Some(depth)) => Self {
                strategy: Strategy::Search {
                    depth: depth.max(0) as u32,
                },
                ..self
            },
            _ => self,
        }
    }
}

/// Picks `side`'s move on `board` according to `policy`.
///
/// Returns `None` when `side` has no legal move; callers are expected to have
/// detected the terminal position before asking. A search that comes back
/// without a move falls back to a random legal move.
pub fn select_ai_move<G, R>(
    rules: &G,
    board: &G::Board,
    side: G::Side,
    policy: &AiPolicy,
    rng: &mut R,
) -> Option<G::Move>
where
    G: GameRules,
    R: Rng + ?Sized,
{
    let moves = rules.legal_moves(board, side);
    if moves.is_empty() {
        return None;
    }

    if policy.random_ratio > 0.0 && rng.random::<f64>() < policy.random_ratio {
        return random_move(&moves, rng);
    }

    let chosen = match policy.strategy {
        Strategy::Random => None,
        Strategy::Greedy => greedy_move(rules, board, side),
        Strategy::Search { depth } => Searcher::new(rules, side).search(board, side, depth).best_move,
    };

    match chosen {
        Some(mv) => Some(mv),
        None => {
            if policy.strategy != Strategy::Random {
                debug!("{} {:?} found no move, playing at random", G::NAME, policy.strategy);
            }
            random_move(&moves, rng)
        }
    }
}

fn random_move<M: Clone, R: Rng + ?Sized>(moves: &[M], rng: &mut R) -> Option<M> {
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.random_range(0..moves.len())].clone())
}
