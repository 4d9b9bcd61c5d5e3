//! # Minimax Search
//!
//! Depth-bounded minimax with alpha-beta pruning over any [`GameRules`].
//!
//! Scores are always reported from the point of view of a fixed maximizing
//! side. Whether a node maximizes or minimizes is decided by comparing the
//! side to move with that maximizing side rather than by ply parity, because
//! a Checkers capture chain lets the same side move twice in a row.
//!
//! ## Leaf values
//! - Won board: `+WIN_SCORE` for the maximizing side, `-WIN_SCORE` otherwise
//! - Drawn board: `0`
//! - Depth exhausted: [`GameRules::evaluate`] from the maximizing side
//!
//! Among moves with equal scores the first one in generation order is kept.
//! Nothing in this module is random, so repeated searches of the same
//! position return the same move.

use log::debug;

use crate::{GameOutcome, GameRules};

/// Best move found by a search and its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<M> {
    /// Value of the position for the maximizing side
    pub score: i32,
    /// First move achieving `score`, `None` at a leaf
    pub best_move: Option<M>,
    /// Number of positions visited
    pub nodes: u64,
}

/// Game-tree searcher bound to one rules engine and one maximizing side.
pub struct Searcher<'a, G: GameRules> {
    rules: &'a G,
    maximizing: G::Side,
    nodes: u64,
}

impl<'a, G: GameRules> Searcher<'a, G> {
    pub fn new(rules: &'a G, maximizing: G::Side) -> Self {
        Self {
            rules,
            maximizing,
            nodes: 0,
        }
    }

    /// Positions visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Full-window alpha-beta search from `board` with `side_to_move` to play.
    pub fn search(
        &mut self,
        board: &G::Board,
        side_to_move: G::Side,
        depth: u32,
    ) -> SearchResult<G::Move> {
        let result = self.alpha_beta(board, side_to_move, depth, i32::MIN, i32::MAX);
        debug!(
            "{} alpha-beta depth {}: score {} after {} nodes, best {:?}",
            G::NAME,
            depth,
            result.score,
            result.nodes,
            result.best_move
        );
        result
    }

    /// Alpha-beta search within the window `(alpha, beta)`.
    ///
    /// Siblings are skipped as soon as `beta <= alpha`; this changes how many
    /// nodes are visited but never the score returned for a full window.
    pub fn alpha_beta(
        &mut self,
        board: &G::Board,
        side_to_move: G::Side,
        depth: u32,
        alpha: i32,
        beta: i32,
    ) -> SearchResult<G::Move> {
        self.nodes = 0;
        let (score, best_move) = self.node(board, side_to_move, depth, alpha, beta, true);
        SearchResult {
            score,
            best_move,
            nodes: self.nodes,
        }
    }

    /// Plain minimax without pruning, visiting every node to `depth`.
    pub fn minimax(
        &mut self,
        board: &G::Board,
        side_to_move: G::Side,
        depth: u32,
    ) -> SearchResult<G::Move> {
        self.nodes = 0;
        let (score, best_move) =
            self.node(board, side_to_move, depth, i32::MIN, i32::MAX, false);
        SearchResult {
            score,
            best_move,
            nodes: self.nodes,
        }
    }

    fn node(
        &mut self,
        board: &G::Board,
        side_to_move: G::Side,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        prune: bool,
    ) -> (i32, Option<G::Move>) {
        self.nodes += 1;

        let outcome = self.rules.outcome(board, side_to_move);
        if outcome.is_over() {
            return (terminal_score::<G>(&outcome, self.maximizing), None);
        }
        if depth == 0 {
            return (self.rules.evaluate(board, self.maximizing), None);
        }

        let moves = self.rules.legal_moves(board, side_to_move);
        if moves.is_empty() {
            return (self.rules.evaluate(board, self.maximizing), None);
        }

        let maximizing = side_to_move == self.maximizing;
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        for mv in moves {
            let next = self.rules.play_legal(board, &mv, side_to_move);
            let (score, _) = self.node(&next.board, next.next_side, depth - 1, alpha, beta, prune);

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }

            if prune && beta <= alpha {
                break;
            }
        }

        (best_score, best_move)
    }
}

/// Picks the move whose resulting board scores best for `side` one ply ahead.
///
/// Decided boards are scored like the search scores them, so an immediate win
/// always beats a material gain. Ties keep the first move.
pub fn greedy_move<G: GameRules>(rules: &G, board: &G::Board, side: G::Side) -> Option<G::Move> {
    let mut best: Option<(i32, G::Move)> = None;

    for mv in rules.legal_moves(board, side) {
        let next = rules.play_legal(board, &mv, side);
        let outcome = rules.outcome(&next.board, next.next_side);
        let score = if outcome.is_over() {
            terminal_score::<G>(&outcome, side)
        } else {
            rules.evaluate(&next.board, side)
        };

        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, mv));
        }
    }

    best.map(|(score, mv)| {
        debug!("{} greedy pick {} scoring {}", G::NAME, mv, score);
        mv
    })
}

fn terminal_score<G: GameRules>(outcome: &GameOutcome<G::Side>, perspective: G::Side) -> i32 {
    match outcome {
        GameOutcome::Win(side) if *side == perspective => G::WIN_SCORE,
        GameOutcome::Win(_) => -G::WIN_SCORE,
        GameOutcome::Draw(_) | GameOutcome::InProgress => 0,
    }
}
