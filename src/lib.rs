//! # Classic Board Game Engines
//!
//! Rules engines and minimax opponents for Tic-Tac-Toe, Checkers and Chess.
//!
//! Every game implements [`GameRules`], a set of pure functions over immutable
//! board values: the initial layout, legal move generation, move application,
//! terminal detection and a static evaluation. The search engine, the
//! difficulty policy and the game controller are written once against that
//! trait and work with any of the games.
//!
//! ## Layout
//! - [`games`]: the three rules engines
//! - [`search`]: minimax with alpha-beta pruning and a one-ply greedy picker
//! - [`ai`]: difficulty policies and AI move selection
//! - [`game_controller`]: authoritative game state, validation and history
//! - [`session`]: delayed, cancellable AI turns on top of the controller
//! - [`arena`]: AI-vs-AI matches

use std::fmt;
use std::str::FromStr;

use rand::Rng;

pub mod ai;
pub mod arena;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod games;
pub mod search;
pub mod session;

pub use ai::{select_ai_move, AiPolicy, Strategy};
pub use error::RulesError;
pub use search::{greedy_move, SearchResult, Searcher};

/// One of the two sides of a game.
pub trait Player: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// The other side.
    fn opponent(self) -> Self;

    /// Human-readable name used in history and status lines.
    fn name(self) -> &'static str;
}

/// Why a finished game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Every cell is filled and nobody completed a line
    BoardFull,
    /// The side to move has no legal move and is not in check
    Stalemate,
    /// The same position occurred three times
    ThreefoldRepetition,
    /// Neither side has enough material to deliver mate
    InsufficientMaterial,
    /// A hundred half-moves passed without a capture or pawn move
    FiftyMoveRule,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::BoardFull => "board full",
            DrawReason::Stalemate => "stalemate",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoveRule => "fifty-move rule",
        };
        f.write_str(text)
    }
}

/// Result of inspecting a board for a decided game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome<S> {
    /// Nobody has won yet and moves remain
    InProgress,
    /// The given side won
    Win(S),
    /// The game ended without a winner
    Draw(DrawReason),
}

impl<S: Copy> GameOutcome<S> {
    /// Check if the game is over
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// Winner, if the game ended with one
    pub fn winner(&self) -> Option<S> {
        match self {
            GameOutcome::Win(side) => Some(*side),
            _ => None,
        }
    }
}

/// A new board together with the side that moves on it.
///
/// The next side is usually the opponent, except after a Checkers jump that
/// can be continued, where the same side keeps the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<B, S> {
    pub board: B,
    pub next_side: S,
}

/// Named AI strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty `{}`", other)),
        }
    }
}

/// The rules of a two-player board game.
///
/// All methods are pure functions of their arguments: boards are values and
/// every transition produces a new one, so the search can explore sibling
/// branches without any risk of aliasing.
pub trait GameRules: Clone + fmt::Debug + Send + Sync + 'static {
    /// Immutable snapshot of piece placement.
    type Board: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// A single move, including whatever metadata the applicator needs.
    type Move: Clone + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// The two sides.
    type Side: Player;

    /// Display name of the game.
    const NAME: &'static str;
    /// Score magnitude of a decided game in the search.
    const WIN_SCORE: i32;

    /// The fixed starting layout.
    fn initial_board(&self) -> Self::Board;

    /// The side that moves first.
    fn initial_side(&self) -> Self::Side;

    /// All legal moves for `side`, recomputed from `board` on every call.
    fn legal_moves(&self, board: &Self::Board, side: Self::Side) -> Vec<Self::Move>;

    /// Applies a move taken from [`GameRules::legal_moves`].
    ///
    /// The move is not validated; use [`GameRules::apply_move`] for input that
    /// did not come from the move generator.
    fn play_legal(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Transition<Self::Board, Self::Side>;

    /// Validates `mv` against the legal move set and applies it.
    fn apply_move(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Result<Transition<Self::Board, Self::Side>, RulesError> {
        if !self.legal_moves(board, side).contains(mv) {
            return Err(RulesError::IllegalMove(mv.to_string()));
        }
        Ok(self.play_legal(board, mv, side))
    }

    /// Inspects `board` with `side_to_move` about to play.
    fn outcome(&self, board: &Self::Board, side_to_move: Self::Side) -> GameOutcome<Self::Side>;

    /// Static heuristic of a non-terminal board, positive when `perspective` is ahead.
    fn evaluate(&self, board: &Self::Board, perspective: Self::Side) -> i32;

    /// How the AI plays at the given difficulty.
    fn policy(&self, difficulty: Difficulty) -> AiPolicy;

    /// Parses user input into one of `side`'s legal moves.
    fn parse_move(
        &self,
        board: &Self::Board,
        side: Self::Side,
        input: &str,
    ) -> Result<Self::Move, RulesError>;

    /// Picks the AI's move for `side` at `difficulty`.
    ///
    /// Returns `None` only when `side` has no legal move.
    fn ai_move<R: Rng + ?Sized>(
        &self,
        board: &Self::Board,
        side: Self::Side,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<Self::Move> {
        select_ai_move(self, board, side, &self.policy(difficulty), rng)
    }
}

/// A board together with the side to move.
///
/// Only ever produced by [`GameState::initial`] or by applying a move, so the
/// side to move always follows from the sequence of transitions.
pub struct GameState<G: GameRules> {
    board: G::Board,
    side_to_move: G::Side,
}

impl<G: GameRules> Clone for GameState<G> {
    fn clone(&self) -> Self {
        Self {
            board: self.board.clone(),
            side_to_move: self.side_to_move,
        }
    }
}

impl<G: GameRules> fmt::Debug for GameState<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("board", &self.board)
            .field("side_to_move", &self.side_to_move)
            .finish()
    }
}

impl<G: GameRules> GameState<G> {
    /// The starting position of a new game.
    pub fn initial(rules: &G) -> Self {
        Self {
            board: rules.initial_board(),
            side_to_move: rules.initial_side(),
        }
    }

    /// A position set up from an arbitrary board, for analysis and tests.
    pub fn from_board(board: G::Board, side_to_move: G::Side) -> Self {
        Self { board, side_to_move }
    }

    pub fn board(&self) -> &G::Board {
        &self.board
    }

    pub fn side_to_move(&self) -> G::Side {
        self.side_to_move
    }

    pub fn legal_moves(&self, rules: &G) -> Vec<G::Move> {
        rules.legal_moves(&self.board, self.side_to_move)
    }

    pub fn outcome(&self, rules: &G) -> GameOutcome<G::Side> {
        rules.outcome(&self.board, self.side_to_move)
    }

    /// Validates and applies a move, returning the successor state.
    pub fn apply(&self, rules: &G, mv: &G::Move) -> Result<Self, RulesError> {
        let transition = rules.apply_move(&self.board, mv, self.side_to_move)?;
        Ok(Self::from(transition))
    }

    /// Applies a move produced by the move generator or the AI.
    pub fn apply_legal(&self, rules: &G, mv: &G::Move) -> Self {
        Self::from(rules.play_legal(&self.board, mv, self.side_to_move))
    }
}

impl<G: GameRules> From<Transition<G::Board, G::Side>> for GameState<G> {
    fn from(transition: Transition<G::Board, G::Side>) -> Self {
        Self {
            board: transition.board,
            side_to_move: transition.next_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Mark, TicTacToe, TicTacToeMove};

    #[test]
    fn outcome_helpers() {
        assert!(!GameOutcome::<Mark>::InProgress.is_over());
        assert!(GameOutcome::Win(Mark::X).is_over());
        assert_eq!(GameOutcome::Win(Mark::O).winner(), Some(Mark::O));
        assert_eq!(GameOutcome::<Mark>::Draw(DrawReason::BoardFull).winner(), None);
    }

    #[test]
    fn difficulty_parsing() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn state_transitions_leave_the_previous_state_untouched() {
        let rules = TicTacToe;
        let start = GameState::initial(&rules);
        let next = start.apply(&rules, &TicTacToeMove(4)).unwrap();

        assert_eq!(start.legal_moves(&rules).len(), 9);
        assert_eq!(next.legal_moves(&rules).len(), 8);
        assert_eq!(start.side_to_move(), Mark::X);
        assert_eq!(next.side_to_move(), Mark::O);
    }

    #[test]
    fn state_rejects_illegal_moves() {
        let rules = TicTacToe;
        let state = GameState::initial(&rules)
            .apply(&rules, &TicTacToeMove(0))
            .unwrap();
        assert!(state.apply(&rules, &TicTacToeMove(0)).is_err());
    }
}
