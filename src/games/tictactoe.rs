//! # Tic-Tac-Toe Game Implementation
//!
//! This module implements classic 3x3 Tic-Tac-Toe.
//!
//! ## Rules
//! - X moves first, players alternate placing their mark on an empty cell
//! - Completing any row, column or diagonal wins
//! - A full board without a completed line is a draw
//!
//! The game tree is small enough that the hard AI searches it to the end,
//! which makes it unbeatable.

use std::fmt;
use std::str::FromStr;

use grid_geometry::{line_owner, LINES_3X3};

use crate::{AiPolicy, Difficulty, DrawReason, GameOutcome, GameRules, Player, RulesError, Transition};

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// Search depth that reaches every terminal position.
pub const FULL_DEPTH: u32 = CELLS as u32;

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Player for Mark {
    fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

/// Represents a move in Tic-Tac-Toe
///
/// Contains the index (0-8, row-major) of the cell to mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeMove(pub usize);

impl fmt::Display for TicTacToeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The nine cells of a Tic-Tac-Toe board in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeBoard {
    cells: [Option<Mark>; CELLS],
}

impl Default for TicTacToeBoard {
    fn default() -> Self {
        Self::empty()
    }
}

impl TicTacToeBoard {
    pub const fn empty() -> Self {
        Self { cells: [None; CELLS] }
    }

    pub const fn from_cells(cells: [Option<Mark>; CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Mark>; CELLS] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    /// Indices of the empty cells in ascending order.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS).filter(|&i| self.cells[i].is_none()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// The mark that completed a line, if any.
    pub fn winner(&self) -> Option<Mark> {
        line_owner(&self.cells, &LINES_3X3)
    }

    /// The side to move when X opened and the players alternated.
    pub fn side_to_move(&self) -> Mark {
        let xs = self.cells.iter().filter(|c| **c == Some(Mark::X)).count();
        let os = self.cells.iter().filter(|c| **c == Some(Mark::O)).count();
        if xs > os {
            Mark::O
        } else {
            Mark::X
        }
    }

    fn with_mark(&self, index: usize, mark: Mark) -> Self {
        let mut cells = self.cells;
        cells[index] = Some(mark);
        Self { cells }
    }
}

impl fmt::Display for TicTacToeBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                let symbol = match self.cells[index] {
                    Some(Mark::X) => 'X',
                    Some(Mark::O) => 'O',
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f, "   {} {} {}", row * 3, row * 3 + 1, row * 3 + 2)?;
        }
        Ok(())
    }
}

impl FromStr for TicTacToeBoard {
    type Err = RulesError;

    /// Parses nine cells written as `X`, `O` and `.`/`_`/`-`, ignoring whitespace.
    ///
    /// # Examples
    /// ```
    /// use minimax::games::tictactoe::{Mark, TicTacToeBoard};
    /// let board: TicTacToeBoard = "XOX OXO ...".parse().unwrap();
    /// assert_eq!(board.get(4), Some(Mark::X));
    /// assert_eq!(board.get(8), None);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = [None; CELLS];
        let mut count = 0;
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            if count == CELLS {
                return Err(RulesError::InvalidPosition(format!("more than {} cells in `{}`", CELLS, s)));
            }
            cells[count] = match ch {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '.' | '_' | '-' => None,
                other => {
                    return Err(RulesError::InvalidPosition(format!("unexpected cell `{}`", other)))
                }
            };
            count += 1;
        }
        if count != CELLS {
            return Err(RulesError::InvalidPosition(format!("expected {} cells, found {}", CELLS, count)));
        }
        Ok(Self { cells })
    }
}

/// Tic-Tac-Toe rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl GameRules for TicTacToe {
    type Board = TicTacToeBoard;
    type Move = TicTacToeMove;
    type Side = Mark;

    const NAME: &'static str = "Tic-Tac-Toe";
    const WIN_SCORE: i32 = 10;

    fn initial_board(&self) -> Self::Board {
        TicTacToeBoard::empty()
    }

    fn initial_side(&self) -> Self::Side {
        Mark::X
    }

    fn legal_moves(&self, board: &Self::Board, _side: Self::Side) -> Vec<Self::Move> {
        board.empty_cells().into_iter().map(TicTacToeMove).collect()
    }

    fn play_legal(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Transition<Self::Board, Self::Side> {
        Transition {
            board: board.with_mark(mv.0, side),
            next_side: side.opponent(),
        }
    }

    fn apply_move(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Result<Transition<Self::Board, Self::Side>, RulesError> {
        if mv.0 >= CELLS {
            return Err(RulesError::OutOfBounds(mv.0));
        }
        if board.cells[mv.0].is_some() {
            return Err(RulesError::OccupiedCell(mv.0));
        }
        if board.winner().is_some() {
            return Err(RulesError::GameOver);
        }
        Ok(self.play_legal(board, mv, side))
    }

    fn outcome(&self, board: &Self::Board, _side_to_move: Self::Side) -> GameOutcome<Self::Side> {
        match board.winner() {
            Some(mark) => GameOutcome::Win(mark),
            None if board.is_full() => GameOutcome::Draw(DrawReason::BoardFull),
            None => GameOutcome::InProgress,
        }
    }

    fn evaluate(&self, board: &Self::Board, perspective: Self::Side) -> i32 {
        match board.winner() {
            Some(mark) if mark == perspective => Self::WIN_SCORE,
            Some(_) => -Self::WIN_SCORE,
            None => 0,
        }
    }

    fn policy(&self, difficulty: Difficulty) -> AiPolicy {
        match difficulty {
            Difficulty::Easy => AiPolicy::random(),
            Difficulty::Medium => AiPolicy::search(FULL_DEPTH).with_random_ratio(0.5),
            Difficulty::Hard => AiPolicy::search(FULL_DEPTH),
        }
    }

    fn parse_move(
        &self,
        board: &Self::Board,
        side: Self::Side,
        input: &str,
    ) -> Result<Self::Move, RulesError> {
        let index = input
            .trim()
            .parse::<usize>()
            .map_err(|e| RulesError::parse(input, e.to_string()))?;
        let mv = TicTacToeMove(index);
        self.apply_move(board, &mv, side)?;
        Ok(mv)
    }
}
