//! # Checkers Game Implementation
//!
//! This module implements 8x8 Checkers (English draughts).
//!
//! ## Rules
//! - Red starts at the bottom (rows 5-7) and moves first, toward row 0
//! - Blue starts at the top (rows 0-2) and moves toward row 7
//! - Men step one square diagonally forward; kings step in all four diagonals
//! - A piece jumps an adjacent opposing piece onto the empty square behind it
//! - Captures are mandatory: if any jump exists, only jumps are legal
//! - A man reaching the far row is crowned king
//! - After a jump, if the moved piece can jump again the same side moves again
//! - A side with no pieces, or with no legal move on its turn, loses
//!
//! The board is a flat row-major array of 64 cells. All neighbour lookups go
//! through [`Grid`] row/column arithmetic so nothing wraps around an edge.

use std::fmt;

use grid_geometry::Grid;

use crate::{AiPolicy, Difficulty, GameOutcome, GameRules, Player, RulesError, Transition};

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

const GRID: Grid = Grid::new(BOARD_SIZE, BOARD_SIZE);

/// Side colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    /// Row delta of a forward step.
    fn forward(self) -> i32 {
        match self {
            Color::Red => -1,
            Color::Blue => 1,
        }
    }

    /// Row on which this side's men are crowned.
    pub fn crowning_row(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => BOARD_SIZE - 1,
        }
    }
}

impl Player for Color {
    fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Man,
    King,
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub const fn man(color: Color) -> Self {
        Self { color, rank: Rank::Man }
    }

    pub const fn king(color: Color) -> Self {
        Self { color, rank: Rank::King }
    }

    /// Material value used by the evaluation.
    pub fn value(self) -> i32 {
        match self.rank {
            Rank::Man => 1,
            Rank::King => 2,
        }
    }

    fn crowned(self) -> Self {
        Self::king(self.color)
    }

    /// Diagonal directions as `(row, col)` deltas, forward ones first.
    fn directions(self) -> [Option<(i32, i32)>; 4] {
        let f = self.color.forward();
        match self.rank {
            Rank::Man => [Some((f, -1)), Some((f, 1)), None, None],
            Rank::King => [Some((f, -1)), Some((f, 1)), Some((-f, -1)), Some((-f, 1))],
        }
    }

    fn symbol(self) -> char {
        match (self.color, self.rank) {
            (Color::Red, Rank::Man) => 'r',
            (Color::Red, Rank::King) => 'R',
            (Color::Blue, Rank::Man) => 'b',
            (Color::Blue, Rank::King) => 'B',
        }
    }
}

/// Represents a move in Checkers
///
/// A single step or a single jump. Multi-jump chains are played as
/// consecutive jumps by the same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckersMove {
    pub from: usize,
    pub to: usize,
    /// Index of the jumped piece, for captures
    pub captured: Option<usize>,
    /// Whether the moving man is crowned on arrival
    pub promotes: bool,
}

impl CheckersMove {
    pub fn is_jump(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for CheckersMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.is_jump() { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, separator, self.to)
    }
}

/// The 64 cells of a Checkers board in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckersBoard {
    cells: [Option<Piece>; BOARD_SIZE * BOARD_SIZE],
}

impl Default for CheckersBoard {
    fn default() -> Self {
        Self::initial()
    }
}

impl CheckersBoard {
    pub const fn empty() -> Self {
        Self {
            cells: [None; BOARD_SIZE * BOARD_SIZE],
        }
    }

    /// The standard opening layout: twelve men per side on the dark squares.
    pub fn initial() -> Self {
        let mut cells = [None; BOARD_SIZE * BOARD_SIZE];
        for (index, cell) in cells.iter_mut().enumerate() {
            let (row, col) = GRID.row_col(index);
            if (row + col) % 2 == 0 {
                continue;
            }
            *cell = match row {
                0..=2 => Some(Piece::man(Color::Blue)),
                5..=7 => Some(Piece::man(Color::Red)),
                _ => None,
            };
        }
        Self { cells }
    }

    /// Copy of this board with `index` set to `piece`.
    pub fn with_piece(mut self, index: usize, piece: Option<Piece>) -> Self {
        if index < self.cells.len() {
            self.cells[index] = piece;
        }
        self
    }

    pub fn get(&self, index: usize) -> Option<Piece> {
        self.cells.get(index).copied().flatten()
    }

    /// Pieces of `color` with their indices, in index order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (usize, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| match cell {
                Some(piece) if piece.color == color => Some((index, *piece)),
                _ => None,
            })
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces(color).count()
    }

    fn promotes(piece: Piece, to: usize) -> bool {
        piece.rank == Rank::Man && GRID.row_col(to).0 == piece.color.crowning_row()
    }

    /// Single diagonal steps of `piece` standing on `from`.
    fn steps_from(&self, from: usize, piece: Piece) -> impl Iterator<Item = CheckersMove> + '_ {
        piece.directions().into_iter().flatten().filter_map(move |(dr, dc)| {
            let to = GRID.offset(from, dr, dc)?;
            if self.cells[to].is_some() {
                return None;
            }
            Some(CheckersMove {
                from,
                to,
                captured: None,
                promotes: Self::promotes(piece, to),
            })
        })
    }

    /// Jumps of `piece` standing on `from`.
    ///
    /// The only jump detector: used by move generation and by the multi-jump
    /// continuation check alike.
    fn jumps_from(&self, from: usize, piece: Piece) -> impl Iterator<Item = CheckersMove> + '_ {
        piece.directions().into_iter().flatten().filter_map(move |(dr, dc)| {
            let over = GRID.offset(from, dr, dc)?;
            let to = GRID.offset(from, 2 * dr, 2 * dc)?;
            match (self.cells[over], self.cells[to]) {
                (Some(jumped), None) if jumped.color != piece.color => Some(CheckersMove {
                    from,
                    to,
                    captured: Some(over),
                    promotes: Self::promotes(piece, to),
                }),
                _ => None,
            }
        })
    }

    /// Whether the piece on `index` has a jump available.
    pub fn can_jump_from(&self, index: usize) -> bool {
        match self.get(index) {
            Some(piece) => self.jumps_from(index, piece).next().is_some(),
            None => false,
        }
    }
}

impl fmt::Display for CheckersBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            write!(f, "{:>2} |", row * BOARD_SIZE)?;
            for col in 0..BOARD_SIZE {
                let symbol = self.cells[row * BOARD_SIZE + col].map_or('.', Piece::symbol);
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(f, "    ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}", col)?;
        }
        writeln!(f)
    }
}

/// Checkers rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checkers;

impl GameRules for Checkers {
    type Board = CheckersBoard;
    type Move = CheckersMove;
    type Side = Color;

    const NAME: &'static str = "Checkers";
    const WIN_SCORE: i32 = 100;

    fn initial_board(&self) -> Self::Board {
        CheckersBoard::initial()
    }

    fn initial_side(&self) -> Self::Side {
        Color::Red
    }

    fn legal_moves(&self, board: &Self::Board, side: Self::Side) -> Vec<Self::Move> {
        let mut steps = Vec::new();
        let mut jumps = Vec::new();
        for (index, piece) in board.pieces(side) {
            jumps.extend(board.jumps_from(index, piece));
            if jumps.is_empty() {
                steps.extend(board.steps_from(index, piece));
            }
        }
        if jumps.is_empty() {
            steps
        } else {
            jumps
        }
    }

    fn play_legal(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Transition<Self::Board, Self::Side> {
        let mut cells = board.cells;
        if let Some(piece) = cells[mv.from].take() {
            cells[mv.to] = Some(if mv.promotes { piece.crowned() } else { piece });
        }
        if let Some(captured) = mv.captured {
            cells[captured] = None;
        }
        let next = CheckersBoard { cells };

        let next_side = if mv.is_jump() && next.can_jump_from(mv.to) {
            side
        } else {
            side.opponent()
        };
        Transition { board: next, next_side }
    }

    fn outcome(&self, board: &Self::Board, side_to_move: Self::Side) -> GameOutcome<Self::Side> {
        if board.count(Color::Red) == 0 {
            return GameOutcome::Win(Color::Blue);
        }
        if board.count(Color::Blue) == 0 {
            return GameOutcome::Win(Color::Red);
        }
        if self.legal_moves(board, side_to_move).is_empty() {
            return GameOutcome::Win(side_to_move.opponent());
        }
        GameOutcome::InProgress
    }

    fn evaluate(&self, board: &Self::Board, perspective: Self::Side) -> i32 {
        board
            .cells
            .iter()
            .flatten()
            .map(|piece| {
                if piece.color == perspective {
                    piece.value()
                } else {
                    -piece.value()
                }
            })
            .sum()
    }

    fn policy(&self, difficulty: Difficulty) -> AiPolicy {
        match difficulty {
            Difficulty::Easy => AiPolicy::random(),
            Difficulty::Medium => AiPolicy::search(3),
            Difficulty::Hard => AiPolicy::search(5),
        }
    }

    /// Accepts `from-to`, `fromxto` or `from to` with board indices, e.g. `44-35`.
    fn parse_move(
        &self,
        board: &Self::Board,
        side: Self::Side,
        input: &str,
    ) -> Result<Self::Move, RulesError> {
        let parts: Vec<&str> = input
            .split(|c: char| c == '-' || c == 'x' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() != 2 {
            return Err(RulesError::parse(input, "expected format: from-to"));
        }
        let from = parts[0]
            .parse::<usize>()
            .map_err(|e| RulesError::parse(input, e.to_string()))?;
        let to = parts[1]
            .parse::<usize>()
            .map_err(|e| RulesError::parse(input, e.to_string()))?;
        for index in [from, to] {
            if index >= BOARD_SIZE * BOARD_SIZE {
                return Err(RulesError::OutOfBounds(index));
            }
        }

        self.legal_moves(board, side)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to)
            .ok_or_else(|| RulesError::IllegalMove(format!("{}-{}", from, to)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(index: usize) -> (usize, Piece) {
        (index, Piece::man(Color::Red))
    }

    fn blue(index: usize) -> (usize, Piece) {
        (index, Piece::man(Color::Blue))
    }

    fn board_with(pieces: &[(usize, Piece)]) -> CheckersBoard {
        pieces
            .iter()
            .fold(CheckersBoard::empty(), |board, &(index, piece)| board.with_piece(index, Some(piece)))
    }

    #[test]
    fn test_initial_layout() {
        let board = CheckersBoard::initial();
        assert_eq!(board.count(Color::Red), 12);
        assert_eq!(board.count(Color::Blue), 12);
        assert_eq!(board.get(1), Some(Piece::man(Color::Blue)));
        assert_eq!(board.get(40), Some(Piece::man(Color::Red)));
        assert_eq!(board.get(0), None);
    }

    #[test]
    fn test_blue_opening_moves() {
        let rules = Checkers;
        let moves = rules.legal_moves(&CheckersBoard::initial(), Color::Blue);
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|mv| GRID.row_col(mv.to).0 == 3));
    }

    #[test]
    fn test_men_move_forward_only() {
        let rules = Checkers;
        let board = board_with(&[red(36), blue(1)]);
        let targets: Vec<usize> = rules.legal_moves(&board, Color::Red).iter().map(|mv| mv.to).collect();
        assert_eq!(targets, vec![27, 29]);
    }

    #[test]
    fn test_kings_move_both_ways() {
        let rules = Checkers;
        let board = board_with(&[(36, Piece::king(Color::Red)), blue(1)]);
        let targets: Vec<usize> = rules.legal_moves(&board, Color::Red).iter().map(|mv| mv.to).collect();
        assert_eq!(targets, vec![27, 29, 43, 45]);
    }

    #[test]
    fn test_edge_pieces_do_not_wrap() {
        let rules = Checkers;
        // Column 7 man: the left-up diagonal is the only step, nothing wraps to column 0.
        let board = board_with(&[red(47), blue(1)]);
        let moves = rules.legal_moves(&board, Color::Red);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, 38);
    }

    #[test]
    fn test_promotion() {
        let rules = Checkers;
        let board = board_with(&[red(10), blue(40)]);
        let mv = rules.parse_move(&board, Color::Red, "10-1").unwrap();
        assert!(mv.promotes);

        let next = rules.apply_move(&board, &mv, Color::Red).unwrap();
        assert_eq!(next.board.get(1), Some(Piece::king(Color::Red)));
        assert_eq!(next.next_side, Color::Blue);
    }

    #[test]
    fn test_single_jump_passes_turn() {
        let rules = Checkers;
        let board = board_with(&[red(44), blue(35), blue(1)]);
        let moves = rules.legal_moves(&board, Color::Red);
        assert_eq!(moves.len(), 1);

        let next = rules.apply_move(&board, &moves[0], Color::Red).unwrap();
        assert_eq!(next.board.get(35), None);
        assert_eq!(next.board.get(26), Some(Piece::man(Color::Red)));
        assert_eq!(next.next_side, Color::Blue);
    }

    #[test]
    fn test_crowning_jump_without_follow_up_passes_turn() {
        let rules = Checkers;
        let board = board_with(&[red(19), blue(10), blue(56)]);
        let mv = rules.parse_move(&board, Color::Red, "19x1").unwrap();
        assert!(mv.promotes);

        let next = rules.apply_move(&board, &mv, Color::Red).unwrap();
        assert_eq!(next.board.get(1), Some(Piece::king(Color::Red)));
        assert_eq!(next.board.get(10), None);
        assert_eq!(next.next_side, Color::Blue);
    }

    #[test]
    fn test_crowned_piece_may_continue_jumping() {
        let rules = Checkers;
        // 21x3 crowns the man; as a king on 3 it can take 10 by jumping back to 17.
        let board = board_with(&[red(21), blue(12), blue(10)]);
        let mv = rules.parse_move(&board, Color::Red, "21x3").unwrap();
        assert!(mv.promotes);

        let next = rules.apply_move(&board, &mv, Color::Red).unwrap();
        assert_eq!(next.next_side, Color::Red);
        let follow_up = rules.legal_moves(&next.board, Color::Red);
        assert_eq!(follow_up.len(), 1);
        assert_eq!((follow_up[0].from, follow_up[0].to), (3, 17));
    }

    #[test]
    fn test_rejects_illegal_move() {
        let rules = Checkers;
        let board = CheckersBoard::initial();
        let bogus = CheckersMove {
            from: 40,
            to: 24,
            captured: None,
            promotes: false,
        };
        assert!(matches!(
            rules.apply_move(&board, &bogus, Color::Red),
            Err(RulesError::IllegalMove(_))
        ));
        assert!(rules.parse_move(&board, Color::Red, "40-32").is_err());
        assert!(rules.parse_move(&board, Color::Red, "99-32").is_err());
        assert!(rules.parse_move(&board, Color::Red, "40").is_err());
    }

    #[test]
    fn test_evaluation() {
        let rules = Checkers;
        let board = board_with(&[red(44), (20, Piece::king(Color::Red)), blue(1)]);
        assert_eq!(rules.evaluate(&board, Color::Red), 2);
        assert_eq!(rules.evaluate(&board, Color::Blue), -2);
    }

    #[test]
    fn test_move_display() {
        let step = CheckersMove { from: 44, to: 35, captured: None, promotes: false };
        let jump = CheckersMove { from: 44, to: 26, captured: Some(35), promotes: false };
        assert_eq!(step.to_string(), "44-35");
        assert_eq!(jump.to_string(), "44x26");
    }
}
