//! # Chess Game Implementation
//!
//! Standard chess on top of the `cozy-chess` move generator.
//!
//! `cozy-chess` supplies legal move generation (castling, en passant,
//! promotion, check evasion) and Zobrist hashes. This module adds what the
//! generator does not track by itself:
//! - a position history for threefold repetition
//! - draw detection by insufficient material
//! - a material evaluation and the AI difficulty mapping
//! - parsing of coordinate input such as `e2e4`, `e1g1` or `e7e8q`
//!
//! Castling is shown with the king's destination square (`e1g1`) while the
//! generator encodes it as the king capturing its own rook (`e1h1`); both
//! spellings are accepted as input.

use std::fmt;

use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};

use crate::{AiPolicy, Difficulty, DrawReason, GameOutcome, GameRules, Player, RulesError, Transition};

impl Player for Color {
    fn opponent(self) -> Self {
        !self
    }

    fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

/// Material value of a piece type.
pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 10,
        Piece::Knight => 30,
        Piece::Bishop => 30,
        Piece::Rook => 50,
        Piece::Queen => 90,
        Piece::King => 900,
    }
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

fn promotion_piece(ch: char) -> Option<Piece> {
    match ch.to_ascii_lowercase() {
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        _ => None,
    }
}

/// A legal chess move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    /// The move as the generator encodes it
    pub mv: Move,
    /// Whether this is castling, encoded as the king taking its own rook
    pub castles: bool,
}

impl ChessMove {
    pub fn from(&self) -> Square {
        self.mv.from
    }

    /// Destination as shown to the user: the king's square for castling.
    pub fn to(&self) -> Square {
        if self.castles {
            let file = if self.mv.to.file() > self.mv.from.file() {
                File::G
            } else {
                File::C
            };
            Square::new(file, self.mv.from.rank())
        } else {
            self.mv.to
        }
    }

    pub fn promotion(&self) -> Option<Piece> {
        self.mv.promotion
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(piece) = self.promotion() {
            write!(f, "{}", piece_char(piece))?;
        }
        Ok(())
    }
}

/// A chess position plus the hashes needed to detect repetition.
///
/// `history` holds the Zobrist hash of every position since the last capture
/// or pawn move, the current one included.
#[derive(Debug, Clone)]
pub struct ChessBoard {
    position: Board,
    history: Vec<u64>,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::from_position(Board::default())
    }
}

impl ChessBoard {
    fn from_position(position: Board) -> Self {
        let history = vec![position.hash()];
        Self { position, history }
    }

    /// Sets up a position from Forsyth-Edwards Notation.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let position = Board::from_fen(fen.trim(), false)
            .map_err(|e| RulesError::InvalidPosition(format!("{:?} in `{}`", e, fen)))?;
        Ok(Self::from_position(position))
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Current position in Forsyth-Edwards Notation.
    pub fn fen(&self) -> String {
        self.position.to_string()
    }

    pub fn in_check(&self) -> bool {
        !self.position.checkers().is_empty()
    }

    /// Colour and type of the piece on `square`.
    pub fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        let piece = self.position.piece_on(square)?;
        let color = self.position.color_on(square)?;
        Some((color, piece))
    }

    fn has_legal_move(&self) -> bool {
        let mut found = false;
        self.position.generate_moves(|_| {
            found = true;
            true
        });
        found
    }

    fn repetitions(&self) -> usize {
        let current = self.position.hash();
        self.history.iter().filter(|&&hash| hash == current).count()
    }

    /// Neither side can possibly mate: bare kings, or a single minor piece.
    pub fn insufficient_material(&self) -> bool {
        let board = &self.position;
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let minors = board.pieces(Piece::Knight) | board.pieces(Piece::Bishop);
        minors.len() <= 1
    }

    fn material(&self, color: Color) -> i32 {
        Piece::ALL
            .iter()
            .map(|&piece| self.position.colored_pieces(color, piece).len() as i32 * piece_value(piece))
            .sum()
    }

    fn play(&self, mv: &ChessMove) -> Self {
        let mut position = self.position.clone();
        position.play_unchecked(mv.mv);
        let mut history = if position.halfmove_clock() == 0 {
            Vec::new()
        } else {
            self.history.clone()
        };
        history.push(position.hash());
        Self { position, history }
    }

    fn generate(&self) -> Vec<ChessMove> {
        let board = &self.position;
        let us = board.side_to_move();
        let mut moves = Vec::new();
        board.generate_moves(|piece_moves| {
            let king = piece_moves.piece == Piece::King;
            for mv in piece_moves {
                let castles = king && board.color_on(mv.to) == Some(us);
                moves.push(ChessMove { mv, castles });
            }
            false
        });
        moves
    }
}

impl fmt::Display for ChessBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &rank in Rank::ALL.iter().rev() {
            write!(f, "{} |", rank as usize + 1)?;
            for &file in File::ALL.iter() {
                let symbol = match self.piece_at(Square::new(file, rank)) {
                    Some((Color::White, piece)) => piece_char(piece).to_ascii_uppercase(),
                    Some((Color::Black, piece)) => piece_char(piece),
                    None => '.',
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")
    }
}

/// Chess rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chess;

impl Chess {
    /// Finds the legal move from `from` to `to`.
    ///
    /// `to` may be the king's destination or the rook's square for castling.
    /// A pawn reaching the last rank promotes to `promotion`, or to a queen
    /// when none is given. A promotion piece on any other move is illegal.
    pub fn resolve_move(
        &self,
        board: &ChessBoard,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<ChessMove, RulesError> {
        let wanted = promotion.unwrap_or(Piece::Queen);
        board
            .generate()
            .into_iter()
            .find(|mv| {
                mv.from() == from
                    && (mv.to() == to || mv.mv.to == to)
                    && match (mv.promotion(), promotion) {
                        (Some(piece), _) => piece == wanted,
                        (None, requested) => requested.is_none(),
                    }
            })
            .ok_or_else(|| {
                let suffix = promotion.map(piece_char).map(String::from).unwrap_or_default();
                RulesError::IllegalMove(format!("{}{}{}", from, to, suffix))
            })
    }
}

impl GameRules for Chess {
    type Board = ChessBoard;
    type Move = ChessMove;
    type Side = Color;

    const NAME: &'static str = "Chess";
    const WIN_SCORE: i32 = 100_000;

    fn initial_board(&self) -> Self::Board {
        ChessBoard::default()
    }

    fn initial_side(&self) -> Self::Side {
        Color::White
    }

    fn legal_moves(&self, board: &Self::Board, side: Self::Side) -> Vec<Self::Move> {
        if side != board.side_to_move() {
            return Vec::new();
        }
        board.generate()
    }

    fn play_legal(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        _side: Self::Side,
    ) -> Transition<Self::Board, Self::Side> {
        let next = board.play(mv);
        let next_side = next.side_to_move();
        Transition { board: next, next_side }
    }

    fn apply_move(
        &self,
        board: &Self::Board,
        mv: &Self::Move,
        side: Self::Side,
    ) -> Result<Transition<Self::Board, Self::Side>, RulesError> {
        if side != board.side_to_move() {
            return Err(RulesError::WrongSide(side.name()));
        }
        if !board.generate().contains(mv) {
            return Err(RulesError::IllegalMove(mv.to_string()));
        }
        Ok(self.play_legal(board, mv, side))
    }

    fn outcome(&self, board: &Self::Board, _side_to_move: Self::Side) -> GameOutcome<Self::Side> {
        let to_move = board.side_to_move();
        if !board.has_legal_move() {
            return if board.in_check() {
                GameOutcome::Win(!to_move)
            } else {
                GameOutcome::Draw(DrawReason::Stalemate)
            };
        }
        if board.position.halfmove_clock() >= 100 {
            return GameOutcome::Draw(DrawReason::FiftyMoveRule);
        }
        if board.repetitions() >= 3 {
            return GameOutcome::Draw(DrawReason::ThreefoldRepetition);
        }
        if board.insufficient_material() {
            return GameOutcome::Draw(DrawReason::InsufficientMaterial);
        }
        GameOutcome::InProgress
    }

    fn evaluate(&self, board: &Self::Board, perspective: Self::Side) -> i32 {
        board.material(perspective) - board.material(!perspective)
    }

    fn policy(&self, difficulty: Difficulty) -> AiPolicy {
        match difficulty {
            Difficulty::Easy => AiPolicy::random(),
            Difficulty::Medium => AiPolicy::greedy(),
            Difficulty::Hard => AiPolicy::search(3),
        }
    }

    /// Accepts coordinate notation: `e2e4`, `e1g1`, `e7e8q`.
    fn parse_move(
        &self,
        board: &Self::Board,
        side: Self::Side,
        input: &str,
    ) -> Result<Self::Move, RulesError> {
        if side != board.side_to_move() {
            return Err(RulesError::WrongSide(side.name()));
        }
        let text = input.trim().to_ascii_lowercase();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(RulesError::parse(input, "expected format: e2e4 or e7e8q"));
        }
        let square = |part: &str| {
            part.parse::<Square>()
                .map_err(|_| RulesError::parse(input, format!("`{}` is not a square", part)))
        };
        let from = square(&text[0..2])?;
        let to = square(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            Some(ch) => Some(
                promotion_piece(ch)
                    .ok_or_else(|| RulesError::parse(input, format!("`{}` is not a promotion piece", ch)))?,
            ),
            None => None,
        };
        self.resolve_move(board, from, to, promotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(rules: &Chess, moves: &[&str]) -> ChessBoard {
        moves.iter().fold(rules.initial_board(), |board, text| {
            let side = board.side_to_move();
            let mv = rules.parse_move(&board, side, text).unwrap();
            rules.apply_move(&board, &mv, side).unwrap().board
        })
    }

    #[test]
    fn test_initial_position() {
        let rules = Chess;
        let board = rules.initial_board();
        assert_eq!(rules.legal_moves(&board, Color::White).len(), 20);
        assert!(rules.legal_moves(&board, Color::Black).is_empty());
        assert_eq!(rules.outcome(&board, Color::White), GameOutcome::InProgress);
        assert_eq!(rules.evaluate(&board, Color::White), 0);
    }

    #[test]
    fn test_wrong_side_is_rejected() {
        let rules = Chess;
        let board = rules.initial_board();
        let mv = rules.parse_move(&board, Color::White, "e2e4").unwrap();
        assert!(matches!(
            rules.apply_move(&board, &mv, Color::Black),
            Err(RulesError::WrongSide("Black"))
        ));
    }

    #[test]
    fn test_parse_errors() {
        let rules = Chess;
        let board = rules.initial_board();
        assert!(matches!(rules.parse_move(&board, Color::White, "e2"), Err(RulesError::Parse { .. })));
        assert!(matches!(rules.parse_move(&board, Color::White, "z2e4"), Err(RulesError::Parse { .. })));
        assert!(matches!(rules.parse_move(&board, Color::White, "e2e5"), Err(RulesError::IllegalMove(_))));
    }

    #[test]
    fn test_promotion_suffix_needs_a_promoting_move() {
        let rules = Chess;
        let board = rules.initial_board();
        assert!(matches!(
            rules.parse_move(&board, Color::White, "e2e4q"),
            Err(RulesError::IllegalMove(text)) if text == "e2e4q"
        ));
    }

    #[test]
    fn test_forged_castling_flag_is_rejected() {
        let rules = Chess;
        let board = rules.initial_board();
        let push = rules.parse_move(&board, Color::White, "e2e4").unwrap();
        let forged = ChessMove { castles: true, ..push };

        assert!(!rules.legal_moves(&board, Color::White).contains(&forged));
        assert!(matches!(
            rules.apply_move(&board, &forged, Color::White),
            Err(RulesError::IllegalMove(_))
        ));
        assert!(rules.apply_move(&board, &push, Color::White).is_ok());
    }

    #[test]
    fn test_castling_notation() {
        let rules = Chess;
        let board = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        let short = rules.parse_move(&board, Color::White, "e1g1").unwrap();
        assert!(short.castles);
        assert_eq!(short.to_string(), "e1g1");
        assert_eq!(rules.parse_move(&board, Color::White, "e1h1").unwrap(), short);

        let long = rules.parse_move(&board, Color::White, "e1c1").unwrap();
        assert_eq!(long.to_string(), "e1c1");

        let next = rules.apply_move(&board, &short, Color::White).unwrap().board;
        assert_eq!(
            next.piece_at(Square::new(File::G, Rank::First)),
            Some((Color::White, Piece::King))
        );
        assert_eq!(
            next.piece_at(Square::new(File::F, Rank::First)),
            Some((Color::White, Piece::Rook))
        );
    }

    #[test]
    fn test_checkmate() {
        let rules = Chess;
        let board = play_all(&rules, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(board.in_check());
        assert_eq!(rules.outcome(&board, Color::White), GameOutcome::Win(Color::Black));
    }

    #[test]
    fn test_capture_resets_history() {
        let rules = Chess;
        let board = play_all(&rules, &["e2e4", "d7d5", "e4d5"]);
        assert_eq!(board.history.len(), 1);
        assert_eq!(rules.evaluate(&board, Color::White), 10);
    }

    #[test]
    fn test_insufficient_material() {
        let kings = ChessBoard::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
        let knight = ChessBoard::from_fen("8/8/8/4k3/8/4K3/5N2/8 w - - 0 1").unwrap();
        let rook = ChessBoard::from_fen("8/8/8/4k3/8/4K3/5R2/8 w - - 0 1").unwrap();
        assert!(kings.insufficient_material());
        assert!(knight.insufficient_material());
        assert!(!rook.insufficient_material());
    }

    #[test]
    fn test_bad_fen() {
        assert!(matches!(
            ChessBoard::from_fen("not a position"),
            Err(RulesError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_policies() {
        let rules = Chess;
        assert_eq!(rules.policy(Difficulty::Easy), AiPolicy::random());
        assert_eq!(rules.policy(Difficulty::Medium), AiPolicy::greedy());
        assert_eq!(rules.policy(Difficulty::Hard), AiPolicy::search(3));
    }
}
