use minimax::game_controller::{GameController, MoveResult};
use minimax::games::checkers::{Checkers, CheckersBoard, CheckersMove, Color, Piece, Rank};
use minimax::{Difficulty, GameOutcome, GameRules, GameState, Player, RulesError};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn board_with(pieces: &[(usize, Piece)]) -> CheckersBoard {
    pieces
        .iter()
        .fold(CheckersBoard::empty(), |board, &(index, piece)| board.with_piece(index, Some(piece)))
}

fn red(index: usize) -> (usize, Piece) {
    (index, Piece::man(Color::Red))
}

fn blue(index: usize) -> (usize, Piece) {
    (index, Piece::man(Color::Blue))
}

#[test]
fn test_opening_position() {
    let rules = Checkers;
    let board = rules.initial_board();
    assert_eq!(rules.initial_side(), Color::Red);

    let moves = rules.legal_moves(&board, Color::Red);
    assert_eq!(moves.len(), 7);
    assert!(moves.iter().all(|mv| !mv.is_jump() && !mv.promotes));
    assert!(moves.iter().all(|mv| mv.from >= 40 && mv.from < 48 && mv.to >= 32 && mv.to < 40));
}

#[test]
fn test_capture_is_forced() {
    let rules = Checkers;
    // Red could step 46 -> 37/39, but 44 has a capture available.
    let board = board_with(&[red(44), red(46), blue(35), blue(1)]);
    let moves = rules.legal_moves(&board, Color::Red);

    assert_eq!(
        moves,
        vec![CheckersMove {
            from: 44,
            to: 26,
            captured: Some(35),
            promotes: false,
        }]
    );

    let step = CheckersMove {
        from: 46,
        to: 37,
        captured: None,
        promotes: false,
    };
    assert_eq!(
        rules.apply_move(&board, &step, Color::Red),
        Err(RulesError::IllegalMove("46-37".to_string()))
    );
}

#[test]
fn test_capture_is_forced_in_random_games() {
    let rules = Checkers;
    let mut checked = 0;

    for seed in 0..200 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut state = GameState::initial(&rules);
        for _ in 0..150 {
            if state.outcome(&rules).is_over() {
                break;
            }
            let side = state.side_to_move();
            let board = state.board();
            let moves = rules.legal_moves(board, side);
            if board.pieces(side).any(|(index, _)| board.can_jump_from(index)) {
                assert!(!moves.is_empty());
                assert!(
                    moves.iter().all(CheckersMove::is_jump),
                    "non-capture offered with a capture available:\n{}",
                    board
                );
            }
            checked += 1;

            let mv = rules
                .ai_move(board, side, Difficulty::Easy, &mut rng)
                .expect("game in progress has a move");
            state = state.apply(&rules, &mv).expect("random move is legal");
        }
    }
    assert!(checked > 1000);
}

#[test]
fn test_multi_jump_keeps_the_turn() {
    let rules = Checkers;
    let board = board_with(&[red(44), blue(35), blue(17), blue(63)]);

    let first = rules.parse_move(&board, Color::Red, "44x26").unwrap();
    let after_first = rules.apply_move(&board, &first, Color::Red).unwrap();
    assert_eq!(after_first.board.get(35), None);
    assert_eq!(after_first.board.get(17), Some(Piece::man(Color::Blue)));
    assert_eq!(after_first.next_side, Color::Red);

    let continuation = rules.legal_moves(&after_first.board, Color::Red);
    assert_eq!(continuation.len(), 1);
    assert_eq!((continuation[0].from, continuation[0].to), (26, 8));

    let after_second = rules.apply_move(&after_first.board, &continuation[0], Color::Red).unwrap();
    assert_eq!(after_second.board.get(17), None);
    assert_eq!(after_second.next_side, Color::Blue);
}

#[test]
fn test_side_without_moves_loses() {
    let rules = Checkers;
    // The red man on 8 is blocked by the blue man on 1, which cannot be jumped off the board.
    let board = board_with(&[red(8), blue(1)]);
    assert!(rules.legal_moves(&board, Color::Red).is_empty());
    assert_eq!(rules.outcome(&board, Color::Red), GameOutcome::Win(Color::Blue));
}

#[test]
fn test_side_without_pieces_loses() {
    let rules = Checkers;
    let board = board_with(&[blue(1)]);
    assert_eq!(rules.outcome(&board, Color::Blue), GameOutcome::Win(Color::Blue));
    let board = board_with(&[red(40)]);
    assert_eq!(rules.outcome(&board, Color::Red), GameOutcome::Win(Color::Red));
}

#[test]
fn test_blue_man_is_crowned_on_the_last_row() {
    let rules = Checkers;
    let board = board_with(&[blue(49), red(40)]);
    let mv = rules.parse_move(&board, Color::Blue, "49-56").unwrap();
    assert!(mv.promotes);

    let next = rules.apply_move(&board, &mv, Color::Blue).unwrap();
    assert_eq!(next.board.get(56).map(|p| p.rank), Some(Rank::King));
}

#[test]
fn test_controller_game_with_capture_chain() {
    let board = board_with(&[red(44), blue(35), blue(17)]);
    let mut controller = GameController::with_state(Checkers, GameState::from_board(board, Color::Red));

    assert!(controller.try_input("44x26").is_success());
    match controller.try_input("26x8") {
        MoveResult::Success { outcome, .. } => assert_eq!(outcome, GameOutcome::Win(Color::Red)),
        other => panic!("Expected the final capture, got {:?}", other),
    }
    assert_eq!(controller.winner(), Some(Color::Red));
}

#[test]
fn test_ai_games_stay_legal() {
    let rules = Checkers;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let mut state = GameState::initial(&rules);

    for ply in 0..120 {
        if state.outcome(&rules).is_over() {
            break;
        }
        let side = state.side_to_move();
        let difficulty = if side == Color::Red { Difficulty::Medium } else { Difficulty::Easy };
        let mv = rules
            .ai_move(state.board(), side, difficulty, &mut rng)
            .unwrap_or_else(|| panic!("{} has no move at ply {}", side.name(), ply));
        state = state.apply(&rules, &mv).expect("AI move is legal");
        assert!(state.board().count(Color::Red) <= 12);
        assert!(state.board().count(Color::Blue) <= 12);
    }
}
