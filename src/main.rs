//! Interactive terminal front end: play Tic-Tac-Toe, Checkers or Chess
//! against the minimax AI or against another human at the same keyboard.

use std::io::{self, Write};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use minimax::config::SessionConfig;
use minimax::game_controller::MoveResult;
use minimax::games::GameKind;
use minimax::session::GameSession;
use minimax::{with_game_rules, Difficulty, GameOutcome, GameRules, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HumanSide {
    First,
    Second,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play classic board games against a minimax AI", long_about = None)]
struct Args {
    #[clap(short, long, value_enum, default_value_t = GameKind::TicTacToe)]
    game: GameKind,

    #[clap(short, long, value_enum, default_value_t = Opponent::Ai)]
    opponent: Opponent,

    #[clap(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Whether the human takes the opening side
    #[clap(long, value_enum, default_value_t = HumanSide::First)]
    human_side: HumanSide,

    /// Pause before the AI answers
    #[clap(long, default_value_t = 1000)]
    thinking_delay_ms: u64,

    /// Overrides the search depth of the difficulty
    #[clap(long, allow_hyphen_values = true)]
    depth: Option<i32>,

    /// Seed for reproducible AI choices
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    env_logger::init();
    let args = Args::parse();

    let config = SessionConfig::new(args.difficulty)
        .with_thinking_delay(Duration::from_millis(args.thinking_delay_ms))
        .with_depth_override(args.depth)
        .with_seed(args.seed);
    info!("starting {} against {:?} with {:?}", args.game, args.opponent, config);

    let kind = args.game;
    with_game_rules!(kind, |rules| run_game(rules, kind, &args, config).await)
}

async fn run_game<G: GameRules>(
    rules: G,
    kind: GameKind,
    args: &Args,
    config: SessionConfig,
) -> Result<(), CliError> {
    let opening = rules.initial_side();
    let ai_side = match (args.opponent, args.human_side) {
        (Opponent::Human, _) => None,
        (Opponent::Ai, HumanSide::First) => Some(opening.opponent()),
        (Opponent::Ai, HumanSide::Second) => Some(opening),
    };
    let mut session = GameSession::new(rules, config);

    println!("{}", format!("=== {} ===", G::NAME).bold());
    print_help(kind);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut show_board = true;
    loop {
        let (status, to_move) = session.view(|c| (c.status(), c.current_player()));
        if show_board {
            println!("\n{}", paint(kind, &session.view(|c| c.board().to_string())));
        }
        show_board = true;

        match status {
            GameOutcome::Win(side) => {
                println!("{}", format!("{} wins!", side.name()).green().bold());
                println!("Type `reset` for a new game or `quit` to leave.");
            }
            GameOutcome::Draw(reason) => {
                println!("{}", format!("Draw by {}.", reason).yellow().bold());
                println!("Type `reset` for a new game or `quit` to leave.");
            }
            GameOutcome::InProgress if Some(to_move) == ai_side => {
                println!("{} is thinking...", to_move.name());
                session.schedule_ai_move();
                match session.wait_for_ai().await {
                    Some(MoveResult::Success { move_made, player, .. }) => {
                        println!("{} plays {}", player.name(), move_made.to_string().cyan());
                    }
                    other => warn!("AI turn produced no move: {:?}", other),
                }
                continue;
            }
            GameOutcome::InProgress => {}
        }

        print!("{} > ", to_move.name());
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => show_board = false,
            "quit" | "exit" => break,
            "help" => {
                print_help(kind);
                show_board = false;
            }
            "moves" => {
                let moves: Vec<String> = session.view(|c| c.legal_moves().iter().map(|m| m.to_string()).collect());
                println!("Legal moves: {}", moves.join(" "));
                show_board = false;
            }
            "history" => {
                println!("{}", session.view(|c| c.format_history()));
                show_board = false;
            }
            "reset" => session.reset(),
            input => match session.human_input(input) {
                MoveResult::Success { .. } => {}
                MoveResult::Invalid { reason } => {
                    println!("{}", reason.to_string().red());
                    show_board = false;
                }
                MoveResult::GameOver => {
                    println!("{}", "The game is over.".red());
                    show_board = false;
                }
            },
        }
    }

    println!("{}", session.view(|c| c.format_history()));
    Ok(())
}

fn print_help(kind: GameKind) {
    let format = match kind {
        GameKind::TicTacToe => "a cell index 0-8, e.g. `4`",
        GameKind::Checkers => "from-to board indices, e.g. `44-35` or `44x26`",
        GameKind::Chess => "coordinates, e.g. `e2e4`, `e1g1` or `e7e8q`",
    };
    println!("Enter moves as {}.", format);
    println!("Commands: moves, history, reset, help, quit");
}

/// Colours the pieces of a rendered board.
fn paint(kind: GameKind, board: &str) -> String {
    board
        .lines()
        .map(|line| {
            if kind == GameKind::Chess && !line.contains('|') {
                return line.to_string();
            }
            line.chars()
                .map(|ch| paint_piece(kind, ch))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint_piece(kind: GameKind, ch: char) -> String {
    let text = ch.to_string();
    match (kind, ch) {
        (GameKind::TicTacToe, 'X') | (GameKind::Checkers, 'r' | 'R') => text.red().bold().to_string(),
        (GameKind::TicTacToe, 'O') | (GameKind::Checkers, 'b' | 'B') => text.blue().bold().to_string(),
        (GameKind::Chess, c) if c.is_ascii_uppercase() => text.white().bold().to_string(),
        (GameKind::Chess, c) if c.is_ascii_lowercase() => text.magenta().bold().to_string(),
        _ => text,
    }
}
