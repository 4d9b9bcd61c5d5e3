use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use log::info;

use minimax::arena::{Arena, ArenaError, Tally};
use minimax::games::GameKind;
use minimax::{with_game_rules, Difficulty, GameRules};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pit two AI difficulty levels against each other", long_about = None)]
struct Args {
    /// Game to play
    #[arg(long, value_enum, default_value_t = GameKind::TicTacToe)]
    game: GameKind,

    /// Number of games (sides alternate every game)
    #[arg(long, default_value_t = 100)]
    games: u32,

    /// Difficulty of the first AI
    #[arg(long, value_enum, default_value_t = Difficulty::Hard)]
    first: Difficulty,

    /// Difficulty of the second AI
    #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
    second: Difficulty,

    /// Worker threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Games longer than this are scored as unfinished
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Overrides the search depth of both difficulties
    #[arg(long, allow_hyphen_values = true)]
    depth: Option<i32>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), ArenaError> {
    env_logger::init();
    let args = Args::parse();

    let threads = if args.threads == 0 { num_cpus::get() } else { args.threads };
    let arena = Arena::new(threads)?;

    println!("Minimax Arena");
    println!("=============");
    println!("Game: {}", args.game);
    println!("Games: {}", args.games);
    println!("First: {}  Second: {}", args.first, args.second);
    println!("Threads: {}", arena.threads());
    println!("Max plies: {}", args.max_plies);
    println!("-------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Deep searches will be slow.\nUse --release for long runs.\n");

    let start = Instant::now();
    let tally = with_game_rules!(args.game, |rules| {
        let first = rules.policy(args.first).with_depth_override(args.depth);
        let second = rules.policy(args.second).with_depth_override(args.depth);
        arena.run(&rules, first, second, args.games, args.max_plies, args.seed)
    });
    let elapsed = start.elapsed();
    info!("arena finished in {:.3}s", elapsed.as_secs_f64());

    print_tally(&args, &tally);
    println!("  Time: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn print_tally(args: &Args, tally: &Tally) {
    let games = tally.games().max(1) as f64;
    let percent = |n: u32| 100.0 * n as f64 / games;

    println!("Results:");
    println!(
        "  {} ({}) wins: {} ({:.1}%)",
        "First".green().bold(),
        args.first,
        tally.first_wins,
        percent(tally.first_wins)
    );
    println!(
        "  {} ({}) wins: {} ({:.1}%)",
        "Second".red().bold(),
        args.second,
        tally.second_wins,
        percent(tally.second_wins)
    );
    println!("  Draws: {} ({:.1}%)", tally.draws, percent(tally.draws));
    if tally.unfinished > 0 {
        println!("  {}: {}", "Unfinished".yellow(), tally.unfinished);
    }
    println!("  Average length: {:.1} plies", tally.plies as f64 / games);
}
