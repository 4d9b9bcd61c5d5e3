//! # AI Arena
//!
//! Plays AI-vs-AI matches, optionally many of them in parallel on a rayon
//! thread pool, and tallies the results. Used by the `arena` binary to
//! compare difficulty levels and by tests to exercise whole games.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use crate::{select_ai_move, AiPolicy, GameOutcome, GameRules, GameState, Player};

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("failed to build the match thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// One of the two policies taking part in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

/// A finished (or abandoned) AI-vs-AI game.
#[derive(Debug, Clone)]
pub struct MatchRecord<G: GameRules> {
    /// Outcome on the final board; `InProgress` if the ply limit was hit
    pub outcome: GameOutcome<G::Side>,
    /// The side played by the first policy
    pub first_side: G::Side,
    pub moves: Vec<G::Move>,
}

impl<G: GameRules> MatchRecord<G> {
    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    /// Which policy won, if any.
    pub fn winner(&self) -> Option<Seat> {
        self.outcome.winner().map(|side| {
            if side == self.first_side {
                Seat::First
            } else {
                Seat::Second
            }
        })
    }
}

/// Plays one game between two policies.
///
/// The first policy plays `first_side`. The game stops when it is decided or
/// after `max_plies` moves.
pub fn play_ai_match<G, R>(
    rules: &G,
    first: &AiPolicy,
    second: &AiPolicy,
    first_side: G::Side,
    max_plies: usize,
    rng: &mut R,
) -> MatchRecord<G>
where
    G: GameRules,
    R: Rng + ?Sized,
{
    let mut state = GameState::initial(rules);
    let mut moves = Vec::new();

    while moves.len() < max_plies && !state.outcome(rules).is_over() {
        let side = state.side_to_move();
        let policy = if side == first_side { first } else { second };
        let Some(mv) = select_ai_move(rules, state.board(), side, policy, rng) else {
            break;
        };
        state = state.apply_legal(rules, &mv);
        moves.push(mv);
    }

    let outcome = state.outcome(rules);
    debug!(
        "{} match over after {} plies: {:?} ({} played first policy)",
        G::NAME,
        moves.len(),
        outcome,
        first_side.name()
    );
    MatchRecord {
        outcome,
        first_side,
        moves,
    }
}

/// Aggregated results of many matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
    /// Games cut off by the ply limit
    pub unfinished: u32,
    pub plies: u64,
}

impl Tally {
    pub fn record<G: GameRules>(&mut self, record: &MatchRecord<G>) {
        match (record.outcome, record.winner()) {
            (GameOutcome::InProgress, _) => self.unfinished += 1,
            (_, Some(Seat::First)) => self.first_wins += 1,
            (_, Some(Seat::Second)) => self.second_wins += 1,
            (_, None) => self.draws += 1,
        }
        self.plies += record.plies() as u64;
    }

    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            first_wins: self.first_wins + other.first_wins,
            second_wins: self.second_wins + other.second_wins,
            draws: self.draws + other.draws,
            unfinished: self.unfinished + other.unfinished,
            plies: self.plies + other.plies,
        }
    }

    pub fn games(&self) -> u32 {
        self.first_wins + self.second_wins + self.draws + self.unfinished
    }
}

/// Runs batches of matches on a dedicated thread pool.
pub struct Arena {
    pool: ThreadPool,
}

impl Arena {
    /// Creates an arena.
    ///
    /// # Arguments
    /// * `num_threads` - Worker threads for the matches. If 0, rayon picks the default.
    pub fn new(num_threads: usize) -> Result<Self, ArenaError> {
        let pool_builder = ThreadPoolBuilder::new();
        let pool = if num_threads > 0 {
            pool_builder.num_threads(num_threads).build()?
        } else {
            pool_builder.build()?
        };
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Plays `games` matches in parallel.
    ///
    /// The policies swap sides every game: the first policy takes the opening
    /// side in even-numbered games. With a seed every game gets its own
    /// reproducible RNG stream.
    pub fn run<G: GameRules>(
        &self,
        rules: &G,
        first: AiPolicy,
        second: AiPolicy,
        games: u32,
        max_plies: usize,
        seed: Option<u64>,
    ) -> Tally {
        info!(
            "{}: {} games on {} threads, {:?} vs {:?}",
            G::NAME,
            games,
            self.threads(),
            first,
            second
        );
        let opening = rules.initial_side();
        self.pool.install(|| {
            (0..games)
                .into_par_iter()
                .map(|game| {
                    let mut rng = match seed {
                        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(u64::from(game))),
                        None => Xoshiro256PlusPlus::seed_from_u64(rand::random()),
                    };
                    let first_side = if game % 2 == 0 { opening } else { opening.opponent() };
                    let record = play_ai_match(rules, &first, &second, first_side, max_plies, &mut rng);
                    let mut tally = Tally::default();
                    tally.record(&record);
                    tally
                })
                .reduce(Tally::default, Tally::merge)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::checkers::Checkers;
    use crate::games::tictactoe::{Mark, TicTacToe};
    use crate::Difficulty;

    #[test]
    fn test_perfect_players_draw() {
        let rules = TicTacToe;
        let hard = rules.policy(Difficulty::Hard);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let record = play_ai_match(&rules, &hard, &hard, Mark::X, 20, &mut rng);

        assert!(matches!(record.outcome, GameOutcome::Draw(_)));
        assert_eq!(record.plies(), 9);
        assert_eq!(record.winner(), None);
    }

    #[test]
    fn test_ply_limit_leaves_game_unfinished() {
        let rules = Checkers;
        let policy = AiPolicy::random();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let record = play_ai_match(&rules, &policy, &policy, rules.initial_side(), 4, &mut rng);

        assert_eq!(record.plies(), 4);
        let mut tally = Tally::default();
        tally.record(&record);
        assert_eq!(tally.unfinished, 1);
    }

    #[test]
    fn test_hard_never_loses_to_random() {
        let arena = Arena::new(2).unwrap();
        let rules = TicTacToe;
        let tally = arena.run(
            &rules,
            rules.policy(Difficulty::Hard),
            rules.policy(Difficulty::Easy),
            40,
            9,
            Some(17),
        );

        assert_eq!(tally.games(), 40);
        assert_eq!(tally.second_wins, 0);
        assert_eq!(tally.unfinished, 0);
        assert!(tally.first_wins > 0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let arena = Arena::new(2).unwrap();
        let policy = AiPolicy::random();
        let a = arena.run(&TicTacToe, policy, policy, 20, 9, Some(9));
        let b = arena.run(&TicTacToe, policy, policy, 20, 9, Some(9));
        assert_eq!(a, b);
    }
}
