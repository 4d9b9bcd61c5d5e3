//! # Session Configuration
//!
//! Settings for an interactive game against the AI: difficulty, the pause
//! before the AI answers, an optional search depth override and an optional
//! RNG seed for reproducible games.

use std::time::Duration;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{AiPolicy, Difficulty, GameRules};

/// Default pause before the AI plays.
pub const DEFAULT_THINKING_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Delay between the human's move and the AI's reply
    pub thinking_delay: Duration,
    /// Replaces the search depth of the difficulty's policy
    pub depth_override: Option<i32>,
    /// Seeds the AI's random choices; fresh entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            thinking_delay: DEFAULT_THINKING_DELAY,
            depth_override: None,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    pub fn with_depth_override(mut self, depth: Option<i32>) -> Self {
        self.depth_override = depth;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// The policy `rules` use at this difficulty, after the depth override.
    pub fn policy_for<G: GameRules>(&self, rules: &G) -> AiPolicy {
        rules
            .policy(self.difficulty)
            .with_depth_override(self.depth_override)
    }

    /// RNG for one AI turn.
    ///
    /// With a seed, the stream depends only on the seed, the game generation
    /// and the ply, so a replayed game makes the same choices.
    pub fn rng_for(&self, generation: u64, ply: usize) -> Xoshiro256PlusPlus {
        match self.seed {
            Some(seed) => {
                let mixed = seed
                    ^ generation.wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    ^ (ply as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                Xoshiro256PlusPlus::seed_from_u64(mixed)
            }
            None => Xoshiro256PlusPlus::seed_from_u64(rand::random()),
        }
    }
}
