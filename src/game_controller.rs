//! # Game Controller Module - Central Game State Management
//!
//! This module provides the `GameController` which serves as the single source of truth
//! for the authoritative game state. It ensures proper separation between:
//!
//! - **Authoritative Game State**: The "real" game state owned by the controller
//! - **AI Search States**: Clones handed to the search, never written back
//! - **UI Render States**: Read-only views used for display
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      GameController<G>                              │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              Authoritative GameState<G>                     │    │
//! │  │  • Single source of truth                                   │    │
//! │  │  • Human moves validated here before application            │    │
//! │  │  • Move history maintained                                  │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                           │                                         │
//! │              ┌────────────┼────────────┐                            │
//! │              ▼            ▼            ▼                            │
//! │  ┌───────────────┐ ┌───────────┐ ┌─────────────────┐                │
//! │  │ AI task       │ │ Terminal  │ │ Human input     │                │
//! │  │ (cloned state)│ │ (view)    │ │ (requests)      │                │
//! │  └───────────────┘ └───────────┘ └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every reset bumps a generation counter. An AI result computed for an older
//! generation belongs to a game that no longer exists and is never applied.

use std::time::SystemTime;

use log::{debug, info};
use thiserror::Error;

use crate::{GameOutcome, GameRules, GameState, Player, RulesError};

/// Result of attempting to apply a move
#[derive(Debug, Clone)]
pub enum MoveResult<M, S> {
    /// Move was successfully applied
    Success {
        /// The applied move
        move_made: M,
        /// Player who made the move
        player: S,
        /// Side to move afterwards; equal to `player` during a capture chain
        next_player: S,
        /// State of the game after the move
        outcome: GameOutcome<S>,
    },
    /// Move was rejected as invalid
    Invalid {
        /// Reason the move was rejected
        reason: MoveValidationError,
    },
    /// Game is already over, no more moves allowed
    GameOver,
}

impl<M, S> MoveResult<M, S> {
    pub fn is_success(&self) -> bool {
        matches!(self, MoveResult::Success { .. })
    }
}

/// Errors that can occur during move validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveValidationError {
    /// The game is already in a terminal state
    #[error("Game is already over")]
    GameAlreadyOver,
    /// A move was submitted while the AI is computing its reply
    #[error("Wait for the AI to finish its move")]
    AiThinking,
    /// The rules engine rejected the move
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry<M, S> {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: S,
    /// The move that was made
    pub move_made: M,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl<M, S> MoveHistoryEntry<M, S> {
    /// Create a new move history entry
    pub fn new(player: S, move_made: M, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// The central game controller that owns the authoritative game state
///
/// This is the single source of truth for the game state. All moves must
/// go through the controller: human input is validated against the rules,
/// AI moves come from the same rules and are applied as trusted.
///
/// # Usage
/// ```
/// use minimax::game_controller::{GameController, MoveResult};
/// use minimax::games::tictactoe::{Mark, TicTacToe};
///
/// let mut controller = GameController::new(TicTacToe);
/// match controller.try_input("4") {
///     MoveResult::Success { player, .. } => assert_eq!(player, Mark::X),
///     other => panic!("unexpected {:?}", other),
/// }
/// assert_eq!(controller.current_player(), Mark::O);
/// ```
pub struct GameController<G: GameRules> {
    rules: G,
    /// The authoritative game state
    state: GameState<G>,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry<G::Move, G::Side>>,
    /// Current game status
    status: GameOutcome<G::Side>,
    generation: u64,
    ai_thinking: bool,
}

impl<G: GameRules> GameController<G> {
    /// Create a new game controller at the initial position
    pub fn new(rules: G) -> Self {
        let state = GameState::initial(&rules);
        Self::with_state(rules, state)
    }

    /// Create a controller that continues from an arbitrary position
    pub fn with_state(rules: G, state: GameState<G>) -> Self {
        let status = state.outcome(&rules);
        Self {
            rules,
            state,
            move_history: Vec::new(),
            status,
            generation: 0,
            ai_thinking: false,
        }
    }

    /// Validate a move without applying it
    ///
    /// Returns Ok(()) if the move is valid, or an error describing why it's invalid.
    pub fn validate_move(&self, mv: &G::Move) -> Result<(), MoveValidationError> {
        if self.status.is_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if self.ai_thinking {
            return Err(MoveValidationError::AiThinking);
        }
        self.rules
            .apply_move(self.state.board(), mv, self.state.side_to_move())?;
        Ok(())
    }

    /// Attempt to make a move
    ///
    /// Validates the move and applies it if valid. Returns the result of the attempt.
    pub fn try_make_move(&mut self, mv: G::Move) -> MoveResult<G::Move, G::Side> {
        if self.status.is_over() {
            return MoveResult::GameOver;
        }
        if self.ai_thinking {
            return MoveResult::Invalid {
                reason: MoveValidationError::AiThinking,
            };
        }
        match self.state.apply(&self.rules, &mv) {
            Ok(next) => self.commit(mv, next),
            Err(e) => {
                debug!("{} rejected move {}: {}", G::NAME, mv, e);
                MoveResult::Invalid { reason: e.into() }
            }
        }
    }

    /// Parse user input for the side to move and play it
    pub fn try_input(&mut self, input: &str) -> MoveResult<G::Move, G::Side> {
        if self.status.is_over() {
            return MoveResult::GameOver;
        }
        let parsed = self
            .rules
            .parse_move(self.state.board(), self.state.side_to_move(), input);
        match parsed {
            Ok(mv) => self.try_make_move(mv),
            Err(e) => MoveResult::Invalid { reason: e.into() },
        }
    }

    /// Force a move without validation (for AI moves that are trusted)
    ///
    /// Use with caution - this bypasses validation. Should only be used
    /// for moves that come from the AI, which uses the same game rules.
    pub fn apply_trusted_move(&mut self, mv: G::Move) -> MoveResult<G::Move, G::Side> {
        if self.status.is_over() {
            return MoveResult::GameOver;
        }
        let next = self.state.apply_legal(&self.rules, &mv);
        self.commit(mv, next)
    }

    fn commit(&mut self, mv: G::Move, next: GameState<G>) -> MoveResult<G::Move, G::Side> {
        let player = self.state.side_to_move();
        let move_number = self.move_history.len() + 1;

        self.state = next;
        self.move_history
            .push(MoveHistoryEntry::new(player, mv.clone(), move_number));
        self.status = self.state.outcome(&self.rules);

        debug!("{} move {}: {} played {}", G::NAME, move_number, player.name(), mv);
        if self.status.is_over() {
            info!("{} finished after {} moves: {:?}", G::NAME, move_number, self.status);
        }

        MoveResult::Success {
            move_made: mv,
            player,
            next_player: self.state.side_to_move(),
            outcome: self.status,
        }
    }

    pub fn rules(&self) -> &G {
        &self.rules
    }

    /// The authoritative state; clone it to hand to a search
    pub fn state(&self) -> &GameState<G> {
        &self.state
    }

    /// Get the board for rendering
    pub fn board(&self) -> &G::Board {
        self.state.board()
    }

    /// Get the current player
    pub fn current_player(&self) -> G::Side {
        self.state.side_to_move()
    }

    /// Get the current game status
    pub fn status(&self) -> GameOutcome<G::Side> {
        self.status
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    /// Get the winner if the game is over
    pub fn winner(&self) -> Option<G::Side> {
        self.status.winner()
    }

    /// Get the complete move history
    pub fn move_history(&self) -> &[MoveHistoryEntry<G::Move, G::Side>] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get the last move made, if any
    pub fn last_move(&self) -> Option<&MoveHistoryEntry<G::Move, G::Side>> {
        self.move_history.last()
    }

    /// Get legal moves for the current player
    pub fn legal_moves(&self) -> Vec<G::Move> {
        if self.status.is_over() {
            Vec::new()
        } else {
            self.state.legal_moves(&self.rules)
        }
    }

    /// Reset the game to its initial state
    ///
    /// Starts a new generation, which invalidates any AI move in flight.
    pub fn reset(&mut self) {
        self.state = GameState::initial(&self.rules);
        self.move_history.clear();
        self.status = self.state.outcome(&self.rules);
        self.generation += 1;
        self.ai_thinking = false;
        info!("{} reset, generation {}", G::NAME, self.generation);
    }

    /// Number of resets so far; AI results are tagged with it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ai_thinking(&self) -> bool {
        self.ai_thinking
    }

    pub(crate) fn set_ai_thinking(&mut self, thinking: bool) {
        self.ai_thinking = thinking;
    }

    /// Format move history as plain text
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", G::NAME);
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                entry.player.name(),
                entry.move_made
            ));
        }

        match self.status {
            GameOutcome::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", winner.name()));
            }
            GameOutcome::Draw(reason) => {
                output.push_str(&format!("\nResult: Draw ({})\n", reason));
            }
            GameOutcome::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.current_player().name()
                ));
            }
        }

        output
    }
}
