//! # Game Session
//!
//! Runs a human-vs-AI game on top of a shared [`GameController`].
//!
//! AI turns run as tokio tasks: the task waits for the configured thinking
//! delay, clones the authoritative state, searches on the blocking pool and
//! applies the result. While a turn is pending the controller rejects human
//! moves. Each turn is tagged with the controller's generation; a result that
//! comes back after a reset is discarded instead of being applied to the new
//! game.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::game_controller::{GameController, MoveResult};
use crate::{select_ai_move, GameRules, GameState};

type AiResult<G> = Option<MoveResult<<G as GameRules>::Move, <G as GameRules>::Side>>;

struct PendingAi<G: GameRules> {
    generation: u64,
    handle: JoinHandle<AiResult<G>>,
}

/// A game against the AI with delayed, cancellable AI turns.
pub struct GameSession<G: GameRules> {
    controller: Arc<Mutex<GameController<G>>>,
    config: SessionConfig,
    pending: Option<PendingAi<G>>,
}

impl<G: GameRules> GameSession<G> {
    pub fn new(rules: G, config: SessionConfig) -> Self {
        Self::with_controller(GameController::new(rules), config)
    }

    pub fn with_controller(controller: GameController<G>, config: SessionConfig) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            config,
            pending: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared handle to the authoritative controller.
    pub fn controller(&self) -> Arc<Mutex<GameController<G>>> {
        Arc::clone(&self.controller)
    }

    /// Runs `f` against the controller while holding its lock.
    pub fn view<R>(&self, f: impl FnOnce(&GameController<G>) -> R) -> R {
        f(&self.controller.lock())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> GameState<G> {
        self.controller.lock().state().clone()
    }

    /// Whether an AI turn is scheduled or running.
    pub fn is_busy(&self) -> bool {
        self.controller.lock().is_ai_thinking()
    }

    pub fn human_move(&self, mv: G::Move) -> MoveResult<G::Move, G::Side> {
        self.controller.lock().try_make_move(mv)
    }

    pub fn human_input(&self, input: &str) -> MoveResult<G::Move, G::Side> {
        self.controller.lock().try_input(input)
    }

    /// Starts the AI's turn for the side to move.
    ///
    /// Returns `false` without scheduling anything if the game is over or a
    /// turn is already pending. Must be called from within a tokio runtime.
    pub fn schedule_ai_move(&mut self) -> bool {
        let generation = {
            let mut controller = self.controller.lock();
            if controller.is_game_over() || controller.is_ai_thinking() {
                return false;
            }
            controller.set_ai_thinking(true);
            controller.generation()
        };

        let controller = Arc::clone(&self.controller);
        let config = self.config.clone();
        debug!("scheduling AI turn for generation {}", generation);
        let handle = tokio::spawn(run_ai_turn(controller, config, generation));
        self.pending = Some(PendingAi { generation, handle });
        true
    }

    /// Waits for the pending AI turn and returns what it played.
    ///
    /// `None` when nothing was pending, the turn was discarded as stale, or
    /// the AI had no move.
    pub async fn wait_for_ai(&mut self) -> AiResult<G> {
        let pending = self.pending.take()?;
        match pending.handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("AI turn for generation {} did not finish: {}", pending.generation, e);
                self.controller.lock().set_ai_thinking(false);
                None
            }
        }
    }

    /// Starts a new game, cancelling any AI turn in flight.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("cancelling AI turn for generation {}", pending.generation);
            pending.handle.abort();
        }
        self.controller.lock().reset();
        info!("new game started");
    }
}

async fn run_ai_turn<G: GameRules>(
    controller: Arc<Mutex<GameController<G>>>,
    config: SessionConfig,
    generation: u64,
) -> AiResult<G> {
    tokio::time::sleep(config.thinking_delay).await;

    let (rules, state, ply) = {
        let mut guard = controller.lock();
        if guard.generation() != generation {
            debug!("AI turn for generation {} skipped after reset", generation);
            return None;
        }
        if guard.is_game_over() {
            guard.set_ai_thinking(false);
            return None;
        }
        (guard.rules().clone(), guard.state().clone(), guard.move_count())
    };

    let policy = config.policy_for(&rules);
    let mut rng = config.rng_for(generation, ply);
    let chosen = tokio::task::spawn_blocking(move || {
        select_ai_move(&rules, state.board(), state.side_to_move(), &policy, &mut rng)
    })
    .await
    .ok()
    .flatten();

    let mut guard = controller.lock();
    if guard.generation() != generation {
        warn!(
            "discarding AI move computed for generation {} (now {})",
            generation,
            guard.generation()
        );
        return None;
    }
    guard.set_ai_thinking(false);
    let mv = chosen?;
    Some(guard.apply_trusted_move(mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Mark, TicTacToe, TicTacToeBoard, TicTacToeMove};
    use crate::game_controller::MoveValidationError;
    use crate::{Difficulty, GameOutcome};
    use std::time::Duration;

    fn quick_config() -> SessionConfig {
        SessionConfig::new(Difficulty::Hard)
            .with_thinking_delay(Duration::from_millis(50))
            .with_seed(Some(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ai_replies_after_human() {
        let mut session = GameSession::new(TicTacToe, quick_config());
        assert!(session.human_move(TicTacToeMove(0)).is_success());
        assert!(session.schedule_ai_move());
        assert!(session.is_busy());

        let result = session.wait_for_ai().await.expect("AI should move");
        match result {
            MoveResult::Success { player, move_made, .. } => {
                assert_eq!(player, Mark::O);
                assert_eq!(move_made, TicTacToeMove(4));
            }
            other => panic!("Expected AI move, got {:?}", other),
        }
        assert!(!session.is_busy());
        assert_eq!(session.snapshot().side_to_move(), Mark::X);
    }

    #[tokio::test(start_paused = true)]
    async fn test_human_blocked_while_ai_thinks() {
        let mut session = GameSession::new(TicTacToe, quick_config());
        assert!(session.schedule_ai_move());
        assert!(!session.schedule_ai_move());

        assert!(matches!(
            session.human_move(TicTacToeMove(4)),
            MoveResult::Invalid { reason: MoveValidationError::AiThinking }
        ));

        session.wait_for_ai().await;
        assert_eq!(session.view(|c| c.move_count()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_turn() {
        let mut session = GameSession::new(TicTacToe, quick_config());
        assert!(session.schedule_ai_move());
        session.reset();

        assert!(session.wait_for_ai().await.is_none());
        assert!(!session.is_busy());
        assert_eq!(session.view(|c| c.move_count()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_discarded() {
        let mut session = GameSession::new(TicTacToe, quick_config());
        assert!(session.schedule_ai_move());

        // Reset behind the session's back so the task runs to completion.
        session.controller().lock().reset();

        assert!(session.wait_for_ai().await.is_none());
        assert_eq!(session.view(|c| c.move_count()), 0);
        assert_eq!(session.view(|c| c.generation()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_skipped_when_game_ended_during_delay() {
        let board: TicTacToeBoard = "XX. OO. ...".parse().unwrap();
        let state = GameState::from_board(board, Mark::X);
        let controller = GameController::with_state(TicTacToe, state);
        let mut session = GameSession::with_controller(controller, quick_config());
        assert!(session.schedule_ai_move());

        // Finish the game while the AI is still waiting out its delay.
        let finished = session.controller().lock().apply_trusted_move(TicTacToeMove(2));
        assert!(finished.is_success());

        assert!(session.wait_for_ai().await.is_none());
        assert!(!session.is_busy());
        assert_eq!(session.view(|c| c.move_count()), 1);
        assert_eq!(session.view(|c| c.status()), GameOutcome::Win(Mark::X));
    }
}
