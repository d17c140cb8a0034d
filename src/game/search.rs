// src/game/search.rs

pub mod alphabeta;
pub mod bns;
pub mod immediate;
pub mod tt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{IMMEDIATE_SEARCH_THRESHOLD, TIME_RELAXATION};
use crate::error::{EngineError, SearchError};
use crate::game::{Player, Score, State};
use tt::TranspositionTable;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub use_transposition_table: bool,
    pub use_best_node_search: bool,
    pub use_refutation_move: bool,
    pub time_relaxation: f32,
    pub immediate_search_threshold: usize,
    pub max_depth: Option<u32>,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_transposition_table: true,
            use_best_node_search: true,
            use_refutation_move: true,
            time_relaxation: TIME_RELAXATION,
            immediate_search_threshold: IMMEDIATE_SEARCH_THRESHOLD,
            max_depth: None,
            seed: None,
        }
    }
}

/// Raised by the recursive search once the time budget is spent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("search budget exhausted")]
pub struct Timeout;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Depth limit of the last completed iteration, if any completed.
    pub depth: Option<u32>,
    pub nodes: u64,
    pub elapsed: Duration,
    pub timed_out: bool,
}

/// A time-bounded adversarial searcher playing one side of a two-player game.
///
/// The engine owns the game state. Searches walk the tree by applying and
/// undoing actions on that single instance, and always hand it back exactly as
/// they found it, including when the budget runs out mid-iteration.
pub struct Engine<S: State> {
    player: Player,
    state: S,
    time_limit: Duration,
    config: SearchConfig,
    table: TranspositionTable<S::Token>,
    start: Instant,
    nodes: u64,
    stats: SearchStats,
    rng: StdRng,
}

impl<S: State> Engine<S> {
    pub fn new(player: Player, state: S, time_limit_ms: u64) -> Result<Self, EngineError> {
        Self::with_config(player, state, time_limit_ms, SearchConfig::default())
    }

    pub fn with_config(
        player: Player,
        state: S,
        time_limit_ms: u64,
        config: SearchConfig,
    ) -> Result<Self, EngineError> {
        let relaxation = config.time_relaxation;
        if !(relaxation > 0.0 && relaxation <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "time relaxation {relaxation} is outside (0, 1]"
            )));
        }
        let table = TranspositionTable::new(state.tt_suggested_capacity())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            player,
            state,
            time_limit: Duration::from_millis(time_limit_ms),
            config,
            table,
            start: Instant::now(),
            nodes: 0,
            stats: SearchStats::default(),
            rng,
        })
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn table(&self) -> &TranspositionTable<S::Token> {
        &self.table
    }

    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Folds an action played outside the engine into the held state.
    pub fn update(&mut self, action: S::Action) -> Result<(), EngineError> {
        if !self.state.is_legal(action) {
            return Err(EngineError::IllegalAction(format!("{action:?}")));
        }
        self.state.apply(action);
        Ok(())
    }

    /// Picks a move, falling back to the one-ply search when the position has
    /// too many relevant actions for deepening to pay off.
    pub fn search(&mut self) -> Result<S::Action, EngineError> {
        if self.state.count_relevant_actions() > self.config.immediate_search_threshold {
            self.immediate_search()
        } else {
            self.iterative_deepening_search()
        }
    }

    /// Runs depth-limited searches of increasing depth until the budget or the
    /// game's remaining height is exhausted, and returns the choice of the last
    /// iteration that completed.
    pub fn iterative_deepening_search(&mut self) -> Result<S::Action, EngineError> {
        self.check_preconditions()?;
        self.start_clock();
        let root_key = self.state.hash_key();
        let max_limit = self.depth_ceiling();

        let mut best = None;
        let mut completed = None;
        let mut timed_out = false;
        for depth in 0..=max_limit {
            match self.root_choice(depth as i32) {
                Ok(Some(action)) => {
                    debug!(
                        depth,
                        nodes = self.nodes,
                        elapsed_ms = self.start.elapsed().as_millis() as u64,
                        action = ?action,
                        "iteration complete"
                    );
                    best = Some(action);
                    completed = Some(depth);
                }
                Ok(None) => break,
                Err(Timeout) => {
                    timed_out = true;
                    break;
                }
            }
        }
        debug_assert_eq!(self.state.hash_key(), root_key, "search left the state modified");

        let action = match best {
            Some(action) => action,
            None => self.state.actions().next().ok_or(EngineError::TerminalState)?,
        };
        self.finish(completed, timed_out);
        info!(
            action = ?action,
            depth = ?completed,
            nodes = self.stats.nodes,
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
            timed_out,
            "selected action"
        );
        Ok(action)
    }

    /// Chooses a root action with a single search limited to `depth`, using the
    /// configured root algorithm.
    pub fn choose_action(&mut self, depth: u32) -> Result<Option<S::Action>, SearchError> {
        self.check_preconditions()?;
        self.start_clock();
        let choice = self.root_choice(depth as i32);
        self.finish(choice.is_ok().then_some(depth), choice.is_err());
        Ok(choice?)
    }

    /// Minimax value of the held state for the engine's player, who must have
    /// the move, searched with a full window to `depth`.
    pub fn minimax_value(&mut self, depth: u32) -> Result<Score, SearchError> {
        self.check_preconditions()?;
        self.start_clock();
        let (alpha, beta) = (
            self.state.initial_alpha(self.player),
            self.state.initial_beta(self.player),
        );
        let value = self.max_value(alpha, beta, depth as i32, 0);
        self.finish(value.is_ok().then_some(depth), value.is_err());
        Ok(value?)
    }

    fn root_choice(&mut self, depth: i32) -> Result<Option<S::Action>, Timeout> {
        if self.config.use_best_node_search {
            self.best_node_search(depth)
        } else {
            self.alpha_beta_choice(depth)
        }
    }

    fn check_preconditions(&self) -> Result<(), EngineError> {
        if self.state.is_terminal() {
            return Err(EngineError::TerminalState);
        }
        let actual = self.state.player();
        if actual != self.player {
            return Err(EngineError::NotOurTurn { expected: self.player, actual });
        }
        Ok(())
    }

    fn depth_ceiling(&self) -> u32 {
        let height = self.state.overestimated_height();
        self.config.max_depth.map_or(height, |cap| cap.min(height))
    }

    fn start_clock(&mut self) {
        self.start = Instant::now();
        self.nodes = 0;
    }

    fn finish(&mut self, depth: Option<u32>, timed_out: bool) {
        self.stats = SearchStats {
            depth,
            nodes: self.nodes,
            elapsed: self.start.elapsed(),
            timed_out,
        };
    }

    fn time_check(&self) -> Result<(), Timeout> {
        if self.start.elapsed() >= self.time_limit.mul_f32(self.config.time_relaxation) {
            return Err(Timeout);
        }
        Ok(())
    }
}
