// src/game/search/immediate.rs

//! One-ply fallback for positions too large to deepen profitably: every action
//! is applied, evaluated and undone, and a uniformly random action among the
//! best-scoring ones is returned.

use rand::seq::SliceRandom;
use tracing::info;

use super::Engine;
use crate::error::EngineError;
use crate::game::State;

impl<S: State> Engine<S> {
    pub fn immediate_search(&mut self) -> Result<S::Action, EngineError> {
        self.check_preconditions()?;
        self.start_clock();

        let mut best_moves = Vec::with_capacity(self.state.count_relevant_actions());
        let mut max_eval = None;
        for action in self.state.actions() {
            self.state.apply(action);
            let eval = self.state.eval(self.player);
            self.state.undo();
            self.nodes += 1;

            match max_eval {
                Some(max) if eval < max => {}
                Some(max) if eval == max => best_moves.push(action),
                _ => {
                    max_eval = Some(eval);
                    best_moves.clear();
                    best_moves.push(action);
                }
            }
        }

        let action = *best_moves
            .choose(&mut self.rng)
            .ok_or(EngineError::TerminalState)?;
        self.finish(Some(1), false);
        info!(
            action = ?action,
            ties = best_moves.len(),
            nodes = self.stats.nodes,
            "selected action by immediate search"
        );
        Ok(action)
    }
}
