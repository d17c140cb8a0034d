// src/game/search/alphabeta.rs

//! Depth-limited minimax with alpha-beta pruning over the engine's live state.
//!
//! `max_value` scores nodes where the engine's player moves and `min_value`
//! nodes where the opponent does; both evaluate from the engine's point of
//! view. Each node consults the transposition table first: a deep enough
//! result can answer the node outright or narrow its window, and its move is
//! searched before the remaining actions. Values are fail-soft, so a score
//! outside the window is still a valid bound on the true value.
//!
//! Decided outcomes are anchored to the search root: a win found `ply` plies
//! down scores `WIN_SCORE - ply`, which keeps quicker wins (and slower losses)
//! ahead of the alternatives. Table scores are stored relative to their node.

use tracing::warn;

use super::tt::{Bound, SearchResult};
use super::{Engine, Timeout};
use crate::constants::{MATE_BOUND, SCORE_INFINITY};
use crate::game::{Score, State};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Node {
    Max,
    Min,
}

/// What the table knows about the current node, re-anchored to the current ply.
struct Cached<A> {
    action: Option<A>,
    score: Score,
    bound: Bound,
    depth: i32,
}

pub(crate) fn score_at_ply(score: Score, ply: i32) -> Score {
    if score >= MATE_BOUND {
        score - ply
    } else if score <= -MATE_BOUND {
        score + ply
    } else {
        score
    }
}

fn score_to_tt(score: Score, ply: i32) -> Score {
    if score >= MATE_BOUND {
        score + ply
    } else if score <= -MATE_BOUND {
        score - ply
    } else {
        score
    }
}

impl<S: State> Engine<S> {
    pub(super) fn max_value(
        &mut self,
        mut alpha: Score,
        mut beta: Score,
        depth: i32,
        ply: i32,
    ) -> Result<Score, Timeout> {
        self.time_check()?;
        let nodes_before = self.nodes;
        self.nodes += 1;
        if depth <= 0 || self.state.is_terminal() {
            return Ok(score_at_ply(self.state.eval(self.player), ply));
        }

        let key = self.state.hash_key();
        let mut try_first = None;
        if let Some(cached) = self.probe(key, depth, ply) {
            if depth <= cached.depth {
                match cached.bound {
                    Bound::Exact => return Ok(cached.score),
                    Bound::Upper => beta = beta.min(cached.score),
                    Bound::Lower => alpha = alpha.max(cached.score),
                }
                if alpha >= beta {
                    return Ok(alpha);
                }
            }
            try_first = cached.action;
        }

        let window_floor = alpha;
        let mut best: Option<(Score, S::Action)> = None;
        let rest = self.state.actions().filter(move |&a| Some(a) != try_first);
        for action in try_first.into_iter().chain(rest) {
            let v = self.descend(action, Node::Min, alpha, beta, depth - 1, ply + 1)?;
            if best.map_or(true, |(b, _)| v > b) {
                best = Some((v, action));
            }
            if v >= beta {
                self.store(key, action, v, Bound::Lower, depth, ply, nodes_before);
                return Ok(v);
            }
            alpha = alpha.max(v);
        }

        let Some((v, action)) = best else {
            return Ok(score_at_ply(self.state.eval(self.player), ply));
        };
        let bound = if v <= window_floor { Bound::Upper } else { Bound::Exact };
        self.store(key, action, v, bound, depth, ply, nodes_before);
        Ok(v)
    }

    pub(super) fn min_value(
        &mut self,
        mut alpha: Score,
        mut beta: Score,
        depth: i32,
        ply: i32,
    ) -> Result<Score, Timeout> {
        self.time_check()?;
        let nodes_before = self.nodes;
        self.nodes += 1;
        if depth <= 0 || self.state.is_terminal() {
            return Ok(score_at_ply(self.state.eval(self.player), ply));
        }

        let key = self.state.hash_key();
        let mut try_first = None;
        if let Some(cached) = self.probe(key, depth, ply) {
            if depth <= cached.depth {
                match cached.bound {
                    Bound::Exact => return Ok(cached.score),
                    Bound::Upper => beta = beta.min(cached.score),
                    Bound::Lower => alpha = alpha.max(cached.score),
                }
                if beta <= alpha {
                    return Ok(beta);
                }
            }
            try_first = cached.action;
        }

        let window_ceiling = beta;
        let mut best: Option<(Score, S::Action)> = None;
        let rest = self.state.actions().filter(move |&a| Some(a) != try_first);
        for action in try_first.into_iter().chain(rest) {
            let v = self.descend(action, Node::Max, alpha, beta, depth - 1, ply + 1)?;
            if best.map_or(true, |(b, _)| v < b) {
                best = Some((v, action));
            }
            if v <= alpha {
                self.store(key, action, v, Bound::Upper, depth, ply, nodes_before);
                return Ok(v);
            }
            beta = beta.min(v);
        }

        let Some((v, action)) = best else {
            return Ok(score_at_ply(self.state.eval(self.player), ply));
        };
        let bound = if v >= window_ceiling { Bound::Lower } else { Bound::Exact };
        self.store(key, action, v, bound, depth, ply, nodes_before);
        Ok(v)
    }

    /// Applies `action`, scores the child and undoes the action again. The undo
    /// happens before a timeout is passed up.
    pub(super) fn descend(
        &mut self,
        action: S::Action,
        node: Node,
        alpha: Score,
        beta: Score,
        depth: i32,
        ply: i32,
    ) -> Result<Score, Timeout> {
        self.state.apply(action);
        let value = match node {
            Node::Max => self.max_value(alpha, beta, depth, ply),
            Node::Min => self.min_value(alpha, beta, depth, ply),
        };
        self.state.undo();
        let value = value?;
        self.time_check()?;
        Ok(value)
    }

    /// Root chooser running a plain full-window search over every action.
    pub(super) fn alpha_beta_choice(&mut self, depth: i32) -> Result<Option<S::Action>, Timeout> {
        let floor = self.state.initial_alpha(self.player);
        match self.alpha_beta_root(floor, depth)? {
            // Every action failed low, so the values are only upper bounds.
            Some((v, _)) if v <= floor && floor > -SCORE_INFINITY => {
                warn!(alpha = floor, "no action reaches the root window floor, reopening it");
                let best = self.alpha_beta_root(-SCORE_INFINITY, depth)?;
                Ok(best.map(|(_, action)| action))
            }
            best => Ok(best.map(|(_, action)| action)),
        }
    }

    fn alpha_beta_root(
        &mut self,
        mut alpha: Score,
        depth: i32,
    ) -> Result<Option<(Score, S::Action)>, Timeout> {
        let beta = self.state.initial_beta(self.player);
        let mut best: Option<(Score, S::Action)> = None;
        for action in self.state.actions() {
            let v = self.descend(action, Node::Min, alpha, beta, depth - 1, 1)?;
            if best.map_or(true, |(b, _)| v > b) {
                best = Some((v, action));
            }
            alpha = alpha.max(v);
        }
        Ok(best)
    }

    fn probe(&self, key: u64, depth: i32, ply: i32) -> Option<Cached<S::Action>> {
        if !self.config.use_transposition_table {
            return None;
        }
        let result = self.table.probe(key)?.pick(&self.state, depth)?;
        let action = if self.config.use_refutation_move {
            self.state.expand(result.best_move)
        } else {
            None
        };
        Some(Cached {
            action,
            score: score_at_ply(result.score, ply),
            bound: result.bound,
            depth: result.depth,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn store(
        &mut self,
        key: u64,
        action: S::Action,
        score: Score,
        bound: Bound,
        depth: i32,
        ply: i32,
        nodes_before: u64,
    ) {
        if !self.config.use_transposition_table {
            return;
        }
        let result = SearchResult {
            key,
            best_move: self.state.compact(action),
            score: score_to_tt(score, ply),
            bound,
            depth,
            nodes: self.nodes - nodes_before,
        };
        self.table.store(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{LOSS_SCORE, WIN_SCORE};

    #[test]
    fn test_mate_scores_shift_towards_neutral_with_ply() {
        assert_eq!(score_at_ply(WIN_SCORE, 3), WIN_SCORE - 3);
        assert_eq!(score_at_ply(LOSS_SCORE, 3), LOSS_SCORE + 3);
        assert_eq!(score_at_ply(42, 3), 42);
    }

    #[test]
    fn test_table_scores_are_node_relative() {
        for (score, ply) in [(WIN_SCORE - 5, 2), (LOSS_SCORE + 7, 4), (-13, 6)] {
            assert_eq!(score_at_ply(score_to_tt(score, ply), ply), score);
        }
        // A win two plies below a node stored at ply 3 reads back as two plies
        // below the same node reached at ply 1.
        let stored = score_to_tt(WIN_SCORE - 5, 3);
        assert_eq!(score_at_ply(stored, 1), WIN_SCORE - 3);
    }
}
