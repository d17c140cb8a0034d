// src/game/search/bns.rs

//! Best Node Search
//!
//! Instead of computing the exact value of every root action, BNS repeatedly
//! guesses a separation value and runs a zero-window test on each action to
//! learn how many of them reach it. Too few survivors lowers the ceiling of
//! the window, too many raises its floor, and the search stops as soon as a
//! single action is proven better than all the others, or the window is too
//! narrow to separate the survivors. The guess leans towards the upper end of
//! the window when many candidates remain.
//!
//! See D. Rutko, "Fuzzified Algorithm for Game Tree Search with Statistical
//! and Analytical Evaluation", Scientific Papers vol. 770, University of
//! Latvia, 2011.

use tracing::{trace, warn};

use super::alphabeta::Node;
use super::{Engine, Timeout};
use crate::constants::SCORE_INFINITY;
use crate::game::{Score, State};

/// Separation value for the next round of zero-window tests.
pub fn next_guess(alpha: Score, beta: Score, subtree_count: usize) -> Score {
    let n = subtree_count.max(1) as i64;
    let (alpha, beta) = (alpha as i64, beta as i64);
    (alpha + (beta - alpha) * (n - 1) / n) as Score
}

impl<S: State> Engine<S> {
    pub(super) fn best_node_search(&mut self, depth: i32) -> Result<Option<S::Action>, Timeout> {
        if self.state.actions().next().is_none() {
            return Ok(None);
        }
        let mut alpha = self.state.initial_alpha(self.player);
        let mut beta = self.state.initial_beta(self.player);
        let mut subtree_count = self.state.count_relevant_actions();

        loop {
            let test = next_guess(alpha, beta, subtree_count);
            let mut better_count = 0;
            let mut candidate = None;
            for action in self.state.actions() {
                let v = self.descend(action, Node::Min, test - 1, test, depth - 1, 1)?;
                if v >= test {
                    better_count += 1;
                    candidate.get_or_insert(action);
                }
            }
            trace!(depth, test, alpha, beta, subtree_count, better_count, "separation test");

            if better_count == 0 {
                if test <= alpha {
                    // The floor came from the game or from an earlier round, and
                    // no action reaches it now; fall back to an open one.
                    warn!(alpha, "no action reaches the root window floor, reopening it");
                    alpha = -SCORE_INFINITY;
                    subtree_count = self.state.count_relevant_actions();
                    continue;
                }
                beta = test;
            } else if better_count > 1 {
                subtree_count = better_count;
                alpha = test;
            }

            if better_count == 1 || (better_count > 1 && beta - alpha < 2) {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_with_one_subtree_is_the_floor() {
        assert_eq!(next_guess(-10, 10, 1), -10);
        assert_eq!(next_guess(-10, 10, 0), -10);
    }

    #[test]
    fn test_guess_leans_towards_the_ceiling() {
        assert_eq!(next_guess(0, 100, 2), 50);
        assert_eq!(next_guess(0, 100, 4), 75);
        assert_eq!(next_guess(0, 100, 10), 90);
    }

    #[test]
    fn test_guess_handles_the_open_window() {
        let guess = next_guess(-SCORE_INFINITY, SCORE_INFINITY, 9);
        assert!(guess > -SCORE_INFINITY && guess < SCORE_INFINITY);
        assert_eq!(next_guess(-SCORE_INFINITY, SCORE_INFINITY, 2), 0);
    }

    #[test]
    fn test_guess_stays_inside_narrow_windows() {
        for n in 1..20 {
            let guess = next_guess(7, 8, n);
            assert_eq!(guess, 7);
            let guess = next_guess(7, 9, n);
            assert!((7..9).contains(&guess));
        }
    }
}
