// game/mod.rs

pub mod mnk;
pub mod search;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::constants::SCORE_INFINITY;

/// One of the two agents taking turns in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    /// Returns the other player.
    pub fn opponent(self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }
}

pub type Score = i32;

/// The capabilities a game position must offer to be searched.
///
/// The engine owns exactly one live instance and walks the game tree by
/// applying actions and undoing them in reverse order, so `undo` must restore
/// everything `apply` touched: board, side to move and cached outcome.
pub trait State {
    type Action: Copy + Eq + Debug;
    /// A small hashable stand-in for an action, stored in the transposition table.
    type Token: Copy + Eq + Debug;
    type Actions: Iterator<Item = Self::Action>;

    /// The player who has the move.
    fn player(&self) -> Player;

    /// Legal actions in the game's preferred order.
    fn actions(&self) -> Self::Actions;

    fn apply(&mut self, action: Self::Action);

    /// Reverts the most recently applied action.
    fn undo(&mut self);

    /// Heuristic value from `player`'s point of view. A win for `player` must
    /// evaluate to `WIN_SCORE`, a loss to `LOSS_SCORE`, and any undecided
    /// position strictly inside `MATE_BOUND`.
    fn eval(&self, player: Player) -> Score;

    fn is_terminal(&self) -> bool;

    /// Equal positions (board and side to move) hash equally.
    fn hash_key(&self) -> u64;

    fn compact(&self, action: Self::Action) -> Self::Token;

    /// Rebuilds an action from a token relative to this state, if the token
    /// names something meaningful here at all.
    fn expand(&self, token: Self::Token) -> Option<Self::Action>;

    fn is_legal(&self, action: Self::Action) -> bool;

    /// Upper bound on the plies left in the game.
    fn overestimated_height(&self) -> u32;

    /// Number of actions worth considering, also used as a branching estimate.
    fn count_relevant_actions(&self) -> usize;

    fn tt_suggested_capacity(&self) -> usize;

    /// Lower end of the root window. Games with known theoretical values may
    /// tighten it.
    fn initial_alpha(&self, _player: Player) -> Score {
        -SCORE_INFINITY
    }

    fn initial_beta(&self, _player: Player) -> Score {
        SCORE_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_an_involution() {
        for p in [Player::P1, Player::P2] {
            assert_ne!(p.opponent(), p);
            assert_eq!(p.opponent().opponent(), p);
        }
    }
}
