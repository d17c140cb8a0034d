use thiserror::Error;

use crate::game::search::Timeout;
use crate::game::Player;

/// Caller-side contract violations. These are rejected before any search work
/// starts; a budget expiry is never reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot search from a terminal state")]
    TerminalState,
    #[error("it is {actual:?}'s turn, but the engine plays {expected:?}")]
    NotOurTurn { expected: Player, actual: Player },
    #[error("transposition table capacity {capacity} is outside 1..={max}")]
    CapacityOutOfRange { capacity: usize, max: usize },
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
    #[error("illegal action: {0}")]
    IllegalAction(String),
}

/// Failure of a single fixed-depth search: either the call was invalid, or
/// the budget ran out before the search finished.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Timeout(#[from] Timeout),
}
