pub mod config;
pub mod constants;
pub mod error;
pub mod game;

pub use error::{EngineError, SearchError};
pub use game::search::{Engine, SearchConfig, SearchStats, Timeout};
pub use game::{Player, Score, State};
