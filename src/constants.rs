// Scores
pub const WIN_SCORE: i32 = 1_000_000;
pub const LOSS_SCORE: i32 = -WIN_SCORE;
pub const DRAW_SCORE: i32 = 0;
pub const SCORE_INFINITY: i32 = WIN_SCORE + 1;

// Decided outcomes live in the band beyond MATE_BOUND; heuristics stay inside it.
pub const MAX_PLY: i32 = 4096;
pub const MATE_BOUND: i32 = WIN_SCORE - MAX_PLY;

// Search
pub const TIME_RELAXATION: f32 = 0.94;
pub const IMMEDIATE_SEARCH_THRESHOLD: usize = 100;
pub const DEFAULT_TIME_LIMIT_MS: u64 = 1000;

// Transposition table
pub const MIN_TABLE_CAPACITY: usize = 1;
pub const MAX_TABLE_CAPACITY: usize = 1 << 24;
