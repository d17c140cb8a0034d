// game/mnk/mod.rs

//! The m,n,k-game: two players alternately claim cells of an m × n grid and
//! the first to line up k of their own marks horizontally, vertically or
//! diagonally wins. Tic-tac-toe is the 3,3,3 instance.

pub mod evaluation;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;

use crate::constants::{DRAW_SCORE, LOSS_SCORE, WIN_SCORE};
use crate::game::{Player, Score, State};

const ZOBRIST_SEED: u64 = 0x6d6e_6b5f_7a6f_6272;
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board {rows}x{cols} with k = {k}")]
    InvalidDimensions { rows: usize, cols: usize, k: usize },
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell {0} is already taken")]
    Occupied(Cell),
    #[error("the game is already over")]
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    k: usize,
    cells: Vec<Option<Player>>,
    history: Vec<usize>,
    winner: Option<Player>,
    hash: u64,
    zobrist: Vec<[u64; 2]>,
    zobrist_side: u64,
    // Cell indices from the centre outwards; action enumeration follows it.
    order: Vec<usize>,
}

impl Board {
    pub fn new(rows: usize, cols: usize, k: usize) -> Result<Self, BoardError> {
        let size = rows.saturating_mul(cols);
        if rows == 0 || cols == 0 || k == 0 || size > u16::MAX as usize {
            return Err(BoardError::InvalidDimensions { rows, cols, k });
        }

        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let zobrist = (0..size).map(|_| [rng.gen(), rng.gen()]).collect();
        let zobrist_side = rng.gen();

        let centre = |i: usize| {
            let (r, c) = ((i / cols) as isize, (i % cols) as isize);
            let dr = 2 * r - (rows as isize - 1);
            let dc = 2 * c - (cols as isize - 1);
            dr.abs().max(dc.abs()) * 4 + dr.abs() + dc.abs()
        };
        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by_key(|&i| centre(i));

        Ok(Self {
            rows,
            cols,
            k,
            cells: vec![None; size],
            history: Vec::with_capacity(size),
            winner: None,
            hash: 0,
            zobrist,
            zobrist_side,
            order,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<Cell, BoardError> {
        if row >= self.rows || col >= self.cols {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Cell { row, col })
    }

    pub fn get(&self, cell: Cell) -> Option<Player> {
        self.cells[self.index(cell)]
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn free_cells(&self) -> usize {
        self.cells.len() - self.history.len()
    }

    /// Plays `cell` for the side to move after checking it is legal.
    pub fn play(&mut self, cell: Cell) -> Result<(), BoardError> {
        self.cell(cell.row, cell.col)?;
        if self.is_terminal() {
            return Err(BoardError::GameOver);
        }
        if self.get(cell).is_some() {
            return Err(BoardError::Occupied(cell));
        }
        self.apply(cell);
        Ok(())
    }

    fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    fn cell_at(&self, index: usize) -> Cell {
        Cell { row: index / self.cols, col: index % self.cols }
    }

    pub(crate) fn mark_at(&self, row: isize, col: isize) -> Option<Option<Player>> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(self.cells[row as usize * self.cols + col as usize])
    }

    fn completes_line(&self, cell: Cell, player: Player) -> bool {
        let (row, col) = (cell.row as isize, cell.col as isize);
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = |sign: isize| {
                (1..)
                    .take_while(|&step| {
                        self.mark_at(row + sign * step * dr, col + sign * step * dc) == Some(Some(player))
                    })
                    .count()
            };
            1 + run(1) + run(-1) >= self.k
        })
    }

    fn zobrist_key(&self, index: usize, player: Player) -> u64 {
        self.zobrist[index][player as usize]
    }
}

impl State for Board {
    type Action = Cell;
    type Token = u16;
    type Actions = std::vec::IntoIter<Cell>;

    fn player(&self) -> Player {
        if self.history.len() % 2 == 0 {
            Player::P1
        } else {
            Player::P2
        }
    }

    fn actions(&self) -> Self::Actions {
        if self.is_terminal() {
            return Vec::new().into_iter();
        }
        self.order
            .iter()
            .filter(|&&i| self.cells[i].is_none())
            .map(|&i| self.cell_at(i))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn apply(&mut self, action: Cell) {
        debug_assert!(self.is_legal(action), "illegal action {action}");
        let player = self.player();
        let index = self.index(action);
        self.cells[index] = Some(player);
        self.history.push(index);
        self.hash ^= self.zobrist_key(index, player) ^ self.zobrist_side;
        if self.completes_line(action, player) {
            self.winner = Some(player);
        }
    }

    fn undo(&mut self) {
        let Some(index) = self.history.pop() else {
            return;
        };
        let player = self.player();
        self.cells[index] = None;
        self.hash ^= self.zobrist_key(index, player) ^ self.zobrist_side;
        // Moves are only ever made on undecided boards.
        self.winner = None;
    }

    fn eval(&self, player: Player) -> Score {
        match self.winner {
            Some(winner) if winner == player => WIN_SCORE,
            Some(_) => LOSS_SCORE,
            None if self.free_cells() == 0 => DRAW_SCORE,
            None => evaluation::evaluate(self, player),
        }
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.free_cells() == 0
    }

    fn hash_key(&self) -> u64 {
        self.hash
    }

    fn compact(&self, action: Cell) -> u16 {
        self.index(action) as u16
    }

    fn expand(&self, token: u16) -> Option<Cell> {
        let index = token as usize;
        (index < self.cells.len()).then(|| self.cell_at(index))
    }

    fn is_legal(&self, action: Cell) -> bool {
        action.row < self.rows
            && action.col < self.cols
            && self.get(action).is_none()
            && !self.is_terminal()
    }

    fn overestimated_height(&self) -> u32 {
        self.free_cells() as u32
    }

    fn count_relevant_actions(&self) -> usize {
        self.free_cells()
    }

    fn tt_suggested_capacity(&self) -> usize {
        (self.cells.len() * self.cells.len() * 64).clamp(1 << 10, 1 << 20)
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.k == other.k
            && self.cells == other.cells
            && self.history == other.history
            && self.winner == other.winner
            && self.hash == other.hash
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = (0..self.cols)
                .map(|col| match self.cells[row * self.cols + col] {
                    Some(Player::P1) => 'X',
                    Some(Player::P2) => 'O',
                    None => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
