//! Line-based heuristic for undecided m,n,k positions.
//!
//! Every window of k consecutive cells along a row, column, diagonal or
//! anti-diagonal that holds marks of a single player is still winnable by that
//! player; it contributes `2^count - 1` to them. The result is the player's
//! total minus the opponent's.

use super::{Board, DIRECTIONS};
use crate::constants::MATE_BOUND;
use crate::game::{Player, Score};

pub fn evaluate(board: &Board, player: Player) -> Score {
    let (own, other) = potentials(board, player);
    (own - other).clamp(-(MATE_BOUND as i64 - 1), MATE_BOUND as i64 - 1) as Score
}

/// Sums window potentials for `player` and for the opponent.
fn potentials(board: &Board, player: Player) -> (i64, i64) {
    let k = board.k() as isize;
    let mut own = 0i64;
    let mut other = 0i64;

    for row in 0..board.rows() as isize {
        for col in 0..board.cols() as isize {
            for &(dr, dc) in &DIRECTIONS {
                // Only windows that fit entirely on the board.
                if board.mark_at(row + (k - 1) * dr, col + (k - 1) * dc).is_none() {
                    continue;
                }
                let (mut mine, mut theirs) = (0u32, 0u32);
                for step in 0..k {
                    match board.mark_at(row + step * dr, col + step * dc).flatten() {
                        Some(p) if p == player => mine += 1,
                        Some(_) => theirs += 1,
                        None => {}
                    }
                }
                match (mine, theirs) {
                    (0, 0) => {}
                    (m, 0) => own += weight(m),
                    (0, t) => other += weight(t),
                    _ => {}
                }
            }
        }
    }
    (own, other)
}

fn weight(count: u32) -> i64 {
    (1i64 << count.min(40)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::State;

    #[test]
    fn test_empty_board_is_balanced() {
        let board = Board::new(3, 3, 3).unwrap();
        assert_eq!(evaluate(&board, Player::P1), 0);
        assert_eq!(evaluate(&board, Player::P2), 0);
    }

    #[test]
    fn test_centre_counts_more_than_corner() {
        let mut centre = Board::new(3, 3, 3).unwrap();
        centre.apply(centre.cell(1, 1).unwrap());
        let mut corner = Board::new(3, 3, 3).unwrap();
        corner.apply(corner.cell(0, 0).unwrap());
        // Centre sits on 4 lines, a corner on 3.
        assert_eq!(evaluate(&centre, Player::P1), 4);
        assert_eq!(evaluate(&corner, Player::P1), 3);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let mut board = Board::new(4, 4, 3).unwrap();
        for (r, c) in [(1, 1), (0, 0), (2, 1), (3, 3)] {
            board.apply(board.cell(r, c).unwrap());
        }
        assert_eq!(evaluate(&board, Player::P1), -evaluate(&board, Player::P2));
    }

    #[test]
    fn test_blocked_windows_score_nothing() {
        let mut board = Board::new(1, 3, 3).unwrap();
        board.apply(board.cell(0, 0).unwrap());
        board.apply(board.cell(0, 1).unwrap());
        assert_eq!(evaluate(&board, Player::P1), 0);
    }
}
