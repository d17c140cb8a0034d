// src/game/search/tt.rs

//! Two-level transposition table.
//!
//! The table is a fixed array of buckets indexed by `hash % capacity`. Each
//! bucket is an [`Entry`] holding up to two [`SearchResult`]s under the
//! TWOBIG1 scheme: a new result that ranks at least as high as the first slot
//! pushes it down to the second, anything else overwrites the second slot.
//! Memory is bounded by the capacity chosen at construction.

use std::cmp::Ordering;

use crate::constants::{MAX_TABLE_CAPACITY, MIN_TABLE_CAPACITY};
use crate::error::EngineError;
use crate::game::{Score, State};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult<T> {
    pub key: u64,
    pub best_move: T,
    pub score: Score,
    pub bound: Bound,
    pub depth: i32,
    pub nodes: u64,
}

impl<T> SearchResult<T> {
    /// Replacement priority: deeper searches first, then exact scores over bounds.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.depth.cmp(&other.depth).then_with(|| {
            let exact = |r: &Self| r.bound == Bound::Exact;
            exact(self).cmp(&exact(other))
        })
    }
}

#[derive(Clone, Debug)]
pub struct Entry<T> {
    first: SearchResult<T>,
    second: Option<SearchResult<T>>,
}

impl<T: Copy> Entry<T> {
    pub fn new(result: SearchResult<T>) -> Self {
        Self { first: result, second: None }
    }

    pub fn first(&self) -> &SearchResult<T> {
        &self.first
    }

    pub fn second(&self) -> Option<&SearchResult<T>> {
        self.second.as_ref()
    }

    pub fn add(&mut self, result: SearchResult<T>) {
        if result.priority_cmp(&self.first) != Ordering::Less {
            self.second = Some(self.first);
            self.first = result;
        } else {
            self.second = Some(result);
        }
    }

    /// Chooses the result to use for `state` when it must be searched to
    /// `depth`. Results belonging to another position, or whose move is not
    /// legal in `state`, are never returned.
    pub fn pick<S>(&self, state: &S, depth: i32) -> Option<&SearchResult<T>>
    where
        S: State<Token = T>,
    {
        let usable = |r: &SearchResult<T>| {
            r.key == state.hash_key()
                && state
                    .expand(r.best_move)
                    .is_some_and(|action| state.is_legal(action))
        };
        let first = Some(&self.first).filter(|r| usable(r));
        let second = self.second.as_ref().filter(|r| usable(r));

        let (first, second) = match (first, second) {
            (None, second) => return second,
            (first, None) => return first,
            (Some(first), Some(second)) => (first, second),
        };
        let deep_enough = |r: &SearchResult<T>| depth <= r.depth;
        if deep_enough(first) && first.bound == Bound::Exact {
            return Some(first);
        }
        if deep_enough(second) && second.bound == Bound::Exact {
            return Some(second);
        }
        if deep_enough(first) {
            return Some(first);
        }
        if deep_enough(second) {
            return Some(second);
        }
        Some(first)
    }
}

pub struct TranspositionTable<T> {
    buckets: Vec<Option<Entry<T>>>,
}

impl<T: Copy> TranspositionTable<T> {
    pub fn new(capacity: usize) -> Result<Self, EngineError> {
        if !(MIN_TABLE_CAPACITY..=MAX_TABLE_CAPACITY).contains(&capacity) {
            return Err(EngineError::CapacityOutOfRange {
                capacity,
                max: MAX_TABLE_CAPACITY,
            });
        }
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, || None);
        Ok(Self { buckets })
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn index(&self, key: u64) -> usize {
        (key % self.buckets.len() as u64) as usize
    }

    pub fn probe(&self, key: u64) -> Option<&Entry<T>> {
        self.buckets[self.index(key)].as_ref()
    }

    pub fn store(&mut self, result: SearchResult<T>) {
        let index = self.index(result.key);
        match &mut self.buckets[index] {
            Some(entry) => entry.add(result),
            slot => *slot = Some(Entry::new(result)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::mnk::Board;

    fn result(key: u64, depth: i32, bound: Bound) -> SearchResult<u16> {
        SearchResult { key, best_move: 0, score: 0, bound, depth, nodes: 1 }
    }

    #[test]
    fn test_deeper_result_ranks_higher() {
        let shallow = result(1, 2, Bound::Exact);
        let deep = result(1, 3, Bound::Lower);
        assert_eq!(deep.priority_cmp(&shallow), Ordering::Greater);
    }

    #[test]
    fn test_exact_breaks_depth_ties() {
        let exact = result(1, 4, Bound::Exact);
        let lower = result(1, 4, Bound::Lower);
        let upper = result(1, 4, Bound::Upper);
        assert_eq!(exact.priority_cmp(&lower), Ordering::Greater);
        assert_eq!(upper.priority_cmp(&exact), Ordering::Less);
        assert_eq!(lower.priority_cmp(&upper), Ordering::Equal);
    }

    #[test]
    fn test_twobig1_keeps_the_two_deepest() {
        let mut entry = Entry::new(result(1, 1, Bound::Exact));
        entry.add(result(2, 2, Bound::Exact));
        entry.add(result(3, 3, Bound::Exact));
        assert_eq!(entry.first().depth, 3);
        assert_eq!(entry.second().map(|r| r.depth), Some(2));
    }

    #[test]
    fn test_shallower_result_evicts_second_slot_only() {
        let mut entry = Entry::new(result(1, 5, Bound::Exact));
        entry.add(result(2, 3, Bound::Exact));
        entry.add(result(3, 1, Bound::Upper));
        assert_eq!(entry.first().key, 1);
        assert_eq!(entry.second().map(|r| r.key), Some(3));
        assert_ne!(entry.second().map(|r| r.priority_cmp(entry.first())), Some(Ordering::Greater));
    }

    #[test]
    fn test_pick_ignores_foreign_positions() {
        let board = Board::new(3, 3, 3).unwrap();
        let entry = Entry::new(result(board.hash_key() ^ 1, 9, Bound::Exact));
        assert!(entry.pick(&board, 1).is_none());
    }

    #[test]
    fn test_pick_discards_illegal_moves() {
        let mut board = Board::new(3, 3, 3).unwrap();
        board.apply(board.cell(1, 1).unwrap());
        let key = board.hash_key();
        // Token 4 is the centre, already occupied.
        let mut entry = Entry::new(SearchResult { best_move: 4, ..result(key, 6, Bound::Exact) });
        entry.add(SearchResult { best_move: 0, ..result(key, 2, Bound::Lower) });
        let picked = entry.pick(&board, 1).unwrap();
        assert_eq!(picked.best_move, 0);
    }

    #[test]
    fn test_pick_prefers_deep_enough_exact() {
        let board = Board::new(3, 3, 3).unwrap();
        let key = board.hash_key();
        let mut entry = Entry::new(result(key, 5, Bound::Lower));
        entry.add(result(key, 4, Bound::Exact));
        assert_eq!(entry.pick(&board, 4).unwrap().bound, Bound::Exact);
        assert_eq!(entry.pick(&board, 5).unwrap().bound, Bound::Lower);
        assert_eq!(entry.pick(&board, 7).unwrap().depth, 5);
    }

    #[test]
    fn test_table_rejects_bad_capacity() {
        assert!(TranspositionTable::<u16>::new(0).is_err());
        assert!(TranspositionTable::<u16>::new(MAX_TABLE_CAPACITY + 1).is_err());
        assert_eq!(TranspositionTable::<u16>::new(7).unwrap().capacity(), 7);
    }

    #[test]
    fn test_table_buckets_by_modulo() {
        let mut table = TranspositionTable::new(4).unwrap();
        table.store(result(1, 1, Bound::Exact));
        table.store(result(5, 2, Bound::Exact));
        let entry = table.probe(9).unwrap();
        assert_eq!(entry.first().key, 5);
        assert_eq!(entry.second().map(|r| r.key), Some(1));
        assert!(table.probe(2).is_none());
    }
}
