// src/search/table.rs

use rustc_hash::FxHashMap;

use crate::game::board::Board;
use crate::search::eval::EvalRecord;

// ------------------- cache sizing ---------------------

/// Entry count beyond which the whole table is discarded. Records are only
/// useful within one search generation, so wholesale replacement beats
/// fine-grained eviction here.
pub const TRIM_TABLE_SIZE: usize = 10_000_000;

/// Board-keyed evaluation cache shared across the search tree. The board
/// itself is the key; its hash covers all 64 cell bytes and the side to
/// move, so positions differing only in castling or en-passant rights are
/// distinct entries.
pub struct TranspositionCache {
    entries: FxHashMap<Board, EvalRecord>,
}

impl TranspositionCache {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, board: &Board) -> Option<&EvalRecord> {
        self.entries.get(board)
    }

    #[inline]
    pub fn get_mut(&mut self, board: &Board) -> Option<&mut EvalRecord> {
        self.entries.get_mut(board)
    }

    /// Returns the record for `board`, inserting the result of `init` on a
    /// miss.
    #[inline]
    pub fn get_or_insert_with<F>(&mut self, board: &Board, init: F) -> &mut EvalRecord
    where
        F: FnOnce() -> EvalRecord,
    {
        self.entries.entry(*board).or_insert_with(init)
    }

    pub fn trim_if_oversized(&mut self) {
        if self.entries.len() > TRIM_TABLE_SIZE {
            self.entries = FxHashMap::default();
        }
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TranspositionCache {
    fn default() -> Self {
        Self::new()
    }
}
