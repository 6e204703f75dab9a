//! Match detection - run-length scans over rows and columns
//!
//! [`MatchDetector::detect_all`] walks every row and every column once and
//! reports each maximal same-kind run of at least `min_match` tiles. A run
//! ends at a kind change, an empty slot, or an unmatchable tile.
//!
//! [`MatchDetector::has_match_at`] is the cheap local query used by swap
//! validation, generation and the stuck-board search: it only walks the row
//! and column through one cell.

use crate::board::Board;
use crate::types::{MatchGroup, Orientation, Position, Tile, MIN_MATCH};

/// Stateless scanner parameterised by the run threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDetector {
    min_match: usize,
}

impl MatchDetector {
    pub fn new(min_match: usize) -> Self {
        Self { min_match }
    }

    pub fn min_match(&self) -> usize {
        self.min_match
    }

    /// All maximal runs, horizontal groups first (top to bottom), then vertical
    /// groups (left to right).
    ///
    /// A cell at the corner of an L or T shape appears in both its horizontal
    /// and its vertical group.
    pub fn detect_all(&self, board: &Board) -> Vec<MatchGroup> {
        let mut groups = Vec::new();
        let mut line = Vec::with_capacity(board.rows().max(board.cols()));

        for row in 0..board.rows() {
            line.clear();
            line.extend((0..board.cols()).map(|col| Position::new(row, col)));
            self.scan_line(board, &line, Orientation::Horizontal, &mut groups);
        }

        for col in 0..board.cols() {
            line.clear();
            line.extend((0..board.rows()).map(|row| Position::new(row, col)));
            self.scan_line(board, &line, Orientation::Vertical, &mut groups);
        }

        groups
    }

    fn scan_line(
        &self,
        board: &Board,
        line: &[Position],
        orientation: Orientation,
        out: &mut Vec<MatchGroup>,
    ) {
        let mut start = 0;
        while start < line.len() {
            let tile = board.tile(line[start]).unwrap_or(Tile::EMPTY);
            let mut end = start + 1;
            while end < line.len() && board.tile(line[end]).is_some_and(|t| t.matches(&tile)) {
                end += 1;
            }

            if end - start >= self.min_match {
                if let Some(kind) = tile.kind {
                    out.push(MatchGroup {
                        kind,
                        orientation,
                        positions: line[start..end].to_vec(),
                    });
                }
            }
            start = end;
        }
    }

    /// Whether the tile at `pos` is part of a run along its row or column
    pub fn has_match_at(&self, board: &Board, pos: Position) -> bool {
        self.has_match_with(|p| board.tile(p), pos)
    }

    /// Like [`MatchDetector::has_match_at`], evaluated as if `swap` had been
    /// applied. The board itself is not touched.
    pub fn has_match_at_after_swap(
        &self,
        board: &Board,
        pos: Position,
        swap: (Position, Position),
    ) -> bool {
        self.has_match_with(|p| board.tile_after_swap(p, swap), pos)
    }

    fn has_match_with<F>(&self, lookup: F, pos: Position) -> bool
    where
        F: Fn(Position) -> Option<Tile>,
    {
        let Some(tile) = lookup(pos) else {
            return false;
        };
        if tile.is_empty() || !tile.matchable {
            return false;
        }
        let same = |p: Position| lookup(p).is_some_and(|t| t.matches(&tile));

        // Horizontal: left, then right
        let mut count = 1;
        let mut col = pos.col;
        while col > 0 && same(Position::new(pos.row, col - 1)) {
            count += 1;
            col -= 1;
        }
        let mut col = pos.col + 1;
        while same(Position::new(pos.row, col)) {
            count += 1;
            col += 1;
        }
        if count >= self.min_match {
            return true;
        }

        // Vertical: up, then down
        let mut count = 1;
        let mut row = pos.row;
        while row > 0 && same(Position::new(row - 1, pos.col)) {
            count += 1;
            row -= 1;
        }
        let mut row = pos.row + 1;
        while same(Position::new(row, pos.col)) {
            count += 1;
            row += 1;
        }
        count >= self.min_match
    }
}

impl Default for MatchDetector {
    fn default() -> Self {
        Self::new(MIN_MATCH)
    }
}
