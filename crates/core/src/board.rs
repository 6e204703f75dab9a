//! Board module - manages the gem grid
//!
//! The board is a `rows x cols` grid of [`Tile`] values stored in a flat,
//! row-major `Vec` that is allocated once and mutated in place for the whole
//! session. Coordinates are `(row, col)` with row 0 at the top; gravity pulls
//! tiles towards the bottom row.
//!
//! The board only knows how to rearrange tiles. Whether a swap is worth keeping
//! is decided by the caller with a [`MatchDetector`], which makes the
//! "swap, test, swap back" pattern possible without an undo log.

use std::fmt;

use arrayvec::ArrayVec;
use log::{info, warn};

use crate::config::EngineConfig;
use crate::error::{Match3Error, Result};
use crate::matcher::MatchDetector;
use crate::rng::RandomSource;
use crate::types::{GemKind, Position, Tile, TileMove, MIN_DIMENSION};

/// Gem kinds still allowed in a slot during generation
type Candidates = ArrayVec<GemKind, { GemKind::COUNT }>;

/// The game board - `rows x cols` tiles using flat storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Flat array of tiles, row-major order (row * cols + col)
    cells: Vec<Tile>,
}

impl Board {
    /// Create a board with every slot empty
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Tile::EMPTY; rows * cols],
        }
    }

    /// Build a freshly generated board with no ready-made matches
    pub fn initialize<R: RandomSource>(config: &EngineConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let mut board = Self::empty(config.rows, config.cols);
        board.generate(config, rng);
        Ok(board)
    }

    /// Regenerate every slot in place, keeping the current dimensions
    pub fn reinitialize<R: RandomSource>(&mut self, config: &EngineConfig, rng: &mut R) -> Result<()> {
        config.validate()?;
        if config.rows != self.rows || config.cols != self.cols {
            *self = Self::empty(config.rows, config.cols);
        }
        self.generate(config, rng);
        Ok(())
    }

    /// Build a board from explicit rows (top row first)
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height < MIN_DIMENSION || width < MIN_DIMENSION {
            return Err(Match3Error::Configuration(format!(
                "board must be at least {MIN_DIMENSION}x{MIN_DIMENSION}, got {height}x{width}"
            )));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(Match3Error::Configuration(format!(
                "row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }
        Ok(Self {
            rows: height,
            cols: width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Parse a board from one line of gem symbols per row, `.` for empty.
    ///
    /// ```
    /// use match3_core::Board;
    /// use match3_types::GemKind;
    ///
    /// let board = Board::parse("RGB\nGBR\nBRG").unwrap();
    /// assert_eq!(board.get(1, 2).and_then(|t| t.kind), Some(GemKind::Red));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let rows = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        '.' => Ok(Tile::EMPTY),
                        other => GemKind::from_str(&other.to_string())
                            .map(Tile::gem)
                            .ok_or_else(|| {
                                Match3Error::Configuration(format!("unknown gem symbol '{other}'"))
                            }),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }

    /// Calculate flat index from (row, col)
    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        self.index(pos.row, pos.col).ok_or(Match3Error::OutOfRange {
            row: pos.row,
            col: pos.col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get tile at (row, col).
    /// Returns None if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    pub fn tile(&self, pos: Position) -> Option<Tile> {
        self.get(pos.row, pos.col)
    }

    /// Set tile at (row, col).
    /// Returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, tile: Tile) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = tile;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos.row, pos.col).is_some()
    }

    /// Check that `pos` is on the board
    pub fn check(&self, pos: Position) -> Result<()> {
        self.checked_index(pos).map(|_| ())
    }

    /// Edge-sharing neighbours; diagonals are never adjacent
    pub fn are_adjacent(&self, a: Position, b: Position) -> bool {
        a.is_adjacent(b)
    }

    /// Exchange two adjacent tiles.
    ///
    /// This is the raw exchange only; it says nothing about whether a match formed.
    pub fn try_swap(&mut self, a: Position, b: Position) -> Result<()> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        if !self.are_adjacent(a, b) {
            return Err(Match3Error::NotAdjacent { a, b });
        }
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Boolean form of [`Board::try_swap`]; false means nothing changed
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        self.try_swap(a, b).is_ok()
    }

    /// Tile that would sit at `pos` if `a` and `b` were exchanged
    pub fn tile_after_swap(&self, pos: Position, (a, b): (Position, Position)) -> Option<Tile> {
        if pos == a {
            self.tile(b)
        } else if pos == b {
            self.tile(a)
        } else {
            self.tile(pos)
        }
    }

    /// Empty every listed slot. Returns how many slots were actually cleared.
    pub fn remove_at(&mut self, positions: &[Position]) -> usize {
        let mut removed = 0;
        for &pos in positions {
            if let Some(idx) = self.index(pos.row, pos.col) {
                if !self.cells[idx].is_empty() {
                    self.cells[idx] = Tile::EMPTY;
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Compact each column towards the bottom, keeping stack order.
    ///
    /// Columns are independent. Returns every tile that moved, bottom-most first
    /// within each column.
    pub fn apply_gravity(&mut self) -> Vec<TileMove> {
        let mut moves = Vec::new();

        for col in 0..self.cols {
            let mut write_row = self.rows;
            for read_row in (0..self.rows).rev() {
                let read_idx = read_row * self.cols + col;
                if self.cells[read_idx].is_empty() {
                    continue;
                }
                write_row -= 1;
                if write_row != read_row {
                    let write_idx = write_row * self.cols + col;
                    self.cells[write_idx] = self.cells[read_idx];
                    self.cells[read_idx] = Tile::EMPTY;
                    moves.push(TileMove {
                        from: Position::new(read_row, col),
                        to: Position::new(write_row, col),
                    });
                }
            }
        }

        moves
    }

    /// Give every empty slot a uniformly random gem. Returns the filled positions.
    pub fn fill_empty_slots<R: RandomSource>(&mut self, gem_types: u8, rng: &mut R) -> Vec<Position> {
        let mut spawned = Vec::new();
        for idx in 0..self.cells.len() {
            if self.cells[idx].is_empty() {
                self.cells[idx] = Tile::gem(rng.next_gem(gem_types));
                spawned.push(Position::new(idx / self.cols, idx % self.cols));
            }
        }
        spawned
    }

    /// Whether swapping `a` and `b` would put either tile into a match
    pub fn would_swap_match(&self, a: Position, b: Position, detector: &MatchDetector) -> bool {
        if !self.contains(a) || !self.contains(b) || !self.are_adjacent(a, b) {
            return false;
        }
        detector.has_match_at_after_swap(self, a, (a, b))
            || detector.has_match_at_after_swap(self, b, (a, b))
    }

    /// First swap (scanning right and down from the top-left) that forms a match
    pub fn find_hint(&self, detector: &MatchDetector) -> Option<(Position, Position)> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let here = Position::new(row, col);
                if col + 1 < self.cols {
                    let right = Position::new(row, col + 1);
                    if self.would_swap_match(here, right, detector) {
                        return Some((here, right));
                    }
                }
                if row + 1 < self.rows {
                    let down = Position::new(row + 1, col);
                    if self.would_swap_match(here, down, detector) {
                        return Some((here, down));
                    }
                }
            }
        }
        None
    }

    /// False means the board is stuck
    pub fn has_any_possible_move(&self, detector: &MatchDetector) -> bool {
        self.find_hint(detector).is_some()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|t| t.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.count_empty() == 0
    }

    /// Get a reference to the internal tiles, row-major
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Rows of tiles, top row first
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.cols.max(1)).map(<[Tile]>::to_vec).collect()
    }

    fn generate<R: RandomSource>(&mut self, config: &EngineConfig, rng: &mut R) {
        info!(
            "Generating {}x{} board with {} gem types",
            self.rows, self.cols, config.gem_types
        );
        self.cells.fill(Tile::EMPTY);

        // Row-major order means only the left and upper neighbours are known yet.
        for row in 0..self.rows {
            for col in 0..self.cols {
                let kind = self.pick_kind(row, col, config.gem_types, false, rng);
                self.cells[row * self.cols + col] = Tile::gem(kind);
            }
        }

        let detector = MatchDetector::new(config.min_match);
        let mut matches = detector.detect_all(self);
        let mut attempts = 0;
        while !matches.is_empty() && attempts < config.max_init_attempts {
            for pos in matches.iter().flat_map(|g| g.positions.iter()) {
                let kind = self.pick_kind(pos.row, pos.col, config.gem_types, true, rng);
                self.cells[pos.row * self.cols + pos.col] = Tile::gem(kind);
            }
            matches = detector.detect_all(self);
            attempts += 1;
        }

        if !matches.is_empty() {
            warn!(
                "Board generation left {} match groups after {} re-roll attempts",
                matches.len(),
                attempts
            );
        }
    }

    /// Random kind for (row, col) that avoids completing a run of three.
    ///
    /// Falls back to the whole palette if every kind is excluded.
    fn pick_kind<R: RandomSource>(
        &self,
        row: usize,
        col: usize,
        gem_types: u8,
        all_sides: bool,
        rng: &mut R,
    ) -> GemKind {
        let excluded = self.run_completions(row, col, all_sides);
        let palette = &GemKind::ALL[..(gem_types as usize).min(GemKind::COUNT)];

        let candidates: Candidates = palette
            .iter()
            .copied()
            .filter(|k| !excluded.contains(k))
            .collect();

        match rng.choose(&candidates) {
            Some(kind) => kind,
            None => rng.next_gem(gem_types),
        }
    }

    /// Kinds that would complete a run of three through (row, col).
    ///
    /// Generation only looks left and up. Re-rolls also look right, down, and
    /// across the slot.
    fn run_completions(&self, row: usize, col: usize, all_sides: bool) -> Candidates {
        let r = row as isize;
        let c = col as isize;
        let mut pairs: ArrayVec<[(isize, isize); 2], 6> = ArrayVec::new();
        pairs.push([(r, c - 1), (r, c - 2)]);
        pairs.push([(r - 1, c), (r - 2, c)]);
        if all_sides {
            pairs.push([(r, c + 1), (r, c + 2)]);
            pairs.push([(r + 1, c), (r + 2, c)]);
            pairs.push([(r, c - 1), (r, c + 1)]);
            pairs.push([(r - 1, c), (r + 1, c)]);
        }

        let mut excluded = Candidates::new();
        for [(r1, c1), (r2, c2)] in pairs {
            let (Some(a), Some(b)) = (self.signed_get(r1, c1), self.signed_get(r2, c2)) else {
                continue;
            };
            if let (true, Some(kind)) = (a.matches(&b), a.kind) {
                if !excluded.contains(&kind) {
                    excluded.push(kind);
                }
            }
        }
        excluded
    }

    fn signed_get(&self, row: isize, col: isize) -> Option<Tile> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            let line: String = row.iter().map(Tile::symbol).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
