//! Read-only copies of the game for renderers, drivers and traces.
//!
//! Snapshots own their data so a host can keep one around while the engine
//! keeps running. [`GameState::snapshot_into`](crate::GameState::snapshot_into)
//! refills an existing snapshot and reuses its tile buffer.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::{Position, SessionState, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `rows * cols` entries
    pub tiles: Vec<Tile>,
}

impl BoardSnapshot {
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get(row * self.cols + col).copied()
    }

    /// Overwrite with the contents of `board`
    pub fn copy_from(&mut self, board: &Board) {
        self.rows = board.rows();
        self.cols = board.cols();
        self.tiles.clear();
        self.tiles.extend_from_slice(board.cells());
    }

    /// Tiles grouped by row, top row first
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        if self.cols == 0 {
            return Vec::new();
        }
        self.tiles.chunks(self.cols).map(<[Tile]>::to_vec).collect()
    }
}

impl From<&Board> for BoardSnapshot {
    fn from(board: &Board) -> Self {
        let mut s = Self::default();
        s.copy_from(board);
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    pub session: SessionState,
    pub episode_id: u32,
    pub seed: u32,
    /// A matching swap, present only while the engine waits for input
    pub hint: Option<(Position, Position)>,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.session.phase.accepts_input()
    }
}
