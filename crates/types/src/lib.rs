//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behaviour beyond small helpers, making them
//! usable in any context (core logic, animation hosts, headless drivers, JSON traces).
//!
//! # Coordinates
//!
//! Positions are `(row, col)` pairs with row 0 at the top of the board and
//! col 0 at the left. Gravity pulls tiles towards higher row indices.
//!
//! # Engine Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_ROWS` | 8 | Board rows |
//! | `DEFAULT_COLS` | 8 | Board columns |
//! | `DEFAULT_GEM_TYPES` | 6 | Distinct gem kinds in play |
//! | `MIN_MATCH` | 3 | Shortest run that counts as a match |
//! | `MAX_CASCADE_PASSES` | 1000 | Matching passes allowed in one turn |
//! | `MAX_INIT_ATTEMPTS` | 100 | Re-roll rounds when generating a board |
//! | `BASE_SCORE` | 50 | Points per matched gem |
//! | `COMBO_PERCENT` | 150 | Extra percentage per combo step after the first |
//!
//! # Examples
//!
//! ```
//! use match3_types::{GemKind, Phase, Position, Tile};
//!
//! let tile = Tile::gem(GemKind::Red);
//! assert!(tile.matches(&Tile::gem(GemKind::Red)));
//! assert!(!tile.matches(&Tile::EMPTY));
//!
//! assert_eq!(GemKind::from_str("blue"), Some(GemKind::Blue));
//! assert!(Position::new(2, 3).is_adjacent(Position::new(2, 4)));
//! assert!(Phase::Idle.accepts_input());
//! ```

use serde::{Deserialize, Serialize};

/// Default board rows
pub const DEFAULT_ROWS: usize = 8;

/// Default board columns
pub const DEFAULT_COLS: usize = 8;

/// Default number of gem kinds in play
pub const DEFAULT_GEM_TYPES: u8 = 6;

/// Smallest board edge and smallest gem palette that can ever produce a run of three
pub const MIN_DIMENSION: usize = 3;

/// Run length threshold for a match
pub const MIN_MATCH: usize = 3;

/// Defensive cap on matching passes per turn
pub const MAX_CASCADE_PASSES: u32 = 1000;

/// Re-roll rounds allowed while removing leftover matches from a fresh board
pub const MAX_INIT_ATTEMPTS: u32 = 100;

/// Points per matched gem (multiplier rule)
pub const BASE_SCORE: u32 = 50;

/// Additional percent per combo step after the first (1.5x per step)
pub const COMBO_PERCENT: u32 = 150;

/// Points per matched gem (additive rule)
pub const ADDITIVE_GEM_SCORE: u32 = 10;

/// Flat bonus per combo index (additive rule)
pub const ADDITIVE_COMBO_SCORE: u32 = 50;

/// The gem kinds a board can be populated with
///
/// A board configured with `n` gem types uses the first `n` entries of [`GemKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemKind {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    Orange,
    White,
}

impl GemKind {
    /// Every gem kind, in palette order
    pub const ALL: [GemKind; 8] = [
        GemKind::Red,
        GemKind::Green,
        GemKind::Blue,
        GemKind::Yellow,
        GemKind::Purple,
        GemKind::Cyan,
        GemKind::Orange,
        GemKind::White,
    ];

    /// Largest palette a board may be configured with
    pub const COUNT: usize = Self::ALL.len();

    /// Palette entry at `index`, if any
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this kind in the palette
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse gem kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::GemKind;
    ///
    /// assert_eq!(GemKind::from_str("Red"), Some(GemKind::Red));
    /// assert_eq!(GemKind::from_str("p"), Some(GemKind::Purple));
    /// assert_eq!(GemKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(GemKind::Red),
            "green" | "g" => Some(GemKind::Green),
            "blue" | "b" => Some(GemKind::Blue),
            "yellow" | "y" => Some(GemKind::Yellow),
            "purple" | "p" => Some(GemKind::Purple),
            "cyan" | "c" => Some(GemKind::Cyan),
            "orange" | "o" => Some(GemKind::Orange),
            "white" | "w" => Some(GemKind::White),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GemKind::Red => "red",
            GemKind::Green => "green",
            GemKind::Blue => "blue",
            GemKind::Yellow => "yellow",
            GemKind::Purple => "purple",
            GemKind::Cyan => "cyan",
            GemKind::Orange => "orange",
            GemKind::White => "white",
        }
    }

    /// Single-character symbol used by text dumps
    pub fn symbol(&self) -> char {
        match self {
            GemKind::Red => 'R',
            GemKind::Green => 'G',
            GemKind::Blue => 'B',
            GemKind::Yellow => 'Y',
            GemKind::Purple => 'P',
            GemKind::Cyan => 'C',
            GemKind::Orange => 'O',
            GemKind::White => 'W',
        }
    }
}

/// The value held by one board slot
///
/// - `kind: None` is the empty sentinel, only seen inside a resolution step
/// - `matchable` is reserved for special tiles; ordinary gems are always matchable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub kind: Option<GemKind>,
    pub matchable: bool,
}

impl Tile {
    /// The empty sentinel
    pub const EMPTY: Tile = Tile {
        kind: None,
        matchable: true,
    };

    /// An ordinary, matchable gem
    pub const fn gem(kind: GemKind) -> Self {
        Self {
            kind: Some(kind),
            matchable: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }

    /// Whether this tile extends a run of `other`.
    ///
    /// Empty and unmatchable tiles never match anything, including themselves.
    pub fn matches(&self, other: &Tile) -> bool {
        match (self.kind, other.kind) {
            (Some(a), Some(b)) => a == b && self.matchable && other.matchable,
            _ => false,
        }
    }

    /// Single-character symbol used by text dumps (`.` for empty)
    pub fn symbol(&self) -> char {
        self.kind.map_or('.', |k| k.symbol())
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<GemKind> for Tile {
    fn from(kind: GemKind) -> Self {
        Tile::gem(kind)
    }
}

/// A board coordinate (row 0 is the top row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Edge-sharing neighbour test. Diagonals and the position itself are not adjacent.
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::Position;
    ///
    /// let p = Position::new(1, 1);
    /// assert!(p.is_adjacent(Position::new(0, 1)));
    /// assert!(p.is_adjacent(Position::new(1, 2)));
    /// assert!(!p.is_adjacent(Position::new(2, 2)));
    /// assert!(!p.is_adjacent(p));
    /// ```
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Axis of a match run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal same-kind run along one row or one column
///
/// Positions are ordered left to right (horizontal) or top to bottom (vertical).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchGroup {
    pub kind: GemKind,
    pub orientation: Orientation,
    pub positions: Vec<Position>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

/// One tile moved by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileMove {
    pub from: Position,
    pub to: Position,
}

/// Discrete phases of the turn lifecycle
///
/// The cascade cycles `Matching → Eliminating → Falling → Filling` until a
/// pass finds nothing, then lands in `Idle` (or `GameOver` on a stuck board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for player input
    #[default]
    Idle,
    /// A valid swap was committed; the host may animate it
    Swapping,
    /// Matches were detected and scored
    Matching,
    /// Matched tiles were removed
    Eliminating,
    /// Tiles dropped into the gaps
    Falling,
    /// Empty slots were refilled
    Filling,
    /// Input and cascade advancement are suspended
    Paused,
    /// No swap can produce a match; requires a reset
    GameOver,
}

impl Phase {
    /// Only `Idle` accepts player selection
    pub fn accepts_input(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// Phases inside a running cascade, where `advance()` makes progress
    pub fn is_resolving(&self) -> bool {
        matches!(
            self,
            Phase::Swapping | Phase::Matching | Phase::Eliminating | Phase::Falling | Phase::Filling
        )
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Matching => "matching",
            Phase::Eliminating => "eliminating",
            Phase::Falling => "falling",
            Phase::Filling => "filling",
            Phase::Paused => "paused",
            Phase::GameOver => "gameOver",
        }
    }
}

/// Result of feeding one cell click to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectOutcome {
    /// The cell is now the selection (first click, or a non-adjacent second click)
    Selected,
    /// The selected cell was clicked again
    Deselected,
    /// Adjacent swap that formed no match; the board was swapped back
    SwapRejected,
    /// Adjacent swap that formed a match; the cascade starts on the next `advance()`
    SwapAccepted,
}

/// Externally visible session aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub moves: u32,
    pub combo: u32,
    pub phase: Phase,
    pub selection: Option<Position>,
    pub no_moves_left: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            moves: 0,
            combo: 0,
            phase: Phase::Idle,
            selection: None,
            no_moves_left: false,
        }
    }
}

/// What one `advance()` call did, for the animation layer
///
/// Only the field matching `phase` is populated: `matches` for `Matching`,
/// `removed` for `Eliminating`, `moved` for `Falling`, `spawned` for `Filling`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTransitionEvent {
    pub phase: Phase,
    pub matches: Vec<MatchGroup>,
    pub removed: Vec<Position>,
    pub moved: Vec<TileMove>,
    pub spawned: Vec<Position>,
    pub combo_index: u32,
    pub score_delta: u32,
}

impl PhaseTransitionEvent {
    /// Empty event for the given phase
    pub fn new(phase: Phase, combo_index: u32) -> Self {
        Self {
            phase,
            combo_index,
            ..Self::default()
        }
    }
}
