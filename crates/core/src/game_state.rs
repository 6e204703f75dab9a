//! Game state module - the turn state machine
//!
//! This module ties together the board, match detection, cascade resolution,
//! scoring and RNG. It is the only writer of session state.
//!
//! The machine never waits on a clock. Each [`GameState::advance`] call
//! performs exactly one cascade step and reports what changed; the host
//! decides when to ask for the next one:
//!
//! ```text
//! Idle --swap--> Swapping -> Matching -> Eliminating -> Falling -> Filling
//!                              ^                                     |
//!                              +------------ more matches -----------+
//!                                    stable -> Idle | GameOver
//! ```

use log::{debug, info};

use crate::board::Board;
use crate::cascade::CascadeResolver;
use crate::config::EngineConfig;
use crate::error::{Match3Error, Result};
use crate::matcher::MatchDetector;
use crate::rng::{RandomSource, SimpleRng};
use crate::scoring::ScoreKeeper;
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<R: RandomSource = SimpleRng> {
    config: EngineConfig,
    board: Board,
    rng: R,
    resolver: CascadeResolver,
    keeper: ScoreKeeper,
    phase: Phase,
    /// Phase to return to on resume
    paused_from: Option<Phase>,
    selection: Option<Position>,
    moves: u32,
    no_moves_left: bool,
    /// Seed the current board was generated from
    seed: u32,
    /// Monotonic episode id (increments on reset).
    episode_id: u32,
}

impl GameState<SimpleRng> {
    /// Create a new game with the given RNG seed
    pub fn new(config: EngineConfig, seed: u32) -> Result<Self> {
        let mut state = Self::with_source(config, SimpleRng::new(seed))?;
        state.seed = seed;
        Ok(state)
    }

    /// Default rules on a `rows x cols` board with `gem_types` kinds
    pub fn initialize(rows: usize, cols: usize, gem_types: u8, seed: u32) -> Result<Self> {
        Self::new(EngineConfig::new(rows, cols, gem_types), seed)
    }
}

impl<R: RandomSource> GameState<R> {
    /// Generate a board from `rng` and start in `Idle` (or `GameOver` if it is stuck)
    pub fn with_source(config: EngineConfig, mut rng: R) -> Result<Self> {
        let board = Board::initialize(&config, &mut rng)?;
        let mut state = Self::assemble(config, board, rng);
        state.finish_turn();
        info!(
            "New {}x{} game, {} gem types",
            config.rows, config.cols, config.gem_types
        );
        Ok(state)
    }

    /// Start from a hand-built board.
    ///
    /// The board's dimensions replace the configured ones. Every slot must hold
    /// a gem from the configured palette. Otherwise the board is taken as-is:
    /// leftover matches and stuck positions are only acted on by [`GameState::settle`].
    pub fn from_board(mut config: EngineConfig, board: Board, rng: R) -> Result<Self> {
        config.rows = board.rows();
        config.cols = board.cols();
        config.validate()?;
        if !board.is_full() {
            return Err(Match3Error::Configuration(format!(
                "board has {} empty slots",
                board.count_empty()
            )));
        }
        if let Some(kind) = board
            .cells()
            .iter()
            .filter_map(|t| t.kind)
            .find(|k| k.index() >= config.gem_types as usize)
        {
            return Err(Match3Error::Configuration(format!(
                "{} is outside a palette of {} gem types",
                kind.as_str(),
                config.gem_types
            )));
        }
        let mut state = Self::assemble(config, board, rng);
        state.no_moves_left = !state.board.has_any_possible_move(state.resolver.detector());
        Ok(state)
    }

    fn assemble(config: EngineConfig, board: Board, rng: R) -> Self {
        let detector = MatchDetector::new(config.min_match);
        Self {
            resolver: CascadeResolver::new(detector, config.gem_types, config.max_cascade_passes),
            keeper: ScoreKeeper::new(config.scoring, config.overlap),
            config,
            board,
            rng,
            phase: Phase::Idle,
            paused_from: None,
            selection: None,
            moves: 0,
            no_moves_left: false,
            seed: 0,
            episode_id: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.keeper.score()
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn combo(&self) -> u32 {
        self.resolver.combo()
    }

    pub fn selection(&self) -> Option<Position> {
        self.selection
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            score: self.score(),
            moves: self.moves,
            combo: self.combo(),
            phase: self.phase,
            selection: self.selection,
            no_moves_left: self.no_moves_left,
        }
    }

    pub fn get_tile(&self, row: usize, col: usize) -> Result<Tile> {
        let pos = Position::new(row, col);
        self.board.check(pos)?;
        Ok(self.board.tile(pos).unwrap_or(Tile::EMPTY))
    }

    /// A swap that would form a match. Only offered while waiting for input.
    pub fn get_hint(&self) -> Option<(Position, Position)> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.board.find_hint(self.resolver.detector())
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.board.copy_from(&self.board);
        out.session = self.session_state();
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.hint = self.get_hint();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Feed one click on (row, col).
    ///
    /// First click selects; clicking the selection again clears it; clicking a
    /// non-adjacent cell moves the selection there; clicking an adjacent cell
    /// attempts the swap.
    pub fn handle_select(&mut self, row: usize, col: usize) -> Result<SelectOutcome> {
        if !self.phase.accepts_input() {
            return Err(Match3Error::InvalidPhase(self.phase));
        }
        let pos = Position::new(row, col);
        self.board.check(pos)?;

        match self.selection {
            None => {
                debug!("Selected ({}, {})", row, col);
                self.selection = Some(pos);
                Ok(SelectOutcome::Selected)
            }
            Some(selected) if selected == pos => {
                debug!("Deselected ({}, {})", row, col);
                self.selection = None;
                Ok(SelectOutcome::Deselected)
            }
            Some(selected) => match self.attempt_swap(selected, pos) {
                Err(Match3Error::NotAdjacent { .. }) => {
                    debug!("({}, {}) is not adjacent, reselecting", row, col);
                    self.selection = Some(pos);
                    Ok(SelectOutcome::Selected)
                }
                other => other,
            },
        }
    }

    /// Swap two cells directly, as from a drag gesture.
    ///
    /// Unlike [`GameState::handle_select`], a non-adjacent pair is an error and
    /// leaves the selection untouched.
    pub fn handle_swap(&mut self, a: Position, b: Position) -> Result<SelectOutcome> {
        if !self.phase.accepts_input() {
            return Err(Match3Error::InvalidPhase(self.phase));
        }
        self.attempt_swap(a, b)
    }

    fn attempt_swap(&mut self, a: Position, b: Position) -> Result<SelectOutcome> {
        self.board.try_swap(a, b)?;

        let detector = self.resolver.detector();
        if detector.has_match_at(&self.board, a) || detector.has_match_at(&self.board, b) {
            debug!("Swap {:?} <-> {:?} accepted", a, b);
            self.selection = None;
            self.moves = self.moves.saturating_add(1);
            self.resolver.reset();
            self.phase = Phase::Swapping;
            Ok(SelectOutcome::SwapAccepted)
        } else {
            debug!("No match after swap {:?} <-> {:?}, reverting", a, b);
            self.board.try_swap(b, a)?;
            self.selection = None;
            Ok(SelectOutcome::SwapRejected)
        }
    }

    /// Perform the next cascade step
    pub fn advance(&mut self) -> Result<PhaseTransitionEvent> {
        match self.phase {
            Phase::Idle | Phase::Paused | Phase::GameOver => {
                Err(Match3Error::InvalidPhase(self.phase))
            }
            Phase::Swapping | Phase::Filling => self.match_step(),
            Phase::Matching => {
                self.phase = Phase::Eliminating;
                let mut event = PhaseTransitionEvent::new(self.phase, self.combo());
                event.removed = self.resolver.eliminate(&mut self.board);
                Ok(event)
            }
            Phase::Eliminating => {
                self.phase = Phase::Falling;
                let mut event = PhaseTransitionEvent::new(self.phase, self.combo());
                event.moved = self.resolver.fall(&mut self.board);
                Ok(event)
            }
            Phase::Falling => {
                self.phase = Phase::Filling;
                let mut event = PhaseTransitionEvent::new(self.phase, self.combo());
                event.spawned = self.resolver.refill(&mut self.board, &mut self.rng);
                Ok(event)
            }
        }
    }

    fn match_step(&mut self) -> Result<PhaseTransitionEvent> {
        match self.resolver.match_pass(&self.board, &mut self.keeper) {
            Ok(Some(pass)) => {
                self.phase = Phase::Matching;
                let mut event = PhaseTransitionEvent::new(self.phase, pass.combo);
                event.matches = pass.groups;
                event.score_delta = pass.score.total;
                Ok(event)
            }
            Ok(None) => {
                self.finish_turn();
                Ok(PhaseTransitionEvent::new(self.phase, 0))
            }
            Err(e) => {
                self.finish_turn();
                Err(e)
            }
        }
    }

    /// Close the turn: Idle if a move exists, GameOver otherwise
    fn finish_turn(&mut self) {
        self.resolver.reset();
        self.no_moves_left = !self.board.has_any_possible_move(self.resolver.detector());
        if self.no_moves_left {
            info!(
                "No more possible moves - game over with score {}",
                self.score()
            );
            self.phase = Phase::GameOver;
        } else {
            self.phase = Phase::Idle;
        }
    }

    /// Advance until the board is stable and return every step taken.
    ///
    /// From `Idle` this first re-checks the board for matches (resolving any it
    /// finds) and then re-evaluates whether a move exists.
    ///
    /// If the pass budget runs out the turn still ends in `Idle` (or `GameOver`),
    /// but matches may be left on the board; another `settle` resumes them.
    pub fn settle(&mut self) -> Result<Vec<PhaseTransitionEvent>> {
        let mut events = Vec::new();
        self.settle_into(&mut events)?;
        Ok(events)
    }

    /// Like [`GameState::settle`], appending to `events` as each step happens.
    ///
    /// On error the steps taken before it stay in `events`.
    pub fn settle_into(&mut self, events: &mut Vec<PhaseTransitionEvent>) -> Result<()> {
        match self.phase {
            Phase::Paused | Phase::GameOver => return Err(Match3Error::InvalidPhase(self.phase)),
            Phase::Idle => {
                self.selection = None;
                self.phase = Phase::Filling;
            }
            _ => {}
        }

        while self.phase.is_resolving() {
            events.push(self.advance()?);
        }
        Ok(())
    }

    /// Suspend input and cascade advancement
    pub fn pause(&mut self) -> bool {
        if matches!(self.phase, Phase::Paused | Phase::GameOver) {
            return false;
        }
        self.paused_from = Some(self.phase);
        self.phase = Phase::Paused;
        true
    }

    /// Return to the phase held before pausing
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = self.paused_from.take().unwrap_or(Phase::Idle);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Regenerate the board from `seed` and start a new episode
    pub fn reset(&mut self, seed: u32) -> Result<()> {
        self.rng.reseed(seed);
        self.board.reinitialize(&self.config, &mut self.rng)?;
        self.seed = seed;
        self.keeper.reset();
        self.selection = None;
        self.paused_from = None;
        self.moves = 0;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.finish_turn();
        info!("Reset to seed {} (episode {})", seed, self.episode_id);
        Ok(())
    }

    /// Reset with the seed of the current episode
    pub fn restart(&mut self) -> Result<()> {
        self.reset(self.seed)
    }
}

impl Default for GameState<SimpleRng> {
    fn default() -> Self {
        let config = EngineConfig::default();
        let mut rng = SimpleRng::new(1);
        // The default configuration always validates.
        let board = Board::initialize(&config, &mut rng).unwrap_or_else(|_| {
            Board::empty(config.rows, config.cols)
        });
        let mut state = Self::assemble(config, board, rng);
        state.seed = 1;
        state.finish_turn();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /// Replays a fixed list of draws, wrapping around
    #[derive(Debug, Clone)]
    struct Sequence {
        draws: Vec<u32>,
        next: usize,
    }

    impl Sequence {
        fn new(draws: &[u32]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Sequence {
        fn next_range(&mut self, max: u32) -> u32 {
            let v = self.draws[self.next % self.draws.len()];
            self.next += 1;
            v % max
        }

        fn reseed(&mut self, _seed: u32) {
            self.next = 0;
        }
    }

    /// One swap at (1,2)<->(1,3) clears the red row; the R,G,B refill is stable.
    fn one_pass_game() -> GameState<Sequence> {
        let board = Board::parse(
            "GBGB\n\
             RRYR\n\
             BGBG\n\
             YYGY",
        )
        .unwrap();
        GameState::from_board(EngineConfig::new(4, 4, 4), board, Sequence::new(&[0, 1, 2])).unwrap()
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(EngineConfig::default(), 12345).unwrap();

        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.score(), 0);
        assert_eq!(state.moves(), 0);
        assert_eq!(state.combo(), 0);
        assert_eq!(state.selection(), None);
        assert_eq!(state.episode_id(), 0);
        assert_eq!(state.seed(), 12345);
        assert!(state.board().is_full());
        assert!(MatchDetector::default().detect_all(state.board()).is_empty());
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        assert!(matches!(
            GameState::initialize(2, 8, 6, 1),
            Err(Match3Error::Configuration(_))
        ));
        assert!(matches!(
            GameState::initialize(8, 8, 2, 1),
            Err(Match3Error::Configuration(_))
        ));
    }

    #[test]
    fn test_select_and_deselect() {
        let mut state = one_pass_game();
        assert_eq!(state.handle_select(0, 0), Ok(SelectOutcome::Selected));
        assert_eq!(state.selection(), Some(Position::new(0, 0)));
        assert_eq!(state.handle_select(0, 0), Ok(SelectOutcome::Deselected));
        assert_eq!(state.selection(), None);
    }

    #[test]
    fn test_out_of_range_select_is_rejected() {
        let mut state = one_pass_game();
        state.handle_select(0, 0).unwrap();
        let before = state.session_state();
        assert!(matches!(
            state.handle_select(4, 0),
            Err(Match3Error::OutOfRange { row: 4, col: 0, .. })
        ));
        assert_eq!(state.session_state(), before);
    }

    #[test]
    fn test_non_adjacent_click_reselects() {
        let mut state = one_pass_game();
        let board = state.board().clone();
        state.handle_select(0, 0).unwrap();
        assert_eq!(state.handle_select(2, 2), Ok(SelectOutcome::Selected));
        assert_eq!(state.selection(), Some(Position::new(2, 2)));
        assert_eq!(state.board(), &board);
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn test_rejected_swap_reverts() {
        let mut state = one_pass_game();
        let board = state.board().clone();
        state.handle_select(0, 0).unwrap();
        assert_eq!(state.handle_select(0, 1), Ok(SelectOutcome::SwapRejected));
        assert_eq!(state.board(), &board);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.selection(), None);
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn test_accepted_swap_walks_every_phase() {
        let mut state = one_pass_game();
        state.handle_select(1, 2).unwrap();
        assert_eq!(state.handle_select(1, 3), Ok(SelectOutcome::SwapAccepted));
        assert_eq!(state.phase(), Phase::Swapping);
        assert_eq!(state.moves(), 1);
        assert_eq!(state.selection(), None);

        let ev = state.advance().unwrap();
        assert_eq!(ev.phase, Phase::Matching);
        assert_eq!(ev.combo_index, 1);
        assert_eq!(ev.score_delta, 150);
        assert_eq!(ev.matches.len(), 1);
        assert_eq!(ev.matches[0].kind, GemKind::Red);

        let ev = state.advance().unwrap();
        assert_eq!(ev.phase, Phase::Eliminating);
        assert_eq!(
            ev.removed,
            vec![Position::new(1, 0), Position::new(1, 1), Position::new(1, 2)]
        );
        assert_eq!(state.board().count_empty(), 3);

        let ev = state.advance().unwrap();
        assert_eq!(ev.phase, Phase::Falling);
        assert_eq!(ev.moved.len(), 3);

        let ev = state.advance().unwrap();
        assert_eq!(ev.phase, Phase::Filling);
        assert_eq!(ev.spawned.len(), 3);
        assert_eq!(state.board().to_string(), "RGBB\nGBGY\nBGBG\nYYGY\n");

        let ev = state.advance().unwrap();
        assert_eq!(ev.phase, Phase::Idle);
        assert_eq!(ev.combo_index, 0);
        assert_eq!(state.score(), 150);
        assert_eq!(state.combo(), 0);
        assert!(!state.session_state().no_moves_left);
    }

    #[test]
    fn test_input_rejected_mid_cascade() {
        let mut state = one_pass_game();
        state.handle_swap(Position::new(1, 2), Position::new(1, 3)).unwrap();
        assert_eq!(
            state.handle_select(0, 0),
            Err(Match3Error::InvalidPhase(Phase::Swapping))
        );
        assert_eq!(state.get_hint(), None);
    }

    #[test]
    fn test_advance_in_idle_is_rejected() {
        let mut state = one_pass_game();
        assert_eq!(state.advance(), Err(Match3Error::InvalidPhase(Phase::Idle)));
    }

    #[test]
    fn test_pause_resume_mid_cascade() {
        let mut state = one_pass_game();
        state.handle_swap(Position::new(1, 2), Position::new(1, 3)).unwrap();
        state.advance().unwrap();
        assert_eq!(state.phase(), Phase::Matching);

        assert!(state.pause());
        assert!(!state.pause());
        assert_eq!(state.advance(), Err(Match3Error::InvalidPhase(Phase::Paused)));
        assert_eq!(
            state.handle_select(0, 0),
            Err(Match3Error::InvalidPhase(Phase::Paused))
        );

        assert!(state.resume());
        assert!(!state.resume());
        assert_eq!(state.phase(), Phase::Matching);
        assert_eq!(state.advance().unwrap().phase, Phase::Eliminating);
    }

    #[test]
    fn test_settle_finishes_turn() {
        let mut state = one_pass_game();
        state.handle_swap(Position::new(1, 2), Position::new(1, 3)).unwrap();
        let events = state.settle().unwrap();
        let phases: Vec<_> = events.iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Matching,
                Phase::Eliminating,
                Phase::Falling,
                Phase::Filling,
                Phase::Idle
            ]
        );
    }

    #[test]
    fn test_stuck_board_settles_to_game_over() {
        let board = Board::parse("RGB\nGBR\nBRG").unwrap();
        let mut state =
            GameState::from_board(EngineConfig::new(3, 3, 3), board, Sequence::new(&[0])).unwrap();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.session_state().no_moves_left);

        let events = state.settle().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, Phase::GameOver);
        assert!(state.game_over());
        assert!(!state.pause());
        assert_eq!(
            state.handle_select(0, 0),
            Err(Match3Error::InvalidPhase(Phase::GameOver))
        );
    }

    #[test]
    fn test_from_board_rejects_empty_slots() {
        let board = Board::parse("R.B\nGBR\nBRG").unwrap();
        assert!(matches!(
            GameState::from_board(EngineConfig::new(3, 3, 3), board, Sequence::new(&[0])),
            Err(Match3Error::Configuration(_))
        ));
    }

    #[test]
    fn test_from_board_rejects_gems_outside_palette() {
        // Yellow is the fourth kind
        let board = Board::parse("RGB\nGBR\nBRY").unwrap();
        assert!(matches!(
            GameState::from_board(EngineConfig::new(3, 3, 3), board.clone(), Sequence::new(&[0])),
            Err(Match3Error::Configuration(_))
        ));
        assert!(
            GameState::from_board(EngineConfig::new(3, 3, 4), board, Sequence::new(&[0])).is_ok()
        );
    }

    /// Every refill is red, so an all-red board never settles
    fn endless_game(max_passes: u32) -> GameState<Sequence> {
        let board = Board::parse("RRR\nRRR\nRRR").unwrap();
        let config = EngineConfig::new(3, 3, 3).with_max_cascade_passes(max_passes);
        GameState::from_board(config, board, Sequence::new(&[0])).unwrap()
    }

    #[test]
    fn test_settle_into_keeps_steps_before_budget_error() {
        let mut state = endless_game(5);
        let mut events = Vec::new();

        assert_eq!(
            state.settle_into(&mut events),
            Err(Match3Error::ResolutionBudgetExceeded(5))
        );
        // Five full passes of Matching, Eliminating, Falling, Filling
        assert_eq!(events.len(), 20);
        let combos: Vec<_> = events
            .iter()
            .filter(|e| e.phase == Phase::Matching)
            .map(|e| e.combo_index)
            .collect();
        assert_eq!(combos, vec![1, 2, 3, 4, 5]);
        assert_eq!(events.last().map(|e| e.phase), Some(Phase::Filling));
    }

    #[test]
    fn test_budget_exceeded_leaves_live_matches_in_idle() {
        let mut state = endless_game(2);
        assert_eq!(state.settle(), Err(Match3Error::ResolutionBudgetExceeded(2)));

        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.combo(), 0);
        assert!(!MatchDetector::default().detect_all(state.board()).is_empty());
        assert!(state.board().is_full());

        // A further settle picks the leftover matches up again
        let mut events = Vec::new();
        assert!(state.settle_into(&mut events).is_err());
        assert_eq!(events[0].phase, Phase::Matching);
        assert_eq!(events[0].combo_index, 1);
    }

    #[test]
    fn test_reset_starts_new_episode() {
        let mut state = GameState::new(EngineConfig::default(), 7).unwrap();
        let first = state.board().clone();
        state.handle_select(0, 0).unwrap();

        state.reset(8).unwrap();
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.seed(), 8);
        assert_eq!(state.selection(), None);
        assert_ne!(state.board(), &first);

        state.reset(7).unwrap();
        assert_eq!(state.board(), &first);
        assert_eq!(state.episode_id(), 2);
    }

    #[test]
    fn test_get_tile_bounds() {
        let state = one_pass_game();
        assert_eq!(state.get_tile(1, 0), Ok(Tile::gem(GemKind::Red)));
        assert!(matches!(
            state.get_tile(0, 9),
            Err(Match3Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let mut state = one_pass_game();
        state.handle_select(3, 3).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.session.selection, Some(Position::new(3, 3)));
        assert_eq!(snap.board.rows, 4);
        assert_eq!(snap.board.get(1, 0), Some(Tile::gem(GemKind::Red)));
        assert!(snap.hint.is_some());
    }
}
