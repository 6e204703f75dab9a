//! Match detection and scoring through a full turn

use match3::core::{
    Board, EngineConfig, GameState, MatchDetector, OverlapPolicy, ScoringRule, SimpleRng,
};
use match3::types::{GemKind, Orientation, Phase, Position};

/// Swapping (1,2) <-> (2,2) drops a red gem onto the corner of an L
const L_SHAPE: &str = "YYGPY\n\
                       GPRGY\n\
                       PYGRR\n\
                       GGRYY\n\
                       PYRBY";

fn l_shape_game(overlap: OverlapPolicy) -> GameState {
    let board = Board::parse(L_SHAPE).unwrap();
    let config = EngineConfig::new(5, 5, 5).with_overlap(overlap);
    GameState::from_board(config, board, SimpleRng::new(9)).unwrap()
}

#[test]
fn test_l_shape_reports_both_groups() {
    let mut state = l_shape_game(OverlapPolicy::PerGroup);
    assert!(MatchDetector::default().detect_all(state.board()).is_empty());

    state
        .handle_swap(Position::new(1, 2), Position::new(2, 2))
        .unwrap();
    let event = state.advance().unwrap();
    assert_eq!(event.phase, Phase::Matching);
    assert_eq!(event.matches.len(), 2);

    let horizontal = &event.matches[0];
    let vertical = &event.matches[1];
    assert_eq!(horizontal.orientation, Orientation::Horizontal);
    assert_eq!(vertical.orientation, Orientation::Vertical);
    assert!(event.matches.iter().all(|g| g.kind == GemKind::Red));
    assert!(horizontal.contains(Position::new(2, 2)));
    assert!(vertical.contains(Position::new(2, 2)));

    // The shared corner is removed once
    let event = state.advance().unwrap();
    assert_eq!(event.phase, Phase::Eliminating);
    assert_eq!(event.removed.len(), 5);
}

#[test]
fn test_overlap_policy_changes_pass_score() {
    let mut per_group = l_shape_game(OverlapPolicy::PerGroup);
    per_group
        .handle_swap(Position::new(1, 2), Position::new(2, 2))
        .unwrap();
    assert_eq!(per_group.advance().unwrap().score_delta, 300);

    let mut distinct = l_shape_game(OverlapPolicy::Distinct);
    distinct
        .handle_swap(Position::new(1, 2), Position::new(2, 2))
        .unwrap();
    assert_eq!(distinct.advance().unwrap().score_delta, 250);
}

#[test]
fn test_additive_rule_through_game() {
    let board = Board::parse(L_SHAPE).unwrap();
    let config = EngineConfig::new(5, 5, 5).with_scoring(ScoringRule::additive());
    let mut state = GameState::from_board(config, board, SimpleRng::new(9)).unwrap();
    state
        .handle_swap(Position::new(1, 2), Position::new(2, 2))
        .unwrap();
    // 6 gems * 10 + combo 1 * 50
    assert_eq!(state.advance().unwrap().score_delta, 110);
}

#[test]
fn test_longer_runs_score_more() {
    let detector = MatchDetector::default();
    let three = detector.detect_all(&Board::parse("RRRGB\nGBGBG\nBGBGB").unwrap());
    let five = detector.detect_all(&Board::parse("RRRRR\nGBGBG\nBGBGB").unwrap());
    assert_eq!(three[0].len(), 3);
    assert_eq!(five[0].len(), 5);

    let rule = ScoringRule::default();
    let score3 = match3::core::calculate_score(3, 1, rule).total;
    let score5 = match3::core::calculate_score(5, 1, rule).total;
    assert_eq!(score3, 150);
    assert_eq!(score5, 250);
}

#[test]
fn test_higher_threshold_ignores_short_runs() {
    let board = Board::parse("RRRG\nGBGB\nBGBG\nRRRR").unwrap();
    let groups = MatchDetector::new(4).detect_all(&board);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].positions[0], Position::new(3, 0));
}
