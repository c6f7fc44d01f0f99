//! Integration tests for chess-mcts
//!
//! These exercise the search end to end through the public API: the playout
//! loop, the final move choice, cancellation, and determinism under a fixed
//! seed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chess_mcts::board::RolloutGrid;
use chess_mcts::config::{PromotionMode, SearchConfig};
use chess_mcts::evaluation::{Evaluator, MaterialEvaluator};
use chess_mcts::mcts::{NodeId, SearchEngine};
use chess_mcts::movegen::{MoveGenerator, StandardMoveGenerator};
use chess_mcts::piece::{Color, PieceKind};
use chess_mcts::piece_index::PieceIndex;
use chess_mcts::position::{Move, Position, parse_square};
use chess_mcts::search::SearchController;

// =============================================================================
// Helper functions
// =============================================================================

/// White to move with exactly one legal move: c3c4.
const ONE_MOVE_FEN: &str = "1r5k/8/8/8/8/2P5/7r/K7 w - - 0 1";

/// White is checkmated.
const MATED_FEN: &str = "8/8/8/8/8/k7/1q6/K7 w - - 0 1";

/// White to move, stalemated.
const STALEMATE_FEN: &str = "8/8/8/8/8/1q6/2k5/K7 w - - 0 1";

fn position(fen: &str) -> Position {
    Position::from_fen(fen).unwrap()
}

fn engine<'a>(pos: Position, config: &'a SearchConfig) -> SearchEngine<'a, StandardMoveGenerator, MaterialEvaluator> {
    SearchEngine::new(
        pos,
        config,
        &StandardMoveGenerator,
        &MaterialEvaluator,
        config.make_rng(),
    )
}

fn mv(s: &str) -> Move {
    Move::parse(s).unwrap()
}

/// Evaluator that raises a flag the first time it is called.
struct CancellingEvaluator {
    flag: Arc<AtomicBool>,
    calls: AtomicU32,
}

impl Evaluator for CancellingEvaluator {
    fn evaluate(&self, grid: &RolloutGrid, for_side: Color) -> i32 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.flag.store(true, Ordering::Relaxed);
        MaterialEvaluator.evaluate(grid, for_side)
    }
}

// =============================================================================
// Fixture sanity
// =============================================================================

#[test]
fn test_fixture_move_counts() {
    let legal = |fen| StandardMoveGenerator.legal_moves(&position(fen), true, PromotionMode::All);
    assert_eq!(legal(ONE_MOVE_FEN), vec![mv("c3c4")]);
    assert!(legal(MATED_FEN).is_empty());
    assert!(legal(STALEMATE_FEN).is_empty());
}

// =============================================================================
// Playout accounting
// =============================================================================

#[test]
fn test_root_visits_equal_completed_playouts() {
    for n in [1, 2, 7, 40] {
        let config = SearchConfig::for_testing().with_playouts(n);
        let mut engine = engine(Position::new(), &config);
        let outcome = engine.run(&AtomicBool::new(false));
        let tree = engine.tree();
        assert_eq!(outcome.diagnostics.playouts, n);
        assert_eq!(tree.get(tree.root()).visits, n);
    }
}

#[test]
fn test_single_playout_expands_root_only() {
    let config = SearchConfig::for_testing().with_playouts(1);
    let mut engine = engine(position(ONE_MOVE_FEN), &config).record_trace();
    engine.run(&AtomicBool::new(false));

    let tree = engine.tree();
    let root = tree.get(tree.root());
    assert_eq!(root.visits, 1);
    assert_eq!(root.children.len(), 1);
    assert_eq!(tree.get(root.children[0]).visits, 0);
    // The rollout ran from the root itself, not from the new child.
    assert_eq!(engine.trace(), Some(&[tree.root()][..]));
}

#[test]
fn test_visits_match_paths_through_node() {
    let config = SearchConfig::for_testing().with_playouts(120);
    let mut engine = engine(Position::new(), &config).record_trace();
    engine.run(&AtomicBool::new(false));

    let tree = engine.tree();
    let trace = engine.trace().unwrap().to_vec();
    let mut counts = vec![0u32; tree.len()];
    for leaf in trace {
        for id in tree.path_to(leaf) {
            counts[id.0 as usize] += 1;
        }
    }
    for (i, &count) in counts.iter().enumerate() {
        assert_eq!(tree.get(NodeId(i as u32)).visits, count, "node {i}");
    }
}

// =============================================================================
// Final move choice
// =============================================================================

#[test]
fn test_single_legal_move_is_reported() {
    for n in [1, 2, 25] {
        let config = SearchConfig::for_testing().with_playouts(n);
        let outcome = engine(position(ONE_MOVE_FEN), &config).run(&AtomicBool::new(false));
        assert_eq!(outcome.best_move, mv("c3c4"), "budget {n}");
    }
}

#[test]
fn test_no_legal_moves_reports_sentinel_without_playouts() {
    for fen in [MATED_FEN, STALEMATE_FEN] {
        let config = SearchConfig::for_testing();
        let mut engine = engine(position(fen), &config);
        let outcome = engine.run(&AtomicBool::new(false));
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.diagnostics.playouts, 0);
        assert_eq!(engine.tree().len(), 1);
    }
}

#[test]
fn test_zero_budget_reports_sentinel() {
    let config = SearchConfig::for_testing().with_playouts(0);
    let outcome = engine(Position::new(), &config).run(&AtomicBool::new(false));
    assert!(outcome.best_move.is_none());
    assert_eq!(outcome.diagnostics.playouts, 0);
}

#[test]
fn test_small_budget_picks_unvisited_child() {
    // Two playouts: root, then the first child. With exploration zero the
    // second child, still unvisited, wins the final choice outright.
    let config = SearchConfig::for_testing().with_playouts(2);
    let mut engine = engine(Position::new(), &config);
    let outcome = engine.run(&AtomicBool::new(false));
    let tree = engine.tree();
    let second = tree.get(tree.get(tree.root()).children[1]);
    assert_eq!(second.visits, 0);
    assert_eq!(outcome.best_move, second.mv);
}

#[test]
fn test_best_move_is_legal() {
    let config = SearchConfig::for_testing().with_playouts(200).with_depth(12);
    let pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w - - 0 1");
    let outcome = engine(pos.clone(), &config).run(&AtomicBool::new(false));
    let legal = StandardMoveGenerator.legal_moves(&pos, true, PromotionMode::All);
    assert!(legal.contains(&outcome.best_move));
}

// =============================================================================
// Rollout depth
// =============================================================================

#[test]
fn test_depth_zero_scores_root_position_as_is() {
    // White is a rook up; with no simulated moves every rollout sees that.
    let config = SearchConfig::for_testing().with_depth(0).with_playouts(1);
    let mut engine = engine(position("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"), &config);
    engine.run(&AtomicBool::new(false));
    let tree = engine.tree();
    assert_eq!(tree.get(tree.root()).value, 500);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_search() {
    let run = || {
        let config = SearchConfig::for_testing().with_playouts(300).with_seed(1234);
        let mut engine = engine(Position::new(), &config).record_trace();
        let outcome = engine.run(&AtomicBool::new(false));
        let root = engine.tree().get(engine.tree().root()).value;
        (engine.trace().unwrap().to_vec(), outcome.best_move, outcome.eval, root)
    };
    let a = run();
    let b = run();
    assert_eq!(a, b);
}

#[test]
fn test_worker_matches_inline_with_same_seed() {
    let config = SearchConfig::for_testing().with_playouts(150).with_seed(77);
    let mut inline = SearchController::new(config.clone()).unwrap();
    let mut worker = SearchController::new(config.on_worker_thread(true)).unwrap();

    let a = inline.start_search(&Position::new()).unwrap().wait().unwrap();
    let b = worker.start_search(&Position::new()).unwrap().wait().unwrap();
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.eval, b.eval);
    assert_eq!(a.diagnostics.playouts, b.diagnostics.playouts);
    assert_eq!(a.diagnostics.tree_size, b.diagnostics.tree_size);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancellation_observed_after_current_playout() {
    // The flag goes up mid-rollout; the playout still completes and is
    // counted, and no further playout starts.
    let flag = Arc::new(AtomicBool::new(false));
    let evaluator = CancellingEvaluator {
        flag: Arc::clone(&flag),
        calls: AtomicU32::new(0),
    };
    let config = SearchConfig::for_testing().with_playouts(100);
    let mut engine = SearchEngine::new(
        Position::new(),
        &config,
        &StandardMoveGenerator,
        &evaluator,
        config.make_rng(),
    );
    let outcome = engine.run(&flag);

    assert_eq!(outcome.diagnostics.playouts, 1);
    assert_eq!(evaluator.calls.load(Ordering::Relaxed), 2);
    let tree = engine.tree();
    assert_eq!(tree.get(tree.root()).visits, 1);
}

#[test]
fn test_controller_reports_diagnostics() {
    let mut controller = SearchController::new(SearchConfig::for_testing()).unwrap();
    assert!(controller.last_diagnostics().is_none());
    let outcome = controller.start_search(&Position::new()).unwrap().wait().unwrap();
    let diagnostics = controller.last_diagnostics().unwrap();
    assert_eq!(diagnostics, outcome.diagnostics);
    assert_eq!(diagnostics.playouts, 64);
    assert!(diagnostics.tree_size > 1);
}

// =============================================================================
// Piece index through the position
// =============================================================================

#[test]
fn test_quiet_move_keeps_piece_slot() {
    let mut pos = Position::new();
    let from = parse_square("b1").unwrap();
    let to = parse_square("c3").unwrap();
    let slot = pos.pieces(Color::White, PieceKind::Knight).slot_of(from);
    pos.apply_move(Move::new(from, to));
    let knights = pos.pieces(Color::White, PieceKind::Knight);
    assert_eq!(knights.slot_of(to), slot);
    assert_eq!(knights.count(), 2);
    assert!(knights.is_consistent());
}

#[test]
fn test_capture_shrinks_victim_index() {
    let mut pos = position("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
    pos.apply_move(mv("e4d5"));
    assert!(pos.pieces(Color::Black, PieceKind::Pawn).is_empty());
    assert_eq!(
        pos.pieces(Color::White, PieceKind::Pawn).squares(),
        &[parse_square("d5").unwrap()]
    );
}

#[test]
fn test_random_games_keep_indices_consistent() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..20 {
        let mut pos = Position::new();
        for _ in 0..60 {
            let moves = StandardMoveGenerator.legal_moves(&pos, true, PromotionMode::QueenOnly);
            if moves.is_empty() {
                break;
            }
            pos.apply_move(moves[rng.usize(..moves.len())]);
            for color in [Color::White, Color::Black] {
                for kind in PieceKind::ALL {
                    let idx: &PieceIndex = pos.pieces(color, kind);
                    assert!(idx.is_consistent());
                    for &sq in idx.squares() {
                        let piece = pos.piece_at(sq).unwrap();
                        assert_eq!((piece.color, piece.kind), (color, kind));
                    }
                }
            }
        }
    }
}
