// tests/search_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sablefish::game::board::Board;
use sablefish::game::defs::{PieceKind, Pos, Side, Square};
use sablefish::search::engine::Engine;
use sablefish::search::eval::{evaluate_board, MAX_SCORE, MIN_SCORE};
use sablefish::search::search::{SearchCtrl, SearchOutcome};

fn put(board: &mut Board, row: u8, col: u8, kind: PieceKind, side: Side) {
    board.set(Pos::new(row, col), Square::new(kind, side));
}

#[test]
fn quiescence_extends_out_of_check() {
    let mut board = Board::empty();
    put(&mut board, 5, 2, PieceKind::Pawn, Side::Black);
    put(&mut board, 2, 6, PieceKind::Pawn, Side::Black);
    put(&mut board, 0, 7, PieceKind::King, Side::White);
    board.set_turn(Side::Black);

    let mut engine = Engine::new();
    let mut ctrl = SearchCtrl::new(0, 1);
    let outcome = engine.search(&board, &mut ctrl, 1, MIN_SCORE, MAX_SCORE, 2, true);

    assert!(matches!(outcome, SearchOutcome::Success(_)));
    // the quiet reply c6c5 is a single leaf; the checking reply g3g2
    // expands into all three king answers
    assert_eq!(ctrl.nodes_evaluated, 6);
}

#[test]
fn quiescence_cashes_in_the_hanging_pawns() {
    let mut board = Board::empty();
    for row in 5..=7 {
        for col in 0..=1 {
            put(&mut board, row, col, PieceKind::Pawn, Side::White);
        }
    }
    board.set(Pos::new(7, 0), Square::new(PieceKind::Queen, Side::Black));
    board.set_turn(Side::Black);

    let mut engine = Engine::new();
    let mut ctrl = SearchCtrl::new(0, 1);
    let outcome = engine.search(&board, &mut ctrl, 1, MIN_SCORE, MAX_SCORE, 2, true);

    assert!(ctrl.nodes_evaluated > 5);
    match outcome {
        SearchOutcome::Success(score) => assert!(score > 100),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn finds_the_back_rank_mate() {
    let mut board = Board::empty();
    put(&mut board, 7, 6, PieceKind::King, Side::Black);
    put(&mut board, 6, 5, PieceKind::Pawn, Side::Black);
    put(&mut board, 6, 6, PieceKind::Pawn, Side::Black);
    put(&mut board, 6, 7, PieceKind::Pawn, Side::Black);
    put(&mut board, 0, 0, PieceKind::Rook, Side::White);
    put(&mut board, 0, 4, PieceKind::King, Side::White);
    board.set_turn(Side::White);

    let mut engine = Engine::new();
    let best = engine.find_best_move(&board, 3, 2, 0);
    assert_eq!(best.to_string(), "a1a8");

    let record = engine.record(&board).expect("root record exists");
    assert!(record.score > 5000, "mate-family score, got {}", record.score);
}

#[test]
fn search_is_deterministic_across_engines() {
    let board = Board::starting_position();
    let first = Engine::new().find_best_move(&board, 3, 2, 0);
    let second = Engine::new().find_best_move(&board, 3, 2, 0);
    assert_eq!(first, second);
}

#[test]
fn warm_cache_returns_the_same_move() {
    let board = Board::starting_position();
    let mut engine = Engine::new();
    let cold = engine.find_best_move(&board, 3, 2, 0);
    let warm = engine.find_best_move(&board, 3, 2, 0);
    assert_eq!(cold, warm);
    assert!(engine.cache_len() > 0);
}

#[test]
fn principal_variation_follows_best_moves() {
    let board = Board::starting_position();
    let mut engine = Engine::new();
    let best = engine.find_best_move(&board, 3, 2, 0);

    let variation = engine.principal_variation(&board);
    assert!(!variation.is_empty());
    assert_eq!(variation[0], best);

    // every step of the variation is backed by a cached record
    let mut cursor = board;
    for mv in &variation {
        assert!(engine.record(&cursor).is_some());
        cursor = cursor.make_move(*mv);
    }
}

#[test]
fn empty_cache_gives_empty_variation() {
    let engine = Engine::new();
    assert!(engine
        .principal_variation(&Board::starting_position())
        .is_empty());
}

#[test]
fn random_playout_keeps_the_board_invariants() {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D);
    let mut board = Board::starting_position();

    for _ in 0..60 {
        let record = evaluate_board(&board);
        if record.moves.is_empty() {
            break;
        }

        // every generated move starts on a piece of the side to move
        for mv in &record.moves {
            let from = board.get(mv.from_sq());
            assert!(!from.is_empty());
            assert_eq!(from.side(), board.turn());
        }

        let mv = record.moves[rng.gen_range(0..record.moves.len())];
        board = board.make_move(mv);

        // at most one pawn carries the double-push flag at any time
        let double_pushed = (0u8..64)
            .filter(|&idx| {
                let sq = board.get(Pos(idx));
                sq.kind() == PieceKind::Pawn && sq.double_pushed()
            })
            .count();
        assert!(double_pushed <= 1);
    }
}
