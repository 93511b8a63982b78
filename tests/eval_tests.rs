// tests/eval_tests.rs

use sablefish::game::board::Board;
use sablefish::game::defs::{PieceKind, Pos, Side, Square};
use sablefish::search::eval::{evaluate_board, EvalStatus};

fn put(board: &mut Board, row: u8, col: u8, kind: PieceKind, side: Side) {
    board.set(Pos::new(row, col), Square::new(kind, side));
}

#[test]
fn pawn_and_rook_mobility() {
    let mut board = Board::empty();
    put(&mut board, 1, 3, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 7, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 2, PieceKind::Rook, Side::White);
    put(&mut board, 2, 2, PieceKind::Pawn, Side::Black);
    board.set_turn(Side::White);

    let record = evaluate_board(&board);
    // 3 from the d2 pawn, 1 from the h4 pawn, 11 from the c4 rook
    assert_eq!(record.moves.len(), 3 + 1 + 11);
    assert!(record.score > 500 && record.score < 1000);
    assert_eq!(record.status, EvalStatus::DoneComplete);
}

#[test]
fn pawn_and_bishop_mobility() {
    let mut board = Board::empty();
    put(&mut board, 0, 0, PieceKind::Pawn, Side::White);
    put(&mut board, 1, 5, PieceKind::Pawn, Side::White);
    put(&mut board, 6, 6, PieceKind::Pawn, Side::Black);
    put(&mut board, 3, 3, PieceKind::Bishop, Side::Black);
    board.set_turn(Side::Black);

    let record = evaluate_board(&board);
    assert_eq!(record.moves.len(), 2 + 10);
    assert!(record.score < -200 && record.score > -1000);
    assert_eq!(record.status, EvalStatus::DoneComplete);
}

#[test]
fn pawn_knight_queen_mobility() {
    let mut board = Board::empty();
    put(&mut board, 3, 4, PieceKind::Knight, Side::Black);
    put(&mut board, 6, 2, PieceKind::Pawn, Side::Black);
    put(&mut board, 2, 6, PieceKind::Pawn, Side::Black);
    put(&mut board, 4, 6, PieceKind::Pawn, Side::White);
    put(&mut board, 6, 4, PieceKind::Queen, Side::Black);
    board.set_turn(Side::Black);

    let record = evaluate_board(&board);
    assert_eq!(record.moves.len(), 2 + 1 + 7 + 7 + 8);
    assert!(record.score < -1300 && record.score > -2000);
    assert_eq!(record.status, EvalStatus::DoneComplete);
}

#[test]
fn stalemate_scores_exact() {
    let mut board = Board::empty();
    put(&mut board, 1, 1, PieceKind::Rook, Side::Black);
    put(&mut board, 7, 1, PieceKind::Rook, Side::Black);
    put(&mut board, 0, 0, PieceKind::King, Side::White);
    board.set_turn(Side::White);

    let record = evaluate_board(&board);
    assert!(record.moves.is_empty());
    assert!(record.score > -400 && record.score <= 0);
    assert_eq!(record.status, EvalStatus::DoneComplete);
}

#[test]
fn capturable_king_scores_exact() {
    let mut board = Board::empty();
    put(&mut board, 1, 1, PieceKind::Rook, Side::Black);
    put(&mut board, 0, 1, PieceKind::Rook, Side::Black);
    put(&mut board, 0, 0, PieceKind::King, Side::White);
    board.set_turn(Side::Black);

    let record = evaluate_board(&board);
    assert!(record.moves.is_empty());
    assert!(record.score < -2000);
    assert_eq!(record.status, EvalStatus::DoneComplete);
}

#[test]
fn castling_legality() {
    let mut board = Board::empty();
    put(&mut board, 0, 0, PieceKind::Rook, Side::White);
    put(&mut board, 0, 7, PieceKind::Rook, Side::White);
    put(&mut board, 0, 4, PieceKind::King, Side::White);
    board.set_turn(Side::White);

    // both castles present
    let record = evaluate_board(&board);
    assert_eq!(record.moves.len(), 10 + 9 + 5 + 2);

    // shuffle the a1 rook out and back: its moved bit kills the long castle
    let mut shuffled = board.make_move_str("a1a2").unwrap();
    shuffled.set_turn(Side::White);
    let mut shuffled = shuffled.make_move_str("a2a1").unwrap();
    shuffled.set_turn(Side::White);
    let record = evaluate_board(&shuffled);
    assert_eq!(record.moves.len(), 10 + 9 + 5 + 1);

    // a friendly pawn on g1 blocks the short castle and the h1 rook
    put(&mut board, 0, 6, PieceKind::Pawn, Side::White);
    let record = evaluate_board(&board);
    assert_eq!(record.moves.len(), 10 + 7 + 5 + 1 + 1);

    // an enemy rook covering the c-file kills the long castle too
    put(&mut board, 7, 2, PieceKind::Rook, Side::Black);
    let record = evaluate_board(&board);
    assert_eq!(record.moves.len(), 10 + 7 + 5 + 1 + 0);
}

#[test]
fn en_passant_window_opens_and_closes() {
    let mut board = Board::empty();
    put(&mut board, 1, 0, PieceKind::Pawn, Side::White);
    put(&mut board, 1, 1, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 2, PieceKind::Pawn, Side::Black);
    put(&mut board, 3, 6, PieceKind::Pawn, Side::Black);
    board.set_turn(Side::White);

    // after b2b4 Black has c4, c4xb3 en passant, and g3
    let after_push = board.make_move_str("b2b4").unwrap();
    let record = evaluate_board(&after_push);
    assert_eq!(record.moves.len(), 3);
    assert!(record
        .moves
        .iter()
        .any(|mv| mv.to_string() == "c4b3" && mv.is_capture()));

    // one half-move later the window is gone, a2a4 opens none for c4
    let after_wait = after_push
        .make_move_str("g4g3")
        .unwrap()
        .make_move_str("a2a4")
        .unwrap();
    let record = evaluate_board(&after_wait);
    assert_eq!(record.moves.len(), 2);
}

#[test]
fn evaluation_is_deterministic() {
    let mut board = Board::empty();
    put(&mut board, 1, 3, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 2, PieceKind::Rook, Side::White);
    put(&mut board, 2, 2, PieceKind::Pawn, Side::Black);
    board.set_turn(Side::White);

    let first = evaluate_board(&board);
    let second = evaluate_board(&board);
    assert_eq!(first.score, second.score);
    assert_eq!(first.moves, second.moves);
    assert_eq!(first.is_quiet, second.is_quiet);
}

#[test]
fn mirrored_board_negates_the_score() {
    let mut board = Board::empty();
    put(&mut board, 1, 3, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 7, PieceKind::Pawn, Side::White);
    put(&mut board, 3, 2, PieceKind::Rook, Side::White);
    put(&mut board, 2, 2, PieceKind::Pawn, Side::Black);
    board.set_turn(Side::White);

    let mut mirror = Board::empty();
    for row in 0..8 {
        for col in 0..8 {
            let sq = board.get(Pos::new(row, col));
            if sq.is_empty() {
                continue;
            }
            mirror.set(
                Pos::new(7 - row, col),
                Square::new(sq.kind(), !sq.side()),
            );
        }
    }
    mirror.set_turn(Side::Black);

    let original = evaluate_board(&board);
    let mirrored = evaluate_board(&mirror);
    assert_eq!(original.score, -mirrored.score);
    assert_eq!(original.moves.len(), mirrored.moves.len());
}
