// src/search/eval.rs

use crate::game::board::Board;
use crate::game::defs::{row_col_ok, PieceKind, Pos, Side};
use crate::game::moves::{Move, MoveKind};

// ############################
//        SCORE BOUNDS
// ############################

pub const MIN_SCORE: i16 = -30_000;
pub const MAX_SCORE: i16 = 30_000;

/// Exact score installed when the opponent left their king capturable.
/// Callers compare against half of it to recognize mate-family scores.
pub const AFTER_CHECKMATE_SCORE: i16 = 10_000;

const STALEMATE_SCORE: i16 = -300;

/// Remaining-depth value that marks a record as exact at any depth.
pub const EXACT_EVAL_DEPTH: u8 = 100;

// ############################
//      EVALUATION TERMS
// ############################

const PAWN_BONUS: i16 = 100;
const ROOK_BONUS: i16 = 500;
const KNIGHT_BONUS: i16 = 300;
const BISHOP_BONUS: i16 = 300;
const QUEEN_BONUS: i16 = 900;
const KING_BONUS: i16 = 20_000;

const CAN_MOVE_BONUS: i16 = 5;
const CENTER_BONUS: i16 = 20;
const NEAR_CENTER_BONUS: i16 = 10;
const PAWN_ROW_PROGRESS_BONUS: i16 = 20;
const OUTNUMBERED_PIECE_PENALTY: i16 = -75;
const GUARDED_PIECE_BONUS: i16 = 20;
const CHECK_PENALTY: i16 = -100;

// ############################
//         EVAL RECORD
// ############################

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStatus {
    NotEvaluated,
    InEvaluation,
    DonePartial,
    DoneComplete,
}

/// Cached evaluation state for one board. Created by [`evaluate_board`] with
/// the heuristic score and pseudo-legal move list, then mutated by the
/// searcher: status flips to `InEvaluation` while the node is on the call
/// stack, depths and best move are filled in on the way out, and the move
/// list is kept sorted best-first for the next deepening pass.
#[derive(Debug, Clone)]
pub struct EvalRecord {
    pub moves: Vec<Move>,
    pub best_move: Move,
    pub score: i16,
    /// Alpha bound stored when a minimizing node was cut off.
    pub alpha_low: i16,
    /// Beta bound stored when a maximizing node was cut off.
    pub beta_high: i16,
    pub status: EvalStatus,
    /// Remaining plies to which search below this node is valid.
    pub eval_depth: u8,
    /// Additional quiescence plies valid below this node.
    pub qs_depth: u8,
    /// True iff the side to move is not in check.
    pub is_quiet: bool,
}

impl EvalRecord {
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            best_move: Move::default(),
            score: 0,
            alpha_low: MIN_SCORE,
            beta_high: MAX_SCORE,
            status: EvalStatus::NotEvaluated,
            eval_depth: 0,
            qs_depth: 0,
            is_quiet: true,
        }
    }

    fn set_exact_score(&mut self, score: i16) {
        self.score = score;
        self.status = EvalStatus::DoneComplete;
        self.eval_depth = EXACT_EVAL_DEPTH;
    }
}

impl Default for EvalRecord {
    fn default() -> Self {
        Self::new()
    }
}

// ############################
//         ATTACK MAP
// ############################

struct AttackMap {
    counts: [[i8; 64]; 2],
}

impl AttackMap {
    fn new() -> Self {
        Self {
            counts: [[0; 64]; 2],
        }
    }

    #[inline]
    fn bump(&mut self, side: Side, pos: Pos) {
        self.counts[side as usize][pos.index()] += 1;
    }

    #[inline]
    fn count(&self, side: Side, pos: Pos) -> i8 {
        self.counts[side as usize][pos.index()]
    }
}

// ############################
//       SINGLE SWEEP
// ############################

/// Heuristic evaluation of one board in a single sweep: material and
/// positional score, the pseudo-legal move list for the side to move, and
/// the per-square attack/defense counts that drive check detection,
/// castling legality and piece safety.
///
/// The side waiting is swept before the side to move, so the attack counts
/// consulted while filtering the moving king's destinations are complete.
pub fn evaluate_board(board: &Board) -> EvalRecord {
    let mut record = EvalRecord::new();
    record.moves.reserve(40);

    let mover = board.turn();
    let mut attacks = AttackMap::new();

    for side in [!mover, mover] {
        for idx in 0..64u8 {
            let pos = Pos(idx);
            let square = board.get(pos);
            if square.kind() == PieceKind::Empty || square.side() != side {
                continue;
            }
            let sign = side.sign();
            let row = pos.row() as i8;
            let col = pos.col() as i8;

            match square.kind() {
                PieceKind::Pawn => {
                    record.score += PAWN_BONUS * sign;

                    let progress = if side == Side::White {
                        row as i16 - 1
                    } else {
                        6 - row as i16
                    };
                    record.score += progress * PAWN_ROW_PROGRESS_BONUS * sign;

                    let forward_row = row + sign as i8;
                    if row_col_ok(forward_row) {
                        let forward = board.get(Pos::new(forward_row as u8, col as u8));
                        if forward.kind() == PieceKind::Empty {
                            record.score += CAN_MOVE_BONUS * sign;
                            if side == mover {
                                let last_rank = (side == Side::White && forward_row == 7)
                                    || (side == Side::Black && forward_row == 0);
                                record.moves.push(Move::pack_promo(
                                    pos,
                                    Pos::new(forward_row as u8, col as u8),
                                    MoveKind::Quiet,
                                    if last_rank {
                                        PieceKind::Queen
                                    } else {
                                        PieceKind::Empty
                                    },
                                ));
                            }
                        }
                    }

                    let start_row = if side == Side::White { 1 } else { 6 };
                    let double_row = row + 2 * sign as i8;
                    if row == start_row && row_col_ok(double_row) {
                        let forward = board.get(Pos::new(forward_row as u8, col as u8));
                        let double = board.get(Pos::new(double_row as u8, col as u8));
                        if forward.kind() == PieceKind::Empty && double.kind() == PieceKind::Empty {
                            record.score += CAN_MOVE_BONUS * sign;
                            if side == mover {
                                record.moves.push(Move::pack(
                                    pos,
                                    Pos::new(double_row as u8, col as u8),
                                    MoveKind::Quiet,
                                ));
                            }
                        }
                    }

                    for col_shift in [-1, 1] {
                        let takes_col = col + col_shift;
                        if !row_col_ok(takes_col) || !row_col_ok(forward_row) {
                            continue;
                        }

                        // regular capture
                        let takes_pos = Pos::new(forward_row as u8, takes_col as u8);
                        let takes = board.get(takes_pos);
                        if takes.kind() != PieceKind::Empty && takes.side() != side {
                            record.score += CAN_MOVE_BONUS * sign;
                            if side == mover {
                                let last_rank = (side == Side::White && forward_row == 7)
                                    || (side == Side::Black && forward_row == 0);
                                record.moves.push(Move::pack_promo(
                                    pos,
                                    takes_pos,
                                    MoveKind::Capture,
                                    if last_rank {
                                        PieceKind::Queen
                                    } else {
                                        PieceKind::Empty
                                    },
                                ));
                            }
                        }
                        attacks.bump(side, takes_pos);

                        // en passant capture
                        let adjacent = board.get(Pos::new(row as u8, takes_col as u8));
                        if adjacent.kind() == PieceKind::Pawn
                            && adjacent.side() != side
                            && adjacent.double_pushed()
                        {
                            record.score += CAN_MOVE_BONUS * sign;
                            if side == mover {
                                record.moves.push(Move::pack(
                                    pos,
                                    Pos::new(forward_row as u8, takes_col as u8),
                                    MoveKind::Capture,
                                ));
                            }
                        }
                    }
                }
                PieceKind::Rook => {
                    record.score += ROOK_BONUS * sign;
                    sweep_rays(board, &mut attacks, &mut record, pos, &ROOK_DIRS, mover);
                }
                PieceKind::Bishop => {
                    record.score += BISHOP_BONUS * sign;
                    sweep_rays(board, &mut attacks, &mut record, pos, &BISHOP_DIRS, mover);
                }
                PieceKind::Queen => {
                    record.score += QUEEN_BONUS * sign;
                    sweep_rays(board, &mut attacks, &mut record, pos, &ROOK_DIRS, mover);
                    sweep_rays(board, &mut attacks, &mut record, pos, &BISHOP_DIRS, mover);
                }
                PieceKind::Knight => {
                    record.score += KNIGHT_BONUS * sign;
                    for (dr, dc) in KNIGHT_DELTAS {
                        eval_step(board, &mut attacks, &mut record, pos, row + dr, col + dc, mover);
                    }
                }
                PieceKind::King => {
                    record.score += KING_BONUS * sign;

                    for dr in -1..=1 {
                        for dc in -1..=1 {
                            if dr == 0 && dc == 0 {
                                continue;
                            }
                            if !row_col_ok(row + dr) || !row_col_ok(col + dc) {
                                continue;
                            }
                            let to = Pos::new((row + dr) as u8, (col + dc) as u8);
                            let target = board.get(to);
                            let open = target.kind() == PieceKind::Empty || target.side() != side;
                            // an enemy-covered square is out of the king's
                            // reach; its own cover still counts as attack
                            if !open || attacks.count(!side, to) == 0 {
                                record.score += CAN_MOVE_BONUS * sign;
                                if open && side == mover {
                                    let kind = if target.kind() == PieceKind::Empty {
                                        MoveKind::Quiet
                                    } else {
                                        MoveKind::Capture
                                    };
                                    record.moves.push(Move::pack(pos, to, kind));
                                }
                            }
                            attacks.bump(side, to);
                        }
                    }

                    if col == 4 && !square.has_moved() && attacks.count(!side, pos) == 0 {
                        castling(board, &attacks, &mut record, pos, side, mover);
                    }
                }
                PieceKind::Empty => unreachable!(),
            }

            // piece in center bonus
            if (row == 3 || row == 4) && (col == 3 || col == 4) {
                record.score += CENTER_BONUS * sign;
            } else if (2..=5).contains(&row) && (2..=5).contains(&col) {
                record.score += NEAR_CENTER_BONUS * sign;
            }
        }
    }

    // attacker count pass
    for idx in 0..64u8 {
        let pos = Pos(idx);
        let square = board.get(pos);
        if square.kind() == PieceKind::Empty {
            continue;
        }
        let side = square.side();
        let sign = side.sign();
        let friendly = attacks.count(side, pos);
        let enemy = attacks.count(!side, pos);
        if friendly == 0 && enemy == 0 {
            continue;
        }

        if square.kind() == PieceKind::King && side != mover && enemy > 0 {
            // the opponent moved into a state where their king is capturable
            record.moves.clear();
            record.set_exact_score(AFTER_CHECKMATE_SCORE * mover.sign());
            return record;
        }

        if square.kind() == PieceKind::King {
            if enemy > 0 {
                record.score += CHECK_PENALTY * sign;
                record.is_quiet = false;
            }
        } else {
            // more attackers than defenders
            if enemy > friendly {
                record.score += OUTNUMBERED_PIECE_PENALTY * sign;
            }
            // no attackers, at least one defender
            if enemy == 0 && friendly > 0 {
                record.score += GUARDED_PIECE_BONUS * sign;
            }
        }
    }

    if record.moves.is_empty() {
        record.set_exact_score(STALEMATE_SCORE * mover.sign());
        return record;
    }

    record.status = EvalStatus::DoneComplete;
    record
}

// ############################
//       PIECE STEPPING
// ############################

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Scores one candidate destination: mobility bonus, attack/defense count,
/// and move registration when the piece belongs to the side to move.
/// Returns true when a ray walking through this square must stop.
fn eval_step(
    board: &Board,
    attacks: &mut AttackMap,
    record: &mut EvalRecord,
    from: Pos,
    row: i8,
    col: i8,
    mover: Side,
) -> bool {
    if !row_col_ok(row) || !row_col_ok(col) {
        return true;
    }

    let to = Pos::new(row as u8, col as u8);
    let piece = board.get(from);
    let side = piece.side();
    let target = board.get(to);

    // every reachable square counts toward mobility, friendly blockers
    // included; that reach is what makes a blocker a defended piece
    record.score += CAN_MOVE_BONUS * side.sign();
    if (target.kind() == PieceKind::Empty || target.side() != side) && side == mover {
        let kind = if target.kind() == PieceKind::Empty {
            MoveKind::Quiet
        } else {
            MoveKind::Capture
        };
        record.moves.push(Move::pack(from, to, kind));
    }

    attacks.bump(side, to);

    target.kind() != PieceKind::Empty
}

fn sweep_rays(
    board: &Board,
    attacks: &mut AttackMap,
    record: &mut EvalRecord,
    from: Pos,
    dirs: &[(i8, i8)],
    mover: Side,
) {
    for &(dr, dc) in dirs {
        let mut row = from.row() as i8 + dr;
        let mut col = from.col() as i8 + dc;
        while !eval_step(board, attacks, record, from, row, col, mover) {
            row += dr;
            col += dc;
        }
    }
}

fn castling(
    board: &Board,
    attacks: &AttackMap,
    record: &mut EvalRecord,
    king_pos: Pos,
    side: Side,
    mover: Side,
) {
    let row = king_pos.row();
    let sign = side.sign();

    // short: rook on the h-file, f and g empty and unattacked
    let rook = board.get(Pos::new(row, 7));
    if rook.kind() == PieceKind::Rook && !rook.has_moved() {
        let clear = (5..=6).all(|middle_col| {
            let middle = Pos::new(row, middle_col);
            board.get(middle).kind() == PieceKind::Empty && attacks.count(!side, middle) == 0
        });
        if clear {
            record.score += CAN_MOVE_BONUS * sign;
            if side == mover {
                record
                    .moves
                    .push(Move::pack(king_pos, Pos::new(row, 6), MoveKind::Quiet));
            }
        }
    }

    // long: rook on the a-file, b, c and d empty and unattacked
    let rook = board.get(Pos::new(row, 0));
    if rook.kind() == PieceKind::Rook && !rook.has_moved() {
        let clear = (1..=3).all(|middle_col| {
            let middle = Pos::new(row, middle_col);
            board.get(middle).kind() == PieceKind::Empty && attacks.count(!side, middle) == 0
        });
        if clear {
            record.score += CAN_MOVE_BONUS * sign;
            if side == mover {
                record
                    .moves
                    .push(Move::pack(king_pos, Pos::new(row, 2), MoveKind::Quiet));
            }
        }
    }
}
