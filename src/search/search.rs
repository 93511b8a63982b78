// src/search/search.rs

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use log::info;

use crate::game::board::Board;
use crate::game::defs::Side;
use crate::game::moves::{Move, MoveKind};
use crate::search::eval::{
    evaluate_board, EvalRecord, EvalStatus, AFTER_CHECKMATE_SCORE, MAX_SCORE, MIN_SCORE,
};
use crate::search::table::TranspositionCache;

pub const NODE_REPORT_CADENCE: u32 = 1000;

const MATE_DISTANCE_DECAY: i16 = -5;

/// Outcome of one recursive search call. `Timeout` and `Loop` are control
/// signals, not errors: a timeout unwinds the whole search, a loop makes
/// the parent skip the offending move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Success(i16),
    Timeout,
    Loop,
}

// ############################
//        SEARCH CONTROL
// ############################

/// Node accounting and the soft time budget. Timeouts are only checked
/// every [`NODE_REPORT_CADENCE`] freshly evaluated positions.
pub struct SearchCtrl {
    pub nodes_evaluated: u32,
    pub depth_achieved: i16,
    depth_required: i16,
    allowed_time_ms: i32,
    start: Instant,
    last_report: Instant,
}

impl SearchCtrl {
    pub fn new(allowed_time_ms: i32, depth_required: i16) -> Self {
        let now = Instant::now();
        Self {
            nodes_evaluated: 0,
            depth_achieved: 0,
            depth_required,
            allowed_time_ms,
            start: now,
            last_report: now,
        }
    }

    #[inline]
    pub fn elapsed_ms(&self) -> i32 {
        self.start.elapsed().as_millis() as i32
    }

    /// Counts a freshly evaluated node; true when the search must stop.
    fn on_node_evaluated(&mut self) -> bool {
        self.nodes_evaluated += 1;
        if self.nodes_evaluated % NODE_REPORT_CADENCE == 0 {
            self.report();
            if self.should_timeout() {
                return true;
            }
        }
        false
    }

    fn report(&mut self) {
        if self.last_report.elapsed() < Duration::from_millis(1000) {
            return;
        }
        self.last_report = Instant::now();
        let elapsed = self.elapsed_ms();
        let nps = 1000 * self.nodes_evaluated as i64 / (elapsed as i64 + 1);
        info!("{}ms evaluated nodes: {}", elapsed, self.nodes_evaluated);
        println!(
            "info depth {} nodes {} nps {}",
            self.depth_achieved, self.nodes_evaluated, nps
        );
    }

    /// The requested depth is always completed; only deepening beyond it is
    /// stopped, and only after a generous overrun of the time budget.
    fn should_timeout(&self) -> bool {
        self.depth_achieved >= self.depth_required
            && self.allowed_time_ms > 0
            && self.elapsed_ms() > 2 * self.allowed_time_ms
    }
}

// ############################
//        MOVE ORDERING
// ############################

#[derive(Clone, Copy)]
struct ChildSnapshot {
    status: EvalStatus,
    score: i16,
    alpha_low: i16,
    beta_high: i16,
}

impl ChildSnapshot {
    fn of(record: &EvalRecord) -> Self {
        Self {
            status: record.status,
            score: record.score,
            alpha_low: record.alpha_low,
            beta_high: record.beta_high,
        }
    }
}

#[derive(Clone, Copy)]
struct MoveScore {
    mv: Move,
    child: Option<ChildSnapshot>,
}

/// Total order putting the most promising move first for `side`: searched
/// moves before unsearched, complete records before partial, then by score,
/// captures over quiets, and finally the packed move word ascending so that
/// equal inputs always order the same way.
fn best_first(lhs: &MoveScore, rhs: &MoveScore, side: Side) -> Ordering {
    match (&lhs.child, &rhs.child) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            match (lhs.mv.is_capture(), rhs.mv.is_capture()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
            lhs.mv.as_u32().cmp(&rhs.mv.as_u32())
        }
        (Some(lc), Some(rc)) => {
            if lc.status != rc.status {
                return if lc.status == EvalStatus::DoneComplete {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }

            let partial_score = |c: &ChildSnapshot| {
                if c.status == EvalStatus::DonePartial {
                    if side == Side::White {
                        c.alpha_low
                    } else {
                        c.beta_high
                    }
                } else {
                    c.score
                }
            };
            let mut lscore = partial_score(lc);
            let mut rscore = partial_score(rc);

            if lscore == rscore {
                match (lhs.mv.is_capture(), rhs.mv.is_capture()) {
                    (true, false) => return Ordering::Less,
                    (false, true) => return Ordering::Greater,
                    _ => {}
                }
                lscore = lc.score;
                rscore = rc.score;
            }

            if lscore != rscore {
                return if side == Side::White {
                    rscore.cmp(&lscore)
                } else {
                    lscore.cmp(&rscore)
                };
            }

            lhs.mv.as_u32().cmp(&rhs.mv.as_u32())
        }
    }
}

/// Sorts `scores[begin..end]` best-first and writes the resulting move
/// order back into the cached record's move list.
fn reorder_moves(
    cache: &mut TranspositionCache,
    board: &Board,
    scores: &mut [MoveScore],
    side: Side,
    begin: usize,
    end: usize,
) {
    if begin >= end {
        return;
    }
    scores[begin..end].sort_by(|a, b| best_first(a, b, side));
    if let Some(record) = cache.get_mut(board) {
        for (i, entry) in scores.iter().enumerate().take(end).skip(begin) {
            record.moves[i] = entry.mv;
        }
    }
}

// ############################
//         ALPHA-BETA
// ############################

/// Recursive alpha-beta over the shared record cache.
///
/// The record for `board` is mutated through fresh cache lookups only;
/// child state needed for move ordering is snapshotted right after each
/// recursive call returns, so no two live handles to the same record ever
/// exist (transpositions can alias arbitrarily).
pub(crate) fn alphabeta(
    cache: &mut TranspositionCache,
    board: &Board,
    ctrl: &mut SearchCtrl,
    depth_left: i16,
    mut alpha: i16,
    mut beta: i16,
    qs_left: i16,
    from_quiet_move: bool,
) -> SearchOutcome {
    let mut fresh = false;
    let (status, mut eval_depth, mut qs_depth, is_quiet, stored_score, alpha_low, beta_high) = {
        let record = cache.get_or_insert_with(board, || {
            fresh = true;
            evaluate_board(board)
        });
        (
            record.status,
            record.eval_depth,
            record.qs_depth,
            record.is_quiet,
            record.score,
            record.alpha_low,
            record.beta_high,
        )
    };

    if fresh && ctrl.on_node_evaluated() {
        return SearchOutcome::Timeout;
    }

    // this position is already on the current search path
    if status == EvalStatus::InEvaluation {
        return SearchOutcome::Loop;
    }

    if status == EvalStatus::DonePartial {
        if eval_depth as i16 >= depth_left && qs_depth as i16 >= qs_left {
            if board.turn() == Side::White && beta_high >= beta {
                return SearchOutcome::Success(beta);
            }
            if board.turn() == Side::Black && alpha_low <= alpha {
                return SearchOutcome::Success(alpha);
            }
        }

        // the stored bound is useless for this window, fall back to a
        // plain heuristic record and search below it again
        if let Some(record) = cache.get_mut(board) {
            record.eval_depth = 0;
            record.qs_depth = 0;
            record.status = EvalStatus::DoneComplete;
        }
        eval_depth = 0;
        qs_depth = 0;
    }

    // With enough stored depth, a quiet position reached by a quiet move is
    // final; a position needing the quiescence extension is final only when
    // enough quiescence depth is stored as well.
    let quiet_extension_needed = !is_quiet || !from_quiet_move;
    let depth_ok = eval_depth as i16 >= depth_left;
    if depth_ok && (!quiet_extension_needed || qs_depth as i16 >= qs_left) {
        return SearchOutcome::Success(stored_score);
    }

    let regular = (eval_depth as i16) < depth_left;
    let side = board.turn();

    let moves: Vec<Move> = cache
        .get(board)
        .map(|r| r.moves.clone())
        .unwrap_or_default();
    let mut scores: Vec<MoveScore> = moves
        .iter()
        .map(|&mv| MoveScore { mv, child: None })
        .collect();

    if let Some(record) = cache.get_mut(board) {
        record.status = EvalStatus::InEvaluation;
    }

    let mut best = if side == Side::White {
        MIN_SCORE
    } else {
        MAX_SCORE
    };
    let mut best_move = Move::default();

    for (idx, &mv) in moves.iter().enumerate() {
        // past the regular depth only tactical continuations are examined
        let examine = regular || !is_quiet || mv.is_capture();
        if !examine {
            continue;
        }

        let child_quiet = is_quiet && mv.kind() == MoveKind::Quiet;
        let child_board = board.make_move(mv);
        let outcome = alphabeta(
            cache,
            &child_board,
            ctrl,
            if depth_left > 0 { depth_left - 1 } else { 0 },
            alpha,
            beta,
            if depth_left > 0 { qs_left } else { qs_left - 1 },
            child_quiet,
        );

        let child_score = match outcome {
            SearchOutcome::Timeout => {
                // reset so a later search can re-enter this node cleanly
                if let Some(record) = cache.get_mut(board) {
                    record.status = EvalStatus::DoneComplete;
                    record.eval_depth = 0;
                    record.qs_depth = 0;
                }
                return SearchOutcome::Timeout;
            }
            SearchOutcome::Loop => continue,
            SearchOutcome::Success(score) => score,
        };

        scores[idx].child = cache.get(&child_board).map(ChildSnapshot::of);

        if (side == Side::White && best < child_score)
            || (side == Side::Black && best > child_score)
        {
            best = child_score;
            best_move = mv;
        }

        if side == Side::White {
            if best >= beta {
                if let Some(record) = cache.get_mut(board) {
                    record.beta_high = beta;
                    record.status = EvalStatus::DonePartial;
                    record.eval_depth = depth_left.max(0) as u8;
                    record.qs_depth = qs_left.max(0) as u8;
                    record.best_move = mv;
                }
                reorder_moves(cache, board, &mut scores, side, 1, idx + 1);
                return SearchOutcome::Success(beta);
            }
            if best > alpha {
                alpha = best;
            }
        } else {
            if best <= alpha {
                if let Some(record) = cache.get_mut(board) {
                    record.alpha_low = alpha;
                    record.status = EvalStatus::DonePartial;
                    record.eval_depth = depth_left.max(0) as u8;
                    record.qs_depth = qs_left.max(0) as u8;
                    record.best_move = mv;
                }
                reorder_moves(cache, board, &mut scores, side, 1, idx + 1);
                return SearchOutcome::Success(alpha);
            }
            if best < beta {
                beta = best;
            }
        }
    }

    // quiescence may find nothing tactical; the stored score then stands
    let searched = best != MIN_SCORE && best != MAX_SCORE;
    let mut final_score = stored_score;
    if let Some(record) = cache.get_mut(board) {
        if searched {
            record.score = best;
        }
        record.status = EvalStatus::DoneComplete;
        record.eval_depth = depth_left.max(0) as u8;
        record.qs_depth = qs_left.max(0) as u8;
        record.best_move = best_move;
        if record.score.abs() > AFTER_CHECKMATE_SCORE / 2 {
            // shorter mates keep the higher score at ancestor nodes
            record.score += if record.score > 0 {
                MATE_DISTANCE_DECAY
            } else {
                -MATE_DISTANCE_DECAY
            };
        }
        final_score = record.score;
    }

    let len = scores.len();
    reorder_moves(cache, board, &mut scores, side, 0, len);

    SearchOutcome::Success(final_score)
}
