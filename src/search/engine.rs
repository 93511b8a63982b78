// src/search/engine.rs

use std::io::{self, Write};

use log::info;
use rustc_hash::FxHashSet;

use crate::game::board::Board;
use crate::game::defs::Side;
use crate::game::moves::Move;
use crate::search::eval::{evaluate_board, EvalRecord, MAX_SCORE, MIN_SCORE};
use crate::search::search::{alphabeta, SearchCtrl, SearchOutcome};
use crate::search::table::TranspositionCache;

pub const MAX_DEPTH: i16 = 6;
pub const DEFAULT_QS_DEPTH: i16 = 2;
pub const DEFAULT_TIME_MS: i32 = 5000;

/// Engine facade: owns the transposition cache and drives the searcher.
/// One instance per game; the cache is never shared.
pub struct Engine {
    cache: TranspositionCache,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            cache: TranspositionCache::new(),
        }
    }

    /// Cached record for a position, if the search has seen it.
    pub fn record(&self, board: &Board) -> Option<&EvalRecord> {
        self.cache.get(board)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// One fixed-depth search over the shared cache. `find_best_move` is
    /// the usual entry point; this is for callers driving depth themselves.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &mut self,
        board: &Board,
        ctrl: &mut SearchCtrl,
        depth: i16,
        alpha: i16,
        beta: i16,
        qs_depth: i16,
        from_quiet_move: bool,
    ) -> SearchOutcome {
        alphabeta(
            &mut self.cache,
            board,
            ctrl,
            depth,
            alpha,
            beta,
            qs_depth,
            from_quiet_move,
        )
    }

    /// Iterative deepening up to `to_depth` plies (clamped to [`MAX_DEPTH`]),
    /// continuing past it while the time budget allows. Returns the best
    /// move of the deepest completed pass; the default move is only
    /// returned when no pass completed, and must not be applied.
    pub fn find_best_move(
        &mut self,
        board: &Board,
        to_depth: i16,
        to_qs_depth: i16,
        allowed_time_ms: i32,
    ) -> Move {
        let to_depth = to_depth.min(MAX_DEPTH);
        let mut ctrl = SearchCtrl::new(allowed_time_ms, to_depth);

        self.cache.trim_if_oversized();
        info!("started findBestMove to depth {}", to_depth);

        let mut chosen: Option<(Move, i16)> = None;
        let mut have_time_for_more = false;
        let mut depth = to_depth.min(3);
        while depth <= to_depth || have_time_for_more {
            match alphabeta(
                &mut self.cache,
                board,
                &mut ctrl,
                depth,
                MIN_SCORE,
                MAX_SCORE,
                to_qs_depth,
                true,
            ) {
                SearchOutcome::Success(_) => {
                    if let Some(record) = self.cache.get(board) {
                        chosen = Some((record.best_move, record.score));
                    }
                }
                _ => break,
            }
            ctrl.depth_achieved = depth;

            if let Some((best_move, score)) = chosen {
                info!(
                    "depth {} took {}ms, evaluated boards: {}, best move {}, score {}",
                    depth,
                    ctrl.elapsed_ms(),
                    ctrl.nodes_evaluated,
                    best_move,
                    score
                );
            }

            have_time_for_more = allowed_time_ms > 0
                && depth < to_depth * 2
                && ctrl.elapsed_ms() < allowed_time_ms / 6;
            depth += 1;
        }

        let (best_move, score) = chosen.unwrap_or_default();
        println!("info score cp {}", score * board.turn().sign());
        info!(
            "done findBestMove in {}ms, eval: {}",
            ctrl.elapsed_ms(),
            score as f32 / 100.0
        );

        let variation = self.principal_variation(board);
        info!(
            "best move sequence: {}",
            variation
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );

        best_move
    }

    /// Follows best moves through the cache starting at `board`, stopping
    /// on a missing or depth-exhausted record, an empty move list, or a
    /// board already visited in this walk.
    pub fn principal_variation(&self, board: &Board) -> Vec<Move> {
        let mut sequence = Vec::new();
        let mut seen: FxHashSet<Board> = FxHashSet::default();
        let mut current = *board;
        while let Some(record) = self.cache.get(&current) {
            if record.eval_depth == 0 || record.moves.is_empty() {
                break;
            }
            seen.insert(current);
            sequence.push(record.best_move);
            current = current.make_move(record.best_move);
            if seen.contains(&current) {
                break;
            }
        }
        sequence
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ############################
//       TERMINAL PLAY
// ############################

/// Interactive game on the terminal: the human enters wire moves, the
/// engine answers with its own search.
pub fn run_game(init_pos: Board, play_as: Side) {
    let mut engine = Engine::new();
    let mut board = init_pos;
    println!("{}", board);

    loop {
        if evaluate_board(&board).moves.is_empty() {
            if board.turn() == play_as {
                println!("CHECKMATE! YOU LOSE!");
            } else {
                println!("CHECKMATE! YOU WIN!");
            }
            break;
        }

        if board.turn() != play_as {
            let mv = engine.find_best_move(&board, MAX_DEPTH, DEFAULT_QS_DEPTH, DEFAULT_TIME_MS);
            println!("Engine plays {}", mv);
            board = board.make_move(mv);
            println!("{}", board);
            continue;
        }

        let entry = input("Make move (e.g. e2e4): ");
        match board.make_move_str(&entry) {
            Ok(next) => {
                board = next;
                println!("{}", board);
            }
            Err(err) => eprintln!("Illegal or unparseable move: {}", err),
        }
    }
}

fn input(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().unwrap();

    let mut buffer = String::new();
    io::stdin()
        .read_line(&mut buffer)
        .expect("Failed to read line");

    buffer.trim().to_string()
}
