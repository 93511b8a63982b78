// src/main.rs

use std::env;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::info;

use sablefish::game::board::Board;
use sablefish::game::defs::Side;
use sablefish::search::engine::{run_game, Engine, DEFAULT_QS_DEPTH, DEFAULT_TIME_MS};
use sablefish::search::eval::EvalStatus;

fn main() -> Result<()> {
    sablefish::logging::init_logging();
    reply(&format!("Sablefish {}", env!("CARGO_PKG_VERSION")));

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && args[1] == "play" {
        let side = input("Choose side (w/b): ")?;
        let play_as = if side.eq_ignore_ascii_case("b") {
            Side::Black
        } else {
            Side::White
        };
        run_game(Board::starting_position(), play_as);
        return Ok(());
    }

    let mut engine = Engine::new();
    let mut board = Board::starting_position();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading command input")?;
        let line = line.trim();
        info!("got input: [{}]", line);

        if line == "uci" {
            reply(&format!("id name Sablefish {}", env!("CARGO_PKG_VERSION")));
            reply("id author sablefish");
            reply("uciok");
        } else if line == "isready" {
            reply("readyok");
        } else if line == "ucinewgame" {
            // cached evaluations stay valid across games
        } else if let Some(rest) = line.strip_prefix("position ") {
            handle_position(rest, &mut board)?;
        } else if line == "go" || line.starts_with("go ") {
            handle_go(line, &mut engine, &board);
        } else if line == "stop" || line == "xboard" {
            // accepted and ignored
        } else if line == "pb" {
            print!("{}", board.render());
            info!("board:\n{}", board.render());
        } else if line == "pmd" {
            print_move_details(&engine, &board);
        } else if line == "quit" {
            break;
        } else {
            reply(&format!("Unknown command: {}", line));
        }
    }

    Ok(())
}

fn handle_position(rest: &str, board: &mut Board) -> Result<()> {
    // only "startpos [moves ...]" is supported
    if !rest.starts_with("startpos") {
        info!("unexpected position input: {}", rest);
        return Ok(());
    }
    *board = Board::starting_position();
    if let Some(moves) = rest.strip_prefix("startpos moves ") {
        for mv in moves.split_whitespace() {
            *board = board
                .make_move_str(mv)
                .with_context(|| format!("applying move {:?}", mv))?;
        }
        info!("board after moves:\n{}", board.render());
    }
    Ok(())
}

fn handle_go(line: &str, engine: &mut Engine, board: &Board) {
    let mut to_depth = 4;
    let params: Vec<&str> = line.split_whitespace().collect();
    for pair in params.windows(2) {
        if pair[0] == "depth" {
            if let Ok(depth) = pair[1].parse() {
                to_depth = depth;
            }
        }
    }

    let best = engine.find_best_move(board, to_depth, DEFAULT_QS_DEPTH, DEFAULT_TIME_MS);
    reply(&format!("bestmove {}", best));
}

/// Per-move detail dump: child record status, score, stored bounds, depth,
/// move count and the continuation the cache currently predicts.
fn print_move_details(engine: &Engine, board: &Board) {
    let record = match engine.record(board) {
        Some(record) => record,
        None => {
            reply("No evaluation for the current position yet, run go first.");
            return;
        }
    };

    reply("Moves from current position:");
    for &mv in &record.moves {
        let next = board.make_move(mv);
        match engine.record(&next) {
            Some(child) => {
                let continuation = engine
                    .principal_variation(&next)
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                reply(&format!(
                    "- {} {} score {} ({}, {}) D{} M{} ({})",
                    mv,
                    status_short(child.status),
                    child.score as f32 / 100.0,
                    child.alpha_low as f32 / 100.0,
                    child.beta_high as f32 / 100.0,
                    child.eval_depth,
                    child.moves.len(),
                    continuation,
                ));
            }
            None => reply(&format!("- {} NA", mv)),
        }
    }
}

fn status_short(status: EvalStatus) -> &'static str {
    match status {
        EvalStatus::DonePartial => "AB",
        EvalStatus::DoneComplete => "DC",
        _ => "NA",
    }
}

/// Protocol lines go to stdout and the log file both.
fn reply(s: &str) {
    println!("{}", s);
    info!("{}", s);
}

fn input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush().context("flushing prompt")?;

    let mut buffer = String::new();
    io::stdin()
        .read_line(&mut buffer)
        .context("reading line from stdin")?;

    Ok(buffer.trim().to_string())
}
