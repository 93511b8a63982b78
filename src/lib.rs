// src/lib.rs

pub mod game;
pub mod logging;
pub mod search;

pub use game::board::Board;
pub use game::defs::{PieceKind, Pos, Side, Square};
pub use game::moves::{Move, MoveKind, ParseMoveError};
pub use search::engine::Engine;
