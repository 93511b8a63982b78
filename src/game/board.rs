// src/game/board.rs

use std::fmt;

use colored::*;

use crate::game::defs::{PieceKind, Pos, Side, Square};
use crate::game::moves::{parse_wire, Move, ParseMoveError};

// ############################
//           BOARD
// ############################

/// Value-type 8x8 board. Equality and hashing cover every packed cell byte
/// plus the side to move, so castling rights and en-passant windows produce
/// distinct cache keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Square; 64],
    turn: Side,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [Square::EMPTY; 64],
            turn: Side::White,
        }
    }

    /// The standard chess initial array, White to move.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();
        for col in 0..8 {
            board.set(Pos::new(1, col), Square::new(PieceKind::Pawn, Side::White));
            board.set(Pos::new(6, col), Square::new(PieceKind::Pawn, Side::Black));
        }
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, &kind) in back_rank.iter().enumerate() {
            board.set(Pos::new(0, col as u8), Square::new(kind, Side::White));
            board.set(Pos::new(7, col as u8), Square::new(kind, Side::Black));
        }
        board
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Square {
        self.squares[pos.index()]
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, square: Square) {
        self.squares[pos.index()] = square;
    }

    #[inline]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[inline]
    pub fn set_turn(&mut self, side: Side) {
        self.turn = side;
    }

    // ############################
    //        MOVE APPLY
    // ############################

    pub fn make_move(&self, mv: Move) -> Board {
        self.make_move_parts(mv.from_sq(), mv.to_sq(), mv.promotion())
    }

    /// Applies a move without any legality checking. Produces a new board;
    /// the receiver is untouched.
    pub fn make_move_parts(&self, from: Pos, to: Pos, promotion: PieceKind) -> Board {
        let mut next = *self;

        // the double-push flag lives for exactly one half-move
        for row in 3..=4 {
            for col in 0..8 {
                let pos = Pos::new(row, col);
                let sq = next.get(pos);
                if sq.kind() == PieceKind::Pawn && sq.double_pushed() {
                    next.set(pos, sq.without_double_push());
                }
            }
        }

        next.turn = !next.turn;

        let mover = next.get(from);
        next.set(from, Square::EMPTY);
        next.set(to, Square::new(mover.kind(), mover.side()).moved());

        if mover.kind() == PieceKind::Pawn {
            // a diagonal pawn move onto an empty square is en passant
            if from.col() != to.col() && self.get(to).kind() == PieceKind::Empty {
                next.set(Pos::new(from.row(), to.col()), Square::EMPTY);
            }
            if (from.row() as i8 - to.row() as i8).abs() == 2 {
                next.set(
                    to,
                    Square::new(PieceKind::Pawn, mover.side())
                        .moved()
                        .with_double_push(),
                );
            }
        }

        if mover.kind() == PieceKind::King && from.col() == 4 {
            if to.col() == 6 {
                // short: rook hops h-file -> f-file
                let rook = next.get(Pos::new(from.row(), 7));
                next.set(Pos::new(from.row(), 7), Square::EMPTY);
                next.set(
                    Pos::new(from.row(), 5),
                    Square::new(rook.kind(), rook.side()).moved(),
                );
            } else if to.col() == 2 {
                // long: rook hops a-file -> d-file
                let rook = next.get(Pos::new(from.row(), 0));
                next.set(Pos::new(from.row(), 0), Square::EMPTY);
                next.set(
                    Pos::new(from.row(), 3),
                    Square::new(rook.kind(), rook.side()).moved(),
                );
            }
        }

        if promotion != PieceKind::Empty {
            next.set(to, Square::new(promotion, mover.side()).moved());
        }

        next
    }

    /// Parses and applies a wire move (`e2e4`, `e7e8q`).
    pub fn make_move_str(&self, s: &str) -> Result<Board, ParseMoveError> {
        let (from, to, promotion) = parse_wire(s)?;
        Ok(self.make_move_parts(from, to, promotion))
    }

    // ############################
    //          RENDERING
    // ############################

    /// Plain textual form: a `Move:SIDE` header, then rank 8 down to rank 1,
    /// Black pieces uppercase, White lowercase, empty squares as `.`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(9 * 9);
        out.push_str("Move:");
        out.push_str(&self.turn.to_string());
        out.push('\n');
        for row in (0..8).rev() {
            for col in 0..8 {
                out.push(piece_char(self.get(Pos::new(row, col))));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

fn piece_char(sq: Square) -> char {
    let ch = match sq.kind() {
        PieceKind::Empty => return '.',
        PieceKind::Pawn => 'p',
        PieceKind::Rook => 'r',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    if sq.side() == Side::Black {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Unicode chess symbols
        let symbols_white = ["♚\u{FE0E}", "♛\u{FE0E}", "♜\u{FE0E}", "♞\u{FE0E}", "♝\u{FE0E}", "♟\u{FE0E}"];
        let symbols_black = ["♔\u{FE0E}", "♕\u{FE0E}", "♖\u{FE0E}", "♘\u{FE0E}", "♗\u{FE0E}", "♙\u{FE0E}"];

        // board colors (lichess palette)
        let light = (240, 217, 181);
        let dark = (181, 136, 99);

        // loop over ranks 8 -> 1
        for row in (0u8..8).rev() {
            // rank label in red
            write!(f, "{} ", (row + 1).to_string().red())?;

            for col in 0u8..8 {
                let sq = self.get(Pos::new(row, col));
                let symbol = match sq.kind() {
                    PieceKind::Empty => " ",
                    kind => {
                        let idx = match kind {
                            PieceKind::King => 0,
                            PieceKind::Queen => 1,
                            PieceKind::Rook => 2,
                            PieceKind::Knight => 3,
                            PieceKind::Bishop => 4,
                            _ => 5,
                        };
                        if sq.side() == Side::White {
                            symbols_white[idx]
                        } else {
                            symbols_black[idx]
                        }
                    }
                };

                // background depends on square color
                let (r, g, b) = if (row + col) % 2 == 0 { light } else { dark };

                let cell = format!(" {} ", symbol)
                    .on_truecolor(r, g, b)
                    .truecolor(0, 0, 0);

                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "   {}", " a  b  c  d  e  f  g  h".red())?;
        writeln!(f, "   {} to move", self.turn.to_string().to_lowercase())
    }
}
