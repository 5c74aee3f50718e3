pub mod board;
pub mod error;
pub mod eval;
pub mod fen;
pub mod game;
pub mod invoker;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod position;
pub mod utils;
pub mod zobrist;

pub use error::{FenError, InvalidSquare, MoveError};
pub use game::{Game, GameStatus, MoveOutcome};
pub use moves::{Move, MoveIndex};
pub use piece::{Color, Piece, PieceKind};
pub use position::Position;

/// Build the lazily initialized tables up front.
pub fn init() {
    zobrist::init_zobrist();
}
