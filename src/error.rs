//! Error types returned by the public API.

use thiserror::Error;

use crate::piece::Color;

/// FEN parse failure, one variant per field of the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("invalid board layout: {0}")]
    Layout(String),
    #[error("invalid side to move: {0:?}")]
    Side(String),
    #[error("invalid castling field: {0:?}")]
    Castling(String),
    #[error("invalid en-passant field: {0:?}")]
    EnPassant(String),
    #[error("invalid move counter: {0:?}")]
    Counters(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square name: {0:?}")]
pub struct InvalidSquare(pub String);

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Square(#[from] InvalidSquare),
    #[error("no piece on {0}")]
    NoPiece(String),
    #[error("piece on {square} belongs to {owner}, but it is {side} to move")]
    WrongTurn {
        square: String,
        owner: Color,
        side: Color,
    },
    #[error("{0} is occupied by a piece of the moving side")]
    OwnPieceOnTarget(String),
    #[error("{from}{to} is not a move of the piece on {from}")]
    Unreachable { from: String, to: String },
    #[error("{from}{to} would leave the king in check")]
    LeavesKingInCheck { from: String, to: String },
    #[error("invalid move text: {0:?}")]
    Notation(String),
}
