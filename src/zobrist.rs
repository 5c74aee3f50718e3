// Zobrist hashing con tabelle precalcolate (costruite una sola volta)
use std::sync::OnceLock;

use crate::piece::{Color, Piece, PieceKind};
use crate::position::Position;
use crate::utils::{self, Square, BOARD_SIZE};

struct ZobristKeys {
    // indexed by 0x88 square, padding slots stay unused
    piece: [[u64; BOARD_SIZE]; 12],
    side: u64,
    castling: [u64; 16],
    ep_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn split_mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

fn build_keys() -> ZobristKeys {
    let mut piece = [[0u64; BOARD_SIZE]; 12];
    for (i, row) in piece.iter_mut().enumerate() {
        for sq in utils::iter_squares() {
            row[sq] = split_mix64((i as u64).wrapping_mul(0xad3) + (sq as u64).wrapping_mul(0x47a1));
        }
    }
    let mut castling = [0u64; 16];
    for (i, key) in castling.iter_mut().enumerate() {
        *key = split_mix64((i as u64 + 1).wrapping_mul(0x1234_abcd));
    }
    let mut ep_file = [0u64; 8];
    for (i, key) in ep_file.iter_mut().enumerate() {
        *key = split_mix64((i as u64 + 1).wrapping_mul(0x3333_5555));
    }
    ZobristKeys {
        piece,
        side: split_mix64(0xdeadbeefdeadbeef),
        castling,
        ep_file,
    }
}

fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build_keys)
}

/// Build the tables eagerly. Hashing builds them on first use anyway.
pub fn init_zobrist() {
    let _ = keys();
}

fn piece_index(kind: PieceKind, color: Color) -> usize {
    color.index() * 6 + kind.index()
}

/// Full hash of placement, side to move, castling rights and en-passant file.
pub fn hash_position(pos: &Position) -> u64 {
    let keys = keys();
    let mut h = 0u64;
    for (sq, kind, color) in pos.board().pieces() {
        h ^= keys.piece[piece_index(kind, color)][sq];
    }
    if pos.side_to_move() == Color::Black {
        h ^= keys.side;
    }
    h ^= keys.castling[pos.castling().bits() as usize];
    if let Some(ep) = pos.en_passant().filter(|&ep| en_passant_capturable(pos, ep)) {
        h ^= keys.ep_file[utils::file_of(ep)];
    }
    h
}

// Solo se un pedone del tratto può davvero catturare sulla casella en passant
fn en_passant_capturable(pos: &Position, ep: Square) -> bool {
    let side = pos.side_to_move();
    let pawn = Piece::new(PieceKind::Pawn, side);
    for delta in side.pawn_captures() {
        if utils::offset(ep, -delta).map(|from| pos.board().piece(from)) == Some(pawn) {
            return true;
        }
    }
    false
}
