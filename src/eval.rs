//! Valutazione dello stato di gioco: attacchi, scacco, matto, stallo,
//! materiale insufficiente e bilancio materiale.

use serde::Serialize;

use crate::board::Board;
use crate::movegen;
use crate::piece::{Color, Piece, PieceKind, BISHOP_OFFSETS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_OFFSETS};
use crate::position::Position;
use crate::utils::{self, Square};

/// Material balance as seen from each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaterialScore {
    pub w: i32,
    pub b: i32,
}

/// Is `sq` attacked by any piece of color `by`?
///
/// Order: pawns, knights, diagonal sliders, orthogonal sliders, king.
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    let pawn = Piece::new(PieceKind::Pawn, by);
    // a pawn of `by` attacks `sq` from the squares its own captures come from
    for delta in by.pawn_captures() {
        if let Some(from) = utils::offset(sq, -delta) {
            if board.piece(from) == pawn {
                return true;
            }
        }
    }

    let knight = Piece::new(PieceKind::Knight, by);
    for delta in KNIGHT_OFFSETS {
        if let Some(from) = utils::offset(sq, delta) {
            if board.piece(from) == knight {
                return true;
            }
        }
    }

    let bishop = Piece::new(PieceKind::Bishop, by);
    let rook = Piece::new(PieceKind::Rook, by);
    let queen = Piece::new(PieceKind::Queen, by);
    if ray_hits(board, sq, &BISHOP_OFFSETS, bishop, queen) {
        return true;
    }
    if ray_hits(board, sq, &ROOK_OFFSETS, rook, queen) {
        return true;
    }

    let king = Piece::new(PieceKind::King, by);
    for delta in KING_OFFSETS {
        if let Some(from) = utils::offset(sq, delta) {
            if board.piece(from) == king {
                return true;
            }
        }
    }
    false
}

// Walk each ray until the first occupied square and compare it to the sliders
fn ray_hits(board: &Board, sq: Square, dirs: &[isize], slider: Piece, queen: Piece) -> bool {
    for &dir in dirs {
        let mut cur = sq;
        while let Some(next) = utils::offset(cur, dir) {
            let p = board.piece(next);
            if p == slider || p == queen {
                return true;
            }
            if !p.is_empty() {
                break;
            }
            cur = next;
        }
    }
    false
}

pub fn is_in_check(pos: &Position, side: Color) -> bool {
    is_square_attacked(pos.board(), pos.king_square(side), side.opposite())
}

/// True if at least one pseudo-legal move of `side` leaves its king safe.
/// Every candidate is applied and rolled back, so `pos` is unchanged on return.
pub fn has_legal_move(pos: &mut Position, side: Color) -> bool {
    let index = movegen::generate_moves(pos, side);
    let found = index.iter().any(|&mv| movegen::is_move_legal(pos, mv));
    found
}

pub fn is_checkmate(pos: &mut Position, side: Color) -> bool {
    is_in_check(pos, side) && !has_legal_move(pos, side)
}

pub fn is_stalemate(pos: &mut Position, side: Color) -> bool {
    !is_in_check(pos, side) && !has_legal_move(pos, side)
}

/// K v K, K+minor v K, and K+B v K+B with both bishops on one square color.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut total = 0usize;
    let mut minors = 0usize;
    let mut bishops: Vec<(Color, Square)> = Vec::with_capacity(2);
    for (sq, kind, color) in board.pieces() {
        total += 1;
        match kind {
            PieceKind::Knight => minors += 1,
            PieceKind::Bishop => {
                minors += 1;
                bishops.push((color, sq));
            }
            _ => {}
        }
    }

    match total {
        0..=2 => true,
        3 => minors == 1,
        4 => match bishops.as_slice() {
            [(c1, s1), (c2, s2)] => {
                c1 != c2 && utils::is_light_square(*s1) == utils::is_light_square(*s2)
            }
            _ => false,
        },
        _ => false,
    }
}

/// Sum of piece values, White positive. `b` mirrors `w` (and stays 0 at 0).
pub fn material_advantage(board: &Board) -> MaterialScore {
    let total: i32 = board
        .pieces()
        .map(|(_, kind, color)| match color {
            Color::White => kind.value(),
            Color::Black => -kind.value(),
        })
        .sum();
    MaterialScore {
        w: total,
        b: if total == 0 { 0 } else { -total },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::utils::algebraic_to_square as sq;

    #[test]
    fn pawn_attacks_point_forward() {
        let pos = fen::parse("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let b = pos.board();
        // e4 pawn hits d5 and f5
        assert!(is_square_attacked(b, sq("d5").unwrap(), Color::White));
        assert!(is_square_attacked(b, sq("f5").unwrap(), Color::White));
        assert!(!is_square_attacked(b, sq("e5").unwrap(), Color::White));
        // d5 pawn hits c4 and e4
        assert!(is_square_attacked(b, sq("e4").unwrap(), Color::Black));
        assert!(!is_square_attacked(b, sq("d4").unwrap(), Color::Black));
    }

    #[test]
    fn sliders_are_blocked() {
        let pos = fen::parse("4k3/8/8/8/1b6/8/3P4/4K3 w - - 0 1").unwrap();
        // b4 bishop towards e1 is blocked by d2
        assert!(!is_square_attacked(pos.board(), sq("e1").unwrap(), Color::Black));
        assert!(is_square_attacked(pos.board(), sq("d2").unwrap(), Color::Black));
    }

    #[test]
    fn material_balance() {
        let pos = fen::parse(fen::START_FEN).unwrap();
        assert_eq!(material_advantage(pos.board()), MaterialScore { w: 0, b: 0 });
        let pos = fen::parse("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(material_advantage(pos.board()), MaterialScore { w: 5, b: -5 });
    }

    #[test]
    fn knight_and_bishop_endings() {
        let kn = fen::parse("8/8/8/8/8/8/5N2/k6K w - - 0 1").unwrap();
        assert!(is_insufficient_material(kn.board()));
        let kr = fen::parse("8/8/8/8/8/8/5R2/k6K w - - 0 1").unwrap();
        assert!(!is_insufficient_material(kr.board()));
        let two_bishops_same_side = fen::parse("8/8/8/8/8/4B3/5B2/k6K w - - 0 1").unwrap();
        assert!(!is_insufficient_material(two_bishops_same_side.board()));
    }
}
