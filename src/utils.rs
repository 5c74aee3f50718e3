// 0x88 square helpers: index arithmetic, algebraic names, iteration

/// Index into the 128-slot 0x88 array. Valid iff `sq & 0x88 == 0`.
pub type Square = usize;

pub const BOARD_SIZE: usize = 128;

// Named squares used by castling and tests (a8 = 0, h1 = 119)
pub const A8: Square = 0;
pub const B8: Square = 1;
pub const C8: Square = 2;
pub const D8: Square = 3;
pub const E8: Square = 4;
pub const F8: Square = 5;
pub const G8: Square = 6;
pub const H8: Square = 7;
pub const A1: Square = 112;
pub const B1: Square = 113;
pub const C1: Square = 114;
pub const D1: Square = 115;
pub const E1: Square = 116;
pub const F1: Square = 117;
pub const G1: Square = 118;
pub const H1: Square = 119;

#[inline]
pub fn is_on_board(sq: Square) -> bool {
    sq & 0x88 == 0
}

/// Step from `sq` by `delta`; `None` when the result leaves the board.
///
/// Negative results down to -128 carry bit 7 in two's complement, so the
/// single `& 0x88` test also rejects them.
#[inline]
pub fn offset(sq: Square, delta: isize) -> Option<Square> {
    let target = sq as isize + delta;
    if target & 0x88 != 0 {
        None
    } else {
        Some(target as Square)
    }
}

/// Build a square from row (0 = rank 8) and file (0 = file a).
#[inline]
pub fn square(row: usize, file: usize) -> Square {
    row * 16 + file
}

#[inline]
pub fn row_of(sq: Square) -> usize {
    sq >> 4
}

#[inline]
pub fn file_of(sq: Square) -> usize {
    sq & 7
}

/// True for light squares (a8, h1, ...).
#[inline]
pub fn is_light_square(sq: Square) -> bool {
    (row_of(sq) + file_of(sq)) % 2 == 0
}

/// Vertical mirror: a1 <-> a8, e2 <-> e7.
#[inline]
pub fn mirror(sq: Square) -> Square {
    square(7 - row_of(sq), file_of(sq))
}

/// Iterate the 64 real squares row by row, a8 first.
pub fn iter_squares() -> impl Iterator<Item = Square> {
    (0..8).flat_map(|row| (0..16).map(move |file| row * 16 + file)).filter(|&sq| is_on_board(sq))
}

/// Convert a square index to algebraic notation (e.g. 116 -> "e1").
pub fn square_to_algebraic(sq: Square) -> String {
    debug_assert!(is_on_board(sq), "square {sq} is off the board");
    let file = (b'a' + file_of(sq) as u8) as char;
    let rank = (b'8' - row_of(sq) as u8) as char;
    format!("{}{}", file, rank)
}

/// Convert algebraic notation to a square index (e.g. "a8" -> 0).
pub fn algebraic_to_square(name: &str) -> Option<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(square((b'8' - rank) as usize, (file - b'a') as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_names() {
        assert_eq!(algebraic_to_square("a8"), Some(A8));
        assert_eq!(algebraic_to_square("h1"), Some(H1));
        assert_eq!(algebraic_to_square("e1"), Some(E1));
        assert_eq!(algebraic_to_square("i1"), None);
        assert_eq!(algebraic_to_square("e9"), None);
        assert_eq!(algebraic_to_square("e"), None);
        for sq in iter_squares() {
            assert_eq!(algebraic_to_square(&square_to_algebraic(sq)), Some(sq));
        }
    }

    #[test]
    fn offsets_detect_edges() {
        assert_eq!(offset(H1, 1), None);
        assert_eq!(offset(A8, -1), None);
        assert_eq!(offset(A8, -16), None);
        assert_eq!(offset(A8, -33), None);
        assert_eq!(offset(H1, 33), None);
        assert_eq!(offset(E1, -16), algebraic_to_square("e2"));
        assert_eq!(iter_squares().count(), 64);
    }

    #[test]
    fn square_colors() {
        assert!(is_light_square(A8));
        assert!(is_light_square(H1));
        assert!(!is_light_square(A1));
        assert_eq!(mirror(E1), E8);
    }
}
