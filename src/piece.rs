//! Piece values, colors and the 0x88 offset tables shared by move generation
//! and attack detection.
//!
//! Orientation: index 0 is a8 and rank 8 is row 0, so "up the board" for
//! White is a negative offset (-16).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    #[serde(rename = "w")]
    White = 0,
    #[serde(rename = "b")]
    Black = 1,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Side letter as used in the FEN side-to-move field.
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Offset of a single pawn push.
    #[inline]
    pub fn pawn_push(self) -> isize {
        match self {
            Color::White => -16,
            Color::Black => 16,
        }
    }

    /// Offsets of the two diagonal pawn captures.
    #[inline]
    pub fn pawn_captures(self) -> [isize; 2] {
        match self {
            Color::White => [-15, -17],
            Color::Black => [15, 17],
        }
    }

    /// Row (0 = rank 8) where this color's pawns start.
    #[inline]
    pub fn pawn_home_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row from which a single push promotes.
    #[inline]
    pub fn promotion_source_row(self) -> usize {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.opposite()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Material value in pawns (king counts zero).
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    /// Lowercase letter (p, n, b, r, q, k).
    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Case-insensitive letter lookup.
    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    pub fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

/// Content of one 0x88 slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Piece {
    #[default]
    Empty,
    /// Sentinel for the right-hand half of the 0x88 array.
    OffBoard,
    White(PieceKind),
    Black(PieceKind),
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        match color {
            Color::White => Piece::White(kind),
            Color::Black => Piece::Black(kind),
        }
    }

    #[inline]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Piece::White(k) | Piece::Black(k) => Some(k),
            _ => None,
        }
    }

    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Piece::White(_) => Some(Color::White),
            Piece::Black(_) => Some(Color::Black),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    #[inline]
    pub fn is(self, kind: PieceKind, color: Color) -> bool {
        self == Piece::new(kind, color)
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn fen_char(self) -> Option<char> {
        match self {
            Piece::White(k) => Some(k.to_char().to_ascii_uppercase()),
            Piece::Black(k) => Some(k.to_char()),
            _ => None,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_char(c)?;
        if c.is_ascii_uppercase() {
            Some(Piece::White(kind))
        } else {
            Some(Piece::Black(kind))
        }
    }
}

// Offset tables (0x88, a8 = 0)
pub const KNIGHT_OFFSETS: [isize; 8] = [33, 31, 18, 14, -33, -31, -18, -14];
pub const BISHOP_OFFSETS: [isize; 4] = [15, 17, -15, -17];
pub const ROOK_OFFSETS: [isize; 4] = [16, -16, 1, -1];
pub const KING_OFFSETS: [isize; 8] = [16, -16, 1, -1, 15, 17, -15, -17];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_chars_round_trip() {
        for kind in PieceKind::ALL {
            for color in Color::BOTH {
                let p = Piece::new(kind, color);
                let c = p.fen_char().unwrap();
                assert_eq!(Piece::from_fen_char(c), Some(p));
            }
        }
        assert_eq!(Piece::from_fen_char('x'), None);
        assert_eq!(Piece::Empty.fen_char(), None);
        assert_eq!(Piece::OffBoard.color(), None);
    }

    #[test]
    fn pawn_directions_are_mirrored() {
        assert_eq!(Color::White.pawn_push(), -Color::Black.pawn_push());
        let [a, b] = Color::White.pawn_captures();
        let [c, d] = Color::Black.pawn_captures();
        assert_eq!((a, b), (-c, -d));
        assert_eq!(!Color::White, Color::Black);
    }
}
