// Scacchiera 0x88: 128 slot, la metà destra contiene solo sentinelle OffBoard.
// Mapping: a8 = 0, h8 = 7, a1 = 112, h1 = 119

use serde::Serialize;

use crate::piece::{Color, Piece, PieceKind};
use crate::utils::{self, Square, BOARD_SIZE};

/// One entry of [`Board::snapshot`], shaped for presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceInfo {
    pub square: String,
    pub piece: char,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareShade {
    Light,
    Dark,
}

/// A square by name: its shade and whatever stands on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquareInfo {
    pub square: String,
    pub shade: SquareShade,
    pub piece: Option<PieceInfo>,
}

/// Piece placement only. Knows nothing about turns, rights or legality.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Piece; BOARD_SIZE],
}

impl Board {
    /// Empty board: every real square `Empty`, every padding slot `OffBoard`.
    pub fn new() -> Self {
        let mut squares = [Piece::OffBoard; BOARD_SIZE];
        for sq in utils::iter_squares() {
            squares[sq] = Piece::Empty;
        }
        Self { squares }
    }

    #[inline]
    pub fn piece(&self, sq: Square) -> Piece {
        self.squares[sq]
    }

    #[inline]
    pub fn set_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(utils::is_on_board(sq), "set_piece on padding slot {sq}");
        debug_assert!(piece != Piece::OffBoard, "OffBoard is not placeable");
        self.squares[sq] = piece;
    }

    /// Clear a square, returning what was there.
    pub fn remove_piece(&mut self, sq: Square) -> Piece {
        let old = self.squares[sq];
        self.set_piece(sq, Piece::Empty);
        old
    }

    #[inline]
    pub fn color_of(&self, sq: Square) -> Option<Color> {
        self.squares[sq].color()
    }

    #[inline]
    pub fn is_empty_square(&self, sq: Square) -> bool {
        self.squares[sq].is_empty()
    }

    pub fn clear(&mut self) {
        for sq in utils::iter_squares() {
            self.squares[sq] = Piece::Empty;
        }
    }

    /// Call `f` for every occupied square, a8 to h1.
    pub fn for_each_piece<F: FnMut(Square, PieceKind, Color)>(&self, mut f: F) {
        for sq in utils::iter_squares() {
            let p = self.squares[sq];
            if let (Some(kind), Some(color)) = (p.kind(), p.color()) {
                f(sq, kind, color);
            }
        }
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, PieceKind, Color)> + '_ {
        utils::iter_squares().filter_map(move |sq| {
            let p = self.squares[sq];
            Some((sq, p.kind()?, p.color()?))
        })
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, PieceKind)> + '_ {
        self.pieces()
            .filter(move |&(_, _, c)| c == color)
            .map(|(sq, k, _)| (sq, k))
    }

    /// Number of pieces on the board, kings included.
    pub fn count(&self) -> usize {
        self.pieces().count()
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|&(_, k)| k == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    pub fn square_info(&self, sq: Square) -> SquareInfo {
        let p = self.squares[sq];
        let name = utils::square_to_algebraic(sq);
        let piece = match (p.fen_char(), p.color()) {
            (Some(ch), Some(color)) => Some(PieceInfo {
                square: name.clone(),
                piece: ch,
                color,
            }),
            _ => None,
        };
        SquareInfo {
            square: name,
            shade: if utils::is_light_square(sq) {
                SquareShade::Light
            } else {
                SquareShade::Dark
            },
            piece,
        }
    }

    /// Pieces with algebraic squares, for collaborators outside the engine.
    pub fn snapshot(&self) -> Vec<PieceInfo> {
        let mut out = Vec::with_capacity(32);
        self.for_each_piece(|sq, kind, color| {
            out.push(PieceInfo {
                square: utils::square_to_algebraic(sq),
                piece: Piece::new(kind, color).fen_char().unwrap_or('?'),
                color,
            });
        });
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rows = Vec::with_capacity(8);
        for row in 0..8 {
            let line: String = (0..8)
                .map(|file| self.squares[utils::square(row, file)].fen_char().unwrap_or('.'))
                .collect();
            rows.push(line);
        }
        f.debug_struct("Board").field("rows", &rows).finish()
    }
}
