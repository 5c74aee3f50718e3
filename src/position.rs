//! Complete game position and the make/unmake transaction.
//!
//! Everything that legality depends on lives here (placement, side to move,
//! castling rights, en-passant target, counters, king squares), so two
//! positions never share mutable state.

use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind};
use crate::utils::{self, Square, A1, A8, C1, C8, D1, D8, E1, E8, F1, F8, G1, G8, H1, H8};

/// 4-bit castling mask. Bit layout: 3 = K, 2 = Q, 1 = k, 0 = q.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastlingRights {
    pub const WHITE_KING_SIDE: u8 = 0b1000;
    pub const WHITE_QUEEN_SIDE: u8 = 0b0100;
    pub const BLACK_KING_SIDE: u8 = 0b0010;
    pub const BLACK_QUEEN_SIDE: u8 = 0b0001;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn mask(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KING_SIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEEN_SIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KING_SIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEEN_SIDE,
        }
    }

    #[inline]
    pub fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::mask(color, side) != 0
    }

    pub fn insert(&mut self, bits: u8) {
        self.0 |= bits & 0b1111;
    }

    pub fn remove(&mut self, bits: u8) {
        self.0 &= !bits;
    }

    /// FEN castling field ("KQkq", "Kq", "-").
    pub fn fen_field(self) -> String {
        let mut s = String::with_capacity(4);
        for (bit, ch) in [
            (Self::WHITE_KING_SIDE, 'K'),
            (Self::WHITE_QUEEN_SIDE, 'Q'),
            (Self::BLACK_KING_SIDE, 'k'),
            (Self::BLACK_QUEEN_SIDE, 'q'),
        ] {
            if self.0 & bit != 0 {
                s.push(ch);
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

/// Squares involved in one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlePath {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares strictly between king and rook; all must be empty.
    pub between: &'static [Square],
    /// Squares the king stands on or crosses, destination included; none may be attacked.
    pub king_walk: &'static [Square],
}

pub fn castle_path(color: Color, side: CastleSide) -> CastlePath {
    match (color, side) {
        (Color::White, CastleSide::King) => CastlePath {
            king_from: E1,
            king_to: G1,
            rook_from: H1,
            rook_to: F1,
            between: &[F1, G1],
            king_walk: &[E1, F1, G1],
        },
        (Color::White, CastleSide::Queen) => CastlePath {
            king_from: E1,
            king_to: C1,
            rook_from: A1,
            rook_to: D1,
            between: &[D1, C1, utils::B1],
            king_walk: &[E1, D1, C1],
        },
        (Color::Black, CastleSide::King) => CastlePath {
            king_from: E8,
            king_to: G8,
            rook_from: H8,
            rook_to: F8,
            between: &[F8, G8],
            king_walk: &[E8, F8, G8],
        },
        (Color::Black, CastleSide::Queen) => CastlePath {
            king_from: E8,
            king_to: C8,
            rook_from: A8,
            rook_to: D8,
            between: &[D8, C8, utils::B8],
            king_walk: &[E8, D8, C8],
        },
    }
}

// Diritti persi quando un pezzo parte da (o arriva su) queste caselle
fn rights_lost_at(sq: Square) -> u8 {
    match sq {
        E1 => CastlingRights::WHITE_KING_SIDE | CastlingRights::WHITE_QUEEN_SIDE,
        H1 => CastlingRights::WHITE_KING_SIDE,
        A1 => CastlingRights::WHITE_QUEEN_SIDE,
        E8 => CastlingRights::BLACK_KING_SIDE | CastlingRights::BLACK_QUEEN_SIDE,
        H8 => CastlingRights::BLACK_KING_SIDE,
        A8 => CastlingRights::BLACK_QUEEN_SIDE,
        _ => 0,
    }
}

/// Rollback token returned by [`Position::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    pub mv: Move,
    pub moved: Piece,
    /// `Piece::Empty` when nothing was captured.
    pub captured: Piece,
    pub captured_sq: Square,
    pub prev_side: Color,
    pub prev_castling: CastlingRights,
    pub prev_ep: Option<Square>,
    pub prev_halfmove: u16,
    pub prev_fullmove: u16,
    pub prev_king_sq: [Square; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) ep: Option<Square>,
    pub(crate) halfmove: u16,
    pub(crate) fullmove: u16,
    pub(crate) king_sq: [Square; 2],
}

impl Position {
    /// Build a position from parts. Panics if either king is missing, since
    /// every legality query depends on the king squares.
    pub fn from_parts(
        board: Board,
        side: Color,
        castling: CastlingRights,
        ep: Option<Square>,
        halfmove: u16,
        fullmove: u16,
    ) -> Self {
        let white = board.find_king(Color::White);
        let black = board.find_king(Color::Black);
        let (Some(wk), Some(bk)) = (white, black) else {
            panic!("position without both kings: {:?}", board);
        };
        Self {
            board,
            side,
            castling,
            ep,
            halfmove,
            fullmove,
            king_sq: [wk, bk],
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.ep
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_sq[color.index()]
    }

    /// Play `mv` for whichever color stands on `mv.from`, returning the token
    /// that [`Position::rollback`] needs to restore the exact prior state.
    ///
    /// The move is trusted: it must come from the generator (or a replayed
    /// history entry). Side to move becomes the opponent of the mover.
    pub fn apply(&mut self, mv: Move) -> Undo {
        let moved = self.board.piece(mv.from);
        let (Some(kind), Some(mover)) = (moved.kind(), moved.color()) else {
            panic!("apply {mv}: no piece on source square");
        };

        let captured_sq = if mv.en_passant {
            // the captured pawn sits behind the target square
            (mv.to as isize - mover.pawn_push()) as Square
        } else {
            mv.to
        };
        let captured = self.board.piece(captured_sq);

        let undo = Undo {
            mv,
            moved,
            captured,
            captured_sq,
            prev_side: self.side,
            prev_castling: self.castling,
            prev_ep: self.ep,
            prev_halfmove: self.halfmove,
            prev_fullmove: self.fullmove,
            prev_king_sq: self.king_sq,
        };

        self.board.remove_piece(mv.from);
        if mv.en_passant {
            self.board.remove_piece(captured_sq);
        }
        let placed = match mv.promotion {
            Some(promo) => Piece::new(promo, mover),
            None => moved,
        };
        self.board.set_piece(mv.to, placed);

        if kind == PieceKind::King {
            self.king_sq[mover.index()] = mv.to;
            if mv.castling {
                let side = if mv.to > mv.from {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                let path = castle_path(mover, side);
                let rook = self.board.remove_piece(path.rook_from);
                self.board.set_piece(path.rook_to, rook);
            }
        }

        self.castling.remove(rights_lost_at(mv.from) | rights_lost_at(mv.to));

        self.ep = if mv.double_push {
            Some((mv.from + mv.to) / 2)
        } else {
            None
        };

        if kind == PieceKind::Pawn || !captured.is_empty() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove = self.fullmove.saturating_add(1);
        }
        self.side = mover.opposite();

        undo
    }

    /// Undo a move played by [`Position::apply`]. Tokens must be rolled back
    /// in LIFO order.
    pub fn rollback(&mut self, undo: Undo) {
        let mv = undo.mv;
        self.board.remove_piece(mv.to);
        self.board.set_piece(mv.from, undo.moved);
        if !undo.captured.is_empty() {
            self.board.set_piece(undo.captured_sq, undo.captured);
        }

        if mv.castling {
            if let Some(mover) = undo.moved.color() {
                let side = if mv.to > mv.from {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                let path = castle_path(mover, side);
                let rook = self.board.remove_piece(path.rook_to);
                self.board.set_piece(path.rook_from, rook);
            }
        }

        self.side = undo.prev_side;
        self.castling = undo.prev_castling;
        self.ep = undo.prev_ep;
        self.halfmove = undo.prev_halfmove;
        self.fullmove = undo.prev_fullmove;
        self.king_sq = undo.prev_king_sq;
    }

    /// Debug check that the king cache matches the board.
    pub fn king_cache_is_consistent(&self) -> bool {
        Color::BOTH
            .iter()
            .all(|&c| self.board.piece(self.king_sq[c.index()]).is(PieceKind::King, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::utils::algebraic_to_square as sq;

    fn pos(fen: &str) -> Position {
        fen::parse(fen).expect("valid fen")
    }

    #[test]
    fn double_push_sets_en_passant_and_rollback_restores() {
        let mut p = pos(fen::START_FEN);
        let before = p.clone();
        let undo = p.apply(Move::double_push(sq("e2").unwrap(), sq("e4").unwrap()));
        assert_eq!(p.en_passant(), sq("e3"));
        assert_eq!(p.side_to_move(), Color::Black);
        assert_eq!(p.halfmove_clock(), 0);
        p.rollback(undo);
        assert_eq!(p, before);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut p = pos("rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w KQkq c6 0 3");
        let before = p.clone();
        let undo = p.apply(Move::en_passant(sq("d5").unwrap(), sq("c6").unwrap()));
        assert!(p.board().is_empty_square(sq("c5").unwrap()));
        assert_eq!(p.board().piece(sq("c6").unwrap()), Piece::White(PieceKind::Pawn));
        assert_eq!(undo.captured, Piece::Black(PieceKind::Pawn));
        p.rollback(undo);
        assert_eq!(p, before);
    }

    #[test]
    fn castling_moves_rook_and_drops_rights() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let before = p.clone();
        let undo = p.apply(Move::castling(E1, G1));
        assert_eq!(p.board().piece(F1), Piece::White(PieceKind::Rook));
        assert!(p.board().is_empty_square(H1));
        assert_eq!(p.king_square(Color::White), G1);
        assert!(!p.castling().has(Color::White, CastleSide::King));
        assert!(!p.castling().has(Color::White, CastleSide::Queen));
        assert!(p.castling().has(Color::Black, CastleSide::Queen));
        p.rollback(undo);
        assert_eq!(p, before);
        assert!(p.king_cache_is_consistent());
    }

    #[test]
    fn rook_capture_on_corner_revokes_opponent_right() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        p.apply(Move::capture(A1, A8));
        assert_eq!(p.castling().fen_field(), "Kk");
    }

    #[test]
    fn promotion_and_rollback() {
        let mut p = pos("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let before = p.clone();
        let mv = Move::quiet(sq("a7").unwrap(), A8).with_promotion(PieceKind::Knight);
        let undo = p.apply(mv);
        assert_eq!(p.board().piece(A8), Piece::White(PieceKind::Knight));
        p.rollback(undo);
        assert_eq!(p, before);
    }
}
