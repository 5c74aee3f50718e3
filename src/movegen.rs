//! Pseudo-legal move generation on the 0x88 board, the legality filter and
//! perft counters.

use crate::eval;
use crate::moves::{Move, MoveIndex};
use crate::piece::{Color, Piece, PieceKind, BISHOP_OFFSETS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_OFFSETS};
use crate::position::{castle_path, CastleSide, Position};
use crate::utils::{self, Square};

/// Pseudo-legal moves of every piece of `side`. Moves may leave the mover's
/// king in check; see [`legal_moves`] for the filtered set.
///
/// The en-passant target only applies when `side` is the side to move.
pub fn generate_moves(pos: &Position, side: Color) -> MoveIndex {
    let mut index = MoveIndex::new();
    generate_moves_into(pos, side, &mut index);
    index
}

/// Same as [`generate_moves`] but reuses `index`, which is reset first.
pub fn generate_moves_into(pos: &Position, side: Color, index: &mut MoveIndex) {
    index.reset();
    for (from, _) in pos.board().pieces_of(side) {
        generate_moves_from_square(pos, from, index);
    }
}

/// Dispatch on the piece standing on `from`; empty squares add nothing.
pub fn generate_moves_from_square(pos: &Position, from: Square, out: &mut MoveIndex) {
    let piece = pos.board().piece(from);
    let (Some(kind), Some(color)) = (piece.kind(), piece.color()) else {
        return;
    };
    match kind {
        PieceKind::Pawn => pawn_moves(pos, from, color, out),
        PieceKind::Knight => jump_moves(pos, from, color, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => slider_moves(pos, from, color, &BISHOP_OFFSETS, out),
        PieceKind::Rook => slider_moves(pos, from, color, &ROOK_OFFSETS, out),
        PieceKind::Queen => {
            slider_moves(pos, from, color, &ROOK_OFFSETS, out);
            slider_moves(pos, from, color, &BISHOP_OFFSETS, out);
        }
        PieceKind::King => {
            jump_moves(pos, from, color, &KING_OFFSETS, out);
            castling_moves(pos, from, color, out);
        }
    }
}

fn slider_moves(pos: &Position, from: Square, color: Color, dirs: &[isize], out: &mut MoveIndex) {
    let board = pos.board();
    for &dir in dirs {
        let mut cur = from;
        while let Some(to) = utils::offset(cur, dir) {
            match board.piece(to).color() {
                None => out.add(Move::quiet(from, to)),
                Some(c) if c == color => break,
                Some(_) => {
                    out.add(Move::capture(from, to));
                    break;
                }
            }
            cur = to;
        }
    }
}

// Knight and king share the one-step logic
fn jump_moves(pos: &Position, from: Square, color: Color, deltas: &[isize], out: &mut MoveIndex) {
    let board = pos.board();
    for &delta in deltas {
        let Some(to) = utils::offset(from, delta) else {
            continue;
        };
        match board.piece(to).color() {
            None => out.add(Move::quiet(from, to)),
            Some(c) if c != color => out.add(Move::capture(from, to)),
            Some(_) => {}
        }
    }
}

fn castling_moves(pos: &Position, from: Square, color: Color, out: &mut MoveIndex) {
    let board = pos.board();
    let enemy = color.opposite();
    for side in [CastleSide::King, CastleSide::Queen] {
        if !pos.castling().has(color, side) {
            continue;
        }
        let path = castle_path(color, side);
        if from != path.king_from {
            continue;
        }
        if !board.piece(path.rook_from).is(PieceKind::Rook, color) {
            continue;
        }
        if !path.between.iter().all(|&sq| board.is_empty_square(sq)) {
            continue;
        }
        if path
            .king_walk
            .iter()
            .any(|&sq| eval::is_square_attacked(board, sq, enemy))
        {
            continue;
        }
        out.add(Move::castling(path.king_from, path.king_to));
    }
}

fn pawn_moves(pos: &Position, from: Square, color: Color, out: &mut MoveIndex) {
    let board = pos.board();
    let row = utils::row_of(from);
    let promotes = row == color.promotion_source_row();

    // Spinta singola (promozione se dalla penultima traversa) e doppia
    if let Some(one) = utils::offset(from, color.pawn_push()) {
        if board.is_empty_square(one) {
            if promotes {
                add_promotions(Move::quiet(from, one), out);
            } else {
                out.add(Move::quiet(from, one));
                if row == color.pawn_home_row() {
                    if let Some(two) = utils::offset(one, color.pawn_push()) {
                        if board.is_empty_square(two) {
                            out.add(Move::double_push(from, two));
                        }
                    }
                }
            }
        }
    }

    let ep = if pos.side_to_move() == color {
        pos.en_passant()
    } else {
        None
    };
    for delta in color.pawn_captures() {
        let Some(to) = utils::offset(from, delta) else {
            continue;
        };
        match board.piece(to).color() {
            Some(c) if c != color => {
                if promotes {
                    add_promotions(Move::capture(from, to), out);
                } else {
                    out.add(Move::capture(from, to));
                }
            }
            None if ep == Some(to) && passed_pawn_behind(pos, to, color) => {
                out.add(Move::en_passant(from, to))
            }
            _ => {}
        }
    }
}

// The pawn taken en passant must really be there
fn passed_pawn_behind(pos: &Position, target: Square, color: Color) -> bool {
    utils::offset(target, -color.pawn_push())
        .map(|sq| pos.board().piece(sq).is(PieceKind::Pawn, color.opposite()))
        .unwrap_or(false)
}

fn add_promotions(base: Move, out: &mut MoveIndex) {
    for kind in PieceKind::PROMOTIONS {
        out.add(base.with_promotion(kind));
    }
}

/// Apply `mv`, test the mover's king, roll back.
pub fn is_move_legal(pos: &mut Position, mv: Move) -> bool {
    let Some(mover) = pos.board().piece(mv.from).color() else {
        return false;
    };
    let undo = pos.apply(mv);
    let safe = !eval::is_square_attacked(pos.board(), pos.king_square(mover), mover.opposite());
    pos.rollback(undo);
    safe
}

/// Pseudo-legal moves of `side` filtered down to the ones that keep its
/// king out of check.
pub fn legal_moves(pos: &mut Position, side: Color) -> MoveIndex {
    let pseudo = generate_moves(pos, side);
    let mut legal = MoveIndex::new();
    for &mv in pseudo.iter() {
        if is_move_legal(pos, mv) {
            legal.add(mv);
        }
    }
    legal
}

/// Legal leaf count at `depth` for the side to move.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let side = pos.side_to_move();
    let moves = legal_moves(pos, side);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for &mv in moves.iter() {
        let undo = pos.apply(mv);
        nodes += perft(pos, depth - 1);
        pos.rollback(undo);
    }
    nodes
}

/// Like [`perft`] without the legality filter.
pub fn perft_pseudo(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_moves(pos, pos.side_to_move());
    let mut nodes = 0u64;
    for &mv in moves.iter() {
        let undo = pos.apply(mv);
        nodes += perft_pseudo(pos, depth - 1);
        pos.rollback(undo);
    }
    nodes
}

/// Per-root-move breakdown of [`perft`], in generation order.
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let side = pos.side_to_move();
    let moves = legal_moves(pos, side);
    let mut out = Vec::with_capacity(moves.len());
    for &mv in moves.iter() {
        let undo = pos.apply(mv);
        out.push((mv, perft(pos, depth - 1)));
        pos.rollback(undo);
    }
    out
}

/// Can one of `side`'s pseudo-legal moves land on the enemy king?
pub fn attacks_king(pos: &Position, side: Color) -> bool {
    let index = generate_moves(pos, side);
    let king = Piece::new(PieceKind::King, side.opposite());
    let hit = index.iter().any(|mv| pos.board().piece(mv.to) == king);
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::utils::{algebraic_to_square as sq, E1, E8, G1};

    fn pos(fen: &str) -> Position {
        fen::parse(fen).unwrap()
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let p = pos(fen::START_FEN);
        let index = generate_moves(&p, Color::White);
        assert_eq!(index.len(), 20);
        assert_eq!(index.targets(sq("g1").unwrap()).len(), 2);
        let double = index.find(sq("e2").unwrap(), sq("e4").unwrap(), None).unwrap();
        assert!(double.double_push);
    }

    #[test]
    fn knight_in_corner() {
        let p = pos("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        let mut out = MoveIndex::new();
        generate_moves_from_square(&p, sq("a1").unwrap(), &mut out);
        let mut targets = out.targets(sq("a1").unwrap()).to_vec();
        targets.sort();
        assert_eq!(targets, vec![sq("b3").unwrap(), sq("c2").unwrap()]);
    }

    #[test]
    fn rook_stops_at_own_piece_and_captures_enemy() {
        let p = pos("4k3/8/8/8/r2R2P1/8/8/4K3 w - - 0 1");
        let mut out = MoveIndex::new();
        let d4 = sq("d4").unwrap();
        generate_moves_from_square(&p, d4, &mut out);
        assert!(out.contains(d4, sq("a4").unwrap()));
        assert!(out.find(d4, sq("a4").unwrap(), None).unwrap().capture);
        assert!(out.contains(d4, sq("f4").unwrap()));
        assert!(!out.contains(d4, sq("g4").unwrap()));
        assert!(!out.contains(d4, sq("h4").unwrap()));
        // 3 left, 2 right, 4 up, 3 down
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let p = pos("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        let mut out = MoveIndex::new();
        generate_moves_from_square(&p, sq("d4").unwrap(), &mut out);
        assert_eq!(out.len(), 27);
    }

    #[test]
    fn pawn_promotions_branch_four_ways() {
        let p = pos("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        let mut out = MoveIndex::new();
        let a7 = sq("a7").unwrap();
        generate_moves_from_square(&p, a7, &mut out);
        // a8 push x4, capture b8 x4
        assert_eq!(out.len(), 8);
        assert_eq!(out.targets(a7).len(), 2);
        assert!(out.iter().all(|m| m.promotion.is_some()));
    }

    #[test]
    fn en_passant_capture_is_flagged() {
        let p = pos("rnbqkb1r/pp1pppp1/5n1p/2pP4/2P5/8/PP2PPPP/RNBQKBNR w KQkq c6 0 3");
        let index = generate_moves(&p, Color::White);
        let mv = index.find(sq("d5").unwrap(), sq("c6").unwrap(), None).unwrap();
        assert!(mv.en_passant && mv.capture);
    }

    #[test]
    fn en_passant_needs_the_passed_pawn() {
        let mut p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let e5 = sq("e5").unwrap();
        let d6 = sq("d6").unwrap();
        assert!(generate_moves(&p, Color::White).contains(e5, d6));

        // same target with the pawn swapped for a knight behind the board's back
        p.board.set_piece(sq("d5").unwrap(), Piece::Black(PieceKind::Knight));
        assert!(!generate_moves(&p, Color::White).contains(e5, d6));
    }

    #[test]
    fn castling_needs_rights_empty_path_and_safe_walk() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let index = generate_moves(&p, Color::White);
        assert!(index.find(E1, G1, None).unwrap().castling);
        assert!(index.contains(E1, sq("c1").unwrap()));

        let no_rights = pos("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        assert!(!generate_moves(&no_rights, Color::White).contains(E1, G1));

        let blocked = pos("r3k2r/8/8/8/8/8/8/R3KB1R w KQkq - 0 1");
        assert!(!generate_moves(&blocked, Color::White).contains(E1, G1));

        // f1 attacked by the f3 rook
        let through_check = pos("4k3/8/8/8/8/5r2/8/R3K2R w KQ - 0 1");
        let index = generate_moves(&through_check, Color::White);
        assert!(!index.contains(E1, G1));
        assert!(index.contains(E1, sq("c1").unwrap()));

        let black = generate_moves(&p, Color::Black);
        assert!(black.find(E8, sq("g8").unwrap(), None).unwrap().castling);
    }

    #[test]
    fn legal_filter_drops_pinned_piece_moves() {
        // e2 knight pinned by the e8 rook
        let mut p = pos("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let legal = legal_moves(&mut p, Color::White);
        assert!(!legal.has_moves(sq("e2").unwrap()));
        assert!(legal.has_moves(E1));
    }

    #[test]
    fn perft_start_position() {
        let mut p = pos(fen::START_FEN);
        assert_eq!(perft_pseudo(&mut p, 1), 20);
        assert_eq!(perft_pseudo(&mut p, 2), 400);
        assert_eq!(perft(&mut p, 3), 8_902);
        let divide = perft_divide(&mut p, 2);
        assert_eq!(divide.len(), 20);
        assert!(divide.iter().all(|&(_, n)| n == 20));
    }

    #[test]
    fn kings_are_never_captured_in_the_start_tree() {
        let p = pos(fen::START_FEN);
        assert!(!attacks_king(&p, Color::White));
    }
}
