// FEN parsing/serialisation per Position

use crate::board::Board;
use crate::error::FenError;
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{CastlingRights, Position};
use crate::utils::{self, Square};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN record into a fresh position.
///
/// Only the placement and side fields are mandatory. Missing castling or
/// en-passant fields read as `-`, missing counters default to `0 1`.
/// Nothing is returned unless every present field is well formed.
pub fn parse(fen: &str) -> Result<Position, FenError> {
    let mut fields = fen.split_whitespace();

    let placement = fields
        .next()
        .ok_or_else(|| FenError::Layout("empty FEN".to_string()))?;
    let board = parse_placement(placement)?;

    let side = match fields.next() {
        Some("w") => Color::White,
        Some("b") => Color::Black,
        Some(other) => return Err(FenError::Side(other.to_string())),
        None => return Err(FenError::Side(String::new())),
    };

    let castling = match fields.next() {
        Some(field) => parse_castling(field)?,
        None => CastlingRights::NONE,
    };

    let ep = match fields.next() {
        Some(field) => parse_en_passant(field, side, &board)?,
        None => None,
    };

    let halfmove = match fields.next() {
        Some(field) => field
            .parse::<u16>()
            .map_err(|_| FenError::Counters(field.to_string()))?,
        None => 0,
    };
    let fullmove = match fields.next() {
        Some(field) => field
            .parse::<u16>()
            .map_err(|_| FenError::Counters(field.to_string()))?
            .max(1),
        None => 1,
    };

    Ok(Position::from_parts(board, side, castling, ep, halfmove, fullmove))
}

fn parse_placement(field: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Layout(format!(
            "expected 8 ranks, found {}",
            ranks.len()
        )));
    }

    let mut board = Board::new();
    let mut kings = [0usize; 2];
    // ranks[0] is rank 8, which is row 0 of the 0x88 array
    for (row, rank) in ranks.iter().enumerate() {
        let mut file = 0usize;
        for ch in rank.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(FenError::Layout(format!("bad empty run '{ch}' in {rank:?}")));
                }
                file += run as usize;
            } else {
                let piece = Piece::from_fen_char(ch)
                    .ok_or_else(|| FenError::Layout(format!("unknown piece '{ch}'")))?;
                if file >= 8 {
                    return Err(FenError::Layout(format!("rank {rank:?} is longer than 8 files")));
                }
                if let Piece::White(PieceKind::King) = piece {
                    kings[0] += 1;
                } else if let Piece::Black(PieceKind::King) = piece {
                    kings[1] += 1;
                }
                board.set_piece(utils::square(row, file), piece);
                file += 1;
            }
            if file > 8 {
                return Err(FenError::Layout(format!("rank {rank:?} is longer than 8 files")));
            }
        }
        if file != 8 {
            return Err(FenError::Layout(format!("rank {rank:?} covers {file} files")));
        }
    }

    if kings != [1, 1] {
        return Err(FenError::Layout(format!(
            "need exactly one king per side, found {} white and {} black",
            kings[0], kings[1]
        )));
    }
    Ok(board)
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::NONE;
    if field == "-" {
        return Ok(rights);
    }
    for ch in field.chars() {
        match ch {
            'K' => rights.insert(CastlingRights::WHITE_KING_SIDE),
            'Q' => rights.insert(CastlingRights::WHITE_QUEEN_SIDE),
            'k' => rights.insert(CastlingRights::BLACK_KING_SIDE),
            'q' => rights.insert(CastlingRights::BLACK_QUEEN_SIDE),
            _ => return Err(FenError::Castling(field.to_string())),
        }
    }
    Ok(rights)
}

fn parse_en_passant(field: &str, side: Color, board: &Board) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let bad = || FenError::EnPassant(field.to_string());
    let sq = utils::algebraic_to_square(field).ok_or_else(bad)?;
    // rank 6 with White to move, rank 3 with Black to move
    let expected_row = match side {
        Color::White => 2,
        Color::Black => 5,
    };
    if utils::row_of(sq) != expected_row || !board.is_empty_square(sq) {
        return Err(bad());
    }
    // the pawn that just double-pushed stands behind the target, its start square is empty
    let enemy = side.opposite();
    let pushed = utils::offset(sq, enemy.pawn_push()).ok_or_else(bad)?;
    let origin = utils::offset(sq, -enemy.pawn_push()).ok_or_else(bad)?;
    if !board.piece(pushed).is(PieceKind::Pawn, enemy) || !board.is_empty_square(origin) {
        return Err(bad());
    }
    Ok(Some(sq))
}

/// Placement field only ("rnbqkbnr/pppppppp/...").
pub fn placement(board: &Board) -> String {
    let mut out = String::with_capacity(72);
    for row in 0..8 {
        let mut empty = 0;
        for file in 0..8 {
            match board.piece(utils::square(row, file)).fen_char() {
                Some(ch) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(ch);
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
        if row < 7 {
            out.push('/');
        }
    }
    out
}

/// Full six-field FEN.
pub fn to_fen(pos: &Position) -> String {
    let ep = pos
        .en_passant()
        .map(utils::square_to_algebraic)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} {} {} {} {}",
        placement(pos.board()),
        pos.side_to_move().fen_char(),
        pos.castling().fen_field(),
        ep,
        pos.halfmove_clock(),
        pos.fullmove_number()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{E1, E8};

    #[test]
    fn start_position_round_trip() {
        let pos = parse(START_FEN).unwrap();
        assert_eq!(to_fen(&pos), START_FEN);
        assert_eq!(pos.king_square(Color::White), E1);
        assert_eq!(pos.king_square(Color::Black), E8);
        assert_eq!(pos.board().count(), 32);
    }

    #[test]
    fn short_records_get_defaults() {
        let pos = parse("4k3/8/8/8/8/8/8/4K3 b").unwrap();
        assert_eq!(to_fen(&pos), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        let pos = parse("4k3/8/8/8/8/8/8/4K3 w - - 7").unwrap();
        assert_eq!(pos.halfmove_clock(), 7);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn en_passant_field_is_exported() {
        let fen = "rnbqkb1r/pp1pppp1/5n1p/2pP4/2P5/8/PP2PPPP/RNBQKBNR w KQkq c6 0 3";
        assert_eq!(to_fen(&parse(fen).unwrap()), fen);
    }

    #[test]
    fn each_stage_reports_its_own_error() {
        assert!(matches!(parse(""), Err(FenError::Layout(_))));
        assert!(matches!(parse("8/8/8 w - - 0 1"), Err(FenError::Layout(_))));
        assert!(matches!(
            parse("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::Layout(_))
        ));
        assert!(matches!(
            parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1"),
            Err(FenError::Layout(_))
        ));
        assert!(matches!(
            parse("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::Layout(_))
        ));
        assert!(matches!(parse("8/8/8/8/8/8/8/4K3 w - - 0 1"), Err(FenError::Layout(_))));
        assert!(matches!(parse(&START_FEN.replace(" w ", " x ")), Err(FenError::Side(_))));
        assert!(matches!(parse("4k3/8/8/8/8/8/8/4K3"), Err(FenError::Side(_))));
        assert!(matches!(
            parse("4k3/8/8/8/8/8/8/4K3 w KX - 0 1"),
            Err(FenError::Castling(_))
        ));
        assert!(matches!(
            parse("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::EnPassant(_))
        ));
    }

    #[test]
    fn en_passant_field_must_match_the_board() {
        // wrong rank for the side to move
        assert!(matches!(
            parse("4k3/8/8/8/3pP3/8/8/4K3 w - e3 0 1"),
            Err(FenError::EnPassant(_))
        ));
        // no black pawn behind d6, a knight instead
        assert!(matches!(
            parse("4k3/8/8/3nP3/8/8/8/4K3 w - d6 0 1"),
            Err(FenError::EnPassant(_))
        ));
        // e2 still holds a pawn, nothing double-pushed through e3
        assert!(matches!(
            parse("4k3/8/8/8/8/8/3PP3/4K3 w - e3 0 1"),
            Err(FenError::EnPassant(_))
        ));
        // target occupied
        assert!(matches!(
            parse("4k3/8/3n4/3pP3/8/8/8/4K3 w - d6 0 1"),
            Err(FenError::EnPassant(_))
        ));
        // start square of the push occupied
        assert!(matches!(
            parse("4k3/3n4/8/3pP3/8/8/8/4K3 w - d6 0 1"),
            Err(FenError::EnPassant(_))
        ));
        assert!(parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").is_ok());
        assert!(parse("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").is_ok());
        assert!(matches!(
            parse("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::Counters(_))
        ));
    }
}
