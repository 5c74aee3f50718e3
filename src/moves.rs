// Move value type, compact u32 packing and the per-square move index

use std::collections::BTreeMap;
use std::fmt;

use crate::piece::PieceKind;
use crate::utils::{self, Square};

// Layout del formato compatto (u32):
// Bits 0-6: from (0-127)
// Bits 7-13: to (0-127)
// Bits 14-17: promotion (0 = none, kind + 1)
// Bit 18: capture, 19: double push, 20: en passant, 21: castling
const SQ_MASK: u32 = 0x7F;
const TO_SHIFT: u32 = 7;
const PROMO_SHIFT: u32 = 14;
const CAPTURE_BIT: u32 = 1 << 18;
const DOUBLE_PUSH_BIT: u32 = 1 << 19;
const EN_PASSANT_BIT: u32 = 1 << 20;
const CASTLING_BIT: u32 = 1 << 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub capture: bool,
    pub double_push: bool,
    pub en_passant: bool,
    pub castling: bool,
}

impl Move {
    pub fn quiet(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            capture: false,
            double_push: false,
            en_passant: false,
            castling: false,
        }
    }

    pub fn capture(from: Square, to: Square) -> Self {
        Self {
            capture: true,
            ..Self::quiet(from, to)
        }
    }

    pub fn double_push(from: Square, to: Square) -> Self {
        Self {
            double_push: true,
            ..Self::quiet(from, to)
        }
    }

    /// Captures the pawn beside `from`; `to` is the (empty) en-passant square.
    pub fn en_passant(from: Square, to: Square) -> Self {
        Self {
            capture: true,
            en_passant: true,
            ..Self::quiet(from, to)
        }
    }

    /// King move of two squares; the rook is moved by the position.
    pub fn castling(from: Square, to: Square) -> Self {
        Self {
            castling: true,
            ..Self::quiet(from, to)
        }
    }

    pub fn with_promotion(self, kind: PieceKind) -> Self {
        Self {
            promotion: Some(kind),
            ..self
        }
    }

    pub fn pack(&self) -> u32 {
        let promo = self.promotion.map(|k| k as u32 + 1).unwrap_or(0);
        let mut raw = (self.from as u32 & SQ_MASK)
            | ((self.to as u32 & SQ_MASK) << TO_SHIFT)
            | ((promo & 0xF) << PROMO_SHIFT);
        if self.capture {
            raw |= CAPTURE_BIT;
        }
        if self.double_push {
            raw |= DOUBLE_PUSH_BIT;
        }
        if self.en_passant {
            raw |= EN_PASSANT_BIT;
        }
        if self.castling {
            raw |= CASTLING_BIT;
        }
        raw
    }

    pub fn unpack(raw: u32) -> Self {
        let promotion = match (raw >> PROMO_SHIFT) & 0xF {
            0 => None,
            code => PieceKind::ALL.get(code as usize - 1).copied(),
        };
        Self {
            from: (raw & SQ_MASK) as Square,
            to: ((raw >> TO_SHIFT) & SQ_MASK) as Square,
            promotion,
            capture: raw & CAPTURE_BIT != 0,
            double_push: raw & DOUBLE_PUSH_BIT != 0,
            en_passant: raw & EN_PASSANT_BIT != 0,
            castling: raw & CASTLING_BIT != 0,
        }
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn to_uci(&self) -> String {
        let mut s = format!(
            "{}{}",
            utils::square_to_algebraic(self.from),
            utils::square_to_algebraic(self.to)
        );
        if let Some(kind) = self.promotion {
            s.push(kind.to_char());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Moves grouped by source square.
///
/// `targets` keeps each destination once (four promotions share one target),
/// `moves` keeps every encoded move so flags can be recovered from a bare
/// from/to pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveIndex {
    targets: BTreeMap<Square, Vec<Square>>,
    moves: BTreeMap<Square, Vec<Move>>,
}

impl MoveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mv: Move) {
        let targets = self.targets.entry(mv.from).or_default();
        if !targets.contains(&mv.to) {
            targets.push(mv.to);
        }
        self.moves.entry(mv.from).or_default().push(mv);
    }

    /// Must run before every full generation pass.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.moves.clear();
    }

    pub fn targets(&self, from: Square) -> &[Square] {
        self.targets.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn moves_from(&self, from: Square) -> &[Move] {
        self.moves.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, from: Square, to: Square) -> bool {
        self.targets(from).contains(&to)
    }

    /// Look up the encoded move for a from/to pair. For promotions a missing
    /// `promotion` selects the queen.
    pub fn find(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Option<Move> {
        let mut candidates = self.moves_from(from).iter().filter(|m| m.to == to);
        match promotion {
            Some(kind) => candidates.find(|m| m.promotion == Some(kind)).copied(),
            None => candidates
                .find(|m| m.promotion.is_none() || m.promotion == Some(PieceKind::Queen))
                .copied(),
        }
    }

    pub fn has_moves(&self, from: Square) -> bool {
        self.targets.contains_key(&from)
    }

    /// Number of encoded moves (promotions count once per piece kind).
    pub fn len(&self) -> usize {
        self.moves.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.moves.values().flatten()
    }

    pub fn sources(&self) -> impl Iterator<Item = Square> + '_ {
        self.targets.keys().copied()
    }

    /// Algebraic view: "e2" -> ["e3", "e4"].
    pub fn to_algebraic_map(&self) -> BTreeMap<String, Vec<String>> {
        self.targets
            .iter()
            .map(|(&from, tos)| {
                (
                    utils::square_to_algebraic(from),
                    tos.iter().map(|&to| utils::square_to_algebraic(to)).collect(),
                )
            })
            .collect()
    }
}
