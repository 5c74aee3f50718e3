//! A playable game: position, legal-move index, history and repetition
//! tracking behind one value. Squares are exchanged as algebraic names.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::board::{PieceInfo, SquareInfo};
use crate::error::{FenError, InvalidSquare, MoveError};
use crate::eval::{self, MaterialScore};
use crate::fen::{self, START_FEN};
use crate::invoker::{HistoryEntry, MoveInvoker};
use crate::movegen;
use crate::moves::{Move, MoveIndex};
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{CastlingRights, Position};
use crate::utils::{self, Square};
use crate::zobrist;

/// Half-moves without a capture or pawn move that end the game.
pub const FIFTY_MOVE_PLIES: u16 = 100;

/// Summary of the position for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Check)
    }
}

/// What happened when a move was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub uci: String,
    /// FEN letter of the captured piece.
    pub captured: Option<char>,
    pub castling: bool,
    pub en_passant: bool,
    pub promotion: Option<PieceKind>,
    pub check: bool,
    pub status: GameStatus,
    pub fen: String,
}

#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    legal: MoveIndex,
    invoker: MoveInvoker,
    // hashes[i] is the position after i active moves
    hashes: Vec<u64>,
}

impl Game {
    pub fn new() -> Self {
        Self::from_fen(START_FEN).expect("start position FEN is valid")
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let position = fen::parse(fen)?;
        let mut game = Self {
            position,
            legal: MoveIndex::new(),
            invoker: MoveInvoker::new(),
            hashes: Vec::new(),
        };
        game.reset_tracking();
        debug!("loaded {fen}");
        Ok(game)
    }

    /// Replace the position. On error the game is left untouched.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenError> {
        self.position = fen::parse(fen)?;
        self.invoker.clear();
        self.reset_tracking();
        debug!("loaded {fen}");
        Ok(())
    }

    fn reset_tracking(&mut self) {
        self.hashes.clear();
        self.hashes.push(zobrist::hash_position(&self.position));
        self.refresh_legal();
    }

    fn refresh_legal(&mut self) {
        let side = self.position.side_to_move();
        self.legal = movegen::legal_moves(&mut self.position, side);
    }

    pub fn fen(&self) -> String {
        fen::to_fen(&self.position)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.position.castling()
    }

    pub fn en_passant(&self) -> Option<String> {
        self.position.en_passant().map(utils::square_to_algebraic)
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.position.halfmove_clock()
    }

    pub fn fullmove_number(&self) -> u16 {
        self.position.fullmove_number()
    }

    pub fn snapshot(&self) -> Vec<PieceInfo> {
        self.position.board().snapshot()
    }

    /// Shade and contents of one square by name.
    pub fn square(&self, name: &str) -> Result<SquareInfo, InvalidSquare> {
        let sq = parse_square(name)?;
        Ok(self.position.board().square_info(sq))
    }

    /// Squares holding `piece`, a8 to h1.
    pub fn piece_squares(&self, piece: Piece) -> Vec<String> {
        self.position
            .board()
            .pieces()
            .filter(|&(_, kind, color)| Piece::new(kind, color) == piece)
            .map(|(sq, _, _)| utils::square_to_algebraic(sq))
            .collect()
    }

    pub fn material_advantage(&self) -> MaterialScore {
        eval::material_advantage(self.position.board())
    }

    // -- state queries, always for the side to move --

    pub fn is_in_check(&self) -> bool {
        eval::is_in_check(&self.position, self.side_to_move())
    }

    pub fn is_checkmate(&self) -> bool {
        let mut scratch = self.position.clone();
        eval::is_checkmate(&mut scratch, self.side_to_move())
    }

    pub fn is_stalemate(&self) -> bool {
        let mut scratch = self.position.clone();
        eval::is_stalemate(&mut scratch, self.side_to_move())
    }

    pub fn is_insufficient_material(&self) -> bool {
        eval::is_insufficient_material(self.position.board())
    }

    /// The current position has occurred at least three times in the
    /// active line (same placement, side, rights and en-passant file).
    pub fn is_threefold_repetition(&self) -> bool {
        match self.hashes.last() {
            Some(&last) => self.hashes.iter().filter(|&&h| h == last).count() >= 3,
            None => false,
        }
    }

    pub fn is_fifty_move_rule(&self) -> bool {
        self.position.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_fifty_move_rule()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Checkmate and stalemate take precedence over the draw rules.
    pub fn status(&self) -> GameStatus {
        let check = self.is_in_check();
        if self.legal.is_empty() {
            return if check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if self.is_threefold_repetition() {
            GameStatus::ThreefoldRepetition
        } else if self.is_fifty_move_rule() {
            GameStatus::FiftyMoveRule
        } else if check {
            GameStatus::Check
        } else {
            GameStatus::Ongoing
        }
    }

    // -- moves --

    pub fn is_legal_move(&self, from: &str, to: &str) -> bool {
        match (utils::algebraic_to_square(from), utils::algebraic_to_square(to)) {
            (Some(from), Some(to)) => self.legal.contains(from, to),
            _ => false,
        }
    }

    /// Legal moves as "source" -> ["targets"]; defaults to the side to move.
    pub fn all_legal_moves(&self, side: Option<Color>) -> BTreeMap<String, Vec<String>> {
        let side = side.unwrap_or_else(|| self.side_to_move());
        if side == self.side_to_move() {
            return self.legal.to_algebraic_map();
        }
        let mut scratch = self.position.clone();
        movegen::legal_moves(&mut scratch, side).to_algebraic_map()
    }

    pub fn pseudo_legal_moves(&self, side: Option<Color>) -> BTreeMap<String, Vec<String>> {
        let side = side.unwrap_or_else(|| self.side_to_move());
        movegen::generate_moves(&self.position, side).to_algebraic_map()
    }

    /// Legal targets of the piece on `from`; empty when it has none or
    /// belongs to the side not on move.
    pub fn legal_moves_from(&self, from: &str) -> Result<Vec<String>, InvalidSquare> {
        let from = parse_square(from)?;
        Ok(self
            .legal
            .targets(from)
            .iter()
            .map(|&to| utils::square_to_algebraic(to))
            .collect())
    }

    /// Encoded legal moves of the side to move.
    pub fn legal_move_index(&self) -> &MoveIndex {
        &self.legal
    }

    /// Play a move; a promotion without an explicit piece becomes a queen.
    pub fn execute_move(&mut self, from: &str, to: &str) -> Result<MoveOutcome, MoveError> {
        self.execute_move_with_promotion(from, to, None)
    }

    pub fn execute_move_with_promotion(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, MoveError> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        let mv = self.resolve(from, to, promotion)?;
        self.play_move(mv)
    }

    /// Play a move in coordinate notation ("e2e4", "e7e8n").
    pub fn play_uci(&mut self, text: &str) -> Result<MoveOutcome, MoveError> {
        let notation = || MoveError::Notation(text.to_string());
        if !(4..=5).contains(&text.len()) {
            return Err(notation());
        }
        let from = text.get(0..2).ok_or_else(notation)?;
        let to = text.get(2..4).ok_or_else(notation)?;
        let promotion = match text.get(4..) {
            Some("") | None => None,
            Some(p) => {
                let kind = p.chars().next().and_then(PieceKind::from_char);
                match kind {
                    Some(k) if PieceKind::PROMOTIONS.contains(&k) => Some(k),
                    _ => return Err(notation()),
                }
            }
        };
        self.execute_move_with_promotion(from, to, promotion)
    }

    fn resolve(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<Move, MoveError> {
        if let Err(err) = MoveInvoker::validate(&self.position, from, to) {
            warn!("rejected {}{}: {err}", utils::square_to_algebraic(from), utils::square_to_algebraic(to));
            return Err(err);
        }
        if let Some(mv) = self.legal.find(from, to, promotion) {
            return Ok(mv);
        }
        let from_name = utils::square_to_algebraic(from);
        let to_name = utils::square_to_algebraic(to);
        let pseudo = movegen::generate_moves(&self.position, self.side_to_move());
        let err = if pseudo.find(from, to, promotion).is_some() {
            MoveError::LeavesKingInCheck {
                from: from_name,
                to: to_name,
            }
        } else {
            MoveError::Unreachable {
                from: from_name,
                to: to_name,
            }
        };
        warn!("rejected move: {err}");
        Err(err)
    }

    fn play_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        let entry = self.invoker.execute(&mut self.position, mv)?;
        let captured = entry
            .captured
            .and_then(|(kind, color)| Piece::new(kind, color).fen_char());
        // the invoker dropped any rewound tail, keep the hashes aligned
        self.hashes.truncate(self.invoker.active());
        self.hashes.push(zobrist::hash_position(&self.position));
        self.refresh_legal();

        let status = self.status();
        Ok(MoveOutcome {
            uci: mv.to_uci(),
            captured,
            castling: mv.castling,
            en_passant: mv.en_passant,
            promotion: mv.promotion,
            check: self.is_in_check(),
            status,
            fen: self.fen(),
        })
    }

    /// Take back up to `n` moves; returns how many were undone.
    pub fn undo_move(&mut self, n: usize) -> usize {
        let done = self.invoker.undo(&mut self.position, n);
        if done > 0 {
            self.hashes.truncate(self.invoker.active() + 1);
            self.refresh_legal();
        }
        done
    }

    /// Replay up to `n` undone moves; returns how many were replayed.
    pub fn redo_move(&mut self, n: usize) -> usize {
        let mut done = 0;
        while done < n && self.invoker.redo(&mut self.position, 1) == 1 {
            self.hashes.push(zobrist::hash_position(&self.position));
            done += 1;
        }
        if done > 0 {
            self.refresh_legal();
        }
        done
    }

    /// Destination square of every move in the active line.
    pub fn history(&self) -> Vec<String> {
        self.invoker
            .history()
            .iter()
            .map(|e| utils::square_to_algebraic(e.to))
            .collect()
    }

    /// The active line as coordinate moves ("e2e4", "e7e8q").
    pub fn history_moves(&self) -> Vec<String> {
        self.invoker.history().iter().map(|e| e.mv.to_uci()).collect()
    }

    pub fn history_entries(&self) -> &[HistoryEntry] {
        self.invoker.history()
    }

    /// Moves that `redo_move` could still replay.
    pub fn rewound(&self) -> usize {
        self.invoker.rewound()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_square(name: &str) -> Result<Square, InvalidSquare> {
    utils::algebraic_to_square(name).ok_or_else(|| InvalidSquare(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_is_the_start_position() {
        let game = Game::new();
        assert_eq!(game.fen(), START_FEN);
        assert_eq!(game.status(), GameStatus::Ongoing);
        assert_eq!(game.legal_move_index().len(), 20);
        assert!(game.history().is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_position() {
        let mut game = Game::new();
        game.execute_move("e2", "e4").unwrap();
        let before = game.fen();
        assert!(game.load_fen("not a fen").is_err());
        assert_eq!(game.fen(), before);
        assert_eq!(game.history(), vec!["e4"]);
    }

    #[test]
    fn uci_text_and_promotion() {
        let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let out = game.play_uci("b7b8n").unwrap();
        assert_eq!(out.promotion, Some(PieceKind::Knight));
        assert_eq!(game.square("b8").unwrap().piece.unwrap().piece, 'N');
        assert!(matches!(game.play_uci("e8"), Err(MoveError::Notation(_))));
        assert!(matches!(game.play_uci("e8d8x"), Err(MoveError::Notation(_))));
    }

    #[test]
    fn default_promotion_is_queen() {
        let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let out = game.execute_move("b7", "b8").unwrap();
        assert_eq!(out.uci, "b7b8q");
        assert!(out.check);
        assert_eq!(out.status, GameStatus::Check);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&GameStatus::ThreefoldRepetition).unwrap();
        assert_eq!(json, "\"threefold_repetition\"");
    }
}
