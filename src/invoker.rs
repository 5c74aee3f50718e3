//! History stack with undo/redo over a [`Position`].
//!
//! Entries past the rewind cursor stay in the stack so `redo` can replay
//! them; executing a fresh move drops them.

use log::{debug, trace, warn};

use crate::error::MoveError;
use crate::moves::Move;
use crate::piece::{Color, PieceKind};
use crate::position::{Position, Undo};
use crate::utils::{square_to_algebraic, Square};

/// One played move together with the token that takes it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub from: Square,
    pub to: Square,
    pub captured: Option<(PieceKind, Color)>,
    pub capture: bool,
    pub castling: bool,
    pub mv: Move,
    undo: Undo,
}

impl HistoryEntry {
    fn new(mv: Move, undo: Undo) -> Self {
        let captured = match (undo.captured.kind(), undo.captured.color()) {
            (Some(kind), Some(color)) => Some((kind, color)),
            _ => None,
        };
        Self {
            from: mv.from,
            to: mv.to,
            captured,
            capture: captured.is_some(),
            castling: mv.castling,
            mv,
            undo,
        }
    }

    pub fn undo_token(&self) -> &Undo {
        &self.undo
    }
}

#[derive(Debug, Clone, Default)]
pub struct MoveInvoker {
    history: Vec<HistoryEntry>,
    rewound: usize,
}

impl MoveInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn and occupancy checks: the source holds a piece of the side to
    /// move and the target is not one of its own pieces.
    pub fn validate(pos: &Position, from: Square, to: Square) -> Result<(), MoveError> {
        let board = pos.board();
        let side = pos.side_to_move();
        let owner = board
            .color_of(from)
            .ok_or_else(|| MoveError::NoPiece(square_to_algebraic(from)))?;
        if owner != side {
            return Err(MoveError::WrongTurn {
                square: square_to_algebraic(from),
                owner,
                side,
            });
        }
        if board.color_of(to) == Some(side) {
            return Err(MoveError::OwnPieceOnTarget(square_to_algebraic(to)));
        }
        Ok(())
    }

    /// Validate and play `mv`, dropping any rewound tail first.
    pub fn execute(&mut self, pos: &mut Position, mv: Move) -> Result<&HistoryEntry, MoveError> {
        if let Err(err) = Self::validate(pos, mv.from, mv.to) {
            warn!("rejected {mv}: {err}");
            return Err(err);
        }
        if self.rewound > 0 {
            let keep = self.active();
            debug!("discarding {} rewound moves", self.history.len() - keep);
            self.history.truncate(keep);
            self.rewound = 0;
        }
        let undo = pos.apply(mv);
        debug!("executed {mv} ({} plies)", self.history.len() + 1);
        self.history.push(HistoryEntry::new(mv, undo));
        Ok(&self.history[self.history.len() - 1])
    }

    /// Take back up to `n` moves; returns how many were undone.
    pub fn undo(&mut self, pos: &mut Position, n: usize) -> usize {
        let mut done = 0;
        while done < n && self.active() > 0 {
            let entry = &self.history[self.active() - 1];
            trace!("undo {}", entry.mv);
            pos.rollback(entry.undo);
            self.rewound += 1;
            done += 1;
        }
        done
    }

    /// Replay up to `n` rewound moves; returns how many were replayed.
    pub fn redo(&mut self, pos: &mut Position, n: usize) -> usize {
        let mut done = 0;
        while done < n && self.rewound > 0 {
            let idx = self.active();
            let mv = self.history[idx].mv;
            trace!("redo {mv}");
            // replays skip validation, the move was legal when first played
            let undo = pos.apply(mv);
            self.history[idx].undo = undo;
            self.rewound -= 1;
            done += 1;
        }
        done
    }

    /// Number of entries currently on the board (not rewound).
    pub fn active(&self) -> usize {
        self.history.len() - self.rewound
    }

    pub fn rewound(&self) -> usize {
        self.rewound
    }

    /// The active line, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history[..self.active()]
    }

    /// Every stored entry including the rewound tail.
    pub fn all_entries(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.rewound = 0;
    }
}
