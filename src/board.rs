//! Lightweight 8x8 board used only inside rollouts.
//!
//! A [`RolloutGrid`] is a plain grid of optional pieces plus one
//! [`PieceIndex`] per category, so random move enumeration can walk the
//! pieces of one side without scanning all 64 cells. It knows nothing about
//! check, castling, en passant or promotion: a move just relocates a piece,
//! and a capture overwrites whatever stood on the destination.

use std::fmt;

use crate::constants::{BOARD_WIDTH, NUM_CATEGORIES};
use crate::piece::{Color, Piece, PieceKind, category};
use crate::piece_index::PieceIndex;

/// A material-only move on the rollout grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridMove {
    pub from: u8,
    pub to: u8,
}

#[derive(Clone)]
pub struct RolloutGrid {
    cells: [[Option<Piece>; BOARD_WIDTH]; BOARD_WIDTH],
    lists: [PieceIndex; NUM_CATEGORIES],
}

impl Default for RolloutGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl RolloutGrid {
    /// An empty grid.
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_WIDTH]; BOARD_WIDTH],
            lists: std::array::from_fn(|_| PieceIndex::default()),
        }
    }

    #[inline]
    fn coords(square: u8) -> (usize, usize) {
        let sq = square as usize;
        (sq / BOARD_WIDTH, sq % BOARD_WIDTH)
    }

    /// Piece on `square`, if any.
    #[inline]
    pub fn get(&self, square: u8) -> Option<Piece> {
        let (rank, file) = Self::coords(square);
        self.cells[rank][file]
    }

    /// Put `piece` on an empty `square`.
    pub fn place(&mut self, square: u8, piece: Piece) {
        debug_assert!(self.get(square).is_none(), "square {square} occupied");
        let (rank, file) = Self::coords(square);
        self.cells[rank][file] = Some(piece);
        self.lists[piece.category()].add_piece_at_square(square);
    }

    /// Squares holding pieces of one side and kind.
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> &PieceIndex {
        &self.lists[category(color, kind)]
    }

    /// Relocate the piece on `mv.from`, overwriting any piece on `mv.to`.
    ///
    /// Returns the captured piece. `mv.from` must hold a piece.
    pub fn apply(&mut self, mv: GridMove) -> Option<Piece> {
        let (fr, ff) = Self::coords(mv.from);
        let (tr, tf) = Self::coords(mv.to);
        debug_assert!(self.cells[fr][ff].is_some(), "no piece on square {}", mv.from);
        let Some(mover) = self.cells[fr][ff] else {
            return None;
        };
        let captured = self.cells[tr][tf];
        if let Some(victim) = captured {
            self.lists[victim.category()].remove_piece_at_square(mv.to);
        }
        self.lists[mover.category()].move_piece(mv.from, mv.to);
        self.cells[tr][tf] = Some(mover);
        self.cells[fr][ff] = None;
        captured
    }

    /// Whether at least one king of `color` is still on the grid.
    #[inline]
    pub fn has_king(&self, color: Color) -> bool {
        !self.pieces(color, PieceKind::King).is_empty()
    }
}

impl PartialEq for RolloutGrid {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl fmt::Debug for RolloutGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RolloutGrid\n{self}")
    }
}

impl fmt::Display for RolloutGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..BOARD_WIDTH).rev() {
            for file in 0..BOARD_WIDTH {
                let ch = match self.cells[rank][file] {
                    Some(piece) => piece.fen_char(),
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
