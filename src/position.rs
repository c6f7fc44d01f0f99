//! Chess position representation and move execution.
//!
//! This module provides the canonical board the search tree snapshots at each
//! node:
//! - A 64-square mailbox plus one [`PieceIndex`] per piece category
//! - Side to move
//! - FEN parsing for setting up positions
//! - [`Move`] with UCI-style notation and an invalid sentinel
//!
//! Castling and en passant are not modelled; the castling and en passant
//! fields of a FEN string are accepted and ignored.

use std::fmt;

use thiserror::Error;

use crate::board::RolloutGrid;
use crate::constants::{BOARD_WIDTH, MAX_PIECES_PER_SIDE, NUM_CATEGORIES, NUM_SQUARES, START_FEN};
use crate::piece::{Color, Piece, PieceKind, category};
use crate::piece_index::PieceIndex;

/// A square index in `0..64`, `a1 = 0`.
pub type Square = u8;

// =============================================================================
// Moves
// =============================================================================

/// An immutable move: origin, destination and optional promotion kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Sentinel reported when no move can be chosen.
    pub const NONE: Move = Move {
        from: 0,
        to: 0,
        promotion: None,
    };

    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub const fn promoting(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        !self.is_none()
    }

    /// Parse UCI notation such as `e2e4` or `e7e8q`. `0000` yields [`Move::NONE`].
    pub fn parse(s: &str) -> Result<Move, MoveParseError> {
        let s = s.trim();
        if s == "0000" {
            return Ok(Move::NONE);
        }
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(MoveParseError::Malformed(s.to_string()));
        }
        let from = parse_square(&s[0..2]).ok_or_else(|| MoveParseError::Malformed(s.to_string()))?;
        let to = parse_square(&s[2..4]).ok_or_else(|| MoveParseError::Malformed(s.to_string()))?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)) => {
                    Some(kind)
                }
                _ => return Err(MoveParseError::BadPromotion(c)),
            },
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("malformed move: {0:?}")]
    Malformed(String),
    #[error("invalid promotion piece: {0:?}")]
    BadPromotion(char),
}

// =============================================================================
// Square notation
// =============================================================================

/// Parse a square name like `e4`.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some((rank as u8 - b'1') * BOARD_WIDTH as u8 + (file as u8 - b'a'))
}

/// Name of a square, e.g. `a1`.
pub fn square_name(sq: Square) -> String {
    let file = (b'a' + sq % BOARD_WIDTH as u8) as char;
    let rank = (b'1' + sq / BOARD_WIDTH as u8) as char;
    format!("{file}{rank}")
}

#[inline]
pub fn rank_of(sq: Square) -> u8 {
    sq / BOARD_WIDTH as u8
}

#[inline]
pub fn file_of(sq: Square) -> u8 {
    sq % BOARD_WIDTH as u8
}

/// Square reached from `sq` by (`df`, `dr`), `None` when off the board.
#[inline]
pub fn offset_square(sq: Square, df: i8, dr: i8) -> Option<Square> {
    let file = file_of(sq) as i8 + df;
    let rank = rank_of(sq) as i8 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

// =============================================================================
// Position
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN is missing the {0} field")]
    MissingField(&'static str),
    #[error("FEN board must have 8 ranks, found {0}")]
    RankCount(usize),
    #[error("FEN rank {rank} does not describe 8 files")]
    RankWidth { rank: usize },
    #[error("invalid piece character {0:?} in FEN")]
    BadPiece(char),
    #[error("invalid side to move {0:?}")]
    BadSide(String),
    #[error("too many {color:?} pieces (limit {limit})")]
    TooManyPieces { color: Color, limit: usize },
}

/// A chess position (board state).
#[derive(Clone)]
pub struct Position {
    squares: [Option<Piece>; NUM_SQUARES],
    lists: [PieceIndex; NUM_CATEGORIES],
    side_to_move: Color,
    /// Plies played since the position was set up.
    ply: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard start position.
    pub fn new() -> Self {
        // START_FEN is a constant known to parse.
        match Self::from_fen(START_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("start position failed to parse: {e}"),
        }
    }

    /// A position with no pieces.
    pub fn empty(side_to_move: Color) -> Self {
        Self {
            squares: [None; NUM_SQUARES],
            lists: std::array::from_fn(|_| PieceIndex::default()),
            side_to_move,
            ply: 0,
        }
    }

    /// Parse the placement and side-to-move fields of a FEN string.
    ///
    /// Remaining fields are optional and ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::MissingField("placement"))?;
        let side = fields.next().ok_or(FenError::MissingField("side to move"))?;

        let side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSide(other.to_string())),
        };

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_WIDTH {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut pos = Self::empty(side_to_move);
        let mut side_counts = [0usize; 2];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = BOARD_WIDTH - 1 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or(FenError::BadPiece(c))?;
                if file >= BOARD_WIDTH {
                    return Err(FenError::RankWidth { rank: rank + 1 });
                }
                let count = &mut side_counts[piece.color as usize];
                if *count == MAX_PIECES_PER_SIDE {
                    return Err(FenError::TooManyPieces {
                        color: piece.color,
                        limit: MAX_PIECES_PER_SIDE,
                    });
                }
                *count += 1;
                pos.put(((rank * BOARD_WIDTH) + file) as Square, piece);
                file += 1;
            }
            if file != BOARD_WIDTH {
                return Err(FenError::RankWidth { rank: rank + 1 });
            }
        }

        Ok(pos)
    }

    /// Place a piece on an empty square.
    ///
    /// The caller must keep each category within its index capacity.
    pub fn put(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.squares[sq as usize].is_none(), "square {sq} occupied");
        self.squares[sq as usize] = Some(piece);
        self.lists[piece.category()].add_piece_at_square(sq);
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn white_to_move(&self) -> bool {
        self.side_to_move == Color::White
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq as usize]
    }

    /// Squares holding pieces of one side and kind.
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> &PieceIndex {
        &self.lists[category(color, kind)]
    }

    /// Square of `color`'s king, if present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, PieceKind::King).squares().first().copied()
    }

    /// Make `mv` on this position and hand the move to the other side.
    ///
    /// The move is assumed to come from a move generator for this position.
    pub fn apply_move(&mut self, mv: Move) {
        debug_assert!(
            self.squares[mv.from as usize].is_some(),
            "no piece on {} for {mv}",
            square_name(mv.from)
        );
        let Some(mover) = self.squares[mv.from as usize] else {
            return;
        };

        if let Some(victim) = self.squares[mv.to as usize] {
            self.lists[victim.category()].remove_piece_at_square(mv.to);
        }

        match mv.promotion {
            Some(kind) if mover.kind == PieceKind::Pawn => {
                let promoted = Piece::new(mover.color, kind);
                self.lists[mover.category()].remove_piece_at_square(mv.from);
                self.lists[promoted.category()].add_piece_at_square(mv.to);
                self.squares[mv.to as usize] = Some(promoted);
            }
            _ => {
                self.lists[mover.category()].move_piece(mv.from, mv.to);
                self.squares[mv.to as usize] = Some(mover);
            }
        }
        self.squares[mv.from as usize] = None;

        self.side_to_move = self.side_to_move.opponent();
        self.ply += 1;
    }

    /// Copy the pieces onto a fresh [`RolloutGrid`].
    pub fn snapshot(&self) -> RolloutGrid {
        let mut grid = RolloutGrid::new();
        for (sq, cell) in self.squares.iter().enumerate() {
            if let Some(piece) = cell {
                grid.place(sq as Square, *piece);
            }
        }
        grid
    }

    /// Placement and side-to-move fields in FEN, with empty trailing fields.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (0..BOARD_WIDTH).rev() {
            let mut empty = 0;
            for file in 0..BOARD_WIDTH {
                match self.squares[rank * BOARD_WIDTH + file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        let side = if self.white_to_move() { 'w' } else { 'b' };
        format!("{out} {side} - - 0 1")
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("ply", &self.ply)
            .finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.snapshot())?;
        let side = if self.white_to_move() { "white" } else { "black" };
        writeln!(f, "{side} to move")
    }
}
