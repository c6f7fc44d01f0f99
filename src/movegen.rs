//! Move generation for tree expansion and rollouts.
//!
//! The search consumes moves through the [`MoveGenerator`] trait:
//! - `legal_moves` feeds node expansion with fully legal moves (king safety
//!   and promotions, no castling or en passant)
//! - `pseudo_moves` feeds rollouts with material-only moves on the
//!   [`RolloutGrid`], ignoring check entirely
//!
//! Both walk the per-category piece indices instead of scanning the board.

use crate::board::{GridMove, RolloutGrid};
use crate::config::PromotionMode;
use crate::constants::{DIAGONAL_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL_DIRECTIONS};
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{Move, Position, Square, offset_square, rank_of};

/// Source of moves for the search.
pub trait MoveGenerator: Send + Sync {
    /// Legal moves for the side to move, in a deterministic order.
    ///
    /// With `include_quiet` unset only captures are returned.
    fn legal_moves(&self, position: &Position, include_quiet: bool, promotions: PromotionMode) -> Vec<Move>;

    /// Pseudo-legal, material-only moves for `side` on a rollout grid.
    fn pseudo_moves(&self, grid: &RolloutGrid, side: Color) -> Vec<GridMove>;
}

/// Move generator for standard chess pieces.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardMoveGenerator;

impl MoveGenerator for StandardMoveGenerator {
    fn legal_moves(&self, position: &Position, include_quiet: bool, promotions: PromotionMode) -> Vec<Move> {
        let side = position.side_to_move();
        let occupant = |sq: Square| position.piece_at(sq);
        let mut targets = Vec::with_capacity(32);
        let mut moves = Vec::with_capacity(64);

        for kind in PieceKind::ALL {
            let piece = Piece::new(side, kind);
            for &from in position.pieces(side, kind).squares() {
                targets.clear();
                piece_targets(piece, from, occupant, &mut targets);

                for &to in &targets {
                    let capture = position.piece_at(to).is_some();
                    if !include_quiet && !capture {
                        continue;
                    }
                    if kind == PieceKind::Pawn && rank_of(to) == side.promotion_rank() {
                        moves.extend(promotions.kinds().iter().map(|&k| Move::promoting(from, to, k)));
                    } else {
                        moves.push(Move::new(from, to));
                    }
                }
            }
        }

        moves.retain(|&mv| !leaves_king_attacked(position, mv));
        moves
    }

    fn pseudo_moves(&self, grid: &RolloutGrid, side: Color) -> Vec<GridMove> {
        let occupant = |sq: Square| grid.get(sq);
        let mut targets = Vec::with_capacity(32);
        let mut moves = Vec::with_capacity(64);

        for kind in PieceKind::ALL {
            let piece = Piece::new(side, kind);
            for &from in grid.pieces(side, kind).squares() {
                targets.clear();
                piece_targets(piece, from, occupant, &mut targets);
                moves.extend(targets.iter().map(|&to| GridMove { from, to }));
            }
        }

        moves
    }
}

/// Destination squares for `piece` on `from` by movement pattern alone.
///
/// `occupant` reports what stands on a square. Own pieces block, enemy
/// pieces may be captured.
pub fn piece_targets(
    piece: Piece,
    from: Square,
    occupant: impl Fn(Square) -> Option<Piece>,
    out: &mut Vec<Square>,
) {
    let color = piece.color;
    let free_or_enemy = |sq: Square| occupant(sq).is_none_or(|p| p.color != color);

    match piece.kind {
        PieceKind::Pawn => {
            let dir = color.pawn_direction();
            if let Some(one) = offset_square(from, 0, dir) {
                if occupant(one).is_none() {
                    out.push(one);
                    if rank_of(from) == color.pawn_start_rank() {
                        if let Some(two) = offset_square(one, 0, dir) {
                            if occupant(two).is_none() {
                                out.push(two);
                            }
                        }
                    }
                }
            }
            for df in [-1, 1] {
                if let Some(sq) = offset_square(from, df, dir) {
                    if occupant(sq).is_some_and(|p| p.color != color) {
                        out.push(sq);
                    }
                }
            }
        }
        PieceKind::Knight => step_targets(from, &KNIGHT_OFFSETS, free_or_enemy, out),
        PieceKind::King => step_targets(from, &KING_OFFSETS, free_or_enemy, out),
        PieceKind::Bishop => slide_targets(from, &DIAGONAL_DIRECTIONS, color, &occupant, out),
        PieceKind::Rook => slide_targets(from, &ORTHOGONAL_DIRECTIONS, color, &occupant, out),
        PieceKind::Queen => {
            slide_targets(from, &ORTHOGONAL_DIRECTIONS, color, &occupant, out);
            slide_targets(from, &DIAGONAL_DIRECTIONS, color, &occupant, out);
        }
    }
}

fn step_targets(from: Square, offsets: &[(i8, i8)], allowed: impl Fn(Square) -> bool, out: &mut Vec<Square>) {
    for &(df, dr) in offsets {
        if let Some(sq) = offset_square(from, df, dr) {
            if allowed(sq) {
                out.push(sq);
            }
        }
    }
}

fn slide_targets(
    from: Square,
    directions: &[(i8, i8)],
    color: Color,
    occupant: &impl Fn(Square) -> Option<Piece>,
    out: &mut Vec<Square>,
) {
    for &(df, dr) in directions {
        let mut sq = from;
        while let Some(next) = offset_square(sq, df, dr) {
            match occupant(next) {
                None => out.push(next),
                Some(p) => {
                    if p.color != color {
                        out.push(next);
                    }
                    break;
                }
            }
            sq = next;
        }
    }
}

/// Whether `sq` is attacked by any piece of `by`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let is = |s: Option<Square>, kinds: &[PieceKind]| {
        s.and_then(|s| position.piece_at(s))
            .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
    };

    // A pawn of `by` attacks diagonally forward, so look one rank back.
    let back = -by.pawn_direction();
    if is(offset_square(sq, -1, back), &[PieceKind::Pawn]) || is(offset_square(sq, 1, back), &[PieceKind::Pawn]) {
        return true;
    }
    if KNIGHT_OFFSETS
        .iter()
        .any(|&(df, dr)| is(offset_square(sq, df, dr), &[PieceKind::Knight]))
    {
        return true;
    }
    if KING_OFFSETS
        .iter()
        .any(|&(df, dr)| is(offset_square(sq, df, dr), &[PieceKind::King]))
    {
        return true;
    }

    let first_hit = |df: i8, dr: i8| {
        let mut cur = sq;
        while let Some(next) = offset_square(cur, df, dr) {
            if position.piece_at(next).is_some() {
                return Some(next);
            }
            cur = next;
        }
        None
    };
    ORTHOGONAL_DIRECTIONS
        .iter()
        .any(|&(df, dr)| is(first_hit(df, dr), &[PieceKind::Rook, PieceKind::Queen]))
        || DIAGONAL_DIRECTIONS
            .iter()
            .any(|&(df, dr)| is(first_hit(df, dr), &[PieceKind::Bishop, PieceKind::Queen]))
}

/// Whether `side_to_move` is in check.
pub fn in_check(position: &Position) -> bool {
    let side = position.side_to_move();
    position
        .king_square(side)
        .is_some_and(|k| is_square_attacked(position, k, side.opponent()))
}

fn leaves_king_attacked(position: &Position, mv: Move) -> bool {
    let side = position.side_to_move();
    let mut next = position.clone();
    next.apply_move(mv);
    next.king_square(side)
        .is_some_and(|k| is_square_attacked(&next, k, side.opponent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::parse_square;

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    fn legal(fen: &str) -> Vec<Move> {
        let pos = Position::from_fen(fen).unwrap();
        StandardMoveGenerator.legal_moves(&pos, true, PromotionMode::All)
    }

    #[test]
    fn test_start_position_has_twenty_moves() {
        let moves = StandardMoveGenerator.legal_moves(&Position::new(), true, PromotionMode::All);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // The e2 rook is pinned against the king by the e8 rook.
        let moves = legal("4r2k/8/8/8/8/8/4R3/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| m.from != sq("e2") || file_stays(m)));
    }

    fn file_stays(m: &Move) -> bool {
        m.to % 8 == sq("e2") % 8
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        let moves = legal("7k/8/8/8/8/8/r7/4K3 w - - 0 1");
        assert!(!moves.iter().any(|m| rank_of(m.to) == 1));
        assert!(moves.iter().all(|m| rank_of(m.to) == 0));
    }

    #[test]
    fn test_promotion_modes() {
        let fen = "7k/P7/8/8/8/8/8/K7 w - - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let count = |mode| {
            StandardMoveGenerator
                .legal_moves(&pos, true, mode)
                .iter()
                .filter(|m| m.promotion.is_some())
                .count()
        };
        assert_eq!(count(PromotionMode::All), 4);
        assert_eq!(count(PromotionMode::QueenOnly), 1);
        assert_eq!(count(PromotionMode::QueenAndKnight), 2);
    }

    #[test]
    fn test_captures_only() {
        let pos = Position::from_fen("7k/8/8/3p4/4P3/8/8/K7 w - - 0 1").unwrap();
        let moves = StandardMoveGenerator.legal_moves(&pos, false, PromotionMode::All);
        assert_eq!(moves, vec![Move::new(sq("e4"), sq("d5"))]);
    }

    #[test]
    fn test_checkmated_side_has_no_moves() {
        // Back-rank mate.
        let moves = legal("6rk/8/8/8/8/8/5PPP/r5K1 w - - 0 1");
        assert!(moves.is_empty());
    }

    #[test]
    fn test_in_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        assert!(in_check(&pos));
        assert!(!in_check(&Position::new()));
    }

    #[test]
    fn test_pseudo_moves_ignore_check() {
        // The king may walk into the rook's file on the grid.
        let pos = Position::from_fen("7k/8/8/8/8/8/r7/4K3 w - - 0 1").unwrap();
        let grid = pos.snapshot();
        let moves = StandardMoveGenerator.pseudo_moves(&grid, Color::White);
        assert!(moves.contains(&GridMove { from: sq("e1"), to: sq("e2") }));
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn test_pseudo_pawn_on_last_rank_is_stuck() {
        let pos = Position::from_fen("P6k/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let grid = pos.snapshot();
        let moves = StandardMoveGenerator.pseudo_moves(&grid, Color::White);
        assert!(moves.iter().all(|m| m.from != sq("a8")));
    }
}
