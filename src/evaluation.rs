//! Static evaluation of rollout end positions.

use crate::board::RolloutGrid;
use crate::constants::{
    BISHOP_VALUE, KING_VALUE, KNIGHT_VALUE, PAWN_ADVANCE_BONUS, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE,
};
use crate::piece::{Color, PieceKind};
use crate::position::rank_of;

/// Scores a rollout grid from one side's point of view.
///
/// Called once per side when a rollout stops. Higher is better for `for_side`.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, grid: &RolloutGrid, for_side: Color) -> i32;
}

/// Material balance with a small bonus for advanced pawns.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    fn side_total(grid: &RolloutGrid, color: Color) -> i32 {
        let mut total = 0;
        for kind in PieceKind::ALL {
            let pieces = grid.pieces(color, kind);
            total += piece_value(kind) * pieces.count() as i32;
            if kind == PieceKind::Pawn {
                for &sq in pieces.squares() {
                    let advanced = rank_of(sq).abs_diff(color.pawn_start_rank()) as i32;
                    total += PAWN_ADVANCE_BONUS * advanced;
                }
            }
        }
        total
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, grid: &RolloutGrid, for_side: Color) -> i32 {
        Self::side_total(grid, for_side) - Self::side_total(grid, for_side.opponent())
    }
}

pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => KING_VALUE,
    }
}
