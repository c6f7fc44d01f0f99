//! Monte Carlo playouts (random game simulation).
//!
//! A rollout copies the position onto a [`RolloutGrid`] once, then plays
//! uniformly random material-only moves until a king has been captured, the
//! moving side has nothing to play, or the depth limit is reached. The final
//! grid is scored from both sides' perspectives.
//!
//! Note on sides: every simulated move is drawn for the side to move at the
//! rollout's starting position. The opponent never replies inside a rollout,
//! so a rollout measures how much one side can grab in `depth` free moves
//! rather than playing out a game. This is kept as is.
//!
//! Termination is coarse: checkmate and stalemate are not detected, only
//! king capture or depth exhaustion.

use crate::board::RolloutGrid;
use crate::evaluation::Evaluator;
use crate::movegen::MoveGenerator;
use crate::piece::Color;
use crate::position::Position;

/// Rollout result: one evaluation per side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct RolloutScore {
    pub white: i32,
    pub black: i32,
}

impl RolloutScore {
    /// Score component seen by `side`.
    #[inline]
    pub fn for_side(self, side: Color) -> i32 {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// A grid is terminal once either king is gone.
#[inline]
pub fn is_terminal(grid: &RolloutGrid) -> bool {
    !grid.has_king(Color::White) || !grid.has_king(Color::Black)
}

/// Play random moves for `side` on `grid`.
///
/// Returns the number of moves played.
pub fn play_random_game<M: MoveGenerator + ?Sized>(
    grid: &mut RolloutGrid,
    side: Color,
    depth_limit: u32,
    movegen: &M,
    rng: &mut fastrand::Rng,
) -> u32 {
    let mut depth = 0;

    while depth < depth_limit && !is_terminal(grid) {
        let moves = movegen.pseudo_moves(grid, side);
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.usize(..moves.len())];
        grid.apply(mv);
        depth += 1;
    }

    depth
}

/// Run one rollout from `position` and score the end state.
pub fn rollout<M, E>(
    position: &Position,
    depth_limit: u32,
    movegen: &M,
    evaluator: &E,
    rng: &mut fastrand::Rng,
) -> RolloutScore
where
    M: MoveGenerator + ?Sized,
    E: Evaluator + ?Sized,
{
    let mut grid = position.snapshot();
    play_random_game(&mut grid, position.side_to_move(), depth_limit, movegen, rng);

    RolloutScore {
        white: evaluator.evaluate(&grid, Color::White),
        black: evaluator.evaluate(&grid, Color::Black),
    }
}
