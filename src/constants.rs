//! Constants for board geometry, piece values, and search defaults.
//!
//! Squares are numbered `0..64` with `a1 = 0`, `h1 = 7` and `h8 = 63`,
//! so `rank = square / 8` and `file = square % 8`.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board width and height.
pub const BOARD_WIDTH: usize = 8;

/// Total number of squares.
pub const NUM_SQUARES: usize = BOARD_WIDTH * BOARD_WIDTH;

/// Number of piece categories (two sides times six kinds).
pub const NUM_CATEGORIES: usize = 12;

/// Default capacity of a [`PieceIndex`](crate::piece_index::PieceIndex).
pub const DEFAULT_PIECE_CAPACITY: usize = 16;

/// Most pieces one side may have on the board. Promotion only swaps a pawn
/// for another piece, so this also bounds every category of that side.
pub const MAX_PIECES_PER_SIDE: usize = DEFAULT_PIECE_CAPACITY;

/// Start position in Forsyth-Edwards Notation.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// =============================================================================
// Movement Offsets (file delta, rank delta)
// =============================================================================

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

// =============================================================================
// Piece Values (centipawns)
// =============================================================================

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 300;
pub const BISHOP_VALUE: i32 = 320;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Large enough that losing the king outweighs any material balance.
pub const KING_VALUE: i32 = 20_000;

/// Bonus per rank a pawn has advanced from its start rank.
pub const PAWN_ADVANCE_BONUS: i32 = 5;

// =============================================================================
// Search Defaults
// =============================================================================

/// Default UCB1 exploration constant.
pub const DEFAULT_EXPLORATION: f64 = 0.7;

/// Default playout budget per search.
pub const DEFAULT_MAX_PLAYOUTS: u32 = 1000;

/// Default number of simulated moves per rollout.
pub const DEFAULT_PLAYOUT_DEPTH: u32 = 40;

/// Default wall-clock budget in milliseconds when the time limit is enabled.
pub const DEFAULT_SEARCH_TIME_MS: u64 = 1000;
