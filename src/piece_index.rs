//! O(1) tracking of the squares occupied by one piece category.
//!
//! A [`PieceIndex`] keeps a dense array of occupied squares (only the first
//! `count` entries are live) together with a reverse map from square to slot,
//! so pieces can be added, removed and moved without scanning the board.
//!
//! The index is deliberately unchecked. Adding beyond the capacity chosen at
//! construction and querying a square that is not tracked are caller contract
//! violations: the former panics on slice indexing, the latter reads a stale
//! slot.

use crate::constants::{DEFAULT_PIECE_CAPACITY, NUM_SQUARES};

#[derive(Clone, Debug)]
pub struct PieceIndex {
    /// Occupied squares; entries at `count..` are garbage.
    occupied: Box<[u8]>,
    /// Square -> slot in `occupied`. Only meaningful for tracked squares.
    map: [u8; NUM_SQUARES],
    count: usize,
}

impl Default for PieceIndex {
    fn default() -> Self {
        Self::new(DEFAULT_PIECE_CAPACITY)
    }
}

impl PieceIndex {
    /// Create an empty index able to hold `capacity` pieces.
    pub fn new(capacity: usize) -> Self {
        Self {
            occupied: vec![0; capacity].into_boxed_slice(),
            map: [0; NUM_SQUARES],
            count: 0,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Live squares, in slot order.
    #[inline]
    pub fn squares(&self) -> &[u8] {
        &self.occupied[..self.count]
    }

    /// Slot currently holding `square`. Only valid for tracked squares.
    #[inline]
    pub fn slot_of(&self, square: u8) -> usize {
        self.map[square as usize] as usize
    }

    /// Append `square` at the next free slot.
    ///
    /// # Panics
    ///
    /// Panics if the index is already at capacity.
    #[inline]
    pub fn add_piece_at_square(&mut self, square: u8) {
        self.occupied[self.count] = square;
        self.map[square as usize] = self.count as u8;
        self.count += 1;
    }

    /// Swap-remove `square`: the last live slot takes its place.
    #[inline]
    pub fn remove_piece_at_square(&mut self, square: u8) {
        let slot = self.map[square as usize] as usize;
        let last = self.occupied[self.count - 1];
        self.occupied[slot] = last;
        self.map[last as usize] = slot as u8;
        self.count -= 1;
    }

    /// Relocate the piece on `from` to `to`, keeping its slot.
    #[inline]
    pub fn move_piece(&mut self, from: u8, to: u8) {
        let slot = self.map[from as usize];
        self.occupied[slot as usize] = to;
        self.map[to as usize] = slot;
    }

    /// Check the slot invariant for every live slot.
    pub fn is_consistent(&self) -> bool {
        self.squares()
            .iter()
            .enumerate()
            .all(|(slot, &sq)| self.map[sq as usize] as usize == slot)
    }
}

impl std::ops::Index<usize> for PieceIndex {
    type Output = u8;

    fn index(&self, slot: usize) -> &u8 {
        &self.occupied[slot]
    }
}
