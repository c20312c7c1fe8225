//! RNG module - 7-bag random piece generation
//!
//! Each bag contains one of each piece (I, O, T, S, Z, J, L), shuffled with
//! Fisher-Yates. Pieces are drawn from the bag until it is empty, then a fresh
//! permutation is generated, so every block of 7 draws holds all 7 kinds.
//!
//! Also provides a simple LCG so games are reproducible from a seed.

use crate::pieces::Tetromino;
use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Infinite, fair tetromino generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    /// Current permutation of the seven kinds
    bag: [PieceKind; 7],
    /// Index of the next kind to hand out
    bag_index: usize,
    /// Playfield width, used to place spawned pieces
    columns: u16,
    rng: SimpleRng,
}

impl PieceBag {
    /// Create a bag for a playfield `columns` wide
    pub fn new(columns: u16, seed: u32) -> Self {
        let mut bag = Self {
            bag: PieceKind::ALL,
            bag_index: 0,
            columns,
            rng: SimpleRng::new(seed),
        };
        bag.refill();
        bag
    }

    fn refill(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next kind, refilling the bag when exhausted
    pub fn next_kind(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill();
        }

        let kind = self.bag[self.bag_index];
        self.bag_index += 1;
        kind
    }

    /// Draw the next tetromino, placed at its spawn coordinates
    pub fn next(&mut self) -> Tetromino {
        let kind = self.next_kind();
        Tetromino::spawn(kind, self.columns)
    }

    /// Kinds left in the current bag
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.bag_index..]
    }
}
