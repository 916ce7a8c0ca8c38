//! RNG module - local random piece generation
//!
//! Single-player pieces are drawn uniformly from the catalog. The generator is
//! a small LCG so that a seed reproduces the same piece sequence (tests, the
//! relay's shared sequence, benchmarks).

use crate::pieces::Piece;
use crate::source::PieceSource;
use crate::types::{PieceKind, PIECE_COUNT};

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
    /// Uses the high half of the state; the low bits of an LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max
    }

    /// Random catalog index
    pub fn next_piece_index(&mut self) -> usize {
        self.next_range(PIECE_COUNT as u32) as usize
    }

    /// Current state (restarting from it continues the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

/// Piece source for single-player games: always ready, never asks a peer
#[derive(Debug, Clone)]
pub struct LocalPieces {
    rng: SimpleRng,
}

impl LocalPieces {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }
}

impl Default for LocalPieces {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for LocalPieces {
    fn next_piece(&mut self) -> Option<Piece> {
        let index = self.rng.next_piece_index();
        log::debug!("Picking random piece: {}", index);
        PieceKind::from_index(index).map(Piece::new)
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_not_stuck() {
        let mut rng = SimpleRng::new(0);
        let a = rng.next_u32();
        let b = rng.next_u32();
        assert_ne!(a, b);
    }

    #[test]
    fn test_piece_index_in_range() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..1000 {
            assert!(rng.next_piece_index() < PIECE_COUNT);
        }
    }

    #[test]
    fn test_local_pieces_cover_catalog() {
        let mut source = LocalPieces::new(7);
        let mut seen = [false; PIECE_COUNT];
        for _ in 0..2000 {
            let piece = source.next_piece().unwrap();
            seen[piece.kind.index()] = true;
        }
        assert!(seen.iter().all(|&s| s), "Missing kinds: {:?}", seen);
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let mut a = LocalPieces::new(42);
        let mut b = LocalPieces::new(42);
        for _ in 0..50 {
            assert_eq!(a.next_piece(), b.next_piece());
        }
    }
}
