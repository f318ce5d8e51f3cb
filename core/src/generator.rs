use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Source of candidate mine positions.
///
/// Placement keeps drawing until it has found enough unmined tiles, so an
/// implementation must eventually cover every tile of the board.
pub trait CellSampler {
    fn sample(&mut self, size: Coord2) -> Coord2;
}

/// Uniform sampling over the whole board, reproducible from a seed.
#[derive(Clone, Debug)]
pub struct RandomSampler {
    rng: SmallRng,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl CellSampler for RandomSampler {
    fn sample(&mut self, (size_x, size_y): Coord2) -> Coord2 {
        (
            self.rng.random_range(0..size_x),
            self.rng.random_range(0..size_y),
        )
    }
}

/// Replays a fixed list of positions, cycling once exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedSampler {
    cells: alloc::vec::Vec<Coord2>,
    next: usize,
}

impl ScriptedSampler {
    pub fn new(cells: impl Into<alloc::vec::Vec<Coord2>>) -> Self {
        Self {
            cells: cells.into(),
            next: 0,
        }
    }
}

impl CellSampler for ScriptedSampler {
    fn sample(&mut self, (size_x, size_y): Coord2) -> Coord2 {
        if self.cells.is_empty() {
            return (0, 0);
        }
        let (x, y) = self.cells[self.next % self.cells.len()];
        self.next += 1;
        (x % size_x, y % size_y)
    }
}
