#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use display::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use gesture::*;
pub use region::*;
pub use sim::*;
pub use tile::*;
pub use touch::*;
pub use types::*;

mod board;
mod display;
mod error;
mod game;
mod generator;
mod gesture;
mod region;
mod sim;
mod tile;
mod touch;
mod types;

/// Startup configuration, validated once before the first tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    /// Ticks a pointer must be held inside a region to long-press it.
    pub long_press_ticks: u32,
    pub ticks_per_second: u32,
    /// Fixed seed for mine placement, random per game when absent.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub const BEGINNER: Self = Self::preset(9, 9, 10);
    pub const INTERMEDIATE: Self = Self::preset(16, 16, 40);
    pub const EXPERT: Self = Self::preset(30, 16, 99);

    pub const DEFAULT_TICKS_PER_SECOND: u32 = 30;

    const fn preset(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
            long_press_ticks: Self::DEFAULT_TICKS_PER_SECOND / 2,
            ticks_per_second: Self::DEFAULT_TICKS_PER_SECOND,
            seed: None,
        }
    }

    /// Changes the tick rate and resets the long press threshold to half a second.
    pub const fn with_ticks_per_second(mut self, ticks_per_second: u32) -> Self {
        self.ticks_per_second = ticks_per_second;
        self.long_press_ticks = ticks_per_second / 2;
        self
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidSize(self.width.into(), self.height.into()));
        }
        if self.mines == 0 {
            return Err(GameError::NoMines);
        }
        if self.mines >= self.total_tiles() {
            return Err(GameError::TooManyMines {
                mines: self.mines,
                tiles: self.total_tiles(),
            });
        }
        if self.ticks_per_second == 0 {
            return Err(GameError::ZeroTickRate);
        }
        if self.long_press_ticks < 2 {
            return Err(GameError::LongPressTooShort(self.long_press_ticks));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::BEGINNER
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    /// The last safe tile was opened.
    Cleared,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Cleared => true,
        }
    }
}

/// Used to merge outcomes when revealing several tiles at once
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Cleared, _) => Cleared,
            (_, Cleared) => Cleared,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
