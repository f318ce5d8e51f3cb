use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board must be at least 1x1, got {0}x{1}")]
    InvalidSize(u16, u16),
    #[error("At least one mine is required")]
    NoMines,
    #[error("Too many mines: {mines} do not fit a board of {tiles} tiles")]
    TooManyMines { mines: u16, tiles: u16 },
    #[error("Long press threshold must be at least 2 ticks, got {0}")]
    LongPressTooShort(u32),
    #[error("Tick rate must be positive")]
    ZeroTickRate,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Region '{0}' not found")]
    UnknownRegion(String),
    #[error("Region id not found")]
    UnknownRegionId,
    #[error("Frame {frame} out of range, region has {count} frames")]
    FrameOutOfRange { frame: usize, count: usize },
    #[error("Region '{name}' has {actual} entries, expected {expected}")]
    RegionCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl GameError {
    /// Configuration errors are fatal at startup, everything else is a lookup error.
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidSize(..)
                | Self::NoMines
                | Self::TooManyMines { .. }
                | Self::LongPressTooShort(_)
                | Self::ZeroTickRate
        )
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
