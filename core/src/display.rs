use alloc::vec::Vec;
use chrono::{DateTime, Utc};

use crate::*;

/// Tile sprite frames: `0..=8` are the opened numbers, 0 doubling as "pressed".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileIcon {
    Number(u8),
    Closed,
    Opened,
    Mine,
    Flag,
    WrongFlag,
    Exploded,
}

impl TileIcon {
    pub const FRAME_COUNT: usize = 17;

    pub const fn frame(self) -> usize {
        match self {
            Self::Number(count) => count as usize,
            Self::Closed => 9,
            Self::Opened => 10,
            Self::Mine => 11,
            Self::Flag => 12,
            Self::WrongFlag => 13,
            Self::Exploded => 14,
        }
    }

    /// Picks the icon for one tile given the overall game state.
    pub fn for_tile(tile: Tile, state: GameState, exploded: bool) -> Self {
        use TileIcon::*;

        if state.is_final() {
            return match (tile.open, tile.flagged, tile.mine) {
                (true, _, true) if exploded => Exploded,
                (true, _, true) => Mine,
                (true, _, false) => Number(tile.adjacent),
                (false, true, true) => Flag,
                (false, true, false) => WrongFlag,
                (false, false, true) if state == GameState::Won => Flag,
                (false, false, true) => Mine,
                (false, false, false) => Closed,
            };
        }

        if tile.open {
            Number(tile.adjacent)
        } else if tile.flagged {
            Flag
        } else if tile.pressed {
            Number(0)
        } else {
            Closed
        }
    }
}

pub const DIGIT_FRAME_COUNT: usize = 11;
pub const DIGIT_MINUS: usize = 10;
pub const COUNTER_MIN: i64 = -99;
pub const COUNTER_MAX: i64 = 999;

/// Three digit frames, most significant first, sign in the hundreds position.
pub fn counter_frames(value: i64) -> [usize; 3] {
    let value = value.clamp(COUNTER_MIN, COUNTER_MAX);
    let magnitude = value.unsigned_abs() as usize;
    let hundreds = if value < 0 {
        DIGIT_MINUS
    } else {
        magnitude / 100
    };
    [hundreds, magnitude / 10 % 10, magnitude % 10]
}

/// Writes frame indices for the face, counters and tiles; nothing else.
#[derive(Clone, Debug)]
pub struct DisplayAdapter {
    width: Coord,
    face: RegionId,
    mines: [RegionId; 3],
    time: [RegionId; 3],
    /// Row-major, `y * width + x`.
    tiles: Vec<RegionId>,
}

impl DisplayAdapter {
    pub const FACE: &'static str = "button";
    pub const TILES: &'static str = "icons";
    pub const MINES: &'static str = "mines";
    pub const TIME: &'static str = "time";

    /// Resolves the regions the adapter writes to, failing on wiring mistakes.
    pub fn from_regions(regions: &RegionSet, config: &GameConfig) -> Result<Self> {
        let face = regions.lookup_exact(Self::FACE, 1)?[0];
        let tiles = regions
            .lookup_exact(Self::TILES, usize::from(config.total_tiles()))?
            .to_vec();
        let digits = |name: &str| -> Result<[RegionId; 3]> {
            let ids = regions.lookup_exact(name, 3)?;
            Ok([ids[0], ids[1], ids[2]])
        };
        Ok(Self {
            width: config.width,
            face,
            mines: digits(Self::MINES)?,
            time: digits(Self::TIME)?,
            tiles,
        })
    }

    pub fn face(&self) -> RegionId {
        self.face
    }

    pub fn tile_region(&self, (x, y): Coord2) -> Option<RegionId> {
        let index = usize::from(y) * usize::from(self.width) + usize::from(x);
        self.tiles.get(index).copied()
    }

    /// Iterates tile regions with their board coordinates.
    pub fn tile_regions(&self) -> impl Iterator<Item = (Coord2, RegionId)> + '_ {
        let width = usize::from(self.width);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &id)| (((i % width) as Coord, (i / width) as Coord), id))
    }

    pub fn refresh(&self, game: &Game, now: DateTime<Utc>, regions: &mut RegionSet) -> Result<()> {
        regions.goto_frame(self.face, game.face().frame())?;

        for (id, frame) in self.mines.iter().zip(counter_frames(game.mines_left().into())) {
            regions.goto_frame(*id, frame)?;
        }
        for (id, frame) in self.time.iter().zip(counter_frames(game.elapsed_secs(now))) {
            regions.goto_frame(*id, frame)?;
        }

        let board = game.board();
        let triggered = board.triggered();
        for (coords, id) in self.tile_regions() {
            let tile = board.tile(coords)?;
            let icon = TileIcon::for_tile(tile, game.state(), triggered == Some(coords));
            regions.goto_frame(id, icon.frame())?;
        }
        Ok(())
    }
}
