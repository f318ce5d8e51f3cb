use serde::{Deserialize, Serialize};

/// One board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub open: bool,
    pub flagged: bool,
    pub mine: bool,
    /// Drawn sunken while a pointer holds it (or a neighbor being chorded).
    pub pressed: bool,
    /// Mines among the up-to-8 neighbors, `0..=8`.
    pub adjacent: u8,
}

impl Tile {
    /// Counts towards the tiles still to clear.
    pub const fn is_closed_safe(self) -> bool {
        !self.open && !self.mine
    }

    /// Can be opened by a plain reveal.
    pub const fn is_revealable(self) -> bool {
        !self.open && !self.flagged
    }

    /// Open tile showing a number, the only kind of tile a chord applies to.
    pub const fn is_numbered(self) -> bool {
        self.open && !self.mine && self.adjacent > 0
    }
}
