use alloc::collections::VecDeque;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid of tiles plus the counters needed for win detection.
///
/// Mines are not placed at construction, see [`Board::place_mines_avoiding`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Array2<Tile>,
    mines_total: CellCount,
    remaining_flags: i32,
    closed_safe: CellCount,
    mines_placed: bool,
    triggered: Option<Coord2>,
}

impl Board {
    pub fn new(config: &GameConfig) -> Self {
        let size = config.size();
        Self {
            tiles: Array2::default(size.to_nd_index()),
            mines_total: config.mines,
            remaining_flags: config.mines.into(),
            closed_safe: config.total_tiles().saturating_sub(config.mines),
            mines_placed: false,
            triggered: None,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (dim_x, dim_y) = self.tiles.dim();
        (dim_x as Coord, dim_y as Coord)
    }

    pub fn total_tiles(&self) -> CellCount {
        let (size_x, size_y) = self.size();
        mult(size_x, size_y)
    }

    pub fn mines_total(&self) -> CellCount {
        self.mines_total
    }

    /// Mines minus flags placed, negative when over-flagged.
    pub fn remaining_flags(&self) -> i32 {
        self.remaining_flags
    }

    pub fn closed_safe(&self) -> CellCount {
        self.closed_safe
    }

    pub fn is_cleared(&self) -> bool {
        self.mines_placed && self.closed_safe == 0
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// The mine that ended the game, if any.
    pub fn triggered(&self) -> Option<Coord2> {
        self.triggered
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile(&self, coords: Coord2) -> Result<Tile> {
        let coords = self.validate_coords(coords)?;
        Ok(self.tiles[coords.to_nd_index()])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        self.tiles
            .indexed_iter()
            .map(|((x, y), &tile)| ((x as Coord, y as Coord), tile))
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.tiles.iter_neighbors(coords)
    }

    pub fn for_each_neighbor(&self, coords: Coord2, mut f: impl FnMut(Coord2, Tile)) {
        for pos in self.neighbors(coords) {
            f(pos, self.tiles[pos.to_nd_index()]);
        }
    }

    /// Lays out `count` mines, never on `origin`.
    ///
    /// The origin is reserved as a mine while sampling so it can never be picked,
    /// and released afterwards. Its neighbors' counts are only bumped for real mines.
    pub fn place_mines_avoiding(
        &mut self,
        origin: Coord2,
        count: CellCount,
        sampler: &mut impl CellSampler,
    ) -> Result<()> {
        let origin = self.validate_coords(origin)?;
        let total_tiles = self.total_tiles();
        if count >= total_tiles {
            return Err(GameError::TooManyMines {
                mines: count,
                tiles: total_tiles,
            });
        }
        if self.mines_placed {
            log::warn!("Mines already placed, ignoring second placement");
            return Ok(());
        }

        let size = self.size();
        self.tiles[origin.to_nd_index()].mine = true;
        let mut placed = 0;
        while placed < count {
            let pos = sampler.sample(size);
            if self.tiles[pos.to_nd_index()].mine {
                continue;
            }
            self.tiles[pos.to_nd_index()].mine = true;
            placed += 1;
            for neighbor in self.neighbors(pos) {
                self.tiles[neighbor.to_nd_index()].adjacent += 1;
            }
        }
        self.tiles[origin.to_nd_index()].mine = false;

        self.mines_total = count;
        self.closed_safe = total_tiles - count;
        self.remaining_flags = i32::from(count) - self.flag_count();
        self.mines_placed = true;
        log::debug!("Placed {} mines avoiding {:?}", count, origin);
        Ok(())
    }

    /// Opens a closed, unflagged tile, flood-filling from zero tiles.
    ///
    /// Does nothing until mines are placed.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        if !self.mines_placed {
            log::warn!("Reveal of {:?} before mines were placed", coords);
            return Ok(RevealOutcome::NoChange);
        }
        Ok(self.reveal_tile(coords))
    }

    /// Reveals every unflagged neighbor of a numbered tile whose flags are satisfied.
    pub fn chord(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        let tile = self.tiles[coords.to_nd_index()];
        if !self.mines_placed
            || !tile.is_numbered()
            || self.count_flagged_neighbors(coords) != tile.adjacent
        {
            return Ok(RevealOutcome::NoChange);
        }

        log::trace!("Chording {:?}", coords);
        Ok(self
            .neighbors(coords)
            .map(|neighbor| self.reveal_tile(neighbor))
            .fold(RevealOutcome::NoChange, core::ops::BitOr::bitor))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;
        let tile = &mut self.tiles[coords.to_nd_index()];
        if tile.open {
            return Ok(MarkOutcome::NoChange);
        }

        tile.flagged = !tile.flagged;
        self.remaining_flags += if tile.flagged { -1 } else { 1 };
        Ok(MarkOutcome::Changed)
    }

    /// Sinks the tile, and for an open tile its unflagged neighbors as a chord preview.
    pub fn press(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.validate_coords(coords)?;
        let tile = &mut self.tiles[coords.to_nd_index()];
        tile.pressed = true;
        if tile.open {
            for neighbor in self.tiles.iter_neighbors(coords) {
                let neighbor = &mut self.tiles[neighbor.to_nd_index()];
                if !neighbor.flagged {
                    neighbor.pressed = true;
                }
            }
        }
        Ok(())
    }

    pub fn clear_pressed(&mut self) {
        self.tiles.iter_mut().for_each(|tile| tile.pressed = false);
    }

    pub fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self.tiles[pos.to_nd_index()].flagged)
            .count() as u8
    }

    fn flag_count(&self) -> i32 {
        self.tiles.iter().filter(|tile| tile.flagged).count() as i32
    }

    fn open_one(&mut self, coords: Coord2) -> Tile {
        let tile = &mut self.tiles[coords.to_nd_index()];
        tile.open = true;
        if !tile.mine {
            self.closed_safe = self.closed_safe.saturating_sub(1);
        }
        *tile
    }

    fn reveal_tile(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.tiles[coords.to_nd_index()].is_revealable() {
            return RevealOutcome::NoChange;
        }

        let tile = self.open_one(coords);
        if tile.mine {
            log::debug!("Hit mine at {:?}", coords);
            self.triggered = Some(coords);
            return RevealOutcome::HitMine;
        }

        if tile.adjacent == 0 {
            let mut to_visit: VecDeque<_> = self
                .neighbors(coords)
                .filter(|&pos| self.tiles[pos.to_nd_index()].is_revealable())
                .collect();
            log::trace!(
                "Starting flood-fill from {:?}, initial neighbors: {:?}",
                coords,
                to_visit
            );

            while let Some(visit_coords) = to_visit.pop_front() {
                // queued more than once, or flagged since
                if !self.tiles[visit_coords.to_nd_index()].is_revealable() {
                    continue;
                }

                let visited = self.open_one(visit_coords);
                log::trace!(
                    "Flood opened tile at {:?}, mine count: {}",
                    visit_coords,
                    visited.adjacent
                );

                if visited.adjacent == 0 {
                    to_visit.extend(
                        self.neighbors(visit_coords)
                            .filter(|&pos| self.tiles[pos.to_nd_index()].is_revealable()),
                    );
                }
            }
        }

        if self.closed_safe == 0 {
            RevealOutcome::Cleared
        } else {
            RevealOutcome::Revealed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn config(width: Coord, height: Coord, mines: CellCount) -> GameConfig {
        GameConfig {
            width,
            height,
            mines,
            ..GameConfig::default()
        }
    }

    fn board_with_mines(size: Coord2, origin: Coord2, mines: &[Coord2]) -> Board {
        let mut board = Board::new(&config(size.0, size.1, mines.len() as CellCount));
        let mut sampler = ScriptedSampler::new(mines.to_vec());
        board
            .place_mines_avoiding(origin, mines.len() as CellCount, &mut sampler)
            .unwrap();
        board
    }

    fn mine_positions(board: &Board) -> Vec<Coord2> {
        board
            .iter()
            .filter(|(_, tile)| tile.mine)
            .map(|(pos, _)| pos)
            .collect()
    }

    #[test]
    fn placement_skips_origin_and_counts_neighbors() {
        // the sampler offers the origin first, it must be skipped
        let mut board = Board::new(&config(3, 3, 2));
        let mut sampler = ScriptedSampler::new([(1, 1), (0, 0), (2, 2)]);
        board.place_mines_avoiding((1, 1), 2, &mut sampler).unwrap();

        assert_eq!(mine_positions(&board), [(0, 0), (2, 2)]);
        assert!(!board.tile((1, 1)).unwrap().mine);
        assert_eq!(board.tile((1, 1)).unwrap().adjacent, 2);
        assert_eq!(board.tile((1, 0)).unwrap().adjacent, 1);
        assert_eq!(board.tile((2, 0)).unwrap().adjacent, 0);
        assert_eq!(board.closed_safe(), 7);
        assert!(board.mines_placed());
    }

    #[test]
    fn placement_rejects_full_board() {
        let mut board = Board::new(&config(2, 2, 3));
        let err = board
            .place_mines_avoiding((0, 0), 4, &mut RandomSampler::new(1))
            .unwrap_err();
        assert_eq!(err, GameError::TooManyMines { mines: 4, tiles: 4 });
        assert!(!board.mines_placed());
    }

    #[test]
    fn reveal_before_placement_is_noop() {
        let mut board = Board::new(&config(3, 3, 1));
        let before = board.clone();

        assert_eq!(board.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board.chord((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board, before);
        assert_eq!(board.closed_safe(), 8);
    }

    #[test]
    fn placement_only_happens_once() {
        let mut board = board_with_mines((3, 3), (0, 0), &[(2, 2)]);
        board
            .place_mines_avoiding((0, 0), 1, &mut ScriptedSampler::new([(1, 1)]))
            .unwrap();
        assert_eq!(mine_positions(&board), [(2, 2)]);
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_tile() {
        let mut board = board_with_mines((2, 2), (1, 1), &[(0, 0)]);

        let outcome = board.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(board.triggered(), Some((0, 0)));
        assert_eq!(board.closed_safe(), 3);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut board = board_with_mines((3, 3), (0, 0), &[(2, 2)]);

        let outcome = board.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Cleared);
        assert!(board.tile((1, 1)).unwrap().open);
        assert_eq!(board.tile((1, 1)).unwrap().adjacent, 1);
        assert!(!board.tile((2, 2)).unwrap().open);
        assert_eq!(board.closed_safe(), 0);
    }

    #[test]
    fn flood_fill_stops_at_flags() {
        let mut board = board_with_mines((4, 1), (0, 0), &[(3, 0)]);
        board.toggle_flag((1, 0)).unwrap();

        assert_eq!(board.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert!(!board.tile((1, 0)).unwrap().open);
        assert!(!board.tile((2, 0)).unwrap().open);
    }

    #[test]
    fn reveal_flagged_tile_is_noop() {
        let mut board = board_with_mines((3, 3), (0, 0), &[(2, 2)]);
        board.toggle_flag((0, 0)).unwrap();
        let before = board.clone();

        assert_eq!(board.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board, before);
    }

    #[test]
    fn reveal_open_tile_is_noop() {
        let mut board = board_with_mines((3, 1), (0, 0), &[(2, 0)]);
        board.reveal((1, 0)).unwrap();
        let before = board.clone();
        assert_eq!(board.reveal((1, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board, before);
    }

    #[test]
    fn toggle_flag_tracks_budget_and_goes_negative() {
        let mut board = board_with_mines((3, 3), (0, 0), &[(2, 2)]);
        assert_eq!(board.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(board.toggle_flag((2, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(board.remaining_flags(), -1);
        assert_eq!(board.toggle_flag((2, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(board.remaining_flags(), 0);
    }

    #[test]
    fn toggle_flag_on_open_tile_is_noop() {
        let mut board = board_with_mines((3, 1), (0, 0), &[(2, 0)]);
        board.reveal((1, 0)).unwrap();
        assert_eq!(board.toggle_flag((1, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(board.remaining_flags(), 1);
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mut board = board_with_mines((3, 3), (1, 1), &[(0, 1), (2, 1)]);

        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1)).unwrap();
        board.toggle_flag((2, 1)).unwrap();

        let outcome = board.chord((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Cleared);
        assert!(board.tile((1, 0)).unwrap().open);
        assert!(board.tile((1, 2)).unwrap().open);
        assert!(!board.tile((0, 1)).unwrap().open);
    }

    #[test]
    fn chord_with_unsatisfied_count_is_noop() {
        let mut board = board_with_mines((3, 3), (1, 1), &[(0, 1), (2, 1)]);
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1)).unwrap();
        let before = board.clone();

        assert_eq!(board.chord((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(board, before);
    }

    #[test]
    fn chord_with_wrong_flag_hits_mine() {
        let mut board = board_with_mines((3, 3), (1, 1), &[(0, 1)]);
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 0)).unwrap();

        assert_eq!(board.chord((1, 1)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(board.triggered(), Some((0, 1)));
    }

    #[test]
    fn chord_on_closed_tile_is_noop() {
        let mut board = board_with_mines((3, 3), (1, 1), &[(0, 1)]);
        assert_eq!(board.chord((2, 2)).unwrap(), RevealOutcome::NoChange);
        assert!(!board.tile((2, 2)).unwrap().open);
    }

    #[test]
    fn press_on_open_tile_previews_chord() {
        let mut board = board_with_mines((3, 3), (1, 1), &[(0, 1)]);
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1)).unwrap();
        board.press((1, 1)).unwrap();

        assert!(board.tile((1, 1)).unwrap().pressed);
        assert!(board.tile((2, 2)).unwrap().pressed);
        assert!(!board.tile((0, 1)).unwrap().pressed);

        board.clear_pressed();
        assert!(board.iter().all(|(_, tile)| !tile.pressed));
    }

    #[test]
    fn lookup_out_of_bounds_is_an_error() {
        let mut board = Board::new(&config(3, 3, 1));
        let before = board.clone();
        assert_eq!(board.reveal((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
        assert_eq!(board.tile((5, 5)), Err(GameError::InvalidCoords));
        assert_eq!(board, before);
    }

    #[test]
    fn for_each_neighbor_visits_in_scan_order() {
        let board = Board::new(&config(3, 3, 1));
        let mut seen = Vec::new();
        board.for_each_neighbor((0, 1), |pos, _| seen.push(pos));
        assert_eq!(seen, [(0, 0), (1, 0), (1, 1), (0, 2), (1, 2)]);
    }
}
