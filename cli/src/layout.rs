use anyhow::Context;
use clipsweeper_core::{Coord, Coord2, DisplayAdapter, GameConfig, HitTest, Point, RegionId, RegionSet};

pub const TILE_SIZE: i32 = 16;
pub const BOARD_LEFT: i32 = 12;
pub const BOARD_TOP: i32 = 55;
pub const FACE_SIZE: i32 = 26;
pub const FACE_TOP: i32 = 15;
pub const DIGIT_WIDTH: i32 = 11;
pub const DIGIT_HEIGHT: i32 = 21;
pub const DIGIT_TOP: i32 = 17;
pub const DIGIT_STEP: i32 = 13;
pub const MINES_LEFT: i32 = 18;
pub const TIME_RIGHT_INSET: i32 = 31;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.x..self.x + self.width).contains(&point.x)
            && (self.y..self.y + self.height).contains(&point.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Geometry of the classic skin, one rectangle per registered region.
#[derive(Clone, Debug)]
pub struct ClassicLayout {
    width: Coord,
    rects: Vec<Option<Rect>>,
}

impl ClassicLayout {
    pub fn new(regions: &RegionSet, config: &GameConfig) -> anyhow::Result<Self> {
        let layout = Self {
            width: config.width,
            rects: Vec::new(),
        };
        let rects = regions
            .ids()
            .map(|id| {
                let region = regions.get(id).context("region vanished while laying out")?;
                let index = region.index as i32;
                Ok(match region.name.as_str() {
                    DisplayAdapter::FACE => Some(layout.face()),
                    DisplayAdapter::TILES => {
                        let width = i32::from(config.width);
                        Some(layout.tile_rect(index % width, index / width))
                    }
                    DisplayAdapter::MINES => Some(layout.digit(MINES_LEFT, index)),
                    DisplayAdapter::TIME => Some(layout.digit(layout.time_left(), index)),
                    other => {
                        log::warn!("No geometry for region {other:?}");
                        None
                    }
                })
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(Self { rects, ..layout })
    }

    fn board_width(&self) -> i32 {
        TILE_SIZE * i32::from(self.width)
    }

    fn time_left(&self) -> i32 {
        self.board_width() - TIME_RIGHT_INSET
    }

    fn digit(&self, left: i32, index: i32) -> Rect {
        Rect::new(left + DIGIT_STEP * index, DIGIT_TOP, DIGIT_WIDTH, DIGIT_HEIGHT)
    }

    fn tile_rect(&self, x: i32, y: i32) -> Rect {
        Rect::new(
            BOARD_LEFT + TILE_SIZE * x,
            BOARD_TOP + TILE_SIZE * y,
            TILE_SIZE,
            TILE_SIZE,
        )
    }

    pub fn face(&self) -> Rect {
        Rect::new(self.board_width() / 2 - 1, FACE_TOP, FACE_SIZE, FACE_SIZE)
    }

    pub fn tile(&self, (x, y): Coord2) -> Rect {
        self.tile_rect(i32::from(x), i32::from(y))
    }

    pub fn rect(&self, region: RegionId) -> Option<Rect> {
        self.rects.get(region.0 as usize).copied().flatten()
    }
}

impl HitTest for ClassicLayout {
    fn contains(&self, region: RegionId, point: Point) -> bool {
        self.rect(region).is_some_and(|rect| rect.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsweeper_core::Simulation;

    fn beginner() -> (RegionSet, ClassicLayout) {
        let config = GameConfig::BEGINNER;
        let regions = Simulation::standard_regions(&config);
        let layout = ClassicLayout::new(&regions, &config).unwrap();
        (regions, layout)
    }

    #[test]
    fn tiles_sit_on_a_sixteen_pixel_grid() {
        let (regions, layout) = beginner();
        let tiles = regions.lookup(DisplayAdapter::TILES).unwrap();

        assert_eq!(layout.rect(tiles[0]), Some(Rect::new(12, 55, 16, 16)));
        // row-major: index 10 is (1, 1)
        assert_eq!(layout.rect(tiles[10]), Some(Rect::new(28, 71, 16, 16)));
        assert!(layout.contains(tiles[10], Point::new(28, 71)));
        assert!(!layout.contains(tiles[10], Point::new(44, 71)));
    }

    #[test]
    fn face_and_counters_follow_board_width() {
        let (regions, layout) = beginner();
        let face = regions.lookup(DisplayAdapter::FACE).unwrap()[0];
        let time = regions.lookup(DisplayAdapter::TIME).unwrap();
        let mines = regions.lookup(DisplayAdapter::MINES).unwrap();

        assert_eq!(layout.rect(face), Some(Rect::new(71, 15, 26, 26)));
        assert_eq!(layout.rect(mines[2]), Some(Rect::new(44, 17, 11, 21)));
        assert_eq!(layout.rect(time[0]), Some(Rect::new(113, 17, 11, 21)));
    }

    #[test]
    fn unknown_regions_are_never_hit() {
        let config = GameConfig::BEGINNER;
        let mut regions = Simulation::standard_regions(&config);
        let extra = regions.add("logo", 1, 1)[0];
        let layout = ClassicLayout::new(&regions, &config).unwrap();
        assert!(!layout.contains(extra, Point::new(0, 0)));
    }
}
