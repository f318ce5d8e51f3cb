use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and tile counts.
pub type CellCount = u16;

/// Two-dimensional tile coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Tile count of a `width` by `height` board; 255x255 still fits a `CellCount`.
pub const fn mult(width: Coord, height: Coord) -> CellCount {
    width as CellCount * height as CellCount
}

/// Presentation-space point, as reported by the pointer source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let (dim_x, dim_y) = self.dim();
        // dimensions are built from `Coord` values so they always fit
        let size = (dim_x as Coord, dim_y as Coord);
        NeighborIter::new(index, size)
    }
}

/// Row-major offsets around a tile, center excluded.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Offsets `coords` by `(dx, dy)`, staying inside `0..bounds` on both axes.
fn offset((x, y): Coord2, (dx, dy): (i8, i8), (width, height): Coord2) -> Option<Coord2> {
    let x = x.checked_add_signed(dx).filter(|&x| x < width)?;
    let y = y.checked_add_signed(dy).filter(|&y| y < height)?;
    Some((x, y))
}

/// Iterates the up-to-8 grid-clipped neighbors of a tile in a fixed order.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    next: usize,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            next: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = DISPLACEMENTS.get(self.next) {
            self.next += 1;
            if let Some(neighbor) = offset(self.center, delta, self.bounds) {
                return Some(neighbor);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(DISPLACEMENTS.len() - self.next.min(DISPLACEMENTS.len())))
    }
}
