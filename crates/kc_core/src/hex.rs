//! Hex coordinate math.
//!
//! Cells are addressed in axial `(q, r)` coordinates. Rectangular realms use
//! an odd-r offset layout (odd rows shift right by half a hex), which keeps
//! every neighbour equidistant. Pixel layout is pointy-top and uses
//! fixed-point math.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::math::{sqrt3, Fixed, Vec2Fixed};

/// Default hex size (centre to corner) in pixels.
pub const DEFAULT_HEX_SIZE: i32 = 40;

/// Width of the 16:9 view box the map is fitted into.
pub const VIEW_WIDTH: i32 = 960;

/// Height of the 16:9 view box the map is fitted into.
pub const VIEW_HEIGHT: i32 = 540;

/// Largest column or row count a rectangular realm may use.
pub const MAX_GRID_SIDE: u32 = 1024;

/// Largest cell count a rectangular realm may use.
pub const MAX_GRID_CELLS: u32 = 65_536;

/// Axial direction vectors, counter-clockwise starting east.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
];

/// Axial hex coordinate.
///
/// Serializes as its stable string id `"q,r"` so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// The axial origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube axis.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Stable string id, `"q,r"`.
    #[must_use]
    pub fn id(self) -> String {
        self.to_string()
    }

    /// Cube distance: `max(|dq|, |dr|, |dq + dr|)`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        let max = if dq > dr { dq } else { dr };
        if ds > max {
            ds
        } else {
            max
        }
    }

    /// True when `other` is exactly one step away.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }

    /// The six surrounding coordinates (unbounded).
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        DIRECTIONS.map(|d| self + d)
    }

    /// Every coordinate at exactly `radius` steps, walking the ring.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn ring(self, radius: u32) -> Vec<Self> {
        if radius == 0 {
            return vec![self];
        }
        let k = radius as i32;
        let mut hex = self + DIRECTIONS[4].scale(k);
        let mut ring = Vec::with_capacity(6 * radius as usize);
        for direction in DIRECTIONS {
            for _ in 0..radius {
                ring.push(hex);
                hex = hex + direction;
            }
        }
        ring
    }

    /// Convert to odd-r offset coordinates.
    #[must_use]
    pub const fn to_offset(self) -> OffsetCoord {
        axial_to_offset(self)
    }

    const fn scale(self, k: i32) -> Self {
        Self::new(self.q * k, self.r * k)
    }
}

impl std::ops::Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Error parsing a `"q,r"` hex id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex id '{0}', expected \"q,r\"")]
pub struct ParseHexError(String);

impl FromStr for HexCoord {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseHexError(s.to_string()))?;
        let q = q.trim().parse().map_err(|_| ParseHexError(s.to_string()))?;
        let r = r.trim().parse().map_err(|_| ParseHexError(s.to_string()))?;
        Ok(Self::new(q, r))
    }
}

impl Serialize for HexCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Odd-r offset coordinate (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetCoord {
    /// Column index.
    pub col: i32,
    /// Row index.
    pub row: i32,
}

impl OffsetCoord {
    /// Create an offset coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Convert to axial.
    #[must_use]
    pub const fn to_axial(self) -> HexCoord {
        offset_to_axial(self.col, self.row)
    }
}

/// Odd-r offset to axial: `q = col - (row - (row & 1)) / 2`.
#[must_use]
pub const fn offset_to_axial(col: i32, row: i32) -> HexCoord {
    HexCoord::new(col - (row - (row & 1)) / 2, row)
}

/// Axial to odd-r offset. Inverse of [`offset_to_axial`].
#[must_use]
pub const fn axial_to_offset(hex: HexCoord) -> OffsetCoord {
    OffsetCoord::new(hex.q + (hex.r - (hex.r & 1)) / 2, hex.r)
}

/// Shape a grid was generated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridShape {
    /// `cols` x `rows` odd-r rectangle.
    Rectangle {
        /// Column count.
        cols: u32,
        /// Row count.
        rows: u32,
    },
    /// Hexagon of the given radius around the origin.
    Radial {
        /// Radius in steps.
        radius: u32,
    },
}

/// A fixed set of cells generated once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexGrid {
    shape: GridShape,
    cells: Vec<HexCoord>,
    members: BTreeSet<HexCoord>,
}

impl HexGrid {
    /// True when a `cols` x `rows` rectangle is non-empty and within
    /// [`MAX_GRID_SIDE`] and [`MAX_GRID_CELLS`].
    #[must_use]
    pub const fn rect_fits(cols: u32, rows: u32) -> bool {
        if cols == 0 || rows == 0 || cols > MAX_GRID_SIDE || rows > MAX_GRID_SIDE {
            return false;
        }
        match cols.checked_mul(rows) {
            Some(cells) => cells <= MAX_GRID_CELLS,
            None => false,
        }
    }

    /// Rectangular grid in row-major order.
    ///
    /// Content is checked with [`HexGrid::rect_fits`] before a realm grid is
    /// built.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn rect(cols: u32, rows: u32) -> Self {
        let mut cells = Vec::with_capacity(cols as usize * rows as usize);
        for row in 0..rows as i32 {
            for col in 0..cols as i32 {
                cells.push(offset_to_axial(col, row));
            }
        }
        Self::from_cells(GridShape::Rectangle { cols, rows }, cells)
    }

    /// Hexagonal grid of every cell within `radius` of the origin.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn radial(radius: u32) -> Self {
        let n = radius as i32;
        let mut cells = Vec::new();
        for q in -n..=n {
            for r in (-n).max(-q - n)..=n.min(-q + n) {
                cells.push(HexCoord::new(q, r));
            }
        }
        Self::from_cells(GridShape::Radial { radius }, cells)
    }

    fn from_cells(shape: GridShape, cells: Vec<HexCoord>) -> Self {
        let members = cells.iter().copied().collect();
        Self {
            shape,
            cells,
            members,
        }
    }

    /// Shape parameters.
    #[must_use]
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    /// Cells in generation order.
    #[must_use]
    pub fn cells(&self) -> &[HexCoord] {
        &self.cells
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a grid with no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether the coordinate is part of the grid.
    #[must_use]
    pub fn contains(&self, hex: HexCoord) -> bool {
        self.members.contains(&hex)
    }

    /// Default start: column 1 of the centre row, or the origin for radial grids.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn default_start(&self) -> HexCoord {
        match self.shape {
            GridShape::Rectangle { cols, rows } => {
                offset_to_axial(1.min(cols.saturating_sub(1)) as i32, (rows / 2) as i32)
            }
            GridShape::Radial { .. } => HexCoord::ORIGIN,
        }
    }

    /// Lowest and highest offset column present.
    #[must_use]
    pub fn column_span(&self) -> Option<(i32, i32)> {
        let cols = self.cells.iter().map(|h| h.to_offset().col);
        let min = cols.clone().min()?;
        let max = cols.max()?;
        Some((min, max))
    }

    /// In-grid neighbours of a cell.
    #[must_use]
    pub fn neighbors_in(&self, hex: HexCoord) -> Vec<HexCoord> {
        hex.neighbors()
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// In-grid cells at exactly `radius` steps.
    #[must_use]
    pub fn ring_in(&self, hex: HexCoord, radius: u32) -> Vec<HexCoord> {
        hex.ring(radius)
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// Pixel extent of the whole grid, including hex half-widths.
    #[must_use]
    pub fn pixel_bounds(&self, size: Fixed) -> PixelBounds {
        let half_w = size * sqrt3() / Fixed::from_num(2);
        let mut points = self.cells.iter().map(|h| hex_to_pixel(*h, size));
        let Some(first) = points.next() else {
            return PixelBounds::default();
        };
        let mut bounds = PixelBounds {
            min: first,
            max: first,
        };
        for p in points {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        bounds.min = bounds.min - Vec2Fixed::new(half_w, size);
        bounds.max = bounds.max + Vec2Fixed::new(half_w, size);
        bounds
    }
}

/// Pointy-top pixel centre of a hex.
///
/// `x = size * sqrt(3) * (q + r / 2)`, `y = size * 3/2 * r`.
#[must_use]
pub fn hex_to_pixel(hex: HexCoord, size: Fixed) -> Vec2Fixed {
    let q = Fixed::from_num(hex.q);
    let r = Fixed::from_num(hex.r);
    let two = Fixed::from_num(2);
    Vec2Fixed::new(
        size * sqrt3() * (q + r / two),
        size * Fixed::from_num(3) / two * r,
    )
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelBounds {
    /// Top-left corner.
    pub min: Vec2Fixed,
    /// Bottom-right corner.
    pub max: Vec2Fixed,
}

impl PixelBounds {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> Fixed {
        self.max.x - self.min.x
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> Fixed {
        self.max.y - self.min.y
    }

    /// Midpoint.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        let two = Fixed::from_num(2);
        Vec2Fixed::new(
            (self.min.x + self.max.x) / two,
            (self.min.y + self.max.y) / two,
        )
    }
}

/// Maps grid pixel space into a fixed view box.
///
/// The grid is scaled to cover the view (the larger of the two axis ratios)
/// with an 8% overscan, and centred on the view's midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTransform {
    /// Uniform scale factor.
    #[serde(with = "crate::math::fixed_serde")]
    pub scale: Fixed,
    /// Centre of the grid in grid pixel space.
    pub center: Vec2Fixed,
    /// Centre of the view box.
    pub origin: Vec2Fixed,
}

impl GridTransform {
    /// Fit `bounds` into a `view_width` x `view_height` box.
    #[must_use]
    pub fn fit(bounds: PixelBounds, view_width: i32, view_height: i32) -> Self {
        let vw = Fixed::from_num(view_width);
        let vh = Fixed::from_num(view_height);
        let two = Fixed::from_num(2);
        let overscan = Fixed::from_num(108) / Fixed::from_num(100);
        let scale = if bounds.width() > Fixed::ZERO && bounds.height() > Fixed::ZERO {
            (vw / bounds.width()).max(vh / bounds.height()) * overscan
        } else {
            Fixed::ONE
        };
        Self {
            scale,
            center: bounds.center(),
            origin: Vec2Fixed::new(vw / two, vh / two),
        }
    }

    /// Fit a grid into the default 960x540 view box.
    #[must_use]
    pub fn for_grid(grid: &HexGrid, size: Fixed) -> Self {
        Self::fit(grid.pixel_bounds(size), VIEW_WIDTH, VIEW_HEIGHT)
    }

    /// Map a grid pixel into the view box.
    #[must_use]
    pub fn to_view(&self, point: Vec2Fixed) -> Vec2Fixed {
        self.origin + (point - self.center).scale(self.scale)
    }

    /// Pixel centre of a hex inside the view box.
    #[must_use]
    pub fn hex_to_view_pixel(&self, hex: HexCoord, size: Fixed) -> Vec2Fixed {
        self.to_view(hex_to_pixel(hex, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_fits_limits() {
        assert!(HexGrid::rect_fits(14, 9));
        assert!(HexGrid::rect_fits(MAX_GRID_SIDE, MAX_GRID_CELLS / MAX_GRID_SIDE));
        assert!(!HexGrid::rect_fits(0, 9));
        assert!(!HexGrid::rect_fits(MAX_GRID_SIDE + 1, 1));
        assert!(!HexGrid::rect_fits(MAX_GRID_SIDE, MAX_GRID_SIDE));
        assert!(!HexGrid::rect_fits(70_000, 70_000));
        assert!(!HexGrid::rect_fits(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_offset_round_trip_14x9() {
        for row in 0..9 {
            for col in 0..14 {
                let axial = offset_to_axial(col, row);
                assert_eq!(axial_to_offset(axial), OffsetCoord::new(col, row));
            }
        }
    }

    #[test]
    fn test_offset_adjacent_cells_have_distance_one() {
        // Odd-r neighbour offsets, by row parity.
        let even = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];
        let odd = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];
        for row in 0..9 {
            for col in 0..14 {
                let here = offset_to_axial(col, row);
                let deltas = if row & 1 == 0 { even } else { odd };
                for (dc, dr) in deltas {
                    let there = offset_to_axial(col + dc, row + dr);
                    assert_eq!(here.distance(there), 1, "({col},{row}) -> ({dc},{dr})");
                }
            }
        }
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = HexCoord::new(3, -2);
        for n in center.neighbors() {
            assert!(center.is_adjacent(n));
        }
        assert!(!center.is_adjacent(center));
    }

    #[test]
    fn test_ring_sizes() {
        let center = HexCoord::new(2, 1);
        assert_eq!(center.ring(0), vec![center]);
        for k in 1..5 {
            let ring = center.ring(k);
            assert_eq!(ring.len(), 6 * k as usize);
            assert!(ring.iter().all(|h| center.distance(*h) == k));
            let unique: BTreeSet<_> = ring.iter().collect();
            assert_eq!(unique.len(), ring.len());
        }
    }

    #[test]
    fn test_rect_grid_layout() {
        let grid = HexGrid::rect(14, 9);
        assert_eq!(grid.len(), 126);
        assert_eq!(grid.cells()[0], HexCoord::new(0, 0));
        assert_eq!(grid.cells()[14], offset_to_axial(0, 1));
        assert_eq!(grid.column_span(), Some((0, 13)));
        assert_eq!(grid.default_start(), offset_to_axial(1, 4));
        assert_eq!(grid.default_start(), HexCoord::new(-1, 4));
    }

    #[test]
    fn test_radial_grid_count() {
        for n in 0..5u32 {
            assert_eq!(HexGrid::radial(n).len() as u32, 3 * n * (n + 1) + 1);
        }
        assert_eq!(HexGrid::radial(2).default_start(), HexCoord::ORIGIN);
    }

    #[test]
    fn test_neighbors_in_clips_to_grid() {
        let grid = HexGrid::rect(14, 9);
        assert_eq!(grid.neighbors_in(HexCoord::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbors_in(offset_to_axial(5, 4)).len(), 6);
    }

    #[test]
    fn test_hex_id_parse() {
        let hex: HexCoord = "-3,7".parse().unwrap();
        assert_eq!(hex, HexCoord::new(-3, 7));
        assert_eq!(hex.id(), "-3,7");
        assert!("3".parse::<HexCoord>().is_err());
        assert!("a,b".parse::<HexCoord>().is_err());
    }

    #[test]
    fn test_hex_serializes_as_id() {
        let json = serde_json::to_string(&HexCoord::new(1, -2)).unwrap();
        assert_eq!(json, "\"1,-2\"");
        let back: HexCoord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HexCoord::new(1, -2));
    }

    #[test]
    fn test_hex_to_pixel() {
        let size = Fixed::from_num(DEFAULT_HEX_SIZE);
        assert_eq!(hex_to_pixel(HexCoord::ORIGIN, size), Vec2Fixed::ZERO);
        let p = hex_to_pixel(HexCoord::new(0, 2), size).round_to_pixels();
        assert_eq!(p, (69, 120));
    }

    #[test]
    fn test_transform_centers_grid() {
        let grid = HexGrid::rect(14, 9);
        let size = Fixed::from_num(DEFAULT_HEX_SIZE);
        let bounds = grid.pixel_bounds(size);
        let transform = GridTransform::for_grid(&grid, size);
        assert_eq!(transform.to_view(bounds.center()).round_to_pixels(), (480, 270));
        assert!(transform.scale > Fixed::ZERO);
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric(q1 in -50i32..50, r1 in -50i32..50, q2 in -50i32..50, r2 in -50i32..50) {
            let a = HexCoord::new(q1, r1);
            let b = HexCoord::new(q2, r2);
            prop_assert_eq!(a.distance(b), b.distance(a));
            prop_assert_eq!(a.distance(a), 0);
        }

        #[test]
        fn prop_offset_round_trip(col in -100i32..100, row in -100i32..100) {
            prop_assert_eq!(offset_to_axial(col, row).to_offset(), OffsetCoord::new(col, row));
        }
    }
}
