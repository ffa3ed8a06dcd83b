//! Hexagonal tile grid that wraps horizontally (cylindrical planet).
//!
//! Tiles are pointy-top hexes in "odd-r" offset layout: odd rows sit half a
//! tile to the right of even rows. Columns wrap around at the map edge, rows
//! are clamped (no wrap across the poles). Tile indices are row-major:
//! `index = y * width + x`.

use std::collections::VecDeque;

use crate::error::ConfigError;

/// Neighbor offsets (dx, dy) for tiles on even rows.
const EVEN_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (-1, 0), (0, -1), (-1, -1), (0, 1), (-1, 1)];

/// Neighbor offsets (dx, dy) for tiles on odd rows.
const ODD_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (-1, 0), (1, -1), (0, -1), (1, 1), (0, 1)];

/// Marker for tiles a BFS never reached.
pub const UNREACHED: u32 = u32::MAX;

/// Number of tiles in a full hex disk of the given radius.
pub fn hex_disk_size(radius: usize) -> usize {
    1 + 3 * radius * (radius + 1)
}

/// Fixed-topology hex lattice with precomputed neighbor lists.
#[derive(Clone, Debug)]
pub struct HexGrid {
    width: usize,
    height: usize,
    neighbors: Vec<Vec<usize>>,
}

impl HexGrid {
    /// Build the grid. Zero dimensions are a configuration error.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }

        let mut neighbors = Vec::with_capacity(width * height);
        for y in 0..height {
            let offsets = if y % 2 == 0 { &EVEN_ROW_OFFSETS } else { &ODD_ROW_OFFSETS };
            for x in 0..width {
                let own = y * width + x;
                let mut list = Vec::with_capacity(6);
                for &(dx, dy) in offsets.iter() {
                    let ny = y as i64 + dy;
                    if ny < 0 || ny >= height as i64 {
                        continue;
                    }
                    let nx = (x as i64 + dx).rem_euclid(width as i64) as usize;
                    let idx = ny as usize * width + nx;
                    // Narrow maps fold left/right onto the same tile (or onto self)
                    if idx != own && !list.contains(&idx) {
                        list.push(idx);
                    }
                }
                neighbors.push(list);
            }
        }

        Ok(Self { width, height, neighbors })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.width * self.height
    }

    /// Tile index for (x, y); x wraps, y must be in range.
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x % self.width
    }

    /// Wrap a signed column into `0..width`.
    pub fn wrap_x(&self, x: i64) -> usize {
        x.rem_euclid(self.width as i64) as usize
    }

    /// (x, y) offset coordinates of a tile.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Neighbors of a tile. Symmetric: `b ∈ neighbors(a) ⇔ a ∈ neighbors(b)`.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    /// Row position normalized to [0, 1] (0 = north pole, 1 = south pole).
    pub fn normalized_y(&self, y: usize) -> f64 {
        if self.height <= 1 {
            0.5
        } else {
            y as f64 / (self.height - 1) as f64
        }
    }

    /// Shortest signed horizontal offset from `from` to `to`, respecting wrap.
    pub fn wrapped_dx(&self, from: f64, to: f64) -> f64 {
        let w = self.width as f64;
        let mut dx = (to - from).rem_euclid(w);
        if dx > w / 2.0 {
            dx -= w;
        }
        dx
    }

    /// Convert offset coordinates to axial hex coordinates (q, r).
    pub fn axial(x: i64, y: i64) -> (i64, i64) {
        let q = x - (y - (y & 1)) / 2;
        (q, y)
    }

    /// Hex distance between two offset coordinates, minimised over the
    /// three horizontal wrap translations.
    pub fn hex_distance_xy(&self, a: (usize, usize), b: (usize, usize)) -> usize {
        let (aq, ar) = Self::axial(a.0 as i64, a.1 as i64);
        let w = self.width as i64;
        [-w, 0, w]
            .iter()
            .map(|shift| {
                let (bq, br) = Self::axial(b.0 as i64 + shift, b.1 as i64);
                let dq = bq - aq;
                let dr = br - ar;
                ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as usize
            })
            .min()
            .unwrap_or(0)
    }

    /// Hex-wrapped distance between two tiles.
    pub fn hex_distance(&self, a: usize, b: usize) -> usize {
        self.hex_distance_xy(self.coords(a), self.coords(b))
    }

    /// All tiles within `radius` steps of `center`, in BFS order.
    /// Away from the poles this is a full hex disk of `hex_disk_size(radius)` tiles.
    pub fn disk(&self, center: usize, radius: usize) -> Vec<usize> {
        let dist = self.bfs_distances(&[center], Some(radius), |_| true);
        let mut order: Vec<usize> = (0..self.tile_count()).filter(|&i| dist[i] != UNREACHED).collect();
        order.sort_by_key(|&i| (dist[i], i));
        order
    }

    /// Multi-source BFS. Expansion only enters tiles for which `passable`
    /// holds (sources are always included). Stops at `max_distance` if given.
    pub fn bfs_distances<F>(&self, sources: &[usize], max_distance: Option<usize>, passable: F) -> Vec<u32>
    where
        F: Fn(usize) -> bool,
    {
        let mut dist = vec![UNREACHED; self.tile_count()];
        let mut queue = VecDeque::new();

        for &s in sources {
            if dist[s] == UNREACHED {
                dist[s] = 0;
                queue.push_back(s);
            }
        }

        while let Some(current) = queue.pop_front() {
            let d = dist[current];
            if let Some(max) = max_distance {
                if d as usize >= max {
                    continue;
                }
            }
            for &n in self.neighbors(current) {
                if dist[n] == UNREACHED && passable(n) {
                    dist[n] = d + 1;
                    queue.push_back(n);
                }
            }
        }

        dist
    }

    /// True if any tile within `radius` of `center` (excluding `center`) satisfies `pred`.
    pub fn any_within<F>(&self, center: usize, radius: usize, pred: F) -> bool
    where
        F: Fn(usize) -> bool,
    {
        self.disk(center, radius).into_iter().skip(1).any(pred)
    }
}

// =============================================================================
// WORLD-SPACE LAYOUT
// =============================================================================

/// Maps tiles to world-space positions (pointy-top hexes) and back.
#[derive(Clone, Copy, Debug)]
pub struct HexLayout {
    /// Distance from a hex center to its corners, in world units
    pub size: f64,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self { size: 1.0 }
    }
}

impl HexLayout {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    /// World-space center of tile (x, y).
    pub fn center(&self, x: usize, y: usize) -> (f64, f64) {
        let sqrt3 = 3f64.sqrt();
        let px = self.size * sqrt3 * (x as f64 + 0.5 * (y & 1) as f64);
        let py = self.size * 1.5 * y as f64;
        (px, py)
    }

    /// Tile containing a world-space position; x wraps, positions beyond the
    /// first or last row return `None`.
    pub fn tile_at(&self, grid: &HexGrid, wx: f64, wy: f64) -> Option<usize> {
        let sqrt3 = 3f64.sqrt();
        let fq = (sqrt3 / 3.0 * wx - wy / 3.0) / self.size;
        let fr = (2.0 / 3.0 * wy) / self.size;
        let (q, r) = cube_round(fq, fr);
        if r < 0 || r >= grid.height() as i64 {
            return None;
        }
        let x = q + (r - (r & 1)) / 2;
        Some(grid.index(grid.wrap_x(x), r as usize))
    }
}

/// Round fractional axial coordinates to the nearest hex.
fn cube_round(fq: f64, fr: f64) -> (i64, i64) {
    let fs = -fq - fr;
    let mut q = fq.round();
    let mut r = fr.round();
    let s = fs.round();

    let dq = (q - fq).abs();
    let dr = (r - fr).abs();
    let ds = (s - fs).abs();

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    (q as i64, r as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(HexGrid::new(0, 10).is_err());
        assert!(HexGrid::new(10, 0).is_err());
        assert!(HexGrid::new(1, 1).is_ok());
    }

    #[test]
    fn test_neighbor_symmetry() {
        for &(w, h) in &[(1, 1), (2, 3), (3, 3), (10, 10), (17, 9), (50, 50)] {
            let grid = HexGrid::new(w, h).unwrap();
            for a in 0..grid.tile_count() {
                for &b in grid.neighbors(a) {
                    assert!(grid.neighbors(b).contains(&a),
                        "{}x{}: {} lists {} but not the reverse", w, h, a, b);
                    assert_ne!(a, b, "tile {} lists itself", a);
                }
            }
        }
    }

    #[test]
    fn test_neighbor_counts() {
        let grid = HexGrid::new(10, 10).unwrap();
        // Interior tile
        assert_eq!(grid.neighbors(grid.index(4, 5)).len(), 6);
        // Pole rows lose the row beyond the edge
        assert_eq!(grid.neighbors(grid.index(4, 0)).len(), 4);
        assert_eq!(grid.neighbors(grid.index(4, 9)).len(), 4);
        // Wrapped column still has six
        assert_eq!(grid.neighbors(grid.index(0, 5)).len(), 6);
        assert!(grid.neighbors(grid.index(0, 5)).contains(&grid.index(9, 5)));
    }

    #[test]
    fn test_hex_distance_matches_bfs() {
        let grid = HexGrid::new(12, 9).unwrap();
        for &start in &[0, 13, 40, 107] {
            let dist = grid.bfs_distances(&[start], None, |_| true);
            for t in 0..grid.tile_count() {
                assert_eq!(grid.hex_distance(start, t), dist[t] as usize,
                    "distance mismatch from {} to {}", start, t);
            }
        }
    }

    #[test]
    fn test_hex_distance_wraps() {
        let grid = HexGrid::new(20, 10).unwrap();
        assert_eq!(grid.hex_distance_xy((0, 4), (19, 4)), 1);
        assert_eq!(grid.hex_distance_xy((1, 4), (18, 4)), 3);
    }

    #[test]
    fn test_disk_sizes() {
        let grid = HexGrid::new(30, 30).unwrap();
        let center = grid.index(15, 15);
        for r in 0..4 {
            assert_eq!(grid.disk(center, r).len(), hex_disk_size(r));
        }
        assert_eq!(grid.disk(center, 2)[0], center);
    }

    #[test]
    fn test_bfs_respects_passable() {
        let grid = HexGrid::new(10, 1).unwrap();
        // Wall at x = 3 and x = 7 leaves 4..=6 isolated from 0
        let dist = grid.bfs_distances(&[0], None, |i| i != 3 && i != 7);
        assert_eq!(dist[5], UNREACHED);
        assert_eq!(dist[9], 1);
        assert_eq!(dist[8], 2);
    }

    #[test]
    fn test_wrapped_dx() {
        let grid = HexGrid::new(10, 10).unwrap();
        assert_eq!(grid.wrapped_dx(9.0, 0.0), 1.0);
        assert_eq!(grid.wrapped_dx(0.0, 9.0), -1.0);
        assert_eq!(grid.wrapped_dx(2.0, 4.0), 2.0);
    }

    #[test]
    fn test_layout_round_trip() {
        let grid = HexGrid::new(16, 8).unwrap();
        let layout = HexLayout::new(2.0);
        for y in 0..8 {
            for x in 0..16 {
                let (wx, wy) = layout.center(x, y);
                assert_eq!(layout.tile_at(&grid, wx + 0.3, wy - 0.2), Some(grid.index(x, y)));
            }
        }
        // Wrapping past the right edge lands back on column 0
        let (wx, wy) = layout.center(0, 2);
        let width_world = 16.0 * 2.0 * 3f64.sqrt();
        assert_eq!(layout.tile_at(&grid, wx + width_world, wy), Some(grid.index(0, 2)));
        assert_eq!(layout.tile_at(&grid, 0.0, -10.0), None);
    }
}
