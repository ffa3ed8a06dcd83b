//! Display-normalized elevation
//!
//! Land is mapped into `[0.1, 0.95]` by its position in the land elevation
//! range; water bands sit at fixed values below it. Lakes are placed relative
//! to their own shore rather than to all land.

use rayon::prelude::*;

use crate::biomes::Biome;
use crate::config::ElevationParams;
use crate::grid::HexGrid;
use crate::tile::Tile;

pub const LAND_RENDER_BASE: f32 = 0.1;
pub const LAND_RENDER_SPAN: f32 = 0.85;
pub const COAST_RENDER: f32 = 0.06;
pub const SEAS_RENDER: f32 = 0.03;
pub const OCEAN_RENDER: f32 = 0.0;

/// Spreads below this are treated as flat and replaced by 1.0.
const MIN_SPREAD: f32 = 1e-6;

fn uses_land_band(tile: &Tile) -> bool {
    (tile.is_land || tile.biome == Biome::Glacier) && !tile.is_lake
}

/// (min, max) elevation over land and glacier tiles; `(0, 1)` when there is no land.
pub fn land_elevation_range(tiles: &[Tile]) -> (f32, f32) {
    let mut range: Option<(f32, f32)> = None;
    for t in tiles.iter().filter(|t| uses_land_band(t)) {
        range = Some(match range {
            None => (t.elevation, t.elevation),
            Some((lo, hi)) => (lo.min(t.elevation), hi.max(t.elevation)),
        });
    }
    range.unwrap_or((0.0, 1.0))
}

/// Inverse lerp into the land band.
pub fn land_render_value(elevation: f32, (min, max): (f32, f32)) -> f32 {
    let mut spread = max - min;
    if spread < MIN_SPREAD {
        spread = 1.0;
    }
    LAND_RENDER_BASE + ((elevation - min) / spread).clamp(0.0, 1.0) * LAND_RENDER_SPAN
}

/// Fill `render_elevation` for every tile. Running it twice gives the same result.
pub fn normalize_render_elevation(grid: &HexGrid, tiles: &mut [Tile], range: (f32, f32), params: &ElevationParams) {
    tiles.par_iter_mut().for_each(|t| {
        t.render_elevation = if t.is_lake {
            0.0
        } else if t.biome == Biome::Coast {
            COAST_RENDER
        } else if t.biome == Biome::Seas {
            SEAS_RENDER
        } else if uses_land_band(t) {
            land_render_value(t.elevation, range)
        } else {
            OCEAN_RENDER
        };
    });

    // Lakes read only land values from the first pass
    let lake_values: Vec<(usize, f32)> = (0..tiles.len())
        .filter(|&i| tiles[i].is_lake)
        .map(|i| {
            let shore: Vec<f32> = grid
                .neighbors(i)
                .iter()
                .filter(|&&n| tiles[n].is_land && !tiles[n].is_lake)
                .map(|&n| tiles[n].render_elevation)
                .collect();
            let level = if shore.is_empty() {
                params.lake_render_baseline
            } else {
                shore.iter().sum::<f32>() / shore.len() as f32
            };
            (i, (level - params.lake_render_depth).max(0.0))
        })
        .collect();

    for (i, v) in lake_values {
        tiles[i].render_elevation = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(grid: &HexGrid, kinds: &[(Biome, bool, bool, f32)]) -> Vec<Tile> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, &(biome, is_land, is_lake, elevation))| {
                let (x, y) = grid.coords(i);
                let mut t = Tile::new(i, x, y);
                t.biome = biome;
                t.is_land = is_land;
                t.is_lake = is_lake;
                t.elevation = elevation;
                t
            })
            .collect()
    }

    fn sample_tiles() -> (HexGrid, Vec<Tile>) {
        let grid = HexGrid::new(8, 1).unwrap();
        let tiles = row(
            &grid,
            &[
                (Biome::Ocean, false, false, 0.0),
                (Biome::Seas, false, false, 0.02),
                (Biome::Coast, true, false, 0.05),
                (Biome::Plains, true, false, 0.3),
                (Biome::Lake, false, true, 0.1),
                (Biome::Forest, true, false, 0.5),
                (Biome::Mountain, true, false, 0.9),
                (Biome::Ocean, false, false, 0.0),
            ],
        );
        (grid, tiles)
    }

    #[test]
    fn test_band_ordering() {
        let (grid, mut tiles) = sample_tiles();
        let range = land_elevation_range(&tiles);
        normalize_render_elevation(&grid, &mut tiles, range, &ElevationParams::default());

        let r: Vec<f32> = tiles.iter().map(|t| t.render_elevation).collect();
        assert_eq!(r[0], OCEAN_RENDER);
        assert!(r[0] < r[1] && r[1] < r[2]);
        assert!(r[2] < r[4], "lake should sit above the coast band");
        assert!(r[4] < r[3].max(r[5]), "lake sits below its shore");
        assert!(r[3] < r[5] && r[5] < r[6]);
        assert!((r[6] - (LAND_RENDER_BASE + LAND_RENDER_SPAN)).abs() < 1e-6);
    }

    #[test]
    fn test_lake_uses_shore_average() {
        let (grid, mut tiles) = sample_tiles();
        let params = ElevationParams::default();
        let range = land_elevation_range(&tiles);
        normalize_render_elevation(&grid, &mut tiles, range, &params);
        let expected = (tiles[3].render_elevation + tiles[5].render_elevation) / 2.0 - params.lake_render_depth;
        assert!((tiles[4].render_elevation - expected).abs() < 1e-6);
    }

    #[test]
    fn test_isolated_lake_uses_baseline() {
        let grid = HexGrid::new(3, 1).unwrap();
        let mut tiles = row(
            &grid,
            &[(Biome::Ocean, false, false, 0.0), (Biome::Lake, false, true, 0.1), (Biome::Ocean, false, false, 0.0)],
        );
        let params = ElevationParams::default();
        normalize_render_elevation(&grid, &mut tiles, (0.0, 1.0), &params);
        assert!((tiles[1].render_elevation - (params.lake_render_baseline - params.lake_render_depth)).abs() < 1e-6);
    }

    #[test]
    fn test_flat_land_range_does_not_divide_by_zero() {
        let grid = HexGrid::new(2, 1).unwrap();
        let mut tiles = row(&grid, &[(Biome::Plains, true, false, 0.4), (Biome::Plains, true, false, 0.4)]);
        let range = land_elevation_range(&tiles);
        assert_eq!(range, (0.4, 0.4));
        normalize_render_elevation(&grid, &mut tiles, range, &ElevationParams::default());
        assert!(tiles.iter().all(|t| (t.render_elevation - LAND_RENDER_BASE).abs() < 1e-6));
    }

    #[test]
    fn test_idempotent() {
        let (grid, mut tiles) = sample_tiles();
        let range = land_elevation_range(&tiles);
        let params = ElevationParams::default();
        normalize_render_elevation(&grid, &mut tiles, range, &params);
        let first: Vec<f32> = tiles.iter().map(|t| t.render_elevation).collect();
        normalize_render_elevation(&grid, &mut tiles, range, &params);
        let second: Vec<f32> = tiles.iter().map(|t| t.render_elevation).collect();
        assert_eq!(first, second);
    }
}
