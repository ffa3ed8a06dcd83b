//! Coast and shallow-sea formation
//!
//! Two full-grid passes, in order: land touching open water becomes Coast,
//! then Ocean touching Coast becomes Seas. Water elevations are then fixed to
//! their configured constants.

use serde::Serialize;

use crate::biomes::Biome;
use crate::config::ElevationParams;
use crate::grid::HexGrid;
use crate::tile::Tile;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CoastlineReport {
    pub coast: usize,
    pub seas: usize,
}

/// Open water: neither land nor lake.
fn is_open_water(tile: &Tile) -> bool {
    !tile.is_land && !tile.is_lake
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Rewrite coast and seas biomes, then fix water elevations.
///
/// Arctic, Glacier and Mountain tiles are never rewritten. Coast tiles stay
/// land; each pass reads the state left by the previous one, not its own
/// partial writes.
pub fn resolve_coastline(grid: &HexGrid, tiles: &mut [Tile], params: &ElevationParams) -> CoastlineReport {
    let coast: Vec<usize> = (0..tiles.len())
        .filter(|&i| {
            let t = &tiles[i];
            t.is_land
                && !t.is_lake
                && !t.biome.is_coast_protected()
                && grid.neighbors(i).iter().any(|&n| is_open_water(&tiles[n]))
        })
        .collect();

    for &i in &coast {
        tiles[i].biome = Biome::Coast;
        tiles[i].is_hill = false;
    }

    let seas: Vec<usize> = (0..tiles.len())
        .filter(|&i| {
            tiles[i].biome == Biome::Ocean && grid.neighbors(i).iter().any(|&n| tiles[n].biome == Biome::Coast)
        })
        .collect();

    for &i in &seas {
        tiles[i].biome = Biome::Seas;
    }

    for tile in tiles.iter_mut() {
        if tile.biome == Biome::Coast {
            tile.elevation = params.coast_elevation;
        } else if tile.biome == Biome::Seas {
            tile.elevation = params.seas_elevation;
        } else if is_open_water(tile) {
            tile.elevation = params.ocean_elevation;
        }
    }

    log::debug!("Coastline: {} coast tiles, {} seas tiles", coast.len(), seas.len());
    CoastlineReport { coast: coast.len(), seas: seas.len() }
}
