//! Per-tile record handed to gameplay and render consumers.

use serde::{Deserialize, Serialize};

use crate::biomes::Biome;
use crate::config::ElevationParams;

/// Relief class derived from elevation thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElevationTier {
    #[default]
    Flat,
    Hill,
    Mountain,
}

impl ElevationTier {
    /// `> mountain_threshold` is Mountain; a hill flag or `> hill_threshold` is Hill.
    pub fn from_elevation(elevation: f32, is_hill: bool, params: &ElevationParams) -> Self {
        if elevation > params.mountain_threshold {
            ElevationTier::Mountain
        } else if is_hill || elevation > params.hill_threshold {
            ElevationTier::Hill
        } else {
            ElevationTier::Flat
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileYields {
    pub food: u32,
    pub production: u32,
    pub gold: u32,
    pub science: u32,
    pub culture: u32,
}

impl TileYields {
    pub const fn new(food: u32, production: u32, gold: u32, science: u32, culture: u32) -> Self {
        Self { food, production, gold, science, culture }
    }

    pub fn total(&self) -> u32 {
        self.food + self.production + self.gold + self.science + self.culture
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub biome: Biome,
    pub is_land: bool,
    pub is_lake: bool,
    pub is_river: bool,
    pub is_hill: bool,
    /// Gameplay elevation (unnormalized)
    pub elevation: f32,
    /// Display elevation, filled in after biomes are final
    pub render_elevation: f32,
    pub temperature: f32,
    pub moisture: f32,
    pub elevation_tier: ElevationTier,
    pub movement_cost: u32,
    pub yields: TileYields,
    /// Index of the first continent stamp containing this tile
    pub continent: Option<usize>,
}

impl Tile {
    /// Open-ocean tile at (x, y).
    pub fn new(index: usize, x: usize, y: usize) -> Self {
        Self {
            index,
            x,
            y,
            biome: Biome::Ocean,
            is_land: false,
            is_lake: false,
            is_river: false,
            is_hill: false,
            elevation: 0.0,
            render_elevation: 0.0,
            temperature: 0.0,
            moisture: 0.0,
            elevation_tier: ElevationTier::Flat,
            movement_cost: 1,
            yields: TileYields::default(),
            continent: None,
        }
    }
}

// =============================================================================
// YIELDS
// =============================================================================

/// Biome-to-yield lookup supplied by the game layer.
pub trait YieldTable: Send + Sync {
    fn yields(&self, tile: &Tile) -> TileYields;
}

/// Civ-style yields: biome base, +1 production on hills, +1 gold on rivers.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultYieldTable;

impl DefaultYieldTable {
    fn base(biome: Biome) -> TileYields {
        match biome {
            Biome::Ocean => TileYields::new(1, 0, 1, 0, 0),
            Biome::Seas => TileYields::new(1, 0, 1, 0, 0),
            Biome::Coast => TileYields::new(1, 0, 1, 0, 0),
            Biome::Lake => TileYields::new(2, 0, 1, 0, 0),
            Biome::River => TileYields::new(2, 0, 1, 0, 0),
            Biome::Mountain => TileYields::new(0, 1, 0, 1, 0),
            Biome::Glacier | Biome::Arctic => TileYields::default(),
            Biome::Tundra => TileYields::new(1, 0, 0, 0, 0),
            Biome::Taiga => TileYields::new(1, 1, 0, 0, 0),
            Biome::Steppe => TileYields::new(1, 1, 0, 0, 0),
            Biome::Plains => TileYields::new(1, 1, 0, 0, 0),
            Biome::Grassland => TileYields::new(2, 0, 0, 0, 0),
            Biome::Forest => TileYields::new(1, 1, 0, 0, 0),
            Biome::Marsh => TileYields::new(1, 0, 0, 0, 0),
            Biome::Savanna => TileYields::new(1, 1, 0, 0, 0),
            Biome::Jungle => TileYields::new(1, 0, 0, 1, 0),
            Biome::Swamp => TileYields::new(1, 0, 0, 0, 0),
            Biome::Desert => TileYields::default(),
            Biome::AshWaste => TileYields::new(0, 1, 0, 0, 0),
            Biome::MagmaField => TileYields::new(0, 2, 0, 0, 0),
            Biome::Blightland => TileYields::new(0, 0, 0, 0, 1),
            Biome::Brimstone => TileYields::new(0, 1, 1, 0, 0),
            Biome::RedDesert | Biome::Regolith => TileYields::new(0, 1, 0, 0, 0),
            Biome::Crater => TileYields::new(0, 1, 0, 1, 0),
            Biome::VolcanicPlain => TileYields::new(0, 2, 0, 0, 0),
            Biome::SulfurFlats => TileYields::new(0, 1, 1, 0, 0),
            Biome::IceShelf => TileYields::new(0, 0, 0, 1, 0),
            Biome::HydrocarbonDunes => TileYields::new(0, 1, 1, 0, 0),
        }
    }
}

impl YieldTable for DefaultYieldTable {
    fn yields(&self, tile: &Tile) -> TileYields {
        let mut y = Self::base(tile.biome);
        if tile.is_hill {
            y.production += 1;
        }
        if tile.is_river {
            y.gold += 1;
        }
        y
    }
}
