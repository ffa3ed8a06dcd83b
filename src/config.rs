//! Generation parameters, presets, and validation.
//!
//! Every group deserializes with `#[serde(default)]`, so a JSON config only
//! needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biomes::{SpecialMapType, WorldType};
use crate::error::ConfigError;

// =============================================================================
// MAP SIZE TIERS
// =============================================================================

/// Map size tier. Controls default grid dimensions and the size ranges of
/// continents and islands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapSize {
    Duel,
    Small,
    #[default]
    Standard,
    Large,
    Huge,
}

impl MapSize {
    pub fn all() -> &'static [Self] {
        &[Self::Duel, Self::Small, Self::Standard, Self::Large, Self::Huge]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Duel => "40x24, two small continents",
            Self::Small => "56x36, three continents",
            Self::Standard => "80x50, four continents",
            Self::Large => "104x64, five continents",
            Self::Huge => "128x80, six continents",
        }
    }

    /// Grid dimensions (width, height) in tiles.
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Self::Duel => (40, 24),
            Self::Small => (56, 36),
            Self::Standard => (80, 50),
            Self::Large => (104, 64),
            Self::Huge => (128, 80),
        }
    }

    /// Continent count and (min_w, max_w, min_h, max_h, min_distance).
    fn continent_defaults(&self) -> (usize, (usize, usize, usize, usize, usize)) {
        match self {
            Self::Duel => (2, (8, 12, 6, 10, 10)),
            Self::Small => (3, (10, 16, 8, 12, 14)),
            Self::Standard => (4, (14, 22, 10, 16, 18)),
            Self::Large => (5, (18, 28, 12, 20, 22)),
            Self::Huge => (6, (22, 34, 14, 24, 26)),
        }
    }

    /// Island count and (min_w, max_w, min_h, max_h).
    fn island_defaults(&self) -> (usize, (usize, usize, usize, usize)) {
        match self {
            Self::Duel => (3, (2, 3, 2, 3)),
            Self::Small => (4, (2, 4, 2, 3)),
            Self::Standard => (6, (2, 4, 2, 4)),
            Self::Large => (8, (2, 5, 2, 4)),
            Self::Huge => (10, (3, 6, 2, 5)),
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "duel" | "tiny" => Ok(Self::Duel),
            "small" => Ok(Self::Small),
            "standard" | "default" => Ok(Self::Standard),
            "large" => Ok(Self::Large),
            "huge" => Ok(Self::Huge),
            _ => Err(ConfigError::UnknownName { kind: "map size", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for MapSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duel => write!(f, "duel"),
            Self::Small => write!(f, "small"),
            Self::Standard => write!(f, "standard"),
            Self::Large => write!(f, "large"),
            Self::Huge => write!(f, "huge"),
        }
    }
}

// =============================================================================
// CLIMATE PRESETS
// =============================================================================

/// Global temperature preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TemperaturePreset {
    Cold,
    #[default]
    Temperate,
    Hot,
}

impl TemperaturePreset {
    pub fn all() -> &'static [Self] {
        &[Self::Cold, Self::Temperate, Self::Hot]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cold => "Ice age: wide polar caps, little jungle",
            Self::Temperate => "Earth-like temperature bands",
            Self::Hot => "Hothouse: narrow poles, wide tropics",
        }
    }

    pub fn temperature_bias(&self) -> f32 {
        match self {
            Self::Cold => -0.15,
            Self::Temperate => 0.0,
            Self::Hot => 0.15,
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "cold" => Ok(Self::Cold),
            "temperate" | "normal" => Ok(Self::Temperate),
            "hot" => Ok(Self::Hot),
            _ => Err(ConfigError::UnknownName { kind: "temperature preset", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for TemperaturePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Temperate => write!(f, "temperate"),
            Self::Hot => write!(f, "hot"),
        }
    }
}

/// Rainfall/moisture level preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RainfallLevel {
    /// Arid: Deserts dominate, very little moisture
    Arid,
    /// Normal: Earth-like moisture distribution
    #[default]
    Normal,
    /// Wet: More rainfall, larger forests
    Wet,
    /// Tropical: High moisture everywhere
    Tropical,
}

impl RainfallLevel {
    pub fn all() -> &'static [Self] {
        &[Self::Arid, Self::Normal, Self::Wet, Self::Tropical]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Arid => "Desert world",
            Self::Normal => "Earth-like moisture distribution",
            Self::Wet => "Rainy world, larger forests",
            Self::Tropical => "Jungle and swamp world",
        }
    }

    pub fn moisture_bias(&self) -> f32 {
        match self {
            Self::Arid => -0.2,
            Self::Normal => 0.0,
            Self::Wet => 0.12,
            Self::Tropical => 0.25,
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "arid" | "dry" => Ok(Self::Arid),
            "normal" => Ok(Self::Normal),
            "wet" => Ok(Self::Wet),
            "tropical" => Ok(Self::Tropical),
            _ => Err(ConfigError::UnknownName { kind: "rainfall level", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for RainfallLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arid => write!(f, "arid"),
            Self::Normal => write!(f, "normal"),
            Self::Wet => write!(f, "wet"),
            Self::Tropical => write!(f, "tropical"),
        }
    }
}

/// Terrain roughness preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Roughness {
    Smooth,
    #[default]
    Normal,
    Rugged,
}

impl Roughness {
    pub fn all() -> &'static [Self] {
        &[Self::Smooth, Self::Normal, Self::Rugged]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Smooth => "Rolling lowlands, few mountains",
            Self::Normal => "Mixed plains, hills, and ranges",
            Self::Rugged => "Sharp ridges and frequent mountains",
        }
    }

    /// (ridge_weight, billow_weight, hill_threshold, mountain_threshold)
    fn terrain_values(&self) -> (f64, f64, f32, f32) {
        match self {
            Self::Smooth => (0.15, 0.25, 0.5, 0.82),
            Self::Normal => (0.35, 0.15, 0.45, 0.75),
            Self::Rugged => (0.55, 0.05, 0.4, 0.68),
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "smooth" | "flat" => Ok(Self::Smooth),
            "normal" => Ok(Self::Normal),
            "rugged" | "rough" => Ok(Self::Rugged),
            _ => Err(ConfigError::UnknownName { kind: "roughness", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Roughness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smooth => write!(f, "smooth"),
            Self::Normal => write!(f, "normal"),
            Self::Rugged => write!(f, "rugged"),
        }
    }
}

// =============================================================================
// PARAMETER GROUPS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinentParams {
    pub count: usize,
    pub min_width: usize,
    pub max_width: usize,
    pub min_height: usize,
    pub max_height: usize,
    /// Minimum hex-wrapped distance between continent centers
    pub min_distance: usize,
    /// Chance of accepting a too-close placement (joined landmasses)
    pub connection_chance: f64,
}

impl Default for ContinentParams {
    fn default() -> Self {
        let (count, (min_width, max_width, min_height, max_height, min_distance)) =
            MapSize::Standard.continent_defaults();
        Self {
            count,
            min_width,
            max_width,
            min_height,
            max_height,
            min_distance,
            connection_chance: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandParams {
    pub enabled: bool,
    pub count: usize,
    pub min_width: usize,
    pub max_width: usize,
    pub min_height: usize,
    pub max_height: usize,
    /// No land may lie within this many tiles of a new island's center
    pub min_distance_from_land: usize,
}

impl Default for IslandParams {
    fn default() -> Self {
        let (count, (min_width, max_width, min_height, max_height)) = MapSize::Standard.island_defaults();
        Self {
            enabled: true,
            count,
            min_width,
            max_width,
            min_height,
            max_height,
            min_distance_from_land: 3,
        }
    }
}

impl IslandParams {
    /// Stamp radius range derived from the width/height ranges.
    pub fn radius_range(&self) -> (usize, usize) {
        let min_radius = (self.min_width.min(self.min_height) / 2).max(1);
        let max_radius = (self.max_width.max(self.max_height) / 2).max(min_radius);
        (min_radius, max_radius)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastalIrregularityParams {
    pub bite_count: usize,
    pub bite_min_radius: usize,
    pub bite_max_radius: usize,
    pub spur_count: usize,
    pub spur_min_radius: usize,
    pub spur_max_radius: usize,
    /// Irregularity is skipped entirely below this many land tiles
    pub min_land_tiles: usize,
}

impl Default for CoastalIrregularityParams {
    fn default() -> Self {
        Self {
            bite_count: 6,
            bite_min_radius: 1,
            bite_max_radius: 3,
            spur_count: 4,
            spur_min_radius: 1,
            spur_max_radius: 2,
            min_land_tiles: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeParams {
    pub enabled: bool,
    pub count: usize,
    pub min_radius: usize,
    pub max_radius: usize,
    pub min_distance_from_coast: usize,
}

impl Default for LakeParams {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 3,
            min_radius: 1,
            max_radius: 2,
            min_distance_from_coast: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    pub enabled: bool,
    /// Used only when no lake provides river sources
    pub target_count: usize,
    /// Elevation removed from carved river tiles
    pub depth: f32,
    /// Informational per-continent bounds, reported but not enforced
    pub min_per_continent: usize,
    pub max_per_continent: usize,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            enabled: true,
            target_count: 4,
            depth: 0.05,
            min_per_continent: 0,
            max_per_continent: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    pub elevation_frequency: f64,
    pub ridged_frequency: f64,
    pub billow_frequency: f64,
    pub ridge_weight: f64,
    /// Billow octave is skipped when this is at or below 0.01
    pub billow_weight: f64,
    pub moisture_frequency: f64,
    pub temperature_frequency: f64,
    pub temperature_detail_multiplier: f64,
    pub temperature_detail_strength: f64,
    pub latitude_influence: f32,
    pub latitude_exponent: f32,
    pub temperature_bias: f32,
    pub moisture_bias: f32,
    pub smoothing_passes: usize,
    pub smoothing_strength: f32,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            elevation_frequency: 2.0,
            ridged_frequency: 4.0,
            billow_frequency: 6.0,
            ridge_weight: 0.35,
            billow_weight: 0.15,
            moisture_frequency: 3.0,
            temperature_frequency: 2.0,
            temperature_detail_multiplier: 3.0,
            temperature_detail_strength: 0.25,
            latitude_influence: 0.6,
            latitude_exponent: 1.0,
            temperature_bias: 0.0,
            moisture_bias: 0.0,
            smoothing_passes: 2,
            smoothing_strength: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationParams {
    pub base_land_elevation: f32,
    pub max_total_elevation: f32,
    pub ocean_elevation: f32,
    pub seas_elevation: f32,
    pub coast_elevation: f32,
    pub hill_threshold: f32,
    pub mountain_threshold: f32,
    pub hill_boost: f32,
    pub mountain_boost: f32,
    pub lake_elevation: f32,
    /// Render-elevation drop of a lake below its surrounding land
    pub lake_render_depth: f32,
    /// Render elevation assumed for lakes with no land neighbor
    pub lake_render_baseline: f32,
}

impl Default for ElevationParams {
    fn default() -> Self {
        Self {
            base_land_elevation: 0.15,
            max_total_elevation: 1.0,
            ocean_elevation: 0.0,
            seas_elevation: 0.02,
            coast_elevation: 0.05,
            hill_threshold: 0.45,
            mountain_threshold: 0.75,
            hill_boost: 0.05,
            mountain_boost: 0.1,
            lake_elevation: 0.1,
            lake_render_depth: 0.08,
            lake_render_baseline: 0.3,
        }
    }
}

// =============================================================================
// TOP-LEVEL PARAMETERS
// =============================================================================

/// Everything a generation run needs besides the classifier collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub seed: u64,
    /// Draw a fresh seed at generation time instead of using `seed`
    pub random_seed: bool,
    pub map_size: MapSize,
    pub width: usize,
    pub height: usize,
    pub world_type: WorldType,
    pub special_map_types: Vec<SpecialMapType>,
    pub continents: ContinentParams,
    pub islands: IslandParams,
    pub coast: CoastalIrregularityParams,
    pub lakes: LakeParams,
    pub rivers: RiverParams,
    pub climate: ClimateParams,
    pub elevation: ElevationParams,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::for_map_size(MapSize::Standard)
    }
}

impl GenerationParams {
    /// Defaults for a map size tier.
    pub fn for_map_size(map_size: MapSize) -> Self {
        let (width, height) = map_size.dimensions();
        let (count, (min_width, max_width, min_height, max_height, min_distance)) = map_size.continent_defaults();
        let (island_count, (i_min_w, i_max_w, i_min_h, i_max_h)) = map_size.island_defaults();

        Self {
            seed: 0,
            random_seed: false,
            map_size,
            width,
            height,
            world_type: WorldType::Earth,
            special_map_types: Vec::new(),
            continents: ContinentParams {
                count,
                min_width,
                max_width,
                min_height,
                max_height,
                min_distance,
                ..ContinentParams::default()
            },
            islands: IslandParams {
                count: island_count,
                min_width: i_min_w,
                max_width: i_max_w,
                min_height: i_min_h,
                max_height: i_max_h,
                ..IslandParams::default()
            },
            coast: CoastalIrregularityParams::default(),
            lakes: LakeParams::default(),
            rivers: RiverParams::default(),
            climate: ClimateParams::default(),
            elevation: ElevationParams::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.random_seed = false;
        self
    }

    pub fn with_temperature(mut self, preset: TemperaturePreset) -> Self {
        self.climate.temperature_bias = preset.temperature_bias();
        self
    }

    pub fn with_rainfall(mut self, level: RainfallLevel) -> Self {
        self.climate.moisture_bias = level.moisture_bias();
        self
    }

    pub fn with_roughness(mut self, roughness: Roughness) -> Self {
        let (ridge, billow, hill, mountain) = roughness.terrain_values();
        self.climate.ridge_weight = ridge;
        self.climate.billow_weight = billow;
        self.elevation.hill_threshold = hill;
        self.elevation.mountain_threshold = mountain;
        self
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let params: GenerationParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameter sets that cannot describe a valid run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions { width: self.width, height: self.height });
        }

        let c = &self.continents;
        check_range("continents.width", c.min_width as f64, c.max_width as f64)?;
        check_range("continents.height", c.min_height as f64, c.max_height as f64)?;
        check_unit("continents.connection_chance", c.connection_chance)?;

        let i = &self.islands;
        check_range("islands.width", i.min_width as f64, i.max_width as f64)?;
        check_range("islands.height", i.min_height as f64, i.max_height as f64)?;

        let k = &self.coast;
        check_range("coast.bite_radius", k.bite_min_radius as f64, k.bite_max_radius as f64)?;
        check_range("coast.spur_radius", k.spur_min_radius as f64, k.spur_max_radius as f64)?;

        check_range("lakes.radius", self.lakes.min_radius as f64, self.lakes.max_radius as f64)?;
        check_range(
            "rivers.per_continent",
            self.rivers.min_per_continent as f64,
            self.rivers.max_per_continent as f64,
        )?;
        if self.rivers.depth < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "rivers.depth",
                value: self.rivers.depth as f64,
                min: 0.0,
                max: f64::INFINITY,
            });
        }

        let cl = &self.climate;
        check_unit("climate.ridge_weight", cl.ridge_weight)?;
        check_unit("climate.billow_weight", cl.billow_weight)?;
        check_unit("climate.temperature_detail_strength", cl.temperature_detail_strength)?;
        check_unit("climate.smoothing_strength", cl.smoothing_strength as f64)?;
        for (name, freq) in [
            ("climate.elevation_frequency", cl.elevation_frequency),
            ("climate.ridged_frequency", cl.ridged_frequency),
            ("climate.billow_frequency", cl.billow_frequency),
            ("climate.moisture_frequency", cl.moisture_frequency),
            ("climate.temperature_frequency", cl.temperature_frequency),
            ("climate.temperature_detail_multiplier", cl.temperature_detail_multiplier),
        ] {
            if !(freq > 0.0) {
                return Err(ConfigError::OutOfRange { name, value: freq, min: 0.0, max: f64::INFINITY });
            }
        }

        let e = &self.elevation;
        if !(e.ocean_elevation < e.seas_elevation && e.seas_elevation < e.coast_elevation) {
            return Err(ConfigError::ElevationOrder {
                ocean: e.ocean_elevation,
                seas: e.seas_elevation,
                coast: e.coast_elevation,
            });
        }
        check_range(
            "elevation.base_land..max_total",
            e.base_land_elevation as f64,
            e.max_total_elevation as f64,
        )?;
        check_range(
            "elevation.hill..mountain_threshold",
            e.hill_threshold as f64,
            e.mountain_threshold as f64,
        )?;

        Ok(())
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { name, min, max });
    }
    Ok(())
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange { name, value, min: 0.0, max: 1.0 });
    }
    Ok(())
}
