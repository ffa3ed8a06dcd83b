//! Biome types and classification
//!
//! Classification is a pure lookup behind the [`BiomeClassifier`] trait. The
//! pipeline calls it once per tile with smoothed climate values, then applies
//! the elevation-tier override itself (see [`apply_elevation_tier`]).

use serde::{Deserialize, Serialize};

use crate::config::ElevationParams;
use crate::error::ConfigError;
use crate::grid::HexGrid;
use crate::tile::{ElevationTier, Tile};

// =============================================================================
// BIOMES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    // Water
    Ocean,
    Seas,
    Coast,
    Lake,
    River,

    // Relief
    Mountain,
    Glacier,
    Arctic,

    // Earth land
    Tundra,
    Taiga,
    Steppe,
    Plains,
    Grassland,
    Forest,
    Marsh,
    Savanna,
    Jungle,
    Swamp,
    Desert,

    // Special map types
    AshWaste,
    MagmaField,
    Blightland,
    Brimstone,

    // Other bodies
    RedDesert,
    Regolith,
    Crater,
    VolcanicPlain,
    SulfurFlats,
    IceShelf,
    HydrocarbonDunes,
}

impl Biome {
    pub fn all() -> &'static [Biome] {
        use Biome::*;
        &[
            Ocean, Seas, Coast, Lake, River, Mountain, Glacier, Arctic, Tundra, Taiga, Steppe, Plains,
            Grassland, Forest, Marsh, Savanna, Jungle, Swamp, Desert, AshWaste, MagmaField, Blightland,
            Brimstone, RedDesert, Regolith, Crater, VolcanicPlain, SulfurFlats, IceShelf, HydrocarbonDunes,
        ]
    }

    /// Water-category biomes. Coast and River still sit on land tiles, but
    /// never receive hill flags.
    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::Seas | Biome::Coast | Biome::Lake | Biome::River)
    }

    /// Biomes that the coastline pass must never rewrite.
    pub fn is_coast_protected(&self) -> bool {
        matches!(self, Biome::Arctic | Biome::Glacier | Biome::Mountain)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Biome::Ocean => "Ocean",
            Biome::Seas => "Seas",
            Biome::Coast => "Coast",
            Biome::Lake => "Lake",
            Biome::River => "River",
            Biome::Mountain => "Mountain",
            Biome::Glacier => "Glacier",
            Biome::Arctic => "Arctic",
            Biome::Tundra => "Tundra",
            Biome::Taiga => "Taiga",
            Biome::Steppe => "Steppe",
            Biome::Plains => "Plains",
            Biome::Grassland => "Grassland",
            Biome::Forest => "Forest",
            Biome::Marsh => "Marsh",
            Biome::Savanna => "Savanna",
            Biome::Jungle => "Jungle",
            Biome::Swamp => "Swamp",
            Biome::Desert => "Desert",
            Biome::AshWaste => "Ash Waste",
            Biome::MagmaField => "Magma Field",
            Biome::Blightland => "Blightland",
            Biome::Brimstone => "Brimstone",
            Biome::RedDesert => "Red Desert",
            Biome::Regolith => "Regolith",
            Biome::Crater => "Crater",
            Biome::VolcanicPlain => "Volcanic Plain",
            Biome::SulfurFlats => "Sulfur Flats",
            Biome::IceShelf => "Ice Shelf",
            Biome::HydrocarbonDunes => "Hydrocarbon Dunes",
        }
    }

    /// RGB color for map previews
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Biome::Ocean => (30, 60, 120),
            Biome::Seas => (50, 90, 150),
            Biome::Coast => (200, 190, 140),
            Biome::Lake => (70, 130, 190),
            Biome::River => (60, 120, 200),

            Biome::Mountain => (120, 110, 100),
            Biome::Glacier => (225, 235, 245),
            Biome::Arctic => (240, 250, 255),

            Biome::Tundra => (180, 190, 170),
            Biome::Taiga => (50, 80, 50),
            Biome::Steppe => (190, 180, 120),
            Biome::Plains => (160, 180, 90),
            Biome::Grassland => (130, 170, 80),
            Biome::Forest => (40, 110, 50),
            Biome::Marsh => (80, 110, 90),
            Biome::Savanna => (170, 160, 80),
            Biome::Jungle => (20, 90, 30),
            Biome::Swamp => (60, 80, 50),
            Biome::Desert => (220, 200, 140),

            Biome::AshWaste => (90, 85, 80),
            Biome::MagmaField => (180, 50, 20),
            Biome::Blightland => (90, 60, 90),
            Biome::Brimstone => (150, 120, 30),

            Biome::RedDesert => (180, 90, 50),
            Biome::Regolith => (150, 150, 145),
            Biome::Crater => (100, 100, 95),
            Biome::VolcanicPlain => (110, 70, 50),
            Biome::SulfurFlats => (210, 200, 70),
            Biome::IceShelf => (200, 220, 235),
            Biome::HydrocarbonDunes => (120, 90, 50),
        }
    }

    /// Base movement cost (hills add one on top).
    pub fn movement_cost(&self) -> u32 {
        match self {
            Biome::Mountain | Biome::Glacier => 3,
            Biome::Taiga
            | Biome::Forest
            | Biome::Marsh
            | Biome::Jungle
            | Biome::Swamp
            | Biome::Arctic
            | Biome::River
            | Biome::MagmaField
            | Biome::Brimstone
            | Biome::Crater
            | Biome::HydrocarbonDunes => 2,
            _ => 1,
        }
    }

    /// Whether this biome can occur on the given body.
    pub fn allowed_on(&self, world: WorldType) -> bool {
        use WorldType::*;
        match self {
            Biome::Ocean | Biome::Seas | Biome::Coast | Biome::Lake | Biome::River => true,
            Biome::Mountain | Biome::Glacier => true,
            Biome::Arctic => matches!(world, Earth | Mars | Europa),
            Biome::Tundra
            | Biome::Taiga
            | Biome::Steppe
            | Biome::Plains
            | Biome::Grassland
            | Biome::Forest
            | Biome::Marsh
            | Biome::Savanna
            | Biome::Jungle
            | Biome::Swamp
            | Biome::Desert
            | Biome::AshWaste
            | Biome::Blightland
            | Biome::Brimstone => world == Earth,
            Biome::MagmaField => matches!(world, Earth | Venus),
            Biome::RedDesert => world == Mars,
            Biome::Crater => matches!(world, Mars | Moon | Mercury),
            Biome::Regolith => matches!(world, Moon | Mercury),
            Biome::VolcanicPlain | Biome::SulfurFlats => world == Venus,
            Biome::IceShelf => matches!(world, Europa | Titan),
            Biome::HydrocarbonDunes => world == Titan,
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// =============================================================================
// WORLD AND SPECIAL MAP TYPES
// =============================================================================

/// Planetary body being generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldType {
    #[default]
    Earth,
    Mars,
    Venus,
    Mercury,
    Moon,
    Europa,
    Titan,
}

impl WorldType {
    pub fn all() -> &'static [Self] {
        &[Self::Earth, Self::Mars, Self::Venus, Self::Mercury, Self::Moon, Self::Europa, Self::Titan]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Earth => "Temperate living world",
            Self::Mars => "Cold red desert with polar caps",
            Self::Venus => "Volcanic hothouse",
            Self::Mercury => "Airless cratered rock",
            Self::Moon => "Airless grey regolith",
            Self::Europa => "Frozen ocean moon",
            Self::Titan => "Hydrocarbon dunes and ice",
        }
    }

    /// Fallback land biome for this body.
    pub fn barren_default(&self) -> Biome {
        match self {
            Self::Earth => Biome::Plains,
            Self::Mars => Biome::RedDesert,
            Self::Venus => Biome::VolcanicPlain,
            Self::Mercury | Self::Moon => Biome::Regolith,
            Self::Europa => Biome::IceShelf,
            Self::Titan => Biome::HydrocarbonDunes,
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "earth" => Ok(Self::Earth),
            "mars" => Ok(Self::Mars),
            "venus" => Ok(Self::Venus),
            "mercury" => Ok(Self::Mercury),
            "moon" | "luna" => Ok(Self::Moon),
            "europa" => Ok(Self::Europa),
            "titan" => Ok(Self::Titan),
            _ => Err(ConfigError::UnknownName { kind: "world type", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for WorldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Earth => write!(f, "earth"),
            Self::Mars => write!(f, "mars"),
            Self::Venus => write!(f, "venus"),
            Self::Mercury => write!(f, "mercury"),
            Self::Moon => write!(f, "moon"),
            Self::Europa => write!(f, "europa"),
            Self::Titan => write!(f, "titan"),
        }
    }
}

/// Map-wide classification overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMapType {
    Infernal,
    Demonic,
    IceWorld,
    Monsoon,
}

impl SpecialMapType {
    /// Parse a comma-separated list such as `"infernal,monsoon"`.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ConfigError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl std::str::FromStr for SpecialMapType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "infernal" => Ok(Self::Infernal),
            "demonic" => Ok(Self::Demonic),
            "ice_world" | "iceworld" => Ok(Self::IceWorld),
            "monsoon" => Ok(Self::Monsoon),
            _ => Err(ConfigError::UnknownName { kind: "special map type", value: s.to_string() }),
        }
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Inputs to a single classification call.
#[derive(Clone, Copy, Debug)]
pub struct BiomeQuery<'a> {
    pub is_land: bool,
    pub is_lake: bool,
    pub temperature: f32,
    pub moisture: f32,
    pub elevation_tier: ElevationTier,
    pub world_type: WorldType,
    pub special: &'a [SpecialMapType],
    /// Row position in [0, 1], 0 at the north pole
    pub hemisphere_position: f32,
}

impl BiomeQuery<'_> {
    fn has(&self, special: SpecialMapType) -> bool {
        self.special.contains(&special)
    }
}

/// Pure mapping from climate inputs to a biome. Implementations must not
/// carry hidden state: equal queries give equal answers.
pub trait BiomeClassifier: Send + Sync {
    fn classify(&self, query: &BiomeQuery) -> Biome;
}

/// Temperature/moisture matrix with world-type and special-map overrides.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBiomeClassifier;

/// Polar band (by hemisphere position) where cold water freezes over.
const POLAR_BAND: f32 = 0.05;

impl BiomeClassifier for DefaultBiomeClassifier {
    fn classify(&self, q: &BiomeQuery) -> Biome {
        if q.is_lake {
            return Biome::Lake;
        }
        if !q.is_land {
            return classify_water(q);
        }
        if q.world_type != WorldType::Earth {
            return classify_offworld(q);
        }

        let t = q.temperature;
        let m = q.moisture;

        if q.has(SpecialMapType::Infernal) {
            return if t > 0.5 { Biome::MagmaField } else { Biome::AshWaste };
        }
        if q.has(SpecialMapType::Demonic) {
            return if m < 0.5 { Biome::Blightland } else { Biome::Brimstone };
        }
        if q.has(SpecialMapType::IceWorld) {
            return match t {
                t if t < 0.25 => Biome::Arctic,
                t if t < 0.5 => {
                    if q.elevation_tier == ElevationTier::Mountain { Biome::Glacier } else { Biome::Arctic }
                }
                _ => Biome::Tundra,
            };
        }

        classify_earth_land(q, t, m)
    }
}

fn classify_water(q: &BiomeQuery) -> Biome {
    let polar = q.hemisphere_position < POLAR_BAND || q.hemisphere_position > 1.0 - POLAR_BAND;
    if q.world_type == WorldType::Earth && q.has(SpecialMapType::IceWorld) && q.temperature < 0.6 {
        return Biome::Arctic;
    }
    if polar && q.temperature < 0.15 && Biome::Arctic.allowed_on(q.world_type) {
        return Biome::Arctic;
    }
    Biome::Ocean
}

fn classify_earth_land(q: &BiomeQuery, t: f32, m: f32) -> Biome {
    let mountain = q.elevation_tier == ElevationTier::Mountain;
    match t {
        t if t < 0.10 => Biome::Arctic,
        t if t < 0.22 => {
            if mountain && m > 0.6 { Biome::Glacier } else { Biome::Tundra }
        }
        t if t < 0.38 => {
            if m < 0.3 { Biome::Steppe } else { Biome::Taiga }
        }
        t if t < 0.65 => {
            if m < 0.2 { Biome::Steppe }
            else if m < 0.4 { Biome::Plains }
            else if m < 0.6 { Biome::Grassland }
            else if m < 0.82 { Biome::Forest }
            else { Biome::Marsh }
        }
        _ => {
            // Monsoon climates push the hot band wetter
            let m = if q.has(SpecialMapType::Monsoon) { (m + 0.2).min(1.0) } else { m };
            if m < 0.25 { Biome::Desert }
            else if m < 0.45 { Biome::Savanna }
            else if m < 0.75 { Biome::Jungle }
            else { Biome::Swamp }
        }
    }
}

fn classify_offworld(q: &BiomeQuery) -> Biome {
    let t = q.temperature;
    let m = q.moisture;
    let polar = q.hemisphere_position < 0.1 || q.hemisphere_position > 0.9;
    match q.world_type {
        WorldType::Mars => {
            if polar { Biome::Glacier }
            else if m > 0.7 { Biome::Crater }
            else { Biome::RedDesert }
        }
        WorldType::Moon | WorldType::Mercury => {
            if m > 0.65 { Biome::Crater } else { Biome::Regolith }
        }
        WorldType::Venus => {
            if t > 0.85 { Biome::MagmaField }
            else if m > 0.5 { Biome::SulfurFlats }
            else { Biome::VolcanicPlain }
        }
        WorldType::Europa => Biome::IceShelf,
        WorldType::Titan => {
            if m < 0.5 { Biome::HydrocarbonDunes } else { Biome::IceShelf }
        }
        WorldType::Earth => Biome::Plains,
    }
}

// =============================================================================
// VALIDATION AND TIER OVERRIDE
// =============================================================================

/// Outcome of checking a biome against the world type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiomeCorrection {
    Valid(Biome),
    Corrected { from: Biome, to: Biome },
}

impl BiomeCorrection {
    pub fn biome(&self) -> Biome {
        match *self {
            BiomeCorrection::Valid(b) => b,
            BiomeCorrection::Corrected { to, .. } => to,
        }
    }
}

/// Downgrade a biome that cannot exist on `world` to the body's default.
pub fn validate_biome(biome: Biome, world: WorldType) -> BiomeCorrection {
    if biome.allowed_on(world) {
        BiomeCorrection::Valid(biome)
    } else {
        BiomeCorrection::Corrected { from: biome, to: world.barren_default() }
    }
}

/// Result of the caller-side elevation-tier override on a land tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierOverride {
    pub biome: Biome,
    pub elevation: f32,
    pub is_hill: bool,
}

/// Mountain/hill override applied after classification.
///
/// Above the mountain threshold the biome becomes Mountain (Glacier and Arctic
/// keep theirs) and gains the mountain boost. Above the hill threshold a
/// non-water tile becomes a hill; its boost never lifts it past the mountain
/// threshold. Elevation is clamped to the configured maximum.
pub fn apply_elevation_tier(biome: Biome, elevation: f32, params: &ElevationParams) -> TierOverride {
    let max = params.max_total_elevation;
    if elevation > params.mountain_threshold {
        let biome = if matches!(biome, Biome::Glacier | Biome::Arctic) { biome } else { Biome::Mountain };
        TierOverride { biome, elevation: (elevation + params.mountain_boost).min(max), is_hill: false }
    } else if elevation > params.hill_threshold && !biome.is_water() {
        let boosted = (elevation + params.hill_boost).min(params.mountain_threshold).min(max);
        TierOverride { biome, elevation: boosted, is_hill: true }
    } else {
        TierOverride { biome, elevation: elevation.min(max), is_hill: false }
    }
}

/// Classification pass over every tile. Returns the number of validator
/// corrections.
pub fn classify_tiles(
    grid: &HexGrid,
    tiles: &mut [Tile],
    classifier: &dyn BiomeClassifier,
    world_type: WorldType,
    special: &[SpecialMapType],
    params: &ElevationParams,
) -> usize {
    let mut corrections = 0;

    for tile in tiles.iter_mut() {
        let query = BiomeQuery {
            is_land: tile.is_land,
            is_lake: tile.is_lake,
            temperature: tile.temperature,
            moisture: tile.moisture,
            elevation_tier: ElevationTier::from_elevation(tile.elevation, false, params),
            world_type,
            special,
            hemisphere_position: grid.normalized_y(tile.y) as f32,
        };

        let biome = match validate_biome(classifier.classify(&query), world_type) {
            BiomeCorrection::Valid(b) => b,
            BiomeCorrection::Corrected { from, to } => {
                log::debug!("Tile {}: {} is not valid on {}, using {}", tile.index, from, world_type, to);
                corrections += 1;
                to
            }
        };
        tile.biome = biome;
        if tile.is_lake && biome != Biome::Lake {
            log::debug!("Tile {}: lake classified as {}, keeping Lake", tile.index, biome);
            tile.biome = Biome::Lake;
        }

        if tile.is_land {
            let o = apply_elevation_tier(biome, tile.elevation, params);
            tile.biome = o.biome;
            tile.elevation = o.elevation;
            tile.is_hill = o.is_hill;
        }
    }

    if corrections > 0 {
        log::info!("Biome validator corrected {} tiles for {}", corrections, world_type);
    }
    corrections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land_query(t: f32, m: f32) -> BiomeQuery<'static> {
        BiomeQuery {
            is_land: true,
            is_lake: false,
            temperature: t,
            moisture: m,
            elevation_tier: ElevationTier::Flat,
            world_type: WorldType::Earth,
            special: &[],
            hemisphere_position: 0.5,
        }
    }

    #[test]
    fn test_earth_matrix() {
        let c = DefaultBiomeClassifier;
        assert_eq!(c.classify(&land_query(0.05, 0.5)), Biome::Arctic);
        assert_eq!(c.classify(&land_query(0.15, 0.5)), Biome::Tundra);
        assert_eq!(c.classify(&land_query(0.3, 0.5)), Biome::Taiga);
        assert_eq!(c.classify(&land_query(0.5, 0.5)), Biome::Grassland);
        assert_eq!(c.classify(&land_query(0.5, 0.9)), Biome::Marsh);
        assert_eq!(c.classify(&land_query(0.8, 0.1)), Biome::Desert);
        assert_eq!(c.classify(&land_query(0.8, 0.6)), Biome::Jungle);
    }

    #[test]
    fn test_lake_and_water() {
        let c = DefaultBiomeClassifier;
        let mut q = land_query(0.5, 0.5);
        q.is_lake = true;
        q.is_land = false;
        assert_eq!(c.classify(&q), Biome::Lake);

        q.is_lake = false;
        assert_eq!(c.classify(&q), Biome::Ocean);

        q.temperature = 0.05;
        q.hemisphere_position = 0.01;
        assert_eq!(c.classify(&q), Biome::Arctic);
    }

    #[test]
    fn test_monsoon_shifts_hot_band() {
        let c = DefaultBiomeClassifier;
        let monsoon = [SpecialMapType::Monsoon];
        let mut q = land_query(0.8, 0.2);
        assert_eq!(c.classify(&q), Biome::Desert);
        q.special = &monsoon;
        assert_eq!(c.classify(&q), Biome::Savanna);
    }

    #[test]
    fn test_offworld_biomes_are_valid_for_their_world() {
        let c = DefaultBiomeClassifier;
        for &world in WorldType::all() {
            for t in [0.0, 0.3, 0.6, 0.9] {
                for m in [0.0, 0.4, 0.8] {
                    for pos in [0.02, 0.5] {
                        let mut q = land_query(t, m);
                        q.world_type = world;
                        q.hemisphere_position = pos;
                        let b = c.classify(&q);
                        assert!(b.allowed_on(world), "{} classified {} which is invalid", world, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_validator_downgrades() {
        assert_eq!(validate_biome(Biome::Jungle, WorldType::Mars).biome(), Biome::RedDesert);
        assert_eq!(validate_biome(Biome::Regolith, WorldType::Earth).biome(), Biome::Plains);
        assert_eq!(validate_biome(Biome::Ocean, WorldType::Moon), BiomeCorrection::Valid(Biome::Ocean));
    }

    #[test]
    fn test_special_type_parsing() {
        let list = SpecialMapType::parse_list("infernal, Ice-World,monsoon").unwrap();
        assert_eq!(list, vec![SpecialMapType::Infernal, SpecialMapType::IceWorld, SpecialMapType::Monsoon]);
        assert!(SpecialMapType::parse_list("volcano").is_err());
        assert!(SpecialMapType::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_tier_override() {
        let params = ElevationParams::default();

        let m = apply_elevation_tier(Biome::Forest, 0.8, &params);
        assert_eq!(m.biome, Biome::Mountain);
        assert!((m.elevation - 0.9).abs() < 1e-6);

        let g = apply_elevation_tier(Biome::Glacier, 0.95, &params);
        assert_eq!(g.biome, Biome::Glacier);
        assert_eq!(g.elevation, params.max_total_elevation);

        let h = apply_elevation_tier(Biome::Plains, 0.74, &params);
        assert!(h.is_hill);
        assert_eq!(h.biome, Biome::Plains);
        assert!(h.elevation <= params.mountain_threshold);

        let flat = apply_elevation_tier(Biome::Plains, 0.3, &params);
        assert!(!flat.is_hill);
        assert_eq!(flat.elevation, 0.3);
    }
}
