//! Surface generation pipeline
//!
//! Stages run strictly in order: stamping, climate sampling and smoothing,
//! biome classification, coastline resolution, river routing, render
//! elevation. Every randomized stage draws from its own seeded RNG.

use serde::Serialize;

use crate::biomes::{classify_tiles, BiomeClassifier, DefaultBiomeClassifier};
use crate::climate::{sample_climate, SAMPLE_BATCH};
use crate::coastline::{resolve_coastline, CoastlineReport};
use crate::config::GenerationParams;
use crate::continents::{continent_membership, place_continents};
use crate::error::ConfigError;
use crate::grid::HexGrid;
use crate::landmask::{LandMask, StampReport};
use crate::noise_sampler::NoiseSampler;
use crate::render_elevation::{land_elevation_range, normalize_render_elevation};
use crate::rivers::{route_rivers, RiverReport};
use crate::seeds::WorldSeeds;
use crate::tile::{DefaultYieldTable, ElevationTier, Tile, YieldTable};
use crate::world::PlanetSurface;

// =============================================================================
// PROGRESS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GenerationStage {
    Continents,
    Islands,
    CoastalIrregularity,
    Lakes,
    Climate,
    Biomes,
    Coastline,
    Rivers,
    RenderElevation,
    Finalize,
    Complete,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Continents => "continents",
            Self::Islands => "islands",
            Self::CoastalIrregularity => "coastal irregularity",
            Self::Lakes => "lakes",
            Self::Climate => "climate",
            Self::Biomes => "biomes",
            Self::Coastline => "coastline",
            Self::Rivers => "rivers",
            Self::RenderElevation => "render elevation",
            Self::Finalize => "finalize",
            Self::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Progress event. `fraction` is progress within `stage`, in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationProgress {
    pub stage: GenerationStage,
    pub fraction: f32,
}

// =============================================================================
// REPORT
// =============================================================================

/// Requested versus achieved counts for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub continents_requested: usize,
    pub continents_joined: usize,
    pub continents_forced: usize,
    pub islands_requested: usize,
    pub lakes_requested: usize,
    pub stamps: StampReport,
    pub biome_corrections: usize,
    pub coastline: CoastlineReport,
    pub rivers: RiverReport,
}

impl GenerationReport {
    /// Human-readable list of unmet targets.
    pub fn shortfalls(&self) -> Vec<String> {
        let mut out = Vec::new();
        let islands = self.stamps.islands + self.stamps.islands_relaxed;
        if islands < self.islands_requested {
            out.push(format!("islands: {} of {}", islands, self.islands_requested));
        }
        let lakes = self.stamps.lakes + self.stamps.lakes_fallback;
        if lakes < self.lakes_requested {
            out.push(format!("lakes: {} of {}", lakes, self.lakes_requested));
        }
        if self.rivers.carved < self.rivers.target {
            out.push(format!("rivers: {} of {}", self.rivers.carved, self.rivers.target));
        }
        if self.continents_forced > 0 {
            out.push(format!("continents placed without spacing: {}", self.continents_forced));
        }
        out
    }

    pub fn log(&self) {
        log::info!(
            "Surface {}x{} seed {}: {} continents ({} joined), {} islands, {} bites, {} spurs, {} lakes, {} rivers",
            self.width,
            self.height,
            self.seed,
            self.continents_requested,
            self.continents_joined,
            self.stamps.islands + self.stamps.islands_relaxed,
            self.stamps.bites,
            self.stamps.spurs,
            self.stamps.lakes + self.stamps.lakes_fallback + usize::from(self.stamps.forced_lake),
            self.rivers.carved,
        );
        for s in self.shortfalls() {
            log::warn!("Shortfall: {}", s);
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Pipeline owner. Built once from validated parameters; each `generate`
/// call is an independent run.
pub struct SurfaceGenerator {
    params: GenerationParams,
    grid: HexGrid,
    classifier: Box<dyn BiomeClassifier>,
    yield_table: Box<dyn YieldTable>,
}

impl SurfaceGenerator {
    /// Validate `params` and build the grid.
    pub fn new(params: GenerationParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let grid = HexGrid::new(params.width, params.height)?;
        Ok(Self {
            params,
            grid,
            classifier: Box::new(DefaultBiomeClassifier),
            yield_table: Box::new(DefaultYieldTable),
        })
    }

    pub fn with_classifier(mut self, classifier: Box<dyn BiomeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_yield_table(mut self, yield_table: Box<dyn YieldTable>) -> Self {
        self.yield_table = yield_table;
        self
    }

    pub fn generate(&self) -> PlanetSurface {
        self.generate_with_progress(&mut |_| {})
    }

    /// Run the full pipeline. The last event is always `Complete` at 1.0.
    pub fn generate_with_progress(&self, progress: &mut dyn FnMut(GenerationProgress)) -> PlanetSurface {
        let mut params = self.params.clone();
        if params.random_seed {
            params.seed = rand::random();
            params.random_seed = false;
        }
        let seeds = WorldSeeds::from_master(params.seed);
        let grid = &self.grid;
        let (width, height) = (grid.width(), grid.height());

        log::info!("Generating {}x{} {} surface, seed {}", width, height, params.world_type, params.seed);
        log::debug!("{}", seeds);

        let mut emit = |stage: GenerationStage, fraction: f32| progress(GenerationProgress { stage, fraction });

        // Stamping
        emit(GenerationStage::Continents, 0.0);
        let placement = place_continents(grid, &params.continents, &mut WorldSeeds::rng(seeds.continents));
        let mut mask = LandMask::new(width, height);
        mask.stamp_continents(grid, &placement.stamps);

        emit(GenerationStage::Islands, 0.0);
        let mut stamps = StampReport::default();
        let (islands, relaxed) = mask.stamp_islands(grid, &params.islands, &mut WorldSeeds::rng(seeds.islands));
        stamps.islands = islands;
        stamps.islands_relaxed = relaxed;

        emit(GenerationStage::CoastalIrregularity, 0.0);
        let (bites, spurs) =
            mask.apply_coastal_irregularity(grid, &params.coast, &mut WorldSeeds::rng(seeds.coastline));
        stamps.bites = bites;
        stamps.spurs = spurs;

        emit(GenerationStage::Lakes, 0.0);
        mask.stamp_lakes(grid, &params.lakes, params.rivers.enabled, &mut WorldSeeds::rng(seeds.lakes), &mut stamps);

        // Climate
        emit(GenerationStage::Climate, 0.0);
        let sampler = NoiseSampler::new(seeds.climate);
        let fields = sample_climate(grid, &mask, &sampler, &params.climate, &params.elevation, &mut |f| {
            emit(GenerationStage::Climate, f)
        });

        let mut tiles: Vec<Tile> = (0..grid.tile_count())
            .map(|i| {
                let (x, y) = grid.coords(i);
                let mut t = Tile::new(i, x, y);
                t.is_land = mask.is_land(i);
                t.is_lake = mask.is_lake(i);
                t.elevation = *fields.elevation.at(i);
                t.temperature = *fields.temperature.at(i);
                t.moisture = *fields.moisture.at(i);
                t
            })
            .collect();

        // Biomes
        emit(GenerationStage::Biomes, 0.0);
        let corrections = classify_tiles(
            grid,
            &mut tiles,
            self.classifier.as_ref(),
            params.world_type,
            &params.special_map_types,
            &params.elevation,
        );
        let land_range = land_elevation_range(&tiles);

        emit(GenerationStage::Coastline, 0.0);
        let coastline = resolve_coastline(grid, &mut tiles, &params.elevation);

        emit(GenerationStage::Rivers, 0.0);
        let (rivers, river_report) = route_rivers(
            grid,
            &mut tiles,
            &placement.stamps,
            &mask.lakes,
            &params.rivers,
            &mut WorldSeeds::rng(seeds.rivers),
        );

        emit(GenerationStage::RenderElevation, 0.0);
        normalize_render_elevation(grid, &mut tiles, land_range, &params.elevation);

        emit(GenerationStage::Finalize, 0.0);
        let membership = continent_membership(grid, &placement.stamps);
        let total = tiles.len();
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.continent = membership[i];
            tile.elevation_tier = ElevationTier::from_elevation(tile.elevation, tile.is_hill, &params.elevation);
            tile.movement_cost = tile.biome.movement_cost() + u32::from(tile.is_hill);
            tile.yields = self.yield_table.yields(tile);
            if (i + 1) % SAMPLE_BATCH == 0 {
                emit(GenerationStage::Finalize, (i + 1) as f32 / total as f32);
            }
        }

        let report = GenerationReport {
            seed: params.seed,
            width,
            height,
            continents_requested: params.continents.count,
            continents_joined: placement.joined,
            continents_forced: placement.forced,
            islands_requested: if params.islands.enabled { params.islands.count } else { 0 },
            lakes_requested: if params.lakes.enabled { params.lakes.count } else { 0 },
            stamps,
            biome_corrections: corrections,
            coastline,
            rivers: river_report,
        };
        report.log();

        let surface = PlanetSurface::new(
            grid.clone(),
            tiles,
            placement.stamps,
            mask.lakes,
            rivers,
            land_range,
            report,
            seeds,
            params,
        );
        emit(GenerationStage::Complete, 1.0);
        surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::{Biome, BiomeQuery};
    use crate::config::MapSize;
    use crate::grid::hex_disk_size;

    fn small_params(seed: u64) -> GenerationParams {
        GenerationParams::for_map_size(MapSize::Duel).with_seed(seed)
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = small_params(1);
        params.height = 0;
        assert!(SurfaceGenerator::new(params).is_err());
    }

    #[test]
    fn test_progress_ends_with_complete() {
        let generator = SurfaceGenerator::new(small_params(3)).unwrap();
        let mut events = Vec::new();
        generator.generate_with_progress(&mut |p| events.push(p));

        let last = events.last().copied().unwrap();
        assert_eq!(last.stage, GenerationStage::Complete);
        assert_eq!(last.fraction, 1.0);
        assert!(events.iter().any(|e| e.stage == GenerationStage::Climate && e.fraction == 1.0));
        assert!(events.iter().all(|e| (0.0..=1.0).contains(&e.fraction)));
    }

    #[test]
    fn test_deterministic_runs() {
        let generator = SurfaceGenerator::new(small_params(77)).unwrap();
        let a = generator.generate();
        let b = generator.generate();
        assert_eq!(a.tiles(), b.tiles());
        assert_eq!(a.rivers, b.rivers);
    }

    #[test]
    fn test_random_seed_is_recorded() {
        let mut params = small_params(0);
        params.random_seed = true;
        let surface = SurfaceGenerator::new(params).unwrap().generate();
        assert!(!surface.params.random_seed);
        assert_eq!(surface.seeds.master, surface.params.seed);
        assert_eq!(surface.report.seed, surface.params.seed);
    }

    #[test]
    fn test_tile_invariants_hold() {
        for seed in [1, 2, 3] {
            let surface = SurfaceGenerator::new(small_params(seed)).unwrap().generate();
            let p = &surface.params.elevation;
            for t in surface.tiles() {
                if t.is_river {
                    assert!(t.is_land, "river tile {} is not land", t.index);
                }
                if t.is_lake {
                    assert_eq!(t.biome, Biome::Lake);
                }
                if t.biome == Biome::Coast {
                    assert!(t.is_land);
                    assert_eq!(t.elevation, p.coast_elevation);
                }
                match t.biome {
                    Biome::Ocean => assert_eq!(t.elevation, p.ocean_elevation),
                    Biome::Seas => assert_eq!(t.elevation, p.seas_elevation),
                    _ => {}
                }
                assert!((0.0..=1.0).contains(&t.temperature));
                assert!((0.0..=1.0).contains(&t.moisture));
                assert!(t.elevation <= p.max_total_elevation);
            }
        }
    }

    #[test]
    fn test_mountain_tier_matches_biome() {
        let mut params = small_params(12);
        params.elevation.max_total_elevation = 1.0;
        params.elevation.base_land_elevation = 0.15;
        params.elevation.mountain_threshold = 0.75;
        let surface = SurfaceGenerator::new(params).unwrap().generate();

        for t in surface.tiles().iter().filter(|t| t.is_land && t.elevation > 0.75) {
            assert_eq!(t.elevation_tier, ElevationTier::Mountain);
            assert!(
                matches!(t.biome, Biome::Mountain | Biome::Glacier | Biome::Arctic),
                "tile {} at {} is {}",
                t.index,
                t.elevation,
                t.biome
            );
        }
    }

    #[test]
    fn test_non_fallback_lakes_within_bounds() {
        let mut params = GenerationParams::for_map_size(MapSize::Standard).with_seed(5);
        params.lakes.count = 5;
        let surface = SurfaceGenerator::new(params).unwrap().generate();
        let (lo, hi) = (hex_disk_size(surface.params.lakes.min_radius), hex_disk_size(surface.params.lakes.max_radius));
        for lake in surface.lakes.iter().filter(|l| !l.fallback) {
            assert!(lake.tiles.len() >= lo && lake.tiles.len() <= hi);
        }
    }

    #[test]
    fn test_rivers_run_from_lakes_to_coast() {
        let surface = SurfaceGenerator::new(GenerationParams::default().with_seed(8)).unwrap().generate();
        let grid = surface.grid();
        for river in &surface.rivers {
            for pair in river.tiles.windows(2) {
                assert!(grid.neighbors(pair[0]).contains(&pair[1]));
            }
            assert_eq!(surface.tile(river.mouth()).biome, Biome::Coast);
            for &i in river.river_tiles() {
                let t = surface.tile(i);
                assert!(!matches!(t.biome, Biome::Ocean | Biome::Seas | Biome::Coast | Biome::Lake));
            }
            if let Some(l) = river.lake {
                assert!(grid.neighbors(river.source()).iter().any(|n| surface.lakes[l].tiles.contains(n)));
            }
        }
    }

    #[test]
    fn test_same_inputs_same_histogram_and_rivers() {
        let params = GenerationParams {
            width: 50,
            height: 50,
            ..GenerationParams::default().with_seed(2024)
        };
        let a = SurfaceGenerator::new(params.clone()).unwrap().generate();
        let b = SurfaceGenerator::new(params).unwrap().generate();
        assert_eq!(a.biome_counts(), b.biome_counts());
        assert_eq!(a.river_tile_indices(), b.river_tile_indices());
    }

    struct AlwaysDesert;

    impl BiomeClassifier for AlwaysDesert {
        fn classify(&self, query: &BiomeQuery) -> Biome {
            if query.is_lake {
                Biome::Lake
            } else if query.is_land {
                Biome::Desert
            } else {
                Biome::Ocean
            }
        }
    }

    #[test]
    fn test_custom_classifier_is_used() {
        let surface = SurfaceGenerator::new(small_params(4))
            .unwrap()
            .with_classifier(Box::new(AlwaysDesert))
            .generate();
        let counts = surface.biome_counts();
        assert!(counts.get(&Biome::Desert).copied().unwrap_or(0) > 0);
        assert!(!counts.contains_key(&Biome::Forest));
        assert!(!counts.contains_key(&Biome::Arctic));
    }
}
