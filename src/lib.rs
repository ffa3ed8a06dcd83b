//! Hex planet surface generation library
//!
//! Builds a horizontally wrapping hex map of continents, islands, lakes,
//! climate, biomes, coastlines and rivers from a seed and a parameter set.
//! [`generator::SurfaceGenerator`] is the entry point.

pub mod ascii;
pub mod biomes;
pub mod climate;
pub mod coastline;
pub mod config;
pub mod continents;
pub mod error;
pub mod export;
pub mod generator;
pub mod grid;
pub mod landmask;
pub mod noise_sampler;
pub mod render_elevation;
pub mod rivers;
pub mod seeds;
pub mod tile;
pub mod tilemap;
pub mod world;

pub use biomes::{Biome, BiomeClassifier, WorldType};
pub use config::GenerationParams;
pub use error::{ConfigError, ExportError};
pub use generator::{GenerationProgress, GenerationReport, GenerationStage, SurfaceGenerator};
pub use grid::HexGrid;
pub use tile::{Tile, YieldTable};
pub use world::PlanetSurface;
