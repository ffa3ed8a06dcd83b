//! Generated surface container
//!
//! Bundles the finalized tile collection with everything produced along the
//! way, plus a pristine snapshot that gameplay code can revert to.

use std::collections::{BTreeMap, BTreeSet};

use crate::biomes::Biome;
use crate::config::GenerationParams;
use crate::continents::ContinentStamp;
use crate::generator::GenerationReport;
use crate::grid::{HexGrid, HexLayout};
use crate::landmask::Lake;
use crate::render_elevation::normalize_render_elevation;
use crate::rivers::RiverPath;
use crate::seeds::WorldSeeds;
use crate::tile::Tile;

pub struct PlanetSurface {
    grid: HexGrid,
    tiles: Vec<Tile>,
    /// Snapshot taken when generation finished
    base: Vec<Tile>,
    pub continents: Vec<ContinentStamp>,
    pub lakes: Vec<Lake>,
    pub rivers: Vec<RiverPath>,
    /// (min, max) land elevation used for render normalization
    pub land_elevation_range: (f32, f32),
    pub report: GenerationReport,
    pub seeds: WorldSeeds,
    /// Parameters of the run, with the drawn seed when `random_seed` was set
    pub params: GenerationParams,
}

impl PlanetSurface {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        grid: HexGrid,
        tiles: Vec<Tile>,
        continents: Vec<ContinentStamp>,
        lakes: Vec<Lake>,
        rivers: Vec<RiverPath>,
        land_elevation_range: (f32, f32),
        report: GenerationReport,
        seeds: WorldSeeds,
        params: GenerationParams,
    ) -> Self {
        let base = tiles.clone();
        Self { grid, tiles, base, continents, lakes, rivers, land_elevation_range, report, seeds, params }
    }

    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Panics if `index` is out of range.
    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    /// `x` wraps; panics if `y` is outside the grid.
    pub fn tile_at(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[self.grid.index(x, y)]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Mutable access for gameplay systems. `base_tiles` is unaffected.
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn base_tiles(&self) -> &[Tile] {
        &self.base
    }

    /// Restore every tile to its generated state.
    pub fn revert_to_base(&mut self) {
        self.tiles.clone_from_slice(&self.base);
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.grid.neighbors(index)
    }

    pub fn elevation(&self, index: usize) -> f32 {
        self.tiles[index].elevation
    }

    pub fn render_elevation(&self, index: usize) -> f32 {
        self.tiles[index].render_elevation
    }

    /// Tile under a world-space position, if any.
    pub fn tile_at_position(&self, layout: &HexLayout, wx: f64, wy: f64) -> Option<&Tile> {
        layout.tile_at(&self.grid, wx, wy).map(|i| &self.tiles[i])
    }

    pub fn biome_counts(&self) -> BTreeMap<Biome, usize> {
        let mut counts = BTreeMap::new();
        for t in &self.tiles {
            *counts.entry(t.biome).or_insert(0) += 1;
        }
        counts
    }

    pub fn river_tile_indices(&self) -> BTreeSet<usize> {
        self.tiles.iter().filter(|t| t.is_river).map(|t| t.index).collect()
    }

    pub fn land_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_land).count()
    }

    /// Recompute render elevation after gameplay edits.
    pub fn renormalize(&mut self) {
        normalize_render_elevation(&self.grid, &mut self.tiles, self.land_elevation_range, &self.params.elevation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSize;
    use crate::generator::SurfaceGenerator;

    fn surface() -> PlanetSurface {
        SurfaceGenerator::new(GenerationParams::for_map_size(MapSize::Duel).with_seed(21)).unwrap().generate()
    }

    #[test]
    fn test_revert_restores_generated_tiles() {
        let mut s = surface();
        let land = s.tiles().iter().position(|t| t.is_land && !t.is_river).unwrap();
        s.tiles_mut()[land].biome = Biome::Desert;
        s.tiles_mut()[land].is_river = true;
        assert_ne!(s.tiles(), s.base_tiles());

        s.revert_to_base();
        assert_eq!(s.tiles(), s.base_tiles());
        assert!(!s.tile(land).is_river);
    }

    #[test]
    fn test_renormalize_is_stable() {
        let mut s = surface();
        let before: Vec<f32> = s.tiles().iter().map(|t| t.render_elevation).collect();
        s.renormalize();
        let after: Vec<f32> = s.tiles().iter().map(|t| t.render_elevation).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_queries_delegate_to_grid_and_tiles() {
        let s = surface();
        let i = s.grid().index(7, 9);
        assert_eq!(s.neighbors(i), s.grid().neighbors(i));
        assert_eq!(s.elevation(i), s.tile(i).elevation);
        assert_eq!(s.tile_at(7, 9).index, i);

        let layout = HexLayout { size: 10.0 };
        let (wx, wy) = layout.center(7, 9);
        assert_eq!(s.tile_at_position(&layout, wx, wy).map(|t| t.index), Some(i));
    }

    #[test]
    fn test_tile_at_wraps_columns() {
        let s = surface();
        assert_eq!(s.tile_at(s.width() + 3, 2).index, s.tile_at(3, 2).index);
    }

    #[test]
    #[should_panic]
    fn test_tile_at_rejects_row_past_the_pole() {
        let s = surface();
        s.tile_at(0, s.height());
    }

    #[test]
    fn test_biome_counts_cover_every_tile() {
        let s = surface();
        let total: usize = s.biome_counts().values().sum();
        assert_eq!(total, s.grid().tile_count());
        assert_eq!(s.river_tile_indices().len(), s.tiles().iter().filter(|t| t.is_river).count());
    }
}
