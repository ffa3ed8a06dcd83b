//! Land/water/lake mask built from stamps
//!
//! Stamping order matters, later stamps overwrite earlier state:
//! continents, islands, coastal bites and spurs, then lakes. Every stage
//! degrades to fewer stamps rather than failing; attempt caps bound runtime.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{CoastalIrregularityParams, IslandParams, LakeParams};
use crate::continents::ContinentStamp;
use crate::grid::{hex_disk_size, HexGrid, UNREACHED};
use crate::tilemap::Tilemap;

const ISLAND_ATTEMPTS_PER_TARGET: usize = 50;
const LAKE_ATTEMPTS_PER_TARGET: usize = 40;
const IRREGULARITY_TRIES: usize = 8;
/// A single bite may remove at most this share of the current land.
const MAX_BITE_FRACTION: f64 = 0.15;

/// A stamped lake.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Lake {
    pub center: usize,
    pub radius: usize,
    pub tiles: Vec<usize>,
    /// Placed by a relaxed pass (size bounds not enforced)
    pub fallback: bool,
}

#[derive(Clone, Debug)]
pub struct LandMask {
    pub land: Tilemap<bool>,
    pub lake: Tilemap<bool>,
    pub lakes: Vec<Lake>,
}

/// Counts from the stamping stages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StampReport {
    pub islands: usize,
    pub islands_relaxed: usize,
    pub bites: usize,
    pub spurs: usize,
    pub lakes: usize,
    pub lakes_fallback: usize,
    pub forced_lake: bool,
}

impl LandMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            land: Tilemap::new_with(width, height, false),
            lake: Tilemap::new_with(width, height, false),
            lakes: Vec::new(),
        }
    }

    pub fn is_land(&self, i: usize) -> bool {
        *self.land.at(i)
    }

    pub fn is_lake(&self, i: usize) -> bool {
        *self.lake.at(i)
    }

    pub fn land_count(&self) -> usize {
        self.land.count(|&v| v)
    }

    /// Land tile touching open water (not lake).
    pub fn is_coastal(&self, grid: &HexGrid, i: usize) -> bool {
        self.is_land(i) && grid.neighbors(i).iter().any(|&n| !self.is_land(n) && !self.is_lake(n))
    }

    fn coastal_tiles(&self, grid: &HexGrid) -> Vec<usize> {
        (0..grid.tile_count()).filter(|&i| self.is_coastal(grid, i)).collect()
    }

    fn land_neighbor_count(&self, grid: &HexGrid, i: usize) -> usize {
        grid.neighbors(i).iter().filter(|&&n| self.is_land(n)).count()
    }

    fn set_land(&mut self, i: usize, value: bool) {
        self.land.set_at(i, value);
    }

    // =========================================================================
    // CONTINENTS
    // =========================================================================

    /// Mark every tile inside a continent ellipse as land.
    pub fn stamp_continents(&mut self, grid: &HexGrid, stamps: &[ContinentStamp]) {
        for i in 0..grid.tile_count() {
            let (x, y) = grid.coords(i);
            if stamps.iter().any(|s| s.contains(x, y, grid)) {
                self.set_land(i, true);
            }
        }
        log::debug!("Continents stamped: {} land tiles", self.land_count());
    }

    // =========================================================================
    // ISLANDS
    // =========================================================================

    /// Stamp island disks on open water. Returns (constrained, relaxed) counts.
    pub fn stamp_islands(&mut self, grid: &HexGrid, params: &IslandParams, rng: &mut ChaCha8Rng) -> (usize, usize) {
        if !params.enabled || params.count == 0 {
            return (0, 0);
        }
        let (min_r, max_r) = params.radius_range();
        let attempts = ISLAND_ATTEMPTS_PER_TARGET * params.count;

        let constrained = self.island_pass(grid, params.count, attempts, Some(params.min_distance_from_land), (min_r, max_r), rng);
        let remaining = params.count - constrained;
        let relaxed = if remaining > 0 {
            self.island_pass(grid, remaining, attempts, None, (min_r, max_r), rng)
        } else {
            0
        };

        if constrained + relaxed < params.count {
            log::warn!("Placed {} of {} islands", constrained + relaxed, params.count);
        } else if relaxed > 0 {
            log::info!("{} islands placed without the land-distance constraint", relaxed);
        }
        (constrained, relaxed)
    }

    fn island_pass(
        &mut self,
        grid: &HexGrid,
        target: usize,
        attempts: usize,
        min_distance: Option<usize>,
        (min_r, max_r): (usize, usize),
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut placed = 0;
        for _ in 0..attempts {
            if placed >= target {
                break;
            }
            let center = rng.gen_range(0..grid.tile_count());
            if self.is_land(center) {
                continue;
            }
            if let Some(d) = min_distance {
                if d > 0 && grid.any_within(center, d, |i| self.is_land(i)) {
                    continue;
                }
            }
            let radius = rng.gen_range(min_r..=max_r);
            for i in grid.disk(center, radius) {
                self.set_land(i, true);
            }
            placed += 1;
        }
        placed
    }

    // =========================================================================
    // COASTAL IRREGULARITY
    // =========================================================================

    /// Carve bites out of the coast and add spurs to it. Skipped entirely
    /// below the minimum land count. Returns (bites, spurs).
    pub fn apply_coastal_irregularity(
        &mut self,
        grid: &HexGrid,
        params: &CoastalIrregularityParams,
        rng: &mut ChaCha8Rng,
    ) -> (usize, usize) {
        let land = self.land_count();
        if land < params.min_land_tiles {
            log::debug!("Coastal irregularity skipped: {} land tiles < {}", land, params.min_land_tiles);
            return (0, 0);
        }

        let mut bites = 0;
        for _ in 0..params.bite_count {
            for _ in 0..IRREGULARITY_TRIES {
                if self.try_bite(grid, params, rng) {
                    bites += 1;
                    break;
                }
            }
        }

        let mut spurs = 0;
        for _ in 0..params.spur_count {
            for _ in 0..IRREGULARITY_TRIES {
                if self.try_spur(grid, params, rng) {
                    spurs += 1;
                    break;
                }
            }
        }

        log::debug!("Coastal irregularity: {} bites, {} spurs", bites, spurs);
        (bites, spurs)
    }

    /// Walk inland toward the most landlocked neighbor, then carve a water disk.
    fn try_bite(&mut self, grid: &HexGrid, params: &CoastalIrregularityParams, rng: &mut ChaCha8Rng) -> bool {
        let coastal = self.coastal_tiles(grid);
        if coastal.is_empty() {
            return false;
        }
        let start = coastal[rng.gen_range(0..coastal.len())];
        let radius = rng.gen_range(params.bite_min_radius..=params.bite_max_radius);

        let mut center = start;
        for _ in 0..radius / 2 {
            let next = grid
                .neighbors(center)
                .iter()
                .copied()
                .filter(|&n| self.is_land(n))
                .max_by_key(|&n| (self.land_neighbor_count(grid, n), std::cmp::Reverse(n)));
            match next {
                Some(n) => center = n,
                None => break,
            }
        }

        let disk = grid.disk(center, radius);
        let removed = disk.iter().filter(|&&i| self.is_land(i)).count();
        let limit = self.land_count() as f64 * MAX_BITE_FRACTION;
        if removed == 0 || removed as f64 > limit {
            return false;
        }
        for i in disk {
            self.set_land(i, false);
        }
        true
    }

    /// Walk offshore toward the most water-surrounded neighbor, then add a
    /// land disk that must connect to existing land.
    fn try_spur(&mut self, grid: &HexGrid, params: &CoastalIrregularityParams, rng: &mut ChaCha8Rng) -> bool {
        let coastal = self.coastal_tiles(grid);
        if coastal.is_empty() {
            return false;
        }
        let start = coastal[rng.gen_range(0..coastal.len())];
        let radius = rng.gen_range(params.spur_min_radius..=params.spur_max_radius);

        let mut center = start;
        for _ in 0..radius / 3 {
            let next = grid
                .neighbors(center)
                .iter()
                .copied()
                .filter(|&n| !self.is_land(n) && !self.is_lake(n))
                .max_by_key(|&n| {
                    let water = grid.neighbors(n).len() - self.land_neighbor_count(grid, n);
                    (water, std::cmp::Reverse(n))
                });
            match next {
                Some(n) => center = n,
                None => break,
            }
        }

        let disk = grid.disk(center, radius);
        let added: Vec<usize> = disk.iter().copied().filter(|&i| !self.is_land(i) && !self.is_lake(i)).collect();
        if added.is_empty() {
            return false;
        }
        let touches_land = disk
            .iter()
            .any(|&i| self.is_land(i) || grid.neighbors(i).iter().any(|&n| self.is_land(n)));
        if !touches_land {
            return false;
        }
        for i in added {
            self.set_land(i, true);
        }
        true
    }

    // =========================================================================
    // LAKES
    // =========================================================================

    /// Stamp inland lakes. Lake tiles stop being land.
    pub fn stamp_lakes(
        &mut self,
        grid: &HexGrid,
        params: &LakeParams,
        rivers_enabled: bool,
        rng: &mut ChaCha8Rng,
        report: &mut StampReport,
    ) {
        if !params.enabled {
            return;
        }

        let coast = self.coastal_tiles(grid);
        let coast_dist = grid.bfs_distances(&coast, None, |i| self.is_land(i));
        let inland: Vec<bool> = (0..grid.tile_count())
            .map(|i| coast.is_empty() || (coast_dist[i] != UNREACHED && coast_dist[i] as usize >= params.min_distance_from_coast))
            .collect();

        let candidates: Vec<usize> = (0..grid.tile_count()).filter(|&i| self.is_land(i) && inland[i]).collect();

        let min_tiles = hex_disk_size(params.min_radius);
        let max_tiles = hex_disk_size(params.max_radius);

        if !candidates.is_empty() {
            for _ in 0..LAKE_ATTEMPTS_PER_TARGET * params.count {
                if report.lakes >= params.count {
                    break;
                }
                let center = candidates[rng.gen_range(0..candidates.len())];
                let radius = rng.gen_range(params.min_radius..=params.max_radius);
                let disk = grid.disk(center, radius);

                if disk.iter().any(|&i| !self.is_land(i) || self.is_lake(i)) {
                    continue;
                }
                if disk.iter().any(|&i| grid.neighbors(i).iter().any(|&n| self.is_lake(n))) {
                    continue;
                }
                if disk.len() < min_tiles || disk.len() > max_tiles {
                    continue;
                }
                self.fill_lake(center, radius, disk, false);
                report.lakes += 1;
            }
        }

        let remaining = params.count.saturating_sub(report.lakes);
        if remaining > 0 {
            report.lakes_fallback = self.fallback_lakes(grid, params, &inland, remaining, rng);
            if report.lakes_fallback < remaining {
                log::warn!("Placed {} of {} lakes", report.lakes + report.lakes_fallback, params.count);
            }
        }

        if rivers_enabled && self.lakes.is_empty() {
            report.forced_lake = self.force_lake(grid);
        }
    }

    /// Relaxed pass: disk clipped to eligible tiles, no upper size bound.
    /// Every lake tile still keeps the minimum distance from the coast.
    fn fallback_lakes(
        &mut self,
        grid: &HexGrid,
        params: &LakeParams,
        inland: &[bool],
        target: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut placed = 0;
        for _ in 0..LAKE_ATTEMPTS_PER_TARGET * target {
            if placed >= target {
                break;
            }
            let candidates: Vec<usize> =
                (0..grid.tile_count()).filter(|&i| inland[i] && self.lake_eligible(grid, i)).collect();
            if candidates.is_empty() {
                break;
            }
            let center = candidates[rng.gen_range(0..candidates.len())];
            let radius = rng.gen_range(params.min_radius..=params.max_radius);

            let dist = grid.bfs_distances(&[center], Some(radius), |i| inland[i] && self.lake_eligible(grid, i));
            let tiles: Vec<usize> = (0..grid.tile_count()).filter(|&i| dist[i] != UNREACHED).collect();
            if tiles.is_empty() {
                continue;
            }
            self.fill_lake(center, radius, tiles, true);
            placed += 1;
        }
        placed
    }

    fn lake_eligible(&self, grid: &HexGrid, i: usize) -> bool {
        self.is_land(i)
            && !self.is_coastal(grid, i)
            && !grid.neighbors(i).iter().any(|&n| self.is_lake(n))
    }

    /// Single-tile lake on the land tile farthest from the coast.
    fn force_lake(&mut self, grid: &HexGrid) -> bool {
        let coast = self.coastal_tiles(grid);
        let dist = grid.bfs_distances(&coast, None, |i| self.is_land(i));
        let best = (0..grid.tile_count())
            .filter(|&i| self.is_land(i))
            .max_by_key(|&i| (dist[i], std::cmp::Reverse(i)));

        match best {
            Some(center) => {
                log::info!("No lakes stamped; forcing a single-tile lake at tile {} as a river source", center);
                self.fill_lake(center, 0, vec![center], true);
                true
            }
            None => {
                log::warn!("No land available for a forced lake");
                false
            }
        }
    }

    fn fill_lake(&mut self, center: usize, radius: usize, mut tiles: Vec<usize>, fallback: bool) {
        tiles.sort_unstable();
        for &i in &tiles {
            self.land.set_at(i, false);
            self.lake.set_at(i, true);
        }
        log::debug!("Lake at tile {} radius {}: {} tiles{}", center, radius, tiles.len(), if fallback { " (fallback)" } else { "" });
        self.lakes.push(Lake { center, radius, tiles, fallback });
    }
}
