//! River routing from lake outlets to the coast
//!
//! Each attempt runs pick source, check coast reachability, pick target, A*
//! path search, then accepts or moves on. Sources come from the land ring
//! around each lake (one river per lake); maps without lakes draw from an
//! inland pool instead. Routing failures are never fatal: the router gives up
//! on a source after its candidates run out and stops at a global attempt
//! ceiling.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::biomes::Biome;
use crate::config::RiverParams;
use crate::continents::{continent_membership, ContinentStamp};
use crate::grid::{HexGrid, UNREACHED};
use crate::landmask::Lake;
use crate::tile::Tile;

/// Hard cap on routing attempts per run.
const MAX_ATTEMPTS: usize = 2000;
/// Sources tried per lake before the lake is given up.
const SOURCES_PER_LAKE: usize = 6;
/// Share of the nearest coastal targets discarded.
const NEAREST_TARGET_DROP: f64 = 0.3;
const TARGET_DISTANCE_EXPONENT: f64 = 1.5;
const UPHILL_FACTOR: f32 = 6.0;
const MAX_UPHILL_PENALTY: f32 = 5.0;
const PATH_JITTER: f64 = 0.1;
/// Shortest acceptable river: source, one interior tile, coast.
const MIN_PATH_TILES: usize = 3;

const NO_COMPONENT: usize = usize::MAX;

// =============================================================================
// OUTPUT
// =============================================================================

/// A carved river. `tiles` runs from the source to the coastal terminal;
/// every tile but the last is River.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiverPath {
    /// Index into the lake list, `None` for inland-pool sources
    pub lake: Option<usize>,
    pub tiles: Vec<usize>,
}

impl RiverPath {
    pub fn source(&self) -> usize {
        self.tiles[0]
    }

    pub fn mouth(&self) -> usize {
        self.tiles[self.tiles.len() - 1]
    }

    /// Tiles marked as River (all but the coastal terminal).
    pub fn river_tiles(&self) -> &[usize] {
        &self.tiles[..self.tiles.len() - 1]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RiverReport {
    pub target: usize,
    pub carved: usize,
    pub attempts: usize,
    /// Lakes given up because a source could not reach the coast
    pub abandoned_lakes: usize,
    /// Accepted rivers per continent stamp
    pub per_continent: Vec<usize>,
    /// Accepted rivers whose source lies outside every continent
    pub outside_continents: usize,
}

// =============================================================================
// PATH SEARCH
// =============================================================================

#[derive(Clone, Copy)]
struct OpenNode {
    f: f64,
    g: f64,
    tile: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f, then lower tile index first
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tile.cmp(&self.tile))
    }
}

/// Tiles a river may flow through (the goal is always allowed). Mountains
/// and ice are impassable.
fn is_river_passable(tile: &Tile) -> bool {
    tile.is_land
        && !tile.is_lake
        && !matches!(tile.biome, Biome::Coast | Biome::Mountain | Biome::Glacier | Biome::Arctic)
}

/// Weighted A* from `start` to `goal`. Edge cost is one step plus an uphill
/// penalty plus a small jitter; the heuristic is hex-wrapped distance.
fn find_path(grid: &HexGrid, tiles: &[Tile], start: usize, goal: usize, rng: &mut ChaCha8Rng) -> Option<Vec<usize>> {
    let n = grid.tile_count();
    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from = vec![usize::MAX; n];
    let mut open = BinaryHeap::new();

    g_score[start] = 0.0;
    open.push(OpenNode { f: grid.hex_distance(start, goal) as f64, g: 0.0, tile: start });

    while let Some(OpenNode { g, tile: current, .. }) = open.pop() {
        if current == goal {
            let mut path = vec![goal];
            let mut at = goal;
            while at != start {
                at = came_from[at];
                path.push(at);
            }
            path.reverse();
            return Some(path);
        }
        if g > g_score[current] {
            continue;
        }

        for &next in grid.neighbors(current) {
            if next != goal && !is_river_passable(&tiles[next]) {
                continue;
            }
            let climb = (tiles[next].elevation - tiles[current].elevation) * UPHILL_FACTOR;
            let jitter = rng.gen_range(-PATH_JITTER..=PATH_JITTER);
            let step = 1.0 + climb.clamp(0.0, MAX_UPHILL_PENALTY) as f64 + jitter;
            let tentative = g + step;

            if tentative < g_score[next] {
                g_score[next] = tentative;
                came_from[next] = current;
                open.push(OpenNode {
                    f: tentative + grid.hex_distance(next, goal) as f64,
                    g: tentative,
                    tile: next,
                });
            }
        }
    }

    None
}

// =============================================================================
// ROUTER
// =============================================================================

struct LakeSources {
    lake: usize,
    sources: Vec<usize>,
}

struct RiverRouter<'a> {
    grid: &'a HexGrid,
    coast_dist: Vec<u32>,
    membership: Vec<Option<usize>>,
    component: Vec<usize>,
    coasts: Vec<usize>,
}

impl<'a> RiverRouter<'a> {
    fn new(grid: &'a HexGrid, tiles: &[Tile], continents: &[ContinentStamp]) -> Self {
        let coasts: Vec<usize> = (0..tiles.len()).filter(|&i| tiles[i].biome == Biome::Coast).collect();
        let coast_dist = grid.bfs_distances(&coasts, None, |i| is_river_passable(&tiles[i]));
        Self {
            grid,
            coast_dist,
            membership: continent_membership(grid, continents),
            component: label_components(grid, tiles),
            coasts,
        }
    }

    fn reaches_coast(&self, source: usize) -> bool {
        self.coast_dist[source] != UNREACHED
    }

    /// Coastal targets sharing the source's continent and land component,
    /// falling back to any coast in the component.
    fn candidate_targets(&self, source: usize) -> Vec<usize> {
        let comp = self.component[source];
        let in_component: Vec<usize> = self
            .coasts
            .iter()
            .copied()
            .filter(|&c| comp != NO_COMPONENT && self.grid.neighbors(c).iter().any(|&n| self.component[n] == comp))
            .collect();

        if let Some(continent) = self.membership[source] {
            let same: Vec<usize> =
                in_component.iter().copied().filter(|&c| self.membership[c] == Some(continent)).collect();
            if !same.is_empty() {
                return same;
            }
        }
        in_component
    }

    /// Try to route from `source`; returns the path on success.
    fn route_from(&self, tiles: &[Tile], source: usize, rng: &mut ChaCha8Rng) -> Option<Vec<usize>> {
        let mut candidates: Vec<(usize, usize)> = self
            .candidate_targets(source)
            .into_iter()
            .map(|c| (self.grid.hex_distance(source, c), c))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_unstable();

        let drop = ((candidates.len() as f64 * NEAREST_TARGET_DROP) as usize).min(candidates.len() - 1);
        let mut pool: Vec<(usize, usize)> = candidates.split_off(drop);

        while !pool.is_empty() {
            let pick = weighted_pick(&pool, rng);
            let (_, target) = pool.remove(pick);
            if let Some(path) = find_path(self.grid, tiles, source, target, rng) {
                if path.len() >= MIN_PATH_TILES {
                    return Some(path);
                }
            }
        }
        None
    }
}

/// Index into `pool` sampled with weight `distance^1.5`.
fn weighted_pick(pool: &[(usize, usize)], rng: &mut ChaCha8Rng) -> usize {
    let weights: Vec<f64> = pool.iter().map(|&(d, _)| (d as f64).powf(TARGET_DISTANCE_EXPONENT)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    let mut roll = rng.gen::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        if roll < *w {
            return i;
        }
        roll -= w;
    }
    pool.len() - 1
}

/// Connected components over river-passable tiles.
fn label_components(grid: &HexGrid, tiles: &[Tile]) -> Vec<usize> {
    let mut component = vec![NO_COMPONENT; tiles.len()];
    let mut next_label = 0;
    for start in 0..tiles.len() {
        if component[start] != NO_COMPONENT || !is_river_passable(&tiles[start]) {
            continue;
        }
        let dist = grid.bfs_distances(&[start], None, |i| is_river_passable(&tiles[i]));
        for (i, d) in dist.iter().enumerate() {
            if *d != UNREACHED {
                component[i] = next_label;
            }
        }
        next_label += 1;
    }
    component
}

/// Land ring around each lake, grouped by lake. Lakes with no usable ring are
/// left out.
fn lake_sources(grid: &HexGrid, tiles: &[Tile], lakes: &[Lake]) -> Vec<LakeSources> {
    let mut groups = Vec::new();
    for (lake_index, lake) in lakes.iter().enumerate() {
        let seeds: Vec<usize> = lake.tiles.iter().copied().filter(|&i| tiles[i].is_lake).collect();
        if seeds.is_empty() {
            continue;
        }
        let body = grid.bfs_distances(&seeds, None, |i| tiles[i].is_lake);

        let mut sources: Vec<usize> = (0..tiles.len())
            .filter(|&i| body[i] != UNREACHED)
            .flat_map(|i| grid.neighbors(i).iter().copied())
            .filter(|&n| is_source_tile(&tiles[n]))
            .collect();
        sources.sort_unstable();
        sources.dedup();

        if !sources.is_empty() {
            groups.push(LakeSources { lake: lake_index, sources });
        }
    }
    groups
}

fn is_source_tile(tile: &Tile) -> bool {
    is_river_passable(tile) && !tile.is_river && !matches!(tile.biome, Biome::Ocean | Biome::Seas | Biome::River)
}

/// Carve `path` into the tiles (terminal excluded).
fn carve(tiles: &mut [Tile], path: &[usize], depth: f32) {
    for &i in &path[..path.len() - 1] {
        let t = &mut tiles[i];
        t.biome = Biome::River;
        t.is_land = true;
        t.is_lake = false;
        t.is_hill = false;
        t.is_river = true;
        t.elevation = (t.elevation - depth).max(0.0);
    }
}

/// Route and carve rivers. One river per lake when lakes provide sources,
/// otherwise `params.target_count` rivers from inland land.
pub fn route_rivers(
    grid: &HexGrid,
    tiles: &mut [Tile],
    continents: &[ContinentStamp],
    lakes: &[Lake],
    params: &RiverParams,
    rng: &mut ChaCha8Rng,
) -> (Vec<RiverPath>, RiverReport) {
    let mut report = RiverReport { per_continent: vec![0; continents.len()], ..Default::default() };
    let mut rivers = Vec::new();
    if !params.enabled {
        return (rivers, report);
    }

    let router = RiverRouter::new(grid, tiles, continents);
    let mut groups = lake_sources(grid, tiles, lakes);
    report.target = if groups.is_empty() { params.target_count } else { groups.len() };

    let mut accept = |tiles: &mut [Tile], path: Vec<usize>, lake: Option<usize>, report: &mut RiverReport| {
        carve(tiles, &path, params.depth);
        match router.membership[path[0]] {
            Some(c) => report.per_continent[c] += 1,
            None => report.outside_continents += 1,
        }
        log::debug!("River {} from tile {}: {} tiles", rivers.len() + 1, path[0], path.len());
        rivers.push(RiverPath { lake, tiles: path });
    };

    if !groups.is_empty() {
        groups.shuffle(rng);
        for group in &groups {
            if report.carved >= report.target || report.attempts >= MAX_ATTEMPTS {
                break;
            }
            let mut sources = group.sources.clone();
            sources.shuffle(rng);

            for &source in sources.iter().take(SOURCES_PER_LAKE) {
                if report.attempts >= MAX_ATTEMPTS {
                    break;
                }
                if !router.reaches_coast(source) {
                    log::debug!("Lake {} abandoned: source {} cannot reach the coast", group.lake, source);
                    report.abandoned_lakes += 1;
                    break;
                }
                if tiles[source].is_river {
                    continue;
                }
                report.attempts += 1;
                if let Some(path) = router.route_from(tiles, source, rng) {
                    accept(tiles, path, Some(group.lake), &mut report);
                    report.carved += 1;
                    break;
                }
            }
        }
    } else {
        let mut pool: Vec<usize> = (0..tiles.len()).filter(|&i| is_source_tile(&tiles[i])).collect();
        pool.shuffle(rng);
        while report.carved < report.target && report.attempts < MAX_ATTEMPTS {
            let Some(source) = pool.pop() else { break };
            if !router.reaches_coast(source) || tiles[source].is_river {
                continue;
            }
            report.attempts += 1;
            if let Some(path) = router.route_from(tiles, source, rng) {
                accept(tiles, path, None, &mut report);
                report.carved += 1;
            }
        }
    }

    if report.carved < report.target {
        log::warn!("Carved {} of {} rivers after {} attempts", report.carved, report.target, report.attempts);
    } else {
        log::info!("Carved {} rivers in {} attempts", report.carved, report.attempts);
    }
    for (c, &count) in report.per_continent.iter().enumerate() {
        if count < params.min_per_continent || count > params.max_per_continent {
            log::info!(
                "{} has {} rivers (bounds {}..={})",
                continents[c].name,
                count,
                params.min_per_continent,
                params.max_per_continent
            );
        }
    }

    (rivers, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coastline::resolve_coastline;
    use crate::config::ElevationParams;
    use rand::SeedableRng;

    /// Plains continent with a central radius-1 lake, coastline resolved.
    /// Elevation falls off from the center so rivers run downhill.
    fn lake_world(w: usize, h: usize) -> (HexGrid, Vec<Tile>, Vec<ContinentStamp>, Vec<Lake>) {
        let grid = HexGrid::new(w, h).unwrap();
        let stamp = ContinentStamp {
            name: "Continent 1".into(),
            center_x: w / 2,
            center_y: h / 2,
            width: w * 3 / 4,
            height: h * 3 / 4,
        };
        let center = grid.index(w / 2, h / 2);
        let lake_tiles = grid.disk(center, 1);

        let mut tiles: Vec<Tile> = (0..grid.tile_count())
            .map(|i| {
                let (x, y) = grid.coords(i);
                let mut t = Tile::new(i, x, y);
                if lake_tiles.contains(&i) {
                    t.is_lake = true;
                    t.biome = Biome::Lake;
                    t.elevation = 0.1;
                } else if stamp.contains(x, y, &grid) {
                    t.is_land = true;
                    t.biome = Biome::Plains;
                    t.elevation = 0.6 - 0.03 * grid.hex_distance(i, center) as f32;
                }
                t
            })
            .collect();
        resolve_coastline(&grid, &mut tiles, &ElevationParams::default());

        let lake = Lake { center, radius: 1, tiles: lake_tiles, fallback: false };
        (grid, tiles, vec![stamp], vec![lake])
    }

    fn assert_valid_river(grid: &HexGrid, tiles: &[Tile], lakes: &[Lake], river: &RiverPath) {
        assert!(river.tiles.len() >= MIN_PATH_TILES);
        for pair in river.tiles.windows(2) {
            assert!(grid.neighbors(pair[0]).contains(&pair[1]), "river is not contiguous");
        }
        assert_eq!(tiles[river.mouth()].biome, Biome::Coast);
        for &t in river.river_tiles() {
            let tile = &tiles[t];
            assert_eq!(tile.biome, Biome::River);
            assert!(tile.is_land && tile.is_river && !tile.is_lake && !tile.is_hill);
        }
        if let Some(l) = river.lake {
            let source = river.source();
            assert!(grid.neighbors(source).iter().any(|n| lakes[l].tiles.contains(n)));
        }
    }

    #[test]
    fn test_single_lake_single_river() {
        let (grid, mut tiles, continents, lakes) = lake_world(30, 20);
        let params = RiverParams { target_count: 1, ..Default::default() };
        let (rivers, report) = route_rivers(&grid, &mut tiles, &continents, &lakes, &params, &mut ChaCha8Rng::seed_from_u64(42));

        assert_eq!(report.target, 1);
        assert_eq!(rivers.len(), 1);
        assert_eq!(report.per_continent, vec![1]);
        assert_valid_river(&grid, &tiles, &lakes, &rivers[0]);

        let river_count = tiles.iter().filter(|t| t.biome == Biome::River).count();
        assert_eq!(river_count, rivers[0].river_tiles().len());
    }

    #[test]
    fn test_river_depth_lowers_elevation() {
        let (grid, mut tiles, continents, lakes) = lake_world(30, 20);
        let before = tiles.clone();
        let params = RiverParams::default();
        let (rivers, _) = route_rivers(&grid, &mut tiles, &continents, &lakes, &params, &mut ChaCha8Rng::seed_from_u64(1));
        for &t in rivers[0].river_tiles() {
            let expected = (before[t].elevation - params.depth).max(0.0);
            assert!((tiles[t].elevation - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_deterministic_routing() {
        let run = |seed| {
            let (grid, mut tiles, continents, lakes) = lake_world(30, 20);
            route_rivers(&grid, &mut tiles, &continents, &lakes, &RiverParams::default(), &mut ChaCha8Rng::seed_from_u64(seed)).0
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_walled_lake_is_abandoned() {
        let (grid, mut tiles, continents, lakes) = lake_world(30, 20);
        let center = lakes[0].center;
        // Mountain ring two tiles out from the lake edge seals its sources in
        for i in 0..tiles.len() {
            if grid.hex_distance(i, center) == 3 && tiles[i].is_land {
                tiles[i].biome = Biome::Mountain;
            }
        }
        let (rivers, report) = route_rivers(&grid, &mut tiles, &continents, &lakes, &RiverParams::default(), &mut ChaCha8Rng::seed_from_u64(3));
        assert!(rivers.is_empty());
        assert_eq!(report.abandoned_lakes, 1);
        assert!(tiles.iter().all(|t| !t.is_river));
    }

    #[test]
    fn test_inland_pool_without_lakes() {
        let (grid, mut tiles, continents, _) = lake_world(40, 24);
        let params = RiverParams { target_count: 2, ..Default::default() };
        let (rivers, report) = route_rivers(&grid, &mut tiles, &continents, &[], &params, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(report.target, 2);
        assert_eq!(rivers.len(), 2);
        for river in &rivers {
            assert_eq!(river.lake, None);
            assert_eq!(tiles[river.mouth()].biome, Biome::Coast);
        }
    }

    #[test]
    fn test_disabled_rivers() {
        let (grid, mut tiles, continents, lakes) = lake_world(30, 20);
        let params = RiverParams { enabled: false, ..Default::default() };
        let (rivers, report) = route_rivers(&grid, &mut tiles, &continents, &lakes, &params, &mut ChaCha8Rng::seed_from_u64(5));
        assert!(rivers.is_empty());
        assert_eq!(report.target, 0);
    }

    #[test]
    fn test_weighted_pick_favors_far_targets() {
        let pool = vec![(1, 0), (10, 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let far = (0..1000).filter(|_| weighted_pick(&pool, &mut rng) == 1).count();
        // 10^1.5 / (1 + 10^1.5) is about 0.97
        assert!(far > 900);
    }
}
