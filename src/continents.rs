//! Continent placement
//!
//! Continents are elliptical stamps. Centers are spread apart by a minimum
//! hex-wrapped distance, with a small chance of accepting a close placement so
//! that some landmasses merge.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::ContinentParams;
use crate::grid::HexGrid;

/// Retries per continent before a center is accepted regardless of spacing.
const MAX_PLACEMENT_RETRIES: usize = 100;

/// A placed continent. Read-only after placement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContinentStamp {
    pub name: String,
    pub center_x: usize,
    pub center_y: usize,
    pub width: usize,
    pub height: usize,
}

impl ContinentStamp {
    /// Point-in-ellipse test with wrapped horizontal distance:
    /// `(dx / half_w)^2 + (dy / half_h)^2 <= 1`.
    pub fn contains(&self, x: usize, y: usize, grid: &HexGrid) -> bool {
        let half_w = (self.width as f64 / 2.0).max(0.5);
        let half_h = (self.height as f64 / 2.0).max(0.5);
        let dx = grid.wrapped_dx(self.center_x as f64, x as f64);
        let dy = y as f64 - self.center_y as f64;
        (dx / half_w).powi(2) + (dy / half_h).powi(2) <= 1.0
    }
}

/// Placed stamps plus placement diagnostics.
#[derive(Clone, Debug, Default)]
pub struct ContinentPlacement {
    pub stamps: Vec<ContinentStamp>,
    /// Too-close placements accepted by the connection roll
    pub joined: usize,
    /// Placements accepted after the retry budget ran out
    pub forced: usize,
}

/// Place exactly `params.count` continents.
pub fn place_continents(grid: &HexGrid, params: &ContinentParams, rng: &mut ChaCha8Rng) -> ContinentPlacement {
    let mut placement = ContinentPlacement::default();

    for i in 0..params.count {
        let width = rng.gen_range(params.min_width..=params.max_width);
        let height = rng.gen_range(params.min_height..=params.max_height);

        let mut chosen = None;
        for _ in 0..MAX_PLACEMENT_RETRIES {
            let candidate = random_center(grid, rng);
            let too_close = placement
                .stamps
                .iter()
                .any(|s| grid.hex_distance_xy(candidate, (s.center_x, s.center_y)) < params.min_distance);

            if !too_close {
                chosen = Some(candidate);
                break;
            }
            if rng.gen_bool(params.connection_chance) {
                placement.joined += 1;
                chosen = Some(candidate);
                break;
            }
        }

        let (center_x, center_y) = match chosen {
            Some(c) => c,
            None => {
                placement.forced += 1;
                log::warn!("Continent {} could not satisfy spacing after {} retries", i + 1, MAX_PLACEMENT_RETRIES);
                random_center(grid, rng)
            }
        };

        log::debug!("Continent {} at ({}, {}) size {}x{}", i + 1, center_x, center_y, width, height);
        placement.stamps.push(ContinentStamp {
            name: format!("Continent {}", i + 1),
            center_x,
            center_y,
            width,
            height,
        });
    }

    placement
}

/// Random center, kept an eighth of the map height away from each pole.
fn random_center(grid: &HexGrid, rng: &mut ChaCha8Rng) -> (usize, usize) {
    let band = grid.height() / 8;
    let (y_min, y_max) = if band * 2 < grid.height() { (band, grid.height() - band) } else { (0, grid.height()) };
    (rng.gen_range(0..grid.width()), rng.gen_range(y_min..y_max))
}

/// Index of the first stamp containing each tile.
pub fn continent_membership(grid: &HexGrid, stamps: &[ContinentStamp]) -> Vec<Option<usize>> {
    (0..grid.tile_count())
        .map(|i| {
            let (x, y) = grid.coords(i);
            stamps.iter().position(|s| s.contains(x, y, grid))
        })
        .collect()
}
