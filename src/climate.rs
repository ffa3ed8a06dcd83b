//! Climate and elevation sampling
//!
//! Per tile: raw elevation from the periodic ridged/billow blend, moisture from
//! its own channel, and temperature from a base/detail blend plus a latitude
//! curve. Tiles are independent, so sampling runs in parallel batches; the
//! smoothing passes afterwards are double-buffered over the whole grid.

use rayon::prelude::*;

use crate::config::{ClimateParams, ElevationParams};
use crate::grid::HexGrid;
use crate::landmask::LandMask;
use crate::noise_sampler::NoiseSampler;
use crate::tilemap::Tilemap;

/// Tiles per sampling batch (one progress report per batch).
pub const SAMPLE_BATCH: usize = 500;

/// Billow octave is only blended in above this weight.
const BILLOW_THRESHOLD: f64 = 0.01;

/// Sampled per-tile fields.
#[derive(Clone, Debug)]
pub struct ClimateFields {
    pub elevation: Tilemap<f32>,
    pub temperature: Tilemap<f32>,
    pub moisture: Tilemap<f32>,
}

/// Signed latitude heat curve: +1 at the equator, -1 at the poles.
pub fn latitude_curve(normalized_y: f64, exponent: f32) -> f32 {
    let lat = ((normalized_y - 0.5).abs() * 2.0) as f32;
    let curve = (1.0 - lat) * 2.0 - 1.0;
    curve.signum() * curve.abs().powf(exponent)
}

/// Sample every tile, then smooth temperature and moisture.
///
/// `progress` receives the sampled fraction after each batch.
pub fn sample_climate(
    grid: &HexGrid,
    mask: &LandMask,
    sampler: &NoiseSampler,
    climate: &ClimateParams,
    elevation: &ElevationParams,
    progress: &mut dyn FnMut(f32),
) -> ClimateFields {
    let total = grid.tile_count();
    let mut samples: Vec<(f32, f32, f32)> = Vec::with_capacity(total);

    let mut start = 0;
    while start < total {
        let end = (start + SAMPLE_BATCH).min(total);
        let batch: Vec<(f32, f32, f32)> = (start..end)
            .into_par_iter()
            .map(|i| sample_tile(grid, mask, sampler, climate, elevation, i))
            .collect();
        samples.extend(batch);
        start = end;
        progress(start as f32 / total as f32);
    }

    let (w, h) = (grid.width(), grid.height());
    let elevation_map = Tilemap::from_vec(w, h, samples.iter().map(|s| s.0).collect());
    let temperature = Tilemap::from_vec(w, h, samples.iter().map(|s| s.1).collect());
    let moisture = Tilemap::from_vec(w, h, samples.iter().map(|s| s.2).collect());

    let temperature = temperature.smoothed(grid, climate.smoothing_passes, climate.smoothing_strength);
    let moisture = moisture.smoothed(grid, climate.smoothing_passes, climate.smoothing_strength);

    log::debug!(
        "Climate sampled: temperature {:?}, moisture {:?}",
        temperature.min_max(),
        moisture.min_max()
    );

    ClimateFields { elevation: elevation_map, temperature, moisture }
}

/// (elevation, temperature, moisture) for one tile, before smoothing.
fn sample_tile(
    grid: &HexGrid,
    mask: &LandMask,
    sampler: &NoiseSampler,
    climate: &ClimateParams,
    elevation: &ElevationParams,
    i: usize,
) -> (f32, f32, f32) {
    let (x, y) = grid.coords(i);
    let pos = (x as f64, y as f64);
    let (w, h) = (grid.width() as f64, grid.height() as f64);

    let e = if mask.is_land(i) {
        let n = if climate.billow_weight > BILLOW_THRESHOLD {
            sampler.elevation_periodic(
                pos,
                w,
                h,
                climate.elevation_frequency,
                climate.ridged_frequency,
                Some(climate.billow_frequency),
                climate.ridge_weight,
                Some(climate.billow_weight),
            )
        } else {
            sampler.elevation_periodic(pos, w, h, climate.elevation_frequency, climate.ridged_frequency, None, climate.ridge_weight, None)
        };
        elevation.base_land_elevation + n as f32 * (elevation.max_total_elevation - elevation.base_land_elevation)
    } else if mask.is_lake(i) {
        elevation.lake_elevation
    } else {
        0.0
    };

    let moisture = sampler.moisture_periodic(pos, w, h, climate.moisture_frequency) as f32;
    let moisture = (moisture + climate.moisture_bias).clamp(0.0, 1.0);

    let base = sampler.temperature_periodic(pos, w, h, climate.temperature_frequency);
    let detail = sampler.temperature_detail_periodic(
        pos,
        w,
        h,
        climate.temperature_frequency * climate.temperature_detail_multiplier,
    );
    let noise_t = (base + (detail - base) * climate.temperature_detail_strength) as f32;
    let lat = latitude_curve(grid.normalized_y(y), climate.latitude_exponent) * climate.latitude_influence;
    let temperature = (noise_t + lat + climate.temperature_bias).clamp(0.0, 1.0);

    (e, temperature, moisture)
}
