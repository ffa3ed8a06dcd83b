//! Seeded multi-octave noise that tiles seamlessly across the horizontal wrap.
//!
//! Each "periodic" sample maps the x axis onto a circle and samples 3D Perlin
//! noise on the resulting cylinder, so a position and its twin one map-width
//! away land on the same point of the cylinder.

use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};

const OCTAVES: u32 = 3;
const PERSISTENCE: f64 = 0.5;
const LACUNARITY: f64 = 2.0;

/// Per-channel offsets so the channels do not share lattice zeros.
const BROAD_OFFSET: [f64; 3] = [11.3, 7.9, 3.1];
const RIDGED_OFFSET: [f64; 3] = [-23.7, 41.2, 9.4];
const BILLOW_OFFSET: [f64; 3] = [61.5, -12.6, 27.8];
const MOISTURE_OFFSET: [f64; 3] = [5.5, 33.3, -17.2];
const TEMPERATURE_OFFSET: [f64; 3] = [-71.9, 2.4, 44.6];
const TEMPERATURE_DETAIL_OFFSET: [f64; 3] = [14.8, -58.1, -6.6];

/// Noise source for elevation, moisture, and temperature fields.
pub struct NoiseSampler {
    broad: Perlin,
    ridged: Perlin,
    billow: Perlin,
    moisture: Perlin,
    temperature: Perlin,
    temperature_detail: Perlin,
}

impl NoiseSampler {
    pub fn new(seed: u64) -> Self {
        let base = (seed ^ (seed >> 32)) as u32;
        Self {
            broad: Perlin::new(base),
            ridged: Perlin::new(base.wrapping_add(1111)),
            billow: Perlin::new(base.wrapping_add(2222)),
            moisture: Perlin::new(base.wrapping_add(3333)),
            temperature: Perlin::new(base.wrapping_add(4444)),
            temperature_detail: Perlin::new(base.wrapping_add(5555)),
        }
    }

    /// Blend of a broad octave, a ridged octave (`1 - |n|`, sharp crests) and
    /// an optional billow octave (`|n|`, rounded hills). Returns [0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn elevation_periodic(
        &self,
        pos: (f64, f64),
        width: f64,
        height: f64,
        broad_freq: f64,
        ridged_freq: f64,
        billow_freq: Option<f64>,
        ridge_weight: f64,
        billow_weight: Option<f64>,
    ) -> f64 {
        let broad = (periodic_fbm(&self.broad, BROAD_OFFSET, pos, width, height, broad_freq) + 1.0) * 0.5;
        let ridged = 1.0 - periodic_fbm(&self.ridged, RIDGED_OFFSET, pos, width, height, ridged_freq).abs();

        let mut w_ridge = ridge_weight.clamp(0.0, 1.0);
        let (billow, mut w_billow) = match (billow_freq, billow_weight) {
            (Some(freq), Some(weight)) => (
                periodic_fbm(&self.billow, BILLOW_OFFSET, pos, width, height, freq).abs(),
                weight.clamp(0.0, 1.0),
            ),
            _ => (0.0, 0.0),
        };

        let total = w_ridge + w_billow;
        if total > 1.0 {
            w_ridge /= total;
            w_billow /= total;
        }
        let w_broad = 1.0 - w_ridge - w_billow;

        (broad * w_broad + ridged * w_ridge + billow * w_billow).clamp(0.0, 1.0)
    }

    /// Moisture noise in [0, 1].
    pub fn moisture_periodic(&self, pos: (f64, f64), width: f64, height: f64, freq: f64) -> f64 {
        to_unit(periodic_fbm(&self.moisture, MOISTURE_OFFSET, pos, width, height, freq))
    }

    /// Base temperature noise in [0, 1].
    pub fn temperature_periodic(&self, pos: (f64, f64), width: f64, height: f64, freq: f64) -> f64 {
        to_unit(periodic_fbm(&self.temperature, TEMPERATURE_OFFSET, pos, width, height, freq))
    }

    /// Fine-scale temperature noise in [0, 1], decorrelated from the base channel.
    pub fn temperature_detail_periodic(&self, pos: (f64, f64), width: f64, height: f64, freq: f64) -> f64 {
        to_unit(periodic_fbm(&self.temperature_detail, TEMPERATURE_DETAIL_OFFSET, pos, width, height, freq))
    }
}

fn to_unit(n: f64) -> f64 {
    ((n + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Fractal noise sampled on a cylinder of circumference `freq` noise units.
/// `pos.0` is reduced modulo `width` first, so x and x + width agree exactly.
fn periodic_fbm(noise: &Perlin, offset: [f64; 3], pos: (f64, f64), width: f64, height: f64, freq: f64) -> f64 {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let x = pos.0.rem_euclid(width);
    let angle = x / width * TAU;
    let aspect = height / width;

    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = freq;
    let mut max_value = 0.0;

    for _ in 0..OCTAVES {
        let radius = frequency / TAU;
        let point = [
            radius * angle.cos() + offset[0],
            radius * angle.sin() + offset[1],
            pos.1 / height * aspect * frequency + offset[2],
        ];
        total += amplitude * noise.get(point);
        max_value += amplitude;
        amplitude *= PERSISTENCE;
        frequency *= LACUNARITY;
    }

    (total / max_value).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_continuity() {
        let sampler = NoiseSampler::new(42);
        let (w, h) = (40.0, 24.0);
        for y in 0..24 {
            let y = y as f64;
            let a = sampler.elevation_periodic((0.0, y), w, h, 2.0, 4.0, Some(6.0), 0.35, Some(0.15));
            let b = sampler.elevation_periodic((w, y), w, h, 2.0, 4.0, Some(6.0), 0.35, Some(0.15));
            assert_eq!(a, b, "elevation differs across the wrap at row {}", y);

            assert_eq!(
                sampler.moisture_periodic((0.0, y), w, h, 3.0),
                sampler.moisture_periodic((w, y), w, h, 3.0)
            );
            assert_eq!(
                sampler.temperature_periodic((0.0, y), w, h, 2.0),
                sampler.temperature_periodic((w, y), w, h, 2.0)
            );
        }
    }

    #[test]
    fn test_values_in_unit_range() {
        let sampler = NoiseSampler::new(7);
        for y in 0..20 {
            for x in 0..30 {
                let p = (x as f64, y as f64);
                let e = sampler.elevation_periodic(p, 30.0, 20.0, 2.0, 4.0, None, 0.5, None);
                let m = sampler.moisture_periodic(p, 30.0, 20.0, 3.0);
                let t = sampler.temperature_detail_periodic(p, 30.0, 20.0, 6.0);
                for v in [e, m, t] {
                    assert!((0.0..=1.0).contains(&v), "value {} out of range at {:?}", v, p);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = NoiseSampler::new(99);
        let b = NoiseSampler::new(99);
        let c = NoiseSampler::new(100);
        let mut differs = false;
        for x in 0..16 {
            let p = (x as f64, 5.0);
            let va = a.moisture_periodic(p, 16.0, 10.0, 3.0);
            assert_eq!(va, b.moisture_periodic(p, 16.0, 10.0, 3.0));
            if va != c.moisture_periodic(p, 16.0, 10.0, 3.0) {
                differs = true;
            }
        }
        assert!(differs, "different seeds should give different fields");
    }
}
