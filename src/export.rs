//! File exports: JSON tile dumps and PNG previews
//!
//! PNG previews draw one hex per tile, offset by half a cell on odd rows so
//! the stagger of the grid is visible.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::continents::ContinentStamp;
use crate::error::ExportError;
use crate::generator::GenerationReport;
use crate::rivers::RiverPath;
use crate::tile::Tile;
use crate::world::PlanetSurface;

/// Pixels per tile in PNG previews
pub const CELL_SIZE: u32 = 8;

const RIVER_COLOR: [u8; 3] = [40, 110, 220];

#[derive(Serialize)]
struct SurfaceDump<'a> {
    seed: u64,
    width: usize,
    height: usize,
    land_elevation_range: (f32, f32),
    continents: &'a [ContinentStamp],
    rivers: &'a [RiverPath],
    report: &'a GenerationReport,
    tiles: &'a [Tile],
}

/// Write the finalized tiles, rivers and report as pretty JSON.
pub fn export_json(surface: &PlanetSurface, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let dump = SurfaceDump {
        seed: surface.seed(),
        width: surface.width(),
        height: surface.height(),
        land_elevation_range: surface.land_elevation_range,
        continents: &surface.continents,
        rivers: &surface.rivers,
        report: &surface.report,
        tiles: surface.tiles(),
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Paint every tile as a staggered block using `color`.
fn render_tiles(surface: &PlanetSurface, color: impl Fn(&Tile) -> [u8; 3]) -> RgbImage {
    let half = CELL_SIZE / 2;
    let img_w = surface.width() as u32 * CELL_SIZE + half;
    let img_h = surface.height() as u32 * CELL_SIZE;
    let mut img: RgbImage = ImageBuffer::from_pixel(img_w, img_h, Rgb([0, 0, 0]));

    for tile in surface.tiles() {
        let rgb = Rgb(color(tile));
        let x0 = tile.x as u32 * CELL_SIZE + if tile.y % 2 == 1 { half } else { 0 };
        let y0 = tile.y as u32 * CELL_SIZE;
        for dy in 0..CELL_SIZE {
            for dx in 0..CELL_SIZE {
                img.put_pixel(x0 + dx, y0 + dy, rgb);
            }
        }
    }

    // The half-cell gap on even rows shows the wrapped neighbor
    for y in (0..surface.height()).step_by(2) {
        let rgb = Rgb(color(surface.tile_at(0, y)));
        let y0 = y as u32 * CELL_SIZE;
        for dy in 0..CELL_SIZE {
            for dx in 0..half {
                img.put_pixel(img_w - half + dx, y0 + dy, rgb);
            }
        }
    }

    img
}

pub fn render_biome_map(surface: &PlanetSurface) -> RgbImage {
    render_tiles(surface, |t| {
        let (r, g, b) = t.biome.color();
        [r, g, b]
    })
}

/// Render elevation through the spectral colormap; rivers drawn on top.
pub fn render_elevation_map(surface: &PlanetSurface) -> RgbImage {
    render_tiles(surface, |t| if t.is_river { RIVER_COLOR } else { spectral_colormap(t.render_elevation) })
}

pub fn export_biome_png(surface: &PlanetSurface, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_biome_map(surface).save(path)?;
    Ok(())
}

pub fn export_elevation_png(surface: &PlanetSurface, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_elevation_map(surface).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationParams, MapSize};
    use crate::generator::SurfaceGenerator;

    fn surface() -> PlanetSurface {
        SurfaceGenerator::new(GenerationParams::for_map_size(MapSize::Duel).with_seed(9)).unwrap().generate()
    }

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(spectral_colormap(0.0), [94, 79, 163]);
        assert_eq!(spectral_colormap(1.0), [158, 0, 66]);
        assert_eq!(spectral_colormap(-3.0), spectral_colormap(0.0));
    }

    #[test]
    fn test_json_export() {
        let s = surface();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.json");
        export_json(&s, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["seed"].as_u64(), Some(9));
        assert_eq!(value["tiles"].as_array().map(|a| a.len()), Some(s.tiles().len()));
        let tiles: Vec<Tile> = serde_json::from_value(value["tiles"].clone()).unwrap();
        assert_eq!(tiles[0].biome, s.tile(0).biome);
    }

    #[test]
    fn test_png_exports() {
        let s = surface();
        let dir = tempfile::tempdir().unwrap();
        let biome = dir.path().join("biomes.png");
        let elevation = dir.path().join("elevation.png");
        export_biome_png(&s, &biome).unwrap();
        export_elevation_png(&s, &elevation).unwrap();

        let img = image::open(&biome).unwrap();
        assert_eq!(img.width(), s.width() as u32 * CELL_SIZE + CELL_SIZE / 2);
        assert_eq!(img.height(), s.height() as u32 * CELL_SIZE);
        assert!(elevation.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let s = surface();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("surface.json");
        assert!(matches!(export_json(&s, &path), Err(ExportError::Io(_))));
    }
}
