//! ASCII rendering of generated surfaces
//!
//! Odd rows are indented by one column so the text roughly follows the hex
//! stagger of the grid.

use std::fmt::Write as _;

use crate::biomes::Biome;
use crate::world::PlanetSurface;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiMode {
    Biome,
    /// Render elevation gradient
    Elevation,
    Temperature,
    Moisture,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Biome => "Biome",
            AsciiMode::Elevation => "Elevation",
            AsciiMode::Temperature => "Temperature",
            AsciiMode::Moisture => "Moisture",
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[AsciiMode::Biome, AsciiMode::Elevation, AsciiMode::Temperature, AsciiMode::Moisture]
    }

    pub fn from_name(s: &str) -> Option<AsciiMode> {
        Self::all().iter().copied().find(|m| m.name().eq_ignore_ascii_case(s))
    }
}

/// Get ASCII character for a biome
pub fn biome_char(biome: Biome) -> char {
    match biome {
        // Water
        Biome::Ocean => '~',
        Biome::Seas => '.',
        Biome::Coast => ',',
        Biome::Lake => 'o',
        Biome::River => '=',

        // Relief
        Biome::Mountain => '^',
        Biome::Glacier => '#',
        Biome::Arctic => '*',

        // Earth land
        Biome::Tundra => ':',
        Biome::Taiga => 'B',
        Biome::Steppe => '-',
        Biome::Plains => '"',
        Biome::Grassland => 'g',
        Biome::Forest => 'T',
        Biome::Marsh => 'm',
        Biome::Savanna => ';',
        Biome::Jungle => 'J',
        Biome::Swamp => 'S',
        Biome::Desert => 'd',

        // Special
        Biome::AshWaste => '%',
        Biome::MagmaField => '@',
        Biome::Blightland => 'X',
        Biome::Brimstone => '&',

        // Other bodies
        Biome::RedDesert => 'r',
        Biome::Regolith => '_',
        Biome::Crater => 'C',
        Biome::VolcanicPlain => 'V',
        Biome::SulfurFlats => 'u',
        Biome::IceShelf => 'I',
        Biome::HydrocarbonDunes => 'h',
    }
}

/// Render elevation in [0, 1], ocean to peaks.
pub fn elevation_char(render_elevation: f32) -> char {
    const CHARS: &[char] = &['~', '.', ',', '-', '=', '+', '*', '#', '%', '^', 'M'];
    let idx = (render_elevation.clamp(0.0, 1.0) * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

pub fn temperature_char(temperature: f32) -> char {
    const CHARS: &[char] = &['#', '=', '-', '.', ',', ';', ':', '+', '*', '@'];
    let idx = (temperature.clamp(0.0, 1.0) * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

pub fn moisture_char(moisture: f32) -> char {
    const CHARS: &[char] = &['_', '.', '-', ':', ';', '=', '+', '#', '%', '~'];
    let idx = (moisture.clamp(0.0, 1.0) * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

pub fn render_ascii_map(surface: &PlanetSurface, mode: AsciiMode) -> String {
    let (width, height) = (surface.width(), surface.height());
    let mut result = String::with_capacity((width + 2) * height);

    for y in 0..height {
        if y % 2 == 1 {
            result.push(' ');
        }
        for x in 0..width {
            let tile = surface.tile_at(x, y);
            let ch = match mode {
                AsciiMode::Biome => {
                    if tile.is_hill && !tile.biome.is_water() {
                        biome_char(tile.biome).to_ascii_uppercase()
                    } else {
                        biome_char(tile.biome)
                    }
                }
                AsciiMode::Elevation => elevation_char(tile.render_elevation),
                AsciiMode::Temperature => temperature_char(tile.temperature),
                AsciiMode::Moisture => moisture_char(tile.moisture),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Legend for the biomes that actually appear on `surface`.
pub fn biome_legend(surface: &PlanetSurface) -> String {
    let mut legend = String::from("=== BIOME LEGEND ===\n");
    let counts = surface.biome_counts();
    for (i, (biome, _)) in counts.iter().enumerate() {
        let _ = write!(legend, "  {} {:<14}", biome_char(*biome), biome.display_name());
        if i % 4 == 3 {
            legend.push('\n');
        }
    }
    if !legend.ends_with('\n') {
        legend.push('\n');
    }
    legend.push_str("  (hills are shown in upper case)\n");
    legend
}

pub fn gradient_legend(mode: AsciiMode) -> String {
    match mode {
        AsciiMode::Biome => String::new(),
        AsciiMode::Elevation => "=== ELEVATION ===\n  ~ . , - = + * # % ^ M\n  (ocean)         (peaks)\n".to_string(),
        AsciiMode::Temperature => "=== TEMPERATURE ===\n  # = - . , ; : + * @\n  (cold)       (hot)\n".to_string(),
        AsciiMode::Moisture => "=== MOISTURE ===\n  _ . - : ; = + # % ~\n  (dry)        (wet)\n".to_string(),
    }
}

/// Biome histogram, largest first.
pub fn biome_stats(surface: &PlanetSurface) -> String {
    let total = surface.tiles().len().max(1);
    let mut counts: Vec<(Biome, usize)> = surface.biome_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut out = String::from("=== BIOME STATISTICS ===\n");
    for (biome, count) in counts {
        let pct = count as f32 * 100.0 / total as f32;
        let _ = writeln!(out, "  {:<16} {:>6} ({:5.1}%)", biome.display_name(), count, pct);
    }
    out
}

pub fn print_ascii_map(surface: &PlanetSurface, mode: AsciiMode) {
    println!("=== {} MAP ({}x{}) ===", mode.name().to_uppercase(), surface.width(), surface.height());
    print!("{}", render_ascii_map(surface, mode));
    match mode {
        AsciiMode::Biome => print!("{}", biome_legend(surface)),
        _ => print!("{}", gradient_legend(mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::config::{GenerationParams, MapSize};
    use crate::generator::SurfaceGenerator;

    #[test]
    fn test_biome_chars_unique() {
        let chars: HashSet<char> = Biome::all().iter().map(|b| biome_char(*b)).collect();
        assert_eq!(chars.len(), Biome::all().len());
    }

    #[test]
    fn test_gradient_chars_cover_range() {
        assert_eq!(elevation_char(0.0), '~');
        assert_eq!(elevation_char(1.0), 'M');
        assert_eq!(temperature_char(-1.0), '#');
        assert_eq!(moisture_char(2.0), '~');
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!(AsciiMode::from_name("elevation"), Some(AsciiMode::Elevation));
        assert_eq!(AsciiMode::from_name("BIOME"), Some(AsciiMode::Biome));
        assert_eq!(AsciiMode::from_name("plates"), None);
    }

    #[test]
    fn test_map_shape() {
        let surface =
            SurfaceGenerator::new(GenerationParams::for_map_size(MapSize::Duel).with_seed(6)).unwrap().generate();
        let map = render_ascii_map(&surface, AsciiMode::Biome);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), surface.height());
        assert_eq!(lines[0].chars().count(), surface.width());
        assert_eq!(lines[1].chars().count(), surface.width() + 1);
        assert!(lines[1].starts_with(' '));
    }
}
