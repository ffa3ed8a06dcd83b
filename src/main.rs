use std::process;

use clap::Parser;

use planet_surface::ascii::{self, AsciiMode};
use planet_surface::biomes::{SpecialMapType, WorldType};
use planet_surface::config::{GenerationParams, MapSize, RainfallLevel, Roughness, TemperaturePreset};
use planet_surface::error::ConfigError;
use planet_surface::export;
use planet_surface::generator::{GenerationStage, SurfaceGenerator};
use planet_surface::world::PlanetSurface;

#[derive(Parser, Debug)]
#[command(name = "planet_surface")]
#[command(about = "Generate a wrapping hex planet surface with continents, lakes and rivers")]
struct Args {
    /// Map size tier: duel, small, standard, large, huge
    #[arg(long, default_value = "standard")]
    map_size: String,

    /// Width in tiles (overrides the map size tier)
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height in tiles (overrides the map size tier)
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load generation parameters from a JSON file; other flags override it
    #[arg(long)]
    config: Option<String>,

    /// Number of continents
    #[arg(long)]
    continents: Option<usize>,

    /// Number of lakes (0 disables lakes)
    #[arg(long)]
    lakes: Option<usize>,

    /// Target river count (0 disables rivers)
    #[arg(long)]
    rivers: Option<usize>,

    /// Skip island stamping
    #[arg(long)]
    no_islands: bool,

    /// World type: earth, mars, venus, mercury, moon, europa, titan
    #[arg(long)]
    world_type: Option<String>,

    /// Comma-separated special map types (infernal, demonic, ice_world, monsoon)
    #[arg(long)]
    special: Option<String>,

    /// Temperature preset: cold, temperate, hot
    #[arg(long)]
    temperature: Option<String>,

    /// Rainfall preset: arid, normal, wet, tropical
    #[arg(long)]
    rainfall: Option<String>,

    /// Terrain roughness: smooth, normal, rugged
    #[arg(long)]
    roughness: Option<String>,

    /// Print an ASCII map: biome, elevation, temperature, moisture
    #[arg(long)]
    ascii: Option<String>,

    /// Write tiles, rivers and the generation report as JSON
    #[arg(long)]
    export_json: Option<String>,

    /// Write a biome preview PNG
    #[arg(long)]
    export_png: Option<String>,

    /// Write a render-elevation preview PNG
    #[arg(long)]
    export_elevation_png: Option<String>,
}

fn build_params(args: &Args) -> Result<GenerationParams, ConfigError> {
    let mut params = match &args.config {
        Some(path) => GenerationParams::from_json_file(path)?,
        None => {
            let mut p = GenerationParams::for_map_size(MapSize::from_name(&args.map_size)?);
            p.random_seed = true;
            p
        }
    };

    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }
    if let Some(w) = args.width {
        params.width = w;
    }
    if let Some(h) = args.height {
        params.height = h;
    }
    if let Some(n) = args.continents {
        params.continents.count = n;
    }
    if let Some(n) = args.lakes {
        params.lakes.enabled = n > 0;
        params.lakes.count = n;
    }
    if let Some(n) = args.rivers {
        params.rivers.enabled = n > 0;
        params.rivers.target_count = n;
    }
    if args.no_islands {
        params.islands.enabled = false;
    }
    if let Some(name) = &args.world_type {
        params.world_type = WorldType::from_name(name)?;
    }
    if let Some(list) = &args.special {
        params.special_map_types = SpecialMapType::parse_list(list)?;
    }
    if let Some(name) = &args.temperature {
        params = params.with_temperature(TemperaturePreset::from_name(name)?);
    }
    if let Some(name) = &args.rainfall {
        params = params.with_rainfall(RainfallLevel::from_name(name)?);
    }
    if let Some(name) = &args.roughness {
        params = params.with_roughness(Roughness::from_name(name)?);
    }

    params.validate()?;
    Ok(params)
}

fn print_summary(surface: &PlanetSurface) {
    println!("Seed: {}", surface.seed());
    println!("Map size: {}x{} ({})", surface.width(), surface.height(), surface.params.world_type);
    println!(
        "Land: {} of {} tiles, {} continents",
        surface.land_count(),
        surface.tiles().len(),
        surface.continents.len()
    );
    println!(
        "Lakes: {} ({} tiles)",
        surface.lakes.len(),
        surface.lakes.iter().map(|l| l.tiles.len()).sum::<usize>()
    );
    println!("Rivers: {} ({} tiles)", surface.rivers.len(), surface.river_tile_indices().len());
    print!("{}", ascii::biome_stats(surface));

    let shortfalls = surface.report.shortfalls();
    if !shortfalls.is_empty() {
        println!("Shortfalls:");
        for s in shortfalls {
            println!("  {}", s);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let ascii_mode = match args.ascii.as_deref().map(|name| (name, AsciiMode::from_name(name))) {
        Some((name, None)) => {
            eprintln!("Error: unknown ascii mode '{}'", name);
            process::exit(2);
        }
        Some((_, mode)) => mode,
        None => None,
    };

    let params = match build_params(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let generator = match SurfaceGenerator::new(params) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let mut last_stage = None;
    let surface = generator.generate_with_progress(&mut |p| {
        if last_stage != Some(p.stage) && p.stage != GenerationStage::Complete {
            log::info!("Stage: {}", p.stage);
            last_stage = Some(p.stage);
        }
    });

    print_summary(&surface);

    if let Some(mode) = ascii_mode {
        println!();
        ascii::print_ascii_map(&surface, mode);
    }

    let mut failed = false;
    if let Some(path) = &args.export_json {
        match export::export_json(&surface, path) {
            Ok(()) => println!("Exported tiles to {}", path),
            Err(e) => {
                eprintln!("Error exporting {}: {}", path, e);
                failed = true;
            }
        }
    }
    if let Some(path) = &args.export_png {
        match export::export_biome_png(&surface, path) {
            Ok(()) => println!("Exported biome map to {}", path),
            Err(e) => {
                eprintln!("Error exporting {}: {}", path, e);
                failed = true;
            }
        }
    }
    if let Some(path) = &args.export_elevation_png {
        match export::export_elevation_png(&surface, path) {
            Ok(()) => println!("Exported elevation map to {}", path),
            Err(e) => {
                eprintln!("Error exporting {}: {}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
