//! Evolution headless entry point
//!
//! Populates a walled arena with random bacteria and runs the fixed-rate
//! loop until one character is left or the frame budget runs out.
//!
//! Usage: `evolution [config.json] [seed]`

use std::process;

use evolution::consts::{FPS, FRAME_MS};
use evolution::sim::{Arena, Catalog, Vector2};
use evolution::{AssemblyError, SimulationConfig};

/// Characters spawned at startup
const POPULATION: usize = 12;
/// Frames simulated before giving up (five minutes of game time)
const FRAME_BUDGET: u64 = FPS as u64 * 300;
/// Half extents of the walled play area
const ARENA_HALF: Vector2 = Vector2::new(160.0, 120.0);
const WALL_THICKNESS: f64 = 20.0;

fn load_config(path: Option<&str>) -> SimulationConfig {
    let Some(path) = path else {
        return SimulationConfig::default();
    };
    match std::fs::read_to_string(path) {
        Ok(json) => SimulationConfig::from_json_or_default(&json),
        Err(e) => {
            log::warn!("Could not read config {}: {} - using defaults", path, e);
            SimulationConfig::default()
        }
    }
}

fn build_arena(config: SimulationConfig, seed: u64) -> Result<Arena, AssemblyError> {
    let catalog = Catalog::builtin()?;
    log::info!(
        "Loaded {} archetypes: {}",
        catalog.len(),
        catalog.names().collect::<Vec<_>>().join(", ")
    );

    let mut arena = Arena::new(config);
    arena.spawn_walls(ARENA_HALF, WALL_THICKNESS)?;
    arena.spawn_prop("crate", Vector2::new(40.0, -30.0), Vector2::splat(10.0))?;
    arena.populate(&catalog, seed, POPULATION, ARENA_HALF * 0.8)?;
    Ok(arena)
}

fn main() {
    env_logger::init();
    log::info!("Evolution (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str));
    let seed = match args.get(1).map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {}", e);
            process::exit(2);
        }
        None => 0,
    };
    log::info!("Physics preset: {}, seed {}", config.preset.as_str(), seed);

    let mut arena = match build_arena(config, seed) {
        Ok(arena) => arena,
        Err(e) => {
            log::error!("Failed to build arena: {}", e);
            process::exit(1);
        }
    };

    let mut total_hits = 0;
    while arena.frame < FRAME_BUDGET && arena.characters().count() > 1 {
        let report = arena.tick(FRAME_MS);
        total_hits += report.hits.len();
        if arena.frame % (FPS as u64 * 10) == 0 {
            log::info!(
                "t = {:.0} s: {} characters alive, {} hits so far",
                arena.time_ms / 1000.0,
                arena.characters().count(),
                total_hits
            );
        }
    }

    log::info!(
        "Finished after {} frames ({:.1} s): {} characters left, {} hits",
        arena.frame,
        arena.time_ms / 1000.0,
        arena.characters().count(),
        total_hits
    );
    for character in arena.characters() {
        log::info!(
            "  {} at ({:.1}, {:.1}) hp {:.1}/{:.1}",
            character.name,
            character.position().x,
            character.position().y,
            character.hp().unwrap_or(0.0),
            character.max_hp().unwrap_or(0.0)
        );
    }
    match serde_json::to_string(&arena.snapshot()) {
        Ok(json) => log::debug!("Final snapshot: {}", json),
        Err(e) => log::warn!("Could not serialize snapshot: {}", e),
    }
}
