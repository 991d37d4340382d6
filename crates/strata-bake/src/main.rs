//! `strata-bake`: bake a heightmap (or synthesized terrain) into TIN tiles.
//!
//! Run with: `cargo run -p strata-bake -- --heightmap dem.png -o baked`

use std::process::ExitCode;

use clap::Parser;
use strata_bake::{BakeError, BakeSettings, WorkerPool, bake, load_source, write_artifacts};
use strata_config::{CliArgs, Config};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}; using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    strata_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("bake failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), BakeError> {
    let settings = BakeSettings::from_config(config)?;
    let source = load_source(&config.source, settings.tile_size)?;
    let pool = WorkerPool::new(config.bake.worker_threads as usize, "bake-worker");

    info!(
        tile_size = settings.tile_size,
        rivets = settings.rivets,
        threads = pool.threads(),
        "Strata bake"
    );
    let output = bake(&source, &settings, &pool)?;
    let manifest = write_artifacts(&output, &config.bake.output_dir)?;

    let triangles: usize = manifest
        .tiles
        .iter()
        .flat_map(|t| t.lods.iter().map(|l| l.triangles))
        .sum();
    info!(
        tiles = manifest.tiles.len(),
        triangles,
        output = %config.bake.output_dir.display(),
        "done"
    );
    Ok(())
}
