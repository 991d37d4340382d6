//! Command-line argument parsing for the baker.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata baker command-line arguments.
///
/// CLI values override settings loaded from `strata.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata-bake", about = "Bake heightmaps into crack-free TIN tiles")]
pub struct CliArgs {
    /// Grayscale PNG heightmap to bake.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Output directory for tile buffers.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Samples per tile edge.
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Error floor of the triangulator.
    #[arg(long)]
    pub min_error: Option<f32>,

    /// Worker threads (0 = one per logical CPU).
    #[arg(long)]
    pub threads: Option<u32>,

    /// Seed for synthesized terrain.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Match boundaries against neighbors (true) or stitch every cell (false).
    #[arg(long)]
    pub rivets: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.heightmap {
            self.source.heightmap = Some(path.clone());
        }
        if let Some(ref dir) = args.output {
            self.bake.output_dir = dir.clone();
        }
        if let Some(size) = args.tile_size {
            self.tiles.tile_size = size;
        }
        if let Some(error) = args.min_error {
            self.triangulation.min_error = error;
        }
        if let Some(threads) = args.threads {
            self.bake.worker_threads = threads;
        }
        if let Some(seed) = args.seed {
            self.source.fbm.seed = seed;
        }
        if let Some(rivets) = args.rivets {
            self.lod.rivets = rivets;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
