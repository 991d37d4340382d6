//! Configuration for the Strata terrain baker.
//!
//! Settings persist to disk as a RON file, every section falls back to its
//! defaults when missing, and command-line flags override the loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BakeConfig, CONFIG_FILE, Config, DebugConfig, FbmConfig, LodConfig, LodScheduleConfig,
    SourceConfig, TilesConfig, TriangulationConfig,
};
pub use error::ConfigError;
