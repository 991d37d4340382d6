//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE: &str = "strata.ron";

/// Top-level baker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Triangulator stop conditions.
    pub triangulation: TriangulationConfig,
    /// Level-of-detail schedule.
    pub lod: LodConfig,
    /// Tile partitioning.
    pub tiles: TilesConfig,
    /// Where elevations come from.
    pub source: SourceConfig,
    /// Output and parallelism.
    pub bake: BakeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Triangulator stop conditions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriangulationConfig {
    /// Error floor in elevation units; refinement never goes below it.
    pub min_error: f32,
    /// Triangle cap per tile (0 = unlimited).
    pub max_triangles: u32,
    /// Point cap per tile (0 = unlimited).
    pub max_points: u32,
}

/// How successive levels of detail are cut.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LodScheduleConfig {
    /// Error thresholds, coarse to fine (strictly descending).
    Errors(Vec<f32>),
    /// Triangle budgets, coarse to fine (strictly ascending).
    Budgets(Vec<u32>),
}

/// Level-of-detail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// One entry per level; level 0 is the coarsest.
    pub schedule: LodScheduleConfig,
    /// Match tile boundaries against neighbors instead of stitching every
    /// boundary cell.
    pub rivets: bool,
}

/// Tile partitioning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TilesConfig {
    /// Samples per tile edge, shared edges included, in 2..=256.
    ///
    /// Neighboring tiles share a row or column, so a `2^k + 1` source splits
    /// evenly when `tile_size - 1` divides `2^k`.
    pub tile_size: u32,
}

/// Synthetic terrain parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FbmConfig {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency of the first octave in cycles per sample.
    pub base_frequency: f64,
    /// Amplitude of the first octave in elevation units.
    pub amplitude: f64,
}

/// Elevation source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Grayscale PNG heightmap. When unset, terrain is synthesized.
    pub heightmap: Option<PathBuf>,
    /// Multiplier from normalized PNG samples to elevation units.
    pub vertical_scale: f32,
    /// Synthesized grid width in tiles.
    pub tiles_x: u32,
    /// Synthesized grid height in tiles.
    pub tiles_y: u32,
    /// Synthesized terrain shape.
    pub fbm: FbmConfig,
}

/// Output and parallelism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BakeConfig {
    /// Worker threads (0 = one per logical CPU).
    pub worker_threads: u32,
    /// Directory receiving tile buffers and documents.
    pub output_dir: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            min_error: 0.5,
            max_triangles: 0,
            max_points: 0,
        }
    }
}

impl Default for LodScheduleConfig {
    fn default() -> Self {
        Self::Errors(vec![16.0, 8.0, 4.0, 2.0, 1.0])
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            schedule: LodScheduleConfig::default(),
            rivets: true,
        }
    }
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self { tile_size: 129 }
    }
}

impl Default for FbmConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.0 / 256.0,
            amplitude: 64.0,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            heightmap: None,
            vertical_scale: 255.0,
            tiles_x: 4,
            tiles_y: 4,
            fbm: FbmConfig::default(),
        }
    }
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            output_dir: PathBuf::from("baked"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject settings the baker cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let size = self.tiles.tile_size;
        if !(2..=256).contains(&size) {
            return invalid(format!("tile_size must be in 2..=256, got {size}"));
        }

        let floor = self.triangulation.min_error;
        if floor.is_nan() || floor < 0.0 {
            return invalid(format!("min_error must be non-negative, got {floor}"));
        }

        match &self.lod.schedule {
            LodScheduleConfig::Errors(thresholds) => {
                if thresholds.is_empty() {
                    return invalid("lod schedule has no levels".to_string());
                }
                if let Some(t) = thresholds.iter().find(|&&t| t.is_nan() || t <= floor) {
                    return invalid(format!(
                        "lod threshold {t} must be greater than min_error {floor}"
                    ));
                }
                if let Some(w) = thresholds.windows(2).find(|w| w[1] >= w[0]) {
                    return invalid(format!(
                        "lod thresholds must strictly decrease: {} then {}",
                        w[0], w[1]
                    ));
                }
            }
            LodScheduleConfig::Budgets(budgets) => {
                if budgets.is_empty() {
                    return invalid("lod schedule has no levels".to_string());
                }
                if budgets[0] == 0 {
                    return invalid("lod budgets must be non-zero".to_string());
                }
                if let Some(w) = budgets.windows(2).find(|w| w[1] <= w[0]) {
                    return invalid(format!(
                        "lod budgets must strictly increase: {} then {}",
                        w[0], w[1]
                    ));
                }
            }
        }

        if self.source.heightmap.is_none() && (self.source.tiles_x == 0 || self.source.tiles_y == 0)
        {
            return invalid("synthetic source needs at least one tile per axis".to_string());
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as [`CONFIG_FILE`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: returns `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Default config directory: the platform config dir joined with `strata`.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
    }
}
