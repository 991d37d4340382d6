//! Elevation sources: grayscale PNG heightmaps and synthesized fBm terrain.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use strata_config::SourceConfig;
use strata_heightfield::{FbmParams, FbmSource, Heightfield};
use tracing::info;

use crate::error::BakeError;

/// Decode an 8- or 16-bit grayscale PNG, mapping full white to
/// `vertical_scale`.
///
/// # Errors
///
/// Returns [`BakeError::Io`] or [`BakeError::Png`] if the file cannot be
/// read or decoded, and [`BakeError::UnsupportedPng`] for color images.
pub fn load_png(path: &Path, vertical_scale: f32) -> Result<Heightfield, BakeError> {
    let file = File::open(path).map_err(BakeError::io(path))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    // Expands sub-byte grayscale to 8 bits; 16-bit stays 16-bit.
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    let bytes = &buffer[..frame.buffer_size()];

    let samples: Vec<f32> = match (frame.color_type, frame.bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => bytes
            .iter()
            .map(|&v| f32::from(v) / 255.0 * vertical_scale)
            .collect(),
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => bytes
            .chunks_exact(2)
            .map(|pair| {
                f32::from(u16::from_be_bytes([pair[0], pair[1]])) / 65535.0 * vertical_scale
            })
            .collect(),
        (color_type, bit_depth) => {
            return Err(BakeError::UnsupportedPng {
                color_type: format!("{color_type:?}"),
                bit_depth: bit_depth as u8,
            });
        }
    };

    info!(
        path = %path.display(),
        width = frame.width,
        height = frame.height,
        "loaded heightmap"
    );
    Ok(Heightfield::new(frame.width, frame.height, samples)?)
}

/// Rasterize fBm terrain sized for exactly `tiles_x x tiles_y` tiles.
///
/// # Errors
///
/// Returns [`BakeError::Heightfield`] if the resulting grid is degenerate.
pub fn synthesize(config: &SourceConfig, tile_size: u32) -> Result<Heightfield, BakeError> {
    let stride = tile_size.saturating_sub(1);
    let width = config.tiles_x * stride + 1;
    let height = config.tiles_y * stride + 1;
    let fbm = &config.fbm;
    let source = FbmSource::new(FbmParams {
        seed: fbm.seed,
        octaves: fbm.octaves,
        lacunarity: fbm.lacunarity,
        persistence: fbm.persistence,
        base_frequency: fbm.base_frequency,
        amplitude: fbm.amplitude,
    });
    info!(width, height, seed = fbm.seed, "synthesizing terrain");
    Ok(source.rasterize(width, height)?)
}

/// Load the configured heightmap, or synthesize terrain if none is set.
///
/// # Errors
///
/// See [`load_png`] and [`synthesize`].
pub fn load_source(config: &SourceConfig, tile_size: u32) -> Result<Heightfield, BakeError> {
    match &config.heightmap {
        Some(path) => load_png(path, config.vertical_scale),
        None => synthesize(config, tile_size),
    }
}
