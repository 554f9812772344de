//! Configuration management for raster-tiler.
//!
//! This module provides the command-line interface, which supports:
//! - Command-line arguments via clap
//! - Environment variables with `RTILER_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use raster_tiler::config::{Cli, Command};
//!
//! let cli = Cli::parse_from(["raster-tiler", "info", "scan.tif", "--json"]);
//! match cli.command {
//!     Command::Info(config) => assert!(config.json),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RTILER_BLOCK_SIZE` - Tile edge length in pixels (default: 256)
//! - `RTILER_WORKERS` - Concurrent tile requests for `pyramid` (default: 4)
//! - `RTILER_CACHE_BYTES` - Tile cache capacity in bytes (default: 64MB)
//! - `RTILER_OUTPUT_DIR` - Output directory for `pyramid`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::raster::DEFAULT_BLOCK_SIZE;
use crate::tile::DEFAULT_TILE_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default number of concurrent tile requests.
pub const DEFAULT_WORKERS: usize = 4;

// =============================================================================
// CLI Arguments
// =============================================================================

/// raster-tiler - Multi-resolution tile pyramids for raster images.
#[derive(Parser, Debug, Clone)]
#[command(name = "raster-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print raster metadata and pyramid geometry.
    Info(InfoConfig),

    /// Generate a single tile and write it as PNG.
    Tile(TileConfig),

    /// Generate every tile of every level into a directory tree.
    Pyramid(PyramidConfig),
}

impl Command {
    /// Validate the selected subcommand's arguments.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Info(config) => config.validate(),
            Command::Tile(config) => config.validate(),
            Command::Pyramid(config) => config.validate(),
        }
    }
}

fn validate_block_size(block_size: u32) -> Result<(), String> {
    if block_size == 0 {
        return Err("block_size must be greater than 0".to_string());
    }
    Ok(())
}

// =============================================================================
// Info
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Path to the raster image (PNG or TIFF).
    pub path: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, env = "RTILER_BLOCK_SIZE")]
    pub block_size: u32,

    /// Print as JSON instead of plain text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_block_size(self.block_size)
    }
}

// =============================================================================
// Tile
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct TileConfig {
    /// Path to the raster image (PNG or TIFF).
    pub path: PathBuf,

    /// Tile column (0-indexed from left).
    #[arg(long)]
    pub col: u32,

    /// Tile row (0-indexed from top).
    #[arg(long)]
    pub row: u32,

    /// Pyramid level (0 = coarsest).
    #[arg(long)]
    pub level: u32,

    /// Output PNG file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, env = "RTILER_BLOCK_SIZE")]
    pub block_size: u32,
}

impl TileConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_block_size(self.block_size)
    }
}

// =============================================================================
// Pyramid
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PyramidConfig {
    /// Path to the raster image (PNG or TIFF).
    pub path: PathBuf,

    /// Directory receiving `<level>/<col>_<row>.png`.
    #[arg(short, long, env = "RTILER_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, env = "RTILER_BLOCK_SIZE")]
    pub block_size: u32,

    /// Maximum number of tiles generated concurrently.
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "RTILER_WORKERS")]
    pub workers: usize,

    /// Tile cache capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "RTILER_CACHE_BYTES")]
    pub cache_bytes: usize,
}

impl PyramidConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_block_size(self.block_size)?;
        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }
        if self.cache_bytes == 0 {
            return Err("cache_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
