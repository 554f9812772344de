//! raster-tiler - Multi-resolution tile pyramids for raster images.
//!
//! This binary inspects rasters and writes single tiles or whole pyramids
//! as PNG files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raster_tiler::{
    config::{Cli, Command, InfoConfig, PyramidConfig, TileConfig},
    raster::{FileRaster, RasterSource},
    tile::{PngTileEncoder, TileCache, TileGenerator, TileLocator, TileService},
    TileError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Info(config) => run_info(config),
        Command::Tile(config) => run_tile(config),
        Command::Pyramid(config) => run_pyramid(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "raster_tiler=debug"
    } else {
        "raster_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_generator(path: &Path, block_size: u32) -> Option<TileGenerator<FileRaster>> {
    match TileGenerator::open(path, block_size) {
        Ok(generator) => Some(generator),
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            None
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    let Some(generator) = open_generator(&config.path, config.block_size) else {
        return ExitCode::FAILURE;
    };
    let info = generator.source().info();
    let num_levels = generator.num_levels();

    if config.json {
        let levels: Vec<_> = (0..num_levels)
            .filter_map(|level| {
                let (width, height) = generator.level_dimensions(level)?;
                let (tiles_x, tiles_y) = generator.tiles_at_level(level)?;
                Some(serde_json::json!({
                    "level": level,
                    "width": width,
                    "height": height,
                    "tiles_x": tiles_x,
                    "tiles_y": tiles_y,
                }))
            })
            .collect();
        let json = serde_json::json!({
            "raster": info,
            "num_levels": num_levels,
            "levels": levels,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize info: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Raster: {}", info.identifier);
    println!("  Size:     {} x {} ({} plane(s))", info.cols, info.rows, info.planes);
    println!("  Pixels:   {}/{}", info.pixel_format, info.channel_type);
    println!("  Tile:     {} x {}", info.tile_width, info.tile_height);
    println!("  Levels:   {}", num_levels);
    for level in 0..num_levels {
        if let (Some((width, height)), Some((tiles_x, tiles_y))) = (
            generator.level_dimensions(level),
            generator.tiles_at_level(level),
        ) {
            println!(
                "    {:>2}: {} x {} px, {} x {} tiles",
                level, width, height, tiles_x, tiles_y
            );
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Tile Command
// =============================================================================

fn run_tile(config: TileConfig) -> ExitCode {
    let Some(generator) = open_generator(&config.path, config.block_size) else {
        return ExitCode::FAILURE;
    };
    let locator = TileLocator::new(config.col, config.row, config.level);

    let encoded = generator
        .generate_tile(locator)
        .and_then(|tile| PngTileEncoder::new().encode(&tile));
    let encoded = match encoded {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to generate tile {}: {}", locator, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(&config.output, &encoded) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote tile {} ({} bytes) to {}",
        locator,
        encoded.len(),
        config.output.display()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Pyramid Command
// =============================================================================

async fn run_pyramid(config: PyramidConfig) -> ExitCode {
    let path = config.path.clone();
    let block_size = config.block_size;
    let generator = match tokio::task::spawn_blocking(move || open_generator(&path, block_size)).await {
        Ok(Some(generator)) => generator,
        Ok(None) => return ExitCode::FAILURE,
        Err(e) => {
            error!("Decode task failed for {}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let num_levels = generator.num_levels();

    info!("Configuration:");
    info!("  Output: {}", config.output_dir.display());
    info!("  Levels: {}", num_levels);
    info!("  Workers: {}", config.workers);
    info!("  Cache: {}MB", config.cache_bytes / (1024 * 1024));

    let service = Arc::new(TileService::with_cache(
        Arc::new(generator),
        TileCache::with_capacity(config.cache_bytes),
    ));
    let encoder = PngTileEncoder::new();
    let started = Instant::now();

    let mut tasks = JoinSet::new();
    let mut written = 0usize;
    let mut failed = 0usize;

    for level in 0..num_levels {
        let Some((tiles_x, tiles_y)) = service.generator().tiles_at_level(level) else {
            continue;
        };
        let level_dir = config.output_dir.join(level.to_string());
        if let Err(e) = tokio::fs::create_dir_all(&level_dir).await {
            error!("Failed to create {}: {}", level_dir.display(), e);
            return ExitCode::FAILURE;
        }
        debug!(level, tiles_x, tiles_y, "Generating level");

        for row in 0..tiles_y {
            for col in 0..tiles_x {
                while tasks.len() >= config.workers {
                    record(tasks.join_next().await, &mut written, &mut failed);
                }

                let service = Arc::clone(&service);
                let path = level_dir.join(format!("{}_{}.png", col, row));
                let locator = TileLocator::new(col, row, level);
                tasks.spawn(write_tile(service, encoder, locator, path));
            }
        }
    }

    while let Some(result) = tasks.join_next().await {
        record(Some(result), &mut written, &mut failed);
    }

    let (cache_size, _, cache_entries) = service.cache_stats().await;
    info!(
        "Wrote {} tile(s) in {:.2?} ({} cached, {} bytes)",
        written,
        started.elapsed(),
        cache_entries,
        cache_size
    );

    if failed > 0 {
        error!("{} tile(s) failed", failed);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Generate, encode and write one tile.
async fn write_tile<R: RasterSource + 'static>(
    service: Arc<TileService<R>>,
    encoder: PngTileEncoder,
    locator: TileLocator,
    path: PathBuf,
) -> Result<(), String> {
    let response = service
        .get_tile(locator)
        .await
        .map_err(|e| format!("tile {}: {}", locator, e))?;
    let encoded = encoder
        .encode(&response.tile)
        .map_err(|e: TileError| format!("tile {}: {}", locator, e))?;
    tokio::fs::write(&path, &encoded)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))
}

fn record(
    result: Option<Result<Result<(), String>, tokio::task::JoinError>>,
    written: &mut usize,
    failed: &mut usize,
) {
    match result {
        Some(Ok(Ok(()))) => *written += 1,
        Some(Ok(Err(e))) => {
            error!("Failed to write {}", e);
            *failed += 1;
        }
        Some(Err(e)) => {
            error!("Tile task failed: {}", e);
            *failed += 1;
        }
        None => {}
    }
}
