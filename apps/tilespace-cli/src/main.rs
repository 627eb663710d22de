use clap::{Parser, Subcommand};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use tilespace_collision::RecordingPhysics;
use tilespace_common::{Tile, TileType};
use tilespace_kernel::TileGrid;
use tilespace_render::{CameraRect, TextureTable};
use tilespace_service::{TilemapConfig, TilemapService};

#[derive(Parser)]
#[command(name = "tilespace-cli", about = "CLI tool for tilespace demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Build a demo terrain and report collision meshing statistics
    Mesh {
        /// Grid width in tiles
        #[arg(long, default_value = "64")]
        width: u32,
        /// Grid height in tiles
        #[arg(long, default_value = "32")]
        height: u32,
        /// Chunk size in tiles
        #[arg(long, default_value = "16")]
        chunk_size: u32,
    },
    /// Run a sync round-trip between two services and diff the grids
    Sync {
        /// Number of random-ish edits to apply before syncing
        #[arg(short, long, default_value = "24")]
        edits: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tilespace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("collision: {}", tilespace_collision::crate_info());
            println!("render: {}", tilespace_render::crate_info());
            println!("sync: {}", tilespace_sync::crate_info());
            println!("service: {}", tilespace_service::crate_info());
        }
        Commands::Mesh {
            width,
            height,
            chunk_size,
        } => {
            let grid = TileGrid::with_chunk_size(width, height, 32, Tile::default(), chunk_size);
            let mut service = TilemapService::new(grid, TilemapConfig::default());
            let physics = Rc::new(RefCell::new(RecordingPhysics::new()));
            service.bind_physics(Box::new(Rc::clone(&physics)));

            seed_terrain(&mut service)?;

            let solid_tiles = service
                .grid()
                .count_tiles(|t| t.collision_enabled && t.tile_type != TileType::Empty);
            let regions = service.registered_region_count();
            println!("Terrain: {width}x{height} tiles, chunk size {chunk_size}");
            println!("Collidable tiles: {solid_tiles}");
            println!(
                "Static regions: {regions} ({:.1} tiles/region)",
                solid_tiles as f32 / regions.max(1) as f32
            );

            let visible = service.render(
                Some(CameraRect::new(Vec2::ZERO, Vec2::new(640.0, 360.0))),
                &TextureTable::new(),
            );
            println!("Chunks composited for a 640x360 camera: {}", visible.len());
        }
        Commands::Sync { edits } => {
            let mut sender = TilemapService::with_empty_grid(64, 32, 32);
            let mut receiver = TilemapService::with_empty_grid(64, 32, 32);

            // Deterministic pseudo-random edit walk.
            let mut state: u32 = 0x2545_f491;
            for _ in 0..edits {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let x = (state >> 8) % 64;
                let y = (state >> 16) % 32;
                let tile_type = TileType::from_id(1 + (state % 6) as u8).unwrap_or(TileType::Solid);
                sender.set_tile(x as i32, y as i32, Tile::of_type(tile_type))?;
            }

            let Some(payload) = sender.serialize_dirty() else {
                println!("No edits queued, nothing to sync");
                return Ok(());
            };
            let json = payload.to_json()?;
            println!(
                "Payload: version {}, {} chunks, {} tile records, {} bytes of JSON",
                payload.sync_version,
                payload.chunks.len(),
                payload.record_count(),
                json.len()
            );

            let outcome = receiver.apply_payload(&payload);
            println!(
                "Applied: {} records, {} skipped, {} chunks touched",
                outcome.applied,
                outcome.skipped,
                outcome.touched.len()
            );

            let differences = sender
                .to_data_array()
                .into_iter()
                .flatten()
                .zip(receiver.to_data_array().into_iter().flatten())
                .filter(|(a, b)| a != b)
                .count();
            println!(
                "Grid diff after apply: {differences} tiles ({})",
                if differences == 0 { "OK" } else { "MISMATCH" }
            );
        }
    }

    Ok(())
}

/// Flat ground with evenly spaced pillars and a liquid pool.
fn seed_terrain(service: &mut TilemapService) -> anyhow::Result<()> {
    let (width, height) = (service.grid().width() as i32, service.grid().height() as i32);
    for x in 0..width {
        for y in height - 4..height {
            service.set_tile(x, y, Tile::of_type(TileType::Solid))?;
        }
    }
    for x in (4..width).step_by(9) {
        for y in height - 8..height - 4 {
            service.set_tile(x, y, Tile::of_type(TileType::Solid))?;
        }
    }
    for x in width / 2..(width / 2 + 6).min(width) {
        service.set_tile(x, height - 5, Tile::of_type(TileType::Liquid))?;
    }
    Ok(())
}
