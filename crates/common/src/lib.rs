//! Shared types for the tilespace subsystem: tile values, chunk coordinates.
//!
//! # Invariants
//! - Tile type ids are frozen wire constants; they never renumber.
//! - Tiles are immutable values; edits replace them wholesale.

pub mod types;

pub use types::{ChunkBounds, ChunkCoord, Tile, TileType};
