//! Tile kernel: authoritative grid state and chunk-granular change tracking.
//!
//! # Invariants
//! - The grid is dense: every in-range coordinate holds a tile, never a hole.
//! - Out-of-range access is a boundary error, never a silent default.
//! - Collision and network dirtiness are tracked independently.

pub mod grid;
pub mod tracker;

pub use grid::{GridError, TileGrid};
pub use tracker::ChangeTracker;
