//! Tilemap service: owns the grid and change tracking, drives collision
//! rebuilds and cache invalidation on mutation, and feeds the sync layer.
//!
//! # Invariants
//! - Collaborators are injected; nothing here discovers a physics world or
//!   asset store on its own.
//! - On a chunk rebuild, old regions are retracted before new ones are
//!   added.
//! - Applying a remote payload never marks chunks dirty for outbound sync.
//!
//! Single-threaded by design: one service instance exclusively owns its
//! state, and every operation completes inline within the calling frame.
//! Embedders with concurrent writers must serialize access externally.

pub mod config;
pub mod service;

pub use config::TilemapConfig;
pub use service::{ChunkDraw, TilemapService};

pub fn crate_info() -> &'static str {
    "tilespace-service v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("service"));
    }
}
