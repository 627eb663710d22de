use crate::wire::{chunk_key, parse_chunk_key, SyncPayload, TileRecord};
use std::collections::{BTreeMap, BTreeSet};
use tilespace_common::ChunkCoord;
use tilespace_kernel::TileGrid;

/// Scalar tuning carried alongside tile data on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncTuning {
    pub collision_enabled: bool,
    pub collision_type: u32,
    pub friction: f32,
    pub elasticity: f32,
}

/// Result of applying a payload: which chunks were touched and how many
/// records were applied or skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedSync {
    pub touched: BTreeSet<ChunkCoord>,
    pub applied: usize,
    pub skipped: usize,
}

/// Versioned sync state for one tilemap endpoint.
///
/// `sync_version` counts outbound mutations and only grows.
/// `last_sync_version` records the highest version seen from the remote; a
/// lower incoming version is logged and applied anyway, but the floor never
/// moves backwards. Anything stronger than chunk-granular last-writer-wins
/// (per-tile timestamps, merge) is deliberately out of scope.
#[derive(Debug, Clone, Default)]
pub struct NetworkSync {
    sync_version: u64,
    last_sync_version: u64,
}

impl NetworkSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the next outbound payload.
    pub fn sync_version(&self) -> u64 {
        self.sync_version
    }

    /// Highest version applied from the remote.
    pub fn last_sync_version(&self) -> u64 {
        self.last_sync_version
    }

    /// Record one outbound mutation. Returns the new version.
    pub fn bump(&mut self) -> u64 {
        self.sync_version += 1;
        self.sync_version
    }

    /// Serialize the given chunks in full: every tile in each chunk, plus
    /// grid invariants and tuning.
    pub fn serialize(
        &self,
        grid: &TileGrid,
        tuning: &SyncTuning,
        chunks: &BTreeSet<ChunkCoord>,
    ) -> SyncPayload {
        let mut chunk_map = BTreeMap::new();
        for &chunk in chunks {
            let bounds = grid.chunk_bounds(chunk);
            let mut records = Vec::with_capacity((bounds.width() * bounds.height()) as usize);
            for (x, y) in bounds.tiles() {
                if let Ok(tile) = grid.get(x, y) {
                    records.push(TileRecord {
                        x,
                        y,
                        data: tile.clone(),
                    });
                }
            }
            chunk_map.insert(chunk_key(chunk), records);
        }
        tracing::debug!(
            chunks = chunk_map.len(),
            version = self.sync_version,
            "serialized sync payload"
        );
        SyncPayload {
            width: grid.width(),
            height: grid.height(),
            tile_size: grid.tile_size(),
            chunk_size: grid.chunk_size(),
            collision_enabled: tuning.collision_enabled,
            collision_type: tuning.collision_type,
            friction: tuning.friction,
            elasticity: tuning.elasticity,
            sync_version: self.sync_version,
            chunks: chunk_map,
        }
    }

    /// Apply a remote payload to the grid.
    ///
    /// Best-effort: malformed keys and out-of-range records are logged and
    /// skipped without aborting the pass. Writes go straight to the grid, so
    /// nothing here re-marks chunks dirty for outbound sync — echo loops are
    /// impossible by construction. The caller rebuilds collision and
    /// invalidates render caches for the returned `touched` set.
    pub fn apply(&mut self, grid: &mut TileGrid, payload: &SyncPayload) -> AppliedSync {
        if payload.width != grid.width()
            || payload.height != grid.height()
            || payload.chunk_size != grid.chunk_size()
        {
            tracing::warn!(
                payload_width = payload.width,
                payload_height = payload.height,
                payload_chunk_size = payload.chunk_size,
                "sync payload grid invariants differ; applying records that fit"
            );
        }
        if payload.sync_version < self.last_sync_version {
            tracing::warn!(
                payload_version = payload.sync_version,
                recorded = self.last_sync_version,
                "stale sync version; applying with last-writer-wins"
            );
        }
        self.last_sync_version = self.last_sync_version.max(payload.sync_version);

        let mut outcome = AppliedSync::default();
        for (key, records) in &payload.chunks {
            if parse_chunk_key(key).is_none() {
                tracing::warn!(key, "malformed chunk key in sync payload");
                outcome.skipped += records.len();
                continue;
            }
            for record in records {
                match grid.set(record.x, record.y, record.data.clone()) {
                    Ok(_) => {
                        outcome.touched.insert(grid.chunk_of(record.x, record.y));
                        outcome.applied += 1;
                    }
                    Err(err) => {
                        tracing::warn!(%err, "sync record rejected");
                        outcome.skipped += 1;
                    }
                }
            }
        }
        tracing::debug!(
            applied = outcome.applied,
            skipped = outcome.skipped,
            touched = outcome.touched.len(),
            "applied sync payload"
        );
        outcome
    }
}
