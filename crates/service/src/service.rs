use crate::config::TilemapConfig;
use glam::Vec2;
use std::collections::BTreeMap;
use tilespace_collision::{
    mesh_chunk, Contact, ContactRouter, PhysicsAdapter, RegionHandle, StaticRegion,
};
use tilespace_common::{ChunkCoord, Tile, TileType};
use tilespace_kernel::{ChangeTracker, GridError, TileGrid};
use tilespace_render::{visible_chunks, CameraRect, ImageLookup, RenderCache, RgbaSurface};
use tilespace_sync::{AppliedSync, NetworkSync, SyncPayload};

/// One chunk image ready for the host to draw at a world position.
#[derive(Debug)]
pub struct ChunkDraw<'a> {
    pub chunk: ChunkCoord,
    /// World position of the chunk's top-left corner.
    pub position: Vec2,
    pub image: &'a RgbaSurface,
}

/// The tilemap orchestrator.
///
/// Owns the grid, change tracking, render cache, and the physics handle
/// table. Mutations flow through [`TilemapService::set_tile`]: the grid is
/// updated, the containing chunk's cache entry is staled, collision is
/// rebuilt synchronously when the change affects it, and the chunk is marked
/// for network retransmission.
///
/// Collaborators are injected, never located: physics is bound with
/// [`TilemapService::bind_physics`], the image lookup is passed to each
/// render call, and the world origin is supplied per frame by the host's
/// transform layer.
pub struct TilemapService {
    grid: TileGrid,
    config: TilemapConfig,
    tracker: ChangeTracker,
    cache: RenderCache,
    sync: NetworkSync,
    router: ContactRouter,
    origin: Vec2,
    physics: Option<Box<dyn PhysicsAdapter>>,
    handles: BTreeMap<ChunkCoord, Vec<RegionHandle>>,
}

impl TilemapService {
    pub fn new(grid: TileGrid, config: TilemapConfig) -> Self {
        Self {
            grid,
            config,
            tracker: ChangeTracker::new(),
            cache: RenderCache::new(),
            sync: NetworkSync::new(),
            router: ContactRouter::new(),
            origin: Vec2::ZERO,
            physics: None,
            handles: BTreeMap::new(),
        }
    }

    /// A service over a grid of empty tiles with default tuning.
    pub fn with_empty_grid(width: u32, height: u32, tile_size: u32) -> Self {
        Self::new(TileGrid::empty(width, height, tile_size), TilemapConfig::default())
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &TilemapConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn sync_version(&self) -> u64 {
        self.sync.sync_version()
    }

    pub fn last_sync_version(&self) -> u64 {
        self.sync.last_sync_version()
    }

    /// Total static regions currently registered with the physics adapter.
    pub fn registered_region_count(&self) -> usize {
        self.handles.values().map(Vec::len).sum()
    }

    // --- collaborators ---

    /// Bind the physics collaborator and build collision for the whole grid.
    pub fn bind_physics(&mut self, physics: Box<dyn PhysicsAdapter>) {
        self.physics = Some(physics);
        self.rebuild_all_collision();
    }

    /// Detach the physics collaborator, retracting every registered region
    /// first. Returns the adapter so the host can reuse it.
    pub fn detach_physics(&mut self) -> Option<Box<dyn PhysicsAdapter>> {
        let mut physics = self.physics.take()?;
        for handles in std::mem::take(&mut self.handles).into_values() {
            for handle in handles {
                physics.remove_static_region(handle);
            }
        }
        Some(physics)
    }

    /// Supply the tilemap's world origin for this frame. A moved origin
    /// shifts every region, so collision is rebuilt from scratch.
    pub fn set_origin(&mut self, origin: Vec2) {
        if origin == self.origin {
            return;
        }
        self.origin = origin;
        self.rebuild_all_collision();
    }

    /// Subscribe a contact handler for one tile type.
    pub fn on_contact(&mut self, tile_type: TileType, handler: impl FnMut(&Contact) + 'static) {
        self.router.on_contact(tile_type, handler);
    }

    /// Route one host-observed contact to its subscribers.
    pub fn dispatch_contact(&mut self, contact: &Contact) -> usize {
        self.router.dispatch(contact)
    }

    // --- tile access ---

    pub fn get_tile(&self, x: i32, y: i32) -> Result<&Tile, GridError> {
        self.grid.get(x, y)
    }

    /// Replace the tile at (x, y) and propagate: cache staled, collision
    /// rebuilt if the change affects it, chunk marked for network sync.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> Result<(), GridError> {
        self.apply_tile(x, y, tile, true)
    }

    fn apply_tile(&mut self, x: i32, y: i32, tile: Tile, propagate: bool) -> Result<(), GridError> {
        let new_key = (tile.collision_enabled, tile.tile_type);
        let old = self.grid.set(x, y, tile)?;
        let chunk = self.grid.chunk_of(x, y);
        self.cache.invalidate(chunk);

        // A collision rebuild is needed iff the collision flag or type moved.
        if (old.collision_enabled, old.tile_type) != new_key {
            self.tracker.mark_collision_dirty(chunk);
            self.flush_collision();
        }

        if propagate && self.config.sync_enabled {
            self.tracker.mark_network_dirty(chunk);
            self.sync.bump();
        }
        Ok(())
    }

    /// Tile coordinate containing a world position, relative to the origin.
    pub fn world_to_tile(&self, position: Vec2) -> (i32, i32) {
        let ts = self.grid.tile_size() as f32;
        (
            ((position.x - self.origin.x) / ts).floor() as i32,
            ((position.y - self.origin.y) / ts).floor() as i32,
        )
    }

    pub fn tile_at_world(&self, position: Vec2) -> Result<&Tile, GridError> {
        let (x, y) = self.world_to_tile(position);
        self.grid.get(x, y)
    }

    pub fn set_tile_at_world(&mut self, position: Vec2, tile: Tile) -> Result<(), GridError> {
        let (x, y) = self.world_to_tile(position);
        self.set_tile(x, y, tile)
    }

    // --- bulk I/O ---

    /// Load the whole grid from a 2D id array. On shape mismatch the grid is
    /// untouched. Collision is rebuilt and every cache entry staled; the
    /// network set is deliberately not seeded — use
    /// [`TilemapService::mark_all_network_dirty`] for that.
    pub fn load_from_data(
        &mut self,
        rows: &[Vec<u8>],
        mapping: &BTreeMap<u8, Tile>,
    ) -> Result<(), GridError> {
        self.grid.load_from_data(rows, mapping)?;
        self.cache.invalidate_all();
        for chunk in self.grid.chunk_coords() {
            self.tracker.mark_collision_dirty(chunk);
        }
        self.flush_collision();
        Ok(())
    }

    pub fn to_data_array(&self) -> Vec<Vec<u8>> {
        self.grid.to_data_array()
    }

    /// Queue every chunk for retransmission (e.g. after a bulk load), with
    /// one version step so receivers do not treat the seed as stale.
    pub fn mark_all_network_dirty(&mut self) {
        let chunks: Vec<ChunkCoord> = self.grid.chunk_coords().collect();
        self.tracker.mark_all_network_dirty(chunks);
        self.sync.bump();
    }

    // --- rendering ---

    /// Composite and return the camera-visible chunks. Stale entries are
    /// rebuilt; fresh ones are served as cached.
    pub fn render(&mut self, camera: Option<CameraRect>, lookup: &dyn ImageLookup) -> Vec<ChunkDraw<'_>> {
        let chunks = visible_chunks(&self.grid, self.origin, camera);
        for &chunk in &chunks {
            self.cache.ensure_built(&self.grid, chunk, lookup);
        }
        let span = (self.grid.chunk_size() * self.grid.tile_size()) as f32;
        chunks
            .into_iter()
            .filter_map(|chunk| {
                let image = self.cache.get(chunk)?;
                Some(ChunkDraw {
                    chunk,
                    position: self.origin + Vec2::new(chunk.x as f32 * span, chunk.y as f32 * span),
                    image,
                })
            })
            .collect()
    }

    // --- collision ---

    /// Rebuild collision for every chunk. Pending dirty marks are consumed;
    /// without a bound physics adapter they stay queued for the next bind.
    pub fn rebuild_all_collision(&mut self) {
        if self.physics.is_none() {
            for chunk in self.grid.chunk_coords() {
                self.tracker.mark_collision_dirty(chunk);
            }
            return;
        }
        let _span = tracing::debug_span!("rebuild_all_collision").entered();
        let chunks: Vec<ChunkCoord> = self.grid.chunk_coords().collect();
        for chunk in chunks {
            self.rebuild_chunk(chunk);
        }
        self.tracker.clear_all_collision_dirty();
    }

    /// Rebuild every collision-dirty chunk, if a physics adapter is bound.
    fn flush_collision(&mut self) {
        if self.physics.is_none() {
            return;
        }
        let dirty: Vec<ChunkCoord> = self.tracker.collision_dirty().iter().copied().collect();
        for chunk in dirty {
            self.rebuild_chunk(chunk);
            self.tracker.clear_collision_dirty(chunk);
        }
    }

    /// Remove-then-add: the chunk's old regions are retracted before any new
    /// region is registered, so the two sets never coexist in the space.
    fn rebuild_chunk(&mut self, chunk: ChunkCoord) {
        let Some(physics) = self.physics.as_deref_mut() else {
            return;
        };
        if let Some(old) = self.handles.remove(&chunk) {
            for handle in old {
                physics.remove_static_region(handle);
            }
        }
        if !self.config.collision_enabled {
            return;
        }

        let regions = mesh_chunk(&self.grid, chunk);
        let tile_size = self.grid.tile_size();
        let mut handles = Vec::with_capacity(regions.len());
        for region in &regions {
            let static_region = StaticRegion {
                center: region.world_center(self.origin, tile_size),
                size: region.world_size(tile_size),
                tile_type: region.tile_type,
                collision_type: self.config.collision_type,
                friction: self.config.friction,
                elasticity: self.config.elasticity,
            };
            handles.push(physics.add_static_region(&static_region));
        }
        tracing::trace!(
            chunk_x = chunk.x,
            chunk_y = chunk.y,
            regions = handles.len(),
            "rebuilt chunk collision"
        );
        if !handles.is_empty() {
            self.handles.insert(chunk, handles);
        }
    }

    // --- network ---

    /// Drain the network-dirty set and serialize it. `None` when sync is
    /// disabled or nothing is pending; the dirty set is only consumed when a
    /// payload is actually produced.
    pub fn serialize_dirty(&mut self) -> Option<SyncPayload> {
        if !self.config.sync_enabled || !self.tracker.has_network_dirty() {
            return None;
        }
        let dirty = self.tracker.drain_network_dirty();
        Some(self.sync.serialize(&self.grid, &self.config.tuning(), &dirty))
    }

    /// Apply a raw JSON payload from the transport. A payload that does not
    /// parse is logged and dropped; the sync pass carries on.
    pub fn apply_json(&mut self, json: &str) -> Option<AppliedSync> {
        match SyncPayload::from_json(json) {
            Ok(payload) => Some(self.apply_payload(&payload)),
            Err(err) => {
                tracing::warn!(%err, "discarding malformed sync payload");
                None
            }
        }
    }

    /// Apply a remote payload: tiles land with outbound propagation
    /// suppressed, then collision is rebuilt and caches staled for exactly
    /// the touched chunks.
    pub fn apply_payload(&mut self, payload: &SyncPayload) -> AppliedSync {
        let outcome = self.sync.apply(&mut self.grid, payload);
        for &chunk in &outcome.touched {
            self.cache.invalidate(chunk);
            self.tracker.mark_collision_dirty(chunk);
        }
        self.flush_collision();
        outcome
    }
}

impl std::fmt::Debug for TilemapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilemapService")
            .field("grid", &(self.grid.width(), self.grid.height()))
            .field("origin", &self.origin)
            .field("physics_bound", &self.physics.is_some())
            .field("registered_regions", &self.registered_region_count())
            .field("sync_version", &self.sync.sync_version())
            .finish()
    }
}
