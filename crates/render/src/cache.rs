use crate::surface::{Rgba, RgbaSurface};
use std::collections::{BTreeMap, HashMap};
use tilespace_common::{ChunkCoord, TileType};
use tilespace_kernel::TileGrid;

/// The image/asset collaborator seam. Returning `None` is a normal fallback
/// path (procedural tile color), never an error.
pub trait ImageLookup {
    fn lookup(&self, reference: &str) -> Option<&RgbaSurface>;
}

/// Simple in-memory texture table; doubles as the test stand-in for a real
/// asset pipeline.
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    textures: BTreeMap<String, RgbaSurface>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: RgbaSurface) {
        self.textures.insert(reference.into(), image);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl ImageLookup for TextureTable {
    fn lookup(&self, reference: &str) -> Option<&RgbaSurface> {
        self.textures.get(reference)
    }
}

/// Flat procedural color for a tile type with no resolvable texture.
/// Empty composites nothing.
pub fn fallback_color(tile_type: TileType) -> Option<Rgba> {
    match tile_type {
        TileType::Empty => None,
        TileType::Solid => Some(Rgba::opaque(100, 100, 100)),
        TileType::Platform => Some(Rgba::opaque(150, 75, 0)),
        TileType::Ladder => Some(Rgba::opaque(139, 69, 19)),
        TileType::Hazard => Some(Rgba::opaque(255, 0, 0)),
        TileType::Liquid => Some(Rgba::opaque(0, 100, 255)),
        TileType::Slippery => Some(Rgba::opaque(200, 200, 255)),
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    image: RgbaSurface,
    stale: bool,
}

/// Per-chunk composited image cache.
///
/// Invalidation is chunk-granular: one tile change stales the whole
/// containing chunk's entry (cheap correctness; a rebuild is bounded by
/// chunk_size² tiles). Entries are staled in place, never removed.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    entries: HashMap<ChunkCoord, CacheEntry>,
    rebuilds: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chunk's entry stale. Unbuilt chunks need no marking.
    pub fn invalidate(&mut self, chunk: ChunkCoord) {
        if let Some(entry) = self.entries.get_mut(&chunk) {
            entry.stale = true;
        }
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Whether a chunk has a fresh cached image.
    pub fn is_fresh(&self, chunk: ChunkCoord) -> bool {
        self.entries.get(&chunk).is_some_and(|e| !e.stale)
    }

    /// Total number of chunk composites performed, for instrumentation.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// The cached image for a chunk, fresh or stale.
    pub fn get(&self, chunk: ChunkCoord) -> Option<&RgbaSurface> {
        self.entries.get(&chunk).map(|e| &e.image)
    }

    /// Composite the chunk if it is missing or stale.
    pub fn ensure_built(&mut self, grid: &TileGrid, chunk: ChunkCoord, lookup: &dyn ImageLookup) {
        let needs_build = self.entries.get(&chunk).is_none_or(|e| e.stale);
        if !needs_build {
            return;
        }
        let image = composite_chunk(grid, chunk, lookup);
        self.rebuilds += 1;
        self.entries.insert(chunk, CacheEntry { image, stale: false });
    }

    /// The chunk's composited image, rebuilding it first if missing or stale.
    pub fn get_or_build(
        &mut self,
        grid: &TileGrid,
        chunk: ChunkCoord,
        lookup: &dyn ImageLookup,
    ) -> &RgbaSurface {
        self.ensure_built(grid, chunk, lookup);
        &self.entries[&chunk].image
    }
}

/// Composite one chunk's tiles into a single surface at tile-local offsets.
fn composite_chunk(grid: &TileGrid, chunk: ChunkCoord, lookup: &dyn ImageLookup) -> RgbaSurface {
    let bounds = grid.chunk_bounds(chunk);
    let ts = grid.tile_size();
    let mut surface = RgbaSurface::new(bounds.width() * ts, bounds.height() * ts);

    for (x, y) in bounds.tiles() {
        let tile = match grid.get(x, y) {
            Ok(tile) => tile,
            Err(_) => continue,
        };
        if tile.tile_type == TileType::Empty {
            continue;
        }
        let local_x = (x - bounds.start_x) as u32 * ts;
        let local_y = (y - bounds.start_y) as u32 * ts;

        if let Some(reference) = &tile.texture {
            if let Some(image) = lookup.lookup(reference) {
                surface.blit(image, local_x, local_y);
                continue;
            }
            tracing::debug!(reference, "texture missing, using procedural fallback");
        }
        if let Some(color) = fallback_color(tile.tile_type) {
            surface.fill_rect(local_x, local_y, ts, ts, color);
        }
    }
    surface
}
