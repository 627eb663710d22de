use glam::Vec2;
use tilespace_common::{ChunkCoord, TileType};
use tilespace_kernel::TileGrid;

/// One merged rectangle of same-type collidable tiles, in grid tile
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionRegion {
    pub origin_x: i32,
    pub origin_y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_type: TileType,
}

impl CollisionRegion {
    pub fn tile_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.origin_x
            && y >= self.origin_y
            && x < self.origin_x + self.width as i32
            && y < self.origin_y + self.height as i32
    }

    /// World-space center of the region given the tilemap's world origin.
    pub fn world_center(&self, origin: Vec2, tile_size: u32) -> Vec2 {
        let ts = tile_size as f32;
        Vec2::new(
            origin.x + (self.origin_x as f32 + self.width as f32 * 0.5) * ts,
            origin.y + (self.origin_y as f32 + self.height as f32 * 0.5) * ts,
        )
    }

    /// World-space size of the region.
    pub fn world_size(&self, tile_size: u32) -> Vec2 {
        let ts = tile_size as f32;
        Vec2::new(self.width as f32 * ts, self.height as f32 * ts)
    }
}

/// Mesh one chunk into a set of merged collision rectangles.
///
/// Greedy covering, row-major scan: each unclaimed collidable tile grows
/// right as far as its row allows, then down one full row at a time. The
/// result covers every collidable tile exactly once in O(chunk_size²) time.
/// The rectangle count is deterministic but not guaranteed minimal; fewer
/// shapes is a best-effort goal, not an invariant.
///
/// Total over well-formed input. A chunk outside the grid yields an empty
/// set; rejecting such coordinates is the caller's job.
pub fn mesh_chunk(grid: &TileGrid, chunk: ChunkCoord) -> Vec<CollisionRegion> {
    let bounds = grid.chunk_bounds(chunk);
    if bounds.is_empty() {
        return Vec::new();
    }
    let w = bounds.width() as usize;
    let h = bounds.height() as usize;
    let mut claimed = vec![false; w * h];
    let mut regions = Vec::new();

    // Type of the collidable tile at chunk-local (lx, ly), if any.
    let collidable = |lx: usize, ly: usize| -> Option<TileType> {
        let tile = grid
            .get(bounds.start_x + lx as i32, bounds.start_y + ly as i32)
            .ok()?;
        (tile.collision_enabled && tile.tile_type != TileType::Empty).then_some(tile.tile_type)
    };

    for ly in 0..h {
        for lx in 0..w {
            if claimed[ly * w + lx] {
                continue;
            }
            let Some(tile_type) = collidable(lx, ly) else {
                continue;
            };

            // Grow right while the next column matches.
            let mut width = 1;
            while lx + width < w
                && !claimed[ly * w + lx + width]
                && collidable(lx + width, ly) == Some(tile_type)
            {
                width += 1;
            }

            // Grow down one row at a time; a row qualifies only if every
            // tile across the current width matches. Stop at the first
            // disqualifying row.
            let mut height = 1;
            'rows: while ly + height < h {
                for dx in 0..width {
                    if claimed[(ly + height) * w + lx + dx]
                        || collidable(lx + dx, ly + height) != Some(tile_type)
                    {
                        break 'rows;
                    }
                }
                height += 1;
            }

            for dy in 0..height {
                for dx in 0..width {
                    claimed[(ly + dy) * w + lx + dx] = true;
                }
            }
            regions.push(CollisionRegion {
                origin_x: bounds.start_x + lx as i32,
                origin_y: bounds.start_y + ly as i32,
                width: width as u32,
                height: height as u32,
                tile_type,
            });
        }
    }

    tracing::trace!(
        chunk_x = chunk.x,
        chunk_y = chunk.y,
        regions = regions.len(),
        "meshed chunk"
    );
    regions
}
