use glam::Vec2;
use tilespace_common::ChunkCoord;
use tilespace_kernel::TileGrid;

/// Camera view rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl CameraRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            max: center + size * 0.5,
        }
    }
}

/// Chunks to render for a camera view, row-major.
///
/// With no camera rect, every chunk renders. Otherwise the rect is converted
/// to a tile window (clamped to the grid) and then to the covering chunk
/// range.
pub fn visible_chunks(grid: &TileGrid, origin: Vec2, camera: Option<CameraRect>) -> Vec<ChunkCoord> {
    let Some(rect) = camera else {
        return grid.chunk_coords().collect();
    };

    let ts = grid.tile_size() as f32;
    let left_tile = (((rect.min.x - origin.x) / ts).floor() as i32).max(0);
    let top_tile = (((rect.min.y - origin.y) / ts).floor() as i32).max(0);
    let right_tile = (((rect.max.x - origin.x) / ts).floor() as i32 + 1).min(grid.width() as i32);
    let bottom_tile = (((rect.max.y - origin.y) / ts).floor() as i32 + 1).min(grid.height() as i32);
    if right_tile <= left_tile || bottom_tile <= top_tile {
        return Vec::new();
    }

    let cs = grid.chunk_size() as i32;
    let left_chunk = left_tile / cs;
    let top_chunk = top_tile / cs;
    let right_chunk = (right_tile + cs - 1) / cs;
    let bottom_chunk = (bottom_tile + cs - 1) / cs;

    let mut chunks = Vec::new();
    for cy in top_chunk..bottom_chunk {
        for cx in left_chunk..right_chunk {
            chunks.push(ChunkCoord::new(cx, cy));
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilespace_common::Tile;

    fn grid_64() -> TileGrid {
        // 64x64 tiles, 16-tile chunks, 32px tiles: 4x4 chunks, 2048px across.
        TileGrid::with_chunk_size(64, 64, 32, Tile::default(), 16)
    }

    #[test]
    fn no_camera_renders_all_chunks() {
        let chunks = visible_chunks(&grid_64(), Vec2::ZERO, None);
        assert_eq!(chunks.len(), 16);
        assert_eq!(chunks[0], ChunkCoord::new(0, 0));
        assert_eq!(chunks[15], ChunkCoord::new(3, 3));
    }

    #[test]
    fn camera_inside_one_chunk() {
        let rect = CameraRect::new(Vec2::new(10.0, 10.0), Vec2::new(100.0, 100.0));
        let chunks = visible_chunks(&grid_64(), Vec2::ZERO, Some(rect));
        assert_eq!(chunks, vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn camera_spanning_chunk_seam() {
        // A 16-tile chunk is 512px; x in [500, 530] touches chunks 0 and 1.
        let rect = CameraRect::new(Vec2::new(500.0, 0.0), Vec2::new(530.0, 10.0));
        let chunks = visible_chunks(&grid_64(), Vec2::ZERO, Some(rect));
        assert_eq!(chunks, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
    }

    #[test]
    fn camera_respects_world_origin() {
        let rect = CameraRect::new(Vec2::new(1000.0, 1000.0), Vec2::new(1040.0, 1040.0));
        let chunks = visible_chunks(&grid_64(), Vec2::new(1000.0, 1000.0), Some(rect));
        assert_eq!(chunks, vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn camera_outside_grid_sees_nothing() {
        let rect = CameraRect::new(Vec2::new(-500.0, -500.0), Vec2::new(-100.0, -100.0));
        assert!(visible_chunks(&grid_64(), Vec2::ZERO, Some(rect)).is_empty());

        let rect = CameraRect::new(Vec2::new(5000.0, 0.0), Vec2::new(6000.0, 100.0));
        assert!(visible_chunks(&grid_64(), Vec2::ZERO, Some(rect)).is_empty());
    }

    #[test]
    fn camera_larger_than_grid_clamps_to_all_chunks() {
        let rect = CameraRect::new(Vec2::new(-5000.0, -5000.0), Vec2::new(5000.0, 5000.0));
        let chunks = visible_chunks(&grid_64(), Vec2::ZERO, Some(rect));
        assert_eq!(chunks.len(), 16);
    }
}
