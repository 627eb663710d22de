use std::collections::BTreeMap;
use tilespace_common::{ChunkBounds, ChunkCoord, Tile, TileType};

/// Errors from grid access and bulk I/O.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("tile position ({x}, {y}) out of bounds")]
    OutOfBounds { x: i32, y: i32 },
    #[error(
        "tile data is {actual_width}x{actual_height}, grid is {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// The authoritative tile grid.
///
/// Dense row-major storage: every in-range coordinate holds a tile. All
/// mutations go through [`TileGrid::set`], which replaces the tile wholesale
/// and returns the previous value so callers can decide whether collision
/// needs rebuilding.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    chunk_size: u32,
    default_tile: Tile,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub const DEFAULT_CHUNK_SIZE: u32 = 16;

    /// Create a grid filled with the default tile, chunked at
    /// [`Self::DEFAULT_CHUNK_SIZE`].
    pub fn new(width: u32, height: u32, tile_size: u32, default_tile: Tile) -> Self {
        Self::with_chunk_size(width, height, tile_size, default_tile, Self::DEFAULT_CHUNK_SIZE)
    }

    /// Create a grid with an explicit chunk size.
    pub fn with_chunk_size(
        width: u32,
        height: u32,
        tile_size: u32,
        default_tile: Tile,
        chunk_size: u32,
    ) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        assert!(tile_size > 0, "tile_size must be positive");
        assert!(chunk_size > 0, "chunk_size must be positive");
        let tiles = vec![default_tile.clone(); (width as usize) * (height as usize)];
        Self {
            width,
            height,
            tile_size,
            chunk_size,
            default_tile,
            tiles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of one tile in world units.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Edge length of one chunk in tiles.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn default_tile(&self) -> &Tile {
        &self.default_tile
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Get the tile at (x, y).
    pub fn get(&self, x: i32, y: i32) -> Result<&Tile, GridError> {
        Ok(&self.tiles[self.index(x, y)?])
    }

    /// Replace the tile at (x, y), returning the previous tile.
    ///
    /// Callers compare old and new `(collision_enabled, tile_type)` to decide
    /// whether the containing chunk needs a collision rebuild.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> Result<Tile, GridError> {
        let index = self.index(x, y)?;
        Ok(std::mem::replace(&mut self.tiles[index], tile))
    }

    /// Chunk containing tile (x, y). Pure integer division; the caller is
    /// responsible for the coordinate being in range.
    pub fn chunk_of(&self, x: i32, y: i32) -> ChunkCoord {
        let size = self.chunk_size as i32;
        ChunkCoord::new(x.div_euclid(size), y.div_euclid(size))
    }

    /// Tile bounds of a chunk, clipped to the grid edges.
    pub fn chunk_bounds(&self, chunk: ChunkCoord) -> ChunkBounds {
        let size = self.chunk_size as i32;
        let start_x = (chunk.x * size).clamp(0, self.width as i32);
        let start_y = (chunk.y * size).clamp(0, self.height as i32);
        ChunkBounds {
            start_x,
            start_y,
            end_x: (chunk.x * size + size).clamp(0, self.width as i32),
            end_y: (chunk.y * size + size).clamp(0, self.height as i32),
        }
    }

    /// Number of chunk columns (last column may be partial).
    pub fn chunks_x(&self) -> u32 {
        self.width.div_ceil(self.chunk_size)
    }

    /// Number of chunk rows (last row may be partial).
    pub fn chunks_y(&self) -> u32 {
        self.height.div_ceil(self.chunk_size)
    }

    /// Iterate all chunk coordinates, row-major.
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> + use<> {
        let (cols, rows) = (self.chunks_x() as i32, self.chunks_y() as i32);
        (0..rows).flat_map(move |y| (0..cols).map(move |x| ChunkCoord::new(x, y)))
    }

    /// Load the whole grid from a 2D array of tile-type ids.
    ///
    /// The shape is validated up front; on mismatch the grid is left
    /// untouched. Ids missing from the mapping fall back to the grid's
    /// default tile.
    pub fn load_from_data(
        &mut self,
        rows: &[Vec<u8>],
        mapping: &BTreeMap<u8, Tile>,
    ) -> Result<(), GridError> {
        let actual_height = rows.len() as u32;
        let actual_width = rows.first().map_or(0, |row| row.len()) as u32;
        if actual_height != self.height || rows.iter().any(|row| row.len() as u32 != self.width) {
            return Err(GridError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width,
                actual_height,
            });
        }

        for (y, row) in rows.iter().enumerate() {
            for (x, id) in row.iter().enumerate() {
                let tile = mapping
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| self.default_tile.clone());
                self.tiles[y * self.width as usize + x] = tile;
            }
        }
        tracing::debug!(width = self.width, height = self.height, "grid loaded from data array");
        Ok(())
    }

    /// Export the grid as a 2D array of tile-type ids, for round-tripping to
    /// external tools.
    pub fn to_data_array(&self) -> Vec<Vec<u8>> {
        (0..self.height as usize)
            .map(|y| {
                let row = &self.tiles[y * self.width as usize..(y + 1) * self.width as usize];
                row.iter().map(|tile| tile.tile_type.id()).collect()
            })
            .collect()
    }

    /// Count tiles matching a predicate, for inspection and tests.
    pub fn count_tiles(&self, mut predicate: impl FnMut(&Tile) -> bool) -> usize {
        self.tiles.iter().filter(|tile| predicate(tile)).count()
    }

    /// A grid of empty tiles.
    pub fn empty(width: u32, height: u32, tile_size: u32) -> Self {
        Self::new(width, height, tile_size, Tile::of_type(TileType::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_starts_filled_with_default() {
        let grid = TileGrid::empty(4, 3, 32);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(grid.get(x, y).unwrap().tile_type, TileType::Empty);
            }
        }
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let grid = TileGrid::empty(4, 4, 32);
        assert!(matches!(
            grid.get(4, 0),
            Err(GridError::OutOfBounds { x: 4, y: 0 })
        ));
        assert!(matches!(grid.get(0, -1), Err(GridError::OutOfBounds { .. })));
        let mut grid = grid;
        assert!(grid.set(-1, 2, Tile::of_type(TileType::Solid)).is_err());
    }

    #[test]
    fn set_returns_previous_tile() {
        let mut grid = TileGrid::empty(4, 4, 32);
        let prev = grid.set(1, 1, Tile::of_type(TileType::Solid)).unwrap();
        assert_eq!(prev.tile_type, TileType::Empty);
        let prev = grid.set(1, 1, Tile::of_type(TileType::Ladder)).unwrap();
        assert_eq!(prev.tile_type, TileType::Solid);
        assert_eq!(grid.get(1, 1).unwrap().tile_type, TileType::Ladder);
    }

    #[test]
    fn chunk_of_divides_by_chunk_size() {
        let grid = TileGrid::with_chunk_size(64, 64, 32, Tile::default(), 16);
        assert_eq!(grid.chunk_of(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(grid.chunk_of(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(grid.chunk_of(16, 15), ChunkCoord::new(1, 0));
        assert_eq!(grid.chunk_of(33, 47), ChunkCoord::new(2, 2));
    }

    #[test]
    fn chunk_bounds_clip_at_grid_edges() {
        // 20x20 grid with 16-tile chunks: second column/row chunks are 4 wide.
        let grid = TileGrid::with_chunk_size(20, 20, 32, Tile::default(), 16);
        let full = grid.chunk_bounds(ChunkCoord::new(0, 0));
        assert_eq!((full.width(), full.height()), (16, 16));
        let edge = grid.chunk_bounds(ChunkCoord::new(1, 1));
        assert_eq!((edge.start_x, edge.start_y), (16, 16));
        assert_eq!((edge.width(), edge.height()), (4, 4));
        let outside = grid.chunk_bounds(ChunkCoord::new(5, 0));
        assert!(outside.is_empty());
    }

    #[test]
    fn chunk_counts_round_up() {
        let grid = TileGrid::with_chunk_size(20, 33, 32, Tile::default(), 16);
        assert_eq!(grid.chunks_x(), 2);
        assert_eq!(grid.chunks_y(), 3);
        assert_eq!(grid.chunk_coords().count(), 6);
    }

    #[test]
    fn load_from_data_maps_ids() {
        let mut grid = TileGrid::empty(2, 2, 32);
        let mapping = BTreeMap::from([
            (1, Tile::of_type(TileType::Solid)),
            (5, Tile::of_type(TileType::Liquid)),
        ]);
        grid.load_from_data(&[vec![1, 0], vec![5, 1]], &mapping).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().tile_type, TileType::Solid);
        assert_eq!(grid.get(1, 0).unwrap().tile_type, TileType::Empty);
        assert_eq!(grid.get(0, 1).unwrap().tile_type, TileType::Liquid);
        assert_eq!(grid.get(1, 1).unwrap().tile_type, TileType::Solid);
    }

    #[test]
    fn load_from_data_rejects_bad_shape_and_leaves_grid_untouched() {
        let mut grid = TileGrid::empty(2, 2, 32);
        grid.set(0, 0, Tile::of_type(TileType::Solid)).unwrap();

        let mapping = BTreeMap::from([(1, Tile::of_type(TileType::Solid))]);
        // Wrong height.
        let err = grid.load_from_data(&[vec![1, 1]], &mapping).unwrap_err();
        assert!(matches!(err, GridError::DimensionMismatch { .. }));
        // Ragged row.
        let err = grid
            .load_from_data(&[vec![1, 1], vec![1]], &mapping)
            .unwrap_err();
        assert!(matches!(err, GridError::DimensionMismatch { .. }));

        // The earlier edit is still there and nothing else changed.
        assert_eq!(grid.get(0, 0).unwrap().tile_type, TileType::Solid);
        assert_eq!(grid.count_tiles(|t| t.tile_type == TileType::Solid), 1);
    }

    #[test]
    fn unmapped_ids_fall_back_to_default_tile() {
        let default = Tile::of_type(TileType::Ladder);
        let mut grid = TileGrid::new(2, 1, 32, default);
        grid.load_from_data(&[vec![9, 9]], &BTreeMap::new()).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().tile_type, TileType::Ladder);
    }

    #[test]
    fn data_array_roundtrip_preserves_types() {
        let mut grid = TileGrid::empty(3, 2, 32);
        grid.set(0, 0, Tile::of_type(TileType::Solid)).unwrap();
        grid.set(2, 1, Tile::of_type(TileType::Hazard)).unwrap();

        let data = grid.to_data_array();
        assert_eq!(data, vec![vec![1, 0, 0], vec![0, 0, 4]]);

        let mapping: BTreeMap<u8, Tile> = TileType::ALL
            .into_iter()
            .map(|t| (t.id(), Tile::of_type(t)))
            .collect();
        let mut fresh = TileGrid::empty(3, 2, 32);
        fresh.load_from_data(&data, &mapping).unwrap();
        assert_eq!(fresh.to_data_array(), data);
    }
}
