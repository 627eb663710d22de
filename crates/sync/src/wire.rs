use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tilespace_common::{ChunkCoord, Tile};

/// Errors from wire encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One tile inside a chunk's retransmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub x: i32,
    pub y: i32,
    pub data: Tile,
}

/// The sync payload: grid invariants, scalar tuning, the sender's version,
/// and full-chunk tile lists keyed by `"chunk_x,chunk_y"`.
///
/// Whole chunks are retransmitted rather than per-tile diffs — more bytes,
/// but the receiver never has to reason about partial chunk state. No
/// compression or sub-chunk delta encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub chunk_size: u32,
    pub collision_enabled: bool,
    pub collision_type: u32,
    pub friction: f32,
    pub elasticity: f32,
    pub sync_version: u64,
    pub chunks: BTreeMap<String, Vec<TileRecord>>,
}

impl SyncPayload {
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of tile records across all chunks.
    pub fn record_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }
}

/// Wire key for a chunk coordinate.
pub fn chunk_key(chunk: ChunkCoord) -> String {
    format!("{},{}", chunk.x, chunk.y)
}

/// Parse a wire chunk key. `None` for anything that is not `"<i32>,<i32>"`.
pub fn parse_chunk_key(key: &str) -> Option<ChunkCoord> {
    let (x, y) = key.split_once(',')?;
    Some(ChunkCoord::new(x.parse().ok()?, y.parse().ok()?))
}
