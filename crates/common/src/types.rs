use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Behavioral category of a tile.
///
/// The discriminants are wire ids shared with external tools and the sync
/// payload; they never renumber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileType {
    #[default]
    Empty = 0,
    Solid = 1,
    /// One-way collision (can be jumped through from below).
    Platform = 2,
    Ladder = 3,
    Hazard = 4,
    Liquid = 5,
    Slippery = 6,
}

impl TileType {
    pub const ALL: [TileType; 7] = [
        TileType::Empty,
        TileType::Solid,
        TileType::Platform,
        TileType::Ladder,
        TileType::Hazard,
        TileType::Liquid,
        TileType::Slippery,
    ];

    /// Wire id of this tile type.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a tile type by wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Whether tiles of this type collide unless overridden per tile.
    pub fn default_collision(self) -> bool {
        self != TileType::Empty
    }
}

// Tile types travel as bare integers on the wire and in exported data arrays.
impl Serialize for TileType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for TileType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = u8::deserialize(deserializer)?;
        Self::from_id(id).ok_or_else(|| D::Error::custom(format!("unknown tile type id {id}")))
    }
}

/// A single tile value.
///
/// Tiles are immutable: `TileGrid::set` replaces the whole value, it never
/// patches one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    /// Reference resolved by the host's image collaborator at render time.
    #[serde(rename = "texture_reference")]
    pub texture: Option<String>,
    pub collision_enabled: bool,
    /// Free-form per-tile data carried through sync untouched.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Tile {
    /// A tile of the given type with the type's default collision flag.
    pub fn of_type(tile_type: TileType) -> Self {
        Self {
            tile_type,
            texture: None,
            collision_enabled: tile_type.default_collision(),
            properties: BTreeMap::new(),
        }
    }

    /// A tile of the given type referencing a texture.
    pub fn with_texture(tile_type: TileType, texture: impl Into<String>) -> Self {
        Self {
            texture: Some(texture.into()),
            ..Self::of_type(tile_type)
        }
    }

    /// Override the collision flag.
    pub fn with_collision(mut self, enabled: bool) -> Self {
        self.collision_enabled = enabled;
        self
    }

    /// Attach a property value.
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::of_type(TileType::Empty)
    }
}

/// A chunk coordinate: tile coordinates divided by the grid's chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open tile bounds of a chunk, clipped to the grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl ChunkBounds {
    /// Width in tiles. Zero for chunks entirely outside the grid.
    pub fn width(&self) -> u32 {
        (self.end_x - self.start_x).max(0) as u32
    }

    /// Height in tiles. Zero for chunks entirely outside the grid.
    pub fn height(&self) -> u32 {
        (self.end_y - self.start_y).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Iterate all tile coordinates inside the bounds, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (sx, ex) = (self.start_x, self.end_x);
        (self.start_y..self.end_y).flat_map(move |y| (sx..ex).map(move |x| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_type_ids_are_frozen() {
        assert_eq!(TileType::Empty.id(), 0);
        assert_eq!(TileType::Solid.id(), 1);
        assert_eq!(TileType::Platform.id(), 2);
        assert_eq!(TileType::Ladder.id(), 3);
        assert_eq!(TileType::Hazard.id(), 4);
        assert_eq!(TileType::Liquid.id(), 5);
        assert_eq!(TileType::Slippery.id(), 6);
    }

    #[test]
    fn tile_type_id_roundtrip() {
        for t in TileType::ALL {
            assert_eq!(TileType::from_id(t.id()), Some(t));
        }
        assert_eq!(TileType::from_id(7), None);
    }

    #[test]
    fn tile_type_serializes_as_integer() {
        let json = serde_json::to_string(&TileType::Hazard).unwrap();
        assert_eq!(json, "4");
        let back: TileType = serde_json::from_str("4").unwrap();
        assert_eq!(back, TileType::Hazard);
    }

    #[test]
    fn unknown_tile_type_id_is_rejected() {
        let result: Result<TileType, _> = serde_json::from_str("42");
        assert!(result.is_err());
    }

    #[test]
    fn default_collision_follows_type() {
        assert!(!Tile::of_type(TileType::Empty).collision_enabled);
        assert!(Tile::of_type(TileType::Solid).collision_enabled);
        assert!(Tile::of_type(TileType::Liquid).collision_enabled);
    }

    #[test]
    fn collision_override_sticks() {
        let tile = Tile::of_type(TileType::Liquid).with_collision(false);
        assert_eq!(tile.tile_type, TileType::Liquid);
        assert!(!tile.collision_enabled);
    }

    #[test]
    fn tile_wire_field_names() {
        let tile = Tile::with_texture(TileType::Solid, "stone");
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["tile_type"], 1);
        assert_eq!(json["texture_reference"], "stone");
        assert_eq!(json["collision_enabled"], true);
        assert!(json["properties"].as_object().unwrap().is_empty());
    }

    #[test]
    fn chunk_bounds_tile_iteration_is_row_major() {
        let bounds = ChunkBounds {
            start_x: 0,
            start_y: 0,
            end_x: 2,
            end_y: 2,
        };
        let tiles: Vec<_> = bounds.tiles().collect();
        assert_eq!(tiles, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn empty_bounds_yield_no_tiles() {
        let bounds = ChunkBounds {
            start_x: 8,
            start_y: 8,
            end_x: 8,
            end_y: 8,
        };
        assert!(bounds.is_empty());
        assert_eq!(bounds.tiles().count(), 0);
    }
}
