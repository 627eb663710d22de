use tilespace_sync::SyncTuning;

/// Tuning and toggles for one tilemap service instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilemapConfig {
    pub collision_enabled: bool,
    /// Collision type id handed to the physics collaborator with each region.
    pub collision_type: u32,
    pub friction: f32,
    pub elasticity: f32,
    pub sync_enabled: bool,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            collision_enabled: true,
            collision_type: 1,
            friction: 0.7,
            elasticity: 0.0,
            sync_enabled: true,
        }
    }
}

impl TilemapConfig {
    /// The scalar slice of the config that travels on the wire.
    pub fn tuning(&self) -> SyncTuning {
        SyncTuning {
            collision_enabled: self.collision_enabled,
            collision_type: self.collision_type,
            friction: self.friction,
            elasticity: self.elasticity,
        }
    }
}
