use glam::Vec2;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tilespace_common::TileType;

/// A world-space static collision rectangle handed to the physics
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticRegion {
    pub center: Vec2,
    pub size: Vec2,
    pub tile_type: TileType,
    pub collision_type: u32,
    pub friction: f32,
    pub elasticity: f32,
}

/// Opaque handle to a registered static region.
///
/// Handles are only valid between the add that produced them and the next
/// rebuild of the same chunk; they are never held across unrelated rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionHandle(pub u64);

/// The physics space seam. The host owns the actual space; this subsystem
/// only registers and retracts static rectangles through an injected
/// implementation — it never goes looking for a physics world on its own.
pub trait PhysicsAdapter {
    fn add_static_region(&mut self, region: &StaticRegion) -> RegionHandle;
    fn remove_static_region(&mut self, handle: RegionHandle);
}

/// Recording adapter — stands in for a real physics backend.
///
/// Retains every registered region for inspection; useful in tests and CLI
/// demos the same way a debug renderer stands in for a GPU backend.
#[derive(Debug, Default)]
pub struct RecordingPhysics {
    next_handle: u64,
    regions: BTreeMap<RegionHandle, StaticRegion>,
}

impl RecordingPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, handle: RegionHandle) -> Option<&StaticRegion> {
        self.regions.get(&handle)
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionHandle, &StaticRegion)> {
        self.regions.iter().map(|(h, r)| (*h, r))
    }
}

impl PhysicsAdapter for RecordingPhysics {
    fn add_static_region(&mut self, region: &StaticRegion) -> RegionHandle {
        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;
        self.regions.insert(handle, *region);
        handle
    }

    fn remove_static_region(&mut self, handle: RegionHandle) {
        if self.regions.remove(&handle).is_none() {
            tracing::warn!(?handle, "removed unknown static region handle");
        }
    }
}

// Lets a caller keep a shared handle on an adapter it hands to the service
// (the model is single-threaded; see the concurrency notes in the service).
impl<P: PhysicsAdapter> PhysicsAdapter for Rc<RefCell<P>> {
    fn add_static_region(&mut self, region: &StaticRegion) -> RegionHandle {
        self.borrow_mut().add_static_region(region)
    }

    fn remove_static_region(&mut self, handle: RegionHandle) {
        self.borrow_mut().remove_static_region(handle)
    }
}
