//! Collision: greedy rectangle meshing over chunks, the physics adapter
//! seam, and contact event routing.
//!
//! # Invariants
//! - A chunk's emitted regions exactly cover its collidable tiles: no
//!   omission, no overlap.
//! - Re-meshing an unchanged chunk yields an identical region list.
//! - Old regions are retracted from the physics collaborator before new ones
//!   are added; the two sets are never registered simultaneously.

pub mod contact;
pub mod mesher;
pub mod physics;

pub use contact::{Contact, ContactKind, ContactRouter};
pub use mesher::{mesh_chunk, CollisionRegion};
pub use physics::{PhysicsAdapter, RecordingPhysics, RegionHandle, StaticRegion};

pub fn crate_info() -> &'static str {
    "tilespace-collision v0.1.0"
}
