use std::collections::BTreeSet;
use tilespace_common::ChunkCoord;

/// Chunk-granular dirty tracking.
///
/// Single source of truth for "needs collision rebuild" and "needs network
/// retransmission". The two sets are independent: an initial bulk load seeds
/// the network set without touching collision, and applying a remote payload
/// marks collision without echoing back to the network.
///
/// Collision dirtiness is read non-destructively (rebuilds are driven
/// synchronously by the service); the network set is drained destructively at
/// whatever cadence the host's transport chooses.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    collision: BTreeSet<ChunkCoord>,
    network: BTreeSet<ChunkCoord>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_collision_dirty(&mut self, chunk: ChunkCoord) {
        self.collision.insert(chunk);
    }

    pub fn mark_network_dirty(&mut self, chunk: ChunkCoord) {
        self.network.insert(chunk);
    }

    /// Mark every given chunk as awaiting network transmission. Used to seed
    /// a full sync after a bulk load.
    pub fn mark_all_network_dirty(&mut self, chunks: impl IntoIterator<Item = ChunkCoord>) {
        self.network.extend(chunks);
    }

    /// Chunks awaiting a collision rebuild, in deterministic order.
    pub fn collision_dirty(&self) -> &BTreeSet<ChunkCoord> {
        &self.collision
    }

    /// Clear one chunk's collision-dirty flag after its rebuild.
    pub fn clear_collision_dirty(&mut self, chunk: ChunkCoord) -> bool {
        self.collision.remove(&chunk)
    }

    pub fn clear_all_collision_dirty(&mut self) {
        self.collision.clear();
    }

    pub fn has_network_dirty(&self) -> bool {
        !self.network.is_empty()
    }

    pub fn network_dirty(&self) -> &BTreeSet<ChunkCoord> {
        &self.network
    }

    /// Take the network-dirty set, leaving it empty.
    ///
    /// Destructive read: entries must only be taken once serialization is
    /// certain to happen. At-least-once delivery is the transport's problem.
    pub fn drain_network_dirty(&mut self) -> BTreeSet<ChunkCoord> {
        std::mem::take(&mut self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_are_independent() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_collision_dirty(ChunkCoord::new(1, 2));
        tracker.mark_network_dirty(ChunkCoord::new(3, 4));

        assert!(tracker.collision_dirty().contains(&ChunkCoord::new(1, 2)));
        assert!(!tracker.collision_dirty().contains(&ChunkCoord::new(3, 4)));
        assert!(tracker.network_dirty().contains(&ChunkCoord::new(3, 4)));
        assert!(!tracker.network_dirty().contains(&ChunkCoord::new(1, 2)));
    }

    #[test]
    fn drain_empties_network_set() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_network_dirty(ChunkCoord::new(0, 0));
        tracker.mark_network_dirty(ChunkCoord::new(0, 0));
        tracker.mark_network_dirty(ChunkCoord::new(1, 0));

        let drained = tracker.drain_network_dirty();
        assert_eq!(drained.len(), 2);
        assert!(!tracker.has_network_dirty());
        // Collision set untouched by the drain.
        tracker.mark_collision_dirty(ChunkCoord::new(0, 0));
        tracker.drain_network_dirty();
        assert_eq!(tracker.collision_dirty().len(), 1);
    }

    #[test]
    fn collision_read_is_non_destructive() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_collision_dirty(ChunkCoord::new(2, 2));
        assert_eq!(tracker.collision_dirty().len(), 1);
        assert_eq!(tracker.collision_dirty().len(), 1);

        assert!(tracker.clear_collision_dirty(ChunkCoord::new(2, 2)));
        assert!(!tracker.clear_collision_dirty(ChunkCoord::new(2, 2)));
        assert!(tracker.collision_dirty().is_empty());
    }

    #[test]
    fn seeding_marks_every_chunk() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_all_network_dirty((0..3).map(|x| ChunkCoord::new(x, 0)));
        assert_eq!(tracker.network_dirty().len(), 3);
    }
}
