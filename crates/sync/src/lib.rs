//! Network sync: full-chunk retransmission of dirty chunks with a monotonic
//! version counter.
//!
//! # Invariants
//! - The outbound version counter only grows for the endpoint's lifetime.
//! - The recorded remote version never regresses; stale payloads are still
//!   applied (chunk-granular last-writer-wins).
//! - Applying a payload never marks chunks dirty for outbound sync.
//! - A malformed record is logged and skipped; it never aborts the pass.

pub mod protocol;
pub mod wire;

pub use protocol::{AppliedSync, NetworkSync, SyncTuning};
pub use wire::{chunk_key, parse_chunk_key, SyncPayload, TileRecord, WireError};

pub fn crate_info() -> &'static str {
    "tilespace-sync v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("sync"));
    }
}
