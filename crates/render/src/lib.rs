//! Rendering: per-chunk composited images with chunk-granular invalidation.
//!
//! # Invariants
//! - Cache entries are invalidated in place, never removed; one tile change
//!   stales exactly the containing chunk's entry.
//! - A missing texture lookup is a normal fallback path, never an error.
//! - The cache reads grid state; it never mutates it.

pub mod cache;
pub mod culling;
pub mod surface;

pub use cache::{fallback_color, ImageLookup, RenderCache, TextureTable};
pub use culling::{visible_chunks, CameraRect};
pub use surface::{Rgba, RgbaSurface};

pub fn crate_info() -> &'static str {
    "tilespace-render v0.1.0"
}
