//! Rendering adapter: renderer-agnostic sprite batching and per-frame tile submission.
//!
//! # Invariants
//! - Submission is CPU-only; GPU work happens in a [`DrawBackend`] on `end`.
//! - Draw order is ascending z, ties in submission order.
//! - A batch keeps no entries across passes, only its buffer capacity.
//!
//! The [`DrawBackend`] trait is the seam to the GPU: the wgpu backend and
//! the [`DebugTextBackend`] implement it, and callers never change.

mod backend;
mod batch;
mod frame;
mod timer;

pub use backend::{DebugTextBackend, DrawBackend, RecordedRun};
pub use batch::{BatchStats, SpriteBatch, SpriteDraw};
pub use frame::{FrameStats, TileRenderer};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "tileview-render v0.1.0"
}
