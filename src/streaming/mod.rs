//! Segment Streaming System
//!
//! Keeps a bounded window of segments built around the tracked position.
//!
//! Key features:
//! - Ahead-of-position generation capped per tick, with cooldown between batches
//! - Eviction behind the tracked position with full handle release
//! - Self-heal when the tracked position lands on unbuilt terrain
//! - Distance-based LOD for shadows, decorations and body sleeping

pub mod lod;
pub mod manager;
pub mod schedule;
pub mod store;

pub use lod::{apply_lod, bodies_should_sleep, LodLevel};
pub use manager::{StreamingManager, StreamingStats};
pub use schedule::GenerationSchedule;
pub use store::SegmentStore;
