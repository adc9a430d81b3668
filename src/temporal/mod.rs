//! Temporal Module - Cross-Frame Consistency
//!
//! Per-frame snapshots plus the bounded-window tracker that turns them into
//! blink, jitter, pose, coordination and shape anomaly scores.

pub mod snapshot;
pub mod tracker;

pub use snapshot::FrameSnapshot;
pub use tracker::{TemporalReport, TemporalTracker};
