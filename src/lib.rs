//! DeepGuard Core - Adaptive Multi-Signal Detection & Scoring Engine
//!
//! On-device scoring of messages, calls, videos and URLs for scam/deepfake
//! likelihood. The crate consumes already-decoded frame buffers, PCM samples
//! and raw text; it returns structured reports and adapts its per-pattern
//! trust weights from user feedback.
//!
//! Layering (leaves first):
//! - `features`: pure extractors (landmarks, contours, mesh, pixels, audio, text)
//! - `heuristics`: deterministic analyzers - always available, the reliability floor
//! - `model`: optional ONNX-backed model slots, degrade to heuristics when absent
//! - `temporal`: bounded sliding window over per-frame facial snapshots
//! - `ensemble`: pure score fusion with fixed weights and decision thresholds
//! - `learning`: per-pattern weight adaptation from binary user feedback
//! - `community`: hash-keyed dedup table of reported threats
//! - `engine`: orchestration and the public analysis API

pub mod community;
pub mod config;
pub mod engine;
pub mod ensemble;
pub mod features;
pub mod heuristics;
pub mod learning;
pub mod media;
pub mod model;
pub mod report;
pub mod temporal;

pub use config::EngineConfig;
pub use engine::DetectionEngine;
pub use report::{AnalysisReport, LearningStats, ThreatReason, UserFeedback};
