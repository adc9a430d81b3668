//! Model Module - Optional Learned-Model Slots
//!
//! Inference wrappers around ONNX Runtime, tagged per-capability dispatch,
//! and the registry that resolves the slot set once at startup.

pub mod inference;
pub mod registry;
pub mod slot;

pub use inference::{InferenceError, LoadedModel, ModelStatus};
pub use registry::ModelRegistry;
pub use slot::{Capability, ModelSlot};
