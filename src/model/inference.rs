//! Inference - ONNX Runtime Integration
//!
//! Loads and runs one ONNX model behind a slot. A failed load or a failed
//! call never propagates past this module - the slot degrades to heuristics.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct InferenceError(pub String);

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.0)
    }
}

impl std::error::Error for InferenceError {}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata captured at load time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub input_len: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Min/max normalization parameters from training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub min_vals: Vec<f32>,
    pub max_vals: Vec<f32>,
}

impl NormalizationParams {
    pub fn identity(len: usize) -> Self {
        Self {
            min_vals: vec![0.0; len],
            max_vals: vec![1.0; len],
        }
    }
}

/// Per-model latency stats for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_path: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// LOADED MODEL
// ============================================================================

/// One loaded ONNX session plus its normalization and counters.
/// `run` takes `&self`; the session itself sits behind a mutex because
/// ort requires exclusive access per call.
pub struct LoadedModel {
    session: Mutex<Session>,
    metadata: ModelMetadata,
    normalization: NormalizationParams,
    latency_sum_us: AtomicU64,
    run_count: AtomicU64,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl LoadedModel {
    /// Load a model from disk. Missing/corrupt files are load errors the
    /// caller turns into a heuristic-only slot.
    pub fn from_file(path: &str, input_len: usize) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", path);

        if !std::path::Path::new(path).exists() {
            return Err(InferenceError(format!("Model not found: {}", path)));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))?;

        log::info!("ONNX model loaded: {}", path);

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: path.to_string(),
                input_len,
                loaded_at: chrono::Utc::now(),
            },
            normalization: NormalizationParams::identity(input_len),
            latency_sum_us: AtomicU64::new(0),
            run_count: AtomicU64::new(0),
        })
    }

    /// Load a model from memory (bundled/encrypted model delivery)
    pub fn from_bytes(bytes: &[u8], input_len: usize) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from memory ({} bytes)", bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError(format!("Optimization error: {}", e)))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError(format!("Load from memory error: {}", e)))?;

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: "<memory>".to_string(),
                input_len,
                loaded_at: chrono::Utc::now(),
            },
            normalization: NormalizationParams::identity(input_len),
            latency_sum_us: AtomicU64::new(0),
            run_count: AtomicU64::new(0),
        })
    }

    pub fn set_normalization(&mut self, params: NormalizationParams) {
        self.normalization = params;
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.run_count.load(Ordering::Relaxed);
        ModelStatus {
            model_path: self.metadata.model_path.clone(),
            avg_latency_ms: if count > 0 {
                (sum as f32 / count as f32) / 1000.0
            } else {
                0.0
            },
            inference_count: count,
        }
    }

    /// Min/max normalize one input vector
    fn normalize(&self, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let min = self.normalization.min_vals.get(i).copied().unwrap_or(0.0);
                let max = self.normalization.max_vals.get(i).copied().unwrap_or(1.0);
                let range = (max - min).max(1e-8);
                ((v - min) / range).clamp(0.0, 1.0)
            })
            .collect()
    }

    /// Run inference on one fixed-size input vector, returning the raw
    /// output values. May block on the accelerator queue - callers keep it
    /// off latency-sensitive paths.
    pub fn run(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        if input.len() != self.metadata.input_len {
            return Err(InferenceError(format!(
                "Input length {} does not match model contract {}",
                input.len(),
                self.metadata.input_len
            )));
        }

        let start = std::time::Instant::now();
        let normalized = self.normalize(input);

        let input_array = Array2::<f32>::from_shape_vec((1, normalized.len()), normalized)
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| InferenceError("No output defined".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        let values = output_tensor.1.to_vec();

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.run_count.fetch_add(1, Ordering::Relaxed);

        Ok(values)
    }

    /// Run and reduce to a single [0,1] anomaly score (first output value)
    pub fn score(&self, input: &[f32]) -> Result<f32, InferenceError> {
        let values = self.run(input)?;
        let first = values
            .first()
            .copied()
            .ok_or_else(|| InferenceError("Empty model output".to_string()))?;
        Ok(first.clamp(0.0, 1.0))
    }
}

// ============================================================================
// TESTS
// ============================================================================
