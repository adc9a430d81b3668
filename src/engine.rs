//! Detection Engine - Orchestration & Public API
//!
//! One explicit engine instance per consumer; no global state. The engine
//! owns the resolved model registry, the adaptive learning state and the
//! community threat store, and exposes the analysis entry points:
//! `analyze_video`, `analyze_text`, `scan_url`, `record_feedback`.
//!
//! Analysis is CPU-bound and synchronous; `*_async` wrappers move it onto
//! the blocking pool for async callers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::community::CommunityThreatStore;
use crate::config::EngineConfig;
use crate::ensemble::{self, VideoChannelScores};
use crate::features::{self, audio as audio_features, contour, landmarks, mesh as mesh_features,
    pixels, text as text_features};
use crate::heuristics;
use crate::learning::AdaptiveLearningEngine;
use crate::media::{AudioTrack, TextMessage, VideoFrame};
use crate::model::{Capability, ModelRegistry};
use crate::model::registry::{AUDIO_INPUT_LEN, TEXT_INPUT_LEN};
use crate::report::{
    content_hash, AnalysisReport, ReasonKind, Severity, ThreatKind, ThreatReason, UserFeedback,
};
use crate::temporal::{FrameSnapshot, TemporalTracker};

/// Channel score above this contributes a reason to the report
const REASON_FLOOR: f32 = 0.3;

/// Community report weight: this many independent reports at High or above
/// force at least a review-band score
const COMMUNITY_REPORT_QUORUM: u32 = 3;
const COMMUNITY_SCORE_FLOOR: f32 = 70.0;

/// Built-in text pattern priors: (pattern id, accuracy, false positive rate).
/// Tuned from labeled scam corpora; real feedback blends in over these.
const SEED_PATTERNS: [(&str, f32, f32); 5] = [
    ("urgency_pressure", 0.7, 0.1),
    ("fear_intimidation", 0.7, 0.1),
    ("authority_impersonation", 0.75, 0.08),
    ("reward_bait", 0.65, 0.12),
    ("scarcity", 0.6, 0.15),
];

// ============================================================================
// ENGINE
// ============================================================================

pub struct DetectionEngine {
    config: EngineConfig,
    registry: ModelRegistry,
    learning: AdaptiveLearningEngine,
    community: CommunityThreatStore,
}

impl DetectionEngine {
    /// Build an engine from config. Validates ensemble weights, resolves the
    /// model slots (degrading missing ones) and seeds the pattern priors.
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        config.ensemble.validate()?;

        let registry = ModelRegistry::resolve(&config.models);
        let learning = AdaptiveLearningEngine::new(config.learning.clone());
        for (id, accuracy, fpr) in SEED_PATTERNS {
            learning.seed_pattern(id, accuracy, fpr);
        }

        log::info!("Detection engine initialized");
        Ok(Self {
            config,
            registry,
            learning,
            community: CommunityThreatStore::new(),
        })
    }

    /// Engine with default config and no models configured
    pub fn with_defaults() -> Self {
        // Default config always passes validation
        Self::new(EngineConfig::default()).expect("default config is valid")
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn learning(&self) -> &AdaptiveLearningEngine {
        &self.learning
    }

    pub fn community(&self) -> &CommunityThreatStore {
        &self.community
    }

    pub fn model_statuses(&self) -> HashMap<String, crate::model::ModelStatus> {
        self.registry.statuses()
    }

    // ------------------------------------------------------------------
    // Video analysis
    // ------------------------------------------------------------------

    /// Analyze a decoded frame sequence (plus optional audio) for deepfake
    /// indicators. Empty input yields the neutral insufficient-data report;
    /// malformed frames yield the fixed moderate malformed verdict.
    pub fn analyze_video(
        &self,
        frames: &[VideoFrame],
        audio: Option<&AudioTrack>,
    ) -> AnalysisReport {
        if frames.is_empty() {
            return AnalysisReport::insufficient(ReasonKind::InsufficientData, "no frames supplied");
        }
        if frames.iter().any(VideoFrame::is_malformed) {
            log::warn!("Malformed frame in video input, returning fixed moderate score");
            return AnalysisReport::malformed(
                self.config.decision.malformed_input_score,
                "frame buffer does not match its declared dimensions",
            );
        }

        let mut tracker = TemporalTracker::new(self.config.temporal.clone());

        // Per-frame accumulation
        let mut face_scores: Vec<f32> = Vec::new();
        let mut contour_scores: Vec<f32> = Vec::new();
        let mut mesh_scores: Vec<f32> = Vec::new();
        let mut visual_scores: Vec<f32> = Vec::new();
        let mut mouth_openings: Vec<f32> = Vec::new();
        let mut findings: HashMap<ReasonKind, Vec<String>> = HashMap::new();
        let mut model_sums: HashMap<Capability, (f32, usize)> = HashMap::new();
        let mut frames_with_face = 0usize;

        for frame in frames {
            let stats = pixels::extract_stats(frame);
            let visual = heuristics::visual::analyze(&stats, &self.config.visual);
            extend_findings(&mut findings, ReasonKind::VisualArtifact, &visual.findings);
            visual_scores.push(visual.score);

            let Some(face) = &frame.face else { continue };
            frames_with_face += 1;
            tracker.record_frame(FrameSnapshot::from_observation(frame.timestamp_ms, face));

            let geometry = landmarks::extract_geometry(face);
            let face_out = heuristics::face::analyze(&geometry, &self.config.face);
            extend_findings(&mut findings, ReasonKind::FacialGeometry, &face_out.findings);
            face_scores.push(face_out.score);

            let contour_out = heuristics::lips::analyze_contour(&face.mouth_contour, &self.config.contour);
            extend_findings(&mut findings, ReasonKind::FacialGeometry, &contour_out.findings);
            contour_scores.push(contour_out.score);

            if let Some(points) = &face.mesh {
                let metrics = mesh_features::extract_metrics(points);
                let mesh_out = heuristics::mesh::analyze(&metrics, &self.config.mesh);
                extend_findings(&mut findings, ReasonKind::FacialGeometry, &mesh_out.findings);
                mesh_scores.push(mesh_out.score);
            }

            if let Some(opening) = contour::opening_ratio(&face.mouth_contour) {
                mouth_openings.push(opening);
            }

            // Frame-level model inputs share the versioned layout
            let vector = features::build_frame_vector(frame, Some(face));
            for capability in [
                Capability::FaceLandmark,
                Capability::FaceMesh,
                Capability::VisualArtifact,
                Capability::GanArtifact,
            ] {
                if self.registry.is_model_backed(capability) {
                    let entry = model_sums.entry(capability).or_insert((0.0, 0));
                    entry.0 += self.registry.score(capability, vector.as_slice());
                    entry.1 += 1;
                }
            }
        }

        // Temporal pass over the recorded window
        let temporal = tracker.analyze();
        if temporal.composite > 0.0 || !temporal.insufficient_data {
            extend_findings(
                &mut findings,
                ReasonKind::TemporalInconsistency,
                &temporal.findings,
            );
        }

        // Audio-visual sync: mouth-opening series vs per-frame audio energy
        let mut av_sync_score = 0.0f32;
        let mut voice_score = 0.0f32;
        let mut voice_model: Option<f32> = None;
        if let Some(track) = audio.filter(|t| !t.is_empty()) {
            let energy = per_frame_energy(&track.samples, frames.len());
            let sync = heuristics::lips::analyze_sync(&mouth_openings, &energy);
            extend_findings(&mut findings, ReasonKind::AudioVisualSync, &sync.findings);
            av_sync_score = sync.score;

            let voice = heuristics::voice::analyze(&track.samples, track.sample_rate, &self.config.voice);
            extend_findings(&mut findings, ReasonKind::VoiceSynthesis, &voice.findings);
            voice_score = voice.score;

            if self.registry.is_model_backed(Capability::AudioSynthesis) {
                let input = audio_model_input(track, &self.config.voice);
                voice_model = Some(self.registry.score(Capability::AudioSynthesis, &input));
            }
        }

        let model_mean = |cap: Capability| -> Option<f32> {
            model_sums.get(&cap).map(|(sum, n)| sum / (*n).max(1) as f32)
        };

        let channels = VideoChannelScores {
            visual_artifact: ensemble::fuse(mean(&visual_scores), model_mean(Capability::VisualArtifact)),
            face_landmark: ensemble::fuse(
                mean2(&face_scores, &contour_scores),
                model_mean(Capability::FaceLandmark),
            ),
            face_mesh: ensemble::fuse(mean(&mesh_scores), model_mean(Capability::FaceMesh)),
            temporal: temporal.composite,
            gan_artifact: ensemble::fuse(0.0, model_mean(Capability::GanArtifact)),
            av_sync: av_sync_score,
            voice_synthesis: ensemble::fuse(voice_score, voice_model),
        };

        let composite = ensemble::video_composite(&channels, &self.config.ensemble, temporal.coherence);
        let verdict = ensemble::decide_video(composite, &self.config.decision);

        let mut reasons = build_reasons(&findings, &channels, temporal.composite);
        if temporal.insufficient_data {
            reasons.push(ThreatReason::new(
                ReasonKind::InsufficientData,
                "Limited temporal evidence",
                temporal.findings.first().cloned().unwrap_or_default(),
            ));
        }

        let face_ratio = frames_with_face as f32 / frames.len() as f32;
        let window_fill =
            (frames.len() as f32 / self.config.temporal.capacity as f32).min(1.0);
        let confidence = (face_ratio * 0.6 + window_fill * 0.4).clamp(0.0, 1.0);

        let mut model_scores = channel_map(&channels);
        model_scores.insert("temporal_coherence".to_string(), temporal.coherence);

        AnalysisReport {
            score: composite * 100.0,
            is_positive: verdict.is_positive,
            requires_review: verdict.requires_review,
            confidence,
            reasons,
            model_scores,
        }
    }

    // ------------------------------------------------------------------
    // Text analysis
    // ------------------------------------------------------------------

    /// Scan a text message for scam indicators. The composite is reweighted
    /// by the adaptive pattern weights before the verdict is taken.
    pub fn analyze_text(&self, message: &TextMessage) -> AnalysisReport {
        if message.is_empty() {
            return AnalysisReport::insufficient(ReasonKind::InsufficientData, "empty message body");
        }

        let scan = heuristics::text::analyze(&message.body, &self.config.text);

        let model = if self.registry.is_model_backed(Capability::TextClassifier) {
            let input = text_model_input(&message.body, &scan);
            Some(self.registry.score(Capability::TextClassifier, &input))
        } else {
            None
        };
        let fused = ensemble::fuse(scan.score, model);

        // Pattern-weight adjustment operates on the 0-100 scale
        let matched = scan.matched_pattern_ids();
        let adjusted = self.learning.calculate_adjusted_score(fused * 100.0, &matched);
        let mut score = adjusted;

        // A sender in the user's contacts dampens the lexical score; the
        // community floor below still overrides for known-bad content
        let known_contact = message
            .sender
            .as_ref()
            .map_or(false, |s| s.known_contact);
        if known_contact {
            score *= self.config.text.known_contact_dampening;
        }

        let mut reasons: Vec<ThreatReason> = Vec::new();
        for technique in &scan.techniques {
            reasons.push(
                ThreatReason::new(
                    ReasonKind::ManipulationLanguage,
                    technique.name,
                    format!("Triggered by: {}", technique.triggers.join(", ")),
                )
                .with_evidence(technique.id),
            );
        }
        for link in &scan.suspicious_links {
            reasons.push(
                ThreatReason::new(
                    ReasonKind::SuspiciousLink,
                    "Suspicious link",
                    "URL structure matches known phishing patterns",
                )
                .with_evidence(link.clone()),
            );
        }

        // Community corroboration by content hash
        let hash = content_hash(&message.body);
        if let Some(report) = self.community.lookup(&hash) {
            reasons.push(
                ThreatReason::new(
                    ReasonKind::CommunityReport,
                    "Reported by the community",
                    format!("{} independent reports", report.report_count),
                )
                .with_evidence(format!("{:?}", report.severity)),
            );
            if report.severity >= Severity::High && report.report_count >= COMMUNITY_REPORT_QUORUM {
                score = score.max(COMMUNITY_SCORE_FLOOR);
            }
        }

        let verdict = ensemble::decide_text(score / 100.0, &self.config.decision);
        let mut model_scores = HashMap::new();
        model_scores.insert("text_heuristic".to_string(), scan.score);
        model_scores.insert("urgency".to_string(), scan.urgency_score);
        if let Some(m) = model {
            model_scores.insert(Capability::TextClassifier.as_str().to_string(), m);
        }

        // Short texts carry less signal
        let token_count = text_features::tokenize(&message.body).len();
        let confidence = ((token_count as f32 / 20.0).min(1.0) * 0.7
            + if matched.is_empty() { 0.0 } else { 0.3 })
        .clamp(0.0, 1.0);

        AnalysisReport {
            score,
            is_positive: verdict.is_positive,
            requires_review: verdict.requires_review,
            confidence,
            reasons,
            model_scores,
        }
    }

    /// Lexical URL scan plus community lookup, without surrounding text
    pub fn scan_url(&self, url: &str) -> AnalysisReport {
        if url.trim().is_empty() {
            return AnalysisReport::insufficient(ReasonKind::InsufficientData, "empty url");
        }
        // Not URL-shaped at all: suspicious but inconclusive
        if !url.contains('.') && !url.contains("://") {
            return AnalysisReport::malformed(
                self.config.decision.malformed_input_score,
                "input does not parse as a URL",
            );
        }

        let mut score = 0.0f32;
        let mut reasons = Vec::new();
        if heuristics::text::is_suspicious_url(url) {
            score = 80.0;
            reasons.push(
                ThreatReason::new(
                    ReasonKind::SuspiciousLink,
                    "Suspicious link",
                    "URL structure matches known phishing patterns",
                )
                .with_evidence(url.to_string()),
            );
        }

        if let Some(report) = self.community.lookup(&content_hash(url)) {
            score = score.max(COMMUNITY_SCORE_FLOOR);
            reasons.push(
                ThreatReason::new(
                    ReasonKind::CommunityReport,
                    "Reported by the community",
                    format!("{} independent reports", report.report_count),
                )
                .with_evidence(format!("{:?}", report.severity)),
            );
        }

        let verdict = ensemble::decide_text(score / 100.0, &self.config.decision);
        AnalysisReport {
            score,
            is_positive: verdict.is_positive,
            requires_review: verdict.requires_review,
            confidence: if reasons.is_empty() { 0.5 } else { 0.8 },
            reasons,
            model_scores: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Feedback & community
    // ------------------------------------------------------------------

    /// Record user feedback on a prior detection. `original_text` is the
    /// analyzed content when the caller can still supply it; confirmed
    /// threats get mined for new patterns.
    pub fn record_feedback(&self, feedback: UserFeedback, original_text: Option<&str>) {
        self.learning.record_feedback(feedback, original_text);
    }

    /// Submit a community threat report, deduplicated by content hash
    pub fn report_threat(
        &self,
        content: &str,
        kind: ThreatKind,
        severity: Severity,
        region: Option<String>,
    ) -> u32 {
        self.community.submit(&content_hash(content), kind, severity, region)
    }

    // ------------------------------------------------------------------
    // Async wrappers
    // ------------------------------------------------------------------

    /// `analyze_video` on the blocking pool
    pub async fn analyze_video_async(
        self: Arc<Self>,
        frames: Vec<VideoFrame>,
        audio: Option<AudioTrack>,
    ) -> AnalysisReport {
        run_blocking(move || self.analyze_video(&frames, audio.as_ref())).await
    }

    /// `analyze_text` on the blocking pool
    pub async fn analyze_text_async(self: Arc<Self>, message: TextMessage) -> AnalysisReport {
        run_blocking(move || self.analyze_text(&message)).await
    }
}

async fn run_blocking<F>(job: F) -> AnalysisReport
where
    F: FnOnce() -> AnalysisReport + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("Analysis task failed: {}", e);
            AnalysisReport::insufficient(ReasonKind::InsufficientData, "analysis task failed")
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Mean over two concatenated series (landmark + contour scores share the
/// face-landmark channel)
fn mean2(a: &[f32], b: &[f32]) -> f32 {
    let total = a.len() + b.len();
    if total == 0 {
        0.0
    } else {
        (a.iter().sum::<f32>() + b.iter().sum::<f32>()) / total as f32
    }
}

fn extend_findings(
    findings: &mut HashMap<ReasonKind, Vec<String>>,
    kind: ReasonKind,
    new: &[String],
) {
    if !new.is_empty() {
        findings.entry(kind).or_default().extend_from_slice(new);
    }
}

/// RMS energy per video frame, splitting the PCM buffer into equal chunks
fn per_frame_energy(samples: &[f32], frame_count: usize) -> Vec<f32> {
    if frame_count == 0 || samples.is_empty() {
        return Vec::new();
    }
    let chunk = (samples.len() / frame_count).max(1);
    samples
        .chunks(chunk)
        .take(frame_count)
        .map(audio_features::rms)
        .collect()
}

/// Summary input vector for the audio-synthesis model slot
fn audio_model_input(track: &AudioTrack, config: &crate::config::VoiceConfig) -> [f32; AUDIO_INPUT_LEN] {
    let features = audio_features::extract_features(
        &track.samples,
        track.sample_rate,
        config.chunk_size,
        config.silence_rms,
    );
    let energy_mean = mean(&features.chunk_energy);
    let energy_cv = audio_features::relative_variation(&features.chunk_energy).unwrap_or(0.0);
    [
        features.jitter.unwrap_or(0.0),
        features.shimmer.unwrap_or(0.0),
        features.flatness.unwrap_or(0.0),
        features.silence_ratio,
        energy_mean,
        energy_cv,
        (track.duration_secs() / 60.0).min(1.0),
        (features.chunk_energy.len() as f32 / 100.0).min(1.0),
    ]
}

/// Lexical summary vector for the text-classifier model slot
fn text_model_input(body: &str, scan: &heuristics::text::TextScanResult) -> [f32; TEXT_INPUT_LEN] {
    let tokens = text_features::tokenize(body);
    let chars = body.chars().count().max(1);
    let exclaim = body.chars().filter(|c| *c == '!').count() as f32 / chars as f32;
    let upper = body.chars().filter(|c| c.is_uppercase()).count() as f32 / chars as f32;
    [
        scan.urgency_score,
        (scan.techniques.len() as f32 / 5.0).min(1.0),
        (scan.suspicious_links.len() as f32).min(1.0),
        (tokens.len() as f32 / 50.0).min(1.0),
        exclaim.min(1.0),
        upper.min(1.0),
        if body.to_lowercase().contains("http") { 1.0 } else { 0.0 },
        scan.score,
    ]
}

/// Per-channel scores keyed for the report's `model_scores` map
fn channel_map(channels: &VideoChannelScores) -> HashMap<String, f32> {
    let mut map = HashMap::new();
    map.insert("visual_artifact".to_string(), channels.visual_artifact);
    map.insert("face_landmark".to_string(), channels.face_landmark);
    map.insert("face_mesh".to_string(), channels.face_mesh);
    map.insert("temporal".to_string(), channels.temporal);
    map.insert("gan_artifact".to_string(), channels.gan_artifact);
    map.insert("av_sync".to_string(), channels.av_sync);
    map.insert("voice_synthesis".to_string(), channels.voice_synthesis);
    map
}

fn build_reasons(
    findings: &HashMap<ReasonKind, Vec<String>>,
    channels: &VideoChannelScores,
    temporal_composite: f32,
) -> Vec<ThreatReason> {
    let mut reasons = Vec::new();
    let channel_floor: [(ReasonKind, f32, &str); 5] = [
        (ReasonKind::VisualArtifact, channels.visual_artifact, "Visual artifacts"),
        (ReasonKind::FacialGeometry, channels.face_landmark.max(channels.face_mesh), "Facial geometry anomalies"),
        (ReasonKind::TemporalInconsistency, temporal_composite, "Temporal inconsistencies"),
        (ReasonKind::AudioVisualSync, channels.av_sync, "Audio-visual desynchronization"),
        (ReasonKind::VoiceSynthesis, channels.voice_synthesis, "Voice synthesis indicators"),
    ];

    for (kind, score, title) in channel_floor {
        if score < REASON_FLOOR {
            continue;
        }
        let detail = findings
            .get(&kind)
            .map(|f| f.join("; "))
            .unwrap_or_else(|| "model-detected anomaly".to_string());
        reasons.push(ThreatReason::new(kind, title, detail));
    }
    reasons
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FaceBox, FaceObservation, LandmarkId, Point2, SenderContext};
    use std::collections::HashMap as Map;

    fn natural_face() -> FaceObservation {
        let mut landmarks = Map::new();
        landmarks.insert(LandmarkId::LeftEye, Point2::new(32.0, 50.0));
        landmarks.insert(LandmarkId::RightEye, Point2::new(67.0, 50.0));
        landmarks.insert(LandmarkId::NoseBase, Point2::new(50.0, 84.0));
        landmarks.insert(LandmarkId::MouthLeft, Point2::new(30.0, 105.0));
        landmarks.insert(LandmarkId::MouthRight, Point2::new(70.0, 105.0));
        FaceObservation {
            left_eye_open: Some(0.9),
            right_eye_open: Some(0.9),
            smile: Some(0.2),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            landmarks,
            mouth_contour: Vec::new(),
            mesh: None,
            bounds: FaceBox {
                center_x: 50.0,
                center_y: 70.0,
                width: 100.0,
                height: 140.0,
            },
        }
    }

    fn frame(timestamp_ms: i64, face: Option<FaceObservation>) -> VideoFrame {
        VideoFrame {
            timestamp_ms,
            width: 16,
            height: 16,
            pixels: vec![128u8; 16 * 16 * 4],
            face,
        }
    }

    fn engine() -> DetectionEngine {
        let _ = env_logger::builder().is_test(true).try_init();
        DetectionEngine::with_defaults()
    }

    #[test]
    fn test_invalid_weights_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.ensemble.visual_artifact = 0.9;
        assert!(DetectionEngine::new(config).is_err());
    }

    #[test]
    fn test_empty_video_is_insufficient() {
        let report = engine().analyze_video(&[], None);
        assert!(!report.is_positive);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.reasons[0].kind, ReasonKind::InsufficientData);
    }

    #[test]
    fn test_malformed_frame_fixed_moderate_score() {
        let bad = VideoFrame {
            timestamp_ms: 0,
            width: 16,
            height: 16,
            pixels: vec![0u8; 7], // wrong length
            face: None,
        };
        let report = engine().analyze_video(&[frame(0, None), bad], None);
        assert_eq!(report.score, 50.0);
        assert!(!report.is_positive);
        assert!(report.requires_review);
        assert_eq!(report.reasons[0].kind, ReasonKind::MalformedInput);
    }

    #[test]
    fn test_natural_video_scores_low() {
        // Natural blinking face across 6 seconds
        let e = engine();
        let frames: Vec<VideoFrame> = (0..30)
            .map(|i| {
                let mut face = natural_face();
                if i % 12 == 6 {
                    face.left_eye_open = Some(0.1);
                    face.right_eye_open = Some(0.1);
                }
                // Natural head drift
                face.yaw = (i as f32 * 0.7).sin() * 2.0;
                face.pitch = (i as f32 * 0.5).cos() * 1.5;
                frame(i * 200, Some(face))
            })
            .collect();
        let report = e.analyze_video(&frames, None);
        assert!(!report.is_positive, "score {} reasons {:?}", report.score, report.reasons);
    }

    #[test]
    fn test_static_face_surfaces_temporal_findings() {
        // 30 identical frames over >5s: no blinks, frozen pose
        let e = engine();
        let frames: Vec<VideoFrame> =
            (0..30).map(|i| frame(i * 200, Some(natural_face()))).collect();
        let report = e.analyze_video(&frames, None);
        let coherence = report.model_scores.get("temporal_coherence").copied().unwrap();
        assert!(coherence < 1.0);
        assert!(report.model_scores.get("temporal").copied().unwrap() > 0.0);
    }

    #[test]
    fn test_four_frames_skip_temporal_analysis() {
        let e = engine();
        let frames: Vec<VideoFrame> =
            (0..4).map(|i| frame(i * 2000, Some(natural_face()))).collect();
        let report = e.analyze_video(&frames, None);
        // 8 seconds with zero blinks, but under the frame minimum - no flag
        assert_eq!(report.model_scores.get("temporal").copied().unwrap(), 0.0);
        assert!(report
            .reasons
            .iter()
            .any(|r| r.kind == ReasonKind::InsufficientData));
    }

    #[test]
    fn test_scam_text_positive_with_reasons() {
        let e = engine();
        let message = TextMessage::new(
            "URGENT: your account has been suspended. Verify now immediately \
             at http://192.168.4.12/secure or face legal action within 24 hours",
        );
        let report = e.analyze_text(&message);
        assert!(report.is_positive, "score was {}", report.score);
        assert!(report
            .reasons
            .iter()
            .any(|r| r.kind == ReasonKind::ManipulationLanguage));
        assert!(report
            .reasons
            .iter()
            .any(|r| r.kind == ReasonKind::SuspiciousLink));
    }

    #[test]
    fn test_known_contact_dampens_text_score() {
        let e = engine();
        let body = "URGENT: your account has been suspended. Verify now immediately \
                    at http://192.168.4.12/secure or face legal action within 24 hours";

        let stranger = e.analyze_text(&TextMessage::new(body));

        let mut from_contact = TextMessage::new(body);
        from_contact.sender = Some(SenderContext {
            known_contact: true,
            ..Default::default()
        });
        let dampened = e.analyze_text(&from_contact);

        assert!(dampened.score < stranger.score);
        let expected = stranger.score * e.config().text.known_contact_dampening;
        assert!((dampened.score - expected).abs() < 1e-3);

        // An unknown sender context changes nothing
        let mut from_unknown = TextMessage::new(body);
        from_unknown.sender = Some(SenderContext::default());
        assert_eq!(e.analyze_text(&from_unknown).score, stranger.score);
    }

    #[test]
    fn test_benign_text_negative() {
        let report = engine().analyze_text(&TextMessage::new(
            "Hey, are we still meeting for lunch tomorrow at noon?",
        ));
        assert!(!report.is_positive);
        assert!(report.score < 30.0);
    }

    #[test]
    fn test_empty_text_insufficient() {
        let report = engine().analyze_text(&TextMessage::new("   "));
        assert_eq!(report.reasons[0].kind, ReasonKind::InsufficientData);
    }

    #[test]
    fn test_feedback_degrades_noisy_pattern() {
        let e = engine();
        let message = TextMessage::new("Please act now, this expires immediately - urgent");
        let before = e.analyze_text(&message).score;

        // The user keeps rejecting urgency-driven detections
        for _ in 0..10 {
            e.record_feedback(
                UserFeedback::new(
                    content_hash(&message.body),
                    true,
                    false,
                    before,
                    vec!["urgency_pressure".to_string()],
                ),
                None,
            );
        }

        let after = e.analyze_text(&message).score;
        assert!(after < before, "score {} should drop below {}", after, before);
    }

    #[test]
    fn test_confirmed_feedback_mines_patterns() {
        let e = engine();
        e.record_feedback(
            UserFeedback::new("h", true, true, 80.0, vec![]),
            Some("wire money through gift cards before midnight"),
        );
        assert!(e.learning().learning_stats().new_patterns_discovered > 0);
    }

    #[test]
    fn test_community_report_raises_text_score() {
        let e = engine();
        let body = "hello, claim your prize";
        for _ in 0..3 {
            e.report_threat(body, ThreatKind::ScamMessage, Severity::High, None);
        }
        let report = e.analyze_text(&TextMessage::new(body));
        assert!(report.score >= COMMUNITY_SCORE_FLOOR);
        assert!(report
            .reasons
            .iter()
            .any(|r| r.kind == ReasonKind::CommunityReport));
    }

    #[test]
    fn test_scan_url() {
        let e = engine();
        let bad = e.scan_url("http://192.168.1.44/paypal/login");
        assert!(bad.is_positive);
        assert_eq!(bad.reasons[0].kind, ReasonKind::SuspiciousLink);

        let fine = e.scan_url("https://en.wikipedia.org/wiki/Rust");
        assert!(!fine.is_positive);
        assert!(fine.reasons.is_empty());
    }

    #[test]
    fn test_scan_url_unparseable_is_moderate() {
        let report = engine().scan_url("not a url at all");
        assert_eq!(report.score, 50.0);
        assert!(report.requires_review);
        assert_eq!(report.reasons[0].kind, ReasonKind::MalformedInput);
    }

    #[test]
    fn test_scan_url_community_hit() {
        let e = engine();
        let url = "https://totally-legit.example/login";
        e.report_threat(url, ThreatKind::PhishingUrl, Severity::Critical, None);
        let report = e.scan_url(url);
        assert!(report.score >= COMMUNITY_SCORE_FLOOR);
    }

    #[test]
    fn test_video_with_empty_audio_track() {
        // Empty track behaves exactly like no track
        let e = engine();
        let frames: Vec<VideoFrame> =
            (0..6).map(|i| frame(i * 100, Some(natural_face()))).collect();
        let silent = AudioTrack { samples: Vec::new(), sample_rate: 16_000 };
        let with = e.analyze_video(&frames, Some(&silent));
        let without = e.analyze_video(&frames, None);
        assert_eq!(with.score, without.score);
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let e = Arc::new(engine());
        let report = e
            .clone()
            .analyze_text_async(TextMessage::new("verify now, account suspended, act now"))
            .await;
        assert!(report.score > 0.0);

        let frames: Vec<VideoFrame> = (0..6).map(|i| frame(i * 100, None)).collect();
        let report = e.analyze_video_async(frames, None).await;
        assert!(!report.is_positive);
    }
}
