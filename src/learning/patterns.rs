//! Discovered Patterns
//!
//! Bigram phrases mined from user-confirmed threat texts. A pattern's
//! confidence saturates exponentially with repeat sightings, so one-off
//! phrases stay near zero while recurring scam wording climbs toward 1.0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::VecDeque;

/// Occurrence count at which confidence reaches ~0.63 (1 - 1/e)
const CONFIDENCE_SCALE: f32 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredPattern {
    /// The bigram phrase itself, lowercase
    pub phrase: String,
    pub occurrences: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl DiscoveredPattern {
    /// 1 - e^(-occurrences / 10), saturating toward 1.0
    pub fn confidence(&self) -> f32 {
        1.0 - (-(self.occurrences as f32) / CONFIDENCE_SCALE).exp()
    }
}

/// Bounded store of discovered patterns. When full, the least-recently
/// inserted phrase is evicted (FIFO on first sighting).
pub struct PatternStore {
    cap: usize,
    patterns: HashMap<String, DiscoveredPattern>,
    insertion_order: VecDeque<String>,
}

impl PatternStore {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            patterns: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Record one sighting of a phrase. Returns true when the phrase is new.
    pub fn record(&mut self, phrase: &str) -> bool {
        if let Some(existing) = self.patterns.get_mut(phrase) {
            existing.occurrences += 1;
            existing.last_seen = Utc::now();
            return false;
        }

        if self.patterns.len() >= self.cap {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.patterns.remove(&oldest);
            }
        }

        let now = Utc::now();
        self.patterns.insert(
            phrase.to_string(),
            DiscoveredPattern {
                phrase: phrase.to_string(),
                occurrences: 1,
                first_seen: now,
                last_seen: now,
            },
        );
        self.insertion_order.push_back(phrase.to_string());
        true
    }

    pub fn get(&self, phrase: &str) -> Option<&DiscoveredPattern> {
        self.patterns.get(phrase)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns at or above a confidence floor, most confident first
    pub fn confident(&self, floor: f32) -> Vec<&DiscoveredPattern> {
        let mut hits: Vec<&DiscoveredPattern> = self
            .patterns
            .values()
            .filter(|p| p.confidence() >= floor)
            .collect();
        hits.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
        hits
    }
}

// ============================================================================
// TESTS
// ============================================================================
