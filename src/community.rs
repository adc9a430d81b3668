//! Community Threat Store
//!
//! In-memory store of community-reported threats, deduplicated by content
//! hash. Duplicate reports merge rather than append: the count bumps, the
//! severity keeps the worse of the two, and last-seen refreshes. Sync with
//! any remote feed is a collaborator's concern, not this store's.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::report::{Severity, ThreatKind, ThreatReport};

pub struct CommunityThreatStore {
    reports: RwLock<HashMap<String, ThreatReport>>,
}

impl Default for CommunityThreatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityThreatStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or merge a report. Returns the report count after the merge.
    pub fn submit(
        &self,
        content_hash: &str,
        kind: ThreatKind,
        severity: Severity,
        region: Option<String>,
    ) -> u32 {
        let now = Utc::now();
        let mut reports = self.reports.write();
        match reports.get_mut(content_hash) {
            Some(existing) => {
                existing.report_count += 1;
                existing.severity = existing.severity.max(severity);
                existing.last_seen = now;
                if existing.region.is_none() {
                    existing.region = region;
                }
                existing.report_count
            }
            None => {
                reports.insert(
                    content_hash.to_string(),
                    ThreatReport {
                        content_hash: content_hash.to_string(),
                        kind,
                        severity,
                        report_count: 1,
                        first_seen: now,
                        last_seen: now,
                        region,
                        metadata: HashMap::new(),
                    },
                );
                1
            }
        }
    }

    /// Known report for a content hash, if any
    pub fn lookup(&self, content_hash: &str) -> Option<ThreatReport> {
        self.reports.read().get(content_hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Reports at or above a severity floor, most-reported first
    pub fn by_severity(&self, floor: Severity) -> Vec<ThreatReport> {
        let reports = self.reports.read();
        let mut hits: Vec<ThreatReport> = reports
            .values()
            .filter(|r| r.severity >= floor)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.report_count.cmp(&a.report_count));
        hits
    }
}

// ============================================================================
// TESTS
// ============================================================================
