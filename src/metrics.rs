// ═══════════════════════════════════════════════════════════════
// RUN METRICS - How many answers did we grade, and how did we do
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters bumped by the runner worker while it grades a batch.
// Lock-free, so the Ctrl+C handler or anyone else holding the Arc can
// take a snapshot mid-run without stopping the worker.

use portable_atomic::{AtomicU64, Ordering};
use serde::Serialize;
use std::time::Instant;

use crate::models::AiModel;

/// What gets logged (and serialized) at the end of a run.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub responses_analyzed: u64,
    pub citations_detected: u64,
    pub weak_citations: u64,
    pub competitor_mentions: u64,
    pub records_rejected: u64,
    pub chatgpt_responses: u64,
    pub google_ai_responses: u64,
    pub perplexity_responses: u64,
    pub citation_rate: f64,
    pub uptime_seconds: f64,
    pub responses_per_second: f64,
}

pub struct EngineMetrics {
    responses_analyzed: AtomicU64,
    citations_detected: AtomicU64,
    weak_citations: AtomicU64,
    competitor_mentions: AtomicU64,
    records_rejected: AtomicU64,
    /// Indexed by `AiModel as usize`.
    per_model: [AtomicU64; 3],
    start_time: Instant,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            responses_analyzed: AtomicU64::new(0),
            citations_detected: AtomicU64::new(0),
            weak_citations: AtomicU64::new(0),
            competitor_mentions: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            per_model: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            start_time: Instant::now(),
        }
    }

    /// One analyzed response, answered by `model` (or the configured default).
    pub fn increment_analyzed(&self, model: AiModel) {
        self.responses_analyzed.fetch_add(1, Ordering::Relaxed);
        self.per_model[model as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_citations(&self) {
        self.citations_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_weak_citations(&self) {
        self.weak_citations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_competitor_mentions(&self, count: u64) {
        self.competitor_mentions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn responses_analyzed(&self) -> u64 {
        self.responses_analyzed.load(Ordering::Relaxed)
    }

    /// Lock-free read of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs_f64();
        let analyzed = self.responses_analyzed.load(Ordering::Relaxed);
        let cited = self.citations_detected.load(Ordering::Relaxed);

        let responses_per_second = if uptime > 0.0 {
            analyzed as f64 / uptime
        } else {
            0.0
        };
        let citation_rate = if analyzed > 0 {
            cited as f64 / analyzed as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            responses_analyzed: analyzed,
            citations_detected: cited,
            weak_citations: self.weak_citations.load(Ordering::Relaxed),
            competitor_mentions: self.competitor_mentions.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            chatgpt_responses: self.per_model[AiModel::ChatGpt as usize].load(Ordering::Relaxed),
            google_ai_responses: self.per_model[AiModel::GoogleAi as usize].load(Ordering::Relaxed),
            perplexity_responses: self.per_model[AiModel::Perplexity as usize].load(Ordering::Relaxed),
            citation_rate,
            uptime_seconds: uptime,
            responses_per_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_rates() {
        let metrics = EngineMetrics::new();
        metrics.increment_analyzed(AiModel::GoogleAi);
        metrics.increment_analyzed(AiModel::Perplexity);
        metrics.increment_citations();
        metrics.add_competitor_mentions(3);
        metrics.increment_rejected();

        let snap = metrics.snapshot();
        assert_eq!(snap.responses_analyzed, 2);
        assert_eq!(snap.google_ai_responses, 1);
        assert_eq!(snap.perplexity_responses, 1);
        assert_eq!(snap.chatgpt_responses, 0);
        assert_eq!(snap.competitor_mentions, 3);
        assert_eq!(snap.records_rejected, 1);
        assert!((snap.citation_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_has_zero_rates() {
        let snap = EngineMetrics::default().snapshot();
        assert_eq!(snap.citation_rate, 0.0);
        assert_eq!(snap.responses_analyzed, 0);
    }
}
