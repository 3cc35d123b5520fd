// =============================================================================
// pipeline.rs: THE BATCH RUNNER
// =============================================================================
//
// Somebody (n8n, a cron job, a tired analyst) hands us a JSON array of
// {query, response, aiModel} objects. We hand back one report.
//
// Architecture:
// 1. The batch's outer shape is checked up front. Not an array? Stop.
// 2. A reader task pushes records into a bounded crossbeam channel.
// 3. A blocking worker drains the channel: decodes each record (a bad one
//    stops the run with the record's index), runs detection once, bumps the
//    counters, and in detect mode stamps a CitationRecord per response.
// 4. When the channel closes, the worker aggregates the analyses it kept.
// 5. Ctrl+C flips a watch channel. The worker notices within one poll
//    interval and aggregates whatever it has so far.
// =============================================================================

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::competitive_analysis::CompetitiveAnalyzer;
use crate::config::{Config, RunMode};
use crate::error::{EngineError, Result};
use crate::keywords::KeywordSet;
use crate::metrics::EngineMetrics;
use crate::models::{
    AiModel, CitationAnalysis, CitationRecord, CompetitiveMetrics, MarketAnalysis, ResponseRecord,
};
use crate::monitors::AdapterSet;

const RECORD_CONTRACT: &str = "{query: string, response: string, aiModel?: string}";

/// How long the worker waits on an empty channel before re-checking shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Check the outer shape of a batch and hand back its elements.
pub fn split_batch(raw: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| EngineError::InvalidBatch(format!("not valid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(EngineError::InvalidBatch(format!(
            "expected a JSON array of {RECORD_CONTRACT} objects, got {}",
            json_kind(&other)
        ))),
    }
}

/// Decode one batch element. `index` only feeds the error message.
pub fn decode_record(index: usize, value: Value) -> Result<ResponseRecord> {
    serde_json::from_value(value)
        .map_err(|e| EngineError::InvalidBatch(format!("record {index} must be {RECORD_CONTRACT}: {e}")))
}

/// Strictly parse a whole batch. The first bad record fails the batch.
pub fn parse_batch(raw: &str) -> Result<Vec<ResponseRecord>> {
    split_batch(raw)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| decode_record(i, v))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The runner's report, serialized as-is.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchOutput {
    Landscape(MarketAnalysis),
    Metrics(CompetitiveMetrics),
    Records(Vec<CitationRecord>),
}

/// Everything the blocking worker needs, shared with the runner.
struct Worker {
    mode: RunMode,
    default_model: AiModel,
    min_confidence: f64,
    analyzer: CompetitiveAnalyzer,
    adapters: AdapterSet,
    metrics: Arc<EngineMetrics>,
}

impl Worker {
    fn consume(&self, receiver: Receiver<(usize, Value)>, shutdown: watch::Receiver<bool>) -> Result<BatchOutput> {
        let mut processed = 0usize;
        let mut records: Vec<ResponseRecord> = Vec::new();
        let mut analyses: Vec<CitationAnalysis> = Vec::new();
        let mut citations: Vec<CitationRecord> = Vec::new();

        loop {
            if *shutdown.borrow() {
                warn!(processed, "Shutdown requested, aggregating partial batch");
                break;
            }

            let (index, value) = match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let record = match decode_record(index, value) {
                Ok(record) => record,
                Err(e) => {
                    self.metrics.increment_rejected();
                    warn!(index, error = %e, "Rejecting batch");
                    return Err(e);
                }
            };

            let model = record.ai_model.unwrap_or(self.default_model);
            if self.mode == RunMode::Detect {
                // The model's own language and thresholds produce the row
                let adapter = self.adapters.adapter(model);
                let analysis = adapter.detect(&record.response);
                self.count(&record, model, &analysis);
                let result = adapter.monitoring_result(analysis, &record.response, Vec::new());
                citations.push(adapter.create_citation_record(&record.query, &result, None));
            } else {
                let analysis = self.analyzer.detect(&record);
                self.count(&record, model, &analysis);
                analyses.push(analysis);
                records.push(record);
            }
            processed += 1;
        }

        info!(records = processed, mode = %self.mode, "Batch consumed, aggregating");

        match self.mode {
            RunMode::Landscape => Ok(BatchOutput::Landscape(
                self.analyzer.summarize_landscape(&records, &analyses),
            )),
            RunMode::Metrics => Ok(BatchOutput::Metrics(self.analyzer.summarize_metrics(&analyses))),
            RunMode::Detect => Ok(BatchOutput::Records(citations)),
            other => Err(EngineError::Config(format!("mode '{other}' does not read a response batch"))),
        }
    }

    fn count(&self, record: &ResponseRecord, model: AiModel, analysis: &CitationAnalysis) {
        self.metrics.increment_analyzed(model);
        self.metrics
            .add_competitor_mentions(analysis.competitor_mentions.len() as u64);

        if analysis.cited {
            self.metrics.increment_citations();
            if analysis.confidence < self.min_confidence {
                self.metrics.increment_weak_citations();
                debug!(
                    query = %record.query,
                    model = %model,
                    confidence = format!("{:.3}", analysis.confidence),
                    "Weak citation"
                );
            }
        }
    }
}

/// Flip `shutdown` once `signal` fires. A listener that fails to install
/// leaves the run going to completion rather than cutting it short.
pub async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("🛑 Shutdown signal received, finishing with what we have");
            let _ = shutdown.send(true);
        }
        Err(err) => error!("❌ Signal listener error, Ctrl+C disabled: {}", err),
    }
}

pub struct BatchRunner {
    worker: Arc<Worker>,
    channel_capacity: usize,
}

impl BatchRunner {
    pub fn new(config: &Config, keywords: Arc<KeywordSet>) -> Result<Self> {
        let worker = Worker {
            mode: config.mode,
            default_model: config.default_model,
            min_confidence: config.min_confidence,
            analyzer: CompetitiveAnalyzer::new(Arc::clone(&keywords)).with_language(config.language),
            adapters: AdapterSet::new(keywords)?,
            metrics: Arc::new(EngineMetrics::new()),
        };
        Ok(Self {
            worker: Arc::new(worker),
            channel_capacity: config.channel_capacity,
        })
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.worker.metrics)
    }

    /// Run one raw JSON batch through the reader/worker pipeline.
    pub async fn run(&self, raw: &str, shutdown: watch::Receiver<bool>) -> Result<BatchOutput> {
        let items = split_batch(raw)?;
        info!(
            records = items.len(),
            capacity = self.channel_capacity,
            mode = %self.worker.mode,
            "Batch accepted"
        );

        let (tx, rx) = crossbeam_channel::bounded::<(usize, Value)>(self.channel_capacity);

        let worker = Arc::clone(&self.worker);
        let worker_handle = tokio::task::spawn_blocking(move || worker.consume(rx, shutdown));

        // Send fails once the worker has stopped; that's our cue to stop too
        let reader_handle = tokio::task::spawn_blocking(move || {
            let mut sent = 0usize;
            for item in items.into_iter().enumerate() {
                if tx.send(item).is_err() {
                    break;
                }
                sent += 1;
            }
            sent
        });

        let sent = reader_handle
            .await
            .map_err(|e| EngineError::Worker(format!("reader: {e}")))?;
        debug!(sent, "Reader finished");

        worker_handle
            .await
            .map_err(|e| EngineError::Worker(format!("analysis worker: {e}")))?
    }
}
