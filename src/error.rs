// =============================================================================
// error.rs: THE THINGS THAT CAN ACTUALLY GO WRONG
// =============================================================================
//
// The analysis core is total: any string goes in, a fully populated result
// comes out. "No citation found" is data, not an error. What CAN go wrong
// lives at the edges: somebody hands us a batch that isn't an array of
// {query, response}, a language we don't speak, or thresholds that don't
// ascend. Those fail fast, loudly, and with the contract they broke.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The input batch violated its shape contract.
    #[error("invalid response batch: {0}")]
    InvalidBatch(String),

    #[error("unknown language '{0}' (expected english, arabic, kurdish or farsi)")]
    UnknownLanguage(String),

    #[error("unknown AI model '{0}' (expected chatgpt, google-ai or perplexity)")]
    UnknownModel(String),

    #[error("unknown run mode '{0}' (expected landscape, metrics, detect, variations or schedule)")]
    UnknownMode(String),

    /// Rank fallback cut points must be strictly ascending inside (0, 1].
    #[error("invalid position thresholds {0:?}: cut points must ascend strictly within (0, 1]")]
    InvalidThresholds([f64; 4]),

    #[error("configuration error: {0}")]
    Config(String),

    /// A runner task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
