// =============================================================================
// config.rs: THE KNOBS
// =============================================================================
//
// The analysis core has no configuration. The lexicon is compiled in, the
// scoring constants are load-bearing, and nobody gets to tune "how positive
// is 'excellent'" from an env var.
//
// The batch runner is different. It needs to know what to run, where the
// batch lives, how loud to be and how big the channel is. All of that comes
// from CITATION_RADAR_* environment variables (or a .env file), with
// defaults that work out of the box.
//
// Numeric knobs fall back to their default when unparseable. Labels (mode,
// language, model) do not: a typo in CITATION_RADAR_MODE should stop the run,
// not quietly run the wrong report.
// =============================================================================

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};
use crate::models::{AiModel, Language};

/// What the runner produces from a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full MarketAnalysis over the batch.
    Landscape,
    /// The lightweight CompetitiveMetrics scoreboard.
    Metrics,
    /// One CitationRecord per response, via the model adapters.
    Detect,
    /// QuerySet for a single base query. Reads no batch.
    Variations,
    /// Monitoring schedule plus high-priority queries. Reads no batch.
    Schedule,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Landscape => "landscape",
            RunMode::Metrics => "metrics",
            RunMode::Detect => "detect",
            RunMode::Variations => "variations",
            RunMode::Schedule => "schedule",
        }
    }

    /// Whether this mode consumes a response batch.
    pub fn reads_batch(&self) -> bool {
        matches!(self, RunMode::Landscape | RunMode::Metrics | RunMode::Detect)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(RunMode::Landscape),
            "metrics" => Ok(RunMode::Metrics),
            "detect" => Ok(RunMode::Detect),
            "variations" => Ok(RunMode::Variations),
            "schedule" => Ok(RunMode::Schedule),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: RunMode,

    /// Path of the JSON batch. "-" reads stdin.
    pub input: String,

    /// Ranking vocabulary for `landscape` and `metrics` runs. `detect` runs
    /// use each model's own detection language.
    pub language: Language,

    /// Base query for `variations` mode.
    pub query: Option<String>,

    /// Model assumed for records that don't say which model answered.
    pub default_model: AiModel,

    /// Pretty-print JSON output.
    pub pretty: bool,

    /// Bound of the reader -> worker channel.
    pub channel_capacity: usize,

    /// Citations below this confidence are counted and logged as weak.
    pub min_confidence: f64,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` is this over the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let min_confidence: f64 = get("CITATION_RADAR_MIN_CONFIDENCE", "0.3").parse().unwrap_or(0.3);
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(EngineError::Config(format!(
                "CITATION_RADAR_MIN_CONFIDENCE must be within [0, 1], got {min_confidence}"
            )));
        }

        Ok(Config {
            mode: get("CITATION_RADAR_MODE", "landscape").parse()?,
            input: get("CITATION_RADAR_INPUT", "-"),
            language: get("CITATION_RADAR_LANGUAGE", "english").parse()?,
            query: lookup("CITATION_RADAR_QUERY").filter(|q| !q.trim().is_empty()),
            default_model: get("CITATION_RADAR_DEFAULT_MODEL", "chatgpt").parse()?,
            pretty: parse_bool(&get("CITATION_RADAR_PRETTY", "true"), true),
            channel_capacity: get("CITATION_RADAR_CHANNEL_CAPACITY", "1024")
                .parse()
                .ok()
                .filter(|c| *c > 0)
                .unwrap_or(1024),
            min_confidence,
            log_json: parse_bool(&get("CITATION_RADAR_LOG_JSON", "false"), false),
        })
    }

    /// The first CLI argument, when given, picks the mode.
    pub fn with_mode_arg(mut self, arg: Option<&str>) -> Result<Self> {
        if let Some(arg) = arg {
            self.mode = arg.parse()?;
        }
        Ok(self)
    }

    pub fn reads_stdin(&self) -> bool {
        self.input == "-"
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
