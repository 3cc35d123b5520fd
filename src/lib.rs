//! Citation Radar: did the AI model recommend DirectDrive Logistics, how
//! high, how warmly, and who else did it name?
//!
//! The analysis core ([`citation_detector`], [`competitive_analysis`],
//! [`query_variations`]) is pure and synchronous, and shares one immutable
//! [`keywords::KeywordSet`]. The runner pieces ([`config`], [`pipeline`],
//! [`metrics`]) feed JSON batches through it.

pub mod citation_detector;
pub mod competitive_analysis;
pub mod config;
pub mod error;
pub mod keywords;
pub mod metrics;
pub mod models;
pub mod monitors;
pub mod pipeline;
pub mod query_variations;
pub mod text_scanner;

pub use citation_detector::{CitationDetector, PositionThresholds};
pub use competitive_analysis::CompetitiveAnalyzer;
pub use error::{EngineError, Result};
pub use keywords::KeywordSet;
pub use models::{
    AiModel, CitationAnalysis, CitationRecord, CompetitiveMetrics, CompetitorMention,
    CompetitorProfile, Language, MarketAnalysis, MonitoringResult, PositionAnalysis, QuerySet,
    QueryVariation, ResponseRecord, ScheduleEntry,
};
pub use monitors::{AdapterSet, ModelProfile, ResponseAdapter};
pub use query_variations::QueryVariationGenerator;
