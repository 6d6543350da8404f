//! Clipmeter core: pure data types, the LRU cache and text metrics.
mod config;
mod control;
mod detector;
mod lru;
mod metrics;
mod signature;
mod types;

pub use config::{
    ConfigError, PipelineConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_POLL_INTERVAL,
    DEFAULT_QUEUE_CAPACITY,
};
pub use control::{ControlSignal, ControlState};
pub use detector::ChangeDetector;
pub use lru::{CacheError, Keys, LruCache, NodeId, RecencyList};
pub use metrics::{char_count, word_count};
pub use signature::{signature, DEFAULT_SIGNATURE_LIMIT};
pub use types::{AnalysisResult, FailureKind, Outcome, PipelineError, TextSnapshot};
