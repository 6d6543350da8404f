use std::time::Duration;

use thiserror::Error;

use crate::{CacheError, DEFAULT_SIGNATURE_LIMIT};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(17);
pub const DEFAULT_CACHE_CAPACITY: usize = 16;
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("signature limit must be at least 1")]
    ZeroSignatureLimit,
    #[error("cache capacity must be at least 1")]
    ZeroCacheCapacity,
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
}

impl From<CacheError> for ConfigError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::ZeroCapacity => ConfigError::ZeroCacheCapacity,
        }
    }
}

/// Settings fixed when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub poll_interval: Duration,
    /// Initial signature limit; adjustable later through the control handle.
    pub signature_limit: usize,
    pub cache_capacity: usize,
    /// Capacity of each of the two stage queues.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            signature_limit: DEFAULT_SIGNATURE_LIMIT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.signature_limit == 0 {
            return Err(ConfigError::ZeroSignatureLimit);
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}
