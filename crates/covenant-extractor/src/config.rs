//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum section size handed to a single partial extraction (characters)
    pub max_chunk_size: usize,

    /// Sub-sections smaller than this are merged into the following one (characters)
    pub min_chunk_size: usize,

    /// Documents longer than this use map-reduce (characters)
    pub map_reduce_threshold: usize,

    /// Attempts allowed for single-pass extraction, including the first
    pub max_attempts: u32,

    /// Partial extractions allowed in flight at once
    pub map_concurrency: usize,

    /// Maximum time for a single capability call (seconds)
    pub extraction_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.min_chunk_size >= self.max_chunk_size {
            return Err("min_chunk_size must be smaller than max_chunk_size".to_string());
        }
        if self.map_reduce_threshold == 0 {
            return Err("map_reduce_threshold must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.map_concurrency == 0 {
            return Err("map_concurrency must be at least 1".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_chunk_size: 8_000,
            min_chunk_size: 500,
            map_reduce_threshold: 50_000,
            max_attempts: 3,
            map_concurrency: 4,
            extraction_timeout_secs: 120,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: smaller sections, fewer retries, more parallelism
    pub fn aggressive() -> Self {
        Self {
            max_chunk_size: 4_000,
            min_chunk_size: 250,
            map_reduce_threshold: 25_000,
            max_attempts: 2,
            map_concurrency: 8,
            extraction_timeout_secs: 60,
        }
    }

    /// Lenient preset: larger sections, more retries, longer timeouts
    pub fn lenient() -> Self {
        Self {
            max_chunk_size: 12_000,
            min_chunk_size: 1_000,
            map_reduce_threshold: 100_000,
            max_attempts: 5,
            map_concurrency: 2,
            extraction_timeout_secs: 300,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
