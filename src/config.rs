//! Runtime configuration for signature extraction and simplification.
//!
//! Unlike `grit_genomics::config`'s process-global atomic flag, the two
//! parameters here (`block_size`, `filter_threshold`) are threaded explicitly
//! through every builder/simplifier call. They directly shape which nodes get
//! created, merged, or pruned, so making them implicit global state would let
//! a forgotten `set_*` call silently change the result of an otherwise pure
//! computation — unacceptable for a core whose correctness is invariant-driven.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("block_size must be >= 1")]
    InvalidBlockSize,
}

/// Tunables for the signature extractor (§4.B) and simplifier (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Width of a signature window in loci. Default 20.
    pub block_size: usize,
    /// Minimum specimen support a node must retain during `neglect_nodes`. Default 4.
    pub filter_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 20,
            filter_threshold: 4,
        }
    }
}

impl Config {
    pub fn new(block_size: usize, filter_threshold: usize) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        Ok(Self {
            block_size,
            filter_threshold,
        })
    }
}
