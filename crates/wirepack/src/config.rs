// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (buffer limits, pool size classes)
//! - **Level 2 (Dynamic)**: [`CodecConfig`], swapped atomically for the whole process
//!
//! Readers take a snapshot with [`global()`] (lock-free `ArcSwap` load); a
//! write buffer captures its limits once at creation, so swapping the config
//! never affects an encode call already in flight.
//!
//! # Example
//!
//! ```
//! use wirepack::config::{self, CodecConfig};
//!
//! let cfg = CodecConfig::builder()
//!     .initial_capacity(4096)
//!     .pool_enabled(true)
//!     .build()
//!     .unwrap();
//! config::set_global(cfg);
//! assert_eq!(config::global().initial_capacity, 4096);
//! # config::set_global(CodecConfig::default());
//! ```

use crate::error::{CodecError, Result};
use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

// =======================================================================
// Write buffer limits
// =======================================================================

/// Initial write buffer capacity when none is configured.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Largest byte array a write buffer may grow to.
///
/// Every encoding then fits a signed 32-bit length prefix.
pub const MAX_BUFFER_CAPACITY: usize = 0x7FFF_FFC7;

// =======================================================================
// Decode limits
// =======================================================================

/// Most elements a decoded count may claim beyond the bytes left in the
/// input. Only zero-sized elements can exceed the byte count at all.
pub const MAX_UNBACKED_ELEMENTS: usize = 1 << 16;

// =======================================================================
// Buffer pool size classes
// =======================================================================

/// Smallest pooled size class: 1 << 8 = 256 B.
pub const POOL_MIN_CLASS_SHIFT: u32 = 8;

/// Largest pooled size class: 1 << 24 = 16 MiB.
pub const POOL_MAX_CLASS_SHIFT: u32 = 24;

/// Number of pooled size classes.
pub const POOL_CLASS_COUNT: usize = (POOL_MAX_CLASS_SHIFT - POOL_MIN_CLASS_SHIFT + 1) as usize;

/// Buffers retained per size class; returns beyond this are dropped.
pub const POOL_RETAINED_PER_CLASS: usize = 16;

/// Runtime codec configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Capacity a fresh write buffer starts with.
    pub initial_capacity: usize,
    /// Hard growth limit for a write buffer (`CapacityExceeded` beyond it).
    pub max_capacity: usize,
    /// Rent/return write buffer storage from the shared pool.
    pub pool_enabled: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: MAX_BUFFER_CAPACITY,
            pool_enabled: true,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder {
            config: CodecConfig::default(),
        }
    }
}

/// Validating builder for [`CodecConfig`].
#[derive(Debug, Clone)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    #[must_use]
    pub fn initial_capacity(mut self, bytes: usize) -> Self {
        self.config.initial_capacity = bytes;
        self
    }

    #[must_use]
    pub fn max_capacity(mut self, bytes: usize) -> Self {
        self.config.max_capacity = bytes;
        self
    }

    #[must_use]
    pub fn pool_enabled(mut self, enabled: bool) -> Self {
        self.config.pool_enabled = enabled;
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the max capacity is zero or above
    /// [`MAX_BUFFER_CAPACITY`], or if the initial capacity is zero or
    /// exceeds it.
    pub fn build(self) -> Result<CodecConfig> {
        let cfg = self.config;
        if cfg.max_capacity == 0 || cfg.max_capacity > MAX_BUFFER_CAPACITY {
            return Err(CodecError::InvalidConfig(format!(
                "max_capacity {} must be within 1..={}",
                cfg.max_capacity, MAX_BUFFER_CAPACITY
            )));
        }
        if cfg.initial_capacity == 0 {
            return Err(CodecError::InvalidConfig(
                "initial_capacity must be at least 1".to_string(),
            ));
        }
        if cfg.initial_capacity > cfg.max_capacity {
            return Err(CodecError::InvalidConfig(format!(
                "initial_capacity {} exceeds max_capacity {}",
                cfg.initial_capacity, cfg.max_capacity
            )));
        }
        Ok(cfg)
    }
}

static GLOBAL_CONFIG: OnceLock<ArcSwap<CodecConfig>> = OnceLock::new();

fn cell() -> &'static ArcSwap<CodecConfig> {
    GLOBAL_CONFIG.get_or_init(|| ArcSwap::from_pointee(CodecConfig::default()))
}

/// Snapshot of the process-wide configuration.
pub fn global() -> Arc<CodecConfig> {
    cell().load_full()
}

/// Replace the process-wide configuration.
pub fn set_global(config: CodecConfig) {
    log::debug!(
        "[wirepack] config: initial_capacity={} max_capacity={} pool={}",
        config.initial_capacity,
        config.max_capacity,
        config.pool_enabled
    );
    cell().store(Arc::new(config));
}
