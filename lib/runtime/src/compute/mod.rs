// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Compute module for CPU-intensive operations using Rayon
//!
//! This module provides a dedicated, fixed-size compute thread pool for
//! blocking work such as model inference, bridged into Tokio so that the
//! request loop only ever awaits a handle.
//!
//! ```ignore
//! use wanderto_runtime::compute::{ComputeConfig, ComputePool};
//!
//! let pool = ComputePool::new(ComputeConfig::with_threads(2))?;
//! let result = pool.execute(|| expensive_computation()).await?;
//! ```

use anyhow::Result;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod metrics;
pub mod pool;

pub use metrics::ComputeMetrics;
pub use pool::{ComputeHandle, ComputePool};

/// Minimum stack size accepted for compute threads
const MIN_STACK_SIZE: usize = 128 * 1024;

/// Configuration for the compute thread pool
#[derive(Debug, Clone)]
pub struct ComputeConfig {
    /// Number of threads in the Rayon pool (defaults to min(2, num_cpus))
    pub num_threads: Option<usize>,

    /// Stack size for compute threads (defaults to 8MB)
    pub stack_size: Option<usize>,

    /// Thread name prefix (defaults to "compute")
    pub thread_prefix: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            // tokenizers and candle recurse deeply on long inputs
            stack_size: Some(8 * 1024 * 1024),
            thread_prefix: "compute".to_string(),
        }
    }
}

impl ComputeConfig {
    /// Configuration with an explicit worker count
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads
            && num_threads == 0
        {
            return Err(anyhow::anyhow!(
                "Number of compute threads cannot be 0"
            ));
        }

        if let Some(stack_size) = self.stack_size
            && stack_size < MIN_STACK_SIZE
        {
            return Err(anyhow::anyhow!(
                "Stack size too small: {}KB. Minimum recommended: {}KB",
                stack_size / 1024,
                MIN_STACK_SIZE / 1024
            ));
        }

        Ok(())
    }

    /// Number of worker threads the pool will be built with
    pub fn resolved_threads(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| crate::config::available_cores().min(2))
    }

    /// Create a ThreadPoolBuilder from this configuration
    pub(crate) fn build_pool(&self) -> Result<rayon::ThreadPool> {
        self.validate()?;

        let mut builder = ThreadPoolBuilder::new().num_threads(self.resolved_threads());

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let prefix = self.thread_prefix.clone();
        let thread_counter = Arc::new(AtomicU64::new(0));
        builder = builder.thread_name(move |_| {
            let id = thread_counter.fetch_add(1, Ordering::SeqCst);
            format!("{}-{}", prefix, id)
        });

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create Rayon thread pool: {}", e))
    }
}
