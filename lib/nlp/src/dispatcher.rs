// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Bounded-concurrency batch dispatcher
//!
//! A batch is split into consecutive chunks of `2 * max_workers` items. All
//! items of a chunk are submitted to the [`AsyncClassifier`] together and the
//! dispatcher waits for every one of them before it starts the next chunk, so
//! no more than one chunk is ever in flight. Results come back in input order:
//! chunks are processed in sequence and `join_all` keeps submission order
//! within a chunk.
//!
//! An item whose classification fails contributes an empty category list and
//! nothing else; siblings and later chunks are unaffected. Only a failure of
//! the compute pool itself fails the whole batch.

use std::time::{Duration, Instant};

use anyhow::Result;
use futures::future::join_all;

use crate::bridge::AsyncClassifier;
use crate::metrics;
use crate::protocols::{ClassificationItem, ClassificationResult};

pub struct BatchDispatcher {
    bridge: AsyncClassifier,
    max_workers: usize,
    max_batch_size: usize,
}

impl BatchDispatcher {
    pub fn new(bridge: AsyncClassifier, max_workers: usize, max_batch_size: usize) -> Self {
        Self {
            bridge,
            max_workers: max_workers.max(1),
            max_batch_size,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Items per concurrency wave
    pub fn chunk_size(&self) -> usize {
        2 * self.max_workers
    }

    /// Sizes of the chunks a batch of `total` items is split into
    pub fn chunk_plan(&self, total: usize) -> Vec<usize> {
        let size = self.chunk_size();
        (0..total)
            .step_by(size)
            .map(|start| size.min(total - start))
            .collect()
    }

    pub async fn dispatch(
        &self,
        items: Vec<ClassificationItem>,
        default_threshold: f32,
    ) -> Result<Vec<ClassificationResult>> {
        let total = items.len();
        if total > self.max_batch_size {
            // advisory only, callers may rely on larger batches
            tracing::warn!(
                total,
                max_batch_size = self.max_batch_size,
                "Batch exceeds MAX_BATCH_SIZE; processing anyway"
            );
        }

        let start = Instant::now();
        let mut results = Vec::with_capacity(total);

        let mut pending = items.into_iter();
        for size in self.chunk_plan(total) {
            let wave = pending.by_ref().take(size).map(|item| {
                let threshold = item.threshold.unwrap_or(default_threshold);
                async move {
                    let categories = self.bridge.classify(item.text, threshold).await?;
                    Ok::<_, anyhow::Error>(ClassificationResult {
                        id: item.id,
                        categories,
                    })
                }
            });

            let completed = join_all(wave)
                .await
                .into_iter()
                .collect::<Result<Vec<_>>>()?;
            results.extend(completed);

            metrics::BATCH_CHUNKS.inc();
            tracing::info!(processed = results.len(), total, "Processed batch chunk");
        }

        metrics::BATCH_ITEMS.inc_by(total as u64);
        let elapsed = start.elapsed();
        match average_per_item(elapsed, total) {
            Some(avg_ms) => tracing::info!(
                total,
                elapsed_ms = elapsed.as_millis() as u64,
                avg_ms,
                "Batch classification complete"
            ),
            None => tracing::info!("Batch classification complete: empty batch"),
        }

        Ok(results)
    }
}

/// Mean milliseconds per item, `None` for an empty batch
fn average_per_item(elapsed: Duration, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(elapsed.as_secs_f64() * 1000.0 / total as f64)
}
