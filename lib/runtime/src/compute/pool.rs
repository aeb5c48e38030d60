// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size Rayon pool with async submission.
//!
//! Work submitted to a [`ComputePool`] runs on one of the pool's threads; the
//! submitting task gets a [`ComputeHandle`] back and is free to yield until the
//! work completes. At most `num_threads` closures execute at once, anything
//! beyond that waits in the pool's FIFO queue.
//!
//! A closure that panics does not take the worker down: the panic is caught on
//! the worker and surfaces as an `Err` from the handle.

use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use anyhow::Result;
use tokio_rayon::{AsyncRayonHandle, AsyncThreadPool};

use super::{ComputeConfig, ComputeMetrics};

pub struct ComputePool {
    pool: Arc<rayon::ThreadPool>,
    metrics: Arc<ComputeMetrics>,
    num_threads: usize,
}

impl ComputePool {
    pub fn new(config: ComputeConfig) -> Result<Self> {
        let pool = config.build_pool()?;
        let num_threads = pool.current_num_threads();
        tracing::info!(
            num_threads,
            prefix = %config.thread_prefix,
            "Initialized compute pool"
        );
        Ok(Self {
            pool: Arc::new(pool),
            metrics: Arc::new(ComputeMetrics::new()),
            num_threads,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn metrics(&self) -> &Arc<ComputeMetrics> {
        &self.metrics
    }

    /// Submit `f` to the pool and return a handle to await its result.
    ///
    /// The closure runs to completion even if the handle is dropped.
    pub fn spawn<F, R>(&self, f: F) -> ComputeHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let metrics = self.metrics.clone();
        metrics.record_submitted();

        let inner = self.pool.spawn_fifo_async(move || {
            metrics.record_start();
            let start = Instant::now();
            let result = catch_unwind(AssertUnwindSafe(f));
            metrics.record_finish(start.elapsed(), result.is_err());
            result
        });

        ComputeHandle { inner }
    }

    /// Run `f` on the pool and wait for it without blocking the async runtime.
    pub async fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawn(f).await
    }
}

impl std::fmt::Debug for ComputePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputePool")
            .field("num_threads", &self.num_threads)
            .field("active", &self.metrics.active())
            .finish()
    }
}

/// Awaitable result of a closure submitted with [`ComputePool::spawn`].
#[must_use = "the result of the computation is only observable by awaiting the handle"]
pub struct ComputeHandle<R> {
    inner: AsyncRayonHandle<std::thread::Result<R>>,
}

impl<R> Future for ComputeHandle<R> {
    type Output = Result<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx).map(|result| {
            result.map_err(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(panic = %message, "Compute task panicked");
                anyhow::anyhow!("compute task panicked: {message}")
            })
        })
    }
}

/// Best-effort extraction of the message carried by a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_execute_returns_value() {
        let pool = ComputePool::new(ComputeConfig::with_threads(2)).unwrap();
        let sum = pool.execute(|| (1..=10u64).sum::<u64>()).await.unwrap();
        assert_eq!(sum, 55);
        assert_eq!(pool.metrics().completed(), 1);
    }

    #[tokio::test]
    async fn test_runs_on_named_pool_thread() {
        let pool = ComputePool::new(ComputeConfig {
            thread_prefix: "classify".to_string(),
            ..ComputeConfig::with_threads(1)
        })
        .unwrap();
        let name = pool
            .execute(|| std::thread::current().name().map(str::to_string))
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("classify-0"));
    }

    #[tokio::test]
    async fn test_panic_becomes_error() {
        let pool = ComputePool::new(ComputeConfig::with_threads(1)).unwrap();
        let err = pool
            .execute(|| -> u32 { panic!("model exploded") })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model exploded"));
        assert_eq!(pool.metrics().panicked(), 1);

        // the worker survives the panic
        let value = pool.execute(|| 7).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_concurrency_is_capped_at_pool_size() {
        let pool = ComputePool::new(ComputeConfig::with_threads(2)).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let observed_max = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let running = running.clone();
                let observed_max = observed_max.clone();
                pool.spawn(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    observed_max.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result.unwrap();
        }

        assert!(observed_max.load(Ordering::SeqCst) <= 2);
        assert!(pool.metrics().peak_active() <= 2);
        assert_eq!(pool.metrics().submitted(), 8);
        assert_eq!(pool.metrics().completed(), 8);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_runtime_stays_responsive_while_pool_is_busy() {
        let pool = ComputePool::new(ComputeConfig::with_threads(1)).unwrap();
        let slow = pool.spawn(|| std::thread::sleep(Duration::from_millis(200)));

        // a single-threaded runtime can still make progress on other tasks
        let quick = tokio::spawn(async { 1 + 1 });
        let quick = tokio::time::timeout(Duration::from_millis(100), quick)
            .await
            .expect("runtime was blocked")
            .unwrap();
        assert_eq!(quick, 2);

        slow.await.unwrap();
    }

    #[test]
    fn test_panic_message_variants() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(panic_message(other_payload.as_ref()), "unknown panic");
    }
}
