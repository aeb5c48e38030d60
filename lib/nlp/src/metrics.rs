// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::proto::MetricFamily;
use prometheus::{
    Gauge, Histogram, IntCounter, IntCounterVec, IntGauge, Registry, register_histogram,
    register_int_counter, register_int_counter_vec,
};
use wanderto_runtime::compute::ComputeMetrics;

pub static REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "wanderto_nlp_requests_total",
        "HTTP requests handled by the classification service",
        &["endpoint", "status"]
    )
    .expect("Failed to register wanderto_nlp_requests_total metric")
});

pub static INFERENCE_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "wanderto_nlp_inference_seconds",
        "Latency of a single zero-shot classification call"
    )
    .expect("Failed to register wanderto_nlp_inference_seconds metric")
});

pub static INFERENCE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wanderto_nlp_inference_failures_total",
        "Classification calls that raised and were degraded to an empty result"
    )
    .expect("Failed to register wanderto_nlp_inference_failures_total metric")
});

pub static BATCH_ITEMS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wanderto_nlp_batch_items_total",
        "Items classified through the batch dispatcher"
    )
    .expect("Failed to register wanderto_nlp_batch_items_total metric")
});

pub static BATCH_CHUNKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wanderto_nlp_batch_chunks_total",
        "Chunks (concurrency waves) processed by the batch dispatcher"
    )
    .expect("Failed to register wanderto_nlp_batch_chunks_total metric")
});

/// Snapshot of a compute pool's counters as `wanderto_nlp_pool_*` families.
///
/// The counters live on the pool itself, so each scrape builds fresh
/// collectors in a private registry instead of registering globally.
pub fn pool_metric_families(pool: &ComputeMetrics) -> prometheus::Result<Vec<MetricFamily>> {
    let registry = Registry::new();

    let counters = [
        (
            "wanderto_nlp_pool_tasks_submitted_total",
            "Tasks submitted to the classification pool",
            pool.submitted(),
        ),
        (
            "wanderto_nlp_pool_tasks_completed_total",
            "Tasks that finished on the classification pool",
            pool.completed(),
        ),
        (
            "wanderto_nlp_pool_tasks_panicked_total",
            "Tasks that panicked on the classification pool",
            pool.panicked(),
        ),
    ];
    for (name, help, value) in counters {
        let counter = IntCounter::new(name, help)?;
        counter.inc_by(value);
        registry.register(Box::new(counter))?;
    }

    let gauges = [
        (
            "wanderto_nlp_pool_active_tasks",
            "Tasks currently executing on the classification pool",
            pool.active(),
        ),
        (
            "wanderto_nlp_pool_peak_active_tasks",
            "Highest number of tasks seen executing at once",
            pool.peak_active(),
        ),
    ];
    for (name, help, value) in gauges {
        let gauge = IntGauge::new(name, help)?;
        gauge.set(value as i64);
        registry.register(Box::new(gauge))?;
    }

    let busy = Gauge::new(
        "wanderto_nlp_pool_busy_seconds",
        "Total time pool threads spent executing tasks",
    )?;
    busy.set(pool.busy_time().as_secs_f64());
    registry.register(Box::new(busy))?;

    Ok(registry.gather())
}
