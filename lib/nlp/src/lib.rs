// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! WanderTO NLP
//!
//! Zero-shot classification of event descriptions into a fixed set of
//! categories, served over HTTP. Inference runs on a bounded compute pool;
//! batches are processed in chunked waves so a large request never puts more
//! than `2 * max_workers` classifications in flight.

pub mod bridge;
pub mod categories;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod http;
pub mod metrics;
pub mod protocols;
pub mod scoring;
pub mod service;

pub use bridge::AsyncClassifier;
pub use categories::{CategoryError, CategorySet};
pub use config::{ConfigError, ServiceConfig};
pub use dispatcher::BatchDispatcher;
pub use engine::InferenceResource;
pub use scoring::CategoryClassifier;
pub use service::ClassificationService;
