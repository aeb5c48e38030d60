// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide assembly of the classification pipeline.
//!
//! Everything here is built once at startup and shared read-only by the
//! request handlers: the category set, the inference resource, the compute
//! pool and the dispatcher on top of them.

use std::sync::Arc;

use anyhow::{Context, Result};
use wanderto_runtime::compute::{ComputeConfig, ComputePool};

use crate::bridge::AsyncClassifier;
use crate::categories::CategorySet;
use crate::config::ServiceConfig;
use crate::dispatcher::BatchDispatcher;
use crate::engine::InferenceResource;
use crate::protocols::HealthConfig;
use crate::scoring::CategoryClassifier;

pub struct ClassificationService {
    config: ServiceConfig,
    categories: Arc<CategorySet>,
    engine: Arc<InferenceResource>,
    bridge: AsyncClassifier,
    dispatcher: BatchDispatcher,
}

impl ClassificationService {
    /// Load categories and the inference backend described by `config`.
    ///
    /// Fails if the category set cannot be loaded or the backend cannot be
    /// constructed; the service must not start serving in either case.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let categories = CategorySet::load(config.categories_file.as_deref())
            .context("failed to load category set")?;
        let engine = InferenceResource::from_config(config.classifier_config());
        engine.warm_up()?;
        Self::assemble(config, categories, engine)
    }

    /// Assemble around an existing category set and inference resource.
    pub fn assemble(
        config: ServiceConfig,
        categories: CategorySet,
        engine: InferenceResource,
    ) -> Result<Self> {
        let categories = Arc::new(categories);
        let engine = Arc::new(engine);

        let pool = ComputePool::new(ComputeConfig {
            thread_prefix: "classify".to_string(),
            ..ComputeConfig::with_threads(config.max_workers)
        })?;

        let classifier = Arc::new(CategoryClassifier::new(engine.clone(), categories.clone()));
        let bridge = AsyncClassifier::new(classifier, Arc::new(pool));
        let dispatcher =
            BatchDispatcher::new(bridge.clone(), config.max_workers, config.max_batch_size);

        tracing::info!(
            categories = categories.len(),
            max_workers = config.max_workers,
            max_batch_size = config.max_batch_size,
            chunk_size = dispatcher.chunk_size(),
            "Classification service assembled"
        );

        Ok(Self {
            config,
            categories,
            engine,
            bridge,
            dispatcher,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn categories(&self) -> &Arc<CategorySet> {
        &self.categories
    }

    pub fn engine(&self) -> &Arc<InferenceResource> {
        &self.engine
    }

    pub fn bridge(&self) -> &AsyncClassifier {
        &self.bridge
    }

    pub fn dispatcher(&self) -> &BatchDispatcher {
        &self.dispatcher
    }

    /// Configuration summary for the health endpoint
    pub fn health_config(&self) -> HealthConfig {
        let device = self
            .engine
            .get()
            .map(|c| c.device())
            .unwrap_or_else(|_| self.config.device.clone());
        self.config.health_config(device)
    }
}
