// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Async bridge from request handlers to the compute pool.
//!
//! Each call moves one single-item classification onto the pool and suspends
//! the calling task until it completes. Calls made concurrently may complete in
//! any order; callers that need ordering join the futures themselves. Once
//! submitted, a classification runs to completion even if the caller goes away.

use std::sync::Arc;

use anyhow::Result;
use wanderto_runtime::compute::ComputePool;

use crate::protocols::CategoryScore;
use crate::scoring::CategoryClassifier;

#[derive(Clone)]
pub struct AsyncClassifier {
    classifier: Arc<CategoryClassifier>,
    pool: Arc<ComputePool>,
}

impl AsyncClassifier {
    pub fn new(classifier: Arc<CategoryClassifier>, pool: Arc<ComputePool>) -> Self {
        Self { classifier, pool }
    }

    pub fn classifier(&self) -> &Arc<CategoryClassifier> {
        &self.classifier
    }

    pub fn pool(&self) -> &Arc<ComputePool> {
        &self.pool
    }

    /// Classify on the pool. Inference failures come back as an empty list;
    /// an `Err` means the pool itself failed to run the work.
    pub async fn classify(&self, text: impl Into<String>, threshold: f32) -> Result<Vec<CategoryScore>> {
        let classifier = self.classifier.clone();
        let text = text.into();
        self.pool
            .execute(move || classifier.classify(&text, threshold))
            .await
    }

    /// Classify on the pool, surfacing inference failures as errors.
    pub async fn try_classify(
        &self,
        text: impl Into<String>,
        threshold: f32,
    ) -> Result<Vec<CategoryScore>> {
        let classifier = self.classifier.clone();
        let text = text.into();
        self.pool
            .execute(move || classifier.try_classify(&text, threshold))
            .await?
    }
}
