// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Inference resource
//!
//! The classifier backend is expensive to build (model download, weight
//! mapping) and lives for the whole process. [`InferenceResource`] owns the
//! loader and the constructed backend:
//!
//! - construction happens at most once, even if many tasks ask for the
//!   backend at the same time; the losers of the race block until the winner
//!   finishes and then share its instance
//! - a failed construction is reported to the caller and leaves the resource
//!   empty, so the next call tries again
//! - the backend is never rebuilt or torn down once constructed
//!
//! The service builds one resource at startup, calls [`InferenceResource::warm_up`]
//! so load failures stop the process, and shares it behind an `Arc`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use crate::classifier::{ClassifierConfig, ZeroShotClassifier, create_classifier};

type Loader = Box<dyn Fn() -> Result<Arc<dyn ZeroShotClassifier>> + Send + Sync>;

pub struct InferenceResource {
    loader: Loader,
    instance: OnceCell<Arc<dyn ZeroShotClassifier>>,
}

impl InferenceResource {
    /// Resource that builds its backend with `loader` on first use.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ZeroShotClassifier>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            instance: OnceCell::new(),
        }
    }

    /// Resource backed by the classifier factory.
    pub fn from_config(config: ClassifierConfig) -> Self {
        Self::new(move || create_classifier(&config))
    }

    /// Resource wrapping an already constructed backend.
    pub fn from_classifier(classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        let instance = OnceCell::new();
        // a fresh cell cannot be occupied
        let _ = instance.set(classifier.clone());
        Self {
            loader: Box::new(move || Ok(classifier.clone())),
            instance,
        }
    }

    /// Shared backend, constructing it on first call.
    pub fn get(&self) -> Result<&Arc<dyn ZeroShotClassifier>> {
        self.instance.get_or_try_init(|| {
            let start = Instant::now();
            let classifier = (self.loader)().context("failed to construct inference resource")?;
            tracing::info!(
                backend = classifier.name(),
                device = %classifier.device(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Inference resource ready"
            );
            Ok(classifier)
        })
    }

    /// Force construction now.
    pub fn warm_up(&self) -> Result<()> {
        self.get().map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl std::fmt::Debug for InferenceResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceResource")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
