// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Classifier factory for creating instances from configuration
//!
//! Provides a unified way to instantiate classifiers without backend-specific
//! code in the service layer. The factory reads configuration and returns a
//! trait object that can be used anywhere.

use super::{LexicalClassifier, ZeroShotClassifier};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Classifier backend type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Keyword cue scorer, no model required
    Lexical,
    /// Candle/HuggingFace NLI model
    Candle,
}

impl Default for ClassifierBackend {
    fn default() -> Self {
        if cfg!(feature = "candle") {
            ClassifierBackend::Candle
        } else {
            ClassifierBackend::Lexical
        }
    }
}

impl std::fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierBackend::Lexical => write!(f, "lexical"),
            ClassifierBackend::Candle => write!(f, "candle"),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,

    /// HuggingFace model ID
    pub model_id: String,

    /// Device (auto, cpu, cuda, cuda:0, ...)
    pub device: String,

    /// Max sequence length of a premise/hypothesis pair
    pub max_length: usize,

    /// Hypothesis with `{}` standing in for the label
    pub hypothesis_template: String,
}

/// Create a classifier from configuration
///
/// # Errors
/// * Feature not enabled for requested backend
/// * Invalid device
/// * Model loading failure
pub fn create_classifier(config: &ClassifierConfig) -> Result<Arc<dyn ZeroShotClassifier>> {
    match config.backend {
        ClassifierBackend::Lexical => {
            tracing::info!("Creating LexicalClassifier");
            Ok(Arc::new(LexicalClassifier::new()))
        }

        #[cfg(feature = "candle")]
        ClassifierBackend::Candle => {
            use super::NliClassifier;
            use super::candle::parse_device;

            let device = parse_device(&config.device)?;

            tracing::info!(
                "Creating NliClassifier: model={}, device={:?}",
                config.model_id,
                device.location()
            );
            let classifier = NliClassifier::from_pretrained(
                &config.model_id,
                device,
                config.max_length,
                &config.hypothesis_template,
            )?;
            Ok(Arc::new(classifier))
        }

        #[cfg(not(feature = "candle"))]
        ClassifierBackend::Candle => Err(anyhow::anyhow!(
            "Candle classifier requires the 'candle' feature (requested model '{}')",
            config.model_id
        )),
    }
}
