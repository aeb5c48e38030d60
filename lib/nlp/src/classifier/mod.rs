// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Zero-shot classifier backends
//!
//! A backend scores a text against arbitrary candidate labels it was never
//! trained on. Backends are synchronous and CPU/GPU bound; callers are
//! expected to run them on the compute pool.

use anyhow::Result;

use crate::protocols::CategoryScore;

pub mod candle;
pub mod factory;
pub mod lexical;

pub use candle::NliClassifier;
pub use factory::{ClassifierBackend, ClassifierConfig, create_classifier};
pub use lexical::LexicalClassifier;

pub trait ZeroShotClassifier: Send + Sync {
    /// Score `text` against every label in `candidate_labels`.
    ///
    /// With `multi_label` each label is scored independently in `[0, 1]`;
    /// otherwise the scores are normalised to sum to 1. The result holds one
    /// entry per candidate label, in no particular order.
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Vec<CategoryScore>>;

    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Device the backend runs on, e.g. `cpu` or `cuda:0`
    fn device(&self) -> String {
        "cpu".to_string()
    }
}

/// Rescale scores in place so they sum to 1. A zero total is left untouched.
pub(crate) fn normalize(scores: &mut [CategoryScore]) {
    let sum: f32 = scores.iter().map(|s| s.score).sum();
    if sum > 0.0 {
        for s in scores.iter_mut() {
            s.score /= sum;
        }
    }
}
