// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Single-item classification against the fixed category set.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use wanderto_runtime::compute::pool::panic_message;

use crate::categories::CategorySet;
use crate::engine::InferenceResource;
use crate::metrics;
use crate::protocols::CategoryScore;

/// Scores one text against every category, keeps those at or above the
/// threshold and ranks them.
pub struct CategoryClassifier {
    engine: Arc<InferenceResource>,
    categories: Arc<CategorySet>,
}

impl CategoryClassifier {
    pub fn new(engine: Arc<InferenceResource>, categories: Arc<CategorySet>) -> Self {
        Self { engine, categories }
    }

    pub fn categories(&self) -> &Arc<CategorySet> {
        &self.categories
    }

    pub fn engine(&self) -> &Arc<InferenceResource> {
        &self.engine
    }

    /// Classify `text`, surfacing any inference error or panic.
    pub fn try_classify(&self, text: &str, threshold: f32) -> Result<Vec<CategoryScore>> {
        let model = self.engine.get()?;
        let timer = metrics::INFERENCE_LATENCY.start_timer();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            model.classify(text, self.categories.labels(), true)
        }));
        timer.observe_duration();

        let scores = outcome
            .map_err(|payload| anyhow!("inference panicked: {}", panic_message(payload.as_ref())))??;
        Ok(rank(scores, threshold))
    }

    /// Classify `text`; any failure is logged and yields an empty list.
    pub fn classify(&self, text: &str, threshold: f32) -> Vec<CategoryScore> {
        match self.try_classify(text, threshold) {
            Ok(categories) => categories,
            Err(e) => {
                metrics::INFERENCE_FAILURES.inc();
                tracing::error!(
                    error = %format!("{e:#}"),
                    text_len = text.len(),
                    "Classification error"
                );
                Vec::new()
            }
        }
    }
}

/// Drop scores below `threshold` (inclusive bound) and sort the rest by
/// descending score. Equal scores keep their incoming order.
pub fn rank(mut scores: Vec<CategoryScore>, threshold: f32) -> Vec<CategoryScore> {
    scores.retain(|s| s.score >= threshold);
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LexicalClassifier, ZeroShotClassifier};

    struct Fixed(Vec<CategoryScore>);

    impl ZeroShotClassifier for Fixed {
        fn classify(&self, _: &str, _: &[String], _: bool) -> Result<Vec<CategoryScore>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Broken;

    impl ZeroShotClassifier for Broken {
        fn classify(&self, text: &str, _: &[String], _: bool) -> Result<Vec<CategoryScore>> {
            if text == "panic" {
                panic!("tensor shape mismatch");
            }
            Err(anyhow!("sequence too long"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn classifier_with(backend: Arc<dyn ZeroShotClassifier>, labels: &[&str]) -> CategoryClassifier {
        CategoryClassifier::new(
            Arc::new(InferenceResource::from_classifier(backend)),
            Arc::new(CategorySet::new(labels).unwrap()),
        )
    }

    #[test]
    fn test_rank_threshold_is_inclusive() {
        let scores = vec![
            CategoryScore::new("a", 0.15),
            CategoryScore::new("b", 0.149),
            CategoryScore::new("c", 0.9),
        ];
        let ranked = rank(scores, 0.15);
        let labels: Vec<_> = ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a"]);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let scores = vec![
            CategoryScore::new("first", 0.5),
            CategoryScore::new("top", 0.8),
            CategoryScore::new("second", 0.5),
            CategoryScore::new("third", 0.5),
        ];
        let ranked = rank(scores, 0.0);
        let labels: Vec<_> = ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_out_of_range_thresholds() {
        let scores = vec![CategoryScore::new("a", 0.0), CategoryScore::new("b", 1.0)];
        assert_eq!(rank(scores.clone(), -1.0).len(), 2);
        assert!(rank(scores, 1.5).is_empty());
    }

    #[test]
    fn test_classify_filters_and_sorts() {
        let backend = Fixed(vec![
            CategoryScore::new("art", 0.2),
            CategoryScore::new("music", 0.7),
            CategoryScore::new("food", 0.1),
        ]);
        let classifier = classifier_with(Arc::new(backend), &["art", "music", "food"]);
        let result = classifier.classify("anything", 0.15);
        assert_eq!(
            result,
            vec![CategoryScore::new("music", 0.7), CategoryScore::new("art", 0.2)]
        );
    }

    #[test]
    fn test_classify_swallows_errors() {
        let classifier = classifier_with(Arc::new(Broken), &["art"]);
        assert!(classifier.classify("too long", 0.15).is_empty());
        assert!(classifier.try_classify("too long", 0.15).is_err());
    }

    #[test]
    fn test_classify_swallows_panics() {
        let classifier = classifier_with(Arc::new(Broken), &["art"]);
        assert!(classifier.classify("panic", 0.15).is_empty());
        let err = classifier.try_classify("panic", 0.15).unwrap_err();
        assert!(err.to_string().contains("tensor shape mismatch"));
    }

    #[test]
    fn test_scenario_trail_run() {
        let classifier = classifier_with(
            Arc::new(LexicalClassifier::new()),
            &["hiking", "live music", "food festival"],
        );
        let result = classifier.classify("outdoor trail run this weekend", 0.15);
        assert_eq!(result[0].label, "hiking");
        assert!(result.iter().all(|s| s.score >= 0.15));
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
