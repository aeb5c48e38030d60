// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Scripted classifier shared by the integration tests.
//!
//! The text drives the behaviour:
//! - `fail ...` returns an error
//! - `panic ...` panics inside the backend
//! - `sleep:<ms> ...` blocks the worker for `<ms>` milliseconds first
//!
//! Every call records a start and an end event, and the peak number of calls
//! running at the same time is tracked.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use wanderto_nlp::classifier::{ClassifierBackend, ZeroShotClassifier};
use wanderto_nlp::protocols::CategoryScore;
use wanderto_nlp::{CategorySet, ClassificationService, InferenceResource, ServiceConfig};

pub const LABELS: [&str; 3] = ["alpha", "beta", "gamma"];
pub const SCORES: [f32; 3] = [0.2, 0.9, 0.5];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    End(String),
}

#[derive(Default)]
pub struct ScriptedClassifier {
    events: Mutex<Vec<Event>>,
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

struct Running<'a>(&'a ScriptedClassifier, String);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::SeqCst);
        self.0.record(Event::End(self.1.clone()));
    }
}

impl ZeroShotClassifier for ScriptedClassifier {
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        _multi_label: bool,
    ) -> Result<Vec<CategoryScore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.record(Event::Start(text.to_string()));
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _running = Running(self, text.to_string());

        if let Some(rest) = text.strip_prefix("sleep:") {
            let ms: u64 = rest
                .split_whitespace()
                .next()
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(0);
            std::thread::sleep(Duration::from_millis(ms));
        }
        if text.starts_with("fail") {
            bail!("scripted failure for '{text}'");
        }
        if text.starts_with("panic") {
            panic!("scripted panic for '{text}'");
        }

        Ok(candidate_labels
            .iter()
            .zip(SCORES)
            .map(|(label, score)| CategoryScore::new(label.clone(), score))
            .collect())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn service_with(
    classifier: Arc<ScriptedClassifier>,
    max_workers: usize,
    max_batch_size: usize,
) -> Arc<ClassificationService> {
    let config = ServiceConfig {
        backend: ClassifierBackend::Lexical,
        max_workers,
        max_batch_size,
        ..Default::default()
    };
    let service = ClassificationService::assemble(
        config,
        CategorySet::new(LABELS).unwrap(),
        InferenceResource::from_classifier(classifier),
    )
    .unwrap();
    Arc::new(service)
}

/// Backend that rejects every call.
pub struct FailingClassifier;

impl ZeroShotClassifier for FailingClassifier {
    fn classify(&self, _text: &str, _labels: &[String], _multi_label: bool) -> Result<Vec<CategoryScore>> {
        bail!("backend unavailable")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub fn failing_service() -> Arc<ClassificationService> {
    let service = ClassificationService::assemble(
        ServiceConfig {
            backend: ClassifierBackend::Lexical,
            max_workers: 1,
            ..Default::default()
        },
        CategorySet::new(LABELS).unwrap(),
        InferenceResource::from_classifier(Arc::new(FailingClassifier)),
    )
    .unwrap();
    Arc::new(service)
}
