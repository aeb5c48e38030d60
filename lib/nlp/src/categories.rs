// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Fixed category set
//!
//! The labels every text is scored against. Loaded once at startup from a
//! JSON document of the form `{"categories": ["art", "music", ...]}` and
//! shared read-only afterwards. There is no way to mutate the set once built.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Toronto event categories shipped with the service
pub const BUNDLED_CATEGORIES: &str = include_str!("../data/toronto_categories.json");

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("failed to read category file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed category document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("category list is empty")]
    Empty,

    #[error("category at position {0} is blank")]
    BlankLabel(usize),

    #[error("category '{0}' is listed more than once")]
    Duplicate(String),
}

#[derive(Deserialize)]
struct CategoryDocument {
    categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    /// Build a set from labels, trimming whitespace and rejecting blank or
    /// duplicate entries. Order is preserved.
    pub fn new<I, S>(labels: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (idx, label) in labels.into_iter().enumerate() {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(CategoryError::BlankLabel(idx));
            }
            if !seen.insert(label.to_string()) {
                return Err(CategoryError::Duplicate(label.to_string()));
            }
            out.push(label.to_string());
        }
        if out.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self { labels: out })
    }

    pub fn from_json(json: &str) -> Result<Self, CategoryError> {
        let doc: CategoryDocument = serde_json::from_str(json)?;
        Self::new(doc.categories)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CategoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CategoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn bundled() -> Result<Self, CategoryError> {
        Self::from_json(BUNDLED_CATEGORIES)
    }

    /// Load from `path` when given, otherwise fall back to the bundled list.
    pub fn load(path: Option<&Path>) -> Result<Self, CategoryError> {
        let set = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::bundled()?,
        };
        tracing::info!(
            count = set.len(),
            source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "bundled".to_string()),
            "Loaded event categories"
        );
        Ok(set)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }
}
