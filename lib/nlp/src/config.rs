// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Service configuration
//!
//! Sources in priority order (lowest to highest):
//! 1. Code defaults
//! 2. System config file at /opt/wanderto/etc/nlp.toml
//! 3. TOML file from the WANDERTO_CONFIG_PATH environment variable
//! 4. `WANDERTO_*` prefixed environment variables
//! 5. The plain variables `PORT`, `HOST`, `MAX_BATCH_SIZE`, `MAX_WORKERS`,
//!    `MODEL_NAME`, `DEVICE`, `CATEGORIES_FILE` and `CLASSIFIER_BACKEND`

use std::borrow::Cow;
use std::path::PathBuf;

use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};
use wanderto_runtime::config::available_cores;

use crate::classifier::{ClassifierBackend, ClassifierConfig};
use crate::protocols::{DEFAULT_THRESHOLD, HealthConfig};

/// ENV naming an extra TOML configuration file
pub const CONFIG_PATH_ENV: &str = "WANDERTO_CONFIG_PATH";

const SYSTEM_CONFIG_PATH: &str = "/opt/wanderto/etc/nlp.toml";

/// Unprefixed variables recognised for compatibility with existing deployments
const PLAIN_ENV_KEYS: &[&str] = &[
    "PORT",
    "HOST",
    "MAX_BATCH_SIZE",
    "MAX_WORKERS",
    "MODEL_NAME",
    "DEVICE",
    "CATEGORIES_FILE",
    "CLASSIFIER_BACKEND",
];

pub const DEFAULT_MODEL_NAME: &str = "MoritzLaurer/ModernBERT-base-zeroshot-v2.0";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to extract configuration: {0}")]
    Extraction(#[from] Box<figment::Error>),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Configuration error: {0}")]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    pub host: String,

    pub port: u16,

    /// Advisory batch size; larger batches are processed with a warning
    #[validate(range(min = 1))]
    pub max_batch_size: usize,

    /// Compute pool size, capped at the number of available cores
    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub model_name: String,

    #[validate(custom(function = "validate_device"))]
    pub device: String,

    #[serde(rename = "classifier_backend")]
    pub backend: ClassifierBackend,

    /// JSON category list; the bundled Toronto list when unset
    #[serde(default)]
    pub categories_file: Option<PathBuf>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub default_threshold: f32,

    #[validate(custom(function = "validate_template"))]
    pub hypothesis_template: String,

    #[validate(range(min = 16))]
    pub max_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_batch_size: 20,
            max_workers: available_cores().min(2),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            device: "auto".to_string(),
            backend: ClassifierBackend::default(),
            categories_file: None,
            default_threshold: DEFAULT_THRESHOLD,
            hypothesis_template: "This example is {}.".to_string(),
            max_length: 512,
        }
    }
}

fn validate_device(device: &str) -> Result<(), ValidationError> {
    let valid = match device {
        "auto" | "cpu" | "cuda" => true,
        other => other
            .strip_prefix("cuda:")
            .is_some_and(|id| id.parse::<usize>().is_ok()),
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("device")
            .with_message(Cow::from("expected auto, cpu, cuda or cuda:N")))
    }
}

fn validate_template(template: &str) -> Result<(), ValidationError> {
    if template.contains("{}") {
        Ok(())
    } else {
        Err(ValidationError::new("hypothesis_template")
            .with_message(Cow::from("template must contain a {} placeholder")))
    }
}

impl ServiceConfig {
    /// Create a Figment configuration with all sources merged.
    pub fn figment() -> Figment {
        let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_default();

        Figment::new()
            .merge(Serialized::defaults(ServiceConfig::default()))
            .merge(Toml::file(SYSTEM_CONFIG_PATH))
            .merge(Toml::file(&config_path))
            // WANDERTO_MAX_WORKERS, WANDERTO_DEFAULT_THRESHOLD, ...
            .merge(
                Env::prefixed("WANDERTO_")
                    .ignore(&["CONFIG_PATH", "LOG", "LOGGING_CONFIG_PATH", "LOGGING_JSONL"])
                    .map(|k| k.as_str().to_lowercase().into()),
            )
            .merge(
                Env::raw()
                    .only(PLAIN_ENV_KEYS)
                    .map(|k| k.as_str().to_lowercase().into()),
            )
    }

    /// Load configuration from default figment (env and files).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::extract_from(Self::figment())
    }

    /// Extract configuration from any provider, validate it and cap the
    /// worker count at the available cores.
    pub fn extract_from<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        let mut config: Self = Figment::from(provider)
            .extract()
            .map_err(|e| ConfigError::Extraction(Box::new(e)))?;
        config.validate()?;

        let cores = available_cores();
        if config.max_workers > cores {
            tracing::warn!(
                requested = config.max_workers,
                cores,
                "MAX_WORKERS exceeds available cores; capping"
            );
            config.max_workers = cores;
        }
        Ok(config)
    }

    /// Build a figment from defaults, then merge a custom provider.
    pub fn figment_with<T: Provider>(extra: T) -> Figment {
        Self::figment().merge(extra)
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            backend: self.backend,
            model_id: self.model_name.clone(),
            device: self.device.clone(),
            max_length: self.max_length,
            hypothesis_template: self.hypothesis_template.clone(),
        }
    }

    /// Summary reported by the health endpoint
    pub fn health_config(&self, device: String) -> HealthConfig {
        let model = match self.backend {
            ClassifierBackend::Candle => self.model_name.clone(),
            ClassifierBackend::Lexical => "lexical".to_string(),
        };
        HealthConfig {
            model,
            device,
            max_workers: self.max_workers,
            max_batch_size: self.max_batch_size,
        }
    }
}

impl Provider for ServiceConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("ServiceConfig")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
