// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Candle-based NLI zero-shot classifier
//!
//! Loads a ModernBERT sequence-classification model trained on natural
//! language inference directly from HuggingFace using safetensors format.
//! Every candidate label becomes a hypothesis (`"This example is {label}."`)
//! paired with the text as premise; the entailment probability of the pair is
//! the label's score.

use super::ZeroShotClassifier;
use crate::protocols::CategoryScore;
use anyhow::{Result, anyhow};

#[cfg(feature = "candle")]
use super::normalize;
#[cfg(feature = "candle")]
use candle_core::{D, DType, Device, DeviceLocation, IndexOp, Tensor};
#[cfg(feature = "candle")]
use candle_nn::{VarBuilder, ops::softmax};
#[cfg(feature = "candle")]
use candle_transformers::models::modernbert::{
    ClassifierConfig as HeadConfig, ClassifierPooling, Config as ModernBertConfig,
    ModernBertForSequenceClassification,
};
#[cfg(feature = "candle")]
use hf_hub::{Repo, RepoType, api::sync::Api};
#[cfg(feature = "candle")]
use serde::Deserialize;
#[cfg(feature = "candle")]
use std::collections::HashMap;
#[cfg(feature = "candle")]
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};

/// Placeholder in hypothesis templates replaced by the candidate label
pub const LABEL_PLACEHOLDER: &str = "{}";

#[cfg(feature = "candle")]
#[derive(Deserialize)]
struct LabelMapping {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

#[cfg(feature = "candle")]
pub struct NliClassifier {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    hypothesis_template: String,
    entailment_id: usize,
    contradiction_id: usize,
}

#[cfg(feature = "candle")]
impl NliClassifier {
    /// Download `model_id` from HuggingFace and load it on `device`.
    pub fn from_pretrained(
        model_id: &str,
        device: Device,
        max_length: usize,
        hypothesis_template: &str,
    ) -> Result<Self> {
        tracing::info!("Loading NLI classifier from HuggingFace: {}", model_id);

        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")?;
        let weights_path = repo.get("model.safetensors")?;
        let tokenizer_path = repo.get("tokenizer.json")?;

        tracing::debug!("Config: {:?}", config_path);
        tracing::debug!("Weights: {:?}", weights_path);
        tracing::debug!("Tokenizer: {:?}", tokenizer_path);

        let config_str = std::fs::read_to_string(&config_path)?;
        let mut config: ModernBertConfig = serde_json::from_str(&config_str)?;
        let mapping: LabelMapping = serde_json::from_str(&config_str)?;

        let (entailment_id, contradiction_id) = nli_label_ids(&mapping.label2id)?;
        let num_labels = mapping.label2id.len().max(mapping.id2label.len());
        ensure_head_config(&mut config, num_labels);

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)?
        };
        let model = ModernBertForSequenceClassification::load(vb, &config)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                // only the premise is cut, the hypothesis must survive intact
                strategy: TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        tracing::info!(
            model_id,
            num_labels,
            entailment_id,
            contradiction_id,
            max_length,
            device = ?device.location(),
            "Initialized NLI classifier"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            hypothesis_template: hypothesis_template.to_string(),
            entailment_id,
            contradiction_id,
        })
    }

    fn pad_id(&self) -> u32 {
        self.tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| self.tokenizer.token_to_id("[PAD]"))
            .or_else(|| self.tokenizer.token_to_id("<pad>"))
            .unwrap_or(0)
    }

    /// Logits of shape `[labels, nli_classes]` for every (text, hypothesis) pair.
    fn pair_logits(&self, text: &str, candidate_labels: &[String]) -> Result<Tensor> {
        let mut encodings = Vec::with_capacity(candidate_labels.len());
        for label in candidate_labels {
            let hypothesis = self.hypothesis_template.replace(LABEL_PLACEHOLDER, label);
            let encoding = self
                .tokenizer
                .encode((text, hypothesis.as_str()), true)
                .map_err(|e| {
                    anyhow!(
                        "Tokenization failed on '{}': {}",
                        text.chars().take(50).collect::<String>(),
                        e
                    )
                })?;
            encodings.push(encoding);
        }

        let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        let pad_id = self.pad_id();

        let mut all_ids: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
        let mut all_masks: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
        for encoding in encodings {
            let mut ids = encoding.get_ids().to_vec();
            let mut mask = encoding.get_attention_mask().to_vec();
            ids.resize(max_len, pad_id);
            mask.resize(max_len, 0);
            all_ids.extend(ids);
            all_masks.extend(mask);
        }

        let shape = (candidate_labels.len(), max_len);
        let input_ids = Tensor::from_vec(all_ids, shape, &self.device)?;
        let attention_mask = Tensor::from_vec(all_masks, shape, &self.device)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        Ok(logits.to_dtype(DType::F32)?)
    }
}

#[cfg(feature = "candle")]
impl ZeroShotClassifier for NliClassifier {
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Vec<CategoryScore>> {
        if candidate_labels.is_empty() {
            return Ok(Vec::new());
        }

        let logits = self.pair_logits(text, candidate_labels)?;
        let entailment = logits.i((.., self.entailment_id))?;

        let probs: Vec<f32> = if multi_label {
            // each label on its own: entailment vs contradiction
            let contradiction = logits.i((.., self.contradiction_id))?;
            let pair = Tensor::stack(&[&contradiction, &entailment], 1)?;
            softmax(&pair, D::Minus1)?.i((.., 1))?.to_vec1::<f32>()?
        } else {
            softmax(&entailment, 0)?.to_vec1::<f32>()?
        };

        if probs.len() != candidate_labels.len() {
            return Err(anyhow!(
                "Label count mismatch: {} labels but {} probabilities",
                candidate_labels.len(),
                probs.len()
            ));
        }

        let mut scores: Vec<CategoryScore> = candidate_labels
            .iter()
            .zip(probs)
            .map(|(label, p)| CategoryScore::new(label.clone(), p))
            .collect();
        if !multi_label {
            normalize(&mut scores);
        }
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "candle-nli"
    }

    fn device(&self) -> String {
        match self.device.location() {
            DeviceLocation::Cpu => "cpu".to_string(),
            DeviceLocation::Cuda { gpu_id } => format!("cuda:{gpu_id}"),
            DeviceLocation::Metal { gpu_id } => format!("metal:{gpu_id}"),
        }
    }
}

/// Find the entailment and contradiction columns of an NLI head.
///
/// Two-way heads name the negative class `not_entailment`; three-way MNLI
/// heads call it `contradiction`.
#[cfg(feature = "candle")]
fn nli_label_ids(label2id: &HashMap<String, u32>) -> Result<(usize, usize)> {
    let find = |names: &[&str]| {
        label2id
            .iter()
            .find(|(k, _)| names.contains(&k.to_lowercase().as_str()))
            .map(|(_, &v)| v as usize)
    };
    let entailment = find(&["entailment"]).ok_or_else(|| {
        anyhow!(
            "Missing 'entailment' in label2id mapping. Available: {:?}",
            label2id.keys().collect::<Vec<_>>()
        )
    })?;
    let contradiction = find(&["contradiction", "not_entailment"]).ok_or_else(|| {
        anyhow!(
            "Missing 'contradiction' or 'not_entailment' in label2id mapping. Available: {:?}",
            label2id.keys().collect::<Vec<_>>()
        )
    })?;
    Ok((entailment, contradiction))
}

#[cfg(feature = "candle")]
fn ensure_head_config(config: &mut ModernBertConfig, num_labels: usize) {
    let matches = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len() == num_labels)
        .unwrap_or(false);
    if matches {
        return;
    }

    let id2label: HashMap<String, String> = (0..num_labels)
        .map(|i| (i.to_string(), format!("label_{i}")))
        .collect();
    let label2id: HashMap<String, String> = id2label
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();
    config.classifier_config = Some(HeadConfig {
        id2label,
        label2id,
        classifier_pooling: ClassifierPooling::default(),
    });
}

/// Resolve a device string: `auto`, `cpu`, `cuda` or `cuda:N`.
#[cfg(feature = "candle")]
pub fn parse_device(device_str: &str) -> Result<Device> {
    match device_str {
        "auto" => Ok(Device::cuda_if_available(0)?),
        "cpu" => Ok(Device::Cpu),
        s if s.starts_with("cuda") => {
            #[cfg(feature = "cuda")]
            {
                let device_id = s
                    .strip_prefix("cuda:")
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(0);
                Ok(Device::new_cuda(device_id)?)
            }
            #[cfg(not(feature = "cuda"))]
            {
                tracing::warn!("CUDA requested ({}) but not available, using CPU", s);
                Ok(Device::Cpu)
            }
        }
        other => Err(anyhow!("Unknown device '{}'", other)),
    }
}

// Placeholder implementations when feature is not enabled
#[cfg(not(feature = "candle"))]
pub struct NliClassifier;

#[cfg(not(feature = "candle"))]
impl NliClassifier {
    pub fn from_pretrained(
        _model_id: &str,
        _device: (),
        _max_length: usize,
        _hypothesis_template: &str,
    ) -> Result<Self> {
        Err(anyhow!("NliClassifier requires the 'candle' feature"))
    }
}

#[cfg(not(feature = "candle"))]
impl ZeroShotClassifier for NliClassifier {
    fn classify(
        &self,
        _text: &str,
        _candidate_labels: &[String],
        _multi_label: bool,
    ) -> Result<Vec<CategoryScore>> {
        Err(anyhow!("NliClassifier requires the 'candle' feature"))
    }

    fn name(&self) -> &'static str {
        "candle-nli"
    }
}

#[cfg(all(test, feature = "candle"))]
mod tests {
    use super::*;

    #[test]
    fn test_nli_label_ids_two_way() {
        let label2id = HashMap::from([
            ("entailment".to_string(), 0),
            ("not_entailment".to_string(), 1),
        ]);
        assert_eq!(nli_label_ids(&label2id).unwrap(), (0, 1));
    }

    #[test]
    fn test_nli_label_ids_mnli() {
        let label2id = HashMap::from([
            ("CONTRADICTION".to_string(), 0),
            ("NEUTRAL".to_string(), 1),
            ("ENTAILMENT".to_string(), 2),
        ]);
        assert_eq!(nli_label_ids(&label2id).unwrap(), (2, 0));
    }

    #[test]
    fn test_nli_label_ids_missing_entailment() {
        let label2id = HashMap::from([("positive".to_string(), 0)]);
        assert!(nli_label_ids(&label2id).is_err());
    }

    #[test]
    fn test_parse_device() {
        assert!(matches!(parse_device("cpu").unwrap(), Device::Cpu));
        assert!(parse_device("tpu").is_err());
    }
}
