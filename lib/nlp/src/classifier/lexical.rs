// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Lexical zero-shot classifier
//!
//! Scores labels by the cue words found in the text. A label's cues are its
//! own words, the synonyms listed for those words in [`CUES`], and the mood
//! hints in [`MOOD_HINTS`] that point at it. It needs no model download and is
//! fully deterministic, which makes it the backend of choice for development
//! builds and tests.
//!
//! Each label accumulates a weight `w` (1.0 per matched cue, 0.5 per matched
//! mood hint) and is scored `0.05 + 0.9 * (1 - e^-w)`, so an unmatched label
//! sits at 0.05 and the score saturates towards 0.95.

use std::collections::HashSet;

use anyhow::Result;

use super::{ZeroShotClassifier, normalize};
use crate::protocols::CategoryScore;

const BASE_SCORE: f32 = 0.05;
const SCORE_RANGE: f32 = 0.9;
const CUE_WEIGHT: f32 = 1.0;
const HINT_WEIGHT: f32 = 0.5;

/// Synonyms keyed by a label word
const CUES: &[(&str, &[&str])] = &[
    ("art", &["gallery", "exhibit", "exhibition", "painting", "sculpture", "mural", "artist", "museum"]),
    ("music", &["concert", "band", "jazz", "gig", "dj", "orchestra", "symphony", "singer", "album", "choir"]),
    ("food", &["restaurant", "tasting", "brunch", "dinner", "chef", "cuisine", "market", "street food", "eat"]),
    ("outdoor", &["park", "trail", "hike", "hiking", "beach", "garden", "picnic", "outside", "ravine", "island"]),
    ("hiking", &["hike", "trail", "trek", "outdoor", "nature", "ravine", "walk", "mountain"]),
    ("festival", &["fest", "fair", "carnival", "parade", "celebration", "street party"]),
    ("family", &["kids", "children", "child", "parents", "all ages", "family-friendly", "toddler"]),
    ("comedy", &["standup", "stand-up", "improv", "comedian", "funny", "laugh", "sketch"]),
    ("theater", &["theatre", "play", "musical", "stage", "broadway", "drama", "opera"]),
    ("film", &["movie", "cinema", "screening", "documentary", "premiere", "tiff"]),
    ("sports", &["game", "match", "raptors", "leafs", "jays", "soccer", "basketball", "hockey", "baseball", "race"]),
    ("education", &["lecture", "talk", "seminar", "class", "course", "learn", "panel", "library"]),
    ("tech", &["technology", "startup", "hackathon", "coding", "ai", "software", "developer", "meetup"]),
    ("workshop", &["hands-on", "diy", "craft", "make", "masterclass", "training"]),
    ("cultural", &["culture", "heritage", "tradition", "community", "history", "indigenous", "diaspora"]),
    ("chill", &["relax", "relaxing", "cozy", "calm", "quiet", "laid-back", "mellow"]),
    ("indoors", &["indoor", "inside", "hall", "venue", "museum", "library"]),
    ("active", &["run", "running", "yoga", "bike", "cycling", "fitness", "dance", "climb"]),
    ("nightlife", &["club", "bar", "party", "late night", "tonight", "dj", "lounge", "pub"]),
    ("free", &["no cost", "complimentary", "pwyc", "gratis", "admission free"]),
    ("accessible", &["wheelchair", "accessibility", "asl", "barrier-free", "sensory-friendly"]),
];

/// Mood words and the category words they suggest
const MOOD_HINTS: &[(&str, &[&str])] = &[
    ("fun", &["festival", "comedy", "nightlife"]),
    ("relax", &["chill", "indoors", "art"]),
    ("learn", &["education", "workshop", "tech"]),
    ("outdoor", &["outdoor", "sports", "festival"]),
    ("indoor", &["indoors", "theater", "film"]),
    ("chill", &["chill", "indoors", "art"]),
    ("exciting", &["festival", "nightlife", "music"]),
    ("family", &["family", "free", "outdoor"]),
    ("date", &["food", "film", "cultural"]),
    ("weekend", &["festival", "outdoor", "nightlife"]),
    ("cheap", &["free", "outdoor", "cultural"]),
    ("night", &["nightlife", "comedy", "music"]),
    ("day", &["outdoor", "food", "cultural"]),
];

#[derive(Debug, Default)]
pub struct LexicalClassifier;

impl LexicalClassifier {
    pub fn new() -> Self {
        tracing::info!("Initialized LexicalClassifier");
        Self
    }

    fn label_weight(text: &NormalizedText, label: &str) -> f32 {
        let label_words = words(label);
        let mut cues: HashSet<&str> = HashSet::new();
        for word in &label_words {
            cues.insert(word.as_str());
            for (key, synonyms) in CUES {
                if *key == word.as_str() {
                    cues.extend(synonyms.iter().copied());
                }
            }
        }
        let label_lower = label.to_lowercase();
        for (key, synonyms) in CUES {
            if *key == label_lower {
                cues.extend(synonyms.iter().copied());
            }
        }

        let mut weight = cues
            .iter()
            .filter(|cue| text.mentions(cue))
            .count() as f32
            * CUE_WEIGHT;

        for (mood, suggested) in MOOD_HINTS {
            if text.mentions(mood)
                && suggested
                    .iter()
                    .any(|category| label_words.iter().any(|w| w == category))
            {
                weight += HINT_WEIGHT;
            }
        }

        weight
    }
}

impl ZeroShotClassifier for LexicalClassifier {
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        multi_label: bool,
    ) -> Result<Vec<CategoryScore>> {
        let normalized = NormalizedText::new(text);
        let mut scores: Vec<CategoryScore> = candidate_labels
            .iter()
            .map(|label| {
                let weight = Self::label_weight(&normalized, label);
                let score = BASE_SCORE + SCORE_RANGE * (1.0 - (-weight).exp());
                CategoryScore::new(label.clone(), score)
            })
            .collect();

        if !multi_label {
            normalize(&mut scores);
        }
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

fn words(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lower-cased text split into words, kept alongside a space-joined form
/// for matching multi-word cues.
struct NormalizedText {
    tokens: HashSet<String>,
    joined: String,
}

impl NormalizedText {
    fn new(text: &str) -> Self {
        let tokens = words(text);
        let joined = format!(" {} ", tokens.join(" "));
        Self {
            tokens: tokens.into_iter().collect(),
            joined,
        }
    }

    fn mentions(&self, cue: &str) -> bool {
        if cue.contains(' ') {
            return self.joined.contains(&format!(" {cue} "));
        }
        self.tokens.iter().any(|token| {
            token == cue
                || token.strip_suffix('s') == Some(cue)
                || token.strip_suffix("es") == Some(cue)
        })
    }
}
