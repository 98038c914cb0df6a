use serde::{Deserialize, Serialize};

/// Metadata fields that can contribute to a movie's combined feature text.
///
/// The order of the configured fields is the order their tokens appear in
/// the composed feature string, so identical configurations always produce
/// identical vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Genres,
    Language,
    Director,
    Cast,
    Keywords,
}

/// Term weighting scheme for the vectorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Raw term frequency counts.
    Count,
    /// Term frequency scaled by smoothed inverse document frequency,
    /// L2-normalized per vector.
    TfIdf,
}

/// Wording for score-based explanations when two movies share no
/// structured attributes. Product copy, so it stays configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackLabels {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl Default for FallbackLabels {
    fn default() -> Self {
        Self {
            high: "Highly similar themes and style".to_string(),
            medium: "Similar storytelling and themes".to_string(),
            low: "Related content and style".to_string(),
        }
    }
}

/// Tunable knobs for the corpus build and the matcher.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ordered fields composed into each movie's feature text.
    pub feature_fields: Vec<FeatureField>,
    pub weighting: Weighting,
    /// Upper n-gram bound; 2 indexes unigrams and bigrams.
    pub ngram_max: usize,
    /// Terms in fewer documents than this are pruned.
    pub min_df: usize,
    /// Terms in more than this fraction of documents are pruned.
    pub max_df: f64,
    /// Optional cap on vocabulary size, keeping the most frequent terms.
    pub max_features: Option<usize>,
    /// Minimum string-similarity ratio for a fuzzy title match.
    pub fuzzy_threshold: f64,
    pub fallback_labels: FallbackLabels,
}

impl Default for EngineConfig {
    /// Minimal mode: genres + language with plain counts.
    fn default() -> Self {
        Self {
            feature_fields: vec![FeatureField::Genres, FeatureField::Language],
            weighting: Weighting::Count,
            ngram_max: 2,
            min_df: 1,
            max_df: 0.8,
            max_features: None,
            fuzzy_threshold: 0.6,
            fallback_labels: FallbackLabels::default(),
        }
    }
}

impl EngineConfig {
    /// Rich mode: all metadata fields, TF-IDF weighted.
    pub fn rich() -> Self {
        Self {
            feature_fields: vec![
                FeatureField::Genres,
                FeatureField::Director,
                FeatureField::Cast,
                FeatureField::Keywords,
                FeatureField::Language,
            ],
            weighting: Weighting::TfIdf,
            max_features: Some(5000),
            ..Self::default()
        }
    }
}
