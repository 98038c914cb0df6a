use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::{EngineConfig, Weighting};
use crate::error::{EngineError, EngineResult};

/// Common English stop words excluded from the vocabulary.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Splits text on non-alphanumeric boundaries, keeping lower-cased tokens
/// of at least two characters that are not stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Expands a token sequence into n-grams up to `ngram_max` words, joined
/// by single spaces. Unigrams come first, then each longer length in
/// document order.
fn ngrams(tokens: &[String], ngram_max: usize) -> Vec<String> {
    let mut terms = Vec::new();
    for n in 1..=ngram_max.max(1) {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// Fixed vocabulary plus weighting state for one corpus build.
///
/// All vectors produced by one fitted vectorizer share the identical
/// (alphabetical, hence deterministic) vocabulary ordering and are
/// directly comparable by cosine similarity.
#[derive(Debug)]
pub struct Vectorizer {
    vocabulary: Vec<String>,
    vocab_index: HashMap<String, usize>,
    /// Smoothed inverse document frequencies, present for tf-idf only.
    idf: Option<Vec<f32>>,
    weighting: Weighting,
    ngram_max: usize,
}

impl Vectorizer {
    /// Builds the vocabulary from the whole corpus of feature strings and
    /// returns a vectorizer whose `transform` yields aligned vectors.
    ///
    /// Fails with a configuration error when pruning leaves no terms at
    /// all, since such a corpus cannot be vectorized.
    pub fn fit(documents: &[String], config: &EngineConfig) -> EngineResult<Self> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| ngrams(&tokenize(doc), config.ngram_max))
            .collect();

        // Document frequency and total corpus frequency per term.
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut corpus_freq: HashMap<String, usize> = HashMap::new();
        for terms in &tokenized {
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *corpus_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len();
        let max_df_limit = config.max_df * n_docs as f64;
        let mut vocabulary: Vec<String> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= config.min_df.max(1) && df as f64 <= max_df_limit)
            .map(|(term, _)| term.clone())
            .collect();

        if let Some(max_features) = config.max_features {
            if vocabulary.len() > max_features {
                // Keep the terms most frequent across the corpus, ties
                // resolved alphabetically so the cut is deterministic.
                vocabulary.sort_by(|a, b| {
                    corpus_freq[b]
                        .cmp(&corpus_freq[a])
                        .then_with(|| a.cmp(b))
                });
                vocabulary.truncate(max_features);
            }
        }
        vocabulary.sort();

        if vocabulary.is_empty() {
            return Err(EngineError::Configuration(
                "vocabulary is empty after stop-word removal and pruning; \
                 cannot vectorize corpus"
                    .to_string(),
            ));
        }

        info!(
            "Fitted vocabulary of {} terms over {} documents",
            vocabulary.len(),
            n_docs
        );

        let vocab_index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();

        let idf = match config.weighting {
            Weighting::Count => None,
            Weighting::TfIdf => {
                let idf: Vec<f32> = vocabulary
                    .iter()
                    .map(|term| {
                        let df = doc_freq[term] as f32;
                        ((1.0 + n_docs as f32) / (1.0 + df)).ln() + 1.0
                    })
                    .collect();
                Some(idf)
            }
        };

        Ok(Self {
            vocabulary,
            vocab_index,
            idf,
            weighting: config.weighting,
            ngram_max: config.ngram_max,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Produces one feature vector per document, all in the fitted
    /// vocabulary's column order.
    pub fn transform(&self, documents: &[String]) -> Vec<Vec<f32>> {
        documents.iter().map(|doc| self.transform_one(doc)).collect()
    }

    fn transform_one(&self, document: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for term in ngrams(&tokenize(document), self.ngram_max) {
            if let Some(&idx) = self.vocab_index.get(&term) {
                vector[idx] += 1.0;
            }
        }

        if self.weighting == Weighting::TfIdf {
            if let Some(idf) = &self.idf {
                for (value, idf_value) in vector.iter_mut().zip(idf.iter()) {
                    *value *= idf_value;
                }
            }
            let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for value in &mut vector {
                    *value /= norm;
                }
            }
        }

        debug!(
            "Transformed document into vector with {} non-zero terms",
            vector.iter().filter(|v| **v != 0.0).count()
        );
        vector
    }
}
