use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::data::{load_movies_from_path, MovieRecord};
use crate::error::{EngineError, EngineResult};
use crate::features::compose_features;
use crate::matcher::{self, Recommendation};
use crate::router::{route_query, QueryMode};
use crate::similarity::SimilarityMatrix;
use crate::vectorizer::{tokenize, Vectorizer};

/// Everything derived from one corpus build: the records, the lookup
/// index, the feature vectors, and the prebuilt similarity matrix.
///
/// A corpus is immutable once built and safe to share across concurrent
/// requests; reloading a dataset means building a fresh `Corpus` and
/// swapping it in whole, so a failed build leaves the previous one live.
pub struct Corpus {
    records: Vec<MovieRecord>,
    title_index: HashMap<String, usize>,
    genre_terms: HashSet<String>,
    language_terms: HashSet<String>,
    vectors: Vec<Vec<f32>>,
    similarity: SimilarityMatrix,
}

impl Corpus {
    fn build(records: Vec<MovieRecord>, config: &EngineConfig) -> EngineResult<Self> {
        if records.is_empty() {
            return Err(EngineError::Configuration(
                "corpus is empty; nothing to recommend from".to_string(),
            ));
        }

        // First occurrence wins for duplicate titles.
        let mut title_index = HashMap::new();
        for record in &records {
            title_index
                .entry(record.title.to_lowercase())
                .or_insert(record.id);
        }

        let mut genre_terms = HashSet::new();
        let mut language_terms = HashSet::new();
        for record in &records {
            for genre in &record.genres {
                genre_terms.extend(tokenize(genre));
            }
            language_terms.extend(tokenize(&record.language));
        }

        let documents: Vec<String> = records
            .iter()
            .map(|record| compose_features(record, &config.feature_fields))
            .collect();
        let vectorizer = Vectorizer::fit(&documents, config)?;
        let vectors = vectorizer.transform(&documents);
        let similarity = SimilarityMatrix::build(&vectors);

        info!(
            "Built corpus: {} movies, {} genres, {} languages",
            records.len(),
            genre_terms.len(),
            language_terms.len()
        );

        Ok(Self {
            records,
            title_index,
            genre_terms,
            language_terms,
            vectors,
            similarity,
        })
    }
}

/// Summary numbers for a loaded dataset.
#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub total_movies: usize,
    pub languages: HashMap<String, usize>,
    pub year_min: i32,
    pub year_max: i32,
    pub average_rating: f32,
}

/// The content-based recommendation engine.
///
/// Owns one immutable [`Corpus`]; all operations are side-effect-free
/// reads and may run concurrently without locking.
pub struct RecommendationEngine {
    corpus: Corpus,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Builds the engine from already-loaded records.
    pub fn from_records(
        records: Vec<MovieRecord>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let corpus = Corpus::build(records, &config)?;
        Ok(Self { corpus, config })
    }

    /// Loads a CSV dataset and builds the engine in one step.
    pub fn from_csv_path<P: AsRef<Path>>(
        csv_path: P,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let records = load_movies_from_path(csv_path)?;
        Self::from_records(records, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.corpus.records
    }

    pub fn movie(&self, id: usize) -> Option<&MovieRecord> {
        self.corpus.records.get(id)
    }

    pub fn similarity(&self, i: usize, j: usize) -> f32 {
        self.corpus.similarity.get(i, j)
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.corpus.vectors
    }

    /// Resolves a user-supplied title (exact, fuzzy, substring) to a
    /// corpus id; `None` means "movie not found".
    pub fn resolve_title(&self, input: &str) -> Option<usize> {
        matcher::resolve_title(
            &self.corpus.records,
            &self.corpus.title_index,
            input,
            self.config.fuzzy_threshold,
        )
    }

    /// Top-`k` movies most similar to `movie_id`, each with a score and
    /// an explanation.
    pub fn recommend(&self, movie_id: usize, k: usize) -> Vec<Recommendation> {
        matcher::recommend(
            &self.corpus.records,
            &self.corpus.similarity,
            movie_id,
            k,
            &self.config.fallback_labels,
        )
    }

    /// Resolves a title and recommends against it, returning the record
    /// the input matched alongside the recommendations.
    pub fn recommend_by_title(
        &self,
        title: &str,
        k: usize,
    ) -> Option<(&MovieRecord, Vec<Recommendation>)> {
        let movie_id = self.resolve_title(title)?;
        Some((&self.corpus.records[movie_id], self.recommend(movie_id, k)))
    }

    /// Corpus-order attribute filter; predicates are ANDed.
    pub fn filter_by_attributes(
        &self,
        language: Option<&str>,
        genre: Option<&str>,
        min_rating: Option<f32>,
    ) -> Vec<&MovieRecord> {
        matcher::filter_by_attributes(&self.corpus.records, language, genre, min_rating)
    }

    /// Decides how a free-text request should be served.
    pub fn route_query(&self, raw: &str) -> QueryMode {
        route_query(
            &self.corpus.title_index,
            &self.corpus.genre_terms,
            &self.corpus.language_terms,
            raw,
        )
    }

    /// Titles containing the partial input, in corpus order. Inputs
    /// shorter than two characters yield nothing.
    pub fn autocomplete(&self, partial: &str, max_suggestions: usize) -> Vec<&str> {
        let needle = partial.to_lowercase().trim().to_string();
        if needle.chars().count() < 2 {
            return Vec::new();
        }
        self.corpus
            .records
            .iter()
            .filter(|record| record.title.to_lowercase().contains(&needle))
            .map(|record| record.title.as_str())
            .take(max_suggestions)
            .collect()
    }

    pub fn stats(&self) -> DatasetStats {
        let records = &self.corpus.records;
        let mut languages: HashMap<String, usize> = HashMap::new();
        for record in records {
            if !record.language.is_empty() {
                *languages.entry(record.language.clone()).or_insert(0) += 1;
            }
        }

        // Zero means the field was missing in the source; keep such rows
        // out of the aggregates.
        let known_years: Vec<i32> = records
            .iter()
            .map(|r| r.year)
            .filter(|&y| y > 0)
            .collect();
        let rated: Vec<f32> = records
            .iter()
            .map(|r| r.rating)
            .filter(|&r| r > 0.0)
            .collect();

        DatasetStats {
            total_movies: records.len(),
            languages,
            year_min: known_years.iter().copied().min().unwrap_or(0),
            year_max: known_years.iter().copied().max().unwrap_or(0),
            average_rating: if rated.is_empty() {
                0.0
            } else {
                rated.iter().sum::<f32>() / rated.len() as f32
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureField, Weighting};
    use crate::router::QueryMode;

    fn movie(id: usize, title: &str, genres: &[&str], language: &str, rating: f32) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            language: language.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            director: String::new(),
            cast: vec![],
            keywords: vec![],
            year: 2015,
            rating,
        }
    }

    fn sample_records() -> Vec<MovieRecord> {
        vec![
            movie(0, "Dangal", &["Drama", "Sport"], "Hindi", 8.4),
            movie(1, "Sultan", &["Drama", "Sport"], "Hindi", 7.0),
            movie(2, "3 Idiots", &["Comedy", "Drama"], "Hindi", 8.4),
            movie(3, "Kaala", &["Action"], "Tamil", 7.3),
        ]
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::from_records(sample_records(), EngineConfig::default())
            .expect("engine builds")
    }

    #[test]
    fn test_empty_corpus_fails_the_build() {
        let result = RecommendationEngine::from_records(vec![], EngineConfig::default());
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_recommend_by_title_ranks_shared_genres_first() {
        let engine = engine();
        let (matched, recs) = engine.recommend_by_title("Dangal", 2).expect("resolved");
        assert_eq!(matched.title, "Dangal");
        assert_eq!(recs[0].title, "Sultan");
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_occurrence() {
        let mut records = sample_records();
        records.push(movie(4, "Dangal", &["Action"], "Tamil", 5.0));
        let engine =
            RecommendationEngine::from_records(records, EngineConfig::default()).expect("builds");
        assert_eq!(engine.resolve_title("dangal"), Some(0));
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let first = engine();
        let second = engine();
        let n = first.movies().len();
        for i in 0..n {
            for j in 0..n {
                assert_eq!(first.similarity(i, j), second.similarity(i, j));
            }
        }
        assert_eq!(first.vectors(), second.vectors());
    }

    #[test]
    fn test_rich_config_builds_with_tfidf() {
        let config = EngineConfig {
            feature_fields: vec![FeatureField::Genres, FeatureField::Language],
            weighting: Weighting::TfIdf,
            ..EngineConfig::default()
        };
        let engine =
            RecommendationEngine::from_records(sample_records(), config).expect("builds");
        let recs = engine.recommend(0, 3);
        assert_eq!(recs[0].title, "Sultan");
    }

    #[test]
    fn test_route_query_filter_mode() {
        let engine = engine();
        match engine.route_query("Tamil action movies") {
            QueryMode::Filter { genre, language } => {
                assert_eq!(genre.as_deref(), Some("action"));
                assert_eq!(language.as_deref(), Some("tamil"));
            }
            other => panic!("expected filter mode, got {other:?}"),
        }
    }

    #[test]
    fn test_autocomplete_matches_partial_titles() {
        let engine = engine();
        assert_eq!(engine.autocomplete("dan", 5), vec!["Dangal"]);
        assert!(engine.autocomplete("d", 5).is_empty());
        assert!(engine.autocomplete("zzz", 5).is_empty());
    }

    #[test]
    fn test_stats_aggregates() {
        let engine = engine();
        let stats = engine.stats();
        assert_eq!(stats.total_movies, 4);
        assert_eq!(stats.languages.get("Hindi"), Some(&3));
        assert_eq!(stats.year_min, 2015);
        assert_eq!(stats.year_max, 2015);
        let expected = (8.4 + 7.0 + 8.4 + 7.3) / 4.0;
        assert!((stats.average_rating - expected).abs() < 1e-4);
    }
}
