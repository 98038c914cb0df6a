//! Content-based movie recommendation engine.
//!
//! Builds an in-memory corpus from a tabular movie catalog, vectorizes
//! each movie's metadata (count or TF-IDF weighted), precomputes a dense
//! pairwise cosine similarity matrix, and serves ranked, explained
//! recommendations from fuzzy-matched titles or genre/language queries.
//!
//! The corpus is built once at startup and immutable afterwards; all
//! lookups are lock-free reads.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod matcher;
pub mod router;
pub mod similarity;
pub mod vectorizer;

pub use config::{EngineConfig, FallbackLabels, FeatureField, Weighting};
pub use data::{load_movies_from_path, load_movies_from_reader, MovieRecord};
pub use engine::{DatasetStats, RecommendationEngine};
pub use error::{EngineError, EngineResult};
pub use matcher::Recommendation;
pub use router::QueryMode;
