use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineResult;

/// One catalog entry. Fields that are absent in the source load as empty
/// strings / empty lists / zero so feature composition never fails.
#[derive(Debug, Clone, Serialize)]
pub struct MovieRecord {
    /// Position in the corpus, assigned at load time and stable for the
    /// lifetime of the process.
    pub id: usize,
    pub title: String,
    pub language: String,
    pub genres: Vec<String>,
    pub director: String,
    pub cast: Vec<String>,
    pub keywords: Vec<String>,
    pub year: i32,
    pub rating: f32,
}

/// CSV row as it appears in the dataset. Numeric columns come in as
/// strings so one malformed value degrades to a default instead of
/// dropping the row.
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default, alias = "cast")]
    main_actors: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    rating: Option<String>,
}

/// Splits a comma-joined source field into trimmed, non-empty parts.
fn split_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_numeric<T: std::str::FromStr + Default>(
    raw: Option<String>,
    field: &str,
    title: &str,
) -> T {
    let raw = raw.unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return T::default();
    }
    match trimmed.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid {} {:?} for {:?}, defaulting", field, trimmed, title);
            T::default()
        }
    }
}

impl MovieRecord {
    fn from_raw(id: usize, raw: RawMovieRow) -> Self {
        let title = raw.title.unwrap_or_default().trim().to_string();
        let year = parse_numeric(raw.year, "year", &title);
        let rating = parse_numeric(raw.rating, "rating", &title);
        Self {
            id,
            title,
            language: raw.language.unwrap_or_default().trim().to_string(),
            genres: split_list(raw.genres),
            director: raw.director.unwrap_or_default().trim().to_string(),
            cast: split_list(raw.main_actors),
            keywords: split_list(raw.keywords),
            year,
            rating,
        }
    }
}

/// Loads movie records from a CSV file, in file order.
pub fn load_movies_from_path<P: AsRef<Path>>(csv_path: P) -> EngineResult<Vec<MovieRecord>> {
    info!("Loading movies from CSV: {:?}", csv_path.as_ref());
    let reader = csv::Reader::from_path(csv_path)?;
    load_movies(reader)
}

/// Loads movie records from any CSV source (file, in-memory buffer).
pub fn load_movies_from_reader<R: Read>(source: R) -> EngineResult<Vec<MovieRecord>> {
    load_movies(csv::Reader::from_reader(source))
}

fn load_movies<R: Read>(mut reader: csv::Reader<R>) -> EngineResult<Vec<MovieRecord>> {
    let mut movies = Vec::new();
    for result in reader.deserialize() {
        let raw: RawMovieRow = result?;
        movies.push(MovieRecord::from_raw(movies.len(), raw));
    }
    info!("Loaded {} movies", movies.len());
    Ok(movies)
}
