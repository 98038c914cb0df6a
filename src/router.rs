use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::vectorizer::tokenize;

/// How an incoming request should be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Treat the text as a reference title and rank by similarity.
    Title(String),
    /// Filter the corpus by the detected attribute terms.
    Filter {
        genre: Option<String>,
        language: Option<String>,
    },
}

/// Decides between title-similarity mode and keyword/filter mode.
///
/// An exact title hit always wins. Otherwise the query tokens are scanned
/// against the corpus's known genre and language terms ("tamil action
/// movies" filters on both); text matching neither stays a title lookup,
/// whose downstream fuzzy/substring resolution may still find a movie or
/// report "no match".
pub fn route_query(
    title_index: &HashMap<String, usize>,
    genre_terms: &HashSet<String>,
    language_terms: &HashSet<String>,
    raw: &str,
) -> QueryMode {
    let normalized = raw.to_lowercase().trim().to_string();
    if title_index.contains_key(&normalized) {
        return QueryMode::Title(normalized);
    }

    let tokens = tokenize(&normalized);
    let genre = tokens.iter().find(|t| genre_terms.contains(*t)).cloned();
    let language = tokens
        .iter()
        .find(|t| language_terms.contains(*t))
        .cloned();

    if genre.is_some() || language.is_some() {
        debug!(
            "Routing {:?} to filter mode (genre: {:?}, language: {:?})",
            raw, genre, language
        );
        QueryMode::Filter { genre, language }
    } else {
        QueryMode::Title(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (HashMap<String, usize>, HashSet<String>, HashSet<String>) {
        let mut titles = HashMap::new();
        titles.insert("dangal".to_string(), 0);
        titles.insert("kaala".to_string(), 1);

        let genres: HashSet<String> = ["drama", "sport", "action", "romance"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let languages: HashSet<String> = ["hindi", "tamil"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (titles, genres, languages)
    }

    #[test]
    fn test_exact_title_routes_to_title_mode() {
        let (titles, genres, languages) = fixtures();
        let mode = route_query(&titles, &genres, &languages, "Dangal");
        assert_eq!(mode, QueryMode::Title("dangal".to_string()));
    }

    #[test]
    fn test_genre_query_routes_to_filter_mode() {
        let (titles, genres, languages) = fixtures();
        let mode = route_query(&titles, &genres, &languages, "romance movies");
        assert_eq!(
            mode,
            QueryMode::Filter {
                genre: Some("romance".to_string()),
                language: None,
            }
        );
    }

    #[test]
    fn test_language_and_genre_are_both_detected() {
        let (titles, genres, languages) = fixtures();
        let mode = route_query(&titles, &genres, &languages, "Tamil action movies");
        assert_eq!(
            mode,
            QueryMode::Filter {
                genre: Some("action".to_string()),
                language: Some("tamil".to_string()),
            }
        );
    }

    #[test]
    fn test_unrecognized_text_stays_in_title_mode() {
        let (titles, genres, languages) = fixtures();
        let mode = route_query(&titles, &genres, &languages, "baahubal");
        assert_eq!(mode, QueryMode::Title("baahubal".to_string()));
    }
}
