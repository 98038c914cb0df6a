use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::FallbackLabels;
use crate::data::MovieRecord;
use crate::similarity::SimilarityMatrix;

/// One ranked recommendation with its similarity score and a
/// human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub movie_id: usize,
    pub title: String,
    pub language: String,
    pub genres: Vec<String>,
    pub director: String,
    pub cast: Vec<String>,
    pub year: i32,
    pub rating: f32,
    pub score: f32,
    pub explanation: String,
}

/// Resolves a user-supplied title to a corpus id.
///
/// Tries, in order: exact lookup in the title index, fuzzy matching
/// against every known title (best ratio at or above `fuzzy_threshold`,
/// first corpus-order title winning ties), then substring containment in
/// either direction. `None` means "movie not found" and is an expected
/// outcome, not an error.
pub fn resolve_title(
    records: &[MovieRecord],
    title_index: &HashMap<String, usize>,
    input: &str,
    fuzzy_threshold: f64,
) -> Option<usize> {
    let needle = input.to_lowercase().trim().to_string();
    if needle.is_empty() {
        return None;
    }

    if let Some(&id) = title_index.get(&needle) {
        return Some(id);
    }

    let mut best: Option<(usize, f64)> = None;
    for record in records {
        let ratio = strsim::normalized_levenshtein(&needle, &record.title.to_lowercase());
        // Strictly-greater keeps the first corpus-order title on ties.
        if ratio >= fuzzy_threshold && best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
            best = Some((record.id, ratio));
        }
    }
    if let Some((id, ratio)) = best {
        debug!("Fuzzy-matched {:?} to {:?} ({:.2})", input, records[id].title, ratio);
        return Some(id);
    }

    for record in records {
        let title = record.title.to_lowercase();
        if title.contains(&needle) || needle.contains(&title) {
            return Some(record.id);
        }
    }

    None
}

/// Ranks every other movie against `movie_id` by prebuilt similarity.
///
/// The sort is stable and descending, so equal scores keep corpus order.
/// `k` larger than the corpus returns everything available.
pub fn recommend(
    records: &[MovieRecord],
    similarity: &SimilarityMatrix,
    movie_id: usize,
    k: usize,
    labels: &FallbackLabels,
) -> Vec<Recommendation> {
    let query = &records[movie_id];
    let row = similarity.row(movie_id);

    let mut scored: Vec<(usize, f32)> = row
        .iter()
        .enumerate()
        .filter(|(id, _)| *id != movie_id)
        .map(|(id, &score)| (id, score))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(k)
        .map(|(id, score)| {
            let movie = &records[id];
            Recommendation {
                movie_id: id,
                title: movie.title.clone(),
                language: movie.language.clone(),
                genres: movie.genres.clone(),
                director: movie.director.clone(),
                cast: movie.cast.clone(),
                year: movie.year,
                rating: movie.rating,
                score,
                explanation: explain(query, movie, score, labels),
            }
        })
        .collect()
}

/// Lists the structured overlaps between the query movie and a candidate,
/// falling back to a qualitative label derived from the score so every
/// recommendation carries a non-empty reason.
fn explain(
    query: &MovieRecord,
    candidate: &MovieRecord,
    score: f32,
    labels: &FallbackLabels,
) -> String {
    let mut reasons = Vec::new();

    let shared_genres = shared_tokens(&query.genres, &candidate.genres);
    if !shared_genres.is_empty() {
        reasons.push(format!("Similar genres: {}", shared_genres.join(", ")));
    }

    if !query.director.is_empty()
        && query.director.eq_ignore_ascii_case(&candidate.director)
    {
        reasons.push(format!("Same director: {}", query.director));
    }

    let shared_cast = shared_tokens(&query.cast, &candidate.cast);
    if !shared_cast.is_empty() {
        reasons.push(format!("Common actors: {}", shared_cast.join(", ")));
    }

    if !query.language.is_empty()
        && query.language.eq_ignore_ascii_case(&candidate.language)
    {
        reasons.push(format!("Same language: {}", query.language));
    }

    if reasons.is_empty() {
        let label = if score > 0.7 {
            &labels.high
        } else if score > 0.5 {
            &labels.medium
        } else {
            &labels.low
        };
        reasons.push(label.clone());
    }

    reasons.join(" | ")
}

/// Case-insensitive intersection, keeping the query-side order so the
/// explanation text is deterministic.
fn shared_tokens(query: &[String], candidate: &[String]) -> Vec<String> {
    query
        .iter()
        .filter(|item| {
            candidate
                .iter()
                .any(|other| other.eq_ignore_ascii_case(item))
        })
        .map(|item| item.to_lowercase())
        .collect()
}

/// Filters the corpus by language (exact, case-insensitive), genre
/// (substring, case-insensitive), and minimum rating, all ANDed.
/// Results come back in corpus order; callers apply their own cap.
pub fn filter_by_attributes<'a>(
    records: &'a [MovieRecord],
    language: Option<&str>,
    genre: Option<&str>,
    min_rating: Option<f32>,
) -> Vec<&'a MovieRecord> {
    records
        .iter()
        .filter(|movie| {
            language.map_or(true, |lang| movie.language.eq_ignore_ascii_case(lang))
        })
        .filter(|movie| {
            genre.map_or(true, |g| {
                let needle = g.to_lowercase();
                movie
                    .genres
                    .iter()
                    .any(|movie_genre| movie_genre.to_lowercase().contains(&needle))
            })
        })
        .filter(|movie| min_rating.map_or(true, |min| movie.rating >= min))
        .collect()
}
