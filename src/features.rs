use crate::config::FeatureField;
use crate::data::MovieRecord;

/// Combines the configured metadata fields of one record into a single
/// lower-cased, whitespace-normalized feature string.
///
/// Empty fields contribute nothing (no placeholder token), so a record
/// with a missing director simply yields a shorter string. The same
/// record and field list always produce the same output.
pub fn compose_features(record: &MovieRecord, fields: &[FeatureField]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for field in fields {
        let text = match field {
            FeatureField::Genres => record.genres.join(" "),
            FeatureField::Language => record.language.clone(),
            FeatureField::Director => record.director.clone(),
            FeatureField::Cast => record.cast.join(" "),
            FeatureField::Keywords => record.keywords.join(" "),
        };
        let text = text.trim().to_string();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    parts
        .join(" ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(genres: &[&str], language: &str, director: &str) -> MovieRecord {
        MovieRecord {
            id: 0,
            title: "Test".to_string(),
            language: language.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            director: director.to_string(),
            cast: vec![],
            keywords: vec![],
            year: 2016,
            rating: 8.0,
        }
    }

    #[test]
    fn test_compose_default_fields() {
        let movie = record(&["Drama", "Sport"], "Hindi", "Nitesh Tiwari");
        let features = compose_features(
            &movie,
            &[FeatureField::Genres, FeatureField::Language],
        );
        assert_eq!(features, "drama sport hindi");
    }

    #[test]
    fn test_missing_fields_are_skipped_not_placeheld() {
        let movie = record(&["Drama"], "", "");
        let features = compose_features(
            &movie,
            &[
                FeatureField::Genres,
                FeatureField::Director,
                FeatureField::Language,
            ],
        );
        assert_eq!(features, "drama");
    }

    #[test]
    fn test_all_fields_empty_yields_empty_string() {
        let movie = record(&[], "", "");
        let features = compose_features(
            &movie,
            &[FeatureField::Genres, FeatureField::Language],
        );
        assert!(features.is_empty());
    }

    #[test]
    fn test_composition_is_deterministic() {
        let movie = record(&["Action", "Thriller"], "Tamil", "Shankar");
        let fields = [
            FeatureField::Genres,
            FeatureField::Director,
            FeatureField::Language,
        ];
        assert_eq!(
            compose_features(&movie, &fields),
            compose_features(&movie, &fields)
        );
    }
}
