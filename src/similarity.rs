use tracing::info;

/// Dense pairwise cosine similarity over all corpus vectors.
///
/// Computed eagerly once per corpus build so that recommendation requests
/// are pure row lookups. Stored row-major in a flat buffer; the matrix is
/// symmetric with a unit diagonal and all values in [0, 1].
#[derive(Debug)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Builds the full N×N matrix from the corpus vectors.
    ///
    /// A zero vector (a movie whose features matched nothing in the
    /// vocabulary) has similarity 0.0 to everything except itself.
    pub fn build(vectors: &[Vec<f32>]) -> Self {
        let size = vectors.len();
        let norms: Vec<f32> = vectors
            .iter()
            .map(|v| v.iter().map(|x| x * x).sum::<f32>().sqrt())
            .collect();

        let mut values = vec![0.0f32; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let sim = if norms[i] > 0.0 && norms[j] > 0.0 {
                    let dot: f32 = vectors[i]
                        .iter()
                        .zip(vectors[j].iter())
                        .map(|(a, b)| a * b)
                        .sum();
                    (dot / (norms[i] * norms[j])).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }

        info!("Computed {}x{} similarity matrix", size, size);
        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }

    /// All similarities of one movie against the whole corpus.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn test_diagonal_is_one() {
        let matrix = SimilarityMatrix::build(&sample_vectors());
        for i in 0..matrix.size() {
            assert!((matrix.get(i, i) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let matrix = SimilarityMatrix::build(&sample_vectors());
        for i in 0..matrix.size() {
            for j in 0..matrix.size() {
                assert!((matrix.get(i, j) - matrix.get(j, i)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_values_are_bounded() {
        let matrix = SimilarityMatrix::build(&sample_vectors());
        for i in 0..matrix.size() {
            for j in 0..matrix.size() {
                let sim = matrix.get(i, j);
                assert!((0.0..=1.0).contains(&sim), "sim({i},{j}) = {sim}");
            }
        }
    }

    #[test]
    fn test_zero_vector_has_zero_similarity() {
        let matrix = SimilarityMatrix::build(&sample_vectors());
        for j in 0..3 {
            assert!((matrix.get(3, j) - 0.0).abs() < 1e-6);
        }
        // Self-similarity stays 1.0 by convention even for zero vectors.
        assert!((matrix.get(3, 3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_known_cosine_value() {
        let matrix = SimilarityMatrix::build(&sample_vectors());
        // Overlap of one term out of two in each vector: 1/2.
        assert!((matrix.get(0, 1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_build_is_deterministic() {
        let vectors = sample_vectors();
        let first = SimilarityMatrix::build(&vectors);
        let second = SimilarityMatrix::build(&vectors);
        for i in 0..first.size() {
            for j in 0..first.size() {
                assert_eq!(first.get(i, j), second.get(i, j));
            }
        }
    }
}
