// In-memory embedding space.
//
// Vectors live in one flat f32 buffer indexed by insertion order; a hash map
// resolves words to rows. Insertion order is the file order of the model, so
// iterating the vocabulary is deterministic and matches the source file.

use std::collections::HashMap;

use super::math;
use super::traits::{EmbeddingStore, Neighbour};
use crate::error::{AnalysisError, Result};

/// Largest vector dimension a model file may declare.
pub const MAX_DIMENSION: usize = 1 << 16;

/// Rows reserved up front by `with_capacity`.
const PREALLOC_ROWS: usize = 1024;

/// A fixed-dimension word → vector table.
#[derive(Debug, Clone)]
pub struct EmbeddingSpace {
    dimension: usize,
    words: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f32>,
}

impl EmbeddingSpace {
    /// Create an empty space whose vectors all have `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self::with_capacity(dimension, 0)
    }

    /// Create an empty space with room for up to `capacity` words.
    ///
    /// At most `PREALLOC_ROWS` rows are reserved up front; the buffers grow
    /// as rows arrive.
    pub fn with_capacity(dimension: usize, capacity: usize) -> Self {
        let rows = capacity.min(PREALLOC_ROWS);
        let floats = if dimension <= MAX_DIMENSION {
            rows * dimension
        } else {
            0
        };
        Self {
            dimension,
            words: Vec::with_capacity(rows),
            index: HashMap::with_capacity(rows),
            data: Vec::with_capacity(floats),
        }
    }

    /// Build a space from `(word, vector)` pairs.
    ///
    /// The dimension is taken from the first vector; every other vector must
    /// match it.
    pub fn from_entries<I, W>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, Vec<f32>)>,
        W: Into<String>,
    {
        let mut entries = entries.into_iter().peekable();
        let dimension = entries.peek().map(|(_, v)| v.len()).unwrap_or(0);
        let mut space = Self::new(dimension);
        for (word, vector) in entries {
            space.insert(word, &vector)?;
        }
        Ok(space)
    }

    /// Add a word. Returns `false` (and keeps the existing vector) when the
    /// word is already present.
    pub fn insert(&mut self, word: impl Into<String>, vector: &[f32]) -> Result<bool> {
        if vector.len() != self.dimension {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let word = word.into();
        if self.index.contains_key(&word) {
            return Ok(false);
        }
        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.data.extend_from_slice(vector);
        Ok(true)
    }

    fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

impl EmbeddingStore for EmbeddingSpace {
    fn has_word(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    fn vector_of(&self, word: &str) -> Result<&[f32]> {
        self.index
            .get(word)
            .map(|&i| self.row(i))
            .ok_or_else(|| AnalysisError::unknown_word(word))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    fn vocabulary(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.words.iter().map(String::as_str))
    }

    fn most_similar(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<Neighbour>> {
        if positive.is_empty() && negative.is_empty() {
            return Ok(Vec::new());
        }

        // Mean of unit vectors, negatives weighted -1
        let mut query = vec![0.0_f64; self.dimension];
        let weighted = positive
            .iter()
            .map(|w| (*w, 1.0))
            .chain(negative.iter().map(|w| (*w, -1.0)));
        for (word, weight) in weighted {
            let v = self.vector_of(word)?;
            if let Some(u) = math::unit(v) {
                for (q, x) in query.iter_mut().zip(u) {
                    *q += weight * x;
                }
            }
        }

        let query = math::unit(&query).ok_or_else(|| AnalysisError::DegenerateGroup {
            group: positive
                .iter()
                .chain(negative.iter())
                .copied()
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        let mut scored: Vec<(usize, f64)> = (0..self.words.len())
            .filter(|&i| {
                let w = self.words[i].as_str();
                !positive.contains(&w) && !negative.contains(&w)
            })
            .map(|i| (i, math::cosine_similarity(self.row(i), &query)))
            .collect();

        // Stable sort keeps vocabulary order among equal similarities
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(topn);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| Neighbour {
                word: self.words[i].clone(),
                similarity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity_tolerates_bogus_sizes() {
        let mut space = EmbeddingSpace::with_capacity(2, usize::MAX);
        assert!(space.insert("he", &[1.0, 0.0]).unwrap());
        assert_eq!(space.vocabulary_size(), 1);

        let space = EmbeddingSpace::with_capacity(usize::MAX / 2, usize::MAX);
        assert_eq!(space.vocabulary_size(), 0);
    }

    fn animals() -> EmbeddingSpace {
        EmbeddingSpace::from_entries(vec![
            ("cat", vec![1.0, 0.0, 0.0]),
            ("dog", vec![0.9, 0.1, 0.0]),
            ("king", vec![0.0, 1.0, 0.0]),
            ("queen", vec![0.0, 0.9, 0.1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let space = animals();
        assert!(space.has_word("dog"));
        assert!(!space.has_word("Dog"));
        assert_eq!(space.vector_of("king").unwrap(), &[0.0_f32, 1.0, 0.0][..]);
        assert_eq!(space.dimension(), 3);
        assert_eq!(space.vocabulary_size(), 4);
    }

    #[test]
    fn test_unknown_word() {
        let space = animals();
        assert_eq!(
            space.vector_of("wolf"),
            Err(AnalysisError::UnknownWord("wolf".to_string()))
        );
    }

    #[test]
    fn test_vocabulary_keeps_insertion_order() {
        let space = animals();
        let words: Vec<&str> = space.vocabulary().collect();
        assert_eq!(words, vec!["cat", "dog", "king", "queen"]);
    }

    #[test]
    fn test_insert_rejects_wrong_dimension() {
        let mut space = animals();
        let err = space.insert("wolf", &[1.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut space = animals();
        assert!(!space.insert("cat", &[0.0, 0.0, 1.0]).unwrap());
        assert_eq!(space.vector_of("cat").unwrap(), &[1.0_f32, 0.0, 0.0][..]);
        assert_eq!(space.vocabulary_size(), 4);
    }

    #[test]
    fn test_most_similar_excludes_query() {
        let space = animals();
        let hits = space.most_similar(&["cat"], &[], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].word, "dog");
        assert!(hits.iter().all(|n| n.word != "cat"));
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn test_most_similar_unknown_word() {
        let space = animals();
        let err = space.most_similar(&["wolf"], &[], 5).unwrap_err();
        assert_eq!(err, AnalysisError::UnknownWord("wolf".to_string()));
    }

    #[test]
    fn test_most_similar_analogy_direction() {
        // king - cat + dog points mostly along the "royal" axis
        let space = animals();
        let hits = space.most_similar(&["king", "dog"], &["cat"], 1).unwrap();
        assert_eq!(hits[0].word, "queen");
    }
}
