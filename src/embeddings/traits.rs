// Embedding store trait — the seam between the analyses and the vectors.
//
// Everything in `analysis` talks to a space through this trait, so scoring
// can be tested against a handful of hand-written vectors and run unchanged
// against a three-million-word GoogleNews model.

use crate::error::Result;

/// A single neighbour returned by a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub word: String,
    pub similarity: f64,
}

/// Read-only access to one embedding space.
///
/// Implementations must be immutable after construction: analyses share a
/// space across calls without locking.
pub trait EmbeddingStore: Send + Sync {
    /// Whether `word` has a vector in this space.
    fn has_word(&self, word: &str) -> bool;

    /// The vector for `word`, or `UnknownWord` when absent.
    fn vector_of(&self, word: &str) -> Result<&[f32]>;

    /// Number of components in every vector of this space.
    fn dimension(&self) -> usize;

    /// Number of words in the vocabulary.
    fn vocabulary_size(&self) -> usize;

    /// All words, in stored order.
    fn vocabulary(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// The `topn` words closest to the mean direction of `positive` minus
    /// `negative`, excluding the query words themselves.
    fn most_similar(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<Neighbour>>;
}
