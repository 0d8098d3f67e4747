// Error taxonomy for the analysis core.
//
// Every failure the core can produce has its own variant so callers can
// tell a missing word apart from a broken model file. The multi-model runner
// turns these into per-model messages; nothing here is retried.

use thiserror::Error;

/// Errors produced by embedding lookups, group construction and scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A queried word is absent from the space's vocabulary
    #[error("Key '{0}' not present in vocabulary")]
    UnknownWord(String),

    /// None of a word group's members resolved to a usable vector
    #[error("Word group '{group}' has no words in the vocabulary")]
    DegenerateGroup { group: String },

    /// None of a neutral-word category's members resolved
    #[error("Category '{category}' has no words in the vocabulary")]
    NoResolvedWords { category: String },

    /// Both group vectors point the same way, so normalizing by their
    /// distance would divide by zero
    #[error("Group vectors of axis '{axis}' coincide; cannot normalize by their distance")]
    CoincidentGroups { axis: String },

    /// A vector does not match the space's dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Model file could not be read or parsed
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// Bias axis identifier outside the known table
    #[error("Unknown bias axis: {0}")]
    UnknownAxis(String),

    /// Registry slot outside the configured capacity
    #[error("Model slot {slot} out of range (capacity {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    /// Word list file missing or malformed
    #[error("Word list error: {0}")]
    WordList(String),
}

impl AnalysisError {
    /// Create an unknown word error
    pub fn unknown_word(word: impl Into<String>) -> Self {
        Self::UnknownWord(word.into())
    }

    /// Create a model loading error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a word list error
    pub fn word_list(msg: impl Into<String>) -> Self {
        Self::WordList(msg.into())
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
