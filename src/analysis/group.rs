// Group vectors — one unit direction per side of a bias axis.
//
// Each member word is unit-normalized before summing so a handful of
// high-magnitude words cannot dominate the group direction; the sum is then
// normalized again. Out-of-vocabulary members are skipped.

use tracing::debug;

use super::wordlists::WordGroup;
use crate::embeddings::math;
use crate::embeddings::traits::EmbeddingStore;
use crate::error::{AnalysisError, Result};

/// A unit-norm vector representing one word group in one space.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupVector {
    components: Vec<f64>,
    resolved: usize,
}

impl GroupVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.components
    }

    /// How many member words contributed to the direction.
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn dimension(&self) -> usize {
        self.components.len()
    }
}

/// Build the group vector of `group` in `space`.
///
/// Fails with `DegenerateGroup` when no member resolves or the members
/// cancel out exactly.
pub fn build(space: &dyn EmbeddingStore, group: &WordGroup) -> Result<GroupVector> {
    let mut sum = vec![0.0_f64; space.dimension()];
    let mut resolved = 0usize;

    for word in &group.words {
        let word = word.trim();
        if !space.has_word(word) {
            continue;
        }
        let Some(unit) = math::unit(space.vector_of(word)?) else {
            continue;
        };
        for (acc, x) in sum.iter_mut().zip(unit) {
            *acc += x;
        }
        resolved += 1;
    }

    let components = math::unit(&sum).ok_or_else(|| AnalysisError::DegenerateGroup {
        group: group.name.clone(),
    })?;

    debug!(
        group = group.name.as_str(),
        resolved,
        total = group.words.len(),
        "Built group vector"
    );

    Ok(GroupVector {
        components,
        resolved,
    })
}
