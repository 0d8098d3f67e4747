// Bias scoring — asymmetry of neutral words between the two poles of an axis.
//
// For a neutral word v and group vectors g1, g2 the word's bias is
//
//   |cosine_distance(g1, v) - cosine_distance(g2, v)|
//
// A category's score is the mean over its words that exist in the space.
// The optional "All Words" row applies the same formula to every vocabulary
// entry but divides by the full vocabulary size, so entries whose lowercase
// form is missing still count in the denominator.
//
// With `normalize` set, every score is divided by the distance between the
// two group vectors, which makes axes with closer poles comparable to axes
// with far-apart ones.

use serde::Serialize;
use tracing::{debug, warn};

use super::group::{self, GroupVector};
use super::report::Table;
use super::wordlists::{BiasAxis, NeutralCategory};
use crate::embeddings::math;
use crate::embeddings::traits::EmbeddingStore;
use crate::error::{AnalysisError, Result};

/// Label of the aggregate row computed over the whole vocabulary.
pub const ALL_WORDS_LABEL: &str = "All Words";

/// Flags for a bias scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BiasOptions {
    /// Divide every score by the cosine distance between the group vectors
    pub normalize: bool,
    /// Score only the curated categories. When false the categories are
    /// still scored and an "All Words" row over the whole vocabulary is
    /// appended after them; this flag never drops category rows.
    pub limit_to_categories: bool,
    /// Omit categories with no resolved words instead of failing the run
    pub skip_empty_categories: bool,
}

impl Default for BiasOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            limit_to_categories: true,
            skip_empty_categories: false,
        }
    }
}

/// One scored category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasRow {
    pub category: String,
    pub score: f64,
    /// Words found in the space
    pub resolved: usize,
    /// The divisor used for the mean
    pub denominator: usize,
}

/// Scores for one (model, axis) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasReport {
    pub axis: String,
    pub normalized: bool,
    /// Cosine distance between the two group vectors
    pub axis_separation: f64,
    pub rows: Vec<BiasRow>,
}

impl BiasReport {
    pub fn row(&self, category: &str) -> Option<&BiasRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("Category", "Bias");
        for row in &self.rows {
            table.push(row.category.clone(), row.score);
        }
        table
    }
}

/// Score `categories` against `axis` in `space`.
pub fn score(
    space: &dyn EmbeddingStore,
    axis: &BiasAxis,
    categories: &[NeutralCategory],
    options: BiasOptions,
) -> Result<BiasReport> {
    let g1 = group::build(space, &axis.first)?;
    let g2 = group::build(space, &axis.second)?;
    let axis_separation = math::cosine_distance(g1.as_slice(), g2.as_slice());

    if options.normalize && axis_separation < math::NORM_EPSILON {
        return Err(AnalysisError::CoincidentGroups {
            axis: axis.label.clone(),
        });
    }
    let scale = |raw: f64| {
        if options.normalize {
            raw / axis_separation
        } else {
            raw
        }
    };

    let mut rows = Vec::with_capacity(categories.len() + 1);
    for category in categories {
        match category_row(space, &g1, &g2, category) {
            Ok(mut row) => {
                row.score = scale(row.score);
                rows.push(row);
            }
            Err(AnalysisError::NoResolvedWords { category }) if options.skip_empty_categories => {
                warn!(category = category.as_str(), "No category words in vocabulary, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    if !options.limit_to_categories {
        let mut row = all_words_row(space, &g1, &g2)?;
        row.score = scale(row.score);
        rows.push(row);
    }

    debug!(
        axis = axis.label.as_str(),
        separation = axis_separation,
        rows = rows.len(),
        "Scored bias axis"
    );

    Ok(BiasReport {
        axis: axis.label.clone(),
        normalized: options.normalize,
        axis_separation,
        rows,
    })
}

/// Bias of a single vector against the two poles.
pub fn word_bias(g1: &GroupVector, g2: &GroupVector, v: &[f32]) -> f64 {
    (math::cosine_distance(g1.as_slice(), v) - math::cosine_distance(g2.as_slice(), v)).abs()
}

fn category_row(
    space: &dyn EmbeddingStore,
    g1: &GroupVector,
    g2: &GroupVector,
    category: &NeutralCategory,
) -> Result<BiasRow> {
    let mut sum = 0.0;
    let mut resolved = 0usize;

    for word in &category.words {
        let word = word.to_lowercase();
        if !space.has_word(&word) {
            continue;
        }
        sum += word_bias(g1, g2, space.vector_of(&word)?);
        resolved += 1;
    }

    if resolved == 0 {
        return Err(AnalysisError::NoResolvedWords {
            category: category.label.clone(),
        });
    }

    Ok(BiasRow {
        category: category.label.clone(),
        score: sum / resolved as f64,
        resolved,
        denominator: resolved,
    })
}

fn all_words_row(space: &dyn EmbeddingStore, g1: &GroupVector, g2: &GroupVector) -> Result<BiasRow> {
    let denominator = space.vocabulary_size();
    if denominator == 0 {
        return Err(AnalysisError::NoResolvedWords {
            category: ALL_WORDS_LABEL.to_string(),
        });
    }

    let mut sum = 0.0;
    let mut resolved = 0usize;
    for word in space.vocabulary() {
        let lower = word.to_lowercase();
        if !space.has_word(&lower) {
            continue;
        }
        sum += word_bias(g1, g2, space.vector_of(&lower)?);
        resolved += 1;
    }

    Ok(BiasRow {
        category: ALL_WORDS_LABEL.to_string(),
        score: sum / denominator as f64,
        resolved,
        denominator,
    })
}
