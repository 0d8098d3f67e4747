// Multi-model runner — one analysis, every loaded model.
//
// Each model is analysed independently and sequentially. A failure in one
// model (a missing query word, a group with no words in its vocabulary)
// becomes that model's error message; the remaining models still run.
// Results come back in slot order.

use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::association;
use crate::analysis::bias::{self, BiasOptions, BiasReport};
use crate::analysis::report::Table;
use crate::analysis::wordlists::{BiasAxis, NeutralCategory};
use crate::embeddings::traits::EmbeddingStore;
use crate::error::Result;
use crate::registry::ModelRegistry;

/// The outcome of one analysis on one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRun<T> {
    pub slot: usize,
    pub model: String,
    /// The result rows, or the message to show in place of them
    pub outcome: std::result::Result<T, String>,
}

impl<T> ModelRun<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs analyses across every model of a registry.
pub struct MultiModelRunner<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> MultiModelRunner<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Apply `op` to every model, capturing failures per model.
    pub fn run_each<T, F>(&self, analysis: &str, op: F) -> Vec<ModelRun<T>>
    where
        F: Fn(&dyn EmbeddingStore) -> Result<T>,
    {
        self.registry
            .iter()
            .map(|(slot, entry)| {
                let outcome = op(entry.space()).map_err(|e| {
                    warn!(
                        slot,
                        model = entry.name.as_str(),
                        analysis,
                        error = %e,
                        "Analysis failed for model"
                    );
                    e.to_string()
                });
                debug!(slot, model = entry.name.as_str(), analysis, ok = outcome.is_ok(), "Model done");
                ModelRun {
                    slot,
                    model: entry.name.clone(),
                    outcome,
                }
            })
            .collect()
    }

    pub fn run_association(&self, word: &str, topn: usize) -> Vec<ModelRun<Table>> {
        self.run_each("association", |space| {
            association::association(space, word, topn)
        })
    }

    pub fn run_analogy(
        &self,
        positive_a: &str,
        positive_b: &str,
        negative_a: &str,
        topn: usize,
    ) -> Vec<ModelRun<Table>> {
        self.run_each("analogy", |space| {
            association::analogy(space, positive_a, positive_b, negative_a, topn)
        })
    }

    pub fn run_bias_score(
        &self,
        axis: &BiasAxis,
        categories: &[NeutralCategory],
        options: BiasOptions,
    ) -> Vec<ModelRun<BiasReport>> {
        self.run_each("bias", |space| bias::score(space, axis, categories, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::space::EmbeddingSpace;

    #[test]
    fn test_empty_registry_yields_nothing() {
        let registry = ModelRegistry::default();
        let runner = MultiModelRunner::new(&registry);
        assert!(runner.run_association("cat", 5).is_empty());
    }

    #[test]
    fn test_failure_is_captured_per_model() {
        let mut registry = ModelRegistry::new(2);
        registry
            .insert(
                0,
                "has-cat",
                EmbeddingSpace::from_entries(vec![("cat", vec![1.0, 0.0]), ("dog", vec![0.9, 0.1])])
                    .unwrap(),
            )
            .unwrap();
        registry
            .insert(
                1,
                "no-cat",
                EmbeddingSpace::from_entries(vec![("dog", vec![1.0, 0.0])]).unwrap(),
            )
            .unwrap();

        let runs = MultiModelRunner::new(&registry).run_association("cat", 5);
        assert_eq!(runs.len(), 2);
        assert!(runs[0].is_ok());
        assert_eq!(runs[1].model, "no-cat");
        assert_eq!(
            runs[1].outcome,
            Err("Key 'cat' not present in vocabulary".to_string())
        );
    }
}
