// Model registry — a fixed number of slots, each holding one named space.
//
// Slots are addressed by position, like the model panels of a comparison
// view: loading into an occupied slot replaces its model, and the registry
// never grows beyond the capacity it was created with. The registry is an
// ordinary owned value handed to whoever runs analyses.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::embeddings::loader::{self, ModelFormat};
use crate::embeddings::traits::EmbeddingStore;
use crate::error::{AnalysisError, Result};

/// Number of slots when none is configured.
pub const DEFAULT_SLOTS: usize = 3;

/// Where a model was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    pub path: PathBuf,
    pub format: ModelFormat,
}

/// A named space occupying one slot.
pub struct ModelEntry {
    pub name: String,
    pub source: Option<ModelSource>,
    space: Box<dyn EmbeddingStore>,
}

impl ModelEntry {
    pub fn space(&self) -> &dyn EmbeddingStore {
        self.space.as_ref()
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("words", &self.space.vocabulary_size())
            .field("dimension", &self.space.dimension())
            .finish()
    }
}

#[derive(Debug)]
pub struct ModelRegistry {
    slots: Vec<Option<ModelEntry>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

impl ModelRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put `space` into `slot`, returning the model it replaces.
    pub fn insert(
        &mut self,
        slot: usize,
        name: impl Into<String>,
        space: impl EmbeddingStore + 'static,
    ) -> Result<Option<ModelEntry>> {
        self.insert_entry(
            slot,
            ModelEntry {
                name: name.into(),
                source: None,
                space: Box::new(space),
            },
        )
    }

    /// Read a model file and put it into `slot`.
    ///
    /// On failure the slot keeps whatever it held before.
    pub fn load(
        &mut self,
        slot: usize,
        name: impl Into<String>,
        path: &Path,
        format: ModelFormat,
        limit: Option<usize>,
    ) -> Result<()> {
        self.check_slot(slot)?;
        let name = name.into();
        let space = loader::load(path, format, limit)?;
        let replaced = self.insert_entry(
            slot,
            ModelEntry {
                name: name.clone(),
                source: Some(ModelSource {
                    path: path.to_path_buf(),
                    format,
                }),
                space: Box::new(space),
            },
        )?;
        info!(
            slot,
            model = name.as_str(),
            replaced = replaced.as_ref().map(|e| e.name.as_str()),
            "Model ready"
        );
        Ok(())
    }

    /// Empty `slot`, returning its model.
    pub fn remove(&mut self, slot: usize) -> Result<Option<ModelEntry>> {
        self.check_slot(slot)?;
        Ok(self.slots[slot].take())
    }

    pub fn get(&self, slot: usize) -> Option<&ModelEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ModelEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }

    fn insert_entry(&mut self, slot: usize, entry: ModelEntry) -> Result<Option<ModelEntry>> {
        self.check_slot(slot)?;
        Ok(self.slots[slot].replace(entry))
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.slots.len() {
            return Err(AnalysisError::SlotOutOfRange {
                slot,
                capacity: self.slots.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::space::EmbeddingSpace;

    fn tiny(word: &str) -> EmbeddingSpace {
        EmbeddingSpace::from_entries(vec![(word, vec![1.0, 0.0])]).unwrap()
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ModelRegistry::default();
        assert_eq!(registry.capacity(), DEFAULT_SLOTS);
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_insert_replaces_occupant() {
        let mut registry = ModelRegistry::new(2);
        assert!(registry.insert(1, "first", tiny("a")).unwrap().is_none());
        let replaced = registry.insert(1, "second", tiny("b")).unwrap().unwrap();
        assert_eq!(replaced.name, "first");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1).unwrap().name, "second");
        assert!(registry.get(1).unwrap().space().has_word("b"));
    }

    #[test]
    fn test_no_growth_beyond_capacity() {
        let mut registry = ModelRegistry::new(2);
        let err = registry.insert(2, "extra", tiny("a")).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::SlotOutOfRange {
                slot: 2,
                capacity: 2
            }
        );
        assert_eq!(registry.capacity(), 2);
    }

    #[test]
    fn test_iter_in_slot_order_skips_empty() {
        let mut registry = ModelRegistry::new(3);
        registry.insert(2, "c", tiny("c")).unwrap();
        registry.insert(0, "a", tiny("a")).unwrap();
        let order: Vec<(usize, &str)> = registry
            .iter()
            .map(|(i, e)| (i, e.name.as_str()))
            .collect();
        assert_eq!(order, vec![(0, "a"), (2, "c")]);
    }

    #[test]
    fn test_remove() {
        let mut registry = ModelRegistry::new(1);
        registry.insert(0, "a", tiny("a")).unwrap();
        assert_eq!(registry.remove(0).unwrap().unwrap().name, "a");
        assert!(registry.is_empty());
        assert!(registry.remove(5).is_err());
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let mut registry = ModelRegistry::new(1);
        registry.insert(0, "kept", tiny("a")).unwrap();
        let err = registry
            .load(
                0,
                "broken",
                Path::new("/nonexistent/model.txt"),
                ModelFormat::Word2VecText,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(_)));
        assert_eq!(registry.get(0).unwrap().name, "kept");
    }
}
