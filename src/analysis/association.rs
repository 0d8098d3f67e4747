// Association and analogy — thin wrappers over the space's nearest-neighbour
// query that reshape the hits into a result table.

use super::report::Table;
use crate::embeddings::traits::EmbeddingStore;
use crate::error::Result;

/// Neighbours returned when the caller does not ask for a specific count.
pub const DEFAULT_TOPN: usize = 10;

/// Words closest to `word`. The table's label column is headed by the word.
pub fn association(space: &dyn EmbeddingStore, word: &str, topn: usize) -> Result<Table> {
    let word = word.trim();
    let hits = space.most_similar(&[word], &[], topn)?;

    let mut table = Table::new(word, "Similarity");
    for hit in hits {
        table.push(hit.word, hit.similarity);
    }
    Ok(table)
}

/// Words completing "`negative_a` is to `positive_a` as `positive_b` is to ?",
/// i.e. closest to `positive_a + positive_b - negative_a`.
pub fn analogy(
    space: &dyn EmbeddingStore,
    positive_a: &str,
    positive_b: &str,
    negative_a: &str,
    topn: usize,
) -> Result<Table> {
    let hits = space.most_similar(
        &[positive_a.trim(), positive_b.trim()],
        &[negative_a.trim()],
        topn,
    )?;

    let mut table = Table::new("Analogy", "Similarity");
    for hit in hits {
        table.push(hit.word, hit.similarity);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::space::EmbeddingSpace;
    use crate::error::AnalysisError;

    fn space() -> EmbeddingSpace {
        EmbeddingSpace::from_entries(vec![
            ("man", vec![1.0, 0.0, 0.0]),
            ("woman", vec![1.0, 0.0, 1.0]),
            ("king", vec![1.0, 1.0, 0.0]),
            ("queen", vec![1.0, 1.0, 1.0]),
            ("apple", vec![0.0, 0.0, -1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_association_columns() {
        let table = association(&space(), "king", 3).unwrap();
        assert_eq!(table.columns, ["king".to_string(), "Similarity".to_string()]);
        assert_eq!(table.len(), 3);
        assert!(table.rows.iter().all(|r| r.label != "king"));
    }

    #[test]
    fn test_association_sorted_descending() {
        let table = association(&space(), "man", DEFAULT_TOPN).unwrap();
        assert_eq!(table.len(), 4);
        for pair in table.rows.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }

    #[test]
    fn test_association_unknown_word() {
        let err = association(&space(), "prince", 5).unwrap_err();
        assert_eq!(err, AnalysisError::UnknownWord("prince".to_string()));
    }

    #[test]
    fn test_king_man_woman_queen() {
        let table = analogy(&space(), "king", "woman", "man", 1).unwrap();
        assert_eq!(table.columns[0], "Analogy");
        assert_eq!(table.rows[0].label, "queen");
    }
}
