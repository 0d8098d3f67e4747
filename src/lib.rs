// embias: association, analogy and group-bias analysis over word embeddings
//
// This is the library root. `embeddings` holds the vector store and model
// readers, `analysis` the single-model algorithms, `registry` and `runner`
// apply them across several loaded models.

pub mod analysis;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod output;
pub mod registry;
pub mod runner;
