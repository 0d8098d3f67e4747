// Analyses over a single embedding space, plus the reference word lists
// the bias scorer consumes.

pub mod association;
pub mod bias;
pub mod group;
pub mod report;
pub mod wordlists;
