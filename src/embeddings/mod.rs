// Embedding spaces: the store trait and its in-memory implementation,
// plus model file readers and shared vector math.

pub mod loader;
pub mod math;
pub mod space;
pub mod traits;
