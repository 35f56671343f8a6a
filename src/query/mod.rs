//! Corpus queries over artifact documents

mod criteria;
mod engine;

pub use criteria::QueryCriteria;
pub use engine::{QueryEngine, QueryHit};
