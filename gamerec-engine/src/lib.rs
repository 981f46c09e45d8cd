//! Content-based game recommendations: TF-IDF term vectors over each item's
//! feature text, ranked by cosine similarity to a query item.

pub mod catalog;
pub mod config;
pub mod cosine;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod ranker;
pub mod server;
pub mod text;
pub mod transport;
pub mod vectorizer;

pub use catalog::{Catalog, ColumnNames, Item};
pub use engine::Engine;
pub use error::RecommendError;
pub use ranker::{ScoredItem, DEFAULT_NUM_RESULTS};
pub use vectorizer::VectorizerConfig;
