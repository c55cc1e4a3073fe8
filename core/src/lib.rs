pub mod bm25;
pub mod boolean;
pub mod builder;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod select;
pub mod store;
pub mod summary;
pub mod tokenizer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use index::*;
pub use tokenizer::Normalization;
