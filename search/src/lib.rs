pub mod batch;
pub mod fetch;
pub mod session;

use anyhow::{Context, Result};
use std::path::Path;
use trecdex_core::persist::{load_index, IndexPaths};
use trecdex_core::store::DocumentStore;
use trecdex_core::Index;

/// Load the index at `dir` together with the raw document store beside it.
pub fn open_index(dir: &Path) -> Result<(Index, DocumentStore)> {
    let paths = IndexPaths::new(dir);
    let index = load_index(&paths).with_context(|| format!("loading index from {}", dir.display()))?;
    Ok((index, DocumentStore::new(dir)))
}
