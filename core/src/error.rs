use std::path::PathBuf;

use crate::DocId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("index manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid docno {docno:?}: {reason}")]
    InvalidDocno { docno: String, reason: &'static str },

    #[error("document {internal_id} has no <DOCNO> line")]
    MissingDocno { internal_id: DocId },

    #[error("document starting at line {line} is missing </DOC>")]
    UnterminatedDocument { line: usize },

    #[error("corrupt index artifact {artifact}: {reason}")]
    Corrupt { artifact: &'static str, reason: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("query file line {line}: {reason}")]
    QueryFile { line: usize, reason: &'static str },

    #[error("index destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("corpus source does not exist: {0}")]
    SourceMissing(PathBuf),
}

impl Error {
    pub(crate) fn corrupt(artifact: &'static str, reason: impl Into<String>) -> Self {
        Error::Corrupt { artifact, reason: reason.into() }
    }
}
