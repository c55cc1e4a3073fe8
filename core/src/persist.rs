use crate::index::{DocMeta, Index, InvertedIndex, Lexicon, Posting, TermId};
use crate::store::{load_id_mapping, load_metadata};
use crate::{Error, Normalization, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    pub normalization: Normalization,
}

/// File layout of one index destination directory.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn term_to_id(&self) -> PathBuf { self.root.join("term_to_id.bin") }
    pub fn id_to_term(&self) -> PathBuf { self.root.join("id_to_term.bin") }
    pub fn doc_lengths(&self) -> PathBuf { self.root.join("doc_lengths.bin") }
    pub fn inverted_index(&self) -> PathBuf { self.root.join("inverted_index.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn id_mapping(&self) -> PathBuf { self.root.join("id_mapping.txt") }
    pub fn metadata(&self) -> PathBuf { self.root.join("metadata.txt") }
}

fn write_bin<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

/// Both lexicon directions are written so either can be loaded on its own.
pub fn save_lexicon(paths: &IndexPaths, lexicon: &Lexicon) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.term_to_id(), lexicon.term_to_id())?;
    write_bin(&paths.id_to_term(), lexicon.id_to_term())
}

pub fn load_lexicon(paths: &IndexPaths) -> Result<Lexicon> {
    let term_to_id: HashMap<String, TermId> = read_bin(&paths.term_to_id())?;
    let id_to_term: Vec<String> = read_bin(&paths.id_to_term())?;
    Lexicon::from_parts(term_to_id, id_to_term)
}

pub fn save_doc_lengths(paths: &IndexPaths, lengths: &[u32]) -> Result<()> {
    write_bin(&paths.doc_lengths(), lengths)
}

pub fn load_doc_lengths(paths: &IndexPaths) -> Result<Vec<u32>> {
    read_bin(&paths.doc_lengths())
}

pub fn save_inverted_index(paths: &IndexPaths, inverted: &InvertedIndex) -> Result<()> {
    write_bin(&paths.inverted_index(), inverted.lists())
}

pub fn load_inverted_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let lists: Vec<Vec<Posting>> = read_bin(&paths.inverted_index())?;
    InvertedIndex::from_lists(lists)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let f = File::open(paths.meta())?;
    let meta: MetaFile = serde_json::from_reader(BufReader::new(f))?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::corrupt("meta.json", format!("unsupported format version {}", meta.version)));
    }
    Ok(meta)
}

/// Load every artifact and cross-check their sizes.
pub fn load_index(paths: &IndexPaths) -> Result<Index> {
    let meta = load_meta(paths)?;
    tracing::debug!(root = %paths.root.display(), "loading lexicon");
    let lexicon = load_lexicon(paths)?;
    let doc_lengths = load_doc_lengths(paths)?;
    tracing::debug!("loading inverted index");
    let inverted = load_inverted_index(paths)?;
    let docnos = load_id_mapping(paths)?;
    let metadata: Vec<DocMeta> = load_metadata(paths)?;

    if docnos.len() != doc_lengths.len() || metadata.len() != docnos.len() {
        return Err(Error::corrupt(
            "index",
            format!(
                "{} mapped documents, {} lengths, {} metadata records",
                docnos.len(),
                doc_lengths.len(),
                metadata.len()
            ),
        ));
    }
    if inverted.num_terms() > lexicon.len() {
        return Err(Error::corrupt("inverted index", "postings for terms missing from the lexicon"));
    }
    let max_doc = inverted.lists().iter().filter_map(|l| l.last()).map(|p| p.doc_id).max();
    if max_doc.is_some_and(|d| d as usize >= docnos.len()) {
        return Err(Error::corrupt("inverted index", "posting references an unmapped document"));
    }

    let docno_ids = Index::docno_lookup(&docnos);
    if docno_ids.len() != docnos.len() {
        return Err(Error::corrupt("id_mapping.txt", "duplicate docno"));
    }

    tracing::info!(
        num_docs = docnos.len(),
        num_terms = lexicon.len(),
        normalization = %meta.normalization,
        "index loaded"
    );
    Ok(Index { lexicon, doc_lengths, inverted, docnos, docno_ids, metadata, normalization: meta.normalization })
}
