use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use trecdex_core::builder::IndexBuilder;
use trecdex_core::corpus::{DocumentReader, RawDocument};
use trecdex_core::extract::{extract_text_by_tag, indexable_text, HEADLINE};
use trecdex_core::persist::{save_doc_lengths, save_inverted_index, save_lexicon, save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use trecdex_core::store::{DocumentStore, MetadataWriter};
use trecdex_core::{DocDate, DocMeta, Error, Normalization};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub num_docs: u32,
    pub num_terms: u32,
}

/// Corpus files under `input`, sorted so document ids are reproducible.
pub fn collect_corpus_files(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(Error::SourceMissing(input.to_path_buf()).into());
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", input.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Plain or gzip-compressed line reader, chosen by extension.
pub fn open_corpus_file(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let gz = path.extension().and_then(|e| e.to_str()) == Some("gz");
    Ok(if gz {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Build a fresh index at `output` from every document under `input`.
///
/// Refuses to touch an existing `output`. On failure the partially written
/// destination is left behind and must not be searched.
pub fn build_index(input: &Path, output: &Path, normalization: Normalization) -> Result<BuildSummary> {
    if output.exists() {
        return Err(Error::DestinationExists(output.to_path_buf()).into());
    }
    let files = collect_corpus_files(input)?;
    tracing::info!(input = %input.display(), output = %output.display(), files = files.len(), %normalization, "building index");

    let paths = IndexPaths::new(output);
    fs::create_dir_all(&paths.root).with_context(|| format!("creating {}", paths.root.display()))?;
    let store = DocumentStore::new(&paths.root);
    let mut metadata = MetadataWriter::create(&paths)?;
    let mut builder = IndexBuilder::new(normalization);

    for file in &files {
        tracing::debug!(file = %file.display(), "reading corpus file");
        let reader = DocumentReader::starting_at(open_corpus_file(file)?, builder.next_doc_id());
        for doc in reader {
            let doc = doc.with_context(|| format!("reading {}", file.display()))?;
            ingest_doc(doc, &mut builder, &mut metadata, &store)?;
        }
    }

    let num_docs = metadata.finish()?;
    let index = builder.finish();
    tracing::info!(num_docs, num_terms = index.lexicon.len(), "ingested documents");

    save_lexicon(&paths, &index.lexicon)?;
    save_doc_lengths(&paths, &index.doc_lengths)?;
    save_inverted_index(&paths, &index.inverted)?;
    let meta = MetaFile {
        num_docs,
        num_terms: index.lexicon.len() as u32,
        created_at: build_timestamp(OffsetDateTime::now_utc())?,
        version: FORMAT_VERSION,
        normalization,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output = %output.display(), "index build complete");
    Ok(BuildSummary { num_docs, num_terms: meta.num_terms })
}

/// RFC 3339 `created_at` recorded in `meta.json`.
pub fn build_timestamp(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).context("formatting build time")
}

fn ingest_doc(doc: RawDocument, builder: &mut IndexBuilder, metadata: &mut MetadataWriter, store: &DocumentStore) -> Result<()> {
    let date = DocDate::from_docno(&doc.docno)?;
    let meta = DocMeta {
        internal_id: builder.next_doc_id(),
        docno: doc.docno,
        date,
        headline: extract_text_by_tag(&doc.lines, HEADLINE.0, HEADLINE.1),
    };

    metadata.write(&meta)?;
    store
        .save(&meta.docno, &meta.date, &doc.lines)
        .with_context(|| format!("storing raw document {}", meta.docno))?;

    let text = indexable_text(&doc.lines);
    builder.add_document(meta, &text)?;
    Ok(())
}
