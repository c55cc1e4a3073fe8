//! Look up a single stored document by docno or internal id.

use anyhow::Result;
use std::io::Write;
use trecdex_core::store::DocumentStore;
use trecdex_core::{DocId, DocMeta, Error, Index};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRef {
    Docno(String),
    Id(DocId),
}

#[derive(Debug, Clone)]
pub struct FetchedDocument<'a> {
    pub meta: &'a DocMeta,
    pub lines: Vec<String>,
}

pub fn fetch<'a>(index: &'a Index, store: &DocumentStore, doc: &DocRef) -> Result<FetchedDocument<'a>> {
    let doc_id = match doc {
        DocRef::Id(id) => *id,
        DocRef::Docno(docno) => index
            .doc_id_for(docno)
            .ok_or_else(|| Error::NotFound { kind: "docno", name: docno.clone() })?,
    };
    let meta = index
        .meta(doc_id)
        .ok_or_else(|| Error::NotFound { kind: "internal id", name: doc_id.to_string() })?;
    let lines = store.load(&meta.docno, &meta.date)?;
    Ok(FetchedDocument { meta, lines })
}

pub fn write_document<W: Write>(out: &mut W, doc: &FetchedDocument<'_>) -> Result<()> {
    writeln!(out, "docno: {}", doc.meta.docno)?;
    writeln!(out, "internal id: {}", doc.meta.internal_id)?;
    writeln!(out, "date: {}", doc.meta.date.long_form())?;
    writeln!(out, "headline: {}", doc.meta.headline)?;
    writeln!(out, "raw document:")?;
    for line in &doc.lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
