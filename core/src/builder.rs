//! In-memory accumulation of lexicon, lengths and postings during one pass.

use std::collections::HashMap;

use crate::index::{DocId, DocMeta, Index, InvertedIndex, Lexicon, Posting, TermId};
use crate::{Error, Normalization, Result};

#[derive(Debug, Default)]
pub struct IndexBuilder {
    normalization: Normalization,
    lexicon: Lexicon,
    doc_lengths: Vec<u32>,
    inverted: InvertedIndex,
    metadata: Vec<DocMeta>,
}

impl IndexBuilder {
    pub fn new(normalization: Normalization) -> Self {
        Self { normalization, ..Self::default() }
    }

    /// Id the next document will receive.
    pub fn next_doc_id(&self) -> DocId {
        self.doc_lengths.len() as DocId
    }

    pub fn num_terms(&self) -> usize {
        self.lexicon.len()
    }

    /// Tokenize `text`, record its length, and post one pair per distinct
    /// term. Returns the number of tokens.
    pub fn add_document(&mut self, meta: DocMeta, text: &str) -> Result<u32> {
        let doc_id = self.next_doc_id();
        if meta.internal_id != doc_id {
            return Err(Error::corrupt(
                "builder",
                format!("document {} added as id {}, expected {doc_id}", meta.docno, meta.internal_id),
            ));
        }
        let tokens = self.normalization.tokenize(text);
        let length = tokens.len() as u32;

        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for token in &tokens {
            let tid = self.lexicon.get_or_insert(token);
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        for (tid, frequency) in tf_counts {
            self.inverted.append(tid, Posting { doc_id, frequency });
        }

        self.doc_lengths.push(length);
        self.metadata.push(meta);
        Ok(length)
    }

    pub fn finish(self) -> Index {
        let docnos: Vec<String> = self.metadata.iter().map(|m| m.docno.clone()).collect();
        Index {
            lexicon: self.lexicon,
            doc_lengths: self.doc_lengths,
            inverted: self.inverted,
            docno_ids: Index::docno_lookup(&docnos),
            docnos,
            metadata: self.metadata,
            normalization: self.normalization,
        }
    }
}
