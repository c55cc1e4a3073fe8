//! Conjunctive (AND) retrieval by intersecting postings lists.

use crate::bm25::ScoredDoc;
use crate::index::{DocId, Index, Posting};
use crate::Normalization;

pub struct BooleanAnd<'a> {
    index: &'a Index,
    normalization: Normalization,
}

impl<'a> BooleanAnd<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self::with_normalization(index, index.normalization)
    }

    pub fn with_normalization(index: &'a Index, normalization: Normalization) -> Self {
        Self { index, normalization }
    }

    /// Documents containing every known query term, ascending by doc id.
    /// Unknown terms are dropped before intersecting.
    pub fn search(&self, query: &str) -> Vec<DocId> {
        let tokens = self.normalization.tokenize(query);
        self.search_tokens(&tokens)
    }

    pub fn search_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<DocId> {
        let lists: Vec<&[Posting]> = self
            .index
            .term_ids(tokens)
            .into_iter()
            .map(|term_id| self.index.postings(term_id))
            .collect();
        intersect_all(lists)
    }
}

/// Intersect postings lists smallest first.
pub fn intersect_all(mut lists: Vec<&[Posting]>) -> Vec<DocId> {
    if lists.is_empty() {
        return Vec::new();
    }
    lists.sort_by_key(|l| l.len());
    let mut result: Vec<DocId> = lists[0].iter().map(|p| p.doc_id).collect();
    for list in &lists[1..] {
        if result.is_empty() {
            break;
        }
        result = intersect(&result, list);
    }
    result
}

/// Linear merge of two id-ascending sequences, emitting shared ids once.
pub fn intersect(left: &[DocId], right: &[Posting]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let (a, b) = (left[i], right[j].doc_id);
        if a == b {
            out.push(a);
            i += 1;
            j += 1;
        } else if a < b {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Present an exact-match set in ranked-output form. Scores are synthetic,
/// `total - rank`, so the first document scores highest.
pub fn as_ranked(doc_ids: &[DocId]) -> Vec<ScoredDoc> {
    let total = doc_ids.len();
    doc_ids
        .iter()
        .enumerate()
        .map(|(i, &doc_id)| {
            let rank = i + 1;
            ScoredDoc { rank, doc_id, score: (total - rank) as f64 }
        })
        .collect()
}
