//! Term-at-a-time BM25 ranking.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::index::{DocId, Index, TermId};
use crate::select::{candidate, top_k};
use crate::Normalization;

/// Results kept per topic in batch runs.
pub const BATCH_LIMIT: usize = 1000;
/// Results shown per query in an interactive session.
pub const INTERACTIVE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub k2: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, k2: 7.0, b: 0.75 }
    }
}

/// One line of a ranked result list. Ranks start at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f64,
}

pub struct Bm25<'a> {
    index: &'a Index,
    params: Bm25Params,
    normalization: Normalization,
    avg_doc_length: f64,
    total_docs: f64,
}

impl<'a> Bm25<'a> {
    /// Uses the normalization the index was built with.
    pub fn new(index: &'a Index) -> Self {
        Self::with_params(index, Bm25Params::default(), index.normalization)
    }

    pub fn with_params(index: &'a Index, params: Bm25Params, normalization: Normalization) -> Self {
        Self {
            index,
            params,
            normalization,
            avg_doc_length: index.avg_doc_length(),
            total_docs: index.num_docs() as f64,
        }
    }

    pub fn normalization(&self) -> Normalization { self.normalization }

    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredDoc> {
        let tokens = self.normalization.tokenize(query);
        self.search_tokens(&tokens, limit)
    }

    /// Rank documents for already-normalized query tokens.
    pub fn search_tokens<S: AsRef<str>>(&self, tokens: &[S], limit: usize) -> Vec<ScoredDoc> {
        let accumulator = self.accumulate(tokens);
        let candidates = accumulator.into_iter().map(|(doc_id, score)| candidate(doc_id, score));
        top_k(candidates, limit)
            .into_iter()
            .enumerate()
            .map(|(i, (score, Reverse(doc_id)))| ScoredDoc { rank: i + 1, doc_id, score: score.into_inner() })
            .collect()
    }

    /// Full score accumulator: doc id -> summed term contributions.
    pub fn accumulate<S: AsRef<str>>(&self, tokens: &[S]) -> HashMap<DocId, f64> {
        let mut query_tf: HashMap<TermId, u32> = HashMap::new();
        for term_id in self.index.term_ids(tokens) {
            *query_tf.entry(term_id).or_insert(0) += 1;
        }

        let mut accumulator: HashMap<DocId, f64> = HashMap::new();
        for (&term_id, &qtf) in &query_tf {
            let postings = self.index.postings(term_id);
            if postings.is_empty() {
                continue;
            }
            let idf = self.idf(postings.len());
            let tf_query = self.tf_query(qtf);
            for p in postings {
                let k = self.k(self.index.doc_length(p.doc_id));
                let tf_doc = self.tf_doc(k, p.frequency);
                *accumulator.entry(p.doc_id).or_insert(0.0) += idf * tf_query * tf_doc;
            }
        }
        accumulator
    }

    fn k(&self, doc_length: u32) -> f64 {
        let Bm25Params { k1, b, .. } = self.params;
        let ratio = if self.avg_doc_length > 0.0 { doc_length as f64 / self.avg_doc_length } else { 0.0 };
        k1 * ((1.0 - b) + b * ratio)
    }

    fn tf_doc(&self, k: f64, tf: u32) -> f64 {
        let tf = tf as f64;
        (self.params.k1 + 1.0) * tf / (tf + k)
    }

    fn tf_query(&self, qtf: u32) -> f64 {
        let qtf = qtf as f64;
        (self.params.k2 + 1.0) * qtf / (self.params.k2 + qtf)
    }

    fn idf(&self, docs_with_term: usize) -> f64 {
        let n = docs_with_term as f64;
        ((self.total_docs - n + 0.5) / (n + 0.5)).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{InvertedIndex, Lexicon, Posting};
    use crate::testing::index_from_docs;

    #[test]
    fn empty_or_unknown_query_has_no_results() {
        let index = index_from_docs(&["storm coast", "river flood"]);
        let bm25 = Bm25::new(&index);
        assert!(bm25.search("", 10).is_empty());
        assert!(bm25.search("volcano", 10).is_empty());
    }

    #[test]
    fn matches_hand_computed_score() {
        let index = index_from_docs(&["storm coast storm", "river flood", "quiet town", "storm", "calm sea"]);
        let bm25 = Bm25::new(&index);
        let results = bm25.search("storm", 10);
        assert_eq!(results.len(), 2);

        let avg = (3.0 + 2.0 + 2.0 + 1.0 + 2.0) / 5.0;
        let idf = ((5.0 - 2.0 + 0.5) / (2.0 + 0.5f64)).ln();
        let tfq = 8.0 * 1.0 / (7.0 + 1.0);
        let k0 = 1.2 * (0.25 + 0.75 * 3.0 / avg);
        let s0 = idf * tfq * (2.2 * 2.0 / (2.0 + k0));
        let k3 = 1.2 * (0.25 + 0.75 * 1.0 / avg);
        let s3 = idf * tfq * (2.2 * 1.0 / (1.0 + k3));

        let by_doc: HashMap<DocId, f64> = results.iter().map(|r| (r.doc_id, r.score)).collect();
        assert!((by_doc[&0] - s0).abs() < 1e-12);
        assert!((by_doc[&3] - s3).abs() < 1e-12);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn repeated_query_terms_raise_query_weight() {
        let index = index_from_docs(&["storm", "coast", "flood", "river"]);
        let bm25 = Bm25::new(&index);
        let once = bm25.search("storm", 10)[0].score;
        let twice = bm25.search("storm storm", 10)[0].score;
        assert!(twice > once);
    }

    #[test]
    fn shorter_document_with_more_occurrences_ranks_higher() {
        // D1: length 100 with "apple" once; D2: length 50 with "apple" twice.
        let mut lexicon = Lexicon::new();
        let apple = lexicon.get_or_insert("apple");
        let mut inverted = InvertedIndex::new();
        inverted.append(apple, Posting { doc_id: 0, frequency: 1 });
        inverted.append(apple, Posting { doc_id: 1, frequency: 2 });
        let mut index = index_from_docs(&["", "", "", "", ""]);
        index.lexicon = lexicon;
        index.inverted = inverted;
        index.doc_lengths = vec![100, 50, 75, 75, 75];

        let results = Bm25::new(&index).search("apple", 10);
        assert_eq!(results[0].doc_id, 1);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn higher_term_frequency_never_lowers_score() {
        let mut lexicon = Lexicon::new();
        let t = lexicon.get_or_insert("tax");
        let mut index = index_from_docs(&["", "", "", ""]);
        index.lexicon = lexicon;
        index.doc_lengths = vec![40, 40, 40, 40];
        let mut previous = f64::NEG_INFINITY;
        for tf in 1..20 {
            let mut inverted = InvertedIndex::new();
            inverted.append(t, Posting { doc_id: 0, frequency: tf });
            index.inverted = inverted;
            let score = Bm25::new(&index).search("tax", 1)[0].score;
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn limit_truncates_and_ties_break_by_doc_id() {
        let index = index_from_docs(&["fire", "fire", "fire", "snow", "rain", "wind", "hail"]);
        let results = Bm25::new(&index).search("fire", 2);
        let ids: Vec<DocId> = results.iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
