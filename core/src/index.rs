use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::{Error, Normalization, Result};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

/// Publication date embedded in a docno such as `LA010189-0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocDate {
    pub month: u8,
    pub day: u8,
    /// Two-digit year
    pub year: u8,
}

impl DocDate {
    /// Month, day and year sit at fixed offsets 2..4, 4..6 and 6..8.
    pub fn from_docno(docno: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidDocno { docno: docno.to_string(), reason };
        let digits = docno.as_bytes().get(2..8).ok_or_else(|| invalid("shorter than 8 characters"))?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid("characters 3-8 must be digits"));
        }
        let pair = |i: usize| (digits[i] - b'0') * 10 + (digits[i + 1] - b'0');
        let date = DocDate { month: pair(0), day: pair(2), year: pair(4) };
        if !(1..=12).contains(&date.month) {
            return Err(invalid("month out of range"));
        }
        if !(1..=31).contains(&date.day) {
            return Err(invalid("day out of range"));
        }
        Ok(date)
    }

    /// Parse the six-digit `MMDDYY` form written to the metadata file.
    pub fn from_mmddyy(raw: &str) -> Option<Self> {
        let b = raw.as_bytes();
        if b.len() != 6 || !b.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let pair = |i: usize| (b[i] - b'0') * 10 + (b[i + 1] - b'0');
        let date = DocDate { month: pair(0), day: pair(2), year: pair(4) };
        ((1..=12).contains(&date.month) && (1..=31).contains(&date.day)).then_some(date)
    }

    pub fn mmddyy(&self) -> String {
        format!("{:02}{:02}{:02}", self.month, self.day, self.year)
    }

    /// `MM/DD/YY`
    pub fn slashed(&self) -> String {
        format!("{:02}/{:02}/{:02}", self.month, self.day, self.year)
    }

    /// `January 1, 1989`. The collection predates 2000.
    pub fn long_form(&self) -> String {
        let month = time::Month::try_from(self.month)
            .map(|m| m.to_string())
            .unwrap_or_else(|_| format!("{:02}", self.month));
        format!("{} {}, 19{:02}", month, self.day, self.year)
    }
}

impl fmt::Display for DocDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mmddyy())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMeta {
    pub internal_id: DocId,
    pub docno: String,
    pub date: DocDate,
    pub headline: String,
}

/// Term string <-> dense term id, ids handed out in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lexicon {
    term_to_id: HashMap<String, TermId>,
    id_to_term: Vec<String>,
}

impl Lexicon {
    pub fn new() -> Self { Self::default() }

    /// Rebuild from the two persisted directions, checking they agree.
    pub fn from_parts(term_to_id: HashMap<String, TermId>, id_to_term: Vec<String>) -> Result<Self> {
        if term_to_id.len() != id_to_term.len() {
            return Err(Error::corrupt(
                "lexicon",
                format!("{} term ids but {} terms", term_to_id.len(), id_to_term.len()),
            ));
        }
        for (id, term) in id_to_term.iter().enumerate() {
            if term_to_id.get(term) != Some(&(id as TermId)) {
                return Err(Error::corrupt("lexicon", format!("term {term:?} does not map back to id {id}")));
            }
        }
        Ok(Self { term_to_id, id_to_term })
    }

    pub fn get_or_insert(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.term_to_id.get(term) {
            return id;
        }
        let id = self.id_to_term.len() as TermId;
        self.term_to_id.insert(term.to_string(), id);
        self.id_to_term.push(term.to_string());
        id
    }

    pub fn id(&self, term: &str) -> Option<TermId> {
        self.term_to_id.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.id_to_term.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.id_to_term.len() }

    pub fn is_empty(&self) -> bool { self.id_to_term.is_empty() }

    pub fn term_to_id(&self) -> &HashMap<String, TermId> { &self.term_to_id }

    pub fn id_to_term(&self) -> &[String] { &self.id_to_term }
}

/// Postings per term id, each list sorted by strictly increasing doc id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    lists: Vec<Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn from_lists(lists: Vec<Vec<Posting>>) -> Result<Self> {
        for (term_id, list) in lists.iter().enumerate() {
            if list.windows(2).any(|w| w[0].doc_id >= w[1].doc_id) {
                return Err(Error::corrupt("inverted index", format!("postings for term {term_id} are not increasing")));
            }
            if list.iter().any(|p| p.frequency == 0) {
                return Err(Error::corrupt("inverted index", format!("zero frequency posted for term {term_id}")));
            }
        }
        Ok(Self { lists })
    }

    /// Callers append documents in increasing id order, at most once per term.
    pub fn append(&mut self, term_id: TermId, posting: Posting) {
        let idx = term_id as usize;
        if self.lists.len() <= idx {
            self.lists.resize_with(idx + 1, Vec::new);
        }
        let list = &mut self.lists[idx];
        debug_assert!(list.last().map_or(true, |p| p.doc_id < posting.doc_id));
        list.push(posting);
    }

    /// Empty for ids that were never posted.
    pub fn postings(&self, term_id: TermId) -> &[Posting] {
        self.lists.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_terms(&self) -> usize { self.lists.len() }

    pub fn lists(&self) -> &[Vec<Posting>] { &self.lists }
}

/// Everything a retriever reads, loaded once and shared by reference.
#[derive(Debug, Clone)]
pub struct Index {
    pub lexicon: Lexicon,
    pub doc_lengths: Vec<u32>,
    pub inverted: InvertedIndex,
    /// Internal id -> docno, from the identifier mapping
    pub docnos: Vec<String>,
    /// Docno -> internal id, the inverse of `docnos`
    pub docno_ids: HashMap<String, DocId>,
    pub metadata: Vec<DocMeta>,
    pub normalization: Normalization,
}

impl Index {
    pub fn num_docs(&self) -> usize { self.docnos.len() }

    pub fn avg_doc_length(&self) -> f64 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        let total: u64 = self.doc_lengths.iter().map(|&l| l as u64).sum();
        total as f64 / self.doc_lengths.len() as f64
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn docno(&self, doc_id: DocId) -> Option<&str> {
        self.docnos.get(doc_id as usize).map(String::as_str)
    }

    pub fn meta(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.metadata.get(doc_id as usize)
    }

    pub fn doc_id_for(&self, docno: &str) -> Option<DocId> {
        self.docno_ids.get(docno).copied()
    }

    /// Inverse of an identifier mapping. A repeated docno keeps its first id.
    pub fn docno_lookup(docnos: &[String]) -> HashMap<String, DocId> {
        let mut ids = HashMap::with_capacity(docnos.len());
        for (i, docno) in docnos.iter().enumerate() {
            ids.entry(docno.clone()).or_insert(i as DocId);
        }
        ids
    }

    /// Map already-normalized tokens to term ids, dropping unknown terms.
    pub fn term_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TermId> {
        tokens.iter().filter_map(|t| self.lexicon.id(t.as_ref())).collect()
    }

    pub fn postings(&self, term_id: TermId) -> &[Posting] {
        self.inverted.postings(term_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_from_docno() {
        let d = DocDate::from_docno("LA010189-0001").unwrap();
        assert_eq!((d.month, d.day, d.year), (1, 1, 89));
        assert_eq!(d.mmddyy(), "010189");
        assert_eq!(d.slashed(), "01/01/89");
        assert_eq!(d.long_form(), "January 1, 1989");
        assert_eq!(DocDate::from_mmddyy("123190"), Some(DocDate { month: 12, day: 31, year: 90 }));
    }

    #[test]
    fn malformed_docno_is_rejected() {
        assert!(matches!(DocDate::from_docno("LA01"), Err(Error::InvalidDocno { .. })));
        assert!(matches!(DocDate::from_docno("LAx10189-0001"), Err(Error::InvalidDocno { .. })));
        assert!(matches!(DocDate::from_docno("LA130189-0001"), Err(Error::InvalidDocno { .. })));
        assert!(matches!(DocDate::from_docno("LA010089-0001"), Err(Error::InvalidDocno { .. })));
    }

    #[test]
    fn lexicon_assigns_dense_ids_once() {
        let mut lex = Lexicon::new();
        assert_eq!(lex.get_or_insert("quake"), 0);
        assert_eq!(lex.get_or_insert("fire"), 1);
        assert_eq!(lex.get_or_insert("quake"), 0);
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.term(1), Some("fire"));
        assert_eq!(lex.id("flood"), None);
        let rebuilt = Lexicon::from_parts(lex.term_to_id().clone(), lex.id_to_term().to_vec()).unwrap();
        assert_eq!(rebuilt, lex);
    }

    #[test]
    fn inconsistent_lexicon_is_corrupt() {
        let mut t2i = HashMap::new();
        t2i.insert("a".to_string(), 1);
        assert!(Lexicon::from_parts(t2i, vec!["a".to_string()]).is_err());
    }

    #[test]
    fn docno_lookup_inverts_mapping() {
        let docnos = vec!["LA010189-0001".to_string(), "LA010289-0002".to_string(), "LA010189-0001".to_string()];
        let ids = Index::docno_lookup(&docnos);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.get("LA010289-0002"), Some(&1));
        assert_eq!(ids.get("LA010189-0001"), Some(&0));
    }

    #[test]
    fn unordered_postings_are_corrupt() {
        let lists = vec![vec![Posting { doc_id: 2, frequency: 1 }, Posting { doc_id: 2, frequency: 1 }]];
        assert!(InvertedIndex::from_lists(lists).is_err());
        assert!(InvertedIndex::new().postings(7).is_empty());
    }
}
