use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref TOKEN: Regex = Regex::new(r"[\p{L}\p{Nd}]+").expect("valid regex");
}

/// Text normalization applied to both documents and queries.
///
/// Lexicon lookups only succeed when the index and the query were normalized
/// with the same variant; nothing converts between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    Plain,
    Stemmed,
}

impl Normalization {
    pub fn from_stem_flag(stem: bool) -> Self {
        if stem { Normalization::Stemmed } else { Normalization::Plain }
    }

    pub fn tokenize(self, text: &str) -> Vec<String> {
        match self {
            Normalization::Plain => tokenize(text),
            Normalization::Stemmed => tokenize_and_stem(text),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Plain => f.write_str("plain"),
            Normalization::Stemmed => f.write_str("stemmed"),
        }
    }
}

/// Lowercase, then emit every maximal run of letters or decimal digits as
/// a token. Superscripts, roman numerals and other numeric symbols split runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// [`tokenize`] followed by English stemming of every token.
///
/// The stemmer is Snowball English (Porter2), not the classic 1980 Porter
/// algorithm, so a few stems differ from older Porter-stemmed indexes.
pub fn tokenize_and_stem(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .map(|t| STEMMER.stem(&t).into_owned())
        .collect()
}
