//! Batch retrieval over a topic file, writing TREC run lines.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use trecdex_core::bm25::{Bm25, Bm25Params, ScoredDoc, BATCH_LIMIT};
use trecdex_core::boolean::{as_ranked, BooleanAnd};
use trecdex_core::{Error, Index, Normalization};

const Q0: &str = "Q0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Ranked BM25, top 1000 per topic
    Bm25,
    /// Exact boolean AND
    And,
}

impl Mode {
    pub fn default_run_tag(self) -> &'static str {
        match self {
            Mode::Bm25 => "trecdexBM25",
            Mode::And => "trecdexAND",
        }
    }
}

/// Alternating topic-id and query lines. Blank lines between topics are
/// skipped; a topic id must be followed by a query line (possibly empty).
pub fn read_topics<R: BufRead>(reader: R) -> trecdex_core::Result<Vec<Topic>> {
    let mut topics = Vec::new();
    let mut lines = reader.lines().enumerate();
    while let Some((line_no, id)) = lines.next() {
        let id = id?;
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        let query = match lines.next() {
            Some((_, query)) => query?,
            None => return Err(Error::QueryFile { line: line_no + 1, reason: "topic id without a query line" }),
        };
        topics.push(Topic { id: id.to_string(), query });
    }
    Ok(topics)
}

/// `topicId Q0 docno rank score runTag`
pub fn write_run_lines<W: Write>(out: &mut W, topic: &str, index: &Index, results: &[ScoredDoc], run_tag: &str) -> Result<()> {
    for r in results {
        let docno = index
            .docno(r.doc_id)
            .with_context(|| format!("document {} has no docno", r.doc_id))?;
        writeln!(out, "{topic} {Q0} {docno} {} {} {run_tag}", r.rank, r.score)?;
    }
    Ok(())
}

/// Run every topic and write its results; returns the number of lines written.
pub fn run_batch<W: Write>(
    index: &Index,
    topics: &[Topic],
    mode: Mode,
    normalization: Normalization,
    run_tag: &str,
    out: &mut W,
) -> Result<usize> {
    let bm25 = Bm25::with_params(index, Bm25Params::default(), normalization);
    let and = BooleanAnd::with_normalization(index, normalization);
    let mut written = 0;
    for topic in topics {
        let results = match mode {
            Mode::Bm25 => bm25.search(&topic.query, BATCH_LIMIT),
            Mode::And => as_ranked(&and.search(&topic.query)),
        };
        if results.is_empty() {
            tracing::info!(topic = %topic.id, query = %topic.query, "no results");
        } else {
            tracing::debug!(topic = %topic.id, hits = results.len(), "executed query");
        }
        write_run_lines(out, &topic.id, index, &results, run_tag)
            .with_context(|| format!("writing results for topic {}", topic.id))?;
        written += results.len();
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_alternating_lines() {
        let topics = read_topics(Cursor::new("401\nforeign minorities, germany\n\n402\nbehavioral genetics\n")).unwrap();
        assert_eq!(
            topics,
            vec![
                Topic { id: "401".into(), query: "foreign minorities, germany".into() },
                Topic { id: "402".into(), query: "behavioral genetics".into() },
            ]
        );
    }

    #[test]
    fn dangling_topic_id_is_an_error() {
        let err = read_topics(Cursor::new("401\nquery\n402\n")).unwrap_err();
        assert!(matches!(err, Error::QueryFile { line: 3, .. }));
    }
}
