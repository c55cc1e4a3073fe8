//! Interactive search as an explicit state machine.
//!
//! A [`Session`] consumes one input line at a time and writes everything the
//! operator sees to the supplied writer, so a scripted input sequence fully
//! determines the transcript.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::time::Instant;
use trecdex_core::bm25::{Bm25, ScoredDoc, INTERACTIVE_LIMIT};
use trecdex_core::extract::summary_text;
use trecdex_core::store::DocumentStore;
use trecdex_core::summary::query_biased_summary;
use trecdex_core::{DocId, DocMeta, Index};

const SEPARATOR: &str = "_____________________";
const NEW_QUERY: &str = "N";
const QUIT: &str = "Q";
const HEADLINE_FALLBACK_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingQuery,
    ShowingResults,
    Terminated,
}

/// What a line typed while results are showing means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rank(usize),
    NewQuery,
    Quit,
    Invalid,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input {
            NEW_QUERY => Command::NewQuery,
            QUIT => Command::Quit,
            _ => input.parse().map(Command::Rank).unwrap_or(Command::Invalid),
        }
    }
}

pub struct Session<'a> {
    index: &'a Index,
    store: &'a DocumentStore,
    bm25: Bm25<'a>,
    state: State,
    results: Vec<ScoredDoc>,
}

impl<'a> Session<'a> {
    pub fn new(index: &'a Index, store: &'a DocumentStore) -> Self {
        Self { index, store, bm25: Bm25::new(index), state: State::AwaitingQuery, results: Vec::new() }
    }

    pub fn state(&self) -> State { self.state }

    pub fn results(&self) -> &[ScoredDoc] { &self.results }

    pub fn prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.state {
            State::AwaitingQuery => writeln!(out, "\nPlease enter your query:")?,
            State::ShowingResults => {
                writeln!(out, "\nEnter rank number to view document.")?;
                writeln!(out, "Enter {NEW_QUERY} to create new query.")?;
                writeln!(out, "Enter {QUIT} to quit program.")?;
            }
            State::Terminated => {}
        }
        Ok(())
    }

    /// Feed one input line and return the state it leads to.
    pub fn handle<W: Write>(&mut self, input: &str, out: &mut W) -> Result<State> {
        self.state = match self.state {
            State::AwaitingQuery => {
                self.run_query(input, out)?;
                State::ShowingResults
            }
            State::ShowingResults => match Command::parse(input) {
                Command::Quit => {
                    writeln!(out, "Exiting Program...")?;
                    State::Terminated
                }
                Command::NewQuery => State::AwaitingQuery,
                Command::Rank(rank) if (1..=INTERACTIVE_LIMIT).contains(&rank) => {
                    match self.results.get(rank - 1) {
                        Some(hit) => {
                            let doc_id = hit.doc_id;
                            writeln!(out, "\nViewing document of rank: {rank}")?;
                            writeln!(out, "{SEPARATOR}")?;
                            self.display_raw_document(doc_id, out)?;
                            writeln!(out, "{SEPARATOR}")?;
                        }
                        None => writeln!(out, "No result at rank {rank}.")?,
                    }
                    State::ShowingResults
                }
                Command::Rank(_) => {
                    writeln!(out, "Rank entered out of range. Must be between 1 and {INTERACTIVE_LIMIT}.")?;
                    State::ShowingResults
                }
                Command::Invalid => {
                    writeln!(out, "Invalid Input.")?;
                    State::ShowingResults
                }
            },
            State::Terminated => State::Terminated,
        };
        Ok(self.state)
    }

    fn run_query<W: Write>(&mut self, query: &str, out: &mut W) -> Result<()> {
        writeln!(out, "Executing query: {query}\n")?;
        let start = Instant::now();
        let tokens = self.bm25.normalization().tokenize(query);
        self.results = self.bm25.search_tokens(&tokens, INTERACTIVE_LIMIT);

        if self.results.is_empty() {
            writeln!(out, "No results found for query: {query}")?;
            writeln!(out, "{SEPARATOR}")?;
        }
        for hit in &self.results {
            let meta = self.meta(hit.doc_id)?;
            let lines = self
                .store
                .load(&meta.docno, &meta.date)
                .with_context(|| format!("loading raw document {}", meta.docno))?;
            let summary = query_biased_summary(&summary_text(&lines), &tokens, self.bm25.normalization());
            write!(out, "{}", render_result(hit.rank, meta, &summary))?;
        }
        let took = start.elapsed().as_secs_f64();
        tracing::debug!(query, hits = self.results.len(), took_s = took, "interactive query");
        writeln!(out, "Query retrieval took {took:.3} seconds.")?;
        Ok(())
    }

    fn display_raw_document<W: Write>(&self, doc_id: DocId, out: &mut W) -> Result<()> {
        let meta = self.meta(doc_id)?;
        for line in self.store.load(&meta.docno, &meta.date)? {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn meta(&self, doc_id: DocId) -> Result<&'a DocMeta> {
        self.index
            .meta(doc_id)
            .with_context(|| format!("no metadata for document {doc_id}"))
    }
}

/// Two display lines per hit: headline (or summary lead) with date, then
/// the summary with its docno.
pub fn render_result(rank: usize, meta: &DocMeta, summary: &str) -> String {
    let date = meta.date.slashed();
    let title = if meta.headline.trim().is_empty() {
        let lead: String = summary.chars().take(HEADLINE_FALLBACK_CHARS).collect();
        format!("{rank}. {lead}... ({date})")
    } else {
        format!("{rank}. {} ({date})", meta.headline.trim())
    };
    format!("{title}\n{summary} ({})\n{SEPARATOR}\n\n", meta.docno)
}

/// Drive `session` from `input` until it terminates or input runs out.
pub fn run<R: BufRead, W: Write>(session: &mut Session<'_>, input: R, out: &mut W) -> Result<()> {
    let mut lines = input.lines();
    while session.state() != State::Terminated {
        session.prompt(out)?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        session.handle(&line?, out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trecdex_core::DocDate;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("N"), Command::NewQuery);
        assert_eq!(Command::parse("Q"), Command::Quit);
        assert_eq!(Command::parse(" 3 "), Command::Rank(3));
        assert_eq!(Command::parse("11"), Command::Rank(11));
        assert_eq!(Command::parse("q"), Command::Invalid);
        assert_eq!(Command::parse("three"), Command::Invalid);
    }

    #[test]
    fn renders_headline_or_summary_lead() {
        let mut meta = DocMeta {
            internal_id: 0,
            docno: "LA010189-0001".into(),
            date: DocDate { month: 1, day: 1, year: 89 },
            headline: "Quake Rocks City".into(),
        };
        let summary = "A strong quake rocked the city on Sunday, toppling older buildings downtown.";
        let with_headline = render_result(1, &meta, summary);
        assert!(with_headline.starts_with("1. Quake Rocks City (01/01/89)\n"));
        assert!(with_headline.contains(&format!("{summary} (LA010189-0001)")));

        meta.headline.clear();
        let without = render_result(2, &meta, summary);
        assert!(without.starts_with("2. A strong quake rocked the city on Sunday, toppling... (01/01/89)\n"));
    }
}
