//! Splitting a tagged newswire line stream into document records.

use std::io::BufRead;

use crate::{DocId, Error, Result};

const DOC_START: &str = "<DOC>";
const DOC_END: &str = "</DOC>";
const DOCNO_START: &str = "<DOCNO>";
const DOCNO_END: &str = "</DOCNO>";

/// One `<DOC> ... </DOC>` record, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub docno: String,
    pub lines: Vec<String>,
}

/// Streams [`RawDocument`]s out of any line source. Lines outside a
/// document are ignored.
pub struct DocumentReader<R> {
    reader: R,
    line_no: usize,
    next_id: DocId,
}

impl<R: BufRead> DocumentReader<R> {
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    /// Number records from `first_id`, so errors in a later corpus file
    /// report the internal id the record would have received.
    pub fn starting_at(reader: R, first_id: DocId) -> Self {
        Self { reader, line_no: 0, next_id: first_id }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn read_document(&mut self) -> Result<Option<RawDocument>> {
        // Skip to the next document start
        loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line == DOC_START => break,
                Some(_) => continue,
            }
        }
        let start_line = self.line_no;
        let mut lines = vec![DOC_START.to_string()];
        let mut docno = None;
        loop {
            let line = match self.next_line()? {
                Some(line) => line,
                None => return Err(Error::UnterminatedDocument { line: start_line }),
            };
            if line == DOC_START {
                // A new start tag discards the unfinished record
                lines.clear();
                docno = None;
            } else if docno.is_none() && line.starts_with(DOCNO_START) {
                docno = Some(parse_docno_line(&line));
            }
            let done = line == DOC_END;
            lines.push(line);
            if done {
                break;
            }
        }
        let internal_id = self.next_id;
        let docno = docno.ok_or(Error::MissingDocno { internal_id })?;
        self.next_id += 1;
        Ok(Some(RawDocument { docno, lines }))
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = Result<RawDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_document().transpose()
    }
}

/// `<DOCNO> LA010189-0001 </DOCNO>` -> `LA010189-0001`
pub fn parse_docno_line(line: &str) -> String {
    let inner = line.strip_prefix(DOCNO_START).unwrap_or(line);
    let inner = inner.trim_end();
    let inner = inner.strip_suffix(DOCNO_END).unwrap_or(inner);
    inner.trim().to_string()
}
