//! Per-document side artifacts: the identifier mapping, the metadata file
//! and the raw document blobs kept for display.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::index::{DocDate, DocId, DocMeta};
use crate::persist::IndexPaths;
use crate::{Error, Result};

/// Streams `internalId docno` mapping lines and four-line metadata records.
pub struct MetadataWriter {
    mapping: BufWriter<File>,
    metadata: BufWriter<File>,
    written: DocId,
}

impl MetadataWriter {
    pub fn create(paths: &IndexPaths) -> Result<Self> {
        Ok(Self {
            mapping: BufWriter::new(File::create(paths.id_mapping())?),
            metadata: BufWriter::new(File::create(paths.metadata())?),
            written: 0,
        })
    }

    /// Records must arrive in internal id order starting at 0.
    pub fn write(&mut self, meta: &DocMeta) -> Result<()> {
        if meta.internal_id != self.written {
            return Err(Error::corrupt(
                "metadata",
                format!("expected internal id {}, got {}", self.written, meta.internal_id),
            ));
        }
        writeln!(self.mapping, "{} {}", meta.internal_id, meta.docno)?;
        writeln!(self.metadata, "{}", meta.internal_id)?;
        writeln!(self.metadata, "{}", meta.docno)?;
        writeln!(self.metadata, "{}", meta.date.mmddyy())?;
        writeln!(self.metadata, "{}", meta.headline)?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<DocId> {
        self.mapping.flush()?;
        self.metadata.flush()?;
        Ok(self.written)
    }
}

/// Internal id -> docno, in internal id order.
pub fn load_id_mapping(paths: &IndexPaths) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(paths.id_mapping())?);
    let mut docnos = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (id, docno) = line
            .split_once(' ')
            .ok_or_else(|| Error::corrupt("id_mapping.txt", format!("line {} has no separator", line_no + 1)))?;
        let id: usize = id
            .parse()
            .map_err(|_| Error::corrupt("id_mapping.txt", format!("line {} has a bad id", line_no + 1)))?;
        if id != docnos.len() {
            return Err(Error::corrupt("id_mapping.txt", format!("id {id} out of sequence")));
        }
        docnos.push(docno.to_string());
    }
    Ok(docnos)
}

pub fn load_metadata(paths: &IndexPaths) -> Result<Vec<DocMeta>> {
    let reader = BufReader::new(File::open(paths.metadata())?);
    let mut lines = reader.lines();
    let mut records = Vec::new();
    while let Some(id_line) = lines.next() {
        let id_line = id_line?;
        let mut field = |name: &str| -> Result<String> {
            match lines.next() {
                Some(line) => Ok(line?),
                None => Err(Error::corrupt("metadata.txt", format!("record {id_line} is missing its {name}"))),
            }
        };
        let docno = field("docno")?;
        let date = field("date")?;
        let headline = field("headline")?;
        let internal_id: DocId = id_line
            .parse()
            .map_err(|_| Error::corrupt("metadata.txt", format!("bad internal id {id_line:?}")))?;
        if internal_id as usize != records.len() {
            return Err(Error::corrupt("metadata.txt", format!("id {internal_id} out of sequence")));
        }
        let date = DocDate::from_mmddyy(&date)
            .ok_or_else(|| Error::corrupt("metadata.txt", format!("bad date {date:?} for {docno}")))?;
        records.push(DocMeta { internal_id, docno, date, headline });
    }
    Ok(records)
}

/// Raw document blobs under `YY/MM/DD/<docno>.txt`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, docno: &str, date: &DocDate) -> PathBuf {
        self.root
            .join(format!("{:02}", date.year))
            .join(format!("{:02}", date.month))
            .join(format!("{:02}", date.day))
            .join(format!("{docno}.txt"))
    }

    pub fn save<S: AsRef<str>>(&self, docno: &str, date: &DocDate, lines: &[S]) -> Result<()> {
        let path = self.path_for(docno, date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(&path)?);
        for line in lines {
            writeln!(w, "{}", line.as_ref())?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn load(&self, docno: &str, date: &DocDate) -> Result<Vec<String>> {
        let path = self.path_for(docno, date);
        let file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound { kind: "raw document", name: path.display().to_string() },
            _ => Error::Io(e),
        })?;
        Ok(BufReader::new(file).lines().collect::<std::io::Result<_>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn meta(id: DocId, docno: &str, headline: &str) -> DocMeta {
        DocMeta {
            internal_id: id,
            docno: docno.to_string(),
            date: DocDate::from_docno(docno).unwrap(),
            headline: headline.to_string(),
        }
    }

    #[test]
    fn metadata_round_trips_with_empty_headline() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut w = MetadataWriter::create(&paths).unwrap();
        w.write(&meta(0, "LA010189-0001", "Quake Hits")).unwrap();
        w.write(&meta(1, "LA020290-0007", "")).unwrap();
        assert_eq!(w.finish().unwrap(), 2);

        let mapping = fs::read_to_string(paths.id_mapping()).unwrap();
        assert_eq!(mapping, "0 LA010189-0001\n1 LA020290-0007\n");
        assert_eq!(load_id_mapping(&paths).unwrap(), vec!["LA010189-0001", "LA020290-0007"]);

        let records = load_metadata(&paths).unwrap();
        assert_eq!(records, vec![meta(0, "LA010189-0001", "Quake Hits"), meta(1, "LA020290-0007", "")]);
    }

    #[test]
    fn out_of_order_record_is_refused() {
        let dir = tempdir().unwrap();
        let mut w = MetadataWriter::create(&IndexPaths::new(dir.path())).unwrap();
        assert!(w.write(&meta(3, "LA010189-0001", "")).is_err());
    }

    #[test]
    fn raw_documents_are_addressed_by_date() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let date = DocDate::from_docno("LA123190-0042").unwrap();
        let lines = vec!["<DOC>", "<DOCNO> LA123190-0042 </DOCNO>", "</DOC>"];
        store.save("LA123190-0042", &date, &lines).unwrap();
        assert!(dir.path().join("90/12/31/LA123190-0042.txt").is_file());
        assert_eq!(store.load("LA123190-0042", &date).unwrap(), lines);
        assert!(matches!(store.load("LA123190-0043", &date), Err(Error::NotFound { .. })));
    }
}
