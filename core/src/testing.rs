use crate::builder::IndexBuilder;
use crate::index::{DocDate, DocMeta, Index};
use crate::Normalization;

/// Index each string as one document with docno `LA010189-000N`.
pub fn index_from_docs(docs: &[&str]) -> Index {
    let mut builder = IndexBuilder::new(Normalization::Plain);
    for (i, text) in docs.iter().enumerate() {
        let meta = DocMeta {
            internal_id: i as u32,
            docno: format!("LA010189-{:04}", i + 1),
            date: DocDate { month: 1, day: 1, year: 89 },
            headline: String::new(),
        };
        builder.add_document(meta, text).expect("sequential ids");
    }
    builder.finish()
}
