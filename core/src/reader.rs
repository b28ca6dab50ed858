//! Random-access reads against a finished artifact set.

use crate::error::{IndexError, Result};
use crate::{varbyte, DocEntry, DocId, IndexPaths, Posting};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Read-only view over the doc map, lexicon and invlists artifacts.
///
/// The two text artifacts are loaded into owned hash maps up front; the
/// postings store stays on disk and is addressed by lexicon offsets, so a
/// lookup never scans the file.
pub struct IndexReader {
    lexicon: HashMap<String, u64>,
    doc_map: HashMap<DocId, DocEntry>,
    invlists: BufReader<File>,
}

impl IndexReader {
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let lexicon = load_lexicon(&paths.lexicon())?;
        let doc_map = load_doc_map(&paths.doc_map())?;
        let invlists = BufReader::new(File::open(paths.invlists())?);
        tracing::debug!(
            terms = lexicon.len(),
            documents = doc_map.len(),
            "index artifacts loaded"
        );
        Ok(Self {
            lexicon,
            doc_map,
            invlists,
        })
    }

    /// Collection size N.
    pub fn num_docs(&self) -> usize {
        self.doc_map.len()
    }

    pub fn doc(&self, id: DocId) -> Option<&DocEntry> {
        self.doc_map.get(&id)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.lexicon.contains_key(term)
    }

    /// Resolves a term and reads its inverted list.
    ///
    /// `Ok(None)` is a lexicon miss, which is not an error: the term simply
    /// contributes nothing. A list that decodes to an impossible shape (df
    /// larger than the collection, or a document the map does not know)
    /// means the artifacts do not belong together.
    pub fn postings(&mut self, term: &str) -> Result<Option<Vec<Posting>>> {
        let Some(&offset) = self.lexicon.get(term) else {
            return Ok(None);
        };
        self.invlists.seek(SeekFrom::Start(offset))?;
        let df = varbyte::decode(&mut self.invlists)? as usize;
        if df == 0 || df > self.doc_map.len() {
            return Err(IndexError::Inconsistent(format!(
                "term {term:?} at offset {offset} has document frequency {df} in a collection of {}",
                self.doc_map.len()
            )));
        }
        let mut list = Vec::with_capacity(df);
        for _ in 0..df {
            let doc_id = varbyte::decode(&mut self.invlists)?;
            let term_frequency = varbyte::decode(&mut self.invlists)?;
            let doc_id = DocId::try_from(doc_id).map_err(|_| {
                IndexError::Inconsistent(format!("posting document id {doc_id} out of range"))
            })?;
            let term_frequency = u32::try_from(term_frequency).map_err(|_| {
                IndexError::Inconsistent(format!("term frequency {term_frequency} out of range"))
            })?;
            if !self.doc_map.contains_key(&doc_id) {
                return Err(IndexError::Inconsistent(format!(
                    "posting for term {term:?} names unknown document id {doc_id}"
                )));
            }
            list.push(Posting {
                doc_id,
                term_frequency,
            });
        }
        Ok(Some(list))
    }
}

fn load_lexicon(path: &Path) -> Result<HashMap<String, u64>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lexicon = HashMap::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let parsed = line.split_once(' ').and_then(|(term, offset)| {
            offset
                .trim()
                .parse::<u64>()
                .ok()
                .map(|o| (term.to_string(), o))
        });
        let (term, offset) = parsed.ok_or_else(|| {
            IndexError::Inconsistent(format!("lexicon line {} is malformed", number + 1))
        })?;
        lexicon.insert(term, offset);
    }
    Ok(lexicon)
}

fn load_doc_map(path: &Path) -> Result<HashMap<DocId, DocEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut doc_map = HashMap::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let parsed = match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(docno), Some(weight)) => id
                .parse::<DocId>()
                .ok()
                .zip(weight.parse::<f64>().ok())
                .map(|(id, weight)| (id, docno.to_string(), weight)),
            _ => None,
        };
        let (id, docno, weight) = parsed.ok_or_else(|| {
            IndexError::Inconsistent(format!("doc map line {} is malformed", number + 1))
        })?;
        doc_map.insert(id, DocEntry { docno, weight });
    }
    Ok(doc_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, Document};
    use crate::postings::PostingsBuilder;
    use crate::ranking::Bm25;
    use crate::writer::write_index;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(root: &Path) -> PostingsBuilder {
        let collection = Collection {
            documents: vec![
                Document::new(1, "A".into(), vec!["cat".into(), "cat".into(), "dog".into()]),
                Document::new(2, "B".into(), vec!["dog".into(), "bird".into()]),
            ],
        };
        let mut builder = PostingsBuilder::new();
        for doc in &collection.documents {
            builder.add_document(doc);
        }
        write_index(&IndexPaths::new(root), &collection, &builder, &Bm25::default()).unwrap();
        builder
    }

    #[test]
    fn reads_back_what_the_writer_stored() {
        let dir = tempdir().unwrap();
        let builder = write_fixture(dir.path());
        let mut reader = IndexReader::open(&IndexPaths::new(dir.path())).unwrap();

        assert_eq!(reader.num_docs(), 2);
        for term in ["cat", "dog", "bird"] {
            let list = reader.postings(term).unwrap().unwrap();
            assert_eq!(list.as_slice(), builder.get(term).unwrap());
        }
    }

    #[test]
    fn lexicon_miss_is_none_not_an_error() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let mut reader = IndexReader::open(&IndexPaths::new(dir.path())).unwrap();
        assert!(reader.postings("zebra").unwrap().is_none());
    }

    #[test]
    fn truncated_invlists_is_inconsistent() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let paths = IndexPaths::new(dir.path());
        let bytes = fs::read(paths.invlists()).unwrap();
        fs::write(paths.invlists(), &bytes[..1]).unwrap();

        let mut reader = IndexReader::open(&paths).unwrap();
        let mut saw_error = false;
        for term in ["cat", "dog", "bird"] {
            if let Err(IndexError::Inconsistent(_)) = reader.postings(term) {
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[test]
    fn mismatched_doc_map_is_inconsistent() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let paths = IndexPaths::new(dir.path());
        // Replace the map with one that lacks document 2.
        fs::write(paths.doc_map(), "1 A 1.2\n").unwrap();

        let mut reader = IndexReader::open(&paths).unwrap();
        match reader.postings("dog") {
            Err(IndexError::Inconsistent(_)) => {}
            other => panic!("expected Inconsistent, got {other:?}"),
        }
    }

    #[test]
    fn malformed_map_line_is_inconsistent() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let paths = IndexPaths::new(dir.path());
        fs::write(paths.doc_map(), "not a map line\n").unwrap();
        match IndexReader::open(&paths) {
            Err(IndexError::Inconsistent(_)) => {}
            other => panic!("expected Inconsistent, got {:?}", other.map(|_| ())),
        }
    }
}
