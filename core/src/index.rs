use std::path::{Path, PathBuf};

pub type DocId = u32;

/// One entry of a term's inverted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    /// Occurrences of the term within this document.
    pub term_frequency: u32,
}

/// Per-document entry of the doc map artifact.
///
/// The weight is the BM25 length-normalization factor, computed once at
/// build time from the document length and the collection average length.
#[derive(Debug, Clone, PartialEq)]
pub struct DocEntry {
    pub docno: String,
    pub weight: f64,
}

/// Locations of the three on-disk artifacts inside an index directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Text file, one `<id> <docno> <weight>` line per document.
    pub fn doc_map(&self) -> PathBuf {
        self.root.join("map")
    }

    /// Text file, one `<term> <byte offset>` line per distinct term.
    pub fn lexicon(&self) -> PathBuf {
        self.root.join("lexicon")
    }

    /// Binary file of varint-compressed inverted lists.
    pub fn invlists(&self) -> PathBuf {
        self.root.join("invlists")
    }
}
