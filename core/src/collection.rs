//! Corpus parsing: tagged record blocks into [`Document`]s.

use crate::error::{IndexError, Result};
use crate::tokenizer::tokenize;
use crate::DocId;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const DOC_OPEN: &str = "<DOC>";
const DOC_CLOSE: &str = "</DOC>";
const DOCNO_OPEN: &str = "<DOCNO>";
const DOCNO_CLOSE: &str = "</DOCNO>";
const TEXT_OPEN: &str = "<TEXT>";
const TEXT_CLOSE: &str = "</TEXT>";
const HEADLINE_OPEN: &str = "<HEADLINE>";
const HEADLINE_CLOSE: &str = "</HEADLINE>";

/// A parsed corpus record. Exists only during the build pipeline; after
/// serialization the index artifacts are the sole representation.
#[derive(Debug, Clone)]
pub struct Document {
    /// Dense 1-based identifier in corpus order.
    pub id: DocId,
    /// External identifier from the DOCNO field.
    pub docno: String,
    /// Normalized terms in order of discovery.
    pub terms: Vec<String>,
    /// Sum of term lengths in bytes, the BM25 document length.
    pub length: u64,
}

impl Document {
    pub fn new(id: DocId, docno: String, terms: Vec<String>) -> Self {
        let length = terms.iter().map(|t| t.len() as u64).sum();
        Self {
            id,
            docno,
            terms,
            length,
        }
    }
}

/// The full set of parsed documents.
///
/// Invariant: ids are dense 1..=N in file order. A record with no
/// HEADLINE/TEXT blocks still occupies an id and counts toward the
/// average length.
#[derive(Debug, Default)]
pub struct Collection {
    pub documents: Vec<Document>,
}

impl Collection {
    pub fn from_path(path: &Path, stoplist: Option<&HashSet<String>>) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file), stoplist)
    }

    /// Scans the corpus line by line, toggling an "appending" flag on the
    /// HEADLINE/TEXT markers and gathering the lines in between. Block
    /// boundaries become whitespace. A record that closes without a DOCNO
    /// aborts the parse with the byte offset of its opening line.
    pub fn parse<R: BufRead>(mut reader: R, stoplist: Option<&HashSet<String>>) -> Result<Self> {
        let mut documents = Vec::new();
        let mut id: DocId = 0;
        let mut docno: Option<String> = None;
        let mut content = String::new();
        let mut appending = false;
        let mut offset: u64 = 0;
        let mut record_offset: u64 = 0;

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            let line_offset = offset;
            offset += read as u64;
            let trimmed = line.trim_end();

            if trimmed == TEXT_OPEN || trimmed == HEADLINE_OPEN {
                appending = true;
            } else if trimmed == TEXT_CLOSE || trimmed == HEADLINE_CLOSE {
                appending = false;
            } else if appending {
                // Nested tag lines inside a block carry no text.
                if !trimmed.starts_with('<') {
                    content.push_str(trimmed);
                    content.push(' ');
                }
            } else if let Some(rest) = trimmed.strip_prefix(DOCNO_OPEN) {
                let inner = rest.strip_suffix(DOCNO_CLOSE).ok_or_else(|| {
                    IndexError::InputFormat {
                        offset: line_offset,
                        reason: "unterminated <DOCNO> field".into(),
                    }
                })?;
                docno = Some(inner.trim().to_string());
            } else if trimmed == DOC_OPEN {
                record_offset = line_offset;
                docno = None;
                content.clear();
            } else if trimmed == DOC_CLOSE {
                let docno = docno.take().ok_or_else(|| IndexError::InputFormat {
                    offset: record_offset,
                    reason: "record closed without a <DOCNO> field".into(),
                })?;
                id += 1;
                let terms = tokenize(&content, stoplist);
                documents.push(Document::new(id, docno, terms));
                content.clear();
            }
        }

        Ok(Self { documents })
    }

    /// Average document length in bytes, fixed once after parsing.
    pub fn average_length(&self) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        let total: u64 = self.documents.iter().map(|d| d.length).sum();
        total as f64 / self.documents.len() as f64
    }
}
