//! In-memory term -> postings table built in one pass over the collection.

use crate::collection::Document;
use crate::Posting;
use std::collections::HashMap;

/// Accumulates inverted lists from documents fed in id order.
///
/// Postings within a list keep first-encounter document order; repeated
/// occurrences of a term within one document merge into its frequency.
/// Term iteration order is unspecified; the writer records a byte offset
/// per term, so no global ordering is ever assumed.
#[derive(Debug, Default)]
pub struct PostingsBuilder {
    lists: HashMap<String, Vec<Posting>>,
}

impl PostingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one document. Documents must arrive in ascending id order for
    /// the tail-merge below to hold the one-posting-per-document invariant.
    pub fn add_document(&mut self, doc: &Document) {
        for term in &doc.terms {
            let list = self.lists.entry(term.clone()).or_default();
            match list.last_mut() {
                Some(last) if last.doc_id == doc.id => last.term_frequency += 1,
                _ => list.push(Posting {
                    doc_id: doc.id,
                    term_frequency: 1,
                }),
            }
        }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&[Posting]> {
        self.lists.get(term).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.lists.iter().map(|(t, l)| (t.as_str(), l.as_slice()))
    }
}
