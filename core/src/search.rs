//! Query evaluation against a finished index.

use crate::collection::Collection;
use crate::error::Result;
use crate::expand;
use crate::ranking::Bm25;
use crate::reader::IndexReader;
use crate::topk::TopK;
use crate::{DocId, IndexPaths};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub docno: String,
    pub score: f64,
}

/// Evaluates tokenized queries with BM25, optionally followed by one
/// pseudo-relevance-feedback expansion round.
pub struct Searcher {
    reader: IndexReader,
    ranker: Bm25,
}

impl Searcher {
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        Ok(Self {
            reader: IndexReader::open(paths)?,
            ranker: Bm25::default(),
        })
    }

    /// Plain BM25: accumulate per-document scores over the query terms,
    /// then keep the best `r`. Unknown terms contribute nothing; a query
    /// of only unknown terms yields an empty list.
    pub fn search(&mut self, terms: &[String], r: usize) -> Result<Vec<Hit>> {
        let scores = self.accumulate(terms)?;
        Ok(self.rank(&scores, r))
    }

    /// BM25 followed by automatic query expansion. The initial top-`r`
    /// documents form the pseudo-relevant set; up to `expansion_terms`
    /// candidates drawn from them are rescored onto the same accumulator
    /// before the final top-`r` selection. `expansion_terms == 0`
    /// reproduces plain BM25 exactly.
    pub fn search_expanded(
        &mut self,
        terms: &[String],
        r: usize,
        corpus: &Path,
        stoplist: Option<&HashSet<String>>,
        expansion_terms: usize,
    ) -> Result<Vec<Hit>> {
        let mut scores = self.accumulate(terms)?;
        let initial = self.rank(&scores, r);

        let collection = Collection::from_path(corpus, stoplist)?;
        let relevant_docnos: HashSet<&str> = initial.iter().map(|h| h.docno.as_str()).collect();
        let relevant_ids: HashSet<DocId> = initial.iter().map(|h| h.doc_id).collect();

        let candidates = expand::candidate_terms(terms, &relevant_docnos, &collection);
        let selected = expand::select_terms(
            &mut self.reader,
            &candidates,
            &relevant_ids,
            initial.len(),
            expansion_terms,
        )?;
        tracing::debug!(
            candidates = candidates.len(),
            selected = selected.len(),
            "expansion terms chosen"
        );
        expand::rescore(&mut self.reader, &self.ranker, &selected, &mut scores)?;

        Ok(self.rank(&scores, r))
    }

    /// Sums the per-term BM25 contributions into one accumulator per
    /// matching document. The tokenized query is taken as-is: a term that
    /// appears twice in the query scores twice.
    fn accumulate(&mut self, terms: &[String]) -> Result<HashMap<DocId, f64>> {
        let n = self.reader.num_docs();
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for term in terms {
            let Some(postings) = self.reader.postings(term)? else {
                continue;
            };
            let df = postings.len();
            for posting in &postings {
                let weight = match self.reader.doc(posting.doc_id) {
                    Some(entry) => entry.weight,
                    None => continue,
                };
                *scores.entry(posting.doc_id).or_insert(0.0) +=
                    self.ranker
                        .score(n, df, posting.term_frequency, weight);
            }
        }
        Ok(scores)
    }

    /// Feeds the selector in ascending document id order, so equal scores
    /// rank reproducibly instead of following hash-map iteration order.
    fn rank(&self, scores: &HashMap<DocId, f64>, r: usize) -> Vec<Hit> {
        let mut entries: Vec<(DocId, f64)> = scores.iter().map(|(&d, &s)| (d, s)).collect();
        entries.sort_by_key(|&(doc_id, _)| doc_id);
        let mut topk = TopK::new(r);
        for (doc_id, score) in entries {
            topk.push(doc_id, score);
        }
        let mut hits = Vec::with_capacity(topk.len());
        for (doc_id, score) in topk.into_ranked() {
            if let Some(entry) = self.reader.doc(doc_id) {
                hits.push(Hit {
                    doc_id,
                    docno: entry.docno.clone(),
                    score,
                });
            }
        }
        hits
    }
}
