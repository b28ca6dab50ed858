//! Automatic query expansion via pseudo-relevance feedback.
//!
//! Candidates come from the top-R documents of the initial retrieval. Each
//! candidate gets a term selection value (TSV) deciding whether it joins
//! the query, and a Robertson/Sparck-Jones weight (RSJ) deciding how much
//! it contributes when it does.

use crate::collection::Collection;
use crate::error::Result;
use crate::ranking::Bm25;
use crate::reader::IndexReader;
use crate::topk::TopK;
use crate::DocId;
use std::collections::{HashMap, HashSet};

/// Union of the pseudo-relevant documents' terms, minus terms already in
/// the query, deduplicated.
pub fn candidate_terms(
    query: &[String],
    relevant_docnos: &HashSet<&str>,
    collection: &Collection,
) -> Vec<String> {
    let query_terms: HashSet<&str> = query.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for doc in &collection.documents {
        if !relevant_docnos.contains(doc.docno.as_str()) {
            continue;
        }
        for term in &doc.terms {
            if query_terms.contains(term.as_str()) {
                continue;
            }
            if seen.insert(term.clone()) {
                candidates.push(term.clone());
            }
        }
    }
    candidates
}

/// Scores every candidate by TSV and keeps the `e` largest together with
/// their RSJ weight.
///
/// `r` is the size of the pseudo-relevant set (the number of documents the
/// initial retrieval actually returned). Candidates absent from the lexicon
/// are skipped. `r_t` saturates at the true overlap by construction: it
/// counts postings whose document is in the relevant set, and a list holds
/// at most one posting per document.
pub fn select_terms(
    reader: &mut IndexReader,
    candidates: &[String],
    relevant_ids: &HashSet<DocId>,
    r: usize,
    e: usize,
) -> Result<Vec<(String, f64)>> {
    let n = reader.num_docs();
    let mut topk: TopK<(String, f64)> = TopK::new(e);
    for term in candidates {
        let Some(postings) = reader.postings(term)? else {
            tracing::debug!(term = %term, "expansion candidate missing from lexicon, skipped");
            continue;
        };
        let f_t = postings.len();
        let r_t = postings
            .iter()
            .filter(|p| relevant_ids.contains(&p.doc_id))
            .count();
        let tsv = selection_value(f_t, n, r_t, r);
        let rsj = selection_weight(f_t, n, r_t, r);
        topk.push((term.clone(), rsj), tsv);
    }
    Ok(topk
        .into_ranked()
        .into_iter()
        .map(|(term_rsj, _tsv)| term_rsj)
        .collect())
}

/// Adds the expansion contribution of every selected term onto the
/// existing accumulator from the initial retrieval.
pub fn rescore(
    reader: &mut IndexReader,
    ranker: &Bm25,
    selected: &[(String, f64)],
    scores: &mut HashMap<DocId, f64>,
) -> Result<()> {
    for (term, rsj) in selected {
        let Some(postings) = reader.postings(term)? else {
            continue;
        };
        for posting in &postings {
            let weight = match reader.doc(posting.doc_id) {
                Some(entry) => entry.weight,
                None => continue,
            };
            *scores.entry(posting.doc_id).or_insert(0.0) +=
                ranker.score_expanded(*rsj, posting.term_frequency, weight);
        }
    }
    Ok(())
}

/// TSV(t) = (f_t / N)^r_t * C(R, r_t)
pub fn selection_value(f_t: usize, n: usize, r_t: usize, r: usize) -> f64 {
    (f_t as f64 / n as f64).powi(r_t as i32) * binomial(r, r_t)
}

/// RSJ(t) = 0.3 * ln(((r_t + 0.5)(N - f_t - R + r_t + 0.5))
///                 / ((f_t - r_t + 0.5)(R - r_t + 0.5)))
pub fn selection_weight(f_t: usize, n: usize, r_t: usize, r: usize) -> f64 {
    let f_t = f_t as f64;
    let n = n as f64;
    let r_t = r_t as f64;
    let r = r as f64;
    0.3 * (((r_t + 0.5) * (n - f_t - r + r_t + 0.5)) / ((f_t - r_t + 0.5) * (r - r_t + 0.5))).ln()
}

/// C(r, k) computed multiplicatively in f64; factorials overflow long
/// before the pseudo-relevant set gets interestingly large.
fn binomial(r: usize, k: usize) -> f64 {
    if k > r {
        return 0.0;
    }
    (0..k).map(|i| (r - i) as f64 / (i + 1) as f64).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Document;

    #[test]
    fn binomial_matches_pascals_triangle() {
        assert_eq!(binomial(0, 0), 1.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(5, 5), 1.0);
        assert_eq!(binomial(2, 5), 0.0);
        // Large enough that naive factorials would overflow f64.
        assert!((binomial(200, 3) - 1_313_400.0).abs() < 1e-3);
    }

    #[test]
    fn selection_value_matches_hand_calculation() {
        // f_t = 4, N = 8, r_t = 2, R = 3:
        // (4/8)^2 * C(3, 2) = 0.25 * 3 = 0.75
        assert!((selection_value(4, 8, 2, 3) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn selection_keeps_the_largest_tsv() {
        use crate::postings::PostingsBuilder;
        use crate::ranking::Bm25;
        use crate::writer::write_index;
        use crate::IndexPaths;
        use tempfile::tempdir;

        let collection = Collection {
            documents: vec![
                Document::new(1, "A".into(), vec!["alpha".into(), "common".into(), "rare".into()]),
                Document::new(2, "B".into(), vec!["alpha".into(), "common".into()]),
                Document::new(3, "C".into(), vec!["alpha".into(), "beta".into()]),
            ],
        };
        let mut builder = PostingsBuilder::new();
        for doc in &collection.documents {
            builder.add_document(doc);
        }
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        write_index(&paths, &collection, &builder, &Bm25::default()).unwrap();
        let mut reader = IndexReader::open(&paths).unwrap();

        // Relevant set = document 1 only, so R = 1 and both candidates
        // have r_t = 1. TSV(common) = 2/3 beats TSV(rare) = 1/3; with one
        // slot the selection must keep "common".
        let relevant: HashSet<DocId> = [1].into();
        let candidates = vec!["common".to_string(), "rare".to_string()];
        let selected = select_terms(&mut reader, &candidates, &relevant, 1, 1).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0, "common");
    }

    #[test]
    fn selection_weight_matches_hand_calculation() {
        // f_t = 4, N = 100, r_t = 2, R = 3:
        // 0.3 * ln((2.5 * 95.5) / (2.5 * 1.5))
        let expected = 0.3 * ((2.5f64 * 95.5) / (2.5 * 1.5)).ln();
        assert!((selection_weight(4, 100, 2, 3) - expected).abs() < 1e-12);
    }

    #[test]
    fn candidates_exclude_query_terms_and_deduplicate() {
        let collection = Collection {
            documents: vec![
                Document::new(1, "A".into(), vec!["cat".into(), "dog".into(), "dog".into()]),
                Document::new(2, "B".into(), vec!["dog".into(), "bird".into()]),
                Document::new(3, "C".into(), vec!["fish".into()]),
            ],
        };
        let relevant: HashSet<&str> = ["A", "B"].into();
        let query = vec!["cat".to_string()];
        let mut candidates = candidate_terms(&query, &relevant, &collection);
        candidates.sort();
        // "cat" is in the query, "fish" only in a non-relevant document.
        assert_eq!(candidates, vec!["bird".to_string(), "dog".to_string()]);
    }
}
