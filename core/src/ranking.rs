//! BM25 scoring. Scores are higher-is-better; negative contributions from
//! very common terms are legal and intentionally not clamped.

/// BM25 constants.
#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    /// Term-frequency saturation. Default 1.2.
    pub k1: f64,
    /// Document-length normalization. Default 0.75.
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25 {
    /// The per-document length-normalization factor K, computed once at
    /// build time and stored in the doc map.
    ///
    ///   K = k1 * ((1 - b) + b * length / average_length)
    ///
    /// An empty collection has no meaningful average; the guard keeps the
    /// weight finite.
    pub fn document_weight(&self, length: f64, average_length: f64) -> f64 {
        let al = if average_length > 0.0 {
            average_length
        } else {
            1.0
        };
        self.k1 * ((1.0 - self.b) + (self.b * length) / al)
    }

    /// BM25 contribution of one term to one document.
    ///
    ///   ln((N - f_t + 0.5) / (f_t + 0.5)) * ((k1 + 1) * d) / (K + d)
    ///
    /// where `n` is the collection size, `document_frequency` the number of
    /// documents containing the term, `within_doc_frequency` its count in
    /// this document and `document_weight` the stored K value.
    pub fn score(
        &self,
        n: usize,
        document_frequency: usize,
        within_doc_frequency: u32,
        document_weight: f64,
    ) -> f64 {
        let n = n as f64;
        let f_t = document_frequency as f64;
        let d = f64::from(within_doc_frequency);
        ((n - f_t + 0.5) / (f_t + 0.5)).ln() * ((self.k1 + 1.0) * d) / (document_weight + d)
    }

    /// Scoring variant for expansion terms, whose weight is a selection
    /// value rather than the standard IDF.
    pub fn score_expanded(
        &self,
        selection_weight: f64,
        within_doc_frequency: u32,
        document_weight: f64,
    ) -> f64 {
        let d = f64::from(within_doc_frequency);
        selection_weight * ((self.k1 + 1.0) * d) / (document_weight + d)
    }
}
