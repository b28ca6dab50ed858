use thiserror::Error;

/// Error type shared by the index build and search paths.
///
/// A query term missing from the lexicon is deliberately not represented
/// here: it contributes a zero score and the query continues.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The corpus violated the record format. Fatal to the whole build;
    /// no partial artifacts are left behind.
    #[error("malformed record at byte offset {offset}: {reason}")]
    InputFormat { offset: u64, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact set does not describe a valid index: a corrupt varint
    /// stream, an offset pointing at garbage, or a posting naming a
    /// document the map has never heard of.
    #[error("inconsistent index artifacts: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_format_reports_offset() {
        let err = IndexError::InputFormat {
            offset: 42,
            reason: "record closed without a <DOCNO> field".into(),
        };
        assert!(err.to_string().contains("byte offset 42"));
    }
}
