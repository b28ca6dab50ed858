pub mod collection;
pub mod error;
pub mod expand;
pub mod index;
pub mod postings;
pub mod ranking;
pub mod reader;
pub mod search;
pub mod tokenizer;
pub mod topk;
pub mod varbyte;
pub mod writer;

pub use error::{IndexError, Result};
pub use index::{DocEntry, DocId, IndexPaths, Posting};
