//! Serialization of the three index artifacts.
//!
//! Everything is staged in temp files inside the target directory and
//! renamed into place only after the last byte is written, so a failed
//! build never leaves a partial index behind.

use crate::collection::Collection;
use crate::error::{IndexError, Result};
use crate::postings::PostingsBuilder;
use crate::ranking::Bm25;
use crate::{varbyte, IndexPaths};
use std::fs::create_dir_all;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;

/// Writes the doc map, lexicon and invlists artifacts for a parsed
/// collection and its postings table.
pub fn write_index(
    paths: &IndexPaths,
    collection: &Collection,
    postings: &PostingsBuilder,
    ranker: &Bm25,
) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut map_tmp = NamedTempFile::new_in(&paths.root)?;
    let mut lexicon_tmp = NamedTempFile::new_in(&paths.root)?;
    let mut invlists_tmp = NamedTempFile::new_in(&paths.root)?;

    write_doc_map(map_tmp.as_file_mut(), collection, ranker)?;
    write_inverted_lists(invlists_tmp.as_file_mut(), lexicon_tmp.as_file_mut(), postings)?;

    commit(paths, map_tmp, lexicon_tmp, invlists_tmp)?;

    tracing::info!(
        documents = collection.documents.len(),
        terms = postings.len(),
        root = %paths.root.display(),
        "index artifacts committed"
    );
    Ok(())
}

/// Renames the staged artifacts into place as one unit. If any rename
/// fails, the ones already done are removed again, so a failed build never
/// leaves a `map`/`lexicon`/`invlists` set that could open as an index.
fn commit(
    paths: &IndexPaths,
    map_tmp: NamedTempFile,
    lexicon_tmp: NamedTempFile,
    invlists_tmp: NamedTempFile,
) -> Result<()> {
    let staged = [
        (map_tmp, paths.doc_map()),
        (lexicon_tmp, paths.lexicon()),
        (invlists_tmp, paths.invlists()),
    ];
    let mut renamed = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        if let Err(e) = tmp.persist(&target) {
            for done in &renamed {
                let _ = std::fs::remove_file(done);
            }
            return Err(IndexError::Io(e.error));
        }
        renamed.push(target);
    }
    Ok(())
}

/// One line per document in id order: `<id> <docno> <weight>`. The weight
/// is printed with f64 `Display`, whose shortest round-trip form reloads
/// to the identical value, so BM25 scores reproduce exactly at query time.
fn write_doc_map<W: Write>(out: W, collection: &Collection, ranker: &Bm25) -> Result<()> {
    let average_length = collection.average_length();
    let mut writer = BufWriter::new(out);
    for doc in &collection.documents {
        let weight = ranker.document_weight(doc.length as f64, average_length);
        writeln!(writer, "{} {} {}", doc.id, doc.docno, weight)?;
    }
    writer.flush()?;
    Ok(())
}

/// Per term: `varint(df)` then df pairs of `varint(doc_id) varint(tf)`.
///
/// Each record is encoded into a buffer first and appended whole, with the
/// running offset captured beforehand, so the lexicon offset and the record
/// bytes can never fall out of step.
fn write_inverted_lists<W: Write, L: Write>(
    invlists: W,
    lexicon: L,
    postings: &PostingsBuilder,
) -> Result<()> {
    let mut invlists = BufWriter::new(invlists);
    let mut lexicon = BufWriter::new(lexicon);
    let mut offset: u64 = 0;
    let mut record: Vec<u8> = Vec::new();
    for (term, list) in postings.iter() {
        record.clear();
        varbyte::encode_into(list.len() as u64, &mut record);
        for posting in list {
            varbyte::encode_into(u64::from(posting.doc_id), &mut record);
            varbyte::encode_into(u64::from(posting.term_frequency), &mut record);
        }
        writeln!(lexicon, "{} {}", term, offset)?;
        invlists.write_all(&record)?;
        offset += record.len() as u64;
    }
    invlists.flush()?;
    lexicon.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Document;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn collection() -> Collection {
        let docs = vec![
            Document::new(1, "A".into(), vec!["cat".into(), "cat".into(), "dog".into()]),
            Document::new(2, "B".into(), vec!["dog".into(), "bird".into()]),
        ];
        Collection { documents: docs }
    }

    fn build(collection: &Collection) -> PostingsBuilder {
        let mut builder = PostingsBuilder::new();
        for doc in &collection.documents {
            builder.add_document(doc);
        }
        builder
    }

    #[test]
    fn doc_map_lines_reload_exactly() {
        let collection = collection();
        let ranker = Bm25::default();
        let mut buf = Vec::new();
        write_doc_map(Cursor::new(&mut buf), &collection, &ranker).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields: Vec<&str> = lines[0].split_whitespace().collect();
        assert_eq!(fields[0], "1");
        assert_eq!(fields[1], "A");
        let reloaded: f64 = fields[2].parse().unwrap();
        let expected = ranker.document_weight(
            collection.documents[0].length as f64,
            collection.average_length(),
        );
        assert_eq!(reloaded, expected);
    }

    #[test]
    fn lexicon_offsets_address_list_starts() {
        let collection = collection();
        let builder = build(&collection);
        let mut inv = Vec::new();
        let mut lex = Vec::new();
        write_inverted_lists(Cursor::new(&mut inv), Cursor::new(&mut lex), &builder).unwrap();

        for line in String::from_utf8(lex).unwrap().lines() {
            let (term, offset) = line.split_once(' ').unwrap();
            let offset: usize = offset.parse().unwrap();
            let mut cursor = Cursor::new(&inv[offset..]);
            let df = varbyte::decode(&mut cursor).unwrap() as usize;
            assert_eq!(df, builder.get(term).unwrap().len());
            for posting in builder.get(term).unwrap() {
                assert_eq!(varbyte::decode(&mut cursor).unwrap(), u64::from(posting.doc_id));
                assert_eq!(
                    varbyte::decode(&mut cursor).unwrap(),
                    u64::from(posting.term_frequency)
                );
            }
        }
    }

    #[test]
    fn failed_commit_rolls_back_renamed_artifacts() {
        let dir = tempdir().unwrap();
        let collection = collection();
        let builder = build(&collection);
        let paths = IndexPaths::new(dir.path());
        // A directory squatting on the lexicon path makes its rename fail
        // after the map has already been renamed into place.
        fs::create_dir(paths.lexicon()).unwrap();

        let result = write_index(&paths, &collection, &builder, &Bm25::default());
        assert!(result.is_err());
        assert!(
            !paths.doc_map().exists(),
            "failed build must not leave a map behind"
        );
        assert!(!paths.invlists().exists());
    }

    #[test]
    fn commit_leaves_no_stray_temp_files() {
        let dir = tempdir().unwrap();
        let collection = collection();
        let builder = build(&collection);
        let paths = IndexPaths::new(dir.path());
        write_index(&paths, &collection, &builder, &Bm25::default()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["invlists", "lexicon", "map"]);
    }
}
