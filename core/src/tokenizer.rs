use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // Everything outside the alphabet is a separator, except the three
    // intra-word joiners which get their own splitting rule below.
    static ref NON_TERM: Regex = Regex::new(r"[^A-Za-z\-/']").expect("valid regex");
}

/// Tokenize raw text into normalized terms.
///
/// Rules: strip every character outside `[A-Za-z]`, hyphen, slash and
/// apostrophe; lowercase; split on whitespace. A fully alphabetic word is
/// one term. Anything still holding a joiner splits on `-`, `/` and `'`,
/// keeping only fragments longer than one character, which drops
/// possessive-suffix noise ("don't" yields just "don"). Terms found in the
/// stoplist are removed last.
///
/// The same function tokenizes both the corpus and incoming queries, so a
/// query term always matches the form it was indexed under.
pub fn tokenize(text: &str, stoplist: Option<&HashSet<String>>) -> Vec<String> {
    let cleaned = NON_TERM.replace_all(text, " ").to_lowercase();
    let mut terms = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.bytes().all(|b| b.is_ascii_alphabetic()) {
            terms.push(word.to_string());
        } else {
            for fragment in word.split(['-', '/', '\'']) {
                if fragment.len() > 1 {
                    terms.push(fragment.to_string());
                }
            }
        }
    }
    if let Some(stop) = stoplist {
        terms.retain(|t| !stop.contains(t));
    }
    terms
}
