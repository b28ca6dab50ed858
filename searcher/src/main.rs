use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use fossick_core::search::Searcher;
use fossick_core::tokenizer::tokenize;
use fossick_core::IndexPaths;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Plain BM25 ranking
    Bm25,
    /// BM25 followed by one automatic query-expansion round
    Aqe,
}

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Run ranked keyword queries against a built index", long_about = None)]
struct Cli {
    /// Ranking algorithm
    #[arg(short = 'a', long, value_enum)]
    algorithm: Algorithm,

    /// Opaque label echoed on every output line
    #[arg(short = 'q', long)]
    query_label: String,

    /// Number of results to return
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    num_results: u32,

    /// Directory holding the map, lexicon and invlists artifacts
    #[arg(short = 'i', long)]
    index: PathBuf,

    /// Corpus path; required for query expansion
    #[arg(short = 'c', long)]
    collection: Option<PathBuf>,

    /// Newline-separated stoplist, applied to the query terms
    #[arg(short = 's', long)]
    stoplist: Option<PathBuf>,

    /// Expansion terms to append (aqe only)
    #[arg(short = 'e', long, default_value_t = 25)]
    expansion_terms: usize,

    /// Raw query terms, tokenized with the indexing rules before lookup
    #[arg(required = true)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let stoplist = match &cli.stoplist {
        Some(path) => Some(load_stoplist(path)?),
        None => None,
    };
    let terms = tokenize(&cli.query.join(" "), stoplist.as_ref());
    tracing::debug!(?terms, "tokenized query");

    let mut searcher = Searcher::open(&IndexPaths::new(&cli.index))
        .with_context(|| format!("failed to open index under {}", cli.index.display()))?;

    let r = cli.num_results as usize;
    let hits = match cli.algorithm {
        Algorithm::Bm25 => searcher.search(&terms, r)?,
        Algorithm::Aqe => {
            let Some(corpus) = &cli.collection else {
                bail!("query expansion needs the corpus: pass -c <collection>");
            };
            searcher.search_expanded(&terms, r, corpus, stoplist.as_ref(), cli.expansion_terms)?
        }
    };

    for (rank, hit) in hits.iter().enumerate() {
        println!("{} {} {} {:.3}", cli.query_label, hit.docno, rank + 1, hit.score);
    }
    tracing::info!(
        results = hits.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "query complete"
    );

    Ok(())
}

fn load_stoplist(path: &Path) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read stoplist {}", path.display()))?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect())
}
