use anyhow::{Context, Result};
use clap::Parser;
use fossick_core::collection::Collection;
use fossick_core::postings::PostingsBuilder;
use fossick_core::ranking::Bm25;
use fossick_core::writer::write_index;
use fossick_core::IndexPaths;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a BM25 inverted index from a tagged corpus", long_about = None)]
struct Cli {
    /// Path to the corpus file
    sourcefile: PathBuf,

    /// Newline-separated stoplist; listed terms are not indexed
    #[arg(short = 's', long)]
    stoplist: Option<PathBuf>,

    /// Directory receiving the map, lexicon and invlists artifacts
    #[arg(short = 'o', long, default_value = ".")]
    output: PathBuf,

    /// Print every indexed term to stdout in order of appearance
    #[arg(short = 'p', long, default_value_t = false)]
    print_terms: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let stoplist = match &cli.stoplist {
        Some(path) => Some(load_stoplist(path)?),
        None => None,
    };

    let collection = Collection::from_path(&cli.sourcefile, stoplist.as_ref())
        .with_context(|| format!("failed to parse corpus {}", cli.sourcefile.display()))?;
    tracing::info!(documents = collection.documents.len(), "parsed corpus");

    let mut builder = PostingsBuilder::new();
    for doc in &collection.documents {
        builder.add_document(doc);
    }

    let paths = IndexPaths::new(&cli.output);
    write_index(&paths, &collection, &builder, &Bm25::default())
        .with_context(|| format!("failed to write index under {}", cli.output.display()))?;
    tracing::info!(terms = builder.len(), output = %cli.output.display(), "index build complete");

    if cli.print_terms {
        for doc in &collection.documents {
            for term in &doc.terms {
                println!("{term}");
            }
        }
    }

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
