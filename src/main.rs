use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use delver_highlight::{
    map_keyed_chunks, trace_text_to_coordinates, HighlightPosition, MappingConfig, MatchTrace,
    ReconstructedDocument, TextFragment,
};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Map text chunks onto highlight rectangles of an extracted PDF.",
    arg_required_else_help = true
)]
pub struct Args {
    /// JSON array of text fragments in extraction order
    pub fragments: PathBuf,

    /// JSON array of chunks: plain strings or {"id", "text"} objects
    #[clap(short, long)]
    pub chunks: PathBuf,

    /// Optional JSON file overriding mapping thresholds
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Optional output file path. If omitted, writes to stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Optional pretty print output.
    #[clap(short, long)]
    pub pretty: bool,

    /// Emit a per-chunk report with match provenance instead of the highlight map
    #[clap(long)]
    pub trace: bool,

    /// Enable debug logging of reading order, matching and geometry
    #[clap(long)]
    pub debug_ops: bool,

    /// Directory for debug logs
    #[clap(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ChunkInput {
    Plain(String),
    Tagged { id: String, text: String },
}

impl ChunkInput {
    fn into_pair(self) -> (String, String) {
        match self {
            ChunkInput::Plain(text) => (text.clone(), text),
            ChunkInput::Tagged { id, text } => (id, text),
        }
    }
}

#[derive(Serialize)]
struct ChunkReport<'a> {
    id: &'a str,
    highlight: Option<HighlightPosition>,
    trace: MatchTrace,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn main() -> Result<()> {
    let args = Args::parse_args();

    // Keep the guard alive so the file writer flushes on exit
    let _guard = delver_highlight::logging::init_logging(args.debug_ops, args.log_dir.clone())?;

    let config = match &args.config {
        Some(path) => MappingConfig::from_json_file(path)?,
        None => MappingConfig::default(),
    };

    let fragments: Vec<TextFragment> = read_json(&args.fragments, "fragments")?;
    let chunks: Vec<(String, String)> = read_json::<Vec<ChunkInput>>(&args.chunks, "chunks")?
        .into_iter()
        .map(ChunkInput::into_pair)
        .collect();

    tracing::info!(
        fragments = fragments.len(),
        chunks = chunks.len(),
        "Reconstructing document"
    );
    let document = ReconstructedDocument::from_extracted(fragments, &config);

    let json = if args.trace {
        let reports: Vec<ChunkReport> = chunks
            .par_iter()
            .map(|(id, text)| {
                let report = trace_text_to_coordinates(&document, text, &config);
                ChunkReport {
                    id: id.as_str(),
                    highlight: report.outcome.ok(),
                    trace: report.trace,
                }
            })
            .collect();
        to_json(&reports, args.pretty)?
    } else {
        to_json(&map_keyed_chunks(&document, &chunks, &config), args.pretty)?
    };

    match args.output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!("Output written to: {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
