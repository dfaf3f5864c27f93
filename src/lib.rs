pub mod config;
pub mod fragment;
pub mod geo;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod mapper;
pub mod matcher;
pub mod normalize;
pub mod reconstruct;
pub mod similarity;
pub mod trace;
pub mod validate;

pub use config::{MappingConfig, ReadingOrderConfig};
pub use fragment::{PageViewport, TextFragment};
pub use geometry::{BoundingRect, HighlightPosition};
pub use reconstruct::{CharMapping, ReconstructedDocument};
pub use trace::{MatchResult, MatchTrace, Rejection, Strategy};
pub use validate::{validate_highlight, HighlightValidity, InvalidReason};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::hash::Hash;

use crate::geometry::build_geometry;
use crate::logging::MATCHER;
use crate::matcher::Matcher;
use crate::normalize::normalize_with;
use crate::similarity::text_similarity;

/// Outcome of mapping one chunk, with the provenance of every step taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingReport {
    pub outcome: Result<HighlightPosition, Rejection>,
    pub trace: MatchTrace,
}

impl MappingReport {
    pub fn highlight(&self) -> Option<&HighlightPosition> {
        self.outcome.as_ref().ok()
    }

    pub fn into_highlight(self) -> Option<HighlightPosition> {
        self.outcome.ok()
    }
}

fn reject(mut trace: MatchTrace, rejection: Rejection) -> MappingReport {
    tracing::debug!(target: MATCHER, %rejection, "Chunk not highlighted");
    trace.rejection = Some(rejection.clone());
    MappingReport {
        outcome: Err(rejection),
        trace,
    }
}

/// Map a text chunk onto the document and report how it went.
///
/// The document is only read, so one document can serve any number of chunks,
/// concurrently if needed.
pub fn trace_text_to_coordinates(
    document: &ReconstructedDocument,
    chunk: &str,
    config: &MappingConfig,
) -> MappingReport {
    let mut trace = MatchTrace::default();

    // 1. Normalize the chunk the same way the document text was normalized
    let target = normalize_with(chunk, document.compat_fold());
    trace.chunk_chars = target.chars().count();

    if document.is_empty() {
        return reject(trace, Rejection::EmptyDocument);
    }
    if trace.chunk_chars < config.min_chunk_chars {
        let chars = trace.chunk_chars;
        return reject(trace, Rejection::ChunkTooShort { chars });
    }

    // 2. Locate the chunk in the normalized document text
    let matcher = Matcher::new(document.normalized(), config);
    let Some(found) = matcher.locate(&target, &mut trace) else {
        return reject(trace, Rejection::NotFound);
    };
    trace.matched = Some(found);

    // 3. Resolve the matched range to fragments
    let indices = document.fragments_for_range(found.start, found.end);
    trace.fragment_indices = indices.clone();
    let fragments: Vec<&TextFragment> = indices
        .iter()
        .filter_map(|&i| document.fragment(i))
        .collect();
    if fragments.is_empty() {
        return reject(trace, Rejection::NoFragments);
    }

    // 4. Check the fragments actually carry the chunk's words
    let joined = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let quality = text_similarity(
        &normalize_with(&joined, document.compat_fold()),
        &target,
        config.min_word_chars,
    );
    trace.quality = Some(quality);
    if quality < config.quality_threshold {
        return reject(trace, Rejection::LowConfidence { similarity: quality });
    }

    // 5. Build the highlight geometry
    let geometry = build_geometry(&fragments, config.line_tolerance);
    trace.malformed_fragments = geometry.malformed;
    let Some(position) = geometry.position else {
        return reject(trace, Rejection::NoGeometry);
    };

    // 6. Validate before handing out
    if let HighlightValidity::Invalid(reason) = validate_highlight(&position) {
        return reject(trace, Rejection::Invalid { reason });
    }

    tracing::debug!(
        target: MATCHER,
        strategy = %found.strategy,
        score = found.score,
        quality,
        page = position.page_number,
        rects = position.rects.len(),
        "Mapped chunk to highlight"
    );

    MappingReport {
        outcome: Ok(position),
        trace,
    }
}

/// Map a text chunk onto the document. `None` means the chunk could not be
/// located with enough confidence; it is never an error.
pub fn map_text_to_coordinates(
    document: &ReconstructedDocument,
    chunk: &str,
    config: &MappingConfig,
) -> Option<HighlightPosition> {
    trace_text_to_coordinates(document, chunk, config).into_highlight()
}

/// Map many chunks in parallel, keyed by the chunk text. Chunks without a
/// highlight are omitted; the rest keep their input order. A chunk that
/// appears twice maps to the same entry.
pub fn map_chunks<S>(
    document: &ReconstructedDocument,
    chunks: &[S],
    config: &MappingConfig,
) -> IndexMap<String, HighlightPosition>
where
    S: AsRef<str> + Sync,
{
    let keyed: Vec<(String, &str)> = chunks
        .iter()
        .map(|chunk| (chunk.as_ref().to_string(), chunk.as_ref()))
        .collect();
    map_keyed_chunks(document, &keyed, config)
}

/// Like [`map_chunks`] for chunks carrying their own keys.
pub fn map_keyed_chunks<K, S>(
    document: &ReconstructedDocument,
    chunks: &[(K, S)],
    config: &MappingConfig,
) -> IndexMap<K, HighlightPosition>
where
    K: Eq + Hash + Clone + Sync,
    S: AsRef<str> + Sync,
{
    let mapped: Vec<Option<HighlightPosition>> = chunks
        .par_iter()
        .map(|(_, chunk)| map_text_to_coordinates(document, chunk.as_ref(), config))
        .collect();

    let results: IndexMap<K, HighlightPosition> = chunks
        .iter()
        .zip(mapped)
        .filter_map(|((key, _), position)| Some((key.clone(), position?)))
        .collect();

    tracing::info!(
        target: MATCHER,
        chunks = chunks.len(),
        mapped = results.len(),
        "Mapped chunk batch"
    );
    results
}
